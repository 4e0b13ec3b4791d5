use std::{
    any::TypeId,
    fmt,
    hash::{Hash, Hasher},
};

/// Identity of a metadata value's concrete type.
///
/// Two values are of the same kind if and only if they have the same concrete
/// Rust type; their contents are never compared. A `Kind` is what
/// [`Metadata`](crate::Metadata) uses to keep at most one value per type and
/// what [`Metadata::without_kind`](crate::Metadata::without_kind) removes by.
///
/// Equality and hashing only look at the [`TypeId`]. The type name is kept for
/// diagnostics.
///
/// # Example
///
/// ```rust
/// use courier::Kind;
///
/// assert_eq!(Kind::of::<u32>(), Kind::of_val(&42u32));
/// assert_ne!(Kind::of::<u32>(), Kind::of::<i32>());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Kind {
    id: TypeId,
    name: &'static str,
}

impl Kind {
    /// The kind of values of type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The kind of the given value.
    #[inline]
    pub fn of_val<T: ?Sized + 'static>(_value: &T) -> Self {
        Self::of::<T>()
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Full type name, including the module path.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this is the kind of `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for Kind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Kind {}

impl Hash for Kind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[derive(Debug)]
    struct Celsius(#[allow(dead_code)] f64);

    #[derive(Debug)]
    struct Fahrenheit(#[allow(dead_code)] f64);

    #[test]
    fn test_same_type_same_kind() {
        assert_eq!(Kind::of_val(&Celsius(1.0)), Kind::of_val(&Celsius(99.0)));
        assert!(Kind::of::<Celsius>().is::<Celsius>());
    }

    #[test]
    fn test_structurally_identical_types_differ() {
        assert_ne!(Kind::of::<Celsius>(), Kind::of::<Fahrenheit>());
        assert!(!Kind::of::<Celsius>().is::<Fahrenheit>());
    }

    #[test]
    fn test_hash_follows_type_identity() {
        let kinds: HashSet<Kind> = [Kind::of::<u8>(), Kind::of_val(&7u8), Kind::of::<u16>()]
            .into_iter()
            .collect();
        assert_eq!(kinds.len(), 2);
    }

    #[test]
    fn test_display_uses_type_name() {
        assert_eq!(Kind::of::<u64>().to_string(), "u64");
        assert!(Kind::of::<Celsius>().name().ends_with("Celsius"));
    }
}
