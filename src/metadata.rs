use std::{
    any::Any,
    fmt,
    sync::{Arc, LazyLock},
};

use crate::{Entry, Error, Kind, Result};

static EMPTY: LazyLock<Metadata> = LazyLock::new(|| Metadata {
    entries: Arc::from(Vec::new()),
});

/// Immutable, ordered bag of metadata values with at most one value per [`Kind`].
///
/// Metadata attaches transport specific or application specific context to a
/// message (routing addresses, headers, trace context, tenant ids...) without
/// producers and consumers agreeing on a schema. Values are looked up by their
/// type.
///
/// Instances never change after construction. Every "modification" returns a
/// new instance and leaves the receiver untouched, so a `Metadata` can be shared
/// between tasks and threads without locking:
///
/// - [`with`](Metadata::with) adds a value, replacing any value of the same kind.
///   The new value is always last in iteration order, even when it replaces one.
/// - [`without`](Metadata::without) removes the value of a kind, if any.
/// - [`copy`](Metadata::copy) gives an instance with its own storage.
///
/// Cloning is cheap and aliases the same storage. The contained values are
/// shared, never deep-copied.
///
/// # Examples
///
/// ```rust
/// use courier::{Kind, Metadata, metadata};
///
/// let meta = metadata!["x", 42]?;
/// let meta = meta.with(99);
/// assert_eq!(meta.get::<i32>(), Some(&99));
///
/// let meta = meta.without::<&'static str>();
/// assert_eq!(meta.kinds().collect::<Vec<_>>(), vec![Kind::of::<i32>()]);
/// # Ok::<(), courier::Error>(())
/// ```
#[derive(Clone)]
pub struct Metadata {
    entries: Arc<[Entry]>,
}

impl Metadata {
    /// Returns the shared empty instance.
    pub fn empty() -> Self {
        EMPTY.clone()
    }

    /// Build a new instance holding `entries` in the given order.
    ///
    /// Fails with [`Error::InvalidArgument`] if two entries are of the same
    /// kind. See also the [`metadata!`](crate::metadata) macro.
    pub fn of<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = Entry>,
    {
        Ok(Self::from_vec(collect_unique(entries)?))
    }

    /// Same as [`of`](Metadata::of), but an empty sequence yields the shared
    /// [`empty`](Metadata::empty) instance.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = Entry>,
    {
        let entries = collect_unique(entries)?;
        if entries.is_empty() {
            return Ok(Self::empty());
        }
        Ok(Self::from_vec(entries))
    }

    /// Returns new metadata with `value` added last, replacing the value of
    /// the same kind if there is one.
    pub fn with<T: Any + Send + Sync>(&self, value: T) -> Self {
        self.with_entry(Entry::new(value))
    }

    pub fn with_entry(&self, entry: Entry) -> Self {
        let kind = entry.kind();
        let entries = self
            .entries
            .iter()
            .filter(|e| e.kind() != kind)
            .cloned()
            .chain(std::iter::once(entry))
            .collect();
        Self::from_vec(entries)
    }

    /// Returns new metadata without the value of type `T`.
    ///
    /// If there is no such value the result holds the same entries, but is
    /// still a distinct instance.
    pub fn without<T: Any>(&self) -> Self {
        self.without_kind(Kind::of::<T>())
    }

    pub fn without_kind(&self, kind: Kind) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|e| e.kind() != kind)
            .cloned()
            .collect();
        Self::from_vec(entries)
    }

    /// Returns an instance with the same entries backed by its own storage.
    pub fn copy(&self) -> Self {
        Self::from_vec(self.entries.to_vec())
    }

    /// Borrow the value of type `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.entry(Kind::of::<T>())
            .and_then(|entry| entry.downcast_ref::<T>())
    }

    /// Shared handle to the value of type `T`.
    pub fn get_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.entry(Kind::of::<T>())
            .and_then(|entry| entry.downcast::<T>())
    }

    pub fn entry(&self, kind: Kind) -> Option<&Entry> {
        self.entries.iter().find(|e| e.kind() == kind)
    }

    #[inline]
    pub fn contains<T: Any>(&self) -> bool {
        self.contains_kind(Kind::of::<T>())
    }

    #[inline]
    pub fn contains_kind(&self, kind: Kind) -> bool {
        self.entry(kind).is_some()
    }

    /// Kinds of the stored values, in iteration order.
    pub fn kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.entries.iter().map(Entry::kind)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether both instances share the same storage.
    ///
    /// Clones (and `Metadata::from(&other)`) alias their source. Every other operation returns fresh storage, except
    /// [`empty`](Metadata::empty) which always returns the same instance.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.entries, &b.entries)
    }

    fn from_vec(entries: Vec<Entry>) -> Self {
        Self {
            entries: Arc::from(entries),
        }
    }
}

/// Accepts entries in order, failing on the first kind seen twice.
fn collect_unique<I>(entries: I) -> Result<Vec<Entry>>
where
    I: IntoIterator<Item = Entry>,
{
    let mut accepted: Vec<Entry> = Vec::new();
    for entry in entries {
        if accepted.iter().any(|e| e.kind() == entry.kind()) {
            return Err(Error::InvalidArgument(
                format!("Duplicated metadata detected: {}", entry.kind()).into(),
            ));
        }
        accepted.push(entry);
    }
    Ok(accepted)
}

impl Default for Metadata {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.kind().name()))
            .finish()
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl From<&Metadata> for Metadata {
    fn from(metadata: &Metadata) -> Self {
        metadata.clone()
    }
}

impl TryFrom<Vec<Entry>> for Metadata {
    type Error = Error;

    fn try_from(entries: Vec<Entry>) -> Result<Self> {
        Self::from_entries(entries)
    }
}

/// Build [`Metadata`] from a list of values of distinct types.
///
/// Each value is wrapped with [`Entry::new`], so its kind is its static type.
/// Expands to a [`Metadata::of`] call and therefore evaluates to a
/// `Result<Metadata>`, failing if two values share a type.
///
/// ```rust
/// use courier::metadata;
///
/// #[derive(Debug)]
/// struct Tenant(&'static str);
///
/// let meta = metadata![Tenant("acme"), 7u16]?;
/// assert_eq!(meta.len(), 2);
/// assert!(metadata![1u8, 2u8].is_err());
/// # Ok::<(), courier::Error>(())
/// ```
#[macro_export]
macro_rules! metadata {
    () => {
        $crate::Metadata::of(::core::iter::empty())
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Metadata::of([$($crate::Entry::new($value)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct TraceId(u64);

    #[derive(Debug, PartialEq)]
    struct Tenant(&'static str);

    #[derive(Debug, PartialEq)]
    struct Priority(u8);

    fn kinds(meta: &Metadata) -> Vec<Kind> {
        meta.kinds().collect()
    }

    #[test]
    fn test_empty_is_shared() {
        let a = Metadata::empty();
        let b = Metadata::default();
        assert!(a.is_empty());
        assert_eq!(a.iter().count(), 0);
        assert!(Metadata::ptr_eq(&a, &b));
    }

    #[test]
    fn test_of_keeps_argument_order() {
        let meta = Metadata::of([Entry::new(Tenant("acme")), Entry::new(TraceId(7))]).unwrap();
        assert_eq!(kinds(&meta), vec![Kind::of::<Tenant>(), Kind::of::<TraceId>()]);
    }

    #[test]
    fn test_of_without_values_is_new_instance() {
        let meta = Metadata::of([]).unwrap();
        assert!(meta.is_empty());
        assert!(!Metadata::ptr_eq(&meta, &Metadata::empty()));
    }

    #[test]
    fn test_of_rejects_duplicate_kind() {
        let err = Metadata::of([
            Entry::new(TraceId(1)),
            Entry::new(Tenant("acme")),
            Entry::new(TraceId(2)),
        ])
        .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("TraceId"));
    }

    #[test]
    fn test_from_entries_empty_returns_shared_instance() {
        let meta = Metadata::from_entries(Vec::new()).unwrap();
        assert!(Metadata::ptr_eq(&meta, &Metadata::empty()));
    }

    #[test]
    fn test_from_entries_rejects_duplicate_kind() {
        let entries = vec![Entry::new(1u8), Entry::new(2u8)];
        assert!(Metadata::from_entries(entries).is_err());
    }

    #[test]
    fn test_with_appends_new_kind() {
        let meta = Metadata::empty().with(Tenant("acme")).with(TraceId(1));
        assert_eq!(kinds(&meta), vec![Kind::of::<Tenant>(), Kind::of::<TraceId>()]);
    }

    #[test]
    fn test_with_replaces_and_moves_to_end() {
        let meta = metadata![TraceId(1), Tenant("acme"), Priority(3)].unwrap();
        let updated = meta.with(TraceId(2));

        assert_eq!(
            kinds(&updated),
            vec![Kind::of::<Tenant>(), Kind::of::<Priority>(), Kind::of::<TraceId>()]
        );
        assert_eq!(updated.get::<TraceId>(), Some(&TraceId(2)));
        assert_eq!(meta.get::<TraceId>(), Some(&TraceId(1)));
    }

    #[test]
    fn test_with_entry_replaces_same_kind() {
        let meta = Metadata::empty()
            .with_entry(Entry::new(TraceId(1)))
            .with_entry(Entry::new(Tenant("acme")))
            .with_entry(Entry::new(TraceId(2)));

        assert_eq!(kinds(&meta), vec![Kind::of::<Tenant>(), Kind::of::<TraceId>()]);
        assert_eq!(meta.get::<TraceId>(), Some(&TraceId(2)));
    }

    #[test]
    fn test_with_built_entry_uses_its_kind() {
        let meta = Metadata::empty()
            .with(Entry::new(TraceId(1)))
            .with(Entry::new(Priority(2)));
        assert_eq!(kinds(&meta), vec![Kind::of::<TraceId>(), Kind::of::<Priority>()]);
        assert!(!meta.contains::<Entry>());

        let built = metadata![Entry::new(Tenant("acme")), TraceId(3)].unwrap();
        assert_eq!(built.get::<Tenant>(), Some(&Tenant("acme")));
        assert!(metadata![Entry::new(TraceId(1)), TraceId(2)].is_err());
    }

    #[test]
    fn test_without_removes_kind() {
        let meta = metadata![TraceId(1), Tenant("acme")].unwrap();
        let updated = meta.without::<TraceId>();
        assert_eq!(kinds(&updated), vec![Kind::of::<Tenant>()]);
        assert_eq!(meta.len(), 2);
    }

    #[test]
    fn test_without_absent_kind_is_new_instance() {
        let meta = metadata![TraceId(1)].unwrap();
        let updated = meta.without::<Tenant>();
        assert_eq!(kinds(&updated), kinds(&meta));
        assert!(!Metadata::ptr_eq(&meta, &updated));
    }

    #[test]
    fn test_copy_has_own_storage() {
        let meta = metadata![TraceId(1), Tenant("acme")].unwrap();
        let copy = meta.copy();
        assert_eq!(kinds(&copy), kinds(&meta));
        assert!(!Metadata::ptr_eq(&meta, &copy));
        assert!(Metadata::ptr_eq(&meta, &meta.clone()));
    }

    #[test]
    fn test_lookup_by_kind() {
        let meta = metadata![TraceId(1), Tenant("acme")].unwrap();
        assert!(meta.contains::<Tenant>());
        assert!(!meta.contains::<Priority>());
        assert_eq!(meta.get_arc::<Tenant>().as_deref(), Some(&Tenant("acme")));
        assert!(meta.entry(Kind::of::<Priority>()).is_none());
    }

    #[test]
    fn test_iteration_is_restartable() {
        let meta = metadata![TraceId(1), Tenant("acme")].unwrap();
        let first: Vec<_> = meta.iter().map(Entry::kind).collect();
        let second: Vec<_> = (&meta).into_iter().map(Entry::kind).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_debug_lists_kinds() {
        let meta = metadata![1u8, "x"].unwrap();
        assert_eq!(format!("{meta:?}"), "[\"u8\", \"&str\"]");
    }
}
