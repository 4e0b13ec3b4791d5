use std::{
    any::Any,
    fmt,
    sync::Arc,
};

use crate::Kind;

/// A single type-erased metadata value together with its [`Kind`].
///
/// Entries are shared, not copied: cloning an entry clones the `Arc` around
/// the value. Stored values should be immutable (or only use interior
/// mutability that is safe to observe from several holders), since the
/// container hands out shared references to them.
///
/// Note that the kind is taken from the static type passed to
/// [`Entry::new`]. Wrapping a value twice (`Entry::new(Arc::new(x))`) yields
/// an entry of kind `Arc<X>`, not `X`; use [`Entry::from_arc`] for values that
/// are already shared.
///
/// Entries never nest: passing an `Entry` to [`Entry::new`] or
/// [`Entry::from_arc`] returns that entry, keeping the kind of its value.
#[derive(Clone)]
pub struct Entry {
    kind: Kind,
    value: Arc<dyn Any + Send + Sync>,
}

impl Entry {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        if let Some(entry) = (&value as &dyn Any).downcast_ref::<Entry>() {
            return entry.clone();
        }
        Self::from_arc(Arc::new(value))
    }

    /// Wrap a value that is already behind an `Arc` without reallocating it.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        if let Some(entry) = (&*value as &dyn Any).downcast_ref::<Entry>() {
            return entry.clone();
        }
        Self {
            kind: Kind::of::<T>(),
            value,
        }
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.kind.is::<T>()
    }

    /// Borrow the value as `T`, if it is of that kind.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.value).downcast_ref::<T>()
    }

    /// Get a shared handle to the value as `T`, if it is of that kind.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Entry").field(&self.kind.name()).finish()
    }
}
