//! Shared values copied lazily on the first write.
//!
//! [`CowValue`] gives a value plain value semantics while sharing its storage:
//! cloning only increments a reference count, reads never copy, and the first
//! write through an owner that shares its storage attaches that owner to a
//! private copy. Other owners never observe the write.
//!
//! The storage is reference counted with an `Arc`, so owners sharing a store
//! may be read from different threads. Writes always go through `&mut self`
//! and only ever touch the writer's own storage.

use std::ops::Deref;
use std::sync::Arc;

/// A value with shared, copy-on-write storage.
///
/// # Example
///
/// ```
/// use sitk_transform::CowValue;
///
/// let a = CowValue::new(vec![1.0, 2.0, 3.0]);
/// let mut b = a.clone();
/// assert!(a.shares_storage(&b));
///
/// b.modify()[0] = 10.0;
/// assert!(!a.shares_storage(&b));
/// assert_eq!(a.read(), &vec![1.0, 2.0, 3.0]);
/// assert_eq!(b.read(), &vec![10.0, 2.0, 3.0]);
/// ```
pub struct CowValue<T> {
    inner: Arc<T>,
}

impl<T> CowValue<T> {
    /// Wraps `value` in new, unshared storage.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Returns a reference to the value. Never copies.
    #[inline]
    pub fn read(&self) -> &T {
        &self.inner
    }

    /// Replaces the value.
    ///
    /// Exclusively owned storage is overwritten in place; shared storage is
    /// left to the other owners and this owner attaches to a new store holding
    /// `value`. The old value is never copied.
    pub fn write(&mut self, value: T) {
        match Arc::get_mut(&mut self.inner) {
            Some(current) => *current = value,
            None => self.inner = Arc::new(value),
        }
    }

    /// Mutable access to the value if the storage is not shared.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        Arc::get_mut(&mut self.inner)
    }

    /// Number of owners sharing the storage, this one included.
    #[inline]
    pub fn use_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Returns true if another owner shares the storage.
    #[inline]
    pub fn is_shared(&self) -> bool {
        self.use_count() > 1
    }

    /// Returns true if both owners share the same storage.
    #[inline]
    pub fn shares_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> CowValue<T> {
    /// Mutable access to the value, copying shared storage first.
    pub fn modify(&mut self) -> &mut T {
        if self.is_shared() {
            log::trace!(
                "copy on write: detaching from storage shared by {} owners",
                self.use_count()
            );
        }
        Arc::make_mut(&mut self.inner)
    }

    /// Returns the value, copying it only if the storage is shared.
    pub fn into_inner(self) -> T {
        Arc::try_unwrap(self.inner).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl<T> Clone for CowValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        // assigning an owner of the same storage must not release it first
        if !self.shares_storage(source) {
            self.inner = Arc::clone(&source.inner);
        }
    }
}

impl<T> Deref for CowValue<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.read()
    }
}

impl<T> From<T> for CowValue<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Default> Default for CowValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: PartialEq> PartialEq for CowValue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shares_storage(other) || self.read() == other.read()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for CowValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CowValue")
            .field("value", self.read())
            .field("use_count", &self.use_count())
            .finish()
    }
}
