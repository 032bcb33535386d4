//! The storage abstraction shared by the heap and inline strategies.

use core::{alloc::Layout, fmt};

use crate::{
    operations::Operations,
    value::{RawValueMut, RawValueRef},
};

/// A strategy for owning a type-erased payload together with its vtable.
///
/// Implemented by [`RawHeap`] and [`RawInline`]. The containers in the
/// `polymorph` crate are generic over this trait, so their behavior does not
/// depend on where the payload lives.
///
/// [`RawHeap`]: crate::RawHeap
/// [`RawInline`]: crate::RawInline
pub trait RawStorage<O: 'static>: Sized {
    /// Stores `value`.
    ///
    /// Failing to acquire memory for the payload is fatal, in the same way it
    /// is for [`alloc::boxed::Box::new`]. Storage strategies with a fixed
    /// capacity reject oversized payloads at compile time.
    fn new<V>(value: V) -> Self
    where
        V: Clone + 'static,
        O: Operations<V>;

    /// Stores `value`, returning an error instead of aborting when memory
    /// cannot be acquired or the payload does not fit.
    ///
    /// On error, `value` has been dropped.
    fn try_new<V>(value: V) -> Result<Self, StorageError>
    where
        V: Clone + 'static,
        O: Operations<V>;

    /// Creates an independent deep copy of the stored payload.
    ///
    /// If the payload's `Clone` implementation panics, no memory is leaked and
    /// `self` is unaffected.
    fn try_clone(&self) -> Result<Self, StorageError>;

    /// Borrows the stored payload.
    fn as_value_ref(&self) -> RawValueRef<'_, O>;

    /// Borrows the stored payload mutably.
    fn as_value_mut(&mut self) -> RawValueMut<'_, O>;

    /// Moves the payload out of the storage, releasing any memory it held.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The payload is of type `V`.
    unsafe fn into_inner_unchecked<V: 'static>(self) -> V;
}

/// The ways storing a payload can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// The global allocator could not provide memory for the payload.
    OutOfMemory {
        /// The layout of the requested allocation.
        layout: Layout,
    },
    /// The payload does not fit into a fixed-capacity buffer.
    Capacity {
        /// The layout of the payload.
        payload: Layout,
        /// The layout of the buffer.
        capacity: Layout,
    },
}

impl StorageError {
    /// Returns the layout of the payload that could not be stored.
    #[inline]
    pub fn layout(&self) -> Layout {
        match *self {
            StorageError::OutOfMemory { layout } => layout,
            StorageError::Capacity { payload, .. } => payload,
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::OutOfMemory { layout } => write!(
                f,
                "failed to allocate {} bytes (align {})",
                layout.size(),
                layout.align()
            ),
            StorageError::Capacity { payload, capacity } => write!(
                f,
                "payload of {} bytes (align {}) does not fit into {} bytes (align {})",
                payload.size(),
                payload.align(),
                capacity.size(),
                capacity.align()
            ),
        }
    }
}

impl core::error::Error for StorageError {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    static_assertions::assert_impl_all!(StorageError: Send, Sync, Copy, core::error::Error);

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::OutOfMemory {
            layout: Layout::new::<[u16; 4]>(),
        };
        assert_eq!(err.to_string(), "failed to allocate 8 bytes (align 2)");
        assert_eq!(err.layout(), Layout::new::<[u16; 4]>());

        let err = StorageError::Capacity {
            payload: Layout::new::<[u32; 4]>(),
            capacity: Layout::new::<[u8; 8]>(),
        };
        assert_eq!(
            err.to_string(),
            "payload of 16 bytes (align 4) does not fit into 8 bytes (align 1)"
        );
        assert_eq!(err.layout(), Layout::new::<[u32; 4]>());
    }
}
