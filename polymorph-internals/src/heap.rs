//! Heap storage for type-erased payloads.
//!
//! [`RawHeap`] owns a payload in its own allocation from the global allocator,
//! together with the [`Vtable`] that describes it. Zero-sized payloads do not
//! allocate.
//!
//! This module encapsulates the fields of [`RawHeap`] so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the vtable's type parameter must match the actual payload in
//! the allocation**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because [`RawHeap`] values can only be created
//! via [`RawStorage::try_new`], which creates the vtable and the allocation
//! from the same payload type, and via [`RawStorage::try_clone`], which copies
//! the vtable of an existing [`RawHeap`].

use alloc::alloc::{alloc, dealloc, handle_alloc_error};
use core::{alloc::Layout, any::TypeId, mem::ManuallyDrop, ptr::NonNull};

use crate::{
    operations::Operations,
    storage::{RawStorage, StorageError},
    util::Erased,
    value::{RawValueMut, RawValueRef},
    vtable::Vtable,
};

/// A type-erased payload in its own heap allocation.
///
/// # Safety Invariant
///
/// `ptr` points to an initialized payload of the type `vtable` was created
/// for. The allocation was made with the global allocator using
/// [`Vtable::layout`], unless that layout has a size of zero, in which case
/// `ptr` is dangling and properly aligned.
pub struct RawHeap<O: 'static> {
    /// The vtable of the payload.
    vtable: &'static Vtable<O>,
    /// Pointer to the payload.
    ptr: NonNull<Erased>,
}

impl<O: 'static> RawStorage<O> for RawHeap<O> {
    fn new<V>(value: V) -> Self
    where
        V: Clone + 'static,
        O: Operations<V>,
    {
        match Self::try_new(value) {
            Ok(storage) => storage,
            Err(err) => handle_alloc_error(err.layout()),
        }
    }

    fn try_new<V>(value: V) -> Result<Self, StorageError>
    where
        V: Clone + 'static,
        O: Operations<V>,
    {
        let vtable = Vtable::<O>::new::<V>();
        let ptr = allocate(Layout::new::<V>())?;

        // SAFETY:
        // 1. `ptr` was allocated with the layout of `V`, so it is valid for
        //    writes of a `V` and properly aligned
        unsafe {
            ptr.cast::<V>().write(value);
        }

        Ok(Self { vtable, ptr })
    }

    fn try_clone(&self) -> Result<Self, StorageError> {
        let layout = self.vtable.layout();
        let ptr = allocate(layout)?;
        let guard = Deallocate { ptr, layout };

        // SAFETY:
        // 1. `self.ptr` points to an initialized payload of the vtable's type
        //    (guaranteed by the safety invariant)
        // 2. `ptr` was just allocated with the payload's layout, so it is valid
        //    for writes, aligned, and does not overlap `self.ptr`
        // 3. `ptr` is freshly allocated and holds no value
        unsafe {
            self.vtable.clone_to(self.ptr, ptr);
        }

        core::mem::forget(guard);
        Ok(Self {
            vtable: self.vtable,
            ptr,
        })
    }

    #[inline]
    fn as_value_ref(&self) -> RawValueRef<'_, O> {
        // SAFETY:
        // 1. Guaranteed by the safety invariant
        // 2. The payload is borrowed through `&self`, so it cannot be mutated
        unsafe { RawValueRef::new(self.vtable, self.ptr) }
    }

    #[inline]
    fn as_value_mut(&mut self) -> RawValueMut<'_, O> {
        // SAFETY:
        // 1. Guaranteed by the safety invariant
        // 2. The payload is borrowed through `&mut self`, so nothing else can
        //    access it
        unsafe { RawValueMut::new(self.vtable, self.ptr) }
    }

    unsafe fn into_inner_unchecked<V: 'static>(self) -> V {
        debug_assert_eq!(self.vtable.type_id(), TypeId::of::<V>());

        let this = ManuallyDrop::new(self);
        let _guard = Deallocate {
            ptr: this.ptr,
            layout: this.vtable.layout(),
        };

        // SAFETY:
        // 1. The payload is an initialized `V` (guaranteed by the caller and
        //    the safety invariant)
        // 2. `this` is never dropped, so the payload is not dropped twice
        unsafe { this.ptr.cast::<V>().read() }
    }
}

impl<O: 'static> Drop for RawHeap<O> {
    fn drop(&mut self) {
        let _guard = Deallocate {
            ptr: self.ptr,
            layout: self.vtable.layout(),
        };

        // SAFETY:
        // 1. Guaranteed by the safety invariant
        // 2. The payload is never used again, the guard only releases memory
        unsafe {
            self.vtable.drop_in_place(self.ptr);
        }
    }
}

/// Allocates memory for `layout`.
///
/// Zero-sized layouts get a dangling, properly aligned pointer instead of an
/// allocation.
fn allocate(layout: Layout) -> Result<NonNull<Erased>, StorageError> {
    if layout.size() == 0 {
        let ptr = core::ptr::without_provenance_mut::<Erased>(layout.align());
        // SAFETY: The alignment of a layout is never zero
        return Ok(unsafe { NonNull::new_unchecked(ptr) });
    }

    // SAFETY: `layout` has a non-zero size
    let ptr = unsafe { alloc(layout) };
    NonNull::new(ptr.cast::<Erased>()).ok_or(StorageError::OutOfMemory { layout })
}

/// Releases memory obtained from [`allocate`] when dropped.
///
/// Used to free the allocation of a payload while its `Clone` or `Drop`
/// implementation runs, so that a panic does not leak memory.
struct Deallocate {
    /// The pointer returned by [`allocate`].
    ptr: NonNull<Erased>,
    /// The layout passed to [`allocate`].
    layout: Layout,
}

impl Drop for Deallocate {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            // SAFETY: `ptr` was returned by `alloc` for this exact `layout`
            unsafe {
                dealloc(self.ptr.as_ptr().cast::<u8>(), self.layout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{rc::Rc, string::String};
    use core::cell::Cell;

    use super::*;

    struct NoOps;

    // SAFETY: The table is empty.
    unsafe impl<V: 'static> Operations<V> for NoOps {
        const OPERATIONS: &'static Self = &NoOps;
    }

    #[derive(Clone)]
    struct CountDrops(Rc<Cell<usize>>);

    impl Drop for CountDrops {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_heap_drops_once() {
        let drops = Rc::new(Cell::new(0));
        let storage = RawHeap::<NoOps>::new(CountDrops(drops.clone()));
        let clone = storage.try_clone().unwrap();

        drop(storage);
        assert_eq!(drops.get(), 1);
        drop(clone);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn test_heap_clone_is_independent() {
        let mut storage = RawHeap::<NoOps>::new(String::from("a"));
        let clone = storage.try_clone().unwrap();

        storage
            .as_value_mut()
            .downcast::<String>()
            .unwrap()
            .push('b');

        assert_eq!(storage.as_value_ref().downcast::<String>().unwrap(), "ab");
        assert_eq!(clone.as_value_ref().downcast::<String>().unwrap(), "a");
        assert_ne!(
            storage.as_value_ref().as_ptr(),
            clone.as_value_ref().as_ptr()
        );
    }

    #[test]
    fn test_heap_zero_sized() {
        #[derive(Clone, Copy, Debug, PartialEq)]
        #[repr(align(64))]
        struct Empty;

        let storage = RawHeap::<NoOps>::new(Empty);
        let clone = storage.try_clone().unwrap();

        let ptr = clone.as_value_ref().as_ptr();
        assert_eq!(ptr.as_ptr().addr() % 64, 0);
        assert_eq!(clone.as_value_ref().downcast::<Empty>(), Some(&Empty));
    }

    #[test]
    fn test_heap_into_inner() {
        let drops = Rc::new(Cell::new(0));
        let storage = RawHeap::<NoOps>::new(CountDrops(drops.clone()));

        // SAFETY: The payload is a `CountDrops`
        let value = unsafe { storage.into_inner_unchecked::<CountDrops>() };
        assert_eq!(drops.get(), 0);
        drop(value);
        assert_eq!(drops.get(), 1);
    }
}
