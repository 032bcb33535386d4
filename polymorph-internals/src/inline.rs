//! Inline storage for type-erased payloads.
//!
//! [`RawInline`] embeds the payload in a buffer that is shaped like the space
//! type `B`: the buffer has the size and alignment of `B`, but `B` itself is
//! never constructed. A payload that does not fit is rejected, either at
//! compile time by [`RawStorage::new`] or at run time by
//! [`RawStorage::try_new`]. The buffer never grows and never spills to the
//! heap.
//!
//! This module encapsulates the fields of [`RawInline`] so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the vtable's type parameter must match the actual payload in
//! the buffer**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because [`RawInline`] values can only be
//! created via [`RawStorage::try_new`] and [`RawStorage::new`], which write the
//! payload and select the vtable from the same payload type, and via
//! [`RawStorage::try_clone`], which clones into a fresh buffer using the vtable
//! of an existing [`RawInline`].

use core::{
    alloc::Layout,
    any::TypeId,
    cell::UnsafeCell,
    marker::PhantomData,
    mem::{ManuallyDrop, MaybeUninit},
    ptr::NonNull,
};

use crate::{
    operations::Operations,
    storage::{RawStorage, StorageError},
    util::Erased,
    value::{RawValueMut, RawValueRef},
    vtable::Vtable,
};

/// Returns whether a `V` fits into the inline buffer of a [`RawInline`] with
/// space type `B`.
///
/// Both the size and the alignment of `V` must be at most those of `B`.
///
/// ```
/// use polymorph_internals::fits_inline;
///
/// assert!(fits_inline::<u32, [usize; 1]>());
/// assert!(fits_inline::<(), [u8; 0]>());
/// assert!(!fits_inline::<[u8; 9], [u8; 8]>());
/// assert!(!fits_inline::<u16, [u8; 2]>());
/// ```
pub const fn fits_inline<V, B>() -> bool {
    size_of::<V>() <= size_of::<B>() && align_of::<V>() <= align_of::<B>()
}

/// A type-erased payload stored in an inline buffer shaped like `B`.
///
/// # Safety Invariant
///
/// The first [`Vtable::layout`] bytes of `buffer` hold an initialized payload
/// of the type `vtable` was created for, and that type fits into `B` as
/// reported by [`fits_inline`].
pub struct RawInline<O: 'static, B> {
    /// The vtable of the payload.
    vtable: &'static Vtable<O>,
    /// The bytes the payload is stored in.
    ///
    /// Wrapped in an [`UnsafeCell`] because payloads with interior mutability
    /// are mutated through shared references to this buffer.
    buffer: UnsafeCell<MaybeUninit<B>>,
    /// Removes the auto traits, since the payload type is unknown.
    _marker: PhantomData<NonNull<Erased>>,
}

impl<O: 'static, B> RawInline<O, B> {
    /// Stores `value` without checking that it fits.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `fits_inline::<V, B>()` returns `true`.
    unsafe fn new_unchecked<V>(value: V) -> Self
    where
        V: Clone + 'static,
        O: Operations<V>,
    {
        debug_assert!(fits_inline::<V, B>());

        let buffer = UnsafeCell::new(MaybeUninit::<B>::uninit());
        let ptr: NonNull<V> = NonNull::from(&buffer).cast::<V>();

        // SAFETY:
        // 1. `buffer` is at least as large and as aligned as `V` (guaranteed
        //    by the caller), and is writable because it is an `UnsafeCell`
        unsafe {
            ptr.write(value);
        }

        Self {
            vtable: Vtable::<O>::new::<V>(),
            buffer,
            _marker: PhantomData,
        }
    }

    /// Returns a pointer to the start of the buffer.
    #[inline]
    fn buffer_ptr(&self) -> NonNull<Erased> {
        NonNull::from(&self.buffer).cast::<Erased>()
    }
}

impl<O: 'static, B> RawStorage<O> for RawInline<O, B> {
    fn new<V>(value: V) -> Self
    where
        V: Clone + 'static,
        O: Operations<V>,
    {
        const {
            assert!(
                fits_inline::<V, B>(),
                "payload too large for inline storage"
            );
        }

        // SAFETY:
        // 1. Checked by the assertion above
        unsafe { Self::new_unchecked(value) }
    }

    fn try_new<V>(value: V) -> Result<Self, StorageError>
    where
        V: Clone + 'static,
        O: Operations<V>,
    {
        if !fits_inline::<V, B>() {
            return Err(StorageError::Capacity {
                payload: Layout::new::<V>(),
                capacity: Layout::new::<B>(),
            });
        }

        // SAFETY:
        // 1. Checked above
        Ok(unsafe { Self::new_unchecked(value) })
    }

    fn try_clone(&self) -> Result<Self, StorageError> {
        let buffer = UnsafeCell::new(MaybeUninit::<B>::uninit());
        let dst = NonNull::from(&buffer).cast::<Erased>();

        // SAFETY:
        // 1. The buffer of `self` holds an initialized payload of the vtable's
        //    type (guaranteed by the safety invariant)
        // 2. `buffer` has the same shape as the buffer of `self`, so it fits
        //    the payload, and it is a separate local
        // 3. `buffer` is uninitialized
        unsafe {
            self.vtable.clone_to(self.buffer_ptr(), dst);
        }

        Ok(Self {
            vtable: self.vtable,
            buffer,
            _marker: PhantomData,
        })
    }

    #[inline]
    fn as_value_ref(&self) -> RawValueRef<'_, O> {
        // SAFETY:
        // 1. Guaranteed by the safety invariant
        // 2. The payload is borrowed through `&self`, so it cannot be mutated
        //    other than through its own interior mutability
        unsafe { RawValueRef::new(self.vtable, self.buffer_ptr()) }
    }

    #[inline]
    fn as_value_mut(&mut self) -> RawValueMut<'_, O> {
        let ptr = NonNull::from(self.buffer.get_mut()).cast::<Erased>();

        // SAFETY:
        // 1. Guaranteed by the safety invariant
        // 2. The payload is borrowed through `&mut self`, so nothing else can
        //    access it
        unsafe { RawValueMut::new(self.vtable, ptr) }
    }

    unsafe fn into_inner_unchecked<V: 'static>(self) -> V {
        debug_assert_eq!(self.vtable.type_id(), TypeId::of::<V>());

        let this = ManuallyDrop::new(self);

        // SAFETY:
        // 1. The buffer holds an initialized `V` (guaranteed by the caller and
        //    the safety invariant)
        // 2. `this` is never dropped, so the payload is not dropped twice
        unsafe { this.buffer_ptr().cast::<V>().read() }
    }
}

impl<O: 'static, B> Drop for RawInline<O, B> {
    fn drop(&mut self) {
        let ptr = NonNull::from(self.buffer.get_mut()).cast::<Erased>();

        // SAFETY:
        // 1. Guaranteed by the safety invariant
        // 2. The payload is never used again
        unsafe {
            self.vtable.drop_in_place(ptr);
        }
    }
}
