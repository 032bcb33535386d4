//! Vtable for type-erased payload operations.
//!
//! This module contains the [`Vtable`] that lets storage types clone, drop and
//! dispatch to a payload whose concrete type `V` has been erased. The vtable
//! stores function pointers that were instantiated with `V`.
//!
//! This module encapsulates the fields of [`Vtable`] so they cannot be accessed
//! directly. This visibility restriction guarantees the safety invariant:
//! **the vtable's type parameter must match the actual payload it is stored
//! next to**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because vtables are created as `&'static`
//! references via [`Vtable::new`], which pairs the function pointers with a
//! specific payload type `V` at compile time.

use core::{alloc::Layout, any::TypeId, ptr::NonNull};

use crate::{operations::Operations, util::Erased};

/// Vtable for type-erased payload operations.
///
/// # Safety Invariant
///
/// The fields `type_id`, `type_name`, `layout`, `drop_in_place` and `clone_to`
/// describe the payload type `V` that was used to create this [`Vtable`], and
/// `operations` is `<O as Operations<V>>::OPERATIONS` for that same `V`.
pub(crate) struct Vtable<O: 'static> {
    /// Gets the [`TypeId`] of the payload type.
    type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the payload type.
    type_name: fn() -> &'static str,
    /// The memory layout of the payload type.
    layout: Layout,
    /// Runs the destructor of the payload pointed to, without freeing memory.
    drop_in_place: unsafe fn(NonNull<Erased>),
    /// Clones the payload behind the first pointer into the uninitialized
    /// memory behind the second pointer.
    clone_to: unsafe fn(NonNull<Erased>, NonNull<Erased>),
    /// The interface's operation table, instantiated with the payload type.
    operations: &'static O,
}

impl<O: 'static> Vtable<O> {
    /// Creates a new [`Vtable`] for the payload type `V`.
    ///
    /// Every call with the same `V` and `O` returns the same static instance.
    pub(crate) const fn new<V>() -> &'static Self
    where
        V: Clone + 'static,
        O: Operations<V>,
    {
        const {
            &Self {
                type_id: TypeId::of::<V>,
                type_name: core::any::type_name::<V>,
                layout: Layout::new::<V>(),
                drop_in_place: drop_in_place::<V>,
                clone_to: clone_to::<V>,
                operations: <O as Operations<V>>::OPERATIONS,
            }
        }
    }

    /// Gets the [`TypeId`] of the payload type that was used to create this
    /// [`Vtable`].
    #[inline]
    pub(crate) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Gets the [`core::any::type_name`] of the payload type that was used to
    /// create this [`Vtable`].
    #[inline]
    pub(crate) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Gets the memory layout of the payload type.
    #[inline]
    pub(crate) fn layout(&self) -> Layout {
        self.layout
    }

    /// Gets the interface's operation table for the payload type.
    #[inline]
    pub(crate) fn operations(&self) -> &'static O {
        self.operations
    }

    /// Runs the destructor of the payload behind `ptr`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized payload of the type this [`Vtable`]
    ///    was created for.
    /// 2. The payload is not used again after this call, other than to release
    ///    its memory.
    #[inline]
    pub(crate) unsafe fn drop_in_place(&self, ptr: NonNull<Erased>) {
        // SAFETY: We know that `self.drop_in_place` points to the function
        // `drop_in_place::<V>` below. That function's safety requirements are
        // upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe {
            (self.drop_in_place)(ptr);
        }
    }

    /// Clones the payload behind `src` into the memory behind `dst`.
    ///
    /// If the payload's `Clone` implementation panics, `dst` is left
    /// uninitialized and `src` is untouched.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `src` points to an initialized payload of the type this [`Vtable`]
    ///    was created for.
    /// 2. `dst` is valid for writes of [`Vtable::layout`] bytes, properly
    ///    aligned, and does not overlap `src`.
    /// 3. Any previous value at `dst` has already been dropped or moved out,
    ///    since it is overwritten without being dropped.
    #[inline]
    pub(crate) unsafe fn clone_to(&self, src: NonNull<Erased>, dst: NonNull<Erased>) {
        // SAFETY: We know that `self.clone_to` points to the function
        // `clone_to::<V>` below. That function's safety requirements are
        // upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        // 3. Guaranteed by the caller
        unsafe {
            (self.clone_to)(src, dst);
        }
    }
}

/// Runs the destructor of the `V` behind `ptr`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `ptr` points to an initialized `V`.
/// 2. The value is not used again after this call.
unsafe fn drop_in_place<V: 'static>(ptr: NonNull<Erased>) {
    let ptr: NonNull<V> = ptr.cast::<V>();
    // SAFETY:
    // 1. Guaranteed by the caller
    // 2. Guaranteed by the caller
    unsafe {
        core::ptr::drop_in_place(ptr.as_ptr());
    }
}

/// Clones the `V` behind `src` and writes the clone to `dst`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `src` points to an initialized `V`.
/// 2. `dst` is valid for writes of a `V`, properly aligned, and does not
///    overlap `src`.
unsafe fn clone_to<V: Clone + 'static>(src: NonNull<Erased>, dst: NonNull<Erased>) {
    // SAFETY:
    // 1. Guaranteed by the caller
    let value: &V = unsafe { src.cast::<V>().as_ref() };
    let value = value.clone();
    // SAFETY:
    // 2. Guaranteed by the caller
    unsafe {
        dst.cast::<V>().write(value);
    }
}
