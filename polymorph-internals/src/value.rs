//! Borrowed handles to a type-erased payload.
//!
//! [`RawValueRef`] and [`RawValueMut`] are what the storage types hand out when
//! a payload is borrowed, and what interface functions receive as their first
//! argument. A handle always carries the [`Vtable`] that matches the payload it
//! points to.
//!
//! This module encapsulates the fields of both handles so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the vtable's type parameter must match the actual payload
//! behind the pointer**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because handles can only be created through
//! the `unsafe` constructors, which require the caller to provide a matching
//! vtable and pointer.

use core::{alloc::Layout, any::TypeId, marker::PhantomData, ptr::NonNull};

use crate::{util::Erased, vtable::Vtable};

/// A shared borrow of a type-erased payload.
///
/// # Safety Invariant
///
/// `ptr` points to an initialized payload of the type that `vtable` was created
/// for, and that payload is borrowed immutably for `'a`.
pub struct RawValueRef<'a, O: 'static> {
    /// The vtable of the payload.
    vtable: &'static Vtable<O>,
    /// Pointer to the payload.
    ptr: NonNull<Erased>,
    /// Marker tying the handle to the borrow of the payload.
    _marker: PhantomData<&'a Erased>,
}

impl<O: 'static> Clone for RawValueRef<'_, O> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<O: 'static> Copy for RawValueRef<'_, O> {}

impl<'a, O: 'static> RawValueRef<'a, O> {
    /// Creates a new [`RawValueRef`].
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized payload of the type that `vtable` was
    ///    created for.
    /// 2. The payload stays valid and is not mutated for the lifetime `'a`.
    #[inline]
    pub(crate) unsafe fn new(vtable: &'static Vtable<O>, ptr: NonNull<Erased>) -> Self {
        Self {
            vtable,
            ptr,
            _marker: PhantomData,
        }
    }

    /// Returns the vtable of the payload.
    #[inline]
    pub(crate) fn vtable(self) -> &'static Vtable<O> {
        self.vtable
    }

    /// Returns the pointer to the payload.
    #[inline]
    pub(crate) fn as_ptr(self) -> NonNull<Erased> {
        self.ptr
    }

    /// Returns the [`TypeId`] of the payload.
    #[inline]
    pub fn type_id(self) -> TypeId {
        self.vtable.type_id()
    }

    /// Returns the [`core::any::type_name`] of the payload.
    #[inline]
    pub fn type_name(self) -> &'static str {
        self.vtable.type_name()
    }

    /// Returns the memory layout of the payload.
    #[inline]
    pub fn layout(self) -> Layout {
        self.vtable.layout()
    }

    /// Returns the interface's operation table, instantiated with the payload
    /// type.
    #[inline]
    pub fn operations(self) -> &'static O {
        self.vtable.operations()
    }

    /// Casts the payload to a `V`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The payload is of type `V`.
    #[inline]
    pub unsafe fn downcast_unchecked<V: 'static>(self) -> &'a V {
        debug_assert_eq!(self.vtable.type_id(), TypeId::of::<V>());

        let ptr: NonNull<V> = self.ptr.cast::<V>();

        // SAFETY:
        // 1. The pointer is valid and initialized, as it points at a payload
        //    whose type is `V` (guaranteed by the caller), and the payload is
        //    borrowed immutably for `'a` (guaranteed by the safety invariant)
        unsafe { ptr.as_ref() }
    }

    /// Casts the payload to a `V`, if that is its type.
    #[inline]
    pub fn downcast<V: 'static>(self) -> Option<&'a V> {
        if self.type_id() == TypeId::of::<V>() {
            // SAFETY:
            // 1. We just checked that the payload is of type `V`
            Some(unsafe { self.downcast_unchecked::<V>() })
        } else {
            None
        }
    }
}

/// An exclusive borrow of a type-erased payload.
///
/// # Safety Invariant
///
/// `ptr` points to an initialized payload of the type that `vtable` was created
/// for, and that payload is borrowed mutably for `'a`.
pub struct RawValueMut<'a, O: 'static> {
    /// The vtable of the payload.
    vtable: &'static Vtable<O>,
    /// Pointer to the payload.
    ptr: NonNull<Erased>,
    /// Marker tying the handle to the exclusive borrow of the payload.
    _marker: PhantomData<&'a mut Erased>,
}

impl<'a, O: 'static> RawValueMut<'a, O> {
    /// Creates a new [`RawValueMut`].
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized payload of the type that `vtable` was
    ///    created for.
    /// 2. Nothing else accesses the payload for the lifetime `'a`.
    #[inline]
    pub(crate) unsafe fn new(vtable: &'static Vtable<O>, ptr: NonNull<Erased>) -> Self {
        Self {
            vtable,
            ptr,
            _marker: PhantomData,
        }
    }

    /// Reborrows the handle with a shorter lifetime.
    #[inline]
    pub fn reborrow(&mut self) -> RawValueMut<'_, O> {
        RawValueMut {
            vtable: self.vtable,
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }

    /// Returns a shared handle to the payload, borrowed from this one.
    #[inline]
    pub fn as_ref(&self) -> RawValueRef<'_, O> {
        // SAFETY:
        // 1. Guaranteed by the safety invariant of `self`
        // 2. The payload cannot be mutated while `self` is borrowed
        unsafe { RawValueRef::new(self.vtable, self.ptr) }
    }

    /// Converts the handle into a shared handle for the full lifetime `'a`.
    #[inline]
    pub fn into_ref(self) -> RawValueRef<'a, O> {
        // SAFETY:
        // 1. Guaranteed by the safety invariant of `self`
        // 2. `self` is consumed, so the exclusive borrow becomes a shared one
        unsafe { RawValueRef::new(self.vtable, self.ptr) }
    }

    /// Returns the [`TypeId`] of the payload.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.vtable.type_id()
    }

    /// Returns the [`core::any::type_name`] of the payload.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.vtable.type_name()
    }

    /// Returns the interface's operation table, instantiated with the payload
    /// type.
    #[inline]
    pub fn operations(&self) -> &'static O {
        self.vtable.operations()
    }

    /// Casts the payload to a `V`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The payload is of type `V`.
    #[inline]
    pub unsafe fn downcast_unchecked<V: 'static>(self) -> &'a mut V {
        debug_assert_eq!(self.vtable.type_id(), TypeId::of::<V>());

        let mut ptr: NonNull<V> = self.ptr.cast::<V>();

        // SAFETY:
        // 1. The pointer is valid and initialized, as it points at a payload
        //    whose type is `V` (guaranteed by the caller), and the payload is
        //    borrowed exclusively for `'a` (guaranteed by the safety invariant)
        unsafe { ptr.as_mut() }
    }

    /// Casts the payload to a `V`, if that is its type.
    #[inline]
    pub fn downcast<V: 'static>(self) -> Option<&'a mut V> {
        if self.type_id() == TypeId::of::<V>() {
            // SAFETY:
            // 1. We just checked that the payload is of type `V`
            Some(unsafe { self.downcast_unchecked::<V>() })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec::Vec};

    use super::*;
    use crate::{Operations, RawHeap, RawStorage};

    struct NoOps;

    // SAFETY: The table is empty.
    unsafe impl<V: 'static> Operations<V> for NoOps {
        const OPERATIONS: &'static Self = &NoOps;
    }

    #[test]
    fn test_value_ref_downcast() {
        let storage = RawHeap::<NoOps>::new(String::from("hello"));
        let value = storage.as_value_ref();

        assert_eq!(value.type_id(), TypeId::of::<String>());
        assert_eq!(value.type_name(), core::any::type_name::<String>());
        assert_eq!(value.layout(), Layout::new::<String>());
        assert_eq!(value.downcast::<String>().map(String::as_str), Some("hello"));
        assert!(value.downcast::<i32>().is_none());
    }

    #[test]
    fn test_value_mut_downcast() {
        let mut storage = RawHeap::<NoOps>::new(Vec::<u8>::new());

        let mut value = storage.as_value_mut();
        assert!(value.reborrow().downcast::<String>().is_none());
        value.reborrow().downcast::<Vec<u8>>().unwrap().push(7);
        assert_eq!(value.as_ref().downcast::<Vec<u8>>().unwrap(), &[7]);

        let value = storage.as_value_ref();
        assert_eq!(value.downcast::<Vec<u8>>().unwrap().len(), 1);
    }

    #[test]
    fn test_value_ref_is_copy() {
        let storage = RawHeap::<NoOps>::new(5_u64);
        let value = storage.as_value_ref();
        let copy = value;

        assert_eq!(value.downcast::<u64>(), Some(&5));
        assert_eq!(copy.downcast::<u64>(), Some(&5));
        assert!(core::ptr::eq(value.operations(), copy.operations()));
    }
}
