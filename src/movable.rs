//! Type-erased values that can be moved through space.
//!
//! A [`Movable`] holds anything implementing [`Translate`]. Translating a
//! container only moves its own payload, never the payload of a clone:
//!
//! ```
//! use polymorph::{
//!     geometry::{Circle, Vector3D},
//!     prelude::*,
//! };
//!
//! let mut original: InlineMovable = InlineMovable::new(Circle::new(1.0));
//! let copy = original.clone();
//!
//! original.translate(&Vector3D::new(1.0, 2.0, 3.0));
//!
//! let moved = original.downcast_ref::<Circle>().unwrap();
//! let unmoved = copy.downcast_ref::<Circle>().unwrap();
//! assert_eq!(moved.center, Vector3D::new(1.0, 2.0, 3.0));
//! assert_eq!(unmoved.center, Vector3D::default());
//! ```

use alloc::vec::Vec;

use polymorph_internals::{Operations, RawValueMut};

use crate::{
    Poly,
    geometry::Vector3D,
    markers::Local,
    space::S4,
    storage::{Heap, Inline, Storage},
};

/// Something that can be moved by an offset.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be translated",
    label = "`{Self}` does not implement `Translate`",
    note = "only types implementing `Translate` can be stored in a `Movable`"
)]
pub trait Translate {
    /// Moves `self` by `offset`.
    fn translate(&mut self, offset: &Vector3D);
}

/// The interface of [`Movable`]: translating.
#[derive(Clone, Copy)]
pub struct TranslateOps {
    /// Translates the payload.
    translate: unsafe fn(RawValueMut<'_, TranslateOps>, &Vector3D),
}

// SAFETY: `translate::<V>` only downcasts to `V`.
unsafe impl<V: Translate + Clone + 'static> Operations<V> for TranslateOps {
    const OPERATIONS: &'static Self = &TranslateOps {
        translate: translate::<V>,
    };
}

/// Translates the `V` behind `value`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The payload behind `value` is of type `V`.
unsafe fn translate<V: Translate + 'static>(
    value: RawValueMut<'_, TranslateOps>,
    offset: &Vector3D,
) {
    // SAFETY:
    // 1. Guaranteed by the caller
    let value = unsafe { value.downcast_unchecked::<V>() };
    value.translate(offset);
}

/// A type-erased value implementing [`Translate`].
pub type Movable<St = Heap, T = Local> = Poly<TranslateOps, St, T>;

/// A [`Movable`] that keeps its payload inline, in a buffer shaped like the
/// space `B`.
pub type InlineMovable<B = S4, T = Local> = Movable<Inline<B>, T>;

impl<St: Storage, T: 'static> Poly<TranslateOps, St, T> {
    /// Moves the payload by `offset`.
    pub fn translate(&mut self, offset: &Vector3D) {
        let mut value = self.as_value_mut();
        let operations = value.operations();

        // SAFETY:
        // 1. `operations` was taken from the vtable of `value`, which was
        //    instantiated with the type of the payload behind `value`
        unsafe { (operations.translate)(value.reborrow(), offset) }
    }
}

impl<St: Storage, T: 'static> Translate for Poly<TranslateOps, St, T> {
    fn translate(&mut self, offset: &Vector3D) {
        Poly::translate(self, offset);
    }
}

impl<V: Translate> Translate for [V] {
    fn translate(&mut self, offset: &Vector3D) {
        self.iter_mut().for_each(|item| item.translate(offset));
    }
}

impl<V: Translate> Translate for Vec<V> {
    fn translate(&mut self, offset: &Vector3D) {
        self.as_mut_slice().translate(offset);
    }
}
