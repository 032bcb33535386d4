//! Type-erased drawable values.
//!
//! A [`Shape`] holds anything implementing [`Draw`]. Shapes of different
//! concrete types can be kept in one collection and drawn uniformly:
//!
//! ```
//! use polymorph::{
//!     geometry::{Circle, Square},
//!     prelude::*,
//! };
//!
//! let shapes: Vec<InlineShape> = vec![
//!     InlineShape::new(Circle::new(2.3)),
//!     InlineShape::new(Square::new(1.2)),
//!     InlineShape::new(42),
//! ];
//!
//! let mut out = String::new();
//! draw_all(&shapes, &mut out).unwrap();
//! assert_eq!(out, "circle: radius=2.3\nsquare: side=1.2\ninteger: 42\n");
//! ```

use alloc::vec::Vec;
use core::fmt;

use polymorph_internals::{Operations, RawValueRef};

use crate::{
    Poly,
    markers::Local,
    space::S4,
    storage::{Heap, Inline, Storage},
};

/// Something that can describe itself as text.
///
/// Implementations write to a caller-supplied sink, typically one line per
/// shape.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be drawn",
    label = "`{Self}` does not implement `Draw`",
    note = "only types implementing `Draw` can be stored in a `Shape`"
)]
pub trait Draw {
    /// Writes a description of `self` to `out`.
    fn draw(&self, out: &mut dyn fmt::Write) -> fmt::Result;
}

/// The interface of [`Shape`]: drawing.
#[derive(Clone, Copy)]
pub struct DrawOps {
    /// Draws the payload.
    draw: unsafe fn(RawValueRef<'_, DrawOps>, &mut dyn fmt::Write) -> fmt::Result,
}

// SAFETY: `draw::<V>` only downcasts to `V`.
unsafe impl<V: Draw + Clone + 'static> Operations<V> for DrawOps {
    const OPERATIONS: &'static Self = &DrawOps { draw: draw::<V> };
}

/// Draws the `V` behind `value`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The payload behind `value` is of type `V`.
unsafe fn draw<V: Draw + 'static>(
    value: RawValueRef<'_, DrawOps>,
    out: &mut dyn fmt::Write,
) -> fmt::Result {
    // SAFETY:
    // 1. Guaranteed by the caller
    let value = unsafe { value.downcast_unchecked::<V>() };
    value.draw(out)
}

/// A type-erased value implementing [`Draw`].
pub type Shape<St = Heap, T = Local> = Poly<DrawOps, St, T>;

/// A [`Shape`] that keeps its payload inline, in a buffer shaped like the
/// space `B`.
pub type InlineShape<B = S4, T = Local> = Shape<Inline<B>, T>;

impl<St: Storage, T: 'static> Poly<DrawOps, St, T> {
    /// Draws the payload to `out`.
    pub fn draw(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        let value = self.as_value_ref();
        let operations = value.operations();

        // SAFETY:
        // 1. `operations` was taken from the vtable of `value`, which was
        //    instantiated with the type of the payload behind `value`
        unsafe { (operations.draw)(value, out) }
    }
}

impl<St: Storage, T: 'static> Draw for Poly<DrawOps, St, T> {
    fn draw(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        Poly::draw(self, out)
    }
}

impl<St: Storage, T: 'static> fmt::Display for Poly<DrawOps, St, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.draw(f)
    }
}

impl Draw for i32 {
    fn draw(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "integer: {self}")
    }
}

impl<V: Draw> Draw for [V] {
    fn draw(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        draw_all(self, out)
    }
}

impl<V: Draw> Draw for Vec<V> {
    fn draw(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        draw_all(self, out)
    }
}

/// Draws every shape in order, stopping at the first error.
pub fn draw_all<V: Draw>(shapes: &[V], out: &mut dyn fmt::Write) -> fmt::Result {
    shapes.iter().try_for_each(|shape| shape.draw(out))
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec};

    use super::*;
    use crate::{
        geometry::{Circle, Square},
        markers::SendSync,
        space::S1,
    };

    static_assertions::assert_impl_all!(DrawOps: Send, Sync, Copy);
    static_assertions::assert_impl_all!(Shape<Heap, SendSync>: Draw, fmt::Display, Send, Sync);

    #[test]
    fn test_heterogeneous_drawing() {
        let shapes: Vec<Shape> = vec![
            Shape::new(Circle::new(2.3)),
            Shape::new(Square::new(1.2)),
            Shape::new(Circle::new(4.1)),
            Shape::new(42),
        ];

        let mut out = String::new();
        shapes.draw(&mut out).unwrap();
        assert_eq!(
            out,
            "circle: radius=2.3\nsquare: side=1.2\ncircle: radius=4.1\ninteger: 42\n"
        );
    }

    #[test]
    fn test_nested_shapes() {
        let group: Vec<InlineShape<S1>> = vec![InlineShape::new(1), InlineShape::new(2)];
        let shape: Shape = Shape::new(group);

        let mut out = String::new();
        shape.draw(&mut out).unwrap();
        assert_eq!(out, "integer: 1\ninteger: 2\n");
    }

    #[test]
    fn test_draw_stops_at_first_error() {
        struct Full(usize);

        impl fmt::Write for Full {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                if self.0 < s.len() {
                    return Err(fmt::Error);
                }
                self.0 -= s.len();
                Ok(())
            }
        }

        let shapes: [Shape; 2] = [Shape::new(1), Shape::new(2)];
        let mut out = Full("integer: 1\n".len());
        assert!(draw_all(&shapes, &mut out).is_err());
        assert_eq!(out.0, 0);
    }
}
