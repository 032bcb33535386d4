//! Space types that decide the capacity of [`Inline`](crate::Inline) storage.
//!
//! A space type is never constructed. Inline storage only borrows its size and
//! alignment: a payload `V` fits into `Inline<B>` when
//! `size_of::<V>() <= size_of::<B>()` and `align_of::<V>() <= align_of::<B>()`.
//! Any `'static` type can be used as a space, but the types in this module
//! cover the common cases.
//!
//! | Space | Capacity | Alignment |
//! | --- | --- | --- |
//! | [`S1`] | 1 word | word |
//! | [`S2`] | 2 words | word |
//! | [`S4`] | 4 words | word |
//! | [`S8`] | 8 words | word |
//! | [`S16`] | 16 words | word |
//! | [`Align16<B>`] | size of `B`, rounded up to 16 | 16 |
//! | [`Align32<B>`] | size of `B`, rounded up to 32 | 32 |
//!
//! ```
//! use polymorph::{
//!     InlineShape,
//!     space::{Align32, S2},
//! };
//!
//! #[derive(Clone)]
//! #[repr(align(32))]
//! struct Wide(u8);
//!
//! impl polymorph::Draw for Wide {
//!     fn draw(&self, out: &mut dyn core::fmt::Write) -> core::fmt::Result {
//!         writeln!(out, "wide: {}", self.0)
//!     }
//! }
//!
//! let shape: InlineShape<Align32<S2>> = InlineShape::new(Wide(1));
//! assert_eq!(shape.to_string(), "wide: 1\n");
//! ```

/// One machine word of inline capacity.
pub type S1 = [usize; 1];

/// Two machine words of inline capacity.
pub type S2 = [usize; 2];

/// Four machine words of inline capacity. This is the default space.
pub type S4 = [usize; 4];

/// Eight machine words of inline capacity.
pub type S8 = [usize; 8];

/// Sixteen machine words of inline capacity.
pub type S16 = [usize; 16];

/// Raises the alignment of the space `B` to 16 bytes.
#[derive(Clone, Copy, Debug)]
#[repr(C, align(16))]
pub struct Align16<B>(B);

/// Raises the alignment of the space `B` to 32 bytes.
#[derive(Clone, Copy, Debug)]
#[repr(C, align(32))]
pub struct Align32<B>(B);

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_eq_size!(S4, [u8; 4 * size_of::<usize>()]);
    static_assertions::assert_eq_align!(S4, usize);
    static_assertions::assert_eq_size!(Align16<[u8; 1]>, [u8; 16]);
    static_assertions::assert_eq_size!(Align32<S4>, [u8; 32]);
    static_assertions::const_assert_eq!(align_of::<Align16<S1>>(), 16);
    static_assertions::const_assert_eq!(align_of::<Align32<S16>>(), 32);
}
