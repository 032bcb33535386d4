//! Storage strategies for [`Poly`](crate::Poly).

use core::{fmt, marker::PhantomData};

use polymorph_internals::{RawHeap, RawInline, RawStorage};

use crate::space::S4;

mod sealed_storage {
    use super::*;

    pub trait Sealed: 'static {}

    impl Sealed for Heap {}
    impl<B: 'static> Sealed for Inline<B> {}
}

/// Marker trait for the storage strategies [`Heap`] and [`Inline`].
///
/// The strategy decides where a [`Poly`](crate::Poly) keeps its payload. It
/// has no influence on the observable behavior of the container: clones are
/// always deep, and the payload is always dropped exactly once.
///
/// This trait is sealed and cannot be implemented outside of this crate.
pub trait Storage: sealed_storage::Sealed {
    /// The raw storage type used for the interface `I`.
    #[doc(hidden)]
    type Raw<I: 'static>: RawStorage<I>;
}

/// Stores the payload in its own heap allocation.
///
/// Any payload size is accepted. Moving the container never moves the payload.
/// Zero-sized payloads do not allocate.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Heap;

impl Storage for Heap {
    type Raw<I: 'static> = RawHeap<I>;
}

/// Stores the payload inside the container, in a buffer with the size and
/// alignment of the space type `B`.
///
/// Creating a container never touches the allocator, but the payload must fit.
/// [`Poly::new`](crate::Poly::new) rejects oversized payloads at compile time:
///
/// ```compile_fail
/// use polymorph::{InlineShape, space::S1};
///
/// // A `Vec` is three words, the space only one
/// let shape: InlineShape<S1> = InlineShape::new(vec![1, 2, 3]);
/// ```
///
/// [`Poly::try_new`](crate::Poly::try_new) reports the same problem as an
/// [`Error::Capacity`](crate::Error::Capacity) instead.
///
/// See the [`space`](crate::space) module for the provided spaces.
pub struct Inline<B = S4>(PhantomData<fn() -> B>);

impl<B: 'static> Storage for Inline<B> {
    type Raw<I: 'static> = RawInline<I, B>;
}

impl<B> Clone for Inline<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for Inline<B> {}

impl<B> Default for Inline<B> {
    fn default() -> Self {
        Inline(PhantomData)
    }
}

impl<B> fmt::Debug for Inline<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Inline<{}>", core::any::type_name::<B>())
    }
}
