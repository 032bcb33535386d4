use alloc::alloc::handle_alloc_error;
use core::{any::TypeId, fmt};

use polymorph_internals::{Operations, RawStorage};

use crate::{
    error::Error,
    markers::{Local, ObjectMarkerFor, SendSync},
    storage::Storage,
};

/// FIXME: Once rust-lang/rust#132922 gets resolved, we can make the `raw` field
/// an unsafe field and remove this module.
mod limit_field_access {
    use core::marker::PhantomData;

    use polymorph_internals::{RawStorage, RawValueMut, RawValueRef};

    use crate::{
        markers::Local,
        storage::{Heap, Storage},
    };

    /// A value-semantic container for any payload satisfying the interface `I`.
    ///
    /// A `Poly` always holds exactly one payload. There is no empty state, and
    /// the dynamic type of the payload only changes when the whole container
    /// is replaced.
    ///
    /// Most code uses one of the aliases instead of naming `Poly` directly:
    /// [`Function`](crate::Function), [`Shape`](crate::Shape) or
    /// [`Movable`](crate::Movable).
    ///
    /// # Type Parameters
    /// - `I`: The interface, a table of operations such as
    ///   [`DrawOps`](crate::shape::DrawOps). A payload `V` is accepted when
    ///   `I: Operations<V>`.
    /// - `St`: The storage strategy, either [`Heap`] or
    ///   [`Inline`](crate::Inline).
    /// - `T`: The thread safety marker, either [`Local`] or
    ///   [`SendSync`](crate::markers::SendSync).
    pub struct Poly<I: 'static, St: Storage = Heap, T: 'static = Local> {
        /// # Safety
        ///
        /// The following safety invariants are guaranteed to be upheld as long
        /// as this struct exists:
        ///
        /// 1. `T` must either be `SendSync` or `Local`.
        /// 2. If `T = SendSync`: The payload embedded in the raw storage must
        ///    be `Send + Sync`.
        raw: St::Raw<I>,
        _thread_safety: PhantomData<T>,
    }

    impl<I: 'static, St: Storage, T: 'static> Poly<I, St, T> {
        /// Creates a new [`Poly`] from raw storage.
        ///
        /// # Safety
        ///
        /// The caller must ensure:
        ///
        /// 1. `T` must either be `SendSync` or `Local`.
        /// 2. If `T = SendSync`: The payload embedded in `raw` must be
        ///    `Send + Sync`.
        #[must_use]
        pub(crate) unsafe fn from_raw(raw: St::Raw<I>) -> Self {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Guaranteed by the caller
            // 2. Guaranteed by the caller
            Poly {
                raw,
                _thread_safety: PhantomData,
            }
        }

        /// Consumes the [`Poly`] and returns the inner raw storage.
        #[must_use]
        pub(crate) fn into_raw(self) -> St::Raw<I> {
            // SAFETY: We are destroying `self`, so we no longer need to uphold
            // any safety invariants.
            self.raw
        }

        /// Returns a reference to the inner raw storage.
        #[must_use]
        pub(crate) fn as_raw(&self) -> &St::Raw<I> {
            &self.raw
        }

        /// Borrows the payload through a type-erased handle.
        ///
        /// The handle gives access to the interface's operation table, which is
        /// how the methods of user-defined interfaces dispatch. See the
        /// [`raw`](crate::raw) module for an example.
        #[must_use]
        pub fn as_value_ref(&self) -> RawValueRef<'_, I> {
            self.raw.as_value_ref()
        }

        /// Mutably borrows the payload through a type-erased handle.
        ///
        /// The handle can mutate the payload, but cannot replace it with a
        /// payload of another type.
        #[must_use]
        pub fn as_value_mut(&mut self) -> RawValueMut<'_, I> {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Upheld as the type parameters do not change.
            // 2. A `RawValueMut` can only mutate the payload in place, so its
            //    type does not change.
            let raw = &mut self.raw;

            raw.as_value_mut()
        }
    }
}
pub use limit_field_access::Poly;

impl<I: 'static, St: Storage, T: 'static> Poly<I, St, T> {
    /// Creates a new container holding `value`.
    ///
    /// The payload must satisfy the interface `I`, and must be `Send + Sync`
    /// when `T` is [`SendSync`]. With [`Inline`](crate::Inline) storage the
    /// payload must also fit into the inline buffer, which is checked at
    /// compile time.
    ///
    /// Allocation failure aborts the process through
    /// [`handle_alloc_error`], like [`Box::new`](alloc::boxed::Box::new).
    /// See [`Poly::try_new`] for a fallible version.
    ///
    /// # Examples
    /// ```
    /// use polymorph::{geometry::Circle, prelude::*};
    ///
    /// let shape: Shape = Shape::new(Circle::new(1.5));
    /// assert_eq!(shape.to_string(), "circle: radius=1.5\n");
    /// ```
    ///
    /// Payloads that do not satisfy the interface are rejected:
    ///
    /// ```compile_fail
    /// use polymorph::prelude::*;
    ///
    /// // `&str` does not implement `Draw`
    /// let shape: Shape = Shape::new("not a shape");
    /// ```
    #[must_use]
    pub fn new<V>(value: V) -> Self
    where
        V: ObjectMarkerFor<T> + Clone,
        I: Operations<V>,
    {
        let raw = <St::Raw<I> as RawStorage<I>>::new(value);

        // SAFETY:
        // 1. `V` is bounded by `ObjectMarkerFor<T>`, and this can only be
        //    implemented for `T=Local` and `T=SendSync`, so this is upheld.
        // 2. If `T=SendSync`, then the bound `V: ObjectMarkerFor<SendSync>`
        //    guarantees that the payload is `Send+Sync`.
        unsafe { Self::from_raw(raw) }
    }

    /// Creates a new container holding `value`, or returns an error if the
    /// payload cannot be stored.
    ///
    /// This fails with [`Error::OutOfMemory`] when the heap allocation fails,
    /// and with [`Error::Capacity`] when the payload does not fit into inline
    /// storage. On error, `value` has been dropped.
    ///
    /// # Examples
    /// ```
    /// use polymorph::{Error, prelude::*, space::S1};
    ///
    /// let result: Result<InlineShape<S1>, Error> = InlineShape::try_new(vec![1, 2, 3]);
    /// assert!(matches!(result, Err(Error::Capacity { .. })));
    ///
    /// let shape: InlineShape<S1> = InlineShape::try_new(42).unwrap();
    /// assert_eq!(shape.to_string(), "integer: 42\n");
    /// ```
    pub fn try_new<V>(value: V) -> Result<Self, Error>
    where
        V: ObjectMarkerFor<T> + Clone,
        I: Operations<V>,
    {
        let raw = <St::Raw<I> as RawStorage<I>>::try_new(value)
            .map_err(|error| Error::from_storage(error, core::any::type_name::<V>()))?;

        // SAFETY:
        // 1. `V` is bounded by `ObjectMarkerFor<T>`, and this can only be
        //    implemented for `T=Local` and `T=SendSync`, so this is upheld.
        // 2. If `T=SendSync`, then the bound `V: ObjectMarkerFor<SendSync>`
        //    guarantees that the payload is `Send+Sync`.
        Ok(unsafe { Self::from_raw(raw) })
    }

    /// Creates a deep copy of the container, or returns an error if memory
    /// for the copy cannot be allocated.
    ///
    /// If the payload's `Clone` implementation panics, nothing is leaked and
    /// `self` is unaffected.
    pub fn try_clone(&self) -> Result<Self, Error> {
        let raw = self
            .as_raw()
            .try_clone()
            .map_err(|error| Error::from_storage(error, self.type_name()))?;

        // SAFETY:
        // 1. Guaranteed by the invariants of this type.
        // 2. The clone has the same payload type as `self`, so this is
        //    guaranteed by the invariants of this type.
        Ok(unsafe { Self::from_raw(raw) })
    }

    /// Replaces the payload with a deep copy of the payload of `source`, or
    /// returns an error if memory for the copy cannot be allocated.
    ///
    /// The copy is made before the old payload is dropped. On error, or if
    /// the payload's `Clone` implementation panics, `self` is unchanged.
    ///
    /// # Examples
    /// ```
    /// use polymorph::{
    ///     geometry::{Circle, Square},
    ///     prelude::*,
    /// };
    ///
    /// let mut a: Shape = Shape::new(Circle::new(1.0));
    /// let b: Shape = Shape::new(Square::new(2.0));
    ///
    /// a.try_clone_from(&b).unwrap();
    /// assert!(a.is::<Square>());
    /// ```
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), Error> {
        *self = source.try_clone()?;
        Ok(())
    }

    /// Returns the [`TypeId`] of the payload.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.as_value_ref().type_id()
    }

    /// Returns the [`core::any::type_name`] of the payload.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.as_value_ref().type_name()
    }

    /// Returns `true` if the payload is of type `V`.
    #[must_use]
    pub fn is<V: 'static>(&self) -> bool {
        self.type_id() == TypeId::of::<V>()
    }

    /// Attempts to downcast the payload to a specific type.
    ///
    /// Returns `Some(&V)` if the payload is of type `V`, otherwise returns
    /// `None`.
    ///
    /// # Examples
    /// ```
    /// use polymorph::{geometry::Circle, prelude::*};
    ///
    /// let shape: Shape = Shape::new(Circle::new(3.0));
    /// assert_eq!(shape.downcast_ref::<Circle>().unwrap().radius, 3.0);
    /// assert!(shape.downcast_ref::<i32>().is_none());
    /// ```
    #[must_use]
    pub fn downcast_ref<V: 'static>(&self) -> Option<&V> {
        self.as_value_ref().downcast::<V>()
    }

    /// Attempts to mutably downcast the payload to a specific type.
    ///
    /// Returns `Some(&mut V)` if the payload is of type `V`, otherwise returns
    /// `None`.
    #[must_use]
    pub fn downcast_mut<V: 'static>(&mut self) -> Option<&mut V> {
        self.as_value_mut().downcast::<V>()
    }

    /// Attempts to move the payload out of the container.
    ///
    /// Returns `Ok(value)` if the payload is of type `V`, otherwise returns
    /// `Err(self)` with the original container.
    ///
    /// # Examples
    /// ```
    /// use polymorph::{geometry::Square, prelude::*};
    ///
    /// let shape: Shape = Shape::new(Square::new(2.0));
    /// let shape = shape.downcast::<i32>().unwrap_err();
    /// let square: Square = shape.downcast().unwrap();
    /// assert_eq!(square.side, 2.0);
    /// ```
    pub fn downcast<V: 'static>(self) -> Result<V, Self> {
        if self.is::<V>() {
            let raw = self.into_raw();

            // SAFETY:
            // 1. We just checked that the payload is of type `V`
            Ok(unsafe { raw.into_inner_unchecked::<V>() })
        } else {
            Err(self)
        }
    }
}

impl<I: 'static, St: Storage> Poly<I, St, SendSync> {
    /// Changes the thread safety mode of the [`Poly`] to [`Local`].
    ///
    /// Calling this method is equivalent to calling `poly.into()`, however
    /// this method has been restricted to only change the thread safety mode
    /// to [`Local`].
    ///
    /// This method does not modify the payload in any way. It only has the
    /// effect of "forgetting" that the payload is [`Send`] and [`Sync`].
    #[must_use]
    pub fn into_local(self) -> Poly<I, St, Local> {
        let raw = self.into_raw();

        // SAFETY:
        // 1. `T=Local`, so this is trivially true.
        // 2. `T=Local`, so this is trivially true.
        unsafe { Poly::from_raw(raw) }
    }
}

impl<I: 'static, St: Storage> From<Poly<I, St, SendSync>> for Poly<I, St, Local> {
    fn from(poly: Poly<I, St, SendSync>) -> Self {
        poly.into_local()
    }
}

impl<I: 'static, St: Storage, T: 'static> Clone for Poly<I, St, T> {
    /// Creates a deep copy of the container.
    ///
    /// Allocation failure aborts the process through [`handle_alloc_error`].
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(clone) => clone,
            Err(error) => handle_alloc_error(error.layout()),
        }
    }

    /// Replaces the payload with a deep copy of the payload of `source`.
    ///
    /// The copy is made before the old payload is dropped, so `self` is
    /// unchanged if the payload's `Clone` implementation panics.
    fn clone_from(&mut self, source: &Self) {
        *self = source.clone();
    }
}

impl<I: 'static, St: Storage, T: 'static> fmt::Debug for Poly<I, St, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poly")
            .field("type_name", &self.type_name())
            .finish_non_exhaustive()
    }
}

// SAFETY: The `SendSync` marker indicates that the payload is `Send`+`Sync`.
// The interface table is shared between threads through a `&'static I`, which
// requires `I: Sync`. Therefore it is safe to implement `Send` for the
// container itself.
unsafe impl<I: Sync + 'static, St: Storage> Send for Poly<I, St, SendSync> {}

// SAFETY: The `SendSync` marker indicates that the payload is `Send`+`Sync`.
// The interface table is shared between threads through a `&'static I`, which
// requires `I: Sync`. Therefore it is safe to implement `Sync` for the
// container itself.
unsafe impl<I: Sync + 'static, St: Storage> Sync for Poly<I, St, SendSync> {}

impl<I: 'static, St: Storage, T: 'static> Unpin for Poly<I, St, T> {}

#[cfg(test)]
mod tests {
    use alloc::{format, rc::Rc, string::ToString, vec::Vec};
    use core::cell::Cell;

    use super::*;
    use crate::{
        Heap, Inline,
        geometry::{Circle, Square},
        shape::{DrawOps, Shape},
        space::S2,
    };

    #[allow(dead_code)]
    struct NonSend(*const ());
    static_assertions::assert_not_impl_any!(NonSend: Send, Sync);

    static_assertions::assert_not_impl_any!(Poly<DrawOps, Heap, Local>: Send, Sync);
    static_assertions::assert_not_impl_any!(Poly<DrawOps, Inline, Local>: Send, Sync);
    static_assertions::assert_impl_all!(Poly<DrawOps, Heap, SendSync>: Send, Sync, Clone, Unpin);
    static_assertions::assert_impl_all!(Poly<DrawOps, Inline, SendSync>: Send, Sync, Clone, Unpin);
    static_assertions::assert_eq_size!(Poly<DrawOps>, [usize; 2]);
    static_assertions::assert_eq_size!(Poly<DrawOps, Inline<S2>>, [usize; 3]);

    #[derive(Clone)]
    struct Counted(Rc<Cell<usize>>);

    impl crate::Draw for Counted {
        fn draw(&self, out: &mut dyn fmt::Write) -> fmt::Result {
            writeln!(out, "counted")
        }
    }

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_downcast() {
        let mut shape: Shape = Shape::new(Circle::new(1.0));

        assert!(shape.is::<Circle>());
        assert!(!shape.is::<Square>());
        assert_eq!(shape.type_id(), TypeId::of::<Circle>());
        assert_eq!(shape.type_name(), core::any::type_name::<Circle>());

        shape.downcast_mut::<Circle>().unwrap().radius = 2.0;
        assert_eq!(shape.downcast_ref::<Circle>().unwrap().radius, 2.0);
        assert!(shape.downcast_mut::<Square>().is_none());

        let shape = shape.downcast::<Square>().unwrap_err();
        assert_eq!(shape.downcast::<Circle>().unwrap().radius, 2.0);
    }

    #[test]
    fn test_downcast_moves_without_dropping() {
        let drops = Rc::new(Cell::new(0));
        let shape: Shape<Inline> = Shape::new(Counted(drops.clone()));

        let counted = shape.downcast::<Counted>().ok().unwrap();
        assert_eq!(drops.get(), 0);
        drop(counted);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn test_clone_from_replaces_payload() {
        let drops = Rc::new(Cell::new(0));
        let mut shape: Shape = Shape::new(Counted(drops.clone()));
        let other: Shape = Shape::new(Square::new(1.0));

        shape.clone_from(&other);
        assert_eq!(drops.get(), 1);
        assert!(shape.is::<Square>());

        shape = shape.clone();
        assert!(shape.is::<Square>());
        assert_eq!(shape.to_string(), "square: side=1\n");
    }

    #[test]
    fn test_into_local() {
        let shape: Shape<Heap, SendSync> = Shape::new(Square::new(3.0));
        let shape: Shape<Heap, Local> = shape.into();
        assert_eq!(shape.downcast_ref::<Square>().unwrap().side, 3.0);
    }

    #[test]
    fn test_debug_shows_payload_type() {
        let shapes: Vec<Shape> = alloc::vec![Shape::new(7)];
        assert_eq!(
            format!("{shapes:?}"),
            "[Poly { type_name: \"i32\", .. }]"
        );
    }
}
