//! Type-erased callables with value semantics.
//!
//! A [`Function<S>`](Function) holds any callable with the signature `S`,
//! written as a trait object type such as `dyn Fn(i32, i32) -> i32`. The
//! signature only names the argument and return types. The container itself is
//! not a trait object: it owns a clone of the callable, and cloning the
//! container clones the callable.
//!
//! Every type implementing [`Fn`] with a matching argument list is
//! [`Callable`], so function items, closures and function pointers are
//! accepted directly. The result of the callable only needs to be convertible
//! into the declared return type:
//!
//! ```
//! use polymorph::prelude::*;
//!
//! fn half(x: i32) -> i32 {
//!     x / 2
//! }
//!
//! // `u8` converts into `i64`
//! let small: Function<dyn Fn(i32) -> i64> = Function::new(|x: i32| x as u8);
//! let half: Function<dyn Fn(i32) -> i64> = Function::new(half);
//!
//! assert_eq!(small.call(300), 44);
//! assert_eq!(half.call(300), 150);
//! ```
//!
//! Structs can implement [`Callable`] themselves:
//!
//! ```
//! use polymorph::prelude::*;
//!
//! #[derive(Clone)]
//! struct Multiply(i32);
//!
//! impl Callable<(i32,)> for Multiply {
//!     type Output = i32;
//!
//!     fn call(&self, (x,): (i32,)) -> i32 {
//!         self.0 * x
//!     }
//! }
//!
//! let triple: Function<dyn Fn(i32) -> i32> = Function::new(Multiply(3));
//! assert_eq!(triple.call(5), 15);
//! ```
//!
//! Callables with the wrong signature are rejected at compile time:
//!
//! ```compile_fail
//! use polymorph::prelude::*;
//!
//! let f: Function<dyn Fn(i32) -> i32> = Function::new(|x: String| x.len());
//! ```
//!
//! Callables are called through `&self`, so closures that mutate their state
//! ([`FnMut`]) are not accepted either. Signatures with up to six arguments
//! are supported. Arguments and the return type must be `'static`.
//!
//! [`Poly::new`] sees the signature only through [`Callable`], so a closure
//! passed to it needs annotated parameters, and an integer literal it returns
//! is typed `i32`. `from_fn` bounds the closure by the signature's `Fn` type
//! instead, which lets both be inferred. The signature has to be named in the
//! path:
//!
//! ```
//! use polymorph::prelude::*;
//!
//! let next = Function::<dyn Fn(u64) -> u64>::from_fn(|x| x + 1);
//! let answer = InlineFunction::<dyn Fn() -> u64>::from_fn(|| 42);
//!
//! assert_eq!(next.call(u64::MAX - 1), u64::MAX);
//! assert_eq!(answer.call(), 42);
//! ```

use polymorph_internals::{Operations, RawValueRef};

use crate::{
    Poly,
    error::Error,
    markers::{Local, ObjectMarkerFor},
    space::S4,
    storage::{Heap, Inline, Storage},
};

/// A value that can be called with the argument tuple `Args`.
///
/// This is implemented for every type implementing [`Fn`] with a matching
/// argument list, for arities zero through six. Implement it for your own
/// types to make them storable in a [`Function`] without going through a
/// closure.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be called with the arguments `{Args}`",
    label = "expected a callable taking `{Args}`",
    note = "closures must implement `Fn`, not just `FnMut` or `FnOnce`"
)]
pub trait Callable<Args> {
    /// The type returned by the call.
    type Output;

    /// Calls the value with the given arguments.
    fn call(&self, args: Args) -> Self::Output;
}

/// A call signature, written as `dyn Fn(A0, A1, ..) -> R`.
///
/// This is only used to name the argument and return types of a [`Function`].
/// It is implemented for `dyn Fn` types with zero through six arguments.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a supported call signature",
    note = "signatures are written as `dyn Fn(A0, A1, ..) -> R` with up to six `'static` arguments"
)]
pub trait Signature {
    /// The arguments, as a tuple.
    type Args: 'static;
    /// The return type.
    type Output: 'static;
}

/// The interface of [`Function`]: calling with the signature `S`.
pub struct CallOps<S: ?Sized + Signature + 'static> {
    /// Calls the payload.
    call: unsafe fn(RawValueRef<'_, CallOps<S>>, S::Args) -> S::Output,
}

// SAFETY: `call::<S, V>` only downcasts to `V`.
unsafe impl<S, V> Operations<V> for CallOps<S>
where
    S: ?Sized + Signature + 'static,
    V: Callable<S::Args> + Clone + 'static,
    V::Output: Into<S::Output>,
{
    const OPERATIONS: &'static Self = &CallOps {
        call: call::<S, V>,
    };
}

/// Calls the `V` behind `value` and converts the result.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The payload behind `value` is of type `V`.
unsafe fn call<S, V>(value: RawValueRef<'_, CallOps<S>>, args: S::Args) -> S::Output
where
    S: ?Sized + Signature + 'static,
    V: Callable<S::Args> + 'static,
    V::Output: Into<S::Output>,
{
    // SAFETY:
    // 1. Guaranteed by the caller
    let value = unsafe { value.downcast_unchecked::<V>() };
    value.call(args).into()
}

/// A type-erased callable with the signature `S`.
///
/// See the [module documentation](self) for details.
///
/// # Examples
/// ```
/// use polymorph::prelude::*;
///
/// let add: Function<dyn Fn(i32, i32) -> i32> = Function::new(|a: i32, b: i32| a + b);
/// let copy = add.clone();
/// assert_eq!(copy.call(2, 3), 5);
/// ```
pub type Function<S, St = Heap, T = Local> = Poly<CallOps<S>, St, T>;

/// A [`Function`] that keeps the callable inline, in a buffer shaped like the
/// space `B`.
///
/// # Examples
/// ```
/// use polymorph::{prelude::*, space::S1};
///
/// let base = 10;
/// let add: InlineFunction<dyn Fn(i32) -> i32, S1> = InlineFunction::new(move |x: i32| base + x);
/// assert_eq!(add.call(5), 15);
/// ```
pub type InlineFunction<S, B = S4, T = Local> = Function<S, Inline<B>, T>;

impl<S, St, T> Poly<CallOps<S>, St, T>
where
    S: ?Sized + Signature + 'static,
    St: Storage,
    T: 'static,
{
    /// Calls the payload with the arguments as a tuple.
    fn call_with(&self, args: S::Args) -> S::Output {
        let value = self.as_value_ref();
        let operations = value.operations();

        // SAFETY:
        // 1. `operations` was taken from the vtable of `value`, which was
        //    instantiated with the type of the payload behind `value`
        unsafe { (operations.call)(value, args) }
    }
}

impl<S, St, T> Callable<S::Args> for Poly<CallOps<S>, St, T>
where
    S: ?Sized + Signature + 'static,
    St: Storage,
    T: 'static,
{
    type Output = S::Output;

    fn call(&self, args: S::Args) -> S::Output {
        self.call_with(args)
    }
}

macro_rules! impl_arity {
    ($($arg:ident: $ty:ident),*) => {
        impl<F, R, $($ty),*> Callable<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> R,
        {
            type Output = R;

            #[inline]
            fn call(&self, ($($arg,)*): ($($ty,)*)) -> R {
                self($($arg),*)
            }
        }

        impl<R: 'static, $($ty: 'static),*> Signature for dyn Fn($($ty),*) -> R {
            type Args = ($($ty,)*);
            type Output = R;
        }

        impl<St: Storage, T: 'static, R: 'static, $($ty: 'static),*>
            Poly<CallOps<dyn Fn($($ty),*) -> R>, St, T>
        {
            /// Calls the stored callable.
            #[inline]
            pub fn call(&self, $($arg: $ty),*) -> R {
                self.call_with(($($arg,)*))
            }

            /// Creates a container holding the closure or function `f`.
            ///
            /// Unlike [`Poly::new`], the signature reaches `f` as an `Fn`
            /// bound, so closure parameter types and integer literals in
            /// the result are inferred from it.
            #[must_use]
            pub fn from_fn<F>(f: F) -> Self
            where
                F: Fn($($ty),*) -> R + ObjectMarkerFor<T> + Clone,
            {
                Self::new(f)
            }

            /// Like [`from_fn`](Self::from_fn), but returns an error if the
            /// closure cannot be stored.
            pub fn try_from_fn<F>(f: F) -> Result<Self, Error>
            where
                F: Fn($($ty),*) -> R + ObjectMarkerFor<T> + Clone,
            {
                Self::try_new(f)
            }
        }
    };
}

impl_arity!();
impl_arity!(a0: A0);
impl_arity!(a0: A0, a1: A1);
impl_arity!(a0: A0, a1: A1, a2: A2);
impl_arity!(a0: A0, a1: A1, a2: A2, a3: A3);
impl_arity!(a0: A0, a1: A1, a2: A2, a3: A3, a4: A4);
impl_arity!(a0: A0, a1: A1, a2: A2, a3: A3, a4: A4, a5: A5);
