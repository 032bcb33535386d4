//! Marker types and traits for defining thread-safety semantics.
//!
//! These markers are used as the last generic parameter of
//! [`Poly<I, St, T>`](crate::Poly) to encode at compile time whether a
//! container may cross thread boundaries.
//!
//! # Design Philosophy
//!
//! The constraints encoded by these markers are enforced at construction time.
//! It is impossible to construct a `Poly<_, _, SendSync>` whose payload is not
//! `Send + Sync`, so you can trust that such a container truly is
//! `Send + Sync`.
//!
//! - [`Local`] (the default): the payload may contain non-thread-safe data such
//!   as `Rc`, and the container is neither `Send` nor `Sync`.
//! - [`SendSync`]: the payload is `Send + Sync`, and so is the container.
//!
//! # Examples
//!
//! ```
//! use std::rc::Rc;
//!
//! use polymorph::{markers::SendSync, prelude::*};
//!
//! // Rc is not Send or Sync, which is fine for the default `Local` marker
//! let counter = Rc::new(5);
//! let local: Function<dyn Fn() -> i32> = Function::new(move || *counter);
//! assert_eq!(local.call(), 5);
//!
//! // A thread-safe function can be sent to another thread
//! let shared: Function<dyn Fn() -> i32, Heap, SendSync> = Function::new(|| 7);
//! let handle = std::thread::spawn(move || shared.call());
//! assert_eq!(handle.join().unwrap(), 7);
//! ```

/// Marker type indicating that a container and its payload are `Send + Sync`.
///
/// Containers using this marker can only be constructed from payloads that are
/// `Send + Sync`. In return the container itself implements [`Send`] and
/// [`Sync`].
///
/// # Examples
///
/// ```
/// use polymorph::{geometry::Circle, markers::SendSync, prelude::*};
///
/// let shape: Shape<Heap, SendSync> = Shape::new(Circle::new(1.0));
///
/// std::thread::spawn(move || {
///     println!("{shape}");
/// })
/// .join()
/// .unwrap();
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct SendSync;

/// Marker type indicating that a container is not `Send` or `Sync`.
///
/// This is the default. It accepts any payload, including ones holding `Rc`,
/// raw pointers or other `!Send` data.
///
/// # Converting to Local
///
/// A thread-safe container can be converted to a local one using
/// [`into_local`](crate::Poly::into_local):
///
/// ```
/// use polymorph::{geometry::Square, markers::SendSync, prelude::*};
///
/// let shape: Shape<Heap, SendSync> = Shape::new(Square::new(2.0));
/// let local: Shape = shape.into_local();
/// assert!(local.is::<Square>());
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Local;

/// Marker trait combining payload and thread-safety requirements.
///
/// # Implementations
///
/// - For `T = Local`: Implemented for all `Sized + 'static` types, regardless
///   of their `Send`/`Sync` status.
/// - For `T = SendSync`: Implemented only for `Sized + 'static` types that are
///   also `Send + Sync`.
///
/// # Enforcement at Construction
///
/// This trait is a bound of [`Poly::new`](crate::Poly::new), so a
/// `Poly<_, _, SendSync>` cannot be built from a payload that is not
/// `Send + Sync`:
///
/// ```compile_fail
/// use std::rc::Rc;
///
/// use polymorph::{markers::SendSync, prelude::*};
///
/// let counter = Rc::new(5);
/// let function: Function<dyn Fn() -> i32, Heap, SendSync> = Function::new(move || *counter);
/// ```
pub trait ObjectMarkerFor<T>: Sized + 'static {}

impl<O: Sized + 'static> ObjectMarkerFor<Local> for O {}

impl<O: Sized + 'static> ObjectMarkerFor<SendSync> for O where O: Send + Sync {}
