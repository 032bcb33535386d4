//! Building blocks for user-defined interfaces.
//!
//! The provided families ([`Function`](crate::Function),
//! [`Shape`](crate::Shape) and [`Movable`](crate::Movable)) are ordinary
//! users of the items in this module. An interface is a struct of `unsafe fn`
//! pointers, one per operation, each taking a [`RawValueRef`] or
//! [`RawValueMut`] as its first argument. Implementing [`Operations<V>`] for
//! it states which payloads `V` are accepted, and provides the table
//! instantiated with `V`.
//!
//! A [`Poly`](crate::Poly) hands out handles to its payload through
//! [`Poly::as_value_ref`](crate::Poly::as_value_ref) and
//! [`Poly::as_value_mut`](crate::Poly::as_value_mut). The operation table
//! reached through a handle always matches the payload behind that same
//! handle, which is what makes calling the function pointers sound.
//!
//! # Examples
//!
//! ```
//! use polymorph::{
//!     Heap, Inline, Poly, Storage,
//!     raw::{Operations, RawValueMut, RawValueRef},
//! };
//!
//! trait Counter {
//!     fn get(&self) -> u64;
//!     fn bump(&mut self);
//! }
//!
//! #[derive(Clone, Default)]
//! struct ByOne(u64);
//!
//! impl Counter for ByOne {
//!     fn get(&self) -> u64 {
//!         self.0
//!     }
//!
//!     fn bump(&mut self) {
//!         self.0 += 1;
//!     }
//! }
//!
//! #[derive(Clone, Default)]
//! struct ByTen(u64);
//!
//! impl Counter for ByTen {
//!     fn get(&self) -> u64 {
//!         self.0
//!     }
//!
//!     fn bump(&mut self) {
//!         self.0 += 10;
//!     }
//! }
//!
//! struct CounterOps {
//!     get: unsafe fn(RawValueRef<'_, CounterOps>) -> u64,
//!     bump: unsafe fn(RawValueMut<'_, CounterOps>),
//! }
//!
//! // SAFETY: `get::<V>` and `bump::<V>` only downcast to `V`.
//! unsafe impl<V: Counter + Clone + 'static> Operations<V> for CounterOps {
//!     const OPERATIONS: &'static Self = &CounterOps {
//!         get: get::<V>,
//!         bump: bump::<V>,
//!     };
//! }
//!
//! /// # Safety
//! ///
//! /// The payload behind `value` must be of type `V`.
//! unsafe fn get<V: Counter + 'static>(value: RawValueRef<'_, CounterOps>) -> u64 {
//!     // SAFETY: Guaranteed by the caller
//!     unsafe { value.downcast_unchecked::<V>() }.get()
//! }
//!
//! /// # Safety
//! ///
//! /// The payload behind `value` must be of type `V`.
//! unsafe fn bump<V: Counter + 'static>(value: RawValueMut<'_, CounterOps>) {
//!     // SAFETY: Guaranteed by the caller
//!     unsafe { value.downcast_unchecked::<V>() }.bump();
//! }
//!
//! trait CounterExt {
//!     fn get(&self) -> u64;
//!     fn bump(&mut self);
//! }
//!
//! impl<St: Storage> CounterExt for Poly<CounterOps, St> {
//!     fn get(&self) -> u64 {
//!         let value = self.as_value_ref();
//!         // SAFETY: The table was taken from the same handle
//!         unsafe { (value.operations().get)(value) }
//!     }
//!
//!     fn bump(&mut self) {
//!         let mut value = self.as_value_mut();
//!         let operations = value.operations();
//!         // SAFETY: The table was taken from the same handle
//!         unsafe { (operations.bump)(value.reborrow()) }
//!     }
//! }
//!
//! let mut counters: Vec<Poly<CounterOps, Inline>> =
//!     vec![Poly::new(ByOne::default()), Poly::new(ByTen::default())];
//! let copy = counters.clone();
//!
//! for counter in &mut counters {
//!     counter.bump();
//!     counter.bump();
//! }
//!
//! let totals: Vec<u64> = counters.iter().map(|c| c.get()).collect();
//! assert_eq!(totals, [2, 20]);
//! assert!(copy.iter().all(|c| c.get() == 0));
//!
//! let boxed: Poly<CounterOps, Heap> = Poly::new(ByTen(5));
//! assert_eq!(boxed.get(), 5);
//! ```
//!
//! [`Operations`] is an `unsafe` trait. Handing the table of one payload type
//! to another requires an `unsafe impl`, so safe code cannot reach a drawing
//! routine that reads the wrong type:
//!
//! ```compile_fail,E0200
//! use polymorph::{geometry::Circle, prelude::*, raw::Operations, shape::DrawOps};
//!
//! #[derive(Clone)]
//! struct Text(String);
//!
//! impl Operations<Text> for DrawOps {
//!     const OPERATIONS: &'static Self = <DrawOps as Operations<Circle>>::OPERATIONS;
//! }
//!
//! let shape = Shape::new(Text(String::from("not a circle")));
//! println!("{shape}");
//! ```

pub use polymorph_internals::{Operations, RawValueMut, RawValueRef, fits_inline};
