#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Value-semantic type erasure for Rust.
//!
//! ## Overview
//!
//! This crate provides [`Poly`], a single concrete type that can hold *any*
//! value satisfying a capability contract, such as "is callable as
//! `Fn(i32) -> i32`" or "implements [`Draw`]". The stored types do not need to
//! share a common trait object, and the container does not need to know the set
//! of storable types when it is defined.
//!
//! Unlike `Box<dyn Trait>`, a [`Poly`] behaves like a plain value:
//!
//! - **Cloning is deep.** Every clone owns an independent copy of the payload.
//!   Payloads only need to implement [`Clone`]; no `dyn_clone` style helper
//!   trait is required.
//! - **Storage is pluggable.** The payload lives either in its own heap
//!   allocation ([`Heap`]) or inside the container itself ([`Inline`]), without
//!   touching the allocator. Inline storage rejects payloads that do not fit at
//!   compile time.
//! - **Dispatch is hand-written.** Each container carries one pointer to a
//!   `'static` table of function pointers per payload type. The table is built
//!   at compile time and shared by every container holding that type.
//!
//! ## Quick Example
//!
//! ```
//! use polymorph::{
//!     geometry::{Circle, Square},
//!     prelude::*,
//! };
//!
//! let shapes: Vec<Shape> = vec![
//!     Shape::new(Circle::new(2.3)),
//!     Shape::new(Square::new(1.2)),
//!     Shape::new(Circle::new(4.1)),
//!     Shape::new(42),
//! ];
//!
//! let mut out = String::new();
//! shapes.draw(&mut out).unwrap();
//! assert_eq!(
//!     out,
//!     "circle: radius=2.3\nsquare: side=1.2\ncircle: radius=4.1\ninteger: 42\n"
//! );
//! ```
//!
//! ## Provided Families
//!
//! Three families of containers are provided. Each is a type alias for
//! [`Poly`] with a particular interface:
//!
//! - [`Function`]: holds any callable with a given signature, written as
//!   `dyn Fn(A, B) -> R`. Function items, closures, function pointers and
//!   structs implementing [`Callable`] are all accepted.
//! - [`Shape`]: holds anything implementing [`Draw`].
//! - [`Movable`]: holds anything implementing [`Translate`].
//!
//! Each family has an `Inline*` alias using [`Inline`] storage, for example
//! [`InlineFunction`].
//!
//! ```
//! use polymorph::prelude::*;
//!
//! fn foo() -> i32 {
//!     1
//! }
//!
//! let offset = 2;
//! let functions: [Function<dyn Fn() -> i32>; 2] =
//!     [Function::new(foo), Function::new(move || offset + 1)];
//!
//! assert_eq!(functions[0].call(), 1);
//! assert_eq!(functions[1].call(), 3);
//! ```
//!
//! Your own interfaces can be declared on top of the same machinery; see the
//! [`raw`] module.
//!
//! ## Type Parameters
//!
//! [`Poly<I, St, T>`](Poly) is generic over three parameters:
//!
//! - **Interface (`I`)**: the operation table, for example
//!   [`DrawOps`](shape::DrawOps). It decides which payloads are accepted.
//! - **Storage (`St`)**: [`Heap`] (the default) or [`Inline<B>`](Inline),
//!   where the space type `B` from the [`space`] module decides the capacity
//!   and alignment of the inline buffer.
//! - **Thread safety (`T`)**: [`Local`](markers::Local) (the default) or
//!   [`SendSync`](markers::SendSync). A `SendSync` container only accepts
//!   payloads that are `Send + Sync`, and is itself `Send + Sync`.
//!
//! ## Errors and Logging
//!
//! [`Poly::new`] and [`Clone`] treat a failed allocation as fatal, like
//! `Box::new`. The fallible variants [`Poly::try_new`], [`Poly::try_clone`]
//! and [`Poly::try_clone_from`] return an [`Error`] instead, and emit a
//! `tracing` event at the `DEBUG` level describing the failure.
//!
//! ## Features
//!
//! - `std`: enables the `std` features of the `tracing` and `thiserror`
//!   dependencies. The crate itself only requires `alloc`.
//!
//! For implementation details, see the [`polymorph-internals`] crate.
//!
//! [`polymorph-internals`]: polymorph_internals

extern crate alloc;

mod error;
pub mod function;
pub mod geometry;
pub mod markers;
pub mod movable;
mod poly;
pub mod prelude;
pub mod raw;
pub mod shape;
pub mod space;
mod storage;

pub use self::{
    error::Error,
    function::{Callable, Function, InlineFunction},
    movable::{InlineMovable, Movable, Translate},
    poly::Poly,
    shape::{Draw, InlineShape, Shape, draw_all},
    storage::{Heap, Inline, Storage},
};
