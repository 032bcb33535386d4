#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`polymorph`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased storage and the unsafe
//! operations that power the [`polymorph`] value containers. A payload of any
//! concrete type `V` is stored behind a hand-written vtable, so that the owning
//! container can clone, drop and dispatch to it without knowing `V`.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on the [`polymorph`] crate,
//! not this one.
//!
//! # Architecture
//!
//! - [`Vtable`]: one `'static` table per payload type and interface. It holds
//!   the payload's [`TypeId`], name and [`Layout`], the function pointers
//!   needed to clone and drop it, and a pointer to the interface's own
//!   operation table.
//! - [`Operations`]: implemented by an interface (a struct of function
//!   pointers) for every payload type that satisfies it. This is where the
//!   capability contract of a container lives.
//! - Storage strategies, both implementing [`RawStorage`]:
//!   - [`RawHeap`]: the payload lives in its own heap allocation.
//!   - [`RawInline`]: the payload lives inside a fixed-size buffer embedded in
//!     the owner.
//! - [`RawValueRef`] / [`RawValueMut`]: borrowed handles to a stored payload.
//!   They always carry the vtable that matches the payload, which is what the
//!   interface functions receive.
//!
//! # Safety Strategy
//!
//! Erasing `V` means the pointer to the payload no longer says what it points
//! to. Everything stays sound because the pointer and its vtable are created
//! together and never separated:
//!
//! - **Module-based encapsulation**: the fields of the storage types and
//!   handles are private to their module, so the pairing of pointer and vtable
//!   is locally verifiable.
//! - **Compile-time vtables**: vtables are promoted to `'static` inside a
//!   `const` block, instantiated with the exact payload type.
//! - **Documented contracts**: each unsafe function spells out when it may be
//!   called.
//!
//! [`polymorph`]: https://docs.rs/polymorph/latest/polymorph/
//! [`Vtable`]: vtable::Vtable
//! [`TypeId`]: core::any::TypeId
//! [`Layout`]: core::alloc::Layout

extern crate alloc;

mod heap;
mod inline;
mod operations;
mod storage;
mod util;
mod value;
mod vtable;

pub use heap::RawHeap;
pub use inline::{RawInline, fits_inline};
pub use operations::Operations;
pub use storage::{RawStorage, StorageError};
pub use value::{RawValueMut, RawValueRef};
