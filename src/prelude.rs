//! Commonly used items for convenient importing.
//!
//! The prelude re-exports the container aliases, the capability traits and the
//! storage strategies, so that a single use statement is enough for most code.
//!
//! # Usage
//!
//! ```rust
//! use polymorph::prelude::*;
//!
//! let greet: Function<dyn Fn(&'static str) -> String> =
//!     Function::new(|name: &'static str| format!("hello {name}"));
//! assert_eq!(greet.call("world"), "hello world");
//! ```
//!
//! # What's Included
//!
//! - **[`Poly`]**, and the aliases **[`Function`]**, **[`Shape`]** and
//!   **[`Movable`]** with their `Inline*` variants
//! - **[`Callable`]**, **[`Draw`]** and **[`Translate`]**: the capability
//!   traits, needed to call their methods on containers
//! - **[`Heap`]** and **[`Inline`]**: the storage strategies
//! - **[`draw_all`]**: drawing a slice of shapes

pub use crate::{
    Callable, Draw, Function, Heap, Inline, InlineFunction, InlineMovable, InlineShape, Movable,
    Poly, Shape, Translate, draw_all,
};
