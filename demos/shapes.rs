//! Drawing shapes that share no common base type.
//!
//! This example demonstrates:
//! 1. Storing unrelated types (`Circle`, `Square`, `i32`) in one `Vec<Shape>`
//! 2. Drawing them uniformly, through the same call
//! 3. Inline storage, and what happens when a payload does not fit
//!
//! Run with `RUST_LOG=debug` to see the events emitted on failed
//! constructions.

use polymorph::{
    geometry::{Circle, Square},
    prelude::*,
    space::S2,
};
use rootcause::prelude::*;
use tracing_subscriber::EnvFilter;

/// A shape that is too large for small inline buffers.
#[derive(Clone)]
struct Polygon {
    corners: Vec<(f64, f64)>,
    name: String,
}

impl Draw for Polygon {
    fn draw(&self, out: &mut dyn core::fmt::Write) -> core::fmt::Result {
        writeln!(out, "polygon {}: {} corners", self.name, self.corners.len())
    }
}

/// Every shape lives in its own heap allocation.
fn draw_heap_shapes() -> Result<String, Report> {
    let shapes: Vec<Shape> = vec![
        Shape::new(Circle::new(2.3)),
        Shape::new(Square::new(1.2)),
        Shape::new(Circle::new(4.1)),
        Shape::new(42),
    ];

    let mut out = String::new();
    draw_all(&shapes, &mut out).context("Failed to draw heap shapes")?;
    Ok(out)
}

/// Small shapes fit into the container itself, no allocation needed.
fn draw_inline_shapes() -> Result<String, Report> {
    let shapes: Vec<InlineShape> = vec![
        InlineShape::try_new(Square::new(3.0))?,
        InlineShape::try_new(7)?,
        InlineShape::try_new(Circle::new(0.5))?,
    ];

    let mut out = String::new();
    shapes
        .draw(&mut out)
        .context("Failed to draw inline shapes")?;
    Ok(out)
}

/// A polygon needs six words, a two word buffer is not enough.
fn overflow_inline_shape() -> Result<InlineShape<S2>, Report> {
    let polygon = Polygon {
        corners: vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)],
        name: "square-ish".to_string(),
    };

    let shape = InlineShape::<S2>::try_new(polygon)
        .context("Failed to store polygon inline")
        .attach("Inline capacity: 2 words")?;
    Ok(shape)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Heap Shapes ===\n");
    match draw_heap_shapes() {
        Ok(out) => print!("{out}"),
        Err(report) => println!("{report}"),
    }
    println!();

    println!("=== Inline Shapes ===\n");
    match draw_inline_shapes() {
        Ok(out) => print!("{out}"),
        Err(report) => println!("{report}"),
    }
    println!();

    println!("=== Inline Overflow ===\n");
    match overflow_inline_shape() {
        Ok(shape) => print!("{shape}"),
        Err(report) => println!("{report}"),
    }
}
