//! Moving values through space without moving their copies.
//!
//! This example demonstrates:
//! 1. Translating a heterogeneous collection through one call
//! 2. Clones owning their own payload, for heap and inline storage alike
//! 3. Recovering the concrete type with `downcast_ref`

use polymorph::{
    Storage,
    geometry::{Circle, Square, Vector3D},
    prelude::*,
};
use rootcause::prelude::*;
use tracing_subscriber::EnvFilter;

/// Reads the center of a circle or a square.
fn center_of<St: Storage>(item: &Movable<St>) -> Result<Vector3D, Report> {
    if let Some(circle) = item.downcast_ref::<Circle>() {
        Ok(circle.center)
    } else if let Some(square) = item.downcast_ref::<Square>() {
        Ok(square.center)
    } else {
        bail!("Unexpected payload: {}", item.type_name())
    }
}

fn print_centers<St: Storage>(label: &str, items: &[Movable<St>]) -> Result<(), Report> {
    for item in items {
        let center = center_of(item).context("Failed to read a center")?;
        println!(
            "{label}: {:<30} at ({}, {}, {})",
            item.type_name(),
            center.x,
            center.y,
            center.z
        );
    }
    Ok(())
}

fn translate_heap() -> Result<(), Report> {
    let mut items: Vec<Movable> = vec![
        Movable::new(Circle::new(1.0)),
        Movable::new(Square::new(2.0)),
    ];
    let copies = items.clone();

    items.translate(&Vector3D::new(1.0, 2.0, 3.0));

    print_centers("moved", &items)?;
    print_centers("copy ", &copies)?;
    Ok(())
}

fn translate_inline() -> Result<(), Report> {
    let mut items: Vec<InlineMovable> = vec![
        InlineMovable::try_new(Circle::new(1.0))?,
        InlineMovable::try_new(Square::new(2.0))?,
    ];
    let copies = items.clone();

    for _ in 0..3 {
        items.translate(&Vector3D::new(0.0, 0.0, -1.0));
    }

    print_centers("moved", &items)?;
    print_centers("copy ", &copies)?;
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Heap Storage ===\n");
    if let Err(report) = translate_heap() {
        println!("{report}");
    }
    println!();

    println!("=== Inline Storage ===\n");
    if let Err(report) = translate_inline() {
        println!("{report}");
    }
}
