//! Demo geometry: a 3D vector and two shapes.
//!
//! [`Circle`] and [`Square`] implement both [`Draw`] and [`Translate`], so
//! they can be stored in a [`Shape`](crate::Shape) as well as in a
//! [`Movable`](crate::Movable).

use core::{
    fmt,
    ops::{Add, AddAssign},
};

use crate::{movable::Translate, shape::Draw};

/// A vector in three-dimensional space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3D {
    /// The x coordinate.
    pub x: f64,
    /// The y coordinate.
    pub y: f64,
    /// The z coordinate.
    pub z: f64,
}

impl Vector3D {
    /// Creates a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Add for Vector3D {
    type Output = Vector3D;

    fn add(self, rhs: Vector3D) -> Vector3D {
        Vector3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign<&Vector3D> for Vector3D {
    fn add_assign(&mut self, rhs: &Vector3D) {
        *self = *self + *rhs;
    }
}

impl AddAssign for Vector3D {
    fn add_assign(&mut self, rhs: Vector3D) {
        *self += &rhs;
    }
}

/// A circle, drawn as `circle: radius=<radius>`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Circle {
    /// The radius.
    pub radius: f64,
    /// The center.
    pub center: Vector3D,
}

impl Circle {
    /// Creates a circle with the given radius, centered at the origin.
    #[must_use]
    pub const fn new(radius: f64) -> Self {
        Self {
            radius,
            center: Vector3D::new(0.0, 0.0, 0.0),
        }
    }
}

impl Draw for Circle {
    fn draw(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "circle: radius={}", self.radius)
    }
}

impl Translate for Circle {
    fn translate(&mut self, offset: &Vector3D) {
        self.center += offset;
    }
}

/// A square, drawn as `square: side=<side>`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Square {
    /// The length of each side.
    pub side: f64,
    /// The center.
    pub center: Vector3D,
}

impl Square {
    /// Creates a square with the given side length, centered at the origin.
    #[must_use]
    pub const fn new(side: f64) -> Self {
        Self {
            side,
            center: Vector3D::new(0.0, 0.0, 0.0),
        }
    }
}

impl Draw for Square {
    fn draw(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "square: side={}", self.side)
    }
}

impl Translate for Square {
    fn translate(&mut self, offset: &Vector3D) {
        self.center += offset;
    }
}
