use std::f64::consts::PI;
use crate::shapes::{Shape, Unit};

/// A circle.
pub struct Circle {
    pub radius: f64,
    center: (f64, f64),
}

pub enum Fill {
    Solid,
    Hollow,
}

pub fn area(circle: &Circle) -> f64 {
    let r = circle.radius;
    std::f64::consts::PI * r * r
}

fn scale(factor: f64) -> f64 {
    factor * PI
}
