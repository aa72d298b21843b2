//! Vector and angle helpers shared by every module.
//!
//! Coordinates follow the scene convention: X across the floor, Y up,
//! Z toward the viewer. Headings are yaw angles about +Y where a heading of
//! `0` faces +Z and `π/2` faces +X.

use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// 3D vector in scene space.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const Y: Self = Self {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length_squared(&self) -> f32 {
        self.dot(self)
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance(&self, other: &Self) -> f32 {
        (*self - *other).length()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            *self * (1.0 / len)
        } else {
            Self::ZERO
        }
    }

    /// Component-wise product.
    pub fn scale(&self, by: Vec3) -> Self {
        Self::new(self.x * by.x, self.y * by.y, self.z * by.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl std::ops::AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl std::ops::SubAssign for Vec3 {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Wrap an angle into `(-π, π]`.
pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU {
        a -= TAU;
    }
    if a > PI {
        a -= TAU;
    }
    a
}

/// Shortest signed rotation that takes `from` onto `to`, in `(-π, π]`.
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Unit floor direction `(x, z)` for a heading.
pub fn heading_direction(heading: f32) -> (f32, f32) {
    (heading.sin(), heading.cos())
}

/// Heading that faces along the floor direction `(x, z)`.
pub fn heading_of(x: f32, z: f32) -> f32 {
    normalize_angle(x.atan2(z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_stays_in_half_open_range() {
        for i in -2000..2000 {
            let a = normalize_angle(i as f32 * 0.37);
            assert!(a > -PI && a <= PI, "angle {a} out of range");
        }
    }

    #[test]
    fn normalize_maps_minus_pi_to_pi() {
        assert!((normalize_angle(-PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(PI) - PI).abs() < 1e-5);
    }

    #[test]
    fn delta_takes_short_way_round() {
        let d = angle_delta(170f32.to_radians(), -170f32.to_radians());
        assert!((d - 20f32.to_radians()).abs() < 1e-4, "d={d}");
    }

    #[test]
    fn heading_round_trips_through_direction() {
        let (x, z) = heading_direction(-PI / 2.0);
        assert!((x + 1.0).abs() < 1e-6);
        assert!(z.abs() < 1e-6);
        assert!((heading_of(x, z) + PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn non_finite_angle_collapses_to_zero() {
        assert_eq!(normalize_angle(f32::NAN), 0.0);
        assert_eq!(normalize_angle(f32::INFINITY), 0.0);
    }

    #[test]
    fn normalize_zero_length_vector() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
    }
}
