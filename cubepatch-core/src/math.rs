//! Vector math and backend selection.
//!
//! Design goals:
//! - `no_std` ready (guarded by the crate features `no-std` / `micromath`)
//! - One place that decides where `floor`/`sqrt` come from
//! - Plain `Copy` vector type; no SIMD, no generics
//!
//! Conventions:
//! - Positions are `f32` world units, like the host renderer.
//! - Distance comparisons go through squared distance where possible.

use cfg_if::cfg_if;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // micromath preferred if explicitly requested (works in no_std)
    if #[cfg(feature = "micromath")] {
        use micromath::F32Ext as _;
        #[inline] pub(crate) fn m_floor(x: f32) -> f32 { x.floor() }
        #[inline] pub(crate) fn m_sqrt(x: f32) -> f32 { x.sqrt() }
        #[inline] pub(crate) fn m_ceil(x: f32) -> f32 { x.ceil() }
    // libm (C math) in no_std
    } else if #[cfg(feature = "no-std")] {
        #[inline] pub(crate) fn m_floor(x: f32) -> f32 { libm::floorf(x) }
        #[inline] pub(crate) fn m_sqrt(x: f32) -> f32 { libm::sqrtf(x) }
        #[inline] pub(crate) fn m_ceil(x: f32) -> f32 { libm::ceilf(x) }
    // std backend
    } else {
        #[inline] pub(crate) fn m_floor(x: f32) -> f32 { x.floor() }
        #[inline] pub(crate) fn m_sqrt(x: f32) -> f32 { x.sqrt() }
        #[inline] pub(crate) fn m_ceil(x: f32) -> f32 { x.ceil() }
    }
}

// ---------------------------------- Vec3 -----------------------------------------

/// A point (or offset) in 3D world space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// True when no component is NaN or infinite.
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[inline]
    #[must_use]
    pub fn distance_sq(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Straight-line (Euclidean) distance.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        m_sqrt(self.distance_sq(other))
    }

    #[inline]
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32, dz: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl From<[f32; 3]> for Vec3 {
    #[inline]
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<(f32, f32, f32)> for Vec3 {
    #[inline]
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self::new(x, y, z)
    }
}

impl core::ops::Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl core::ops::Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

// ---------------------------------- Tests ----------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_matches_pythagoras() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 0.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
        assert!((a.distance_sq(b) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn finite_check_catches_nan_and_inf() {
        assert!(Vec3::new(1.0, -2.0, 3.5).is_finite());
        assert!(!Vec3::new(f32::NAN, 0.0, 0.0).is_finite());
        assert!(!Vec3::new(0.0, f32::INFINITY, 0.0).is_finite());
        assert!(!Vec3::new(0.0, 0.0, f32::NEG_INFINITY).is_finite());
    }

    #[test]
    fn floor_rounds_toward_negative_infinity() {
        assert_eq!(m_floor(-0.5), -1.0);
        assert_eq!(m_floor(2.999), 2.0);
        assert_eq!(m_floor(-3.0), -3.0);
        assert_eq!(m_ceil(0.8333), 1.0);
    }
}
