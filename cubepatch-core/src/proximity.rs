//! Pairwise distance test against a fixed threshold.

use crate::math::Vec3;
use crate::spatial::Placed;

/// Strict "closer than `threshold`" relation. Symmetric, side-effect free.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Proximity {
    threshold: f32,
}

impl Proximity {
    #[inline]
    #[must_use]
    pub const fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    #[inline]
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// True iff the straight-line distance is strictly below the threshold.
    /// NaN distances compare false; callers validate positions beforehand.
    #[inline]
    #[must_use]
    pub fn is_proximal(&self, a: Vec3, b: Vec3) -> bool {
        a.distance(b) < self.threshold
    }

    #[inline]
    #[must_use]
    pub fn check<E: Placed>(&self, a: &E, b: &E) -> bool {
        self.is_proximal(a.position(), b.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_exclusive() {
        let p = Proximity::new(2.5);
        assert!(p.is_proximal(Vec3::ZERO, Vec3::new(2.49, 0.0, 0.0)));
        assert!(!p.is_proximal(Vec3::ZERO, Vec3::new(2.5, 0.0, 0.0)));
        assert!(!p.is_proximal(Vec3::ZERO, Vec3::new(1.5, 2.0, 0.0)));
    }

    #[test]
    fn relation_is_symmetric() {
        let p = Proximity::new(2.5);
        let points = [
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(10.0, 10.0, 10.0),
            Vec3::new(-1.2, 0.7, 1.1),
            Vec3::new(1.5, 0.0, 0.0),
        ];
        for a in points {
            for b in points {
                assert_eq!(p.is_proximal(a, b), p.is_proximal(b, a), "{a:?} {b:?}");
            }
        }
    }

    #[test]
    fn checks_placed_entities() {
        let p = Proximity::new(2.5);
        let a = ("a", Vec3::ZERO);
        let b = ("b", Vec3::new(0.0, 0.0, 2.0));
        assert!(p.check(&a, &b));
        assert!(p.check(&b, &a));
    }
}
