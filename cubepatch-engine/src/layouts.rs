//! Preset cube arrangements for demos, benches, and the CLI.
//!
//! A layout is only a list of placements; feed it to
//! [`Session::add_cube`](crate::session::Session::add_cube) to populate a session.

use core::f32::consts::TAU;
use core::fmt;

use cubepatch_core::math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cubes::CubeKind;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Layout {
    /// Oscillator, filter, output all within reach of each other.
    Triangle,
    /// A straight line along X.
    Chain { count: usize, spacing: f32 },
    /// Evenly spaced on a circle in the XZ plane.
    Ring { count: usize, radius: f32 },
    /// Uniform in a cube of side `extent` centred at the origin, reproducible by seed.
    Scatter { count: usize, extent: f32, seed: u64 },
}

impl Layout {
    pub const NAMES: [&'static str; 4] = ["triangle", "chain", "ring", "scatter"];

    /// Layout by name with reasonable spacing for `count` cubes.
    #[must_use]
    pub fn parse(name: &str, count: usize, seed: u64) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "triangle" => Some(Self::Triangle),
            "chain" => Some(Self::Chain { count, spacing: 2.0 }),
            "ring" => Some(Self::Ring { count, radius: ring_radius(count) }),
            "scatter" => Some(Self::Scatter {
                count,
                extent: scatter_extent(count),
                seed,
            }),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Triangle => "triangle",
            Self::Chain { .. } => "chain",
            Self::Ring { .. } => "ring",
            Self::Scatter { .. } => "scatter",
        }
    }

    /// Kinds cycle oscillator, filter, gain, output except for `Triangle`.
    #[must_use]
    pub fn placements(&self) -> Vec<(CubeKind, Vec3)> {
        match *self {
            Self::Triangle => vec![
                (CubeKind::Oscillator, Vec3::ZERO),
                (CubeKind::Filter, Vec3::new(1.0, 0.0, 0.0)),
                (CubeKind::Output, Vec3::new(1.5, 0.0, 0.0)),
            ],
            Self::Chain { count, spacing } => (0..count)
                .map(|i| (kind_at(i), Vec3::new(i as f32 * spacing, 0.0, 0.0)))
                .collect(),
            Self::Ring { count, radius } => (0..count)
                .map(|i| {
                    let a = TAU * i as f32 / count.max(1) as f32;
                    (kind_at(i), Vec3::new(radius * a.cos(), 0.0, radius * a.sin()))
                })
                .collect(),
            Self::Scatter { count, extent, seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                let half = extent.abs() * 0.5;
                (0..count)
                    .map(|i| {
                        let mut axis = || if half > 0.0 { rng.gen_range(-half..half) } else { 0.0 };
                        (kind_at(i), Vec3::new(axis(), axis(), axis()))
                    })
                    .collect()
            }
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn kind_at(i: usize) -> CubeKind {
    CubeKind::ALL[i % CubeKind::ALL.len()]
}

/// Neighbours on the ring sit ~2 units apart.
fn ring_radius(count: usize) -> f32 {
    (count.max(3) as f32 * 2.0) / TAU
}

/// Roughly one cube per 8 cubic units.
fn scatter_extent(count: usize) -> f32 {
    (count.max(1) as f32 * 8.0).cbrt()
}
