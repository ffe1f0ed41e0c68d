//! Tuning parameters for the connection engine.

use num_traits::ToPrimitive;
use tracing::warn;

use crate::error::ConfigError;
use crate::math::m_ceil;

/// Default grid cell edge, in world units.
pub const DEFAULT_CELL_SIZE: f32 = 3.0;

/// Default connection distance, in world units.
pub const DEFAULT_THRESHOLD: f32 = 2.5;

/// Grid cell size and proximity threshold, supplied at construction.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProximityConfig {
    pub cell_size: f32,
    pub threshold: f32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ProximityConfig {
    /// Build and validate in one go.
    ///
    /// # Errors
    /// Either value is non-finite or not strictly positive.
    pub fn new(cell_size: f32, threshold: f32) -> Result<Self, ConfigError> {
        let cfg = Self { cell_size, threshold };
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    /// Either value is non-finite or not strictly positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if self.cell_size < self.threshold {
            warn!(
                cell_size = self.cell_size,
                threshold = self.threshold,
                "cell size below proximity threshold; widening neighbourhood scan"
            );
        }
        Ok(())
    }

    /// Cells to scan on each side of an entity's own cell.
    ///
    /// One while `cell_size >= threshold`, i.e. the 3×3×3 block; larger when
    /// cells are smaller than the threshold so that no proximal pair is missed.
    #[must_use]
    pub fn reach(&self) -> i32 {
        m_ceil(self.threshold / self.cell_size)
            .to_i32()
            .unwrap_or(i32::MAX)
            .max(1)
    }
}
