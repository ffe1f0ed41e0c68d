//! Cube types and their audio parameters.
//!
//! A cube is a positioned audio-processing unit. Its kind fixes which ports
//! it has and which parameters it understands; its rotation about Y is the
//! performer's "knob".
//!
//! Contents:
//! - `CubeKind`    : Oscillator / Filter / Gain / Output, with port layout
//! - `CubeId`      : stable, ordered identifier (`cube-N`)
//! - `Transform`   : position, rotation, scale
//! - `AudioParam`  : closed set of typed parameters (no string-keyed bags)
//! - `CubeParams`  : per-kind parameter block with defaults and mapping
//! - `Cube`        : everything the store keeps per cube
//!
//! Notes:
//! - Frequencies are **Hz**, levels are linear gain.
//! - Mapping from rotation is deliberately simple; hosts can `apply` exact values.

use core::fmt;

use cubepatch_core::math::Vec3;
use cubepatch_core::spatial::Placed;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a cube does in the signal chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CubeKind {
    Oscillator,
    Filter,
    Gain,
    Output,
}

impl CubeKind {
    pub const ALL: [CubeKind; 4] = [Self::Oscillator, Self::Filter, Self::Gain, Self::Output];

    /// Accepts signal from other cubes.
    #[inline]
    #[must_use]
    pub fn has_input(self) -> bool {
        !matches!(self, Self::Oscillator)
    }

    /// Sends signal to other cubes.
    #[inline]
    #[must_use]
    pub fn has_output(self) -> bool {
        !matches!(self, Self::Output)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Oscillator => "oscillator",
            Self::Filter => "filter",
            Self::Gain => "gain",
            Self::Output => "output",
        }
    }

    /// Numeric code used across the C ABI.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }
}

impl fmt::Display for CubeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifier handed out by the cube store. Ordered numerically.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubeId(pub u64);

impl fmt::Display for CubeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cube-{}", self.0)
    }
}

/// Placement of a cube on the table.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles, radians.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

/// Tag for [`AudioParam`], used in errors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Frequency,
    Cutoff,
    Level,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Frequency => "frequency",
            Self::Cutoff => "cutoff",
            Self::Level => "level",
        })
    }
}

/// A recognised audio parameter with its value.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "param", content = "value", rename_all = "lowercase")]
pub enum AudioParam {
    /// Oscillator pitch, Hz.
    Frequency(f32),
    /// Low-pass corner, Hz.
    Cutoff(f32),
    /// Linear gain.
    Level(f32),
}

impl AudioParam {
    #[must_use]
    pub fn kind(self) -> ParamKind {
        match self {
            Self::Frequency(_) => ParamKind::Frequency,
            Self::Cutoff(_) => ParamKind::Cutoff,
            Self::Level(_) => ParamKind::Level,
        }
    }
}

/// Parameter a cube kind does not understand, or a bad value.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ParamError {
    #[error("{kind} cubes have no {param} parameter")]
    Unsupported { kind: CubeKind, param: ParamKind },
    #[error("{param} must be finite and non-negative, got {value}")]
    OutOfRange { param: ParamKind, value: f32 },
}

pub const OSC_BASE_HZ: f32 = 220.0;
pub const OSC_HZ_PER_RAD: f32 = 100.0;
pub const OSC_DEFAULT_LEVEL: f32 = 0.2;
pub const FILTER_BASE_HZ: f32 = 1000.0;
pub const FILTER_HZ_PER_RAD: f32 = 500.0;
pub const FILTER_MIN_HZ: f32 = 100.0;
pub const FILTER_MAX_HZ: f32 = 5000.0;
pub const OUTPUT_BASE_LEVEL: f32 = 0.5;
pub const LEVEL_PER_RAD: f32 = 0.1;

/// Parameter block, one shape per cube kind.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CubeParams {
    Oscillator { frequency_hz: f32, level: f32 },
    Filter { cutoff_hz: f32 },
    Gain { level: f32 },
    Output { level: f32 },
}

impl CubeParams {
    /// Defaults for a freshly created cube.
    #[must_use]
    pub fn defaults(kind: CubeKind) -> Self {
        match kind {
            CubeKind::Oscillator => Self::Oscillator {
                frequency_hz: OSC_BASE_HZ,
                level: OSC_DEFAULT_LEVEL,
            },
            CubeKind::Filter => Self::Filter { cutoff_hz: FILTER_BASE_HZ },
            CubeKind::Gain => Self::Gain { level: 1.0 },
            CubeKind::Output => Self::Output { level: OUTPUT_BASE_LEVEL },
        }
    }

    #[must_use]
    pub fn kind(&self) -> CubeKind {
        match self {
            Self::Oscillator { .. } => CubeKind::Oscillator,
            Self::Filter { .. } => CubeKind::Filter,
            Self::Gain { .. } => CubeKind::Gain,
            Self::Output { .. } => CubeKind::Output,
        }
    }

    /// Parameters implied by a transform. Only the Y rotation matters.
    ///
    /// - oscillator: `220 + 100·rot_y` Hz (never negative), default level
    /// - filter    : `1000 + 500·rot_y` Hz, clamped to 100..5000
    /// - gain      : `1 + 0.1·rot_y`, clamped to 0..1
    /// - output    : `0.5 + 0.1·rot_y`, clamped to 0..1
    #[must_use]
    pub fn from_transform(kind: CubeKind, transform: &Transform) -> Self {
        let rot_y = transform.rotation.y;
        match kind {
            CubeKind::Oscillator => Self::Oscillator {
                frequency_hz: (OSC_BASE_HZ + OSC_HZ_PER_RAD * rot_y).max(0.0),
                level: OSC_DEFAULT_LEVEL,
            },
            CubeKind::Filter => Self::Filter {
                cutoff_hz: (FILTER_BASE_HZ + FILTER_HZ_PER_RAD * rot_y).clamp(FILTER_MIN_HZ, FILTER_MAX_HZ),
            },
            CubeKind::Gain => Self::Gain {
                level: (1.0 + LEVEL_PER_RAD * rot_y).clamp(0.0, 1.0),
            },
            CubeKind::Output => Self::Output {
                level: (OUTPUT_BASE_LEVEL + LEVEL_PER_RAD * rot_y).clamp(0.0, 1.0),
            },
        }
    }

    /// Set one parameter, if this kind has it.
    ///
    /// # Errors
    /// The parameter does not exist for this kind, or the value is negative/non-finite.
    pub fn apply(&mut self, param: AudioParam) -> Result<(), ParamError> {
        let value = match param {
            AudioParam::Frequency(v) | AudioParam::Cutoff(v) | AudioParam::Level(v) => v,
        };
        if !(value.is_finite() && value >= 0.0) {
            return Err(ParamError::OutOfRange { param: param.kind(), value });
        }
        match (self, param) {
            (Self::Oscillator { frequency_hz, .. }, AudioParam::Frequency(v)) => *frequency_hz = v,
            (Self::Oscillator { level, .. }, AudioParam::Level(v))
            | (Self::Gain { level }, AudioParam::Level(v))
            | (Self::Output { level }, AudioParam::Level(v)) => *level = v,
            (Self::Filter { cutoff_hz }, AudioParam::Cutoff(v)) => {
                *cutoff_hz = v.clamp(FILTER_MIN_HZ, FILTER_MAX_HZ);
            }
            (this, other) => {
                return Err(ParamError::Unsupported {
                    kind: this.kind(),
                    param: other.kind(),
                })
            }
        }
        Ok(())
    }

    /// The block flattened into its typed parameters.
    #[must_use]
    pub fn params(&self) -> Vec<AudioParam> {
        match *self {
            Self::Oscillator { frequency_hz, level } => {
                vec![AudioParam::Frequency(frequency_hz), AudioParam::Level(level)]
            }
            Self::Filter { cutoff_hz } => vec![AudioParam::Cutoff(cutoff_hz)],
            Self::Gain { level } | Self::Output { level } => vec![AudioParam::Level(level)],
        }
    }
}

/// One cube as the store keeps it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cube {
    pub id: CubeId,
    pub kind: CubeKind,
    pub transform: Transform,
    pub is_active: bool,
    pub params: CubeParams,
}

impl Cube {
    #[must_use]
    pub fn new(id: CubeId, kind: CubeKind, position: Vec3) -> Self {
        Self {
            id,
            kind,
            transform: Transform::at(position),
            is_active: true,
            params: CubeParams::defaults(kind),
        }
    }
}

impl Placed for Cube {
    type Id = CubeId;

    #[inline]
    fn id(&self) -> &CubeId {
        &self.id
    }

    #[inline]
    fn position(&self) -> Vec3 {
        self.transform.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_layout_matches_signal_roles() {
        assert!(!CubeKind::Oscillator.has_input() && CubeKind::Oscillator.has_output());
        assert!(CubeKind::Filter.has_input() && CubeKind::Filter.has_output());
        assert!(CubeKind::Gain.has_input() && CubeKind::Gain.has_output());
        assert!(CubeKind::Output.has_input() && !CubeKind::Output.has_output());
    }

    #[test]
    fn rotation_maps_to_kind_specific_params() {
        let mut t = Transform::at(Vec3::ZERO);
        t.rotation.y = 1.0;
        assert_eq!(
            CubeParams::from_transform(CubeKind::Oscillator, &t),
            CubeParams::Oscillator { frequency_hz: 320.0, level: 0.2 }
        );
        assert_eq!(
            CubeParams::from_transform(CubeKind::Filter, &t),
            CubeParams::Filter { cutoff_hz: 1500.0 }
        );
        t.rotation.y = 100.0;
        assert_eq!(
            CubeParams::from_transform(CubeKind::Filter, &t),
            CubeParams::Filter { cutoff_hz: 5000.0 }
        );
        assert_eq!(
            CubeParams::from_transform(CubeKind::Output, &t),
            CubeParams::Output { level: 1.0 }
        );
        t.rotation.y = -100.0;
        assert_eq!(
            CubeParams::from_transform(CubeKind::Oscillator, &t),
            CubeParams::Oscillator { frequency_hz: 0.0, level: 0.2 }
        );
        assert_eq!(
            CubeParams::from_transform(CubeKind::Gain, &t),
            CubeParams::Gain { level: 0.0 }
        );
    }

    #[test]
    fn unknown_params_are_rejected_at_the_boundary() {
        let mut p = CubeParams::defaults(CubeKind::Output);
        assert_eq!(
            p.apply(AudioParam::Frequency(440.0)),
            Err(ParamError::Unsupported { kind: CubeKind::Output, param: ParamKind::Frequency })
        );
        p.apply(AudioParam::Level(0.8)).unwrap();
        assert_eq!(p, CubeParams::Output { level: 0.8 });
        assert!(matches!(
            p.apply(AudioParam::Level(f32::NAN)),
            Err(ParamError::OutOfRange { .. })
        ));
    }

    #[test]
    fn filter_cutoff_is_clamped() {
        let mut p = CubeParams::defaults(CubeKind::Filter);
        p.apply(AudioParam::Cutoff(20.0)).unwrap();
        assert_eq!(p, CubeParams::Filter { cutoff_hz: 100.0 });
    }

    #[test]
    fn ids_display_like_the_sandbox() {
        assert_eq!(CubeId(7).to_string(), "cube-7");
        assert!(CubeId(2) < CubeId(10));
        assert_eq!(CubeKind::from_code(1), Some(CubeKind::Filter));
        assert_eq!(CubeKind::from_code(9), None);
    }
}
