//! Error types for the connection engine.
//!
//! The failure surface is narrow: bad configuration values, and entity
//! collections that violate `reconcile`'s preconditions. Absence of an edge
//! or a self-pair is *not* an error anywhere in this crate.

use alloc::string::String;
use thiserror::Error;

/// Configuration values that cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// Grid cell size must be finite and strictly positive.
    #[error("cell size must be finite and positive, got {0}")]
    InvalidCellSize(f32),
    /// Proximity threshold must be finite and strictly positive.
    #[error("proximity threshold must be finite and positive, got {0}")]
    InvalidThreshold(f32),
}

/// Precondition violations detected while reconciling.
///
/// `reconcile` validates the full entity collection before touching the
/// connection set, so any of these leaves the set exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// A coordinate is NaN or infinite.
    #[error("entity {entity} has a non-finite position")]
    NonFinitePosition { entity: String },
    /// The same identifier appears twice in one collection.
    #[error("entity {entity} appears more than once")]
    DuplicateEntity { entity: String },
}
