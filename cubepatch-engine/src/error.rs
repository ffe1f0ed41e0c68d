//! Session-level errors.

use cubepatch_core::error::{ConfigError, ReconcileError};
use thiserror::Error;

use crate::cubes::{CubeId, ParamError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("unknown cube {0}")]
    UnknownCube(CubeId),
    #[error("transform components must be finite")]
    InvalidTransform,
}
