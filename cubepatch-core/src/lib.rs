#![cfg_attr(not(feature = "std"), no_std)]
//! Cubepatch Core — the spatial proximity connection engine.
//!
//! Given a changing set of positioned entities, keeps an incrementally
//! updated graph of "who is close to whom" and answers cycle queries over
//! edge lists.
//!
//! Features
//! - `std`       : (default) use the Rust standard library
//! - `no-std`    : build with `#![no_std]` + `alloc` and use `libm` for math
//! - `micromath` : use `micromath` as the math backend instead
//! - `serde`     : derive `Serialize`/`Deserialize` on the public data types
//!
//! Modules
//! - [`math`]       : `Vec3` and the floor/sqrt backend
//! - [`config`]     : `ProximityConfig` (cell size, threshold)
//! - [`spatial`]    : `Placed` seam, `CellCoord`, `SpatialGrid`
//! - [`proximity`]  : strict distance test
//! - [`connection`] : `ConnectionId`, `Connection`, `ConnectionSet`, `ConnectionDiff`
//! - [`reconcile`]  : `Reconciler`, owner of the connection set
//! - [`cycles`]     : `Digraph` with iterative cycle search
//! - [`error`]      : `ConfigError`, `ReconcileError`
//!
//! Design
//! - Single-threaded and call-driven: nothing runs unless the host calls in
//! - The grid is rebuilt per call; only the connection set persists
//! - Ordered maps everywhere so iteration (and therefore diffs) is stable

extern crate alloc;

pub mod config;
pub mod connection;
pub mod cycles;
pub mod error;
pub mod math;
pub mod proximity;
pub mod reconcile;
pub mod spatial;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::config::{ProximityConfig, DEFAULT_CELL_SIZE, DEFAULT_THRESHOLD};
    pub use crate::connection::{Connection, ConnectionDiff, ConnectionId, ConnectionSet};
    pub use crate::cycles::{find_cycle, has_cycle, Digraph};
    pub use crate::error::{ConfigError, ReconcileError};
    pub use crate::math::Vec3;
    pub use crate::proximity::Proximity;
    pub use crate::reconcile::Reconciler;
    pub use crate::spatial::{cell_of, CellCoord, Placed, SpatialGrid};
}
