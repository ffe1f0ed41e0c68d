//! Cubepatch Engine — the host side of the proximity graph.
//!
//! Crate layout:
//! - [`cubes`]   : cube kinds, ids, transforms, typed audio parameters
//! - [`store`]   : `CubeStore`, the cube collection
//! - [`patch`]   : `AudioGraph` seam and the `Patchbay` that wires routes
//! - [`view`]    : `SceneView` seam for whatever draws cubes and links
//! - [`session`] : `Session<A, V>` tying the above to the core reconciler
//! - [`layouts`] : preset placements
//!
//! Everything here runs on the host's single update thread. The session owns
//! its collaborators; nothing is global.

pub mod cubes;
pub mod error;
pub mod layouts;
pub mod patch;
pub mod session;
pub mod store;
pub mod view;

pub use cubes::{AudioParam, Cube, CubeId, CubeKind, CubeParams, ParamKind, Transform};
pub use error::SessionError;
pub use layouts::Layout;
pub use patch::{AudioGraph, NullAudio, Patchbay, Route};
pub use session::{Session, SessionSnapshot, TickReport};
pub use store::CubeStore;
pub use view::{NullView, SceneView};

pub use cubepatch_core::config::ProximityConfig;
pub use cubepatch_core::math::Vec3;
