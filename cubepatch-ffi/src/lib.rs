//! C ABI wrapper for a cubepatch session.
//!
//! Lets a 3D host (the thing that actually draws and drags cubes) drive the
//! proximity graph: add/move/rotate/remove cubes, reconcile, and query the
//! connection and signal graphs. Audio and view callbacks are not exposed;
//! the host polls counts and feedback instead.
//!
//! ABI notes
//! - All functions are `extern "C"` and `#[no_mangle]`.
//! - Opaque handle type: `CubepatchSession` (heap-allocated; you own/delete it).
//! - Cube ids are the non-negative `int64_t` returned by `cubepatch_add_cube`.
//! - Status returns: `0` ok, `-1` error (null handle, unknown id, bad input).
//!
//! Threading
//! - The object is NOT thread-safe; call all functions from the same host thread.

#![allow(clippy::not_unsafe_ptr_arg_deref)]

use cubepatch_engine::{
    CubeId, CubeKind, NullAudio, NullView, ProximityConfig, Session, SessionError, Vec3,
};
use tracing::warn;

/// Opaque session handle we hand to C.
pub struct CubepatchSession {
    inner: Session<NullAudio, NullView>,
}

fn status(op: &str, result: Result<(), SessionError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            warn!(op, error = %e, "cubepatch call failed");
            -1
        }
    }
}

fn handle<'a>(session: *mut CubepatchSession) -> Option<&'a mut Session<NullAudio, NullView>> {
    // SAFETY: the host passes either null or a pointer from `cubepatch_create`
    // that it has not destroyed, and never shares it across threads.
    unsafe { session.as_mut() }.map(|s| &mut s.inner)
}

fn cube_id(id: i64) -> Option<CubeId> {
    u64::try_from(id).ok().map(CubeId)
}

// --- Creation / destruction -------------------------------------------------------

/// Create a session. Returns null if `cell_size` or `threshold` is not a
/// finite positive number.
#[no_mangle]
pub extern "C" fn cubepatch_create(cell_size: f32, threshold: f32) -> *mut CubepatchSession {
    let built = ProximityConfig::new(cell_size, threshold)
        .map_err(SessionError::from)
        .and_then(Session::headless);
    match built {
        Ok(inner) => Box::into_raw(Box::new(CubepatchSession { inner })),
        Err(e) => {
            warn!(error = %e, "cubepatch_create");
            std::ptr::null_mut()
        }
    }
}

/// Destroy a session previously returned by `cubepatch_create`.
#[no_mangle]
pub extern "C" fn cubepatch_destroy(session: *mut CubepatchSession) {
    if !session.is_null() {
        unsafe { drop(Box::from_raw(session)); }
    }
}

// --- Cubes -------------------------------------------------------------------------

/// Add a cube. `kind`: 0 oscillator, 1 filter, 2 gain, 3 output.
/// Returns the new id, or -1.
#[no_mangle]
pub extern "C" fn cubepatch_add_cube(session: *mut CubepatchSession, kind: u32, x: f32, y: f32, z: f32) -> i64 {
    let Some(s) = handle(session) else { return -1 };
    let Some(kind) = CubeKind::from_code(kind) else {
        warn!(kind, "cubepatch_add_cube: unknown kind");
        return -1;
    };
    match s.add_cube(kind, Vec3::new(x, y, z)) {
        Ok(id) => i64::try_from(id.0).unwrap_or(-1),
        Err(e) => {
            warn!(error = %e, "cubepatch_add_cube");
            -1
        }
    }
}

#[no_mangle]
pub extern "C" fn cubepatch_move_cube(session: *mut CubepatchSession, id: i64, x: f32, y: f32, z: f32) -> i32 {
    let (Some(s), Some(id)) = (handle(session), cube_id(id)) else { return -1 };
    status("move", s.move_cube(id, Vec3::new(x, y, z)).map(drop))
}

/// Rotation in radians; the Y component drives the cube's audio parameter.
#[no_mangle]
pub extern "C" fn cubepatch_rotate_cube(session: *mut CubepatchSession, id: i64, x: f32, y: f32, z: f32) -> i32 {
    let (Some(s), Some(id)) = (handle(session), cube_id(id)) else { return -1 };
    status("rotate", s.rotate_cube(id, Vec3::new(x, y, z)).map(drop))
}

#[no_mangle]
pub extern "C" fn cubepatch_remove_cube(session: *mut CubepatchSession, id: i64) -> i32 {
    let (Some(s), Some(id)) = (handle(session), cube_id(id)) else { return -1 };
    status("remove", s.remove_cube(id).map(drop))
}

// --- Graph -------------------------------------------------------------------------

/// Reconcile now. Returns the number of connections added plus removed, or -1.
#[no_mangle]
pub extern "C" fn cubepatch_update(session: *mut CubepatchSession) -> i32 {
    let Some(s) = handle(session) else { return -1 };
    match s.update() {
        Ok(report) => i32::try_from(report.diff.len()).unwrap_or(i32::MAX),
        Err(e) => {
            warn!(error = %e, "cubepatch_update");
            -1
        }
    }
}

#[no_mangle]
pub extern "C" fn cubepatch_connection_count(session: *mut CubepatchSession) -> u32 {
    handle(session).map_or(0, |s| u32::try_from(s.connections().len()).unwrap_or(u32::MAX))
}

#[no_mangle]
pub extern "C" fn cubepatch_route_count(session: *mut CubepatchSession) -> u32 {
    handle(session).map_or(0, |s| u32::try_from(s.routes().len()).unwrap_or(u32::MAX))
}

/// 1 if the stored connections (read from → to) contain a directed cycle, else 0.
#[no_mangle]
pub extern "C" fn cubepatch_has_cycle(session: *mut CubepatchSession) -> i32 {
    handle(session).map_or(0, |s| i32::from(s.has_cycle()))
}

/// Look for a feedback loop in the signal routes.
///
/// Returns the loop length in hops (0 if there is none, -1 on a null handle)
/// and copies up to `capacity` cube ids of the loop into `out_ids`, starting
/// anywhere on the loop. `out_ids` may be null.
#[no_mangle]
pub extern "C" fn cubepatch_signal_feedback(session: *mut CubepatchSession, out_ids: *mut u64, capacity: u32) -> i32 {
    let Some(s) = handle(session) else { return -1 };
    let Some(path) = s.signal_feedback() else { return 0 };
    let hops = &path[..path.len() - 1];
    if !out_ids.is_null() && capacity > 0 {
        let n = hops.len().min(capacity as usize);
        let out = unsafe { std::slice::from_raw_parts_mut(out_ids, n) };
        for (slot, id) in out.iter_mut().zip(hops) {
            *slot = id.0;
        }
    }
    i32::try_from(hops.len()).unwrap_or(i32::MAX)
}

// --- Config / lifecycle ------------------------------------------------------------

/// Change the threshold; takes effect on the next update. Returns -1 if invalid.
#[no_mangle]
pub extern "C" fn cubepatch_set_threshold(session: *mut CubepatchSession, threshold: f32) -> i32 {
    let Some(s) = handle(session) else { return -1 };
    let config = ProximityConfig { threshold, ..s.config() };
    status("set_threshold", s.reconfigure(config))
}

/// Remove every cube and connection.
#[no_mangle]
pub extern "C" fn cubepatch_clear(session: *mut CubepatchSession) {
    if let Some(s) = handle(session) {
        s.clear();
    }
}
