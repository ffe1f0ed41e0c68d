//! Session state: the one place the host keeps everything.
//!
//! This module defines `Session<A, V>`, which owns the cube store, the
//! reconciler (and through it the connection set), the patchbay, and the
//! host's audio and view collaborators. The host creates one at session
//! start, calls into it from its input handlers and frame loop, and calls
//! `clear` at session end.
//!
//! Design goals
//! - No ambient globals: all state lives here and is passed by `&mut`
//! - Every position change reconciles right away (per-mutation hook);
//!   `update` is also safe to call once per frame (idempotent)
//! - Generic over the collaborators, so hosts plug in without trait objects

use cubepatch_core::config::ProximityConfig;
use cubepatch_core::connection::{Connection, ConnectionDiff};
use cubepatch_core::cycles;
use cubepatch_core::math::Vec3;
use cubepatch_core::reconcile::Reconciler;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cubes::{AudioParam, Cube, CubeId, CubeKind, CubeParams};
use crate::error::SessionError;
use crate::patch::{AudioGraph, NullAudio, Patchbay, Route};
use crate::store::CubeStore;
use crate::view::{NullView, SceneView};

/// What one reconciliation changed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub diff: ConnectionDiff<CubeId>,
    /// Connections after the tick.
    pub connections: usize,
    /// Signal routes after the tick.
    pub routes: usize,
}

/// Serializable picture of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub tick: u64,
    pub config: ProximityConfig,
    pub cubes: Vec<Cube>,
    pub connections: Vec<Connection<CubeId>>,
    pub routes: Vec<Route>,
    pub feedback: Option<Vec<CubeId>>,
}

pub struct Session<A: AudioGraph = NullAudio, V: SceneView = NullView> {
    store: CubeStore,
    reconciler: Reconciler<CubeId>,
    patchbay: Patchbay,
    audio: A,
    view: V,
    tick: u64,
}

impl Session<NullAudio, NullView> {
    /// Session with no audio or view attached.
    ///
    /// # Errors
    /// Invalid configuration.
    pub fn headless(config: ProximityConfig) -> Result<Self, SessionError> {
        Self::new(config, NullAudio, NullView)
    }
}

impl<A: AudioGraph, V: SceneView> Session<A, V> {
    /// # Errors
    /// Invalid configuration.
    pub fn new(config: ProximityConfig, audio: A, view: V) -> Result<Self, SessionError> {
        let reconciler = Reconciler::new(config)?;
        info!(cell_size = config.cell_size, threshold = config.threshold, "session started");
        Ok(Self {
            store: CubeStore::new(),
            reconciler,
            patchbay: Patchbay::new(),
            audio,
            view,
            tick: 0,
        })
    }

    // --- Cubes ---------------------------------------------------------------------

    /// Place a new cube, give it an audio node, and reconnect.
    ///
    /// Nothing is left behind if the cube cannot be added.
    ///
    /// # Errors
    /// Non-finite position, or reconciliation fails.
    pub fn add_cube(&mut self, kind: CubeKind, position: Vec3) -> Result<CubeId, SessionError> {
        let cube = self
            .store
            .create_cube(kind, position)
            .ok_or(SessionError::InvalidTransform)?;
        let id = cube.id;
        self.audio.create_node(id, kind, &cube.params);
        self.view.add_cube(cube);
        if let Err(e) = self.update() {
            // Reconcile never touched the connection set; undo the rest.
            self.store.destroy_cube(id);
            self.audio.remove_node(id);
            self.view.remove_cube(id);
            return Err(e);
        }
        debug!(%id, %kind, "cube added");
        Ok(id)
    }

    /// Move a cube and reconnect.
    ///
    /// # Errors
    /// Unknown id or non-finite position.
    pub fn move_cube(&mut self, id: CubeId, position: Vec3) -> Result<TickReport, SessionError> {
        self.require(id)?;
        if !self.store.move_cube(id, position) {
            return Err(SessionError::InvalidTransform);
        }
        self.sync_view(id);
        self.update()
    }

    /// Turn a cube; its audio params follow the new Y rotation.
    ///
    /// # Errors
    /// Unknown id or non-finite rotation.
    pub fn rotate_cube(&mut self, id: CubeId, rotation: Vec3) -> Result<CubeParams, SessionError> {
        self.require(id)?;
        if !self.store.rotate_cube(id, rotation) {
            return Err(SessionError::InvalidTransform);
        }
        let params = self.require(id)?.params;
        self.audio.update_node(id, &params);
        self.sync_view(id);
        Ok(params)
    }

    /// # Errors
    /// Unknown id or non-finite scale.
    pub fn scale_cube(&mut self, id: CubeId, scale: Vec3) -> Result<(), SessionError> {
        self.require(id)?;
        if !self.store.scale_cube(id, scale) {
            return Err(SessionError::InvalidTransform);
        }
        self.sync_view(id);
        Ok(())
    }

    /// Set one audio parameter directly.
    ///
    /// # Errors
    /// Unknown id, or a parameter the cube's kind does not have.
    pub fn set_param(&mut self, id: CubeId, param: AudioParam) -> Result<CubeParams, SessionError> {
        let cube = self.store.get_cube_mut(id).ok_or(SessionError::UnknownCube(id))?;
        cube.params.apply(param)?;
        let params = cube.params;
        self.audio.update_node(id, &params);
        Ok(params)
    }

    /// Flag a cube (in)active. Connectivity only depends on position.
    ///
    /// # Errors
    /// Unknown id.
    pub fn set_active(&mut self, id: CubeId, active: bool) -> Result<(), SessionError> {
        if self.store.set_active(id, active) {
            Ok(())
        } else {
            Err(SessionError::UnknownCube(id))
        }
    }

    /// Remove a cube: its connections go first, then its node and its mesh.
    ///
    /// # Errors
    /// Unknown id.
    pub fn remove_cube(&mut self, id: CubeId) -> Result<TickReport, SessionError> {
        self.store
            .destroy_cube(id)
            .ok_or(SessionError::UnknownCube(id))?;
        let report = self.update()?;
        self.audio.remove_node(id);
        self.view.remove_cube(id);
        debug!(%id, "cube removed");
        Ok(report)
    }

    // --- Tick ----------------------------------------------------------------------

    /// Reconcile connections with the current cube positions and push the
    /// difference to the view and the audio graph (removals first).
    ///
    /// # Errors
    /// Propagates reconciliation precondition failures.
    pub fn update(&mut self) -> Result<TickReport, SessionError> {
        let diff = self.reconciler.reconcile(self.store.cubes())?;

        for gone in &diff.removed {
            self.view.hide_connection(gone.from, gone.to);
            self.patchbay.unwire(&gone.id, &mut self.audio);
        }
        for made in &diff.added {
            let (Some(a), Some(b)) = (self.store.get_cube(made.from), self.store.get_cube(made.to)) else {
                continue;
            };
            self.view.show_connection(a, b, made.strength);
            self.patchbay.wire(made, (a.kind, b.kind), &mut self.audio);
        }

        self.tick += 1;
        let report = TickReport {
            tick: self.tick,
            diff,
            connections: self.reconciler.connection_set().len(),
            routes: self.patchbay.route_count(),
        };
        if !report.diff.is_empty() {
            debug!(
                tick = report.tick,
                added = report.diff.added.len(),
                removed = report.diff.removed.len(),
                connections = report.connections,
                routes = report.routes,
                "tick"
            );
        }
        Ok(report)
    }

    /// Change cell size / threshold without dropping connections; the next
    /// `update` converges.
    ///
    /// # Errors
    /// Invalid configuration (the old one stays in force).
    pub fn reconfigure(&mut self, config: ProximityConfig) -> Result<(), SessionError> {
        self.reconciler.set_config(config)?;
        info!(cell_size = config.cell_size, threshold = config.threshold, "session reconfigured");
        Ok(())
    }

    /// End of session: hide and unwire every connection, drop every node and cube.
    pub fn clear(&mut self) {
        for c in self.reconciler.clear() {
            self.view.hide_connection(c.from, c.to);
        }
        self.patchbay.clear(&mut self.audio);
        for cube in self.store.clear() {
            self.audio.remove_node(cube.id);
            self.view.remove_cube(cube.id);
        }
        self.tick = 0;
        info!("session cleared");
    }

    // --- Queries -------------------------------------------------------------------

    pub fn cubes(&self) -> impl Iterator<Item = &Cube> {
        self.store.cubes()
    }

    #[must_use]
    pub fn cube(&self, id: CubeId) -> Option<&Cube> {
        self.store.get_cube(id)
    }

    #[must_use]
    pub fn cube_count(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn connections(&self) -> Vec<Connection<CubeId>> {
        self.reconciler.connections()
    }

    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        self.patchbay.routes()
    }

    /// Directed cycle check over the proximity edges as stored.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        cycles::has_cycle(&self.reconciler.connections())
    }

    /// Feedback loop in the signal routes, if any.
    #[must_use]
    pub fn signal_feedback(&self) -> Option<Vec<CubeId>> {
        self.patchbay.feedback()
    }

    #[must_use]
    pub fn config(&self) -> ProximityConfig {
        self.reconciler.config()
    }

    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            tick: self.tick,
            config: self.config(),
            cubes: self.store.cubes().cloned().collect(),
            connections: self.connections(),
            routes: self.routes(),
            feedback: self.signal_feedback(),
        }
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    fn require(&self, id: CubeId) -> Result<&Cube, SessionError> {
        self.store.get_cube(id).ok_or(SessionError::UnknownCube(id))
    }

    fn sync_view(&mut self, id: CubeId) {
        if let Some(cube) = self.store.get_cube(id) {
            self.view.update_cube(id, &cube.transform);
        }
    }
}
