//! Incremental reconciliation of the proximity graph.
//!
//! Every call rebuilds the spatial grid from the current entity collection,
//! works out which pairs are proximal *now*, and diffs that against the
//! connection set it owns:
//!
//! 1. bucket every entity into its grid cell;
//! 2. for each entity, gather candidates from its own cell and its neighbours;
//! 3. test each unordered pair once (only from the side with the lower id);
//! 4. create edges for new proximal pairs, mark every proximal pair active;
//! 5. drop every stored edge that was not marked.
//!
//! Cost is O(n·k) for k the typical neighbourhood occupancy, degrading to
//! O(n²) only when everything piles into one cell.
//!
//! Not thread-safe by construction (`&mut self`); hosts serialize calls.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::fmt::{Debug, Display};

use tracing::{debug, trace};

use crate::connection::{Connection, ConnectionDiff, ConnectionId, ConnectionSet};
use crate::config::ProximityConfig;
use crate::cycles;
use crate::error::{ConfigError, ReconcileError};
use crate::proximity::Proximity;
use crate::spatial::{Placed, SpatialGrid};

/// Owner of the connection set and the only thing that mutates it.
#[derive(Clone, Debug)]
pub struct Reconciler<K> {
    config: ProximityConfig,
    proximity: Proximity,
    reach: i32,
    connections: ConnectionSet<K>,
}

impl<K: Ord + Clone + Debug + Display> Reconciler<K> {
    /// # Errors
    /// The configuration fails [`ProximityConfig::validate`].
    pub fn new(config: ProximityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            proximity: Proximity::new(config.threshold),
            reach: config.reach(),
            connections: ConnectionSet::new(),
        })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> ProximityConfig {
        self.config
    }

    /// Swap cell size / threshold while keeping the current edges.
    /// The next `reconcile` converges to the new parameters.
    ///
    /// # Errors
    /// The configuration fails [`ProximityConfig::validate`]; the old one stays.
    pub fn set_config(&mut self, config: ProximityConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.proximity = Proximity::new(config.threshold);
        self.reach = config.reach();
        Ok(())
    }

    /// Bring the connection set in line with the given entity positions.
    ///
    /// Calling this twice with unchanged positions yields an empty diff the
    /// second time.
    ///
    /// # Errors
    /// Any entity has a non-finite position, or an id is repeated. The connection set is left untouched in that case.
    pub fn reconcile<'a, E, I>(&mut self, entities: I) -> Result<ConnectionDiff<K>, ReconcileError>
    where
        E: Placed<Id = K> + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let grid = SpatialGrid::build(entities, self.config.cell_size)?;
        let mut diff = ConnectionDiff::default();
        let mut active: BTreeSet<ConnectionId<K>> = BTreeSet::new();

        for (id, slot) in grid.slots() {
            grid.for_each_candidate(slot.cell, self.reach, |other| {
                if other <= id {
                    return;
                }
                let Some(other_slot) = grid.slot(other) else {
                    return;
                };
                if !self.proximity.is_proximal(slot.position, other_slot.position) {
                    return;
                }
                let pair = ConnectionId::new(id.clone(), other.clone());
                if !self.connections.contains(&pair) {
                    let created = ConnectionSet::create_connection(id.clone(), other.clone());
                    trace!(from = %created.from, to = %created.to, "connection created");
                    diff.added.push(created.clone());
                    self.connections.insert(created);
                }
                active.insert(pair);
            });
        }

        diff.removed = self.connections.retain_ids(|pair| active.contains(pair));
        for gone in &diff.removed {
            trace!(from = %gone.from, to = %gone.to, "connection removed");
        }

        debug!(
            entities = grid.len(),
            cells = grid.cell_count(),
            added = diff.added.len(),
            removed = diff.removed.len(),
            total = self.connections.len(),
            "reconciled"
        );
        Ok(diff)
    }

    /// Whether two entities are currently within the threshold.
    #[inline]
    #[must_use]
    pub fn check_proximity<E: Placed>(&self, a: &E, b: &E) -> bool {
        self.proximity.check(a, b)
    }

    /// See [`ConnectionSet::validate_connection`].
    #[must_use]
    pub fn validate_connection(&self, from: &K, to: &K) -> bool {
        self.connections.validate_connection(from, to)
    }

    /// Manually add an edge outside the proximity path, if it passes
    /// validation. Like any edge, it is dropped by the next `reconcile` unless
    /// the pair is proximal by then.
    pub fn connect(&mut self, from: K, to: K) -> Option<&Connection<K>> {
        if !self.connections.validate_connection(&from, &to) {
            return None;
        }
        let created = ConnectionSet::create_connection(from, to);
        let id = created.id.clone();
        self.connections.insert(created);
        self.connections.get(&id)
    }

    /// Remove one edge; unknown ids are a no-op.
    pub fn remove_connection(&mut self, id: &ConnectionId<K>) -> Option<Connection<K>> {
        self.connections.remove_connection(id)
    }

    /// Snapshot of every current edge.
    #[must_use]
    pub fn connections(&self) -> Vec<Connection<K>> {
        self.connections.connections()
    }

    /// Read-only view of the set.
    #[inline]
    #[must_use]
    pub fn connection_set(&self) -> &ConnectionSet<K> {
        &self.connections
    }

    /// Cycle check over an arbitrary edge list, read `from → to`.
    #[must_use]
    pub fn detect_cycles(&self, edges: &[Connection<K>]) -> bool {
        cycles::has_cycle(edges)
    }

    /// Forget every edge (session end). Returns the dropped edges.
    pub fn clear(&mut self) -> Vec<Connection<K>> {
        self.connections.clear()
    }
}
