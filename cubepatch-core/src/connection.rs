//! Edges between proximal entities and the set that owns them.
//!
//! Contents
//! - `ConnectionId`  : order-independent pair identity, `id(a, b) == id(b, a)`
//! - `Connection`    : one edge record (`from`, `to`, `strength`, `is_active`)
//! - `ConnectionSet` : id → edge map, at most one edge per unordered pair
//! - `ConnectionDiff`: what one reconciliation added and removed
//!
//! Notes
//! - `from`/`to` are fixed when the edge is created (lower id first when the
//!   reconciler creates it). The orientation is a storage detail, not a
//!   statement about signal flow.
//! - `strength` is always `1.0` today; it is kept for distance falloff later.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

/// Strength given to every new edge.
pub const DEFAULT_STRENGTH: f32 = 1.0;

/// Canonical identity of the unordered pair `{a, b}`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionId<K> {
    low: K,
    high: K,
}

impl<K: Ord> ConnectionId<K> {
    /// Orders the endpoints so that argument order does not matter.
    #[inline]
    pub fn new(a: K, b: K) -> Self {
        if b < a {
            Self { low: b, high: a }
        } else {
            Self { low: a, high: b }
        }
    }

    #[inline]
    pub fn low(&self) -> &K {
        &self.low
    }

    #[inline]
    pub fn high(&self) -> &K {
        &self.high
    }

    #[inline]
    pub fn touches(&self, entity: &K) -> bool {
        self.low == *entity || self.high == *entity
    }

    #[inline]
    pub fn is_self_pair(&self) -> bool {
        self.low == self.high
    }
}

impl<K: fmt::Display> fmt::Display for ConnectionId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.low, self.high)
    }
}

/// One edge of the proximity graph.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connection<K> {
    pub id: ConnectionId<K>,
    pub from: K,
    pub to: K,
    pub strength: f32,
    pub is_active: bool,
}

impl<K: Ord + Clone> Connection<K> {
    /// Pure construction; no duplicate or self-pair check.
    pub fn new(from: K, to: K) -> Self {
        Self {
            id: ConnectionId::new(from.clone(), to.clone()),
            from,
            to,
            strength: DEFAULT_STRENGTH,
            is_active: true,
        }
    }
}

/// Edges added and removed by one reconciliation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionDiff<K> {
    pub added: Vec<Connection<K>>,
    pub removed: Vec<Connection<K>>,
}

impl<K> Default for ConnectionDiff<K> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<K> ConnectionDiff<K> {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Total number of add + remove events.
    #[inline]
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len()
    }
}

/// The authoritative edge map. Lives across reconciliations; diffed, never rebuilt.
#[derive(Clone, Debug)]
pub struct ConnectionSet<K> {
    edges: BTreeMap<ConnectionId<K>, Connection<K>>,
}

impl<K> Default for ConnectionSet<K> {
    fn default() -> Self {
        Self { edges: BTreeMap::new() }
    }
}

impl<K: Ord + Clone> ConnectionSet<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an edge record without inserting it. Does not look for duplicates;
    /// use [`ConnectionSet::validate_connection`] first when that matters.
    #[must_use]
    pub fn create_connection(from: K, to: K) -> Connection<K> {
        Connection::new(from, to)
    }

    /// False for a self-pair or a pair that already has an edge.
    #[must_use]
    pub fn validate_connection(&self, from: &K, to: &K) -> bool {
        if from == to {
            return false;
        }
        !self.edges.contains_key(&ConnectionId::new(from.clone(), to.clone()))
    }

    /// Store an edge, replacing any edge with the same id. Returns the replaced one.
    pub fn insert(&mut self, connection: Connection<K>) -> Option<Connection<K>> {
        self.edges.insert(connection.id.clone(), connection)
    }

    /// Remove by id; absent ids are a no-op.
    pub fn remove_connection(&mut self, id: &ConnectionId<K>) -> Option<Connection<K>> {
        self.edges.remove(id)
    }

    /// Drop every edge whose id fails `keep`, returning the dropped edges.
    pub fn retain_ids(&mut self, mut keep: impl FnMut(&ConnectionId<K>) -> bool) -> Vec<Connection<K>> {
        let doomed: Vec<ConnectionId<K>> = self.edges.keys().filter(|id| !keep(*id)).cloned().collect();
        doomed.iter().filter_map(|id| self.edges.remove(id)).collect()
    }

    #[must_use]
    pub fn get(&self, id: &ConnectionId<K>) -> Option<&Connection<K>> {
        self.edges.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ConnectionId<K>) -> bool {
        self.edges.contains_key(id)
    }

    /// Owned snapshot of every edge.
    #[must_use]
    pub fn connections(&self) -> Vec<Connection<K>> {
        self.edges.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection<K>> {
        self.edges.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Remove everything, returning what was there.
    pub fn clear(&mut self) -> Vec<Connection<K>> {
        core::mem::take(&mut self.edges).into_values().collect()
    }
}
