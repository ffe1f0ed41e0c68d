//! Audio-graph wiring driven by the proximity graph.
//!
//! The proximity graph is symmetric; signal flow is not. For every proximity
//! connection the patchbay derives the directed routes the two cubes' ports
//! allow (`a → b` when `a` has an output and `b` an input, and the reverse),
//! wires them into the host's [`AudioGraph`], and remembers them under the
//! connection id so the same connection is never wired twice.

use std::collections::BTreeMap;

use cubepatch_core::connection::{Connection, ConnectionId};
use cubepatch_core::cycles::Digraph;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::cubes::{CubeId, CubeKind, CubeParams};

/// The host's signal-processing graph (Web Audio, a DSP engine, a mock).
///
/// Implementations should tolerate calls for nodes they no longer know.
pub trait AudioGraph {
    fn create_node(&mut self, id: CubeId, kind: CubeKind, params: &CubeParams);

    fn update_node(&mut self, id: CubeId, params: &CubeParams);

    fn remove_node(&mut self, id: CubeId);

    fn connect(&mut self, from: CubeId, to: CubeId);

    fn disconnect(&mut self, from: CubeId, to: CubeId);
}

/// Audio graph that does nothing; for headless hosts and tests.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullAudio;

impl AudioGraph for NullAudio {
    fn create_node(&mut self, _: CubeId, _: CubeKind, _: &CubeParams) {}
    fn update_node(&mut self, _: CubeId, _: &CubeParams) {}
    fn remove_node(&mut self, _: CubeId) {}
    fn connect(&mut self, _: CubeId, _: CubeId) {}
    fn disconnect(&mut self, _: CubeId, _: CubeId) {}
}

/// One directed signal route.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Route {
    pub from: CubeId,
    pub to: CubeId,
}

/// Routes a pair of cubes supports, in `a → b`, `b → a` order.
#[must_use]
pub fn routes_between(a: (CubeId, CubeKind), b: (CubeId, CubeKind)) -> Vec<Route> {
    let mut out = Vec::with_capacity(2);
    if a.1.has_output() && b.1.has_input() {
        out.push(Route { from: a.0, to: b.0 });
    }
    if b.1.has_output() && a.1.has_input() {
        out.push(Route { from: b.0, to: a.0 });
    }
    out
}

/// Wired routes keyed by the proximity connection that caused them.
#[derive(Clone, Debug, Default)]
pub struct Patchbay {
    wired: BTreeMap<ConnectionId<CubeId>, Vec<Route>>,
}

impl Patchbay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire whatever routes the connection allows. Already-wired connections
    /// are left alone. Returns the number of routes connected.
    pub fn wire<A: AudioGraph>(
        &mut self,
        connection: &Connection<CubeId>,
        kinds: (CubeKind, CubeKind),
        audio: &mut A,
    ) -> usize {
        if self.wired.contains_key(&connection.id) {
            return 0;
        }
        let routes = routes_between((connection.from, kinds.0), (connection.to, kinds.1));
        for r in &routes {
            trace!(from = %r.from, to = %r.to, "connect");
            audio.connect(r.from, r.to);
        }
        let n = routes.len();
        self.wired.insert(connection.id.clone(), routes);
        n
    }

    /// Disconnect everything wired for this connection. Unknown ids are a no-op.
    pub fn unwire<A: AudioGraph>(&mut self, id: &ConnectionId<CubeId>, audio: &mut A) -> usize {
        let Some(routes) = self.wired.remove(id) else {
            return 0;
        };
        for r in &routes {
            trace!(from = %r.from, to = %r.to, "disconnect");
            audio.disconnect(r.from, r.to);
        }
        routes.len()
    }

    #[must_use]
    pub fn is_wired(&self, id: &ConnectionId<CubeId>) -> bool {
        self.wired.contains_key(id)
    }

    /// Every live route, ordered.
    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        let mut all: Vec<Route> = self.wired.values().flatten().copied().collect();
        all.sort_unstable();
        all
    }

    #[must_use]
    pub fn route_count(&self) -> usize {
        self.wired.values().map(Vec::len).sum()
    }

    /// A feedback loop in the signal graph, as `[a, b, …, a]`.
    #[must_use]
    pub fn feedback(&self) -> Option<Vec<CubeId>> {
        let routes = self.routes();
        let cycle = Digraph::from_arcs(routes.iter().map(|r| (&r.from, &r.to))).find_cycle();
        if let Some(path) = &cycle {
            warn!(len = path.len() - 1, "signal feedback loop");
        }
        cycle
    }

    /// Disconnect everything.
    pub fn clear<A: AudioGraph>(&mut self, audio: &mut A) {
        for (_, routes) in std::mem::take(&mut self.wired) {
            for r in routes {
                audio.disconnect(r.from, r.to);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Wires {
        log: Vec<(&'static str, CubeId, CubeId)>,
    }

    impl AudioGraph for Wires {
        fn create_node(&mut self, _: CubeId, _: CubeKind, _: &CubeParams) {}
        fn update_node(&mut self, _: CubeId, _: &CubeParams) {}
        fn remove_node(&mut self, _: CubeId) {}
        fn connect(&mut self, from: CubeId, to: CubeId) {
            self.log.push(("connect", from, to));
        }
        fn disconnect(&mut self, from: CubeId, to: CubeId) {
            self.log.push(("disconnect", from, to));
        }
    }

    fn edge(a: u64, b: u64) -> Connection<CubeId> {
        Connection::new(CubeId(a), CubeId(b))
    }

    #[test]
    fn ports_decide_route_direction() {
        let osc = (CubeId(0), CubeKind::Oscillator);
        let out = (CubeId(1), CubeKind::Output);
        let filt = (CubeId(2), CubeKind::Filter);
        assert_eq!(routes_between(osc, out), vec![Route { from: CubeId(0), to: CubeId(1) }]);
        assert_eq!(routes_between(out, osc), vec![Route { from: CubeId(0), to: CubeId(1) }]);
        assert_eq!(routes_between(filt, filt).len(), 2);
        assert!(routes_between(osc, osc).is_empty());
        assert!(routes_between(out, out).is_empty());
    }

    #[test]
    fn wiring_twice_is_a_no_op() {
        let mut bay = Patchbay::new();
        let mut audio = Wires::default();
        let e = edge(0, 1);
        let kinds = (CubeKind::Oscillator, CubeKind::Filter);
        assert_eq!(bay.wire(&e, kinds, &mut audio), 1);
        assert_eq!(bay.wire(&e, kinds, &mut audio), 0);
        assert_eq!(audio.log, vec![("connect", CubeId(0), CubeId(1))]);
    }

    #[test]
    fn unwire_disconnects_exactly_what_was_wired() {
        let mut bay = Patchbay::new();
        let mut audio = Wires::default();
        let e = edge(3, 4);
        bay.wire(&e, (CubeKind::Gain, CubeKind::Filter), &mut audio);
        assert_eq!(bay.route_count(), 2);
        assert_eq!(bay.unwire(&e.id, &mut audio), 2);
        assert_eq!(bay.unwire(&e.id, &mut audio), 0);
        let disconnects = audio.log.iter().filter(|(op, ..)| *op == "disconnect").count();
        assert_eq!(disconnects, 2);
        assert!(bay.routes().is_empty());
    }

    #[test]
    fn two_way_routes_are_feedback() {
        let mut bay = Patchbay::new();
        let mut audio = NullAudio;
        bay.wire(&edge(0, 1), (CubeKind::Oscillator, CubeKind::Filter), &mut audio);
        bay.wire(&edge(1, 2), (CubeKind::Filter, CubeKind::Output), &mut audio);
        assert!(bay.feedback().is_none());
        bay.wire(&edge(1, 3), (CubeKind::Filter, CubeKind::Gain), &mut audio);
        let path = bay.feedback().unwrap();
        assert_eq!(path.first(), path.last());
        assert_eq!(path.len(), 3);
    }
}
