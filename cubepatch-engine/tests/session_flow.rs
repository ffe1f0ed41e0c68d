use std::collections::BTreeSet;

use cubepatch_core::connection::{Connection, ConnectionId};
use cubepatch_core::cycles;
use cubepatch_engine::{
    AudioGraph, Cube, CubeId, CubeKind, CubeParams, Layout, ProximityConfig, Route, SceneView,
    Session, SessionSnapshot, Transform, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Node(CubeId),
    Update(CubeId),
    Drop(CubeId),
    Connect(CubeId, CubeId),
    Disconnect(CubeId, CubeId),
    Show(CubeId, CubeId),
    Hide(CubeId, CubeId),
    Mesh(CubeId),
    Unmesh(CubeId),
}

#[derive(Default)]
struct Desk {
    events: Vec<Event>,
}

impl AudioGraph for Desk {
    fn create_node(&mut self, id: CubeId, _: CubeKind, _: &CubeParams) {
        self.events.push(Event::Node(id));
    }
    fn update_node(&mut self, id: CubeId, _: &CubeParams) {
        self.events.push(Event::Update(id));
    }
    fn remove_node(&mut self, id: CubeId) {
        self.events.push(Event::Drop(id));
    }
    fn connect(&mut self, from: CubeId, to: CubeId) {
        self.events.push(Event::Connect(from, to));
    }
    fn disconnect(&mut self, from: CubeId, to: CubeId) {
        self.events.push(Event::Disconnect(from, to));
    }
}

#[derive(Default)]
struct Screen {
    events: Vec<Event>,
    links: BTreeSet<(CubeId, CubeId)>,
}

impl SceneView for Screen {
    fn add_cube(&mut self, cube: &Cube) {
        self.events.push(Event::Mesh(cube.id));
    }
    fn update_cube(&mut self, _: CubeId, _: &Transform) {}
    fn remove_cube(&mut self, id: CubeId) {
        self.events.push(Event::Unmesh(id));
    }
    fn show_connection(&mut self, from: &Cube, to: &Cube, intensity: f32) {
        assert!((intensity - 1.0).abs() < f32::EPSILON);
        self.links.insert((from.id, to.id));
        self.events.push(Event::Show(from.id, to.id));
    }
    fn hide_connection(&mut self, from: CubeId, to: CubeId) {
        assert!(self.links.remove(&(from, to)), "hid a link that was never shown");
        self.events.push(Event::Hide(from, to));
    }
}

fn session() -> Session<Desk, Screen> {
    Session::new(ProximityConfig::default(), Desk::default(), Screen::default()).unwrap()
}

fn id_set(conns: &[Connection<CubeId>]) -> BTreeSet<ConnectionId<CubeId>> {
    conns.iter().map(|c| c.id.clone()).collect()
}

fn brute_force(cubes: &[Cube], threshold: f32) -> BTreeSet<ConnectionId<CubeId>> {
    let mut out = BTreeSet::new();
    for (i, a) in cubes.iter().enumerate() {
        for b in &cubes[i + 1..] {
            if a.transform.position.distance(b.transform.position) < threshold {
                out.insert(ConnectionId::new(a.id, b.id));
            }
        }
    }
    out
}

#[test]
fn table_scenario_drives_view_and_audio() {
    let mut s = session();
    let osc = s.add_cube(CubeKind::Oscillator, Vec3::ZERO).unwrap();
    let filt = s.add_cube(CubeKind::Filter, Vec3::new(1.0, 0.0, 0.0)).unwrap();
    let out = s.add_cube(CubeKind::Output, Vec3::new(10.0, 10.0, 10.0)).unwrap();

    assert_eq!(s.connections().len(), 1);
    assert_eq!(s.routes(), vec![Route { from: osc, to: filt }]);

    let report = s.move_cube(out, Vec3::new(1.5, 0.0, 0.0)).unwrap();
    assert_eq!(report.diff.added.len(), 2);
    assert!(report.diff.removed.is_empty());
    assert_eq!(report.connections, 3);
    assert_eq!(report.routes, 3);
    assert_eq!(s.view().links.len(), 3);
    assert!(s.signal_feedback().is_none());

    // Stored edges point low → high, so the proximity graph itself is acyclic.
    assert!(!s.has_cycle());

    s.move_cube(out, Vec3::new(10.0, 10.0, 10.0)).unwrap();
    assert_eq!(s.connections().len(), 1);
    assert_eq!(s.view().links.len(), 1);
    let audio = &s.audio().events;
    assert!(audio.contains(&Event::Disconnect(filt, out)));
    assert!(audio.contains(&Event::Disconnect(osc, out)));
}

#[test]
fn triangle_read_as_a_ring_is_a_cycle() {
    let mut s = Session::headless(ProximityConfig::default()).unwrap();
    for (kind, pos) in Layout::Triangle.placements() {
        s.add_cube(kind, pos).unwrap();
    }
    let mut edges = s.connections();
    assert_eq!(edges.len(), 3);
    assert!(!cycles::has_cycle(&edges));

    // 0→1, 1→2, 0→2: flip the last one to close the ring.
    let last = edges.iter_mut().find(|c| c.id == ConnectionId::new(CubeId(0), CubeId(2))).unwrap();
    std::mem::swap(&mut last.from, &mut last.to);
    assert!(cycles::has_cycle(&edges));
}

#[test]
fn filters_in_reach_feed_back() {
    let mut s = Session::headless(ProximityConfig::default()).unwrap();
    let a = s.add_cube(CubeKind::Filter, Vec3::ZERO).unwrap();
    let b = s.add_cube(CubeKind::Filter, Vec3::new(0.0, 0.0, 2.0)).unwrap();
    let path = s.signal_feedback().unwrap();
    assert_eq!(path.first(), path.last());
    assert!(path.contains(&a) && path.contains(&b));

    s.move_cube(b, Vec3::new(0.0, 0.0, 2.6)).unwrap();
    assert!(s.signal_feedback().is_none());
}

#[test]
fn removing_a_cube_unwires_before_dropping_its_node() {
    let mut s = session();
    let osc = s.add_cube(CubeKind::Oscillator, Vec3::ZERO).unwrap();
    let gain = s.add_cube(CubeKind::Gain, Vec3::new(0.5, 0.5, 0.0)).unwrap();
    s.remove_cube(gain).unwrap();

    let audio = &s.audio().events;
    let unplug = audio.iter().position(|e| *e == Event::Disconnect(osc, gain)).unwrap();
    let drop = audio.iter().position(|e| *e == Event::Drop(gain)).unwrap();
    assert!(unplug < drop);
    assert_eq!(s.view().events.last(), Some(&Event::Unmesh(gain)));
    assert!(s.connections().is_empty());
    assert_eq!(s.cube_count(), 1);
}

#[test]
fn rotation_updates_the_audio_node() {
    let mut s = session();
    let osc = s.add_cube(CubeKind::Oscillator, Vec3::ZERO).unwrap();
    let params = s.rotate_cube(osc, Vec3::new(0.0, 1.0, 0.0)).unwrap();
    assert_eq!(
        params,
        CubeParams::Oscillator {
            frequency_hz: 320.0,
            level: 0.2
        }
    );
    assert_eq!(s.audio().events.last(), Some(&Event::Update(osc)));
}

#[test]
fn random_walk_matches_brute_force() {
    let config = ProximityConfig::default();
    let mut s = Session::headless(config).unwrap();
    let mut rng = StdRng::seed_from_u64(0xC0BE);
    for (kind, pos) in (Layout::Scatter { count: 120, extent: 12.0, seed: 3 }).placements() {
        s.add_cube(kind, pos).unwrap();
    }
    let ids: Vec<CubeId> = s.cubes().map(|c| c.id).collect();

    for _ in 0..40 {
        for &id in &ids {
            let p = s.cube(id).unwrap().transform.position;
            let step = Vec3::new(rng.gen_range(-0.7..0.7), 0.0, rng.gen_range(-0.7..0.7));
            s.move_cube(id, p + step).unwrap();
        }
        let cubes: Vec<Cube> = s.cubes().cloned().collect();
        assert_eq!(id_set(&s.connections()), brute_force(&cubes, config.threshold));
    }
}

#[test]
fn reconfigure_converges_on_next_update() {
    let mut s = Session::headless(ProximityConfig::default()).unwrap();
    for (kind, pos) in (Layout::Chain { count: 6, spacing: 2.0 }).placements() {
        s.add_cube(kind, pos).unwrap();
    }
    assert_eq!(s.connections().len(), 5);

    s.reconfigure(ProximityConfig::new(3.0, 1.5).unwrap()).unwrap();
    assert_eq!(s.connections().len(), 5, "edges survive until the next update");
    let report = s.update().unwrap();
    assert_eq!(report.diff.removed.len(), 5);
    assert!(s.connections().is_empty());

    s.reconfigure(ProximityConfig::new(1.0, 4.5).unwrap()).unwrap();
    s.update().unwrap();
    let cubes: Vec<Cube> = s.cubes().cloned().collect();
    assert_eq!(id_set(&s.connections()), brute_force(&cubes, 4.5));
}

#[test]
fn snapshot_round_trips_through_json() {
    let mut s = Session::headless(ProximityConfig::default()).unwrap();
    for (kind, pos) in Layout::Triangle.placements() {
        s.add_cube(kind, pos).unwrap();
    }
    let snap = s.snapshot();
    let json = serde_json::to_string(&snap).unwrap();
    assert!(json.contains("\"oscillator\""));
    let back: SessionSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snap);
    assert_eq!(back.connections.len(), 3);
}

#[test]
fn clear_tears_everything_down() {
    let mut s = session();
    for (kind, pos) in (Layout::Ring { count: 8, radius: 2.0 }).placements() {
        s.add_cube(kind, pos).unwrap();
    }
    assert!(!s.connections().is_empty());
    s.clear();
    assert!(s.view().links.is_empty());
    let unmeshed = s.view().events.iter().filter(|e| matches!(e, Event::Unmesh(_))).count();
    assert_eq!(unmeshed, 8);
    assert!(s.routes().is_empty());
    assert_eq!(s.cube_count(), 0);
}
