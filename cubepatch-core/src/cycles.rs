//! Cycle detection over directed arcs.
//!
//! Edges are read as arcs `from → to` exactly as stored. For proximity edges
//! that orientation is whatever was fixed at creation time, so this answers
//! "does the stored edge list contain a directed cycle", nothing more. Use
//! it on a real signal-flow graph to look for feedback loops.
//!
//! The traversal is an iterative DFS over an index arena: nodes get dense
//! indices, the adjacency lists hold indices, and an explicit frame stack
//! replaces recursion so deep chains cannot overflow the call stack.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::connection::Connection;

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Arena-backed directed graph.
#[derive(Clone, Debug)]
pub struct Digraph<K> {
    nodes: Vec<K>,
    index: BTreeMap<K, usize>,
    adjacency: Vec<Vec<usize>>,
    arcs: usize,
}

impl<K> Default for Digraph<K> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: BTreeMap::new(),
            adjacency: Vec::new(),
            arcs: 0,
        }
    }
}

impl<K: Ord + Clone> Digraph<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_arcs<'a, I>(arcs: I) -> Self
    where
        K: 'a,
        I: IntoIterator<Item = (&'a K, &'a K)>,
    {
        let mut graph = Self::new();
        for (from, to) in arcs {
            graph.add_arc(from, to);
        }
        graph
    }

    fn node(&mut self, key: &K) -> usize {
        if let Some(&i) = self.index.get(key) {
            return i;
        }
        let i = self.nodes.len();
        self.nodes.push(key.clone());
        self.index.insert(key.clone(), i);
        self.adjacency.push(Vec::new());
        i
    }

    pub fn add_arc(&mut self, from: &K, to: &K) {
        let f = self.node(from);
        let t = self.node(to);
        self.adjacency[f].push(t);
        self.arcs += 1;
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn arc_count(&self) -> usize {
        self.arcs
    }

    #[must_use]
    pub fn has_cycle(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// One directed cycle as `[a, b, …, a]`, or `None` if the graph is acyclic.
    ///
    /// Roots are tried in first-seen order; the first back-edge wins.
    #[must_use]
    pub fn find_cycle(&self) -> Option<Vec<K>> {
        let mut marks = alloc::vec![Mark::Unvisited; self.nodes.len()];
        // (node, next adjacency slot to explore)
        let mut frames: Vec<(usize, usize)> = Vec::new();

        for root in 0..self.nodes.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            marks[root] = Mark::OnStack;
            frames.push((root, 0));

            while let Some(frame) = frames.last_mut() {
                let (node, slot) = *frame;
                let Some(&next) = self.adjacency[node].get(slot) else {
                    marks[node] = Mark::Done;
                    frames.pop();
                    continue;
                };
                frame.1 += 1;
                match marks[next] {
                    Mark::OnStack => return Some(self.trace(&frames, next)),
                    Mark::Unvisited => {
                        marks[next] = Mark::OnStack;
                        frames.push((next, 0));
                    }
                    Mark::Done => {}
                }
            }
        }
        None
    }

    fn trace(&self, frames: &[(usize, usize)], entry: usize) -> Vec<K> {
        let start = frames.iter().position(|&(n, _)| n == entry).unwrap_or(0);
        let mut path: Vec<K> = frames[start..].iter().map(|&(n, _)| self.nodes[n].clone()).collect();
        path.push(self.nodes[entry].clone());
        path
    }
}

/// True if the edges, read `from → to`, contain a directed cycle.
#[must_use]
pub fn has_cycle<K: Ord + Clone>(edges: &[Connection<K>]) -> bool {
    find_cycle(edges).is_some()
}

/// First directed cycle found in the edges, read `from → to`.
#[must_use]
pub fn find_cycle<K: Ord + Clone>(edges: &[Connection<K>]) -> Option<Vec<K>> {
    Digraph::from_arcs(edges.iter().map(|c| (&c.from, &c.to))).find_cycle()
}
