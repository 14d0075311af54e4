//! Condensation: the directed links between communicating classes.
//!
//! A link `A → B` exists iff some edge `u → v` has `u ∈ A`, `v ∈ B` and
//! `A ≠ B`. Each ordered pair appears at most once, in the order it was
//! first discovered while scanning vertices in increasing order and each
//! vertex's edges in adjacency order. The resulting graph over classes is
//! always acyclic.

use std::collections::HashSet;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use serde::{Serialize, Serializer};
use tracing::{debug, instrument};

use markov_core::{GraphError, WeightedDigraph};

use super::partition::Partition;

/// A directed link between two distinct classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Link {
    pub from: usize,
    pub to: usize,
}

/// Duplicate-free, insertion-ordered set of class links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSet {
    class_count: usize,
    links: Vec<Link>,
    index: HashSet<Link>,
}

impl Serialize for LinkSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.links.serialize(serializer)
    }
}

impl LinkSet {
    /// An empty link set over `class_count` classes.
    #[must_use]
    pub fn new(class_count: usize) -> Self {
        Self {
            class_count,
            links: Vec::new(),
            index: HashSet::new(),
        }
    }

    /// Insert `from → to`. Returns `false` for self-links, out-of-range
    /// classes and duplicates.
    pub fn insert(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.class_count || to >= self.class_count {
            return false;
        }
        let link = Link { from, to };
        if !self.index.insert(link) {
            return false;
        }
        self.links.push(link);
        true
    }

    /// Remove `from → to`, keeping the order of the remaining links.
    pub fn remove(&mut self, from: usize, to: usize) -> bool {
        let link = Link { from, to };
        if !self.index.remove(&link) {
            return false;
        }
        self.links.retain(|l| *l != link);
        true
    }

    #[must_use]
    pub fn contains(&self, from: usize, to: usize) -> bool {
        self.index.contains(&Link { from, to })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Number of classes the links range over.
    #[must_use]
    pub const fn class_count(&self) -> usize {
        self.class_count
    }

    /// Links in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Link> + '_ {
        self.links.iter().copied()
    }

    /// Targets of links leaving `class`, in insertion order.
    pub fn successors(&self, class: usize) -> impl Iterator<Item = usize> + '_ {
        self.links
            .iter()
            .filter(move |l| l.from == class)
            .map(|l| l.to)
    }

    /// Number of links leaving `class`.
    #[must_use]
    pub fn out_degree(&self, class: usize) -> usize {
        self.successors(class).count()
    }

    /// The links as a petgraph graph; node `i` carries class index `i`.
    #[must_use]
    pub fn to_digraph(&self) -> DiGraph<usize, ()> {
        let mut g = DiGraph::with_capacity(self.class_count, self.links.len());
        let nodes: Vec<_> = (0..self.class_count).map(|c| g.add_node(c)).collect();
        for link in &self.links {
            g.add_edge(nodes[link.from], nodes[link.to], ());
        }
        g
    }

    /// Return `true` if the class graph has no directed cycle.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.to_digraph())
    }
}

/// Derive the class links of `graph` under `partition`.
///
/// # Errors
///
/// Returns [`GraphError::Structural`] if the partition does not cover
/// exactly the graph's vertices.
#[instrument(skip_all, fields(classes = partition.class_count()))]
pub fn build(graph: &WeightedDigraph, partition: &Partition) -> Result<LinkSet, GraphError> {
    if partition.vertex_count() != graph.vertex_count() {
        return Err(GraphError::Structural(format!(
            "partition covers {} vertices but the graph has {}",
            partition.vertex_count(),
            graph.vertex_count()
        )));
    }

    let mut links = LinkSet::new(partition.class_count());
    for edge in graph.edges() {
        let (Some(a), Some(b)) = (partition.class_of(edge.from), partition.class_of(edge.to)) else {
            return Err(GraphError::Structural(format!(
                "edge {} -> {} has an unassigned endpoint",
                edge.from, edge.to
            )));
        };
        if a != b {
            links.insert(a, b);
        }
    }

    debug!(links = links.len(), "condensation built");
    Ok(links)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
