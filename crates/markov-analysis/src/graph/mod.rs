//! Class structure of a transition graph.
//!
//! ## Pipeline
//!
//! ```text
//! WeightedDigraph
//!        ↓  scc::decompose()
//! Partition (communicating classes, sinks first)
//!        ↓  condense::build()
//! LinkSet (acyclic links between classes)
//!        ↓  reduce::apply()
//! LinkSet (transitively reduced)
//!        ↓  classify::classify() / stats::ChainStats::compute()
//! ClassKind per class, ChainStats
//! ```

pub mod classify;
pub mod condense;
pub mod partition;
pub mod reduce;
pub mod scc;
pub mod stats;

pub use classify::{ClassKind, classify};
pub use condense::{Link, LinkSet};
pub use partition::{Class, Partition};
pub use scc::decompose;
pub use stats::ChainStats;

use petgraph::graph::DiGraph;

use markov_core::WeightedDigraph;

/// Copy `graph` into a petgraph graph; node `i` carries vertex id `i`, edge
/// weights are the transition probabilities.
#[must_use]
pub fn to_petgraph(graph: &WeightedDigraph) -> DiGraph<usize, f64> {
    let mut g = DiGraph::with_capacity(graph.vertex_count(), graph.edge_count());
    let nodes: Vec<_> = graph.vertices().map(|v| g.add_node(v)).collect();
    for edge in graph.edges() {
        g.add_edge(nodes[edge.from], nodes[edge.to], edge.weight);
    }
    g
}
