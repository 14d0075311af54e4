//! Recurrent / transient labelling of communicating classes.

use serde::Serialize;

use markov_core::WeightedDigraph;

use super::condense::LinkSet;
use super::partition::Partition;

/// Long-run behaviour of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    /// Has a link to another class; probability mass eventually leaves.
    Transient,
    /// Closed: no link leaves the class.
    Recurrent,
    /// A closed single vertex with a self-loop.
    Absorbing,
}

impl ClassKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Recurrent => "recurrent",
            Self::Absorbing => "absorbing",
        }
    }

    /// Absorbing classes are recurrent too.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        !matches!(self, Self::Transient)
    }
}

impl std::fmt::Display for ClassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label every class of `partition`, indexed like the partition.
///
/// A closed singleton without a self-loop (a vertex with no outgoing edges
/// at all) is reported as [`ClassKind::Recurrent`].
#[must_use]
pub fn classify(graph: &WeightedDigraph, partition: &Partition, links: &LinkSet) -> Vec<ClassKind> {
    partition
        .classes()
        .iter()
        .enumerate()
        .map(|(idx, class)| {
            if links.out_degree(idx) > 0 {
                ClassKind::Transient
            } else if class.len() == 1 && graph.has_self_loop(class.vertices[0]) {
                ClassKind::Absorbing
            } else {
                ClassKind::Recurrent
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{condense, scc};

    fn kinds(n: usize, edges: &[(usize, usize, f64)]) -> Vec<(Vec<usize>, ClassKind)> {
        let g = WeightedDigraph::from_edges(n, edges.iter().copied()).expect("graph");
        let p = scc::decompose(&g).expect("decompose");
        let links = condense::build(&g, &p).expect("links");
        let mut out: Vec<(Vec<usize>, ClassKind)> = p
            .classes()
            .iter()
            .zip(classify(&g, &p, &links))
            .map(|(c, k)| {
                let mut v = c.vertices.clone();
                v.sort_unstable();
                (v, k)
            })
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    #[test]
    fn scenario_kinds() {
        let got = kinds(3, &[(0, 1, 0.6), (0, 2, 0.4), (1, 0, 1.0), (2, 2, 1.0)]);
        assert_eq!(
            got,
            vec![
                (vec![0, 1], ClassKind::Transient),
                (vec![2], ClassKind::Absorbing)
            ]
        );
    }

    #[test]
    fn closed_cycle_is_recurrent() {
        let got = kinds(2, &[(0, 1, 1.0), (1, 0, 1.0)]);
        assert_eq!(got, vec![(vec![0, 1], ClassKind::Recurrent)]);
        assert!(ClassKind::Absorbing.is_closed());
        assert!(!ClassKind::Transient.is_closed());
    }

    #[test]
    fn dead_end_vertex_is_recurrent_not_absorbing() {
        let got = kinds(2, &[(0, 1, 1.0)]);
        assert_eq!(
            got,
            vec![
                (vec![0], ClassKind::Transient),
                (vec![1], ClassKind::Recurrent)
            ]
        );
    }
}
