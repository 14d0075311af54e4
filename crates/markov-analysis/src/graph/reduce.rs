//! Transitive reduction of the class links.
//!
//! Two strengths are available:
//!
//! - [`reduce`] (one-hop): a link `A → C` is dropped when some class `B`
//!   has both `A → B` and `B → C` in the *current* set. Longer detours do not
//!   count, so the result is not always the minimal DAG.
//! - [`reduce_full`]: a link `A → C` is dropped whenever `C` is reachable
//!   from another successor of `A`. This yields the unique transitive
//!   reduction of the DAG.
//!
//! Both preserve reachability between classes and never add links.

use fixedbitset::FixedBitSet;
use petgraph::algo::toposort;
use tracing::{debug, instrument, warn};

use markov_core::ReductionMode;

use super::condense::{Link, LinkSet};

/// Apply the reduction selected by `mode`. Returns the number of links
/// removed.
pub fn apply(links: &mut LinkSet, mode: ReductionMode) -> usize {
    match mode {
        ReductionMode::OneHop => reduce(links),
        ReductionMode::Full => reduce_full(links),
    }
}

/// One-hop reduction, in place.
///
/// Links are examined in insertion order; a removal is visible to every
/// later check. Because the removed link is bypassed by a surviving
/// two-link path, reachability is unchanged at every step.
#[instrument(skip_all, fields(links = links.len()))]
pub fn reduce(links: &mut LinkSet) -> usize {
    let snapshot: Vec<Link> = links.iter().collect();
    let mut removed = 0;

    for Link { from: a, to: c } in snapshot {
        let bypassed = links
            .successors(a)
            .any(|b| b != c && links.contains(b, c));
        if bypassed && links.remove(a, c) {
            removed += 1;
        }
    }

    debug!(removed, "one-hop reduction complete");
    removed
}

/// Full transitive reduction, in place.
///
/// Classes are processed sinks first so every successor's reachable set is
/// complete before it is folded into its predecessors. If the links are not
/// acyclic nothing is removed.
#[instrument(skip_all, fields(links = links.len()))]
pub fn reduce_full(links: &mut LinkSet) -> usize {
    let g = links.to_digraph();
    let Ok(topo) = toposort(&g, None) else {
        warn!("class links contain a cycle; skipping full reduction");
        return 0;
    };

    let n = links.class_count();
    let mut reachable: Vec<FixedBitSet> = vec![FixedBitSet::with_capacity(n); n];
    for node in topo.iter().rev() {
        let u = g[*node];
        let mut reach_u = FixedBitSet::with_capacity(n);
        for v in links.successors(u) {
            reach_u.insert(v);
            reach_u.union_with(&reachable[v]);
        }
        reachable[u] = reach_u;
    }

    let redundant: Vec<Link> = links
        .iter()
        .filter(|link| {
            links
                .successors(link.from)
                .filter(|&w| w != link.to)
                .any(|w| reachable[w].contains(link.to))
        })
        .collect();

    let mut removed = 0;
    for link in redundant {
        if links.remove(link.from, link.to) {
            removed += 1;
        }
    }

    debug!(removed, "full reduction complete");
    removed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn set(n: usize, links: &[(usize, usize)]) -> LinkSet {
        let mut s = LinkSet::new(n);
        for &(a, b) in links {
            s.insert(a, b);
        }
        s
    }

    fn pairs(s: &LinkSet) -> Vec<(usize, usize)> {
        s.iter().map(|l| (l.from, l.to)).collect()
    }

    #[test]
    fn triangle_loses_shortcut() {
        let mut s = set(3, &[(0, 1), (1, 2), (0, 2)]);
        assert_eq!(reduce(&mut s), 1);
        assert_eq!(pairs(&s), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn chain_is_untouched() {
        let mut s = set(4, &[(0, 1), (1, 2), (2, 3)]);
        assert_eq!(reduce(&mut s), 0);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn one_hop_keeps_long_shortcut() {
        // 0 -> 3 is implied by 0 -> 1 -> 2 -> 3 but no single middle class
        // bypasses it.
        let mut s = set(4, &[(0, 1), (1, 2), (2, 3), (0, 3)]);
        assert_eq!(reduce(&mut s), 0);
        assert!(s.contains(0, 3));
    }

    #[test]
    fn full_reduction_drops_long_shortcut() {
        let mut s = set(4, &[(0, 1), (1, 2), (2, 3), (0, 3)]);
        assert_eq!(reduce_full(&mut s), 1);
        assert!(!s.contains(0, 3));
        assert_eq!(pairs(&s), vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn one_hop_reaches_fixed_point_on_diamond_with_shortcut() {
        // 0 -> 1 -> 3, 0 -> 2 -> 3, 0 -> 3
        let mut s = set(4, &[(0, 1), (0, 2), (1, 3), (2, 3), (0, 3)]);
        assert_eq!(reduce(&mut s), 1);
        assert!(!s.contains(0, 3));
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn apply_dispatches_on_mode() {
        let mut one = set(4, &[(0, 1), (1, 2), (2, 3), (0, 3)]);
        let mut full = one.clone();
        assert_eq!(apply(&mut one, ReductionMode::OneHop), 0);
        assert_eq!(apply(&mut full, ReductionMode::Full), 1);
    }

    #[test]
    fn full_reduction_leaves_cycles_alone() {
        let mut s = set(3, &[(0, 1), (1, 2), (2, 0), (0, 2)]);
        assert_eq!(reduce_full(&mut s), 0);
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn empty_set_is_a_no_op() {
        let mut s = LinkSet::new(2);
        assert_eq!(reduce(&mut s), 0);
        assert_eq!(reduce_full(&mut s), 0);
    }
}
