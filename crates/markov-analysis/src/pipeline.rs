//! End-to-end chain analysis.
//!
//! [`ChainAnalysis::run`] strings every stage together: row-sum validation,
//! class decomposition, condensation, reduction, the global power iteration
//! and, per class, the submatrix period and stationary approximation.
//! Validation is advisory; a chain that fails it is still analysed.

use serde::Serialize;
use tracing::{info, instrument, warn};

use markov_core::{AnalysisConfig, MarkovReport, ReductionMode, WeightedDigraph, validate};

use crate::AnalysisError;
use crate::graph::{
    ChainStats, ClassKind, LinkSet, Partition, classify, condense, decompose, reduce,
};
use crate::matrix::{PowerIteration, TransitionMatrix, period, power_iterate, sub_matrix};

/// Analysis of one communicating class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassAnalysis {
    /// Index into the partition.
    pub index: usize,
    /// 0-based vertex ids in partition order.
    pub vertices: Vec<usize>,
    pub kind: ClassKind,
    /// gcd of return times within the class; 0 if none, 1 if aperiodic.
    pub period: usize,
    /// Power iteration of the class submatrix.
    pub stationary: PowerIteration,
}

/// Everything computed for one chain.
#[derive(Debug, Clone, Serialize)]
pub struct ChainAnalysis {
    /// BLAKE3 hash of the analysed edge set.
    pub content_hash: String,
    pub validation: MarkovReport,
    pub partition: Partition,
    /// Class links before reduction.
    pub links: LinkSet,
    /// Class links after reduction.
    pub reduced_links: LinkSet,
    pub reduction: ReductionMode,
    pub matrix: TransitionMatrix,
    /// Power iteration of the whole matrix.
    pub global: PowerIteration,
    pub classes: Vec<ClassAnalysis>,
    pub stats: ChainStats,
}

impl ChainAnalysis {
    /// Run the full pipeline on `graph`.
    ///
    /// # Errors
    ///
    /// Propagates the first stage error: an empty graph or invalid tolerance
    /// band, a malformed partition, an allocation failure, or an invalid
    /// power-iteration epsilon.
    #[instrument(skip_all, fields(vertices = graph.vertex_count(), edges = graph.edge_count()))]
    pub fn run(graph: &WeightedDigraph, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let validation = validate::report(graph, config.validation.lo, config.validation.hi)?;
        let check = validation.check();
        if !check.is_markov {
            warn!(
                bad_vertices = check.bad_count,
                "input is not a Markov chain; results describe the raw weights"
            );
        }

        let partition = decompose(graph)?;
        let links = condense::build(graph, &partition)?;
        if !links.is_acyclic() {
            warn!("class links contain a cycle");
        }
        let mut reduced_links = links.clone();
        let _ = reduce::apply(&mut reduced_links, config.reduction.mode);
        let kinds = classify(graph, &partition, &links);

        let matrix = TransitionMatrix::from_graph(graph)?;
        let (epsilon, max_iterations) = (config.power.epsilon, config.power.max_iterations);
        let global = power_iterate(&matrix, epsilon, max_iterations)?;

        let mut classes = Vec::with_capacity(partition.class_count());
        for ((index, class), &kind) in partition.classes().iter().enumerate().zip(&kinds) {
            let sub = sub_matrix(&matrix, &class.vertices)?;
            classes.push(ClassAnalysis {
                index,
                vertices: class.vertices.clone(),
                kind,
                period: period(&sub.matrix)?,
                stationary: power_iterate(&sub.matrix, epsilon, max_iterations)?,
            });
        }

        let stats = ChainStats::compute(graph, &partition, &kinds, &links, &reduced_links);
        info!(
            classes = stats.class_count,
            recurrent = stats.recurrent_count,
            converged = global.converged,
            "chain analysis complete"
        );

        Ok(Self {
            content_hash: graph.content_hash(),
            validation,
            partition,
            links,
            reduced_links,
            reduction: config.reduction.mode,
            matrix,
            global,
            classes,
            stats,
        })
    }

    /// Analysis of the class containing vertex `v` (0-based).
    #[must_use]
    pub fn class_of_vertex(&self, v: usize) -> Option<&ClassAnalysis> {
        self.partition
            .class_of(v)
            .and_then(|idx| self.classes.get(idx))
    }

    /// Closed classes, absorbing ones included.
    pub fn recurrent_classes(&self) -> impl Iterator<Item = &ClassAnalysis> + '_ {
        self.classes.iter().filter(|c| c.kind.is_closed())
    }
}
