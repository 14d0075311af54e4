//! `markov analyze`: the full report.
//!
//! Transition matrix, `M^3` and `M^7`, the global convergence test, the
//! class partition and, per class, the stationary approximation and period.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use markov_analysis::matrix::power;
use markov_analysis::{ChainAnalysis, ChainStats, ClassKind, PowerIteration, TransitionMatrix};
use serde::Serialize;

use super::{Context, fail, load_graph};
use crate::output::{id_list, pretty_kv, pretty_matrix, pretty_section, render_mode, write_matrix};

/// Arguments for `markov analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Graph file (`N` on the first line, then `u v p` per line).
    pub input: PathBuf,

    /// Convergence threshold on the L1 distance between successive powers.
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Maximum number of multiplications per power iteration.
    #[arg(long = "max-iter")]
    pub max_iter: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ClassView<'a> {
    id: usize,
    vertices: Vec<usize>,
    kind: ClassKind,
    period: usize,
    stationary: &'a PowerIteration,
}

#[derive(Debug, Serialize)]
struct AnalyzeView<'a> {
    content_hash: &'a str,
    is_markov: bool,
    matrix: &'a TransitionMatrix,
    m3: TransitionMatrix,
    m7: TransitionMatrix,
    global: &'a PowerIteration,
    classes: Vec<ClassView<'a>>,
    stats: &'a ChainStats,
}

type MatrixWriter = fn(&mut dyn Write, &TransitionMatrix) -> io::Result<()>;

fn write_convergence(
    w: &mut dyn Write,
    label: &str,
    it: &PowerIteration,
    matrix_fn: MatrixWriter,
) -> io::Result<()> {
    writeln!(w, "=== {label} ===")?;
    match (it.converged, it.diff) {
        (true, Some(diff)) => {
            writeln!(
                w,
                "  Convergence reached at n = {} (difference = {diff:e})",
                it.iterations
            )?;
            writeln!(w, "  Candidate stationary distribution:")?;
            matrix_fn(w, &it.result)?;
        }
        _ => writeln!(
            w,
            "  No convergence after {} iterations (graph may be periodic)",
            it.iterations
        )?,
    }
    Ok(())
}

fn write_analysis(
    view: &AnalyzeView<'_>,
    w: &mut dyn Write,
    matrix_fn: MatrixWriter,
) -> io::Result<()> {
    if !view.is_markov {
        writeln!(w, "warning: rows do not all sum to 1; results describe the raw weights")?;
        writeln!(w)?;
    }

    pretty_section(w, "1. Transition matrix M")?;
    matrix_fn(w, view.matrix)?;
    writeln!(w)?;
    pretty_section(w, "2. Matrix M^3 (3-step transition)")?;
    matrix_fn(w, &view.m3)?;
    writeln!(w)?;
    pretty_section(w, "3. Matrix M^7 (7-step transition)")?;
    matrix_fn(w, &view.m7)?;
    writeln!(w)?;

    pretty_section(w, "4. Global convergence test")?;
    write_convergence(w, "Global matrix", view.global, matrix_fn)?;
    writeln!(w)?;

    pretty_section(w, "5. Communicating classes")?;
    writeln!(w, "Number of classes: {}", view.classes.len())?;
    for class in &view.classes {
        writeln!(
            w,
            "  Class C{} (size {}): {{ {} }}  [{}]",
            class.id,
            class.vertices.len(),
            id_list(&class.vertices),
            class.kind
        )?;
    }
    writeln!(w)?;

    pretty_section(w, "6. Stationary distribution per class")?;
    for class in &view.classes {
        let label = format!("Class C{}", class.id);
        write_convergence(w, &label, class.stationary, matrix_fn)?;
        writeln!(w, "  Period of {label} = {}", class.period)?;
        writeln!(w)?;
    }

    pretty_section(w, "Summary")?;
    let stats = view.stats;
    pretty_kv(w, "Vertices", stats.vertex_count.to_string())?;
    pretty_kv(w, "Edges", stats.edge_count.to_string())?;
    pretty_kv(w, "Density", format!("{:.3}", stats.density))?;
    pretty_kv(w, "Classes", stats.class_count.to_string())?;
    pretty_kv(w, "Recurrent", stats.recurrent_count.to_string())?;
    pretty_kv(w, "Absorbing", stats.absorbing_count.to_string())?;
    pretty_kv(w, "Transient", stats.transient_count.to_string())?;
    pretty_kv(
        w,
        "Links",
        format!("{} ({} after reduction)", stats.link_count, stats.reduced_link_count),
    )?;
    pretty_kv(w, "Hash", view.content_hash)
}

/// Run the full analysis of `args.input`.
///
/// # Errors
///
/// Returns an error if the graph cannot be loaded or any stage fails.
pub fn run_analyze(args: &AnalyzeArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = load_graph(ctx, &args.input)?;

    let mut config = ctx.config.clone();
    if let Some(epsilon) = args.epsilon {
        config.power.epsilon = epsilon;
    }
    if let Some(max_iter) = args.max_iter {
        config.power.max_iterations = max_iter;
    }

    let analysis =
        ChainAnalysis::run(&graph, &config).map_err(|err| fail(ctx.output, err.code(), &err))?;
    let m3 = power(&analysis.matrix, 3).map_err(|err| fail(ctx.output, err.code(), &err))?;
    let m7 = power(&analysis.matrix, 7).map_err(|err| fail(ctx.output, err.code(), &err))?;

    let classes = analysis
        .classes
        .iter()
        .map(|c| ClassView {
            id: c.index + 1,
            vertices: c.vertices.iter().map(|v| v + 1).collect(),
            kind: c.kind,
            period: c.period,
            stationary: &c.stationary,
        })
        .collect();

    let view = AnalyzeView {
        content_hash: &analysis.content_hash,
        is_markov: analysis.validation.check().is_markov,
        matrix: &analysis.matrix,
        m3,
        m7,
        global: &analysis.global,
        classes,
        stats: &analysis.stats,
    };

    render_mode(
        ctx.output,
        &view,
        |v, w| write_analysis(v, w, write_matrix),
        |v, w| write_analysis(v, w, pretty_matrix),
    )
}
