//! `markov check`: verify that every vertex's outgoing probabilities sum to 1.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use markov_core::validate::{self, MarkovReport};
use markov_core::ErrorCode;
use serde::Serialize;

use super::{Context, fail, load_graph};
use crate::output::render_mode;

/// Arguments for `markov check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Graph file (`N` on the first line, then `u v p` per line).
    pub input: PathBuf,

    /// Lower bound of the accepted row sum (overrides config).
    #[arg(long)]
    pub lo: Option<f64>,

    /// Upper bound of the accepted row sum (overrides config).
    #[arg(long)]
    pub hi: Option<f64>,
}

#[derive(Debug, Serialize)]
struct CheckView {
    is_markov: bool,
    bad_count: usize,
    #[serde(flatten)]
    report: MarkovReport,
}

fn write_report(view: &CheckView, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "---- Markov Verification Report ----")?;
    writeln!(
        w,
        "Tolerance: [{:.3}, {:.3}]",
        view.report.band.lo, view.report.band.hi
    )?;
    for v in &view.report.vertices {
        let verdict = if v.ok { "OK" } else { "NOT OK" };
        writeln!(w, "Vertex {}: sum = {:.3}  --> {verdict}", v.vertex, v.sum)?;
    }
    writeln!(w, "Vertices failing check: {}", view.bad_count)
}

fn write_summary(view: &CheckView, w: &mut dyn Write) -> std::io::Result<()> {
    let bad: Vec<String> = view
        .report
        .bad_vertices()
        .map(|v| format!("{}={:.3}", v.vertex, v.sum))
        .collect();
    if bad.is_empty() {
        writeln!(w, "markov ok {}", view.report.vertices.len())
    } else {
        writeln!(w, "not-markov {} {}", view.bad_count, bad.join(" "))
    }
}

/// Validate the chain in `args.input`; fails when any vertex is out of band.
///
/// # Errors
///
/// Returns an error if the graph cannot be loaded, the band is invalid, or
/// the graph is not a Markov chain.
pub fn run_check(args: &CheckArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = load_graph(ctx, &args.input)?;
    let lo = args.lo.unwrap_or(ctx.config.validation.lo);
    let hi = args.hi.unwrap_or(ctx.config.validation.hi);

    let report =
        validate::report(&graph, lo, hi).map_err(|err| fail(ctx.output, err.code(), &err))?;
    let check = report.check();
    let view = CheckView {
        is_markov: check.is_markov,
        bad_count: check.bad_count,
        report,
    };

    render_mode(ctx.output, &view, write_summary, write_report)?;

    if !check.is_markov {
        return Err(fail(
            ctx.output,
            ErrorCode::NotMarkov,
            &format_args!("{} vertices out of [{lo}, {hi}]", check.bad_count),
        ));
    }
    Ok(())
}
