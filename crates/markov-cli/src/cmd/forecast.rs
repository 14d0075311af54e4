use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use markov_analysis::TransitionMatrix;
use markov_analysis::matrix::distribution;
use markov_core::ErrorCode;
use serde::Serialize;

use super::{Context, fail, load_graph};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `markov forecast`.
#[derive(Args, Debug)]
pub struct ForecastArgs {
    /// Graph file (`N` on the first line, then `u v p` per line).
    pub input: PathBuf,

    /// Starting state (1-based).
    #[arg(long)]
    pub start: usize,

    /// Number of steps to take.
    #[arg(long, default_value_t = 1)]
    pub steps: usize,
}

#[derive(Debug, Serialize)]
struct StateProbability {
    state: usize,
    probability: f64,
}

#[derive(Debug, Serialize)]
struct ForecastView {
    start: usize,
    steps: usize,
    distribution: Vec<StateProbability>,
}

fn write_text(view: &ForecastView, w: &mut dyn Write) -> std::io::Result<()> {
    for s in &view.distribution {
        writeln!(w, "{} {:.6}", s.state, s.probability)?;
    }
    Ok(())
}

fn write_pretty(view: &ForecastView, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Forecast")?;
    pretty_kv(w, "Start", view.start.to_string())?;
    pretty_kv(w, "Steps", view.steps.to_string())?;
    writeln!(w)?;
    for s in &view.distribution {
        writeln!(w, "  State {:<4} {:>6.1}%", s.state, s.probability * 100.0)?;
    }
    Ok(())
}

/// Print the distribution after `args.steps` steps from `args.start`.
///
/// # Errors
///
/// Returns an error if the graph cannot be loaded or the start state is out
/// of range.
pub fn run_forecast(args: &ForecastArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = load_graph(ctx, &args.input)?;
    let matrix =
        TransitionMatrix::from_graph(&graph).map_err(|err| fail(ctx.output, err.code(), &err))?;

    let Some(start) = args.start.checked_sub(1) else {
        return Err(fail(
            ctx.output,
            ErrorCode::InvalidArgument,
            &"--start is 1-based; 0 is not a state",
        ));
    };
    let row = distribution(&matrix, start, args.steps)
        .map_err(|err| fail(ctx.output, err.code(), &err))?;

    let view = ForecastView {
        start: args.start,
        steps: args.steps,
        distribution: row
            .into_iter()
            .enumerate()
            .map(|(v, probability)| StateProbability {
                state: v + 1,
                probability,
            })
            .collect(),
    };
    render_mode(ctx.output, &view, write_text, write_pretty)
}
