//! `markov export`: render the transition graph as a Mermaid flowchart.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use markov_core::ErrorCode;
use markov_core::validate::check_all;
use tracing::{info, warn};

use super::{Context, fail, load_graph};
use crate::mermaid::write_graph;
use crate::output::open_sink;

/// Arguments for `markov export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Graph file (`N` on the first line, then `u v p` per line).
    pub input: PathBuf,

    /// Write the diagram to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Export even if the graph is not a Markov chain.
    #[arg(long)]
    pub force: bool,
}

/// Export `args.input` as Mermaid. Only valid chains are exported unless
/// `--force` is given.
///
/// # Errors
///
/// Returns an error if the graph cannot be loaded, fails validation without
/// `--force`, or the output cannot be written.
pub fn run_export(args: &ExportArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = load_graph(ctx, &args.input)?;
    let band = &ctx.config.validation;
    let check = check_all(&graph, band.lo, band.hi)
        .map_err(|err| fail(ctx.output, err.code(), &err))?;

    if !check.is_markov {
        if !args.force {
            return Err(fail(
                ctx.output,
                ErrorCode::NotMarkov,
                &format_args!(
                    "{} vertices out of band; pass --force to export anyway",
                    check.bad_count
                ),
            ));
        }
        warn!(bad_vertices = check.bad_count, "exporting a graph that is not a Markov chain");
    }

    let mut out = open_sink(args.output.as_deref())?;
    write_graph(&mut *out, &graph)
        .and_then(|()| out.flush())
        .context("failed to write graph diagram")?;

    if let Some(path) = &args.output {
        info!(path = %path.display(), vertices = graph.vertex_count(), "wrote graph diagram");
    }
    Ok(())
}
