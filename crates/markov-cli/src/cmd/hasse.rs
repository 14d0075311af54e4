use std::io::Write;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use tracing::info;

use super::classes::class_structure;
use super::{Context, load_graph};
use crate::mermaid::write_hasse;
use crate::output::open_sink;

/// Arguments for `markov hasse`.
#[derive(Args, Debug)]
pub struct HasseArgs {
    /// Graph file (`N` on the first line, then `u v p` per line).
    pub input: PathBuf,

    /// Write the diagram to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Draw every class link instead of the reduced set.
    #[arg(long)]
    pub no_reduce: bool,
}

/// Write the class diagram of `args.input` as Mermaid.
///
/// # Errors
///
/// Returns an error if the graph cannot be loaded or the output written.
pub fn run_hasse(args: &HasseArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = load_graph(ctx, &args.input)?;
    let structure = class_structure(ctx, &graph, args.no_reduce)?;

    let mut out = open_sink(args.output.as_deref())?;
    write_hasse(&mut *out, &structure.partition, &structure.links)
        .and_then(|()| out.flush())
        .context("failed to write class diagram")?;

    if let Some(path) = &args.output {
        info!(
            path = %path.display(),
            classes = structure.partition.class_count(),
            "wrote class diagram"
        );
    }
    Ok(())
}
