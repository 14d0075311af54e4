pub mod analyze;
pub mod check;
pub mod classes;
pub mod completions;
pub mod export;
pub mod forecast;
pub mod hasse;

use std::fmt::Display;
use std::path::Path;

use markov_core::load::read_graph_file;
use markov_core::{AnalysisConfig, ErrorCode, WeightedDigraph};
use tracing::debug;

use crate::output::{CliError, OutputMode, render_error};

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputMode,
    pub config: AnalysisConfig,
}

/// Render `code` with `detail` as a structured error and return it for `?`.
pub fn fail(output: OutputMode, code: ErrorCode, detail: &dyn Display) -> anyhow::Error {
    let message = format!("{}: {detail}", code.message());
    if let Err(err) = render_error(output, &CliError::from_code(code, message.clone())) {
        return err;
    }
    anyhow::anyhow!(message)
}

/// Load the graph at `path` under the configured edge policy, rendering a
/// hard load failure before returning it.
pub fn load_graph(ctx: &Context, path: &Path) -> anyhow::Result<WeightedDigraph> {
    let report = read_graph_file(path, ctx.config.load.edge_policy)
        .map_err(|err| fail(ctx.output, err.code(), &format_args!("{}: {err}", path.display())))?;
    debug!(
        path = %path.display(),
        vertices = report.graph.vertex_count(),
        accepted = report.accepted(),
        "graph loaded"
    );
    Ok(report.graph)
}
