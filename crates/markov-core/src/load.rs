//! Text loader for transition graphs.
//!
//! # Format
//!
//! ```text
//! 3
//! 1 2 0.6
//! 1 3 0.4
//! 2 1 1.0
//! 3 3 1.0
//! ```
//!
//! The first non-blank line is the vertex count `N` (a positive integer).
//! Every following non-blank line is an edge `u v p` with 1-based vertex ids
//! and a probability. Ids are converted to 0-based on insertion.
//!
//! # Tolerance
//!
//! With [`EdgePolicy::Skip`] (the default) a line that does not parse as
//! three numbers is skipped and counted, and an edge the graph refuses
//! (endpoint outside `1..=N`, probability outside `[0, 1]`) is dropped and
//! counted by the graph. With [`EdgePolicy::Strict`] the first such line
//! fails the whole load.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{ErrorCode, GraphError};
use crate::graph::{EdgeOutcome, WeightedDigraph};

/// What to do with a malformed line or a rejected edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgePolicy {
    /// Drop it, count it, keep loading.
    #[default]
    Skip,
    /// Fail the load.
    Strict,
}

/// Errors from loading a graph file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// I/O error while reading the input.
    #[error("graph I/O error: {0}")]
    Io(#[from] io::Error),

    /// The first line is missing or is not a positive integer.
    #[error("missing or invalid vertex count: {0:?}")]
    Header(String),

    /// A line was malformed or its edge was rejected under the strict policy.
    #[error("line {line}: {reason}")]
    Rejected {
        /// 1-based line number in the input.
        line: usize,
        /// Why the line was refused.
        reason: String,
    },

    /// The graph could not be created.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl LoadError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) => ErrorCode::GraphReadFailed,
            Self::Header(_) => ErrorCode::InvalidHeader,
            Self::Rejected { .. } => ErrorCode::EdgeRejected,
            Self::Graph(err) => err.code(),
        }
    }
}

/// A loaded graph plus what the loader had to drop.
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// The graph built from every accepted edge.
    pub graph: WeightedDigraph,
    /// Lines that did not parse as `u v p`.
    pub skipped_lines: usize,
}

impl LoadReport {
    /// Number of edges inserted into the graph.
    #[must_use]
    pub const fn accepted(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of well-formed edges the graph refused.
    #[must_use]
    pub const fn rejected(&self) -> usize {
        self.graph.rejected_count()
    }

    /// Return `true` if nothing was dropped.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.skipped_lines == 0 && self.rejected() == 0
    }
}

/// Read a graph from the file at `path`.
///
/// # Errors
///
/// See [`read_graph`]; additionally [`LoadError::Io`] if the file cannot be
/// opened.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_graph_file(path: &Path, policy: EdgePolicy) -> Result<LoadReport, LoadError> {
    read_graph(File::open(path)?, policy)
}

/// Read a graph in the text format from `reader`.
///
/// # Errors
///
/// - [`LoadError::Header`] if the vertex count is missing or not positive.
/// - [`LoadError::Rejected`] on the first bad line under
///   [`EdgePolicy::Strict`].
/// - [`LoadError::Io`] on read failures.
/// - [`LoadError::Graph`] if the graph cannot be allocated.
pub fn read_graph<R: Read>(reader: R, policy: EdgePolicy) -> Result<LoadReport, LoadError> {
    let mut lines = BufReader::new(reader).lines().enumerate();

    let n = loop {
        let Some((_, line)) = lines.next() else {
            return Err(LoadError::Header(String::new()));
        };
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match trimmed.parse::<usize>() {
            Ok(n) if n > 0 => break n,
            _ => return Err(LoadError::Header(trimmed.to_string())),
        }
    };

    let mut graph = WeightedDigraph::new(n)?;
    let mut skipped_lines = 0;

    for (idx, line) in lines {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some((u, v, p)) = parse_edge_line(trimmed) else {
            if policy == EdgePolicy::Strict {
                return Err(LoadError::Rejected {
                    line: line_no,
                    reason: format!("expected `u v p`, got {trimmed:?}"),
                });
            }
            debug!(line = line_no, "skipping malformed edge line");
            skipped_lines += 1;
            continue;
        };

        if let EdgeOutcome::Rejected(reason) = graph.add_edge(to_index(u), to_index(v), p) {
            if policy == EdgePolicy::Strict {
                return Err(LoadError::Rejected {
                    line: line_no,
                    reason: reason.to_string(),
                });
            }
            debug!(line = line_no, %reason, "edge rejected");
        }
    }

    let report = LoadReport {
        graph,
        skipped_lines,
    };

    if !report.is_complete() {
        warn!(
            accepted = report.accepted(),
            rejected = report.rejected(),
            skipped_lines = report.skipped_lines,
            "graph loaded partially"
        );
    }

    Ok(report)
}

fn parse_edge_line(line: &str) -> Option<(i64, i64, f64)> {
    let mut tokens = line.split_whitespace();
    let u = tokens.next()?.parse().ok()?;
    let v = tokens.next()?.parse().ok()?;
    let p = tokens.next()?.parse().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    Some((u, v, p))
}

/// Convert a 1-based file id to a 0-based vertex, mapping anything below 1
/// to an id the graph will reject.
fn to_index(id: i64) -> usize {
    id.checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
        .unwrap_or(usize::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = "3\n1 2 0.6\n1 3 0.4\n2 1 1.0\n3 3 1.0\n";

    #[test]
    fn loads_scenario_with_zero_based_ids() {
        let report = read_graph(SCENARIO.as_bytes(), EdgePolicy::Skip).expect("load");
        assert!(report.is_complete());
        assert_eq!(report.graph.vertex_count(), 3);
        assert_eq!(report.accepted(), 4);

        let first: Vec<(usize, f64)> = report
            .graph
            .edges_from(0)
            .map(|e| (e.to, e.weight))
            .collect();
        assert_eq!(first, vec![(1, 0.6), (2, 0.4)]);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let input = "\n\n2\n\n1 2 1.0\n\n2 1 1.0\n";
        let report = read_graph(input.as_bytes(), EdgePolicy::Skip).expect("load");
        assert_eq!(report.accepted(), 2);
        assert_eq!(report.skipped_lines, 0);
    }

    #[test]
    fn missing_header_is_an_error() {
        let err = read_graph("".as_bytes(), EdgePolicy::Skip).unwrap_err();
        assert!(matches!(err, LoadError::Header(_)));
        assert_eq!(err.code(), ErrorCode::InvalidHeader);
    }

    #[test]
    fn non_positive_header_is_an_error() {
        for input in ["0\n", "-3\n", "three\n"] {
            let err = read_graph(input.as_bytes(), EdgePolicy::Skip).unwrap_err();
            assert!(matches!(err, LoadError::Header(_)), "input {input:?}");
        }
    }

    #[test]
    fn malformed_and_out_of_range_lines_are_skipped() {
        let input = "2\n1 2 0.5\nnot an edge\n1 2\n0 1 0.5\n1 3 0.5\n1 1 1.5\n1 1 0.5 extra\n";
        let report = read_graph(input.as_bytes(), EdgePolicy::Skip).expect("load");
        assert_eq!(report.accepted(), 1);
        assert_eq!(report.skipped_lines, 3);
        assert_eq!(report.rejected(), 3);
        assert!(!report.is_complete());
    }

    #[test]
    fn strict_policy_fails_on_first_bad_line() {
        let input = "2\n1 2 0.5\n1 3 0.5\n";
        let err = read_graph(input.as_bytes(), EdgePolicy::Strict).unwrap_err();
        match err {
            LoadError::Rejected { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("target"), "reason: {reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn strict_policy_fails_on_malformed_line() {
        let input = "2\n1 2 abc\n";
        let err = read_graph(input.as_bytes(), EdgePolicy::Strict).unwrap_err();
        assert_eq!(err.code(), ErrorCode::EdgeRejected);
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("chain.txt");
        std::fs::write(&path, SCENARIO).expect("write");
        let report = read_graph_file(&path, EdgePolicy::Skip).expect("load");
        assert_eq!(report.accepted(), 4);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_graph_file(&dir.path().join("nope.txt"), EdgePolicy::Skip).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
        assert_eq!(err.code(), ErrorCode::GraphReadFailed);
    }

    #[test]
    fn id_conversion_rejects_zero_and_negative() {
        assert_eq!(to_index(1), 0);
        assert_eq!(to_index(0), usize::MAX);
        assert_eq!(to_index(-5), usize::MAX);
        assert_eq!(to_index(i64::MIN), usize::MAX);
    }
}
