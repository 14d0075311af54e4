use std::fmt;

/// Errors raised by the graph, the validator and the class decomposition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Storage for a core structure could not be obtained.
    #[error("cannot allocate {what} for {count} entries")]
    Allocation {
        /// Which structure failed to allocate.
        what: &'static str,
        /// Requested number of entries.
        count: usize,
    },

    /// An argument was rejected before any work was done.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The graph and a derived structure disagree (vertex id out of range,
    /// partition sized for a different graph, ...).
    #[error("structural error: {0}")]
    Structural(String),
}

impl GraphError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Allocation { .. } => ErrorCode::AllocationFailed,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Structural(_) => ErrorCode::StructuralError,
        }
    }
}

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidHeader,
    EdgeRejected,
    InvalidArgument,
    StructuralError,
    DimensionMismatch,
    AllocationFailed,
    NotMarkov,
    ConfigParseError,
    GraphReadFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidHeader => "E1001",
            Self::EdgeRejected => "E1002",
            Self::InvalidArgument => "E2001",
            Self::StructuralError => "E2002",
            Self::DimensionMismatch => "E2003",
            Self::AllocationFailed => "E3001",
            Self::NotMarkov => "E4001",
            Self::ConfigParseError => "E5001",
            Self::GraphReadFailed => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidHeader => "Missing or invalid vertex count",
            Self::EdgeRejected => "Edge rejected",
            Self::InvalidArgument => "Invalid argument",
            Self::StructuralError => "Graph structure inconsistency",
            Self::DimensionMismatch => "Matrix dimension mismatch",
            Self::AllocationFailed => "Allocation failed",
            Self::NotMarkov => "Graph is not a Markov chain",
            Self::ConfigParseError => "Config file parse error",
            Self::GraphReadFailed => "Graph file could not be read",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidHeader => {
                Some("The first line of the graph file must be a positive vertex count.")
            }
            Self::EdgeRejected => Some(
                "Edges must be `u v p` with 1 <= u, v <= N and 0 <= p <= 1; \
                 use edge_policy = \"skip\" to drop them instead.",
            ),
            Self::InvalidArgument => None,
            Self::StructuralError => Some("Retry once. If persistent, report a bug with logs."),
            Self::DimensionMismatch => None,
            Self::AllocationFailed => Some("The chain is too large for available memory."),
            Self::NotMarkov => Some(
                "Fix the outgoing probabilities of the listed vertices so each sums to 1.",
            ),
            Self::ConfigParseError => Some("Fix syntax in markov.toml and retry."),
            Self::GraphReadFailed => Some("Check the path and read permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, GraphError};
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::InvalidHeader,
            ErrorCode::EdgeRejected,
            ErrorCode::InvalidArgument,
            ErrorCode::StructuralError,
            ErrorCode::DimensionMismatch,
            ErrorCode::AllocationFailed,
            ErrorCode::NotMarkov,
            ErrorCode::ConfigParseError,
            ErrorCode::GraphReadFailed,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::StructuralError.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn graph_errors_map_to_codes() {
        let err = GraphError::Structural("vertex 7 out of range".into());
        assert_eq!(err.code(), ErrorCode::StructuralError);
        assert_eq!(
            err.to_string(),
            "structural error: vertex 7 out of range"
        );

        let err = GraphError::Allocation {
            what: "adjacency table",
            count: 3,
        };
        assert_eq!(err.code(), ErrorCode::AllocationFailed);
    }
}
