use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InputParseError,
    DanglingReference,
    InternalConsistency,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::InputParseError => "E1003",
            Self::DanglingReference => "E2001",
            Self::InternalConsistency => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InputParseError => "Edge input parse error",
            Self::DanglingReference => "Reference to unknown file",
            Self::InternalConsistency => "Internal consistency fault",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .tangle/config.toml and retry."),
            Self::InputParseError => {
                Some("Provide a JSON object mapping each file to an array of files it references.")
            }
            Self::DanglingReference => {
                Some("Every referenced file must also appear as a key in the edge input.")
            }
            Self::InternalConsistency => Some("This is a bug. Report it with the edge input attached."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Faults raised while building or analysing the dependency graph.
///
/// `DanglingReference` is an input problem and is detected before any
/// computation. The other variants mean an invariant of the closure broke;
/// they are never a legitimate input condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("file {file} references {target}, which is not in the file set")]
    DanglingReference { file: String, target: String },

    #[error("total fan-in {fan_in} does not match total fan-out {fan_out} after {stage}")]
    FanImbalance {
        stage: &'static str,
        fan_in: usize,
        fan_out: usize,
    },

    #[error("fixed-point relaxation over {residue} cyclic files did not settle within {limit} passes")]
    RelaxationDiverged { residue: usize, limit: usize },
}

impl GraphError {
    /// Machine code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DanglingReference { .. } => ErrorCode::DanglingReference,
            Self::FanImbalance { .. } | Self::RelaxationDiverged { .. } => {
                ErrorCode::InternalConsistency
            }
        }
    }

    /// `true` when the error signals a broken invariant rather than bad input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self.code(), ErrorCode::InternalConsistency)
    }
}
