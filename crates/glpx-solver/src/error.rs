//! Configuration, decoding and search-tree errors.

use glpx_abi::AbiError;

use crate::tags::Reason;

/// Error raised while building solver options, before any engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A tag that names no value of its option.
    UnknownValue { option: &'static str, value: String },
    /// A key the solver does not accept.
    UnknownOption { solver: &'static str, key: String },
    /// A value that does not parse as the option's type.
    InvalidValue {
        option: &'static str,
        value: String,
        expected: &'static str,
    },
    /// A solver name other than simplex, exact, interior or intopt.
    UnknownSolver { name: String },
    /// A malformed options document.
    Parse { message: String },
}

impl ConfigError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::UnknownValue { .. } => "CONFIG_UNKNOWN_VALUE",
            ConfigError::UnknownOption { .. } => "CONFIG_UNKNOWN_OPTION",
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE",
            ConfigError::UnknownSolver { .. } => "CONFIG_UNKNOWN_SOLVER",
            ConfigError::Parse { .. } => "CONFIG_PARSE",
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnknownValue { option, value } => {
                write!(f, "[{}] unknown {} '{}'", self.code(), option, value)
            }
            ConfigError::UnknownOption { solver, key } => write!(
                f,
                "[{}] {} has no option '{}'",
                self.code(),
                solver,
                key
            ),
            ConfigError::InvalidValue {
                option,
                value,
                expected,
            } => write!(
                f,
                "[{}] {} expects {}, got '{}'",
                self.code(),
                option,
                expected,
                value
            ),
            ConfigError::UnknownSolver { name } => write!(
                f,
                "[{}] unknown solver '{}' (expected simplex, exact, interior or intopt)",
                self.code(),
                name
            ),
            ConfigError::Parse { message } => {
                write!(f, "[{}] invalid options: {}", self.code(), message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error raised while translating engine output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The engine returned a code with no mapping for this call.
    UnknownCode { call: &'static str, code: i32 },
    /// A combined row/column index outside `1..=rows+cols`.
    IndexOutOfRange { index: i64, total: u32 },
}

impl DecodeError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            DecodeError::UnknownCode { .. } => "DECODE_UNKNOWN_CODE",
            DecodeError::IndexOutOfRange { .. } => "DECODE_INDEX_OUT_OF_RANGE",
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::UnknownCode { call, code } => write!(
                f,
                "[{}] unknown engine code {} from {}",
                self.code(),
                code,
                call
            ),
            DecodeError::IndexOutOfRange { index, total } => write!(
                f,
                "[{}] engine returned index {} outside 1..={}",
                self.code(),
                index,
                total
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Error raised by a search-tree operation inside an `intopt` callback.
///
/// Every check runs before the engine is called, because the engine aborts
/// the process on misuse.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeError {
    Abi(AbiError),
    Decode(DecodeError),
    /// The operation is only valid for another callback reason.
    NotAllowed {
        operation: &'static str,
        reason: Reason,
    },
    /// A node handed out by an earlier callback invocation.
    StaleNode { reference: i32 },
    /// The operation needs a node from the active list.
    InactiveNode { reference: i32 },
    /// The column is not a candidate for branching at the current node.
    NotBranchable { column: u32 },
    /// A decision that may be taken once per invocation was taken again.
    Repeated { operation: &'static str },
    /// A heuristic solution with the wrong number of columns.
    SolutionLength { expected: u32, got: usize },
}

impl TreeError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            TreeError::Abi(err) => err.code(),
            TreeError::Decode(err) => err.code(),
            TreeError::NotAllowed { .. } => "TREE_NOT_ALLOWED",
            TreeError::StaleNode { .. } => "TREE_STALE_NODE",
            TreeError::InactiveNode { .. } => "TREE_INACTIVE_NODE",
            TreeError::NotBranchable { .. } => "TREE_NOT_BRANCHABLE",
            TreeError::Repeated { .. } => "TREE_REPEATED",
            TreeError::SolutionLength { .. } => "TREE_SOLUTION_LENGTH",
        }
    }
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeError::Abi(err) => write!(f, "{}", err),
            TreeError::Decode(err) => write!(f, "{}", err),
            TreeError::NotAllowed { operation, reason } => write!(
                f,
                "[{}] {} is not allowed in a '{}' callback",
                self.code(),
                operation,
                reason
            ),
            TreeError::StaleNode { reference } => write!(
                f,
                "[{}] node {} belongs to an earlier callback",
                self.code(),
                reference
            ),
            TreeError::InactiveNode { reference } => write!(
                f,
                "[{}] node {} is not in the active list",
                self.code(),
                reference
            ),
            TreeError::NotBranchable { column } => write!(
                f,
                "[{}] cannot branch on column {}",
                self.code(),
                column
            ),
            TreeError::Repeated { operation } => write!(
                f,
                "[{}] {} was already called in this callback",
                self.code(),
                operation
            ),
            TreeError::SolutionLength { expected, got } => write!(
                f,
                "[{}] heuristic solution has {} values, expected {}",
                self.code(),
                got,
                expected
            ),
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TreeError::Abi(err) => Some(err),
            TreeError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AbiError> for TreeError {
    fn from(err: AbiError) -> Self {
        TreeError::Abi(err)
    }
}

impl From<DecodeError> for TreeError {
    fn from(err: DecodeError) -> Self {
        TreeError::Decode(err)
    }
}
