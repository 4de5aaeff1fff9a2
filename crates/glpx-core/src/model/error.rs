//! Model error types.

use glpx_abi::{AbiError, EngineError};
use glpx_solver::{ConfigError, DecodeError, Status, TreeError};

use crate::ids::Entity;

/// Errors that can occur during model operations.
///
/// Engine outcomes such as infeasibility are returned as statuses and return
/// codes, never as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Failure at the engine boundary.
    Abi(AbiError),
    /// Invalid solver options.
    Config(ConfigError),
    /// Engine output that cannot be translated.
    Decode(DecodeError),
    /// A search-tree callback failed; the search was stopped.
    Tree(TreeError),
    /// A handle from a different model.
    ForeignEntity { entity: Entity },
    /// NaN or infinite where a number is required.
    NonNumeric { field: &'static str, value: f64 },
    /// The same key appears twice in one creation call.
    DuplicateKey { key: String },
    /// The last solve left no unbounded ray.
    NoRay,
    /// No basis factorization is available.
    NoBasis,
    /// A tableau row was requested for a nonbasic entity.
    NotBasic { entity: Entity },
    /// A tableau column was requested for a basic entity.
    NotNonbasic { entity: Entity },
    /// A report was requested before a solve produced a solution.
    StatusUnavailable { status: Status, solve: &'static str },
    /// The engine reader returned a nonzero status.
    ReadFailed { format: &'static str, code: i32 },
    /// The engine writer returned a nonzero status.
    WriteFailed { format: &'static str, code: i32 },
    /// Temporary file handling failed.
    Io { operation: &'static str, message: String },
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::Abi(err) => err.code(),
            ModelError::Config(err) => err.code(),
            ModelError::Decode(err) => err.code(),
            ModelError::Tree(err) => err.code(),
            ModelError::ForeignEntity { .. } => "ENTITY_FOREIGN",
            ModelError::NonNumeric { .. } => "VALUE_NON_NUMERIC",
            ModelError::DuplicateKey { .. } => "KEY_DUPLICATE",
            ModelError::NoRay => "RAY_MISSING",
            ModelError::NoBasis => "BASIS_MISSING",
            ModelError::NotBasic { .. } => "ENTITY_NOT_BASIC",
            ModelError::NotNonbasic { .. } => "ENTITY_NOT_NONBASIC",
            ModelError::StatusUnavailable { .. } => "STATUS_UNAVAILABLE",
            ModelError::ReadFailed { .. } => "READ_FAILED",
            ModelError::WriteFailed { .. } => "WRITE_FAILED",
            ModelError::Io { .. } => "IO_FAILED",
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::Abi(err) => write!(f, "{}", err),
            ModelError::Config(err) => write!(f, "{}", err),
            ModelError::Decode(err) => write!(f, "{}", err),
            ModelError::Tree(err) => write!(f, "{}", err),
            ModelError::ForeignEntity { entity } => write!(
                f,
                "[{}] {} belongs to another model",
                self.code(),
                entity
            ),
            ModelError::NonNumeric { field, value } => write!(
                f,
                "[{}] {} must be a number (got {})",
                self.code(),
                field,
                value
            ),
            ModelError::DuplicateKey { key } => {
                write!(f, "[{}] duplicate key '{}'", self.code(), key)
            }
            ModelError::NoRay => write!(f, "[{}] no unbounded ray", self.code()),
            ModelError::NoBasis => write!(
                f,
                "[{}] no basis factorization; run simplex first",
                self.code()
            ),
            ModelError::NotBasic { entity } => {
                write!(f, "[{}] {} is not basic", self.code(), entity)
            }
            ModelError::NotNonbasic { entity } => {
                write!(f, "[{}] {} is not nonbasic", self.code(), entity)
            }
            ModelError::StatusUnavailable { status, solve } => write!(
                f,
                "[{}] status is '{}', run {} first",
                self.code(),
                status,
                solve
            ),
            ModelError::ReadFailed { format, code } => write!(
                f,
                "[{}] {} reading failed (engine status {})",
                self.code(),
                format,
                code
            ),
            ModelError::WriteFailed { format, code } => write!(
                f,
                "[{}] {} writing failed (engine status {})",
                self.code(),
                format,
                code
            ),
            ModelError::Io { operation, message } => {
                write!(f, "[{}] {} failed: {}", self.code(), operation, message)
            }
        }
    }
}

impl std::error::Error for ModelError {}

impl From<AbiError> for ModelError {
    fn from(err: AbiError) -> Self {
        ModelError::Abi(err)
    }
}

impl From<EngineError> for ModelError {
    fn from(err: EngineError) -> Self {
        ModelError::Abi(AbiError::Engine(err))
    }
}

impl From<ConfigError> for ModelError {
    fn from(err: ConfigError) -> Self {
        ModelError::Config(err)
    }
}

impl From<DecodeError> for ModelError {
    fn from(err: DecodeError) -> Self {
        ModelError::Decode(err)
    }
}

impl From<TreeError> for ModelError {
    fn from(err: TreeError) -> Self {
        ModelError::Tree(err)
    }
}
