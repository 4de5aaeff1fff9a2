//! Errors raised at the binary boundary.

/// Failures of the engine context itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An operation ran before the engine was initialized.
    NotReady,
    /// No candidate shared library could be opened.
    LibraryNotFound {
        /// Library names or paths that were tried, in order.
        tried: Vec<String>,
        /// Loader message for the last attempt.
        reason: String,
    },
    /// The library opened but lacks an entry point.
    SymbolMissing { symbol: String },
}

impl EngineError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::NotReady => "ENGINE_NOT_READY",
            EngineError::LibraryNotFound { .. } => "ENGINE_LIBRARY_NOT_FOUND",
            EngineError::SymbolMissing { .. } => "ENGINE_SYMBOL_MISSING",
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotReady => write!(
                f,
                "[{}] Engine is not initialized; call Engine::init first",
                self.code()
            ),
            EngineError::LibraryNotFound { tried, reason } => write!(
                f,
                "[{}] Could not load GLPK (tried {}): {}",
                self.code(),
                tried.join(", "),
                reason
            ),
            EngineError::SymbolMissing { symbol } => {
                write!(f, "[{}] GLPK library has no symbol '{}'", self.code(), symbol)
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Errors raised while marshaling data across the engine boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum AbiError {
    /// The engine context is unusable.
    Engine(EngineError),
    /// Row index outside `1..=rows`.
    RowOutOfRange { index: u32, rows: u32 },
    /// Column index outside `1..=cols` (or `0..=cols` where the constant slot applies).
    ColumnOutOfRange { index: u32, cols: u32 },
    /// Combined row/column index outside `1..=rows+cols`.
    EntityOutOfRange { index: u32, total: u32 },
    /// A read or write would leave the buffer.
    BufferOverflow {
        offset: usize,
        len: usize,
        size: usize,
    },
    /// A buffer is smaller than the record or array it must hold.
    BufferTooSmall { needed: usize, size: usize },
    /// A buffer was allocated by a different engine than the one it is passed to.
    ForeignBuffer,
    /// The address does not belong to any live engine allocation.
    InvalidPointer { addr: usize },
    /// The problem handle is not known to this engine.
    UnknownProblem,
    /// The engine could not provide memory.
    AllocationFailed { size: usize },
    /// A row would receive the same column twice.
    DuplicateColumn { row: u32, column: u32 },
    /// The name cannot be handed to the engine.
    InvalidName { name: String, reason: &'static str },
    /// The path cannot be handed to the engine.
    InvalidPath { path: String },
    /// Appending would take the row or column count past the engine's `int` range.
    CountOverflow {
        kind: &'static str,
        existing: u32,
        count: u32,
    },
    /// The tree handle is not the one of the callback currently running.
    UnknownTree,
}

impl AbiError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            AbiError::Engine(err) => err.code(),
            AbiError::RowOutOfRange { .. } => "ABI_ROW_OUT_OF_RANGE",
            AbiError::ColumnOutOfRange { .. } => "ABI_COLUMN_OUT_OF_RANGE",
            AbiError::EntityOutOfRange { .. } => "ABI_ENTITY_OUT_OF_RANGE",
            AbiError::BufferOverflow { .. } => "ABI_BUFFER_OVERFLOW",
            AbiError::BufferTooSmall { .. } => "ABI_BUFFER_TOO_SMALL",
            AbiError::ForeignBuffer => "ABI_FOREIGN_BUFFER",
            AbiError::InvalidPointer { .. } => "ABI_INVALID_POINTER",
            AbiError::UnknownProblem => "ABI_UNKNOWN_PROBLEM",
            AbiError::AllocationFailed { .. } => "ABI_ALLOCATION_FAILED",
            AbiError::DuplicateColumn { .. } => "ABI_DUPLICATE_COLUMN",
            AbiError::InvalidName { .. } => "ABI_INVALID_NAME",
            AbiError::InvalidPath { .. } => "ABI_INVALID_PATH",
            AbiError::CountOverflow { .. } => "ABI_COUNT_OVERFLOW",
            AbiError::UnknownTree => "ABI_UNKNOWN_TREE",
        }
    }
}

impl std::fmt::Display for AbiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbiError::Engine(err) => write!(f, "{}", err),
            AbiError::RowOutOfRange { index, rows } => write!(
                f,
                "[{}] Row {} out of range (rows = {})",
                self.code(),
                index,
                rows
            ),
            AbiError::ColumnOutOfRange { index, cols } => write!(
                f,
                "[{}] Column {} out of range (columns = {})",
                self.code(),
                index,
                cols
            ),
            AbiError::EntityOutOfRange { index, total } => write!(
                f,
                "[{}] Combined index {} out of range (rows + columns = {})",
                self.code(),
                index,
                total
            ),
            AbiError::BufferOverflow { offset, len, size } => write!(
                f,
                "[{}] Access of {} bytes at offset {} exceeds buffer of {} bytes",
                self.code(),
                len,
                offset,
                size
            ),
            AbiError::BufferTooSmall { needed, size } => write!(
                f,
                "[{}] Buffer of {} bytes is smaller than the required {}",
                self.code(),
                size,
                needed
            ),
            AbiError::ForeignBuffer => write!(
                f,
                "[{}] Buffer belongs to a different engine",
                self.code()
            ),
            AbiError::InvalidPointer { addr } => write!(
                f,
                "[{}] Address {:#x} is not a live engine allocation",
                self.code(),
                addr
            ),
            AbiError::UnknownProblem => {
                write!(f, "[{}] Problem handle is not owned by this engine", self.code())
            }
            AbiError::AllocationFailed { size } => {
                write!(f, "[{}] Could not allocate {} bytes", self.code(), size)
            }
            AbiError::DuplicateColumn { row, column } => write!(
                f,
                "[{}] Row {} lists column {} more than once",
                self.code(),
                row,
                column
            ),
            AbiError::InvalidName { name, reason } => {
                write!(f, "[{}] Invalid name {:?}: {}", self.code(), name, reason)
            }
            AbiError::InvalidPath { path } => {
                write!(f, "[{}] Invalid path {:?}", self.code(), path)
            }
            AbiError::CountOverflow {
                kind,
                existing,
                count,
            } => write!(
                f,
                "[{}] Cannot add {} {} to {}; the engine counts at most {}",
                self.code(),
                count,
                kind,
                existing,
                i32::MAX
            ),
            AbiError::UnknownTree => write!(
                f,
                "[{}] Search tree handle is only valid inside its callback",
                self.code()
            ),
        }
    }
}

impl std::error::Error for AbiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AbiError::Engine(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EngineError> for AbiError {
    fn from(err: EngineError) -> Self {
        AbiError::Engine(err)
    }
}

pub type AbiResult<T> = Result<T, AbiError>;
