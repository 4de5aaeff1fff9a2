//! Solver vocabulary for glpx.
//!
//! This crate translates between semantic tags and the engine's integer codes
//! and marshals per-mode options into the engine's control records.
//!
//! # Overview
//!
//! - [`SolverConfig`]: solve mode plus its options
//! - [`SimplexOptions`], [`InteriorOptions`], [`IntoptOptions`]: per-mode options
//! - [`Status`], [`BasisStatus`], [`ReturnCode`]: decoded engine outcomes
//! - [`ConfigError`], [`DecodeError`]: errors raised on either side of a call
//! - [`Tree`], [`TreeCallback`]: the branch-and-cut search tree seen from a callback

mod config;
mod error;
mod options;
mod record;
mod status;
mod tags;
mod tree;

pub use config::SolverConfig;
pub use error::{ConfigError, DecodeError, TreeError};
pub use options::{InteriorOptions, IntoptOptions, SimplexOptions};
pub use record::{ParamRecord, RecordKind};
pub use status::{BasisStatus, InteriorReturn, IntoptReturn, ReturnCode, SimplexReturn, Status};
pub use tags::{
    Backtracking, BoundKind, BranchDirection, Branching, MessageLevel, Method, MpsFormat, Ordering,
    Preprocessing, Pricing, RatioTest, Reason, RowClass, RowOrigin, Sense, VariableKind,
};
pub use tree::{Node, RowAttribute, Tree, TreeCallback, TreeSize};
