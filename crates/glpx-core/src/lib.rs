//! glpx model layer over the GLPK engine.
//!
//! A [`Model`] owns one engine problem. Variables and constraints are typed
//! handles into it; row coefficients accumulate locally and reach the engine
//! lazily, one call per changed row, before every solve or write.

pub mod ids;
pub mod model;
pub mod types;

pub use ids::{Constraint, Entity, ModelId, Variable};
pub use model::{format_number, Model, ModelError, SolutionKind, SolutionView, ValueView};
pub use types::{Bounds, Coefficients, ConstraintProperties, VariableProperties};

pub use glpx_abi::Engine;
pub use glpx_solver::{
    BasisStatus, BoundKind, BranchDirection, InteriorOptions, IntoptOptions, MpsFormat, Node,
    Reason, ReturnCode, RowAttribute, RowClass, RowOrigin, Sense, SimplexOptions, SolverConfig,
    Status, Tree, TreeCallback, TreeError, TreeSize, VariableKind,
};
