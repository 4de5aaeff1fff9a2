//! Binary boundary to the GLPK engine.
//!
//! The engine is reached only through integer handles, flat buffers and
//! fixed-layout control records. This crate owns that boundary: the [`Abi`]
//! trait, the runtime-loaded native library, the [`Engine`] context, scoped
//! [`Buffer`]s and the owned [`Problem`] handle.

pub mod abi;
pub mod codes;
pub mod engine;
pub mod error;
#[cfg(any(test, feature = "fake"))]
pub mod fake;
pub mod layout;
pub mod memory;
mod native;
pub mod problem;

pub use abi::{Abi, Ptr, RawProb, RawTree};
pub use engine::{Engine, EngineInfo, LIBRARY_ENV};
pub use error::{AbiError, AbiResult, EngineError};
pub use layout::{Field, Width};
pub use memory::{validate_name, Bridge, Buffer};
pub use native::NativeGlpk;
pub use problem::Problem;
