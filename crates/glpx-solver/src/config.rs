//! Unified solver configuration.

use glpx_abi::{AbiResult, Bridge};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DecodeError};
use crate::options::{InteriorOptions, IntoptOptions, SimplexOptions};
use crate::record::ParamRecord;
use crate::status::{InteriorReturn, IntoptReturn, ReturnCode, SimplexReturn};

/// Solve mode together with its options.
///
/// Serialized with a `solver` tag next to the options, e.g.
/// `{"solver": "intopt", "mip_gap": 0.01}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "solver", rename_all = "snake_case")]
pub enum SolverConfig {
    Simplex(SimplexOptions),
    Exact(SimplexOptions),
    Interior(InteriorOptions),
    Intopt(IntoptOptions),
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig::Simplex(SimplexOptions::default())
    }
}

impl SolverConfig {
    pub const NAMES: &'static [&'static str] = &["simplex", "exact", "interior", "intopt"];

    /// Default options for the named mode.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "simplex" => Ok(SolverConfig::Simplex(SimplexOptions::default())),
            "exact" => Ok(SolverConfig::Exact(SimplexOptions::default())),
            "interior" => Ok(SolverConfig::Interior(InteriorOptions::default())),
            "intopt" => Ok(SolverConfig::Intopt(IntoptOptions::default())),
            _ => Err(ConfigError::UnknownSolver {
                name: name.to_string(),
            }),
        }
    }

    /// Parses an options document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            SolverConfig::Simplex(_) => "simplex",
            SolverConfig::Exact(_) => "exact",
            SolverConfig::Interior(_) => "interior",
            SolverConfig::Intopt(_) => "intopt",
        }
    }

    /// Engine entry point this mode calls.
    pub fn entry_point(&self) -> &'static str {
        match self {
            SolverConfig::Simplex(_) => "glp_simplex",
            SolverConfig::Exact(_) => "glp_exact",
            SolverConfig::Interior(_) => "glp_interior",
            SolverConfig::Intopt(_) => "glp_intopt",
        }
    }

    /// Sets one option of the current mode from strings.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match self {
            SolverConfig::Simplex(options) | SolverConfig::Exact(options) => {
                options.set(key, value)
            }
            SolverConfig::Interior(options) => options.set(key, value),
            SolverConfig::Intopt(options) => options.set(key, value),
        }
    }

    /// Builds the mode's control record.
    pub fn marshal<'a>(&self, bridge: &Bridge<'a>) -> AbiResult<ParamRecord<'a>> {
        match self {
            SolverConfig::Simplex(options) | SolverConfig::Exact(options) => {
                options.marshal(bridge)
            }
            SolverConfig::Interior(options) => options.marshal(bridge),
            SolverConfig::Intopt(options) => options.marshal(bridge),
        }
    }

    /// Translates the raw return code of this mode's entry point.
    pub fn decode_return(&self, code: i32) -> Result<ReturnCode, DecodeError> {
        let call = self.entry_point();
        Ok(match self {
            SolverConfig::Simplex(_) | SolverConfig::Exact(_) => {
                SimplexReturn::decode(call, code)?.into()
            }
            SolverConfig::Interior(_) => InteriorReturn::decode(call, code)?.into(),
            SolverConfig::Intopt(_) => IntoptReturn::decode(call, code)?.into(),
        })
    }
}

impl From<InteriorOptions> for SolverConfig {
    fn from(options: InteriorOptions) -> Self {
        SolverConfig::Interior(options)
    }
}

impl From<IntoptOptions> for SolverConfig {
    fn from(options: IntoptOptions) -> Self {
        SolverConfig::Intopt(options)
    }
}

impl From<SimplexOptions> for SolverConfig {
    fn from(options: SimplexOptions) -> Self {
        SolverConfig::Simplex(options)
    }
}
