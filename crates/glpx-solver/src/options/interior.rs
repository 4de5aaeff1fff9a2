use glpx_abi::layout::iptcp;
use glpx_abi::{AbiResult, Bridge};
use serde::{Deserialize, Serialize};

use super::parse_tag;
use crate::error::ConfigError;
use crate::record::{ParamRecord, RecordKind};
use crate::tags::{MessageLevel, Ordering};

/// Options of the interior-point solver (`glp_iptcp`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteriorOptions {
    pub msg_level: Option<MessageLevel>,
    pub ordering: Option<Ordering>,
}

impl InteriorOptions {
    pub const KEYS: &'static [&'static str] = &["msg_level", "ordering"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_msg_level(mut self, level: MessageLevel) -> Self {
        self.msg_level = Some(level);
        self
    }

    pub fn with_ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = Some(ordering);
        self
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "msg_level" => self.msg_level = Some(parse_tag(value)?),
            "ordering" => self.ordering = Some(parse_tag(value)?),
            _ => {
                return Err(ConfigError::UnknownOption {
                    solver: "interior",
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn marshal<'a>(&self, bridge: &Bridge<'a>) -> AbiResult<ParamRecord<'a>> {
        let record = ParamRecord::new(bridge, RecordKind::Iptcp)?;
        record.int_opt(iptcp::MSG_LEV, self.msg_level.map(MessageLevel::code))?;
        record.int_opt(iptcp::ORD_ALG, self.ordering.map(Ordering::code))?;
        Ok(record)
    }
}
