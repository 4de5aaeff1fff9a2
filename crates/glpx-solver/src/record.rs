//! Control records in engine memory.

use glpx_abi::layout::{iocp, iptcp, smcp, Field, Width};
use glpx_abi::{AbiResult, Bridge, Buffer};
use tracing::trace;

/// Which control record a solve mode uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// `glp_smcp`, for simplex and exact simplex.
    Smcp,
    /// `glp_iptcp`, for the interior-point method.
    Iptcp,
    /// `glp_iocp`, for branch-and-cut.
    Iocp,
}

impl RecordKind {
    pub fn size(self) -> usize {
        match self {
            RecordKind::Smcp => smcp::SIZE,
            RecordKind::Iptcp => iptcp::SIZE,
            RecordKind::Iocp => iocp::SIZE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RecordKind::Smcp => "glp_smcp",
            RecordKind::Iptcp => "glp_iptcp",
            RecordKind::Iocp => "glp_iocp",
        }
    }
}

/// A control record initialized to engine defaults, freed on drop.
#[derive(Debug)]
pub struct ParamRecord<'a> {
    kind: RecordKind,
    buffer: Buffer<'a>,
}

impl<'a> ParamRecord<'a> {
    /// Allocates the record's exact size and runs the engine's init entry point.
    pub fn new(bridge: &Bridge<'a>, kind: RecordKind) -> AbiResult<Self> {
        let buffer = match kind {
            RecordKind::Smcp => bridge.record(kind.size(), |abi, ptr| abi.init_smcp(ptr))?,
            RecordKind::Iptcp => bridge.record(kind.size(), |abi, ptr| abi.init_iptcp(ptr))?,
            RecordKind::Iocp => bridge.record(kind.size(), |abi, ptr| abi.init_iocp(ptr))?,
        };
        Ok(Self { kind, buffer })
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn buffer(&self) -> &Buffer<'a> {
        &self.buffer
    }

    pub fn set_int(&self, field: Field, value: i32) -> AbiResult<()> {
        trace!(record = self.kind.name(), field = field.name, value, "Writing int field");
        match field.width {
            Width::Flag => self.buffer.write_flag_field(field, value != 0),
            _ => self.buffer.write_int_field(field, value),
        }
    }

    pub fn set_double(&self, field: Field, value: f64) -> AbiResult<()> {
        trace!(record = self.kind.name(), field = field.name, value, "Writing double field");
        self.buffer.write_double_field(field, value)
    }

    pub fn set_flag(&self, field: Field, on: bool) -> AbiResult<()> {
        trace!(record = self.kind.name(), field = field.name, on, "Writing flag field");
        self.buffer.write_flag_field(field, on)
    }

    /// Writes `value` when present; absent options keep the engine default.
    pub(crate) fn int_opt(&self, field: Field, value: Option<i32>) -> AbiResult<()> {
        value.map_or(Ok(()), |v| self.set_int(field, v))
    }

    pub(crate) fn double_opt(&self, field: Field, value: Option<f64>) -> AbiResult<()> {
        value.map_or(Ok(()), |v| self.set_double(field, v))
    }

    pub(crate) fn flag_opt(&self, field: Field, value: Option<bool>) -> AbiResult<()> {
        value.map_or(Ok(()), |v| self.set_flag(field, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glpx_abi::fake::FakeEngine;
    use glpx_abi::Abi;

    #[test]
    fn test_record_has_exact_size_and_defaults() {
        let fake = FakeEngine::new();
        let bridge = Bridge::new(&fake);
        let record = ParamRecord::new(&bridge, RecordKind::Iptcp).unwrap();
        assert_eq!(record.buffer().size(), iptcp::SIZE);
        assert_eq!(fake.calls("init_iptcp"), 1);
        assert_eq!(
            record.buffer().read_i32(iptcp::ORD_ALG.offset).unwrap(),
            glpx_abi::codes::GLP_ORD_AMD
        );
        drop(record);
        assert_eq!(fake.live_allocations(), 0);
    }

    #[test]
    fn test_flag_written_as_int() {
        let fake = FakeEngine::new();
        let bridge = Bridge::new(&fake);
        let record = ParamRecord::new(&bridge, RecordKind::Smcp).unwrap();
        record.set_flag(smcp::PRESOLVE, true).unwrap();
        assert_eq!(record.buffer().read_i32(smcp::PRESOLVE.offset).unwrap(), 1);
        record.flag_opt(smcp::PRESOLVE, None).unwrap();
        assert_eq!(record.buffer().read_i32(smcp::PRESOLVE.offset).unwrap(), 1);
        record.flag_opt(smcp::PRESOLVE, Some(false)).unwrap();
        assert_eq!(record.buffer().read_i32(smcp::PRESOLVE.offset).unwrap(), 0);
    }
}
