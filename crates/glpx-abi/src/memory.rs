//! Scoped buffers in engine-visible memory.
//!
//! Every allocation handed to the engine is a [`Buffer`]; dropping the buffer
//! frees it, so early returns and `?` never leak engine memory.

use std::ffi::c_int;
use std::mem::size_of;

use tracing::{trace, warn};

use crate::abi::{Abi, Ptr};
use crate::codes::MAX_NAME_LEN;
use crate::error::{AbiError, AbiResult};
use crate::layout::{Field, Width};

const INT: usize = size_of::<c_int>();
const DOUBLE: usize = size_of::<f64>();

/// Engine allocation released on drop.
pub struct Buffer<'a> {
    abi: &'a dyn Abi,
    ptr: Ptr,
    size: usize,
}

impl<'a> Buffer<'a> {
    pub fn ptr(&self) -> Ptr {
        self.ptr
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// True when the buffer was allocated by `abi`.
    pub fn belongs_to(&self, abi: &dyn Abi) -> bool {
        std::ptr::addr_eq(self.abi as *const dyn Abi, abi as *const dyn Abi)
    }

    fn check(&self, offset: usize, len: usize) -> AbiResult<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.size => Ok(()),
            _ => Err(AbiError::BufferOverflow {
                offset,
                len,
                size: self.size,
            }),
        }
    }

    pub fn write(&self, offset: usize, bytes: &[u8]) -> AbiResult<()> {
        self.check(offset, bytes.len())?;
        self.abi.write_bytes(self.ptr.offset(offset), bytes)
    }

    pub fn read(&self, offset: usize, len: usize) -> AbiResult<Vec<u8>> {
        self.check(offset, len)?;
        self.abi.read_bytes(self.ptr.offset(offset), len)
    }

    pub fn write_i32(&self, offset: usize, value: i32) -> AbiResult<()> {
        self.write(offset, &value.to_ne_bytes())
    }

    pub fn write_f64(&self, offset: usize, value: f64) -> AbiResult<()> {
        self.write(offset, &value.to_ne_bytes())
    }

    pub fn read_i32(&self, offset: usize) -> AbiResult<i32> {
        let bytes = self.read(offset, INT)?;
        let mut raw = [0u8; INT];
        raw.copy_from_slice(&bytes);
        Ok(i32::from_ne_bytes(raw))
    }

    pub fn read_f64(&self, offset: usize) -> AbiResult<f64> {
        let bytes = self.read(offset, DOUBLE)?;
        let mut raw = [0u8; DOUBLE];
        raw.copy_from_slice(&bytes);
        Ok(f64::from_ne_bytes(raw))
    }

    /// Writes `values` as consecutive C ints starting at element `start`.
    pub fn write_i32s(&self, start: usize, values: &[i32]) -> AbiResult<()> {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        self.write(start * INT, &bytes)
    }

    /// Writes `values` as consecutive doubles starting at element `start`.
    pub fn write_f64s(&self, start: usize, values: &[f64]) -> AbiResult<()> {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        self.write(start * DOUBLE, &bytes)
    }

    /// Reads `count` C ints starting at element `start`.
    pub fn read_i32s(&self, start: usize, count: usize) -> AbiResult<Vec<i32>> {
        let bytes = self.read(start * INT, count * INT)?;
        Ok(bytes
            .chunks_exact(INT)
            .map(|chunk| {
                let mut raw = [0u8; INT];
                raw.copy_from_slice(chunk);
                i32::from_ne_bytes(raw)
            })
            .collect())
    }

    /// Reads `count` doubles starting at element `start`.
    pub fn read_f64s(&self, start: usize, count: usize) -> AbiResult<Vec<f64>> {
        let bytes = self.read(start * DOUBLE, count * DOUBLE)?;
        Ok(bytes
            .chunks_exact(DOUBLE)
            .map(|chunk| {
                let mut raw = [0u8; DOUBLE];
                raw.copy_from_slice(chunk);
                f64::from_ne_bytes(raw)
            })
            .collect())
    }

    pub fn write_int_field(&self, field: Field, value: i32) -> AbiResult<()> {
        debug_assert_eq!(field.width, Width::I32);
        self.write_i32(field.offset, value)
    }

    pub fn write_double_field(&self, field: Field, value: f64) -> AbiResult<()> {
        debug_assert_eq!(field.width, Width::F64);
        self.write_f64(field.offset, value)
    }

    pub fn write_flag_field(&self, field: Field, on: bool) -> AbiResult<()> {
        debug_assert_eq!(field.width, Width::Flag);
        self.write_i32(field.offset, i32::from(on))
    }
}

impl Drop for Buffer<'_> {
    fn drop(&mut self) {
        match self.abi.free(self.ptr) {
            Ok(()) => trace!(
                component = "bridge",
                operation = "free",
                addr = self.ptr.addr(),
                size = self.size,
                "Released engine buffer"
            ),
            Err(err) => warn!(
                component = "bridge",
                operation = "free",
                addr = self.ptr.addr(),
                error = %err,
                "Failed to release engine buffer"
            ),
        }
    }
}

impl std::fmt::Debug for Buffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("ptr", &self.ptr)
            .field("size", &self.size)
            .finish()
    }
}

/// Allocation front end over an [`Abi`].
#[derive(Clone, Copy)]
pub struct Bridge<'a> {
    abi: &'a dyn Abi,
}

impl<'a> Bridge<'a> {
    pub fn new(abi: &'a dyn Abi) -> Self {
        Self { abi }
    }

    pub fn abi(&self) -> &'a dyn Abi {
        self.abi
    }

    /// Allocates `size` zeroed bytes.
    pub fn alloc(&self, size: usize) -> AbiResult<Buffer<'a>> {
        let ptr = self.abi.malloc(size)?;
        trace!(
            component = "bridge",
            operation = "alloc",
            addr = ptr.addr(),
            size,
            "Allocated engine buffer"
        );
        Ok(Buffer {
            abi: self.abi,
            ptr,
            size,
        })
    }

    /// Room for `count` C ints.
    pub fn alloc_ints(&self, count: usize) -> AbiResult<Buffer<'a>> {
        self.alloc(count * INT)
    }

    /// Room for `count` doubles.
    pub fn alloc_doubles(&self, count: usize) -> AbiResult<Buffer<'a>> {
        self.alloc(count * DOUBLE)
    }

    /// Copies `text` into engine memory with a trailing NUL.
    pub fn c_string(&self, text: &str) -> AbiResult<Buffer<'a>> {
        let buffer = self.alloc(text.len() + 1)?;
        buffer.write(0, text.as_bytes())?;
        Ok(buffer)
    }

    /// Copies a row, column or problem name, rejecting names the engine aborts on.
    pub fn name(&self, name: &str) -> AbiResult<Buffer<'a>> {
        validate_name(name)?;
        self.c_string(name)
    }

    /// Copies a file path.
    pub fn path(&self, path: &std::path::Path) -> AbiResult<Buffer<'a>> {
        let text = path.to_str().ok_or_else(|| AbiError::InvalidPath {
            path: path.display().to_string(),
        })?;
        if text.is_empty() || text.contains('\0') {
            return Err(AbiError::InvalidPath {
                path: text.to_string(),
            });
        }
        self.c_string(text)
    }

    /// Allocates a control record of `size` bytes and fills in the engine defaults.
    pub fn record(
        &self,
        size: usize,
        init: fn(&dyn Abi, Ptr) -> AbiResult<()>,
    ) -> AbiResult<Buffer<'a>> {
        let buffer = self.alloc(size)?;
        init(self.abi, buffer.ptr())?;
        Ok(buffer)
    }
}

/// Checks that `name` can be passed to the engine's name setters.
pub fn validate_name(name: &str) -> AbiResult<()> {
    let reason = if name.len() > MAX_NAME_LEN {
        Some("longer than 255 bytes")
    } else if name.contains('\0') {
        Some("contains a NUL byte")
    } else if name.chars().any(char::is_control) {
        Some("contains a control character")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(AbiError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
