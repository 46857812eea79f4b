//! Wire encoder.
//!
//! Turns bind entries into transport-ready parameter buffers:
//! - fixed-width numerics become big-endian binary (format code 1),
//! - strings and escaped blobs become NUL-terminated text (format code 0),
//! - NULLs produce no buffer; they were already written into the query text.
//!
//! This is pure, synchronous computation - no I/O.

use crate::error::{BindError, BindResult};
use crate::transport::Transport;
use crate::value::{BindEntry, BindValue};

/// Highest parameter count the protocol can address (Int16 count field).
pub const MAX_PARAMS: usize = i16::MAX as usize;

/// Largest payload a single parameter can carry (Int32 length field).
pub const MAX_PARAM_LEN: usize = i32::MAX as usize;

/// Per-parameter format flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Binary,
}

impl Format {
    /// Wire format code: 0 = text, 1 = binary.
    pub fn code(self) -> i16 {
        match self {
            Format::Text => 0,
            Format::Binary => 1,
        }
    }
}

/// One encoded parameter buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireParam {
    data: Vec<u8>,
    len: usize,
    format: Format,
}

impl WireParam {
    /// A binary parameter; `bytes` must already be in network byte order.
    pub fn binary(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Self {
            data: bytes,
            len,
            format: Format::Binary,
        }
    }

    /// A text parameter. The buffer carries a trailing NUL that is not
    /// counted in the length.
    pub fn text(value: &str) -> Self {
        let mut data = Vec::with_capacity(value.len() + 1);
        data.extend_from_slice(value.as_bytes());
        data.push(0);
        Self {
            data,
            len: value.len(),
            format: Format::Text,
        }
    }

    /// The parameter bytes, without any terminator.
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// The full buffer, including the terminator of text parameters.
    pub fn as_buffer(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn is_binary(&self) -> bool {
        self.format == Format::Binary
    }
}

/// Trait for fixed-width values with a binary wire form.
pub trait ToWire {
    fn to_wire(&self) -> WireParam;
}

impl ToWire for bool {
    fn to_wire(&self) -> WireParam {
        WireParam::binary(vec![u8::from(*self)])
    }
}

impl ToWire for i32 {
    fn to_wire(&self) -> WireParam {
        WireParam::binary(self.to_be_bytes().to_vec())
    }
}

impl ToWire for i64 {
    fn to_wire(&self) -> WireParam {
        WireParam::binary(self.to_be_bytes().to_vec())
    }
}

impl ToWire for f64 {
    fn to_wire(&self) -> WireParam {
        WireParam::binary(self.to_be_bytes().to_vec())
    }
}

/// The encoded parameters of one submission, in positional order.
///
/// Exposes the parallel arrays a parameterized execute call takes. The
/// buffers are freed when the batch is dropped.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParamBatch {
    params: Vec<WireParam>,
}

impl ParamBatch {
    pub fn new(params: Vec<WireParam>) -> Self {
        Self { params }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameter at 0-based `index` (marker `index + 1`).
    pub fn get(&self, index: usize) -> Option<&WireParam> {
        self.params.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WireParam> {
        self.params.iter()
    }

    pub fn values(&self) -> Vec<&[u8]> {
        self.params.iter().map(WireParam::as_buffer).collect()
    }

    pub fn lengths(&self) -> Vec<i32> {
        // Payloads above MAX_PARAM_LEN are rejected by `encode`.
        self.params.iter().map(|p| p.len() as i32).collect()
    }

    pub fn formats(&self) -> Vec<i16> {
        self.params.iter().map(|p| p.format().code()).collect()
    }
}

impl Drop for ParamBatch {
    fn drop(&mut self) {
        if !self.params.is_empty() {
            tracing::trace!("Released {} parameter buffers", self.params.len());
        }
    }
}

/// Encode every non-null entry, in binding order.
///
/// Kinds the transport does not accept are rejected before any buffer is
/// allocated. If a later entry fails, the buffers built so far are dropped
/// with the partial batch.
pub fn encode(entries: &[BindEntry], transport: &dyn Transport) -> BindResult<ParamBatch> {
    let mut count = 0;
    for entry in entries.iter().filter(|e| !e.value.is_null()) {
        if !transport.accepts(entry.kind()) {
            return Err(BindError::UnsupportedBinding {
                name: entry.name.clone(),
                kind: entry.kind(),
            });
        }
        count += 1;
    }
    if count > MAX_PARAMS {
        return Err(BindError::TooManyParameters(count));
    }

    let mut params = Vec::with_capacity(count);
    for entry in entries {
        if let Some(param) = encode_entry(entry, transport)? {
            tracing::trace!(
                "${} {} -> {:?}, {} bytes",
                params.len() + 1,
                entry.name,
                param.format(),
                param.len()
            );
            params.push(param);
        }
    }

    Ok(ParamBatch::new(params))
}

fn encode_entry(entry: &BindEntry, transport: &dyn Transport) -> BindResult<Option<WireParam>> {
    let param = match &entry.value {
        BindValue::Null => return Ok(None),
        BindValue::Bool(v) => v.to_wire(),
        BindValue::Int32(v) => v.to_wire(),
        BindValue::Int64(v) => v.to_wire(),
        BindValue::Double(v) => v.to_wire(),
        BindValue::String(s) => text_param(&entry.name, s)?,
        BindValue::Blob(bytes) => {
            let escaped = transport
                .escape_bytea(bytes)
                .map_err(|e| BindError::escape(&entry.name, e.message))?;
            text_param(&entry.name, &escaped)?
        }
    };
    Ok(Some(param))
}

fn text_param(name: &str, value: &str) -> BindResult<WireParam> {
    check_len(name, value.len())?;
    if value.as_bytes().contains(&0) {
        return Err(BindError::NullByte {
            name: name.to_string(),
        });
    }
    Ok(WireParam::text(value))
}

fn check_len(name: &str, len: usize) -> BindResult<()> {
    if len > MAX_PARAM_LEN {
        return Err(BindError::ParamTooLarge {
            name: name.to_string(),
            len,
        });
    }
    Ok(())
}
