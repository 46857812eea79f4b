//! Interfaces consumed from the connection layer.
//!
//! A [`Transport`] executes positional, typed queries and hands back a
//! [`ResultGrid`] of nullable text cells. Connection setup, teardown and
//! timeouts all live behind this trait.

pub mod scripted;

pub use scripted::{ScriptedTransport, Submitted, TextGrid};

use thiserror::Error;

use crate::encoder::ParamBatch;
use crate::value::ValueKind;

/// Failure reported by the backend itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome of an executed query, as reported by the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridStatus {
    /// A command without a result set, e.g. UPDATE.
    Command { affected: u64 },
    /// A result set (possibly empty).
    Rows,
    /// The backend produced a result object describing a failure.
    Failed { message: String },
}

/// A backend-owned table of text cells.
///
/// The grid is released when dropped; callers hold it only for the
/// duration of one decode.
pub trait ResultGrid {
    fn status(&self) -> GridStatus;

    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    /// Text of the cell, or `None` for SQL NULL.
    fn cell(&self, row: usize, column: usize) -> Option<&str>;
}

/// The single I/O primitive the binding layer needs.
pub trait Transport {
    /// Execute a query that carries no parameters.
    fn execute(&mut self, sql: &str) -> Result<Box<dyn ResultGrid>, BackendError>;

    /// Execute a query with positional parameters. The batch exposes
    /// parallel value / length / format arrays.
    fn execute_params(
        &mut self,
        sql: &str,
        params: &ParamBatch,
    ) -> Result<Box<dyn ResultGrid>, BackendError>;

    /// Escape raw bytes into the backend's textual blob encoding.
    fn escape_bytea(&self, raw: &[u8]) -> Result<String, BackendError> {
        Ok(hex_escape(raw))
    }

    /// Whether values of this kind can be sent at all.
    fn accepts(&self, _kind: ValueKind) -> bool {
        true
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn execute(&mut self, sql: &str) -> Result<Box<dyn ResultGrid>, BackendError> {
        (**self).execute(sql)
    }

    fn execute_params(
        &mut self,
        sql: &str,
        params: &ParamBatch,
    ) -> Result<Box<dyn ResultGrid>, BackendError> {
        (**self).execute_params(sql, params)
    }

    fn escape_bytea(&self, raw: &[u8]) -> Result<String, BackendError> {
        (**self).escape_bytea(raw)
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        (**self).accepts(kind)
    }
}

/// Hex bytea encoding: `\x` followed by two lowercase hex digits per byte.
pub fn hex_escape(raw: &[u8]) -> String {
    let mut out = String::with_capacity(2 + raw.len() * 2);
    out.push_str("\\x");
    out.push_str(&hex::encode(raw));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_escape() {
        assert_eq!(hex_escape(&[0x00, 0xff, 0x10]), "\\x00ff10");
        assert_eq!(hex_escape(&[]), "\\x");
    }
}
