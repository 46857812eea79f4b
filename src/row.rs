//! Result rows.
//!
//! A [`Row`] copies one row out of a result grid as nullable text cells and
//! converts them on demand. Conversions that depend on the backend (how a
//! boolean or a blob is spelled) go through [`Backend`], so the accessor
//! signatures are the same everywhere.

use crate::backend::Backend;
use crate::error::{BindError, BindResult};
use crate::transport::ResultGrid;

/// Trait for types that can be decoded from a text result cell.
pub trait FromCell: Sized {
    fn from_cell(raw: &str, backend: Backend) -> Result<Self, String>;
}

impl FromCell for String {
    fn from_cell(raw: &str, _backend: Backend) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl FromCell for i32 {
    fn from_cell(raw: &str, _backend: Backend) -> Result<Self, String> {
        raw.trim()
            .parse()
            .map_err(|e| format!("invalid int4 '{}': {}", raw, e))
    }
}

impl FromCell for i64 {
    fn from_cell(raw: &str, _backend: Backend) -> Result<Self, String> {
        raw.trim()
            .parse()
            .map_err(|e| format!("invalid int8 '{}': {}", raw, e))
    }
}

impl FromCell for f64 {
    fn from_cell(raw: &str, _backend: Backend) -> Result<Self, String> {
        // Rust spells these "inf" / "NaN"; Postgres uses "Infinity".
        match raw.trim() {
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => other
                .parse()
                .map_err(|e| format!("invalid float8 '{}': {}", raw, e)),
        }
    }
}

impl FromCell for bool {
    fn from_cell(raw: &str, backend: Backend) -> Result<Self, String> {
        backend.parse_bool(raw)
    }
}

impl FromCell for Vec<u8> {
    fn from_cell(raw: &str, backend: Backend) -> Result<Self, String> {
        backend.decode_blob(raw)
    }
}

/// One decoded result row.
///
/// Rows handed to a selection callback are only lent for that call.
#[derive(Debug, PartialEq)]
pub struct Row {
    cells: Vec<Option<String>>,
    backend: Backend,
}

impl Row {
    pub fn new(cells: Vec<Option<String>>, backend: Backend) -> Self {
        Self { cells, backend }
    }

    /// Copy row `index` out of `grid`.
    pub(crate) fn from_grid(grid: &dyn ResultGrid, index: usize, backend: Backend) -> Self {
        let cells = (0..grid.column_count())
            .map(|column| grid.cell(index, column).map(str::to_string))
            .collect();
        Self { cells, backend }
    }

    /// Get number of columns in the row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Raw text of a column, `None` if NULL.
    pub fn get_str(&self, idx: usize) -> BindResult<Option<&str>> {
        self.cells
            .get(idx)
            .map(Option::as_deref)
            .ok_or(BindError::ColumnOutOfRange {
                column: idx,
                columns: self.cells.len(),
            })
    }

    pub fn is_null(&self, idx: usize) -> BindResult<bool> {
        Ok(self.get_str(idx)?.is_none())
    }

    /// Decode a column; `Ok(None)` if it is NULL.
    pub fn get<T: FromCell>(&self, idx: usize) -> BindResult<Option<T>> {
        match self.get_str(idx)? {
            None => Ok(None),
            Some(raw) => T::from_cell(raw, self.backend)
                .map(Some)
                .map_err(|message| BindError::coercion(idx, message)),
        }
    }

    /// Decode a column that must not be NULL.
    pub fn try_get<T: FromCell>(&self, idx: usize) -> BindResult<T> {
        self.get(idx)?
            .ok_or_else(|| BindError::coercion(idx, "unexpected NULL"))
    }

    /// Decode a column, substituting `default` for NULL.
    pub fn get_or<T: FromCell>(&self, idx: usize, default: T) -> BindResult<T> {
        Ok(self.get(idx)?.unwrap_or(default))
    }

    pub fn get_bool(&self, idx: usize) -> BindResult<Option<bool>> {
        self.get(idx)
    }

    pub fn get_i32(&self, idx: usize) -> BindResult<Option<i32>> {
        self.get(idx)
    }

    pub fn get_i64(&self, idx: usize) -> BindResult<Option<i64>> {
        self.get(idx)
    }

    pub fn get_f64(&self, idx: usize) -> BindResult<Option<f64>> {
        self.get(idx)
    }

    pub fn get_string(&self, idx: usize) -> BindResult<Option<String>> {
        self.get(idx)
    }

    pub fn get_blob(&self, idx: usize) -> BindResult<Option<Vec<u8>>> {
        self.get(idx)
    }
}
