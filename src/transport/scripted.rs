//! In-memory transport that replays canned results.
//!
//! Records every submission and counts how many grids it handed out were
//! released, so callers can check that nothing outlives a decode.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::{hex_escape, BackendError, GridStatus, ResultGrid, Transport};
use crate::encoder::{ParamBatch, WireParam};
use crate::value::ValueKind;

/// A result grid held entirely in memory.
#[derive(Debug)]
pub struct TextGrid {
    status: GridStatus,
    columns: usize,
    rows: Vec<Vec<Option<String>>>,
    released: Option<Rc<Cell<usize>>>,
}

impl TextGrid {
    /// A result set. The column count is taken from the first row.
    pub fn from_rows(rows: Vec<Vec<Option<&str>>>) -> Self {
        let columns = rows.first().map_or(0, Vec::len);
        Self {
            status: GridStatus::Rows,
            columns,
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(|c| c.map(str::to_string)).collect())
                .collect(),
            released: None,
        }
    }

    /// An empty result set with `columns` columns.
    pub fn empty(columns: usize) -> Self {
        Self {
            status: GridStatus::Rows,
            columns,
            rows: Vec::new(),
            released: None,
        }
    }

    pub fn command(affected: u64) -> Self {
        Self {
            status: GridStatus::Command { affected },
            columns: 0,
            rows: Vec::new(),
            released: None,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            status: GridStatus::Failed {
                message: message.to_string(),
            },
            columns: 0,
            rows: Vec::new(),
            released: None,
        }
    }
}

impl ResultGrid for TextGrid {
    fn status(&self) -> GridStatus {
        self.status.clone()
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.columns
    }

    fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }
}

impl Drop for TextGrid {
    fn drop(&mut self) {
        if let Some(released) = &self.released {
            released.set(released.get() + 1);
        }
    }
}

/// A query as the transport received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub sql: String,
    pub params: Vec<WireParam>,
}

/// Transport backed by a queue of canned responses.
///
/// When the queue runs dry every query succeeds as a command affecting
/// zero rows.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: VecDeque<Result<TextGrid, BackendError>>,
    submitted: Vec<Submitted>,
    issued: usize,
    released: Rc<Cell<usize>>,
    escape_failure: Option<String>,
    rejected: Vec<ValueKind>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a grid as the next response.
    pub fn with_grid(mut self, grid: TextGrid) -> Self {
        self.push_grid(grid);
        self
    }

    /// Queue a backend error as the next response.
    pub fn with_error(mut self, message: &str) -> Self {
        self.push_error(message);
        self
    }

    pub fn push_grid(&mut self, grid: TextGrid) {
        self.responses.push_back(Ok(grid));
    }

    pub fn push_error(&mut self, message: &str) {
        self.responses.push_back(Err(BackendError::new(message)));
    }

    /// Make every blob escape fail with `message`.
    pub fn fail_escape(mut self, message: &str) -> Self {
        self.escape_failure = Some(message.to_string());
        self
    }

    /// Refuse values of `kind`.
    pub fn reject_kind(mut self, kind: ValueKind) -> Self {
        self.rejected.push(kind);
        self
    }

    pub fn submitted(&self) -> &[Submitted] {
        &self.submitted
    }

    pub fn last_submitted(&self) -> Option<&Submitted> {
        self.submitted.last()
    }

    /// Number of grids handed out so far.
    pub fn issued_grids(&self) -> usize {
        self.issued
    }

    /// Number of handed-out grids that have since been dropped.
    pub fn released_grids(&self) -> usize {
        self.released.get()
    }

    fn respond(&mut self, sql: &str, params: Vec<WireParam>) -> Result<Box<dyn ResultGrid>, BackendError> {
        self.submitted.push(Submitted {
            sql: sql.to_string(),
            params,
        });
        let mut grid = self
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(TextGrid::command(0)))?;
        grid.released = Some(Rc::clone(&self.released));
        self.issued += 1;
        Ok(Box::new(grid))
    }
}

impl Transport for ScriptedTransport {
    fn execute(&mut self, sql: &str) -> Result<Box<dyn ResultGrid>, BackendError> {
        self.respond(sql, Vec::new())
    }

    fn execute_params(
        &mut self,
        sql: &str,
        params: &ParamBatch,
    ) -> Result<Box<dyn ResultGrid>, BackendError> {
        self.respond(sql, params.iter().cloned().collect())
    }

    fn escape_bytea(&self, raw: &[u8]) -> Result<String, BackendError> {
        match &self.escape_failure {
            Some(message) => Err(BackendError::new(message.as_str())),
            None => Ok(hex_escape(raw)),
        }
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        !self.rejected.contains(&kind)
    }
}
