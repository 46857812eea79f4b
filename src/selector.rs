//! Selectors: row-producing queries.
//!
//! Two retrieval contracts, fixed when the selector is created:
//! - [`Mode::Single`] requires exactly one row,
//! - [`Mode::Multi`] streams every row through a callback, in order.
//!
//! Either way the result grid is released before `select` returns, on
//! success and on every error path.

use crate::error::{BindError, BindResult};
use crate::executor::Executor;
use crate::row::Row;
use crate::statement::{preview_sql, Bind, Bindings};
use crate::transport::{GridStatus, ResultGrid};

/// Row-count contract of a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Exactly one row, otherwise `NoData` / `MultipleRows`.
    Single,
    /// Any number of rows.
    Multi,
}

/// A SELECT (or any statement returning rows).
pub struct Selector<'t> {
    executor: Executor<'t>,
    bindings: Bindings,
    mode: Mode,
}

impl<'t> Selector<'t> {
    pub fn new(executor: Executor<'t>, mode: Mode) -> Self {
        Self {
            executor,
            bindings: Bindings::default(),
            mode,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Execute and call `on_row` once per row, in result order.
    ///
    /// Each call gets a fresh row that lives only for that call. An error
    /// from `on_row` stops the iteration and is returned as is. Returns the
    /// number of rows visited.
    pub fn select<F>(mut self, mut on_row: F) -> BindResult<usize>
    where
        F: FnMut(&Row) -> BindResult<()>,
    {
        let grid = self.run()?;
        let backend = self.executor.backend();
        let rows = check_row_count(&*grid, self.mode)?;

        for index in 0..rows {
            let row = Row::from_grid(&*grid, index, backend);
            on_row(&row)?;
        }

        release(grid, rows);
        Ok(rows)
    }

    /// Execute and map every row through `f`.
    pub fn map_rows<T, F>(self, mut f: F) -> BindResult<Vec<T>>
    where
        F: FnMut(&Row) -> BindResult<T>,
    {
        let mut out = Vec::new();
        self.select(|row| {
            out.push(f(row)?);
            Ok(())
        })?;
        Ok(out)
    }

    /// Execute and return the single resulting row.
    ///
    /// Applies the single-row contract whatever the selector's mode.
    pub fn fetch_one(mut self) -> BindResult<Row> {
        let grid = self.run()?;
        let backend = self.executor.backend();
        check_row_count(&*grid, Mode::Single)?;

        let row = Row::from_grid(&*grid, 0, backend);
        release(grid, 1);
        Ok(row)
    }

    fn run(&mut self) -> BindResult<Box<dyn ResultGrid>> {
        let Bindings { template, entries } = std::mem::take(&mut self.bindings);
        self.executor.run(template.as_str(), &entries)
    }
}

impl Bind for Selector<'_> {
    fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    fn bindings_mut(&mut self) -> &mut Bindings {
        &mut self.bindings
    }

    fn sql(&self) -> BindResult<String> {
        preview_sql(&self.executor, &self.bindings)
    }
}

/// Check that the grid is a row set satisfying `mode`; returns its row count.
fn check_row_count(grid: &dyn ResultGrid, mode: Mode) -> BindResult<usize> {
    match grid.status() {
        GridStatus::Rows => {}
        GridStatus::Command { .. } => {
            return Err(BindError::Execution("query did not return rows".to_string()));
        }
        GridStatus::Failed { message } => return Err(BindError::Execution(message)),
    }

    let rows = grid.row_count();
    match (mode, rows) {
        (Mode::Single, 0) => Err(BindError::NoData),
        (Mode::Single, n) if n > 1 => Err(BindError::MultipleRows(n)),
        _ => Ok(rows),
    }
}

fn release(grid: Box<dyn ResultGrid>, rows: usize) {
    drop(grid);
    tracing::debug!("Released result grid after {} rows", rows);
}
