//! Statements: a template plus its bind entries.
//!
//! The [`Bind`] trait carries the whole binding API and is shared by
//! [`Statement`] (mutations) and [`Selector`](crate::selector::Selector)
//! (row-producing queries).

use crate::error::BindResult;
use crate::executor::Executor;
use crate::template::QueryTemplate;
use crate::transport::GridStatus;
use crate::value::{BindEntry, BindValue};

/// The template and bind entries of one logical operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    pub template: QueryTemplate,
    pub entries: Vec<BindEntry>,
}

impl Bindings {
    pub fn new(template: &str) -> Self {
        Self {
            template: QueryTemplate::new(template),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, name: &str, value: impl Into<BindValue>) {
        self.entries.push(BindEntry::new(name, value));
    }
}

/// Named-placeholder binding API.
///
/// Every method appends in call order; that order decides which
/// positional marker each value receives.
pub trait Bind {
    fn bindings(&self) -> &Bindings;

    fn bindings_mut(&mut self) -> &mut Bindings;

    /// Set the query template.
    fn prepare(&mut self, template: &str) -> &mut Self {
        self.bindings_mut().template = QueryTemplate::new(template);
        self
    }

    /// Append text to the template.
    fn append(&mut self, fragment: &str) -> &mut Self {
        self.bindings_mut().template.append(fragment);
        self
    }

    /// Bind a value. `None` binds NULL.
    ///
    /// ```
    /// use sqlbind::prelude::*;
    ///
    /// let mut transport = ScriptedTransport::new();
    /// let mut session = Session::new(Backend::Postgres, &mut transport);
    /// let mut stmt = session.statement();
    /// stmt.prepare("UPDATE users SET name = :name WHERE id = :id")
    ///     .bind("name", "ada")
    ///     .bind("id", 7i64);
    /// assert_eq!(stmt.sql().unwrap(), "UPDATE users SET name = $1 WHERE id = $2");
    /// ```
    fn bind(&mut self, name: &str, value: impl Into<BindValue>) -> &mut Self {
        self.bindings_mut().push(name, value);
        self
    }

    /// Bind NULL explicitly.
    fn bind_null(&mut self, name: &str) -> &mut Self {
        self.bindings_mut().push(name, BindValue::Null);
        self
    }

    /// Bind `value`, or NULL if it equals the `null_value` sentinel.
    fn bind_or_null<V>(&mut self, name: &str, value: V, null_value: V) -> &mut Self
    where
        V: Into<BindValue> + PartialEq,
    {
        if value == null_value {
            self.bind_null(name)
        } else {
            self.bind(name, value)
        }
    }

    fn bind_blob(&mut self, name: &str, value: &[u8]) -> &mut Self {
        self.bindings_mut().push(name, BindValue::Blob(value.to_vec()));
        self
    }

    fn bind_blob_or_null(&mut self, name: &str, value: &[u8], null_value: &[u8]) -> &mut Self {
        if value == null_value {
            self.bind_null(name)
        } else {
            self.bind_blob(name, value)
        }
    }

    /// Append a fragment and bind the placeholder it introduces.
    fn bind_and_append(&mut self, fragment: &str, name: &str, value: impl Into<BindValue>) -> &mut Self {
        self.append(fragment).bind(name, value)
    }

    fn bind_and_append_or_null<V>(
        &mut self,
        fragment: &str,
        name: &str,
        value: V,
        null_value: V,
    ) -> &mut Self
    where
        V: Into<BindValue> + PartialEq,
    {
        self.append(fragment).bind_or_null(name, value, null_value)
    }

    fn bind_blob_and_append(&mut self, fragment: &str, name: &str, value: &[u8]) -> &mut Self {
        self.append(fragment).bind_blob(name, value)
    }

    fn bind_blob_and_append_or_null(
        &mut self,
        fragment: &str,
        name: &str,
        value: &[u8],
        null_value: &[u8],
    ) -> &mut Self {
        self.append(fragment).bind_blob_or_null(name, value, null_value)
    }

    /// The SQL this statement would submit, without executing it.
    fn sql(&self) -> BindResult<String>;
}

/// A mutation: INSERT, UPDATE, DELETE or DDL.
pub struct Statement<'t> {
    executor: Executor<'t>,
    bindings: Bindings,
}

impl<'t> Statement<'t> {
    pub fn new(executor: Executor<'t>) -> Self {
        Self {
            executor,
            bindings: Bindings::default(),
        }
    }

    /// Execute and return the number of affected rows.
    ///
    /// Consumes the statement: a template is rewritten exactly once.
    pub fn execute(mut self) -> BindResult<u64> {
        let Bindings { template, entries } = std::mem::take(&mut self.bindings);
        let grid = self.executor.run(template.as_str(), &entries)?;

        let affected = match grid.status() {
            GridStatus::Command { affected } => affected,
            GridStatus::Rows => grid.row_count() as u64,
            // Failed grids are turned into errors by the executor.
            GridStatus::Failed { .. } => 0,
        };
        tracing::debug!("{} rows affected", affected);

        Ok(affected)
    }
}

impl Bind for Statement<'_> {
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

/// Rewrite and encode without submitting, returning only the SQL.
pub(crate) fn preview_sql(executor: &Executor<'_>, bindings: &Bindings) -> BindResult<String> {
    let submission = executor.prepare(bindings.template.as_str(), &bindings.entries)?;
    Ok(submission.sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::executor::ExecOptions;
    use crate::transport::{ScriptedTransport, TextGrid};

    #[test]
    fn test_sentinel_binds_null() {
        let mut transport = ScriptedTransport::new();
        let mut stmt = Statement::new(Executor::new(&mut transport, ExecOptions::default()));
        stmt.prepare("UPDATE t SET a = :a, b = :b, c = :c")
            .bind_or_null("a", -1i32, -1i32)
            .bind_or_null("b", "x", "")
            .bind_blob_or_null("c", &[], &[]);
        assert_eq!(stmt.sql().unwrap(), "UPDATE t SET a = NULL, b = $1, c = NULL");
    }

    #[test]
    fn test_bind_and_append() {
        let mut transport = ScriptedTransport::new();
        let mut stmt = Statement::new(Executor::new(&mut transport, ExecOptions::default()));
        stmt.prepare("DELETE FROM t WHERE 1 = 1")
            .bind_and_append(" AND a = :a", "a", 1i64)
            .bind_and_append_or_null(" AND b = :b", "b", 0.0f64, 0.0f64)
            .bind_blob_and_append(" AND c = :c", "c", &[1, 2]);
        assert_eq!(
            stmt.sql().unwrap(),
            "DELETE FROM t WHERE 1 = 1 AND a = $1 AND b = NULL AND c = $2"
        );
        assert_eq!(stmt.bindings().entries.len(), 3);
    }

    #[test]
    fn test_execute_returns_affected() {
        let mut transport = ScriptedTransport::new().with_grid(TextGrid::command(5));
        let mut stmt = Statement::new(Executor::new(&mut transport, ExecOptions::default()));
        stmt.prepare("UPDATE t SET a = :a").bind("a", true);
        assert_eq!(stmt.execute().unwrap(), 5);
        assert_eq!(transport.released_grids(), 1);
    }

    #[test]
    fn test_sqlite_statement() {
        let mut transport = ScriptedTransport::new();
        let mut stmt = Statement::new(Executor::new(&mut transport, ExecOptions::new(Backend::Sqlite)));
        stmt.prepare("INSERT INTO t (a, b) VALUES (:a, :b)")
            .bind(":a", 1i32)
            .bind("b", Option::<String>::None);
        assert_eq!(stmt.sql().unwrap(), "INSERT INTO t (a, b) VALUES (?1, NULL)");
    }
}
