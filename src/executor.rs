//! Executor: the only place that talks to the transport.
//!
//! Rewrites the template, encodes the bindings, submits both in one call
//! and hands the raw grid on. Parameter buffers are owned by the
//! [`Submission`] and freed as soon as the transport call returns,
//! whatever its outcome.

use crate::backend::Backend;
use crate::encoder::{encode, ParamBatch};
use crate::error::{BindError, BindResult};
use crate::template::rewrite;
use crate::transport::{GridStatus, ResultGrid, Transport};
use crate::value::BindEntry;

/// Per-session execution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecOptions {
    pub backend: Backend,
    /// Reject bindings whose name never occurs in the template.
    pub strict_bindings: bool,
}

impl ExecOptions {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            strict_bindings: false,
        }
    }
}

/// Rewritten SQL plus its encoded parameters, ready to submit.
#[derive(Debug)]
pub struct Submission {
    pub sql: String,
    pub params: ParamBatch,
}

impl Submission {
    /// Rewrite and encode without touching the network.
    pub fn build(
        template: &str,
        entries: &[BindEntry],
        options: ExecOptions,
        transport: &dyn Transport,
    ) -> BindResult<Self> {
        let rewritten = rewrite(template, entries, options.backend);

        if let Some(name) = rewritten.unbound.into_iter().next() {
            return Err(BindError::UnboundPlaceholder(name));
        }
        if options.strict_bindings {
            if let Some(name) = rewritten.unused.into_iter().next() {
                return Err(BindError::UnusedBinding(name));
            }
        }

        let params = encode(entries, transport)?;
        debug_assert_eq!(params.len(), rewritten.param_count);

        Ok(Self {
            sql: rewritten.sql,
            params,
        })
    }
}

/// Submits statements over a borrowed transport.
pub struct Executor<'t> {
    transport: &'t mut dyn Transport,
    options: ExecOptions,
}

impl<'t> Executor<'t> {
    pub fn new(transport: &'t mut dyn Transport, options: ExecOptions) -> Self {
        Self { transport, options }
    }

    pub fn options(&self) -> ExecOptions {
        self.options
    }

    pub fn backend(&self) -> Backend {
        self.options.backend
    }

    /// Build a submission for `template` against this executor's transport.
    pub fn prepare(&self, template: &str, entries: &[BindEntry]) -> BindResult<Submission> {
        Submission::build(template, entries, self.options, &*self.transport)
    }

    /// Rewrite, encode and submit. Blocks until the backend answers.
    pub fn run(&mut self, template: &str, entries: &[BindEntry]) -> BindResult<Box<dyn ResultGrid>> {
        let submission = self.prepare(template, entries)?;
        self.submit(submission)
    }

    /// Submit a prepared submission and check the result status.
    pub fn submit(&mut self, submission: Submission) -> BindResult<Box<dyn ResultGrid>> {
        let Submission { sql, params } = submission;
        tracing::debug!("Executing ({} params): {}", params.len(), sql);

        let result = if params.is_empty() {
            self.transport.execute(&sql)
        } else {
            self.transport.execute_params(&sql, &params)
        };
        drop(params);

        let grid = result.map_err(|e| BindError::Execution(e.message))?;
        if let GridStatus::Failed { message } = grid.status() {
            tracing::warn!("Backend reported failure: {}", message);
            return Err(BindError::Execution(message));
        }

        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Format;
    use crate::transport::{ScriptedTransport, TextGrid};

    #[test]
    fn test_no_params_uses_plain_execute() {
        let mut transport = ScriptedTransport::new();
        {
            let mut exec = Executor::new(&mut transport, ExecOptions::default());
            exec.run("DELETE FROM t WHERE a = :a", &[BindEntry::null("a")])
                .unwrap();
        }
        let sub = transport.last_submitted().unwrap();
        assert_eq!(sub.sql, "DELETE FROM t WHERE a = NULL");
        assert!(sub.params.is_empty());
    }

    #[test]
    fn test_params_submitted_together() {
        let mut transport = ScriptedTransport::new();
        {
            let mut exec = Executor::new(&mut transport, ExecOptions::default());
            exec.run(
                "UPDATE t SET x = :x, s = :s WHERE id = :id",
                &[
                    BindEntry::new("x", 42i32),
                    BindEntry::new("s", "hi"),
                    BindEntry::null("id"),
                ],
            )
            .unwrap();
        }
        let sub = transport.last_submitted().unwrap();
        assert_eq!(sub.sql, "UPDATE t SET x = $1, s = $2 WHERE id = NULL");
        assert_eq!(sub.params.len(), 2);
        assert_eq!(sub.params[0].payload(), &[0, 0, 0, 42]);
        assert_eq!(sub.params[0].format(), Format::Binary);
        assert_eq!(sub.params[1].payload(), b"hi");
        assert_eq!(sub.params[1].format(), Format::Text);
    }

    #[test]
    fn test_backend_error_is_execution_error() {
        let mut transport = ScriptedTransport::new().with_error("syntax error at or near \"SELEC\"");
        let mut exec = Executor::new(&mut transport, ExecOptions::default());
        let err = exec.run("SELEC :a", &[BindEntry::new("a", 1i32)]).err().unwrap();
        assert!(matches!(err, BindError::Execution(ref m) if m.contains("SELEC")));
    }

    #[test]
    fn test_failed_grid_is_released() {
        let mut transport = ScriptedTransport::new().with_grid(TextGrid::failed("duplicate key"));
        {
            let mut exec = Executor::new(&mut transport, ExecOptions::default());
            let err = exec.run("INSERT INTO t VALUES (1)", &[]).err().unwrap();
            assert!(matches!(err, BindError::Execution(_)));
        }
        assert_eq!(transport.issued_grids(), 1);
        assert_eq!(transport.released_grids(), 1);
    }

    #[test]
    fn test_unbound_placeholder_fails_before_submit() {
        let mut transport = ScriptedTransport::new();
        {
            let mut exec = Executor::new(&mut transport, ExecOptions::default());
            let err = exec.run("SELECT :nope", &[]).err().unwrap();
            assert!(matches!(err, BindError::UnboundPlaceholder(ref n) if n == "nope"));
        }
        assert!(transport.submitted().is_empty());
    }

    #[test]
    fn test_strict_bindings() {
        let mut transport = ScriptedTransport::new();
        let options = ExecOptions {
            backend: Backend::Postgres,
            strict_bindings: true,
        };
        let mut exec = Executor::new(&mut transport, options);
        let err = exec
            .run("SELECT 1", &[BindEntry::new("extra", 1i32)])
            .err()
            .unwrap();
        assert!(matches!(err, BindError::UnusedBinding(ref n) if n == "extra"));
    }
}
