//! Session: a transport plus the backend strategy chosen for it.
//!
//! Statements and selectors borrow the session's transport for the
//! duration of one operation, so only one can run at a time.

use crate::backend::Backend;
use crate::config::Config;
use crate::executor::{ExecOptions, Executor};
use crate::selector::{Mode, Selector};
use crate::statement::Statement;
use crate::transport::Transport;

pub struct Session<T: Transport> {
    transport: T,
    options: ExecOptions,
}

impl<T: Transport> Session<T> {
    /// Create a session speaking `backend` over `transport`.
    ///
    /// # Example
    ///
    /// ```
    /// use sqlbind::prelude::*;
    ///
    /// let transport = ScriptedTransport::new().with_grid(TextGrid::command(1));
    /// let mut session = Session::new(Backend::Postgres, transport);
    ///
    /// let mut stmt = session.statement();
    /// stmt.prepare("DELETE FROM sessions WHERE id = :id").bind("id", 42i64);
    /// assert_eq!(stmt.execute().unwrap(), 1);
    /// ```
    pub fn new(backend: Backend, transport: T) -> Self {
        Self {
            transport,
            options: ExecOptions::new(backend),
        }
    }

    /// Create a session with the backend and binding policy from `config`.
    pub fn with_config(config: &Config, transport: T) -> Self {
        Self {
            transport,
            options: config.exec_options(),
        }
    }

    /// Reject bindings whose name never occurs in the template.
    pub fn strict_bindings(mut self, strict: bool) -> Self {
        self.options.strict_bindings = strict;
        self
    }

    pub fn backend(&self) -> Backend {
        self.options.backend
    }

    pub fn options(&self) -> ExecOptions {
        self.options
    }

    /// Start a mutation.
    pub fn statement(&mut self) -> Statement<'_> {
        Statement::new(self.executor())
    }

    /// Start a multi-row selection.
    pub fn selector(&mut self) -> Selector<'_> {
        Selector::new(self.executor(), Mode::Multi)
    }

    /// Start a selection that must yield exactly one row.
    pub fn single_selector(&mut self) -> Selector<'_> {
        Selector::new(self.executor(), Mode::Single)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    fn executor(&mut self) -> Executor<'_> {
        Executor::new(&mut self.transport, self.options)
    }
}
