//! # sqlbind: named placeholders in, typed wire parameters out
//!
//! Build a query with `:name` placeholders, bind typed values, and execute
//! it against any backend that can run a positional, typed query and return
//! a grid of nullable text cells.
//!
//! ## Quick Example
//!
//! ```rust
//! use sqlbind::prelude::*;
//!
//! let transport = ScriptedTransport::new()
//!     .with_grid(TextGrid::from_rows(vec![vec![Some("7"), Some("ada")]]));
//! let mut session = Session::new(Backend::Postgres, transport);
//!
//! let mut sel = session.single_selector();
//! sel.prepare("SELECT id, name FROM users WHERE email = :email AND team = :team")
//!     .bind("email", "ada@example.com")
//!     .bind("team", Option::<i32>::None);
//! assert_eq!(
//!     sel.sql()?,
//!     "SELECT id, name FROM users WHERE email = $1 AND team = NULL"
//! );
//!
//! let row = sel.fetch_one()?;
//! assert_eq!(row.get_i64(0)?, Some(7));
//! # Ok::<(), sqlbind::BindError>(())
//! ```
//!
//! ## Pipeline
//!
//! | Stage        | Module                  | Does                                   |
//! |--------------|-------------------------|----------------------------------------|
//! | Substitution | [`template`], [`parser`]| `:name` → `$n` / `?n` or `NULL`        |
//! | Encoding     | [`encoder`]             | values → big-endian binary or text     |
//! | Execution    | [`executor`]            | one transport call, buffers freed      |
//! | Decoding     | [`selector`], [`row`]   | row-count contract, typed cells        |

pub mod backend;
pub mod config;
pub mod encoder;
pub mod error;
pub mod executor;
pub mod parser;
pub mod row;
pub mod selector;
pub mod session;
pub mod statement;
pub mod template;
pub mod transport;
pub mod value;

pub use error::{BindError, BindResult, ErrorCategory};

pub mod prelude {
    pub use crate::backend::Backend;
    pub use crate::config::Config;
    pub use crate::encoder::{Format, ParamBatch, WireParam};
    pub use crate::error::*;
    pub use crate::executor::{ExecOptions, Executor, Submission};
    pub use crate::row::{FromCell, Row};
    pub use crate::selector::{Mode, Selector};
    pub use crate::session::Session;
    pub use crate::statement::{Bind, Bindings, Statement};
    pub use crate::template::QueryTemplate;
    pub use crate::transport::{
        BackendError, GridStatus, ResultGrid, ScriptedTransport, TextGrid, Transport,
    };
    pub use crate::value::{BindEntry, BindValue, ValueKind};
}

/// Rewrite a template for `backend` without encoding or executing it.
///
/// # Example
///
/// ```
/// use sqlbind::{rewrite, backend::Backend, value::BindEntry};
///
/// let sql = rewrite(
///     "UPDATE t SET x = :x WHERE id = :id",
///     &[BindEntry::new("x", 42i32), BindEntry::null("id")],
///     Backend::Postgres,
/// );
/// assert_eq!(sql, "UPDATE t SET x = $1 WHERE id = NULL");
/// ```
pub fn rewrite(template: &str, entries: &[value::BindEntry], backend: backend::Backend) -> String {
    template::rewrite(template, entries, backend).sql
}
