//! Query templates and placeholder substitution.
//!
//! A template is SQL text with `:name` placeholders. At execution time it
//! is rewritten into backend-native SQL:
//!
//! ```text
//! UPDATE t SET x = :x WHERE id = :id      x = 42, id = NULL
//!                  ──┬─            ──┬─
//!                    │               └── NULL   (null binding, no parameter)
//!                    └── $1                     (first non-null binding)
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::backend::Backend;
use crate::parser::{segments, Segment};
use crate::value::BindEntry;

/// SQL text with named placeholders, built up in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTemplate {
    text: String,
}

impl QueryTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Append a fragment, e.g. an optional `AND col = :col` clause.
    pub fn append(&mut self, fragment: &str) {
        self.text.push_str(fragment);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        crate::parser::placeholder_names(&self.text)
    }
}

impl From<&str> for QueryTemplate {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for QueryTemplate {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for QueryTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Output of [`rewrite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    /// Backend-native SQL.
    pub sql: String,
    /// Number of positional markers assigned (non-null entries).
    pub param_count: usize,
    /// Placeholders in the template with no bind entry, left as `:name`.
    pub unbound: Vec<String>,
    /// Bound names that never occur in the template.
    pub unused: Vec<String>,
}

/// Replace placeholders with positional markers or `NULL`.
///
/// Non-null entries get markers `1..=n` in binding order, whether or not
/// their name occurs in the template. Every occurrence of a name uses the
/// replacement of the first entry bound under that name. Null entries are
/// written as the `NULL` keyword and take no index.
pub fn rewrite(template: &str, entries: &[BindEntry], backend: Backend) -> Rewritten {
    let mut replacements: HashMap<&str, String> = HashMap::with_capacity(entries.len());
    let mut param_count = 0;

    for entry in entries {
        let replacement = if entry.value.is_null() {
            "NULL".to_string()
        } else {
            param_count += 1;
            backend.marker(param_count)
        };
        replacements.entry(entry.name.as_str()).or_insert(replacement);
    }

    let mut sql = String::with_capacity(template.len() + entries.len() * 2);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut unbound: Vec<String> = Vec::new();

    for segment in segments(template) {
        match segment {
            Segment::Literal(text) => sql.push_str(text),
            Segment::Placeholder(name) => match replacements.get(name) {
                Some(replacement) => {
                    seen.insert(name);
                    sql.push_str(replacement);
                }
                None => {
                    if !unbound.iter().any(|n| n == name) {
                        unbound.push(name.to_string());
                    }
                    sql.push(':');
                    sql.push_str(name);
                }
            },
        }
    }

    let mut unused: Vec<String> = Vec::new();
    for entry in entries {
        let name = entry.name.as_str();
        if !seen.contains(name) && !unused.iter().any(|n| n == name) {
            tracing::debug!("Binding '{}' does not occur in the template", name);
            unused.push(name.to_string());
        }
    }

    Rewritten {
        sql,
        param_count,
        unbound,
        unused,
    }
}
