//! Error types for sqlbind.

use thiserror::Error;

use crate::value::ValueKind;

/// The main error type for binding, execution and decoding.
#[derive(Debug, Error)]
pub enum BindError {
    /// The transport does not accept this kind of bound value.
    #[error("Unsupported binding type for '{name}': {kind}")]
    UnsupportedBinding { name: String, kind: ValueKind },

    /// The backend's blob escaping routine refused the payload.
    #[error("Unable to escape blob '{name}': {message}")]
    Escape { name: String, message: String },

    /// A text parameter contains a NUL byte and cannot be terminated.
    #[error("Value for '{name}' contains a NUL byte (0x00)")]
    NullByte { name: String },

    /// A single parameter payload does not fit the wire length field.
    #[error("Value for '{name}' is too large: {len} bytes (limit is 2147483647)")]
    ParamTooLarge { name: String, len: usize },

    /// More parameters than the wire protocol can address.
    #[error("Too many parameters: {0} (limit is 32767)")]
    TooManyParameters(usize),

    /// The template references a placeholder that was never bound.
    #[error("Placeholder ':{0}' has no bound value")]
    UnboundPlaceholder(String),

    /// A bound name does not occur in the template (strict bindings only).
    #[error("Binding '{0}' does not occur in the query template")]
    UnusedBinding(String),

    /// The backend rejected or failed the query.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Single-row selection returned no rows.
    #[error("No data found in select")]
    NoData,

    /// Single-row selection returned more than one row.
    #[error("Multiple rows ({0}) returned for single-row selection")]
    MultipleRows(usize),

    /// A cell could not be converted to the requested type.
    #[error("Cannot decode column {column}: {message}")]
    Coercion { column: usize, message: String },

    /// The accessor asked for a column the row does not have.
    #[error("Column index {column} out of range (row has {columns} columns)")]
    ColumnOutOfRange { column: usize, columns: usize },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`BindError`], for callers that branch on
/// the kind of failure rather than its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Encoding,
    Binding,
    Execution,
    RowCount,
    Coercion,
    Config,
}

impl BindError {
    /// Create a coercion error for the given column.
    pub fn coercion(column: usize, message: impl Into<String>) -> Self {
        Self::Coercion {
            column,
            message: message.into(),
        }
    }

    /// Create a blob escape error.
    pub fn escape(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Escape {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedBinding { .. }
            | Self::Escape { .. }
            | Self::NullByte { .. }
            | Self::ParamTooLarge { .. }
            | Self::TooManyParameters(_) => ErrorCategory::Encoding,
            Self::UnboundPlaceholder(_) | Self::UnusedBinding(_) => ErrorCategory::Binding,
            Self::Execution(_) => ErrorCategory::Execution,
            Self::NoData | Self::MultipleRows(_) => ErrorCategory::RowCount,
            Self::Coercion { .. } | Self::ColumnOutOfRange { .. } => ErrorCategory::Coercion,
            Self::Config(_) | Self::Io(_) => ErrorCategory::Config,
        }
    }
}

/// Result type alias for sqlbind operations.
pub type BindResult<T> = Result<T, BindError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BindError::coercion(2, "invalid digit found in string");
        assert_eq!(
            err.to_string(),
            "Cannot decode column 2: invalid digit found in string"
        );
    }

    #[test]
    fn test_row_count_errors_are_distinct() {
        assert_eq!(BindError::NoData.category(), ErrorCategory::RowCount);
        assert_eq!(BindError::MultipleRows(3).category(), ErrorCategory::RowCount);
        assert_eq!(
            BindError::Execution("syntax error".into()).category(),
            ErrorCategory::Execution
        );
    }

    #[test]
    fn test_unsupported_binding_display() {
        let err = BindError::UnsupportedBinding {
            name: "payload".into(),
            kind: ValueKind::Blob,
        };
        assert_eq!(err.to_string(), "Unsupported binding type for 'payload': blob");
    }
}
