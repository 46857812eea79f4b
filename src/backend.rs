//! Backend strategies.
//!
//! The set of supported backends is closed: each variant knows its own
//! positional marker syntax and how it spells booleans and blobs in text
//! result cells. The backend is picked once, when a session is created.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BindError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Binary protocol backend: `$1` markers, `t`/`f` booleans, `\x` bytea.
    #[default]
    Postgres,
    /// Embedded backend: `?1` markers, integer booleans, hex blobs.
    Sqlite,
}

impl Backend {
    /// Positional marker for the 1-based parameter `index`.
    pub fn marker(self, index: usize) -> String {
        match self {
            Backend::Postgres => format!("${}", index),
            Backend::Sqlite => format!("?{}", index),
        }
    }

    /// Parse a boolean result cell.
    pub fn parse_bool(self, raw: &str) -> Result<bool, String> {
        match self {
            Backend::Postgres => match raw {
                "t" | "T" | "true" | "1" => Ok(true),
                "f" | "F" | "false" | "0" => Ok(false),
                _ => Err(format!("invalid boolean: '{}'", raw)),
            },
            // Stored as INTEGER; only exactly 1 counts as true.
            Backend::Sqlite => raw
                .trim()
                .parse::<i64>()
                .map(|n| n == 1)
                .map_err(|e| format!("invalid boolean: '{}' ({})", raw, e)),
        }
    }

    /// Decode a blob result cell into raw bytes.
    pub fn decode_blob(self, raw: &str) -> Result<Vec<u8>, String> {
        match self {
            Backend::Postgres => decode_bytea(raw),
            Backend::Sqlite => decode_hex_blob(raw),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Postgres => "postgres",
            Backend::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Backend::Postgres),
            "sqlite" | "sqlite3" => Ok(Backend::Sqlite),
            other => Err(BindError::Config(format!(
                "Unknown backend '{}'. Expected: postgres or sqlite",
                other
            ))),
        }
    }
}

/// Decode a SQLite blob cell: `hex(blob)` output, optionally carrying the
/// `\x` prefix the default blob escaping writes.
fn decode_hex_blob(raw: &str) -> Result<Vec<u8>, String> {
    let digits = raw.strip_prefix("\\x").unwrap_or(raw);
    hex::decode(digits).map_err(|e| format!("invalid blob hex: {}", e))
}

/// Decode bytea text output: hex format (`\x0a0b`) or the legacy escape
/// format (`\\` for a backslash, `\ooo` octal for other bytes).
fn decode_bytea(raw: &str) -> Result<Vec<u8>, String> {
    if let Some(hex_digits) = raw.strip_prefix("\\x") {
        return hex::decode(hex_digits).map_err(|e| format!("invalid bytea hex: {}", e));
    }

    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
        } else if bytes.get(i + 1) == Some(&b'\\') {
            out.push(b'\\');
            i += 2;
        } else {
            let octal = bytes
                .get(i + 1..i + 4)
                .and_then(|d| std::str::from_utf8(d).ok())
                .and_then(|d| u8::from_str_radix(d, 8).ok())
                .ok_or_else(|| format!("invalid bytea escape at offset {}", i))?;
            out.push(octal);
            i += 4;
        }
    }
    Ok(out)
}
