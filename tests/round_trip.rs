//! Bind, encode, "store" and read back through an echo backend.
//!
//! The echo transport decodes each submitted parameter the way a server
//! would and returns it as a single text row, spelled the way the chosen
//! backend spells its cells, so every value crosses the full encode /
//! decode path.

use sqlbind::encoder::{Format, ParamBatch};
use sqlbind::prelude::*;

/// Column types the echo server assumes for each positional parameter.
struct EchoTransport {
    backend: Backend,
    kinds: Vec<ValueKind>,
}

impl EchoTransport {
    fn new(kinds: Vec<ValueKind>) -> Self {
        Self::for_backend(Backend::Postgres, kinds)
    }

    fn for_backend(backend: Backend, kinds: Vec<ValueKind>) -> Self {
        Self { backend, kinds }
    }

    fn cell(&self, kind: ValueKind, param: &WireParam) -> String {
        let bytes = param.payload();
        match kind {
            ValueKind::Bool => {
                let on = bytes == [1u8];
                let text = match self.backend {
                    Backend::Postgres => if on { "t" } else { "f" },
                    Backend::Sqlite => if on { "1" } else { "0" },
                };
                text.to_string()
            }
            ValueKind::Int32 => i32::from_be_bytes(bytes.try_into().unwrap()).to_string(),
            ValueKind::Int64 => i64::from_be_bytes(bytes.try_into().unwrap()).to_string(),
            ValueKind::Double => f64::from_be_bytes(bytes.try_into().unwrap()).to_string(),
            ValueKind::String => Self::text(param),
            ValueKind::Blob => {
                let escaped = Self::text(param);
                match self.backend {
                    Backend::Postgres => escaped,
                    // SQLite stores the raw bytes; `hex(col)` reads them back.
                    Backend::Sqlite => {
                        let raw = hex::decode(escaped.strip_prefix("\\x").unwrap()).unwrap();
                        hex::encode_upper(raw)
                    }
                }
            }
            ValueKind::Null => unreachable!("nulls never reach the wire"),
        }
    }

    fn text(param: &WireParam) -> String {
        assert_eq!(param.as_buffer().last(), Some(&0), "text params are NUL-terminated");
        String::from_utf8(param.payload().to_vec()).unwrap()
    }
}

impl Transport for EchoTransport {
    fn execute(&mut self, _sql: &str) -> Result<Box<dyn ResultGrid>, BackendError> {
        Ok(Box::new(TextGrid::empty(0)))
    }

    fn execute_params(
        &mut self,
        _sql: &str,
        params: &ParamBatch,
    ) -> Result<Box<dyn ResultGrid>, BackendError> {
        assert_eq!(params.len(), self.kinds.len());
        let cells: Vec<String> = params
            .iter()
            .zip(&self.kinds)
            .map(|(p, k)| self.cell(*k, p))
            .collect();
        let row = cells.iter().map(|c| Some(c.as_str())).collect();
        Ok(Box::new(TextGrid::from_rows(vec![row])))
    }
}

#[test]
fn test_scalars_round_trip() {
    let transport = EchoTransport::new(vec![
        ValueKind::Bool,
        ValueKind::Int32,
        ValueKind::Int64,
        ValueKind::Double,
        ValueKind::String,
        ValueKind::Blob,
    ]);
    let mut session = Session::new(Backend::Postgres, transport);
    let blob = vec![0u8, 1, 0x7f, 0x80, 0xff];

    let mut sel = session.single_selector();
    sel.prepare("SELECT :b, :i, :l, :d, :s, :x")
        .bind("b", true)
        .bind("i", i32::MIN)
        .bind("l", i64::MAX)
        .bind("d", -2.5e-3f64)
        .bind("s", "héllo 'world'")
        .bind_blob("x", &blob);
    let row = sel.fetch_one().unwrap();

    assert_eq!(row.get_bool(0).unwrap(), Some(true));
    assert_eq!(row.get_i32(1).unwrap(), Some(i32::MIN));
    assert_eq!(row.get_i64(2).unwrap(), Some(i64::MAX));
    assert_eq!(row.get_f64(3).unwrap(), Some(-2.5e-3));
    assert_eq!(row.get_string(4).unwrap().as_deref(), Some("héllo 'world'"));
    assert_eq!(row.get_blob(5).unwrap(), Some(blob));
}

#[test]
fn test_false_and_extremes_round_trip() {
    let transport = EchoTransport::new(vec![
        ValueKind::Bool,
        ValueKind::Int32,
        ValueKind::Int64,
        ValueKind::Double,
    ]);
    let mut session = Session::new(Backend::Postgres, transport);

    let mut sel = session.single_selector();
    sel.prepare("SELECT :b, :i, :l, :d")
        .bind("b", false)
        .bind("i", i32::MAX)
        .bind("l", i64::MIN)
        .bind("d", f64::INFINITY);
    let row = sel.fetch_one().unwrap();

    assert_eq!(row.get_bool(0).unwrap(), Some(false));
    assert_eq!(row.get_i32(1).unwrap(), Some(i32::MAX));
    assert_eq!(row.get_i64(2).unwrap(), Some(i64::MIN));
    assert_eq!(row.get_f64(3).unwrap(), Some(f64::INFINITY));
}

#[test]
fn test_empty_string_and_blob_round_trip() {
    let transport = EchoTransport::new(vec![ValueKind::String, ValueKind::Blob]);
    let mut session = Session::new(Backend::Postgres, transport);

    let mut sel = session.single_selector();
    sel.prepare("SELECT :s, :x").bind("s", "").bind_blob("x", &[]);
    let row = sel.fetch_one().unwrap();

    assert_eq!(row.get_string(0).unwrap(), Some(String::new()));
    assert_eq!(row.get_blob(1).unwrap(), Some(Vec::new()));
}

#[test]
fn test_null_entries_are_not_sent() {
    let transport = EchoTransport::new(vec![ValueKind::Int32]);
    let mut session = Session::new(Backend::Postgres, transport);

    let mut sel = session.single_selector();
    sel.prepare("SELECT :a WHERE :gone IS NULL")
        .bind_null("gone")
        .bind("a", 9i32);
    assert_eq!(sel.sql().unwrap(), "SELECT $1 WHERE NULL IS NULL");
    let row = sel.fetch_one().unwrap();
    assert_eq!(row.get_i32(0).unwrap(), Some(9));
}

#[test]
fn test_formats_per_kind() {
    let transport = ScriptedTransport::new();
    let entries = [
        BindEntry::new("b", true),
        BindEntry::new("i", 1i32),
        BindEntry::new("l", 1i64),
        BindEntry::new("d", 1.0f64),
        BindEntry::new("s", "1"),
        BindEntry::new("x", vec![1u8]),
    ];
    let batch = sqlbind::encoder::encode(&entries, &transport).unwrap();

    assert_eq!(batch.formats(), vec![1, 1, 1, 1, 0, 0]);
    assert_eq!(batch.lengths(), vec![1, 4, 8, 8, 1, 4]);
    assert_eq!(batch.get(1).unwrap().payload(), &[0, 0, 0, 1]);
    assert_eq!(batch.get(2).unwrap().payload(), &[0, 0, 0, 0, 0, 0, 0, 1]);
    assert_eq!(batch.get(3).unwrap().payload(), &1.0f64.to_be_bytes());
    assert_eq!(batch.get(5).unwrap().payload(), b"\\x01");
    assert_eq!(batch.get(0).unwrap().format(), Format::Binary);
}

#[test]
fn test_sqlite_scalars_round_trip() {
    let transport = EchoTransport::for_backend(
        Backend::Sqlite,
        vec![
            ValueKind::Bool,
            ValueKind::Bool,
            ValueKind::Int32,
            ValueKind::Int64,
            ValueKind::Double,
            ValueKind::String,
            ValueKind::Blob,
        ],
    );
    let mut session = Session::new(Backend::Sqlite, transport);
    let blob = vec![0xdeu8, 0xad, 0x00, 0xff];

    let mut sel = session.single_selector();
    sel.prepare("SELECT :yes, :no, :i, :l, :d, :s, :x")
        .bind("yes", true)
        .bind("no", false)
        .bind("i", -7i32)
        .bind("l", 1i64 << 40)
        .bind("d", 0.1f64)
        .bind("s", "naïve")
        .bind_blob("x", &blob);
    assert_eq!(sel.sql().unwrap(), "SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7");
    let row = sel.fetch_one().unwrap();

    assert_eq!(row.get_bool(0).unwrap(), Some(true));
    assert_eq!(row.get_bool(1).unwrap(), Some(false));
    assert_eq!(row.get_i32(2).unwrap(), Some(-7));
    assert_eq!(row.get_i64(3).unwrap(), Some(1i64 << 40));
    assert_eq!(row.get_f64(4).unwrap(), Some(0.1));
    assert_eq!(row.get_string(5).unwrap().as_deref(), Some("naïve"));
    assert_eq!(row.get_blob(6).unwrap(), Some(blob));
}

#[test]
fn test_sqlite_blob_read_back_as_sent() {
    // A stored text cell echoed verbatim still decodes to the bound bytes.
    let mut session = Session::new(
        Backend::Sqlite,
        EchoTransport::for_backend(Backend::Postgres, vec![ValueKind::Blob]),
    );

    let mut sel = session.single_selector();
    sel.prepare("SELECT :x").bind_blob("x", &[0xde, 0xad]);
    let row = sel.fetch_one().unwrap();
    assert_eq!(row.get_blob(0).unwrap(), Some(vec![0xde, 0xad]));
}
