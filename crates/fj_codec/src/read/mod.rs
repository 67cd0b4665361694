//! The reader engine.
//!
//! A reader walks a compiled codec over a [`Cursor`] and decodes into an
//! existing value in place. Top-level reads first check the outer envelope:
//! objects and dictionaries must be wrapped in `{}`, lists and tuples in
//! `[]`, and nothing but whitespace may follow the value. Inside the
//! envelope the reader is lenient. Unknown members are skipped, `null`
//! leaves non-nullable values unchanged, and numbers may be quoted.

// -----------------------------------------------------------------------------
// Modules

mod cursor;
mod primitive;
mod reader;

// -----------------------------------------------------------------------------
// Exports

pub use cursor::Cursor;

use core::any::Any;
use core::cell::Cell;

use crate::error::{JsonError, JsonResult};
use crate::registry::{CodecId, CodecTable, Plan};
use crate::settings::Settings;
use reader::Reader;

std::thread_local! {
    static SCRATCH: Cell<String> = const { Cell::new(String::new()) };
}

/// The brackets a top-level document of codec `id` must be wrapped in.
fn envelope(table: &CodecTable, id: CodecId) -> Option<(u8, u8)> {
    match &table.get(id).plan {
        Plan::Nullable { inner, .. } | Plan::Boxed { inner, .. } => envelope(table, *inner),
        Plan::Object(_) | Plan::Dictionary { .. } => Some((b'{', b'}')),
        Plan::List { .. } | Plan::Tuple { .. } => Some((b'[', b']')),
        _ => None,
    }
}

fn with_reader<'a, 't, R>(
    cursor: Cursor<'a>,
    table: &'t CodecTable,
    settings: &'t Settings,
    f: impl FnOnce(&mut Reader<'a, 't>) -> JsonResult<R>,
) -> JsonResult<R> {
    let mut reader = Reader::new(cursor, table, settings, SCRATCH.take());
    let result = f(&mut reader);
    SCRATCH.set(reader.into_scratch());
    result
}

/// Reads a complete document.
pub(crate) fn read_root(
    table: &CodecTable,
    id: CodecId,
    text: &str,
    target: &mut dyn Any,
    settings: &Settings,
) -> JsonResult<()> {
    let trimmed = text.trim_matches([' ', '\t', '\n', '\r']);
    if trimmed.is_empty() {
        return Err(JsonError::invalid_json(0, "the document is empty"));
    }
    if let Some((open, close)) = envelope(table, id)
        && trimmed != "null"
    {
        let bytes = trimmed.as_bytes();
        let start = text.len() - text.trim_start_matches([' ', '\t', '\n', '\r']).len();
        if bytes[0] != open {
            return Err(JsonError::invalid_json(
                start,
                format!("the document must start with `{}`", char::from(open)),
            ));
        }
        if bytes[bytes.len() - 1] != close {
            return Err(JsonError::invalid_json(
                start + bytes.len() - 1,
                format!("the document must end with `{}`", char::from(close)),
            ));
        }
    }

    with_reader(Cursor::new(text), table, settings, |reader| {
        reader.read(id, target)?;
        reader.finish()
    })
}

/// Reads one value at `cursor` and advances it.
pub(crate) fn read_nested(
    table: &CodecTable,
    id: CodecId,
    cursor: &mut Cursor<'_>,
    target: &mut dyn Any,
    settings: &Settings,
) -> JsonResult<()> {
    *cursor = with_reader(*cursor, table, settings, |reader| {
        reader.read(id, target)?;
        Ok(reader.cursor())
    })?;
    Ok(())
}
