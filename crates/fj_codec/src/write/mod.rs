//! The writer engine.
//!
//! A [`Writer`] walks a compiled codec and appends text to a `String`.
//! Top-level calls reuse a per-thread buffer, so steady-state serialization
//! allocates only the returned string.

// -----------------------------------------------------------------------------
// Modules

mod primitive;
mod writer;

// -----------------------------------------------------------------------------
// Exports

pub use writer::Writer;

pub(crate) use writer::TYPE_KEY;

use core::any::Any;
use core::cell::RefCell;

use crate::error::JsonResult;
use crate::registry::{CodecId, CodecTable};
use crate::settings::Settings;

std::thread_local! {
    static BUFFER: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Serializes through this thread's reusable buffer.
pub(crate) fn write_to_string(
    table: &CodecTable,
    id: CodecId,
    value: &dyn Any,
    settings: &Settings,
) -> JsonResult<String> {
    BUFFER.with(|buffer| match buffer.try_borrow_mut() {
        Ok(mut buffer) => {
            buffer.clear();
            Writer::new(&mut buffer, table, settings).write(id, value)?;
            Ok(buffer.as_str().into())
        }
        // Re-entered from inside a write, e.g. by a custom accessor.
        Err(_) => {
            let mut out = String::new();
            Writer::new(&mut out, table, settings).write(id, value)?;
            Ok(out)
        }
    })
}
