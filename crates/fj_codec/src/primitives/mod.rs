//! Stateless conversions between primitive values and JSON text.
//!
//! ## Menu
//!
//! - [`integer`]: integers ⇄ ASCII decimal.
//! - [`float`]: `f32`/`f64` ⇄ text.
//! - [`Decimal`]: base-10 fixed point numbers.
//! - [`date`]: date-times ⇄ legacy, ISO-8601, epoch and custom schemes.
//! - [`time_span`]: [`chrono::TimeDelta`] ⇄ `[-][d.]hh:mm:ss[.f]`.
//! - [`guid`]: [`uuid::Uuid`] ⇄ hyphenated text.
//! - [`binary`]: [`bytes::Bytes`] ⇄ base64.
//! - [`text`]: string escaping.
//! - [`PrimitiveKind`]: the closed set of leaf types.

// -----------------------------------------------------------------------------
// Modules

mod decimal;

pub mod binary;
pub mod date;
pub mod float;
pub mod guid;
pub mod integer;
pub mod text;
pub mod time_span;

// -----------------------------------------------------------------------------
// Exports

pub use decimal::{Decimal, MAX_SCALE, ParseDecimalError};

// -----------------------------------------------------------------------------
// PrimitiveKind

/// The leaf types of the wire format. These never recurse further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Decimal,
    Char,
    String,
    /// `chrono::DateTime<Utc>`
    DateTime,
    /// `chrono::NaiveDateTime`
    NaiveDateTime,
    /// `chrono::DateTime<FixedOffset>`
    DateTimeOffset,
    /// `chrono::TimeDelta`
    TimeSpan,
    /// `uuid::Uuid`
    Guid,
    /// `bytes::Bytes`
    Bytes,
}

impl PrimitiveKind {
    /// Whether the value is written between quotes.
    ///
    /// Dates are string based, except under the epoch scheme where the writer
    /// emits a bare number.
    pub const fn is_string_based(self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::String
                | Self::DateTime
                | Self::NaiveDateTime
                | Self::DateTimeOffset
                | Self::TimeSpan
                | Self::Guid
                | Self::Bytes
        )
    }

    /// Whether the value is an integer or floating point number.
    pub const fn is_numeric(self) -> bool {
        !self.is_string_based() && !matches!(self, Self::Bool)
    }

    /// A short name used in conversion errors.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "decimal",
            Self::Char => "char",
            Self::String => "string",
            Self::DateTime => "date-time",
            Self::NaiveDateTime => "naive date-time",
            Self::DateTimeOffset => "date-time with offset",
            Self::TimeSpan => "time interval",
            Self::Guid => "guid",
            Self::Bytes => "base64 bytes",
        }
    }
}
