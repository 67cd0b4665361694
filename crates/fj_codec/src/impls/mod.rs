//! [`JsonType`](crate::JsonType) for foreign types.
//!
//! ## Implemented Menu
//!
//! - primitives:
//!     - `bool`, `i8`-`i64`, `isize`, `u8`-`u64`, `usize`, `f32`, `f64`
//!     - [`Decimal`](crate::primitives::Decimal), `char`, `String`
//!     - `chrono`: `DateTime<Utc>`, `NaiveDateTime`, `DateTime<FixedOffset>`, `TimeDelta`
//!     - `uuid::Uuid`, `bytes::Bytes`
//! - lists: `Vec<T>`, `VecDeque<T>`, `[T; N]`, `Box<[T]>`, `HashSet<T, S>`, `BTreeSet<T>`
//! - dictionaries: `HashMap<K, V, S>`, `hashbrown::HashMap<K, V, S>`, `BTreeMap<K, V>`
//! - tuples: `()`, `(T0,)` .. `(T0, ..., T11)`
//! - wrappers: `Option<T>`, `Box<T>`
//! - untyped: [`JsonValue`](crate::value::JsonValue), [`Dynamic`](crate::value::Dynamic)
//!
//! Containers require `Default` elements, so that the reader has a value
//! to decode into.

// -----------------------------------------------------------------------------
// Modules

mod map;
mod primitive;
mod sequence;
mod tuple;
mod value;
mod wrapper;
