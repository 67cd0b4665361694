//! Compilation and caching of codecs.
//!
//! A [`CodecRegistry`] compiles one codec per type on first use and keeps it
//! for the lifetime of the registry. [`CodecRegistry::shared`] is the
//! process-wide instance behind the crate level functions. Tests and
//! embedders may create their own.
//!
//! ## Cycles
//!
//! Compilation runs in a session that reserves a slot for a type before
//! compiling its body. Nested types, the type itself included, are linked to
//! slots by [`CodecId`], so self-referential and mutually referential types
//! terminate.
//!
//! ## Publishing
//!
//! Codecs live in an append-only table shared behind an [`Arc`]. A session
//! compiles without holding any lock and then appends its codecs under a
//! short write lock. If another thread published the same type meanwhile,
//! the published codec wins and the local one is dropped, so each type has at
//! most one codec. A [`CompiledCodec`] holds a snapshot of the table and
//! never locks while it writes or reads.
//!
//! [`Arc`]: alloc::sync::Arc

// -----------------------------------------------------------------------------
// Modules

mod codec_registry;
mod compiled;
mod plan;
mod session;

// -----------------------------------------------------------------------------
// Exports

pub use codec_registry::CodecRegistry;
pub use compiled::CompiledCodec;
pub use plan::CodecId;

pub(crate) use plan::{Codec, CodecTable, EnumPlan, MemberPlan, ObjectPlan, Plan};
