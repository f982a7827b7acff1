//! Meter wire protocol decoding.
//!
//! Layered the same way for every stage:
//! - `layout`: slot positions, masks, and the segment table (source of truth)
//! - `reader`: framing-nibble validation and the slot buffer accessors
//! - `parser`: frame assembly and reading decode (no raw slot arithmetic)
//! - `digits` / `attributes`: the two decode tables
//! - `error`: explicit, actionable errors
//!
//! Nothing here performs I/O; bytes arrive through `crate::source`.

pub mod attributes;
pub mod digits;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
