//! TIC protocol decoding.
//!
//! The link carries frames (`0x02`…`0x03`) of datasets (`0x0A`…`0x0D`). Each
//! byte holds 7 data bits and an even-parity bit. A dataset is a name, an
//! optional timestamp and a value, split by a separator whose identity
//! (space or tab) gives the protocol generation, followed by a checksum byte.
//!
//! The module is layered:
//! - `layout`: marker bytes and field caps (source of truth)
//! - `reader`: parity, checksum and field splitting over a completed dataset
//! - `parser`: the byte-driven state machine
//! - `error`: explicit, recoverable decode errors
//!
//! `buffer` holds the bounded accumulation buffer and `encoder` the reverse
//! direction, used for fixtures and tests.

pub mod buffer;
pub mod encoder;
pub mod error;
pub mod generation;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::{DecodeError, ErrorKind};
pub use generation::Generation;
pub use parser::{Dataset, Decoder, DecoderState, DecoderStats, Outcome};
