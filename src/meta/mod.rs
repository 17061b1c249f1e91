// Meta string encoding.
//
// Short identifier-like strings (package, type and field names) packed into
// 5- or 6-bit codes when their alphabet allows, raw UTF-8 otherwise.
//
// # Modules
//
// - `encoding` — Encoding variants, wire tags and allowed-encoding sets
// - `alphabet` — Symbol <-> code tables and special-character validation
// - `bits`     — Fixed-width code packing with the strip flag
// - `selector` — Cheapest-capable encoding selection
// - `encoder`  — `MetaStringEncoder`
// - `decoder`  — `MetaStringDecoder`
// - `string`   — The immutable `MetaString` record
// - `wire`     — Reference framing (tag, specials, length-prefixed payload)
// - `error`    — `MetaStringError`

pub mod alphabet;
pub mod bits;
pub mod decoder;
pub mod encoder;
pub mod encoding;
pub mod error;
pub mod selector;
pub mod string;
pub mod wire;

/// Inputs must be shorter than this many bytes.
pub const MAX_INPUT_LEN: usize = i16::MAX as usize;

// Re-export key types for convenience.
pub use alphabet::SpecialChars;
pub use decoder::{MetaStringDecoder, decode};
pub use encoder::{MetaStringEncoder, encode};
pub use encoding::{Encoding, EncodingSet};
pub use error::{MetaStringError, Result};
pub use string::MetaString;
pub use wire::{read_meta_string, write_meta_string};
