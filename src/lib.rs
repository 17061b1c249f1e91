//! Metastring: compact encoding of identifier-like names.
//!
//! Field, type and namespace names dominate the metadata of many
//! serialization formats. This crate packs them into 5-bit codes
//! (`a-z` plus two special characters), 6-bit codes (`a-z`, `A-Z`, `0-9`
//! plus two specials) or, failing both, plain UTF-8, picking the cheapest
//! encoding the name allows.
//!
//! The crate provides:
//! - The codec (`meta`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use metastring::meta::{Encoding, MetaStringEncoder, decode};
//!
//! let encoder = MetaStringEncoder::new('.', '_').unwrap();
//! let ms = encoder.encode("org.example.user_id").unwrap();
//! assert_eq!(ms.encoding(), Encoding::LowerSpecial);
//! assert!(ms.encoded_bytes().len() < "org.example.user_id".len());
//!
//! let text = decode(
//!     ms.encoding(),
//!     ms.special_char1(),
//!     ms.special_char2(),
//!     ms.encoded_bytes(),
//! )
//! .unwrap();
//! assert_eq!(text, "org.example.user_id");
//! ```

pub mod meta;

#[cfg(feature = "cli")]
pub mod cli;
