//! gzip member header and trailer inspection.
//!
//! This module provides functionality for decoding the metadata of a gzip
//! stream (RFC 1952) without decompressing it.
//!
//! ## Architecture
//!
//! The module is organized into three main components:
//!
//! - [`structures`]: Data structures representing gzip format elements (header, flags, trailer, etc.)
//! - [`parser`]: Low-level parsing of gzip structures from raw bytes
//! - [`inspector`]: High-level inspection API for end users
//!
//! ## gzip Format Overview
//!
//! A gzip member consists of:
//! 1. A fixed 10-byte header: magic bytes, compression method, flag byte,
//!    modification time, extra flags, OS byte
//! 2. Optional sub-fields gated by the flag byte, in fixed order:
//!    extra field, original file name, comment, header CRC16
//! 3. The DEFLATE-compressed payload
//! 4. An 8-byte trailer: CRC32 of the uncompressed data, then the
//!    uncompressed size modulo 2^32
//!
//! This implementation decodes regions 1, 2 and 4 and skips the payload
//! entirely, which allows inspecting a remote file with two small HTTP
//! Range requests.
//!
//! ## Limitations
//!
//! - Only the first member of a concatenated stream is inspected
//! - The header CRC16 and trailer CRC32 are reported, not verified
//!   (verification would require decompressing the payload)
//! - No encoding support

mod inspector;
mod parser;
mod structures;

pub use inspector::{GzipInspector, GzipReport};
pub use parser::GzipParser;
pub use structures::*;
