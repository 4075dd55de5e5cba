//! # rgzinfo
//!
//! A gzip header and trailer inspector with HTTP URL support using Range requests.
//!
//! This library decodes the metadata of a gzip stream (RFC 1952) without
//! decompressing it: the fixed member header, the flag-gated optional fields
//! (extra data, original file name, comment, header CRC16), and the 8-byte
//! trailer holding the payload CRC32 and the uncompressed size modulo 2^32.
//! Because the compressed payload is never read, a remote file can be
//! inspected with two small HTTP Range requests regardless of its size.
//!
//! ## Features
//!
//! - Inspect gzip files on the local filesystem
//! - Inspect gzip files behind HTTP/HTTPS URLs using Range requests
//! - Typed parse failures that name the field and the missing byte counts
//! - No decompression: the DEFLATE payload is skipped entirely
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use rgzinfo::{GzipInspector, HttpRangeReader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Inspect a remote gzip file without downloading its payload
//!     let reader = Arc::new(HttpRangeReader::new("https://example.com/big.gz".to_string()).await?);
//!
//!     let inspector = GzipInspector::new(reader);
//!     let report = inspector.inspect().await?;
//!
//!     if let Some(name) = &report.fields.file_name {
//!         println!("original file name: {}", name);
//!     }
//!     println!("stored CRC32: 0x{:08x}", report.trailer.crc32);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod gzip;
pub mod io;

pub use cli::Cli;
pub use gzip::{
    CompressionMethod, GzipError, GzipFlags, GzipHeader, GzipInspector, GzipParser, GzipReport,
    GzipTrailer, OptionalFields,
};
pub use io::{HttpRangeReader, LocalFileReader, ReadAt};
