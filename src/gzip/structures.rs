use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use bitflags::bitflags;
use thiserror::Error;

/// gzip magic bytes (RFC 1952): ID1, ID2
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Fixed portion of the member header - 10 bytes
pub const FIXED_HEADER_SIZE: usize = 10;

/// Member trailer - 8 bytes (CRC32 + ISIZE)
pub const TRAILER_SIZE: usize = 8;

/// Longest original-filename field accepted before forced truncation
pub const FILE_NAME_CAP: usize = 128;

/// Longest comment field accepted before forced truncation
pub const COMMENT_CAP: usize = 8192;

/// OS byte value for Unix-like systems
pub const OS_UNIX: u8 = 3;

bitflags! {
    /// The FLG byte of the member header.
    ///
    /// Each bit enables one optional sub-field after the fixed region.
    /// Bits 5-7 are reserved; [`from_bits_truncate`](GzipFlags::from_bits_truncate)
    /// drops them instead of rejecting the header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GzipFlags: u8 {
        /// Content is probably ASCII text (hint only)
        const FTEXT = 1 << 0;
        /// CRC16 of the header bytes follows the optional fields
        const FHCRC = 1 << 1;
        /// Length-prefixed extra field is present
        const FEXTRA = 1 << 2;
        /// Null-terminated original file name is present
        const FNAME = 1 << 3;
        /// Null-terminated comment is present
        const FCOMMENT = 1 << 4;
    }
}

/// gzip compression methods
///
/// The format defines a single method (DEFLATE, 8); anything else is
/// carried through and reported, never treated as a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Deflate,
    Unknown(u8),
}

impl CompressionMethod {
    pub fn from_u8(value: u8) -> Self {
        match value {
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// Typed failures produced by the decoders.
///
/// Each variant names the field being decoded and how many bytes were
/// expected versus available, so diagnostics can point at the exact spot
/// where a stream went bad.
#[derive(Debug, Error)]
pub enum GzipError {
    /// ID1/ID2 did not match the gzip magic. Fatal: nothing after the
    /// first two bytes can be trusted.
    #[error("invalid gzip file: magic is 0x{id1:02x} 0x{id2:02x}, expected 0x1f 0x8b")]
    InvalidMagic { id1: u8, id2: u8 },

    /// The source ran out before the current field was fully read.
    #[error("truncated stream while reading {field}: expected {expected} bytes, got {got}")]
    TruncatedStream {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    /// The source is too short to hold a trailer at all.
    #[error("cannot position at the trailer: source is only {size} bytes long")]
    SeekError { size: u64 },

    /// The underlying byte source failed.
    #[error("read error while reading {field}: {cause}")]
    Read {
        field: &'static str,
        cause: anyhow::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fixed-size portion of the gzip member header.
///
/// The two magic bytes are validated during parsing and not kept.
/// `extra_len` is only populated when [`GzipFlags::FEXTRA`] is set; it is
/// the length prefix of the extra field, read as part of the header region.
#[derive(Debug, Clone)]
pub struct GzipHeader {
    pub method: CompressionMethod,
    pub flags: GzipFlags,
    /// Seconds since the Unix epoch; zero means "not set"
    pub mtime: u32,
    /// Compressor-specific extra flags (XFL), opaque at this layer
    pub extra_flags: u8,
    /// Originating operating system (OS byte)
    pub os: u8,
    pub extra_len: Option<u16>,
}

impl GzipHeader {
    /// Parse the fixed 10-byte header region.
    ///
    /// The magic bytes are checked before anything else, so a wrong-magic
    /// stream is rejected as [`GzipError::InvalidMagic`] even when fewer
    /// than 10 bytes were available.
    pub fn from_bytes(data: &[u8]) -> Result<Self, GzipError> {
        if data.len() >= 2 && data[..2] != GZIP_MAGIC {
            return Err(GzipError::InvalidMagic {
                id1: data[0],
                id2: data[1],
            });
        }
        if data.len() < FIXED_HEADER_SIZE {
            return Err(GzipError::TruncatedStream {
                field: "fixed header",
                expected: FIXED_HEADER_SIZE,
                got: data.len(),
            });
        }

        let mut cursor = Cursor::new(&data[2..]);
        let method = CompressionMethod::from_u8(cursor.read_u8()?);
        let flags = GzipFlags::from_bits_truncate(cursor.read_u8()?);
        let mtime = cursor.read_u32::<LittleEndian>()?;
        let extra_flags = cursor.read_u8()?;
        let os = cursor.read_u8()?;

        Ok(Self {
            method,
            flags,
            mtime,
            extra_flags,
            os,
            extra_len: None,
        })
    }

    /// Whether the OS byte denotes a Unix-like system.
    ///
    /// All other values are rendered generically; there is no full OS table.
    pub fn is_unix(&self) -> bool {
        self.os == OS_UNIX
    }
}

/// Optional header sub-fields, populated per active flag bit.
///
/// The on-stream order is fixed: extra field, file name, comment, header
/// CRC. A field is `None` exactly when its flag bit was unset.
#[derive(Debug, Clone, Default)]
pub struct OptionalFields {
    /// Raw extra-field bytes; sub-sub-fields are not interpreted
    pub extra: Option<Vec<u8>>,
    pub file_name: Option<String>,
    pub comment: Option<String>,
    /// CRC16 of the header bytes; reported, never verified
    pub header_crc: Option<u16>,
}

impl OptionalFields {
    pub fn is_empty(&self) -> bool {
        self.extra.is_none()
            && self.file_name.is_none()
            && self.comment.is_none()
            && self.header_crc.is_none()
    }
}

/// Member trailer - the final 8 bytes of the stream
#[derive(Debug, Clone, Copy)]
pub struct GzipTrailer {
    /// CRC32 of the uncompressed data; reported, never verified
    pub crc32: u32,
    /// Uncompressed size modulo 2^32 (ISIZE)
    pub uncompressed_size: u32,
}

impl GzipTrailer {
    pub fn from_bytes(data: &[u8]) -> Result<Self, GzipError> {
        if data.len() < TRAILER_SIZE {
            return Err(GzipError::TruncatedStream {
                field: "trailer",
                expected: TRAILER_SIZE,
                got: data.len(),
            });
        }

        let mut cursor = Cursor::new(data);

        Ok(Self {
            crc32: cursor.read_u32::<LittleEndian>()?,
            uncompressed_size: cursor.read_u32::<LittleEndian>()?,
        })
    }
}
