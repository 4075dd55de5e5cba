//! Low-level gzip member parser.
//!
//! This module handles the binary parsing of the gzip header and trailer,
//! reading from any source that implements the [`ReadAt`] trait.
//!
//! ## Parsing Strategy
//!
//! A gzip member has three regions of interest here:
//! 1. The fixed 10-byte header (magic, method, flags, mtime, XFL, OS),
//!    plus a 2-byte extra-length prefix when FEXTRA is set
//! 2. Zero or more optional sub-fields, gated by the flag byte and laid
//!    out in a fixed order: extra field, file name, comment, header CRC
//! 3. The 8-byte trailer (CRC32 + ISIZE) at the very end of the stream
//!
//! The compressed payload between regions 2 and 3 is never touched, so a
//! remote file can be inspected with two small Range requests.
//!
//! The read position is tracked as an explicit offset that only ever moves
//! forward by the number of bytes a field consumed. Nothing is over-read
//! and rewound, and the optional fields are consumed eagerly in stream
//! order because the name and comment carry no length prefix, only a null
//! terminator.

use std::sync::Arc;

use crate::io::ReadAt;

use super::structures::*;

/// Low-level gzip member parser.
///
/// Generic over the reader type to support both local files and HTTP
/// sources. The three decoders are independent: the header decoder starts
/// at offset 0, the optional-field decoder continues from wherever the
/// header ended, and the trailer decoder addresses the end of the stream
/// without looking at either.
///
/// ## Usage
///
/// Typically used through [`GzipInspector`](super::GzipInspector)
/// rather than directly.
pub struct GzipParser<R: ReadAt> {
    /// The underlying data source
    reader: Arc<R>,
    /// Total size of the source in bytes
    size: u64,
}

impl<R: ReadAt> GzipParser<R> {
    /// Create a new parser for the given reader.
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Read into `buf` at `offset`, tagging transport failures with the
    /// field being decoded.
    async fn read_field(
        &self,
        offset: u64,
        buf: &mut [u8],
        field: &'static str,
    ) -> Result<usize, GzipError> {
        self.reader
            .read_at(offset, buf)
            .await
            .map_err(|cause| GzipError::Read { field, cause })
    }

    /// Like [`read_field`](Self::read_field), but a short read is a
    /// truncated stream.
    async fn read_exact_field(
        &self,
        offset: u64,
        buf: &mut [u8],
        field: &'static str,
    ) -> Result<(), GzipError> {
        let got = self.read_field(offset, buf, field).await?;
        if got < buf.len() {
            return Err(GzipError::TruncatedStream {
                field,
                expected: buf.len(),
                got,
            });
        }
        Ok(())
    }

    /// Decode the fixed header region at the start of the stream.
    ///
    /// Reads the 10 fixed bytes, then the 2-byte extra-length prefix if
    /// and only if FEXTRA is set. The magic bytes are validated before
    /// anything else; an unrecognized compression method is carried in the
    /// header rather than failing the parse, since the byte layout does
    /// not depend on it.
    ///
    /// # Returns
    ///
    /// The decoded header and the offset of the first byte after the
    /// fixed region (10, or 12 when FEXTRA is set).
    pub async fn read_header(&self) -> Result<(GzipHeader, u64), GzipError> {
        let mut buf = [0u8; FIXED_HEADER_SIZE];
        let got = self.read_field(0, &mut buf, "fixed header").await?;
        let mut header = GzipHeader::from_bytes(&buf[..got])?;

        let mut offset = FIXED_HEADER_SIZE as u64;
        if header.flags.contains(GzipFlags::FEXTRA) {
            let mut len_buf = [0u8; 2];
            self.read_exact_field(offset, &mut len_buf, "extra length")
                .await?;
            header.extra_len = Some(u16::from_le_bytes(len_buf));
            offset += 2;
        }

        Ok((header, offset))
    }

    /// Decode the optional sub-fields gated by the header's flag byte.
    ///
    /// `offset` must be the position returned by
    /// [`read_header`](Self::read_header). Fields are consumed strictly in
    /// stream order, skipping any whose flag bit is unset; a header with no
    /// flags set consumes nothing.
    ///
    /// # Returns
    ///
    /// The decoded fields and the offset of the first payload byte.
    pub async fn read_optional_fields(
        &self,
        header: &GzipHeader,
        mut offset: u64,
    ) -> Result<(OptionalFields, u64), GzipError> {
        let mut fields = OptionalFields::default();

        if header.flags.contains(GzipFlags::FEXTRA) {
            let len = header.extra_len.unwrap_or(0) as usize;
            let mut extra = vec![0u8; len];
            self.read_exact_field(offset, &mut extra, "extra field")
                .await?;
            offset += len as u64;
            fields.extra = Some(extra);
        }

        if header.flags.contains(GzipFlags::FNAME) {
            let (name, consumed) = self
                .read_terminated(offset, FILE_NAME_CAP, "file name")
                .await?;
            offset += consumed;
            fields.file_name = Some(name);
        }

        if header.flags.contains(GzipFlags::FCOMMENT) {
            let (comment, consumed) = self
                .read_terminated(offset, COMMENT_CAP, "comment")
                .await?;
            offset += consumed;
            fields.comment = Some(comment);
        }

        if header.flags.contains(GzipFlags::FHCRC) {
            let mut buf = [0u8; 2];
            self.read_exact_field(offset, &mut buf, "header checksum")
                .await?;
            offset += 2;
            fields.header_crc = Some(u16::from_le_bytes(buf));
        }

        Ok((fields, offset))
    }

    /// Decode the 8-byte trailer at the end of the stream.
    ///
    /// Independent of the header decoders: the position is derived from
    /// the source length alone, and the values are reported without being
    /// checked against anything (verifying the CRC32 would require
    /// decompressing the payload).
    pub async fn read_trailer(&self) -> Result<GzipTrailer, GzipError> {
        if self.size < TRAILER_SIZE as u64 {
            return Err(GzipError::SeekError { size: self.size });
        }

        let offset = self.size - TRAILER_SIZE as u64;
        let mut buf = [0u8; TRAILER_SIZE];
        let got = self.read_field(offset, &mut buf, "trailer").await?;
        GzipTrailer::from_bytes(&buf[..got])
    }

    /// Read a null-terminated field without going past `cap` bytes.
    ///
    /// The terminator is consumed but not kept. When `cap` is reached
    /// before a terminator the field is cut at `cap - 1` bytes and exactly
    /// `cap` bytes are consumed, matching a fixed `cap`-sized buffer whose
    /// last byte is overwritten by a forced terminator. Truncation is a
    /// reporting policy, not an error; running out of stream is.
    async fn read_terminated(
        &self,
        offset: u64,
        cap: usize,
        field: &'static str,
    ) -> Result<(String, u64), GzipError> {
        let available = self.size.saturating_sub(offset);
        let window = (cap as u64).min(available) as usize;
        let mut buf = vec![0u8; window];
        let got = self.read_field(offset, &mut buf, field).await?;
        buf.truncate(got);

        if let Some(nul) = buf.iter().position(|&b| b == 0) {
            let text = String::from_utf8_lossy(&buf[..nul]).to_string();
            return Ok((text, nul as u64 + 1));
        }

        if buf.len() < cap {
            // The source ended before a terminator or the cap.
            return Err(GzipError::TruncatedStream {
                field,
                expected: buf.len() + 1,
                got: buf.len(),
            });
        }

        let text = String::from_utf8_lossy(&buf[..cap - 1]).to_string();
        Ok((text, cap as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    /// In-memory byte source for driving the parser in tests.
    struct SliceReader(Vec<u8>);

    #[async_trait]
    impl ReadAt for SliceReader {
        async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
            let start = (offset as usize).min(self.0.len());
            let n = buf.len().min(self.0.len() - start);
            buf[..n].copy_from_slice(&self.0[start..start + n]);
            Ok(n)
        }

        fn size(&self) -> u64 {
            self.0.len() as u64
        }
    }

    fn parser(bytes: Vec<u8>) -> GzipParser<SliceReader> {
        GzipParser::new(Arc::new(SliceReader(bytes)))
    }

    /// A valid fixed header region with the given flag byte.
    fn fixed_header(flags: u8) -> Vec<u8> {
        vec![0x1f, 0x8b, 0x08, flags, 0x78, 0x56, 0x34, 0x12, 0x00, 0x03]
    }

    #[tokio::test]
    async fn header_without_fextra_ends_at_ten() {
        let p = parser(fixed_header(0x00));
        let (header, offset) = p.read_header().await.unwrap();

        assert_eq!(offset, 10);
        assert!(header.flags.is_empty());
        assert_eq!(header.mtime, 0x1234_5678);
        assert_eq!(header.extra_len, None);
    }

    #[tokio::test]
    async fn header_with_fextra_reads_length_prefix() {
        let mut bytes = fixed_header(0x04);
        bytes.extend_from_slice(&[0x03, 0x00, 1, 2, 3]);
        let p = parser(bytes);

        let (header, offset) = p.read_header().await.unwrap();
        assert_eq!(offset, 12);
        assert_eq!(header.extra_len, Some(3));
    }

    #[tokio::test]
    async fn wrong_magic_aborts_the_parse() {
        let p = parser(vec![0x50, 0x4b, 0x03, 0x04, 0, 0, 0, 0, 0, 0]);
        match p.read_header().await {
            Err(GzipError::InvalidMagic { id1, id2 }) => {
                assert_eq!((id1, id2), (0x50, 0x4b));
            }
            other => panic!("expected InvalidMagic, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn no_flags_consume_no_optional_bytes() {
        let p = parser(fixed_header(0x00));
        let (header, offset) = p.read_header().await.unwrap();
        let (fields, end) = p.read_optional_fields(&header, offset).await.unwrap();

        assert!(fields.is_empty());
        assert_eq!(end, offset);
    }

    #[tokio::test]
    async fn extra_field_is_read_verbatim() {
        let mut bytes = fixed_header(0x04);
        bytes.extend_from_slice(&[0x03, 0x00, 0x01, 0x02, 0x03]);
        let p = parser(bytes);

        let (header, offset) = p.read_header().await.unwrap();
        let (fields, end) = p.read_optional_fields(&header, offset).await.unwrap();

        assert_eq!(fields.extra.as_deref(), Some(&[0x01, 0x02, 0x03][..]));
        assert_eq!(end, 15);
    }

    #[tokio::test]
    async fn truncated_extra_field_fails() {
        let mut bytes = fixed_header(0x04);
        bytes.extend_from_slice(&[0x05, 0x00, 0x01, 0x02]);
        let p = parser(bytes);

        let (header, offset) = p.read_header().await.unwrap();
        match p.read_optional_fields(&header, offset).await {
            Err(GzipError::TruncatedStream {
                field,
                expected,
                got,
            }) => {
                assert_eq!(field, "extra field");
                assert_eq!(expected, 5);
                assert_eq!(got, 2);
            }
            other => panic!("expected TruncatedStream, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn file_name_stops_at_terminator() {
        let mut bytes = fixed_header(0x08);
        bytes.extend_from_slice(b"a.txt\0");
        bytes.extend_from_slice(b"deflate payload");
        let p = parser(bytes);

        let (header, offset) = p.read_header().await.unwrap();
        let (fields, end) = p.read_optional_fields(&header, offset).await.unwrap();

        assert_eq!(fields.file_name.as_deref(), Some("a.txt"));
        // Five name bytes plus the terminator.
        assert_eq!(end, offset + 6);
    }

    #[tokio::test]
    async fn over_cap_name_is_truncated_not_overread() {
        let mut bytes = fixed_header(0x08);
        bytes.extend_from_slice(&[b'x'; 200]);
        let p = parser(bytes);

        let (header, offset) = p.read_header().await.unwrap();
        let (fields, end) = p.read_optional_fields(&header, offset).await.unwrap();

        let name = fields.file_name.unwrap();
        assert_eq!(name.len(), FILE_NAME_CAP - 1);
        assert!(name.bytes().all(|b| b == b'x'));
        assert_eq!(end, offset + FILE_NAME_CAP as u64);
    }

    #[tokio::test]
    async fn unterminated_name_at_end_of_stream_fails() {
        let mut bytes = fixed_header(0x08);
        bytes.extend_from_slice(b"abc");
        let p = parser(bytes);

        let (header, offset) = p.read_header().await.unwrap();
        match p.read_optional_fields(&header, offset).await {
            Err(GzipError::TruncatedStream { field, got, .. }) => {
                assert_eq!(field, "file name");
                assert_eq!(got, 3);
            }
            other => panic!("expected TruncatedStream, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn all_optional_fields_in_stream_order() {
        // FEXTRA | FNAME | FCOMMENT | FHCRC
        let mut bytes = fixed_header(0x1e);
        bytes.extend_from_slice(&[0x02, 0x00, 0xaa, 0xbb]);
        bytes.extend_from_slice(b"data.tar\0");
        bytes.extend_from_slice(b"nightly backup\0");
        bytes.extend_from_slice(&[0x34, 0x12]);
        let p = parser(bytes);

        let (header, offset) = p.read_header().await.unwrap();
        let (fields, end) = p.read_optional_fields(&header, offset).await.unwrap();

        assert_eq!(fields.extra.as_deref(), Some(&[0xaa, 0xbb][..]));
        assert_eq!(fields.file_name.as_deref(), Some("data.tar"));
        assert_eq!(fields.comment.as_deref(), Some("nightly backup"));
        assert_eq!(fields.header_crc, Some(0x1234));
        assert_eq!(end, 12 + 2 + 9 + 15 + 2);
    }

    #[tokio::test]
    async fn trailer_is_the_final_eight_bytes() {
        // Header validity is irrelevant to the trailer decoder.
        let mut bytes = vec![0xde; 32];
        let len = bytes.len();
        bytes[len - 8..].copy_from_slice(&[0x78, 0x56, 0x34, 0x12, 0x40, 0xe2, 0x01, 0x00]);
        let p = parser(bytes);

        let trailer = p.read_trailer().await.unwrap();
        assert_eq!(trailer.crc32, 0x1234_5678);
        assert_eq!(trailer.uncompressed_size, 123_456);
    }

    #[tokio::test]
    async fn trailer_needs_at_least_eight_bytes() {
        let p = parser(vec![0u8; 7]);
        match p.read_trailer().await {
            Err(GzipError::SeekError { size }) => assert_eq!(size, 7),
            other => panic!("expected SeekError, got {:?}", other),
        }
    }
}
