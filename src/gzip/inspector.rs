use std::sync::Arc;

use crate::io::ReadAt;

use super::parser::GzipParser;
use super::structures::{GzipError, GzipHeader, GzipTrailer, OptionalFields};

/// Everything a single inspection run produces.
#[derive(Debug, Clone)]
pub struct GzipReport {
    pub header: GzipHeader,
    pub fields: OptionalFields,
    pub trailer: GzipTrailer,
}

/// High-level gzip inspection API.
///
/// Wraps a [`GzipParser`] and sequences its decoders: the header must
/// decode before the optional fields, and any failure aborts the run
/// rather than attempting partial recovery. The trailer does not depend
/// on the header, so callers that only care about the CRC32/ISIZE pair
/// can go straight to [`read_trailer`](Self::read_trailer).
pub struct GzipInspector<R: ReadAt> {
    parser: GzipParser<R>,
}

impl<R: ReadAt> GzipInspector<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: GzipParser::new(reader),
        }
    }

    /// Inspect the whole member: header, optional fields, trailer.
    pub async fn inspect(&self) -> Result<GzipReport, GzipError> {
        let (header, fields) = self.inspect_header().await?;
        let trailer = self.parser.read_trailer().await?;

        Ok(GzipReport {
            header,
            fields,
            trailer,
        })
    }

    /// Inspect only the header and its optional fields.
    pub async fn inspect_header(&self) -> Result<(GzipHeader, OptionalFields), GzipError> {
        let (header, offset) = self.parser.read_header().await?;
        let (fields, _payload_offset) = self.parser.read_optional_fields(&header, offset).await?;
        Ok((header, fields))
    }

    /// Inspect only the trailer.
    pub async fn read_trailer(&self) -> Result<GzipTrailer, GzipError> {
        self.parser.read_trailer().await
    }
}
