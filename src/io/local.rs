use super::ReadAt;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Local file reader with random access support
pub struct LocalFileReader {
    file: std::fs::File,
    size: u64,
}

impl LocalFileReader {
    pub fn new(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }
}

#[async_trait]
impl ReadAt for LocalFileReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            // pread may return fewer bytes than asked for; keep going until
            // the buffer is full or the file ends.
            let mut filled = 0;
            while filled < buf.len() {
                let n = self
                    .file
                    .read_at(&mut buf[filled..], offset + filled as u64)?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            Ok(filled)
        }

        #[cfg(not(unix))]
        {
            use std::io::{Read, Seek, SeekFrom};
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))?;
            let mut filled = 0;
            while filled < buf.len() {
                let n = file.read(&mut buf[filled..])?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            Ok(filled)
        }
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn reads_at_an_offset() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"hello gzip world").unwrap();

        let reader = LocalFileReader::new(tmp.path()).unwrap();
        assert_eq!(reader.size(), 16);

        let mut buf = [0u8; 4];
        let n = reader.read_at(6, &mut buf).await.unwrap();
        assert_eq!(n, 4);
        assert_eq!(&buf, b"gzip");
    }

    #[tokio::test]
    async fn short_read_at_end_of_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"abcd").unwrap();

        let reader = LocalFileReader::new(tmp.path()).unwrap();
        let mut buf = [0u8; 8];
        let n = reader.read_at(2, &mut buf).await.unwrap();
        assert_eq!(n, 2);
        assert_eq!(&buf[..2], b"cd");
    }
}
