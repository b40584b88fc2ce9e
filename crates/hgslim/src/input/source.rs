//! Input sources with provenance tracking.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::bufread::MultiGzDecoder;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{HgError, Result};

/// Metadata about the consumed input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path (`-` for standard input).
    pub file: String,
    /// Full path to the file, if the input was a file.
    pub path: Option<PathBuf>,
    /// SHA-256 of the raw bytes read so far (before decompression).
    pub hash: String,
    /// Raw bytes read so far.
    pub size_bytes: u64,
    /// Whether the input was gzip-compressed.
    pub compressed: bool,
    /// When this metadata was captured.
    pub processed_at: DateTime<Utc>,
}

/// Reader adapter that hashes and counts every byte passing through it.
pub struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
    bytes_read: u64,
}

impl<R: Read> HashingReader<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            bytes_read: 0,
        }
    }
}

impl<R> HashingReader<R> {
    /// Bytes read so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Hex SHA-256 of the bytes read so far, prefixed with `sha256:`.
    pub fn digest(&self) -> String {
        format!("sha256:{:x}", self.hasher.clone().finalize())
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.bytes_read += n as u64;
        Ok(n)
    }
}

/// Raw bytes, hashed as they are pulled from the underlying source.
type Raw = BufReader<HashingReader<Box<dyn Read>>>;

/// First two bytes of every gzip member.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

enum Inner {
    Plain(Raw),
    Gzip(MultiGzDecoder<Raw>),
}

/// A HomoloGene input: a file, a gzipped file, or standard input.
///
/// Compression is detected from the leading bytes, not the file name, and
/// every member of a multi-member (concatenated or bgzip) file is read.
pub struct SourceReader {
    inner: Inner,
    path: Option<PathBuf>,
}

impl SourceReader {
    /// Open `path` for reading; `-` reads standard input.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path == Path::new("-") {
            return Self::from_reader(io::stdin());
        }

        let file = File::open(path).map_err(|e| HgError::io(path, e))?;
        let inner = Inner::sniff(Box::new(file)).map_err(|e| HgError::io(path, e))?;
        if matches!(inner, Inner::Gzip(_)) {
            tracing::debug!(path = %path.display(), "reading gzip-compressed input");
        }

        Ok(Self {
            inner,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wrap a reader without a backing path, decompressing gzip data.
    pub fn from_reader(reader: impl Read + 'static) -> Result<Self> {
        Ok(Self {
            inner: Inner::sniff(Box::new(reader))?,
            path: None,
        })
    }

    fn raw(&self) -> &HashingReader<Box<dyn Read>> {
        match &self.inner {
            Inner::Plain(raw) => raw.get_ref(),
            Inner::Gzip(decoder) => decoder.get_ref().get_ref(),
        }
    }

    /// Provenance of the bytes consumed so far.
    ///
    /// Once the input has been read to the end this describes the whole file.
    pub fn metadata(&self) -> SourceMetadata {
        let file = self
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "-".to_string());
        let raw = self.raw();

        SourceMetadata {
            file,
            path: self.path.clone(),
            hash: raw.digest(),
            size_bytes: raw.bytes_read(),
            compressed: matches!(self.inner, Inner::Gzip(_)),
            processed_at: Utc::now(),
        }
    }
}

impl Inner {
    /// Peek at the first buffered bytes and pick a decoder.
    fn sniff(reader: Box<dyn Read>) -> io::Result<Self> {
        let mut raw = BufReader::new(HashingReader::new(reader));
        let gzip = raw.fill_buf()?.starts_with(&GZIP_MAGIC);
        Ok(if gzip {
            Inner::Gzip(MultiGzDecoder::new(raw))
        } else {
            Inner::Plain(raw)
        })
    }
}

impl Read for SourceReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            Inner::Plain(raw) => raw.read(buf),
            Inner::Gzip(decoder) => decoder.read(buf),
        }
    }
}
