//! Input sources: raw or gzip-compressed document bytes

use std::borrow::Cow;
use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::{Error, ErrorKind, Result, Span};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Input source abstraction
#[derive(Clone, Debug)]
pub struct Input<'a> {
    source: &'a [u8],
    filename: Option<&'a str>,
}

impl<'a> Input<'a> {
    /// Create from byte slice
    pub const fn from_bytes(source: &'a [u8]) -> Self {
        Self {
            source,
            filename: None,
        }
    }

    /// Set filename for error reporting
    pub const fn with_filename(mut self, filename: &'a str) -> Self {
        self.filename = Some(filename);
        self
    }

    pub const fn as_bytes(&self) -> &[u8] {
        self.source
    }

    pub const fn filename(&self) -> Option<&str> {
        self.filename
    }

    /// Whether the source is a gzip stream
    pub fn is_gzip(&self) -> bool {
        self.source.starts_with(&GZIP_MAGIC)
    }

    /// Source bytes, gunzipped when they carry the gzip magic
    pub fn decompressed(&self) -> Result<Cow<'a, [u8]>> {
        if !self.is_gzip() {
            return Ok(Cow::Borrowed(self.source));
        }

        let mut decoder = GzDecoder::new(self.source);
        let mut buffer = Vec::new();
        decoder.read_to_end(&mut buffer).map_err(|e| {
            Error::with_message(
                ErrorKind::Decompress,
                Span::empty(),
                format!("failed to decompress {}: {e}", self.display_name()),
            )
        })?;
        tracing::debug!(
            source = self.display_name(),
            compressed = self.source.len(),
            decompressed = buffer.len(),
            "gunzipped input"
        );
        Ok(Cow::Owned(buffer))
    }

    fn display_name(&self) -> &str {
        self.filename.unwrap_or("<input>")
    }
}

impl<'a> From<&'a [u8]> for Input<'a> {
    fn from(b: &'a [u8]) -> Self {
        Self::from_bytes(b)
    }
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(s: &'a str) -> Self {
        Self::from_bytes(s.as_bytes())
    }
}
