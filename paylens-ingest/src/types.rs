use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),
}

/// A user-selected file waiting to be submitted for analysis.
///
/// The media type is the *declared* one (derived from the file name), which is
/// what the gate checks. Candidates are consumed on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadCandidate {
    pub file_name: String,
    pub media_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub path: Option<PathBuf>,
}

impl UploadCandidate {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
            path: None,
        }
    }

    /// Read a candidate from disk, declaring its media type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(IngestError::NotAFile(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        tracing::debug!(file = %file_name, size = bytes.len(), "loaded upload candidate");

        Ok(Self {
            media_type: declared_media_type(&file_name),
            file_name,
            bytes,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type.eq_ignore_ascii_case(PDF_MEDIA_TYPE)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Media type a browser would declare for this file name.
pub fn declared_media_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Terminals deliver a dropped file as pasted text. Strip the quoting and URI
/// decoration different terminals add so the result is a plain path.
pub fn normalize_dropped_path(raw: &str) -> PathBuf {
    let mut s = raw.trim();

    for quote in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            s = &s[1..s.len() - 1];
        }
    }

    if s.starts_with("file://") {
        match Url::parse(s).map(|u| u.to_file_path()) {
            Ok(Ok(path)) => return path,
            _ => tracing::debug!(raw = s, "dropped text is not a usable file URI"),
        }
    }

    PathBuf::from(unescape_shell(s))
}

/// Undo shell-style backslash escaping (`\ `, `\(`, `\'`) as macOS and most
/// Linux terminals insert it on drop.
fn unescape_shell(s: &str) -> String {
    if cfg!(windows) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}
