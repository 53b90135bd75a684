//! Inbound attachments and their classification.
//!
//! An attachment lives only for the duration of one upload-processing
//! operation. Raw bytes never reach persistent storage, which the serde
//! derives enforce by skipping them.

use serde::{Deserialize, Serialize};

use crate::error::FileError;

/// Hard ceiling on attachment size: 100 MiB.
pub const MAX_ATTACHMENT_BYTES: u64 = 100 * 1024 * 1024;

/// Archive extensions, refused with a pointer at the supported text formats.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z"];

/// Image extensions, refused because there is no vision pipeline.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];

/// Executable extensions, refused outright.
pub const DANGEROUS_EXTENSIONS: &[&str] = &["exe", "bat", "cmd", "sh", "bin", "dll"];

/// Filename substrings that mark a file as sensitive, refused outright.
pub const DANGEROUS_PATTERNS: &[&str] = &[".htaccess", ".env", "config", "password", "secret"];

/// A file uploaded through the chat platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// Name as supplied by the uploader
    pub filename: String,

    /// Size reported by the platform, checked before the bytes are touched
    pub size_bytes: u64,

    /// Raw payload; transient, never serialized
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// An attachment whose declared size matches the payload it carries.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            size_bytes: bytes.len() as u64,
            bytes,
        }
    }

    /// An attachment with a platform-declared size. The payload may be
    /// empty when the platform reports size before the bytes are fetched.
    pub fn with_declared_size(
        filename: impl Into<String>,
        size_bytes: u64,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            size_bytes,
            bytes,
        }
    }

    /// Lowercased extension without the dot, if the filename has one.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    /// Name for the rewritten copy of this file: `report.py` becomes
    /// `report_FIXED.py`.
    pub fn fixed_filename(&self) -> String {
        match self.filename.rfind('.') {
            Some(idx) if idx > 0 => {
                format!("{}_FIXED{}", &self.filename[..idx], &self.filename[idx..])
            }
            _ => format!("{}_FIXED", self.filename),
        }
    }

    /// Classify this attachment. Checks run in a fixed order: size
    /// ceiling, then archive extension, then image extension, then the
    /// filename safety rules. The first match decides the verdict.
    pub fn classify(&self) -> FileVerdict {
        if self.size_bytes > MAX_ATTACHMENT_BYTES {
            return FileVerdict::Oversize;
        }
        let ext = self.extension().unwrap_or_default();
        if ARCHIVE_EXTENSIONS.contains(&ext.as_str()) {
            return FileVerdict::UnsupportedArchive;
        }
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            return FileVerdict::UnsupportedImage;
        }
        if DANGEROUS_EXTENSIONS.contains(&ext.as_str()) {
            return FileVerdict::DangerousFilename;
        }
        let lower = self.filename.to_ascii_lowercase();
        if DANGEROUS_PATTERNS.iter().any(|p| lower.contains(p)) {
            return FileVerdict::DangerousFilename;
        }
        FileVerdict::Processable
    }

    /// The rejection for a non-processable verdict, `None` when the file
    /// can go on to content processing.
    pub fn rejection(&self) -> Option<FileError> {
        match self.classify() {
            FileVerdict::Processable => None,
            FileVerdict::Oversize => Some(FileError::Oversize {
                size_bytes: self.size_bytes,
                limit_bytes: MAX_ATTACHMENT_BYTES,
            }),
            FileVerdict::UnsupportedArchive => Some(FileError::UnsupportedArchive {
                filename: self.filename.clone(),
            }),
            FileVerdict::UnsupportedImage => Some(FileError::UnsupportedImage {
                filename: self.filename.clone(),
            }),
            FileVerdict::DangerousFilename => Some(FileError::DangerousFilename {
                filename: self.filename.clone(),
            }),
        }
    }
}

/// The outcome of classifying an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileVerdict {
    /// Text file within limits, safe to decode and analyze
    Processable,
    /// Over the size ceiling
    Oversize,
    /// Archive format we do not unpack
    UnsupportedArchive,
    /// Image format we do not inspect
    UnsupportedImage,
    /// Executable extension or sensitive name pattern
    DangerousFilename,
}

/// Render a byte count for humans: `1.5 MB`, `640.0 KB`, `12 B`.
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.1} GB", b / GB)
    } else if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}
