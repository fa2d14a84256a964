//! Named blob value object

use std::fmt;

/// MIME type fallback when a file name has no recognized extension
pub const DEFAULT_CONTENT_TYPE: &str = "audio/wav";

/// Audio MIME types recognized by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioMimeType {
    Wav,
    Mp3,
    Mpeg,
    Ogg,
    Flac,
    Mp4,
    Webm,
}

impl AudioMimeType {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mp3",
            Self::Mpeg => "audio/mpeg",
            Self::Ogg => "audio/ogg",
            Self::Flac => "audio/flac",
            Self::Mp4 => "audio/mp4",
            Self::Webm => "audio/webm",
        }
    }

    /// Infer a MIME type from a file name's extension
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.').map(|(_, e)| e)?;
        match ext.to_ascii_lowercase().as_str() {
            "wav" => Some(Self::Wav),
            "mp3" => Some(Self::Mp3),
            "mpeg" | "mpga" => Some(Self::Mpeg),
            "ogg" | "oga" => Some(Self::Ogg),
            "flac" => Some(Self::Flac),
            "mp4" | "m4a" => Some(Self::Mp4),
            "webm" => Some(Self::Webm),
            _ => None,
        }
    }
}

impl fmt::Display for AudioMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value object pairing a blob name with its content, ready for upload.
#[derive(Debug, Clone)]
pub struct NamedBlob {
    name: String,
    data: Vec<u8>,
}

impl NamedBlob {
    /// Create a NamedBlob from a name and raw bytes
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Blob name (used as the file name in the target directory)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw content bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume and return the raw content bytes
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Content type inferred from the name, defaulting to audio/wav
    pub fn content_type(&self) -> &'static str {
        AudioMimeType::from_file_name(&self.name)
            .map(|m| m.as_str())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}
