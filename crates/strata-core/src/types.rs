//! Core domain types for Strata.

use serde::{Deserialize, Serialize};

/// Extensions transcribed as audio. Every other media extension is video.
pub const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "au", "dts", "m4a", "mp2", "ogg", "opus", "spx", "wma", "aiff", "ac3",
    "aac", "aif", "caf", "eac3", "pcm",
];

/// Extensions transcribed as video.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "flv", "avi", "mov", "mkv"];

/// Extensions handled by optical character recognition.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "tiff", "tif", "bmp", "gif", "pbm", "pgm", "ppm",
];

/// Source code extensions read verbatim.
pub const CODE_EXTENSIONS: &[&str] = &["py", "java", "cpp", "js", "html"];

/// Office document extensions. `doc` goes through format conversion first.
pub const OFFICE_EXTENSIONS: &[&str] = &["docx", "doc"];

/// Legacy binary office formats that need conversion before parsing.
pub const LEGACY_OFFICE_EXTENSIONS: &[&str] = &["doc"];

/// Type recorded in a structured text record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Audio,
    Video,
    Pdf,
    Docx,
    Code,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Audio => "audio",
            FileType::Video => "video",
            FileType::Pdf => "pdf",
            FileType::Docx => "docx",
            FileType::Code => "code",
        }
    }

    /// Audio or video, decided by the audio extension set.
    pub fn for_media(ext: &str) -> Self {
        if has_extension(AUDIO_EXTENSIONS, ext) {
            FileType::Audio
        } else {
            FileType::Video
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extraction strategy selected for a pending file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ImageOcr,
    Transcription,
    Pdf,
    OfficeDocument,
    PlainCode,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::ImageOcr,
        Strategy::Transcription,
        Strategy::Pdf,
        Strategy::OfficeDocument,
        Strategy::PlainCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::ImageOcr => "image_ocr",
            Strategy::Transcription => "transcription",
            Strategy::Pdf => "pdf",
            Strategy::OfficeDocument => "office_document",
            Strategy::PlainCode => "plain_code",
        }
    }

    /// Extensions routed to this strategy.
    pub fn extensions(&self) -> Vec<&'static str> {
        match self {
            Strategy::ImageOcr => IMAGE_EXTENSIONS.to_vec(),
            Strategy::Transcription => AUDIO_EXTENSIONS
                .iter()
                .chain(VIDEO_EXTENSIONS)
                .copied()
                .collect(),
            Strategy::Pdf => vec!["pdf"],
            Strategy::OfficeDocument => OFFICE_EXTENSIONS.to_vec(),
            Strategy::PlainCode => CODE_EXTENSIONS.to_vec(),
        }
    }

    /// Detect the strategy from a file extension (with or without the dot).
    ///
    /// `None` means the file is a pass-through: it is relocated without a record.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.');
        if has_extension(IMAGE_EXTENSIONS, ext) {
            Some(Strategy::ImageOcr)
        } else if has_extension(AUDIO_EXTENSIONS, ext) || has_extension(VIDEO_EXTENSIONS, ext) {
            Some(Strategy::Transcription)
        } else if ext.eq_ignore_ascii_case("pdf") {
            Some(Strategy::Pdf)
        } else if has_extension(OFFICE_EXTENSIONS, ext) {
            Some(Strategy::OfficeDocument)
        } else if has_extension(CODE_EXTENSIONS, ext) {
            Some(Strategy::PlainCode)
        } else {
            None
        }
    }

    /// Classify a path by its extension.
    pub fn for_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Case-insensitive membership test against an extension table.
pub fn has_extension(table: &[&str], ext: &str) -> bool {
    let ext = ext.trim_start_matches('.');
    table.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

/// The fixed kind subfolders present under every staging root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Audio,
    Code,
    Images,
    Text,
    Video,
}

impl Kind {
    /// Discovery order.
    pub const ALL: [Kind; 5] = [Kind::Audio, Kind::Code, Kind::Images, Kind::Text, Kind::Video];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Audio => "audio",
            Kind::Code => "code",
            Kind::Images => "images",
            Kind::Text => "text",
            Kind::Video => "video",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Text extracted from one source file, persisted as a JSON artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    /// Base name of the original file.
    pub file_name: String,
    pub file_type: FileType,
    pub content: String,
}

impl TextRecord {
    /// Build a record, or `None` when there is no text worth persisting.
    ///
    /// Whitespace-only content counts as empty; non-empty content is kept verbatim.
    pub fn new(
        file_name: impl Into<String>,
        file_type: FileType,
        content: impl Into<String>,
    ) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return None;
        }
        Self::verbatim(file_name, file_type, content)
    }

    /// Build a record for text read as-is, `None` only when the content is empty.
    pub fn verbatim(
        file_name: impl Into<String>,
        file_type: FileType,
        content: impl Into<String>,
    ) -> Option<Self> {
        let content = content.into();
        if content.is_empty() {
            return None;
        }
        Some(Self {
            file_name: file_name.into(),
            file_type,
            content,
        })
    }
}

/// Outcome of one extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Text was found.
    Found(TextRecord),
    /// The file was read successfully but contained no text.
    NotFound,
    /// The engine failed, the input was corrupt, or the attempt timed out.
    Failed(String),
}

impl Extraction {
    /// Wrap extracted content, mapping empty text to `NotFound`.
    pub fn from_content(file_name: impl Into<String>, file_type: FileType, content: String) -> Self {
        match TextRecord::new(file_name, file_type, content) {
            Some(record) => Extraction::Found(record),
            None => Extraction::NotFound,
        }
    }

    /// Like [`Extraction::from_content`], but only an empty string is `NotFound`.
    pub fn from_verbatim(file_name: impl Into<String>, file_type: FileType, content: String) -> Self {
        match TextRecord::verbatim(file_name, file_type, content) {
            Some(record) => Extraction::Found(record),
            None => Extraction::NotFound,
        }
    }

    pub fn record(&self) -> Option<&TextRecord> {
        match self {
            Extraction::Found(record) => Some(record),
            _ => None,
        }
    }
}
