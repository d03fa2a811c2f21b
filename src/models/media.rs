//! On-disk media file state.

use crate::models::metadata::EpisodeMetadata;
use std::path::{Path, PathBuf};

/// Terminal status of a rename attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// No rename attempted yet.
    Unset,
    /// Rename succeeded.
    Ok,
    /// Rename failed with the captured error message.
    Error(String),
}

/// A media file discovered during the directory scan.
///
/// Mutated in place as the pipeline advances: the parser fills in the
/// episode number, the reconciler the resolved filename and metadata, the
/// rename executor the status.
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Directory the file lives in.
    pub directory: PathBuf,
    /// Original filename including extension.
    pub filename: String,
    /// Extension, lower-cased, with leading dot (e.g. ".mkv").
    pub extension: String,
    /// Episode number inferred from the filename.
    pub episode: Option<u32>,
    /// Resolved new filename including extension.
    pub new_filename: Option<String>,
    /// Resolved new filename without extension.
    pub naked_filename: Option<String>,
    /// Rename outcome.
    pub status: FileStatus,
    /// Episode metadata attached once the file is matched.
    pub metadata: Option<EpisodeMetadata>,
}

impl MediaFile {
    /// Build a MediaFile from a path, or None if the path has no filename
    /// or no extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let filename = path.file_name()?.to_str()?.to_string();
        let extension = format!(".{}", path.extension()?.to_str()?.to_lowercase());
        let directory = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();

        Some(Self {
            directory,
            filename,
            extension,
            episode: None,
            new_filename: None,
            naked_filename: None,
            status: FileStatus::Unset,
            metadata: None,
        })
    }

    /// Current absolute path of the file.
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }

    /// Target path once a new filename has been resolved.
    pub fn new_path(&self) -> Option<PathBuf> {
        self.new_filename.as_ref().map(|name| self.directory.join(name))
    }

    /// Sidecar path, `<naked_filename>.nfo`.
    pub fn nfo_path(&self) -> Option<PathBuf> {
        self.naked_filename
            .as_ref()
            .map(|naked| self.directory.join(format!("{naked}.nfo")))
    }

    /// Thumbnail path, `<naked_filename>-thumb.jpg`.
    pub fn thumb_path(&self) -> Option<PathBuf> {
        self.naked_filename
            .as_ref()
            .map(|naked| self.directory.join(format!("{naked}-thumb.jpg")))
    }

    /// Whether the file was matched to an episode metadata record.
    pub fn is_matched(&self) -> bool {
        self.metadata.is_some()
    }
}
