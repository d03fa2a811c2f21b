//! Directory scanner module.
//!
//! Lists supported media files in the root of a directory. Subdirectories
//! are never descended into: a season directory holds its episodes flat.

use crate::models::media::MediaFile;
use crate::Result;
use std::path::Path;
use walkdir::WalkDir;

/// Supported media file extensions.
const MEDIA_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "m4v", "wmv"];

/// Check if a file extension is a supported media format.
fn is_media_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    MEDIA_EXTENSIONS.contains(&ext_lower.as_str())
}

/// List supported media files in the root of `directory`.
///
/// Files are returned sorted by filename so every downstream stage sees the
/// same order. Fails with `DirectoryNotFound` if the directory does not
/// exist and `NoSupportedFiles` if nothing matches the extension allow-list.
pub fn list_media_files(directory: &Path) -> Result<Vec<MediaFile>> {
    if !directory.is_dir() {
        return Err(crate::Error::DirectoryNotFound(
            directory.display().to_string(),
        ));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !is_media_extension(ext) {
            continue;
        }

        if let Some(file) = MediaFile::from_path(path) {
            files.push(file);
        }
    }

    if files.is_empty() {
        return Err(crate::Error::NoSupportedFiles(
            directory.display().to_string(),
        ));
    }

    files.sort_by(|a, b| a.filename.cmp(&b.filename));

    tracing::info!(
        "Found {} media files in {}",
        files.len(),
        directory.display()
    );

    Ok(files)
}
