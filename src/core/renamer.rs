//! Rename executor module.
//!
//! Performs the filesystem renames for a batch of matched files. Each
//! attempt is independent: a failure is recorded on the file and the batch
//! continues. There is no rollback of files already renamed.

use crate::models::media::{FileStatus, MediaFile};
use std::fs;

/// Rename every file that has a resolved new filename.
///
/// Files without a new filename are left untouched with status `Unset`.
/// Returns the number of failed renames; per-file errors are captured in
/// each file's status.
pub fn rename_files(files: &mut [MediaFile]) -> usize {
    let mut failures = 0;

    for file in files.iter_mut() {
        let Some(new_path) = file.new_path() else {
            continue;
        };
        let old_path = file.path();

        if new_path == old_path {
            file.status = FileStatus::Ok;
            continue;
        }

        match fs::rename(&old_path, &new_path) {
            Ok(()) => {
                tracing::info!("Renamed {:?} -> {:?}", old_path, new_path);
                file.status = FileStatus::Ok;
            }
            Err(e) => {
                tracing::error!("Rename failed for {:?}: {}", old_path, e);
                file.status = FileStatus::Error(e.to_string());
                failures += 1;
            }
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn media_file(dir: &Path, name: &str, new_name: Option<&str>) -> MediaFile {
        let mut file = MediaFile::from_path(&dir.join(name)).unwrap();
        if let Some(new_name) = new_name {
            file.new_filename = Some(new_name.to_string());
            file.naked_filename = Some(new_name.trim_end_matches(".mkv").to_string());
        }
        file
    }

    #[test]
    fn test_rename_batch() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.mkv"), "x").unwrap();
        fs::write(temp_dir.path().join("b.mkv"), "x").unwrap();

        let mut files = vec![
            media_file(temp_dir.path(), "a.mkv", Some("Show.S01E01.Pilot.mkv")),
            media_file(temp_dir.path(), "b.mkv", Some("Show.S01E02.Second.mkv")),
        ];

        let failures = rename_files(&mut files);

        assert_eq!(failures, 0);
        assert!(files.iter().all(|f| f.status == FileStatus::Ok));
        assert!(temp_dir.path().join("Show.S01E01.Pilot.mkv").exists());
        assert!(temp_dir.path().join("Show.S01E02.Second.mkv").exists());
        assert!(!temp_dir.path().join("a.mkv").exists());
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.mkv"), "x").unwrap();
        fs::write(temp_dir.path().join("c.mkv"), "x").unwrap();

        let mut files = vec![
            media_file(temp_dir.path(), "a.mkv", Some("a-renamed.mkv")),
            // Source missing: this rename fails.
            media_file(temp_dir.path(), "b.mkv", Some("b-renamed.mkv")),
            media_file(temp_dir.path(), "c.mkv", Some("c-renamed.mkv")),
        ];

        let failures = rename_files(&mut files);

        assert_eq!(failures, 1);
        assert_eq!(files[0].status, FileStatus::Ok);
        assert!(matches!(files[1].status, FileStatus::Error(_)));
        assert_eq!(files[2].status, FileStatus::Ok);
        assert!(temp_dir.path().join("a-renamed.mkv").exists());
        assert!(temp_dir.path().join("c-renamed.mkv").exists());
    }

    #[test]
    fn test_unmatched_files_left_untouched() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.mkv"), "x").unwrap();

        let mut files = vec![media_file(temp_dir.path(), "a.mkv", None)];
        let failures = rename_files(&mut files);

        assert_eq!(failures, 0);
        assert_eq!(files[0].status, FileStatus::Unset);
        assert!(temp_dir.path().join("a.mkv").exists());
    }

    #[test]
    fn test_same_name_counts_as_ok() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.mkv"), "x").unwrap();

        let mut files = vec![media_file(temp_dir.path(), "a.mkv", Some("a.mkv"))];
        let failures = rename_files(&mut files);

        assert_eq!(failures, 0);
        assert_eq!(files[0].status, FileStatus::Ok);
    }
}
