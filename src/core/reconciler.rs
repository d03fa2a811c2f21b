//! Metadata reconciler — the orchestrating state machine.
//!
//! Drives a run from directory scan to written sidecars:
//! season resolution, per-file episode inference, remote metadata fetch,
//! validation, file/episode matching, rename, sidecar generation, and
//! thumbnail download. Every destructive step sits behind a confirmation
//! gate; declining any gate ends the run as `Aborted` without undoing the
//! stages already completed.

use crate::core::{composer, parser, renamer, scanner};
use crate::generators::nfo;
use crate::models::media::{FileStatus, MediaFile};
use crate::models::metadata::{Actor, SeasonMetadata};
use crate::services::probe::MediaProbe;
use crate::services::provider::MetadataProvider;
use crate::services::store::DubStore;
use crate::ui::{Panel, Ui};
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for one organize run.
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    /// Provider id of the show.
    pub show_id: i64,
    /// Directory holding the season's files.
    pub directory: PathBuf,
    /// Pin the season instead of inferring it from filenames.
    pub season: Option<u32>,
    /// Text appended to the series name in composed filenames.
    pub suffix: Option<String>,
    /// Generate sidecars only, skipping the rename stage.
    pub nfo_only: bool,
}

/// How a run ended when no fatal error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// All stages completed.
    Done,
    /// The user declined a confirmation gate.
    Aborted,
}

/// The organize pipeline. Collaborators are injected as trait objects so
/// the whole flow runs headless under test.
pub struct Reconciler<'a> {
    provider: &'a dyn MetadataProvider,
    store: Option<&'a dyn DubStore>,
    probe: &'a dyn MediaProbe,
    ui: &'a dyn Ui,
    opts: OrganizeOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        provider: &'a dyn MetadataProvider,
        store: Option<&'a dyn DubStore>,
        probe: &'a dyn MediaProbe,
        ui: &'a dyn Ui,
        opts: OrganizeOptions,
    ) -> Self {
        Self {
            provider,
            store,
            probe,
            ui,
            opts,
        }
    }

    /// Run the pipeline to completion, abort, or fatal error.
    pub async fn run(&self) -> Result<Outcome> {
        let mut files = scanner::list_media_files(&self.opts.directory)?;

        let season = self.resolve_season(&files)?;

        if !self.infer_episodes(&mut files) {
            return self.aborted();
        }

        let mut season_meta = self.provider.fetch_season(self.opts.show_id, season).await?;

        if !self.validate(&season_meta, season, files.len()) {
            return self.aborted();
        }

        if !self.match_files(&mut files, &season_meta, season) {
            return self.aborted();
        }

        if !self.opts.nfo_only {
            self.rename(&mut files);
        }

        if !self.ui.confirm("Generate sidecar metadata files?") {
            return self.aborted();
        }
        self.enrich_with_dub_cast(&mut season_meta, &mut files, season)
            .await?;
        self.write_sidecars(&files, &season_meta);

        if !self.ui.confirm("Download episode thumbnails?") {
            return self.aborted();
        }
        self.download_thumbnails(&files).await;

        self.ui.render(Panel::Notice, "All done.");
        Ok(Outcome::Done)
    }

    fn aborted(&self) -> Result<Outcome> {
        self.ui.render(Panel::Notice, "Aborting operation.");
        Ok(Outcome::Aborted)
    }

    /// Start → SeasonResolved. Fatal on mixed seasons or no inferable
    /// season.
    fn resolve_season(&self, files: &[MediaFile]) -> Result<u32> {
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        let season = parser::infer_season(&names, self.opts.season)?;

        match self.opts.season {
            Some(_) => self
                .ui
                .render(Panel::Info, &format!("Season pinned to {season}")),
            None => self
                .ui
                .render(Panel::Info, &format!("Inferred season: {season}")),
        }

        Ok(season)
    }

    /// Per-file episode inference. Files without an extractable number stay
    /// in the batch as warnings; the gate only opens when at least one file
    /// failed.
    fn infer_episodes(&self, files: &mut [MediaFile]) -> bool {
        let mut unparsed = Vec::new();

        for file in files.iter_mut() {
            match parser::extract_episode_number(&file.filename) {
                Ok(number) => file.episode = Some(number),
                Err(e) => {
                    tracing::warn!("{e}");
                    unparsed.push(file.filename.clone());
                }
            }
        }

        if unparsed.is_empty() {
            return true;
        }

        self.ui.render(
            Panel::Warning,
            &format!(
                "Could not extract an episode number from {} of {} files:\n  {}",
                unparsed.len(),
                files.len(),
                unparsed.join("\n  ")
            ),
        );
        self.ui.confirm("Continue and skip these files?")
    }

    /// MetadataFetched → Validated. Both checks warn rather than fail;
    /// confirmation is always required before anything mutates, warnings or
    /// not.
    fn validate(&self, season_meta: &SeasonMetadata, season: u32, file_count: usize) -> bool {
        self.ui.render(
            Panel::Info,
            &format!(
                "{} - {} (season {}, {} episodes)",
                season_meta.series_name,
                season_meta.season_name,
                season_meta.season_number,
                season_meta.episode_count
            ),
        );

        let mut warnings = Vec::new();

        if season_meta.episode_count as usize != file_count {
            warnings.push(format!(
                "Remote metadata reports {} episodes but the directory holds {} files",
                season_meta.episode_count, file_count
            ));
        }
        if season_meta.season_number != season {
            warnings.push(format!(
                "Remote season number {} does not match the resolved season {}",
                season_meta.season_number, season
            ));
        }

        if warnings.is_empty() {
            return self.ui.confirm("Metadata is consistent. Proceed?");
        }

        for warning in &warnings {
            self.ui.render(Panel::Warning, warning);
        }
        self.ui.confirm("Proceed despite the warnings above?")
    }

    /// Validated → FilesMatched. Attaches episode metadata and the composed
    /// filename to every file whose episode number has a remote record.
    fn match_files(
        &self,
        files: &mut [MediaFile],
        season_meta: &SeasonMetadata,
        season: u32,
    ) -> bool {
        for file in files.iter_mut() {
            let Some(number) = file.episode else {
                continue;
            };
            let Some(episode) = season_meta.episode(number) else {
                self.ui.render(
                    Panel::Warning,
                    &format!(
                        "No metadata found for episode {number} in {}",
                        file.filename
                    ),
                );
                continue;
            };

            if self.opts.nfo_only {
                // Sidecar-only runs keep the on-disk name.
                file.naked_filename = Some(file_stem(&file.filename));
                file.new_filename = Some(file.filename.clone());
            } else {
                let (full, naked) = composer::compose_episode_filename(
                    &season_meta.series_name,
                    self.opts.suffix.as_deref(),
                    season,
                    number,
                    &episode.name,
                    &file.extension,
                );
                file.new_filename = Some(full);
                file.naked_filename = Some(naked);
            }
            file.metadata = Some(episode.clone());
        }

        if self.opts.nfo_only {
            return true;
        }

        self.ui.render(Panel::Table, &rename_table(files));
        self.ui.confirm("Apply these renames?")
    }

    /// FilesMatched → Renamed. Per-file failures are isolated and the
    /// aggregate count surfaced.
    fn rename(&self, files: &mut [MediaFile]) {
        let failures = renamer::rename_files(files);

        self.ui.render(Panel::Table, &rename_table(files));
        if failures > 0 {
            self.ui
                .render(Panel::Warning, &format!("{failures} rename(s) failed"));
        } else {
            self.ui.render(Panel::Notice, "Renaming complete.");
        }
    }

    /// Prepend local dub actors to the season and every matched episode.
    /// A show/season with no local record proceeds silently.
    async fn enrich_with_dub_cast(
        &self,
        season_meta: &mut SeasonMetadata,
        files: &mut [MediaFile],
        season: u32,
    ) -> Result<()> {
        let Some(store) = self.store else {
            return Ok(());
        };
        let Some(season_id) = store.find_season_id(self.opts.show_id, season).await? else {
            tracing::debug!(
                "No local season record for show {} season {season}",
                self.opts.show_id
            );
            return Ok(());
        };

        let locals = store.list_actors_for_season(season_id).await?;
        if locals.is_empty() {
            return Ok(());
        }

        self.ui.render(
            Panel::Info,
            &format!("Merging {} dub actors from the local store", locals.len()),
        );

        prepend_actors(&mut season_meta.actors, &locals);
        for file in files.iter_mut() {
            if let Some(meta) = &mut file.metadata {
                prepend_actors(&mut meta.actors, &locals);
            }
        }

        Ok(())
    }

    /// Renamed → SidecarsWritten. One season.nfo plus one nfo per matched
    /// file; probe or write failures are reported per file.
    fn write_sidecars(&self, files: &[MediaFile], season_meta: &SeasonMetadata) {
        let season_path = self.opts.directory.join("season.nfo");
        match fs::write(&season_path, nfo::render_season(season_meta)) {
            Ok(()) => self
                .ui
                .render(Panel::Notice, &format!("Wrote {}", season_path.display())),
            Err(e) => self.ui.render(
                Panel::Warning,
                &format!("Failed to write {}: {e}", season_path.display()),
            ),
        }

        for file in files {
            let Some(meta) = &file.metadata else {
                continue;
            };
            let (Some(nfo_path), Some(media_path)) = (file.nfo_path(), file.new_path()) else {
                continue;
            };

            let streams = match self.probe.streams(&media_path) {
                Ok(streams) => streams,
                Err(e) => {
                    self.ui.render(
                        Panel::Warning,
                        &format!("Skipping {}: {e}", nfo_path.display()),
                    );
                    continue;
                }
            };

            let content = nfo::render_episode(season_meta, meta, &streams);
            match fs::write(&nfo_path, content) {
                Ok(()) => self
                    .ui
                    .render(Panel::Notice, &format!("Wrote {}", nfo_path.display())),
                Err(e) => self.ui.render(
                    Panel::Warning,
                    &format!("Failed to write {}: {e}", nfo_path.display()),
                ),
            }
        }
    }

    /// SidecarsWritten → ThumbnailsFetched. Downloads run strictly in file
    /// order; a failed download is reported and the batch continues.
    async fn download_thumbnails(&self, files: &[MediaFile]) {
        let mut failures = 0;
        let mut downloaded = 0;

        for file in files {
            let Some(meta) = &file.metadata else {
                continue;
            };
            let Some(still_url) = &meta.still_url else {
                continue;
            };
            let Some(dest) = file.thumb_path() else {
                continue;
            };

            match self.provider.download_still(still_url, &dest).await {
                Ok(()) => {
                    downloaded += 1;
                    self.ui
                        .render(Panel::Info, &format!("Downloaded {}", dest.display()));
                }
                Err(e) => {
                    failures += 1;
                    self.ui.render(
                        Panel::Warning,
                        &format!("Failed to download {}: {e}", dest.display()),
                    );
                }
            }
        }

        if failures > 0 {
            self.ui.render(
                Panel::Warning,
                &format!("{failures} thumbnail download(s) failed"),
            );
        } else {
            self.ui.render(
                Panel::Notice,
                &format!("{downloaded} thumbnail(s) downloaded."),
            );
        }
    }
}

/// Local actors take precedence by being prepended.
fn prepend_actors(target: &mut Vec<Actor>, locals: &[Actor]) {
    let mut merged = locals.to_vec();
    merged.append(target);
    *target = merged;
}

fn file_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}

/// Proposed-rename table rendered before and after the rename stage.
fn rename_table(files: &[MediaFile]) -> String {
    let status_label = |file: &MediaFile| match &file.status {
        FileStatus::Unset => {
            if file.new_filename.is_some() {
                "Pending".to_string()
            } else {
                "Skipping".to_string()
            }
        }
        FileStatus::Ok => "\u{2714} Renamed".to_string(),
        FileStatus::Error(e) => format!("\u{2718} {e}"),
    };

    let old_width = files
        .iter()
        .map(|f| f.filename.len())
        .max()
        .unwrap_or(0)
        .max("Old Filename".len());
    let new_width = files
        .iter()
        .map(|f| f.new_filename.as_deref().unwrap_or("-").len())
        .max()
        .unwrap_or(0)
        .max("New Filename".len());

    let mut table = String::new();
    table.push_str(&format!(
        "{:<old_width$}  {:<new_width$}  Status\n",
        "Old Filename", "New Filename"
    ));
    for file in files {
        table.push_str(&format!(
            "{:<old_width$}  {:<new_width$}  {}\n",
            file.filename,
            file.new_filename.as_deref().unwrap_or("-"),
            status_label(file)
        ));
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepend_actors_puts_locals_first() {
        use crate::models::metadata::person_thumb;

        let actor = |name: &str| Actor {
            name: name.to_string(),
            original_name: None,
            kind: "Actor".to_string(),
            role: "Unknown".to_string(),
            photo: None,
            thumb: person_thumb(name),
        };

        let mut target = vec![actor("Remote One"), actor("Remote Two")];
        prepend_actors(&mut target, &[actor("Local One")]);

        let names: Vec<&str> = target.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Local One", "Remote One", "Remote Two"]);
    }

    #[test]
    fn test_rename_table_labels() {
        let mut matched =
            MediaFile::from_path(Path::new("/media/Show.S01E01.mkv")).unwrap();
        matched.new_filename = Some("Show.S01E01.Pilot.mkv".to_string());
        let unmatched = MediaFile::from_path(Path::new("/media/extras.mkv")).unwrap();

        let table = rename_table(&[matched, unmatched]);

        assert!(table.contains("Pending"));
        assert!(table.contains("Skipping"));
        assert!(table.contains("Show.S01E01.Pilot.mkv"));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Show.S01E01.mkv"), "Show.S01E01");
        assert_eq!(file_stem("noext"), "noext");
    }
}
