//! Shared fakes for pipeline integration tests.

use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use tvtidy::models::metadata::{
    person_thumb, Actor, EpisodeMetadata, SeasonMetadata, ShowGeneralInfo,
};
use tvtidy::services::probe::{AudioStream, MediaProbe, MediaStreams, VideoStream};
use tvtidy::services::provider::MetadataProvider;
use tvtidy::services::store::DubStore;
use tvtidy::ui::{Panel, Ui};
use tvtidy::Result;

/// In-memory metadata provider.
pub struct FakeProvider {
    pub season: SeasonMetadata,
    pub fail_fetch: bool,
    pub fail_stills: bool,
}

impl FakeProvider {
    pub fn new(season: SeasonMetadata) -> Self {
        Self {
            season,
            fail_fetch: false,
            fail_stills: false,
        }
    }
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    async fn fetch_show_general_info(&self, _show_id: i64) -> Result<ShowGeneralInfo> {
        Ok(ShowGeneralInfo {
            name: self.season.series_name.clone(),
            genres: self.season.genres.clone(),
            season_count: 1,
        })
    }

    async fn fetch_season(&self, _show_id: i64, _season: u32) -> Result<SeasonMetadata> {
        if self.fail_fetch {
            return Err(tvtidy::Error::TmdbStatus {
                url: "https://fake/season".to_string(),
                status: 503,
            });
        }
        Ok(self.season.clone())
    }

    async fn download_still(&self, url: &str, dest: &Path) -> Result<()> {
        if self.fail_stills {
            return Err(tvtidy::Error::TmdbStatus {
                url: url.to_string(),
                status: 404,
            });
        }
        fs::write(dest, b"jpeg-bytes")?;
        Ok(())
    }
}

/// Store fake holding one season's worth of local actors.
pub struct FakeStore {
    pub season_id: Option<i64>,
    pub actors: Vec<Actor>,
}

#[async_trait]
impl DubStore for FakeStore {
    async fn find_season_id(&self, _show_id: i64, _season_number: u32) -> Result<Option<i64>> {
        Ok(self.season_id)
    }

    async fn list_actors_for_season(&self, _season_id: i64) -> Result<Vec<Actor>> {
        Ok(self.actors.clone())
    }
}

/// Probe fake returning canned streams for existing files.
pub struct FakeProbe;

impl MediaProbe for FakeProbe {
    fn streams(&self, path: &Path) -> Result<MediaStreams> {
        if !path.exists() {
            return Err(tvtidy::Error::ProbeFailed(path.display().to_string()));
        }
        Ok(MediaStreams {
            video: VideoStream {
                codec: "h264".to_string(),
                micodec: "avc1".to_string(),
                bitrate: "1500000".to_string(),
                width: 1920,
                height: 1080,
                aspect: "16:9".to_string(),
                framerate: "24".to_string(),
                scan_type: "progressive".to_string(),
                default: true,
                forced: false,
                duration: "42m 15s".to_string(),
                duration_seconds: 2535,
            },
            audio: vec![AudioStream {
                codec: "aac".to_string(),
                micodec: "mp4a".to_string(),
                bitrate: "128000".to_string(),
                language: "en".to_string(),
                channels: 2,
                sampling_rate: "44100".to_string(),
                default: true,
                forced: false,
            }],
        })
    }
}

/// Headless UI answering confirmation gates from a script and recording
/// every rendered panel.
pub struct ScriptedUi {
    answers: RefCell<VecDeque<bool>>,
    pub rendered: RefCell<Vec<(Panel, String)>>,
}

impl ScriptedUi {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            rendered: RefCell::new(Vec::new()),
        }
    }

    /// All content rendered into a given panel, joined for assertions.
    pub fn rendered_in(&self, panel: Panel) -> String {
        self.rendered
            .borrow()
            .iter()
            .filter(|(p, _)| *p == panel)
            .map(|(_, content)| content.clone())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Ui for ScriptedUi {
    fn render(&self, panel: Panel, content: &str) {
        self.rendered.borrow_mut().push((panel, content.to_string()));
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.answers
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected confirmation prompt: {prompt}"))
    }
}

/// Season metadata with the given episodes, one actor, and genres.
pub fn season_fixture(episodes: &[(u32, &str)], episode_count: u32) -> SeasonMetadata {
    let cast = vec![Actor {
        name: "Remote Lead".to_string(),
        original_name: None,
        kind: "Actor".to_string(),
        role: "Hero".to_string(),
        photo: None,
        thumb: person_thumb("Remote Lead"),
    }];

    SeasonMetadata {
        series_name: "My Show".to_string(),
        season_name: "Season One".to_string(),
        season_number: 1,
        episode_count,
        overview: "A season.".to_string(),
        community_rating: 8.0,
        release_date: "2023-01-01".to_string(),
        poster_url: None,
        episodes: episodes
            .iter()
            .map(|(number, name)| EpisodeMetadata {
                name: name.to_string(),
                episode_number: *number,
                overview: format!("Episode {number}."),
                community_rating: 8.0,
                air_date: "2023-01-01".to_string(),
                still_url: Some(format!("https://fake/still/{number}.jpg")),
                actors: cast.clone(),
                guest_stars: vec![],
                crew: vec![],
            })
            .collect(),
        genres: vec!["Drama".to_string()],
        actors: cast,
        crew: vec![],
    }
}
