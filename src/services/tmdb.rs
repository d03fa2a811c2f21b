//! TMDB API client.

use crate::models::metadata::{
    person_thumb, Actor, CrewMember, EpisodeMetadata, SeasonMetadata, ShowGeneralInfo,
};
use crate::services::provider::MetadataProvider;
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::Path;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/original";

/// TMDB client configuration.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub language: String,
}

impl TmdbConfig {
    /// Create config from the TMDB_API_KEY environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("TMDB_API_KEY").map_err(|_| crate::Error::TmdbApiKeyMissing)?;

        Ok(Self {
            api_key,
            language: "en-US".to_string(),
        })
    }
}

/// TMDB API client.
pub struct TmdbClient {
    config: TmdbConfig,
    client: reqwest::Client,
}

/// Show details.
#[derive(Debug, Deserialize)]
struct TvDetails {
    name: String,
    number_of_seasons: u32,
    #[serde(default)]
    genres: Vec<Genre>,
}

/// Genre.
#[derive(Debug, Deserialize)]
struct Genre {
    name: String,
}

/// Season details with aggregate credits appended.
#[derive(Debug, Deserialize)]
struct SeasonDetails {
    name: String,
    season_number: u32,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    vote_average: f32,
    air_date: Option<String>,
    poster_path: Option<String>,
    episodes: Vec<EpisodeDetails>,
    aggregate_credits: Option<Credits>,
}

/// Episode details.
#[derive(Debug, Deserialize)]
struct EpisodeDetails {
    name: String,
    episode_number: u32,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    vote_average: f32,
    air_date: Option<String>,
    still_path: Option<String>,
    #[serde(default)]
    guest_stars: Vec<CastMember>,
    #[serde(default)]
    crew: Vec<CrewCredit>,
}

/// Cast and crew container.
#[derive(Debug, Deserialize)]
struct Credits {
    #[serde(default)]
    cast: Vec<CastMember>,
    #[serde(default)]
    crew: Vec<CrewCredit>,
}

/// Cast member, from either `credits` (character) or `aggregate_credits`
/// (roles list).
#[derive(Debug, Deserialize)]
struct CastMember {
    name: String,
    original_name: Option<String>,
    character: Option<String>,
    #[serde(default)]
    roles: Vec<CastRole>,
    profile_path: Option<String>,
}

/// One role within an aggregate cast entry.
#[derive(Debug, Deserialize)]
struct CastRole {
    character: Option<String>,
}

/// Crew credit, from either `credits` (job) or `aggregate_credits` (jobs
/// list).
#[derive(Debug, Deserialize)]
struct CrewCredit {
    name: Option<String>,
    original_name: Option<String>,
    job: Option<String>,
    #[serde(default)]
    jobs: Vec<CrewJob>,
    profile_path: Option<String>,
}

/// One job within an aggregate crew entry.
#[derive(Debug, Deserialize)]
struct CrewJob {
    job: Option<String>,
}

impl TmdbClient {
    /// Create a new client.
    pub fn new(config: TmdbConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(TmdbConfig::from_env()?))
    }

    /// GET a TMDB endpoint, failing on any non-success status with the
    /// offending URL and status code.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        append: Option<&str>,
    ) -> Result<T> {
        let url = format!("{TMDB_BASE_URL}{path}");
        let mut query = vec![
            ("api_key", self.config.api_key.clone()),
            ("language", self.config.language.clone()),
        ];
        if let Some(append) = append {
            query.push(("append_to_response", append.to_string()));
        }

        let response = self.client.get(&url).query(&query).send().await?;

        if !response.status().is_success() {
            return Err(crate::Error::TmdbStatus {
                url,
                status: response.status().as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn fetch_show_general_info(&self, show_id: i64) -> Result<ShowGeneralInfo> {
        let details: TvDetails = self.get_json(&format!("/tv/{show_id}"), None).await?;

        Ok(ShowGeneralInfo {
            name: details.name,
            genres: details.genres.into_iter().map(|g| g.name).collect(),
            season_count: details.number_of_seasons,
        })
    }

    async fn fetch_season(&self, show_id: i64, season: u32) -> Result<SeasonMetadata> {
        let show = self.fetch_show_general_info(show_id).await?;
        let details: SeasonDetails = self
            .get_json(
                &format!("/tv/{show_id}/season/{season}"),
                Some("aggregate_credits"),
            )
            .await?;

        tracing::info!(
            "Fetched season {} of {} ({} episodes)",
            details.season_number,
            show.name,
            details.episodes.len()
        );

        Ok(parse_season(details, show))
    }

    async fn download_still(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(crate::Error::TmdbStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let mut file = fs::File::create(dest)?;
        file.write_all(&bytes)?;

        tracing::debug!("Downloaded {} -> {:?}", url, dest);
        Ok(())
    }
}

/// Map a season payload to the internal model. The season's aggregate cast
/// is injected into every episode's actor list.
fn parse_season(details: SeasonDetails, show: ShowGeneralInfo) -> SeasonMetadata {
    let (season_cast, season_crew) = match &details.aggregate_credits {
        Some(credits) => (
            parse_actors(&credits.cast, "Actor"),
            parse_crew(&credits.crew),
        ),
        None => (Vec::new(), Vec::new()),
    };

    let episodes = details
        .episodes
        .into_iter()
        .map(|ep| parse_episode(ep, &season_cast))
        .collect::<Vec<_>>();

    SeasonMetadata {
        series_name: show.name,
        season_name: details.name,
        season_number: details.season_number,
        episode_count: episodes.len() as u32,
        overview: details.overview,
        community_rating: details.vote_average,
        release_date: details.air_date.unwrap_or_default(),
        poster_url: details.poster_path.map(image_url),
        episodes,
        genres: show.genres,
        actors: season_cast,
        crew: season_crew,
    }
}

fn parse_episode(details: EpisodeDetails, season_cast: &[Actor]) -> EpisodeMetadata {
    EpisodeMetadata {
        name: details.name,
        episode_number: details.episode_number,
        overview: details.overview,
        community_rating: details.vote_average,
        air_date: details.air_date.unwrap_or_default(),
        still_url: details.still_path.map(image_url),
        actors: season_cast.to_vec(),
        guest_stars: parse_actors(&details.guest_stars, "GuestStar"),
        crew: parse_crew(&details.crew),
    }
}

fn parse_actors(cast: &[CastMember], kind: &str) -> Vec<Actor> {
    cast.iter()
        .map(|member| {
            let role = member
                .character
                .clone()
                .or_else(|| member.roles.first().and_then(|r| r.character.clone()))
                .unwrap_or_else(|| "Unknown".to_string());

            Actor {
                name: member.name.clone(),
                original_name: member.original_name.clone(),
                kind: kind.to_string(),
                role,
                photo: member.profile_path.clone().map(image_url),
                thumb: person_thumb(&member.name),
            }
        })
        .collect()
}

fn parse_crew(crew: &[CrewCredit]) -> Vec<CrewMember> {
    crew.iter()
        .filter_map(|credit| {
            let name = credit.name.clone()?;

            let job = credit
                .job
                .clone()
                .or_else(|| credit.jobs.first().and_then(|j| j.job.clone()))
                .unwrap_or_else(|| "Crew".to_string());

            Some(CrewMember {
                name: name.clone(),
                original_name: credit.original_name.clone(),
                job,
                photo: credit.profile_path.clone().map(image_url),
                thumb: person_thumb(&name),
            })
        })
        .collect()
}

fn image_url(path: String) -> String {
    format!("{IMAGE_BASE_URL}{path}")
}
