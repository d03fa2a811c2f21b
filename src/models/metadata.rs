//! Remote metadata records.
//!
//! Typed representations of the provider's season, episode, and credit
//! payloads. Required fields are non-optional so malformed responses are
//! rejected at the deserialization boundary rather than later on access.

use serde::{Deserialize, Serialize};

/// General information about a show, independent of any season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowGeneralInfo {
    pub name: String,
    pub genres: Vec<String>,
    pub season_count: u32,
}

/// Metadata for one season of a show.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonMetadata {
    pub series_name: String,
    pub season_name: String,
    pub season_number: u32,
    /// Number of episodes the provider reports for this season.
    pub episode_count: u32,
    pub overview: String,
    pub community_rating: f32,
    /// Release date in `YYYY-MM-DD`, or the provider-native string.
    pub release_date: String,
    pub poster_url: Option<String>,
    pub episodes: Vec<EpisodeMetadata>,
    pub genres: Vec<String>,
    pub actors: Vec<Actor>,
    pub crew: Vec<CrewMember>,
}

impl SeasonMetadata {
    /// Find an episode by its number within the season.
    pub fn episode(&self, number: u32) -> Option<&EpisodeMetadata> {
        self.episodes.iter().find(|ep| ep.episode_number == number)
    }
}

/// Metadata for one episode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeMetadata {
    pub name: String,
    /// Unique within a season.
    pub episode_number: u32,
    pub overview: String,
    pub community_rating: f32,
    /// Air date in `YYYY-MM-DD`, or the provider-native string.
    pub air_date: String,
    pub still_url: Option<String>,
    pub actors: Vec<Actor>,
    pub guest_stars: Vec<Actor>,
    pub crew: Vec<CrewMember>,
}

/// An actor or guest star.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub original_name: Option<String>,
    /// "Actor" or "GuestStar".
    pub kind: String,
    pub role: String,
    pub photo: Option<String>,
    /// Local thumbnail path under the media-server metadata root.
    pub thumb: String,
}

/// A crew member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
    pub name: String,
    pub original_name: Option<String>,
    /// Job label, e.g. "Director" or "Writer".
    pub job: String,
    pub photo: Option<String>,
    pub thumb: String,
}

/// Local thumbnail path for a person, keyed by the first letter of the name.
pub fn person_thumb(name: &str) -> String {
    let initial = name
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default();
    format!("/config/data/metadata/People/{initial}/{name}/folder.jpg")
}
