//! Error types for tvtidy.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tvtidy.
#[derive(Error, Debug)]
pub enum Error {
    // Preflight / configuration errors
    #[error("TMDB API key not configured. Set TMDB_API_KEY environment variable")]
    TmdbApiKeyMissing,

    #[error("ffprobe not found. Install FFmpeg: sudo apt install ffmpeg")]
    FfprobeNotFound,

    #[error("{0} mode is not implemented yet")]
    UnsupportedMode(String),

    // Directory errors
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("No supported media files (.mp4, .mkv, .avi, .m4v, .wmv) found in directory: {0}")]
    NoSupportedFiles(String),

    // Filename inference errors
    #[error("Mixed seasons detected: found season {expected} and {found}. Culprit file: {file}")]
    MixedSeasons {
        expected: u32,
        found: u32,
        file: String,
    },

    #[error("Could not infer season from filenames. Ensure filenames follow a pattern like S01E01")]
    SeasonNotInferable,

    #[error("Could not extract episode number from filename: {0}")]
    EpisodeNotInferable(String),

    // TMDB errors
    #[error("TMDB request failed with HTTP status {status}: {url}")]
    TmdbStatus { url: String, status: u16 },

    // Media probe errors
    #[error("Media probe failed for: {0}")]
    ProbeFailed(String),

    // Scraper errors
    #[error("Scrape failed: {0}")]
    ScrapeError(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Database errors
    #[error("Database error: {0}")]
    Sql(#[from] sqlx::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
