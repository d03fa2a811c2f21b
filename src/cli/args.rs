//! Command line argument definitions.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// tvtidy - organize TV episode files with TMDB metadata
#[derive(Parser, Debug)]
#[command(name = "tvtidy")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["tvshow", "movie", "person"]),
))]
pub struct Cli {
    /// The TMDB id of the media. Required for fetching metadata.
    #[arg(value_name = "MEDIA_ID")]
    pub media_id: i64,

    /// Directory to organize. Defaults to the current working directory.
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Organize a TV show season
    #[arg(short = 't', long)]
    pub tvshow: bool,

    /// Organize a movie
    #[arg(short = 'm', long)]
    pub movie: bool,

    /// Organize media related to a person
    #[arg(short = 'p', long)]
    pub person: bool,

    /// Season number, inferred from filenames when omitted
    #[arg(short = 's', long, value_name = "SEASON")]
    pub season: Option<u32>,

    /// Text appended to the series name in composed filenames
    #[arg(long, value_name = "TEXT")]
    pub suffix: Option<String>,

    /// Only generate sidecar metadata files, skipping the rename stage
    #[arg(short = 'n', long)]
    pub nfo_only: bool,

    /// Path to the local dub-cast database
    #[arg(long, env = "DUBDB_PATH", value_name = "PATH")]
    pub dub_db: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Skip preflight checks
    #[arg(long)]
    pub skip_preflight: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_exactly_one_mode() {
        assert!(Cli::try_parse_from(["tvtidy", "1399"]).is_err());
        assert!(Cli::try_parse_from(["tvtidy", "1399", "-t", "-m"]).is_err());
        assert!(Cli::try_parse_from(["tvtidy", "1399", "-t"]).is_ok());
    }

    #[test]
    fn test_directory_defaults_to_none() {
        let cli = Cli::try_parse_from(["tvtidy", "1399", "-t"]).unwrap();
        assert_eq!(cli.media_id, 1399);
        assert!(cli.directory.is_none());
        assert!(cli.season.is_none());
        assert!(!cli.nfo_only);
    }

    #[test]
    fn test_full_invocation() {
        let cli = Cli::try_parse_from([
            "tvtidy", "1399", "/media/got", "-t", "-s", "3", "--suffix", "PT", "-n",
        ])
        .unwrap();
        assert_eq!(cli.directory, Some(PathBuf::from("/media/got")));
        assert_eq!(cli.season, Some(3));
        assert_eq!(cli.suffix.as_deref(), Some("PT"));
        assert!(cli.nfo_only);
    }
}
