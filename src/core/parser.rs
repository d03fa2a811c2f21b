//! Filename parser module.
//!
//! Extracts season and episode identity from noisy filenames using an
//! ordered set of pattern rules.

use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;

/// Episode-number rules, tried in order. The first rule that matches wins,
/// so the specific markers must stay ahead of the generic digit fallbacks.
static EPISODE_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)S\d{1,2}E(\d{1,2})", // S01E01
        r"(?i)\bE(\d{1,2})\b",     // E01
        r"(?i)Ep\.?(\d{1,2})",     // Ep01, Ep.01
        r"^(\d{1,2})\s+",          // leading number followed by space
        r"\b(\d{1,2})\b",          // standalone number (final fallback)
        r"-\s*(\d{1,2})\s",        // dash patterns
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("episode rule must compile"))
    .collect()
});

/// Season+episode marker used for season inference (S01E01, T01E01).
static SEASON_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:S|T)(\d{1,2})E\d{1,2}").expect("season pattern must compile"));

/// Extract the episode number from a filename.
///
/// Fails with `EpisodeNotInferable` when no rule matches.
pub fn extract_episode_number(filename: &str) -> Result<u32> {
    for rule in EPISODE_RULES.iter() {
        if let Some(caps) = rule.captures(filename) {
            if let Some(m) = caps.get(1) {
                if let Ok(number) = m.as_str().parse::<u32>() {
                    return Ok(number);
                }
            }
        }
    }

    Err(crate::Error::EpisodeNotInferable(filename.to_string()))
}

/// Infer the season number shared by a batch of filenames.
///
/// The first filename carrying a season marker seeds the inference, unless
/// `expected` pins it up front; every subsequent marker must agree exactly.
/// A disagreement fails with `MixedSeasons` naming the conflicting file.
/// With no markers and no `expected`, fails with `SeasonNotInferable`.
pub fn infer_season<S: AsRef<str>>(filenames: &[S], expected: Option<u32>) -> Result<u32> {
    let mut season = expected;

    for filename in filenames {
        let filename = filename.as_ref();
        let Some(caps) = SEASON_PATTERN.captures(filename) else {
            continue;
        };
        let current: u32 = caps[1].parse().map_err(|_| {
            crate::Error::Other(format!("invalid season digits in {filename}"))
        })?;

        match season {
            None => season = Some(current),
            Some(seen) if seen != current => {
                return Err(crate::Error::MixedSeasons {
                    expected: seen,
                    found: current,
                    file: filename.to_string(),
                });
            }
            Some(_) => {}
        }
    }

    season.ok_or(crate::Error::SeasonNotInferable)
}
