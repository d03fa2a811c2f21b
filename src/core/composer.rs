//! Filename composer module.
//!
//! Builds the canonical episode filename from resolved metadata:
//! `{series}[ {suffix}].S{ss}E{ee}.{episode_name}{ext}`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters illegal on common filesystems.
static ILLEGAL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\:*?"<>|]"#).expect("sanitize pattern must compile"));

/// Strip characters illegal on common filesystems.
///
/// Characters are deleted, not replaced, so an embedded `/` merges the
/// words around it. That matches the historical on-disk naming and stays.
pub fn sanitize_filename(filename: &str) -> String {
    ILLEGAL_CHARS.replace_all(filename, "").into_owned()
}

/// Compose the canonical filename for an episode.
///
/// Returns `(full filename, filename without extension)`. Sanitization is
/// applied to the composed string as a whole; `extension` is expected with
/// its leading dot.
pub fn compose_episode_filename(
    series_name: &str,
    suffix: Option<&str>,
    season: u32,
    episode: u32,
    episode_name: &str,
    extension: &str,
) -> (String, String) {
    let series = match suffix {
        Some(suffix) if !suffix.is_empty() => format!("{series_name} {suffix}"),
        _ => series_name.to_string(),
    };

    let naked = sanitize_filename(&format!(
        "{series}.S{season:02}E{episode:02}.{episode_name}"
    ));
    let full = format!("{naked}{extension}");

    (full, naked)
}
