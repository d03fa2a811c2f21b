//! NFO sidecar generator (Kodi/Jellyfin compatible).

use crate::models::metadata::{Actor, CrewMember, EpisodeMetadata, SeasonMetadata};
use crate::services::probe::MediaStreams;
use chrono::NaiveDate;

/// Generate the season NFO content.
pub fn render_season(season: &SeasonMetadata) -> String {
    let (release_date, year) = parse_date_and_year(&season.release_date);
    let dateadded = chrono::Local::now().format("%Y-%m-%d").to_string();

    let mut nfo = String::new();

    nfo.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    nfo.push_str("<season>\n");
    nfo.push_str("  <lockdata>false</lockdata>\n");
    nfo.push_str(&format!("  <dateadded>{dateadded}</dateadded>\n"));
    nfo.push_str(&format!(
        "  <title>Season {} - {}</title>\n",
        season.season_number,
        escape_xml(&season.season_name)
    ));
    nfo.push_str(&format!(
        "  <showtitle>{}</showtitle>\n",
        escape_xml(&season.series_name)
    ));
    nfo.push_str(&format!(
        "  <seasonnumber>{}</seasonnumber>\n",
        season.season_number
    ));

    if !season.overview.is_empty() {
        nfo.push_str(&format!("  <plot>{}</plot>\n", escape_xml(&season.overview)));
        nfo.push_str(&format!(
            "  <outline>{}</outline>\n",
            escape_xml(&season.overview)
        ));
    }

    if !year.is_empty() {
        nfo.push_str(&format!("  <year>{year}</year>\n"));
    }
    if !release_date.is_empty() {
        nfo.push_str(&format!("  <premiered>{release_date}</premiered>\n"));
        nfo.push_str(&format!("  <releasedate>{release_date}</releasedate>\n"));
    }

    if season.community_rating > 0.0 {
        nfo.push_str(&format!(
            "  <rating>{:.1}</rating>\n",
            season.community_rating
        ));
    }

    for genre in &season.genres {
        nfo.push_str(&format!("  <genre>{}</genre>\n", escape_xml(genre)));
    }

    for actor in &season.actors {
        push_actor(&mut nfo, actor);
    }

    nfo.push_str("</season>\n");
    nfo
}

/// Generate an episode NFO, embedding the file's stream attributes.
pub fn render_episode(
    season: &SeasonMetadata,
    episode: &EpisodeMetadata,
    streams: &MediaStreams,
) -> String {
    let (air_date, year) = parse_date_and_year(&episode.air_date);

    let mut nfo = String::new();

    nfo.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    nfo.push_str("<episodedetails>\n");
    nfo.push_str("  <lockdata>false</lockdata>\n");
    nfo.push_str(&format!("  <title>{}</title>\n", escape_xml(&episode.name)));
    nfo.push_str(&format!(
        "  <showtitle>{}</showtitle>\n",
        escape_xml(&season.series_name)
    ));
    nfo.push_str(&format!("  <season>{:02}</season>\n", season.season_number));
    nfo.push_str(&format!(
        "  <episode>{:02}</episode>\n",
        episode.episode_number
    ));

    if !air_date.is_empty() {
        nfo.push_str(&format!("  <aired>{air_date}</aired>\n"));
    }
    if !year.is_empty() {
        nfo.push_str(&format!("  <year>{year}</year>\n"));
    }

    if episode.community_rating > 0.0 {
        nfo.push_str(&format!(
            "  <rating>{:.1}</rating>\n",
            episode.community_rating
        ));
    }

    if !episode.overview.is_empty() {
        nfo.push_str(&format!(
            "  <plot>{}</plot>\n",
            escape_xml(&episode.overview)
        ));
    }

    for genre in &season.genres {
        nfo.push_str(&format!("  <genre>{}</genre>\n", escape_xml(genre)));
    }

    for member in &episode.crew {
        push_crew(&mut nfo, member);
    }

    for actor in episode.actors.iter().chain(&episode.guest_stars) {
        push_actor(&mut nfo, actor);
    }

    push_fileinfo(&mut nfo, streams);

    nfo.push_str("</episodedetails>\n");
    nfo
}

fn push_actor(nfo: &mut String, actor: &Actor) {
    nfo.push_str("  <actor>\n");
    nfo.push_str(&format!("    <name>{}</name>\n", escape_xml(&actor.name)));
    nfo.push_str(&format!("    <role>{}</role>\n", escape_xml(&actor.role)));
    nfo.push_str(&format!("    <type>{}</type>\n", escape_xml(&actor.kind)));
    nfo.push_str(&format!("    <thumb>{}</thumb>\n", escape_xml(&actor.thumb)));
    nfo.push_str("  </actor>\n");
}

fn push_crew(nfo: &mut String, member: &CrewMember) {
    match member.job.as_str() {
        "Director" => {
            nfo.push_str(&format!(
                "  <director>{}</director>\n",
                escape_xml(&member.name)
            ));
        }
        "Writer" | "Screenplay" | "Story" => {
            nfo.push_str(&format!(
                "  <credits>{}</credits>\n",
                escape_xml(&member.name)
            ));
        }
        _ => {}
    }
}

fn push_fileinfo(nfo: &mut String, streams: &MediaStreams) {
    let video = &streams.video;

    nfo.push_str("  <fileinfo>\n");
    nfo.push_str("    <streamdetails>\n");
    nfo.push_str("      <video>\n");
    nfo.push_str(&format!("        <codec>{}</codec>\n", escape_xml(&video.codec)));
    nfo.push_str(&format!(
        "        <micodec>{}</micodec>\n",
        escape_xml(&video.micodec)
    ));
    nfo.push_str(&format!("        <bitrate>{}</bitrate>\n", video.bitrate));
    nfo.push_str(&format!("        <width>{}</width>\n", video.width));
    nfo.push_str(&format!("        <height>{}</height>\n", video.height));
    nfo.push_str(&format!("        <aspect>{}</aspect>\n", video.aspect));
    nfo.push_str(&format!(
        "        <aspectratio>{}</aspectratio>\n",
        video.aspect
    ));
    nfo.push_str(&format!(
        "        <framerate>{}</framerate>\n",
        video.framerate
    ));
    nfo.push_str(&format!(
        "        <scantype>{}</scantype>\n",
        escape_xml(&video.scan_type)
    ));
    nfo.push_str(&format!("        <default>{}</default>\n", video.default));
    nfo.push_str(&format!("        <forced>{}</forced>\n", video.forced));
    nfo.push_str(&format!(
        "        <duration>{}</duration>\n",
        video.duration
    ));
    nfo.push_str(&format!(
        "        <durationinseconds>{}</durationinseconds>\n",
        video.duration_seconds
    ));
    nfo.push_str("      </video>\n");

    for audio in &streams.audio {
        nfo.push_str("      <audio>\n");
        nfo.push_str(&format!("        <codec>{}</codec>\n", escape_xml(&audio.codec)));
        nfo.push_str(&format!(
            "        <micodec>{}</micodec>\n",
            escape_xml(&audio.micodec)
        ));
        nfo.push_str(&format!("        <bitrate>{}</bitrate>\n", audio.bitrate));
        nfo.push_str(&format!(
            "        <language>{}</language>\n",
            escape_xml(&audio.language)
        ));
        nfo.push_str(&format!(
            "        <channels>{}</channels>\n",
            audio.channels
        ));
        nfo.push_str(&format!(
            "        <samplingrate>{}</samplingrate>\n",
            audio.sampling_rate
        ));
        nfo.push_str(&format!("        <default>{}</default>\n", audio.default));
        nfo.push_str(&format!("        <forced>{}</forced>\n", audio.forced));
        nfo.push_str("      </audio>\n");
    }

    nfo.push_str("    </streamdetails>\n");
    nfo.push_str("  </fileinfo>\n");
}

/// Split a `YYYY-MM-DD` date into (date, year); a date that does not parse
/// is passed through with an empty year.
fn parse_date_and_year(date: &str) -> (String, String) {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => (parsed.to_string(), parsed.format("%Y").to_string()),
        Err(_) => (date.to_string(), String::new()),
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metadata::person_thumb;
    use crate::services::probe::{AudioStream, VideoStream};

    fn sample_season() -> SeasonMetadata {
        SeasonMetadata {
            series_name: "My Show".to_string(),
            season_name: "Season One".to_string(),
            season_number: 1,
            episode_count: 1,
            overview: "An exciting first season of the series.".to_string(),
            community_rating: 8.7,
            release_date: "2023-01-01".to_string(),
            poster_url: None,
            episodes: vec![],
            genres: vec!["Drama".to_string(), "Mystery".to_string()],
            actors: vec![
                Actor {
                    name: "Actor One".to_string(),
                    original_name: None,
                    kind: "Actor".to_string(),
                    role: "Protagonist".to_string(),
                    photo: None,
                    thumb: person_thumb("Actor One"),
                },
                Actor {
                    name: "Actor Two".to_string(),
                    original_name: None,
                    kind: "Actor".to_string(),
                    role: "Supporting".to_string(),
                    photo: None,
                    thumb: person_thumb("Actor Two"),
                },
            ],
            crew: vec![],
        }
    }

    fn sample_episode() -> EpisodeMetadata {
        EpisodeMetadata {
            name: "Pilot".to_string(),
            episode_number: 1,
            overview: "The first episode of the series.".to_string(),
            community_rating: 8.5,
            air_date: "2023-01-01".to_string(),
            still_url: Some("https://example.com/still.jpg".to_string()),
            actors: vec![Actor {
                name: "Actor One".to_string(),
                original_name: None,
                kind: "Actor".to_string(),
                role: "Protagonist".to_string(),
                photo: None,
                thumb: "https://example.com/thumb1.jpg".to_string(),
            }],
            guest_stars: vec![],
            crew: vec![CrewMember {
                name: "Jane Director".to_string(),
                original_name: None,
                job: "Director".to_string(),
                photo: None,
                thumb: person_thumb("Jane Director"),
            }],
        }
    }

    fn sample_streams() -> MediaStreams {
        MediaStreams {
            video: VideoStream {
                codec: "H.264".to_string(),
                micodec: "avc1".to_string(),
                bitrate: "1500".to_string(),
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
                codec: "AAC".to_string(),
                micodec: "mp4a".to_string(),
                bitrate: "128".to_string(),
                language: "en".to_string(),
                channels: 2,
                sampling_rate: "44100".to_string(),
                default: true,
                forced: false,
            }],
        }
    }

    #[test]
    fn test_render_episode() {
        let result = render_episode(&sample_season(), &sample_episode(), &sample_streams());

        assert!(result.contains("<title>Pilot</title>"));
        assert!(result.contains("<showtitle>My Show</showtitle>"));
        assert!(result.contains("<season>01</season>"));
        assert!(result.contains("<episode>01</episode>"));
        assert!(result.contains("<aired>2023-01-01</aired>"));
        assert!(result.contains("<year>2023</year>"));
        assert!(result.contains("<rating>8.5</rating>"));
        assert!(result.contains("<plot>The first episode of the series.</plot>"));
        assert!(result.contains("<genre>Drama</genre>"));
        assert!(result.contains("<genre>Mystery</genre>"));
        assert!(result.contains("<director>Jane Director</director>"));
        assert!(result.contains("<actor>"));
        assert!(result.contains("<name>Actor One</name>"));
        assert!(result.contains("<role>Protagonist</role>"));
        assert!(result.contains("<thumb>https://example.com/thumb1.jpg</thumb>"));
    }

    #[test]
    fn test_render_episode_streamdetails() {
        let result = render_episode(&sample_season(), &sample_episode(), &sample_streams());

        assert!(result.contains("<codec>H.264</codec>"));
        assert!(result.contains("<micodec>avc1</micodec>"));
        assert!(result.contains("<bitrate>1500</bitrate>"));
        assert!(result.contains("<width>1920</width>"));
        assert!(result.contains("<height>1080</height>"));
        assert!(result.contains("<aspect>16:9</aspect>"));
        assert!(result.contains("<aspectratio>16:9</aspectratio>"));
        assert!(result.contains("<framerate>24</framerate>"));
        assert!(result.contains("<scantype>progressive</scantype>"));
        assert!(result.contains("<duration>42m 15s</duration>"));
        assert!(result.contains("<durationinseconds>2535</durationinseconds>"));
        assert!(result.contains("<codec>AAC</codec>"));
        assert!(result.contains("<micodec>mp4a</micodec>"));
        assert!(result.contains("<language>en</language>"));
        assert!(result.contains("<channels>2</channels>"));
        assert!(result.contains("<samplingrate>44100</samplingrate>"));
    }

    #[test]
    fn test_render_season() {
        let result = render_season(&sample_season());

        assert!(result.contains("<title>Season 1 - Season One</title>"));
        assert!(result.contains("<seasonnumber>1</seasonnumber>"));
        assert!(result.contains("<plot>An exciting first season of the series.</plot>"));
        assert!(result.contains("<outline>An exciting first season of the series.</outline>"));
        assert!(result.contains("<premiered>2023-01-01</premiered>"));
        assert!(result.contains("<releasedate>2023-01-01</releasedate>"));
        assert!(result.contains("<year>2023</year>"));
        assert!(result.contains("<dateadded>"));
        assert!(result.contains("<name>Actor One</name>"));
        assert!(result.contains("<role>Protagonist</role>"));
        assert!(result.contains("<name>Actor Two</name>"));
        assert!(result.contains("<role>Supporting</role>"));
        assert!(result.contains("<genre>Drama</genre>"));
        assert!(result.contains("<genre>Mystery</genre>"));
    }

    #[test]
    fn test_render_season_with_unparseable_date() {
        let mut season = sample_season();
        season.release_date = "Winter 2023".to_string();

        let result = render_season(&season);
        assert!(result.contains("<premiered>Winter 2023</premiered>"));
        assert!(!result.contains("<year>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml(r#"Tom & Jerry <live> "now""#),
            "Tom &amp; Jerry &lt;live&gt; &quot;now&quot;"
        );
    }
}
