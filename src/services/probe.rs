//! Media probe service.
//!
//! Extracts technical stream attributes from a media file via ffprobe.
//! The sidecar generator embeds the result verbatim into episode NFOs.

use crate::Result;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// Video track attributes.
#[derive(Debug, Clone, Default)]
pub struct VideoStream {
    pub codec: String,
    pub micodec: String,
    pub bitrate: String,
    pub width: u32,
    pub height: u32,
    pub aspect: String,
    pub framerate: String,
    pub scan_type: String,
    pub default: bool,
    pub forced: bool,
    /// Duration rendered as "Xm Ys".
    pub duration: String,
    pub duration_seconds: u64,
}

/// Audio track attributes.
#[derive(Debug, Clone, Default)]
pub struct AudioStream {
    pub codec: String,
    pub micodec: String,
    pub bitrate: String,
    pub language: String,
    pub channels: u32,
    pub sampling_rate: String,
    pub default: bool,
    pub forced: bool,
}

/// Stream attributes of one media file.
#[derive(Debug, Clone, Default)]
pub struct MediaStreams {
    pub video: VideoStream,
    pub audio: Vec<AudioStream>,
}

/// Probe port. Sidecar generation consults this for each target file.
pub trait MediaProbe {
    fn streams(&self, path: &Path) -> Result<MediaStreams>;
}

/// FFprobe output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    streams: Vec<FfprobeStream>,
    format: FfprobeFormat,
}

/// FFprobe stream information.
#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    codec_tag_string: Option<String>,
    bit_rate: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    display_aspect_ratio: Option<String>,
    avg_frame_rate: Option<String>,
    field_order: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
    #[serde(default)]
    disposition: FfprobeDisposition,
    tags: Option<FfprobeTags>,
}

/// FFprobe disposition flags.
#[derive(Debug, Default, Deserialize)]
struct FfprobeDisposition {
    #[serde(default)]
    default: u8,
    #[serde(default)]
    forced: u8,
}

/// FFprobe stream tags.
#[derive(Debug, Deserialize)]
struct FfprobeTags {
    language: Option<String>,
}

/// FFprobe format information.
#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probe implementation backed by the ffprobe binary.
pub struct FfprobeProbe;

impl FfprobeProbe {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if ffprobe is installed.
pub fn is_installed() -> bool {
    Command::new("ffprobe")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

impl MediaProbe for FfprobeProbe {
    fn streams(&self, path: &Path) -> Result<MediaStreams> {
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()?;

        if !output.status.success() {
            return Err(crate::Error::ProbeFailed(path.display().to_string()));
        }

        let ffprobe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
        Ok(parse_streams(ffprobe))
    }
}

fn parse_streams(ffprobe: FfprobeOutput) -> MediaStreams {
    let duration_seconds = ffprobe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .map(|d| d as u64)
        .unwrap_or(0);

    let mut video = VideoStream {
        duration: format_duration(duration_seconds),
        duration_seconds,
        ..Default::default()
    };
    let mut audio = Vec::new();

    for stream in &ffprobe.streams {
        match stream.codec_type.as_str() {
            "video" => {
                let codec = stream.codec_name.clone().unwrap_or_default();
                video.micodec = stream
                    .codec_tag_string
                    .clone()
                    .filter(|tag| !tag.is_empty() && tag != "[0][0][0][0]")
                    .unwrap_or_else(|| codec.clone());
                video.codec = codec;
                video.bitrate = stream.bit_rate.clone().unwrap_or_default();
                video.width = stream.width.unwrap_or(0);
                video.height = stream.height.unwrap_or(0);
                video.aspect = stream.display_aspect_ratio.clone().unwrap_or_default();
                video.framerate = stream
                    .avg_frame_rate
                    .as_deref()
                    .map(format_frame_rate)
                    .unwrap_or_default();
                video.scan_type = stream
                    .field_order
                    .clone()
                    .unwrap_or_else(|| "progressive".to_string());
                video.default = stream.disposition.default == 1;
                video.forced = stream.disposition.forced == 1;
            }
            "audio" => {
                let codec = stream.codec_name.clone().unwrap_or_default();
                audio.push(AudioStream {
                    micodec: stream
                        .codec_tag_string
                        .clone()
                        .filter(|tag| !tag.is_empty() && tag != "[0][0][0][0]")
                        .unwrap_or_else(|| codec.clone()),
                    codec,
                    bitrate: stream.bit_rate.clone().unwrap_or_default(),
                    language: stream
                        .tags
                        .as_ref()
                        .and_then(|t| t.language.clone())
                        .unwrap_or_else(|| "unknown".to_string()),
                    channels: stream.channels.unwrap_or(0),
                    sampling_rate: stream.sample_rate.clone().unwrap_or_default(),
                    default: stream.disposition.default == 1,
                    forced: stream.disposition.forced == 1,
                });
            }
            _ => {}
        }
    }

    MediaStreams { video, audio }
}

/// Render a duration in seconds as "Xm Ys".
fn format_duration(seconds: u64) -> String {
    format!("{}m {}s", seconds / 60, seconds % 60)
}

/// Reduce an ffprobe rational frame rate ("24000/1001") to a short decimal.
fn format_frame_rate(rate: &str) -> String {
    let Some((num, den)) = rate.split_once('/') else {
        return rate.to_string();
    };
    let (Ok(num), Ok(den)) = (num.parse::<f64>(), den.parse::<f64>()) else {
        return rate.to_string();
    };
    if den == 0.0 {
        return rate.to_string();
    }

    let value = num / den;
    if (value - value.round()).abs() < 0.001 {
        format!("{}", value.round() as u64)
    } else {
        format!("{value:.3}")
    }
}
