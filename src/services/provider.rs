//! Metadata provider port.

use crate::models::metadata::{SeasonMetadata, ShowGeneralInfo};
use crate::Result;
use async_trait::async_trait;
use std::path::Path;

/// Remote metadata source for shows and seasons.
///
/// The pipeline depends only on this trait; tests use an in-memory fake
/// with no network dependency.
#[async_trait]
pub trait MetadataProvider {
    /// Fetch general information about a show.
    async fn fetch_show_general_info(&self, show_id: i64) -> Result<ShowGeneralInfo>;

    /// Fetch metadata for one season of a show.
    async fn fetch_season(&self, show_id: i64, season: u32) -> Result<SeasonMetadata>;

    /// Download a still image from the provider's CDN to `dest`.
    async fn download_still(&self, url: &str, dest: &Path) -> Result<()>;
}
