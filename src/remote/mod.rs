pub mod trakt;

use crate::models::Movie;
use crate::utils::error::AppResult;
use async_trait::async_trait;

/// Capability over the remote movie database: the watchlist the user wants
/// to download and the collection they already own. One concrete
/// implementation talks to Trakt; tests substitute literal lists.
///
/// Both reads are idempotent and fully materialized; a transport or API
/// failure aborts the synchronization run, no internal retry.
#[async_trait]
pub trait WatchlistSource {
    async fn fetch_watchlist(&self) -> AppResult<Vec<Movie>>;
    async fn fetch_collected(&self) -> AppResult<Vec<Movie>>;
}
