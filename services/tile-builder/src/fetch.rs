//! Tile retrieval with retry and failure classification.
//!
//! Transient failures (timeouts, connection errors, 5xx) are retried a
//! bounded number of times with doubling backoff; 4xx and undecodable
//! bodies fail the tile immediately.

use std::time::Duration;

use image::RgbaImage;
use reqwest::{header, Client, StatusCode};
use tracing::warn;

use tiler_common::{TileCoord, TilerError, TilerResult};

/// Total attempts per tile, the first included.
pub const MAX_ATTEMPTS: u32 = 3;
/// Backoff before the second attempt; doubles per retry.
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Fetches tiles from an XYZ REST service. The base URL is fixed at
/// construction and never changes for the fetcher's lifetime.
pub struct TileFetcher {
    client: Client,
    base_url: String,
}

impl TileFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> TilerResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TilerError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Request URL for a tile; the service addresses rows before columns.
    pub fn tile_url(&self, coord: &TileCoord) -> String {
        format!(
            "{}/tile/{}/{}/{}",
            self.base_url, coord.z, coord.y, coord.x
        )
    }

    /// Fetch and decode one tile, retrying transient failures.
    pub async fn fetch(&self, coord: &TileCoord) -> TilerResult<RgbaImage> {
        let mut delay = INITIAL_BACKOFF;
        let mut attempt = 1;

        loop {
            match self.fetch_once(coord).await {
                Ok(image) => return Ok(image),
                Err(err) if err.is_transient() && attempt < MAX_ATTEMPTS => {
                    warn!(
                        tile = %coord,
                        attempt = attempt,
                        error = %err,
                        "Tile fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_once(&self, coord: &TileCoord) -> TilerResult<RgbaImage> {
        let url = self.tile_url(coord);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if status.is_server_error() {
            return Err(TilerError::FetchTransient(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(TilerError::FetchPermanent(format!("HTTP {}", status)));
        }
        if status == StatusCode::NO_CONTENT {
            return Err(TilerError::FetchPermanent("empty tile response".to_string()));
        }

        if let Some(content_type) = response.headers().get(header::CONTENT_TYPE) {
            let value = content_type.to_str().unwrap_or("");
            if !value.starts_with("image/") {
                return Err(TilerError::FetchPermanent(format!(
                    "unexpected content type: {}",
                    value
                )));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TilerError::FetchTransient(format!("body read failed: {}", e)))?;

        let image = image::load_from_memory(&body)
            .map_err(|e| TilerError::FetchPermanent(format!("undecodable image: {}", e)))?;

        Ok(image.to_rgba8())
    }
}

fn classify_request_error(err: reqwest::Error) -> TilerError {
    if err.is_timeout() || err.is_connect() {
        TilerError::FetchTransient(err.to_string())
    } else if err.is_builder() {
        TilerError::FetchPermanent(err.to_string())
    } else {
        // Resets and other mid-request transport errors are worth a retry
        TilerError::FetchTransient(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_url_format() {
        let fetcher =
            TileFetcher::new("https://tiles.example.com/MapServer/", Duration::from_secs(5))
                .unwrap();
        let coord = TileCoord::new(12, 2317, 1580);
        assert_eq!(
            fetcher.tile_url(&coord),
            "https://tiles.example.com/MapServer/tile/12/1580/2317"
        );
    }
}
