//! Weather tile requests
//!
//! The terminal cannot draw raster tiles, so the map view asks the tile
//! proxy for the tile under the map center whenever an overlay is switched
//! on and shows whether that overlay has data there.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::engine::MapError;
use super::layers::{TileCoord, WeatherOverlay};

const TILE_TIMEOUT: Duration = Duration::from_secs(5);

/// Availability of an overlay tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileStatus {
    Loading,
    /// Tile served; size in bytes
    Loaded(usize),
    Failed(String),
}

/// Client for `/api/map_tile/{layer}/{z}/{x}/{y}/`
#[derive(Debug, Clone)]
pub struct TileClient {
    client: Client,
    base_url: String,
}

impl TileClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn tile_url(&self, overlay: WeatherOverlay, tile: TileCoord) -> String {
        format!("{}{}", self.base_url, overlay.tile_path(tile))
    }

    /// Downloads one tile, returning its bytes
    pub async fn fetch_tile(
        &self,
        overlay: WeatherOverlay,
        tile: TileCoord,
    ) -> Result<Vec<u8>, MapError> {
        let url = self.tile_url(overlay, tile);
        debug!(%url, "fetching tile");

        let response = self.client.get(&url).timeout(TILE_TIMEOUT).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MapError::TileStatus(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_url() {
        let client = TileClient::new("http://localhost:8000/");
        let url = client.tile_url(WeatherOverlay::Wind, TileCoord { z: 7, x: 35, y: 46 });
        assert_eq!(url, "http://localhost:8000/api/map_tile/wind_new/7/35/46/");
    }

    #[tokio::test]
    async fn test_unreachable_tile_server_is_error() {
        let client = TileClient::new("http://127.0.0.1:9");
        let result = client
            .fetch_tile(WeatherOverlay::Clouds, TileCoord { z: 1, x: 0, y: 0 })
            .await;
        assert!(matches!(result, Err(MapError::TileRequest(_))));
    }
}
