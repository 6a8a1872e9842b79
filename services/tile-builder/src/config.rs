//! Region configuration loading from JSON files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use tiler_common::{BoundingBox, TilerError, TilerResult, ZoomRange};

/// One region to build: source service, bounds, zoom span, output path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    #[serde(rename = "MAP_URL")]
    pub map_url: String,
    pub name: String,
    pub lat_min: f64,
    pub long_min: f64,
    pub lat_max: f64,
    pub long_max: f64,
    pub zoom_min: u32,
    pub zoom_max: u32,
    pub output_file: PathBuf,
}

impl RegionConfig {
    /// Load and validate a region configuration from a JSON file.
    pub fn load(path: &Path) -> TilerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TilerError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut config: RegionConfig = serde_json::from_str(&content).map_err(|e| {
            TilerError::Config(format!("invalid JSON in {}: {}", path.display(), e))
        })?;

        while config.map_url.ends_with('/') {
            config.map_url.pop();
        }

        config.validate()?;
        debug!(name = %config.name, path = %path.display(), "Loaded region config");
        Ok(config)
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.long_min, self.lat_min, self.long_max, self.lat_max)
    }

    pub fn zoom_range(&self) -> ZoomRange {
        ZoomRange::new(self.zoom_min, self.zoom_max)
    }

    /// Check bounds ordering, the mercator latitude domain, and the zoom
    /// range before any work starts.
    pub fn validate(&self) -> TilerResult<()> {
        if self.map_url.is_empty() {
            return Err(TilerError::Config("MAP_URL must not be empty".to_string()));
        }
        if self.name.is_empty() {
            return Err(TilerError::Config("name must not be empty".to_string()));
        }
        self.bounds().validate()?;
        self.zoom_range().validate()?;
        Ok(())
    }
}

/// Write the three sample configurations into `dir`, returning their
/// paths.
pub fn write_example_configs(dir: &Path) -> TilerResult<Vec<PathBuf>> {
    let examples = [
        RegionConfig {
            map_url:
                "https://services.arcgisonline.com/arcgis/rest/services/World_Imagery/MapServer"
                    .to_string(),
            name: "World".to_string(),
            lat_min: -85.0511,
            long_min: -180.0,
            lat_max: 85.0511,
            long_max: 180.0,
            zoom_min: 0,
            zoom_max: 6,
            output_file: PathBuf::from("world_with_mgrs_zones.mbtiles"),
        },
        RegionConfig {
            map_url:
                "https://services.arcgisonline.com/arcgis/rest/services/World_Imagery/MapServer"
                    .to_string(),
            name: "Greece".to_string(),
            lat_min: 34.8,
            long_min: 19.3,
            lat_max: 41.7,
            long_max: 29.6,
            zoom_min: 7,
            zoom_max: 13,
            output_file: PathBuf::from("greece_with_mgrs_zones.mbtiles"),
        },
        RegionConfig {
            map_url:
                "https://services.arcgisonline.com/arcgis/rest/services/World_Imagery/MapServer"
                    .to_string(),
            name: "Attiki".to_string(),
            lat_min: 37.7,
            long_min: 23.3,
            lat_max: 38.3,
            long_max: 24.1,
            zoom_min: 14,
            zoom_max: 18,
            output_file: PathBuf::from("attiki_with_mgrs_zones.mbtiles"),
        },
    ];

    let mut paths = Vec::new();
    for (i, example) in examples.iter().enumerate() {
        let path = dir.join(format!("config_example_{}.json", i + 1));
        let json = serde_json::to_string_pretty(example)
            .map_err(|e| TilerError::Config(e.to_string()))?;
        std::fs::write(&path, json).map_err(|e| {
            TilerError::Config(format!("failed to write {}: {}", path.display(), e))
        })?;
        paths.push(path);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("region.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{
                "MAP_URL": "https://tiles.example.com/MapServer/",
                "name": "Attiki",
                "lat_min": 37.7,
                "long_min": 23.3,
                "lat_max": 38.3,
                "long_max": 24.1,
                "zoom_min": 12,
                "zoom_max": 14,
                "output_file": "attiki.mbtiles"
            }"#,
        );

        let config = RegionConfig::load(&path).unwrap();
        assert_eq!(config.name, "Attiki");
        // Trailing slash is trimmed
        assert_eq!(config.map_url, "https://tiles.example.com/MapServer");
        assert_eq!(config.zoom_range(), ZoomRange::new(12, 14));
        assert_eq!(config.bounds(), BoundingBox::new(23.3, 37.7, 24.1, 38.3));
    }

    #[test]
    fn test_missing_field_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"name": "broken"}"#);
        assert!(matches!(
            RegionConfig::load(&path),
            Err(TilerError::Config(_))
        ));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{
                "MAP_URL": "https://tiles.example.com",
                "name": "bad",
                "lat_min": 38.3,
                "long_min": 23.3,
                "lat_max": 37.7,
                "long_max": 24.1,
                "zoom_min": 12,
                "zoom_max": 14,
                "output_file": "bad.mbtiles"
            }"#,
        );
        assert!(matches!(
            RegionConfig::load(&path),
            Err(TilerError::InvalidBounds(_))
        ));
    }

    #[test]
    fn test_inverted_zoom_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{
                "MAP_URL": "https://tiles.example.com",
                "name": "bad",
                "lat_min": 37.7,
                "long_min": 23.3,
                "lat_max": 38.3,
                "long_max": 24.1,
                "zoom_min": 14,
                "zoom_max": 12,
                "output_file": "bad.mbtiles"
            }"#,
        );
        assert!(matches!(
            RegionConfig::load(&path),
            Err(TilerError::InvalidZoom(_))
        ));
    }

    #[test]
    fn test_example_configs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_example_configs(dir.path()).unwrap();
        assert_eq!(paths.len(), 3);
        for path in paths {
            let config = RegionConfig::load(&path).unwrap();
            assert!(config.validate().is_ok());
        }
    }
}
