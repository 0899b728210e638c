//! Feature source backed by local GeoJSON files.
//!
//! Lets a run be planned offline: the asset id is treated as a file path,
//! optionally relative to a root directory.

use std::io::ErrorKind;
use std::path::PathBuf;

use geojson::{FeatureCollection, GeoJson};
use tracing::info;

use super::types::{FeatureSource, PlatformError};
use crate::expr::AssetId;

/// Reads feature collections from GeoJSON files.
#[derive(Debug, Clone, Default)]
pub struct LocalFeatureSource {
    root: Option<PathBuf>,
}

impl LocalFeatureSource {
    /// Resolve asset ids as paths relative to the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve asset ids as paths relative to `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn path_for(&self, asset: &AssetId) -> PathBuf {
        match &self.root {
            Some(root) => root.join(asset.as_str()),
            None => PathBuf::from(asset.as_str()),
        }
    }
}

impl FeatureSource for LocalFeatureSource {
    async fn list_features(&self, asset: &AssetId) -> Result<FeatureCollection, PlatformError> {
        let path = self.path_for(asset);

        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::NotFound => format!("file {} not found", path.display()),
                _ => format!("failed to read {}: {}", path.display(), e),
            };
            PlatformError::InputResolution {
                asset: asset.clone(),
                reason,
            }
        })?;

        let collection = text
            .parse::<GeoJson>()
            .and_then(FeatureCollection::try_from)
            .map_err(|e| PlatformError::Decode {
                url: path.display().to_string(),
                reason: e.to_string(),
            })?;

        info!(path = %path.display(), count = collection.features.len(), "Loaded feature collection");
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TWO_FEATURES: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"Area":1},
         "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
        {"type":"Feature","properties":{"Area":2},
         "geometry":{"type":"Polygon","coordinates":[[[2,2],[3,2],[3,3],[2,3],[2,2]]]}}
    ]}"#;

    #[tokio::test]
    async fn test_reads_relative_to_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("aoi.geojson"), TWO_FEATURES).unwrap();

        let source = LocalFeatureSource::with_root(dir.path());
        let collection = source
            .list_features(&AssetId::new("aoi.geojson"))
            .await
            .unwrap();
        assert_eq!(collection.features.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_input_resolution_error() {
        let dir = TempDir::new().unwrap();
        let source = LocalFeatureSource::with_root(dir.path());

        let result = source.list_features(&AssetId::new("missing.geojson")).await;
        assert!(matches!(
            result,
            Err(PlatformError::InputResolution { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_geojson() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.geojson"), "{ not json").unwrap();

        let source = LocalFeatureSource::with_root(dir.path());
        let result = source.list_features(&AssetId::new("bad.geojson")).await;
        assert!(matches!(result, Err(PlatformError::Decode { .. })));
    }
}
