//! Cache-backed geocoding

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{GeocodeError, Result};
use crate::geometry::Geometry;
use crate::nominatim::{PlaceSearch, first_polygon};

/// Resolves place queries to polygons, caching each answer on disk as
/// `<cache_dir>/<sha256 of the query>.json`
pub struct Geocoder<S> {
    search: S,
    cache_dir: PathBuf,
}

impl<S: PlaceSearch> Geocoder<S> {
    pub fn new(search: S, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            search,
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache file for `query`
    pub fn cache_path(&self, query: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", query_hash(query)))
    }

    /// Polygon or MultiPolygon for one query
    pub async fn geocode(&self, query: &str) -> Result<Geometry> {
        let path = self.cache_path(query);

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                log::debug!("Geocode cache hit for '{query}'");
                return Ok(serde_json::from_slice(&bytes)?);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(GeocodeError::Io { path, source }),
        }

        let results = self.search.search(query).await?;
        if results.is_empty() {
            return Err(GeocodeError::NotGeocoded(format!(
                "Zero results from Nominatim for query '{query}'."
            )));
        }

        let geometry = first_polygon(results).ok_or_else(|| {
            GeocodeError::NotGeocoded(format!("No polygon found for query '{query}'."))
        })?;

        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|source| GeocodeError::Io {
                path: self.cache_dir.clone(),
                source,
            })?;
        tokio::fs::write(&path, serde_json::to_vec(&geometry)?)
            .await
            .map_err(|source| GeocodeError::Io {
                path: path.clone(),
                source,
            })?;

        log::info!("Geocoded '{query}', cached at {}", path.display());
        Ok(geometry)
    }

    /// Union of the geometries of every query
    pub async fn geocode_many<Q: AsRef<str>>(&self, queries: &[Q]) -> Result<Geometry> {
        let mut geometries = Vec::with_capacity(queries.len());
        for query in queries {
            geometries.push(self.geocode(query.as_ref()).await?);
        }

        Geometry::union(geometries)
            .ok_or_else(|| GeocodeError::NotGeocoded("no query given".to_string()))
    }
}

fn query_hash(query: &str) -> String {
    hex::encode(Sha256::digest(query.as_bytes()))
}
