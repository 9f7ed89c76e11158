//! Place-name to polygon lookup backed by Nominatim and an on-disk cache

pub mod error;
pub mod geocoder;
pub mod geometry;
pub mod nominatim;

pub use error::{GeocodeError, Result};
pub use geocoder::Geocoder;
pub use geometry::Geometry;
pub use nominatim::{NominatimClient, PlaceSearch, SearchResult, first_polygon};

use common::config::GeocodeConfig;

/// Geocoder talking to the configured Nominatim endpoint
pub fn nominatim_geocoder(config: &GeocodeConfig) -> Result<Geocoder<NominatimClient>> {
    Ok(Geocoder::new(
        NominatimClient::new(config)?,
        config.cache_dir.clone(),
    ))
}

/// Geometry of one query, or the union of several
pub async fn geocode_to_geometry<Q: AsRef<str>>(
    config: &GeocodeConfig,
    queries: &[Q],
) -> Result<Geometry> {
    nominatim_geocoder(config)?.geocode_many(queries).await
}
