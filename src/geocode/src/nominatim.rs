//! Nominatim search client

use async_trait::async_trait;
use common::config::GeocodeConfig;
use serde::Deserialize;

use crate::error::{GeocodeError, Result};
use crate::geometry::Geometry;

/// One entry of a search response, reduced to what result selection needs
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub importance: Option<f64>,
    #[serde(default)]
    pub geojson: Option<serde_json::Value>,
}

/// Free-text place search
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// HTTP client for a Nominatim instance
pub struct NominatimClient {
    endpoint: String,
    http: reqwest::Client,
}

impl NominatimClient {
    pub fn new(config: &GeocodeConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PlaceSearch for NominatimClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = format!("{}/search", self.endpoint);
        log::debug!("Querying {url} for '{query}'");

        let resp = self
            .http
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("polygon_geojson", "1")])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(GeocodeError::Api { status, message });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// First (Multi)Polygon among `results`, most important first
pub fn first_polygon(mut results: Vec<SearchResult>) -> Option<Geometry> {
    results.sort_by(|a, b| {
        let a = a.importance.unwrap_or(f64::NEG_INFINITY);
        let b = b.importance.unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });

    results.into_iter().find_map(|result| {
        let geojson = result.geojson?;
        let kind = geojson.get("type")?.as_str()?.to_string();
        if !Geometry::POLYGONAL_TYPES.contains(&kind.as_str()) {
            return None;
        }

        match serde_json::from_value(geojson) {
            Ok(geometry) => Some(geometry),
            Err(e) => {
                log::warn!("Skipping malformed {kind} for '{}': {e}", result.display_name);
                None
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(name: &str, importance: f64, geojson: serde_json::Value) -> SearchResult {
        SearchResult {
            display_name: name.to_string(),
            importance: Some(importance),
            geojson: Some(geojson),
        }
    }

    fn polygon(x: f64) -> serde_json::Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[x, 0.0], [x + 1.0, 0.0], [x + 1.0, 1.0], [x, 0.0]]]
        })
    }

    #[test]
    fn test_most_important_polygon_wins() {
        let results = vec![
            result("minor", 0.2, polygon(1.0)),
            result("point", 0.9, json!({"type": "Point", "coordinates": [0.0, 0.0]})),
            result("major", 0.7, polygon(7.0)),
        ];

        let geometry = first_polygon(results).unwrap();
        assert_eq!(geometry, serde_json::from_value(polygon(7.0)).unwrap());
    }

    #[test]
    fn test_no_polygon() {
        let results = vec![
            result("point", 0.9, json!({"type": "Point", "coordinates": [0.0, 0.0]})),
            SearchResult {
                display_name: "bare".to_string(),
                importance: None,
                geojson: None,
            },
        ];
        assert!(first_polygon(results).is_none());
        assert!(first_polygon(vec![]).is_none());
    }

    #[test]
    fn test_malformed_polygon_is_skipped() {
        let results = vec![
            result("broken", 0.9, json!({"type": "Polygon", "coordinates": "nope"})),
            result("valid", 0.1, polygon(2.0)),
        ];

        let geometry = first_polygon(results).unwrap();
        assert_eq!(geometry, serde_json::from_value(polygon(2.0)).unwrap());
    }

    #[test]
    fn test_parses_search_response() {
        let body = r#"[{"place_id":1,"display_name":"Wrocław","importance":0.74,
            "geojson":{"type":"MultiPolygon","coordinates":[[[[17.0,51.1],[17.1,51.1],[17.0,51.1]]]]}}]"#;
        let results: Vec<SearchResult> = serde_json::from_str(body).unwrap();

        assert_eq!(results[0].display_name, "Wrocław");
        assert!(matches!(
            first_polygon(results),
            Some(Geometry::MultiPolygon { .. })
        ));
    }

    #[test]
    fn test_client_trims_endpoint() {
        let config = GeocodeConfig {
            endpoint: "http://localhost:8080/".to_string(),
            ..Default::default()
        };
        let client = NominatimClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080");
    }
}
