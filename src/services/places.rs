//! Geocoding and place search: Google Geocoding + Places Text Search.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ServiceError;

const PROVIDER: &str = "google_maps";
const DEFAULT_API_BASE: &str = "https://maps.googleapis.com/maps/api";
const GEOCODE_PATH: &str = "geocode/json";
const TEXT_SEARCH_PATH: &str = "place/textsearch/json";

/// A geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// A single place search hit. Every field is optional upstream.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Geocoding + category search backend.
#[async_trait]
pub trait PlacesClient: Send + Sync {
    /// Resolve free text to the first candidate point, `None` if nothing matched.
    async fn geocode(&self, location: &str) -> Result<Option<LatLng>, ServiceError>;

    /// Search `query` around `center` within `radius_m` meters, in provider rank order.
    async fn search(
        &self,
        query: &str,
        center: LatLng,
        radius_m: u32,
    ) -> Result<Vec<Place>, ServiceError>;
}

/// Google Maps web-service client.
pub struct GoogleMapsClient {
    client: reqwest::Client,
    api_key: SecretString,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<Place>,
}

/// Map a Google web-service status to an error, treating `ZERO_RESULTS` as empty.
fn check_status(status: &str) -> Result<(), ServiceError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(ServiceError::ProviderStatus {
            provider: PROVIDER.to_string(),
            status: other.to_string(),
        }),
    }
}

impl GoogleMapsClient {
    pub fn new(client: reqwest::Client, api_key: SecretString) -> Self {
        Self {
            client,
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API root (no trailing slash).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Errors never carry the request URL: it contains the key.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .get(format!("{}/{}", self.api_base, path))
            .query(params)
            .query(&[("key", self.api_key.expose_secret())])
            .send()
            .await
            .map_err(|e| ServiceError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.without_url().to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::HttpStatus {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        resp.json().await.map_err(|e| ServiceError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: e.without_url().to_string(),
        })
    }
}

#[async_trait]
impl PlacesClient for GoogleMapsClient {
    async fn geocode(&self, location: &str) -> Result<Option<LatLng>, ServiceError> {
        let resp: GeocodeResponse = self
            .get_json(GEOCODE_PATH, &[("address", location.to_string())])
            .await?;
        check_status(&resp.status)?;
        Ok(resp.results.first().map(|r| r.geometry.location))
    }

    async fn search(
        &self,
        query: &str,
        center: LatLng,
        radius_m: u32,
    ) -> Result<Vec<Place>, ServiceError> {
        let resp: TextSearchResponse = self
            .get_json(
                TEXT_SEARCH_PATH,
                &[
                    ("query", query.to_string()),
                    ("location", center.to_string()),
                    ("radius", radius_m.to_string()),
                ],
            )
            .await?;
        check_status(&resp.status)?;
        tracing::debug!(query, results = resp.results.len(), "Place search complete");
        Ok(resp.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latlng_formats_as_query_param() {
        let point = LatLng {
            lat: 40.7128,
            lng: -74.006,
        };
        assert_eq!(point.to_string(), "40.7128,-74.006");
    }

    #[test]
    fn zero_results_is_not_an_error() {
        assert!(check_status("OK").is_ok());
        assert!(check_status("ZERO_RESULTS").is_ok());
        let err = check_status("REQUEST_DENIED").unwrap_err();
        assert!(err.to_string().contains("REQUEST_DENIED"));
    }

    #[test]
    fn geocode_response_takes_first_candidate() {
        let raw = r#"{
            "status": "OK",
            "results": [
                {"geometry": {"location": {"lat": 1.5, "lng": 2.5}}, "formatted_address": "A"},
                {"geometry": {"location": {"lat": 9.0, "lng": 9.0}}}
            ]
        }"#;
        let resp: GeocodeResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.results[0].geometry.location, LatLng { lat: 1.5, lng: 2.5 });
    }

    #[test]
    fn empty_geocode_response_parses_without_results() {
        let resp: GeocodeResponse = serde_json::from_str(r#"{"status": "ZERO_RESULTS"}"#).unwrap();
        assert!(resp.results.is_empty());
    }

    #[test]
    fn place_fields_are_optional() {
        let raw = r#"{
            "status": "OK",
            "results": [
                {"name": "Joe's", "formatted_address": "1 Main St", "rating": 4.6},
                {"name": "No Rating Diner"}
            ]
        }"#;
        let resp: TextSearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.results[0].rating, Some(4.6));
        assert_eq!(resp.results[1].rating, None);
        assert_eq!(resp.results[1].formatted_address, None);
    }

    #[tokio::test]
    async fn transport_error_does_not_leak_api_key() {
        // Nothing listens on port 1.
        let client = GoogleMapsClient::new(
            reqwest::Client::new(),
            SecretString::from("AIzaSECRETKEY123"),
        )
        .with_api_base("http://127.0.0.1:1/maps/api");

        let err = client.geocode("Austin").await.unwrap_err();
        assert!(matches!(err, ServiceError::RequestFailed { .. }));
        assert!(!err.to_string().contains("AIzaSECRETKEY123"));
    }
}
