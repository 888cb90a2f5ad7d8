use crate::config::GoogleConfig;
use crate::domain::model::{PlaceId, ReviewRecord};
use crate::domain::ports::LookupClient;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const GEOCODE_PATH: &str = "/maps/api/geocode/json";
const PLACE_DETAILS_PATH: &str = "/maps/api/place/details/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetailsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    #[serde(default)]
    reviews: Vec<ReviewRecord>,
}

/// Google Maps Geocoding + Place Details over HTTPS.
pub struct GoogleMapsClient {
    http: Client,
    api_key: String,
    base_url: String,
    language: Option<String>,
}

impl GoogleMapsClient {
    pub fn new(config: &GoogleConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("Making API request to: {}", url);

        // 錯誤訊息中的 URL 含有 API key，一律移除
        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| EtlError::ApiError(e.without_url()))?;

        tracing::debug!("API response status: {}", response.status());

        response
            .json::<T>()
            .await
            .map_err(|e| EtlError::ApiError(e.without_url()))
    }
}

/// `OK` and `ZERO_RESULTS` are answers; every other status is a provider fault.
fn check_status(status: &str, error_message: Option<String>) -> Result<()> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        _ => Err(EtlError::ProviderError {
            status: status.to_string(),
            message: error_message.unwrap_or_else(|| "no error message".to_string()),
        }),
    }
}

#[async_trait]
impl LookupClient for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<Option<PlaceId>> {
        let body: GeocodeResponse = self.get_json(GEOCODE_PATH, &[("address", address)]).await?;
        check_status(&body.status, body.error_message)?;

        Ok(body
            .results
            .into_iter()
            .next()
            .and_then(|result| result.place_id)
            .filter(|id| !id.is_empty())
            .map(PlaceId::new))
    }

    async fn fetch_reviews(&self, place_id: &PlaceId) -> Result<Vec<ReviewRecord>> {
        let mut params = vec![("place_id", place_id.as_str()), ("fields", "reviews")];
        if let Some(language) = &self.language {
            params.push(("language", language.as_str()));
        }

        let body: PlaceDetailsResponse = self.get_json(PLACE_DETAILS_PATH, &params).await?;
        check_status(&body.status, body.error_message)?;

        Ok(body.result.map(|details| details.reviews).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer, language: Option<&str>) -> GoogleMapsClient {
        let config = GoogleConfig {
            api_key: "test-key".to_string(),
            base_url: server.base_url(),
            timeout_seconds: 5,
            language: language.map(str::to_string),
        };
        GoogleMapsClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_geocode_returns_first_place_id() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(GEOCODE_PATH)
                    .query_param("address", "100 Main St")
                    .query_param("key", "test-key");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(serde_json::json!({
                        "status": "OK",
                        "results": [{"place_id": "P1"}, {"place_id": "P2"}]
                    }));
            })
            .await;

        let place = client_for(&server, None).geocode("100 Main St").await.unwrap();

        api_mock.assert_async().await;
        assert_eq!(place, Some(PlaceId::new("P1")));
    }

    #[tokio::test]
    async fn test_geocode_zero_results_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(GEOCODE_PATH);
                then.status(200)
                    .json_body(serde_json::json!({"status": "ZERO_RESULTS", "results": []}));
            })
            .await;

        let place = client_for(&server, None).geocode("nowhere").await.unwrap();

        assert_eq!(place, None);
    }

    #[tokio::test]
    async fn test_geocode_denied_is_provider_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(GEOCODE_PATH);
                then.status(200).json_body(serde_json::json!({
                    "status": "REQUEST_DENIED",
                    "error_message": "The provided API key is invalid.",
                    "results": []
                }));
            })
            .await;

        let err = client_for(&server, None).geocode("1 Road").await.unwrap_err();

        match err {
            EtlError::ProviderError { status, message } => {
                assert_eq!(status, "REQUEST_DENIED");
                assert_eq!(message, "The provided API key is invalid.");
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_failure_hides_api_key() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(GEOCODE_PATH);
                then.status(500);
            })
            .await;

        let err = client_for(&server, None).geocode("1 Road").await.unwrap_err();

        assert!(matches!(err, EtlError::ApiError(_)));
        assert!(!err.to_string().contains("test-key"));
    }

    #[tokio::test]
    async fn test_fetch_reviews_parses_text_and_rating() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(PLACE_DETAILS_PATH)
                    .query_param("place_id", "P1")
                    .query_param("fields", "reviews")
                    .query_param("language", "en");
                then.status(200).json_body(serde_json::json!({
                    "status": "OK",
                    "result": {
                        "reviews": [
                            {"author_name": "Ann", "text": "Great school", "rating": 5, "time": 1},
                            {"author_name": "Bob", "rating": 3},
                            {"text": "No stars"}
                        ]
                    }
                }));
            })
            .await;

        let reviews = client_for(&server, Some("en"))
            .fetch_reviews(&PlaceId::new("P1"))
            .await
            .unwrap();

        api_mock.assert_async().await;
        assert_eq!(reviews.len(), 3);
        assert_eq!(reviews[0], ReviewRecord::new("Great school", 5u8));
        assert_eq!(reviews[1].text, None);
        assert_eq!(reviews[2].rating, None);
    }

    #[tokio::test]
    async fn test_fetch_reviews_without_reviews_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(PLACE_DETAILS_PATH);
                then.status(200)
                    .json_body(serde_json::json!({"status": "OK", "result": {}}));
            })
            .await;

        let reviews = client_for(&server, None)
            .fetch_reviews(&PlaceId::new("P9"))
            .await
            .unwrap();

        assert!(reviews.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_reviews_not_found_is_provider_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(PLACE_DETAILS_PATH);
                then.status(200)
                    .json_body(serde_json::json!({"status": "NOT_FOUND"}));
            })
            .await;

        let err = client_for(&server, None)
            .fetch_reviews(&PlaceId::new("gone"))
            .await
            .unwrap_err();

        assert!(matches!(err, EtlError::ProviderError { .. }));
    }
}
