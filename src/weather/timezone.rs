//! IANA timezone resolution for a coordinate pair.
//!
//! Local hour drives both the solar-position features and the peak-hour
//! advice, so a snapshot must carry the zone the panels actually sit in.
//! There is deliberately no UTC fallback: a resolution failure is an error,
//! not a silently wrong clock.

use std::time::Duration;

use async_trait::async_trait;
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::gateway::{DEFAULT_FORECAST_URL, DEFAULT_TIMEOUT};

/// Timezone resolution error types.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("timezone endpoint returned status {0}")]
    Status(u16),

    #[error("upstream reported unknown timezone '{0}'")]
    UnknownZone(String),
}

/// Maps a coordinate pair to its IANA timezone.
#[async_trait]
pub trait TimezoneResolver: Send + Sync {
    async fn resolve(&self, latitude: f64, longitude: f64) -> Result<Tz, LocationError>;
}

/// [`TimezoneResolver`] that asks Open-Meteo's forecast endpoint with
/// `timezone=auto` and parses the zone name it echoes back.
#[derive(Clone)]
pub struct OpenMeteoTimezoneResolver {
    client: Client,
    base_url: String,
}

impl OpenMeteoTimezoneResolver {
    /// Creates a resolver against a custom base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LocationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Creates a resolver against the production Open-Meteo endpoint.
    pub fn with_defaults() -> Result<Self, LocationError> {
        Self::new(DEFAULT_FORECAST_URL, DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl TimezoneResolver for OpenMeteoTimezoneResolver {
    async fn resolve(&self, latitude: f64, longitude: f64) -> Result<Tz, LocationError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
            ])
            .query(&[("timezone", "auto")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LocationError::Status(response.status().as_u16()));
        }

        let payload: TimezoneResponse = response.json().await?;
        let zone = payload
            .timezone
            .parse::<Tz>()
            .map_err(|_| LocationError::UnknownZone(payload.timezone.clone()))?;
        debug!(latitude, longitude, zone = %zone, "resolved timezone");
        Ok(zone)
    }
}

#[derive(Debug, Deserialize)]
struct TimezoneResponse {
    timezone: String,
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn resolves_reported_zone() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("timezone".into(), "auto".into()),
                Matcher::UrlEncoded("latitude".into(), "48.21".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"timezone": "Europe/Vienna", "utc_offset_seconds": 7200}).to_string())
            .create_async()
            .await;

        let resolver =
            OpenMeteoTimezoneResolver::new(server.url(), Duration::from_secs(2)).unwrap();
        let zone = resolver.resolve(48.21, 16.37).await.unwrap();

        assert_eq!(zone, Tz::Europe__Vienna);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unknown_zone_name_is_an_error_not_utc() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"timezone": "Mars/Olympus_Mons"}).to_string())
            .create_async()
            .await;

        let resolver =
            OpenMeteoTimezoneResolver::new(server.url(), Duration::from_secs(2)).unwrap();
        let err = resolver.resolve(0.0, 0.0).await.unwrap_err();

        assert!(matches!(err, LocationError::UnknownZone(zone) if zone == "Mars/Olympus_Mons"));
    }

    #[tokio::test]
    async fn server_error_is_status_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let resolver =
            OpenMeteoTimezoneResolver::new(server.url(), Duration::from_secs(2)).unwrap();
        let err = resolver.resolve(48.21, 16.37).await.unwrap_err();

        assert!(matches!(err, LocationError::Status(503)));
    }

    #[tokio::test]
    async fn missing_timezone_key_is_a_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"latitude": 48.21}).to_string())
            .create_async()
            .await;

        let resolver =
            OpenMeteoTimezoneResolver::new(server.url(), Duration::from_secs(2)).unwrap();
        let err = resolver.resolve(48.21, 16.37).await.unwrap_err();

        assert!(matches!(err, LocationError::Http(_)));
    }
}
