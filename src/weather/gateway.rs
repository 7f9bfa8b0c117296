//! Open-Meteo weather gateway.
//!
//! Resolves a free-form city name through the geocoding endpoint, then pulls
//! the current-conditions block from the forecast endpoint. Base URLs are
//! injectable so tests can point both calls at a local server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::{CurrentWeather, wmo_description};

/// Production forecast endpoint.
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com";
/// Production geocoding endpoint.
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";
/// Request timeout applied to both endpoints.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Variables requested from the forecast `current` block.
const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,cloud_cover,wind_speed_10m,weather_code,shortwave_radiation";

/// Weather gateway error types.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no location found for city '{0}'")]
    CityNotFound(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} endpoint returned status {status}")]
    Status { endpoint: &'static str, status: u16 },
}

/// Source of current weather conditions for a named city.
///
/// The prediction pipeline only depends on this trait, so tests can swap in
/// a canned implementation without any network traffic.
#[async_trait]
pub trait WeatherGateway: Send + Sync {
    async fn fetch_current_weather(&self, city: &str) -> Result<CurrentWeather, GatewayError>;
}

/// [`WeatherGateway`] backed by the public Open-Meteo HTTP API.
#[derive(Clone)]
pub struct OpenMeteoGateway {
    client: Client,
    forecast_url: String,
    geocoding_url: String,
}

impl OpenMeteoGateway {
    /// Creates a gateway against custom base URLs.
    pub fn new(
        forecast_url: impl Into<String>,
        geocoding_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            forecast_url: forecast_url.into(),
            geocoding_url: geocoding_url.into(),
        })
    }

    /// Creates a gateway against the production Open-Meteo endpoints.
    pub fn with_defaults() -> Result<Self, GatewayError> {
        Self::new(DEFAULT_FORECAST_URL, DEFAULT_GEOCODING_URL, DEFAULT_TIMEOUT)
    }

    /// Resolves a city name to its best geocoding match.
    async fn geocode(&self, city: &str) -> Result<GeoMatch, GatewayError> {
        let url = format!("{}/v1/search", self.geocoding_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("name", city),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::Status {
                endpoint: "geocoding",
                status: response.status().as_u16(),
            });
        }

        let payload: GeocodingResponse = response.json().await?;
        payload
            .results
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| GatewayError::CityNotFound(city.to_string()))
    }
}

#[async_trait]
impl WeatherGateway for OpenMeteoGateway {
    async fn fetch_current_weather(&self, city: &str) -> Result<CurrentWeather, GatewayError> {
        let location = self.geocode(city).await?;
        debug!(
            city = %location.name,
            latitude = location.latitude,
            longitude = location.longitude,
            "geocoded city",
        );

        let url = format!("{}/v1/forecast", self.forecast_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
            ])
            .query(&[("current", CURRENT_FIELDS), ("wind_speed_unit", "ms")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::Status {
                endpoint: "forecast",
                status: response.status().as_u16(),
            });
        }

        let payload: ForecastResponse = response.json().await?;
        let current = payload.current;

        Ok(CurrentWeather {
            city: location.name,
            latitude: location.latitude,
            longitude: location.longitude,
            temperature_c: current.temperature_2m,
            relative_humidity_pct: current.relative_humidity_2m,
            cloud_cover_pct: current.cloud_cover,
            wind_speed_ms: current.wind_speed_10m,
            irradiance_w_m2: current.shortwave_radiation,
            description: wmo_description(current.weather_code).to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    // Open-Meteo omits the key entirely when nothing matched.
    #[serde(default)]
    results: Option<Vec<GeoMatch>>,
}

#[derive(Debug, Deserialize)]
struct GeoMatch {
    name: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    cloud_cover: f64,
    wind_speed_10m: f64,
    weather_code: u8,
    shortwave_radiation: Option<f64>,
}
