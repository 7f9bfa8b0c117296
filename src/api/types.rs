//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::predict::Prediction;
use crate::weather::WeatherObservation;

/// Request body for the prediction endpoint.
///
/// An absent `city` key deserializes to an empty string so the handler can
/// report it the same way as a blank one.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Free-form city name, resolved through geocoding.
    #[serde(default)]
    pub city: String,
}

/// Prediction response: the rounded estimate, the observation it was scored
/// from, and the ordered advisory strings.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Estimated generation (kW), clamped at zero and rounded to 2 decimals.
    pub prediction: f64,
    /// Snapshot the estimate was computed from.
    pub weather: WeatherSummary,
    /// Advisory strings in render order.
    pub tips: Vec<String>,
}

/// Client-facing view of a weather snapshot.
///
/// Carries the measured fields only; derived values (solar angles, the
/// irradiance estimate, interaction terms) stay internal.
#[derive(Debug, Serialize)]
pub struct WeatherSummary {
    /// Resolved city name (may differ in casing from the request).
    pub city: String,
    /// Latitude of the geocoding match (degrees).
    pub latitude: f64,
    /// Longitude of the geocoding match (degrees).
    pub longitude: f64,
    /// Air temperature (°C).
    pub temperature: f64,
    /// Relative humidity (%).
    pub humidity: f64,
    /// Total cloud cover (%).
    pub cloud_cover: f64,
    /// Wind speed (m/s).
    pub wind_speed: f64,
    /// Human-readable sky description.
    pub description: String,
    /// Snapshot time in the panel's local zone, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
}

impl PredictResponse {
    /// Assembles the public response from the scored snapshot.
    pub fn build(
        observation: &WeatherObservation,
        prediction: &Prediction,
        tips: Vec<String>,
    ) -> Self {
        Self {
            prediction: prediction.rounded(),
            weather: WeatherSummary {
                city: observation.current.city.clone(),
                latitude: observation.current.latitude,
                longitude: observation.current.longitude,
                temperature: observation.current.temperature_c,
                humidity: observation.current.relative_humidity_pct,
                cloud_cover: observation.current.cloud_cover_pct,
                wind_speed: observation.current.wind_speed_ms,
                description: observation.current.description.clone(),
                timestamp: observation.local_timestamp(),
            },
            tips,
        }
    }
}

/// Body for the health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process is serving.
    pub status: &'static str,
}

/// Error response body for non-2xx statuses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::Tz;

    use super::*;
    use crate::weather::CurrentWeather;

    #[test]
    fn response_maps_snapshot_fields() {
        let current = CurrentWeather {
            city: "Graz".to_string(),
            latitude: 47.07,
            longitude: 15.44,
            temperature_c: 18.0,
            relative_humidity_pct: 55.0,
            cloud_cover_pct: 20.0,
            wind_speed_ms: 1.5,
            irradiance_w_m2: Some(700.0),
            description: "Mainly clear".to_string(),
        };
        let observed_at = Tz::Europe__Vienna
            .with_ymd_and_hms(2024, 6, 1, 11, 30, 0)
            .unwrap();
        let observation = WeatherObservation::new(current, observed_at);
        let prediction = Prediction { power_kw: 2.345_9 };

        let response =
            PredictResponse::build(&observation, &prediction, vec!["tip".to_string()]);

        assert_eq!(response.prediction, 2.35);
        assert_eq!(response.weather.city, "Graz");
        assert_eq!(response.weather.latitude, 47.07);
        assert_eq!(response.weather.temperature, 18.0);
        assert_eq!(response.weather.humidity, 55.0);
        assert_eq!(response.weather.cloud_cover, 20.0);
        assert_eq!(response.weather.wind_speed, 1.5);
        assert_eq!(response.weather.description, "Mainly clear");
        assert_eq!(response.weather.timestamp, "2024-06-01 11:30:00");
        assert_eq!(response.tips, vec!["tip".to_string()]);
    }
}
