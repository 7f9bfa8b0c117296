//! Weather observation types and the external collaborators that produce
//! them.
//!
//! [`gateway`] fetches current conditions for a city; [`timezone`] resolves
//! coordinates to an IANA zone so timestamps (and therefore solar geometry)
//! are local, never UTC-by-accident.

pub mod gateway;
pub mod timezone;

use chrono::{DateTime, Timelike};
use chrono_tz::Tz;

use crate::features::FeatureInputs;
use crate::solar::SolarPosition;

/// Current conditions for a resolved city, as supplied by a gateway.
///
/// Carries no timestamp; an observation exists only after the timezone
/// has been resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    /// Resolved city name.
    pub city: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Air temperature (°C).
    pub temperature_c: f64,
    /// Relative humidity (%).
    pub relative_humidity_pct: f64,
    /// Cloud cover (%, 0..=100).
    pub cloud_cover_pct: f64,
    /// Wind speed (m/s).
    pub wind_speed_ms: f64,
    /// Measured irradiance (W/m²) when the provider reports it.
    pub irradiance_w_m2: Option<f64>,
    /// Human-readable sky description.
    pub description: String,
}

/// A timezone-resolved weather snapshot; immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    /// Conditions as fetched.
    pub current: CurrentWeather,
    /// Local civil time at the observed location.
    pub observed_at: DateTime<Tz>,
}

impl WeatherObservation {
    /// Pairs fetched conditions with their resolved local time.
    pub fn new(current: CurrentWeather, observed_at: DateTime<Tz>) -> Self {
        Self {
            current,
            observed_at,
        }
    }

    /// Solar position for the observation's local time.
    pub fn position(&self) -> SolarPosition {
        SolarPosition::from_local_time(&self.observed_at)
    }

    /// Measurements in feature-contract form, geometry included.
    pub fn feature_inputs(&self) -> FeatureInputs {
        let position = self.position();
        FeatureInputs {
            temperature_c: self.current.temperature_c,
            relative_humidity_pct: self.current.relative_humidity_pct,
            cloud_cover_pct: self.current.cloud_cover_pct,
            irradiance_w_m2: self.current.irradiance_w_m2,
            wind_speed_ms: self.current.wind_speed_ms,
            zenith_deg: position.zenith_deg,
            azimuth_deg: position.azimuth_deg,
        }
    }

    /// Local wall-clock hour, 0..=23.
    pub fn local_hour(&self) -> u32 {
        self.observed_at.hour()
    }

    /// Local timestamp formatted for responses and advisories.
    pub fn local_timestamp(&self) -> String {
        self.observed_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Maps a WMO weather code to a short sky description.
pub fn wmo_description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 | 77 => "Snowfall",
        80 | 81 | 82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown conditions",
    }
}
