//! Solar geometry estimation from local civil time.
//!
//! The geometry model is deliberately linear: azimuth sweeps 15°/hour around
//! solar noon and zenith follows a tent profile peaking at 90° at noon. It is
//! an empirical proxy, not an ephemeris model, and the training data was
//! produced against the same proxy, so the two must stay in lockstep.

use chrono::{DateTime, TimeZone, Timelike};

/// Azimuth sweep rate in degrees per hour.
pub const AZIMUTH_DEG_PER_HOUR: f64 = 15.0;

/// Zenith tent slope in degrees per hour (90° over 12 hours).
pub const ZENITH_DEG_PER_HOUR: f64 = 90.0 / 12.0;

/// Zenith threshold below which the sky counts as daylight.
pub const DAYLIGHT_ZENITH_LIMIT_DEG: f64 = 85.0;

/// Clear-sky solar-noon reference irradiance (W/m²).
pub const CLEAR_SKY_IRRADIANCE_W_M2: f64 = 1000.0;

/// Fraction of irradiance removed by full cloud cover.
pub const MAX_CLOUD_ATTENUATION: f64 = 0.7;

/// Sun position derived from local time-of-day.
///
/// Computed fresh for every observation and never persisted; both the
/// training dataset and the live path rely on the same formulas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    /// Horizontal angle in degrees, signed, zero at solar noon.
    pub azimuth_deg: f64,
    /// Tent-profile zenith angle in degrees, clamped to >= 0.
    pub zenith_deg: f64,
}

impl SolarPosition {
    /// Computes the position for a decimal local hour `h = hour + minute/60`.
    pub fn from_decimal_hour(h: f64) -> Self {
        let azimuth_deg = (h - 12.0) * AZIMUTH_DEG_PER_HOUR;
        let zenith_deg = (90.0 - ZENITH_DEG_PER_HOUR * (12.0 - h).abs()).max(0.0);
        Self {
            azimuth_deg,
            zenith_deg,
        }
    }

    /// Computes the position for a timezone-resolved local timestamp.
    ///
    /// Seconds are ignored; the contract works in whole minutes.
    pub fn from_local_time<T: TimeZone>(t: &DateTime<T>) -> Self {
        Self::from_decimal_hour(decimal_hour(t))
    }

    /// Whether the position counts as daylight (`zenith < 85`).
    pub fn is_daylight(&self) -> bool {
        self.zenith_deg < DAYLIGHT_ZENITH_LIMIT_DEG
    }
}

/// Converts a local timestamp to a decimal hour.
pub fn decimal_hour<T: TimeZone>(t: &DateTime<T>) -> f64 {
    f64::from(t.hour()) + f64::from(t.minute()) / 60.0
}

/// Estimates surface irradiance (W/m²) from cloud cover and zenith angle.
///
/// Used only when the observation carries no measured irradiance. Cloud
/// cover attenuates linearly up to [`MAX_CLOUD_ATTENUATION`]; the result is
/// clamped to >= 0 so over-range cloud values cannot produce a negative
/// estimate.
///
/// # Arguments
///
/// * `cloud_cover_pct` - Cloud cover percentage, nominally 0..=100
/// * `zenith_deg` - Zenith angle from [`SolarPosition`]
pub fn estimate_irradiance(cloud_cover_pct: f64, zenith_deg: f64) -> f64 {
    let attenuation = 1.0 - MAX_CLOUD_ATTENUATION * cloud_cover_pct / 100.0;
    (CLEAR_SKY_IRRADIANCE_W_M2 * attenuation * zenith_deg.to_radians().cos()).max(0.0)
}
