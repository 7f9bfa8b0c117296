//! Advisory text generation from a snapshot and its prediction.
//!
//! Consumers render the strings in sequence, so emission order is part of
//! the contract: header, conditions, prediction, peak-hour guidance, cloud
//! tier, temperature tier, and maintenance hints last.

use crate::predict::Prediction;
use crate::weather::WeatherObservation;

/// Inclusive local-hour window of peak generation.
const PEAK_START_HOUR: u32 = 10;
const PEAK_END_HOUR: u32 = 14;

/// Cloud cover strictly above this is a heavy reduction.
const HEAVY_CLOUD_PCT: f64 = 70.0;
/// Cloud cover strictly above this (up to the heavy bound) is moderate.
const MODERATE_CLOUD_PCT: f64 = 30.0;

/// Temperatures strictly below this lose panel efficiency to cold.
const COLD_TEMP_C: f64 = 5.0;
/// Temperatures strictly above this lose panel efficiency to heat.
const HOT_TEMP_C: f64 = 25.0;

/// Wind strictly above this warrants a debris check (m/s).
const DEBRIS_WIND_MS: f64 = 5.0;

/// Builds the ordered advisory list for one scored observation.
///
/// Pure: same snapshot and prediction always produce the same strings.
pub fn generate_tips(observation: &WeatherObservation, prediction: &Prediction) -> Vec<String> {
    let w = &observation.current;
    let mut tips = Vec::with_capacity(12);

    // Header and current conditions.
    tips.push(format!(
        "📍 Location: {} ({:.2}°N, {:.2}°E)",
        w.city, w.latitude, w.longitude
    ));
    tips.push(format!("⏰ Current Time: {}", observation.local_timestamp()));
    tips.push(format!("🌤️ Weather: {}", title_case(&w.description)));
    tips.push(format!("🌡️ Temperature: {:.1}°C", w.temperature_c));
    tips.push(format!("☁️ Cloud Cover: {:.0}%", w.cloud_cover_pct));
    tips.push(format!("💨 Wind Speed: {:.1} m/s", w.wind_speed_ms));

    tips.push(format!(
        "⚡ Predicted Power Generation: {:.1} kW",
        prediction.power_kw
    ));

    // Peak-hour guidance.
    let hour = observation.local_hour();
    if (PEAK_START_HOUR..=PEAK_END_HOUR).contains(&hour) {
        tips.push("⏳ You're in peak solar generation hours!".to_string());
    } else {
        let next_peak = (hour + 1).clamp(PEAK_START_HOUR, PEAK_END_HOUR);
        tips.push(format!(
            "⌛ Next peak hours: {next_peak}:00-{PEAK_END_HOUR}:00"
        ));
    }

    // Cloud impact tier; exactly 70% still counts as moderate.
    if w.cloud_cover_pct > HEAVY_CLOUD_PCT {
        tips.push(
            "🌧️ Heavy clouds significantly reducing output (consider battery storage)"
                .to_string(),
        );
    } else if w.cloud_cover_pct > MODERATE_CLOUD_PCT {
        tips.push("⛅ Partial clouds moderately reducing output".to_string());
    } else {
        tips.push("☀️ Clear skies - optimal generation conditions".to_string());
    }

    // Temperature impact tier; exactly 5°C and 25°C are optimal.
    if w.temperature_c < COLD_TEMP_C {
        tips.push("❄️ Cold temperatures reducing panel efficiency (up to 20% loss)".to_string());
    } else if w.temperature_c > HOT_TEMP_C {
        tips.push("🔥 Hot temperatures reducing efficiency (consider ventilation)".to_string());
    } else {
        tips.push("🌡️ Temperature in optimal range for solar production".to_string());
    }

    // Maintenance hints, always appended last.
    if w.cloud_cover_pct < MODERATE_CLOUD_PCT {
        tips.push("🧹 Good time for panel cleaning (clear skies forecast)".to_string());
    }
    if w.wind_speed_ms > DEBRIS_WIND_MS {
        tips.push("💨 Windy conditions - check for debris accumulation".to_string());
    }

    tips
}

/// Uppercases the first letter of each word for display ("light drizzle"
/// renders as "Light Drizzle").
fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
