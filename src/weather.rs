// ==============================================================================
// weather.rs - Weather Providers
// ==============================================================================
// Description: Pluggable source of current weather conditions by zip code
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::models::WeatherReport;

/// Source of current weather conditions
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions for a 5 digit zip code
    async fn current(&self, zip: &str) -> Result<WeatherReport>;
}

// ==============================================================================
// UPSTREAM FORMAT
// ==============================================================================

/// Weather service response in its upstream shape
#[derive(Debug, Deserialize)]
struct StackResponse {
    location: StackLocation,
    current: StackCurrent,
}

#[derive(Debug, Deserialize)]
struct StackLocation {
    name: String,
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct StackCurrent {
    temperature: i32,
    weather_icons: Vec<String>,
    weather_descriptions: Vec<String>,
    wind_speed: u32,
    wind_dir: String,
    humidity: u32,
    uv_index: u32,
    visibility: u32,
}

impl From<StackResponse> for WeatherReport {
    fn from(response: StackResponse) -> Self {
        let StackResponse { location, current } = response;
        WeatherReport {
            date: location.localtime,
            location_name: location.name,
            temperature: current.temperature,
            weather_icons: current.weather_icons,
            descriptions: current.weather_descriptions,
            wind_direction: current.wind_dir,
            wind_speed: current.wind_speed,
            humidity: current.humidity,
            uv_index: current.uv_index,
            visibility: current.visibility,
        }
    }
}

// ==============================================================================
// LOCAL SAMPLE DATA
// ==============================================================================

const SAMPLE_RESPONSE: &str = r#"{
    "location": {
        "name": "Rochester",
        "localtime": "2026-10-19 08:00"
    },
    "current": {
        "temperature": 54,
        "weather_icons": [
            "https://cdn.worldweatheronline.com/images/wsymbols01_png_64/wsymbol_0002_sunny_intervals.png"
        ],
        "weather_descriptions": ["Partly cloudy"],
        "wind_speed": 9,
        "wind_degree": 240,
        "wind_dir": "WSW",
        "humidity": 71,
        "uv_index": 2,
        "visibility": 9
    }
}"#;

/// Serves bundled sample conditions regardless of zip code
#[derive(Debug, Clone)]
pub struct LocalDataProvider {
    report: WeatherReport,
}

impl LocalDataProvider {
    pub fn new() -> Result<Self> {
        Self::from_json(SAMPLE_RESPONSE)
    }

    /// Builds a provider from a response in the upstream shape
    pub fn from_json(raw: &str) -> Result<Self> {
        let response: StackResponse =
            serde_json::from_str(raw).context("Failed to parse sample weather data")?;

        Ok(Self {
            report: response.into(),
        })
    }
}

#[async_trait]
impl WeatherProvider for LocalDataProvider {
    async fn current(&self, zip: &str) -> Result<WeatherReport> {
        debug!(zip = %zip, "Responding with local weather data");
        Ok(self.report.clone())
    }
}
