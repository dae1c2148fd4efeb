// ==============================================================================
// state.rs - Application State Management
// ==============================================================================
// Description: Shared application state for the API gateway
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::logging::{LogSink, TracingSink};
use crate::security::{StaticTokenValidator, TokenValidator};
use crate::store::UserStore;
use crate::weather::{LocalDataProvider, WeatherProvider};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Credential checks for the auth gate
    validator: Arc<dyn TokenValidator>,

    /// Destination of correlation log events
    sink: Arc<dyn LogSink>,

    /// Wall and monotonic time
    clock: Arc<dyn Clock>,

    /// Registered users
    users: UserStore,

    /// Current weather conditions
    weather: Arc<dyn WeatherProvider>,
}

impl AppState {
    /// Create application state from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let mut validator = StaticTokenValidator::demo();
        if let Some(list) = &config.auth_tokens {
            validator = validator
                .with_token_list(list)
                .context("Failed to parse AUTH_TOKENS")?;
        }
        info!("Loaded {} API token(s)", validator.len());

        let weather = LocalDataProvider::new().context("Failed to load weather data")?;

        Ok(Self::from_parts(
            Arc::new(validator),
            Arc::new(TracingSink),
            Arc::new(SystemClock),
            Arc::new(weather),
        ))
    }

    /// Assemble state from explicit collaborators
    pub fn from_parts(
        validator: Arc<dyn TokenValidator>,
        sink: Arc<dyn LogSink>,
        clock: Arc<dyn Clock>,
        weather: Arc<dyn WeatherProvider>,
    ) -> Self {
        let users = UserStore::new(clock.clone());

        Self {
            inner: Arc::new(AppStateInner {
                validator,
                sink,
                clock,
                users,
                weather,
            }),
        }
    }

    pub fn validator(&self) -> Arc<dyn TokenValidator> {
        self.inner.validator.clone()
    }

    pub fn sink(&self) -> Arc<dyn LogSink> {
        self.inner.sink.clone()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.inner.clock.clone()
    }

    pub fn users(&self) -> &UserStore {
        &self.inner.users
    }

    pub fn weather(&self) -> &dyn WeatherProvider {
        self.inner.weather.as_ref()
    }

    /// Create mock state for testing
    #[cfg(test)]
    pub fn mock(sink: Arc<dyn LogSink>, clock: Arc<dyn Clock>) -> Self {
        let weather = LocalDataProvider::new().unwrap();
        Self::from_parts(
            Arc::new(StaticTokenValidator::demo()),
            sink,
            clock,
            Arc::new(weather),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_loads_extra_tokens() {
        let config = Config {
            auth_tokens: Some("abc:u-1:a@example.com:A".to_string()),
            ..Config::default()
        };
        let state = AppState::new(&config).unwrap();

        assert!(state.validator().validate("abc").is_ok());
        assert!(state.validator().validate("demo-valid-token").is_ok());
    }

    #[test]
    fn test_new_rejects_bad_tokens() {
        let config = Config {
            auth_tokens: Some("missing-fields".to_string()),
            ..Config::default()
        };
        assert!(AppState::new(&config).is_err());
    }
}
