//! OpenWeatherMap client.
//!
//! Every network call re-checks the credential before touching the transport;
//! there is no cached "ready" state.

use std::sync::Arc;

use crate::{
    config::ClientConfig,
    error::{Result, WeatherError},
    model::{ForecastSnapshot, LocationQuery, WeatherSnapshot},
    transport::Transport,
};

pub const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const ICON_BASE_URL: &str = "https://openweathermap.org";
pub const DEFAULT_ICON_SIZE: &str = "2x";
pub const UNITS: &str = "metric";

const CREDENTIAL_GUIDANCE: &str = "API key not configured. Add your free OpenWeatherMap API key \
     with `weather configure` or the WEATHER_API_KEY environment variable. \
     Get it at https://openweathermap.org/api - no credit card required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Weather,
    Forecast,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Weather => "/weather",
            Endpoint::Forecast => "/forecast",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl WeatherClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        if config.is_configured() {
            tracing::debug!(base_url = BASE_URL, units = UNITS, "weather client configured");
        } else {
            tracing::warn!("weather API key not set; provider calls will fail until one is configured");
        }

        Self { config, transport }
    }

    pub async fn current_weather_by_name(&self, city: &str) -> Result<WeatherSnapshot> {
        self.current_weather(&LocationQuery::Name(city.to_string())).await
    }

    pub async fn current_weather_by_coords(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot> {
        self.current_weather(&LocationQuery::Coords { lat, lon }).await
    }

    pub async fn forecast_by_name(&self, city: &str) -> Result<ForecastSnapshot> {
        self.forecast(&LocationQuery::Name(city.to_string())).await
    }

    pub async fn forecast_by_coords(&self, lat: f64, lon: f64) -> Result<ForecastSnapshot> {
        self.forecast(&LocationQuery::Coords { lat, lon }).await
    }

    pub async fn weather_by_id(&self, id: &str) -> Result<WeatherSnapshot> {
        self.current_weather(&LocationQuery::Id(id.to_string())).await
    }

    /// Current conditions for any kind of query; `Id` lookups hit `/weather` too.
    pub async fn current_weather(&self, query: &LocationQuery) -> Result<WeatherSnapshot> {
        self.fetch(Endpoint::Weather, query).await.map(WeatherSnapshot)
    }

    /// Forecast for a query. The provider resolves `id` on `/forecast` as well.
    pub async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSnapshot> {
        self.fetch(Endpoint::Forecast, query).await.map(ForecastSnapshot)
    }

    pub fn icon_url(&self, icon_code: &str, size: Option<&str>) -> String {
        weather_icon_url(icon_code, size)
    }

    fn ensure_credential(&self) -> Result<&str> {
        if !self.config.is_configured() {
            return Err(WeatherError::CredentialMissing(CREDENTIAL_GUIDANCE.to_string()));
        }
        Ok(&self.config.credential)
    }

    async fn fetch(&self, endpoint: Endpoint, query: &LocationQuery) -> Result<serde_json::Value> {
        let credential = self.ensure_credential()?;

        let url = format!("{BASE_URL}{}", endpoint.path());
        let mut params = vec![("appid", credential.to_string()), ("units", UNITS.to_string())];
        params.extend(query.params());

        tracing::debug!(endpoint = endpoint.path(), %query, "fetching weather data");

        Ok(self.transport.get(&url, &params).await?)
    }
}

/// Icon asset URL, e.g. `https://openweathermap.org/img/wn/01d@2x.png`.
pub fn weather_icon_url(icon_code: &str, size: Option<&str>) -> String {
    let size = size.unwrap_or(DEFAULT_ICON_SIZE);
    format!("{ICON_BASE_URL}/img/wn/{icon_code}@{size}.png")
}
