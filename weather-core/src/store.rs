//! Presentation state: the latest fetched data plus persisted favorites.
//!
//! All mutation goes through `&mut self`, so a single owner (usually
//! [`crate::AppContext`]) decides when state changes. Favorites are written
//! through to storage on every change.

use crate::{
    error::{Result, WeatherError},
    model::{Alert, ForecastSnapshot, Location, WeatherSnapshot},
    storage::KeyValueStore,
};

/// Storage key holding the JSON-encoded favorites list.
pub const FAVORITES_KEY: &str = "weatherFavorites";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    pub current_weather: Option<WeatherSnapshot>,
    pub forecast: Option<ForecastSnapshot>,
    pub alerts: Vec<Alert>,
    pub favorites: Vec<Location>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct WeatherStore<S> {
    state: StoreState,
    storage: S,
}

impl<S: KeyValueStore> WeatherStore<S> {
    /// An empty store. Call [`WeatherStore::load_favorites`] once to pick up
    /// previously saved favorites.
    pub fn new(storage: S) -> Self {
        Self {
            state: StoreState::default(),
            storage,
        }
    }

    pub fn set_current_weather(&mut self, snapshot: Option<WeatherSnapshot>) {
        self.state.current_weather = snapshot;
    }

    pub fn set_forecast(&mut self, snapshot: Option<ForecastSnapshot>) {
        self.state.forecast = snapshot;
    }

    pub fn set_alerts(&mut self, alerts: Vec<Alert>) {
        self.state.alerts = alerts;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.state.is_loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.state.error = error;
    }

    /// Append `location` unless a favorite with the same id exists.
    ///
    /// Returns `true` if the list changed. A duplicate is a no-op and does
    /// not touch storage.
    pub fn add_favorite(&mut self, location: Location) -> Result<bool> {
        if self.is_favorite(&location.id) {
            return Ok(false);
        }

        tracing::info!(id = %location.id, name = %location.name, "adding favorite");
        self.state.favorites.push(location);
        self.save_favorites()?;
        Ok(true)
    }

    /// Drop every favorite with `location_id`. Storage is rewritten even
    /// when nothing matched.
    pub fn remove_favorite(&mut self, location_id: &str) -> Result<()> {
        self.state.favorites.retain(|fav| fav.id != location_id);
        tracing::info!(id = location_id, "removed favorite");
        self.save_favorites()
    }

    /// Replace favorites with the stored list, if one exists. An empty
    /// stored value counts as absent.
    ///
    /// A corrupt stored value fails with [`WeatherError::PersistenceCorrupt`]
    /// and leaves the in-memory list as it was.
    pub fn load_favorites(&mut self) -> Result<()> {
        let Some(saved) = self.storage.get(FAVORITES_KEY)?.filter(|s| !s.is_empty()) else {
            tracing::debug!("no saved favorites");
            return Ok(());
        };

        let favorites: Vec<Location> =
            serde_json::from_str(&saved).map_err(WeatherError::PersistenceCorrupt)?;

        tracing::debug!(count = favorites.len(), "loaded favorites");
        self.state.favorites = favorites;
        Ok(())
    }

    pub(crate) fn save_favorites(&mut self) -> Result<()> {
        let encoded =
            serde_json::to_string(&self.state.favorites).map_err(std::io::Error::other)?;
        self.storage.set(FAVORITES_KEY, &encoded)?;
        Ok(())
    }

    pub fn current_weather(&self) -> Option<&WeatherSnapshot> {
        self.state.current_weather.as_ref()
    }

    pub fn forecast(&self) -> Option<&ForecastSnapshot> {
        self.state.forecast.as_ref()
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.state.alerts
    }

    pub fn favorites(&self) -> &[Location] {
        &self.state.favorites
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn is_favorite(&self, location_id: &str) -> bool {
        self.state.favorites.iter().any(|fav| fav.id == location_id)
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
