//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credential resolution
//! - The OpenWeatherMap client and its transport seam
//! - The presentation store with write-through favorites
//! - Shared domain models (locations, opaque snapshots)
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod locale;
pub mod model;
pub mod storage;
pub mod store;
pub mod transport;

pub use client::{WeatherClient, weather_icon_url};
pub use config::{ClientConfig, Config};
pub use context::AppContext;
pub use error::{ProviderError, WeatherError};
pub use locale::{Locale, detect_locale};
pub use model::{Alert, ForecastSnapshot, Location, LocationQuery, WeatherSnapshot};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
pub use store::{StoreState, WeatherStore};
pub use transport::{HttpTransport, Transport};
