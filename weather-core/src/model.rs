use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderError;

/// A place the user can look up or keep as a favorite.
///
/// Favorites are unique by `id`; the remaining fields are for display and
/// for re-querying the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl Location {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            country: None,
            lat: None,
            lon: None,
        }
    }

    /// The most specific query the provider accepts for this location.
    pub fn query(&self) -> LocationQuery {
        LocationQuery::Id(self.id.clone())
    }
}

/// How a weather lookup identifies its location.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Name(String),
    Coords { lat: f64, lon: f64 },
    Id(String),
}

impl LocationQuery {
    /// Provider query parameters for this lookup (`q`, `lat`+`lon` or `id`).
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::Name(city) => vec![("q", city.clone())],
            LocationQuery::Coords { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
            LocationQuery::Id(id) => vec![("id", id.clone())],
        }
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::Name(city) => f.write_str(city),
            LocationQuery::Coords { lat, lon } => write!(f, "{lat},{lon}"),
            LocationQuery::Id(id) => write!(f, "#{id}"),
        }
    }
}

/// Raw "current conditions" payload, stored and forwarded untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherSnapshot(pub Value);

/// Raw forecast payload, stored and forwarded untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastSnapshot(pub Value);

/// One opaque alert record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alert(pub Value);

/// Human-oriented view of a current-conditions payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSummary {
    pub location_name: String,
    pub country: Option<String>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub condition: String,
    pub icon: Option<String>,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub observation_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub time: DateTime<Utc>,
    pub temperature_c: f64,
    pub condition: String,
    pub icon: Option<String>,
}

impl WeatherSnapshot {
    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// Decode the fields the CLI displays. The snapshot itself is not changed.
    pub fn summary(&self) -> Result<CurrentSummary, ProviderError> {
        let parsed: OwCurrent = serde_json::from_value(self.0.clone())?;
        let (condition, icon) = describe(&parsed.weather);

        Ok(CurrentSummary {
            location_name: parsed.name,
            country: parsed.sys.and_then(|s| s.country),
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            condition,
            icon,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.map(|w| w.speed).unwrap_or_default(),
            observation_time: unix_to_utc(parsed.dt).unwrap_or_else(Utc::now),
        })
    }

    /// A favorite-ready location built from the payload, if it carries an id.
    pub fn location(&self) -> Option<Location> {
        let parsed: OwCurrent = serde_json::from_value(self.0.clone()).ok()?;
        let id = match parsed.id? {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s,
            _ => return None,
        };

        Some(Location {
            id,
            name: parsed.name,
            country: parsed.sys.and_then(|s| s.country),
            lat: parsed.coord.as_ref().map(|c| c.lat),
            lon: parsed.coord.as_ref().map(|c| c.lon),
        })
    }

    /// Alert records embedded in the payload under `alerts`, in order.
    pub fn alerts(&self) -> Vec<Alert> {
        self.0
            .get("alerts")
            .and_then(Value::as_array)
            .map(|items| items.iter().cloned().map(Alert).collect())
            .unwrap_or_default()
    }
}

impl ForecastSnapshot {
    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn entries(&self) -> Result<Vec<ForecastEntry>, ProviderError> {
        let parsed: OwForecast = serde_json::from_value(self.0.clone())?;

        Ok(parsed
            .list
            .into_iter()
            .map(|entry| {
                let (condition, icon) = describe(&entry.weather);
                ForecastEntry {
                    time: unix_to_utc(entry.dt).unwrap_or_else(Utc::now),
                    temperature_c: entry.main.temp,
                    condition,
                    icon,
                }
            })
            .collect())
    }

    pub fn city_name(&self) -> Option<String> {
        let city = self.0.get("city")?;
        let name = city.get("name")?.as_str()?;
        match city.get("country").and_then(Value::as_str) {
            Some(country) => Some(format!("{name}, {country}")),
            None => Some(name.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrent {
    #[serde(default)]
    id: Option<Value>,
    name: String,
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: Option<OwWind>,
    #[serde(default)]
    sys: Option<OwSys>,
    #[serde(default)]
    coord: Option<OwCoord>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecast {
    list: Vec<OwForecastEntry>,
}

fn describe(weather: &[OwWeather]) -> (String, Option<String>) {
    weather
        .first()
        .map(|w| (w.description.clone(), w.icon.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), None))
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn london() -> WeatherSnapshot {
        WeatherSnapshot(json!({
            "id": 2643743,
            "name": "London",
            "dt": 1700000000,
            "coord": { "lat": 51.51, "lon": -0.13 },
            "sys": { "country": "GB" },
            "main": { "temp": 11.2, "feels_like": 10.1, "humidity": 81 },
            "weather": [{ "description": "light rain", "icon": "10d" }],
            "wind": { "speed": 4.6 }
        }))
    }

    #[test]
    fn query_params_per_variant() {
        assert_eq!(
            LocationQuery::Name("London".into()).params(),
            vec![("q", "London".to_string())]
        );
        assert_eq!(
            LocationQuery::Coords { lat: 51.5, lon: -0.12 }.params(),
            vec![("lat", "51.5".to_string()), ("lon", "-0.12".to_string())]
        );
        assert_eq!(
            LocationQuery::Id("2643743".into()).params(),
            vec![("id", "2643743".to_string())]
        );
    }

    #[test]
    fn summary_reads_current_payload() {
        let summary = london().summary().expect("valid payload");

        assert_eq!(summary.location_name, "London");
        assert_eq!(summary.country.as_deref(), Some("GB"));
        assert_eq!(summary.condition, "light rain");
        assert_eq!(summary.icon.as_deref(), Some("10d"));
        assert_eq!(summary.humidity_pct, 81);
        assert_eq!(summary.observation_time.timestamp(), 1700000000);
    }

    #[test]
    fn summary_rejects_unexpected_shape() {
        let snapshot = WeatherSnapshot(json!({ "cod": "404" }));
        assert!(matches!(snapshot.summary(), Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn location_from_numeric_id() {
        let loc = london().location().expect("payload has id");
        assert_eq!(loc.id, "2643743");
        assert_eq!(loc.name, "London");
        assert_eq!(loc.lat, Some(51.51));
        assert_eq!(loc.query(), LocationQuery::Id("2643743".into()));
    }

    #[test]
    fn alerts_default_to_empty() {
        assert!(london().alerts().is_empty());

        let with_alerts = WeatherSnapshot(json!({
            "alerts": [{ "event": "Flood" }, { "event": "Wind" }]
        }));
        let alerts = with_alerts.alerts();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].0["event"], "Flood");
    }

    #[test]
    fn forecast_entries_and_city() {
        let snapshot = ForecastSnapshot(json!({
            "city": { "name": "London", "country": "GB" },
            "list": [
                { "dt": 1700000000, "main": { "temp": 9.0, "feels_like": 7.0, "humidity": 70 },
                  "weather": [{ "description": "clear sky", "icon": "01n" }] },
                { "dt": 1700010800, "main": { "temp": 8.0, "feels_like": 6.5, "humidity": 72 },
                  "weather": [] }
            ]
        }));

        let entries = snapshot.entries().expect("valid forecast");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].condition, "clear sky");
        assert_eq!(entries[1].condition, "Unknown");
        assert_eq!(snapshot.city_name().as_deref(), Some("London, GB"));
    }

    #[test]
    fn location_serializes_without_empty_fields() {
        let json = serde_json::to_string(&Location::new("1", "Berlin")).unwrap();
        assert_eq!(json, r#"{"id":"1","name":"Berlin"}"#);
    }
}
