use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use weather_core::{
    AppContext, Config, FileStorage, HttpTransport, Locale, LocationQuery, WeatherClient,
    WeatherStore, storage::file_storage, weather_icon_url,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for saved favorites; defaults to the platform data dir.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store your OpenWeatherMap API key.
    Configure,

    /// Show current conditions.
    Current(Target),

    /// Show the 5-day / 3-hour forecast.
    Forecast {
        #[command(flatten)]
        target: Target,

        /// Number of forecast intervals to print.
        #[arg(long, default_value_t = 8)]
        limit: usize,
    },

    /// Print the URL of a weather icon.
    Icon {
        /// Icon code, e.g. "01d".
        code: String,

        /// Icon size such as "2x" or "4x".
        #[arg(long)]
        size: Option<String>,
    },

    /// Manage favorite locations.
    #[command(subcommand)]
    Favorites(FavoritesCommand),

    /// Show the detected display language.
    Locale,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List saved favorites.
    List,

    /// Show current conditions for every favorite.
    Show,

    /// Look up a location and save it as a favorite.
    Add(Target),

    /// Remove a favorite by id.
    Remove {
        /// Provider location id.
        id: String,
    },
}

/// Location selector shared by lookup commands.
#[derive(Debug, Args)]
pub struct Target {
    /// City name, e.g. "London" or "London,GB".
    #[arg(conflicts_with_all = ["lat", "id"])]
    pub city: Option<String>,

    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Provider location id.
    #[arg(long, conflicts_with = "lat")]
    pub id: Option<String>,
}

impl Target {
    pub fn query(&self) -> Result<LocationQuery> {
        match (&self.city, self.lat, self.lon, &self.id) {
            (Some(city), None, None, None) => Ok(LocationQuery::Name(city.clone())),
            (None, Some(lat), Some(lon), None) => Ok(LocationQuery::Coords { lat, lon }),
            (None, None, None, Some(id)) => Ok(LocationQuery::Id(id.clone())),
            _ => bail!("Specify exactly one of: a city name, --lat/--lon, or --id."),
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Icon { code, size } => {
                println!("{}", weather_icon_url(&code, size.as_deref()));
                Ok(())
            }
            Command::Locale => {
                println!("{}", Locale::from_env());
                Ok(())
            }
            Command::Current(target) => {
                let mut ctx = build_context(self.data_dir)?;
                show_current(&mut ctx, &target.query()?).await
            }
            Command::Forecast { target, limit } => {
                let mut ctx = build_context(self.data_dir)?;
                show_forecast(&mut ctx, &target.query()?, limit).await
            }
            Command::Favorites(cmd) => {
                let mut ctx = build_context(self.data_dir)?;
                run_favorites(&mut ctx, cmd).await
            }
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Get a free key at https://openweathermap.org/api")
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_context(data_dir: Option<PathBuf>) -> Result<AppContext<FileStorage>> {
    let config = Config::load()?;
    let transport = HttpTransport::new().context("Failed to build HTTP client")?;
    let client = WeatherClient::new(config.client_config(), Arc::new(transport));

    let storage = file_storage(data_dir)?;
    tracing::debug!(dir = %storage.dir().display(), "using favorites storage");

    AppContext::new(client, WeatherStore::new(storage)).context("Failed to load favorites")
}

async fn show_current(ctx: &mut AppContext<FileStorage>, query: &LocationQuery) -> Result<()> {
    let snapshot = ctx.refresh_current(query).await?;
    let summary = snapshot.summary().context("Unexpected current weather response")?;

    let place = match &summary.country {
        Some(country) => format!("{}, {country}", summary.location_name),
        None => summary.location_name.clone(),
    };
    let star = match snapshot.location() {
        Some(loc) if ctx.store.is_favorite(&loc.id) => " ★",
        _ => "",
    };

    println!("{place}{star}");
    println!(
        "  {:.1}°C (feels like {:.1}°C), {}",
        summary.temperature_c, summary.feels_like_c, summary.condition
    );
    println!(
        "  Humidity: {}%  Wind: {:.1} m/s",
        summary.humidity_pct, summary.wind_speed_mps
    );
    println!(
        "  Observed: {}",
        summary.observation_time.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );
    if let Some(icon) = &summary.icon {
        println!("  Icon: {}", ctx.client.icon_url(icon, None));
    }

    for alert in ctx.store.alerts() {
        let event = alert.0.get("event").and_then(|e| e.as_str()).unwrap_or("Alert");
        println!("  ! {event}");
    }

    Ok(())
}

async fn show_forecast(
    ctx: &mut AppContext<FileStorage>,
    query: &LocationQuery,
    limit: usize,
) -> Result<()> {
    let snapshot = ctx.refresh_forecast(query).await?;
    let entries = snapshot.entries().context("Unexpected forecast response")?;

    println!("{}", snapshot.city_name().unwrap_or_else(|| query.to_string()));
    for entry in entries.iter().take(limit) {
        println!(
            "  {}  {:>5.1}°C  {}",
            entry.time.with_timezone(&Local).format("%a %d %H:%M"),
            entry.temperature_c,
            entry.condition
        );
    }

    Ok(())
}

async fn run_favorites(ctx: &mut AppContext<FileStorage>, cmd: FavoritesCommand) -> Result<()> {
    match cmd {
        FavoritesCommand::List => {
            if ctx.store.favorites().is_empty() {
                println!("No favorites yet. Add one with `weather favorites add <city>`.");
            }
            for fav in ctx.store.favorites() {
                match &fav.country {
                    Some(country) => println!("{:>10}  {}, {country}", fav.id, fav.name),
                    None => println!("{:>10}  {}", fav.id, fav.name),
                }
            }
        }
        FavoritesCommand::Show => {
            let queries: Vec<_> = ctx.store.favorites().iter().map(|fav| fav.query()).collect();
            for query in queries {
                if let Err(err) = show_current(ctx, &query).await {
                    eprintln!("{query}: {err:#}");
                }
            }
        }
        FavoritesCommand::Add(target) => {
            let snapshot = ctx.refresh_current(&target.query()?).await?;
            let location = snapshot
                .location()
                .context("Provider response did not include a location id")?;

            let name = location.name.clone();
            if ctx.store.add_favorite(location)? {
                println!("Added {name} to favorites.");
            } else {
                println!("{name} is already a favorite.");
            }
        }
        FavoritesCommand::Remove { id } => {
            let existed = ctx.store.is_favorite(&id);
            ctx.store.remove_favorite(&id)?;
            if existed {
                println!("Removed {id} from favorites.");
            } else {
                println!("{id} was not a favorite.");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn current_by_city() {
        let cli = parse(&["weather", "current", "London"]);
        let Command::Current(target) = cli.command else {
            panic!("expected current command");
        };
        assert_eq!(target.query().unwrap(), LocationQuery::Name("London".into()));
    }

    #[test]
    fn forecast_by_negative_coords() {
        let cli = parse(&["weather", "forecast", "--lat", "51.5", "--lon", "-0.12"]);
        let Command::Forecast { target, limit } = cli.command else {
            panic!("expected forecast command");
        };
        assert_eq!(limit, 8);
        assert_eq!(
            target.query().unwrap(),
            LocationQuery::Coords { lat: 51.5, lon: -0.12 }
        );
    }

    #[test]
    fn favorites_add_by_id() {
        let cli = parse(&["weather", "--verbose", "favorites", "add", "--id", "2643743"]);
        assert!(cli.verbose);
        let Command::Favorites(FavoritesCommand::Add(target)) = cli.command else {
            panic!("expected favorites add");
        };
        assert_eq!(target.query().unwrap(), LocationQuery::Id("2643743".into()));
    }

    #[test]
    fn target_requires_a_location() {
        let cli = parse(&["weather", "current"]);
        let Command::Current(target) = cli.command else {
            panic!("expected current command");
        };
        assert!(target.query().is_err());
    }

    #[test]
    fn lat_without_lon_is_rejected() {
        assert!(Cli::try_parse_from(["weather", "current", "--lat", "1.0"]).is_err());
    }

    #[test]
    fn city_conflicts_with_id() {
        assert!(Cli::try_parse_from(["weather", "current", "Paris", "--id", "1"]).is_err());
    }
}
