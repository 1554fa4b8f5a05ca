use crate::{
    client::WeatherClient,
    error::Result,
    model::{ForecastSnapshot, LocationQuery, WeatherSnapshot},
    storage::KeyValueStore,
    store::WeatherStore,
};

/// Application-wide state: one client and one store, built at startup and
/// passed around by reference.
///
/// The client never writes into the store. The `refresh_*` helpers here do
/// that bookkeeping: loading flag, snapshot or error text.
#[derive(Debug)]
pub struct AppContext<S> {
    pub client: WeatherClient,
    pub store: WeatherStore<S>,
}

impl<S: KeyValueStore> AppContext<S> {
    /// Wire up the context and load saved favorites once.
    pub fn new(client: WeatherClient, store: WeatherStore<S>) -> Result<Self> {
        let mut ctx = Self { client, store };
        ctx.store.load_favorites()?;
        Ok(ctx)
    }

    pub async fn refresh_current(&mut self, query: &LocationQuery) -> Result<WeatherSnapshot> {
        self.store.set_loading(true);
        let result = self.client.current_weather(query).await;
        self.settle(result, |store, snapshot: &WeatherSnapshot| {
            store.set_alerts(snapshot.alerts());
            store.set_current_weather(Some(snapshot.clone()));
        })
    }

    pub async fn refresh_forecast(&mut self, query: &LocationQuery) -> Result<ForecastSnapshot> {
        self.store.set_loading(true);
        let result = self.client.forecast(query).await;
        self.settle(result, |store, snapshot: &ForecastSnapshot| {
            store.set_forecast(Some(snapshot.clone()));
        })
    }

    /// Current conditions and forecast fetched concurrently.
    ///
    /// Each successful half is stored even if the other fails; the first
    /// failure is returned and recorded.
    pub async fn refresh_all(
        &mut self,
        query: &LocationQuery,
    ) -> Result<(WeatherSnapshot, ForecastSnapshot)> {
        self.store.set_loading(true);
        self.store.set_error(None);

        let (current, forecast) =
            tokio::join!(self.client.current_weather(query), self.client.forecast(query));

        if let Ok(snapshot) = &current {
            self.store.set_alerts(snapshot.alerts());
            self.store.set_current_weather(Some(snapshot.clone()));
        }
        if let Ok(snapshot) = &forecast {
            self.store.set_forecast(Some(snapshot.clone()));
        }

        let result = current.and_then(|c| forecast.map(|f| (c, f)));
        if let Err(err) = &result {
            tracing::warn!(%query, error = %err, "weather refresh failed");
            self.store.set_error(Some(err.to_string()));
        }
        self.store.set_loading(false);
        result
    }

    fn settle<T>(
        &mut self,
        result: Result<T>,
        apply: impl FnOnce(&mut WeatherStore<S>, &T),
    ) -> Result<T> {
        match &result {
            Ok(value) => {
                apply(&mut self.store, value);
                self.store.set_error(None);
            }
            Err(err) => {
                tracing::warn!(error = %err, "weather request failed");
                self.store.set_error(Some(err.to_string()));
            }
        }
        self.store.set_loading(false);
        result
    }
}
