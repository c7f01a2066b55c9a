//! Dashboard driver.
//!
//! Owns the orchestrator and is the only place its transitions run. Fetches
//! are spawned on the runtime and come back as [`WeatherServiceMessage`]s;
//! applying them publishes the new display state on a watch channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;

use skycast_core::{AppError, Config};
use skycast_weather::{
    current_location, FixedPosition, GeocodingClient, GeolocationError, GeolocationSource,
    Location, UnitSystem, WeatherProvider,
};

use crate::error_mapping::IntoAppError;
use crate::orchestrator::{DisplayState, FetchTicket, Orchestrator};
use crate::search::SearchDebouncer;
use crate::services::{request_fetch, WeatherServiceMessage};

pub struct Dashboard {
    orchestrator: Orchestrator,
    provider: Arc<WeatherProvider>,
    search: SearchDebouncer,
    geolocation: Box<dyn GeolocationSource>,
    quick_picks: Vec<String>,
    runtime: Handle,
    tx: UnboundedSender<WeatherServiceMessage>,
    rx: UnboundedReceiver<WeatherServiceMessage>,
    state_tx: watch::Sender<DisplayState>,
}

impl Dashboard {
    pub fn new(
        provider: WeatherProvider,
        search: SearchDebouncer,
        geolocation: Box<dyn GeolocationSource>,
        runtime: Handle,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(DisplayState::Empty);

        Self {
            orchestrator: Orchestrator::new(),
            provider: Arc::new(provider),
            search,
            geolocation,
            quick_picks: Vec::new(),
            runtime,
            tx,
            rx,
            state_tx,
        }
    }

    /// Build the clients described by `config`.
    pub fn from_config(config: &Config, runtime: Handle) -> Result<Self, AppError> {
        let provider = WeatherProvider::new(
            &config.weather.base_url,
            &config.weather.api_key,
            Duration::from_secs(config.weather.timeout_secs),
        )
        .map_err(IntoAppError::into_app_error)?;

        let geocoder = GeocodingClient::new(
            &config.geocoding.base_url,
            &config.geocoding.api_key,
            &config.geocoding.api_host,
            Duration::from_secs(config.geocoding.timeout_secs),
        )
        .map_err(IntoAppError::into_app_error)?
        .with_min_population(config.geocoding.min_population);

        let search = SearchDebouncer::new(
            geocoder,
            Duration::from_millis(config.search.debounce_ms),
        );
        let geolocation = Box::new(FixedPosition::new(config.geolocation.position()));

        Ok(Self::new(provider, search, geolocation, runtime)
            .with_quick_picks(config.search.quick_picks.clone()))
    }

    pub fn with_quick_picks(mut self, quick_picks: Vec<String>) -> Self {
        self.quick_picks = quick_picks;
        self
    }

    /// Receive every published display state.
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.state_tx.subscribe()
    }

    pub fn display(&self) -> &DisplayState {
        self.orchestrator.display()
    }

    pub fn units(&self) -> UnitSystem {
        self.orchestrator.units()
    }

    pub fn selected_location(&self) -> Option<&Location> {
        self.orchestrator.selected_location()
    }

    pub fn is_loading(&self) -> bool {
        self.orchestrator.is_loading()
    }

    pub fn quick_picks(&self) -> &[String] {
        &self.quick_picks
    }

    /// A handle for running debounced searches from elsewhere, e.g. an
    /// input task that should not borrow the dashboard.
    pub fn searcher(&self) -> SearchDebouncer {
        self.search.clone()
    }

    /// Debounced suggestions for `text`; `None` when superseded.
    pub async fn search(&self, text: &str) -> Option<Vec<Location>> {
        self.search.query(text).await
    }

    pub fn select_location(&mut self, location: Location) {
        let ticket = self.orchestrator.on_location_selected(location);
        self.dispatch(ticket);
    }

    /// Returns whether a refetch was started.
    pub fn set_units(&mut self, units: UnitSystem) -> bool {
        match self.orchestrator.on_units_changed(units) {
            Some(ticket) => {
                self.dispatch(ticket);
                true
            }
            None => false,
        }
    }

    pub fn toggle_units(&mut self) -> bool {
        self.set_units(self.units().toggled())
    }

    /// Select the device position. Failures leave the current state alone.
    pub fn use_current_location(&mut self) -> Result<(), GeolocationError> {
        match current_location(self.geolocation.as_ref()) {
            Ok(location) => {
                self.select_location(location);
                Ok(())
            }
            Err(e) => {
                tracing::info!("Geolocation failed: {}", e);
                Err(e)
            }
        }
    }

    /// Search `name` right away and select the first candidate.
    /// Returns `false` when nothing matched.
    pub async fn select_by_name(&mut self, name: &str) -> bool {
        let candidates = self.search.search_now(name).await;
        let Some(first) = candidates.into_iter().next() else {
            tracing::info!("No city found for {:?}", name);
            return false;
        };
        self.select_location(first);
        true
    }

    /// Wait for one background message and apply it.
    pub async fn process_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(msg) => {
                self.apply(msg);
                true
            }
            None => false,
        }
    }

    /// Apply every message that has already arrived.
    pub fn process_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.rx.try_recv() {
            self.apply(msg);
            count += 1;
        }
        count
    }

    /// Apply messages until the newest fetch has resolved. Every fetch
    /// reports back, even one whose task panicked, so this terminates.
    pub async fn wait_until_settled(&mut self) {
        while self.is_loading() {
            if !self.process_next().await {
                break;
            }
        }
    }

    fn dispatch(&self, ticket: FetchTicket) {
        tracing::debug!(
            "Fetching {} ({}) for generation {}",
            ticket.location.label,
            ticket.units.api_token(),
            ticket.generation
        );
        request_fetch(&self.tx, &self.runtime, Arc::clone(&self.provider), ticket);
    }

    fn apply(&mut self, msg: WeatherServiceMessage) {
        let changed = match msg {
            WeatherServiceMessage::FetchDone { generation, result } => match result {
                Ok(report) => self.orchestrator.on_fetch_resolved(generation, report),
                Err(e) => self.orchestrator.on_fetch_failed(generation, e),
            },
            WeatherServiceMessage::FetchAborted { generation } => {
                self.orchestrator.on_fetch_aborted(generation)
            }
        };

        if changed {
            self.state_tx.send_replace(self.orchestrator.display().clone());
        }
    }
}
