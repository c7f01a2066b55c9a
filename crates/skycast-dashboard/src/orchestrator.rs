//! Search/unit state machine.
//!
//! Holds the selected location and unit system, and tags every fetch it asks
//! for with a generation number. Only the result of the newest generation is
//! ever displayed; anything older is dropped when it arrives.

use skycast_weather::{Location, UnitSystem, WeatherFetchError, WeatherReport};

use skycast_core::AppError;

use crate::error_mapping::IntoAppError;

/// What the weather panels should show
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DisplayState {
    /// Nothing selected or fetched yet
    #[default]
    Empty,
    /// Current conditions and forecast from one fetch
    Ready(WeatherReport),
    /// The latest fetch failed; panels are cleared
    Failed { message: String },
}

/// A fetch the orchestrator wants performed
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub generation: u64,
    pub location: Location,
    pub units: UnitSystem,
}

#[derive(Debug, Default)]
pub struct Orchestrator {
    selected: Option<Location>,
    units: UnitSystem,
    generation: u64,
    settled_generation: u64,
    display: DisplayState,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_location(&self) -> Option<&Location> {
        self.selected.as_ref()
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// Generation of the most recently issued fetch (0 before any)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// True while the newest fetch has neither succeeded nor failed.
    /// The previous display stays up in the meantime.
    pub fn is_loading(&self) -> bool {
        self.generation > self.settled_generation
    }

    /// A new location supersedes the previous one and is fetched right away.
    pub fn on_location_selected(&mut self, location: Location) -> FetchTicket {
        tracing::info!("Location selected: {}", location.label);
        self.selected = Some(location.clone());
        self.issue_ticket(location)
    }

    /// Store the new units and refetch the selected location, if any.
    pub fn on_units_changed(&mut self, units: UnitSystem) -> Option<FetchTicket> {
        self.units = units;
        let Some(location) = self.selected.clone() else {
            tracing::debug!("Units set to {} with no location selected", units.api_token());
            return None;
        };
        Some(self.issue_ticket(location))
    }

    /// Publish a report if it belongs to the newest fetch. Returns whether
    /// the display changed.
    pub fn on_fetch_resolved(&mut self, generation: u64, report: WeatherReport) -> bool {
        if generation != self.generation {
            tracing::debug!(
                "Dropping stale report for generation {} (current {})",
                generation,
                self.generation
            );
            return false;
        }

        self.settled_generation = generation;
        self.display = DisplayState::Ready(report);
        true
    }

    /// Replace the panels with an error if the failure belongs to the newest
    /// fetch. Returns whether the display changed.
    pub fn on_fetch_failed(&mut self, generation: u64, error: WeatherFetchError) -> bool {
        if generation != self.generation {
            tracing::debug!(
                "Dropping stale failure for generation {}: {}",
                generation,
                error
            );
            return false;
        }

        tracing::error!("Failed to fetch weather: {}", error);
        let message = error.into_app_error().user_message().to_string();
        self.settled_generation = generation;
        self.display = DisplayState::Failed { message };
        true
    }

    /// The fetch for `generation` ended without any result. Treated like a
    /// failure so the newest generation always settles.
    pub fn on_fetch_aborted(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            tracing::debug!("Dropping stale abort for generation {}", generation);
            return false;
        }

        let error = AppError::Other(anyhow::anyhow!(
            "fetch task for generation {} aborted",
            generation
        ));
        tracing::error!("{}", error);
        self.settled_generation = generation;
        self.display = DisplayState::Failed {
            message: error.user_message().to_string(),
        };
        true
    }

    fn issue_ticket(&mut self, location: Location) -> FetchTicket {
        self.generation += 1;
        FetchTicket {
            generation: self.generation,
            location,
            units: self.units,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use skycast_weather::CurrentConditions;

    fn pune() -> Location {
        Location::new("Pune, IN", 18.52, 73.85)
    }

    fn mumbai() -> Location {
        Location::new("Mumbai, IN", 19.07, 72.87)
    }

    fn report(location: &Location, units: UnitSystem, temperature: f64) -> WeatherReport {
        WeatherReport {
            location: location.clone(),
            units,
            current: CurrentConditions {
                location_label: location.label.clone(),
                observed_at_epoch_seconds: 1_725_345_000,
                utc_offset_seconds: 19_800,
                temperature,
                feels_like: temperature,
                temp_min: temperature - 1.0,
                temp_max: temperature + 1.0,
                humidity: 80,
                wind_speed: 3.0,
                sunrise_epoch_seconds: 1_725_324_300,
                sunset_epoch_seconds: 1_725_369_060,
                condition_main: "Clouds".into(),
                condition_description: "broken clouds".into(),
                icon_id: "04d".into(),
            },
            forecast: Vec::new(),
        }
    }

    fn server_error() -> WeatherFetchError {
        WeatherFetchError::Status {
            endpoint: "weather",
            status: 503,
        }
    }

    #[test]
    fn initial_state_is_empty_metric() {
        let orch = Orchestrator::new();
        assert_eq!(orch.display(), &DisplayState::Empty);
        assert_eq!(orch.units(), UnitSystem::Metric);
        assert!(orch.selected_location().is_none());
        assert!(!orch.is_loading());
    }

    #[test]
    fn selecting_issues_ticket_with_current_units() {
        let mut orch = Orchestrator::new();
        let ticket = orch.on_location_selected(pune());

        assert_eq!(
            ticket,
            FetchTicket {
                generation: 1,
                location: pune(),
                units: UnitSystem::Metric,
            }
        );
        assert!(orch.is_loading());
    }

    #[test]
    fn units_without_selection_is_noop() {
        let mut orch = Orchestrator::new();
        assert!(orch.on_units_changed(UnitSystem::Imperial).is_none());
        assert_eq!(orch.generation(), 0);
        assert_eq!(orch.units(), UnitSystem::Imperial);
        assert_eq!(orch.display(), &DisplayState::Empty);
    }

    #[test]
    fn units_change_refetches_same_location() {
        let mut orch = Orchestrator::new();
        let first = orch.on_location_selected(pune());
        assert!(orch.on_fetch_resolved(first.generation, report(&pune(), UnitSystem::Metric, 24.0)));

        let ticket = orch.on_units_changed(UnitSystem::Imperial).unwrap();

        assert_eq!(ticket.generation, 2);
        assert_eq!(ticket.location, pune());
        assert_eq!(ticket.units, UnitSystem::Imperial);
        // Previous report stays visible until the new one lands
        assert!(matches!(orch.display(), DisplayState::Ready(r) if r.units == UnitSystem::Metric));
    }

    #[test]
    fn later_units_apply_to_next_selection() {
        let mut orch = Orchestrator::new();
        orch.on_units_changed(UnitSystem::Imperial);
        let ticket = orch.on_location_selected(pune());
        assert_eq!(ticket.units, UnitSystem::Imperial);
    }

    #[test]
    fn stale_result_after_newer_is_dropped() {
        let mut orch = Orchestrator::new();
        let gen1 = orch.on_location_selected(pune());
        let gen2 = orch.on_location_selected(mumbai());

        assert!(orch.on_fetch_resolved(gen2.generation, report(&mumbai(), UnitSystem::Metric, 30.0)));
        assert!(!orch.on_fetch_resolved(gen1.generation, report(&pune(), UnitSystem::Metric, 24.0)));

        match orch.display() {
            DisplayState::Ready(r) => assert_eq!(r.current.location_label, "Mumbai, IN"),
            other => panic!("unexpected display: {:?}", other),
        }
        assert!(!orch.is_loading());
    }

    #[test]
    fn stale_result_before_newer_is_dropped() {
        let mut orch = Orchestrator::new();
        let gen1 = orch.on_location_selected(pune());
        orch.on_location_selected(mumbai());

        assert!(!orch.on_fetch_resolved(gen1.generation, report(&pune(), UnitSystem::Metric, 24.0)));
        assert_eq!(orch.display(), &DisplayState::Empty);
        assert!(orch.is_loading());
    }

    #[test]
    fn current_failure_clears_panels() {
        let mut orch = Orchestrator::new();
        let gen1 = orch.on_location_selected(pune());
        orch.on_fetch_resolved(gen1.generation, report(&pune(), UnitSystem::Metric, 24.0));

        let gen2 = orch.on_units_changed(UnitSystem::Imperial).unwrap();
        assert!(orch.on_fetch_failed(gen2.generation, server_error()));

        assert_eq!(
            orch.display(),
            &DisplayState::Failed {
                message: "Weather service unavailable. Please try again later.".into()
            }
        );
        assert!(!orch.is_loading());
    }

    #[test]
    fn stale_failure_is_dropped() {
        let mut orch = Orchestrator::new();
        let gen1 = orch.on_location_selected(pune());
        let gen2 = orch.on_location_selected(mumbai());
        orch.on_fetch_resolved(gen2.generation, report(&mumbai(), UnitSystem::Metric, 30.0));

        assert!(!orch.on_fetch_failed(gen1.generation, server_error()));
        assert!(matches!(orch.display(), DisplayState::Ready(_)));
    }

    #[test]
    fn current_abort_settles_with_failure() {
        let mut orch = Orchestrator::new();
        let ticket = orch.on_location_selected(pune());

        assert!(orch.on_fetch_aborted(ticket.generation));
        assert!(!orch.is_loading());
        assert_eq!(
            orch.display(),
            &DisplayState::Failed {
                message: "Something went wrong. Please try again.".into()
            }
        );
    }

    #[test]
    fn stale_abort_is_dropped() {
        let mut orch = Orchestrator::new();
        let gen1 = orch.on_location_selected(pune());
        let gen2 = orch.on_location_selected(mumbai());
        orch.on_fetch_resolved(gen2.generation, report(&mumbai(), UnitSystem::Metric, 30.0));

        assert!(!orch.on_fetch_aborted(gen1.generation));
        assert!(matches!(orch.display(), DisplayState::Ready(_)));
    }

    #[test]
    fn generations_are_monotonic() {
        let mut orch = Orchestrator::new();
        let a = orch.on_location_selected(pune()).generation;
        let b = orch.on_units_changed(UnitSystem::Imperial).unwrap().generation;
        let c = orch.on_location_selected(mumbai()).generation;
        assert!(a < b && b < c);
    }
}
