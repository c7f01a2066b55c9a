//! SkyCast dashboard: search, unit and location state driving weather fetches.

pub mod dashboard;
pub mod error_mapping;
pub mod orchestrator;
pub mod search;
pub mod services;

pub use dashboard::Dashboard;
pub use error_mapping::IntoAppError;
pub use orchestrator::{DisplayState, FetchTicket, Orchestrator};
pub use search::SearchDebouncer;
pub use services::WeatherServiceMessage;
