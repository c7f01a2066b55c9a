//! Background services. Network work is spawned on the runtime and results
//! come back over a channel to the single owner of dashboard state.

pub mod weather_service;

pub use weather_service::{request_fetch, WeatherServiceMessage};
