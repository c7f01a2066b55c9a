//! Weather backend: async report fetching.
//! The fetch runs on the runtime; the result is sent back tagged with the
//! generation of the ticket that asked for it.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use skycast_weather::{ReferenceTime, WeatherFetchError, WeatherProvider, WeatherReport};

use crate::orchestrator::FetchTicket;

/// Messages sent from async operations back to the dashboard
#[derive(Debug)]
pub enum WeatherServiceMessage {
    /// Result of fetching a report for one generation
    FetchDone {
        generation: u64,
        result: Result<WeatherReport, WeatherFetchError>,
    },
    /// The fetch task for this generation died without a result
    FetchAborted { generation: u64 },
}

/// Fetch the report described by `ticket` in the background.
/// Sends `FetchDone`, or `FetchAborted` if the task panicked.
pub fn request_fetch(
    tx: &UnboundedSender<WeatherServiceMessage>,
    runtime: &Handle,
    provider: Arc<WeatherProvider>,
    ticket: FetchTicket,
) {
    let FetchTicket {
        generation,
        location,
        units,
    } = ticket;

    let fetch = async move {
        provider
            .fetch_report(&location, units, ReferenceTime::current())
            .await
    };
    spawn_reporting(tx, runtime, generation, fetch);
}

fn spawn_reporting<F>(
    tx: &UnboundedSender<WeatherServiceMessage>,
    runtime: &Handle,
    generation: u64,
    fetch: F,
) where
    F: Future<Output = Result<WeatherReport, WeatherFetchError>> + Send + 'static,
{
    let tx = tx.clone();
    let task = runtime.spawn(fetch);

    runtime.spawn(async move {
        let msg = match task.await {
            Ok(result) => WeatherServiceMessage::FetchDone { generation, result },
            Err(e) => {
                tracing::error!("Fetch task for generation {} failed: {}", generation, e);
                WeatherServiceMessage::FetchAborted { generation }
            }
        };

        if tx.send(msg).is_err() {
            tracing::debug!("Dashboard gone before generation {} finished", generation);
        }
    });
}
