//! Debounced city search.
//!
//! Each query waits for a quiet period before it is sent. A query that is
//! overtaken by a newer one, either while waiting or while its request is in
//! flight, resolves to `None` and its results are thrown away.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use skycast_weather::{GeocodingClient, Location};

#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    geocoder: GeocodingClient,
    quiet_period: Duration,
    latest: Arc<AtomicU64>,
}

impl SearchDebouncer {
    pub fn new(geocoder: GeocodingClient, quiet_period: Duration) -> Self {
        Self {
            geocoder,
            quiet_period,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Suggestions for `text`, or `None` if a newer query superseded it.
    pub async fn query(&self, text: &str) -> Option<Vec<Location>> {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        if text.trim().is_empty() {
            return Some(Vec::new());
        }

        tokio::time::sleep(self.quiet_period).await;
        if self.is_superseded(generation) {
            tracing::trace!("Search {:?} superseded before sending", text);
            return None;
        }

        let results = self.geocoder.search(text).await;
        if self.is_superseded(generation) {
            tracing::trace!("Search {:?} superseded while in flight", text);
            return None;
        }

        Some(results)
    }

    /// Search without waiting and without affecting pending queries.
    pub async fn search_now(&self, text: &str) -> Vec<Location> {
        self.geocoder.search(text).await
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) != generation
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn debouncer(server: &MockServer, quiet_ms: u64) -> SearchDebouncer {
        let geocoder =
            GeocodingClient::new(&server.uri(), "key", "host", Duration::from_secs(5)).unwrap();
        SearchDebouncer::new(geocoder, Duration::from_millis(quiet_ms))
    }

    fn cities(names: &[(&str, f64, f64)]) -> serde_json::Value {
        let data: Vec<_> = names
            .iter()
            .map(|(name, lat, lon)| {
                serde_json::json!({"name": name, "countryCode": "IN", "latitude": lat, "longitude": lon})
            })
            .collect();
        serde_json::json!({ "data": data })
    }

    #[tokio::test]
    async fn test_single_query_returns_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cities"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cities(&[("Pune", 18.52, 73.85)])))
            .expect(1)
            .mount(&server)
            .await;

        let results = debouncer(&server, 20).query("Pune").await.unwrap();
        assert_eq!(results, vec![Location::new("Pune, IN", 18.52, 73.85)]);
    }

    #[tokio::test]
    async fn test_superseded_query_is_never_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("namePrefix", "Pu"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cities(&[])))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("namePrefix", "Pun"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cities(&[("Pune", 18.52, 73.85)])))
            .expect(1)
            .mount(&server)
            .await;

        let search = debouncer(&server, 200);
        let first = search.query("Pu");
        let second = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            search.query("Pun").await
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first, None);
        assert_eq!(second.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_in_flight_result_is_discarded_when_overtaken() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("namePrefix", "Mum"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(cities(&[("Mumbai", 19.07, 72.87)]))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("namePrefix", "Mumb"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cities(&[("Mumbai", 19.07, 72.87)])))
            .mount(&server)
            .await;

        let search = debouncer(&server, 10);
        let first = search.query("Mum");
        let second = async {
            // Past the first quiet period, while its request is still in flight
            tokio::time::sleep(Duration::from_millis(100)).await;
            search.query("Mumb").await
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first, None);
        assert!(second.is_some());
    }

    #[tokio::test]
    async fn test_blank_query_is_immediate_and_offline() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let results = debouncer(&server, 5_000).query("   ").await;
        assert_eq!(results, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_search_now_skips_debounce() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cities"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cities(&[("Lucknow", 26.85, 80.95)])))
            .mount(&server)
            .await;

        let results = debouncer(&server, 60_000).search_now("Lucknow").await;
        assert_eq!(results[0].label, "Lucknow, IN");
    }
}
