//! Log level checks for the route fallback
//!
//! Expected rejections of `/optimized_route` are routine and must not be
//! reported above debug; any other primary failure is a warning.

use std::sync::{Arc, Mutex};

use domain::{Coordinate, Costing};
use integration_valhalla::{RoutingClient, ValhallaClient, ValhallaConfig};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records the level of every event emitted by this crate
#[derive(Debug, Clone, Default)]
struct LevelCapture {
    levels: Arc<Mutex<Vec<Level>>>,
}

impl LevelCapture {
    fn levels(&self) -> Vec<Level> {
        self.levels.lock().unwrap().clone()
    }
}

impl<S: Subscriber> Layer<S> for LevelCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target().starts_with("integration_valhalla") {
            self.levels.lock().unwrap().push(*metadata.level());
        }
    }
}

fn trip_body() -> serde_json::Value {
    let summary = serde_json::json!({
        "has_time_restrictions": false, "has_toll": false, "has_highway": false,
        "has_ferry": false, "min_lat": 36.72, "min_lon": -4.42, "max_lat": 36.73,
        "max_lon": -4.40, "time": 300.0, "length": 2.5, "cost": 310.0
    });
    serde_json::json!({
        "trip": {
            "locations": [
                { "type": "break", "lat": 36.72, "lon": -4.42, "original_index": 0 },
                { "type": "break", "lat": 36.73, "lon": -4.40, "original_index": 1 }
            ],
            "legs": [{
                "maneuvers": [],
                "summary": summary,
                "shape": "_we`eA~xwlGowH_pRowH_pR"
            }],
            "summary": summary,
            "status_message": "Found route between points",
            "status": 0,
            "units": "kilometers",
            "language": "en-US"
        }
    })
}

/// Run one fallback with `/optimized_route` answering `status` and return the captured levels
async fn levels_for_primary_status(status: u16) -> Vec<Level> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/optimized_route"))
        .respond_with(ResponseTemplate::new(status).set_body_string("rejected"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/route"))
        .respond_with(ResponseTemplate::new(200).set_body_json(trip_body()))
        .expect(1)
        .mount(&server)
        .await;

    let capture = LevelCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let client = ValhallaClient::new(&ValhallaConfig::for_testing(server.uri())).unwrap();
    let locations = [
        Coordinate::new_unchecked(36.72, -4.42),
        Coordinate::new_unchecked(36.73, -4.40),
    ];
    let outcome = client.compute_route(&locations, Costing::Auto).await;
    assert!(outcome.trip().is_some());

    capture.levels()
}

#[tokio::test]
async fn expected_rejections_do_not_warn() {
    for status in [400, 409, 422] {
        let levels = levels_for_primary_status(status).await;
        assert!(
            !levels.contains(&Level::WARN),
            "status {status} logged {levels:?}"
        );
        assert!(levels.contains(&Level::DEBUG), "status {status} logged {levels:?}");
    }
}

#[tokio::test]
async fn server_error_warns_before_fallback() {
    let levels = levels_for_primary_status(500).await;
    assert!(levels.contains(&Level::WARN), "logged {levels:?}");
}

#[tokio::test]
async fn primary_success_logs_nothing_above_debug() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/optimized_route"))
        .respond_with(ResponseTemplate::new(200).set_body_json(trip_body()))
        .mount(&server)
        .await;

    let capture = LevelCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let client = ValhallaClient::new(&ValhallaConfig::for_testing(server.uri())).unwrap();
    let locations = [
        Coordinate::new_unchecked(36.72, -4.42),
        Coordinate::new_unchecked(36.73, -4.40),
    ];
    assert!(client.get_optimal_route(&locations, Costing::Auto).await.is_some());

    let levels = capture.levels();
    assert!(levels.iter().all(|level| *level >= Level::DEBUG), "logged {levels:?}");
}
