use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::batch::{
    BatchCalculationRequest, BatchError, BatchResult, BatchRouteService, BatchStats, BatchStatus,
    CallbackClient, RouteRequest, RouteStatus,
};
use crate::graph::{RouteCalculator, RouteSummary, RoutingError, VehicleProfile};

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(2);

/// A calculator with canned outcomes per origin zip, instrumented to
/// record the peak number of simultaneously active invocations.
struct StubCalculator {
    outcomes: HashMap<String, Result<RouteSummary, ()>>,
    delay: Duration,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl StubCalculator {
    fn new(outcomes: &[(&str, Result<RouteSummary, ()>)]) -> Arc<StubCalculator> {
        Arc::new(StubCalculator {
            outcomes: outcomes
                .iter()
                .map(|(zip, outcome)| (zip.to_string(), *outcome))
                .collect(),
            delay: Duration::from_millis(20),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouteCalculator for StubCalculator {
    async fn calculate_route(
        &self,
        origin_zip: &str,
        _dest_zip: &str,
        _profile: VehicleProfile,
    ) -> Result<RouteSummary, RoutingError> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(active, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        match self.outcomes.get(origin_zip) {
            Some(Ok(summary)) => Ok(*summary),
            _ => Err(RoutingError::NoLegalRoute),
        }
    }
}

fn ok(distance_miles: f64, time_minutes: f64) -> Result<RouteSummary, ()> {
    Ok(RouteSummary {
        distance_miles,
        time_minutes,
    })
}

fn request(id: &str, origin: &str, dest: &str) -> RouteRequest {
    RouteRequest {
        id: id.to_string(),
        origin_zip: origin.to_string(),
        dest_zip: dest.to_string(),
        vehicle_type: String::new(),
    }
}

#[tokio::test]
async fn partial_batch_scenario() {
    let calculator = StubCalculator::new(&[
        ("11111", ok(100.0, 120.0)),
        ("33333", Err(())),
        ("55555", ok(50.0, 60.0)),
    ]);
    let service = BatchRouteService::new(Arc::clone(&calculator), 2, CALLBACK_TIMEOUT).unwrap();

    let result = service
        .process(BatchCalculationRequest {
            id: "b-1".into(),
            routes: vec![
                request("A->B", "11111", "22222"),
                request("C->D", "33333", "44444"),
                request("E->F", "55555", "66666"),
            ],
            callback_url: None,
        })
        .await
        .expect("batch input is well-formed");

    assert_eq!(result.status, BatchStatus::Partial);
    assert_eq!(result.stats.total_routes, 3);
    assert_eq!(result.stats.successful_routes, 2);
    assert_eq!(result.stats.failed_routes, 1);
    assert_eq!(result.stats.total_routes, result.results.len());
    assert_eq!(
        result.stats.average_time_ms,
        result.stats.total_time_ms / 3
    );

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].id, "C->D");
    assert_eq!(
        result.errors[0].message,
        RoutingError::NoLegalRoute.to_string()
    );

    let failed = result
        .results
        .iter()
        .find(|r| r.id == "C->D")
        .expect("failed route is present in results");
    assert_eq!(failed.status, RouteStatus::Error);
    assert!(failed.error.is_some());

    // The instrumented calculator never saw more than two in flight.
    assert!(calculator.peak() <= 2, "peak was {}", calculator.peak());
}

#[tokio::test]
async fn concurrency_never_exceeds_the_bound() {
    let calculator = StubCalculator::new(&[("11111", ok(10.0, 12.0))]);
    let service = BatchRouteService::new(Arc::clone(&calculator), 3, CALLBACK_TIMEOUT).unwrap();

    let routes = (0..16)
        .map(|i| request(&format!("r{i}"), "11111", "22222"))
        .collect();

    let result = service
        .process(BatchCalculationRequest {
            id: "b-2".into(),
            routes,
            callback_url: None,
        })
        .await
        .unwrap();

    assert_eq!(result.stats.total_routes, 16);
    assert_eq!(result.status, BatchStatus::Completed);
    assert!(calculator.peak() <= 3, "peak was {}", calculator.peak());
}

#[tokio::test]
async fn all_failures_mark_the_batch_failed() {
    let calculator = StubCalculator::new(&[]);
    let service = BatchRouteService::new(calculator, 2, CALLBACK_TIMEOUT).unwrap();

    let result = service
        .process(BatchCalculationRequest {
            id: "b-3".into(),
            routes: vec![request("x", "11111", "22222")],
            callback_url: None,
        })
        .await
        .unwrap();

    assert_eq!(result.status, BatchStatus::Failed);
    assert_eq!(result.stats.successful_routes, 0);
    assert_eq!(result.stats.average_time_ms, 0);
}

#[tokio::test]
async fn empty_vehicle_type_defaults_to_truck() {
    let calculator = StubCalculator::new(&[("11111", ok(10.0, 12.0))]);
    let service = BatchRouteService::new(calculator, 2, CALLBACK_TIMEOUT).unwrap();

    let result = service
        .process(BatchCalculationRequest {
            id: "b-4".into(),
            routes: vec![request("x", "11111", "22222")],
            callback_url: None,
        })
        .await
        .unwrap();

    assert_eq!(result.results[0].vehicle_type, "truck");
}

#[tokio::test]
async fn malformed_input_is_the_only_call_level_failure() {
    let calculator = StubCalculator::new(&[]);
    let service = BatchRouteService::new(calculator, 2, CALLBACK_TIMEOUT).unwrap();

    let missing_id = service
        .process(BatchCalculationRequest {
            id: String::new(),
            routes: vec![request("x", "11111", "22222")],
            callback_url: None,
        })
        .await;
    assert!(matches!(missing_id, Err(BatchError::MissingBatchId)));

    let empty = service
        .process(BatchCalculationRequest {
            id: "b-5".into(),
            routes: Vec::new(),
            callback_url: None,
        })
        .await;
    assert!(matches!(empty, Err(BatchError::EmptyBatch(_))));
}

#[test]
fn stats_invariants() {
    let stats = BatchStats::aggregate(3, 2, 300);
    assert_eq!(stats.successful_routes + stats.failed_routes, stats.total_routes);
    assert_eq!(stats.average_time_ms, 100);
    assert_eq!(stats.status(), BatchStatus::Partial);

    assert_eq!(BatchStats::aggregate(2, 2, 10).status(), BatchStatus::Completed);
    assert_eq!(BatchStats::aggregate(2, 0, 10).status(), BatchStatus::Failed);
}

/// Accepts a single HTTP request, returns 200, and hands back the raw
/// request bytes for inspection.
async fn one_shot_http_server() -> (std::net::SocketAddr, tokio::task::JoinHandle<String>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);

            if let Some(header_end) = received.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&received[..header_end]).to_lowercase();
                let content_length: usize = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(0);

                if received.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
            .await
            .unwrap();
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&received).to_string()
    });

    (addr, handle)
}

#[tokio::test]
async fn callback_delivery_carries_the_batch_id_header() {
    let (addr, server) = one_shot_http_server().await;

    let result = BatchResult {
        id: "b-77".into(),
        completed_at: Utc::now(),
        status: BatchStatus::Completed,
        results: Vec::new(),
        errors: Vec::new(),
        stats: BatchStats::aggregate(0, 0, 0),
    };

    let client = CallbackClient::new(CALLBACK_TIMEOUT).unwrap();
    client.deliver(&format!("http://{addr}/hook"), &result).await;

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /hook"));
    assert!(request.to_lowercase().contains("x-batch-id: b-77"));
    assert!(request.contains("\"id\":\"b-77\""));
}
