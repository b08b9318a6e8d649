use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use health_core::{
    create_app, Aggregation, AppState, CacheProbe, DatabaseProbe, DependencyProbe, Orchestrator,
    ProbeError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn elapsed_ms(body: &str) -> u128 {
    body.strip_suffix(" ms")
        .and_then(|rest| rest.rsplit(" - ").next())
        .and_then(|ms| ms.parse().ok())
        .unwrap_or_else(|| panic!("body has no elapsed time: {}", body))
}

fn healthy(name: &str) -> DependencyProbe {
    DependencyProbe::new(name, Duration::from_secs(1), || async {
        Ok::<(), ProbeError>(())
    })
}

async fn start_mock_cache() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 64];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(b"+PONG\r\n").await;
            });
        }
    });

    addr
}

#[tokio::test]
async fn test_serial_healthcheck_all_working() {
    let orchestrator = Orchestrator::new()
        .add_probe(healthy("database"))
        .add_probe(healthy("cache"));
    let app = create_app(AppState::new(orchestrator));

    let (status, body) = get(app, "/healthcheck").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("WORKING - "), "unexpected body: {}", body);
    assert!(body.ends_with(" ms"));
    elapsed_ms(&body);
}

#[tokio::test]
async fn test_serial_healthcheck_elapsed_includes_delay() {
    let orchestrator = Orchestrator::new()
        .add_probe(healthy("database"))
        .add_probe(healthy("cache"))
        .with_probe_delay(Duration::from_millis(100));
    let app = create_app(AppState::new(orchestrator));

    let (status, body) = get(app, "/healthcheck").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("WORKING - "), "unexpected body: {}", body);
    assert!(elapsed_ms(&body) >= 200, "delay not counted: {}", body);
}

#[tokio::test]
async fn test_healthcheck_with_real_probes() {
    let cache_addr = start_mock_cache().await;
    let config_timeout = Duration::from_secs(2);

    let orchestrator = Orchestrator::new()
        .add_probe(DatabaseProbe::new("sqlite::memory:", config_timeout))
        .add_probe(CacheProbe::new(cache_addr, config_timeout));
    let app = create_app(AppState::new(orchestrator));

    let (status, body) = get(app.clone(), "/healthcheck").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("WORKING - "), "unexpected body: {}", body);

    let (status, body) = get(app, "/parallel-healthcheck").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("WORKING - "), "unexpected body: {}", body);
}

#[tokio::test]
async fn test_serial_healthcheck_times_out_first_probe() {
    let second_calls = Arc::new(AtomicUsize::new(0));
    let calls = second_calls.clone();

    let orchestrator = Orchestrator::new()
        .add_probe(DependencyProbe::new(
            "database",
            Duration::from_secs(3),
            || futures_util::future::pending::<Result<(), ProbeError>>(),
        ))
        .add_probe(DependencyProbe::new(
            "cache",
            Duration::from_secs(3),
            move || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), ProbeError>(())
                }
            },
        ));
    let app = create_app(AppState::new(orchestrator));

    let (status, body) = get(app, "/healthcheck").await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        body.starts_with("NOT WORKING: database Timeout - "),
        "unexpected body: {}",
        body
    );
    let ms = elapsed_ms(&body);
    assert!((3000..3500).contains(&ms), "elapsed {} ms", ms);
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_parallel_healthcheck_races_to_first_failure() {
    let orchestrator = Orchestrator::new()
        .add_probe(DependencyProbe::new(
            "database",
            Duration::from_secs(15),
            || async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<(), ProbeError>(())
            },
        ))
        .add_probe(DependencyProbe::new(
            "cache",
            Duration::from_secs(3),
            || async { Err::<(), ProbeError>(ProbeError::Connection("refused".to_string())) },
        ));
    let app = create_app(AppState::new(orchestrator));

    let start = Instant::now();
    let (status, body) = get(app, "/parallel-healthcheck").await;

    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body.starts_with("NOT WORKING: cache connection error: refused - "),
        "unexpected body: {}",
        body
    );
}

#[tokio::test]
async fn test_parallel_healthcheck_join_all_reports_every_failure() {
    let orchestrator = Orchestrator::new()
        .add_probe(DependencyProbe::new(
            "database",
            Duration::from_millis(100),
            || futures_util::future::pending::<Result<(), ProbeError>>(),
        ))
        .add_probe(DependencyProbe::new(
            "cache",
            Duration::from_secs(1),
            || async { Err::<(), ProbeError>(ProbeError::Protocol("ERR".to_string())) },
        ));
    let state = AppState::new(orchestrator).with_parallel_strategy(Aggregation::JoinAll);
    let app = create_app(state);

    let (status, body) = get(app, "/parallel-healthcheck").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body.starts_with("NOT WORKING: database Timeout; cache protocol error: ERR - "),
        "unexpected body: {}",
        body
    );
}

#[tokio::test]
async fn test_panicking_probe_yields_well_formed_response() {
    let orchestrator = Orchestrator::new()
        .add_probe(DependencyProbe::new(
            "database",
            Duration::from_secs(1),
            || async {
                if true {
                    panic!("unknown driver state");
                }
                Ok::<(), ProbeError>(())
            },
        ))
        .add_probe(healthy("cache"));
    let app = create_app(AppState::new(orchestrator));

    let (status, body) = get(app.clone(), "/healthcheck").await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body.starts_with("NOT WORKING: database unexpected failure: unknown driver state - "),
        "unexpected body: {}",
        body
    );

    let (status, body) = get(app, "/parallel-healthcheck").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("database unexpected failure"));
}

#[tokio::test]
async fn test_single_probe_endpoint() {
    let orchestrator = Orchestrator::new()
        .add_probe(healthy("database"))
        .add_probe(DependencyProbe::new(
            "cache",
            Duration::from_secs(1),
            || async { Err::<(), ProbeError>(ProbeError::Timeout) },
        ));
    let app = create_app(AppState::new(orchestrator));

    let (status, body) = get(app.clone(), "/healthcheck/database").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("WORKING - "));

    let (status, body) = get(app.clone(), "/healthcheck/cache").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.starts_with("NOT WORKING: cache Timeout - "));

    let (status, body) = get(app, "/healthcheck/queue").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Probe 'queue' not found");
}
