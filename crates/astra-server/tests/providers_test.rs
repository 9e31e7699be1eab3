//! Provider integration tests against local mock servers.
//!
//! Each test binds throwaway axum servers on 127.0.0.1 that imitate Overpass
//! or OSRM, so the real reqwest clients, the fallback walk and the
//! degraded-mode cache are exercised end to end.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    routing::{get, post},
    Form, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use astra_osm::{AttemptError, OverpassClient, PlaceProvider, ProviderEndpoint};
use astra_server::{api, config::Config, state::AppState};

#[derive(Default)]
struct MockOverpass {
    hits: HashMap<&'static str, AtomicUsize>,
    queries: Mutex<Vec<String>>,
    down: AtomicBool,
}

impl MockOverpass {
    fn new() -> Arc<Self> {
        let hits = ["ok", "slow", "error", "garbage", "flaky"]
            .into_iter()
            .map(|name| (name, AtomicUsize::new(0)))
            .collect();
        Arc::new(Self {
            hits,
            ..Self::default()
        })
    }

    fn hit(&self, name: &'static str) {
        if let Some(counter) = self.hits.get(name) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn hits(&self, name: &str) -> usize {
        self.hits
            .get(name)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

fn overpass_body() -> Value {
    json!({
        "version": 0.6,
        "elements": [
            {
                "type": "node",
                "id": 1,
                "lat": 6.93,
                "lon": 79.85,
                "tags": { "amenity": "police", "name": "Fort Police", "phone": "119" }
            },
            {
                "type": "way",
                "id": 2,
                "center": { "lat": 6.92, "lon": 79.86 },
                "tags": { "amenity": "hospital" }
            },
            {
                "type": "relation",
                "id": 3,
                "tags": { "amenity": "hospital", "name": "No Geometry" }
            }
        ]
    })
}

async fn ok_handler(
    State(mock): State<Arc<MockOverpass>>,
    Form(form): Form<HashMap<String, String>>,
) -> axum::Json<Value> {
    mock.hit("ok");
    if let Some(query) = form.get("data") {
        mock.queries.lock().unwrap().push(query.clone());
    }
    axum::Json(overpass_body())
}

async fn slow_handler(State(mock): State<Arc<MockOverpass>>) -> axum::Json<Value> {
    mock.hit("slow");
    tokio::time::sleep(Duration::from_secs(3)).await;
    axum::Json(overpass_body())
}

async fn error_handler(State(mock): State<Arc<MockOverpass>>) -> (StatusCode, &'static str) {
    mock.hit("error");
    (StatusCode::GATEWAY_TIMEOUT, "upstream timed out")
}

async fn garbage_handler(State(mock): State<Arc<MockOverpass>>) -> &'static str {
    mock.hit("garbage");
    "<html>rate limited</html>"
}

async fn flaky_handler(
    State(mock): State<Arc<MockOverpass>>,
) -> (StatusCode, axum::Json<Value>) {
    mock.hit("flaky");
    if mock.down.load(Ordering::SeqCst) {
        (StatusCode::SERVICE_UNAVAILABLE, axum::Json(json!({})))
    } else {
        (StatusCode::OK, axum::Json(overpass_body()))
    }
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock");
    let addr = listener.local_addr().expect("mock addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server");
    });
    addr
}

async fn spawn_overpass(mock: Arc<MockOverpass>) -> SocketAddr {
    let router = Router::new()
        .route("/ok", post(ok_handler))
        .route("/slow", post(slow_handler))
        .route("/error", post(error_handler))
        .route("/garbage", post(garbage_handler))
        .route("/flaky", post(flaky_handler))
        .with_state(mock);
    spawn(router).await
}

/// An address nothing listens on.
async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

fn endpoint(addr: SocketAddr, path: &str, timeout: Duration) -> ProviderEndpoint {
    ProviderEndpoint::new(format!("http://{}/{}", addr, path), timeout)
}

fn test_config(overpass_urls: Vec<String>, osrm_url: String) -> Config {
    Config {
        overpass_urls,
        overpass_timeout_s: 1,
        osrm_url,
        retry_backoff_ms: 0,
        ..Config::default()
    }
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, serde_json::from_slice(&bytes).expect("parse json"))
}

fn app(config: Config) -> Router {
    let state = Arc::new(AppState::new(config).expect("build state"));
    api::routes().with_state(state)
}

#[tokio::test]
async fn client_classifies_each_failure() {
    let mock = MockOverpass::new();
    let addr = spawn_overpass(mock.clone()).await;
    let client = OverpassClient::new("astra-tests/1.0").unwrap();
    let timeout = Duration::from_millis(300);

    let elements = client
        .attempt(&endpoint(addr, "ok", timeout), "[out:json];")
        .await
        .unwrap();
    assert_eq!(elements.len(), 3);
    assert_eq!(
        mock.queries.lock().unwrap().clone(),
        vec!["[out:json];".to_string()]
    );

    let err = client
        .attempt(&endpoint(addr, "slow", timeout), "q")
        .await
        .unwrap_err();
    assert_eq!(err, AttemptError::Timeout(timeout));

    let err = client
        .attempt(&endpoint(addr, "error", timeout), "q")
        .await
        .unwrap_err();
    match err {
        AttemptError::Protocol { status, body } => {
            assert_eq!(status, 504);
            assert!(body.contains("upstream timed out"));
        }
        other => panic!("expected protocol error, got {other:?}"),
    }

    let err = client
        .attempt(&endpoint(addr, "garbage", timeout), "q")
        .await
        .unwrap_err();
    assert!(matches!(err, AttemptError::Parse(_)));

    let closed = closed_addr().await;
    let err = client
        .attempt(&endpoint(closed, "ok", timeout), "q")
        .await
        .unwrap_err();
    assert!(matches!(err, AttemptError::Transport(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn nearby_falls_back_past_slow_and_broken_mirrors() {
    let mock = MockOverpass::new();
    let addr = spawn_overpass(mock.clone()).await;
    let config = test_config(
        vec![
            format!("http://{}/slow", addr),
            format!("http://{}/error", addr),
            format!("http://{}/ok", addr),
        ],
        format!("http://{}", closed_addr().await),
    );
    let app = app(config);

    let (status, body) = get_json(&app, "/nearby?lat=6.9271&lon=79.8612&radius_m=1500").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mock.hits("slow"), 2);
    assert_eq!(mock.hits("error"), 1);
    assert_eq!(mock.hits("ok"), 1);

    assert_eq!(body["ok"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(
        body["items"][0],
        json!({ "type": "police", "name": "Fort Police", "lat": 6.93, "lon": 79.85, "phone": "119" })
    );
    assert_eq!(body["items"][1]["name"], "Hospital");
    assert!(body.get("message").is_none());

    let queries = mock.queries.lock().unwrap();
    assert!(queries[0].contains("(around:1500,6.9271,79.8612)"));
}

#[tokio::test]
async fn nearby_serves_cache_when_every_mirror_fails() {
    let mock = MockOverpass::new();
    let addr = spawn_overpass(mock.clone()).await;
    let config = test_config(
        vec![format!("http://{}/flaky", addr)],
        format!("http://{}", closed_addr().await),
    );
    let app = app(config);

    let (_, fresh) = get_json(&app, "/nearby?lat=6.9271&lon=79.8612").await;
    assert_eq!(fresh["ok"], true);

    mock.down.store(true, Ordering::SeqCst);
    let (status, stale) = get_json(&app, "/nearby?lat=6.9271&lon=79.8612").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stale["ok"], true);
    assert_eq!(stale["items"], fresh["items"]);
    assert_eq!(stale["count"], fresh["count"]);
    assert!(stale["message"]
        .as_str()
        .unwrap()
        .contains("showing cached results"));
    // Protocol errors are not retried.
    assert_eq!(mock.hits("flaky"), 2);
}

#[derive(Default)]
struct MockOsrm {
    params: Mutex<Vec<HashMap<String, String>>>,
    paths: Mutex<Vec<(String, String)>>,
}

async fn osrm_handler(
    State(mock): State<Arc<MockOsrm>>,
    Path((profile, coords)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::Json<Value> {
    mock.params.lock().unwrap().push(params);
    mock.paths.lock().unwrap().push((profile.clone(), coords));
    if profile == "boat" {
        return axum::Json(json!({ "code": "NoRoute", "message": "Impossible route" }));
    }
    axum::Json(json!({
        "code": "Ok",
        "routes": [{
            "distance": 1520.3,
            "duration": 1094.6,
            "geometry": {
                "type": "LineString",
                "coordinates": [[79.8612, 6.9271], [79.8650, 6.9300], [79.8700, 6.9350]]
            }
        }]
    }))
}

async fn spawn_osrm(mock: Arc<MockOsrm>) -> SocketAddr {
    let router = Router::new()
        .route("/route/v1/:profile/:coords", get(osrm_handler))
        .with_state(mock);
    spawn(router).await
}

#[tokio::test]
async fn route_decodes_geometry() {
    let mock = Arc::new(MockOsrm::default());
    let addr = spawn_osrm(mock.clone()).await;
    let config = test_config(
        vec![format!("http://{}/api", closed_addr().await)],
        format!("http://{}", addr),
    );
    let app = app(config);

    let (status, body) = get_json(
        &app,
        "/route?start_lat=6.9271&start_lon=79.8612&end_lat=6.935&end_lon=79.87",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["distance_m"], 1520.3);
    assert_eq!(body["duration_s"], 1094.6);
    assert_eq!(
        body["points"],
        json!([
            { "lat": 6.9271, "lon": 79.8612 },
            { "lat": 6.93, "lon": 79.865 },
            { "lat": 6.935, "lon": 79.87 }
        ])
    );

    let paths = mock.paths.lock().unwrap();
    assert_eq!(paths[0], ("foot".to_string(), "79.8612,6.9271;79.87,6.935".to_string()));
    let params = mock.params.lock().unwrap();
    assert_eq!(params[0]["overview"], "full");
    assert_eq!(params[0]["geometries"], "geojson");
    assert_eq!(params[0]["steps"], "false");
}

#[tokio::test]
async fn route_without_result_returns_raw_body() {
    let mock = Arc::new(MockOsrm::default());
    let addr = spawn_osrm(mock).await;
    let config = test_config(
        vec![format!("http://{}/api", closed_addr().await)],
        format!("http://{}", addr),
    );
    let app = app(config);

    let (status, body) = get_json(
        &app,
        "/route?start_lat=6.9&start_lon=79.8&end_lat=7.0&end_lon=80.0&profile=boat",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
    assert_eq!(body["message"], "No route found");
    assert_eq!(body["raw"]["code"], "NoRoute");
}
