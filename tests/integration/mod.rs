//! Integration tests for the front-end against a fake Ponzu content API.
//!
//! Each test starts an in-process axum server speaking the Ponzu
//! `/api/content`, `/api/contents` and `/api/content/create` endpoints on an
//! ephemeral port, then drives the real `PonzuClient` through the router.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::extract::{Multipart, Query, State};
use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use appfront::api::{create_router, AppState};
use appfront::cms::{record_from_form, ContentApi, ContentRecord, PonzuClient, QueryOptions};
use appfront::config::Config;

const BOUNDARY: &str = "integration-boundary";

/// In-memory state of the fake CMS.
#[derive(Default)]
struct FakeCms {
    records: BTreeMap<(String, u64), ContentRecord>,
    /// Raw body served for `/api/contents`, when set.
    contents_body: Option<String>,
    last_query: HashMap<String, String>,
    created: Vec<Vec<(String, String)>>,
    next_id: u64,
}

type Shared = Arc<Mutex<FakeCms>>;

async fn fake_content(
    State(cms): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let cms = cms.lock().unwrap();
    let content_type = query.get("type").cloned().unwrap_or_default();
    let id = query.get("id").and_then(|id| id.parse::<u64>().ok());

    match id.and_then(|id| cms.records.get(&(content_type, id))) {
        Some(record) => json_response(json!({ "data": [record] })),
        None => (StatusCode::NOT_FOUND, "").into_response(),
    }
}

async fn fake_contents(
    State(cms): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut cms = cms.lock().unwrap();
    cms.last_query = query.clone();

    if let Some(body) = cms.contents_body.clone() {
        return ([(header::CONTENT_TYPE, "application/json")], body).into_response();
    }

    let content_type = query.get("type").cloned().unwrap_or_default();
    let records: Vec<&ContentRecord> = cms
        .records
        .iter()
        .filter(|((kind, _), _)| *kind == content_type)
        .map(|(_, record)| record)
        .collect();
    json_response(json!({ "data": records }))
}

async fn fake_create(
    State(cms): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    mut multipart: Multipart,
) -> Response {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        fields.push((name, field.text().await.unwrap()));
    }

    let content_type = query.get("type").cloned().unwrap_or_default();
    let mut cms = cms.lock().unwrap();
    cms.next_id += 1;
    let id = cms.next_id;

    let mut record = record_from_form(&fields);
    record.insert("id".to_string(), json!(id));
    cms.records.insert((content_type.clone(), id), record);
    cms.created.push(fields);

    // Ponzu serializes ids as JSON numbers that clients often read as floats.
    json_response(json!({ "data": [{ "id": id as f64, "status": "public", "type": content_type }] }))
}

fn json_response(value: Value) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], value.to_string()).into_response()
}

/// Start the fake CMS and return its shared state and base URL.
async fn start_fake_cms() -> (Shared, String) {
    let cms: Shared = Arc::new(Mutex::new(FakeCms::default()));

    let app = Router::new()
        .route("/api/content", get(fake_content))
        .route("/api/contents", get(fake_contents))
        .route("/api/content/create", post(fake_create))
        .with_state(cms.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (cms, format!("http://{}", addr))
}

fn seed(cms: &Shared, content_type: &str, id: u64, value: Value) {
    let Value::Object(mut record) = value else {
        panic!("seed value must be an object");
    };
    record.insert("id".to_string(), json!(id));

    let mut cms = cms.lock().unwrap();
    cms.records.insert((content_type.to_string(), id), record);
    cms.next_id = cms.next_id.max(id);
}

fn front_end(host: &str) -> Router {
    let config = Config {
        cms_host: host.to_string(),
        http_timeout_ms: 5_000,
        ..Default::default()
    };
    let client = PonzuClient::new(&config).unwrap();
    create_router(AppState::from_config(&config, Arc::new(client)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<(String, String)>, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

#[tokio::test]
async fn about_page_renders_cms_record() {
    let (cms, host) = start_fake_cms().await;
    seed(
        &cms,
        "About",
        1,
        json!({ "title": "Who we are", "content": "<p>Volunteers since <b>2009</b>.</p>" }),
    );

    let (status, _, body) = send(front_end(&host), get_request("/about")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>Who we are</h1>"));
    assert!(body.contains("<div><p>Volunteers since <b>2009</b>.</p></div>"));
}

#[tokio::test]
async fn events_list_requests_every_record() {
    let (cms, host) = start_fake_cms().await;
    seed(&cms, "Event", 1, json!({ "title": "Open Mic", "details": ["8pm"] }));
    seed(&cms, "Event", 2, json!({ "title": "Jazz <Night>" }));

    let (status, _, body) = send(front_end(&host), get_request("/events")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<a href="/event/1">Open Mic</a>"#));
    assert!(body.contains(r#"<a href="/event/2">Jazz &lt;Night&gt;</a>"#));
    assert!(body.contains("<li>8pm</li>"));

    let query = cms.lock().unwrap().last_query.clone();
    assert_eq!(query.get("type").map(String::as_str), Some("Event"));
    assert_eq!(query.get("count").map(String::as_str), Some("-1"));
    assert_eq!(query.get("offset").map(String::as_str), Some("0"));
    assert_eq!(query.get("order").map(String::as_str), Some("DESC"));
}

#[tokio::test]
async fn events_json_is_byte_for_byte_passthrough() {
    let (cms, host) = start_fake_cms().await;
    let raw = r#"{ "data": [ {"id": 1, "title": "Open Mic"} ], "meta": {"count": 1} }"#;
    cms.lock().unwrap().contents_body = Some(raw.to_string());

    let (status, headers, body) = send(front_end(&host), get_request("/events?format=json")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(header_value(&headers, "content-type"), Some("application/json"));
    assert_eq!(body, raw);
}

#[tokio::test]
async fn form_submission_creates_event_and_redirects() {
    let (cms, host) = start_fake_cms().await;
    seed(&cms, "Event", 4, json!({ "title": "Existing" }));

    let fields = [
        ("title", "Poetry & Pints"),
        ("details.0", "Back room"),
        ("details.1", "Free entry"),
        ("details.2", "Sign-up at 7"),
        ("ticket_link", "https://tickets.example.org/poetry"),
    ];
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    let request = Request::builder()
        .method("POST")
        .uri("/events")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let app = front_end(&host);
    let (status, headers, _) = send(app.clone(), request).await;

    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(header_value(&headers, "location"), Some("/event/5"));

    let sent = cms.lock().unwrap().created[0].clone();
    let expected: Vec<(String, String)> = fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(sent, expected);

    let (status, _, page) = send(app, get_request("/event/5")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("<h3>Poetry &amp; Pints</h3>"));
    assert!(page.contains("<li>Sign-up at 7</li>"));
    assert!(page.contains(r#"<a href="https://tickets.example.org/poetry">Buy Tickets</a>"#));
}

#[tokio::test]
async fn upstream_error_status_is_500_with_message() {
    let (_cms, host) = start_fake_cms().await;

    let (status, _, body) = send(front_end(&host), get_request("/event/77")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("HTTP 404"), "unexpected body: {}", body);
}

#[tokio::test]
async fn malformed_upstream_body_is_500() {
    let (cms, host) = start_fake_cms().await;
    cms.lock().unwrap().contents_body = Some("<html>maintenance</html>".to_string());

    let (status, _, body) = send(front_end(&host), get_request("/events")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("failed to parse content response"));
}

#[tokio::test]
async fn upstream_body_without_data_is_500() {
    let (cms, host) = start_fake_cms().await;
    cms.lock().unwrap().contents_body = Some(r#"{"error":"invalid token"}"#.to_string());

    let (status, _, body) = send(front_end(&host), get_request("/events")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("missing field `data`"), "unexpected body: {}", body);
}

#[tokio::test]
async fn client_sends_paging_options() {
    let (cms, host) = start_fake_cms().await;
    let client = PonzuClient::with_http(reqwest::Client::new(), host);

    let options = QueryOptions {
        count: 5,
        offset: 10,
        ..QueryOptions::default()
    };
    let response = client.contents("Event", &options).await.unwrap();
    assert!(response.data.is_empty());

    let query = cms.lock().unwrap().last_query.clone();
    assert_eq!(query.get("count").map(String::as_str), Some("5"));
    assert_eq!(query.get("offset").map(String::as_str), Some("10"));
}
