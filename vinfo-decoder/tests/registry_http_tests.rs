//! Registry client integration tests
//!
//! Each test serves canned JSON from an in-process axum server bound to an
//! ephemeral port and points a real client at it.

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use vinfo_common::config::{RegistrySettings, TomlConfig};
use vinfo_decoder::registry::{NationalRegistryClient, OpenDataClient, RegistryClient};
use vinfo_decoder::templates::MemoryTemplateStore;
use vinfo_decoder::{DateValue, SourceId, VehicleDecoder};

const VIN: &str = "TMBJF73T2B9044629";
const API_KEY: &str = "test-key";
const TIMEOUT: Duration = Duration::from_secs(5);

/// Serve `app` on 127.0.0.1:0 and return its base URL
async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/vehicles", addr)
}

/// Server answering with a fixed status and body
async fn canned(status: StatusCode, body: Value) -> String {
    let app = Router::new().route(
        "/vehicles",
        get(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );
    spawn_server(app).await
}

fn national_payload() -> Value {
    json!({
        "Status": 1,
        "Data": {
            "VIN": VIN,
            "TovarniZnacka": "ŠKODA",
            "ObchodniOznaceni": "OCTAVIA",
            "Typ": "1Z",
            "Varianta": "ACCAYCX01",
            "RokVyroby": 2011,
            "DatumPrvniRegistrace": "2011-03-04T00:00:00",
            "RegistracniZnacka": "5J1 7444",
            "MotorTyp": "CAYC",
            "MotorMaxVykon": "77/4400",
            "MotorZdvihObjem": 1598,
            "Palivo": "NAFTA",
            "PlatnostSTKDo": "14.05.2025",
            "NapravyPneuRafky": "205/55 R16 91V; 195/65R15 91T",
            "PocetMistKSezeni": "5"
        }
    })
}

async fn national_handler(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if headers.get("api_key").and_then(|v| v.to_str().ok()) != Some(API_KEY) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"Status": 0})));
    }
    if params.get("vin").map(String::as_str) == Some(VIN)
        || params.get("plate").map(String::as_str) == Some("5J17444")
    {
        return (StatusCode::OK, Json(national_payload()));
    }
    (StatusCode::OK, Json(json!({"Status": 0, "Data": null})))
}

async fn open_data_handler(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let expected = format!("Bearer {}", API_KEY);
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    match params.get("vin").map(String::as_str) {
        Some(VIN) => (
            StatusCode::OK,
            Json(json!({
                "data": {
                    "brand": "Skoda",
                    "model": "Octavia Combi",
                    "seats": 7,
                    "emissionStandard": "EURO 5",
                    "curbWeight": "1395 kg"
                }
            })),
        ),
        _ => (StatusCode::OK, Json(json!({}))),
    }
}

fn national_client(base_url: &str, api_key: &str) -> NationalRegistryClient {
    NationalRegistryClient::new(&RegistrySettings::new(base_url, api_key), TIMEOUT).unwrap()
}

fn open_data_client(base_url: &str, api_key: &str) -> OpenDataClient {
    OpenDataClient::new(&RegistrySettings::new(base_url, api_key), TIMEOUT).unwrap()
}

// ================================================================================================
// National registry
// ================================================================================================

#[tokio::test]
async fn test_national_maps_full_record() {
    let base_url = spawn_server(Router::new().route("/vehicles", get(national_handler))).await;
    let client = national_client(&base_url, API_KEY);

    let record = client.fetch_by_vin(VIN).await.expect("record");

    assert_eq!(record.source_priority, vec![SourceId::NationalRegistry]);
    assert_eq!(record.vin.as_deref(), Some(VIN));
    assert_eq!(record.make.as_deref(), Some("ŠKODA"));
    assert_eq!(record.manufacturer.as_deref(), Some("ŠKODA"));
    assert_eq!(record.model.as_deref(), Some("OCTAVIA"));
    assert_eq!(record.plate.as_deref(), Some("5J17444"));
    assert_eq!(record.production_year, Some(2011));
    assert_eq!(record.power_kw, Some(77));
    assert_eq!(record.displacement_cc, Some(1598));
    assert_eq!(record.fuel_type.as_deref(), Some("diesel"));
    assert_eq!(record.seats, Some(5));
    assert_eq!(record.type_label.as_deref(), Some("1Z / ACCAYCX01"));
    assert_eq!(
        record.inspection_valid_until.as_ref().map(DateValue::to_string).as_deref(),
        Some("2025-05-14")
    );
    let tyres: Vec<String> = record.tyres.unwrap().into_iter().collect();
    assert_eq!(tyres, vec!["195/65R15 91T", "205/55 R16 91V"]);
}

#[tokio::test]
async fn test_national_plate_lookup() {
    let base_url = spawn_server(Router::new().route("/vehicles", get(national_handler))).await;
    let client = national_client(&base_url, API_KEY);

    let record = client.fetch_by_plate("5J17444").await.expect("record");
    assert_eq!(record.vin.as_deref(), Some(VIN));
    assert_eq!(record.plate.as_deref(), Some("5J17444"));
}

#[tokio::test]
async fn test_national_wrong_key_is_no_data() {
    let base_url = spawn_server(Router::new().route("/vehicles", get(national_handler))).await;
    let client = national_client(&base_url, "wrong-key");

    assert!(client.fetch_by_vin(VIN).await.is_none());
}

#[tokio::test]
async fn test_national_unknown_vin_is_no_data() {
    let base_url = spawn_server(Router::new().route("/vehicles", get(national_handler))).await;
    let client = national_client(&base_url, API_KEY);

    assert!(client.fetch_by_vin("1M8GDM9AXKP042788").await.is_none());
}

#[tokio::test]
async fn test_national_success_envelope() {
    let base_url = canned(
        StatusCode::OK,
        json!({"Success": true, "Data": {"TovarniZnacka": "ŠKODA"}}),
    )
    .await;
    let client = national_client(&base_url, API_KEY);

    let record = client.fetch_by_vin(VIN).await.expect("record");
    assert_eq!(record.make.as_deref(), Some("ŠKODA"));
}

#[tokio::test]
async fn test_national_empty_data_is_no_data() {
    let base_url = canned(StatusCode::OK, json!({"Status": 1, "Data": {}})).await;
    let client = national_client(&base_url, API_KEY);

    assert!(client.fetch_by_vin(VIN).await.is_none());
}

#[tokio::test]
async fn test_server_error_is_no_data() {
    let base_url = canned(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "boom"})).await;

    assert!(national_client(&base_url, API_KEY).fetch_by_vin(VIN).await.is_none());
    assert!(open_data_client(&base_url, API_KEY).fetch_by_vin(VIN).await.is_none());
}

#[tokio::test]
async fn test_malformed_body_is_no_data() {
    let app = Router::new().route("/vehicles", get(|| async { "<html>maintenance</html>" }));
    let base_url = spawn_server(app).await;

    assert!(national_client(&base_url, API_KEY).fetch_by_vin(VIN).await.is_none());
}

#[tokio::test]
async fn test_timeout_is_no_data() {
    let app = Router::new().route(
        "/vehicles",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(national_payload())
        }),
    );
    let base_url = spawn_server(app).await;
    let client = NationalRegistryClient::new(
        &RegistrySettings::new(&base_url, API_KEY),
        Duration::from_millis(200),
    )
    .unwrap();

    assert!(client.fetch_by_vin(VIN).await.is_none());
}

#[tokio::test]
async fn test_unreachable_host_is_no_data() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = national_client(&format!("http://{}/vehicles", addr), API_KEY);
    assert!(client.fetch_by_vin(VIN).await.is_none());
}

// ================================================================================================
// Open-data source
// ================================================================================================

#[tokio::test]
async fn test_open_data_wrapped_payload() {
    let base_url = spawn_server(Router::new().route("/vehicles", get(open_data_handler))).await;
    let client = open_data_client(&base_url, API_KEY);

    let record = client.fetch_by_vin(VIN).await.expect("record");

    assert_eq!(record.source_priority, vec![SourceId::OpenData]);
    assert_eq!(record.make.as_deref(), Some("Skoda"));
    assert_eq!(record.seats, Some(7));
    assert_eq!(record.curb_weight_kg, Some(1395));
    assert_eq!(record.emission_standard.as_deref(), Some("EURO 5"));
}

#[tokio::test]
async fn test_open_data_flat_payload() {
    let base_url = canned(StatusCode::OK, json!({"make": "Audi", "model": "A4"})).await;
    let client = open_data_client(&base_url, API_KEY);

    let record = client.fetch_by_vin(VIN).await.expect("record");
    assert_eq!(record.model.as_deref(), Some("A4"));
}

#[tokio::test]
async fn test_open_data_requires_bearer_token() {
    let base_url = spawn_server(Router::new().route("/vehicles", get(open_data_handler))).await;
    let client = open_data_client(&base_url, "other-key");

    assert!(client.fetch_by_vin(VIN).await.is_none());
}

#[tokio::test]
async fn test_open_data_empty_object_is_no_data() {
    let base_url = spawn_server(Router::new().route("/vehicles", get(open_data_handler))).await;
    let client = open_data_client(&base_url, API_KEY);

    assert!(client.fetch_by_vin("1M8GDM9AXKP042788").await.is_none());
}

// ================================================================================================
// Configuration
// ================================================================================================

#[tokio::test]
async fn test_blank_credentials_disable_client() {
    let client = NationalRegistryClient::new(
        &RegistrySettings::new("http://127.0.0.1:9/vehicles", "   "),
        TIMEOUT,
    )
    .unwrap();

    assert!(!client.is_configured());
    assert!(client.fetch_by_vin(VIN).await.is_none());
}

#[tokio::test]
async fn test_decoder_from_config_combines_registries() {
    // Given: both registries served locally and configured through TOML settings
    let national_url =
        spawn_server(Router::new().route("/vehicles", get(national_handler))).await;
    let open_data_url =
        spawn_server(Router::new().route("/vehicles", get(open_data_handler))).await;
    let config = TomlConfig {
        national_registry: RegistrySettings::new(&national_url, API_KEY),
        open_data: RegistrySettings::new(&open_data_url, API_KEY),
        ..TomlConfig::default()
    };
    let decoder =
        VehicleDecoder::from_config(&config, Arc::new(MemoryTemplateStore::new())).unwrap();

    // When
    let outcome = decoder.decode_by_vin(VIN).await;
    let record = outcome.record.expect("record");

    // Then: national identity wins, open data fills what national lacks
    assert!(outcome.success);
    assert_eq!(record.make.as_deref(), Some("ŠKODA"));
    assert_eq!(record.model.as_deref(), Some("OCTAVIA"));
    assert_eq!(record.seats, Some(5));
    assert_eq!(record.curb_weight_kg, Some(1395));
    assert_eq!(
        record.source_priority,
        vec![SourceId::NationalRegistry, SourceId::OpenData, SourceId::Local]
    );
}
