use super::*;
use axum::{
    extract::{Path, State},
    http::StatusCode as HttpStatus,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use shared::error::ErrorCode;
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct Captured {
    bodies: Arc<Mutex<Vec<Value>>>,
    deleted: Arc<Mutex<Vec<i64>>>,
}

async fn list() -> Json<Value> {
    Json(json!([
        { "id": 1, "title": "Dentist", "date": "2024-05-01T09:30:00Z", "description": "", "attendee": "" },
        { "id": 2, "title": "Gym", "date": "2024-05-02T18:00:00Z", "description": null, "attendee": "Sam" }
    ]))
}

async fn create(State(captured): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
    captured.bodies.lock().await.push(body.clone());
    let mut created = body;
    created["id"] = json!(42);
    Json(created)
}

async fn update(
    State(captured): State<Captured>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<HttpStatus, (HttpStatus, Json<ApiError>)> {
    if id == 404 {
        return Err((
            HttpStatus::NOT_FOUND,
            Json(ApiError::new(ErrorCode::NotFound, "appointment 404 not found")),
        ));
    }
    captured.bodies.lock().await.push(body);
    Ok(HttpStatus::NO_CONTENT)
}

async fn remove(State(captured): State<Captured>, Path(id): Path<i64>) -> HttpStatus {
    captured.deleted.lock().await.push(id);
    HttpStatus::OK
}

async fn spawn_service() -> std::io::Result<(String, Captured)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let captured = Captured::default();
    let app = Router::new()
        .route("/api/appointment", get(list).post(create))
        .route("/api/appointment/:id", put(update).delete(remove))
        .with_state(captured.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), captured))
}

fn wire(title: &str) -> WireAppointment {
    WireAppointment {
        id: None,
        title: title.to_string(),
        date: "2024-06-01T14:00:00.000Z".to_string(),
        description: String::new(),
        attendee: "Bob".to_string(),
    }
}

#[test]
fn endpoint_is_built_from_server_origin() {
    let service = HttpAppointmentService::from_server_url("http://localhost:5137").expect("url");
    assert_eq!(
        service.endpoint().as_str(),
        "http://localhost:5137/api/appointment"
    );
    assert_eq!(
        service.item_url(AppointmentId(9)).expect("item").as_str(),
        "http://localhost:5137/api/appointment/9"
    );
}

#[test]
fn item_url_extends_configured_endpoint_path() {
    let service =
        HttpAppointmentService::new("http://example.test/v2/api/appointment/").expect("url");
    assert_eq!(
        service.item_url(AppointmentId(12)).expect("item").as_str(),
        "http://example.test/v2/api/appointment/12"
    );
}

#[test]
fn invalid_endpoint_is_rejected() {
    assert!(matches!(
        HttpAppointmentService::new("not a url"),
        Err(RemoteError::Url(_))
    ));
}

#[tokio::test]
async fn list_returns_records_as_stored() {
    let (server_url, _captured) = spawn_service().await.expect("spawn server");
    let service = HttpAppointmentService::from_server_url(&server_url).expect("service");

    let records = service.list_appointments().await.expect("list");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title.as_deref(), Some("Dentist"));
    assert_eq!(records[0].date.as_deref(), Some("2024-05-01T09:30:00Z"));
    assert!(records[0].name.is_none());
    assert_eq!(records[1].description, "");
    assert_eq!(records[1].attendee, "Sam");
}

#[tokio::test]
async fn create_posts_body_without_id_and_returns_assigned_id() {
    let (server_url, captured) = spawn_service().await.expect("spawn server");
    let service =
        HttpAppointmentService::new(&format!("{server_url}/api/appointment/")).expect("service");

    let created = service.create_appointment(&wire("Demo")).await.expect("create");
    assert_eq!(created.id, Some(AppointmentId(42)));
    assert_eq!(created.title, "Demo");

    let bodies = captured.bodies.lock().await;
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].get("id").is_none());
    assert_eq!(bodies[0]["attendee"], "Bob");
}

#[tokio::test]
async fn update_accepts_no_content() {
    let (server_url, captured) = spawn_service().await.expect("spawn server");
    let service = HttpAppointmentService::from_server_url(&server_url).expect("service");

    let mut body = wire("Moved");
    body.id = Some(AppointmentId(5));
    let updated = service
        .update_appointment(AppointmentId(5), &body)
        .await
        .expect("update");
    assert!(updated.is_none());
    assert_eq!(captured.bodies.lock().await[0]["id"], 5);
}

#[tokio::test]
async fn update_surfaces_api_error_body() {
    let (server_url, _captured) = spawn_service().await.expect("spawn server");
    let service = HttpAppointmentService::from_server_url(&server_url).expect("service");

    let err = service
        .update_appointment(AppointmentId(404), &wire("Ghost"))
        .await
        .expect_err("should fail");
    match err {
        RemoteError::Api { status, source } => {
            assert_eq!(status, 404);
            assert_eq!(source.code, ErrorCode::NotFound);
            assert_eq!(source.message, "appointment 404 not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn delete_hits_item_route() {
    let (server_url, captured) = spawn_service().await.expect("spawn server");
    let service = HttpAppointmentService::from_server_url(&server_url).expect("service");

    service
        .delete_appointment(AppointmentId(3))
        .await
        .expect("delete");
    assert_eq!(*captured.deleted.lock().await, vec![3]);
}

#[tokio::test]
async fn unmatched_route_reports_status() {
    let (server_url, _captured) = spawn_service().await.expect("spawn server");
    let service =
        HttpAppointmentService::new(&format!("{server_url}/api/missing")).expect("service");

    let err = service.list_appointments().await.expect_err("should fail");
    assert!(matches!(err, RemoteError::Status { status: 404, .. }));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let service =
        HttpAppointmentService::from_server_url(&format!("http://{addr}")).expect("service");
    let err = service.delete_appointment(AppointmentId(1)).await.expect_err("should fail");
    assert!(matches!(err, RemoteError::Transport(_)));
}
