use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shared::{
    domain::{AppointmentId, WireAppointment},
    error::{ApiError, ErrorCode},
    protocol::{appointment_route, APPOINTMENTS_ROUTE},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use app_state::AppState;
use config::load_settings;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    let app = build_router(Arc::new(AppState::default()));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "appointment service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            APPOINTMENTS_ROUTE,
            get(http_list_appointments).post(http_create_appointment),
        )
        .route(
            &appointment_route(":id"),
            axum::routing::put(http_update_appointment).delete(http_delete_appointment),
        )
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

fn into_response_error(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!(%status, message = %err.message, "request rejected");
    (status, Json(err))
}

async fn http_list_appointments(State(state): State<Arc<AppState>>) -> Json<Vec<WireAppointment>> {
    Json(api::list_appointments(&state.api).await)
}

async fn http_create_appointment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WireAppointment>,
) -> ApiResult<(StatusCode, Json<WireAppointment>)> {
    let created = api::create_appointment(&state.api, req)
        .await
        .map_err(into_response_error)?;
    info!(id = ?created.id, "appointment created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn http_update_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<WireAppointment>,
) -> ApiResult<Json<WireAppointment>> {
    let updated = api::update_appointment(&state.api, AppointmentId(id), req)
        .await
        .map_err(into_response_error)?;
    info!(id, "appointment updated");
    Ok(Json(updated))
}

async fn http_delete_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    api::delete_appointment(&state.api, AppointmentId(id))
        .await
        .map_err(into_response_error)?;
    info!(id, "appointment deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
