use std::sync::Arc;

use chrono::DateTime;
use shared::{
    domain::{AppointmentId, WireAppointment},
    error::{ApiError, ErrorCode},
};
use tokio::sync::RwLock;

/// In-memory appointment table. Ids are assigned here and never reused.
#[derive(Clone, Default)]
pub struct AppointmentBook {
    inner: Arc<RwLock<BookInner>>,
}

#[derive(Default)]
struct BookInner {
    last_id: i64,
    rows: Vec<WireAppointment>,
}

#[derive(Clone, Default)]
pub struct ApiContext {
    pub book: AppointmentBook,
}

pub async fn list_appointments(ctx: &ApiContext) -> Vec<WireAppointment> {
    ctx.book.inner.read().await.rows.clone()
}

pub async fn create_appointment(
    ctx: &ApiContext,
    mut appointment: WireAppointment,
) -> Result<WireAppointment, ApiError> {
    validate(&appointment)?;
    let mut inner = ctx.book.inner.write().await;
    inner.last_id += 1;
    appointment.id = Some(AppointmentId(inner.last_id));
    inner.rows.push(appointment.clone());
    Ok(appointment)
}

/// Replaces the whole stored record. The path id wins over any id in the body.
pub async fn update_appointment(
    ctx: &ApiContext,
    id: AppointmentId,
    mut appointment: WireAppointment,
) -> Result<WireAppointment, ApiError> {
    if let Some(body_id) = appointment.id {
        if body_id != id {
            return Err(ApiError::new(
                ErrorCode::Validation,
                format!("body id {body_id} does not match path id {id}"),
            ));
        }
    }
    validate(&appointment)?;
    appointment.id = Some(id);

    let mut inner = ctx.book.inner.write().await;
    let row = inner
        .rows
        .iter_mut()
        .find(|row| row.id == Some(id))
        .ok_or_else(|| not_found(id))?;
    *row = appointment.clone();
    Ok(appointment)
}

pub async fn delete_appointment(ctx: &ApiContext, id: AppointmentId) -> Result<(), ApiError> {
    let mut inner = ctx.book.inner.write().await;
    let before = inner.rows.len();
    inner.rows.retain(|row| row.id != Some(id));
    if inner.rows.len() == before {
        return Err(not_found(id));
    }
    Ok(())
}

fn validate(appointment: &WireAppointment) -> Result<(), ApiError> {
    if appointment.title.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "title is required"));
    }
    DateTime::parse_from_rfc3339(&appointment.date).map_err(|err| {
        ApiError::new(
            ErrorCode::Validation,
            format!("date {:?} is not an ISO-8601 timestamp: {err}", appointment.date),
        )
    })?;
    Ok(())
}

fn not_found(id: AppointmentId) -> ApiError {
    ApiError::new(ErrorCode::NotFound, format!("appointment {id} not found"))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
