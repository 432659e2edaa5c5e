//! Appointment state container.
//!
//! State only moves forward through [`reduce`]. [`AppointmentStore`] owns the
//! current state, applies actions one at a time and broadcasts every new state
//! to subscribers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::domain::{AppointmentId, AppointmentRecord};
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

const CHANGE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppointmentState {
    pub appointments: Vec<AppointmentRecord>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    Idle,
    Fetching,
    Errored,
}

impl AppointmentState {
    pub fn phase(&self) -> StorePhase {
        if self.loading {
            StorePhase::Fetching
        } else if self.error.is_some() {
            StorePhase::Errored
        } else {
            StorePhase::Idle
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Action {
    #[serde(rename = "FETCH_APPOINTMENTS_START")]
    FetchStart,
    #[serde(rename = "FETCH_APPOINTMENTS_SUCCESS")]
    FetchSuccess(Vec<AppointmentRecord>),
    #[serde(rename = "FETCH_APPOINTMENTS_ERROR")]
    FetchError(String),
    #[serde(rename = "ADD_APPOINTMENT")]
    Add(AppointmentRecord),
    #[serde(rename = "DELETE_APPOINTMENT")]
    Delete(AppointmentId),
    #[serde(rename = "UPDATE_APPOINTMENT")]
    Update(AppointmentRecord),
}

impl Action {
    pub const KINDS: [&'static str; 6] = [
        "FETCH_APPOINTMENTS_START",
        "FETCH_APPOINTMENTS_SUCCESS",
        "FETCH_APPOINTMENTS_ERROR",
        "ADD_APPOINTMENT",
        "DELETE_APPOINTMENT",
        "UPDATE_APPOINTMENT",
    ];

    pub fn kind(&self) -> &'static str {
        match self {
            Action::FetchStart => Self::KINDS[0],
            Action::FetchSuccess(_) => Self::KINDS[1],
            Action::FetchError(_) => Self::KINDS[2],
            Action::Add(_) => Self::KINDS[3],
            Action::Delete(_) => Self::KINDS[4],
            Action::Update(_) => Self::KINDS[5],
        }
    }

    /// Parses a serialized `{"type": ..., "payload": ...}` action.
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::MalformedAction("missing string `type` field".into()))?;
        if !Self::KINDS.contains(&kind) {
            return Err(StoreError::UnknownAction(kind.to_string()));
        }
        serde_json::from_value(value).map_err(|err| StoreError::MalformedAction(err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown store action {0:?}")]
    UnknownAction(String),
    #[error("malformed store action: {0}")]
    MalformedAction(String),
}

/// Applies `action` to `state`, returning the next state. `state` is left untouched.
pub fn reduce(state: &AppointmentState, action: Action) -> AppointmentState {
    let mut next = state.clone();
    match action {
        Action::FetchStart => next.loading = true,
        Action::FetchSuccess(appointments) => {
            next.loading = false;
            next.appointments = appointments;
        }
        Action::FetchError(message) => {
            next.loading = false;
            next.error = Some(message);
        }
        Action::Add(record) => next.appointments.push(record),
        Action::Delete(id) => next.appointments.retain(|existing| existing.id != Some(id)),
        Action::Update(record) => {
            if let Some(id) = record.id {
                for existing in next
                    .appointments
                    .iter_mut()
                    .filter(|existing| existing.id == Some(id))
                {
                    *existing = record.clone();
                }
            }
        }
    }
    next
}

#[derive(Debug, Clone)]
pub struct StoreChange {
    pub action: &'static str,
    pub state: Arc<AppointmentState>,
}

pub struct AppointmentStore {
    state: RwLock<Arc<AppointmentState>>,
    changes: broadcast::Sender<StoreChange>,
}

impl AppointmentStore {
    pub fn new() -> Arc<Self> {
        Self::with_state(AppointmentState::default())
    }

    pub fn with_state(initial: AppointmentState) -> Arc<Self> {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Arc::new(Self {
            state: RwLock::new(Arc::new(initial)),
            changes,
        })
    }

    pub async fn snapshot(&self) -> Arc<AppointmentState> {
        Arc::clone(&*self.state.read().await)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    pub async fn dispatch(&self, action: Action) -> Arc<AppointmentState> {
        let kind = action.kind();
        let next = {
            let mut guard = self.state.write().await;
            let next = Arc::new(reduce(&guard, action));
            *guard = Arc::clone(&next);
            // Sent under the lock so subscribers see changes in application order.
            let _ = self.changes.send(StoreChange {
                action: kind,
                state: Arc::clone(&next),
            });
            next
        };
        debug!(
            action = kind,
            appointments = next.appointments.len(),
            loading = next.loading,
            "applied store action"
        );
        next
    }

    /// Dispatches a serialized action. Unknown or malformed actions are rejected
    /// and leave the state unchanged.
    pub async fn dispatch_value(&self, value: Value) -> Result<Arc<AppointmentState>, StoreError> {
        match Action::from_value(value) {
            Ok(action) => Ok(self.dispatch(action).await),
            Err(err) => {
                warn!(error = %err, "rejected store action");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
