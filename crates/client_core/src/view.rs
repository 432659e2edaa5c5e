//! Read-side projection of the store for consumers.

use shared::domain::UiAppointment;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use crate::{
    store::{AppointmentState, StoreChange},
    transcoder::Zone,
};

/// What a consumer renders: every appointment in UI shape plus the status flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentsView {
    pub appointments: Vec<UiAppointment>,
    pub loading: bool,
    pub error: Option<String>,
}

impl AppointmentsView {
    pub fn project(state: &AppointmentState, zone: Zone) -> Self {
        Self {
            appointments: state
                .appointments
                .iter()
                .map(|record| zone.normalize(record))
                .collect(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }
}

/// Yields a freshly projected view after every store change.
pub struct ViewSubscription {
    changes: broadcast::Receiver<StoreChange>,
    zone: Zone,
}

impl ViewSubscription {
    pub(crate) fn new(changes: broadcast::Receiver<StoreChange>, zone: Zone) -> Self {
        Self { changes, zone }
    }

    /// `None` once the store has been dropped.
    pub async fn next(&mut self) -> Option<AppointmentsView> {
        loop {
            match self.changes.recv().await {
                Ok(change) => return Some(AppointmentsView::project(&change.state, self.zone)),
                Err(RecvError::Lagged(skipped)) => {
                    // Each change carries the full state, so the next one catches up.
                    warn!(skipped, "view subscriber lagged behind store changes");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
