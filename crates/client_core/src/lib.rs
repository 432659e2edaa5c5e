use std::sync::Arc;

use shared::domain::{AppointmentId, AppointmentRecord, UiAppointment};
use tracing::{info, warn};

pub mod error;
pub mod remote;
pub mod store;
pub mod transcoder;
pub mod view;

pub use error::{SyncError, WriteOperation};
pub use remote::{AppointmentService, HttpAppointmentService, MissingAppointmentService, RemoteError};
pub use store::{Action, AppointmentState, AppointmentStore, StoreChange, StoreError, StorePhase};
pub use transcoder::{TranscodeError, Zone};
pub use view::{AppointmentsView, ViewSubscription};

/// Pairs each remote appointment call with the store update describing its outcome.
///
/// Operations are independent: each one dispatches its own result when its
/// remote call settles, so concurrent calls land in the store in the order
/// their responses arrive. The store is shared, so an operation still
/// dispatches after every other handle to this client is gone.
pub struct AppointmentClient {
    store: Arc<AppointmentStore>,
    service: Arc<dyn AppointmentService>,
    zone: Zone,
}

impl AppointmentClient {
    pub fn new(service: Arc<dyn AppointmentService>) -> Arc<Self> {
        Self::new_with_dependencies(AppointmentStore::new(), service, Zone::Local)
    }

    pub fn new_with_dependencies(
        store: Arc<AppointmentStore>,
        service: Arc<dyn AppointmentService>,
        zone: Zone,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            service,
            zone,
        })
    }

    pub fn store(&self) -> &Arc<AppointmentStore> {
        &self.store
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub async fn view(&self) -> AppointmentsView {
        AppointmentsView::project(&*self.store.snapshot().await, self.zone)
    }

    pub fn subscribe(&self) -> ViewSubscription {
        ViewSubscription::new(self.store.subscribe(), self.zone)
    }

    /// Reloads the whole list. Failures end up in the store's `error`, never here.
    pub async fn fetch_appointments(&self) {
        self.store.dispatch(Action::FetchStart).await;
        match self.service.list_appointments().await {
            Ok(appointments) => {
                info!(count = appointments.len(), "appointments: fetched");
                self.store
                    .dispatch(Action::FetchSuccess(appointments))
                    .await;
            }
            Err(err) => {
                let err = SyncError::Fetch(err);
                warn!(error = %err, "appointments: fetch failed");
                self.store.dispatch(Action::FetchError(err.to_string())).await;
            }
        }
    }

    /// Creates `input` remotely and appends the service's copy, in UI shape.
    pub async fn add_appointment(&self, input: UiAppointment) -> Result<UiAppointment, SyncError> {
        match self.create_remote(&input).await {
            Ok(created) => {
                info!(id = ?created.id, "appointments: created");
                self.store
                    .dispatch(Action::Add(AppointmentRecord::from(created.clone())))
                    .await;
                Ok(created)
            }
            Err(err) => Err(self.record_write_failure(err).await),
        }
    }

    /// Replaces the record with `input.id` remotely, then stores `input` itself.
    pub async fn update_appointment(
        &self,
        input: UiAppointment,
    ) -> Result<UiAppointment, SyncError> {
        match self.update_remote(&input).await {
            Ok(id) => {
                info!(%id, "appointments: updated");
                self.store
                    .dispatch(Action::Update(AppointmentRecord::from(input.clone())))
                    .await;
                Ok(input)
            }
            Err(err) => Err(self.record_write_failure(err).await),
        }
    }

    pub async fn delete_appointment(&self, id: AppointmentId) -> Result<(), SyncError> {
        match self.service.delete_appointment(id).await {
            Ok(()) => {
                info!(%id, "appointments: deleted");
                self.store.dispatch(Action::Delete(id)).await;
                Ok(())
            }
            Err(source) => Err(self
                .record_write_failure(SyncError::RemoteWrite {
                    operation: WriteOperation::Delete,
                    source,
                })
                .await),
        }
    }

    async fn create_remote(&self, input: &UiAppointment) -> Result<UiAppointment, SyncError> {
        let operation = WriteOperation::Create;
        let body = self
            .zone
            .encode(input)
            .map_err(|source| SyncError::Encode { operation, source })?;
        let created = self
            .service
            .create_appointment(&body)
            .await
            .map_err(|source| SyncError::RemoteWrite { operation, source })?;
        self.zone
            .decode(&created)
            .map_err(|source| SyncError::RemoteWrite {
                operation,
                source: RemoteError::Unreadable(source),
            })
    }

    async fn update_remote(&self, input: &UiAppointment) -> Result<AppointmentId, SyncError> {
        let operation = WriteOperation::Update;
        let id = input
            .id
            .ok_or_else(|| SyncError::Validation("appointment id is required for update".into()))?;
        let body = self
            .zone
            .encode(input)
            .map_err(|source| SyncError::Encode { operation, source })?;
        self.service
            .update_appointment(id, &body)
            .await
            .map_err(|source| SyncError::RemoteWrite { operation, source })?;
        Ok(id)
    }

    async fn record_write_failure(&self, err: SyncError) -> SyncError {
        warn!(error = %err, "appointments: write failed");
        self.store.dispatch(Action::FetchError(err.to_string())).await;
        err
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
