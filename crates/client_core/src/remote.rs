//! Boundary to the remote appointment service.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{AppointmentId, AppointmentRecord, WireAppointment},
    error::ApiError,
    protocol::appointments_route,
};
use thiserror::Error;
use url::Url;

use crate::transcoder::TranscodeError;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request to appointment service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("appointment service returned {status}: {source}")]
    Api {
        status: u16,
        #[source]
        source: ApiError,
    },
    #[error("appointment service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid appointment service response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("appointment service returned an unreadable appointment: {0}")]
    Unreadable(#[from] TranscodeError),
    #[error("invalid appointment service url: {0}")]
    Url(#[from] url::ParseError),
    #[error("appointment service unavailable: {0}")]
    Unavailable(String),
}

/// Endpoints of the appointment service, one per HTTP route.
#[async_trait]
pub trait AppointmentService: Send + Sync {
    /// Records are returned as stored by the service, without any conversion.
    async fn list_appointments(&self) -> Result<Vec<AppointmentRecord>, RemoteError>;
    async fn create_appointment(
        &self,
        appointment: &WireAppointment,
    ) -> Result<WireAppointment, RemoteError>;
    /// `None` when the service answers without a body.
    async fn update_appointment(
        &self,
        id: AppointmentId,
        appointment: &WireAppointment,
    ) -> Result<Option<WireAppointment>, RemoteError>;
    async fn delete_appointment(&self, id: AppointmentId) -> Result<(), RemoteError>;
}

pub struct MissingAppointmentService;

#[async_trait]
impl AppointmentService for MissingAppointmentService {
    async fn list_appointments(&self) -> Result<Vec<AppointmentRecord>, RemoteError> {
        Err(RemoteError::Unavailable("no appointment service configured".into()))
    }

    async fn create_appointment(
        &self,
        _appointment: &WireAppointment,
    ) -> Result<WireAppointment, RemoteError> {
        Err(RemoteError::Unavailable("no appointment service configured".into()))
    }

    async fn update_appointment(
        &self,
        id: AppointmentId,
        _appointment: &WireAppointment,
    ) -> Result<Option<WireAppointment>, RemoteError> {
        Err(RemoteError::Unavailable(format!(
            "no appointment service configured to update appointment {id}"
        )))
    }

    async fn delete_appointment(&self, id: AppointmentId) -> Result<(), RemoteError> {
        Err(RemoteError::Unavailable(format!(
            "no appointment service configured to delete appointment {id}"
        )))
    }
}

/// JSON-over-HTTP client for the appointment service.
pub struct HttpAppointmentService {
    http: Client,
    endpoint: Url,
}

impl HttpAppointmentService {
    /// `endpoint` is the collection URL, e.g. `http://localhost:5137/api/appointment`.
    pub fn new(endpoint: &str) -> Result<Self, RemoteError> {
        Ok(Self {
            http: Client::new(),
            endpoint: Url::parse(endpoint.trim_end_matches('/'))?,
        })
    }

    /// Builds the collection URL from a bare server origin.
    pub fn from_server_url(server_url: &str) -> Result<Self, RemoteError> {
        let endpoint = Url::parse(server_url)?.join(appointments_route())?;
        Ok(Self {
            http: Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn item_url(&self, id: AppointmentId) -> Result<Url, RemoteError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url)
    }
}

async fn ensure_success(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => Err(RemoteError::Api {
            status: status.as_u16(),
            source: api_error,
        }),
        Err(_) => Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        }),
    }
}

#[async_trait]
impl AppointmentService for HttpAppointmentService {
    async fn list_appointments(&self) -> Result<Vec<AppointmentRecord>, RemoteError> {
        let response = self.http.get(self.endpoint.clone()).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn create_appointment(
        &self,
        appointment: &WireAppointment,
    ) -> Result<WireAppointment, RemoteError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(appointment)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn update_appointment(
        &self,
        id: AppointmentId,
        appointment: &WireAppointment,
    ) -> Result<Option<WireAppointment>, RemoteError> {
        let response = self
            .http
            .put(self.item_url(id)?)
            .json(appointment)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&body)?))
    }

    async fn delete_appointment(&self, id: AppointmentId) -> Result<(), RemoteError> {
        let response = self.http.delete(self.item_url(id)?).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
