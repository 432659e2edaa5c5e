use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(AppointmentId);

/// Backends commonly emit `null` for empty text columns.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Appointment as exchanged with the remote service: one combined ISO-8601
/// timestamp in `date`, display text in `title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAppointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AppointmentId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attendee: String,
}

/// Appointment as edited by forms and shown in read views.
///
/// `date` is `YYYY-MM-DD` and `time` is `HH:MM`; either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiAppointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AppointmentId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub time: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attendee: String,
}

/// A stored appointment in whichever shape it arrived.
///
/// Records fetched from the service carry `title` and a combined `date`;
/// records echoed back from writes carry `name` plus separate `date`/`time`.
/// Nothing here guarantees which; readers go through display normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AppointmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attendee: String,
}

impl From<WireAppointment> for AppointmentRecord {
    fn from(value: WireAppointment) -> Self {
        Self {
            id: value.id,
            name: None,
            title: Some(value.title),
            date: Some(value.date),
            time: None,
            description: value.description,
            attendee: value.attendee,
        }
    }
}

impl From<UiAppointment> for AppointmentRecord {
    fn from(value: UiAppointment) -> Self {
        Self {
            id: value.id,
            name: Some(value.name),
            title: None,
            date: Some(value.date),
            time: Some(value.time),
            description: value.description,
            attendee: value.attendee,
        }
    }
}
