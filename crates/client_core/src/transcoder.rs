//! Conversion between the wire shape spoken by the appointment service and the
//! UI shape used by forms and read views.
//!
//! Encoding reads the UI `date`/`time` pair as wall-clock time in a [`Zone`] and
//! writes a UTC timestamp. Decoding reads that timestamp back in the same zone.
//! The round trip is exact only while the zone (and its DST rules) is the same
//! on both sides.

use std::{fmt, str::FromStr};

use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    SecondsFormat, TimeZone, Utc,
};
use shared::domain::{AppointmentRecord, UiAppointment, WireAppointment};
use thiserror::Error;

/// Marks a combined timestamp in a stored `date` field.
pub const DATE_TIME_SEPARATOR: char = 'T';

const DAY_FORMAT: &str = "%Y-%m-%d";
const CLOCK_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscodeError {
    #[error("invalid appointment date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid appointment time {0:?}, expected HH:MM")]
    InvalidTime(String),
    #[error("invalid appointment timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("invalid time zone {0:?}, expected `local`, `utc` or an offset like +03:00")]
    InvalidZone(String),
}

/// Wall-clock zone used to interpret UI dates and times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Zone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl Zone {
    pub fn utc() -> Self {
        Zone::Fixed(Utc.fix())
    }

    pub fn encode(&self, ui: &UiAppointment) -> Result<WireAppointment, TranscodeError> {
        self.encode_at(ui, Utc::now())
    }

    /// Like [`Zone::encode`], with `now` standing in for an empty date.
    pub fn encode_at(
        &self,
        ui: &UiAppointment,
        now: DateTime<Utc>,
    ) -> Result<WireAppointment, TranscodeError> {
        match self {
            Zone::Local => encode_for_wire_in(ui, &Local, now),
            Zone::Fixed(offset) => encode_for_wire_in(ui, offset, now),
        }
    }

    pub fn decode(&self, wire: &WireAppointment) -> Result<UiAppointment, TranscodeError> {
        match self {
            Zone::Local => decode_from_wire_in(wire, &Local),
            Zone::Fixed(offset) => decode_from_wire_in(wire, offset),
        }
    }

    pub fn normalize(&self, record: &AppointmentRecord) -> UiAppointment {
        match self {
            Zone::Local => normalize_for_display_in(record, &Local),
            Zone::Fixed(offset) => normalize_for_display_in(record, offset),
        }
    }
}

impl FromStr for Zone {
    type Err = TranscodeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "local" | "" => return Ok(Zone::Local),
            "utc" | "z" => return Ok(Zone::utc()),
            _ => {}
        }

        let invalid = || TranscodeError::InvalidZone(raw.to_string());
        let (sign, rest) = if let Some(rest) = trimmed.strip_prefix('+') {
            (1, rest)
        } else if let Some(rest) = trimmed.strip_prefix('-') {
            (-1, rest)
        } else {
            return Err(invalid());
        };
        if !rest.is_ascii() {
            return Err(invalid());
        }
        let (hours, minutes) = match rest.split_once(':') {
            Some((h, m)) => (h, m),
            None if rest.len() == 4 => rest.split_at(2),
            None => (rest, "0"),
        };
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
            return Err(invalid());
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Zone::Fixed)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Local => f.write_str("local"),
            Zone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

pub fn encode_for_wire(ui: &UiAppointment) -> Result<WireAppointment, TranscodeError> {
    Zone::Local.encode(ui)
}

pub fn decode_from_wire(wire: &WireAppointment) -> Result<UiAppointment, TranscodeError> {
    Zone::Local.decode(wire)
}

pub fn normalize_for_display(record: &AppointmentRecord) -> UiAppointment {
    Zone::Local.normalize(record)
}

pub fn encode_for_wire_in<Tz: TimeZone>(
    ui: &UiAppointment,
    zone: &Tz,
    now: DateTime<Utc>,
) -> Result<WireAppointment, TranscodeError> {
    let instant = if ui.date.trim().is_empty() {
        now
    } else {
        let day = parse_day(ui.date.trim(), zone)?;
        let clock = if ui.time.trim().is_empty() {
            NaiveTime::MIN
        } else {
            parse_clock(ui.time.trim())?
        };
        resolve_local(zone, day.and_time(clock))
    };

    Ok(WireAppointment {
        id: ui.id,
        title: ui.name.clone(),
        date: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
        description: ui.description.clone(),
        attendee: ui.attendee.clone(),
    })
}

pub fn decode_from_wire_in<Tz: TimeZone>(
    wire: &WireAppointment,
    zone: &Tz,
) -> Result<UiAppointment, TranscodeError> {
    let (date, time) = split_timestamp(&wire.date, zone)?;
    Ok(UiAppointment {
        id: wire.id,
        name: wire.title.clone(),
        date,
        time,
        description: wire.description.clone(),
        attendee: wire.attendee.clone(),
    })
}

/// Projects a stored record of either shape onto the UI shape.
///
/// Never fails: a combined timestamp that cannot be parsed keeps its calendar
/// prefix and an empty (or previously stored) time.
pub fn normalize_for_display_in<Tz: TimeZone>(
    record: &AppointmentRecord,
    zone: &Tz,
) -> UiAppointment {
    let name = record
        .name
        .clone()
        .or_else(|| record.title.clone())
        .unwrap_or_default();
    let raw_date = record.date.as_deref().unwrap_or_default();
    let stored_time = record
        .time
        .as_deref()
        .filter(|time| !time.is_empty())
        .map(str::to_string);

    let (date, time) = if raw_date.contains(DATE_TIME_SEPARATOR) {
        match split_timestamp(raw_date, zone) {
            Ok((date, time)) => (date, stored_time.unwrap_or(time)),
            Err(_) => {
                let prefix = raw_date
                    .split(DATE_TIME_SEPARATOR)
                    .next()
                    .unwrap_or_default();
                (prefix.to_string(), stored_time.unwrap_or_default())
            }
        }
    } else {
        (raw_date.to_string(), stored_time.unwrap_or_default())
    };

    UiAppointment {
        id: record.id,
        name,
        date,
        time,
        description: record.description.clone(),
        attendee: record.attendee.clone(),
    }
}

/// Parses a service timestamp. Values without an offset are wall-clock time in `zone`.
pub fn parse_wire_timestamp<Tz: TimeZone>(
    raw: &str,
    zone: &Tz,
) -> Result<DateTime<Utc>, TranscodeError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(resolve_local(zone, naive));
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, DAY_FORMAT) {
        return Ok(resolve_local(zone, day.and_time(NaiveTime::MIN)));
    }
    Err(TranscodeError::InvalidTimestamp(raw.to_string()))
}

fn split_timestamp<Tz: TimeZone>(
    raw: &str,
    zone: &Tz,
) -> Result<(String, String), TranscodeError> {
    if raw.trim().is_empty() {
        return Ok((String::new(), String::new()));
    }
    let local = parse_wire_timestamp(raw, zone)?.with_timezone(zone);
    let naive = local.naive_local();
    Ok((
        naive.format(DAY_FORMAT).to_string(),
        naive.format(CLOCK_FORMAT).to_string(),
    ))
}

fn parse_day<Tz: TimeZone>(raw: &str, zone: &Tz) -> Result<NaiveDate, TranscodeError> {
    if raw.contains(DATE_TIME_SEPARATOR) {
        // A combined timestamp typed into the date field; keep its local day.
        return parse_wire_timestamp(raw, zone)
            .map(|instant| instant.with_timezone(zone).naive_local().date())
            .map_err(|_| TranscodeError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .map_err(|_| TranscodeError::InvalidDate(raw.to_string()))
}

fn parse_clock(raw: &str) -> Result<NaiveTime, TranscodeError> {
    NaiveTime::parse_from_str(raw, CLOCK_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| TranscodeError::InvalidTime(raw.to_string()))
}

fn resolve_local<Tz: TimeZone>(zone: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    if let Some(resolved) = zone.from_local_datetime(&naive).earliest() {
        return resolved.with_timezone(&Utc);
    }
    // Wall-clock time skipped by a DST transition; move forward past the gap.
    zone.from_local_datetime(&(naive + Duration::hours(1)))
        .earliest()
        .map(|resolved| resolved.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
#[path = "tests/transcoder_tests.rs"]
mod tests;
