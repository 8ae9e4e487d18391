//! Standard field value types and their coercion functions.
//!
//! An [`Atom`] names the type of a field's values. [`Atom::field_meta`] returns
//! the [`FieldMeta`] a schema layer would register for a field of that type,
//! for either a backend that stores BSON natively or one that only stores
//! plain JSON (dates and UUIDs as strings).

use bson::{Binary, Bson, spec::BinarySubtype};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metadata::{CoercionFnError, FieldMeta};


const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const TIME_FORMAT: &str = "%H:%M:%S";

const TRUE_STRINGS: [&str; 5] = ["j", "y", "ja", "yes", "true"];

/// How a backend represents typed values at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    /// BSON values are stored as they are (MongoDB, in-memory rows).
    #[default]
    Native,
    /// Only JSON values can be stored; dates and UUIDs are written as strings.
    Json,
}

/// Named value types of model fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Atom {
    Boolean,
    Date,
    DateTime,
    Time,
    Float,
    Integer,
    String,
    Text,
    Memo,
    Url,
    Uuid,
}

impl Atom {
    /// Field metadata for a scalar field of this type.
    pub fn field_meta(self, storage: Storage) -> FieldMeta {
        let meta = FieldMeta::new();

        match (self, storage) {
            (Atom::Boolean, _) => meta.convert(convert_boolean),
            (Atom::Integer, _) => meta.convert(convert_integer),
            (Atom::Float, _) => meta.convert(convert_float),
            (Atom::Date, Storage::Native) => meta.convert(convert_date),
            (Atom::Date, Storage::Json) => meta
                .convert(convert_date)
                .write(|value| write_datetime_string(value, DATE_FORMAT)),
            (Atom::DateTime, Storage::Native) => meta.convert(convert_datetime),
            (Atom::DateTime, Storage::Json) => meta
                .convert(convert_datetime)
                .write(|value| write_datetime_string(value, DATETIME_FORMAT)),
            (Atom::Time, Storage::Native) => meta.convert(convert_time),
            (Atom::Time, Storage::Json) => meta
                .convert(convert_time)
                .write(|value| write_datetime_string(value, TIME_FORMAT)),
            (Atom::Uuid, Storage::Native) => meta.convert(convert_uuid).write(write_uuid_binary),
            (Atom::Uuid, Storage::Json) => meta.convert(convert_uuid),
            (Atom::String | Atom::Text | Atom::Memo | Atom::Url, _) => meta,
        }
    }
}

fn convert_boolean(raw: &str) -> Result<Bson, CoercionFnError> {
    let lowered = raw.trim().to_lowercase();
    Ok(Bson::Boolean(TRUE_STRINGS.contains(&lowered.as_str())))
}

fn convert_integer(raw: &str) -> Result<Bson, CoercionFnError> {
    Ok(Bson::Int64(raw.trim().parse::<i64>()?))
}

fn convert_float(raw: &str) -> Result<Bson, CoercionFnError> {
    Ok(Bson::Double(raw.trim().parse::<f64>()?))
}

fn utc_datetime(value: NaiveDateTime) -> Bson {
    Bson::DateTime(bson::DateTime::from_millis(value.and_utc().timestamp_millis()))
}

fn convert_date(raw: &str) -> Result<Bson, CoercionFnError> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)?;
    Ok(utc_datetime(date.and_time(NaiveTime::MIN)))
}

fn convert_datetime(raw: &str) -> Result<Bson, CoercionFnError> {
    Ok(utc_datetime(NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)?))
}

/// Times are anchored on 1900-01-01, the date `strptime` assumes for a bare time.
fn convert_time(raw: &str) -> Result<Bson, CoercionFnError> {
    let time = NaiveTime::parse_from_str(raw, TIME_FORMAT)?;
    let anchor = NaiveDate::from_ymd_opt(1900, 1, 1).ok_or("invalid anchor date")?;
    Ok(utc_datetime(anchor.and_time(time)))
}

/// Normalizes to the lowercase hyphenated form.
fn convert_uuid(raw: &str) -> Result<Bson, CoercionFnError> {
    Ok(Bson::String(Uuid::parse_str(raw.trim())?.hyphenated().to_string()))
}

fn write_datetime_string(value: Bson, format: &str) -> Result<Bson, CoercionFnError> {
    match value {
        Bson::DateTime(datetime) => {
            let datetime = DateTime::<Utc>::from_timestamp_millis(datetime.timestamp_millis())
                .ok_or("datetime out of range")?;
            Ok(Bson::String(datetime.format(format).to_string()))
        }
        other => Ok(other),
    }
}

fn write_uuid_binary(value: Bson) -> Result<Bson, CoercionFnError> {
    match value {
        Bson::String(text) => Ok(Bson::Binary(Binary {
            subtype: BinarySubtype::Uuid,
            bytes: Uuid::parse_str(&text)?.as_bytes().to_vec(),
        })),
        other => Ok(other),
    }
}
