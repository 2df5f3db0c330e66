//! Wire-format helpers for fields whose JSON shape varies across endpoints

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serializer, de};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw date shapes seen on the wire
///
/// - `"2024-01-15"`
/// - `"2024-01-15T10:30:00Z"` or any RFC 3339 timestamp
/// - `"2024-01-15T10:30:00"` (no offset)
/// - `[2024, 1, 15]` (array-encoded local dates)
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(String),
    Parts(Vec<i64>),
}

/// Parse a calendar date, dropping any time-of-day component
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

fn from_raw<E: de::Error>(raw: RawDate) -> Result<NaiveDate, E> {
    match raw {
        RawDate::Text(s) => {
            parse_calendar_date(&s).ok_or_else(|| E::custom(format!("invalid date '{}'", s)))
        }
        RawDate::Parts(parts) => match parts.as_slice() {
            [y, m, d, ..] => {
                let invalid = || E::custom(format!("invalid date parts {:?}", parts));
                let year = i32::try_from(*y).map_err(|_| invalid())?;
                let month = u32::try_from(*m).map_err(|_| invalid())?;
                let day = u32::try_from(*d).map_err(|_| invalid())?;
                NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
            }
            _ => Err(E::custom("date array needs year, month and day")),
        },
    }
}

/// Serde adapter for required calendar dates
pub mod calendar_date {
    use super::*;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        from_raw(RawDate::deserialize(deserializer)?)
    }
}

/// Serde adapter for optional calendar dates (`null` and absent both map to `None`)
pub mod optional_calendar_date {
    use super::*;

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_str(&d.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<RawDate>::deserialize(deserializer)? {
            Some(RawDate::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(raw) => from_raw(raw).map(Some),
            None => Ok(None),
        }
    }
}

/// Serde adapter rejecting negative monetary amounts at decode time
pub mod non_negative_amount {
    use super::*;

    pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(amount, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(de::Error::custom(format!("amount must not be negative, got {}", amount)));
        }
        Ok(amount)
    }
}
