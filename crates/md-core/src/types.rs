//! Id, timestamp and money helpers

use chrono::{NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

/// Tolerance for comparing money amounts
pub const MONEY_EPSILON: f64 = 0.01;

/// Build a record id: `PREFIX-` followed by the first 8 hex digits of a v4
/// UUID, upper-cased (`JOB-1A2B3C4D`).
pub fn prefixed_id(prefix: &str) -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, uuid[..8].to_uppercase())
}

/// Current UTC time as an ISO-8601 string
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Today's date in UTC
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Milliseconds since the epoch, used for locally generated ids
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Round to two decimals (kuruş)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whether two amounts are equal within [`MONEY_EPSILON`]
pub fn money_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= MONEY_EPSILON
}
