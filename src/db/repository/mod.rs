//! Repository layer: entity-scoped database operations.

mod appointment;
mod emergency;
mod medication;
mod report;
mod user;

use chrono::{NaiveDateTime, Timelike};
use uuid::Uuid;

use super::DatabaseError;

pub use appointment::*;
pub use emergency::*;
pub use medication::*;
pub use report::*;
pub use user::*;

/// Storage format for every timestamp column.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current local time at second precision, so it survives a database round trip.
pub fn now_timestamp() -> NaiveDateTime {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

pub(crate) fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).unwrap_or_default()
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_round_trips_through_text() {
        let now = now_timestamp();
        assert_eq!(parse_datetime(&format_datetime(&now)), now);
    }

    #[test]
    fn malformed_timestamp_defaults() {
        assert_eq!(parse_datetime("yesterday"), NaiveDateTime::default());
    }

    #[test]
    fn malformed_uuid_is_constraint_violation() {
        assert!(matches!(
            parse_uuid("not-a-uuid"),
            Err(DatabaseError::ConstraintViolation(_))
        ));
    }
}
