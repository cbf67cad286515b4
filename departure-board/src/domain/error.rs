//! Per-record data errors.
//!
//! These describe a single malformed schedule row. They are logged and the
//! row is skipped; they never abort a broadcast.

/// A schedule record that cannot become a departure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// A field needed to display the departure is absent.
    #[error("trip {trip_id}: missing {field}")]
    MissingField {
        trip_id: String,
        field: &'static str,
    },

    /// The clock time cannot be placed on the service day.
    #[error("trip {trip_id}: time out of range")]
    TimeOutOfRange { trip_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RecordError::MissingField {
            trip_id: "T1".into(),
            field: "trip_headsign",
        };
        assert_eq!(err.to_string(), "trip T1: missing trip_headsign");

        let err = RecordError::TimeOutOfRange {
            trip_id: "T2".into(),
        };
        assert_eq!(err.to_string(), "trip T2: time out of range");
    }
}
