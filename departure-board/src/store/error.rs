//! Schedule store error types.

/// Errors raised by a schedule store.
///
/// These are whole-store failures; a lookup that finds nothing returns an
/// empty list instead.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading the snapshot file failed
    #[error("failed to read schedule snapshot: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot file is not valid JSON for the expected layout
    #[error("invalid schedule snapshot: {message}")]
    Snapshot { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::Snapshot {
            message: "expected array".into(),
        };
        assert_eq!(err.to_string(), "invalid schedule snapshot: expected array");
    }
}
