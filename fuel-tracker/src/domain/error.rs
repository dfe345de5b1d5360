//! Domain error types.
//!
//! These errors represent upstream payloads that could not be turned into
//! validated domain values. They are distinct from transport errors.

/// The payload was present but did not describe a valid station.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedDataError {
    /// The body was not JSON of the expected shape
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// A required field was absent or null
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A coordinate could not be read as a floating point number
    #[error("invalid coordinate {field}: {value:?}")]
    InvalidCoordinate { field: &'static str, value: String },

    /// A price did not match "<digits>,<digits> €/litro"
    #[error("invalid price: {0:?}")]
    InvalidPrice(String),

    /// A timestamp did not match "YYYY-MM-DD HH:MM"
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// A station id was empty
    #[error("invalid station id: {0:?}")]
    InvalidStationId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MalformedDataError::MissingField("Nome");
        assert_eq!(err.to_string(), "missing required field: Nome");

        let err = MalformedDataError::InvalidPrice("1,699".into());
        assert_eq!(err.to_string(), "invalid price: \"1,699\"");

        let err = MalformedDataError::InvalidCoordinate {
            field: "Morada.Latitude",
            value: "north".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid coordinate Morada.Latitude: \"north\""
        );

        let err = MalformedDataError::InvalidTimestamp("01-03-2024".into());
        assert!(err.to_string().contains("01-03-2024"));
    }
}
