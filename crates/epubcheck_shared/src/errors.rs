use crate::byte_stream::Location;
use thiserror::Error;

/// Error that stops a scan or parse before the end of the input. Recoverable findings are
/// reported as diagnostics instead; this is only returned when a caller decides to abort.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{message}{}", fmt_location(.location))]
pub struct CssError {
    /// Error message
    pub message: String,
    /// Location of the error, if available (during parsing mostly)
    pub location: Option<Location>,
}

impl CssError {
    #[must_use]
    pub fn new(message: &str) -> Self {
        CssError {
            message: message.to_string(),
            location: None,
        }
    }

    #[must_use]
    pub fn with_location(message: &str, location: Location) -> Self {
        CssError {
            message: message.to_string(),
            location: Some(location),
        }
    }
}

fn fmt_location(location: &Option<Location>) -> String {
    match location {
        Some(loc) => format!(" at {loc:?}"),
        None => String::new(),
    }
}

pub type CssResult<T> = Result<T, CssError>;
