//! Unified error handling for the proximity engine.
//!
//! Only genuinely exceptional conditions are errors: upstream fetch failure
//! and geolocation denial/failure/timeout. Absent coordinates and empty
//! result sets are ordinary values and never pass through here.

use std::fmt;

/// How a geolocation request failed.
///
/// The three cases carry distinct user-facing messaging; the portal UI
/// suggests a fallback action for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationFailure {
    /// The user declined the location permission prompt.
    Denied,
    /// The runtime has no location capability.
    Unsupported,
    /// No fix arrived within the timeout.
    TimedOut,
}

/// Unified error type for proximity-engine operations.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The stop/route catalogue could not be loaded from the data store
    CatalogueFetch {
        message: String,
        status_code: Option<u16>,
    },
    /// The point-of-interest record could not be loaded
    PoiFetch { message: String },
    /// A one-shot geolocation request failed
    Geolocation(GeolocationFailure),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::CatalogueFetch {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "Catalogue fetch failed ({}): {}", code, message)
                } else {
                    write!(f, "Catalogue fetch failed: {}", message)
                }
            }
            EngineError::PoiFetch { message } => {
                write!(f, "Point-of-interest fetch failed: {}", message)
            }
            EngineError::Geolocation(GeolocationFailure::Denied) => {
                write!(f, "Geolocation permission denied")
            }
            EngineError::Geolocation(GeolocationFailure::Unsupported) => {
                write!(f, "Geolocation unsupported on this device")
            }
            EngineError::Geolocation(GeolocationFailure::TimedOut) => {
                write!(f, "Geolocation request timed out")
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl EngineError {
    /// User-actionable message for the portal UI, including the suggested
    /// fallback action where one exists.
    pub fn user_message(&self) -> String {
        match self {
            EngineError::CatalogueFetch { .. } => {
                "Could not load transit stops. Check your connection and try again.".to_string()
            }
            EngineError::PoiFetch { .. } => {
                "Could not load this place. Check your connection and try again.".to_string()
            }
            EngineError::Geolocation(GeolocationFailure::Denied) => {
                "Location permission was denied. You can open this route in an external map app instead.".to_string()
            }
            EngineError::Geolocation(GeolocationFailure::Unsupported) => {
                "This device does not support location. You can open this route in an external map app instead.".to_string()
            }
            EngineError::Geolocation(GeolocationFailure::TimedOut) => {
                "Finding your location took too long. Try again, or open an external map app.".to_string()
            }
        }
    }

    /// True when re-triggering the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, EngineError::Geolocation(GeolocationFailure::Unsupported))
    }
}

/// Result type alias for proximity-engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::CatalogueFetch {
            message: "connection reset".to_string(),
            status_code: Some(502),
        };
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("connection reset"));

        let err = EngineError::Geolocation(GeolocationFailure::Denied);
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_user_messages_distinguish_geolocation_failures() {
        let denied = EngineError::Geolocation(GeolocationFailure::Denied).user_message();
        let unsupported = EngineError::Geolocation(GeolocationFailure::Unsupported).user_message();
        let timed_out = EngineError::Geolocation(GeolocationFailure::TimedOut).user_message();

        assert_ne!(denied, unsupported);
        assert_ne!(denied, timed_out);
        assert_ne!(unsupported, timed_out);

        // Each suggests the external-map fallback
        assert!(denied.contains("external map"));
        assert!(unsupported.contains("external map"));
        assert!(timed_out.contains("external map"));
    }

    #[test]
    fn test_retryable() {
        assert!(EngineError::CatalogueFetch {
            message: "timeout".to_string(),
            status_code: None
        }
        .is_retryable());
        assert!(EngineError::Geolocation(GeolocationFailure::TimedOut).is_retryable());
        assert!(!EngineError::Geolocation(GeolocationFailure::Unsupported).is_retryable());
    }
}
