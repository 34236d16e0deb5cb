//! Geolocation capability boundary.
//!
//! The engine never tracks location continuously: a single fix is requested
//! per user-triggered "how do I get there" action, and the result arrives
//! as one [`GeolocationOutcome`]. Retry is a user decision, never automatic.

use crate::error::GeolocationFailure;
use crate::Coordinate;

/// Timeout for the one-shot geolocation request, in seconds. A request
/// that outlives this is treated the same as a failure.
pub const GEOLOCATION_TIMEOUT_SECS: u64 = 6;

/// The outcome of a one-shot geolocation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeolocationOutcome {
    /// A fix was delivered.
    Fix(Coordinate),
    /// The user declined the permission prompt.
    Denied,
    /// The runtime has no location capability.
    Unsupported,
    /// No fix arrived within [`GEOLOCATION_TIMEOUT_SECS`].
    TimedOut,
}

impl GeolocationOutcome {
    /// The delivered fix, if any and usable.
    pub fn fix(&self) -> Option<Coordinate> {
        match self {
            GeolocationOutcome::Fix(coord) if coord.is_valid() => Some(*coord),
            _ => None,
        }
    }

    /// The failure kind, if this outcome is a failure. A fix with an
    /// unusable coordinate counts as a timeout-equivalent failure.
    pub fn failure(&self) -> Option<GeolocationFailure> {
        match self {
            GeolocationOutcome::Fix(coord) if coord.is_valid() => None,
            GeolocationOutcome::Fix(_) => Some(GeolocationFailure::TimedOut),
            GeolocationOutcome::Denied => Some(GeolocationFailure::Denied),
            GeolocationOutcome::Unsupported => Some(GeolocationFailure::Unsupported),
            GeolocationOutcome::TimedOut => Some(GeolocationFailure::TimedOut),
        }
    }
}
