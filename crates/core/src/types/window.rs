//! Event time windows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Error returned when an event window is inverted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("event end ({end_at}) is before its start ({start_at})")]
pub struct EventWindowError {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// The time range an event occupies.
///
/// The end never precedes the start. A zero-length window (start equal to
/// end) is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventWindow {
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
}

impl EventWindow {
    /// Build a window from its two bounds.
    ///
    /// # Errors
    ///
    /// Returns [`EventWindowError`] if `end_at` is before `start_at`.
    pub fn new(start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> Result<Self, EventWindowError> {
        if end_at < start_at {
            return Err(EventWindowError { start_at, end_at });
        }
        Ok(Self { start_at, end_at })
    }

    #[must_use]
    pub const fn start_at(&self) -> DateTime<Utc> {
        self.start_at
    }

    #[must_use]
    pub const fn end_at(&self) -> DateTime<Utc> {
        self.end_at
    }

    /// Length of the window.
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.end_at - self.start_at
    }
}

impl<'de> Deserialize<'de> for EventWindow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            start_at: DateTime<Utc>,
            end_at: DateTime<Utc>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.start_at, raw.end_at).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_ordered_window() {
        let window = EventWindow::new(at(9), at(17)).unwrap();
        assert_eq!(window.duration(), chrono::Duration::hours(8));
    }

    #[test]
    fn test_zero_length_window_allowed() {
        assert!(EventWindow::new(at(12), at(12)).is_ok());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let err = EventWindow::new(at(17), at(9)).unwrap_err();
        assert_eq!(err.start_at, at(17));
        assert_eq!(err.end_at, at(9));
    }

    #[test]
    fn test_deserialize_rejects_inverted_window() {
        let json = r#"{"start_at":"2026-03-14T17:00:00Z","end_at":"2026-03-14T09:00:00Z"}"#;
        assert!(serde_json::from_str::<EventWindow>(json).is_err());

        let json = r#"{"start_at":"2026-03-14T09:00:00Z","end_at":"2026-03-14T17:00:00Z"}"#;
        let window: EventWindow = serde_json::from_str(json).unwrap();
        assert_eq!(window.start_at(), at(9));
    }
}
