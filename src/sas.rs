//! Shared access signature validity window.
//!
//! The container token is issued once per build and is valid for
//! [`SAS_VALIDITY_MONTHS`] calendar months. Nothing renews it; a stack that is
//! not rebuilt before expiry serves an expired token.

use chrono::{DateTime, Months, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{Error, Result};

/// Calendar months between token start and expiry.
pub const SAS_VALIDITY_MONTHS: u32 = 24;

/// Protocols the token may be presented over.
pub const SAS_PROTOCOLS: &str = "https,http";

/// Read-only.
pub const SAS_PERMISSIONS: &str = "r";

/// Token scope: a whole container.
pub const SAS_RESOURCE: &str = "c";

/// Start and expiry of a service SAS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SasWindow {
    start: DateTime<Utc>,
    expiry: DateTime<Utc>,
}

impl SasWindow {
    /// Window starting at `start`.
    ///
    /// Month arithmetic clamps to the last day of the target month, so a
    /// window starting on 29 February expires on 28 February.
    pub fn starting_at(start: DateTime<Utc>) -> Result<Self> {
        let expiry = start
            .checked_add_months(Months::new(SAS_VALIDITY_MONTHS))
            .ok_or_else(|| {
                Error::SasWindow(format!(
                    "{} + {} months is out of range",
                    start, SAS_VALIDITY_MONTHS
                ))
            })?;

        Ok(Self { start, expiry })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }

    /// Start as an ISO-8601 UTC timestamp with milliseconds.
    pub fn start_iso(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Expiry as an ISO-8601 UTC timestamp with milliseconds.
    pub fn expiry_iso(&self) -> String {
        self.expiry.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Expiry in whole seconds since the Unix epoch, as Key Vault expects.
    pub fn expiry_epoch_seconds(&self) -> i64 {
        self.expiry.timestamp()
    }

    /// Returns true when `instant` falls inside the window.
    pub fn is_valid_at(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_expiry_is_24_months_later() {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap();
        let window = SasWindow::starting_at(start).unwrap();
        assert_eq!(
            window.expiry(),
            Utc.with_ymd_and_hms(2026, 3, 15, 10, 30, 0).unwrap()
        );
        assert!(window.expiry() > window.start());
    }

    #[test]
    fn test_iso_format() {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let window = SasWindow::starting_at(start).unwrap();
        assert_eq!(window.start_iso(), "2024-01-02T03:04:05.000Z");
        assert_eq!(window.expiry_iso(), "2026-01-02T03:04:05.000Z");
    }

    #[test]
    fn test_expiry_epoch_seconds() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let window = SasWindow::starting_at(start).unwrap();
        // 2026-01-01T00:00:00Z
        assert_eq!(window.expiry_epoch_seconds(), 1_767_225_600);
    }

    #[test]
    fn test_leap_day_clamps() {
        let start = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        let window = SasWindow::starting_at(start).unwrap();
        assert_eq!(
            window.expiry(),
            Utc.with_ymd_and_hms(2026, 2, 28, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_is_valid_at() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let window = SasWindow::starting_at(start).unwrap();
        assert!(window.is_valid_at(start));
        assert!(!window.is_valid_at(window.expiry()));
        assert!(!window.is_valid_at(start - chrono::Duration::seconds(1)));
    }
}
