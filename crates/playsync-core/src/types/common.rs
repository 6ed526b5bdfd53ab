//! Common types shared across the workspace.

use serde::{Deserialize, Serialize};

/// Duration in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Duration(pub u64);

impl Duration {
    pub const fn from_seconds(seconds: u64) -> Self {
        Self(seconds.saturating_mul(1000))
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn as_seconds(&self) -> u64 {
        self.0 / 1000
    }

    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Format as MM:SS or HH:MM:SS.
    pub fn format(&self) -> String {
        let total_secs = self.as_seconds();
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;

        if hours > 0 {
            format!("{hours}:{minutes:02}:{seconds:02}")
        } else {
            format!("{minutes}:{seconds:02}")
        }
    }
}

impl From<std::time::Duration> for Duration {
    fn from(d: std::time::Duration) -> Self {
        Self(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

impl From<Duration> for std::time::Duration {
    fn from(d: Duration) -> Self {
        Self::from_millis(d.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_format() {
        assert_eq!(Duration::from_seconds(0).format(), "0:00");
        assert_eq!(Duration::from_seconds(65).format(), "1:05");
        assert_eq!(Duration::from_seconds(3725).format(), "1:02:05");
    }

    #[test]
    fn test_duration_from_seconds_saturates() {
        assert_eq!(Duration::from_seconds(u64::MAX).as_millis(), u64::MAX);
        assert_eq!(Duration::from_seconds(2).as_millis(), 2000);
    }

    #[test]
    fn test_duration_from_std() {
        let d = Duration::from(std::time::Duration::from_millis(1500));
        assert_eq!(d.as_millis(), 1500);
        assert_eq!(d.as_seconds(), 1);
    }
}
