//! Minimum-interval gate for the periodic entry point.
//!
//! This is a simple rate limit against the host's last bank-import job, not
//! a scheduler; the host's periodic task is what actually wakes us up.

use chrono::{DateTime, Duration, Utc};

pub const MIN_INTERVAL_HOURS: i64 = 6;

/// True when enough time has passed since the latest import job (or none
/// exists yet) for another sweep to run.
pub fn due(last_job_created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_job_created {
        Some(created) => created + Duration::hours(MIN_INTERVAL_HOURS) <= now,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_hours_old_is_not_due() {
        let now = Utc::now();
        assert!(!due(Some(now - Duration::hours(5)), now));
    }

    #[test]
    fn seven_hours_old_is_due() {
        let now = Utc::now();
        assert!(due(Some(now - Duration::hours(7)), now));
    }

    #[test]
    fn exactly_six_hours_is_due() {
        let now = Utc::now();
        assert!(due(Some(now - Duration::hours(6)), now));
    }

    #[test]
    fn no_prior_job_is_due() {
        assert!(due(None, Utc::now()));
    }
}
