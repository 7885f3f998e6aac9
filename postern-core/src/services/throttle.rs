use crate::Error;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Per-email minimum reissue interval.
///
/// Repeated issue requests for the same address inside the window are
/// rejected with [`Error::RateLimited`] to keep the issuer from being
/// used for email-bombing. State is process-local: in a multi-instance
/// deployment each node throttles independently while the token store
/// stays shared.
#[derive(Debug)]
pub struct ReissueThrottle {
    min_interval: Duration,
    last_issued: DashMap<String, DateTime<Utc>>,
}

impl ReissueThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_issued: DashMap::new(),
        }
    }

    /// Record an issue attempt for `email`, rejecting it when the
    /// previous one is still inside the window.
    ///
    /// The check and the stamp happen under one map entry lock, so two
    /// racing requests for the same address cannot both pass.
    pub fn check_and_stamp(&self, email: &str, now: DateTime<Utc>) -> Result<(), Error> {
        match self.last_issued.entry(email.to_string()) {
            Entry::Occupied(mut entry) => {
                let elapsed = now - *entry.get();
                if elapsed < self.min_interval {
                    return Err(Error::RateLimited {
                        retry_after: self.min_interval - elapsed,
                    });
                }
                entry.insert(now);
                Ok(())
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                Ok(())
            }
        }
    }

    /// Forget `email`, reopening its window immediately.
    ///
    /// Called when delivery fails so the user can retry without waiting
    /// out the interval.
    pub fn reset(&self, email: &str) {
        self.last_issued.remove(email);
    }

    /// Drop stamps old enough that they no longer throttle anything.
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let before = self.last_issued.len();
        self.last_issued
            .retain(|_, stamped| now - *stamped < self.min_interval);
        before.saturating_sub(self.last_issued.len())
    }
}
