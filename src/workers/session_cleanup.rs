use chrono::{Duration, Utc};

use crate::clock::Clock;
use crate::constants::REVIEW_SESSION_RETENTION_DAYS;
use crate::store::Store;

/// Drop daily locks from previous days and review sessions idle past retention.
pub async fn run(store: &Store, clock: &dyn Clock) {
    tracing::debug!("session_cleanup: start");
    let today = clock.today();
    match store.purge_stale_daily_locks(today) {
        Ok(count) => tracing::info!(cleaned = count, "session_cleanup: daily locks done"),
        Err(e) => tracing::error!(error = %e, "session_cleanup: daily locks failed"),
    }

    let cutoff = Utc::now() - Duration::days(REVIEW_SESSION_RETENTION_DAYS);
    match store.purge_review_sessions_before(cutoff) {
        Ok(count) => tracing::info!(cleaned = count, "session_cleanup: review sessions done"),
        Err(e) => tracing::error!(error = %e, "session_cleanup: review sessions failed"),
    }
}
