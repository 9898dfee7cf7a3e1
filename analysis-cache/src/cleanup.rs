//! The 30-minute probabilistic decay sweep over the disk tier. Grounded in
//! the teacher's isolated periodic-job style (background work that never
//! panics the caller, only logs and continues).

use crate::disk;
use chrono::Duration;
use std::path::Path;
use tracing::{debug, warn};

const WEEK: i64 = 7;
const THREE_DAYS: i64 = 3;
const ONE_DAY: i64 = 1;

/// Probability an entry older than three days (but not a week) survives a
/// sweep.
const KEEP_PROBABILITY_OVER_THREE_DAYS: f64 = 0.7;
/// Probability an entry older than one day (but not three) survives.
const KEEP_PROBABILITY_OVER_ONE_DAY: f64 = 0.9;

/// Runs one decay sweep: deletes week-old entries unconditionally, and
/// probabilistically thins entries older than three days or one day.
/// Returns the number of entries removed.
pub async fn sweep(dir: &Path) -> cag_core::Result<usize> {
    let now = chrono::Utc::now();
    let ages = disk::list_ages(dir, now).await?;
    let mut removed = 0;

    for (key, age) in ages {
        let days = age.num_days();
        let should_remove = if age > Duration::days(WEEK) {
            true
        } else if days > THREE_DAYS {
            rand::random::<f64>() >= KEEP_PROBABILITY_OVER_THREE_DAYS
        } else if days > ONE_DAY {
            rand::random::<f64>() >= KEEP_PROBABILITY_OVER_ONE_DAY
        } else {
            false
        };

        if should_remove {
            if let Err(e) = disk::remove(dir, &key).await {
                warn!(%key, error = %e, "failed to remove decayed cache entry");
            } else {
                removed += 1;
            }
        }
    }

    debug!(removed, "analysis cache decay sweep complete");
    Ok(removed)
}
