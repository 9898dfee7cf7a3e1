//! Dynamic TTL for the front-of-store cache: base 5 minutes, halved when
//! activity is high, doubled when it is low.

use chrono::Duration;

const BASE_TTL_SECONDS: i64 = 300;
const HIGH_ACTIVITY_THRESHOLD: u64 = 100;
const LOW_ACTIVITY_THRESHOLD: u64 = 10;

/// Computes the cache TTL given the last 24h update count.
pub fn dynamic_ttl(updates_last_24h: u64) -> Duration {
    let seconds = if updates_last_24h > HIGH_ACTIVITY_THRESHOLD {
        BASE_TTL_SECONDS / 2
    } else if updates_last_24h < LOW_ACTIVITY_THRESHOLD {
        BASE_TTL_SECONDS * 2
    } else {
        BASE_TTL_SECONDS
    };
    Duration::seconds(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_activity_halves_ttl() {
        assert_eq!(dynamic_ttl(150).num_seconds(), 150);
    }

    #[test]
    fn low_activity_doubles_ttl() {
        assert_eq!(dynamic_ttl(5).num_seconds(), 600);
    }

    #[test]
    fn moderate_activity_uses_base_ttl() {
        assert_eq!(dynamic_ttl(50).num_seconds(), 300);
    }
}
