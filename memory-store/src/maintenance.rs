//! Short-term → long-term spillover, daily compaction, and promotion.
//! Grounded in `memory/src/inmemory_store.rs`'s sort-then-truncate idiom.

use crate::relevance;
use cag_types::Memory;
use chrono::{DateTime, Utc};

pub const SHORT_TERM_CAP: usize = 25;
pub const LONG_TERM_CAP: usize = 100;
const SHORT_TERM_SPILLOVER_MIN_RELEVANCE: f32 = 0.2;
const SHORT_TERM_MAX_AGE_DAYS: i64 = 30;
const PROMOTION_BONUS: f32 = 0.2;

/// Sorts `long_term` by relevance descending and truncates to
/// [`LONG_TERM_CAP`].
fn resort_and_cap_long_term(memory: &mut Memory) {
    memory.long_term.sort_by(|a, b| b.relevance.partial_cmp(&a.relevance).unwrap_or(std::cmp::Ordering::Equal));
    memory.long_term.truncate(LONG_TERM_CAP);
}

/// Prepends `item` to `short_term`; if that overflows [`SHORT_TERM_CAP`],
/// spills the oldest overflow items into `long_term` (when their relevance
/// clears the spillover threshold) and re-caps `long_term`.
pub fn prepend_short_term(memory: &mut Memory, item: cag_types::MemoryItem) {
    memory.short_term.insert(0, item);
    if memory.short_term.len() > SHORT_TERM_CAP {
        let overflow = memory.short_term.split_off(SHORT_TERM_CAP);
        for item in overflow {
            if item.relevance >= SHORT_TERM_SPILLOVER_MIN_RELEVANCE {
                memory.long_term.push(item);
            }
        }
        resort_and_cap_long_term(memory);
    }
    memory.item_count += 1;
}

/// Moves the short-term items whose id is in `ids` to long-term, adding
/// [`PROMOTION_BONUS`] to their relevance (capped at 1.0) and stamping
/// `promoted_at`.
pub fn promote(memory: &mut Memory, ids: &[uuid::Uuid], now: DateTime<Utc>) {
    let mut promoted = Vec::new();
    memory.short_term.retain(|item| {
        if ids.contains(&item.id) {
            let mut item = item.clone();
            item.relevance = (item.relevance + PROMOTION_BONUS).min(1.0);
            item.promoted_at = Some(now);
            promoted.push(item);
            false
        } else {
            true
        }
    });
    memory.long_term.extend(promoted);
    resort_and_cap_long_term(memory);
}

/// Daily maintenance: drops short-term items older than 30 days, then
/// recompacts long-term.
pub fn compact(memory: &mut Memory, now: DateTime<Utc>) {
    memory.short_term.retain(|item| (now - item.timestamp).num_days() < SHORT_TERM_MAX_AGE_DAYS);
    resort_and_cap_long_term(memory);
}

/// Applies read-time decay to `long_term` and drops items whose decayed
/// relevance falls below [`relevance::MIN_RETAINED_RELEVANCE`]. Bumps
/// `access_count`/`last_accessed` on every surviving item in both tiers.
pub fn apply_read_effects(memory: &mut Memory, now: DateTime<Utc>) {
    memory.long_term.retain_mut(|item| {
        let days = (now - item.timestamp).num_days();
        item.relevance = relevance::decay(item.relevance, days);
        item.relevance >= relevance::MIN_RETAINED_RELEVANCE
    });

    for item in memory.short_term.iter_mut().chain(memory.long_term.iter_mut()) {
        item.access_count += 1;
        item.last_accessed = now;
    }
    memory.last_accessed = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use cag_types::MemoryItem;

    #[test]
    fn overflow_short_term_spills_into_long_term() {
        let now = Utc::now();
        let mut memory = Memory::new("c", None, now);
        for i in 0..SHORT_TERM_CAP {
            let mut item = MemoryItem::new(format!("msg{i}"), "resp", 0.5, now);
            item.relevance = 0.5;
            prepend_short_term(&mut memory, item);
        }
        assert_eq!(memory.short_term.len(), SHORT_TERM_CAP);

        let mut overflow_item = MemoryItem::new("overflow", "resp", 0.5, now);
        overflow_item.relevance = 0.5;
        prepend_short_term(&mut memory, overflow_item);

        assert_eq!(memory.short_term.len(), SHORT_TERM_CAP);
        assert_eq!(memory.long_term.len(), 1);
    }

    #[test]
    fn low_relevance_overflow_is_dropped_not_spilled() {
        let now = Utc::now();
        let mut memory = Memory::new("c", None, now);
        for _ in 0..SHORT_TERM_CAP {
            let mut item = MemoryItem::new("m", "r", 0.5, now);
            item.relevance = 0.9;
            prepend_short_term(&mut memory, item);
        }
        let mut low = MemoryItem::new("low relevance", "r", 0.0, now);
        low.relevance = 0.05;
        prepend_short_term(&mut memory, low);

        assert!(memory.long_term.is_empty());
    }

    #[test]
    fn promote_moves_item_and_boosts_relevance() {
        let now = Utc::now();
        let mut memory = Memory::new("c", None, now);
        let mut item = MemoryItem::new("m", "r", 0.5, now);
        item.relevance = 0.5;
        let id = item.id;
        memory.short_term.push(item);

        promote(&mut memory, &[id], now);

        assert!(memory.short_term.is_empty());
        assert_eq!(memory.long_term.len(), 1);
        assert!((memory.long_term[0].relevance - 0.7).abs() < 1e-6);
        assert!(memory.long_term[0].promoted_at.is_some());
    }

    #[test]
    fn promotion_bonus_is_capped_at_one() {
        let now = Utc::now();
        let mut memory = Memory::new("c", None, now);
        let mut item = MemoryItem::new("m", "r", 0.95, now);
        item.relevance = 0.95;
        let id = item.id;
        memory.short_term.push(item);

        promote(&mut memory, &[id], now);
        assert_eq!(memory.long_term[0].relevance, 1.0);
    }

    #[test]
    fn compact_drops_old_short_term_items() {
        let now = Utc::now();
        let mut memory = Memory::new("c", None, now);
        let mut old = MemoryItem::new("old", "r", 0.5, now - chrono::Duration::days(40));
        old.relevance = 0.5;
        memory.short_term.push(old);
        compact(&mut memory, now);
        assert!(memory.short_term.is_empty());
    }

    #[test]
    fn read_effects_decay_and_drop_stale_long_term_items() {
        let now = Utc::now();
        let mut memory = Memory::new("c", None, now);
        let mut item = MemoryItem::new("m", "r", 0.21, now - chrono::Duration::days(60));
        item.relevance = 0.21;
        memory.long_term.push(item);
        apply_read_effects(&mut memory, now);
        assert!(memory.long_term.is_empty());
    }

    #[test]
    fn read_effects_bump_access_count() {
        let now = Utc::now();
        let mut memory = Memory::new("c", None, now);
        let item = MemoryItem::new("m", "r", 0.9, now);
        memory.short_term.push(item);
        apply_read_effects(&mut memory, now);
        assert_eq!(memory.short_term[0].access_count, 1);
    }
}
