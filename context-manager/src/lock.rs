//! Per-conversation lock table: a process-wide map of
//! `conversationId -> {lockId, acquiredAt}`, polled at 100ms intervals up to
//! a 3s timeout. Grounded in the teacher's `dashmap::DashMap<String, ...>`
//! per-chat state table (`langgraph-bot::telegram::handler::AgentHandler`).

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::time::Duration as StdDuration;
use uuid::Uuid;

pub const LOCK_TIMEOUT_MS: u64 = 3_000;
pub const LOCK_POLL_INTERVAL_MS: u64 = 100;
pub const ORPHAN_TTL_SECONDS: i64 = 600;

struct LockSlot {
    lock_id: Uuid,
    acquired_at: DateTime<Utc>,
}

/// Guards mutating operations on `ContextMap`s. One slot per conversation.
pub struct LockTable {
    slots: DashMap<String, LockSlot>,
}

impl LockTable {
    pub fn new() -> Self {
        Self { slots: DashMap::new() }
    }

    /// Spins with 100ms polls until the conversation's slot is free or the
    /// 3s timeout elapses, then claims it with a fresh lock id.
    pub async fn acquire_lock(&self, conversation_id: &str) -> cag_core::Result<Uuid> {
        let deadline = Utc::now() + Duration::milliseconds(LOCK_TIMEOUT_MS as i64);
        loop {
            if self.slots.get(conversation_id).is_none() {
                let lock_id = Uuid::new_v4();
                self.slots.insert(conversation_id.to_string(), LockSlot { lock_id, acquired_at: Utc::now() });
                return Ok(lock_id);
            }
            if Utc::now() >= deadline {
                return Err(cag_core::Error::LockTimeout(conversation_id.to_string()));
            }
            tokio::time::sleep(StdDuration::from_millis(LOCK_POLL_INTERVAL_MS)).await;
        }
    }

    /// Releases the slot only if `lock_id` matches the current holder.
    pub fn release_lock(&self, conversation_id: &str, lock_id: Uuid) {
        if let Some(entry) = self.slots.get(conversation_id) {
            if entry.lock_id != lock_id {
                return;
            }
        } else {
            return;
        }
        self.slots.remove(conversation_id);
    }

    /// Drops locks older than the cache TTL, protecting against a holder
    /// that crashed without releasing.
    pub fn sweep_orphans(&self) {
        let cutoff = Utc::now() - Duration::seconds(ORPHAN_TTL_SECONDS);
        self.slots.retain(|_, slot| slot.acquired_at > cutoff);
    }
}

impl Default for LockTable {
    fn default() -> Self {
        Self::new()
    }
}
