use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::trace;

use name_info_runtime::{CommandKind, UserId};

pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(5);

/// Time source for ledger timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry {
    pub command: CommandKind,
    pub handled_at: Instant,
}

/// Result of [`RecentCommandLedger::consume_if_fresh`]. Every variant except
/// `Missing` means an entry was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerCheck {
    Fresh,
    Stale,
    OtherCommand,
    Missing,
}

impl LedgerCheck {
    pub fn is_fresh(self) -> bool {
        matches!(self, LedgerCheck::Fresh)
    }
}

/// Single-shot record of commands the registry path already handled.
///
/// One entry per user; marking overwrites. Reading always consumes, so a
/// mark suppresses at most one later delivery.
pub struct RecentCommandLedger {
    entries: DashMap<UserId, LedgerEntry>,
    clock: Arc<dyn Clock>,
}

impl Default for RecentCommandLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RecentCommandLedger {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(MonotonicClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    pub fn mark_handled(&self, user_id: &UserId, command: CommandKind) {
        if user_id.is_empty() {
            return;
        }
        let entry = LedgerEntry {
            command,
            handled_at: self.clock.now(),
        };
        self.entries.insert(user_id.clone(), entry);
        trace!(
            target: "name_info::ledger",
            %user_id,
            %command,
            "ledger.marked"
        );
    }

    pub fn consume_if_fresh(
        &self,
        user_id: &UserId,
        command: CommandKind,
        window: Duration,
    ) -> LedgerCheck {
        let Some((_, entry)) = self.entries.remove(user_id) else {
            return LedgerCheck::Missing;
        };
        let check = if entry.command != command {
            LedgerCheck::OtherCommand
        } else if self.clock.now().saturating_duration_since(entry.handled_at) < window {
            LedgerCheck::Fresh
        } else {
            LedgerCheck::Stale
        };
        trace!(
            target: "name_info::ledger",
            %user_id,
            %command,
            ?check,
            "ledger.consumed"
        );
        check
    }

    pub fn peek(&self, user_id: &UserId) -> Option<LedgerEntry> {
        self.entries.get(user_id).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
