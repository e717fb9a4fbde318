use std::fmt;

use tracing::warn;

use name_info_runtime::{CommandKind, UserId};

/// Side effects a command may perform. Each is attempted independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    SetDisplayName,
    SetLiveInfo,
    PersistInfo,
    MarkLedger,
    MarkEventHandled,
}

impl Effect {
    pub fn as_str(self) -> &'static str {
        match self {
            Effect::SetDisplayName => "set_display_name",
            Effect::SetLiveInfo => "set_live_info",
            Effect::PersistInfo => "persist_info",
            Effect::MarkLedger => "mark_ledger",
            Effect::MarkEventHandled => "mark_event_handled",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectOutcome {
    Applied,
    /// The target does not support the effect.
    Unsupported,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectRecord {
    pub effect: Effect,
    pub outcome: EffectOutcome,
}

/// Ordered outcomes of the side effects attempted by one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectReport {
    records: Vec<EffectRecord>,
}

impl EffectReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: Effect, outcome: EffectOutcome) {
        self.records.push(EffectRecord { effect, outcome });
    }

    pub fn record<E: fmt::Display>(&mut self, effect: Effect, result: Result<(), E>) {
        let outcome = match result {
            Ok(()) => EffectOutcome::Applied,
            Err(err) => EffectOutcome::Failed(err.to_string()),
        };
        self.push(effect, outcome);
    }

    pub fn outcome(&self, effect: Effect) -> Option<&EffectOutcome> {
        self.records
            .iter()
            .rev()
            .find(|record| record.effect == effect)
            .map(|record| &record.outcome)
    }

    pub fn applied(&self, effect: Effect) -> bool {
        matches!(self.outcome(effect), Some(EffectOutcome::Applied))
    }

    pub fn failures(&self) -> impl Iterator<Item = &EffectRecord> {
        self.records
            .iter()
            .filter(|record| matches!(record.outcome, EffectOutcome::Failed(_)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn log_failures(&self, user_id: &UserId, command: CommandKind) {
        for record in self.failures() {
            if let EffectOutcome::Failed(reason) = &record.outcome {
                warn!(
                    target: "name_info::commands",
                    %user_id,
                    %command,
                    effect = %record.effect,
                    reason = %reason,
                    "effect.failed"
                );
            }
        }
    }
}
