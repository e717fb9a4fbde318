use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::attribute_store::{AttributeStore, LoadSummary, StoreError};
use crate::commands::{CommandContext, CommandSettings, ExplicitCommand, InfoCommand, NameCommand};
use crate::config::PluginConfig;
use crate::effects::{Effect, EffectReport};
use crate::ledger::{Clock, MonotonicClock, RecentCommandLedger};
use crate::observer::AmbientCommandObserver;
use crate::player::PlayerHandle;

pub const PLUGIN_NAME: &str = "JFDCustomNameInfo";
pub const PLUGIN_AUTHOR: &str = "JFDev";
pub const PLUGIN_VERSION: (u16, u16, u16) = (1, 0, 0);

/// Owns the store and ledger and hands out the two command paths.
pub struct NameInfoPlugin {
    config: PluginConfig,
    context: CommandContext,
    active: AtomicBool,
}

impl NameInfoPlugin {
    pub fn new(config: PluginConfig) -> Self {
        Self::with_clock(config, Arc::new(MonotonicClock))
    }

    pub fn with_clock(config: PluginConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(AttributeStore::in_config_dir(&config.config_dir));
        let ledger = Arc::new(RecentCommandLedger::with_clock(clock));
        let context = CommandContext::new(store, ledger, CommandSettings::from(&config));
        Self {
            config,
            context,
            active: AtomicBool::new(false),
        }
    }

    pub fn version_string() -> String {
        let (major, minor, patch) = PLUGIN_VERSION;
        format!("{major}.{minor}.{patch}")
    }

    /// Loads persisted custom info and activates the command paths. A
    /// disabled config leaves the plugin inactive and the store untouched.
    pub fn enable(&self) -> Result<LoadSummary, StoreError> {
        if !self.config.is_enabled {
            info!(
                target: "name_info::plugin",
                plugin = PLUGIN_NAME,
                "plugin.enable_skipped=disabled_in_config"
            );
            return Ok(LoadSummary::default());
        }

        self.active.store(true, Ordering::SeqCst);
        let result = self.context.store.load();
        match &result {
            Ok(summary) => info!(
                target: "name_info::plugin",
                plugin = PLUGIN_NAME,
                version = %Self::version_string(),
                author = PLUGIN_AUTHOR,
                loaded = summary.loaded,
                "plugin.enabled"
            ),
            Err(err) => warn!(
                target: "name_info::plugin",
                plugin = PLUGIN_NAME,
                error = %err,
                "plugin.enabled=without_custom_info"
            ),
        }
        result
    }

    pub fn disable(&self) {
        self.active.store(false, Ordering::SeqCst);
        info!(
            target: "name_info::plugin",
            plugin = PLUGIN_NAME,
            "plugin.disabled"
        );
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<AttributeStore> {
        &self.context.store
    }

    pub fn ledger(&self) -> &Arc<RecentCommandLedger> {
        &self.context.ledger
    }

    pub fn name_command(&self) -> NameCommand {
        NameCommand::new(self.context.clone())
    }

    pub fn info_command(&self) -> InfoCommand {
        InfoCommand::new(self.context.clone())
    }

    /// Handlers to register with the host; empty while inactive.
    pub fn commands(&self) -> Vec<Box<dyn ExplicitCommand>> {
        if !self.is_active() {
            return Vec::new();
        }
        vec![Box::new(self.name_command()), Box::new(self.info_command())]
    }

    pub fn observer(&self) -> AmbientCommandObserver {
        AmbientCommandObserver::new(self.context.clone())
    }

    /// Re-applies stored custom info to a player's live field, typically on join.
    pub fn restore_custom_info(&self, player: &mut dyn PlayerHandle) -> EffectReport {
        let mut effects = EffectReport::new();
        if let Some(info) = self.context.store.get(&player.user_id()) {
            effects.record(Effect::SetLiveInfo, player.set_custom_info(&info));
        }
        effects
    }
}
