//! Custom display names and persisted custom info for game-server players.
//!
//! Commands reach the plugin through two channels: the host's command
//! registry ([`NameCommand`], [`InfoCommand`]) and a catch-all hook that sees
//! every attempted command ([`AmbientCommandObserver`]). Both run the same
//! shared operations; [`RecentCommandLedger`] stops the hook from applying a
//! command the registry just handled, and [`AttributeStore`] keeps custom
//! info across restarts.

pub mod attribute_store;
pub mod commands;
pub mod config;
pub mod effects;
pub mod host;
pub mod ledger;
pub mod observer;
pub mod player;
pub mod plugin;
pub mod probe;

pub use attribute_store::{AttributeStore, LoadSummary, StoreError, CUSTOM_INFO_FILE_NAME};
pub use commands::{
    apply_command, apply_info_command, apply_name_command, Applied, CommandContext,
    CommandResponse, CommandSettings, ExplicitCommand, InfoCommand, NameCommand,
};
pub use config::{load_plugin_config, load_plugin_config_from_env, PluginConfig, PluginConfigError};
pub use effects::{Effect, EffectOutcome, EffectRecord, EffectReport};
pub use host::{HeadlessHost, HostSender, PlayerView, SessionEvent, SessionPlayer};
pub use ledger::{
    Clock, LedgerCheck, LedgerEntry, MonotonicClock, RecentCommandLedger, DEFAULT_DEDUP_WINDOW,
};
pub use observer::{AmbientCommandObserver, ObserveOutcome};
pub use player::{CommandEvent, CommandSender, PlayerError, PlayerHandle};
pub use plugin::{NameInfoPlugin, PLUGIN_AUTHOR, PLUGIN_NAME, PLUGIN_VERSION};
pub use probe::{find_original_nickname, mark_event_handled, DynamicObject, ProbeError, PropertyBag};

pub use name_info_runtime::{CommandKind, Feedback, UserId};
