//! Name and info commands: the shared operations and the registry entry
//! points that call them.

use std::convert::Infallible;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use name_info_runtime::{join_arguments, CommandKind, CommandSpec, Feedback, UserId};

use crate::attribute_store::AttributeStore;
use crate::config::PluginConfig;
use crate::effects::{Effect, EffectReport};
use crate::ledger::RecentCommandLedger;
use crate::player::{CommandSender, PlayerHandle};

/// Runtime knobs shared by both command paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSettings {
    pub dedup_window: Duration,
    pub max_nickname_chars: usize,
    pub command_prefixes: Vec<char>,
    pub console_color: String,
    pub debug: bool,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self::from(&PluginConfig::default())
    }
}

impl From<&PluginConfig> for CommandSettings {
    fn from(config: &PluginConfig) -> Self {
        Self {
            dedup_window: config.dedup_window(),
            max_nickname_chars: config.max_nickname_chars,
            command_prefixes: config.command_prefixes.clone(),
            console_color: config.console_color.clone(),
            debug: config.debug,
        }
    }
}

/// State injected into every handler.
#[derive(Clone)]
pub struct CommandContext {
    pub store: Arc<AttributeStore>,
    pub ledger: Arc<RecentCommandLedger>,
    pub settings: Arc<CommandSettings>,
}

impl CommandContext {
    pub fn new(
        store: Arc<AttributeStore>,
        ledger: Arc<RecentCommandLedger>,
        settings: CommandSettings,
    ) -> Self {
        Self {
            store,
            ledger,
            settings: Arc::new(settings),
        }
    }
}

/// Result of a shared command operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub feedback: Feedback,
    pub success: bool,
    pub effects: EffectReport,
}

impl Applied {
    fn succeeded(feedback: Feedback, effects: EffectReport) -> Self {
        Self {
            feedback,
            success: true,
            effects,
        }
    }

    fn rejected(feedback: Feedback, effects: EffectReport) -> Self {
        Self {
            feedback,
            success: false,
            effects,
        }
    }
}

pub fn apply_command(
    ctx: &CommandContext,
    kind: CommandKind,
    player: &mut dyn PlayerHandle,
    args: &[String],
) -> Applied {
    match kind {
        CommandKind::Name => apply_name_command(ctx, player, args),
        CommandKind::Info => apply_info_command(ctx, player, args),
    }
}

/// Sets the display name, or restores the original nickname when `args` is
/// empty. The display name is never persisted.
pub fn apply_name_command(
    ctx: &CommandContext,
    player: &mut dyn PlayerHandle,
    args: &[String],
) -> Applied {
    let mut effects = EffectReport::new();

    if args.is_empty() {
        let (name, feedback) = match player.original_nickname() {
            Some(original) if !original.is_empty() => {
                (original.clone(), Feedback::NicknameResetToOriginal(original))
            }
            _ => (String::new(), Feedback::NicknameReset),
        };
        effects.record(Effect::SetDisplayName, player.set_display_name(&name));
        return Applied::succeeded(feedback, effects);
    }

    let name = join_arguments(args);
    let length = name.chars().count();
    if length == 0 || length > ctx.settings.max_nickname_chars {
        return Applied::rejected(Feedback::NicknameInvalidLength, effects);
    }

    let result = player.set_display_name(&name);
    let set = result.is_ok();
    effects.record(Effect::SetDisplayName, result);
    if set {
        Applied::succeeded(Feedback::NicknameSet(name), effects)
    } else {
        Applied::rejected(Feedback::NicknameError, effects)
    }
}

/// Persists and applies custom info, or clears it when the joined text is
/// empty. Persistence and the live field are attempted independently.
pub fn apply_info_command(
    ctx: &CommandContext,
    player: &mut dyn PlayerHandle,
    args: &[String],
) -> Applied {
    let mut effects = EffectReport::new();
    let user_id = player.user_id();
    let text = join_arguments(args);

    if text.is_empty() {
        effects.record(Effect::PersistInfo, ctx.store.clear(&user_id));
        effects.record(Effect::SetLiveInfo, player.set_custom_info(""));
        return Applied::succeeded(Feedback::CustomInfoReset, effects);
    }

    effects.record(Effect::PersistInfo, ctx.store.set(&user_id, &text));
    effects.record(Effect::SetLiveInfo, player.set_custom_info(&text));
    Applied::succeeded(Feedback::CustomInfoSet, effects)
}

/// What an explicit handler hands back to the command registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub success: bool,
    pub feedback: Feedback,
    pub effects: EffectReport,
}

impl CommandResponse {
    pub fn failure(feedback: Feedback) -> Self {
        Self {
            success: false,
            feedback,
            effects: EffectReport::new(),
        }
    }

    pub fn message(&self) -> String {
        self.feedback.to_string()
    }
}

impl From<Applied> for CommandResponse {
    fn from(applied: Applied) -> Self {
        Self {
            success: applied.success,
            feedback: applied.feedback,
            effects: applied.effects,
        }
    }
}

/// A command the host's registry can invoke directly.
pub trait ExplicitCommand: Send + Sync {
    fn spec(&self) -> &'static CommandSpec;

    fn execute(&self, args: &[String], sender: &mut dyn CommandSender) -> CommandResponse;
}

pub struct NameCommand {
    ctx: CommandContext,
}

impl NameCommand {
    pub fn new(ctx: CommandContext) -> Self {
        Self { ctx }
    }
}

impl ExplicitCommand for NameCommand {
    fn spec(&self) -> &'static CommandSpec {
        CommandKind::Name.spec()
    }

    fn execute(&self, args: &[String], sender: &mut dyn CommandSender) -> CommandResponse {
        execute_explicit(&self.ctx, CommandKind::Name, args, sender)
    }
}

pub struct InfoCommand {
    ctx: CommandContext,
}

impl InfoCommand {
    pub fn new(ctx: CommandContext) -> Self {
        Self { ctx }
    }
}

impl ExplicitCommand for InfoCommand {
    fn spec(&self) -> &'static CommandSpec {
        CommandKind::Info.spec()
    }

    fn execute(&self, args: &[String], sender: &mut dyn CommandSender) -> CommandResponse {
        execute_explicit(&self.ctx, CommandKind::Info, args, sender)
    }
}

pub(crate) fn error_feedback(kind: CommandKind) -> Feedback {
    match kind {
        CommandKind::Name => Feedback::NicknameError,
        CommandKind::Info => Feedback::CustomInfoError,
    }
}

fn execute_explicit(
    ctx: &CommandContext,
    kind: CommandKind,
    args: &[String],
    sender: &mut dyn CommandSender,
) -> CommandResponse {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let Some(player) = sender.as_player() else {
            return CommandResponse::failure(Feedback::PlayersOnly);
        };
        let user_id = player.user_id();
        let mut applied = apply_command(ctx, kind, player, args);
        if applied.success {
            mark_ledger(ctx, &user_id, kind, &mut applied.effects);
        }
        applied.effects.log_failures(&user_id, kind);
        log_applied(ctx, &user_id, kind, &applied, "explicit");
        CommandResponse::from(applied)
    }));

    outcome.unwrap_or_else(|_| {
        error!(
            target: "name_info::commands",
            command = %kind,
            "explicit.panicked"
        );
        CommandResponse::failure(error_feedback(kind))
    })
}

fn mark_ledger(ctx: &CommandContext, user_id: &UserId, kind: CommandKind, effects: &mut EffectReport) {
    ctx.ledger.mark_handled(user_id, kind);
    effects.record(Effect::MarkLedger, Ok::<(), Infallible>(()));
}

pub(crate) fn log_applied(
    ctx: &CommandContext,
    user_id: &UserId,
    kind: CommandKind,
    applied: &Applied,
    path: &'static str,
) {
    if applied.success {
        info!(
            target: "name_info::commands",
            %user_id,
            command = %kind,
            path,
            feedback = %applied.feedback,
            "command.applied"
        );
    } else if ctx.settings.debug {
        debug!(
            target: "name_info::commands",
            %user_id,
            command = %kind,
            path,
            feedback = %applied.feedback,
            "command.rejected"
        );
    }
}
