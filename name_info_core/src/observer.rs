use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use name_info_runtime::{normalize_command_name, CommandKind, Feedback};

use crate::commands::{apply_command, log_applied, CommandContext};
use crate::effects::{Effect, EffectOutcome, EffectReport};
use crate::player::CommandEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserveOutcome {
    /// Not a name or info command.
    Unrelated,
    /// Sent from the console or another non-player sender.
    NotAPlayer,
    /// The registry path handled this command moments ago.
    Deduplicated(CommandKind),
    Applied {
        command: CommandKind,
        feedback: Feedback,
        success: bool,
        effects: EffectReport,
    },
    /// The shared operation panicked; nothing was reported to the user.
    Failed(CommandKind),
}

/// Catch-all hook run for every attempted command, matched by the registry
/// or not. Applies name/info commands the registry did not already handle.
#[derive(Clone)]
pub struct AmbientCommandObserver {
    ctx: CommandContext,
}

impl AmbientCommandObserver {
    pub fn new(ctx: CommandContext) -> Self {
        Self { ctx }
    }

    pub fn observe(&self, event: &mut dyn CommandEvent) -> ObserveOutcome {
        let raw = event.command_name().to_string();
        let token = normalize_command_name(&raw, &self.ctx.settings.command_prefixes);
        let Some(kind) = CommandKind::from_token(&token) else {
            return ObserveOutcome::Unrelated;
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.observe_command(event, kind, &raw)
        }));
        outcome.unwrap_or_else(|_| {
            error!(
                target: "name_info::ambient",
                command = %kind,
                raw = %raw,
                "ambient.panicked"
            );
            ObserveOutcome::Failed(kind)
        })
    }

    fn observe_command(
        &self,
        event: &mut dyn CommandEvent,
        kind: CommandKind,
        raw: &str,
    ) -> ObserveOutcome {
        let settings = &self.ctx.settings;
        let args = event.arguments().to_vec();

        let Some(player) = event.sender().as_player() else {
            return ObserveOutcome::NotAPlayer;
        };
        let user_id = player.user_id();

        let check = self
            .ctx
            .ledger
            .consume_if_fresh(&user_id, kind, settings.dedup_window);
        if check.is_fresh() {
            if settings.debug {
                debug!(
                    target: "name_info::ambient",
                    %user_id,
                    command = %kind,
                    "ambient.skipped=deduplicated"
                );
            }
            return ObserveOutcome::Deduplicated(kind);
        }

        if settings.debug {
            debug!(
                target: "name_info::ambient",
                %user_id,
                raw,
                command = %kind,
                args = %args.join(" "),
                ?check,
                "ambient.received"
            );
        }

        let mut applied = apply_command(&self.ctx, kind, player, &args);
        player.send_console_message(&applied.feedback.to_string(), &settings.console_color);

        if applied.success {
            let outcome = if event.mark_handled() {
                EffectOutcome::Applied
            } else {
                EffectOutcome::Unsupported
            };
            applied.effects.push(Effect::MarkEventHandled, outcome);
        }

        applied.effects.log_failures(&user_id, kind);
        log_applied(&self.ctx, &user_id, kind, &applied, "ambient");

        ObserveOutcome::Applied {
            command: kind,
            feedback: applied.feedback,
            success: applied.success,
            effects: applied.effects,
        }
    }
}
