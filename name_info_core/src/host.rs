//! Headless stand-in for the game-server framework.
//!
//! Players and command events are property bags, so nickname lookup and
//! event marking go through the probes in [`crate::probe`]. A `cmd` line is
//! delivered the way the real server does it: to the registry when the token
//! is an exact command name, then to the ambient hook.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use name_info_runtime::{parse_host_line, CommandKind, Delivery, HostDirective, UserId};

use crate::commands::ExplicitCommand;
use crate::observer::{AmbientCommandObserver, ObserveOutcome};
use crate::player::{CommandEvent, CommandSender, PlayerError, PlayerHandle};
use crate::plugin::NameInfoPlugin;
use crate::probe::{self, DynamicObject, ProbeError, PropertyBag};

const DISPLAY_NAME_FIELD: &str = "DisplayName";
const CUSTOM_INFO_FIELD: &str = "CustomInfo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub message: String,
    pub color: String,
}

/// A connected player backed by a property bag.
#[derive(Debug, Clone)]
pub struct SessionPlayer {
    properties: PropertyBag,
    console: Vec<ConsoleLine>,
}

impl SessionPlayer {
    pub fn new(user_id: &UserId, nickname: Option<&str>) -> Self {
        let mut properties = PropertyBag::new()
            .with_readonly("UserId", user_id.as_str())
            .with_writable(DISPLAY_NAME_FIELD, "")
            .with_writable(CUSTOM_INFO_FIELD, "");
        if let Some(nickname) = nickname {
            properties.define("Nickname", JsonValue::from(nickname), false);
        }
        Self {
            properties,
            console: Vec::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.properties.get_str(DISPLAY_NAME_FIELD).unwrap_or_default()
    }

    pub fn custom_info(&self) -> &str {
        self.properties.get_str(CUSTOM_INFO_FIELD).unwrap_or_default()
    }

    pub fn drain_console(&mut self) -> Vec<ConsoleLine> {
        std::mem::take(&mut self.console)
    }

    fn set_field(&mut self, field: &'static str, value: &str) -> Result<(), PlayerError> {
        self.properties
            .set(field, value)
            .map_err(|err| PlayerError::FieldRejected {
                field,
                reason: err.to_string(),
            })
    }
}

impl PlayerHandle for SessionPlayer {
    fn user_id(&self) -> UserId {
        UserId::from(self.properties.get_str("UserId").unwrap_or_default())
    }

    fn original_nickname(&self) -> Option<String> {
        probe::find_original_nickname(&self.properties)
    }

    fn set_display_name(&mut self, name: &str) -> Result<(), PlayerError> {
        self.set_field(DISPLAY_NAME_FIELD, name)
    }

    fn set_custom_info(&mut self, info: &str) -> Result<(), PlayerError> {
        self.set_field(CUSTOM_INFO_FIELD, info)
    }

    fn send_console_message(&mut self, message: &str, color: &str) {
        self.console.push(ConsoleLine {
            message: message.to_string(),
            color: color.to_string(),
        });
    }
}

pub enum HostSender<'a> {
    Player(&'a mut SessionPlayer),
    Console,
}

impl CommandSender for HostSender<'_> {
    fn as_player(&mut self) -> Option<&mut dyn PlayerHandle> {
        match self {
            HostSender::Player(player) => Some(&mut **player),
            HostSender::Console => None,
        }
    }
}

/// An attempted command as the ambient hook sees it.
pub struct SessionEvent<'a> {
    command: String,
    args: Vec<String>,
    sender: HostSender<'a>,
    properties: PropertyBag,
}

impl<'a> SessionEvent<'a> {
    pub fn new(command: impl Into<String>, args: Vec<String>, sender: HostSender<'a>) -> Self {
        Self {
            command: command.into(),
            args,
            sender,
            properties: PropertyBag::new()
                .with_writable("IsAllowed", true)
                .with_writable("CommandFound", false),
        }
    }

    pub fn command_found(&self) -> bool {
        self.properties.get_bool("CommandFound").unwrap_or(false)
    }
}

impl DynamicObject for SessionEvent<'_> {
    fn read_field(&self, field: &str) -> Result<Option<JsonValue>, ProbeError> {
        self.properties.read_field(field)
    }

    fn write_bool(&mut self, field: &str, value: bool) -> Result<bool, ProbeError> {
        self.properties.write_bool(field, value)
    }
}

impl CommandEvent for SessionEvent<'_> {
    fn command_name(&self) -> &str {
        &self.command
    }

    fn arguments(&self) -> &[String] {
        &self.args
    }

    fn sender(&mut self) -> &mut dyn CommandSender {
        &mut self.sender
    }

    fn mark_handled(&mut self) -> bool {
        probe::mark_event_handled(self)
    }
}

/// Snapshot of a connected player's live fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    pub display_name: String,
    pub custom_info: String,
}

pub struct HeadlessHost {
    plugin: NameInfoPlugin,
    registry: Vec<Box<dyn ExplicitCommand>>,
    observer: Option<AmbientCommandObserver>,
    players: Mutex<HashMap<UserId, SessionPlayer>>,
}

impl HeadlessHost {
    /// Wraps an already enabled plugin and registers its command paths.
    pub fn new(plugin: NameInfoPlugin) -> Self {
        let registry = plugin.commands();
        let observer = plugin.is_active().then(|| plugin.observer());
        Self {
            plugin,
            registry,
            observer,
            players: Mutex::new(HashMap::new()),
        }
    }

    pub fn plugin(&self) -> &NameInfoPlugin {
        &self.plugin
    }

    pub fn player(&self, user_id: &UserId) -> Option<PlayerView> {
        self.players.lock().get(user_id).map(|player| PlayerView {
            display_name: player.display_name().to_string(),
            custom_info: player.custom_info().to_string(),
        })
    }

    /// Applies one protocol line and returns the lines to send back.
    pub fn handle_line(&self, line: &str) -> Vec<String> {
        match parse_host_line(line) {
            Ok(directive) => self.handle_directive(directive),
            Err(err) => {
                warn!(
                    target: "name_info::host",
                    line,
                    error = %err,
                    "host.line_rejected"
                );
                vec![format!("error: {err}")]
            }
        }
    }

    pub fn handle_directive(&self, directive: HostDirective) -> Vec<String> {
        match directive {
            HostDirective::Join { user_id, nickname } => self.join(user_id, nickname),
            HostDirective::Leave { user_id } => {
                if self.players.lock().remove(&user_id).is_some() {
                    info!(target: "name_info::host", %user_id, "player.left");
                    vec![format!("left {user_id}")]
                } else {
                    vec![format!("unknown player {user_id}")]
                }
            }
            HostDirective::Command {
                user_id,
                delivery,
                command,
                args,
            } => {
                let mut players = self.players.lock();
                let Some(player) = players.get_mut(&user_id) else {
                    return vec![format!("unknown player {user_id}")];
                };
                let mut replies = Vec::new();
                let found = self.deliver(delivery, &command, &args, Some(&mut *player), &mut replies);
                replies.extend(
                    player
                        .drain_console()
                        .into_iter()
                        .map(|line| format!("[console:{}] {}", line.color, line.message)),
                );
                if !found {
                    replies.push("Command not found.".to_string());
                }
                replies
            }
            HostDirective::Console { command, args } => {
                let mut replies = Vec::new();
                if !self.deliver(Delivery::Both, &command, &args, None, &mut replies) {
                    replies.push("Command not found.".to_string());
                }
                replies
            }
        }
    }

    fn join(&self, user_id: UserId, nickname: Option<String>) -> Vec<String> {
        let mut player = SessionPlayer::new(&user_id, nickname.as_deref());
        let restored = self.plugin.restore_custom_info(&mut player);
        restored.log_failures(&user_id, CommandKind::Info);
        info!(
            target: "name_info::host",
            %user_id,
            restored_info = !restored.is_empty(),
            "player.joined"
        );
        self.players.lock().insert(user_id.clone(), player);
        vec![format!("joined {user_id}")]
    }

    /// Returns whether any path claimed the command.
    fn deliver(
        &self,
        delivery: Delivery,
        command: &str,
        args: &[String],
        mut player: Option<&mut SessionPlayer>,
        replies: &mut Vec<String>,
    ) -> bool {
        let mut found = false;

        if delivery != Delivery::AmbientOnly {
            let token = command.to_lowercase();
            if let Some(handler) = self.registry.iter().find(|h| h.spec().matches(&token)) {
                let mut sender = match player.as_deref_mut() {
                    Some(player) => HostSender::Player(player),
                    None => HostSender::Console,
                };
                let response = handler.execute(args, &mut sender);
                let status = if response.success { "ok" } else { "fail" };
                replies.push(format!("[{status}] {}", response.message()));
                found = true;
            }
        }

        if delivery != Delivery::ExplicitOnly {
            if let Some(observer) = &self.observer {
                let sender = match player {
                    Some(player) => HostSender::Player(player),
                    None => HostSender::Console,
                };
                let mut event = SessionEvent::new(command, args.to_vec(), sender);
                let outcome = observer.observe(&mut event);
                if matches!(outcome, ObserveOutcome::Deduplicated(_)) {
                    found = true;
                }
                found |= event.command_found();
            }
        }

        found
    }
}
