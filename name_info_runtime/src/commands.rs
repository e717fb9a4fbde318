use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable per-session identifier of a connected user.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Commands owned by the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Name,
    Info,
}

impl CommandKind {
    pub fn spec(self) -> &'static CommandSpec {
        match self {
            CommandKind::Name => &COMMAND_SPECS[0],
            CommandKind::Info => &COMMAND_SPECS[1],
        }
    }

    /// Matches an already-normalized token against command names and aliases.
    pub fn from_token(token: &str) -> Option<Self> {
        COMMAND_SPECS
            .iter()
            .find(|spec| spec.matches(token))
            .map(|spec| spec.kind)
    }

    pub fn as_str(self) -> &'static str {
        self.spec().command
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host consoles a command is registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleKind {
    RemoteAdmin,
    Client,
}

/// Registry metadata for a command.
#[derive(Debug)]
pub struct CommandSpec {
    pub kind: CommandKind,
    pub command: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub consoles: &'static [ConsoleKind],
}

impl CommandSpec {
    pub fn matches(&self, token: &str) -> bool {
        self.command == token || self.aliases.contains(&token)
    }
}

pub const COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        kind: CommandKind::Name,
        command: "n",
        aliases: &["name"],
        description: "Set or reset your nickname. Usage: n <name> (or n to reset).",
        consoles: &[ConsoleKind::RemoteAdmin, ConsoleKind::Client],
    },
    CommandSpec {
        kind: CommandKind::Info,
        command: "info",
        aliases: &["cinfo"],
        description: "Set or reset your custom info. Usage: info <text> (or info to reset).",
        consoles: &[ConsoleKind::RemoteAdmin, ConsoleKind::Client],
    },
];

/// User-visible feedback. The rendered strings are a compatibility contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    NicknameResetToOriginal(String),
    NicknameReset,
    NicknameInvalidLength,
    NicknameSet(String),
    CustomInfoReset,
    CustomInfoSet,
    PlayersOnly,
    CustomInfoError,
    NicknameError,
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::NicknameResetToOriginal(name) => {
                write!(f, "Nickname reset to original: {name}")
            }
            Feedback::NicknameReset => f.write_str("Nickname reset."),
            Feedback::NicknameInvalidLength => f.write_str("Nickname must be 1-32 characters."),
            Feedback::NicknameSet(name) => write!(f, "Nickname set to {name}"),
            Feedback::CustomInfoReset => f.write_str("Custom info reset."),
            Feedback::CustomInfoSet => f.write_str("Custom info set."),
            Feedback::PlayersOnly => f.write_str("Only players can use this command."),
            Feedback::CustomInfoError => f.write_str("Error setting custom info."),
            Feedback::NicknameError => f.write_str("Error setting nickname."),
        }
    }
}
