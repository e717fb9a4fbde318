//! Capability interfaces over the host's player wrapper, command sender and
//! command event. Handlers depend only on these traits.

use thiserror::Error;

use name_info_runtime::UserId;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("field {field} rejected the value: {reason}")]
    FieldRejected { field: &'static str, reason: String },
}

/// A connected player as exposed by the host framework.
pub trait PlayerHandle {
    fn user_id(&self) -> UserId;

    /// The nickname the player had before any custom name, if the wrapper
    /// exposes one.
    fn original_nickname(&self) -> Option<String>;

    fn set_display_name(&mut self, name: &str) -> Result<(), PlayerError>;

    fn set_custom_info(&mut self, info: &str) -> Result<(), PlayerError>;

    fn send_console_message(&mut self, message: &str, color: &str);
}

/// Whoever issued a command: a player, or the server console.
pub trait CommandSender {
    fn as_player(&mut self) -> Option<&mut dyn PlayerHandle>;
}

/// A command attempt observed by the ambient hook, recognized or not.
pub trait CommandEvent {
    fn command_name(&self) -> &str;

    fn arguments(&self) -> &[String];

    fn sender(&mut self) -> &mut dyn CommandSender;

    /// Flags the event as handled so the host does not report an unknown
    /// command. Returns false when the event has no such flag.
    fn mark_handled(&mut self) -> bool;
}
