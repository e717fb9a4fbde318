//! Shared command surface for the custom name and info plugin.
//!
//! Holds the pieces that do not touch players or the filesystem: command
//! metadata, feedback strings, command-line normalization and the line codec
//! of the persisted custom-info file.

pub mod command_text;
pub mod commands;
pub mod record;

pub use command_text::{
    join_arguments, normalize_command_name, parse_host_line, CommandParseError, Delivery,
    HostDirective,
};
pub use commands::{CommandKind, CommandSpec, ConsoleKind, Feedback, UserId, COMMAND_SPECS};
pub use record::{decode_record, encode_record, CustomInfoRecord, RecordDecodeError};
