use thiserror::Error;

use crate::UserId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown directive: {0}")]
    UnknownDirective(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
}

/// Lower-cases a raw command token and strips at most one leading prefix character.
pub fn normalize_command_name(raw: &str, prefixes: &[char]) -> String {
    let lowered = raw.trim().to_lowercase();
    match lowered.chars().next() {
        Some(first) if prefixes.contains(&first) => lowered[first.len_utf8()..].to_string(),
        _ => lowered,
    }
}

/// Joins argument tokens with single spaces and trims the result.
pub fn join_arguments(args: &[String]) -> String {
    args.join(" ").trim().to_string()
}

/// Which notification channels a host line is delivered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Registry (when it recognizes the token) followed by the ambient hook.
    Both,
    ExplicitOnly,
    AmbientOnly,
}

/// A line of the headless host protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostDirective {
    Join {
        user_id: UserId,
        nickname: Option<String>,
    },
    Leave {
        user_id: UserId,
    },
    Command {
        user_id: UserId,
        delivery: Delivery,
        command: String,
        args: Vec<String>,
    },
    Console {
        command: String,
        args: Vec<String>,
    },
}

pub fn parse_host_line(input: &str) -> Result<HostDirective, CommandParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CommandParseError::Empty);
    }

    let mut parts = trimmed.split_whitespace();
    let verb = parts
        .next()
        .map(|v| v.to_ascii_lowercase())
        .ok_or(CommandParseError::Empty)?;

    match verb.as_str() {
        "join" => {
            let user_id = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("user"))?;
            let rest: Vec<&str> = parts.collect();
            let nickname = if rest.is_empty() {
                None
            } else {
                Some(rest.join(" "))
            };
            Ok(HostDirective::Join {
                user_id: UserId::from(user_id),
                nickname,
            })
        }
        "leave" => {
            let user_id = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("user"))?;
            Ok(HostDirective::Leave {
                user_id: UserId::from(user_id),
            })
        }
        "cmd" | "explicit" | "ambient" => {
            let delivery = match verb.as_str() {
                "explicit" => Delivery::ExplicitOnly,
                "ambient" => Delivery::AmbientOnly,
                _ => Delivery::Both,
            };
            let user_id = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("user"))?;
            let command = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("command"))?;
            Ok(HostDirective::Command {
                user_id: UserId::from(user_id),
                delivery,
                command: command.to_string(),
                args: parts.map(str::to_string).collect(),
            })
        }
        "console" => {
            let command = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("command"))?;
            Ok(HostDirective::Console {
                command: command.to_string(),
                args: parts.map(str::to_string).collect(),
            })
        }
        other => Err(CommandParseError::UnknownDirective(other.to_string())),
    }
}
