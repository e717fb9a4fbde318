//! Line codec for the persisted custom-info file.
//!
//! Each record is `user_id <TAB> base64(utf8(text))`. Base64 keeps tabs and
//! newlines typed by users from breaking the line format.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomInfoRecord {
    pub user_id: UserId,
    pub text: String,
}

impl CustomInfoRecord {
    pub fn new(user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            user_id,
            text: text.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RecordDecodeError {
    #[error("record has no tab separator")]
    MissingSeparator,
    #[error("record has more than two fields")]
    ExtraFields,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn encode_record(record: &CustomInfoRecord) -> String {
    format!(
        "{}\t{}",
        record.user_id,
        STANDARD.encode(record.text.as_bytes())
    )
}

pub fn decode_record(line: &str) -> Result<CustomInfoRecord, RecordDecodeError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let (user_id, payload) = line
        .split_once('\t')
        .ok_or(RecordDecodeError::MissingSeparator)?;
    if payload.contains('\t') {
        return Err(RecordDecodeError::ExtraFields);
    }
    let bytes = STANDARD.decode(payload)?;
    let text = String::from_utf8(bytes)?;
    Ok(CustomInfoRecord {
        user_id: UserId::from(user_id),
        text,
    })
}
