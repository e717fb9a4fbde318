//! Best-effort field probes over host objects whose shape is not fixed.
//!
//! Adapters implement [`DynamicObject`] for whatever the host hands over and
//! use these probes to satisfy [`crate::PlayerHandle::original_nickname`] and
//! [`crate::CommandEvent::mark_handled`]. Probe failures never escape.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;

/// Nickname fields tried in order; the first non-empty string wins.
pub const NICKNAME_FIELDS: &[&str] = &["Nickname", "Nick", "OriginalNickname", "DefaultNickname"];
pub const USER_ID_FIELD: &str = "UserId";
pub const NAME_FIELD: &str = "Name";
pub const ALLOW_FIELD: &str = "IsAllowed";
/// Boolean flags tried in order when marking an event handled.
pub const HANDLED_FIELDS: &[&str] = &[
    "CommandFound",
    "Found",
    "IsFound",
    "Handled",
    "IsHandled",
    "WasHandled",
    "FoundCommand",
];

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("field {field} is not readable: {reason}")]
    Unreadable { field: String, reason: String },
    #[error("field {field} is not writable: {reason}")]
    Unwritable { field: String, reason: String },
}

/// An object whose fields can be looked up by name at runtime.
pub trait DynamicObject {
    /// `Ok(None)` when the object has no such field.
    fn read_field(&self, field: &str) -> Result<Option<JsonValue>, ProbeError>;

    /// Writes a boolean field. `Ok(false)` when the field is absent, read-only
    /// or not a boolean.
    fn write_bool(&mut self, field: &str, value: bool) -> Result<bool, ProbeError>;
}

pub fn find_original_nickname(object: &dyn DynamicObject) -> Option<String> {
    for field in NICKNAME_FIELDS {
        match object.read_field(field) {
            Ok(Some(JsonValue::String(value))) if !value.is_empty() => return Some(value),
            Ok(_) => {}
            Err(err) => debug!(
                target: "name_info::probe",
                field,
                error = %err,
                "probe.read_failed"
            ),
        }
    }

    // A present user id ends the search even when it is empty.
    match object.read_field(USER_ID_FIELD) {
        Ok(Some(value)) => return scalar_text(value).filter(|text| !text.is_empty()),
        Ok(None) => {}
        Err(err) => debug!(
            target: "name_info::probe",
            field = USER_ID_FIELD,
            error = %err,
            "probe.read_failed"
        ),
    }

    match object.read_field(NAME_FIELD) {
        Ok(Some(JsonValue::String(value))) if !value.is_empty() => Some(value),
        _ => None,
    }
}

/// Sets the allow flag when present, then the first writable handled flag.
/// Returns whether a handled flag was written.
pub fn mark_event_handled(event: &mut dyn DynamicObject) -> bool {
    if let Err(err) = event.write_bool(ALLOW_FIELD, true) {
        debug!(
            target: "name_info::probe",
            field = ALLOW_FIELD,
            error = %err,
            "probe.write_failed"
        );
    }

    for field in HANDLED_FIELDS {
        match event.write_bool(field, true) {
            Ok(true) => return true,
            Ok(false) => {}
            Err(err) => debug!(
                target: "name_info::probe",
                field,
                error = %err,
                "probe.write_failed"
            ),
        }
    }
    false
}

fn scalar_text(value: JsonValue) -> Option<String> {
    match value {
        JsonValue::String(text) => Some(text),
        JsonValue::Null => None,
        JsonValue::Bool(flag) => Some(flag.to_string()),
        JsonValue::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Property {
    value: JsonValue,
    writable: bool,
}

/// Name-addressed field storage used by adapters for host objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    fields: BTreeMap<String, Property>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_readonly(mut self, field: &str, value: impl Into<JsonValue>) -> Self {
        self.define(field, value.into(), false);
        self
    }

    pub fn with_writable(mut self, field: &str, value: impl Into<JsonValue>) -> Self {
        self.define(field, value.into(), true);
        self
    }

    pub fn define(&mut self, field: &str, value: JsonValue, writable: bool) {
        self.fields
            .insert(field.to_string(), Property { value, writable });
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.fields.get(field).map(|property| &property.value)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(JsonValue::as_str)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(JsonValue::as_bool)
    }

    /// Overwrites a writable field, keeping its JSON type.
    pub fn set(&mut self, field: &str, value: impl Into<JsonValue>) -> Result<(), ProbeError> {
        let value = value.into();
        let property = self
            .fields
            .get_mut(field)
            .ok_or_else(|| ProbeError::Unwritable {
                field: field.to_string(),
                reason: "no such field".to_string(),
            })?;
        if !property.writable {
            return Err(ProbeError::Unwritable {
                field: field.to_string(),
                reason: "field is read-only".to_string(),
            });
        }
        if std::mem::discriminant(&property.value) != std::mem::discriminant(&value) {
            return Err(ProbeError::Unwritable {
                field: field.to_string(),
                reason: format!("type mismatch for value {value}"),
            });
        }
        property.value = value;
        Ok(())
    }
}

impl DynamicObject for PropertyBag {
    fn read_field(&self, field: &str) -> Result<Option<JsonValue>, ProbeError> {
        Ok(self.get(field).cloned())
    }

    fn write_bool(&mut self, field: &str, value: bool) -> Result<bool, ProbeError> {
        match self.fields.get_mut(field) {
            Some(property) if property.writable && property.value.is_boolean() => {
                property.value = JsonValue::Bool(value);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
