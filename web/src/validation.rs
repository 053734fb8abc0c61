//! Request body validation.
//!
//! Bodies arrive as untyped JSON so every field can be checked individually
//! and rejected with a precise message. `null` counts as absent for the
//! optional create fields.

use checkmark_core::todo::{CheckedUpdate, TodoDraft, TodoId};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a request body was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Body is valid JSON but not an object
    #[error("Request body must be a JSON object")]
    NotAnObject,

    /// `label` is absent, not a string, or empty
    #[error("Missing or invalid 'label'")]
    Label,

    /// `id` is present but not a non-negative integer
    #[error("Invalid 'id' field")]
    Id,

    /// `date` is present but not a string
    #[error("Invalid 'date' field")]
    Date,

    /// `checked` is present on create but not a boolean
    #[error("Invalid 'checked' field")]
    OptionalChecked,

    /// `checked` is absent or not a boolean on an update
    #[error("Missing or invalid 'checked' field")]
    Checked,
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, ValidationError> {
    body.as_object().ok_or(ValidationError::NotAnObject)
}

/// Present and non-null
fn field<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object.get(name).filter(|value| !value.is_null())
}

/// Validate a create body into a [`TodoDraft`].
///
/// # Errors
///
/// Returns the first failing field, checked in the order label, id, date,
/// checked.
pub fn parse_draft(body: &Value) -> Result<TodoDraft, ValidationError> {
    let object = as_object(body)?;

    let label = match field(object, "label") {
        Some(Value::String(label)) if !label.is_empty() => label.clone(),
        _ => return Err(ValidationError::Label),
    };

    let id = field(object, "id")
        .map(|value| {
            value
                .as_i64()
                .filter(|id| *id >= 0)
                .map(TodoId::new)
                .ok_or(ValidationError::Id)
        })
        .transpose()?;

    let date = field(object, "date")
        .map(|value| {
            value
                .as_str()
                .map(str::to_string)
                .ok_or(ValidationError::Date)
        })
        .transpose()?;

    let checked = field(object, "checked")
        .map(|value| value.as_bool().ok_or(ValidationError::OptionalChecked))
        .transpose()?;

    Ok(TodoDraft {
        id,
        label,
        date,
        checked,
    })
}

/// Validate a `{"checked": bool}` body.
///
/// # Errors
///
/// Returns [`ValidationError::Checked`] unless `checked` is a JSON boolean.
pub fn parse_checked_update(body: &Value) -> Result<CheckedUpdate, ValidationError> {
    let object = as_object(body)?;

    object
        .get("checked")
        .and_then(Value::as_bool)
        .map(|checked| CheckedUpdate { checked })
        .ok_or(ValidationError::Checked)
}
