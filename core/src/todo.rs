//! Domain types for todo records.
//!
//! A todo list is a flat, id-ordered collection of records that can be
//! created, checked or unchecked (singly or all at once), and deleted
//! (singly or all checked ones at once).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Unique identifier for a todo record
///
/// Ids are plain integers so they round-trip through the `INTEGER PRIMARY KEY`
/// column and through URL paths unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    /// Creates a `TodoId` from its integer value
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the integer value
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rejected textual todo id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid todo id: \"{0}\"")]
pub struct InvalidTodoId(pub String);

impl FromStr for TodoId {
    type Err = InvalidTodoId;

    /// Parses a path segment. Only ASCII digits are accepted: signs,
    /// decimals, whitespace and the empty string are all rejected, as are
    /// values that overflow an `i64`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidTodoId(s.to_string()));
        }

        s.parse::<i64>()
            .map(Self)
            .map_err(|_| InvalidTodoId(s.to_string()))
    }
}

/// A single todo record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// What needs to be done
    pub label: String,
    /// Display date (opaque, never parsed)
    pub date: String,
    /// Whether the todo is done
    #[serde(default)]
    pub checked: bool,
}

impl Todo {
    /// Creates an unchecked todo
    #[must_use]
    pub fn new(id: TodoId, label: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            date: date.into(),
            checked: false,
        }
    }

    /// Returns this todo with `checked` replaced
    #[must_use]
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }
}

/// Request to create a todo
///
/// Everything but the label is optional; the API boundary fills in an id,
/// today's date and `checked: false`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoDraft {
    /// Caller-chosen id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TodoId>,
    /// What needs to be done
    pub label: String,
    /// Display date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Initial checked state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl TodoDraft {
    /// Creates a draft with only a label
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: None,
            label: label.into(),
            date: None,
            checked: None,
        }
    }

    /// Sets a caller-chosen id
    #[must_use]
    pub const fn with_id(mut self, id: TodoId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the display date
    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Sets the initial checked state
    #[must_use]
    pub const fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    /// Completes the draft into a record
    ///
    /// `id` is used only when the draft carries none; `default_date` likewise.
    #[must_use]
    pub fn into_todo(self, id: TodoId, default_date: impl FnOnce() -> String) -> Todo {
        Todo {
            id: self.id.unwrap_or(id),
            label: self.label,
            date: self.date.unwrap_or_else(default_date),
            checked: self.checked.unwrap_or(false),
        }
    }
}

/// Which partition of the list is visible
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every record
    #[default]
    All,
    /// Only checked records
    Checked,
    /// Only unchecked records
    Unchecked,
}

impl Filter {
    /// All filters, in index order
    pub const ALL: [Self; 3] = [Self::All, Self::Checked, Self::Unchecked];

    /// Stable numeric index (tab position in the UI)
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::All => 0,
            Self::Checked => 1,
            Self::Unchecked => 2,
        }
    }

    /// Inverse of [`Filter::index`]
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::All),
            1 => Some(Self::Checked),
            2 => Some(Self::Unchecked),
            _ => None,
        }
    }

    /// Whether `todo` belongs to this partition
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Checked => todo.checked,
            Self::Unchecked => !todo.checked,
        }
    }
}

/// Body of a bulk or single `checked` update
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckedUpdate {
    /// Target checked state
    pub checked: bool,
}

/// Response of the bulk delete-checked operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedCount {
    /// Number of records removed
    pub deleted: u64,
}

/// Renders a default display date, e.g. `Mon Oct 19 2026`
#[must_use]
pub fn display_date(time: DateTime<Utc>) -> String {
    time.format("%a %b %d %Y").to_string()
}
