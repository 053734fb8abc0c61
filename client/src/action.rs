//! Client actions.
//!
//! Commands that talk to the server carry a [`RequestId`]; the result action
//! produced by their effect echoes it back so a waiting caller can pick out
//! its own response.

use checkmark_core::api::ApiError;
use checkmark_core::todo::{Filter, Todo, TodoDraft, TodoId};

/// Correlates a command with its result action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    /// Wrap a raw counter value
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw counter value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Everything the client reducer can process
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientAction {
    // ========== Local commands ==========
    /// Overwrite the mirror (initial load)
    ReplaceAll {
        /// New records, in server order
        records: Vec<Todo>,
    },
    /// Change the visible partition
    SetFilter {
        /// New filter
        filter: Filter,
    },

    // ========== Server commands ==========
    /// Create a todo
    Create {
        /// Correlation id
        request: RequestId,
        /// Fields to send
        draft: TodoDraft,
    },
    /// Check everything if anything is unchecked, otherwise uncheck everything
    ToggleAll {
        /// Correlation id
        request: RequestId,
    },
    /// Flip one todo's checked state
    ToggleOne {
        /// Correlation id
        request: RequestId,
        /// The todo as the caller last saw it
        todo: Todo,
    },
    /// Delete one todo
    RemoveOne {
        /// Correlation id
        request: RequestId,
        /// The todo to delete
        todo: Todo,
    },
    /// Delete every checked todo
    ClearChecked {
        /// Correlation id
        request: RequestId,
    },

    // ========== Results ==========
    /// The server created a todo
    Created {
        /// Correlation id
        request: RequestId,
        /// The stored record
        todo: Todo,
    },
    /// The server updated every todo
    AllToggled {
        /// Correlation id
        request: RequestId,
        /// Full list after the update
        records: Vec<Todo>,
    },
    /// The server updated one todo
    Toggled {
        /// Correlation id
        request: RequestId,
        /// The stored record after the update
        todo: Todo,
    },
    /// The server deleted one todo
    Removed {
        /// Correlation id
        request: RequestId,
        /// Id of the deleted todo
        id: TodoId,
    },
    /// The server deleted the checked todos
    CheckedCleared {
        /// Correlation id
        request: RequestId,
        /// How many rows the server removed
        deleted: u64,
    },
    /// A server command failed; state is left untouched
    RequestFailed {
        /// Correlation id
        request: RequestId,
        /// What went wrong
        error: ApiError,
    },
}

impl ClientAction {
    /// Whether this is the result of the command tagged `request`
    #[must_use]
    pub fn completes(&self, request: RequestId) -> bool {
        match self {
            Self::Created { request: r, .. }
            | Self::AllToggled { request: r, .. }
            | Self::Toggled { request: r, .. }
            | Self::Removed { request: r, .. }
            | Self::CheckedCleared { request: r, .. }
            | Self::RequestFailed { request: r, .. } => *r == request,
            _ => false,
        }
    }
}
