//! Client-side mirror of the server's todo list.

use crate::view;
use checkmark_core::todo::{Filter, Todo};
use std::sync::Arc;

/// Immutable snapshot of the records plus UI filter.
///
/// `records` is never mutated in place: every change swaps in a new
/// `Arc<[Todo]>` and bumps `revision`, so a reader holding an old snapshot
/// keeps a consistent view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientState {
    /// Records in server order (ascending id, new ones appended)
    pub records: Arc<[Todo]>,
    /// Visible partition
    pub filter: Filter,
    /// Number of snapshot replacements so far
    pub revision: u64,
}

impl ClientState {
    /// State holding `records` at revision 0
    #[must_use]
    pub fn new(records: impl Into<Arc<[Todo]>>) -> Self {
        Self {
            records: records.into(),
            filter: Filter::All,
            revision: 0,
        }
    }

    /// Swap in a new snapshot
    pub fn replace(&mut self, records: impl Into<Arc<[Todo]>>) {
        self.records = records.into();
        self.revision += 1;
    }

    /// See [`view::unchecked_count`]
    #[must_use]
    pub fn unchecked_count(&self) -> usize {
        view::unchecked_count(&self.records)
    }

    /// Records visible under the current filter
    #[must_use]
    pub fn filtered(&self) -> Vec<Todo> {
        view::filtered(&self.records, self.filter)
    }

    /// See [`view::any_checked`]
    #[must_use]
    pub fn any_checked(&self) -> bool {
        view::any_checked(&self.records)
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
