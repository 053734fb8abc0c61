//! Derived views over a record snapshot.
//!
//! Pure functions, recomputed on every read.

use checkmark_core::todo::{Filter, Todo};

/// Number of records not yet checked
#[must_use]
pub fn unchecked_count(records: &[Todo]) -> usize {
    records.iter().filter(|todo| !todo.checked).count()
}

/// Records visible under `filter`, in snapshot order
#[must_use]
pub fn filtered(records: &[Todo], filter: Filter) -> Vec<Todo> {
    records
        .iter()
        .filter(|todo| filter.matches(todo))
        .cloned()
        .collect()
}

/// Whether at least one record is checked. False for an empty list.
#[must_use]
pub fn any_checked(records: &[Todo]) -> bool {
    unchecked_count(records) != records.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkmark_core::todo::TodoId;
    use checkmark_testing::properties::{arb_filter, arb_records};
    use proptest::prelude::*;

    fn todo(id: i64, checked: bool) -> Todo {
        Todo::new(TodoId::new(id), format!("todo {id}"), "Wed Jan 01 2025").with_checked(checked)
    }

    #[test]
    fn empty_list() {
        assert_eq!(unchecked_count(&[]), 0);
        assert!(filtered(&[], Filter::Checked).is_empty());
        assert!(!any_checked(&[]));
    }

    #[test]
    fn mixed_list() {
        let records = [todo(1, false), todo(2, true), todo(3, false)];

        assert_eq!(unchecked_count(&records), 2);
        assert!(any_checked(&records));
        assert_eq!(filtered(&records, Filter::Checked), vec![todo(2, true)]);
        assert_eq!(
            filtered(&records, Filter::Unchecked),
            vec![todo(1, false), todo(3, false)]
        );
    }

    #[test]
    fn appended_record_stays_last() {
        let records = [todo(5, false), todo(2, true), todo(9, false), todo(1, false)];

        let ids: Vec<_> = filtered(&records, Filter::Unchecked).iter().map(|t| t.id.value()).collect();

        assert_eq!(ids, vec![5, 9, 1]);
    }

    proptest! {
        #[test]
        fn filter_all_is_identity(records in arb_records(20)) {
            prop_assert_eq!(filtered(&records, Filter::All), records);
        }

        #[test]
        fn checked_and_unchecked_partition_the_list(records in arb_records(20)) {
            let checked = filtered(&records, Filter::Checked);
            let unchecked = filtered(&records, Filter::Unchecked);

            prop_assert_eq!(checked.len() + unchecked.len(), records.len());
            prop_assert!(checked.iter().all(|t| t.checked));
            prop_assert!(unchecked.iter().all(|t| !t.checked));
        }

        #[test]
        fn counts_agree(records in arb_records(20)) {
            prop_assert_eq!(unchecked_count(&records), filtered(&records, Filter::Unchecked).len());
            prop_assert_eq!(any_checked(&records), !filtered(&records, Filter::Checked).is_empty());
        }

        #[test]
        fn filtering_keeps_mirror_order(
            records in arb_records(20).prop_shuffle(),
            filter in arb_filter(),
        ) {
            let kept = filtered(&records, filter);
            let mut remaining = records.iter();

            prop_assert!(kept.iter().all(|t| remaining.any(|r| r == t)));
        }
    }
}
