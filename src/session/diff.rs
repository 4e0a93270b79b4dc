//! Diff Engine
//!
//! Pure comparisons between draft and baseline state. Nothing in here
//! mutates; the same functions gate the save affordance and select which
//! records the batch writer sends.

use crate::domain::Entity;

use super::snapshot::Snapshot;

/// Records in the draft that diverge from the baseline
///
/// A record counts as dirty when it differs field-wise from the baseline
/// record with the same id, or when the baseline has no record with that id
/// at all. Collection order is irrelevant; matching is by id.
pub fn dirty_records<'a, T: Entity + PartialEq>(draft: &'a [T], baseline: &[T]) -> Vec<&'a T> {
    draft
        .iter()
        .filter(|record| {
            match baseline.iter().find(|b| b.id() == record.id()) {
                Some(counterpart) => *record != counterpart,
                None => true,
            }
        })
        .collect()
}

/// Dirty records the store already knows about
///
/// Records without a baseline counterpart never reached the store through
/// the batched path (creates are written through eagerly), so the batch
/// writer sends only the ones with a counterpart.
pub fn pending_updates<'a, T: Entity + PartialEq>(draft: &'a [T], baseline: &[T]) -> Vec<&'a T> {
    draft
        .iter()
        .filter(|record| {
            baseline
                .iter()
                .find(|b| b.id() == record.id())
                .is_some_and(|counterpart| *record != counterpart)
        })
        .collect()
}

/// Whether any record in the collection is dirty
pub fn is_dirty<T: Entity + PartialEq>(draft: &[T], baseline: &[T]) -> bool {
    !dirty_records(draft, baseline).is_empty()
}

/// Whether anything across all collections (or the title) has changed
pub fn has_changes(draft: &Snapshot, baseline: &Snapshot) -> bool {
    is_dirty(&draft.memories, &baseline.memories)
        || is_dirty(&draft.categories, &baseline.categories)
        || is_dirty(&draft.tracks, &baseline.tracks)
        || draft.title != baseline.title
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Memory, MemoryKind};
    use uuid::Uuid;

    fn memory(id: i64, caption: &str, owner: Uuid) -> Memory {
        let mut m = Memory::new(id, MemoryKind::Image, owner);
        m.caption = caption.to_string();
        m
    }

    #[test]
    fn test_identical_collections_are_clean() {
        let owner = Uuid::new_v4();
        let rows = vec![memory(1, "a", owner), memory(2, "b", owner)];
        assert!(dirty_records(&rows, &rows).is_empty());
        assert!(!is_dirty(&rows, &rows));
    }

    #[test]
    fn test_field_change_is_dirty() {
        let owner = Uuid::new_v4();
        let baseline = vec![memory(1, "a", owner), memory(2, "b", owner)];
        let mut draft = baseline.clone();
        draft[1].caption = "changed".to_string();

        let dirty = dirty_records(&draft, &baseline);
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].id, 2);
        assert_eq!(pending_updates(&draft, &baseline).len(), 1);
    }

    #[test]
    fn test_order_does_not_matter() {
        let owner = Uuid::new_v4();
        let baseline = vec![memory(1, "a", owner), memory(2, "b", owner)];
        let draft = vec![baseline[1].clone(), baseline[0].clone()];
        assert!(!is_dirty(&draft, &baseline));
    }

    #[test]
    fn test_counterpart_less_record_is_dirty_but_not_pending() {
        let owner = Uuid::new_v4();
        let baseline = vec![memory(1, "a", owner)];
        let draft = vec![memory(1, "a", owner), memory(9, "new", owner)];

        assert!(is_dirty(&draft, &baseline));
        assert_eq!(dirty_records(&draft, &baseline).len(), 1);
        assert!(pending_updates(&draft, &baseline).is_empty());
    }

    #[test]
    fn test_baseline_only_record_does_not_count() {
        // The diff is draft-driven; a record absent from the draft does not
        // make the collection dirty on its own.
        let owner = Uuid::new_v4();
        let baseline = vec![memory(1, "a", owner), memory(2, "b", owner)];
        let draft = vec![memory(1, "a", owner)];
        assert!(!is_dirty(&draft, &baseline));
    }

    #[test]
    fn test_title_change_flips_has_changes() {
        let baseline = Snapshot::default();
        let mut draft = Snapshot::default();
        assert!(!has_changes(&draft, &baseline));

        draft.title = "Our Story".to_string();
        assert!(has_changes(&draft, &baseline));
    }
}
