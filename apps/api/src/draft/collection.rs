//! Entity Collection Manager: ordered, uniquely-indexed repeated entries.
//!
//! Every entry carries a permanent `index` handed out from a monotonically increasing
//! counter. Indices are never reused within a session, so anything keyed on an index
//! (form field names, enhancement targets) stays unambiguous after removals.
//!
//! The *display ordinal* (1..=count) is presentation-only and recomputed from the current
//! order on every `list()` call, so it is always contiguous.
//!
//! CRITICAL: an initialized collection never drops to zero entries. Removing the last
//! remaining entry is refused with `DraftError::InvariantViolation`.

use std::collections::HashSet;

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::DraftError;

/// A repeated record owned by an `EntityCollection`.
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// Human-readable kind, used in logs and error messages.
    const KIND: &'static str;

    /// Builds a blank entry carrying the given permanent index.
    fn blank(index: u32) -> Self;

    fn index(&self) -> u32;
}

/// An entry paired with its current display ordinal.
#[derive(Debug, Clone, Serialize)]
pub struct Listed<'a, T> {
    pub ordinal: usize,
    #[serde(flatten)]
    pub entry: &'a T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityCollection<T> {
    entries: Vec<T>,
    next_index: u32,
}

impl<T: Entity> EntityCollection<T> {
    /// An initialized collection holding one blank entry with index 1.
    pub fn new() -> Self {
        Self {
            entries: vec![T::blank(1)],
            next_index: 2,
        }
    }

    /// Rebuilds a collection from persisted entries.
    ///
    /// Entries repeating an earlier index are dropped, as is an entry holding `u32::MAX`
    /// (no index could follow it). Returns `None` when nothing usable remains. The counter
    /// resumes past the highest index seen so a restored session never hands out a stale
    /// index.
    pub fn from_entries(entries: Vec<T>, next_index: Option<u32>) -> Option<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        let entries: Vec<T> = entries
            .into_iter()
            .filter(|e| {
                let index = e.index();
                if index == u32::MAX {
                    tracing::warn!("Dropping {} entry with unassignable index {index}", T::KIND);
                    return false;
                }
                if !seen.insert(index) {
                    tracing::warn!("Dropping {} entry repeating index {index}", T::KIND);
                    return false;
                }
                true
            })
            .collect();
        let highest = entries.iter().map(Entity::index).max()?;
        let next_index = next_index.unwrap_or(0).max(highest + 1);
        Some(Self {
            entries,
            next_index,
        })
    }

    /// Appends a blank entry with the next unused index and returns that index.
    ///
    /// Refused once the index counter is exhausted, since any further index would repeat
    /// one already handed out.
    pub fn add(&mut self) -> Result<u32, DraftError> {
        let index = self.next_index;
        self.next_index = index.checked_add(1).ok_or_else(|| {
            DraftError::InvariantViolation(format!("no {} index left to assign", T::KIND))
        })?;
        self.entries.push(T::blank(index));
        tracing::debug!("Added {} entry with index {index}", T::KIND);
        Ok(index)
    }

    /// Removes the entry carrying `index`.
    ///
    /// Refused while exactly one entry remains. An index the collection does not hold is
    /// a no-op and reports `Ok(false)`.
    pub fn remove(&mut self, index: u32) -> Result<bool, DraftError> {
        if self.entries.len() <= 1 {
            return Err(DraftError::InvariantViolation(format!(
                "cannot remove the last remaining {} entry",
                T::KIND
            )));
        }
        let before = self.entries.len();
        self.entries.retain(|e| e.index() != index);
        let removed = self.entries.len() != before;
        if removed {
            tracing::debug!("Removed {} entry with index {index}", T::KIND);
        }
        Ok(removed)
    }

    /// Entries in current order with contiguous display ordinals starting at 1.
    pub fn list(&self) -> Vec<Listed<'_, T>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| Listed {
                ordinal: i + 1,
                entry,
            })
            .collect()
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        self.entries.iter().find(|e| e.index() == index)
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.entries.iter_mut().find(|e| e.index() == index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn next_index(&self) -> u32 {
        self.next_index
    }
}

impl<T: Entity> Default for EntityCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        index: u32,
    }

    impl Entity for Item {
        const KIND: &'static str = "item";

        fn blank(index: u32) -> Self {
            Item { index }
        }

        fn index(&self) -> u32 {
            self.index
        }
    }

    fn indices(c: &EntityCollection<Item>) -> Vec<u32> {
        c.iter().map(|i| i.index).collect()
    }

    fn assert_ordinals_contiguous(c: &EntityCollection<Item>) {
        let ordinals: Vec<usize> = c.list().iter().map(|l| l.ordinal).collect();
        let expected: Vec<usize> = (1..=c.len()).collect();
        assert_eq!(ordinals, expected);
    }

    #[test]
    fn test_new_collection_has_one_entry() {
        let c: EntityCollection<Item> = EntityCollection::new();
        assert_eq!(indices(&c), vec![1]);
        assert_eq!(c.next_index(), 2);
    }

    #[test]
    fn test_add_appends_with_fresh_index() {
        let mut c: EntityCollection<Item> = EntityCollection::new();
        assert_eq!(c.add().unwrap(), 2);
        assert_eq!(c.add().unwrap(), 3);
        assert_eq!(indices(&c), vec![1, 2, 3]);
    }

    #[test]
    fn test_removing_last_entry_is_refused() {
        let mut c: EntityCollection<Item> = EntityCollection::new();
        let err = c.remove(1).unwrap_err();
        assert!(matches!(err, DraftError::InvariantViolation(_)));
        assert_eq!(indices(&c), vec![1]);
    }

    #[test]
    fn test_remove_first_renumbers_but_keeps_index() {
        let mut c: EntityCollection<Item> = EntityCollection::new();
        c.add().unwrap();
        assert!(c.remove(1).unwrap());

        let listed = c.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].ordinal, 1);
        assert_eq!(listed[0].entry.index, 2);
    }

    #[test]
    fn test_indices_never_reused_after_removal() {
        let mut c: EntityCollection<Item> = EntityCollection::new();
        c.add().unwrap();
        c.add().unwrap();
        c.remove(3).unwrap();
        assert_eq!(c.add().unwrap(), 4, "index 3 must not be handed out again");
    }

    #[test]
    fn test_remove_unknown_index_is_noop() {
        let mut c: EntityCollection<Item> = EntityCollection::new();
        c.add().unwrap();
        assert!(!c.remove(42).unwrap());
        assert_eq!(indices(&c), vec![1, 2]);
    }

    #[test]
    fn test_ordinals_stay_contiguous_through_mixed_sequence() {
        let mut c: EntityCollection<Item> = EntityCollection::new();
        let ops: &[(bool, u32)] = &[
            (true, 0),
            (true, 0),
            (false, 2),
            (true, 0),
            (false, 1),
            (false, 99),
            (true, 0),
            (false, 4),
            (false, 3),
        ];
        for &(is_add, idx) in ops {
            if is_add {
                c.add().unwrap();
            } else {
                let _ = c.remove(idx);
            }
            assert_ordinals_contiguous(&c);
            let mut seen = HashSet::new();
            assert!(c.iter().all(|i| seen.insert(i.index)), "duplicate index");
            assert!(c.len() >= 1);
        }
    }

    #[test]
    fn test_from_entries_rejects_empty() {
        assert!(EntityCollection::<Item>::from_entries(vec![], None).is_none());
    }

    #[test]
    fn test_from_entries_keeps_first_of_repeated_index() {
        let c = EntityCollection::from_entries(
            vec![Item { index: 2 }, Item { index: 4 }, Item { index: 2 }],
            None,
        )
        .unwrap();
        assert_eq!(indices(&c), vec![2, 4]);
        assert_eq!(c.next_index(), 5);
    }

    #[test]
    fn test_from_entries_drops_max_index() {
        let c = EntityCollection::from_entries(
            vec![Item { index: 1 }, Item { index: u32::MAX }],
            None,
        )
        .unwrap();
        assert_eq!(indices(&c), vec![1]);
        assert_eq!(c.next_index(), 2);

        assert!(EntityCollection::from_entries(vec![Item { index: u32::MAX }], None).is_none());
    }

    #[test]
    fn test_add_refused_when_counter_exhausted() {
        let mut c =
            EntityCollection::from_entries(vec![Item { index: 1 }], Some(u32::MAX)).unwrap();
        let err = c.add().unwrap_err();
        assert!(matches!(err, DraftError::InvariantViolation(_)));
        assert_eq!(indices(&c), vec![1]);
        assert_eq!(c.next_index(), u32::MAX);
    }

    #[test]
    fn test_from_entries_resumes_counter_past_highest_index() {
        let c = EntityCollection::from_entries(vec![Item { index: 5 }, Item { index: 2 }], Some(3))
            .unwrap();
        assert_eq!(c.next_index(), 6);
        assert_eq!(indices(&c), vec![5, 2]);
    }
}
