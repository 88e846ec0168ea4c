#![forbid(unsafe_code)]

//! Reselection after a model rebuild.
//!
//! Rebuilding regenerates a model from live domain state; payload objects may
//! be recreated, so the previous selection is re-found by what the user
//! heard instead of by identity:
//!
//! 1. Snapshot the selected entry's `(kind, label, occurrence)` key.
//! 2. Run the builder.
//! 3. Select the entry with the exact same key, else the first entry with the
//!    same kind and label.
//! 4. Otherwise clamp the previous index into the new range, so deleting the
//!    selected entry lands on its successor rather than jumping to the top.
//!
//! Duplicate labels are told apart by their occurrence ordinal; when the
//! ordinal no longer exists the first same-labelled entry wins.

use crate::model::{MenuEntry, MenuEntryKind, SelectionKey, TreeEntry, TreeEntryKind};

/// Anything that can be re-found after a rebuild.
pub trait Keyed {
    type Kind: Clone + PartialEq;

    /// Kind and label; the occurrence ordinal is filled in by [`keys_of`].
    fn selection_key(&self) -> SelectionKey<Self::Kind>;
}

impl<P> Keyed for MenuEntry<P> {
    type Kind = MenuEntryKind;

    fn selection_key(&self) -> SelectionKey<MenuEntryKind> {
        SelectionKey::new(self.kind, self.label.clone())
    }
}

impl<P> Keyed for TreeEntry<P> {
    type Kind = TreeEntryKind;

    fn selection_key(&self) -> SelectionKey<TreeEntryKind> {
        self.key()
    }
}

/// Keys of every entry, with occurrence ordinals among equal `(kind, label)` pairs.
#[must_use]
pub fn keys_of<E: Keyed>(entries: &[E]) -> Vec<SelectionKey<E::Kind>> {
    let mut keys: Vec<SelectionKey<E::Kind>> = Vec::with_capacity(entries.len());
    for entry in entries {
        let key = entry.selection_key();
        let occurrence = keys.iter().filter(|k| k.same_entry(&key)).count();
        keys.push(key.with_occurrence(occurrence));
    }
    keys
}

/// Key of the entry at `index`.
#[must_use]
pub fn snapshot<E: Keyed>(entries: &[E], index: usize) -> Option<SelectionKey<E::Kind>> {
    let target = entries.get(index)?.selection_key();
    let occurrence = entries[..index]
        .iter()
        .filter(|e| e.selection_key().same_entry(&target))
        .count();
    Some(target.with_occurrence(occurrence))
}

/// Position of `target` in `keys`: exact match first, then first same entry.
#[must_use]
pub fn find_key<K: PartialEq>(keys: &[SelectionKey<K>], target: &SelectionKey<K>) -> Option<usize> {
    keys.iter()
        .position(|k| k == target)
        .or_else(|| keys.iter().position(|k| k.same_entry(target)))
}

/// Index to select in the rebuilt `entries`.
#[must_use]
pub fn relocate<E: Keyed>(
    snapshot: Option<&SelectionKey<E::Kind>>,
    entries: &[E],
    previous_index: usize,
) -> usize {
    if let Some(target) = snapshot
        && let Some(found) = find_key(&keys_of(entries), target)
    {
        return found;
    }
    clamp_index(previous_index, entries.len())
}

/// `min(index, len - 1)`, or 0 for an empty list.
#[inline]
#[must_use]
pub fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { index.min(len - 1) }
}
