#![forbid(unsafe_code)]

//! Flattened, expansion-respecting view of a tree.
//!
//! The [`VisibleList`] is the pre-order traversal of a forest that descends
//! only into expanded entries. Each row is stored as the index path from the
//! forest root to the entry, so the list never borrows the tree it describes
//! and can be recomputed in full after every structural change.
//!
//! ```text
//! forest                      visible rows
//! ├─ Rosa (expanded)          [0]
//! │  ├─ Health                [0, 0]
//! │  └─ Gear (collapsed)      [0, 1]
//! │     └─ Parka              (hidden)
//! └─ Table                    [1]
//! ```

use crate::model::{SelectionKey, TreeEntry, TreeEntryKind};

/// Index path from the forest root to an entry.
pub type RowPath = Vec<usize>;

/// Pre-order list of visible row paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleList {
    rows: Vec<RowPath>,
}

impl VisibleList {
    /// Flatten `forest`, descending only into expanded entries.
    #[must_use]
    pub fn build<P>(forest: &[TreeEntry<P>]) -> Self {
        let mut rows = Vec::new();
        let mut path = Vec::new();
        collect(forest, &mut path, &mut rows);
        Self { rows }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Path of row `index`.
    #[must_use]
    pub fn path(&self, index: usize) -> Option<&[usize]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Row currently showing `path`, if visible.
    #[must_use]
    pub fn position_of(&self, path: &[usize]) -> Option<usize> {
        self.rows.iter().position(|row| row.as_slice() == path)
    }

    /// Row of the parent of row `index`.
    #[must_use]
    pub fn parent_row(&self, index: usize) -> Option<usize> {
        let path = self.path(index)?;
        let (_, parent) = path.split_last()?;
        if parent.is_empty() {
            return None;
        }
        self.position_of(parent)
    }

    /// Entry shown at row `index`.
    #[must_use]
    pub fn entry<'a, P>(&self, forest: &'a [TreeEntry<P>], index: usize) -> Option<&'a TreeEntry<P>> {
        resolve(forest, self.path(index)?)
    }

    /// Keys of the entry at row `index` and all its ancestors, root first.
    #[must_use]
    pub fn key_path<P>(
        &self,
        forest: &[TreeEntry<P>],
        index: usize,
    ) -> Option<Vec<SelectionKey<TreeEntryKind>>> {
        key_path(forest, self.path(index)?)
    }

    /// Iterate over row paths in order.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

fn collect<P>(entries: &[TreeEntry<P>], path: &mut Vec<usize>, rows: &mut Vec<RowPath>) {
    for (i, entry) in entries.iter().enumerate() {
        path.push(i);
        rows.push(path.clone());
        if entry.is_expanded() {
            collect(entry.child_entries(), path, rows);
        }
        path.pop();
    }
}

/// Entry at `path`.
#[must_use]
pub fn resolve<'a, P>(forest: &'a [TreeEntry<P>], path: &[usize]) -> Option<&'a TreeEntry<P>> {
    let (first, rest) = path.split_first()?;
    let mut entry = forest.get(*first)?;
    for i in rest {
        entry = entry.child_entries().get(*i)?;
    }
    Some(entry)
}

/// Mutable entry at `path`.
pub fn resolve_mut<'a, P>(
    forest: &'a mut [TreeEntry<P>],
    path: &[usize],
) -> Option<&'a mut TreeEntry<P>> {
    let (first, rest) = path.split_first()?;
    let mut entry = forest.get_mut(*first)?;
    for i in rest {
        entry = entry.child_entries_mut().get_mut(*i)?;
    }
    Some(entry)
}

/// Keys along `path`, each carrying its occurrence among same-keyed siblings.
#[must_use]
pub fn key_path<P>(
    forest: &[TreeEntry<P>],
    path: &[usize],
) -> Option<Vec<SelectionKey<TreeEntryKind>>> {
    let mut keys = Vec::with_capacity(path.len());
    let mut siblings = forest;
    for &i in path {
        let entry = siblings.get(i)?;
        let occurrence = siblings[..i]
            .iter()
            .filter(|s| s.kind == entry.kind && s.label == entry.label)
            .count();
        keys.push(entry.key().with_occurrence(occurrence));
        siblings = entry.child_entries();
    }
    Some(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TreeEntry<()>> {
        let parka = TreeEntry::new(TreeEntryKind::Item, "Parka");
        let mut gear = TreeEntry::new(TreeEntryKind::SubCategory, "Gear").with_children(vec![parka]);
        gear.set_expanded(false);
        let health = TreeEntry::detail_text("Health");
        let mut rosa = TreeEntry::new(TreeEntryKind::Object, "Rosa").with_children(vec![health, gear]);
        rosa.set_expanded(true);
        let table = TreeEntry::new(TreeEntryKind::Object, "Table");
        vec![rosa, table]
    }

    #[test]
    fn build_respects_expansion() {
        let forest = sample();
        let visible = VisibleList::build(&forest);
        let rows: Vec<&[usize]> = visible.iter().collect();
        let expected: Vec<&[usize]> = vec![&[0][..], &[0, 0][..], &[0, 1][..], &[1][..]];
        assert_eq!(rows, expected);
    }

    #[test]
    fn expanding_reveals_children() {
        let mut forest = sample();
        resolve_mut(&mut forest, &[0, 1]).unwrap().set_expanded(true);
        let visible = VisibleList::build(&forest);
        assert_eq!(visible.len(), 5);
        assert_eq!(visible.entry(&forest, 3).unwrap().label, "Parka");
    }

    #[test]
    fn parent_row_lookup() {
        let forest = sample();
        let visible = VisibleList::build(&forest);
        assert_eq!(visible.parent_row(2), Some(0));
        assert_eq!(visible.parent_row(0), None);
        assert_eq!(visible.parent_row(3), None);
    }

    #[test]
    fn key_path_counts_duplicate_siblings() {
        let forest: Vec<TreeEntry<()>> = vec![
            TreeEntry::new(TreeEntryKind::Object, "Wall"),
            TreeEntry::new(TreeEntryKind::Object, "Wall"),
        ];
        let visible = VisibleList::build(&forest);
        let keys = visible.key_path(&forest, 1).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].occurrence, 1);
    }

    #[test]
    fn empty_forest_has_no_rows() {
        let forest: Vec<TreeEntry<()>> = Vec::new();
        let visible = VisibleList::build(&forest);
        assert!(visible.is_empty());
        assert_eq!(visible.entry(&forest, 0), None);
    }
}
