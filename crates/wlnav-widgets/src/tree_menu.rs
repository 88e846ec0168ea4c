#![forbid(unsafe_code)]

//! Hierarchical menu navigator with lazy subtrees.
//!
//! [`TreeMenu`] owns a forest of [`TreeEntry`] values, the derived
//! [`VisibleList`], a cursor into that list, and an announcer. Children
//! marked [`Children::Unloaded`](wlnav_core::Children::Unloaded) are
//! materialized on first expansion by asking a [`Materializer`], which the
//! kind controller implements on top of its domain trait.
//!
//! # Rebuild
//!
//! A rebuild replaces the forest with a freshly built one. Before swapping,
//! the menu records the key path (ancestor keys plus own key) of every
//! expanded entry and of the selection. Afterwards it re-expands entries
//! with a recorded key path, materializing their children again, and
//! re-selects the row whose full key path matches; failing that, the first
//! row with the same bare key; failing that, the previous index clamped.
//!
//! # Announcement format
//!
//! ```text
//! {label}[ (unavailable)][, {description}][, expanded|collapsed]. [{hint}. ]Position {i} of {n}
//! ```

use wlnav_core::model::SelectionKey;
use wlnav_core::rebuild::{clamp_index, keys_of};
use wlnav_core::visible::resolve_mut;
use wlnav_core::{
    AnnouncementSink, Announcer, KeyCode, KeyEvent, ListCursor, RowPath, TreeEntry, TreeEntryKind,
    VisibleList,
};

use crate::domain::{DomainError, report_failure};
use crate::flat_menu::MenuOptions;

const HINT_EXPAND: &str = "Enter or Right arrow to expand";
const HINT_COLLAPSE: &str = "Left arrow to collapse";
const HINT_EXECUTE: &str = "Enter to execute";
const NO_CHILDREN: &str = "No items to show";

type KeyPath = Vec<SelectionKey<TreeEntryKind>>;

/// Produces the children of a lazily loaded entry.
///
/// Called with the entry being expanded; implementations read the entry's
/// payload and ask the domain. Must not have side effects beyond reading.
pub trait Materializer<P> {
    fn materialize(&mut self, entry: &TreeEntry<P>) -> Result<Vec<TreeEntry<P>>, DomainError>;
}

/// Materializer for trees built without lazy entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Eager;

impl<P> Materializer<P> for Eager {
    fn materialize(&mut self, _entry: &TreeEntry<P>) -> Result<Vec<TreeEntry<P>>, DomainError> {
        Ok(Vec::new())
    }
}

/// Result of an expand request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    Expanded,
    /// Already expanded; the cursor moved to the first child.
    MovedToChild,
    NotExpandable,
    /// Expandable, but there turned out to be nothing inside.
    Empty,
    /// Materializing the children failed.
    Failed,
    /// Nothing selected.
    Nothing,
}

/// Forest, visible list, cursor, and announcer for one tree menu.
#[derive(Debug, Clone)]
pub struct TreeMenu<P> {
    forest: Vec<TreeEntry<P>>,
    visible: VisibleList,
    cursor: ListCursor,
    announcer: Announcer,
    options: MenuOptions,
    empty_label: String,
}

impl<P> TreeMenu<P> {
    #[must_use]
    pub fn new(empty_label: impl Into<String>) -> Self {
        Self {
            forest: Vec::new(),
            visible: VisibleList::default(),
            cursor: ListCursor::new(),
            announcer: Announcer::new(),
            options: MenuOptions::default(),
            empty_label: empty_label.into(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: MenuOptions) -> Self {
        self.set_options(options);
        self
    }

    pub fn set_options(&mut self, options: MenuOptions) {
        self.announcer.set_dedupe(options.dedupe);
        self.options = options;
    }

    fn fill(&self, forest: Vec<TreeEntry<P>>) -> Vec<TreeEntry<P>> {
        if forest.is_empty() {
            vec![TreeEntry::detail_text(self.empty_label.clone()).with_enabled(false)]
        } else {
            forest
        }
    }

    /// Replace the forest on open: everything collapsed, first row selected.
    pub fn load(&mut self, forest: Vec<TreeEntry<P>>) {
        self.forest = self.fill(forest);
        for root in &mut self.forest {
            root.reindent(0);
        }
        self.visible = VisibleList::build(&self.forest);
        self.cursor = ListCursor::new();
        self.announcer.forget();
    }

    pub fn clear(&mut self) {
        self.forest.clear();
        self.visible = VisibleList::default();
        self.cursor = ListCursor::new();
        self.announcer.forget();
    }

    /// Replace the forest after a mutation, carrying expansion and selection.
    pub fn rebuild<M>(&mut self, forest: Vec<TreeEntry<P>>, materializer: &mut M)
    where
        M: Materializer<P> + ?Sized,
    {
        let previous = self.cursor.index();
        let selected = self.visible.key_path(&self.forest, previous);
        let mut expanded = Vec::new();
        collect_expanded(&self.forest, &mut Vec::new(), &mut expanded);

        let mut forest = self.fill(forest);
        for root in &mut forest {
            root.reindent(0);
        }
        restore_expanded(&mut forest, &expanded, &mut Vec::new(), materializer);
        self.forest = forest;
        self.visible = VisibleList::build(&self.forest);

        let index = match selected {
            Some(target) => self.find_row(&target).unwrap_or_else(|| clamp_index(previous, self.visible.len())),
            None => clamp_index(previous, self.visible.len()),
        };
        self.cursor.select(index, self.visible.len());
        tracing::trace!(rows = self.visible.len(), index, expanded = expanded.len(), "tree rebuilt");
    }

    fn find_row(&self, target: &[SelectionKey<TreeEntryKind>]) -> Option<usize> {
        let paths: Vec<KeyPath> = (0..self.visible.len())
            .map(|i| self.visible.key_path(&self.forest, i).unwrap_or_default())
            .collect();
        if let Some(i) = paths.iter().position(|p| p.as_slice() == target) {
            return Some(i);
        }
        let own = target.last()?;
        paths
            .iter()
            .position(|p| p.last() == Some(own))
            .or_else(|| paths.iter().position(|p| p.last().is_some_and(|k| k.same_entry(own))))
    }

    #[must_use]
    pub fn forest(&self) -> &[TreeEntry<P>] {
        &self.forest
    }

    #[must_use]
    pub fn visible(&self) -> &VisibleList {
        &self.visible
    }

    /// Number of visible rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.cursor.index()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&TreeEntry<P>> {
        self.visible.entry(&self.forest, self.cursor.index())
    }

    #[must_use]
    pub fn selected_path(&self) -> Option<RowPath> {
        self.visible.path(self.cursor.index()).map(<[usize]>::to_vec)
    }

    #[must_use]
    pub fn selected_payload(&self) -> Option<&P> {
        self.selected().and_then(TreeEntry::payload)
    }

    /// Payload of the nearest ancestor of the selection that has one.
    #[must_use]
    pub fn ancestor_payload(&self) -> Option<&P> {
        let path = self.visible.path(self.cursor.index())?;
        (1..path.len())
            .rev()
            .filter_map(|depth| wlnav_core::visible::resolve(&self.forest, &path[..depth]))
            .find_map(TreeEntry::payload)
    }

    /// Select the first visible row whose payload equals `payload`.
    pub fn select_payload(&mut self, payload: &P) -> bool
    where
        P: PartialEq,
    {
        let found = (0..self.visible.len())
            .find(|&i| self.visible.entry(&self.forest, i).and_then(TreeEntry::payload) == Some(payload));
        match found {
            Some(i) => {
                self.cursor.select(i, self.visible.len());
                true
            }
            None => false,
        }
    }

    fn refresh(&mut self, keep: Option<&[usize]>) {
        self.visible = VisibleList::build(&self.forest);
        match keep.and_then(|path| self.visible.position_of(path)) {
            Some(row) => self.cursor.select(row, self.visible.len()),
            None => self.cursor.clamp(self.visible.len()),
        }
    }

    pub fn select_next(&mut self) {
        self.cursor.move_next(self.visible.len());
    }

    pub fn select_previous(&mut self) {
        self.cursor.move_previous(self.visible.len());
    }

    pub fn select_first(&mut self) {
        self.cursor.first();
    }

    pub fn select_last(&mut self) {
        self.cursor.last(self.visible.len());
    }

    pub fn page_down(&mut self) {
        self.cursor.page_down(self.visible.len(), self.options.page_size);
    }

    pub fn page_up(&mut self) {
        self.cursor.page_up(self.visible.len(), self.options.page_size);
    }

    /// Expand the selected entry, materializing lazy children first.
    pub fn expand<M>(&mut self, materializer: &mut M, sink: &mut dyn AnnouncementSink) -> Expansion
    where
        M: Materializer<P> + ?Sized,
    {
        let Some(path) = self.selected_path() else {
            return Expansion::Nothing;
        };
        let Some(entry) = resolve_mut(&mut self.forest, &path) else {
            return Expansion::Nothing;
        };
        if !entry.is_expandable() {
            let text = format!("Cannot expand {}", entry.label);
            self.announcer.high(sink, text);
            return Expansion::NotExpandable;
        }
        if entry.is_expanded() {
            if entry.child_entries().is_empty() {
                self.announcer.high(sink, NO_CHILDREN);
                return Expansion::Empty;
            }
            self.cursor.move_next(self.visible.len());
            self.announce_selection(sink);
            return Expansion::MovedToChild;
        }
        if !entry.children().is_loaded() {
            match materializer.materialize(entry) {
                Ok(children) => entry.set_children(children),
                Err(err) => {
                    tracing::warn!(label = %entry.label, error = %err, "materializing children failed");
                    report_failure(&mut self.announcer, sink, &err);
                    return Expansion::Failed;
                }
            }
        }
        if entry.child_entries().is_empty() {
            self.announcer.high(sink, NO_CHILDREN);
            return Expansion::Empty;
        }
        entry.set_expanded(true);
        self.refresh(Some(&path));
        self.announce_selection(sink);
        Expansion::Expanded
    }

    /// Collapse the selected entry. Fails with a `High` announcement when it
    /// is not expanded.
    pub fn collapse(&mut self, sink: &mut dyn AnnouncementSink) -> bool {
        let Some(path) = self.selected_path() else {
            return false;
        };
        let Some(entry) = resolve_mut(&mut self.forest, &path) else {
            return false;
        };
        if !entry.is_expanded() {
            let text = format!("Cannot collapse {}", entry.label);
            self.announcer.high(sink, text);
            return false;
        }
        entry.set_expanded(false);
        self.refresh(Some(&path));
        self.announce_selection(sink);
        true
    }

    /// Enter on an expandable entry: collapse if expanded, else expand.
    pub fn toggle<M>(&mut self, materializer: &mut M, sink: &mut dyn AnnouncementSink) -> Expansion
    where
        M: Materializer<P> + ?Sized,
    {
        if self.selected().is_some_and(TreeEntry::is_expanded) {
            self.collapse(sink);
            return Expansion::Nothing;
        }
        self.expand(materializer, sink)
    }

    /// Move to the parent row. Returns `false` on a root.
    pub fn select_parent(&mut self, sink: &mut dyn AnnouncementSink) -> bool {
        match self.visible.parent_row(self.cursor.index()) {
            Some(row) => {
                self.cursor.select(row, self.visible.len());
                self.announce_selection(sink);
                true
            }
            None => false,
        }
    }

    /// Announcement text for visible row `index`.
    #[must_use]
    pub fn describe_at(&self, index: usize) -> Option<String> {
        let entry = self.visible.entry(&self.forest, index)?;
        let mut head = entry.label.clone();
        if !entry.enabled && entry.kind != TreeEntryKind::DetailText {
            head.push_str(" (unavailable)");
        }
        if !entry.description.is_empty() {
            head.push_str(", ");
            head.push_str(&entry.description);
        }
        if entry.is_expandable() {
            head.push_str(if entry.is_expanded() { ", expanded" } else { ", collapsed" });
        }
        let mut parts = vec![head];
        if let Some(hint) = hint_for(entry) {
            parts.push(hint.to_owned());
        }
        if self.options.announce_positions {
            parts.push(format!("Position {} of {}", index + 1, self.visible.len()));
        }
        Some(parts.join(". "))
    }

    #[must_use]
    pub fn describe(&self) -> String {
        self.describe_at(self.cursor.index()).unwrap_or_default()
    }

    pub fn announce_selection(&mut self, sink: &mut dyn AnnouncementSink) -> bool {
        let text = self.describe();
        self.announcer.normal(sink, text)
    }

    pub fn reannounce(&mut self, sink: &mut dyn AnnouncementSink) -> bool {
        self.announcer.forget();
        self.announce_selection(sink)
    }

    pub fn say_high(&mut self, sink: &mut dyn AnnouncementSink, text: impl Into<String>) -> bool {
        self.announcer.high(sink, text)
    }

    pub fn say(&mut self, sink: &mut dyn AnnouncementSink, text: impl Into<String>) -> bool {
        self.announcer.normal(sink, text)
    }

    pub fn announcer_mut(&mut self) -> &mut Announcer {
        &mut self.announcer
    }

    /// Refuse Delete and Ctrl+C with a `High` announcement.
    pub fn refuse_edit(&mut self, key: &KeyEvent, sink: &mut dyn AnnouncementSink) -> bool {
        match key.code {
            KeyCode::Delete => self.say_high(sink, "Cannot delete this item"),
            KeyCode::Char(c) if key.has_ctrl() && c.eq_ignore_ascii_case(&'c') => {
                self.say_high(sink, "Cannot copy this item")
            }
            _ => return false,
        };
        true
    }

    /// Handle movement and expansion keys shared by every tree.
    ///
    /// Right expands (or steps into an expanded entry), Left collapses or
    /// moves to the parent. Enter is left to the controller.
    pub fn handle_navigation<M>(
        &mut self,
        key: &KeyEvent,
        materializer: &mut M,
        sink: &mut dyn AnnouncementSink,
    ) -> bool
    where
        M: Materializer<P> + ?Sized,
    {
        if key.has_ctrl() || key.has_alt() {
            return false;
        }
        match key.code {
            KeyCode::Up => self.select_previous(),
            KeyCode::Down => self.select_next(),
            KeyCode::Home => self.select_first(),
            KeyCode::End => self.select_last(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::Right => {
                self.expand(materializer, sink);
                return true;
            }
            KeyCode::Left => {
                let expanded = self.selected().is_some_and(TreeEntry::is_expanded);
                if expanded || !self.select_parent(sink) {
                    self.collapse(sink);
                }
                return true;
            }
            _ => return false,
        }
        self.announce_selection(sink);
        true
    }
}

fn hint_for<P>(entry: &TreeEntry<P>) -> Option<&'static str> {
    if entry.is_expanded() {
        return Some(HINT_COLLAPSE);
    }
    if entry.is_expandable() {
        return Some(HINT_EXPAND);
    }
    let executes = matches!(entry.kind, TreeEntryKind::Action | TreeEntryKind::Item | TreeEntryKind::Object);
    (executes && entry.enabled).then_some(HINT_EXECUTE)
}

fn collect_expanded<P>(entries: &[TreeEntry<P>], prefix: &mut KeyPath, out: &mut Vec<KeyPath>) {
    for (entry, key) in entries.iter().zip(keys_of(entries)) {
        prefix.push(key);
        if entry.is_expanded() {
            out.push(prefix.clone());
        }
        collect_expanded(entry.child_entries(), prefix, out);
        prefix.pop();
    }
}

fn restore_expanded<P, M>(entries: &mut [TreeEntry<P>], expanded: &[KeyPath], prefix: &mut KeyPath, materializer: &mut M)
where
    M: Materializer<P> + ?Sized,
{
    let keys = keys_of(&*entries);
    for (entry, key) in entries.iter_mut().zip(keys) {
        prefix.push(key);
        if entry.is_expandable() && expanded.iter().any(|p| p.as_slice() == prefix.as_slice()) {
            if !entry.children().is_loaded() {
                match materializer.materialize(entry) {
                    Ok(children) => entry.set_children(children),
                    Err(err) => tracing::warn!(label = %entry.label, error = %err, "re-materializing children failed"),
                }
            }
            if !entry.child_entries().is_empty() {
                entry.set_expanded(true);
            }
        }
        restore_expanded(entry.child_entries_mut(), expanded, prefix, &mut *materializer);
        prefix.pop();
    }
}
