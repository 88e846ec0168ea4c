#![forbid(unsafe_code)]

//! Item and tree models a controller projects domain data into.
//!
//! A model is rebuilt from scratch on every domain change; entries are never
//! shared between builds. Payloads are opaque domain references (`P`) the
//! controller hands back to its domain collaborator.
//!
//! # Invariants
//! 1. A [`MenuEntry`] has no payload only when its kind is [`MenuEntryKind::Note`].
//! 2. `TreeEntry::expanded` implies `TreeEntry::expandable`.
//! 3. A loaded child's `indent` is always its parent's `indent + 1`.
//! 4. A tree owns its children exclusively: no sharing, no cycles.

/// Kind of a flat menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuEntryKind {
    /// Executes something (open a picker, create, accept).
    Action,
    /// Flips a state on the payload.
    Toggle,
    /// A plain selectable item.
    Leaf,
    /// Informational text; never actionable.
    Note,
}

/// One selectable row in a flat menu.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry<P> {
    pub kind: MenuEntryKind,
    pub label: String,
    /// Announced after the label; not part of the selection key.
    pub detail: String,
    payload: Option<P>,
    pub enabled: bool,
}

impl<P> MenuEntry<P> {
    fn with_kind(kind: MenuEntryKind, label: impl Into<String>, payload: P) -> Self {
        Self {
            kind,
            label: label.into(),
            detail: String::new(),
            payload: Some(payload),
            enabled: true,
        }
    }

    /// Actionable entry.
    #[must_use]
    pub fn action(label: impl Into<String>, payload: P) -> Self {
        Self::with_kind(MenuEntryKind::Action, label, payload)
    }

    /// Entry whose execution toggles a state.
    #[must_use]
    pub fn toggle(label: impl Into<String>, payload: P) -> Self {
        Self::with_kind(MenuEntryKind::Toggle, label, payload)
    }

    /// Plain selectable entry.
    #[must_use]
    pub fn leaf(label: impl Into<String>, payload: P) -> Self {
        Self::with_kind(MenuEntryKind::Leaf, label, payload)
    }

    /// Non-actionable note. Always disabled.
    #[must_use]
    pub fn note(label: impl Into<String>) -> Self {
        Self {
            kind: MenuEntryKind::Note,
            label: label.into(),
            detail: String::new(),
            payload: None,
            enabled: false,
        }
    }

    /// Set the annotation text.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Set whether the entry can be executed.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled && self.kind != MenuEntryKind::Note;
        self
    }

    /// Domain reference, absent only for notes.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    /// True for notes and disabled entries.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.enabled && self.payload.is_some()
    }
}

/// Kind of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeEntryKind {
    /// A top-level domain object (a pawn, a building).
    Object,
    Category,
    SubCategory,
    Item,
    Action,
    /// Read-only text.
    DetailText,
}

/// Children of a tree entry: not yet materialized, or loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum Children<P> {
    /// Children exist in the domain but have not been asked for yet.
    Unloaded,
    Loaded(Vec<TreeEntry<P>>),
}

impl<P> Default for Children<P> {
    fn default() -> Self {
        Self::Loaded(Vec::new())
    }
}

impl<P> Children<P> {
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Loaded children, empty when unloaded.
    #[must_use]
    pub fn as_slice(&self) -> &[TreeEntry<P>] {
        match self {
            Self::Loaded(children) => children,
            Self::Unloaded => &[],
        }
    }
}

/// One node of a hierarchical menu.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEntry<P> {
    pub kind: TreeEntryKind,
    pub label: String,
    /// Announced after the label; not part of the selection key.
    pub description: String,
    indent: usize,
    expandable: bool,
    expanded: bool,
    children: Children<P>,
    payload: Option<P>,
    pub enabled: bool,
    pub deletable: bool,
}

impl<P> TreeEntry<P> {
    /// Create a childless, non-expandable entry at indent 0.
    #[must_use]
    pub fn new(kind: TreeEntryKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            description: String::new(),
            indent: 0,
            expandable: false,
            expanded: false,
            children: Children::default(),
            payload: None,
            enabled: true,
            deletable: false,
        }
    }

    /// Read-only text row.
    #[must_use]
    pub fn detail_text(label: impl Into<String>) -> Self {
        Self::new(TreeEntryKind::DetailText, label)
    }

    /// Attach a domain reference.
    #[must_use]
    pub fn with_payload(mut self, payload: P) -> Self {
        self.payload = Some(payload);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_deletable(mut self, deletable: bool) -> Self {
        self.deletable = deletable;
        self
    }

    /// Mark expandable with children to be materialized on first expansion.
    #[must_use]
    pub fn lazy(mut self) -> Self {
        self.expandable = true;
        self.children = Children::Unloaded;
        self
    }

    /// Mark expandable with eagerly built children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<TreeEntry<P>>) -> Self {
        self.expandable = true;
        self.set_children(children);
        self
    }

    #[inline]
    #[must_use]
    pub fn indent(&self) -> usize {
        self.indent
    }

    #[inline]
    #[must_use]
    pub fn is_expandable(&self) -> bool {
        self.expandable
    }

    #[inline]
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    #[inline]
    #[must_use]
    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    #[must_use]
    pub fn children(&self) -> &Children<P> {
        &self.children
    }

    /// Loaded children (empty when unloaded).
    #[must_use]
    pub fn child_entries(&self) -> &[TreeEntry<P>] {
        self.children.as_slice()
    }

    /// Mutable loaded children (empty when unloaded).
    pub fn child_entries_mut(&mut self) -> &mut [TreeEntry<P>] {
        match &mut self.children {
            Children::Loaded(children) => children,
            Children::Unloaded => &mut [],
        }
    }

    /// Set the expansion flag. Refused (returns `false`) when not expandable.
    pub fn set_expanded(&mut self, expanded: bool) -> bool {
        if expanded && !self.expandable {
            return false;
        }
        self.expanded = expanded;
        true
    }

    /// Replace the children, re-indenting them under this entry.
    pub fn set_children(&mut self, mut children: Vec<TreeEntry<P>>) {
        for child in &mut children {
            child.reindent(self.indent + 1);
        }
        self.children = Children::Loaded(children);
    }

    /// Put the entry at `indent`, shifting loaded descendants with it.
    pub fn reindent(&mut self, indent: usize) {
        self.indent = indent;
        for child in self.child_entries_mut() {
            child.reindent(indent + 1);
        }
    }

    /// Selection key for rebuild reselection.
    #[must_use]
    pub fn key(&self) -> SelectionKey<TreeEntryKind> {
        SelectionKey::new(self.kind, self.label.clone())
    }
}

/// Identity used to re-find an entry after a rebuild.
///
/// Payload identity is not stable across rebuilds, so entries are matched by
/// what the user hears: kind plus label, disambiguated by the entry's
/// ordinal among siblings sharing that pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionKey<K> {
    pub kind: K,
    pub label: String,
    /// Zero-based index among earlier entries with the same kind and label.
    pub occurrence: usize,
}

impl<K> SelectionKey<K> {
    #[must_use]
    pub fn new(kind: K, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            occurrence: 0,
        }
    }

    #[must_use]
    pub fn with_occurrence(mut self, occurrence: usize) -> Self {
        self.occurrence = occurrence;
        self
    }

    /// Same kind and label, ignoring the occurrence ordinal.
    #[must_use]
    pub fn same_entry(&self, other: &Self) -> bool
    where
        K: PartialEq,
    {
        self.kind == other.kind && self.label == other.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_has_no_payload_and_is_disabled() {
        let note: MenuEntry<u32> = MenuEntry::note("Nothing here");
        assert_eq!(note.payload(), None);
        assert!(!note.enabled);
        assert!(!note.with_enabled(true).enabled);
    }

    #[test]
    fn actionable_requires_enabled_payload() {
        assert!(MenuEntry::action("Go", 1).is_actionable());
        assert!(!MenuEntry::action("Go", 1).with_enabled(false).is_actionable());
    }

    #[test]
    fn expanded_implies_expandable() {
        let mut leaf: TreeEntry<()> = TreeEntry::detail_text("Health: 100%");
        assert!(!leaf.set_expanded(true));
        assert!(!leaf.is_expanded());

        let mut lazy: TreeEntry<()> = TreeEntry::new(TreeEntryKind::Object, "Rosa").lazy();
        assert!(lazy.set_expanded(true));
        assert!(lazy.is_expanded());
    }

    #[test]
    fn children_are_reindented() {
        let grandchild: TreeEntry<()> = TreeEntry::detail_text("deep");
        let child = TreeEntry::new(TreeEntryKind::Category, "Gear").with_children(vec![grandchild]);
        let mut root = TreeEntry::new(TreeEntryKind::Object, "Rosa").with_children(vec![child]);
        assert_eq!(root.child_entries()[0].indent(), 1);
        assert_eq!(root.child_entries()[0].child_entries()[0].indent(), 2);

        root.reindent(3);
        assert_eq!(root.child_entries()[0].indent(), 4);
        assert_eq!(root.child_entries()[0].child_entries()[0].indent(), 5);
    }

    #[test]
    fn lazy_children_start_unloaded() {
        let entry: TreeEntry<()> = TreeEntry::new(TreeEntryKind::Object, "Rosa").lazy();
        assert!(!entry.children().is_loaded());
        assert!(entry.child_entries().is_empty());
        assert!(entry.is_expandable());
    }

    #[test]
    fn selection_key_same_entry_ignores_occurrence() {
        let a = SelectionKey::new(MenuEntryKind::Leaf, "X");
        let b = SelectionKey::new(MenuEntryKind::Leaf, "X").with_occurrence(1);
        assert!(a.same_entry(&b));
        assert_ne!(a, b);
    }
}
