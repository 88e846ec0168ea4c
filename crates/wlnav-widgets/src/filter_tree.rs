#![forbid(unsafe_code)]

//! Allowed-things filter of a storage zone, as a tree.
//!
//! Root rows are top-level categories; nested categories are
//! `SubCategory` rows and thing defs are `Item` leaves. Categories load
//! their children lazily. Each row's description carries its allowance
//! (`allowed`, `not allowed`, `partially allowed`) so toggling never
//! changes the label and the selection stays put across the rebuild.
//!
//! Space toggles the selected row; Enter toggles an item and expands or
//! collapses a category.

use std::fmt;

use wlnav_core::{AnnouncementSink, KeyCode, KeyEvent, TreeEntry, TreeEntryKind};

use crate::domain::{DefName, DomainError, EntityId, NavError, report_failure};
use crate::flat_menu::MenuOptions;
use crate::response::Response;
use crate::tree_menu::{Materializer, TreeMenu};

/// Allowance state of a filter node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Allowance {
    Allowed,
    Disallowed,
    /// A category with some, but not all, descendants allowed.
    Partial,
}

impl fmt::Display for Allowance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Allowed => "allowed",
            Self::Disallowed => "not allowed",
            Self::Partial => "partially allowed",
        })
    }
}

/// One category or thing def in a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterNode {
    pub def: DefName,
    pub label: String,
    pub is_category: bool,
    pub allowance: Allowance,
}

/// Host side of filter editing.
pub trait ThingFilterSource {
    /// Label of the filter's owner (usually a zone), `None` if gone.
    fn filter_label(&self, filter: EntityId) -> Option<String>;
    fn filter_roots(&self, filter: EntityId) -> Vec<FilterNode>;
    fn filter_children(&self, filter: EntityId, category: &DefName) -> Result<Vec<FilterNode>, DomainError>;
    /// Allow or disallow a def; on a category this applies to all descendants.
    fn set_allowed(&mut self, filter: EntityId, def: &DefName, allowed: bool) -> Result<(), DomainError>;
}

/// Payload of a filter row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRow {
    pub def: DefName,
    pub is_category: bool,
    pub allowance: Allowance,
}

fn node_entry(node: FilterNode, nested: bool) -> TreeEntry<FilterRow> {
    let kind = match (node.is_category, nested) {
        (true, false) => TreeEntryKind::Category,
        (true, true) => TreeEntryKind::SubCategory,
        (false, _) => TreeEntryKind::Item,
    };
    let entry = TreeEntry::new(kind, node.label)
        .with_description(node.allowance.to_string())
        .with_payload(FilterRow {
            def: node.def,
            is_category: node.is_category,
            allowance: node.allowance,
        });
    if node.is_category { entry.lazy() } else { entry }
}

/// Root rows of a filter tree.
pub fn build_filter_roots<D: ThingFilterSource + ?Sized>(domain: &D, filter: EntityId) -> Vec<TreeEntry<FilterRow>> {
    domain
        .filter_roots(filter)
        .into_iter()
        .map(|node| node_entry(node, false))
        .collect()
}

/// Loads a category's children from the filter source.
pub struct FilterChildren<'a, D: ?Sized> {
    domain: &'a D,
    filter: EntityId,
}

impl<'a, D: ThingFilterSource + ?Sized> FilterChildren<'a, D> {
    pub fn new(domain: &'a D, filter: EntityId) -> Self {
        Self { domain, filter }
    }
}

impl<D: ThingFilterSource + ?Sized> Materializer<FilterRow> for FilterChildren<'_, D> {
    fn materialize(&mut self, entry: &TreeEntry<FilterRow>) -> Result<Vec<TreeEntry<FilterRow>>, DomainError> {
        let Some(row) = entry.payload().filter(|r| r.is_category) else {
            return Ok(Vec::new());
        };
        let children = self.domain.filter_children(self.filter, &row.def)?;
        Ok(children.into_iter().map(|node| node_entry(node, true)).collect())
    }
}

/// Tree controller over one thing filter.
#[derive(Debug, Clone)]
pub struct ThingFilterTree {
    tree: TreeMenu<FilterRow>,
    filter: Option<EntityId>,
    active: bool,
}

impl Default for ThingFilterTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ThingFilterTree {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: TreeMenu::new("Filter is empty"),
            filter: None,
            active: false,
        }
    }

    pub fn set_options(&mut self, options: MenuOptions) {
        self.tree.set_options(options);
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn is_suppressing(&self) -> bool {
        false
    }

    #[must_use]
    pub fn tree(&self) -> &TreeMenu<FilterRow> {
        &self.tree
    }

    #[must_use]
    pub fn filter(&self) -> Option<EntityId> {
        self.filter
    }

    pub fn open<D: ThingFilterSource + ?Sized>(
        &mut self,
        domain: &D,
        filter: EntityId,
        sink: &mut dyn AnnouncementSink,
    ) -> Result<(), NavError> {
        let Some(label) = domain.filter_label(filter) else {
            tracing::warn!(%filter, "filter refused: owner missing");
            return Err(NavError::MissingTarget(format!("filter {filter}")));
        };
        self.filter = Some(filter);
        self.tree.load(build_filter_roots(domain, filter));
        self.active = true;
        tracing::debug!(%filter, roots = self.tree.len(), "filter opened");
        let text = format!("Filter for {label}. {}", self.tree.describe());
        self.tree.say(sink, text);
        Ok(())
    }

    pub fn close(&mut self) {
        if self.active {
            tracing::debug!(filter = ?self.filter, "filter closed");
        }
        self.active = false;
        self.filter = None;
        self.tree.clear();
    }

    /// Rebuild from current domain state, keeping selection and expansion.
    pub fn refresh<D: ThingFilterSource + ?Sized>(&mut self, domain: &D) {
        let Some(filter) = self.filter.filter(|_| self.active) else {
            return;
        };
        let roots = build_filter_roots(domain, filter);
        self.tree.rebuild(roots, &mut FilterChildren::new(domain, filter));
    }

    pub fn reannounce(&mut self, sink: &mut dyn AnnouncementSink) {
        self.tree.reannounce(sink);
    }

    pub fn handle_key<D: ThingFilterSource + ?Sized>(
        &mut self,
        domain: &mut D,
        key: &KeyEvent,
        sink: &mut dyn AnnouncementSink,
    ) -> Response {
        let (true, Some(filter)) = (self.active, self.filter) else {
            return Response::Ignored;
        };
        match key.code {
            KeyCode::Escape => {
                self.close();
                Response::Closed
            }
            KeyCode::Char(' ') if !key.has_ctrl() => {
                self.toggle(domain, filter, sink);
                Response::Consumed
            }
            KeyCode::Enter => {
                let is_category = self.tree.selected_payload().is_some_and(|r| r.is_category);
                if is_category {
                    self.tree.toggle(&mut FilterChildren::new(&*domain, filter), sink);
                } else {
                    self.toggle(domain, filter, sink);
                }
                Response::Consumed
            }
            _ if self.tree.refuse_edit(key, sink) => Response::Consumed,
            _ => {
                let mut children = FilterChildren::new(&*domain, filter);
                Response::consumed_if(self.tree.handle_navigation(key, &mut children, sink))
            }
        }
    }

    fn toggle<D: ThingFilterSource + ?Sized>(
        &mut self,
        domain: &mut D,
        filter: EntityId,
        sink: &mut dyn AnnouncementSink,
    ) {
        let Some(row) = self.tree.selected_payload().cloned() else {
            let label = self.tree.selected().map(|e| e.label.clone()).unwrap_or_default();
            self.tree.say_high(sink, format!("Cannot toggle {label}"));
            return;
        };
        let allow = row.allowance != Allowance::Allowed;
        match domain.set_allowed(filter, &row.def, allow) {
            Ok(()) => {
                tracing::debug!(%filter, def = %row.def, allow, "filter toggled");
                self.refresh(&*domain);
                self.tree.announce_selection(sink);
            }
            Err(err) => report_failure(self.tree.announcer_mut(), sink, &err),
        }
    }
}
