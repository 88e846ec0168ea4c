#![forbid(unsafe_code)]

//! Inspection of the objects on a map cell.
//!
//! The tree has one root per object. Expanding an object loads its
//! categories; expanding a category loads its lines, which are read-only
//! text or executable actions. Categories the host marks as tabs do not
//! expand: Enter opens them as an [`InspectionTab`], a flat list that
//! closes back to the tree.

use wlnav_core::{AnnouncementSink, KeyCode, KeyEvent, MenuEntry, TreeEntry, TreeEntryKind};

use crate::domain::{Cell, DefName, DomainError, EntityId, NavError, report_failure};
use crate::flat_menu::{FlatMenu, MenuOptions};
use crate::response::Response;
use crate::tree_menu::{Materializer, TreeMenu};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectObject {
    pub id: EntityId,
    pub label: String,
    pub description: String,
    pub deletable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectCategory {
    pub def: DefName,
    pub label: String,
    /// Opens as a separate tab instead of expanding in place.
    pub is_tab: bool,
}

/// One line inside a category or tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectLine {
    Text(String),
    Action { def: DefName, label: String, enabled: bool },
}

/// Host side of inspection.
pub trait Inspectable {
    fn objects_at(&self, cell: Cell) -> Vec<InspectObject>;
    fn categories(&self, object: EntityId) -> Result<Vec<InspectCategory>, DomainError>;
    fn category_lines(&self, object: EntityId, category: &DefName) -> Result<Vec<InspectLine>, DomainError>;
    fn run_inspect_action(&mut self, object: EntityId, action: &DefName) -> Result<(), DomainError>;
    fn delete_object(&mut self, object: EntityId) -> Result<(), DomainError>;
}

/// Payload of an inspection row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectRef {
    Object(EntityId),
    Category { object: EntityId, category: DefName, is_tab: bool },
    Action { object: EntityId, action: DefName },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectionRequest {
    OpenTab { object: EntityId, tab: DefName, title: String },
}

pub fn build_inspection_roots<D: Inspectable + ?Sized>(domain: &D, cell: Cell) -> Vec<TreeEntry<InspectRef>> {
    domain
        .objects_at(cell)
        .into_iter()
        .map(|o| {
            TreeEntry::new(TreeEntryKind::Object, o.label)
                .with_description(o.description)
                .with_deletable(o.deletable)
                .with_payload(InspectRef::Object(o.id))
                .lazy()
        })
        .collect()
}

fn line_entry(object: EntityId, line: InspectLine) -> TreeEntry<InspectRef> {
    match line {
        InspectLine::Text(text) => TreeEntry::detail_text(text),
        InspectLine::Action { def, label, enabled } => TreeEntry::new(TreeEntryKind::Action, label)
            .with_enabled(enabled)
            .with_payload(InspectRef::Action { object, action: def }),
    }
}

/// Loads object categories and category lines.
pub struct InspectChildren<'a, D: ?Sized> {
    domain: &'a D,
}

impl<'a, D: Inspectable + ?Sized> InspectChildren<'a, D> {
    pub fn new(domain: &'a D) -> Self {
        Self { domain }
    }
}

impl<D: Inspectable + ?Sized> Materializer<InspectRef> for InspectChildren<'_, D> {
    fn materialize(&mut self, entry: &TreeEntry<InspectRef>) -> Result<Vec<TreeEntry<InspectRef>>, DomainError> {
        match entry.payload() {
            Some(InspectRef::Object(object)) => {
                let object = *object;
                let categories = self.domain.categories(object)?;
                Ok(categories
                    .into_iter()
                    .map(|c| {
                        let row = TreeEntry::new(TreeEntryKind::Category, c.label).with_payload(InspectRef::Category {
                            object,
                            category: c.def,
                            is_tab: c.is_tab,
                        });
                        if c.is_tab { row.with_description("tab") } else { row.lazy() }
                    })
                    .collect())
            }
            Some(InspectRef::Category { object, category, is_tab: false }) => {
                let lines = self.domain.category_lines(*object, category)?;
                Ok(lines.into_iter().map(|l| line_entry(*object, l)).collect())
            }
            _ => Ok(Vec::new()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InspectionTree {
    tree: TreeMenu<InspectRef>,
    cell: Option<Cell>,
    active: bool,
}

impl Default for InspectionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl InspectionTree {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: TreeMenu::new("Nothing here"),
            cell: None,
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
    pub fn tree(&self) -> &TreeMenu<InspectRef> {
        &self.tree
    }

    #[must_use]
    pub fn cell(&self) -> Option<Cell> {
        self.cell
    }

    /// Open on the objects at `cell`. Refuses an empty cell.
    pub fn open<D: Inspectable + ?Sized>(
        &mut self,
        domain: &D,
        cell: Cell,
        sink: &mut dyn AnnouncementSink,
    ) -> Result<(), NavError> {
        let roots = build_inspection_roots(domain, cell);
        if roots.is_empty() {
            tracing::debug!(%cell, "inspection refused: nothing at cell");
            return Err(NavError::Disallowed {
                kind: "inspection",
                reason: "nothing to inspect".to_owned(),
            });
        }
        self.cell = Some(cell);
        self.tree.load(roots);
        self.active = true;
        tracing::debug!(%cell, roots = self.tree.len(), "inspection opened");
        let text = format!("Inspecting. {}", self.tree.describe());
        self.tree.say(sink, text);
        Ok(())
    }

    pub fn close(&mut self) {
        if self.active {
            tracing::debug!(cell = ?self.cell, "inspection closed");
        }
        self.active = false;
        self.cell = None;
        self.tree.clear();
    }

    pub fn reannounce(&mut self, sink: &mut dyn AnnouncementSink) {
        self.tree.reannounce(sink);
    }

    /// Rebuild from current domain state, keeping selection and expansion.
    pub fn refresh<D: Inspectable + ?Sized>(&mut self, domain: &D) {
        let Some(cell) = self.cell.filter(|_| self.active) else {
            return;
        };
        self.tree.rebuild(build_inspection_roots(domain, cell), &mut InspectChildren::new(domain));
    }

    pub fn handle_key<D: Inspectable + ?Sized>(
        &mut self,
        domain: &mut D,
        key: &KeyEvent,
        sink: &mut dyn AnnouncementSink,
    ) -> Response<InspectionRequest> {
        if !self.active {
            return Response::Ignored;
        }
        match key.code {
            KeyCode::Escape => {
                self.close();
                Response::Closed
            }
            KeyCode::Enter => self.execute(domain, sink),
            KeyCode::Delete => {
                self.delete(domain, sink);
                Response::Consumed
            }
            KeyCode::Char(c) if key.has_ctrl() && c.eq_ignore_ascii_case(&'c') => {
                self.tree.say_high(sink, "Cannot copy this item");
                Response::Consumed
            }
            _ => Response::consumed_if(self.tree.handle_navigation(key, &mut InspectChildren::new(&*domain), sink)),
        }
    }

    fn execute<D: Inspectable + ?Sized>(
        &mut self,
        domain: &mut D,
        sink: &mut dyn AnnouncementSink,
    ) -> Response<InspectionRequest> {
        let Some(entry) = self.tree.selected() else {
            return Response::Consumed;
        };
        if entry.is_expandable() {
            self.tree.toggle(&mut InspectChildren::new(&*domain), sink);
            return Response::Consumed;
        }
        let label = entry.label.clone();
        let enabled = entry.enabled;
        match entry.payload().cloned() {
            Some(InspectRef::Category { object, category, is_tab: true }) => Response::Emit(InspectionRequest::OpenTab {
                object,
                tab: category,
                title: label,
            }),
            Some(InspectRef::Action { object, action }) if enabled => {
                match domain.run_inspect_action(object, &action) {
                    Ok(()) => {
                        tracing::debug!(%object, %action, "inspection action ran");
                        self.refresh(&*domain);
                        self.tree.announce_selection(sink);
                    }
                    Err(err) => report_failure(self.tree.announcer_mut(), sink, &err),
                }
                Response::Consumed
            }
            _ => {
                self.tree.say_high(sink, format!("{label} is not available"));
                Response::Consumed
            }
        }
    }

    fn delete<D: Inspectable + ?Sized>(&mut self, domain: &mut D, sink: &mut dyn AnnouncementSink) {
        let target = self.tree.selected().and_then(|e| match e.payload() {
            Some(InspectRef::Object(id)) if e.deletable => Some((*id, e.label.clone())),
            _ => None,
        });
        let Some((object, label)) = target else {
            self.tree.say_high(sink, "Cannot delete this item");
            return;
        };
        match domain.delete_object(object) {
            Ok(()) => {
                tracing::debug!(%object, "object deleted");
                self.refresh(&*domain);
                self.tree.say_high(sink, format!("Deleted {label}"));
            }
            Err(err) => report_failure(self.tree.announcer_mut(), sink, &err),
        }
    }
}

/// Flat view of one inspection tab.
#[derive(Debug, Clone)]
pub struct InspectionTab {
    menu: FlatMenu<DefName>,
    object: Option<EntityId>,
    tab: Option<DefName>,
    active: bool,
}

impl Default for InspectionTab {
    fn default() -> Self {
        Self::new()
    }
}

impl InspectionTab {
    #[must_use]
    pub fn new() -> Self {
        Self {
            menu: FlatMenu::new("Tab is empty"),
            object: None,
            tab: None,
            active: false,
        }
    }

    pub fn set_options(&mut self, options: MenuOptions) {
        self.menu.set_options(options);
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
    pub fn menu(&self) -> &FlatMenu<DefName> {
        &self.menu
    }

    fn build<D: Inspectable + ?Sized>(
        domain: &D,
        object: EntityId,
        tab: &DefName,
    ) -> Result<Vec<MenuEntry<DefName>>, DomainError> {
        let lines = domain.category_lines(object, tab)?;
        Ok(lines
            .into_iter()
            .map(|line| match line {
                InspectLine::Text(text) => MenuEntry::note(text),
                InspectLine::Action { def, label, enabled } => MenuEntry::action(label, def).with_enabled(enabled),
            })
            .collect())
    }

    pub fn open<D: Inspectable + ?Sized>(
        &mut self,
        domain: &D,
        object: EntityId,
        tab: DefName,
        title: &str,
        sink: &mut dyn AnnouncementSink,
    ) -> Result<(), NavError> {
        let entries = Self::build(domain, object, &tab)?;
        self.menu.load(entries, 0);
        self.object = Some(object);
        self.tab = Some(tab);
        self.active = true;
        tracing::debug!(%object, title, "inspection tab opened");
        let text = format!("{title} tab. {}", self.menu.describe());
        self.menu.say(sink, text);
        Ok(())
    }

    pub fn close(&mut self) {
        self.active = false;
        self.object = None;
        self.tab = None;
        self.menu.clear();
    }

    pub fn handle_key<D: Inspectable + ?Sized>(
        &mut self,
        domain: &mut D,
        key: &KeyEvent,
        sink: &mut dyn AnnouncementSink,
    ) -> Response {
        let (true, Some(object), Some(tab)) = (self.active, self.object, self.tab.clone()) else {
            return Response::Ignored;
        };
        match key.code {
            KeyCode::Escape => {
                self.close();
                Response::Closed
            }
            KeyCode::Enter => {
                let Some(entry) = self.menu.selected() else {
                    return Response::Consumed;
                };
                let Some(action) = entry.payload().cloned().filter(|_| entry.is_actionable()) else {
                    let text = format!("{} is not available", entry.label);
                    self.menu.say_high(sink, text);
                    return Response::Consumed;
                };
                match domain.run_inspect_action(object, &action) {
                    Ok(()) => match Self::build(&*domain, object, &tab) {
                        Ok(entries) => {
                            self.menu.rebuild(entries);
                            self.menu.announce_selection(sink);
                        }
                        Err(err) => report_failure(self.menu.announcer_mut(), sink, &err),
                    },
                    Err(err) => report_failure(self.menu.announcer_mut(), sink, &err),
                }
                Response::Consumed
            }
            _ if self.menu.refuse_edit(key, sink) => Response::Consumed,
            _ => Response::consumed_if(self.menu.handle_navigation(key, sink)),
        }
    }
}
