#![forbid(unsafe_code)]

//! Allowed-area manager.
//!
//! ```text
//! New area                 (action: creates an area and selects it)
//! {area label}, {n} cells  (one row per area)
//! ```
//!
//! Enter on an area asks for a new name, Delete asks for confirmation and
//! Ctrl+C duplicates. Areas the host marks immutable (the home area) cannot
//! be renamed or deleted.

use wlnav_core::{AnnouncementSink, KeyCode, KeyEvent, MenuEntry};

use crate::domain::{DomainError, EntityId, NavError, report_failure};
use crate::flat_menu::{FlatMenu, MenuOptions};
use crate::response::Response;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaInfo {
    pub id: EntityId,
    pub label: String,
    pub cells: usize,
    /// `false` for areas the player may not rename or delete.
    pub mutable: bool,
}

/// Host side of area management.
pub trait AreaRegistry {
    fn areas(&self) -> Vec<AreaInfo>;
    fn create_area(&mut self) -> Result<EntityId, DomainError>;
    fn rename_area(&mut self, area: EntityId, name: &str) -> Result<(), DomainError>;
    fn delete_area(&mut self, area: EntityId) -> Result<(), DomainError>;
    fn duplicate_area(&mut self, area: EntityId) -> Result<EntityId, DomainError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaRow {
    New,
    Area(EntityId),
}

/// Children the manager asks the session to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AreaRequest {
    Rename { area: EntityId, current: String },
    ConfirmDelete { area: EntityId, message: String },
}

pub fn build_areas<D: AreaRegistry + ?Sized>(domain: &D) -> Vec<MenuEntry<AreaRow>> {
    let mut entries = vec![MenuEntry::action("New area", AreaRow::New)];
    entries.extend(domain.areas().into_iter().map(|a| {
        let cells = if a.cells == 1 { "1 cell".to_owned() } else { format!("{} cells", a.cells) };
        MenuEntry::leaf(a.label, AreaRow::Area(a.id)).with_detail(cells)
    }));
    entries
}

#[derive(Debug, Clone)]
pub struct AreaManager {
    menu: FlatMenu<AreaRow>,
    active: bool,
}

impl Default for AreaManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AreaManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            menu: FlatMenu::new("No areas"),
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
    pub fn menu(&self) -> &FlatMenu<AreaRow> {
        &self.menu
    }

    pub fn open<D: AreaRegistry + ?Sized>(&mut self, domain: &D, sink: &mut dyn AnnouncementSink) -> Result<(), NavError> {
        self.menu.load(build_areas(domain), 0);
        self.active = true;
        tracing::debug!(rows = self.menu.len(), "area manager opened");
        let text = format!("Manage areas. {}", self.menu.describe());
        self.menu.say(sink, text);
        Ok(())
    }

    pub fn close(&mut self) {
        if self.active {
            tracing::debug!("area manager closed");
        }
        self.active = false;
        self.menu.clear();
    }

    pub fn reannounce(&mut self, sink: &mut dyn AnnouncementSink) {
        self.menu.reannounce(sink);
    }

    fn area_info<D: AreaRegistry + ?Sized>(domain: &D, area: EntityId) -> Option<AreaInfo> {
        domain.areas().into_iter().find(|a| a.id == area)
    }

    fn rebuild_on<D: AreaRegistry + ?Sized>(&mut self, domain: &D, row: AreaRow, sink: &mut dyn AnnouncementSink) {
        self.menu.rebuild(build_areas(domain));
        self.menu.select_payload(&row);
        self.menu.reannounce(sink);
    }

    pub fn handle_key<D: AreaRegistry + ?Sized>(
        &mut self,
        domain: &mut D,
        key: &KeyEvent,
        sink: &mut dyn AnnouncementSink,
    ) -> Response<AreaRequest> {
        if !self.active {
            return Response::Ignored;
        }
        match key.code {
            KeyCode::Escape => {
                self.close();
                Response::Closed
            }
            KeyCode::Enter => self.execute(domain, sink),
            KeyCode::Delete => self.request_delete(&*domain, sink),
            KeyCode::Char(c) if key.has_ctrl() && c.eq_ignore_ascii_case(&'c') => {
                self.duplicate(domain, sink);
                Response::Consumed
            }
            _ => Response::consumed_if(self.menu.handle_navigation(key, sink)),
        }
    }

    fn selected_area<D: AreaRegistry + ?Sized>(&self, domain: &D) -> Option<AreaInfo> {
        match self.menu.selected_payload() {
            Some(AreaRow::Area(id)) => Self::area_info(domain, *id),
            _ => None,
        }
    }

    fn execute<D: AreaRegistry + ?Sized>(&mut self, domain: &mut D, sink: &mut dyn AnnouncementSink) -> Response<AreaRequest> {
        match self.menu.selected_payload().copied() {
            Some(AreaRow::New) => {
                match domain.create_area() {
                    Ok(area) => {
                        tracing::debug!(%area, "area created");
                        self.rebuild_on(&*domain, AreaRow::Area(area), sink);
                    }
                    Err(err) => report_failure(self.menu.announcer_mut(), sink, &err),
                }
                Response::Consumed
            }
            Some(AreaRow::Area(_)) => match self.selected_area(&*domain) {
                Some(info) if info.mutable => Response::Emit(AreaRequest::Rename {
                    area: info.id,
                    current: info.label,
                }),
                Some(info) => {
                    self.menu.say_high(sink, format!("{} cannot be renamed", info.label));
                    Response::Consumed
                }
                None => {
                    report_failure(self.menu.announcer_mut(), sink, &DomainError::Missing);
                    Response::Consumed
                }
            },
            None => Response::Consumed,
        }
    }

    fn request_delete<D: AreaRegistry + ?Sized>(&mut self, domain: &D, sink: &mut dyn AnnouncementSink) -> Response<AreaRequest> {
        match self.selected_area(domain) {
            Some(info) if info.mutable => Response::Emit(AreaRequest::ConfirmDelete {
                area: info.id,
                message: format!("Delete {}?", info.label),
            }),
            _ => {
                self.menu.say_high(sink, "Cannot delete this item");
                Response::Consumed
            }
        }
    }

    fn duplicate<D: AreaRegistry + ?Sized>(&mut self, domain: &mut D, sink: &mut dyn AnnouncementSink) {
        let Some(info) = self.selected_area(&*domain) else {
            self.menu.say_high(sink, "Cannot copy this item");
            return;
        };
        match domain.duplicate_area(info.id) {
            Ok(copy) => {
                tracing::debug!(area = %info.id, %copy, "area duplicated");
                self.rebuild_on(&*domain, AreaRow::Area(copy), sink);
            }
            Err(err) => report_failure(self.menu.announcer_mut(), sink, &err),
        }
    }

    /// Parent half of the rename field.
    pub fn rename_submitted<D: AreaRegistry + ?Sized>(
        &mut self,
        domain: &mut D,
        area: EntityId,
        name: &str,
        sink: &mut dyn AnnouncementSink,
    ) {
        if !self.active {
            return;
        }
        match domain.rename_area(area, name) {
            Ok(()) => self.rebuild_on(&*domain, AreaRow::Area(area), sink),
            Err(err) => report_failure(self.menu.announcer_mut(), sink, &err),
        }
    }

    /// Parent half of the delete confirmation.
    pub fn delete_confirmed<D: AreaRegistry + ?Sized>(
        &mut self,
        domain: &mut D,
        area: EntityId,
        sink: &mut dyn AnnouncementSink,
    ) {
        if !self.active {
            return;
        }
        let label = Self::area_info(&*domain, area).map(|a| a.label).unwrap_or_default();
        match domain.delete_area(area) {
            Ok(()) => {
                tracing::debug!(%area, "area deleted");
                self.menu.rebuild(build_areas(&*domain));
                self.menu.say_high(sink, format!("Deleted {label}"));
            }
            Err(err) => report_failure(self.menu.announcer_mut(), sink, &err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wlnav_core::{Announcement, Priority};

    struct Areas {
        areas: Vec<AreaInfo>,
        next: u64,
        limit: usize,
    }

    impl Areas {
        fn new() -> Self {
            Self {
                areas: vec![
                    AreaInfo { id: EntityId(1), label: "Home".into(), cells: 400, mutable: false },
                    AreaInfo { id: EntityId(2), label: "Kitchen".into(), cells: 1, mutable: true },
                ],
                next: 3,
                limit: 4,
            }
        }
    }

    impl AreaRegistry for Areas {
        fn areas(&self) -> Vec<AreaInfo> {
            self.areas.clone()
        }
        fn create_area(&mut self) -> Result<EntityId, DomainError> {
            if self.areas.len() >= self.limit {
                return Err(DomainError::Rejected("Too many areas".into()));
            }
            let id = EntityId(self.next);
            self.next += 1;
            self.areas.push(AreaInfo { id, label: format!("Area {}", id.0), cells: 0, mutable: true });
            Ok(id)
        }
        fn rename_area(&mut self, area: EntityId, name: &str) -> Result<(), DomainError> {
            let a = self.areas.iter_mut().find(|a| a.id == area).ok_or(DomainError::Missing)?;
            a.label = name.to_owned();
            Ok(())
        }
        fn delete_area(&mut self, area: EntityId) -> Result<(), DomainError> {
            let before = self.areas.len();
            self.areas.retain(|a| a.id != area);
            if self.areas.len() == before { Err(DomainError::Missing) } else { Ok(()) }
        }
        fn duplicate_area(&mut self, area: EntityId) -> Result<EntityId, DomainError> {
            let mut copy = self.areas.iter().find(|a| a.id == area).cloned().ok_or(DomainError::Missing)?;
            copy.id = EntityId(self.next);
            self.next += 1;
            copy.label = format!("{} copy", copy.label);
            copy.mutable = true;
            self.areas.push(copy.clone());
            Ok(copy.id)
        }
    }

    fn key(m: &mut AreaManager, a: &mut Areas, sink: &mut Vec<Announcement>, k: KeyEvent) -> Response<AreaRequest> {
        m.handle_key(a, &k, sink)
    }

    fn opened(a: &Areas) -> (AreaManager, Vec<Announcement>) {
        let mut m = AreaManager::new();
        let mut sink: Vec<Announcement> = Vec::new();
        m.open(a, &mut sink).unwrap();
        (m, sink)
    }

    #[test]
    fn lists_new_then_areas() {
        let a = Areas::new();
        let (m, sink) = opened(&a);
        assert_eq!(m.menu().len(), 3);
        assert_eq!(sink[0].text, "Manage areas. New area. 1 of 3");
        assert_eq!(m.menu().describe_at(2).as_deref(), Some("Kitchen, 1 cell. 3 of 3"));
    }

    #[test]
    fn new_area_is_selected() {
        let mut a = Areas::new();
        let (mut m, mut sink) = opened(&a);
        let _ = key(&mut m, &mut a, &mut sink, KeyEvent::plain(KeyCode::Enter));
        assert_eq!(m.menu().index(), 3);
        assert_eq!(sink.last().map(|s| s.text.as_str()), Some("Area 3, 0 cells. 4 of 4"));
    }

    #[test]
    fn area_limit_is_reported() {
        let mut a = Areas::new();
        a.limit = 2;
        let (mut m, mut sink) = opened(&a);
        let _ = key(&mut m, &mut a, &mut sink, KeyEvent::plain(KeyCode::Enter));
        let last = sink.last().unwrap();
        assert_eq!(last.text, "Too many areas");
        assert_eq!(last.priority, Priority::High);
        assert_eq!(m.menu().index(), 0);
    }

    #[test]
    fn home_cannot_be_renamed_or_deleted() {
        let mut a = Areas::new();
        let (mut m, mut sink) = opened(&a);
        let _ = key(&mut m, &mut a, &mut sink, KeyEvent::plain(KeyCode::Down));
        assert_eq!(key(&mut m, &mut a, &mut sink, KeyEvent::plain(KeyCode::Enter)), Response::Consumed);
        assert_eq!(sink.last().map(|s| s.text.as_str()), Some("Home cannot be renamed"));
        assert_eq!(key(&mut m, &mut a, &mut sink, KeyEvent::plain(KeyCode::Delete)), Response::Consumed);
        assert_eq!(sink.last().map(|s| s.text.as_str()), Some("Cannot delete this item"));
    }

    #[test]
    fn rename_and_delete_go_through_children() {
        let mut a = Areas::new();
        let (mut m, mut sink) = opened(&a);
        let _ = key(&mut m, &mut a, &mut sink, KeyEvent::plain(KeyCode::End));
        assert_eq!(
            key(&mut m, &mut a, &mut sink, KeyEvent::plain(KeyCode::Enter)),
            Response::Emit(AreaRequest::Rename { area: EntityId(2), current: "Kitchen".into() })
        );
        m.rename_submitted(&mut a, EntityId(2), "Pantry", &mut sink);
        assert_eq!(m.menu().selected().map(|e| e.label.as_str()), Some("Pantry"));

        let r = key(&mut m, &mut a, &mut sink, KeyEvent::plain(KeyCode::Delete));
        assert_eq!(r, Response::Emit(AreaRequest::ConfirmDelete { area: EntityId(2), message: "Delete Pantry?".into() }));
        m.delete_confirmed(&mut a, EntityId(2), &mut sink);
        assert_eq!(m.menu().len(), 2);
        assert_eq!(m.menu().index(), 1);
        assert_eq!(sink.last().map(|s| s.text.as_str()), Some("Deleted Pantry"));
    }

    #[test]
    fn ctrl_c_duplicates_and_selects_copy() {
        let mut a = Areas::new();
        let (mut m, mut sink) = opened(&a);
        let _ = key(&mut m, &mut a, &mut sink, KeyEvent::plain(KeyCode::Down));
        let _ = key(&mut m, &mut a, &mut sink, KeyEvent::ctrl(KeyCode::Char('c')));
        assert_eq!(m.menu().selected().map(|e| e.label.as_str()), Some("Home copy"));
    }
}
