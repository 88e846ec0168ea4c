#![forbid(unsafe_code)]

//! Action menu for one zone.
//!
//! Built-in rows (rename, priority, storage filter, delete) hand their work
//! to a child through [`ZoneRequest`]; the session opens the child and calls
//! back into the menu with the result. Host-provided custom actions run
//! directly and rebuild the menu.

use wlnav_core::{AnnouncementSink, KeyCode, KeyEvent, MenuEntry};

use crate::domain::{DefName, DomainError, EntityId, NavError, report_failure};
use crate::flat_menu::{FlatMenu, MenuOptions};
use crate::picker::Choice;
use crate::response::Response;

/// A host-defined zone action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAction {
    pub def: DefName,
    pub label: String,
    pub enabled: bool,
}

/// A priority level a zone can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityLevel {
    pub value: u8,
    pub label: String,
}

/// Zone state as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneInfo {
    pub id: EntityId,
    pub label: String,
    /// Current priority; `None` for zones without one (growing zones).
    pub priority: Option<u8>,
    pub has_filter: bool,
    pub actions: Vec<CustomAction>,
}

/// Host side of zone editing.
pub trait ZoneActions {
    fn zone(&self, zone: EntityId) -> Option<ZoneInfo>;
    fn priority_levels(&self) -> Vec<PriorityLevel>;
    fn rename_zone(&mut self, zone: EntityId, name: &str) -> Result<(), DomainError>;
    fn set_priority(&mut self, zone: EntityId, priority: u8) -> Result<(), DomainError>;
    fn delete_zone(&mut self, zone: EntityId) -> Result<(), DomainError>;
    fn run_zone_action(&mut self, zone: EntityId, action: &DefName) -> Result<(), DomainError>;
}

/// Payload of a zone menu row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneAction {
    Rename,
    SetPriority,
    EditFilter,
    Delete,
    Custom(DefName),
}

/// Children the zone menu asks the session to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneRequest {
    Rename { current: String },
    ChoosePriority { choices: Vec<Choice<u8>>, current: usize },
    EditFilter(EntityId),
    ConfirmDelete { message: String },
}

fn priority_label(levels: &[PriorityLevel], value: u8) -> String {
    levels
        .iter()
        .find(|l| l.value == value)
        .map_or_else(|| value.to_string(), |l| l.label.clone())
}

/// Rows for `zone`, or an empty list if the zone is gone.
pub fn build_zone_actions<D: ZoneActions + ?Sized>(domain: &D, zone: EntityId) -> Vec<MenuEntry<ZoneAction>> {
    let Some(info) = domain.zone(zone) else {
        return Vec::new();
    };
    let mut entries = vec![MenuEntry::action("Rename", ZoneAction::Rename).with_detail(info.label.clone())];
    if let Some(priority) = info.priority {
        let levels = domain.priority_levels();
        entries.push(
            MenuEntry::action("Set priority", ZoneAction::SetPriority).with_detail(priority_label(&levels, priority)),
        );
    }
    if info.has_filter {
        entries.push(MenuEntry::action("Edit storage filter", ZoneAction::EditFilter));
    }
    entries.extend(
        info.actions
            .into_iter()
            .map(|a| MenuEntry::action(a.label, ZoneAction::Custom(a.def)).with_enabled(a.enabled)),
    );
    entries.push(MenuEntry::action("Delete zone", ZoneAction::Delete));
    entries
}

#[derive(Debug, Clone)]
pub struct ZoneActionMenu {
    menu: FlatMenu<ZoneAction>,
    zone: Option<EntityId>,
    active: bool,
}

impl Default for ZoneActionMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneActionMenu {
    #[must_use]
    pub fn new() -> Self {
        Self {
            menu: FlatMenu::new("No actions"),
            zone: None,
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
    pub fn menu(&self) -> &FlatMenu<ZoneAction> {
        &self.menu
    }

    #[must_use]
    pub fn zone(&self) -> Option<EntityId> {
        self.zone
    }

    pub fn open<D: ZoneActions + ?Sized>(
        &mut self,
        domain: &D,
        zone: EntityId,
        sink: &mut dyn AnnouncementSink,
    ) -> Result<(), NavError> {
        let Some(info) = domain.zone(zone) else {
            tracing::warn!(%zone, "zone actions refused: zone missing");
            return Err(NavError::MissingTarget(format!("zone {zone}")));
        };
        self.zone = Some(zone);
        self.menu.load(build_zone_actions(domain, zone), 0);
        self.active = true;
        tracing::debug!(%zone, rows = self.menu.len(), "zone actions opened");
        let text = format!("{}. {}", info.label, self.menu.describe());
        self.menu.say(sink, text);
        Ok(())
    }

    pub fn close(&mut self) {
        if self.active {
            tracing::debug!(zone = ?self.zone, "zone actions closed");
        }
        self.active = false;
        self.zone = None;
        self.menu.clear();
    }

    pub fn reannounce(&mut self, sink: &mut dyn AnnouncementSink) {
        self.menu.reannounce(sink);
    }

    fn rebuild<D: ZoneActions + ?Sized>(&mut self, domain: &D, zone: EntityId) {
        self.menu.rebuild(build_zone_actions(domain, zone));
    }

    pub fn handle_key<D: ZoneActions + ?Sized>(
        &mut self,
        domain: &mut D,
        key: &KeyEvent,
        sink: &mut dyn AnnouncementSink,
    ) -> Response<ZoneRequest> {
        let (true, Some(zone)) = (self.active, self.zone) else {
            return Response::Ignored;
        };
        match key.code {
            KeyCode::Escape => {
                self.close();
                Response::Closed
            }
            KeyCode::Enter => self.execute(domain, zone, sink),
            KeyCode::Delete => self.request_delete(&*domain, zone, sink),
            _ if self.menu.refuse_edit(key, sink) => Response::Consumed,
            _ => Response::consumed_if(self.menu.handle_navigation(key, sink)),
        }
    }

    fn execute<D: ZoneActions + ?Sized>(
        &mut self,
        domain: &mut D,
        zone: EntityId,
        sink: &mut dyn AnnouncementSink,
    ) -> Response<ZoneRequest> {
        let Some(entry) = self.menu.selected() else {
            return Response::Consumed;
        };
        if !entry.is_actionable() {
            let text = format!("{} is not available", entry.label);
            self.menu.say_high(sink, text);
            return Response::Consumed;
        }
        let Some(action) = entry.payload().cloned() else {
            return Response::Consumed;
        };
        let Some(info) = domain.zone(zone) else {
            report_failure(self.menu.announcer_mut(), sink, &DomainError::Missing);
            return Response::Consumed;
        };
        match action {
            ZoneAction::Rename => Response::Emit(ZoneRequest::Rename { current: info.label }),
            ZoneAction::SetPriority => {
                let levels = domain.priority_levels();
                let current = info
                    .priority
                    .and_then(|p| levels.iter().position(|l| l.value == p))
                    .unwrap_or(0);
                let choices = levels.into_iter().map(|l| Choice::new(l.label, l.value)).collect();
                Response::Emit(ZoneRequest::ChoosePriority { choices, current })
            }
            ZoneAction::EditFilter => Response::Emit(ZoneRequest::EditFilter(zone)),
            ZoneAction::Delete => self.request_delete(&*domain, zone, sink),
            ZoneAction::Custom(def) => {
                match domain.run_zone_action(zone, &def) {
                    Ok(()) => {
                        tracing::debug!(%zone, action = %def, "zone action ran");
                        if domain.zone(zone).is_some() {
                            self.rebuild(&*domain, zone);
                            self.menu.select_payload(&ZoneAction::Custom(def));
                            self.menu.announce_selection(sink);
                        } else {
                            self.close();
                            return Response::Closed;
                        }
                    }
                    Err(err) => report_failure(self.menu.announcer_mut(), sink, &err),
                }
                Response::Consumed
            }
        }
    }

    fn request_delete<D: ZoneActions + ?Sized>(
        &mut self,
        domain: &D,
        zone: EntityId,
        sink: &mut dyn AnnouncementSink,
    ) -> Response<ZoneRequest> {
        match domain.zone(zone) {
            Some(info) => Response::Emit(ZoneRequest::ConfirmDelete {
                message: format!("Delete {}?", info.label),
            }),
            None => {
                report_failure(self.menu.announcer_mut(), sink, &DomainError::Missing);
                Response::Consumed
            }
        }
    }

    /// Parent half of the rename field.
    pub fn rename_submitted<D: ZoneActions + ?Sized>(
        &mut self,
        domain: &mut D,
        name: &str,
        sink: &mut dyn AnnouncementSink,
    ) {
        let (true, Some(zone)) = (self.active, self.zone) else {
            return;
        };
        match domain.rename_zone(zone, name) {
            Ok(()) => {
                tracing::debug!(%zone, name, "zone renamed");
                self.rebuild(&*domain, zone);
                self.menu.select_payload(&ZoneAction::Rename);
                self.menu.reannounce(sink);
            }
            Err(err) => report_failure(self.menu.announcer_mut(), sink, &err),
        }
    }

    /// Parent half of the priority picker.
    pub fn priority_chosen<D: ZoneActions + ?Sized>(
        &mut self,
        domain: &mut D,
        priority: u8,
        sink: &mut dyn AnnouncementSink,
    ) {
        let (true, Some(zone)) = (self.active, self.zone) else {
            return;
        };
        match domain.set_priority(zone, priority) {
            Ok(()) => {
                self.rebuild(&*domain, zone);
                self.menu.select_payload(&ZoneAction::SetPriority);
                self.menu.reannounce(sink);
            }
            Err(err) => report_failure(self.menu.announcer_mut(), sink, &err),
        }
    }

    /// Parent half of the delete confirmation. Closes the menu on success.
    pub fn delete_confirmed<D: ZoneActions + ?Sized>(&mut self, domain: &mut D, sink: &mut dyn AnnouncementSink) -> bool {
        let (true, Some(zone)) = (self.active, self.zone) else {
            return false;
        };
        let label = domain.zone(zone).map(|z| z.label).unwrap_or_default();
        match domain.delete_zone(zone) {
            Ok(()) => {
                tracing::debug!(%zone, "zone deleted");
                self.close();
                self.menu.say_high(sink, format!("Deleted {label}"));
                true
            }
            Err(err) => {
                report_failure(self.menu.announcer_mut(), sink, &err);
                false
            }
        }
    }
}
