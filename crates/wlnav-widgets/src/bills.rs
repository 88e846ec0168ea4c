#![forbid(unsafe_code)]

//! Bill stack of one workbench.
//!
//! Model layout, rebuilt after every mutation:
//!
//! ```text
//! Add bill...                      (action: opens the recipe picker)
//! Paste bill, {template}           (only when the clipboard fits this bench)
//! {recipe label}, {detail}         (one toggle per bill, stack order)
//! ```
//!
//! Enter on a bill toggles its suspended state, Delete removes it, Ctrl+C
//! copies it to a clipboard that outlives the menu, Ctrl+V pastes, and
//! Shift+Up/Down reorder. Adding goes through a [`ChoicePicker`]: the menu
//! emits [`BillsRequest::ChooseRecipe`], and the session hands the picked
//! recipe back through [`BillsMenu::recipe_chosen`].
//!
//! [`ChoicePicker`]: crate::picker::ChoicePicker

use wlnav_core::{AnnouncementSink, KeyCode, KeyEvent, MenuEntry};

use crate::domain::{DefName, DomainError, EntityId, NavError, report_failure};
use crate::flat_menu::{FlatMenu, MenuOptions};
use crate::picker::Choice;
use crate::response::Response;

/// One bill as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillInfo {
    pub id: EntityId,
    pub recipe: DefName,
    pub label: String,
    /// Repeat mode text, e.g. `"do 5 times"` or `"forever"`.
    pub repeat: String,
    pub suspended: bool,
    /// Ingredient summary; may be empty.
    pub ingredients: String,
}

/// A recipe a workbench can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeInfo {
    pub recipe: DefName,
    pub label: String,
    pub available: bool,
    pub detail: String,
}

/// Copied bill settings, pasteable on any bench that accepts the recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillTemplate {
    pub recipe: DefName,
    pub label: String,
    pub repeat: String,
}

/// Host side of bill editing.
pub trait BillStack {
    /// Display label of the workbench, `None` if it is gone.
    fn workbench_label(&self, bench: EntityId) -> Option<String>;
    fn bills(&self, bench: EntityId) -> Vec<BillInfo>;
    fn recipes(&self, bench: EntityId) -> Vec<RecipeInfo>;
    fn accepts_recipe(&self, bench: EntityId, recipe: &DefName) -> bool;

    fn add_bill(&mut self, bench: EntityId, recipe: &DefName) -> Result<EntityId, DomainError>;
    fn remove_bill(&mut self, bench: EntityId, bill: EntityId) -> Result<(), DomainError>;
    fn set_suspended(&mut self, bench: EntityId, bill: EntityId, suspended: bool) -> Result<(), DomainError>;
    /// Move a bill `offset` places in the stack (negative is up).
    fn move_bill(&mut self, bench: EntityId, bill: EntityId, offset: isize) -> Result<(), DomainError>;
    fn copy_bill(&self, bench: EntityId, bill: EntityId) -> Result<BillTemplate, DomainError>;
    fn paste_bill(&mut self, bench: EntityId, template: &BillTemplate) -> Result<EntityId, DomainError>;
}

/// Payload of a bills menu row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillRow {
    Add,
    Paste,
    Bill(EntityId),
}

/// Requests the bills menu hands to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillsRequest {
    /// Open a picker over these recipes; the pick goes to `recipe_chosen`.
    ChooseRecipe(Vec<Choice<DefName>>),
}

/// Build the bills model. Pure: reads the domain, never mutates it.
pub fn build_bills<D: BillStack + ?Sized>(
    domain: &D,
    bench: EntityId,
    clipboard: Option<&BillTemplate>,
) -> Vec<MenuEntry<BillRow>> {
    let mut entries = vec![MenuEntry::action("Add bill...", BillRow::Add)];
    if let Some(template) = clipboard
        && domain.accepts_recipe(bench, &template.recipe)
    {
        entries.push(MenuEntry::action("Paste bill", BillRow::Paste).with_detail(template.label.clone()));
    }
    entries.extend(domain.bills(bench).into_iter().map(|bill| {
        let mut detail = vec![bill.repeat.clone()];
        if bill.suspended {
            detail.push("suspended".to_owned());
        }
        if !bill.ingredients.is_empty() {
            detail.push(bill.ingredients.clone());
        }
        detail.retain(|d| !d.is_empty());
        MenuEntry::toggle(bill.label, BillRow::Bill(bill.id)).with_detail(detail.join(", "))
    }));
    entries
}

/// Flat menu over one workbench's bills.
#[derive(Debug, Clone)]
pub struct BillsMenu {
    menu: FlatMenu<BillRow>,
    bench: Option<EntityId>,
    clipboard: Option<BillTemplate>,
    active: bool,
}

impl Default for BillsMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl BillsMenu {
    #[must_use]
    pub fn new() -> Self {
        Self {
            menu: FlatMenu::new("No bills"),
            bench: None,
            clipboard: None,
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
    pub fn menu(&self) -> &FlatMenu<BillRow> {
        &self.menu
    }

    #[must_use]
    pub fn bench(&self) -> Option<EntityId> {
        self.bench
    }

    #[must_use]
    pub fn clipboard(&self) -> Option<&BillTemplate> {
        self.clipboard.as_ref()
    }

    pub fn open<D: BillStack + ?Sized>(
        &mut self,
        domain: &D,
        bench: EntityId,
        sink: &mut dyn AnnouncementSink,
    ) -> Result<(), NavError> {
        let Some(label) = domain.workbench_label(bench) else {
            tracing::warn!(%bench, "bills refused: workbench missing");
            return Err(NavError::MissingTarget(format!("workbench {bench}")));
        };
        self.bench = Some(bench);
        self.menu.load(build_bills(domain, bench, self.clipboard.as_ref()), 0);
        self.active = true;
        tracing::debug!(%bench, rows = self.menu.len(), "bills opened");
        let text = format!("Bills for {label}. {}", self.menu.describe());
        self.menu.say(sink, text);
        Ok(())
    }

    /// Close; the clipboard is kept.
    pub fn close(&mut self) {
        if self.active {
            tracing::debug!(bench = ?self.bench, "bills closed");
        }
        self.active = false;
        self.bench = None;
        self.menu.clear();
    }

    fn rebuild<D: BillStack + ?Sized>(&mut self, domain: &D, bench: EntityId) {
        self.menu.rebuild(build_bills(domain, bench, self.clipboard.as_ref()));
    }

    /// Re-announce the selection (after a child closes).
    pub fn reannounce(&mut self, sink: &mut dyn AnnouncementSink) {
        self.menu.reannounce(sink);
    }

    pub fn handle_key<D: BillStack + ?Sized>(
        &mut self,
        domain: &mut D,
        key: &KeyEvent,
        sink: &mut dyn AnnouncementSink,
    ) -> Response<BillsRequest> {
        let (true, Some(bench)) = (self.active, self.bench) else {
            return Response::Ignored;
        };
        match key.code {
            KeyCode::Escape => {
                self.close();
                Response::Closed
            }
            KeyCode::Enter => self.execute(domain, bench, sink),
            KeyCode::Delete => {
                self.delete(domain, bench, sink);
                Response::Consumed
            }
            KeyCode::Char(c) if key.has_ctrl() && c.eq_ignore_ascii_case(&'c') => {
                self.copy(&*domain, bench, sink);
                Response::Consumed
            }
            KeyCode::Char(c) if key.has_ctrl() && c.eq_ignore_ascii_case(&'v') => {
                self.paste(domain, bench, sink);
                Response::Consumed
            }
            KeyCode::Up if key.has_shift() => {
                self.reorder(domain, bench, -1, sink);
                Response::Consumed
            }
            KeyCode::Down if key.has_shift() => {
                self.reorder(domain, bench, 1, sink);
                Response::Consumed
            }
            _ => Response::consumed_if(self.menu.handle_navigation(key, sink)),
        }
    }

    fn execute<D: BillStack + ?Sized>(
        &mut self,
        domain: &mut D,
        bench: EntityId,
        sink: &mut dyn AnnouncementSink,
    ) -> Response<BillsRequest> {
        let Some(entry) = self.menu.selected() else {
            return Response::Consumed;
        };
        if !entry.is_actionable() {
            let text = format!("{} is not available", entry.label);
            self.menu.say_high(sink, text);
            return Response::Consumed;
        }
        match entry.payload().copied() {
            Some(BillRow::Add) => {
                let choices: Vec<Choice<DefName>> = domain
                    .recipes(bench)
                    .into_iter()
                    .map(|r| Choice::new(r.label, r.recipe).with_detail(r.detail).with_enabled(r.available))
                    .collect();
                if choices.is_empty() {
                    self.menu.say_high(sink, "No recipes available");
                    return Response::Consumed;
                }
                Response::Emit(BillsRequest::ChooseRecipe(choices))
            }
            Some(BillRow::Paste) => {
                self.paste(domain, bench, sink);
                Response::Consumed
            }
            Some(BillRow::Bill(bill)) => {
                let suspended = domain.bills(bench).iter().any(|b| b.id == bill && b.suspended);
                match domain.set_suspended(bench, bill, !suspended) {
                    Ok(()) => {
                        self.rebuild(&*domain, bench);
                        self.menu.announce_selection(sink);
                    }
                    Err(err) => report_failure(self.menu.announcer_mut(), sink, &err),
                }
                Response::Consumed
            }
            None => Response::Consumed,
        }
    }

    /// Parent half of the recipe picker: add the bill and land on it.
    pub fn recipe_chosen<D: BillStack + ?Sized>(
        &mut self,
        domain: &mut D,
        recipe: &DefName,
        sink: &mut dyn AnnouncementSink,
    ) {
        let (true, Some(bench)) = (self.active, self.bench) else {
            return;
        };
        match domain.add_bill(bench, recipe) {
            Ok(bill) => {
                tracing::debug!(%bench, %recipe, %bill, "bill added");
                self.rebuild(&*domain, bench);
                self.menu.select_payload(&BillRow::Bill(bill));
                self.menu.reannounce(sink);
            }
            Err(err) => report_failure(self.menu.announcer_mut(), sink, &err),
        }
    }

    fn selected_bill(&self) -> Option<(EntityId, String)> {
        let entry = self.menu.selected()?;
        match entry.payload() {
            Some(BillRow::Bill(id)) => Some((*id, entry.label.clone())),
            _ => None,
        }
    }

    fn delete<D: BillStack + ?Sized>(&mut self, domain: &mut D, bench: EntityId, sink: &mut dyn AnnouncementSink) {
        let Some((bill, label)) = self.selected_bill() else {
            self.menu.say_high(sink, "Cannot delete this item");
            return;
        };
        match domain.remove_bill(bench, bill) {
            Ok(()) => {
                tracing::debug!(%bench, %bill, "bill deleted");
                self.rebuild(&*domain, bench);
                self.menu.say_high(sink, format!("Deleted {label}"));
            }
            Err(err) => report_failure(self.menu.announcer_mut(), sink, &err),
        }
    }

    fn copy<D: BillStack + ?Sized>(&mut self, domain: &D, bench: EntityId, sink: &mut dyn AnnouncementSink) {
        let Some((bill, label)) = self.selected_bill() else {
            self.menu.say_high(sink, "Cannot copy this item");
            return;
        };
        match domain.copy_bill(bench, bill) {
            Ok(template) => {
                self.clipboard = Some(template);
                self.rebuild(&*domain, bench);
                self.menu.say(sink, format!("Copied {label}"));
            }
            Err(err) => report_failure(self.menu.announcer_mut(), sink, &err),
        }
    }

    fn paste<D: BillStack + ?Sized>(&mut self, domain: &mut D, bench: EntityId, sink: &mut dyn AnnouncementSink) {
        let Some(template) = self.clipboard.clone() else {
            self.menu.say_high(sink, "Clipboard is empty");
            return;
        };
        if !domain.accepts_recipe(bench, &template.recipe) {
            self.menu.say_high(sink, format!("Cannot paste {} here", template.label));
            return;
        }
        match domain.paste_bill(bench, &template) {
            Ok(bill) => {
                self.rebuild(&*domain, bench);
                self.menu.select_payload(&BillRow::Bill(bill));
                self.menu.reannounce(sink);
            }
            Err(err) => report_failure(self.menu.announcer_mut(), sink, &err),
        }
    }

    fn reorder<D: BillStack + ?Sized>(
        &mut self,
        domain: &mut D,
        bench: EntityId,
        offset: isize,
        sink: &mut dyn AnnouncementSink,
    ) {
        let Some((bill, _)) = self.selected_bill() else {
            self.menu.say_high(sink, "Cannot move this item");
            return;
        };
        match domain.move_bill(bench, bill, offset) {
            Ok(()) => {
                self.rebuild(&*domain, bench);
                self.menu.select_payload(&BillRow::Bill(bill));
                self.menu.announce_selection(sink);
            }
            Err(err) => report_failure(self.menu.announcer_mut(), sink, &err),
        }
    }
}
