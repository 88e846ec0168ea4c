#![forbid(unsafe_code)]

//! The top-level navigation session.
//!
//! [`NavSession`] owns one instance of every controller, the routes that
//! carry a child's result back to its parent, and the announcement history
//! in front of the host's sink. The host feeds it one key at a time through
//! [`NavSession::dispatch`]; each call reaches exactly one controller (or
//! the ambient layer) and returns a [`Dispatch`] record of what happened.
//!
//! Child composition works through [`Response::Emit`]: a parent asks for a
//! picker, text field, or confirmation; the session opens it and remembers
//! where the answer goes. When a child closes without an answer the parent's
//! current selection is spoken again.

use serde::Serialize;
use tracing::{debug, debug_span, warn};
use wlnav_core::{AnnouncementHistory, AnnouncementSink, Announcer, KeyEvent};
use wlnav_widgets::area_manager::{AreaManager, AreaRequest};
use wlnav_widgets::bills::{BillsMenu, BillsRequest};
use wlnav_widgets::confirm::{ConfirmDialog, ConfirmResult};
use wlnav_widgets::filter_tree::ThingFilterTree;
use wlnav_widgets::inspection::{InspectionRequest, InspectionTab, InspectionTree};
use wlnav_widgets::map_cursor::MapCursor;
use wlnav_widgets::picker::{Choice, ChoicePicker};
use wlnav_widgets::text_field::TextField;
use wlnav_widgets::trade::TradeMenu;
use wlnav_widgets::zone_actions::{ZoneActionMenu, ZoneRequest};
use wlnav_widgets::{Cell, DefName, EntityId, MenuOptions, NavError, Response};

use crate::arbitration::{Layer, LayerState, Route, falls_through, route};
use crate::config::NavConfig;
use crate::error::ConfigError;
use crate::host::Host;
use crate::keymap::{Binding, Keymap};

/// What one call to [`NavSession::dispatch`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "layer", rename_all = "snake_case")]
pub enum Dispatch {
    /// The repeat binding spoke the last announcement again.
    Repeated,
    /// The layer handled the key and stayed open.
    Consumed(Layer),
    /// The layer handled the key and closed.
    Closed(Layer),
    /// A global binding opened the layer.
    Opened(Layer),
    /// A global binding could not open the layer.
    Refused(Layer),
    /// A suppressing layer ignored the key; nothing else saw it.
    Dropped(Layer),
    Unhandled,
}

impl Dispatch {
    #[must_use]
    pub fn layer(self) -> Option<Layer> {
        match self {
            Self::Consumed(layer)
            | Self::Closed(layer)
            | Self::Opened(layer)
            | Self::Refused(layer)
            | Self::Dropped(layer) => Some(layer),
            Self::Repeated | Self::Unhandled => None,
        }
    }

    /// False when the key reached nobody.
    #[must_use]
    pub fn is_handled(self) -> bool {
        !matches!(self, Self::Dropped(_) | Self::Unhandled)
    }
}

/// Value carried by the shared picker; the variant names the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickValue {
    Recipe(DefName),
    Priority(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextRoute {
    ZoneName,
    AreaName(EntityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmRoute {
    DeleteZone,
    DeleteArea(EntityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Ignored,
    Consumed,
    Closed,
}

fn outcome<R>(response: &Response<R>) -> Outcome {
    match response {
        Response::Ignored => Outcome::Ignored,
        Response::Closed => Outcome::Closed,
        Response::Consumed | Response::Emit(_) => Outcome::Consumed,
    }
}

fn retag<T, U>(choices: Vec<Choice<T>>, f: impl Fn(T) -> U) -> Vec<Choice<U>> {
    choices
        .into_iter()
        .map(|c| Choice {
            label: c.label,
            detail: c.detail,
            value: f(c.value),
            enabled: c.enabled,
        })
        .collect()
}

fn sentence_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Every controller plus the state that connects them.
pub struct NavSession<S: AnnouncementSink> {
    config: NavConfig,
    keymap: Keymap,
    out: AnnouncementHistory<S>,
    announcer: Announcer,
    confirm: ConfirmDialog,
    text: TextField,
    picker: ChoicePicker<PickValue>,
    inspection_tab: InspectionTab,
    inspection: InspectionTree,
    trade: TradeMenu,
    filter: ThingFilterTree,
    bills: BillsMenu,
    zones: ZoneActionMenu,
    areas: AreaManager,
    map: MapCursor,
    text_route: Option<TextRoute>,
    confirm_route: Option<ConfirmRoute>,
}

impl<S: AnnouncementSink> NavSession<S> {
    /// Build a session speaking into `sink`.
    ///
    /// Fails if `config` does not validate or a key binding does not parse.
    pub fn new(config: NavConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let keymap = config.bindings.resolve()?;
        Ok(Self::assemble(config, keymap, sink))
    }

    /// Default configuration and bindings.
    #[must_use]
    pub fn with_defaults(sink: S) -> Self {
        Self::assemble(NavConfig::default(), Keymap::default(), sink)
    }

    fn assemble(config: NavConfig, keymap: Keymap, sink: S) -> Self {
        let options = config.menu_options();
        let mut map = MapCursor::new().with_jump(config.map_jump);
        map.set_announce_coordinates(config.announce_coordinates);
        let mut session = Self {
            keymap,
            out: AnnouncementHistory::new(sink, config.history_capacity),
            announcer: Announcer::new(),
            confirm: ConfirmDialog::new(),
            text: TextField::new().with_max_len(config.text_max_len),
            picker: ChoicePicker::new(),
            inspection_tab: InspectionTab::new(),
            inspection: InspectionTree::new(),
            trade: TradeMenu::new().with_large_step(config.trade_large_step),
            filter: ThingFilterTree::new(),
            bills: BillsMenu::new(),
            zones: ZoneActionMenu::new(),
            areas: AreaManager::new(),
            map,
            text_route: None,
            confirm_route: None,
            config,
        };
        session.apply_options(options);
        debug!(history = session.config.history_capacity, "navigation session ready");
        session
    }

    fn apply_options(&mut self, options: MenuOptions) {
        self.picker.set_options(options);
        self.inspection_tab.set_options(options);
        self.inspection.set_options(options);
        self.trade.set_options(options);
        self.filter.set_options(options);
        self.bills.set_options(options);
        self.zones.set_options(options);
        self.areas.set_options(options);
    }

    #[must_use]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    #[must_use]
    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    #[must_use]
    pub fn history(&self) -> &AnnouncementHistory<S> {
        &self.out
    }

    /// The host's sink, behind the history.
    #[must_use]
    pub fn sink(&self) -> &S {
        self.out.inner()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.out.inner_mut()
    }

    #[must_use]
    pub fn into_sink(self) -> S {
        self.out.into_inner()
    }

    #[must_use]
    pub fn map(&self) -> &MapCursor {
        &self.map
    }

    #[must_use]
    pub fn bills(&self) -> &BillsMenu {
        &self.bills
    }

    #[must_use]
    pub fn zones(&self) -> &ZoneActionMenu {
        &self.zones
    }

    #[must_use]
    pub fn areas(&self) -> &AreaManager {
        &self.areas
    }

    #[must_use]
    pub fn filter(&self) -> &ThingFilterTree {
        &self.filter
    }

    #[must_use]
    pub fn inspection(&self) -> &InspectionTree {
        &self.inspection
    }

    #[must_use]
    pub fn inspection_tab(&self) -> &InspectionTab {
        &self.inspection_tab
    }

    #[must_use]
    pub fn trade(&self) -> &TradeMenu {
        &self.trade
    }

    #[must_use]
    pub fn picker(&self) -> &ChoicePicker<PickValue> {
        &self.picker
    }

    #[must_use]
    pub fn text_field(&self) -> &TextField {
        &self.text
    }

    #[must_use]
    pub fn confirm(&self) -> &ConfirmDialog {
        &self.confirm
    }

    /// Routing snapshot of every layer, in precedence order.
    #[must_use]
    pub fn layer_states(&self) -> [LayerState; 11] {
        [
            LayerState::new(Layer::Confirm, self.confirm.is_active(), self.confirm.is_suppressing()),
            LayerState::new(Layer::TextField, self.text.is_active(), self.text.is_suppressing()),
            LayerState::new(Layer::Picker, self.picker.is_active(), self.picker.is_suppressing()),
            LayerState::new(
                Layer::InspectionTab,
                self.inspection_tab.is_active(),
                self.inspection_tab.is_suppressing(),
            ),
            LayerState::new(Layer::Inspection, self.inspection.is_active(), self.inspection.is_suppressing()),
            LayerState::new(Layer::Trade, self.trade.is_active(), self.trade.is_suppressing()),
            LayerState::new(Layer::FilterTree, self.filter.is_active(), self.filter.is_suppressing()),
            LayerState::new(Layer::Bills, self.bills.is_active(), self.bills.is_suppressing()),
            LayerState::new(Layer::ZoneActions, self.zones.is_active(), self.zones.is_suppressing()),
            LayerState::new(Layer::AreaManager, self.areas.is_active(), self.areas.is_suppressing()),
            LayerState::new(Layer::Map, true, false),
        ]
    }

    /// The layer the next key goes to, or `None` for ambient.
    #[must_use]
    pub fn active_layer(&self) -> Option<Layer> {
        match route(&self.layer_states()) {
            Route::Controller { layer, .. } => Some(layer),
            Route::Ambient => None,
        }
    }

    /// Process exactly one key event.
    pub fn dispatch<H: Host + ?Sized>(&mut self, host: &mut H, key: &KeyEvent) -> Dispatch {
        let span = debug_span!("dispatch", key = %key);
        let _guard = span.enter();

        if self.keymap.lookup(key) == Some(Binding::RepeatLast) {
            self.out.repeat_last();
            return Dispatch::Repeated;
        }

        let routed = route(&self.layer_states());
        let Route::Controller { layer, .. } = routed else {
            return self.ambient(host, key);
        };
        debug!(layer = %layer, "routed");
        match self.offer(layer, host, key) {
            Outcome::Consumed => Dispatch::Consumed(layer),
            Outcome::Closed => {
                self.reannounce_top();
                Dispatch::Closed(layer)
            }
            Outcome::Ignored if falls_through(routed) => self.ambient(host, key),
            Outcome::Ignored => {
                debug!(layer = %layer, "dropped by suppressing layer");
                Dispatch::Dropped(layer)
            }
        }
    }

    /// Run a global binding as if its key had reached the ambient layer.
    ///
    /// Opening closes every other menu first, so opening a kind that is
    /// already open reopens it.
    pub fn trigger<H: Host + ?Sized>(&mut self, host: &mut H, binding: Binding) -> Dispatch {
        let cell = self.map.cell();
        let (layer, opened) = match binding {
            Binding::RepeatLast => {
                self.out.repeat_last();
                return Dispatch::Repeated;
            }
            Binding::Inspect => {
                self.close();
                (Layer::Inspection, self.inspection.open(&*host, cell, &mut self.out))
            }
            Binding::Bills => {
                let Some(bench) = host.workbench_at(cell) else {
                    return self.refuse_here(Layer::Bills, "No workbench here");
                };
                self.close();
                (Layer::Bills, self.bills.open(&*host, bench, &mut self.out))
            }
            Binding::ZoneActions => {
                let Some(zone) = host.zone_at(cell) else {
                    return self.refuse_here(Layer::ZoneActions, "No zone here");
                };
                self.close();
                (Layer::ZoneActions, self.zones.open(&*host, zone, &mut self.out))
            }
            Binding::AreaManager => {
                self.close();
                (Layer::AreaManager, self.areas.open(&*host, &mut self.out))
            }
            Binding::Trade => {
                self.close();
                (Layer::Trade, self.trade.open(&*host, &mut self.out))
            }
            Binding::Filter => {
                let Some(zone) = host.zone_at(cell) else {
                    return self.refuse_here(Layer::FilterTree, "No zone here");
                };
                self.close();
                (Layer::FilterTree, self.filter.open(&*host, zone, &mut self.out))
            }
        };
        match opened {
            Ok(()) => {
                debug!(layer = %layer, "opened");
                Dispatch::Opened(layer)
            }
            Err(err) => {
                self.refuse(layer, &err);
                Dispatch::Refused(layer)
            }
        }
    }

    /// Close every controller silently and forget pending child routes.
    pub fn close(&mut self) {
        self.confirm.close();
        self.text.close();
        self.picker.close();
        self.inspection_tab.close();
        self.inspection.close();
        self.trade.close();
        self.filter.close();
        self.bills.close();
        self.zones.close();
        self.areas.close();
        self.text_route = None;
        self.confirm_route = None;
    }

    /// Move the map cursor without speaking.
    pub fn place_cursor<H: Host + ?Sized>(&mut self, host: &H, cell: Cell) {
        self.map.place(host, cell);
    }

    /// Re-read open trees after the host changed state behind the session.
    pub fn refresh<H: Host + ?Sized>(&mut self, host: &H) {
        self.filter.refresh(host);
        self.inspection.refresh(host);
    }

    fn ambient<H: Host + ?Sized>(&mut self, host: &mut H, key: &KeyEvent) -> Dispatch {
        if self.map.handle_key(&*host, key, &mut self.out).is_handled() {
            return Dispatch::Consumed(Layer::Map);
        }
        match self.keymap.lookup(key) {
            Some(binding) => self.trigger(host, binding),
            None => Dispatch::Unhandled,
        }
    }

    fn offer<H: Host + ?Sized>(&mut self, layer: Layer, host: &mut H, key: &KeyEvent) -> Outcome {
        match layer {
            Layer::Confirm => match self.confirm.handle_key(key, &mut self.out) {
                Response::Emit(answer) => {
                    self.confirm_answered(host, answer);
                    Outcome::Consumed
                }
                Response::Closed => {
                    self.confirm_route = None;
                    Outcome::Closed
                }
                other => outcome(&other),
            },
            Layer::TextField => match self.text.handle_key(key, &mut self.out) {
                Response::Emit(text) => {
                    self.text_submitted(host, &text);
                    Outcome::Consumed
                }
                Response::Closed => {
                    self.text_route = None;
                    Outcome::Closed
                }
                other => outcome(&other),
            },
            Layer::Picker => match self.picker.handle_key(key, &mut self.out) {
                Response::Emit(value) => {
                    self.picked(host, value);
                    Outcome::Consumed
                }
                other => outcome(&other),
            },
            Layer::InspectionTab => outcome(&self.inspection_tab.handle_key(host, key, &mut self.out)),
            Layer::Inspection => match self.inspection.handle_key(host, key, &mut self.out) {
                Response::Emit(InspectionRequest::OpenTab { object, tab, title }) => {
                    if let Err(err) = self.inspection_tab.open(&*host, object, tab, &title, &mut self.out) {
                        self.refuse(Layer::InspectionTab, &err);
                    }
                    Outcome::Consumed
                }
                other => outcome(&other),
            },
            Layer::Trade => outcome(&self.trade.handle_key(host, key, &mut self.out)),
            Layer::FilterTree => outcome(&self.filter.handle_key(host, key, &mut self.out)),
            Layer::Bills => match self.bills.handle_key(host, key, &mut self.out) {
                Response::Emit(BillsRequest::ChooseRecipe(choices)) => {
                    self.open_picker("Choose recipe", retag(choices, PickValue::Recipe), 0);
                    Outcome::Consumed
                }
                other => outcome(&other),
            },
            Layer::ZoneActions => match self.zones.handle_key(host, key, &mut self.out) {
                Response::Emit(request) => {
                    self.zone_request(&*host, request);
                    Outcome::Consumed
                }
                other => outcome(&other),
            },
            Layer::AreaManager => match self.areas.handle_key(host, key, &mut self.out) {
                Response::Emit(request) => {
                    self.area_request(request);
                    Outcome::Consumed
                }
                other => outcome(&other),
            },
            Layer::Map => outcome(&self.map.handle_key(&*host, key, &mut self.out)),
        }
    }

    fn zone_request<H: Host + ?Sized>(&mut self, host: &H, request: ZoneRequest) {
        match request {
            ZoneRequest::Rename { current } => self.open_text("Rename zone", current, TextRoute::ZoneName),
            ZoneRequest::ChoosePriority { choices, current } => {
                self.open_picker("Set priority", retag(choices, PickValue::Priority), current);
            }
            ZoneRequest::EditFilter(filter) => {
                if let Err(err) = self.filter.open(host, filter, &mut self.out) {
                    self.refuse(Layer::FilterTree, &err);
                }
            }
            ZoneRequest::ConfirmDelete { message } => self.open_confirm(message, ConfirmRoute::DeleteZone),
        }
    }

    fn area_request(&mut self, request: AreaRequest) {
        match request {
            AreaRequest::Rename { area, current } => self.open_text("Rename area", current, TextRoute::AreaName(area)),
            AreaRequest::ConfirmDelete { area, message } => self.open_confirm(message, ConfirmRoute::DeleteArea(area)),
        }
    }

    fn open_picker(&mut self, title: &str, choices: Vec<Choice<PickValue>>, initial: usize) {
        if let Err(err) = self.picker.open(title, choices, initial, &mut self.out) {
            self.refuse(Layer::Picker, &err);
        }
    }

    fn open_text(&mut self, prompt: &str, initial: String, route: TextRoute) {
        match self.text.open(prompt, initial, &mut self.out) {
            Ok(()) => self.text_route = Some(route),
            Err(err) => self.refuse(Layer::TextField, &err),
        }
    }

    fn open_confirm(&mut self, message: String, route: ConfirmRoute) {
        match self.confirm.open(message, &mut self.out) {
            Ok(()) => self.confirm_route = Some(route),
            Err(err) => self.refuse(Layer::Confirm, &err),
        }
    }

    fn picked<H: Host + ?Sized>(&mut self, host: &mut H, value: PickValue) {
        debug!(?value, "picker answered");
        match value {
            PickValue::Recipe(recipe) => self.bills.recipe_chosen(host, &recipe, &mut self.out),
            PickValue::Priority(priority) => self.zones.priority_chosen(host, priority, &mut self.out),
        }
    }

    fn text_submitted<H: Host + ?Sized>(&mut self, host: &mut H, text: &str) {
        match self.text_route.take() {
            Some(TextRoute::ZoneName) => self.zones.rename_submitted(host, text, &mut self.out),
            Some(TextRoute::AreaName(area)) => self.areas.rename_submitted(host, area, text, &mut self.out),
            None => self.reannounce_top(),
        }
    }

    fn confirm_answered<H: Host + ?Sized>(&mut self, host: &mut H, answer: ConfirmResult) {
        let route = self.confirm_route.take();
        match (answer, route) {
            (ConfirmResult::Confirmed, Some(ConfirmRoute::DeleteZone)) => {
                let deleted = self.zones.delete_confirmed(host, &mut self.out);
                debug!(deleted, "zone delete confirmed");
            }
            (ConfirmResult::Confirmed, Some(ConfirmRoute::DeleteArea(area))) => {
                self.areas.delete_confirmed(host, area, &mut self.out);
            }
            _ => self.reannounce_top(),
        }
    }

    fn reannounce_top(&mut self) {
        let Some(layer) = self.active_layer() else {
            return;
        };
        debug!(layer = %layer, "re-announcing");
        match layer {
            Layer::Inspection => self.inspection.reannounce(&mut self.out),
            Layer::Trade => self.trade.reannounce(&mut self.out),
            Layer::FilterTree => self.filter.reannounce(&mut self.out),
            Layer::Bills => self.bills.reannounce(&mut self.out),
            Layer::ZoneActions => self.zones.reannounce(&mut self.out),
            Layer::AreaManager => self.areas.reannounce(&mut self.out),
            Layer::Confirm | Layer::TextField | Layer::Picker | Layer::InspectionTab | Layer::Map => {}
        }
    }

    fn refuse(&mut self, layer: Layer, err: &NavError) {
        warn!(layer = %layer, error = %err, "open refused");
        let text = match err {
            NavError::Disallowed { reason, .. } => sentence_case(reason),
            NavError::MissingTarget(_) | NavError::Domain(_) => format!("Cannot open {layer}"),
        };
        self.announcer.high(&mut self.out, text);
    }

    fn refuse_here(&mut self, layer: Layer, text: &str) -> Dispatch {
        warn!(layer = %layer, cell = %self.map.cell(), "{text}");
        self.announcer.high(&mut self.out, text);
        Dispatch::Refused(layer)
    }
}
