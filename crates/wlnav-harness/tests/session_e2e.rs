#![forbid(unsafe_code)]

//! End-to-end navigation scenarios against the sample colony.
//!
//! Every test drives a real `NavSession` with key notation and checks what
//! the player would hear, plus the domain state the keys left behind.

use wlnav_core::{KeyEvent, Priority};
use wlnav_harness::colony::{self, FakeColony};
use wlnav_harness::Harness;
use wlnav_runtime::{Binding, Dispatch, Layer, NavConfig};
use wlnav_widgets::filter_tree::ThingFilterSource;
use wlnav_widgets::{Cell, DefName};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn harness_at(cell: Cell) -> Harness {
    init_tracing();
    let mut h = Harness::new();
    h.goto(cell);
    h
}

fn press(h: &mut Harness, notation: &str) -> Dispatch {
    let key: KeyEvent = notation.parse().unwrap();
    h.press(key)
}

fn said(h: &Harness) -> &str {
    h.last_spoken().unwrap_or_default()
}

/// Last line was a `High` refusal with this text.
fn refused(h: &Harness, text: &str) -> bool {
    h.spoken().last().is_some_and(|a| a.text == text && a.priority == Priority::High)
}

fn active_menus(h: &Harness) -> Vec<Layer> {
    h.session
        .layer_states()
        .iter()
        .filter(|s| s.active && s.layer != Layer::Map)
        .map(|s| s.layer)
        .collect()
}

// =========================================================================
// Bills and the recipe picker
// =========================================================================

#[test]
fn add_bill_through_picker_lands_on_new_bill() {
    let mut h = harness_at(colony::STOVE_CELL);

    assert_eq!(press(&mut h, "b"), Dispatch::Opened(Layer::Bills));
    assert_eq!(said(&h), "Bills for Electric stove. Add bill.... 1 of 2");

    assert_eq!(press(&mut h, "Enter"), Dispatch::Consumed(Layer::Bills));
    assert_eq!(said(&h), "Choose recipe. Simple meal, 10 nutrition. 1 of 3");
    assert_eq!(h.session.active_layer(), Some(Layer::Picker));

    assert_eq!(press(&mut h, "Down"), Dispatch::Consumed(Layer::Picker));
    assert_eq!(said(&h), "Fine meal, 10 nutrition, 5 vegetables. 2 of 3");

    assert_eq!(press(&mut h, "Enter"), Dispatch::Consumed(Layer::Picker));
    assert_eq!(said(&h), "Fine meal, do 1 time. 3 of 3");
    assert_eq!(h.session.active_layer(), Some(Layer::Bills));
    let bills = &h.colony.bench(colony::STOVE).unwrap().bills;
    assert_eq!(bills.len(), 2);
    assert_eq!(bills[1].label, "Fine meal");
}

#[test]
fn unavailable_recipe_is_refused_in_picker() {
    let mut h = harness_at(colony::STOVE_CELL);
    h.run("b Enter Up").unwrap();
    assert_eq!(said(&h), "Lavish meal (unavailable), requires Cooking 12. 3 of 3");

    press(&mut h, "Enter");
    let last = h.spoken().last().unwrap();
    assert_eq!(last.text, "Lavish meal is not available");
    assert_eq!(last.priority, Priority::High);
    assert_eq!(h.session.active_layer(), Some(Layer::Picker));
}

#[test]
fn full_bill_stack_reports_rejection() {
    let mut h = harness_at(colony::STOVE_CELL);
    h.run("b Enter Enter Home Enter Enter").unwrap();
    assert_eq!(h.colony.bench(colony::STOVE).unwrap().bills.len(), 3);

    h.run("Home Enter Enter").unwrap();
    let last = h.spoken().last().unwrap();
    assert_eq!(last.text, "Bill stack is full");
    assert_eq!(last.priority, Priority::High);
    assert_eq!(h.colony.bench(colony::STOVE).unwrap().bills.len(), 3);
}

#[test]
fn escape_from_picker_reannounces_bills() {
    let mut h = harness_at(colony::STOVE_CELL);
    h.run("b Enter").unwrap();
    assert_eq!(press(&mut h, "Escape"), Dispatch::Closed(Layer::Picker));
    assert_eq!(said(&h), "Add bill.... 1 of 2");
    assert_eq!(h.session.active_layer(), Some(Layer::Bills));
}

#[test]
fn menu_cursor_wraps_both_ways() {
    let mut h = harness_at(colony::STOVE_CELL);
    press(&mut h, "b");

    press(&mut h, "Up");
    assert_eq!(said(&h), "Simple meal, do 5 times. 2 of 2");
    press(&mut h, "Down");
    assert_eq!(said(&h), "Add bill.... 1 of 2");
}

#[test]
fn identical_selection_is_not_repeated() {
    let mut h = harness_at(colony::STOVE_CELL);
    h.run("b Down Up").unwrap();
    assert_eq!(said(&h), "Add bill.... 1 of 2");
    let before = h.spoken().len();

    assert_eq!(press(&mut h, "Home"), Dispatch::Consumed(Layer::Bills));
    assert_eq!(h.spoken().len(), before);
}

#[test]
fn repeat_binding_speaks_last_line_again() {
    let mut h = harness_at(colony::STOVE_CELL);
    h.run("b Down").unwrap();
    let before = h.spoken().len();

    assert_eq!(press(&mut h, "Ctrl+R"), Dispatch::Repeated);
    assert_eq!(h.spoken().len(), before + 1);
    let last = h.spoken().last().unwrap();
    assert_eq!(last.text, "Simple meal, do 5 times. 2 of 2");
    assert_eq!(last.priority, Priority::Normal);
}

#[test]
fn repeat_before_anything_is_silent() {
    let mut h = harness_at(colony::STOVE_CELL);
    assert_eq!(press(&mut h, "Ctrl+R"), Dispatch::Repeated);
    assert!(h.spoken().is_empty());
}

#[test]
fn typeahead_keeps_letters_inside_open_menu() {
    let mut h = harness_at(colony::STOVE_CELL);
    press(&mut h, "b");
    assert_eq!(press(&mut h, "s"), Dispatch::Consumed(Layer::Bills));
    assert_eq!(said(&h), "Simple meal, do 5 times. 2 of 2");

    // No row starts with B, so the bills binding never reaches ambient.
    assert_eq!(press(&mut h, "b"), Dispatch::Consumed(Layer::Bills));
    assert_eq!(said(&h), "No item starting with B");
}

#[test]
fn positions_can_be_turned_off() {
    init_tracing();
    let config = NavConfig {
        announce_positions: false,
        ..NavConfig::default()
    };
    let mut h = Harness::with_config(FakeColony::sample(), config).unwrap();
    h.goto(colony::STOVE_CELL);
    h.run("b Down").unwrap();
    assert_eq!(said(&h), "Simple meal, do 5 times");
}

#[test]
fn rebound_keys_from_json_config() {
    init_tracing();
    let config = NavConfig::from_json(r#"{"bindings": {"bills": "F2", "repeat_last": "F12"}}"#).unwrap();
    let mut h = Harness::with_config(FakeColony::sample(), config).unwrap();
    h.goto(colony::STOVE_CELL);

    assert_eq!(press(&mut h, "b"), Dispatch::Unhandled);
    assert_eq!(press(&mut h, "F2"), Dispatch::Opened(Layer::Bills));
    assert_eq!(press(&mut h, "F12"), Dispatch::Repeated);
    assert_eq!(said(&h), "Bills for Electric stove. Add bill.... 1 of 2");
}

#[test]
fn unparsable_binding_fails_session() {
    assert!(NavConfig::from_json(r#"{"bindings": {"trade": "Hyper+T"}}"#).is_err());

    let mut config = NavConfig::default();
    config.bindings.trade = "Hyper+T".into();
    assert!(Harness::with_config(FakeColony::sample(), config).is_err());
}

// =========================================================================
// Arbitration
// =========================================================================

#[test]
fn unhandled_arrow_falls_through_to_map() {
    let mut h = harness_at(colony::STOVE_CELL);
    press(&mut h, "b");

    assert_eq!(press(&mut h, "Right"), Dispatch::Consumed(Layer::Map));
    assert_eq!(h.session.map().cell(), Cell::new(3, 3));
    assert_eq!(said(&h), "Soil");
    assert_eq!(h.session.active_layer(), Some(Layer::Bills));
}

#[test]
fn suppressing_trade_drops_unknown_keys() {
    let mut h = harness_at(colony::STOVE_CELL);
    assert_eq!(press(&mut h, "t"), Dispatch::Opened(Layer::Trade));
    let before = h.spoken().len();

    assert_eq!(press(&mut h, "F5"), Dispatch::Dropped(Layer::Trade));
    assert_eq!(press(&mut h, "Ctrl+Q"), Dispatch::Dropped(Layer::Trade));
    assert_eq!(h.spoken().len(), before);
    assert_eq!(h.session.map().cell(), colony::STOVE_CELL);
}

#[test]
fn global_binding_replaces_open_menu() {
    let mut h = harness_at(colony::STOVE_CELL);
    press(&mut h, "b");
    assert_eq!(h.session.trigger(&mut h.colony, Binding::AreaManager), Dispatch::Opened(Layer::AreaManager));
    assert_eq!(active_menus(&h), vec![Layer::AreaManager]);
    assert_eq!(said(&h), "Manage areas. New area. 1 of 3");
}

#[test]
fn child_outranks_parent() {
    let mut h = harness_at(colony::STOCKPILE_CELL);
    h.run("z Down*2 Enter").unwrap();
    assert_eq!(active_menus(&h), vec![Layer::FilterTree, Layer::ZoneActions]);
    assert_eq!(h.session.active_layer(), Some(Layer::FilterTree));
    assert_eq!(
        said(&h),
        "Filter for Stockpile zone 1. Apparel, allowed, collapsed. Enter or Right arrow to expand. Position 1 of 2"
    );

    let parent_index = h.session.zones().menu().index();
    let before = h.spoken().len();
    assert_eq!(press(&mut h, "Down"), Dispatch::Consumed(Layer::FilterTree));
    assert_eq!(h.session.zones().menu().index(), parent_index);
    assert_eq!(h.spoken().len(), before + 1);
    assert!(said(&h).starts_with("Food"), "{}", said(&h));
    assert!(said(&h).ends_with("Position 2 of 2"), "{}", said(&h));

    assert_eq!(press(&mut h, "Escape"), Dispatch::Closed(Layer::FilterTree));
    assert_eq!(said(&h), "Edit storage filter. 3 of 5");
}

#[test]
fn delete_and_copy_refused_where_unsupported() {
    let mut h = harness_at(colony::STOCKPILE_CELL);
    assert_eq!(press(&mut h, "f"), Dispatch::Opened(Layer::FilterTree));
    assert_eq!(press(&mut h, "Delete"), Dispatch::Consumed(Layer::FilterTree));
    assert!(refused(&h, "Cannot delete this item"));
    assert_eq!(press(&mut h, "Ctrl+C"), Dispatch::Consumed(Layer::FilterTree));
    assert!(refused(&h, "Cannot copy this item"));
    assert_eq!(h.session.map().cell(), colony::STOCKPILE_CELL);

    assert_eq!(press(&mut h, "z"), Dispatch::Opened(Layer::ZoneActions));
    assert_eq!(press(&mut h, "Ctrl+C"), Dispatch::Consumed(Layer::ZoneActions));
    assert!(refused(&h, "Cannot copy this item"));
    assert_eq!(press(&mut h, "Escape"), Dispatch::Closed(Layer::ZoneActions));

    assert_eq!(press(&mut h, "t"), Dispatch::Opened(Layer::Trade));
    assert_eq!(press(&mut h, "Delete"), Dispatch::Consumed(Layer::Trade));
    assert!(refused(&h, "Cannot delete this item"));
    assert_eq!(press(&mut h, "Right"), Dispatch::Consumed(Layer::Trade));
    assert!(refused(&h, "Cannot change the offer on Accept trade"));
    let trade = h.colony.trade.as_ref().unwrap();
    assert!(trade.goods.iter().all(|t| t.offered == 0));
}

#[test]
fn delete_and_copy_refused_in_child_menus() {
    let mut h = harness_at(colony::STOVE_CELL);
    h.run("b Enter").unwrap();
    assert_eq!(h.session.active_layer(), Some(Layer::Picker));
    assert_eq!(press(&mut h, "Delete"), Dispatch::Consumed(Layer::Picker));
    assert!(refused(&h, "Cannot delete this item"));
    assert_eq!(press(&mut h, "Ctrl+C"), Dispatch::Consumed(Layer::Picker));
    assert!(refused(&h, "Cannot copy this item"));
    assert_eq!(h.colony.bench(colony::STOVE).unwrap().bills.len(), 1);

    let mut h = harness_at(colony::STOVE_CELL);
    h.run("i Right Down Enter Down*4 Enter").unwrap();
    assert_eq!(h.session.active_layer(), Some(Layer::InspectionTab));
    assert_eq!(press(&mut h, "Delete"), Dispatch::Consumed(Layer::InspectionTab));
    assert!(refused(&h, "Cannot delete this item"));
    assert_eq!(press(&mut h, "Ctrl+C"), Dispatch::Consumed(Layer::InspectionTab));
    assert!(refused(&h, "Cannot copy this item"));
    assert_eq!(h.session.active_layer(), Some(Layer::InspectionTab));
}

#[test]
fn refusals_speak_at_high_priority() {
    let mut h = harness_at(Cell::new(15, 15));

    assert_eq!(press(&mut h, "b"), Dispatch::Refused(Layer::Bills));
    assert_eq!(said(&h), "No workbench here");
    assert_eq!(press(&mut h, "z"), Dispatch::Refused(Layer::ZoneActions));
    assert_eq!(said(&h), "No zone here");
    assert_eq!(press(&mut h, "i"), Dispatch::Refused(Layer::Inspection));
    assert_eq!(said(&h), "Nothing to inspect");
    assert!(h.spoken().iter().all(|a| a.priority == Priority::High));
    assert_eq!(h.session.active_layer(), None);
}

#[test]
fn zone_without_filter_refuses_filter() {
    let mut h = harness_at(colony::GROWING_CELL);
    assert_eq!(press(&mut h, "f"), Dispatch::Refused(Layer::FilterTree));
    assert_eq!(said(&h), "Cannot open storage filter");
}

#[test]
fn ambient_key_with_no_binding_is_unhandled() {
    let mut h = harness_at(colony::STOVE_CELL);
    assert_eq!(press(&mut h, "F5"), Dispatch::Unhandled);
    assert!(h.spoken().is_empty());
}

// =========================================================================
// Map cursor
// =========================================================================

#[test]
fn map_cursor_is_silent_at_the_edge() {
    let mut h = harness_at(Cell::new(0, 1));
    assert_eq!(press(&mut h, "Down"), Dispatch::Consumed(Layer::Map));
    assert_eq!(said(&h), "Granite wall");
    let before = h.spoken().len();

    assert_eq!(press(&mut h, "Down"), Dispatch::Consumed(Layer::Map));
    assert_eq!(press(&mut h, "Left"), Dispatch::Consumed(Layer::Map));
    assert_eq!(h.spoken().len(), before);

    // Same description on a new cell is still spoken.
    press(&mut h, "Right");
    assert_eq!(h.spoken().len(), before + 1);
    assert_eq!(said(&h), "Granite wall");
}

// =========================================================================
// Zones: rename, priority, delete
// =========================================================================

#[test]
fn zone_rename_round_trip() {
    let mut h = harness_at(colony::STOCKPILE_CELL);
    assert_eq!(press(&mut h, "z"), Dispatch::Opened(Layer::ZoneActions));
    assert_eq!(said(&h), "Stockpile zone 1. Rename, Stockpile zone 1. 1 of 5");

    press(&mut h, "Enter");
    assert_eq!(said(&h), "Rename zone: Stockpile zone 1");
    assert_eq!(press(&mut h, "F5"), Dispatch::Dropped(Layer::TextField));

    h.run("Backspace 7 Enter").unwrap();
    assert_eq!(said(&h), "Rename, Stockpile zone 7. 1 of 5");
    assert_eq!(h.colony.zone_state(colony::STOCKPILE).unwrap().label, "Stockpile zone 7");
    assert_eq!(h.session.active_layer(), Some(Layer::ZoneActions));
}

#[test]
fn cancelled_rename_leaves_zone_alone() {
    let mut h = harness_at(colony::STOCKPILE_CELL);
    h.run("z Enter Backspace*3").unwrap();
    assert_eq!(press(&mut h, "Escape"), Dispatch::Closed(Layer::TextField));
    assert_eq!(said(&h), "Rename, Stockpile zone 1. 1 of 5");
    assert_eq!(h.colony.zone_state(colony::STOCKPILE).unwrap().label, "Stockpile zone 1");
}

#[test]
fn zone_priority_through_picker() {
    let mut h = harness_at(colony::STOCKPILE_CELL);
    h.run("z Down").unwrap();
    assert_eq!(said(&h), "Set priority, Normal. 2 of 5");

    press(&mut h, "Enter");
    assert_eq!(said(&h), "Set priority. Normal. 2 of 5");

    h.run("Down Enter").unwrap();
    assert_eq!(said(&h), "Set priority, Preferred. 2 of 5");
    assert_eq!(h.colony.zone_state(colony::STOCKPILE).unwrap().priority, Some(3));
}

#[test]
fn zone_delete_needs_confirmation() {
    let mut h = harness_at(colony::STOCKPILE_CELL);
    h.run("z Delete").unwrap();
    let last = h.spoken().last().unwrap();
    assert_eq!(last.text, "Delete Stockpile zone 1? No, button 2 of 2");
    assert_eq!(last.priority, Priority::High);

    assert_eq!(press(&mut h, "x"), Dispatch::Dropped(Layer::Confirm));
    assert_eq!(press(&mut h, "n"), Dispatch::Consumed(Layer::Confirm));
    assert_eq!(said(&h), "Rename, Stockpile zone 1. 1 of 5");
    assert_eq!(h.colony.zones.len(), 2);

    h.run("Delete y").unwrap();
    assert_eq!(said(&h), "Deleted Stockpile zone 1");
    assert_eq!(h.colony.zones.len(), 1);
    assert_eq!(h.session.active_layer(), None);

    assert_eq!(press(&mut h, "z"), Dispatch::Refused(Layer::ZoneActions));
}

#[test]
fn disabled_zone_action_is_refused() {
    let mut h = harness_at(colony::GROWING_CELL);
    press(&mut h, "z");
    assert_eq!(said(&h), "Growing zone 1. Rename, Growing zone 1. 1 of 3");

    press(&mut h, "Down");
    assert_eq!(said(&h), "Harvest now (unavailable). 2 of 3");
    press(&mut h, "Enter");
    assert_eq!(said(&h), "Harvest now is not available");
}

#[test]
fn custom_zone_action_mutates_and_keeps_selection() {
    let mut h = harness_at(colony::STOCKPILE_CELL);
    h.run("z Down*3").unwrap();
    assert_eq!(said(&h), "Disallow everything. 4 of 5");

    press(&mut h, "Enter");
    assert!(!h.colony.is_allowed(colony::STOCKPILE, "Rice"));
    let selected = h.session.zones().menu().selected().map(|e| e.label.clone());
    assert_eq!(selected.as_deref(), Some("Disallow everything"));
}

// =========================================================================
// Storage filter tree
// =========================================================================

#[test]
fn filter_expand_and_toggle_keep_selection() {
    let mut h = harness_at(colony::STOCKPILE_CELL);
    assert_eq!(press(&mut h, "f"), Dispatch::Opened(Layer::FilterTree));

    press(&mut h, "Right");
    assert_eq!(said(&h), "Apparel, allowed, expanded. Left arrow to collapse. Position 1 of 4");
    press(&mut h, "Down");
    assert_eq!(said(&h), "Gear, allowed, collapsed. Enter or Right arrow to expand. Position 2 of 4");
    press(&mut h, "Right");
    assert_eq!(said(&h), "Gear, allowed, expanded. Left arrow to collapse. Position 2 of 6");

    press(&mut h, "Space");
    assert_eq!(said(&h), "Gear, not allowed, expanded. Left arrow to collapse. Position 2 of 6");
    assert!(!h.colony.is_allowed(colony::STOCKPILE, "Parka"));
    assert!(h.colony.is_allowed(colony::STOCKPILE, "Duster"));
    assert_eq!(
        h.session.filter().tree().describe_at(0).as_deref(),
        Some("Apparel, partially allowed, expanded. Left arrow to collapse. Position 1 of 6")
    );
}

#[test]
fn host_change_refresh_keeps_expanded_selection() {
    let mut h = harness_at(colony::STOCKPILE_CELL);
    h.run("f Right Down Right Space").unwrap();

    h.colony.set_allowed(colony::STOCKPILE, &DefName::new("Gear"), true).unwrap();
    h.session.refresh(&h.colony);

    let tree = h.session.filter().tree();
    let selected = tree.selected().unwrap();
    assert_eq!(selected.label, "Gear");
    assert_eq!(selected.description, "allowed");
    assert!(selected.is_expanded());
    assert_eq!(tree.len(), 6);

    press(&mut h, "Down");
    assert_eq!(said(&h), "Parka, allowed. Enter to execute. Position 3 of 6");
    press(&mut h, "Enter");
    assert_eq!(said(&h), "Parka, not allowed. Enter to execute. Position 3 of 6");
}

#[test]
fn left_walks_to_parent_then_collapses() {
    let mut h = harness_at(colony::STOCKPILE_CELL);
    h.run("f Right Down Right Down").unwrap();
    assert_eq!(said(&h), "Parka, allowed. Enter to execute. Position 3 of 6");

    press(&mut h, "Left");
    assert_eq!(said(&h), "Gear, allowed, expanded. Left arrow to collapse. Position 2 of 6");
    press(&mut h, "Left");
    assert_eq!(said(&h), "Gear, allowed, collapsed. Enter or Right arrow to expand. Position 2 of 4");
}

#[test]
fn enter_on_expanded_category_collapses_it() {
    let mut h = harness_at(colony::STOCKPILE_CELL);
    h.run("f Enter").unwrap();
    assert_eq!(said(&h), "Apparel, allowed, expanded. Left arrow to collapse. Position 1 of 4");
    press(&mut h, "Enter");
    assert_eq!(said(&h), "Apparel, allowed, collapsed. Enter or Right arrow to expand. Position 1 of 2");
}

#[test]
fn empty_filter_is_safe() {
    init_tracing();
    let mut bare = FakeColony::sample();
    bare.catalogue.clear();
    let mut h = Harness::with_config(bare, NavConfig::default()).unwrap();
    h.goto(colony::STOCKPILE_CELL);

    assert_eq!(press(&mut h, "f"), Dispatch::Opened(Layer::FilterTree));
    assert_eq!(said(&h), "Filter for Stockpile zone 1. Filter is empty. Position 1 of 1");
    press(&mut h, "Space");
    assert_eq!(said(&h), "Cannot toggle Filter is empty");
    press(&mut h, "Right");
    assert_eq!(said(&h), "Cannot expand Filter is empty");
    assert_eq!(press(&mut h, "Down"), Dispatch::Consumed(Layer::FilterTree));
    assert_eq!(h.session.filter().tree().index(), 0);
    assert_eq!(press(&mut h, "Delete"), Dispatch::Consumed(Layer::FilterTree));
    assert!(refused(&h, "Cannot delete this item"));
    assert_eq!(press(&mut h, "Ctrl+C"), Dispatch::Consumed(Layer::FilterTree));
    assert!(refused(&h, "Cannot copy this item"));
    assert!(h.session.filter().is_active());
}

// =========================================================================
// Inspection
// =========================================================================

#[test]
fn inspection_tab_opens_and_returns() {
    let mut h = harness_at(colony::STOVE_CELL);
    assert_eq!(press(&mut h, "i"), Dispatch::Opened(Layer::Inspection));
    assert_eq!(
        said(&h),
        "Inspecting. Electric stove, workbench, collapsed. Enter or Right arrow to expand. Position 1 of 2"
    );

    press(&mut h, "Right");
    assert_eq!(said(&h), "Electric stove, workbench, expanded. Left arrow to collapse. Position 1 of 5");
    press(&mut h, "Down");
    assert_eq!(said(&h), "Stats, collapsed. Enter or Right arrow to expand. Position 2 of 5");
    press(&mut h, "Enter");
    assert_eq!(said(&h), "Stats, expanded. Left arrow to collapse. Position 2 of 7");
    press(&mut h, "Down");
    assert_eq!(said(&h), "Hit points 180 of 180. Position 3 of 7");

    h.run("Down*3").unwrap();
    assert_eq!(said(&h), "Log, tab. Position 6 of 7");
    press(&mut h, "Enter");
    assert_eq!(said(&h), "Log tab. Built by Engie. 1 of 2");
    assert_eq!(h.session.active_layer(), Some(Layer::InspectionTab));

    press(&mut h, "Down");
    assert_eq!(said(&h), "Clear log. 2 of 2");
    press(&mut h, "Enter");
    assert_eq!(said(&h), "Log is empty. 1 of 1");

    assert_eq!(press(&mut h, "Escape"), Dispatch::Closed(Layer::InspectionTab));
    assert_eq!(said(&h), "Log, tab. Position 6 of 7");
}

#[test]
fn inspect_action_rebuild_clamps_to_renamed_row() {
    let mut h = harness_at(colony::STOVE_CELL);
    h.run("i Right Down*2 Right Down").unwrap();
    assert_eq!(said(&h), "Turn off. Enter to execute. Position 4 of 6");

    press(&mut h, "Enter");
    assert_eq!(said(&h), "Turn on. Enter to execute. Position 4 of 6");
}

#[test]
fn inspection_delete_respects_deletable() {
    let mut h = harness_at(colony::STOVE_CELL);
    h.run("i Down Delete").unwrap();
    assert_eq!(said(&h), "Cannot delete this item");
    assert_eq!(h.colony.objects.len(), 2);

    h.run("Up Delete").unwrap();
    assert_eq!(said(&h), "Deleted Electric stove");
    assert_eq!(h.colony.objects.len(), 1);
    assert_eq!(h.session.inspection().tree().len(), 1);
}

// =========================================================================
// Trade and areas
// =========================================================================

#[test]
fn trade_offer_and_accept() {
    let mut h = harness_at(colony::STOVE_CELL);
    press(&mut h, "t");
    assert_eq!(said(&h), "Trading with Bulk goods trader. Accept trade, balance 0 silver. 1 of 4");

    press(&mut h, "Down");
    assert_eq!(said(&h), "Steel, offer 0 of 200, 2 silver. 2 of 4");
    press(&mut h, "Right");
    assert_eq!(said(&h), "Steel, offer 1 of 200, 2 silver. 2 of 4");
    press(&mut h, "Up");
    assert_eq!(said(&h), "Accept trade, balance -2 silver. 1 of 4");

    assert_eq!(press(&mut h, "Enter"), Dispatch::Closed(Layer::Trade));
    assert_eq!(said(&h), "Trade accepted");
    assert_eq!(h.colony.silver, 98);
    assert_eq!(h.session.active_layer(), None);
}

#[test]
fn area_create_copy_delete() {
    let mut h = harness_at(colony::STOVE_CELL);
    press(&mut h, "a");
    assert_eq!(said(&h), "Manage areas. New area. 1 of 3");

    press(&mut h, "Enter");
    assert_eq!(said(&h), "Area 2, 0 cells. 4 of 4");
    press(&mut h, "Ctrl+C");
    assert_eq!(said(&h), "Area 2 copy, 0 cells. 5 of 5");

    press(&mut h, "Delete");
    assert_eq!(said(&h), "Delete Area 2 copy? No, button 2 of 2");
    press(&mut h, "y");
    assert_eq!(said(&h), "Deleted Area 2 copy");
    assert_eq!(h.colony.areas.len(), 3);
    assert_eq!(h.session.active_layer(), Some(Layer::AreaManager));
}

#[test]
fn fixed_area_cannot_change() {
    let mut h = harness_at(colony::STOVE_CELL);
    h.run("a Down").unwrap();
    assert_eq!(said(&h), "Home, 120 cells. 2 of 3");
    press(&mut h, "Delete");
    assert_eq!(said(&h), "Cannot delete this item");
    press(&mut h, "Enter");
    assert_eq!(said(&h), "Home cannot be renamed");
}

#[test]
fn area_rename_round_trip() {
    let mut h = harness_at(colony::STOVE_CELL);
    h.run("a End Enter").unwrap();
    assert_eq!(said(&h), "Rename area: Area 1");

    h.run("Backspace 9 Enter").unwrap();
    assert_eq!(said(&h), "Area 9, 4 cells. 3 of 3");
    assert!(h.colony.areas.iter().any(|a| a.label == "Area 9"));
}

// =========================================================================
// Transcripts
// =========================================================================

#[test]
fn transcript_records_each_key() {
    let mut h = harness_at(colony::STOVE_CELL);
    let transcript = h.run("b Down F5 Escape").unwrap();

    assert_eq!(
        transcript.dispatches(),
        vec![
            Dispatch::Opened(Layer::Bills),
            Dispatch::Consumed(Layer::Bills),
            Dispatch::Unhandled,
            Dispatch::Closed(Layer::Bills),
        ]
    );
    assert_eq!(
        transcript.spoken_texts(),
        vec!["Bills for Electric stove. Add bill.... 1 of 2", "Simple meal, do 5 times. 2 of 2"]
    );

    let jsonl = transcript.to_jsonl();
    let lines: Vec<serde_json::Value> = jsonl.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["dispatch"]["outcome"], "opened");
    assert_eq!(lines[0]["dispatch"]["layer"], "bills");
    assert_eq!(lines[1]["key"], "Down");
    assert_eq!(lines[3]["dispatch"]["outcome"], "closed");
}
