#![forbid(unsafe_code)]

//! Trade deal with a visiting trader.
//!
//! ```text
//! Accept trade, balance {n} silver
//! {item}, offer {q} of {available}, {price} silver   (one row per tradeable)
//! Reset offers
//! ```
//!
//! Left/Right change the offered quantity of the selected item by one,
//! Shift+Left/Right by a larger step. While open the trade owns the
//! keyboard: keys it does not use never reach the map.

use wlnav_core::{AnnouncementSink, KeyCode, KeyEvent, MenuEntry};

use crate::domain::{DomainError, EntityId, NavError, report_failure};
use crate::flat_menu::{FlatMenu, MenuOptions};
use crate::response::Response;

pub const DEFAULT_LARGE_STEP: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tradeable {
    pub id: EntityId,
    pub label: String,
    pub offered: u32,
    pub available: u32,
    /// Silver per unit.
    pub unit_price: u32,
}

/// Host side of a trade session.
pub trait TradeDeal {
    /// Label of the current trader, `None` when no trade is in progress.
    fn trader_label(&self) -> Option<String>;
    fn tradeables(&self) -> Vec<Tradeable>;
    /// Silver the colony gains (positive) or pays (negative) on accept.
    fn balance(&self) -> i64;
    fn set_offer(&mut self, item: EntityId, quantity: u32) -> Result<(), DomainError>;
    fn reset_offers(&mut self);
    fn accept(&mut self) -> Result<(), DomainError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeRow {
    Accept,
    Item(EntityId),
    Reset,
}

pub fn build_trade<D: TradeDeal + ?Sized>(domain: &D) -> Vec<MenuEntry<TradeRow>> {
    let mut entries =
        vec![MenuEntry::action("Accept trade", TradeRow::Accept).with_detail(format!("balance {} silver", domain.balance()))];
    entries.extend(domain.tradeables().into_iter().map(|t| {
        MenuEntry::leaf(t.label, TradeRow::Item(t.id)).with_detail(format!(
            "offer {} of {}, {} silver",
            t.offered, t.available, t.unit_price
        ))
    }));
    entries.push(MenuEntry::action("Reset offers", TradeRow::Reset));
    entries
}

#[derive(Debug, Clone)]
pub struct TradeMenu {
    menu: FlatMenu<TradeRow>,
    large_step: u32,
    active: bool,
}

impl Default for TradeMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl TradeMenu {
    #[must_use]
    pub fn new() -> Self {
        Self {
            menu: FlatMenu::new("Nothing to trade"),
            large_step: DEFAULT_LARGE_STEP,
            active: false,
        }
    }

    #[must_use]
    pub fn with_large_step(mut self, step: u32) -> Self {
        self.large_step = step.max(1);
        self
    }

    pub fn set_large_step(&mut self, step: u32) {
        self.large_step = step.max(1);
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
        self.active
    }

    #[must_use]
    pub fn menu(&self) -> &FlatMenu<TradeRow> {
        &self.menu
    }

    pub fn open<D: TradeDeal + ?Sized>(&mut self, domain: &D, sink: &mut dyn AnnouncementSink) -> Result<(), NavError> {
        let Some(trader) = domain.trader_label() else {
            tracing::warn!("trade refused: no trader");
            return Err(NavError::MissingTarget("trader".to_owned()));
        };
        self.menu.load(build_trade(domain), 0);
        self.active = true;
        tracing::debug!(trader = %trader, rows = self.menu.len(), "trade opened");
        let text = format!("Trading with {trader}. {}", self.menu.describe());
        self.menu.say(sink, text);
        Ok(())
    }

    pub fn close(&mut self) {
        if self.active {
            tracing::debug!("trade closed");
        }
        self.active = false;
        self.menu.clear();
    }

    pub fn reannounce(&mut self, sink: &mut dyn AnnouncementSink) {
        self.menu.reannounce(sink);
    }

    pub fn handle_key<D: TradeDeal + ?Sized>(
        &mut self,
        domain: &mut D,
        key: &KeyEvent,
        sink: &mut dyn AnnouncementSink,
    ) -> Response {
        if !self.active {
            return Response::Ignored;
        }
        let step = if key.has_shift() { self.large_step } else { 1 };
        match key.code {
            KeyCode::Escape => {
                self.close();
                Response::Closed
            }
            KeyCode::Enter => self.execute(domain, sink),
            KeyCode::Left => {
                self.adjust(domain, -i64::from(step), sink);
                Response::Consumed
            }
            KeyCode::Right => {
                self.adjust(domain, i64::from(step), sink);
                Response::Consumed
            }
            _ if self.menu.refuse_edit(key, sink) => Response::Consumed,
            _ => Response::consumed_if(self.menu.handle_navigation(key, sink)),
        }
    }

    fn adjust<D: TradeDeal + ?Sized>(&mut self, domain: &mut D, delta: i64, sink: &mut dyn AnnouncementSink) {
        let Some(TradeRow::Item(item)) = self.menu.selected_payload().copied() else {
            let label = self.menu.selected().map(|e| e.label.clone()).unwrap_or_default();
            self.menu.say_high(sink, format!("Cannot change the offer on {label}"));
            return;
        };
        let Some(current) = domain.tradeables().into_iter().find(|t| t.id == item) else {
            report_failure(self.menu.announcer_mut(), sink, &DomainError::Missing);
            return;
        };
        let wanted = (i64::from(current.offered) + delta).clamp(0, i64::from(current.available));
        let wanted = u32::try_from(wanted).unwrap_or(current.offered);
        if wanted != current.offered {
            if let Err(err) = domain.set_offer(item, wanted) {
                report_failure(self.menu.announcer_mut(), sink, &err);
                return;
            }
            tracing::trace!(%item, quantity = wanted, "offer changed");
            self.menu.rebuild(build_trade(&*domain));
        }
        self.menu.announce_selection(sink);
    }

    fn execute<D: TradeDeal + ?Sized>(&mut self, domain: &mut D, sink: &mut dyn AnnouncementSink) -> Response {
        match self.menu.selected_payload().copied() {
            Some(TradeRow::Accept) => match domain.accept() {
                Ok(()) => {
                    tracing::debug!("trade accepted");
                    self.close();
                    self.menu.say_high(sink, "Trade accepted");
                    Response::Closed
                }
                Err(err) => {
                    report_failure(self.menu.announcer_mut(), sink, &err);
                    Response::Consumed
                }
            },
            Some(TradeRow::Reset) => {
                domain.reset_offers();
                self.menu.rebuild(build_trade(&*domain));
                self.menu.say(sink, "All offers reset");
                Response::Consumed
            }
            Some(TradeRow::Item(_)) => {
                let label = self.menu.selected().map(|e| e.label.clone()).unwrap_or_default();
                self.menu.say(sink, format!("{label}: use Left and Right arrows to change the offer"));
                Response::Consumed
            }
            None => Response::Consumed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wlnav_core::{Announcement, Priority};

    struct Deal {
        items: Vec<Tradeable>,
        silver: i64,
        open: bool,
    }

    impl Deal {
        fn new() -> Self {
            Self {
                items: vec![
                    Tradeable { id: EntityId(1), label: "Rice".into(), offered: 0, available: 25, unit_price: 2 },
                    Tradeable { id: EntityId(2), label: "Parka".into(), offered: 0, available: 1, unit_price: 90 },
                ],
                silver: 100,
                open: true,
            }
        }

        fn cost(&self) -> i64 {
            self.items.iter().map(|t| i64::from(t.offered * t.unit_price)).sum()
        }
    }

    impl TradeDeal for Deal {
        fn trader_label(&self) -> Option<String> {
            self.open.then(|| "Bulk goods trader".to_owned())
        }
        fn tradeables(&self) -> Vec<Tradeable> {
            self.items.clone()
        }
        fn balance(&self) -> i64 {
            -self.cost()
        }
        fn set_offer(&mut self, item: EntityId, quantity: u32) -> Result<(), DomainError> {
            let t = self.items.iter_mut().find(|t| t.id == item).ok_or(DomainError::Missing)?;
            t.offered = quantity;
            Ok(())
        }
        fn reset_offers(&mut self) {
            for t in &mut self.items {
                t.offered = 0;
            }
        }
        fn accept(&mut self) -> Result<(), DomainError> {
            if self.cost() > self.silver {
                return Err(DomainError::Rejected("Not enough silver".into()));
            }
            self.open = false;
            Ok(())
        }
    }

    fn press(m: &mut TradeMenu, d: &mut Deal, sink: &mut Vec<Announcement>, key: KeyEvent) -> Response {
        m.handle_key(d, &key, sink)
    }

    fn opened(d: &Deal) -> (TradeMenu, Vec<Announcement>) {
        let mut m = TradeMenu::new();
        let mut sink: Vec<Announcement> = Vec::new();
        m.open(d, &mut sink).unwrap();
        (m, sink)
    }

    #[test]
    fn open_announces_trader_and_balance() {
        let d = Deal::new();
        let (m, sink) = opened(&d);
        assert!(m.is_suppressing());
        assert_eq!(m.menu().len(), 4);
        assert_eq!(sink[0].text, "Trading with Bulk goods trader. Accept trade, balance 0 silver. 1 of 4");
    }

    #[test]
    fn arrows_adjust_offer_with_clamp() {
        let mut d = Deal::new();
        let (mut m, mut sink) = opened(&d);
        let _ = press(&mut m, &mut d, &mut sink, KeyEvent::plain(KeyCode::Down));
        let _ = press(&mut m, &mut d, &mut sink, KeyEvent::plain(KeyCode::Right));
        assert_eq!(d.items[0].offered, 1);
        let _ = press(&mut m, &mut d, &mut sink, KeyEvent::shift(KeyCode::Right));
        assert_eq!(d.items[0].offered, 11);
        assert_eq!(sink.last().map(|a| a.text.as_str()), Some("Rice, offer 11 of 25, 2 silver. 2 of 4"));
        for _ in 0..3 {
            let _ = press(&mut m, &mut d, &mut sink, KeyEvent::shift(KeyCode::Right));
        }
        assert_eq!(d.items[0].offered, 25);
        let _ = press(&mut m, &mut d, &mut sink, KeyEvent::shift(KeyCode::Left));
        assert_eq!(d.items[0].offered, 15);
        assert_eq!(m.menu().index(), 1);
    }

    #[test]
    fn left_at_zero_is_silent() {
        let mut d = Deal::new();
        let (mut m, mut sink) = opened(&d);
        let _ = press(&mut m, &mut d, &mut sink, KeyEvent::plain(KeyCode::Down));
        let before = sink.len();
        let _ = press(&mut m, &mut d, &mut sink, KeyEvent::plain(KeyCode::Left));
        assert_eq!(d.items[0].offered, 0);
        assert_eq!(sink.len(), before);
    }

    #[test]
    fn arrows_on_accept_row_are_refused() {
        let mut d = Deal::new();
        let (mut m, mut sink) = opened(&d);
        assert_eq!(press(&mut m, &mut d, &mut sink, KeyEvent::plain(KeyCode::Right)), Response::Consumed);
        assert_eq!(sink.last(), Some(&Announcement::new("Cannot change the offer on Accept trade", Priority::High)));
        let _ = press(&mut m, &mut d, &mut sink, KeyEvent::plain(KeyCode::Left));
        assert_eq!(sink.len(), 3);
        assert!(d.items.iter().all(|t| t.offered == 0));
    }

    #[test]
    fn delete_and_copy_are_refused() {
        let mut d = Deal::new();
        let (mut m, mut sink) = opened(&d);
        assert_eq!(press(&mut m, &mut d, &mut sink, KeyEvent::plain(KeyCode::Delete)), Response::Consumed);
        assert_eq!(sink.last(), Some(&Announcement::new("Cannot delete this item", Priority::High)));
        assert_eq!(press(&mut m, &mut d, &mut sink, KeyEvent::ctrl(KeyCode::Char('c'))), Response::Consumed);
        assert_eq!(sink.last(), Some(&Announcement::new("Cannot copy this item", Priority::High)));
        assert!(m.is_active());
    }

    #[test]
    fn rejected_accept_stays_open() {
        let mut d = Deal::new();
        d.items[1].offered = 1;
        d.items[0].offered = 10;
        let (mut m, mut sink) = opened(&d);
        assert_eq!(press(&mut m, &mut d, &mut sink, KeyEvent::plain(KeyCode::Enter)), Response::Consumed);
        let last = sink.last().unwrap();
        assert_eq!(last.text, "Not enough silver");
        assert_eq!(last.priority, Priority::High);
        assert!(m.is_active());
    }

    #[test]
    fn accept_closes() {
        let mut d = Deal::new();
        let (mut m, mut sink) = opened(&d);
        assert_eq!(press(&mut m, &mut d, &mut sink, KeyEvent::plain(KeyCode::Enter)), Response::Closed);
        assert!(!m.is_active());
        assert_eq!(sink.last().map(|a| a.text.as_str()), Some("Trade accepted"));
    }

    #[test]
    fn reset_clears_offers() {
        let mut d = Deal::new();
        d.items[0].offered = 3;
        let (mut m, mut sink) = opened(&d);
        let _ = press(&mut m, &mut d, &mut sink, KeyEvent::plain(KeyCode::End));
        let _ = press(&mut m, &mut d, &mut sink, KeyEvent::plain(KeyCode::Enter));
        assert_eq!(d.items[0].offered, 0);
        assert_eq!(m.menu().entries()[0].detail, "balance 0 silver");
    }

    #[test]
    fn unused_keys_are_ignored_but_suppressed() {
        let mut d = Deal::new();
        let (mut m, mut sink) = opened(&d);
        assert_eq!(press(&mut m, &mut d, &mut sink, KeyEvent::plain(KeyCode::F(5))), Response::Ignored);
        assert!(m.is_suppressing());
    }
}
