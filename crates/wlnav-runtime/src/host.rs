#![forbid(unsafe_code)]

//! The host game as one object.
//!
//! Each controller depends only on its own domain trait. The session needs
//! all of them at once, so [`Host`] bundles them; any type implementing
//! every domain trait is a host.

use wlnav_widgets::area_manager::AreaRegistry;
use wlnav_widgets::bills::BillStack;
use wlnav_widgets::filter_tree::ThingFilterSource;
use wlnav_widgets::inspection::Inspectable;
use wlnav_widgets::map_cursor::MapView;
use wlnav_widgets::trade::TradeDeal;
use wlnav_widgets::zone_actions::ZoneActions;

pub trait Host: BillStack + ThingFilterSource + ZoneActions + AreaRegistry + Inspectable + TradeDeal + MapView {}

impl<T> Host for T where
    T: BillStack + ThingFilterSource + ZoneActions + AreaRegistry + Inspectable + TradeDeal + MapView + ?Sized
{
}
