#![forbid(unsafe_code)]

//! Which controller owns a key.
//!
//! The order is declared once in [`PRECEDENCE`]. Exactly one controller,
//! the first active one, sees each key. If it ignores the key and is not
//! suppressing, the key falls to the ambient layer (map cursor and global
//! open bindings); otherwise it is dropped.

use std::fmt;

use serde::Serialize;

/// A controller slot in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Confirm,
    TextField,
    Picker,
    InspectionTab,
    Inspection,
    Trade,
    FilterTree,
    Bills,
    ZoneActions,
    AreaManager,
    /// Ambient map cursor; always active.
    Map,
}

/// Highest precedence first.
pub const PRECEDENCE: [Layer; 11] = [
    Layer::Confirm,
    Layer::TextField,
    Layer::Picker,
    Layer::InspectionTab,
    Layer::Inspection,
    Layer::Trade,
    Layer::FilterTree,
    Layer::Bills,
    Layer::ZoneActions,
    Layer::AreaManager,
    Layer::Map,
];

impl Layer {
    /// Spoken name, used when opening fails.
    #[must_use]
    pub fn spoken_name(self) -> &'static str {
        match self {
            Self::Confirm => "confirmation",
            Self::TextField => "text field",
            Self::Picker => "picker",
            Self::InspectionTab => "inspection tab",
            Self::Inspection => "inspection",
            Self::Trade => "trade",
            Self::FilterTree => "storage filter",
            Self::Bills => "bills",
            Self::ZoneActions => "zone actions",
            Self::AreaManager => "area manager",
            Self::Map => "map",
        }
    }

    #[must_use]
    pub fn rank(self) -> usize {
        PRECEDENCE.iter().position(|l| *l == self).unwrap_or(PRECEDENCE.len())
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spoken_name())
    }
}

/// Snapshot of one controller for routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerState {
    pub layer: Layer,
    pub active: bool,
    pub suppressing: bool,
}

impl LayerState {
    #[must_use]
    pub const fn new(layer: Layer, active: bool, suppressing: bool) -> Self {
        Self {
            layer,
            active,
            suppressing,
        }
    }
}

/// Routing decision for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Offer the key to this controller only.
    Controller { layer: Layer, suppressing: bool },
    /// No menu is open; the map and global bindings get the key.
    Ambient,
}

/// Pick the owner of the next key. `states` may be in any order.
#[must_use]
pub fn route(states: &[LayerState]) -> Route {
    PRECEDENCE
        .iter()
        .filter(|layer| **layer != Layer::Map)
        .find_map(|layer| states.iter().find(|s| s.layer == *layer && s.active))
        .map_or(Route::Ambient, |s| Route::Controller {
            layer: s.layer,
            suppressing: s.suppressing,
        })
}

/// What happens to a key the routed controller ignored.
#[must_use]
pub fn falls_through(route: Route) -> bool {
    match route {
        Route::Controller { suppressing, .. } => !suppressing,
        Route::Ambient => true,
    }
}
