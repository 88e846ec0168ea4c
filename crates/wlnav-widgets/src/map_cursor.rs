#![forbid(unsafe_code)]

//! Keyboard cursor over the map grid.
//!
//! The map is the ambient layer: it only sees keys no menu claimed. Arrows
//! move one cell, Shift+arrows move `jump` cells. Movement stops at the map
//! edge, and a press that does not move the cursor says nothing.

use wlnav_core::{AnnouncementSink, Announcer, KeyCode, KeyEvent};

use crate::domain::{Cell, EntityId};
use crate::response::Response;

pub const DEFAULT_JUMP: i32 = 10;

/// Host side of the map.
pub trait MapView {
    /// Width and height in cells.
    fn map_size(&self) -> (i32, i32);
    fn describe_cell(&self, cell: Cell) -> String;
    fn workbench_at(&self, cell: Cell) -> Option<EntityId>;
    fn zone_at(&self, cell: Cell) -> Option<EntityId>;
}

#[derive(Debug, Clone)]
pub struct MapCursor {
    cell: Cell,
    jump: i32,
    announce_coordinates: bool,
    announcer: Announcer,
}

impl Default for MapCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl MapCursor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cell: Cell::default(),
            jump: DEFAULT_JUMP,
            announce_coordinates: false,
            // Adjacent cells often read the same.
            announcer: Announcer::new().with_dedupe(false),
        }
    }

    #[must_use]
    pub fn with_jump(mut self, jump: i32) -> Self {
        self.set_jump(jump);
        self
    }

    pub fn set_jump(&mut self, jump: i32) {
        self.jump = jump.max(1);
    }

    pub fn set_announce_coordinates(&mut self, on: bool) {
        self.announce_coordinates = on;
    }

    #[must_use]
    pub fn cell(&self) -> Cell {
        self.cell
    }

    /// Place the cursor without announcing (camera jumps, tests).
    pub fn place<M: MapView + ?Sized>(&mut self, map: &M, cell: Cell) {
        self.cell = clamp_to(map, cell);
    }

    fn describe<M: MapView + ?Sized>(&self, map: &M) -> String {
        let text = map.describe_cell(self.cell);
        if self.announce_coordinates {
            format!("{text}, {}", self.cell)
        } else {
            text
        }
    }

    /// Speak the current cell.
    pub fn announce_here<M: MapView + ?Sized>(&mut self, map: &M, sink: &mut dyn AnnouncementSink) {
        let text = self.describe(map);
        self.announcer.normal(sink, text);
    }

    /// Move by `(dx, dy)`, clamped to the map. Returns `true` if the cursor moved.
    pub fn move_by<M: MapView + ?Sized>(&mut self, map: &M, dx: i32, dy: i32, sink: &mut dyn AnnouncementSink) -> bool {
        let target = clamp_to(map, Cell::new(self.cell.x.saturating_add(dx), self.cell.y.saturating_add(dy)));
        if target == self.cell {
            tracing::trace!(cell = %self.cell, "map cursor at edge");
            return false;
        }
        self.cell = target;
        self.announce_here(map, sink);
        true
    }

    pub fn handle_key<M: MapView + ?Sized>(&mut self, map: &M, key: &KeyEvent, sink: &mut dyn AnnouncementSink) -> Response {
        if key.has_ctrl() || key.has_alt() {
            return Response::Ignored;
        }
        let step = if key.has_shift() { self.jump } else { 1 };
        let (dx, dy) = match key.code {
            KeyCode::Up => (0, step),
            KeyCode::Down => (0, -step),
            KeyCode::Left => (-step, 0),
            KeyCode::Right => (step, 0),
            _ => return Response::Ignored,
        };
        self.move_by(map, dx, dy, sink);
        Response::Consumed
    }
}

fn clamp_to<M: MapView + ?Sized>(map: &M, cell: Cell) -> Cell {
    let (width, height) = map.map_size();
    Cell::new(cell.x.clamp(0, (width - 1).max(0)), cell.y.clamp(0, (height - 1).max(0)))
}
