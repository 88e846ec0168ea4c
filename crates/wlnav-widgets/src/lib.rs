#![forbid(unsafe_code)]

//! Navigation controllers: one independent state machine per menu kind.
//!
//! # Role in wlnav
//! `wlnav-widgets` turns the shared pieces from `wlnav-core` into usable
//! controllers. [`FlatMenu`] and [`TreeMenu`] implement cursor movement,
//! rebuild reselection, and announcement once; each kind module (bills,
//! filter trees, zones, areas, inspection, trade) adds a domain trait, a
//! pure model builder, and the key handling specific to that kind.
//!
//! # Controller protocol
//! Every controller exposes the same shape:
//!
//! - `is_active()` / `is_suppressing()` for session arbitration,
//! - `open(..) -> Result<(), NavError>` which builds the model and announces
//!   the initial selection (refusing on a missing target),
//! - `close()` which drops all model state silently,
//! - `handle_key(..) -> Response<R>` for exactly one key event.
//!
//! Controllers never open each other. When one needs a child (a recipe
//! picker, a rename field, a delete confirmation) it returns
//! [`Response::Emit`] with a typed request and the session routes it.

pub mod area_manager;
pub mod bills;
pub mod confirm;
pub mod domain;
pub mod filter_tree;
pub mod flat_menu;
pub mod inspection;
pub mod map_cursor;
pub mod picker;
pub mod response;
pub mod text_field;
pub mod trade;
pub mod tree_menu;
pub mod zone_actions;

pub use domain::{Cell, DefName, DomainError, EntityId, NavError};
pub use flat_menu::{FlatMenu, MenuOptions};
pub use response::Response;
pub use tree_menu::{Materializer, TreeMenu};
