#![forbid(unsafe_code)]

//! Session arbitration, configuration, and logging for wlnav.
//!
//! # Role in wlnav
//! `wlnav-runtime` is the layer a host game talks to. It owns every
//! controller from `wlnav-widgets` inside one [`NavSession`], decides which
//! of them sees each key ([`arbitration`]), and wires child results back to
//! their parents.
//!
//! # How it fits in the system
//! The host implements [`Host`] (the union of the per-kind domain traits),
//! builds a [`NavConfig`], optionally installs logging with
//! [`logging::init`], and then calls [`NavSession::dispatch`] once per key
//! press. Announcements arrive at the sink the session was built with.

pub mod arbitration;
pub mod config;
pub mod error;
pub mod host;
pub mod keymap;
pub mod logging;
pub mod session;

pub use arbitration::{Layer, LayerState, PRECEDENCE, Route, falls_through, route};
pub use config::{LogConfig, NavConfig};
pub use error::{ConfigError, LoggingError};
pub use host::Host;
pub use keymap::{Binding, KeyBindings, Keymap};
pub use session::{Dispatch, NavSession, PickValue};
