#![forbid(unsafe_code)]

//! Core: key events, entry models, selection cursors, and announcements.
//!
//! # Role in wlnav
//! `wlnav-core` is the leaf layer. It owns the pieces every navigation
//! controller shares: the discrete [`event::KeyEvent`] type the host feeds
//! in, the [`model`] entries a controller projects domain data into, the
//! [`cursor`] and [`visible`] list that track what is selected, the
//! [`rebuild`] reselection heuristic, and the [`announce`] channel that
//! turns state changes into speech.
//!
//! # How it fits in the system
//! `wlnav-widgets` builds one controller per menu kind out of these parts,
//! and `wlnav-runtime` arbitrates which controller receives each key. Nothing
//! in this crate knows about any particular menu kind or host.

pub mod announce;
pub mod cursor;
pub mod event;
pub mod history;
pub mod model;
pub mod rebuild;
pub mod visible;

pub use announce::{Announcement, AnnouncementSink, Announcer, Priority};
pub use cursor::ListCursor;
pub use event::{KeyCode, KeyEvent, KeyParseError, Modifiers};
pub use history::AnnouncementHistory;
pub use model::{Children, MenuEntry, MenuEntryKind, SelectionKey, TreeEntry, TreeEntryKind};
pub use rebuild::{Keyed, relocate, snapshot};
pub use visible::{RowPath, VisibleList};
