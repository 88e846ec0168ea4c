#![forbid(unsafe_code)]

//! Bounded history of forwarded announcements.
//!
//! [`AnnouncementHistory`] sits between the controllers and the real sink,
//! keeping the most recent announcements in a ring so the player can ask for
//! the last message again. Oldest entries are evicted when the ring is full;
//! `total_count` keeps counting across evictions.
//!
//! # Example
//!
//! ```
//! use wlnav_core::{Announcement, AnnouncementHistory, AnnouncementSink};
//!
//! let mut history = AnnouncementHistory::new(Vec::<Announcement>::new(), 2);
//! history.announce(Announcement::normal("one"));
//! history.announce(Announcement::normal("two"));
//! history.announce(Announcement::normal("three")); // evicts "one"
//!
//! assert_eq!(history.len(), 2);
//! assert_eq!(history.total_count(), 3);
//! assert_eq!(history.last().map(|a| a.text.as_str()), Some("three"));
//! ```

use std::collections::VecDeque;

use crate::announce::{Announcement, AnnouncementSink, Priority};

/// Default number of announcements kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 32;

/// Sink wrapper that remembers what was said.
#[derive(Debug, Clone)]
pub struct AnnouncementHistory<S> {
    inner: S,
    ring: VecDeque<Announcement>,
    capacity: usize,
    total_count: usize,
}

impl<S: AnnouncementSink> AnnouncementHistory<S> {
    /// Wrap `inner`, keeping at most `capacity` announcements (minimum 1).
    #[must_use]
    pub fn new(inner: S, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner,
            ring: VecDeque::with_capacity(capacity),
            capacity,
            total_count: 0,
        }
    }

    /// Number of retained announcements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Announcements ever forwarded, evicted ones included.
    #[inline]
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Most recent announcement.
    #[must_use]
    pub fn last(&self) -> Option<&Announcement> {
        self.ring.back()
    }

    /// Up to `n` most recent announcements, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Announcement> {
        let skip = self.ring.len().saturating_sub(n);
        self.ring.iter().skip(skip)
    }

    /// Say the last announcement again at `Normal` priority.
    ///
    /// The repeat is forwarded to the inner sink but not re-recorded.
    /// Returns `false` if nothing has been said yet.
    pub fn repeat_last(&mut self) -> bool {
        let Some(last) = self.ring.back() else {
            return false;
        };
        let again = Announcement::new(last.text.clone(), Priority::Normal);
        self.inner.announce(again);
        true
    }

    /// Drop retained announcements (the total count is kept).
    pub fn clear(&mut self) {
        self.ring.clear();
    }

    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: AnnouncementSink> AnnouncementSink for AnnouncementHistory<S> {
    fn announce(&mut self, announcement: Announcement) {
        self.total_count = self.total_count.saturating_add(1);
        if self.ring.len() >= self.capacity {
            self.ring.pop_front();
        }
        self.ring.push_back(announcement.clone());
        self.inner.announce(announcement);
    }
}
