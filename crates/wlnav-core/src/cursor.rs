#![forbid(unsafe_code)]

//! Selection cursor over an ordered list.
//!
//! # Invariants
//! 1. After any operation with `len > 0`, `index < len`.
//! 2. With `len == 0`, every movement is a no-op and `index` is 0.
//! 3. `move_next`/`move_previous` wrap; paging and `select` clamp.

/// Index-based cursor for flat lists and tree visible lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListCursor {
    index: usize,
}

impl ListCursor {
    #[must_use]
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    /// Cursor positioned at `index`, clamped into `len`.
    #[must_use]
    pub fn at(index: usize, len: usize) -> Self {
        let mut cursor = Self { index };
        cursor.clamp(len);
        cursor
    }

    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// `(index + 1) mod len`.
    pub fn move_next(&mut self, len: usize) {
        if len == 0 {
            self.index = 0;
            return;
        }
        self.index = (self.index.min(len - 1) + 1) % len;
    }

    /// `(index - 1 + len) mod len`.
    pub fn move_previous(&mut self, len: usize) {
        if len == 0 {
            self.index = 0;
            return;
        }
        self.index = (self.index.min(len - 1) + len - 1) % len;
    }

    pub fn first(&mut self) {
        self.index = 0;
    }

    pub fn last(&mut self, len: usize) {
        self.index = len.saturating_sub(1);
    }

    /// Move down a page without wrapping.
    pub fn page_down(&mut self, len: usize, page: usize) {
        self.index = self.index.saturating_add(page.max(1));
        self.clamp(len);
    }

    /// Move up a page without wrapping.
    pub fn page_up(&mut self, len: usize, page: usize) {
        self.index = self.index.saturating_sub(page.max(1));
        self.clamp(len);
    }

    /// Jump to `index`, clamped into range.
    pub fn select(&mut self, index: usize, len: usize) {
        self.index = index;
        self.clamp(len);
    }

    /// Clamp after a structural change: `index = min(index, len - 1)`, or 0.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.index = 0;
        } else if self.index >= len {
            self.index = len - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_wraps_to_start() {
        let mut c = ListCursor::at(2, 3);
        c.move_next(3);
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn previous_wraps_to_end() {
        let mut c = ListCursor::new();
        c.move_previous(4);
        assert_eq!(c.index(), 3);
    }

    #[test]
    fn empty_list_is_noop() {
        let mut c = ListCursor::new();
        c.move_next(0);
        c.move_previous(0);
        c.page_down(0, 10);
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn clamp_after_shrink() {
        let mut c = ListCursor::at(4, 5);
        c.clamp(3);
        assert_eq!(c.index(), 2);
        c.clamp(0);
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn paging_clamps_instead_of_wrapping() {
        let mut c = ListCursor::at(5, 12);
        c.page_down(12, 10);
        assert_eq!(c.index(), 11);
        c.page_up(12, 10);
        assert_eq!(c.index(), 1);
        c.page_up(12, 10);
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn stale_index_is_clamped_before_moving() {
        // List shrank underneath the cursor without a clamp call.
        let mut c = ListCursor::at(9, 10);
        c.move_next(3);
        assert_eq!(c.index(), 0);
        let mut c = ListCursor::at(9, 10);
        c.move_previous(3);
        assert_eq!(c.index(), 1);
    }

    #[test]
    fn last_on_empty_is_zero() {
        let mut c = ListCursor::new();
        c.last(0);
        assert_eq!(c.index(), 0);
    }
}
