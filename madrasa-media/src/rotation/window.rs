//! Rotation window arithmetic
//!
//! A window of `items_per_view` consecutive items slides over `item_count`
//! items. `index` is the leftmost visible item and always satisfies
//! `index <= last_index()`, where `last_index = item_count - items_per_view`
//! (saturating at 0).
//!
//! Stepping uses the clamp-to-last-full-window policy: a step that would run
//! past the end lands on the last full window, and stepping from the last
//! full window wraps to 0. With 10 items shown 4 at a time the cycle is
//! 0 → 4 → 6 → 0.

use serde::{Deserialize, Serialize};

/// Clamped window over a fixed-length sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationWindow {
    item_count: usize,
    items_per_view: usize,
    index: usize,
}

impl RotationWindow {
    /// Window at index 0; `items_per_view` of 0 is treated as 1
    pub fn new(item_count: usize, items_per_view: usize) -> Self {
        Self {
            item_count,
            items_per_view: items_per_view.max(1),
            index: 0,
        }
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn items_per_view(&self) -> usize {
        self.items_per_view
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Largest valid index
    pub fn last_index(&self) -> usize {
        self.item_count.saturating_sub(self.items_per_view)
    }

    /// Whether there is anything outside the visible window
    pub fn can_rotate(&self) -> bool {
        self.item_count > self.items_per_view
    }

    /// Advance one window, wrapping to 0 from the last full window
    ///
    /// Returns whether the index changed.
    pub fn next(&mut self) -> bool {
        if !self.can_rotate() {
            return false;
        }
        let last = self.last_index();
        let target = if self.index >= last {
            0
        } else {
            (self.index + self.items_per_view).min(last)
        };
        self.set_index(target)
    }

    /// Go back one window, wrapping from 0 to the last full window
    pub fn prev(&mut self) -> bool {
        if !self.can_rotate() {
            return false;
        }
        let target = if self.index == 0 {
            self.last_index()
        } else {
            self.index.saturating_sub(self.items_per_view)
        };
        self.set_index(target)
    }

    /// Move to `index`, clamped into range
    pub fn jump_to(&mut self, index: usize) -> bool {
        self.set_index(index.min(self.last_index()))
    }

    /// Change the window size (minimum 1) and re-clamp
    pub fn set_items_per_view(&mut self, items_per_view: usize) -> bool {
        let before = self.index;
        self.items_per_view = items_per_view.max(1);
        self.clamp();
        before != self.index
    }

    /// Change the sequence length and re-clamp
    pub fn set_item_count(&mut self, item_count: usize) -> bool {
        let before = self.index;
        self.item_count = item_count;
        self.clamp();
        before != self.index
    }

    /// Number of pagination dots
    pub fn page_count(&self) -> usize {
        if self.item_count == 0 {
            0
        } else {
            self.item_count.div_ceil(self.items_per_view)
        }
    }

    /// Page containing the current index
    ///
    /// The last full window counts as the last page even when it is not
    /// aligned to a multiple of `items_per_view`.
    pub fn current_page(&self) -> usize {
        if self.can_rotate() && self.index == self.last_index() {
            self.page_count() - 1
        } else {
            self.index / self.items_per_view
        }
    }

    /// Jump to the first item of `page` (clamped)
    pub fn jump_to_page(&mut self, page: usize) -> bool {
        self.jump_to(page.saturating_mul(self.items_per_view))
    }

    fn set_index(&mut self, index: usize) -> bool {
        let changed = self.index != index;
        self.index = index;
        changed
    }

    fn clamp(&mut self) {
        self.index = self.index.min(self.last_index());
    }
}
