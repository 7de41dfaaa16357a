//! Per-category cursor positions.

use super::Category;

/// Step direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

impl Direction {
    pub fn delta(self) -> isize {
        match self {
            Direction::Next => 1,
            Direction::Prev => -1,
        }
    }
}

/// One index per category.
///
/// An index is only meaningful while its list is non-empty; after a rebuild
/// it is clamped to `[0, len - 1]` (or 0 for an empty list).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorSet([usize; 4]);

impl CursorSet {
    pub fn get(&self, category: Category) -> usize {
        self.0[category.index()]
    }

    pub fn set(&mut self, category: Category, index: usize) {
        self.0[category.index()] = index;
    }

    pub fn reset(&mut self, category: Category) {
        self.set(category, 0);
    }

    /// Keep the cursor inside a list of `len` items.
    pub fn clamp(&mut self, category: Category, len: usize) {
        let slot = &mut self.0[category.index()];
        *slot = (*slot).min(len.saturating_sub(1));
    }

    /// Move one step with wrap-around. Returns the new index, or `None` when
    /// the list is empty.
    pub fn step(&mut self, category: Category, direction: Direction, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let current = self.get(category).min(len - 1) as isize;
        let next = (current + direction.delta()).rem_euclid(len as isize) as usize;
        self.set(category, next);
        Some(next)
    }
}
