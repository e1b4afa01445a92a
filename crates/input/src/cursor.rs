//! Keyboard cursor over the card grid.

use crate::map::Direction;
use crate::types::grid_columns;

/// Row-major position on a grid of `len` cards.
///
/// Moves stop at the edges; the last row may be short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCursor {
    index: usize,
    len: usize,
    columns: usize,
}

impl GridCursor {
    pub fn new(len: usize) -> Self {
        Self {
            index: 0,
            len,
            columns: grid_columns(len),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Jump to `index` (e.g. a mouse click). Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize) {
        if index < self.len {
            self.index = index;
        }
    }

    /// Adopt a new grid size, keeping the position when it still fits.
    pub fn resize(&mut self, len: usize) {
        self.len = len;
        self.columns = grid_columns(len);
        if self.index >= len {
            self.index = 0;
        }
    }

    pub fn move_by(&mut self, dir: Direction) {
        if self.len == 0 {
            return;
        }
        let col = self.index % self.columns;
        let target = match dir {
            Direction::Left if col > 0 => self.index - 1,
            Direction::Right if col + 1 < self.columns => self.index + 1,
            Direction::Up if self.index >= self.columns => self.index - self.columns,
            Direction::Down => self.index + self.columns,
            _ => self.index,
        };
        if target < self.len {
            self.index = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_within_four_by_four() {
        let mut c = GridCursor::new(16);
        assert_eq!(c.columns(), 4);

        c.move_by(Direction::Right);
        c.move_by(Direction::Down);
        assert_eq!(c.index(), 5);

        c.move_by(Direction::Left);
        c.move_by(Direction::Left);
        assert_eq!(c.index(), 4);

        c.move_by(Direction::Up);
        c.move_by(Direction::Up);
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn stops_at_right_and_bottom_edges() {
        let mut c = GridCursor::new(16);
        c.set(3);
        c.move_by(Direction::Right);
        assert_eq!(c.index(), 3);

        c.set(14);
        c.move_by(Direction::Down);
        assert_eq!(c.index(), 14);
    }

    #[test]
    fn short_last_row_blocks_down() {
        // 10 cards on 4 columns: last row holds 8 and 9.
        let mut c = GridCursor::new(10);
        c.set(7);
        c.move_by(Direction::Down);
        assert_eq!(c.index(), 7);
        c.set(5);
        c.move_by(Direction::Down);
        assert_eq!(c.index(), 9);
    }

    #[test]
    fn set_ignores_out_of_range() {
        let mut c = GridCursor::new(4);
        c.set(2);
        c.set(99);
        assert_eq!(c.index(), 2);
    }

    #[test]
    fn resize_resets_position_when_it_no_longer_fits() {
        let mut c = GridCursor::new(16);
        c.set(15);
        c.resize(8);
        assert_eq!(c.index(), 0);
        assert_eq!(c.columns(), 3);
    }
}
