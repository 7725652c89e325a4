//! Grid state for the tile-matching engine.
//!
//! This module defines the value types the resolvers operate on:
//! - `TileType`: the palette entry a tile is drawn from.
//! - `TileHandle`: an opaque id for the visual entity that draws a tile.
//! - `Slot`: one grid cell, either empty or holding exactly one tile.
//! - `Pos`: a cell coordinate, with `y` growing upward.
//! - `Board`: the `width x height` grid and its query/mutation operations.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// The palette entry of a tile.
///
/// Two tiles match iff their `TileType` values are equal. Emptiness is not a
/// tile type; it is represented by `Slot::Empty`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileType(pub u8);

impl TileType {
    /// Converts the tile type to the digit used by text fixtures.
    ///
    /// Types above 9 wrap around; the configuration caps the palette at ten
    /// entries so this never happens for boards built by a session.
    ///
    /// # Examples
    ///
    /// ```
    /// use slide_match::board::TileType;
    /// assert_eq!(TileType(0).to_char(), '0');
    /// assert_eq!(TileType(7).to_char(), '7');
    /// ```
    pub fn to_char(self) -> char {
        char::from(b'0' + self.0 % 10)
    }

    /// Returns the ANSI background color code for terminal output.
    fn to_ansi_color_code(self) -> &'static str {
        match self.0 % 6 {
            0 => "41",
            1 => "42",
            2 => "44",
            3 => "43",
            4 => "45",
            _ => "46",
        }
    }
}

/// Opaque reference to the visual entity drawing a tile.
///
/// The board stores and forwards handles; it never looks at what they denote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileHandle(pub u64);

/// One cell of the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Slot {
    /// No tile.
    #[default]
    Empty,
    /// Exactly one tile of the given type, drawn by `handle`.
    Occupied { tile: TileType, handle: TileHandle },
}

impl Slot {
    /// Shorthand for an occupied slot.
    pub fn occupied(tile: TileType, handle: TileHandle) -> Self {
        Slot::Occupied { tile, handle }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    /// Returns the tile type, or `None` for an empty slot.
    pub fn tile(&self) -> Option<TileType> {
        match self {
            Slot::Empty => None,
            Slot::Occupied { tile, .. } => Some(*tile),
        }
    }

    /// Returns the visual handle, or `None` for an empty slot.
    pub fn handle(&self) -> Option<TileHandle> {
        match self {
            Slot::Empty => None,
            Slot::Occupied { handle, .. } => Some(*handle),
        }
    }
}

/// A cell coordinate. `x` grows to the right, `y` grows upward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }

    /// Offsets the position by `(dx, dy)` scaled by `steps`.
    ///
    /// Returns `None` if the result would be negative. The caller is still
    /// responsible for checking the upper bounds against a board.
    pub fn offset(self, dx: i32, dy: i32, steps: usize) -> Option<Pos> {
        let steps = steps as isize;
        let x = self.x as isize + dx as isize * steps;
        let y = self.y as isize + dy as isize * steps;
        if x < 0 || y < 0 {
            None
        } else {
            Some(Pos::new(x as usize, y as usize))
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The game board: a `width x height` grid of `Slot`s.
///
/// Every coordinate maps to exactly one slot. Slots are stored row-major
/// starting from `y = 0` (the bottom row).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    height: usize,
    slots: Vec<Slot>,
}

impl Board {
    /// Creates a new board with every slot empty.
    ///
    /// # Arguments
    /// * `width`: Number of columns, must be greater than zero.
    /// * `height`: Number of rows, must be greater than zero.
    ///
    /// # Returns
    /// * `Ok(Board)` with all slots set to `Slot::Empty`.
    /// * `Err(EngineError::InvalidConfig)` if either dimension is zero.
    ///
    /// # Examples
    /// ```
    /// use slide_match::board::{Board, Slot};
    /// let board = Board::new(6, 5).unwrap();
    /// assert_eq!(board.get(0, 0).unwrap(), Slot::Empty);
    /// assert!(Board::new(0, 5).is_err());
    /// ```
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "board dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Board {
            width,
            height,
            slots: vec![Slot::Empty; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `true` if `(x, y)` lies on the board.
    ///
    /// Takes signed coordinates so that resolvers can probe a neighbor one
    /// step past the edge without wrapping.
    pub fn in_bounds(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn index(&self, x: usize, y: usize) -> Result<usize> {
        if x < self.width && y < self.height {
            Ok(y * self.width + x)
        } else {
            Err(EngineError::OutOfRange {
                x: x as isize,
                y: y as isize,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Returns the slot at `(x, y)`.
    ///
    /// # Returns
    /// * `Ok(Slot)` for an on-board coordinate.
    /// * `Err(EngineError::OutOfRange)` otherwise. Coordinates are never clamped.
    pub fn get(&self, x: usize, y: usize) -> Result<Slot> {
        let idx = self.index(x, y)?;
        Ok(self.slots[idx])
    }

    /// Replaces the slot at `(x, y)`.
    ///
    /// The previous content is overwritten without releasing its handle; use
    /// `take` when the caller needs the old slot back.
    pub fn set(&mut self, x: usize, y: usize, slot: Slot) -> Result<()> {
        let idx = self.index(x, y)?;
        self.slots[idx] = slot;
        Ok(())
    }

    /// Empties the slot at `(x, y)` and returns what it held.
    pub fn take(&mut self, x: usize, y: usize) -> Result<Slot> {
        let idx = self.index(x, y)?;
        Ok(std::mem::take(&mut self.slots[idx]))
    }

    pub fn is_empty(&self, x: usize, y: usize) -> Result<bool> {
        Ok(self.get(x, y)?.is_empty())
    }

    /// Returns the tile type at `(x, y)`, `None` for an empty slot.
    pub fn tile(&self, x: usize, y: usize) -> Result<Option<TileType>> {
        Ok(self.get(x, y)?.tile())
    }

    /// `Pos`-based variant of `get`.
    pub fn at(&self, pos: Pos) -> Result<Slot> {
        self.get(pos.x, pos.y)
    }

    /// Unchecked read for the resolvers, which only visit coordinates they
    /// have already bounds-checked.
    pub(crate) fn slot_at(&self, x: usize, y: usize) -> Slot {
        self.slots[y * self.width + x]
    }

    pub(crate) fn put(&mut self, pos: Pos, slot: Slot) {
        let idx = pos.y * self.width + pos.x;
        self.slots[idx] = slot;
    }

    /// Sets every slot to `Slot::Empty`.
    ///
    /// # Returns
    /// The handles of every tile that was on the board, in storage order, so
    /// the caller can hand them to the visual remover.
    pub fn clear(&mut self) -> Vec<TileHandle> {
        let released: Vec<TileHandle> = self.slots.iter().filter_map(Slot::handle).collect();
        self.slots.fill(Slot::Empty);
        released
    }

    /// Iterates over every occupied slot as `(pos, tile, handle)`.
    pub fn occupied(&self) -> impl Iterator<Item = (Pos, TileType, TileHandle)> + '_ {
        self.slots.iter().enumerate().filter_map(move |(idx, slot)| match slot {
            Slot::Empty => None,
            Slot::Occupied { tile, handle } => {
                Some((Pos::new(idx % self.width, idx / self.width), *tile, *handle))
            }
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    /// Counts the tiles of each type on the board.
    ///
    /// Moving tiles never changes this multiset, which makes it a handy
    /// conservation check.
    pub fn tile_counts(&self) -> BTreeMap<TileType, usize> {
        let mut counts = BTreeMap::new();
        for slot in &self.slots {
            if let Some(tile) = slot.tile() {
                *counts.entry(tile).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Generates a string representation of the board with highlighted positions.
    ///
    /// The top row (`y = height - 1`) is printed first so that "up" on screen
    /// matches "up" on the board. Row and column numbers are included and ANSI
    /// escape codes color each tile. A highlighted cell shows `..` instead of
    /// blank space.
    ///
    /// # Arguments
    /// * `highlight`: The cells to mark, possibly empty.
    pub fn to_string_with_highlight(&self, highlight: &[Pos]) -> String {
        let mut output = String::new();

        output.push_str("  ");
        for x in 0..self.width {
            output.push_str(&format!("{:<2}", x));
        }
        output.push('\n');

        for y in (0..self.height).rev() {
            output.push_str(&format!("{:<2}", y));
            for x in 0..self.width {
                let is_highlight = highlight.contains(&Pos::new(x, y));
                let slot = self.slots[y * self.width + x];
                let color_code = slot.tile().map_or("40", TileType::to_ansi_color_code);
                let content = if is_highlight { ".." } else { "  " };
                output.push_str(&format!("\x1b[1;{};m{}\x1b[m", color_code, content));
            }
            if y > 0 {
                output.push('\n');
            }
        }

        output
    }
}

impl fmt::Display for Board {
    /// Formats the board using `to_string_with_highlight(&[])`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(&[]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_at(board: &mut Board, x: usize, y: usize, t: u8, h: u64) {
        board
            .set(x, y, Slot::occupied(TileType(t), TileHandle(h)))
            .unwrap();
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(6, 5).unwrap();
        assert_eq!(board.width(), 6);
        assert_eq!(board.height(), 5);
        for y in 0..5 {
            for x in 0..6 {
                assert!(board.is_empty(x, y).unwrap());
            }
        }
        assert_eq!(board.occupied_count(), 0);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            Board::new(0, 3),
            Err(EngineError::InvalidConfig(_))
        ));
        assert!(matches!(
            Board::new(3, 0),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_get_and_set() {
        let mut board = Board::new(3, 2).unwrap();
        tile_at(&mut board, 2, 1, 4, 9);
        assert_eq!(
            board.get(2, 1).unwrap(),
            Slot::occupied(TileType(4), TileHandle(9))
        );
        assert_eq!(board.tile(2, 1).unwrap(), Some(TileType(4)));
        assert!(!board.is_empty(2, 1).unwrap());
        assert!(board.is_empty(1, 1).unwrap());
    }

    #[test]
    fn test_out_of_range_access_fails() {
        let mut board = Board::new(3, 2).unwrap();
        assert_eq!(
            board.get(3, 0),
            Err(EngineError::OutOfRange {
                x: 3,
                y: 0,
                width: 3,
                height: 2
            })
        );
        assert!(board.get(0, 2).is_err());
        assert!(board.set(5, 5, Slot::Empty).is_err());
        assert!(board.is_empty(0, 7).is_err());
    }

    #[test]
    fn test_in_bounds() {
        let board = Board::new(3, 2).unwrap();
        assert!(board.in_bounds(0, 0));
        assert!(board.in_bounds(2, 1));
        assert!(!board.in_bounds(-1, 0));
        assert!(!board.in_bounds(0, -1));
        assert!(!board.in_bounds(3, 0));
        assert!(!board.in_bounds(0, 2));
    }

    #[test]
    fn test_clear_releases_all_handles() {
        let mut board = Board::new(3, 3).unwrap();
        tile_at(&mut board, 0, 0, 1, 10);
        tile_at(&mut board, 2, 2, 1, 11);
        tile_at(&mut board, 1, 1, 2, 12);

        let mut released = board.clear();
        released.sort();
        assert_eq!(released, vec![TileHandle(10), TileHandle(11), TileHandle(12)]);
        assert_eq!(board.occupied_count(), 0);
        assert!(board.clear().is_empty());
    }

    #[test]
    fn test_take_empties_slot() {
        let mut board = Board::new(2, 2).unwrap();
        tile_at(&mut board, 1, 0, 3, 5);
        let taken = board.take(1, 0).unwrap();
        assert_eq!(taken.handle(), Some(TileHandle(5)));
        assert!(board.is_empty(1, 0).unwrap());
    }

    #[test]
    fn test_occupied_and_tile_counts() {
        let mut board = Board::new(3, 2).unwrap();
        tile_at(&mut board, 0, 0, 1, 1);
        tile_at(&mut board, 1, 1, 1, 2);
        tile_at(&mut board, 2, 1, 0, 3);

        let occupied: Vec<Pos> = board.occupied().map(|(p, _, _)| p).collect();
        assert_eq!(occupied, vec![Pos::new(0, 0), Pos::new(1, 1), Pos::new(2, 1)]);

        let counts = board.tile_counts();
        assert_eq!(counts.get(&TileType(1)), Some(&2));
        assert_eq!(counts.get(&TileType(0)), Some(&1));
    }

    #[test]
    fn test_pos_offset() {
        let p = Pos::new(1, 2);
        assert_eq!(p.offset(1, 0, 3), Some(Pos::new(4, 2)));
        assert_eq!(p.offset(0, -1, 2), Some(Pos::new(1, 0)));
        assert_eq!(p.offset(-1, 0, 2), None);
    }

    #[test]
    fn test_display_board_formatting() {
        let mut board = Board::new(4, 3).unwrap();
        tile_at(&mut board, 0, 2, 0, 1);
        let display_str = format!("{}", board);

        assert!(display_str.starts_with("  0 1 2 3 "));
        // Header line plus one line per row
        assert_eq!(display_str.trim().lines().count(), 4);
        // Top row is printed first
        let first_row = display_str.lines().nth(1).unwrap();
        assert!(first_row.starts_with("2 "));
        assert!(first_row.contains("\x1b[1;41;m"));
    }

    #[test]
    fn test_highlight_marks_only_listed_cells() {
        let mut board = Board::new(3, 2).unwrap();
        tile_at(&mut board, 1, 1, 0, 0);
        let plain = board.to_string_with_highlight(&[]);
        assert!(!plain.contains(".."));
        assert_eq!(plain, format!("{}", board));

        let marked = board.to_string_with_highlight(&[Pos::new(1, 1), Pos::new(2, 0)]);
        // Top row: only column 1 is marked, on the tile's color.
        let top = marked.lines().nth(1).unwrap();
        assert_eq!(top.matches("..").count(), 1);
        assert!(top.contains("\x1b[1;41;m..\x1b[m"));
        // Bottom row: the empty cell at column 2 is marked too.
        let bottom = marked.lines().nth(2).unwrap();
        assert_eq!(bottom.matches("..").count(), 1);
        assert!(bottom.ends_with("\x1b[1;40;m..\x1b[m"));
    }
}
