use crate::board::{Board, Slot, TileHandle, TileType};
use crate::error::{EngineError, Result};

/// Parses an array of string slices into a `Board`.
///
/// Each string slice is one row, listed top to bottom: the first string is
/// row `y = height - 1` and the last string is row `y = 0`. This keeps the
/// fixture looking the way the board is displayed.
///
/// Valid characters are:
/// - `'0'..='9'`: a tile of that `TileType`
/// - `'.'`: an empty slot
///
/// Tiles receive handles `TileHandle(0)`, `TileHandle(1)`, ... in reading
/// order (left to right, top to bottom), so tests can follow a specific tile
/// across moves.
///
/// # Returns
/// * `Ok(Board)` if parsing is successful.
/// * `Err(EngineError::Parse)` if there are no rows, the rows differ in
///   length, a row is empty, or an unrecognized character is encountered.
///
/// # Examples
/// ```
/// use slide_match::utils::board_from_str_array;
/// use slide_match::board::TileType;
///
/// let board = board_from_str_array(&[
///     "0.1", // y = 1
///     "..2", // y = 0
/// ]).unwrap();
/// assert_eq!(board.width(), 3);
/// assert_eq!(board.height(), 2);
/// assert_eq!(board.tile(0, 1).unwrap(), Some(TileType(0)));
/// assert_eq!(board.tile(2, 0).unwrap(), Some(TileType(2)));
/// assert_eq!(board.tile(1, 0).unwrap(), None);
///
/// assert!(board_from_str_array(&["0X"]).is_err());
/// assert!(board_from_str_array(&["00", "0"]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board> {
    if s.is_empty() {
        return Err(EngineError::Parse("expected at least one row".to_string()));
    }

    let height = s.len();
    let width = s[0].chars().count();
    if width == 0 {
        return Err(EngineError::Parse("row 0 is empty".to_string()));
    }

    let mut board = Board::new(width, height)?;
    let mut next_handle = 0u64;

    for (r, row_str) in s.iter().enumerate() {
        let len = row_str.chars().count();
        if len != width {
            return Err(EngineError::Parse(format!(
                "row {} has {} characters, expected {}",
                r, len, width
            )));
        }

        // The first text row is the top of the board.
        let y = height - 1 - r;
        for (x, ch) in row_str.chars().enumerate() {
            let slot = match ch {
                '.' => Slot::Empty,
                '0'..='9' => {
                    let handle = TileHandle(next_handle);
                    next_handle += 1;
                    Slot::occupied(TileType(ch as u8 - b'0'), handle)
                }
                _ => {
                    return Err(EngineError::Parse(format!(
                        "unrecognized character '{}' in row {} col {}",
                        ch, r, x
                    )))
                }
            };
            board.set(x, y, slot)?;
        }
    }

    Ok(board)
}

/// Renders a board back into the row format accepted by `board_from_str_array`.
///
/// Handles are not part of the text form.
pub fn board_to_str_rows(board: &Board) -> Vec<String> {
    (0..board.height())
        .rev()
        .map(|y| {
            (0..board.width())
                .map(|x| match board.get(x, y) {
                    Ok(Slot::Occupied { tile, .. }) => tile.to_char(),
                    _ => '.',
                })
                .collect()
        })
        .collect()
}
