use crate::error::ChessError;
use std::fmt;

pub const BOARD_SIZE: usize = 8;

/// A square on the board. Rows and columns are 1-based: row 1 is White's back
/// rank and column 1 is the a-file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    pub fn is_on_board(&self) -> bool {
        (1..=BOARD_SIZE).contains(&self.row) && (1..=BOARD_SIZE).contains(&self.col)
    }

    /// The square `d_row` rows and `d_col` columns away, if it is on the board.
    pub fn offset(&self, d_row: i32, d_col: i32) -> Option<Position> {
        let row = self.row as i32 + d_row;
        let col = self.col as i32 + d_col;
        let pos = Position::new(usize::try_from(row).ok()?, usize::try_from(col).ok()?);
        pos.is_on_board().then_some(pos)
    }

    /// Square name such as `e4`. Off-board squares render as `(row,col)`.
    pub fn to_algebraic(&self) -> String {
        if !self.is_on_board() {
            return format!("({},{})", self.row, self.col);
        }
        format!("{}{}", (b'a' + (self.col - 1) as u8) as char, self.row)
    }

    pub fn from_algebraic(s: &str) -> Result<Self, ChessError> {
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ChessError::InvalidSquare(s.to_string()));
        };

        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }

        let col = (file as u8 - b'a') as usize + 1;
        let row = (rank as u8 - b'0') as usize;
        Ok(Position { row, col })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}
