use crate::color::Color;
use crate::pieces::{Piece, PieceType};
use crate::position::{BOARD_SIZE, Position};
use crate::r#move::Move;
use std::fmt;

const BACK_RANK: [PieceType; BOARD_SIZE] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// An 8x8 grid of squares, each holding at most one piece.
///
/// The board is plain storage: it never checks whether a move is legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    squares: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn empty() -> Self {
        Board {
            squares: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    pub fn standard() -> Self {
        let mut board = Self::empty();
        board.reset_board();
        board
    }

    fn index(pos: &Position) -> (usize, usize) {
        assert!(pos.is_on_board(), "position {:?} is off the board", pos);
        (pos.row - 1, pos.col - 1)
    }

    /// # Panics
    ///
    /// Panics if `pos` is off the board.
    pub fn get_piece(&self, pos: &Position) -> Option<Piece> {
        let (row, col) = Self::index(pos);
        self.squares[row][col]
    }

    /// Like [`Board::get_piece`] but for a square that may be off the board.
    pub fn piece_at(&self, pos: &Position) -> Option<Piece> {
        if pos.is_on_board() {
            self.get_piece(pos)
        } else {
            None
        }
    }

    pub fn get_piece_mut(&mut self, pos: &Position) -> Option<&mut Piece> {
        let (row, col) = Self::index(pos);
        self.squares[row][col].as_mut()
    }

    pub fn add_piece(&mut self, pos: &Position, piece: Piece) {
        self.set_piece(pos, Some(piece));
    }

    pub fn remove_piece(&mut self, pos: &Position) -> Option<Piece> {
        let (row, col) = Self::index(pos);
        self.squares[row][col].take()
    }

    pub fn set_piece(&mut self, pos: &Position, piece: Option<Piece>) {
        let (row, col) = Self::index(pos);
        self.squares[row][col] = piece;
    }

    pub fn clear(&mut self) {
        self.squares = [[None; BOARD_SIZE]; BOARD_SIZE];
    }

    /// Sets up the standard opening position.
    pub fn reset_board(&mut self) {
        self.clear();
        for col in 1..=BOARD_SIZE {
            let piece_type = BACK_RANK[col - 1];
            self.add_piece(&Position::new(1, col), Piece::new(Color::White, piece_type));
            self.add_piece(&Position::new(2, col), Piece::new(Color::White, PieceType::Pawn));
            self.add_piece(&Position::new(7, col), Piece::new(Color::Black, PieceType::Pawn));
            self.add_piece(&Position::new(8, col), Piece::new(Color::Black, piece_type));
        }
    }

    /// Moves whatever sits on the start square to the end square, replacing
    /// any occupant there. No legality, capture or promotion handling.
    pub fn make_move(&mut self, mv: &Move) {
        let piece = self.remove_piece(&mv.start);
        self.set_piece(&mv.end, piece);
    }

    /// All squares holding a piece of `color`, from a1 along each row up to h8.
    pub fn positions(&self, color: Color) -> Vec<Position> {
        self.pieces(color).into_iter().map(|(pos, _)| pos).collect()
    }

    pub fn pieces(&self, color: Color) -> Vec<(Position, Piece)> {
        let mut result = Vec::new();
        for row in 1..=BOARD_SIZE {
            for col in 1..=BOARD_SIZE {
                let pos = Position::new(row, col);
                if let Some(piece) = self.get_piece(&pos) {
                    if piece.color == color {
                        result.push((pos, piece));
                    }
                }
            }
        }
        result
    }

    /// First square, in [`Board::positions`] order, holding the given piece.
    pub fn find_piece(&self, color: Color, piece_type: PieceType) -> Option<Position> {
        self.pieces(color)
            .into_iter()
            .find(|(_, piece)| piece.piece_type == piece_type)
            .map(|(pos, _)| pos)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in (1..=BOARD_SIZE).rev() {
            write!(f, "{} ", row)?;
            for col in 1..=BOARD_SIZE {
                match self.get_piece(&Position::new(row, col)) {
                    Some(piece) => write!(f, "{} ", piece.to_char())?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }

        write!(f, "  ")?;
        for col in 0..BOARD_SIZE {
            write!(f, "{} ", (b'a' + col as u8) as char)?;
        }
        Ok(())
    }
}
