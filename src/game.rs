use tracing::debug;

use crate::board::Board;
use crate::color::Color;
use crate::error::ChessError;
use crate::movegen::pseudo_legal_moves;
use crate::outcome::GameOutcome;
use crate::pieces::{Piece, PieceType};
use crate::position::{BOARD_SIZE, Position};
use crate::r#move::Move;

/// Column the king starts on.
const KING_HOME_COL: usize = 5;

/// A game of chess: the board, whose turn it is, and whether the game has
/// ended.
///
/// `over` and `winner` are only changed by the rules engine's callers. The
/// engine reports checkmate and stalemate through queries, and outside events
/// such as a resignation are recorded through the setters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Game {
    board: Board,
    side_to_move: Color,
    over: bool,
    winner: Option<Color>,
}

impl Game {
    /// Standard starting position, White to move.
    pub fn new() -> Self {
        Self::with_board(Board::standard(), Color::White)
    }

    pub fn with_board(board: Board, side_to_move: Color) -> Self {
        Game {
            board,
            side_to_move,
            over: false,
            winner: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn set_over(&mut self, over: bool) {
        self.over = over;
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn set_winner(&mut self, winner: Option<Color>) {
        self.winner = winner;
    }

    /// Ends the game with `color` resigning; the opponent wins.
    pub fn resign(&mut self, color: Color) {
        self.over = true;
        self.winner = Some(color.opposite());
    }

    /// Legal moves of the piece on `src`, whichever side it belongs to.
    /// Empty if the square is empty or off the board.
    pub fn valid_moves(&self, src: &Position) -> Vec<Move> {
        let Some(piece) = self.board.piece_at(src) else {
            return Vec::new();
        };

        let mut moves: Vec<Move> = pseudo_legal_moves(&self.board, src)
            .into_iter()
            .filter(|mv| !self.leaves_king_in_check(mv, piece.color))
            .collect();

        if piece.piece_type == PieceType::King {
            moves.extend(self.castle_moves(src, &piece));
        }

        moves
    }

    /// Legal moves of every piece of the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.board
            .positions(self.side_to_move)
            .iter()
            .flat_map(|pos| self.valid_moves(pos))
            .collect()
    }

    /// Plays `mv` for the side to move.
    ///
    /// Fails with [`ChessError::InvalidMove`] and leaves the game untouched if
    /// there is no piece of the side to move on the start square or the move is
    /// not one of that piece's [`Game::valid_moves`].
    pub fn make_move(&mut self, mv: &Move) -> Result<(), ChessError> {
        let piece = match self.board.piece_at(&mv.start) {
            Some(p) if p.color == self.side_to_move => p,
            _ => {
                debug!(%mv, side_to_move = %self.side_to_move, "rejected move: no piece of the side to move");
                return Err(ChessError::InvalidMove(*mv));
            }
        };

        if !self.valid_moves(&mv.start).contains(mv) {
            debug!(%mv, side_to_move = %self.side_to_move, "rejected move: not legal");
            return Err(ChessError::InvalidMove(*mv));
        }

        play_on(&mut self.board, mv);
        self.side_to_move = self.side_to_move.opposite();

        // A pawn of the side now moving that was capturable en passant had
        // its one chance on the ply just played.
        for pos in self.board.positions(self.side_to_move) {
            if let Some(p) = self.board.get_piece_mut(&pos) {
                p.set_en_passant_eligible(false);
            }
        }

        debug!(%mv, piece = ?piece.piece_type, color = %piece.color, "move applied");
        Ok(())
    }

    /// Whether any piece of the opposing color attacks `color`'s king.
    ///
    /// # Panics
    ///
    /// Panics if `color` has no king on the board.
    pub fn is_in_check(&self, color: Color) -> bool {
        king_in_check(&self.board, color)
    }

    /// True only when it is `color`'s turn, `color` is in check and has no
    /// legal move.
    pub fn is_in_checkmate(&self, color: Color) -> bool {
        color == self.side_to_move && self.is_in_check(color) && !self.has_legal_move(color)
    }

    /// True only when it is `color`'s turn, `color` is not in check and has no
    /// legal move.
    pub fn is_in_stalemate(&self, color: Color) -> bool {
        color == self.side_to_move && !self.is_in_check(color) && !self.has_legal_move(color)
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        let side = self.side_to_move;

        if self.over {
            return Some(match self.winner {
                Some(color) => GameOutcome::win_for(color),
                None if self.is_in_stalemate(side) => GameOutcome::Stalemate,
                None => GameOutcome::Draw,
            });
        }

        if self.is_in_checkmate(side) {
            Some(GameOutcome::win_for(side.opposite()))
        } else if self.is_in_stalemate(side) {
            Some(GameOutcome::Stalemate)
        } else {
            None
        }
    }

    fn has_legal_move(&self, color: Color) -> bool {
        self.board
            .positions(color)
            .iter()
            .any(|pos| !self.valid_moves(pos).is_empty())
    }

    fn leaves_king_in_check(&self, mv: &Move, color: Color) -> bool {
        let mut board = self.board;
        play_on(&mut board, mv);
        king_in_check(&board, color)
    }

    /// Castling moves available to the king on `src`.
    ///
    /// Both the king and the rook must be unmoved, every square between them
    /// empty, and the king may not be in check, pass through an attacked
    /// square, or land in check.
    fn castle_moves(&self, src: &Position, king: &Piece) -> Vec<Move> {
        let row = king.color.back_rank();
        if *src != Position::new(row, KING_HOME_COL) || king.has_moved() {
            return Vec::new();
        }

        if king_in_check(&self.board, king.color) {
            return Vec::new();
        }

        let mut moves = Vec::new();

        for (rook_col, step) in [(BOARD_SIZE, 1), (1, -1)] {
            let rook_pos = Position::new(row, rook_col);
            let rook_ready = self.board.get_piece(&rook_pos).is_some_and(|rook| {
                rook.piece_type == PieceType::Rook && rook.color == king.color && !rook.has_moved()
            });
            if !rook_ready {
                continue;
            }

            let (low, high) = (rook_col.min(KING_HOME_COL), rook_col.max(KING_HOME_COL));
            let path_clear = (low + 1..high).all(|col| self.board.get_piece(&Position::new(row, col)).is_none());
            if !path_clear {
                continue;
            }

            let (Some(crossed), Some(dst)) = (src.offset(0, step), src.offset(0, 2 * step)) else {
                continue;
            };

            if self.leaves_king_in_check(&Move::new(*src, crossed), king.color) {
                continue;
            }

            let castle = Move::new(*src, dst);
            if !self.leaves_king_in_check(&castle, king.color) {
                moves.push(castle);
            }
        }

        moves
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Game(side_to_move: {}, is_over: {}, winner: {:?})\n{}",
            self.side_to_move, self.over, self.winner, self.board
        )
    }
}

/// # Panics
///
/// Panics if `color` has no king on `board`.
fn king_in_check(board: &Board, color: Color) -> bool {
    let Some(king_pos) = board.find_piece(color, PieceType::King) else {
        panic!("no {color} king on the board: check detection needs one king per color");
    };
    is_square_attacked(board, &king_pos, color.opposite())
}

fn is_square_attacked(board: &Board, square: &Position, by_color: Color) -> bool {
    board
        .positions(by_color)
        .iter()
        .any(|pos| pseudo_legal_moves(board, pos).iter().any(|mv| mv.end == *square))
}

/// Applies every board effect of `mv`: en passant victim removal, the rook
/// hop of a castle, promotion and the moved-piece flags. Legality is the
/// caller's concern.
fn play_on(board: &mut Board, mv: &Move) {
    let Some(mut piece) = board.get_piece(&mv.start) else {
        return;
    };

    let col_delta = mv.end.col as i32 - mv.start.col as i32;
    let row_delta = mv.end.row as i32 - mv.start.row as i32;

    if piece.piece_type == PieceType::Pawn && col_delta != 0 && board.get_piece(&mv.end).is_none() {
        board.remove_piece(&Position::new(mv.start.row, mv.end.col));
    }

    if piece.piece_type == PieceType::King && col_delta.abs() == 2 {
        let rook_col = if col_delta > 0 { BOARD_SIZE } else { 1 };
        let rook_from = Position::new(mv.start.row, rook_col);
        let rook_to = Position::new(mv.start.row, (mv.start.col + mv.end.col) / 2);
        if let Some(mut rook) = board.remove_piece(&rook_from) {
            rook.set_has_moved(true);
            board.add_piece(&rook_to, rook);
        }
    }

    if let Some(promotion) = mv.promotion {
        piece = Piece::new(piece.color, promotion);
    }
    piece.set_has_moved(true);
    piece.set_en_passant_eligible(piece.piece_type == PieceType::Pawn && row_delta.abs() == 2);

    board.remove_piece(&mv.start);
    board.add_piece(&mv.end, piece);
}
