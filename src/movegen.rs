//! Pseudo-legal move generation.
//!
//! Every generator takes the board and the square of a piece of the matching
//! type and returns the moves allowed by that piece's movement, blocking and
//! capture rules. None of them look at whether the mover's own king is left in
//! check; that filtering happens in [`crate::game::Game::valid_moves`].

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::color::Color;
use crate::pieces::{Piece, PieceType};
use crate::position::{BOARD_SIZE, Position};
use crate::r#move::Move;

/// Upper bound on the pseudo-legal moves of a single piece (a centralised
/// queen reaches 27 squares).
pub const MAX_PIECE_MOVES: usize = 32;

pub type MoveList = ArrayVec<Move, MAX_PIECE_MOVES>;

const DIAGONALS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ORTHOGONALS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];
const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Pseudo-legal moves of whatever piece stands on `src`; empty for an empty
/// square.
pub fn pseudo_legal_moves(board: &Board, src: &Position) -> MoveList {
    let Some(piece) = board.get_piece(src) else {
        return MoveList::new();
    };

    match piece.piece_type {
        PieceType::Pawn => pawn_moves(board, src, &piece),
        PieceType::Knight => knight_moves(board, src, &piece),
        PieceType::Bishop => bishop_moves(board, src, &piece),
        PieceType::Rook => rook_moves(board, src, &piece),
        PieceType::Queen => queen_moves(board, src, &piece),
        PieceType::King => king_moves(board, src, &piece),
    }
}

fn is_opponent(board: &Board, pos: &Position, color: Color) -> bool {
    board.get_piece(pos).is_some_and(|p| p.color != color)
}

fn sliding_moves(board: &Board, src: &Position, piece: &Piece, directions: &[(i32, i32)]) -> MoveList {
    let mut moves = MoveList::new();

    for &(row_dir, col_dir) in directions {
        let mut current = *src;

        while let Some(dst) = current.offset(row_dir, col_dir) {
            match board.get_piece(&dst) {
                None => moves.push(Move::new(*src, dst)),
                Some(target) => {
                    if target.color != piece.color {
                        moves.push(Move::new(*src, dst));
                    }
                    break;
                }
            }
            current = dst;
        }
    }

    moves
}

fn step_moves(board: &Board, src: &Position, piece: &Piece, offsets: &[(i32, i32)]) -> MoveList {
    offsets
        .iter()
        .filter_map(|&(d_row, d_col)| src.offset(d_row, d_col))
        .filter(|dst| board.get_piece(dst).is_none_or(|target| target.color != piece.color))
        .map(|dst| Move::new(*src, dst))
        .collect()
}

pub fn bishop_moves(board: &Board, src: &Position, piece: &Piece) -> MoveList {
    sliding_moves(board, src, piece, &DIAGONALS)
}

pub fn rook_moves(board: &Board, src: &Position, piece: &Piece) -> MoveList {
    sliding_moves(board, src, piece, &ORTHOGONALS)
}

pub fn queen_moves(board: &Board, src: &Position, piece: &Piece) -> MoveList {
    let mut moves = rook_moves(board, src, piece);
    moves.extend(bishop_moves(board, src, piece));
    moves
}

pub fn knight_moves(board: &Board, src: &Position, piece: &Piece) -> MoveList {
    step_moves(board, src, piece, &KNIGHT_OFFSETS)
}

/// One-square king moves only. Castling is validated by the game, which
/// needs check detection this module does not have.
pub fn king_moves(board: &Board, src: &Position, piece: &Piece) -> MoveList {
    step_moves(board, src, piece, &KING_OFFSETS)
}

/// Pushes a pawn move, expanded into one move per promotion type when it
/// lands on the last rank.
fn push_pawn_move(moves: &mut MoveList, src: &Position, dst: Position, last_row: usize) {
    if dst.row == last_row {
        for piece_type in PieceType::PROMOTIONS {
            moves.push(Move::with_promotion(*src, dst, piece_type));
        }
    } else {
        moves.push(Move::new(*src, dst));
    }
}

pub fn pawn_moves(board: &Board, src: &Position, piece: &Piece) -> MoveList {
    let mut moves = MoveList::new();

    let direction = piece.color.forward();
    let (start_row, last_row) = match piece.color {
        Color::White => (2, BOARD_SIZE),
        Color::Black => (BOARD_SIZE - 1, 1),
    };

    // Single and double push
    if let Some(one_ahead) = src.offset(direction, 0) {
        if board.get_piece(&one_ahead).is_none() {
            push_pawn_move(&mut moves, src, one_ahead, last_row);

            if src.row == start_row {
                if let Some(two_ahead) = src.offset(2 * direction, 0) {
                    if board.get_piece(&two_ahead).is_none() {
                        moves.push(Move::new(*src, two_ahead));
                    }
                }
            }
        }
    }

    for col_offset in [-1, 1] {
        let Some(diagonal) = src.offset(direction, col_offset) else {
            continue;
        };

        if is_opponent(board, &diagonal, piece.color) {
            push_pawn_move(&mut moves, src, diagonal, last_row);
            continue;
        }

        // En passant: the victim sits beside the pawn, the landing square
        // behind it is empty.
        let beside = src.offset(0, col_offset);
        let victim = beside.and_then(|pos| board.get_piece(&pos));
        if board.get_piece(&diagonal).is_none()
            && victim.is_some_and(|v| {
                v.color != piece.color && v.piece_type == PieceType::Pawn && v.is_en_passant_eligible()
            })
        {
            moves.push(Move::new(*src, diagonal));
        }
    }

    moves
}
