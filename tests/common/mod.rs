#![allow(dead_code)]

use parlor_chess::board::Board;
use parlor_chess::{Move, Piece, Position};

/// Builds a board from eight rank strings, rank 8 first, `.` for empty.
pub fn board_from_diagram(rows: [&str; 8]) -> Board {
    let mut board = Board::empty();
    for (i, line) in rows.iter().enumerate() {
        for (j, c) in line.chars().enumerate() {
            if let Some(piece) = Piece::from_char(c) {
                board.add_piece(&Position::new(8 - i, j + 1), piece);
            }
        }
    }
    board
}

pub fn sq(s: &str) -> Position {
    Position::from_algebraic(s).expect("valid square notation")
}

pub fn lan(s: &str) -> Move {
    Move::from_lan(s).expect("valid move notation")
}

/// The "Kiwipete" position, White to move, all castling rights intact.
pub fn kiwipete() -> Board {
    board_from_diagram([
        "r...k..r", //
        "p.ppqpb.", //
        "bn..pnp.", //
        "...PN...", //
        ".p..P...", //
        "..N..Q.p", //
        "PPPBBPPP", //
        "R...K..R", //
    ])
}
