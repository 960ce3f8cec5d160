use crate::color::Color;
use bitflags::bitflags;
use std::hash::{Hash, Hasher};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PieceType {
    King,
    Queen,
    Bishop,
    Knight,
    Rook,
    Pawn,
}

impl PieceType {
    /// Piece types a pawn may promote to, in the order promotions are generated.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    pub fn to_char(&self) -> char {
        match self {
            PieceType::King => 'k',
            PieceType::Queen => 'q',
            PieceType::Bishop => 'b',
            PieceType::Knight => 'n',
            PieceType::Rook => 'r',
            PieceType::Pawn => 'p',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        let piece_type = match c.to_ascii_lowercase() {
            'k' => PieceType::King,
            'q' => PieceType::Queen,
            'b' => PieceType::Bishop,
            'n' => PieceType::Knight,
            'r' => PieceType::Rook,
            'p' => PieceType::Pawn,
            _ => return None,
        };
        Some(piece_type)
    }
}

bitflags! {
    /// Per-ply bookkeeping carried by a piece while it sits on the board.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PieceFlags: u8 {
        /// Set on a pawn that advanced two squares on the previous ply.
        const EN_PASSANT_ELIGIBLE = 0b00000001;
        const HAS_MOVED = 0b00000010;
    }
}

/// A piece on the board.
///
/// Equality and hashing only look at color and type; the flags are runtime
/// state of the square's occupant, not part of its identity.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Piece {
    pub color: Color,
    pub piece_type: PieceType,
    pub flags: PieceFlags,
}

impl Piece {
    pub fn new(color: Color, piece_type: PieceType) -> Self {
        Piece {
            color,
            piece_type,
            flags: PieceFlags::empty(),
        }
    }

    pub fn is_en_passant_eligible(&self) -> bool {
        self.flags.contains(PieceFlags::EN_PASSANT_ELIGIBLE)
    }

    pub fn set_en_passant_eligible(&mut self, eligible: bool) {
        self.flags.set(PieceFlags::EN_PASSANT_ELIGIBLE, eligible);
    }

    pub fn has_moved(&self) -> bool {
        self.flags.contains(PieceFlags::HAS_MOVED)
    }

    pub fn set_has_moved(&mut self, moved: bool) {
        self.flags.set(PieceFlags::HAS_MOVED, moved);
    }

    pub fn to_char(&self) -> char {
        let c = self.piece_type.to_char();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        PieceType::from_char(c).map(|piece_type| Piece::new(color, piece_type))
    }
}

impl PartialEq for Piece {
    fn eq(&self, other: &Self) -> bool {
        self.color == other.color && self.piece_type == other.piece_type
    }
}

impl Eq for Piece {}

impl Hash for Piece {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.color.hash(state);
        self.piece_type.hash(state);
    }
}
