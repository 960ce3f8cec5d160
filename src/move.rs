use crate::error::ChessError;
use crate::pieces::PieceType;
use crate::position::Position;
use std::fmt;

/// A move from one square to another. `promotion` is only set for pawn moves
/// onto the last rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    pub start: Position,
    pub end: Position,
    pub promotion: Option<PieceType>,
}

impl Move {
    pub fn new(start: Position, end: Position) -> Self {
        Move {
            start,
            end,
            promotion: None,
        }
    }

    pub fn with_promotion(start: Position, end: Position, promotion: PieceType) -> Self {
        Move {
            start,
            end,
            promotion: Some(promotion),
        }
    }

    /// Parses long algebraic notation such as `e2e4` or `e7e8q`.
    pub fn from_lan(lan: &str) -> Result<Self, ChessError> {
        if !lan.is_ascii() || !(4..=5).contains(&lan.len()) {
            return Err(ChessError::InvalidNotation(lan.to_string()));
        }

        let start = Position::from_algebraic(&lan[0..2])?;
        let end = Position::from_algebraic(&lan[2..4])?;

        let promotion = match lan[4..].chars().next() {
            None => None,
            Some(c) => match PieceType::from_char(c) {
                Some(piece_type) if PieceType::PROMOTIONS.contains(&piece_type) => Some(piece_type),
                _ => return Err(ChessError::InvalidNotation(lan.to_string())),
            },
        };

        Ok(Move {
            start,
            end,
            promotion,
        })
    }

    pub fn to_lan(&self) -> String {
        let mut lan = format!("{}{}", self.start.to_algebraic(), self.end.to_algebraic());
        if let Some(promotion) = self.promotion {
            lan.push(promotion.to_char());
        }
        lan
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_lan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_move_from_lan() {
        let mv = Move::from_lan("e2e4").expect("valid move notation");
        assert_eq!(mv, Move::new(Position::new(2, 5), Position::new(4, 5)));

        let mv = Move::from_lan("a7a8n").expect("valid promotion notation");
        assert_eq!(
            mv,
            Move::with_promotion(Position::new(7, 1), Position::new(8, 1), PieceType::Knight)
        );
    }

    #[rstest]
    #[case("e2e4")]
    #[case("h7h8q")]
    #[case("b2b1r")]
    fn test_move_to_lan(#[case] lan: &str) {
        let mv = Move::from_lan(lan).expect("valid move notation");
        assert_eq!(mv.to_lan(), lan);
        assert_eq!(mv.to_string(), lan);
    }

    #[rstest]
    #[case("e2")]
    #[case("e2e9")]
    #[case("e7e8k")]
    #[case("e7e8p")]
    #[case("e7e8qq")]
    #[case("é2e4")]
    fn test_move_from_lan_invalid(#[case] lan: &str) {
        assert!(Move::from_lan(lan).is_err());
    }

    #[test]
    fn test_promotion_is_part_of_equality() {
        let start = Position::new(7, 1);
        let end = Position::new(8, 1);
        assert_ne!(
            Move::with_promotion(start, end, PieceType::Queen),
            Move::with_promotion(start, end, PieceType::Rook)
        );
        assert_ne!(Move::new(start, end), Move::with_promotion(start, end, PieceType::Queen));
    }
}
