use crate::color::Color;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameOutcome {
    WhiteWin,
    BlackWin,
    Stalemate,
    /// The game was ended from outside the rules without a winner.
    Draw,
}

impl GameOutcome {
    pub fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameOutcome::WhiteWin,
            Color::Black => GameOutcome::BlackWin,
        }
    }

    pub fn winner(&self) -> Option<Color> {
        match self {
            GameOutcome::WhiteWin => Some(Color::White),
            GameOutcome::BlackWin => Some(Color::Black),
            _ => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        !matches!(self, GameOutcome::WhiteWin | GameOutcome::BlackWin)
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameOutcome::WhiteWin => "white_win",
            GameOutcome::BlackWin => "black_win",
            GameOutcome::Stalemate => "stalemate",
            GameOutcome::Draw => "draw",
        };
        write!(f, "{}", s)
    }
}
