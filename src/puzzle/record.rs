//! Puzzle record and side-to-move types.

use serde::{Deserialize, Serialize};

/// Side to move in a chess position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl Side {
    /// Derive the side to move from a FEN string.
    ///
    /// The second whitespace-delimited field decides: `w` is White, anything
    /// else (including a missing field) is Black.
    pub fn from_fen(fen: &str) -> Self {
        match fen.split_whitespace().nth(1) {
            Some("w") => Self::White,
            _ => Self::Black,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::White => write!(f, "White"),
            Self::Black => write!(f, "Black"),
        }
    }
}

/// A single puzzle ready for captioning and delivery.
///
/// Produced either by the remote feed or by the bundled archive and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleRecord {
    /// Feed-provided identifier, when the feed has one.
    pub puzzle_id: Option<String>,
    /// Image URL rendering the position.
    pub image: Option<String>,
    pub title: Option<String>,
    /// Explicit side to move (archive entries carry one).
    pub side_to_move: Option<Side>,
    /// Position in Forsyth-Edwards Notation.
    pub fen: Option<String>,
    /// Solution moves in play order.
    pub solution: Option<Vec<String>>,
    /// Link to the puzzle on its source site.
    pub url: Option<String>,
}

impl PuzzleRecord {
    /// Identifier used for deduplication: the feed ID, else the title.
    ///
    /// Returns `None` when neither is present (or both are blank); such a
    /// record is always treated as novel.
    pub fn identifier(&self) -> Option<&str> {
        non_blank(self.puzzle_id.as_deref()).or_else(|| non_blank(self.title.as_deref()))
    }

    /// Side to move, derived from the FEN when present.
    pub fn turn(&self) -> Option<Side> {
        match &self.fen {
            Some(fen) => Some(Side::from_fen(fen)),
            None => self.side_to_move,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn side_from_fen_white() {
        assert_eq!(Side::from_fen("8/8/8/8/8/8/8/K6k w - - 0 1"), Side::White);
    }

    #[test]
    fn side_from_fen_other_tokens_are_black() {
        assert_eq!(Side::from_fen("8/8/8/8/8/8/8/K6k b - - 0 1"), Side::Black);
        assert_eq!(Side::from_fen("8/8/8/8/8/8/8/K6k W - - 0 1"), Side::Black);
        assert_eq!(Side::from_fen("8/8/8/8/8/8/8/K6k"), Side::Black);
    }

    #[test]
    fn identifier_prefers_puzzle_id() {
        let record = PuzzleRecord {
            puzzle_id: Some("p1".to_owned()),
            title: Some("Test".to_owned()),
            ..Default::default()
        };
        assert_eq!(record.identifier(), Some("p1"));
    }

    #[test]
    fn identifier_falls_back_to_title() {
        let record = PuzzleRecord {
            puzzle_id: Some("  ".to_owned()),
            title: Some("Test".to_owned()),
            ..Default::default()
        };
        assert_eq!(record.identifier(), Some("Test"));
    }

    #[test]
    fn identifier_absent_when_no_id_or_title() {
        assert_eq!(PuzzleRecord::default().identifier(), None);
    }

    #[test]
    fn turn_prefers_fen_over_explicit_side() {
        let record = PuzzleRecord {
            side_to_move: Some(Side::White),
            fen: Some("8/8/8/8/8/8/8/K6k b - - 0 1".to_owned()),
            ..Default::default()
        };
        assert_eq!(record.turn(), Some(Side::Black));
    }
}
