//! Bundled fallback puzzles.
//!
//! Used whenever the remote feed is unreachable, malformed, or serves a
//! puzzle that was already sent. Archive puzzles bypass the ledger, so the
//! same entry may be sent more than once.

use crate::puzzle::record::{PuzzleRecord, Side};
use rand::seq::SliceRandom;

/// Board renderer used for archive images unless configured otherwise.
pub const DEFAULT_IMAGE_BASE: &str = "https://lichess1.org/export/fen.gif";

/// One bundled puzzle.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveEntry {
    pub title: &'static str,
    pub turn: Side,
    pub fen: &'static str,
}

impl ArchiveEntry {
    /// Rendered board image for this entry's position, served by `image_base`.
    pub fn image_url(&self, image_base: &str) -> String {
        format!(
            "{}?fen={}&theme=blue&piece=merida",
            image_base.trim_end_matches('?'),
            self.fen.replace(' ', "%20")
        )
    }

    pub fn to_record(&self, image_base: &str) -> PuzzleRecord {
        PuzzleRecord {
            puzzle_id: None,
            image: Some(self.image_url(image_base)),
            title: Some(self.title.to_owned()),
            side_to_move: Some(self.turn),
            fen: Some(self.fen.to_owned()),
            solution: None,
            url: None,
        }
    }

    /// Returns `true` if `record` was produced from this entry.
    pub fn matches(&self, record: &PuzzleRecord) -> bool {
        record.title.as_deref() == Some(self.title) && record.fen.as_deref() == Some(self.fen)
    }
}

pub static PUZZLE_ARCHIVE: [ArchiveEntry; 5] = [
    ArchiveEntry {
        title: "The Opera Game Mate (Paul Morphy)",
        turn: Side::White,
        fen: "4kb1r/p2n1ppp/4q3/4p1B1/4P3/8/PPP2PPP/2KR4 w k - 0 1",
    },
    ArchiveEntry {
        title: "Queen Sacrifice (Byrne vs. Fischer, 1956)",
        turn: Side::Black,
        fen: "rnbqk2r/ppp2ppp/3b4/3p4/3Pn3/3B1N2/PPP2PPP/RNBQ1RK1 b kq - 0 7",
    },
    ArchiveEntry {
        title: "Knight Fork Tactics",
        turn: Side::White,
        fen: "r3k2r/ppp2ppp/2n5/3q4/8/2N5/PPP2PPP/R3K2R w KQkq - 0 1",
    },
    ArchiveEntry {
        title: "Back Rank Mate Pattern",
        turn: Side::White,
        fen: "2kr3r/ppp2ppp/2n5/3q4/8/2N5/PPP2PPP/R4RK1 w - - 0 1",
    },
    ArchiveEntry {
        title: "Greek Gift Sacrifice",
        turn: Side::White,
        fen: "r1bq1rk1/pppn1ppp/4pn2/3p4/3P4/2NBPN2/PPPQ1PPP/R3K2R w KQ - 0 8",
    },
];

/// Pick one archive puzzle uniformly at random, with its board image
/// rendered by `image_base`.
pub fn random_archive_puzzle(image_base: &str) -> PuzzleRecord {
    let entry = PUZZLE_ARCHIVE
        .choose(&mut rand::thread_rng())
        .unwrap_or(&PUZZLE_ARCHIVE[0]);
    entry.to_record(image_base)
}

/// Returns `true` if `record` is one of the bundled archive puzzles.
pub fn is_archive_puzzle(record: &PuzzleRecord) -> bool {
    PUZZLE_ARCHIVE.iter().any(|entry| entry.matches(record))
}
