//! Caption text sent alongside the puzzle image.

use crate::puzzle::PuzzleRecord;
use chrono::{DateTime, TimeZone};
use std::fmt::Write;

/// Title shown when the record has none.
pub const DEFAULT_TITLE: &str = "Daily Challenge";

/// Link shown when the record has no source URL.
pub const DEFAULT_URL: &str = "https://lichess.org/training";

/// Timestamp format, e.g. `Friday, January 05 at 09:00 AM`.
const TIMESTAMP_FORMAT: &str = "%A, %B %d at %I:%M %p";

/// Render the caption for `record` as of `now`.
pub fn format_caption<Tz>(record: &PuzzleRecord, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut caption = format!(
        "♟️ Chess Puzzle ({}) ♟️\n\n",
        now.format(TIMESTAMP_FORMAT)
    );
    let title = record.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let _ = writeln!(caption, "Title: {title}");

    if let Some(side) = record.turn() {
        let _ = writeln!(caption, "Turn: {side}");
    }

    if let Some(solution) = &record.solution {
        let _ = writeln!(caption, "Solution: {}", solution.join(" "));
    }

    let url = record.url.as_deref().unwrap_or(DEFAULT_URL);
    let _ = write!(caption, "URL: {url}");
    caption
}
