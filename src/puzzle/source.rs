//! Puzzle resolution: remote feed first, bundled archive as fallback.
//!
//! [`PuzzleSource::resolve`] never fails. Every problem on the remote path
//! (transport, HTTP status, body shape, ledger I/O, or a repeat puzzle) is
//! reported as a [`FallbackReason`] and answered with a random archive entry.

use crate::config::FeedConfig;
use crate::puzzle::archive::random_archive_puzzle;
use crate::puzzle::ledger::PuzzleLedger;
use crate::puzzle::record::PuzzleRecord;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Why the remote puzzle was not used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FallbackReason {
    /// The request never produced a response.
    #[error("feed request failed: {0}")]
    Transport(String),
    /// The feed answered with a non-success status.
    #[error("feed returned HTTP {0}")]
    HttpStatus(u16),
    /// The body was not a puzzle object.
    #[error("feed response malformed: {0}")]
    Malformed(String),
    /// The feed's puzzle has been sent before.
    #[error("puzzle already used: {0}")]
    AlreadyUsed(String),
    /// The ledger could not be read or appended.
    #[error("ledger unavailable: {0}")]
    Ledger(String),
}

/// Where a resolved puzzle came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleOrigin {
    /// Accepted from the remote feed. `id` is what was recorded in the
    /// ledger, if the puzzle had an identifier at all.
    Remote { id: Option<String> },
    /// Picked from the bundled archive.
    Archive { reason: FallbackReason },
}

/// A resolved puzzle plus its provenance.
#[derive(Debug, Clone)]
pub struct PuzzleResolution {
    pub record: PuzzleRecord,
    pub origin: PuzzleOrigin,
}

impl PuzzleResolution {
    pub fn is_remote(&self) -> bool {
        matches!(self.origin, PuzzleOrigin::Remote { .. })
    }
}

/// Wire shape of the feed's puzzle object. Every field is optional.
#[derive(Debug, Deserialize)]
struct FeedPuzzle {
    puzzle_id: Option<FeedId>,
    title: Option<String>,
    fen: Option<String>,
    solution: Option<Vec<String>>,
    url: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedId {
    Text(String),
    Number(i64),
}

impl From<FeedPuzzle> for PuzzleRecord {
    fn from(p: FeedPuzzle) -> Self {
        Self {
            puzzle_id: p.puzzle_id.map(|id| match id {
                FeedId::Text(s) => s,
                FeedId::Number(n) => n.to_string(),
            }),
            image: p.image,
            title: p.title,
            side_to_move: None,
            fen: p.fen,
            solution: p.solution,
            url: p.url,
        }
    }
}

/// Parse a feed body. The puzzle may sit under a `puzzle` key or at the top level.
pub fn parse_feed_body(bytes: &[u8]) -> Result<PuzzleRecord, FallbackReason> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| FallbackReason::Malformed(e.to_string()))?;
    let body = value.get("puzzle").unwrap_or(&value).clone();
    let puzzle: FeedPuzzle =
        serde_json::from_value(body).map_err(|e| FallbackReason::Malformed(e.to_string()))?;
    Ok(puzzle.into())
}

/// Resolves one puzzle per call, deduplicating remote puzzles via a ledger.
pub struct PuzzleSource {
    client: reqwest::Client,
    feed_url: String,
    user_agent: String,
    archive_image_base: String,
    ledger: Arc<dyn PuzzleLedger>,
}

impl PuzzleSource {
    pub fn new(config: &FeedConfig, ledger: Arc<dyn PuzzleLedger>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            feed_url: config.url.clone(),
            user_agent: config.user_agent.clone(),
            archive_image_base: config.archive_image_base.clone(),
            ledger,
        }
    }

    /// Resolve a sendable puzzle. Never fails.
    pub async fn resolve(&self) -> PuzzleResolution {
        match self.resolve_remote().await {
            Ok((record, id)) => {
                info!(
                    "using feed puzzle {}",
                    id.as_deref().unwrap_or("(no identifier)")
                );
                PuzzleResolution {
                    record,
                    origin: PuzzleOrigin::Remote { id },
                }
            }
            Err(reason) => {
                warn!("using archive: {reason}");
                PuzzleResolution {
                    record: random_archive_puzzle(&self.archive_image_base),
                    origin: PuzzleOrigin::Archive { reason },
                }
            }
        }
    }

    async fn resolve_remote(&self) -> Result<(PuzzleRecord, Option<String>), FallbackReason> {
        let record = self.fetch().await?;

        let Some(id) = record.identifier().map(str::to_owned) else {
            debug!("feed puzzle has no identifier, treating as novel");
            return Ok((record, None));
        };

        let used = self
            .ledger
            .contains(&id)
            .map_err(|e| FallbackReason::Ledger(e.to_string()))?;
        if used {
            return Err(FallbackReason::AlreadyUsed(id));
        }

        self.ledger
            .append(&id)
            .map_err(|e| FallbackReason::Ledger(e.to_string()))?;

        Ok((record, Some(id)))
    }

    async fn fetch(&self) -> Result<PuzzleRecord, FallbackReason> {
        debug!("fetching puzzle feed {}", self.feed_url);
        let response = self
            .client
            .get(&self.feed_url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| FallbackReason::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FallbackReason::HttpStatus(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FallbackReason::Transport(e.to_string()))?;
        parse_feed_body(&bytes)
    }
}
