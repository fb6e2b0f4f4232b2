//! Used-puzzle ledger.
//!
//! Append-only record of puzzle identifiers that have already been sent.
//! Membership is set-based: appending an identifier twice is harmless.

use crate::config::{BotConfig, DispatchBackend};
use crate::error::{BotError, Result};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Store of already-sent puzzle identifiers.
pub trait PuzzleLedger: Send + Sync {
    /// Returns `true` if `id` has been recorded before.
    fn contains(&self, id: &str) -> Result<bool>;

    /// Record `id`. Recorded identifiers are never removed.
    fn append(&self, id: &str) -> Result<()>;
}

/// Ledger for the configured backend.
///
/// Real delivery records into `ledger.path`. A dry run keeps its ledger in
/// memory so that puzzles it only logged stay eligible for a real send.
pub fn ledger_for(config: &BotConfig) -> Arc<dyn PuzzleLedger> {
    match config.dispatch.backend {
        DispatchBackend::Whatsapp => Arc::new(FileLedger::new(&config.ledger.path)),
        DispatchBackend::DryRun => Arc::new(MemoryLedger::new()),
    }
}

/// Ledger backed by a line-delimited text file.
///
/// A missing file reads as an empty ledger. The file is re-read on every
/// membership check so that edits made between runs are honored.
#[derive(Debug, Clone)]
pub struct FileLedger {
    path: PathBuf,
}

impl FileLedger {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every recorded identifier.
    pub fn load(&self) -> Result<HashSet<String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => {
                return Err(BotError::Ledger(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }
}

impl PuzzleLedger for FileLedger {
    fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.load()?.contains(id.trim()))
    }

    fn append(&self, id: &str) -> Result<()> {
        let id = id.trim();
        if id.is_empty() {
            return Err(BotError::Ledger("puzzle id must not be empty".to_owned()));
        }
        if id.contains('\n') {
            return Err(BotError::Ledger(format!("puzzle id spans lines: {id:?}")));
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| BotError::Ledger(format!("failed to create ledger directory: {e}")))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| BotError::Ledger(format!("failed to open ledger: {e}")))?;
        writeln!(file, "{id}").map_err(|e| BotError::Ledger(format!("failed to append id: {e}")))?;
        Ok(())
    }
}

/// In-memory ledger, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    seen: Mutex<HashSet<String>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger pre-seeded with `ids`.
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            seen: Mutex::new(ids.into_iter().map(Into::into).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.seen.lock().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PuzzleLedger for MemoryLedger {
    fn contains(&self, id: &str) -> Result<bool> {
        let seen = self
            .seen
            .lock()
            .map_err(|_| BotError::Ledger("ledger lock poisoned".to_owned()))?;
        Ok(seen.contains(id.trim()))
    }

    fn append(&self, id: &str) -> Result<()> {
        let id = id.trim();
        if id.is_empty() {
            return Err(BotError::Ledger("puzzle id must not be empty".to_owned()));
        }
        self.seen
            .lock()
            .map_err(|_| BotError::Ledger("ledger lock poisoned".to_owned()))?
            .insert(id.to_owned());
        Ok(())
    }
}
