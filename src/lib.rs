//! Puzzlebot: scheduled chess-puzzle delivery.
//!
//! Twice a day (by default) the bot fetches a puzzle, renders a caption,
//! and sends the board image to a messaging recipient:
//! Scheduler → Puzzle source → (Caption, Board image) → Dispatcher → cleanup
//!
//! # Architecture
//!
//! - **Puzzle source**: remote feed with a bundled archive as fallback,
//!   deduplicated through an append-only ledger of sent puzzle IDs
//! - **Caption**: pure formatting of a puzzle record and timestamp
//! - **Board image**: streamed download with a static fallback image
//! - **Channels**: pluggable dispatchers (WhatsApp Cloud API, dry run)
//! - **Scheduler**: minute-resolution polling loop over daily run times

pub mod board_image;
pub mod caption;
pub mod channels;
pub mod config;
pub mod error;
pub mod job;
pub mod puzzle;
pub mod scheduler;

pub use config::BotConfig;
pub use error::{BotError, Result};
pub use job::{DeliveryStatus, JobReport, PuzzleJob};
pub use puzzle::{PuzzleRecord, PuzzleResolution, PuzzleSource};
pub use scheduler::Scheduler;
