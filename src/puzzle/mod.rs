//! Puzzle records, the bundled archive, the used-puzzle ledger, and the
//! resolver that ties them together.

pub mod archive;
pub mod ledger;
pub mod record;
pub mod source;

pub use ledger::{FileLedger, MemoryLedger, PuzzleLedger, ledger_for};
pub use record::{PuzzleRecord, Side};
pub use source::{FallbackReason, PuzzleOrigin, PuzzleResolution, PuzzleSource};
