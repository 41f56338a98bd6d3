//! Failure kinds for a yank.
//!
//! Every variant is handled the same way by the chord machine: logged, then
//! the machine resets to idle. Nothing here ever reaches the end user.

use thiserror::Error;

/// Why a chord did not produce a yank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YankError {
    /// The second key of the chord names no known delimiter.
    #[error("invalid character for yank: {0}")]
    InvalidDelimiter(String),

    /// The scan ran off both ends of the text without finding the pair.
    #[error("no enclosing {left}{right} pair around the selection")]
    BoundaryNotFound { left: char, right: char },

    /// The clipboard sink rejected the write.
    #[error("clipboard write failed: {0}")]
    ClipboardWriteFailed(String),

    /// The host reported no selection to search around.
    #[error("no selection to yank around")]
    NoSelection,
}
