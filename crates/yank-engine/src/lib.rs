//! # yank-engine — Text-object yanking for textyank
//!
//! The chord `i(` / `a"` / `is` is a Vim text object aimed at a document
//! instead of a buffer. This crate holds every piece with logic in it:
//!
//! - **[`delimiter`]** — `Selector` (inside/around) and key → delimiter resolution
//! - **[`search`]** — the bidirectional boundary scan over a flat text view
//! - **[`document`]** — the `DocumentTree` accessor trait and an arena `Document`
//! - **[`markup`]** — a small tag-soup loader that builds a `Document`
//! - **[`flatten`]** — scan-root discovery and flat text + offset reconstruction
//! - **[`selection`]** — the host's selection (caret vs range, anchor, offsets)
//! - **[`chord`]** — the two-key state machine with its auto-reset timers
//! - **[`clipboard`]** — clipboard sinks (system with fallback, in-memory)
//! - **[`options`]** — `:set`-style configuration
//! - **[`error`]** — the `YankError` kinds every failure is reported as

pub mod chord;
pub mod clipboard;
pub mod delimiter;
pub mod document;
pub mod error;
pub mod flatten;
pub mod markup;
pub mod options;
pub mod search;
pub mod selection;

pub use chord::{ChordMachine, ChordState, KeyOutcome};
pub use error::YankError;
