//! The chord state machine — selector key, then delimiter key, then yank.
//!
//! ```text
//!              selector key                 any key
//!   Idle ─────────────────────→ Awaiting ─────────────→ Idle (yank or error)
//!     ↑                            │
//!     └──────── timeout ───────────┘
//! ```
//!
//! Every event first passes the guard: a caret selection, a held Ctrl, a
//! pure modifier key, or a repeat/release event is dropped before it can
//! touch the state.
//!
//! Entering `Awaiting` bumps an epoch and queues a reset timer tagged with
//! it. Arming drops timers from earlier epochs, which can never fire, so at
//! most one timer is queued. [`ChordMachine::tick`] fires due timers, and a
//! timer only resets the machine when it is still awaiting under the same
//! epoch, so a timer left over from a completed chord is a no-op.
//!
//! Time is always passed in by the host, which keeps the machine free of
//! clocks and threads.

use std::time::Instant;

use yank_input::{KeyCode, KeyEvent, KeyEventKind};

use crate::clipboard::ClipboardSink;
use crate::delimiter::{self, Selector};
use crate::document::DocumentTree;
use crate::error::YankError;
use crate::flatten::flatten;
use crate::options::Options;
use crate::search::search;
use crate::selection::Selection;

/// Where the machine is in a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChordState {
    #[default]
    Idle,
    /// A selector was typed; the next key is the delimiter.
    AwaitingDelimiter,
}

/// The chord typed so far. Empty outside `AwaitingDelimiter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingCommand {
    pub selector: Option<Selector>,
    pub delimiter: Option<KeyCode>,
}

impl PendingCommand {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.selector.is_none() && self.delimiter.is_none()
    }
}

/// What one key event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Dropped by the guard. State untouched.
    Suppressed,
    /// Not part of a chord. State untouched.
    Ignored,
    /// A selector started a chord.
    Armed(Selector),
    /// The chord completed and this text went to the clipboard.
    Yanked(String),
    /// The chord completed with an error. The machine is idle again.
    Failed(YankError),
}

impl KeyOutcome {
    /// True when the event belonged to a chord.
    #[must_use]
    pub const fn consumed(&self) -> bool {
        matches!(self, Self::Armed(_) | Self::Yanked(_) | Self::Failed(_))
    }
}

/// A queued reset, tagged with the epoch it was armed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResetTimer {
    epoch: u64,
    deadline: Instant,
}

/// One chord machine per host. Owns its options and clipboard sink.
pub struct ChordMachine<C> {
    options: Options,
    clipboard: C,
    state: ChordState,
    pending: PendingCommand,
    epoch: u64,
    timers: Vec<ResetTimer>,
    last_yank: Option<String>,
}

impl<C: ClipboardSink> ChordMachine<C> {
    #[must_use]
    pub const fn new(options: Options, clipboard: C) -> Self {
        Self {
            options,
            clipboard,
            state: ChordState::Idle,
            pending: PendingCommand {
                selector: None,
                delimiter: None,
            },
            epoch: 0,
            timers: Vec::new(),
            last_yank: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ChordState {
        self.state
    }

    #[must_use]
    pub const fn pending(&self) -> &PendingCommand {
        &self.pending
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Options change between chords; a pending chord keeps its selector.
    pub const fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    #[must_use]
    pub const fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub const fn clipboard_mut(&mut self) -> &mut C {
        &mut self.clipboard
    }

    /// The most recent successful yank.
    #[must_use]
    pub fn last_yank(&self) -> Option<&str> {
        self.last_yank.as_deref()
    }

    /// The earliest queued timer, stale or not. Hosts sleep until then.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.deadline).min()
    }

    /// Drop any pending chord. Queued timers become stale.
    pub fn reset(&mut self) {
        self.state = ChordState::Idle;
        self.pending = PendingCommand::default();
    }

    /// True when the guard drops `key` under `selection`.
    fn is_suppressed<N: Copy>(key: &KeyEvent, selection: Option<&Selection<N>>) -> bool {
        key.kind != KeyEventKind::Press
            || key.ctrl()
            || key.code.is_modifier()
            || selection.is_some_and(Selection::is_caret)
    }

    /// Feed one key event.
    ///
    /// `doc` and `selection` are read only when the event completes a
    /// chord. `now` stamps the reset timer when a chord starts.
    pub fn handle_key<D>(
        &mut self,
        key: &KeyEvent,
        doc: &D,
        selection: Option<&Selection<D::NodeId>>,
        now: Instant,
    ) -> KeyOutcome
    where
        D: DocumentTree + ?Sized,
    {
        if Self::is_suppressed(key, selection) {
            return KeyOutcome::Suppressed;
        }

        match (self.state, self.pending.selector) {
            (ChordState::AwaitingDelimiter, Some(selector)) => {
                self.pending.delimiter = Some(key.code);
                let result = self.complete(selector, key.code, doc, selection);
                self.reset();
                match result {
                    Ok(text) => {
                        tracing::info!(target: "textyank::chord", chars = text.chars().count(), "yanked text is {text:?}");
                        self.last_yank = Some(text.clone());
                        KeyOutcome::Yanked(text)
                    }
                    Err(err) => {
                        tracing::error!(target: "textyank::chord", key = %key.code, %err, "yank failed");
                        KeyOutcome::Failed(err)
                    }
                }
            }
            _ => {
                let Some(selector) = key
                    .code
                    .as_char()
                    .and_then(|ch| Selector::from_key(ch, &self.options))
                else {
                    return KeyOutcome::Ignored;
                };
                self.arm(selector, now);
                KeyOutcome::Armed(selector)
            }
        }
    }

    fn arm(&mut self, selector: Selector, now: Instant) {
        self.state = ChordState::AwaitingDelimiter;
        self.pending = PendingCommand {
            selector: Some(selector),
            delimiter: None,
        };
        self.epoch += 1;
        let epoch = self.epoch;
        self.timers.retain(|t| t.epoch == epoch);
        let deadline = now + self.options.timeout;
        self.timers.push(ResetTimer {
            epoch: self.epoch,
            deadline,
        });
        tracing::debug!(target: "textyank::chord", %selector, epoch = self.epoch, "awaiting delimiter");
    }

    /// Resolve, reconstruct, search, copy.
    fn complete<D>(
        &mut self,
        selector: Selector,
        key: KeyCode,
        doc: &D,
        selection: Option<&Selection<D::NodeId>>,
    ) -> Result<String, YankError>
    where
        D: DocumentTree + ?Sized,
    {
        let delimiter = delimiter::resolve(key, &self.options)?;
        let selection = selection.ok_or(YankError::NoSelection)?;

        let flat = flatten(doc, selection.anchor, |tag| self.options.is_block_tag(tag));
        let text = search(&flat, selection.bounds(), delimiter, selector)?;
        self.clipboard.write_text(&text)?;
        Ok(text)
    }

    /// Fire every timer due at `now`. Returns true if one reset the machine.
    pub fn tick(&mut self, now: Instant) -> bool {
        let (due, waiting): (Vec<_>, Vec<_>) = self.timers.drain(..).partition(|t| t.deadline <= now);
        self.timers = waiting;

        let mut fired = false;
        for timer in due {
            if self.state == ChordState::AwaitingDelimiter && timer.epoch == self.epoch {
                tracing::debug!(target: "textyank::chord", epoch = timer.epoch, "chord timed out");
                self.reset();
                fired = true;
            } else {
                tracing::trace!(target: "textyank::chord", epoch = timer.epoch, "stale timer");
            }
        }
        fired
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::document::{Document, NodeId};
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use yank_input::{ModifierKey, parse_keys};

    /// `<body><div>the (<b>quick</b>) "fox" jumps</div></body>`
    fn fixture() -> (Document, NodeId) {
        let mut doc = Document::new("body");
        let div = doc.append_element(doc.root(), "div");
        doc.append_text(div, "the (");
        let b = doc.append_element(div, "b");
        let quick = doc.append_text(b, "quick");
        doc.append_text(div, ") \"fox\" jumps");
        (doc, quick)
    }

    fn machine() -> (ChordMachine<MemoryClipboard>, MemoryClipboard) {
        let clip = MemoryClipboard::new();
        (ChordMachine::new(Options::default(), clip.clone()), clip)
    }

    /// Feed a key script; every key at `now`.
    fn feed(
        m: &mut ChordMachine<MemoryClipboard>,
        doc: &Document,
        sel: Option<&Selection<NodeId>>,
        keys: &str,
        now: Instant,
    ) -> Vec<KeyOutcome> {
        parse_keys(keys)
            .unwrap()
            .iter()
            .map(|k| m.handle_key(k, doc, sel, now))
            .collect()
    }

    fn last(outcomes: Vec<KeyOutcome>) -> KeyOutcome {
        outcomes.into_iter().last().unwrap()
    }

    // ── Yanking ─────────────────────────────────────────────────────────

    #[test]
    fn inside_paren_across_fragments() {
        let (doc, quick) = fixture();
        let (mut m, clip) = machine();
        let sel = Selection::new(quick, 0, 5);
        let now = Instant::now();

        let outcomes = feed(&mut m, &doc, Some(&sel), "i(", now);
        assert_eq!(
            outcomes,
            vec![KeyOutcome::Armed(Selector::Inside), KeyOutcome::Yanked("quick".into())]
        );
        assert_eq!(clip.history(), vec!["quick".to_string()]);
        assert_eq!(m.last_yank(), Some("quick"));
        assert_eq!(m.state(), ChordState::Idle);
        assert!(m.pending().is_empty());
    }

    #[test]
    fn around_paren_with_closing_key() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let sel = Selection::new(quick, 1, 3);
        let out = last(feed(&mut m, &doc, Some(&sel), "a)", Instant::now()));
        assert_eq!(out, KeyOutcome::Yanked("(quick)".into()));
    }

    #[test]
    fn bare_selector_means_double_quotes() {
        let (doc, _) = fixture();
        let (mut m, _) = machine();
        let tail = doc.text_leaves()[2];
        // "fox" sits at local offsets 3..6 of `) "fox" jumps`.
        let sel = Selection::new(tail, 3, 6);
        let out = last(feed(&mut m, &doc, Some(&sel), "ii", Instant::now()));
        assert_eq!(out, KeyOutcome::Yanked("fox".into()));
        let out = last(feed(&mut m, &doc, Some(&sel), "ai", Instant::now()));
        assert_eq!(out, KeyOutcome::Yanked("\"fox\"".into()));
    }

    #[test]
    fn line_key_yanks_whole_block() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let sel = Selection::new(quick, 0, 1);
        let out = last(feed(&mut m, &doc, Some(&sel), "is", Instant::now()));
        assert_eq!(out, KeyOutcome::Yanked("the (quick) \"fox\" jumps".into()));
    }

    #[test]
    fn backward_selection_yanks_same_span() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let sel = Selection::new(quick, 5, 0);
        let out = last(feed(&mut m, &doc, Some(&sel), "i(", Instant::now()));
        assert_eq!(out, KeyOutcome::Yanked("quick".into()));
    }

    #[test]
    fn remapped_selector_keys() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        m.options_mut().set("inside=I").unwrap();
        let sel = Selection::new(quick, 0, 5);
        assert_eq!(feed(&mut m, &doc, Some(&sel), "i", Instant::now()), vec![KeyOutcome::Ignored]);
        let out = last(feed(&mut m, &doc, Some(&sel), "I(", Instant::now()));
        assert_eq!(out, KeyOutcome::Yanked("quick".into()));
    }

    #[test]
    fn closing_bracket_cannot_become_a_selector() {
        let mut doc = Document::new("div");
        let root = doc.root();
        let text = doc.append_text(root, "say \"x (abc) y\"");
        let (mut m, _) = machine();
        assert!(m.options_mut().set("around=)").is_err());
        let sel = Selection::new(text, 8, 9);
        let out = last(feed(&mut m, &doc, Some(&sel), "i)", Instant::now()));
        assert_eq!(out, KeyOutcome::Yanked("abc".into()));
    }

    // ── Failures always reset ───────────────────────────────────────────

    #[test]
    fn invalid_delimiter_resets() {
        let (doc, quick) = fixture();
        let (mut m, clip) = machine();
        let sel = Selection::new(quick, 0, 5);
        let out = last(feed(&mut m, &doc, Some(&sel), "ix", Instant::now()));
        assert_eq!(out, KeyOutcome::Failed(YankError::InvalidDelimiter("x".into())));
        assert_eq!(m.state(), ChordState::Idle);
        assert!(m.pending().is_empty());
        assert!(clip.history().is_empty());
    }

    #[test]
    fn named_key_as_delimiter_fails() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let sel = Selection::new(quick, 0, 5);
        let out = last(feed(&mut m, &doc, Some(&sel), "i<Esc>", Instant::now()));
        assert_eq!(out, KeyOutcome::Failed(YankError::InvalidDelimiter("<Esc>".into())));
        assert_eq!(m.state(), ChordState::Idle);
    }

    #[test]
    fn missing_boundary_resets() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let sel = Selection::new(quick, 0, 5);
        let out = last(feed(&mut m, &doc, Some(&sel), "i[", Instant::now()));
        assert_eq!(
            out,
            KeyOutcome::Failed(YankError::BoundaryNotFound { left: '[', right: ']' })
        );
        assert_eq!(m.state(), ChordState::Idle);
        assert_eq!(m.last_yank(), None);
    }

    #[test]
    fn clipboard_failure_resets() {
        let (doc, quick) = fixture();
        let (mut m, clip) = machine();
        clip.reject_writes("denied");
        let sel = Selection::new(quick, 0, 5);
        let out = last(feed(&mut m, &doc, Some(&sel), "i(", Instant::now()));
        assert_eq!(out, KeyOutcome::Failed(YankError::ClipboardWriteFailed("denied".into())));
        assert_eq!(m.state(), ChordState::Idle);
        assert_eq!(m.last_yank(), None);
    }

    #[test]
    fn no_selection_resets() {
        let (doc, _) = fixture();
        let (mut m, _) = machine();
        let out = last(feed(&mut m, &doc, None, "i(", Instant::now()));
        assert_eq!(out, KeyOutcome::Failed(YankError::NoSelection));
        assert_eq!(m.state(), ChordState::Idle);
    }

    // ── Guard ───────────────────────────────────────────────────────────

    #[test]
    fn caret_selection_is_suppressed() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let caret = Selection::caret(quick, 2);
        assert_eq!(
            feed(&mut m, &doc, Some(&caret), "i(", Instant::now()),
            vec![KeyOutcome::Suppressed, KeyOutcome::Suppressed]
        );
        assert_eq!(m.state(), ChordState::Idle);
    }

    #[test]
    fn caret_while_awaiting_keeps_chord() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let range = Selection::new(quick, 0, 5);
        let caret = Selection::caret(quick, 2);
        let now = Instant::now();
        feed(&mut m, &doc, Some(&range), "i", now);
        assert_eq!(feed(&mut m, &doc, Some(&caret), "(", now), vec![KeyOutcome::Suppressed]);
        assert_eq!(m.state(), ChordState::AwaitingDelimiter);
        assert_eq!(m.pending().selector, Some(Selector::Inside));
    }

    #[test]
    fn ctrl_chords_are_suppressed() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let sel = Selection::new(quick, 0, 5);
        assert_eq!(
            feed(&mut m, &doc, Some(&sel), "<C-i><C-a>", Instant::now()),
            vec![KeyOutcome::Suppressed, KeyOutcome::Suppressed]
        );
        assert_eq!(m.state(), ChordState::Idle);
    }

    #[test]
    fn pure_modifier_between_keys_is_suppressed() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let sel = Selection::new(quick, 0, 5);
        let outcomes = feed(&mut m, &doc, Some(&sel), "i<Shift>(", Instant::now());
        assert_eq!(outcomes[1], KeyOutcome::Suppressed);
        assert_eq!(outcomes[2], KeyOutcome::Yanked("quick".into()));
    }

    #[test]
    fn release_and_repeat_are_suppressed() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let sel = Selection::new(quick, 0, 5);
        let now = Instant::now();
        for kind in [KeyEventKind::Release, KeyEventKind::Repeat] {
            let key = KeyEvent::char('i').with_kind(kind);
            assert_eq!(m.handle_key(&key, &doc, Some(&sel), now), KeyOutcome::Suppressed);
        }
        let shift = KeyEvent::press(KeyCode::Modifier(ModifierKey::Shift));
        assert_eq!(m.handle_key(&shift, &doc, Some(&sel), now), KeyOutcome::Suppressed);
        assert_eq!(m.state(), ChordState::Idle);
    }

    #[test]
    fn ignored_sequences_leave_state_unchanged() {
        let (doc, quick) = fixture();
        let (mut m, clip) = machine();
        let sel = Selection::new(quick, 0, 5);
        let caret = Selection::caret(quick, 0);
        let now = Instant::now();
        for (keys, selection) in [("xyz()", Some(&sel)), ("iaia", Some(&caret)), ("<C-i>s", Some(&sel))] {
            for out in feed(&mut m, &doc, selection, keys, now) {
                assert!(!out.consumed());
            }
            assert_eq!(m.state(), ChordState::Idle);
            assert!(m.pending().is_empty());
        }
        assert!(clip.history().is_empty());
        assert_eq!(m.next_deadline(), None);
    }

    // ── Timeout ─────────────────────────────────────────────────────────

    #[test]
    fn timeout_resets_pending_chord() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let sel = Selection::new(quick, 0, 5);
        let t0 = Instant::now();
        feed(&mut m, &doc, Some(&sel), "i", t0);
        assert_eq!(m.next_deadline(), Some(t0 + Duration::from_secs(2)));

        assert!(!m.tick(t0 + Duration::from_millis(1999)));
        assert_eq!(m.state(), ChordState::AwaitingDelimiter);

        assert!(m.tick(t0 + Duration::from_secs(2)));
        assert_eq!(m.state(), ChordState::Idle);
        assert!(m.pending().is_empty());
        assert_eq!(m.next_deadline(), None);
    }

    #[test]
    fn key_just_before_timeout_completes() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let sel = Selection::new(quick, 0, 5);
        let t0 = Instant::now();
        feed(&mut m, &doc, Some(&sel), "i", t0);
        let just_before = t0 + Duration::from_millis(1999);
        assert!(!m.tick(just_before));
        let out = last(feed(&mut m, &doc, Some(&sel), "(", just_before));
        assert_eq!(out, KeyOutcome::Yanked("quick".into()));
    }

    #[test]
    fn stale_timer_does_not_clear_newer_chord() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let sel = Selection::new(quick, 0, 5);
        let t0 = Instant::now();

        // First chord completes; its timer stays queued until the next arm.
        feed(&mut m, &doc, Some(&sel), "i(", t0);
        // Second chord arms 1.5s later.
        feed(&mut m, &doc, Some(&sel), "a", t0 + Duration::from_millis(1500));

        // The first timer is due but stale.
        assert!(!m.tick(t0 + Duration::from_secs(2)));
        assert_eq!(m.state(), ChordState::AwaitingDelimiter);
        assert_eq!(m.pending().selector, Some(Selector::Around));

        // The second timer fires on schedule.
        assert!(m.tick(t0 + Duration::from_millis(3500)));
        assert_eq!(m.state(), ChordState::Idle);
    }

    #[test]
    fn timer_after_completion_is_harmless() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let sel = Selection::new(quick, 0, 5);
        let t0 = Instant::now();
        feed(&mut m, &doc, Some(&sel), "i(", t0);
        assert!(!m.tick(t0 + Duration::from_secs(10)));
        assert_eq!(m.state(), ChordState::Idle);
        assert_eq!(m.last_yank(), Some("quick"));
    }

    #[test]
    fn repeated_arming_keeps_one_timer() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let sel = Selection::new(quick, 0, 5);
        let t0 = Instant::now();
        for step in 0..50 {
            let now = t0 + Duration::from_millis(step * 10);
            feed(&mut m, &doc, Some(&sel), "i(", now);
            feed(&mut m, &doc, Some(&sel), "a", now);
            m.reset();
        }
        assert_eq!(m.timers.len(), 1);
        assert_eq!(m.next_deadline(), Some(t0 + Duration::from_millis(490) + Duration::from_secs(2)));
    }

    #[test]
    fn configured_timeout() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        m.options_mut().set("tm=500").unwrap();
        let sel = Selection::new(quick, 0, 5);
        let t0 = Instant::now();
        feed(&mut m, &doc, Some(&sel), "i", t0);
        assert!(m.tick(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn explicit_reset() {
        let (doc, quick) = fixture();
        let (mut m, _) = machine();
        let sel = Selection::new(quick, 0, 5);
        let t0 = Instant::now();
        feed(&mut m, &doc, Some(&sel), "a", t0);
        m.reset();
        assert_eq!(m.state(), ChordState::Idle);
        assert!(!m.tick(t0 + Duration::from_secs(2)));
    }
}
