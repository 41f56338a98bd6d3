//! Clipboard sinks — where yanked text goes.
//!
//! [`SystemClipboard`] hands text to a background worker thread that owns
//! the platform clipboard, so [`ClipboardSink::write_text`] never blocks
//! keystroke handling. The worker falls back to a platform copy command
//! when the primary clipboard is unavailable or rejects a write.
//!
//! [`MemoryClipboard`] keeps an in-process history for headless hosts and
//! tests.

use std::cell::RefCell;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::rc::Rc;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use crate::error::YankError;

/// Destination for yanked text.
pub trait ClipboardSink {
    /// Hand `text` to the clipboard.
    ///
    /// # Errors
    ///
    /// [`YankError::ClipboardWriteFailed`] when the sink cannot accept it.
    fn write_text(&mut self, text: &str) -> Result<(), YankError>;
}

impl<T: ClipboardSink + ?Sized> ClipboardSink for &mut T {
    fn write_text(&mut self, text: &str) -> Result<(), YankError> {
        (**self).write_text(text)
    }
}

impl<T: ClipboardSink + ?Sized> ClipboardSink for Box<T> {
    fn write_text(&mut self, text: &str) -> Result<(), YankError> {
        (**self).write_text(text)
    }
}

// ---------------------------------------------------------------------------
// Fallback copy commands
// ---------------------------------------------------------------------------

/// A copy program and its arguments. The text is written to its stdin.
pub type CopyCommand = (&'static str, &'static [&'static str]);

#[cfg(target_os = "macos")]
pub const FALLBACK_COMMANDS: &[CopyCommand] = &[("pbcopy", &[])];

#[cfg(windows)]
pub const FALLBACK_COMMANDS: &[CopyCommand] = &[("clip", &[])];

#[cfg(all(unix, not(target_os = "macos")))]
pub const FALLBACK_COMMANDS: &[CopyCommand] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

#[cfg(not(any(unix, windows)))]
pub const FALLBACK_COMMANDS: &[CopyCommand] = &[];

/// Pipe `text` into one copy command and wait for it to exit cleanly.
fn pipe_to(program: &str, args: &[&str], text: &str) -> io::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    // Stdin closes at the end of this statement so the child sees EOF.
    let written = child
        .stdin
        .take()
        .map_or(Ok(()), |mut stdin| stdin.write_all(text.as_bytes()));
    if written.is_err() {
        let _ = child.kill();
    }
    // Always reap, even when the write failed.
    let status = child.wait()?;
    written?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("{program} exited with {status}")))
    }
}

/// Try each command in order; return the name of the first that succeeds.
fn write_fallback(commands: &[CopyCommand], text: &str) -> Result<&'static str, String> {
    for &(program, args) in commands {
        match pipe_to(program, args, text) {
            Ok(()) => return Ok(program),
            Err(err) => {
                tracing::debug!(target: "textyank::clipboard", program, %err, "copy command failed");
            }
        }
    }
    Err("no clipboard command succeeded".to_string())
}

// ---------------------------------------------------------------------------
// System clipboard
// ---------------------------------------------------------------------------

/// The platform clipboard, written from a worker thread.
pub struct SystemClipboard {
    sender: Option<Sender<String>>,
    handle: Option<JoinHandle<()>>,
}

impl SystemClipboard {
    /// Spawn the worker thread with the platform's fallback commands.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn() -> io::Result<Self> {
        Self::with_fallbacks(FALLBACK_COMMANDS)
    }

    /// Spawn the worker thread with an explicit fallback list.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn with_fallbacks(fallbacks: &'static [CopyCommand]) -> io::Result<Self> {
        Self::spawn_worker(fallbacks, true)
    }

    /// Spawn the worker thread without opening the system clipboard; every
    /// write goes straight to `fallbacks`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn commands_only(fallbacks: &'static [CopyCommand]) -> io::Result<Self> {
        Self::spawn_worker(fallbacks, false)
    }

    fn spawn_worker(fallbacks: &'static [CopyCommand], use_primary: bool) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<String>();
        let handle = thread::Builder::new()
            .name("textyank-clipboard".into())
            .spawn(move || {
                let mut primary = if use_primary {
                    match arboard::Clipboard::new() {
                        Ok(clipboard) => Some(clipboard),
                        Err(err) => {
                            tracing::warn!(target: "textyank::clipboard", %err, "system clipboard unavailable");
                            None
                        }
                    }
                } else {
                    None
                };
                for text in rx {
                    Self::deliver(primary.as_mut(), fallbacks, &text);
                }
            })?;

        Ok(Self {
            sender: Some(tx),
            handle: Some(handle),
        })
    }

    /// Write one queued text, primary first.
    fn deliver(primary: Option<&mut arboard::Clipboard>, fallbacks: &[CopyCommand], text: &str) {
        let primary_result = match primary {
            Some(clipboard) => clipboard.set_text(text).map_err(|err| err.to_string()),
            None => Err("system clipboard unavailable".to_string()),
        };
        let result = primary_result.map(|()| "system").or_else(|err| {
            tracing::debug!(target: "textyank::clipboard", %err, "primary write failed, trying commands");
            write_fallback(fallbacks, text)
        });

        match result {
            Ok(channel) => {
                tracing::info!(target: "textyank::clipboard", channel, chars = text.chars().count(), "copied to clipboard");
            }
            Err(err) => {
                tracing::error!(target: "textyank::clipboard", %err, "clipboard write failed");
            }
        }
    }

    /// Stop accepting writes, let the worker drain its queue, and join it.
    ///
    /// Idempotent.
    pub fn shutdown(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), YankError> {
        let stopped = || YankError::ClipboardWriteFailed("clipboard worker has stopped".into());
        self.sender
            .as_ref()
            .ok_or_else(stopped)?
            .send(text.to_string())
            .map_err(|_| stopped())
    }
}

impl Drop for SystemClipboard {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ---------------------------------------------------------------------------
// Memory clipboard
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryState {
    history: Vec<String>,
    reject: Option<String>,
}

/// In-process clipboard. Clones share one history.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every accepted write, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state.borrow().history.clone()
    }

    /// The most recent accepted write.
    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.state.borrow().history.last().cloned()
    }

    /// Fail every following write with `reason`.
    pub fn reject_writes(&self, reason: &str) {
        self.state.borrow_mut().reject = Some(reason.to_string());
    }

    /// Accept writes again.
    pub fn accept_writes(&self) {
        self.state.borrow_mut().reject = None;
    }
}

impl ClipboardSink for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), YankError> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = &state.reject {
            return Err(YankError::ClipboardWriteFailed(reason.clone()));
        }
        state.history.push(text.to_string());
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
