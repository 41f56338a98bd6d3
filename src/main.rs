// SPDX-License-Identifier: MIT
//
// textyank — Vim-style text-object yanking over fragmented documents.
//
// This is the reference host that wires the two crates together:
//
//   yank-input  → key events and the `<C-x>` notation used to script them
//   yank-engine → document model, chord machine, boundary search, clipboard
//
// One run is one scripted interaction:
//
//   FILE ──→ Document (markup or plain text)
//   LEAF:START:END ──→ Selection inside the LEAF-th text leaf
//   KEYS ──→ parse_keys ──→ ChordMachine::handle_key ──→ clipboard
//
// The last yanked span is printed on stdout. Exit status is 1 for setup
// errors and 2 when the keys yanked nothing.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use yank_engine::clipboard::{ClipboardSink, MemoryClipboard, SystemClipboard};
use yank_engine::document::{Document, DocumentTree, NodeId};
use yank_engine::markup::{self, MarkupError};
use yank_engine::options::{Options, OptionsError};
use yank_engine::selection::Selection;
use yank_engine::{ChordMachine, KeyOutcome};
use yank_input::{KeyEvent, NotationError, parse_keys};

const USAGE: &str = "usage: textyank [--set DIRECTIVES]... [--no-rc] [--no-clipboard] FILE LEAF:START:END KEYS";

/// Simulated gap between scripted keystrokes.
const KEY_INTERVAL: Duration = Duration::from_millis(10);

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{0}")]
    Markup(#[from] MarkupError),
    #[error("{0}")]
    Options(#[from] OptionsError),
    #[error("bad key script: {0}")]
    Notation(#[from] NotationError),
    #[error("leaf {leaf} out of range: the document has {count} text leaves")]
    LeafOutOfRange { leaf: usize, count: usize },
    #[error("offset {offset} past the end of leaf {leaf} ({len} chars)")]
    OffsetOutOfRange { leaf: usize, offset: usize, len: usize },
    #[error("cannot start clipboard worker: {0}")]
    Clipboard(io::Error),
}

// ─── Arguments ──────────────────────────────────────────────────────────────

/// Where the scripted selection sits: a text leaf and two char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SelectionSpec {
    leaf: usize,
    start: usize,
    end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    file: PathBuf,
    selection: SelectionSpec,
    keys: String,
    sets: Vec<String>,
    read_rc: bool,
    use_clipboard: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args, CliError> {
    let mut sets = Vec::new();
    let mut read_rc = true;
    let mut use_clipboard = true;
    let mut positional = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--set" => {
                let value = args
                    .next()
                    .ok_or_else(|| CliError::Usage("--set needs a value".into()))?;
                sets.push(value);
            }
            "--no-rc" => read_rc = false,
            "--no-clipboard" => use_clipboard = false,
            "-h" | "--help" => return Err(CliError::Usage("help requested".into())),
            flag if flag.starts_with("--") => {
                return Err(CliError::Usage(format!("unknown flag {flag}")));
            }
            _ => positional.push(arg),
        }
    }

    let [file, selection, keys]: [String; 3] = positional
        .try_into()
        .map_err(|found: Vec<String>| CliError::Usage(format!("expected 3 arguments, got {}", found.len())))?;

    Ok(Args {
        file: PathBuf::from(file),
        selection: parse_selection(&selection)?,
        keys,
        sets,
        read_rc,
        use_clipboard,
    })
}

/// `LEAF:START:END`, or `LEAF:OFFSET` for a caret.
fn parse_selection(spec: &str) -> Result<SelectionSpec, CliError> {
    let bad = || CliError::Usage(format!("bad selection {spec:?}, expected LEAF:START:END"));
    let numbers = spec
        .split(':')
        .map(|part| part.parse::<usize>().map_err(|_| bad()))
        .collect::<Result<Vec<_>, _>>()?;

    match numbers.as_slice() {
        &[leaf, start, end] => Ok(SelectionSpec { leaf, start, end }),
        &[leaf, offset] => Ok(SelectionSpec {
            leaf,
            start: offset,
            end: offset,
        }),
        _ => Err(bad()),
    }
}

// ─── Setup ──────────────────────────────────────────────────────────────────

/// `$CONFIG_DIR/textyank/yankrc`.
fn rc_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("textyank").join("yankrc"))
}

fn load_options(args: &Args) -> Result<Options, CliError> {
    let mut options = match rc_path().filter(|path| args.read_rc && path.is_file()) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading yankrc");
            Options::load(&path)?
        }
        None => Options::default(),
    };
    for directive in &args.sets {
        for line in options.set(directive)? {
            eprintln!("{line}");
        }
    }
    Ok(options)
}

/// HTML files go through the markup loader, anything else is plain text.
fn load_document(path: &Path) -> Result<Document, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let is_markup = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));

    if is_markup {
        Ok(markup::parse(&contents)?)
    } else {
        Ok(Document::from_plain_text(&contents))
    }
}

/// Turn a leaf index and offsets into a selection, checking both.
fn select(doc: &Document, spec: SelectionSpec) -> Result<Selection<NodeId>, CliError> {
    let leaves = doc.text_leaves();
    let anchor = *leaves.get(spec.leaf).ok_or(CliError::LeafOutOfRange {
        leaf: spec.leaf,
        count: leaves.len(),
    })?;
    let len = doc.leaf_text(anchor).map_or(0, |text| text.chars().count());
    if let Some(offset) = [spec.start, spec.end].into_iter().find(|&o| o > len) {
        return Err(CliError::OffsetOutOfRange {
            leaf: spec.leaf,
            offset,
            len,
        });
    }
    Ok(Selection::new(anchor, spec.start, spec.end))
}

// ─── Driving the machine ────────────────────────────────────────────────────

/// Feed scripted keys one `KEY_INTERVAL` apart, firing timers in between.
fn drive<C: ClipboardSink>(
    machine: &mut ChordMachine<C>,
    doc: &Document,
    selection: &Selection<NodeId>,
    keys: &[KeyEvent],
    start: Instant,
) -> Vec<KeyOutcome> {
    let mut now = start;
    let mut outcomes = Vec::with_capacity(keys.len());
    for key in keys {
        machine.tick(now);
        let outcome = machine.handle_key(key, doc, Some(selection), now);
        tracing::debug!(key = %key.code, ?outcome, "key handled");
        outcomes.push(outcome);
        now += KEY_INTERVAL;
    }
    outcomes
}

fn run(args: &Args) -> Result<Option<String>, CliError> {
    let options = load_options(args)?;
    let doc = load_document(&args.file)?;
    let selection = select(&doc, args.selection)?;
    let keys = parse_keys(&args.keys)?;

    let clipboard: Box<dyn ClipboardSink> = if args.use_clipboard {
        Box::new(SystemClipboard::spawn().map_err(CliError::Clipboard)?)
    } else {
        Box::new(MemoryClipboard::new())
    };

    let mut machine = ChordMachine::new(options, clipboard);
    drive(&mut machine, &doc, &selection, &keys, Instant::now());
    // Dropping the machine drains the clipboard worker.
    Ok(machine.last_yank().map(str::to_string))
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("TEXTYANK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() {
    init_logging();

    let result = parse_args(env::args().skip(1)).and_then(|args| run(&args));
    match result {
        Ok(Some(text)) => println!("{text}"),
        Ok(None) => process::exit(2),
        Err(e) => {
            eprintln!("textyank: {e}");
            if matches!(e, CliError::Usage(_)) {
                eprintln!("{USAGE}");
            }
            process::exit(1);
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
