//! Yank options — the `:set` system.
//!
//! Configuration is written the way Vim users already write it: `:set`
//! directives, either on a command line or one per line in a `yankrc`.
//! This module parses directives and applies them to an [`Options`] value.
//!
//! # Supported syntax
//!
//! | Syntax           | Effect                        |
//! |------------------|-------------------------------|
//! | `set option=V`   | Assign a value                |
//! | `set option?`    | Query current value           |
//! | `set option`     | Query current value           |
//! | `set`            | Show changed options          |
//! | `set all`        | Show all options              |
//!
//! # Option names
//!
//! | Full name    | Abbrev | Type      | Default                   |
//! |--------------|--------|-----------|---------------------------|
//! | `timeoutlen` | `tm`   | ms        | 2000                      |
//! | `inside`     | `is`   | char      | `i`                       |
//! | `around`     | `as`   | char      | `a`                       |
//! | `linekey`    | `lk`   | char      | `s`                       |
//! | `blocktags`  | `bt`   | tag list  | `div,pre,code,td,body`    |

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::delimiter;

/// Elements that bound the flat text view.
pub const DEFAULT_BLOCK_TAGS: [&str; 5] = ["div", "pre", "code", "td", "body"];

/// A parsed `set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `set option?` or a bare `set option` — query the current value.
    Query(String),

    /// `set option=value` — assign a value.
    Assign(String, String),

    /// `set` with no arguments — show changed options.
    ShowChanged,

    /// `set all` — show all options.
    ShowAll,
}

/// Why an option could not be applied.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("unknown option: {0}")]
    Unknown(String),

    #[error("invalid number for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} takes a single character, got {value:?}")]
    InvalidChar { name: &'static str, value: String },

    #[error("key {0:?} is bound to more than one role")]
    KeyCollision(char),

    #[error("not a set command: {0}")]
    UnknownCommand(String),

    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<OptionsError>,
    },

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Resolve a full name or abbreviation to the full option name.
#[must_use]
pub fn canonical_name(name: &str) -> Option<&'static str> {
    match name {
        "timeoutlen" | "tm" => Some("timeoutlen"),
        "inside" | "is" => Some("inside"),
        "around" | "as" => Some("around"),
        "linekey" | "lk" => Some("linekey"),
        "blocktags" | "bt" => Some("blocktags"),
        _ => None,
    }
}

/// Returns `true` if `name` is any known option.
#[must_use]
pub fn is_known_option(name: &str) -> bool {
    canonical_name(name).is_some()
}

/// Parse the full `set` arguments string into directives.
///
/// Multiple space-separated arguments are supported
/// (e.g., `set tm=500 inside=I`). An empty string produces
/// [`SetDirective::ShowChanged`].
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single `set` argument into a directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }

    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    let name = arg.strip_suffix('?').unwrap_or(arg);
    SetDirective::Query(name.to_string())
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Every tunable of a chord machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// How long a pending selector waits for its delimiter key.
    pub timeout: Duration,
    /// Selector key for inside (delimiters excluded).
    pub inside: char,
    /// Selector key for around (delimiters included).
    pub around: char,
    /// Delimiter key that yanks the whole flat text view.
    pub line_key: char,
    /// Lowercase element names that bound the flat text view.
    pub block_tags: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(2000),
            inside: 'i',
            around: 'a',
            line_key: 's',
            block_tags: DEFAULT_BLOCK_TAGS.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

impl Options {
    /// Apply a `set` argument string, returning any display output
    /// (query answers, `set all`). Either every directive applies or none does.
    ///
    /// # Errors
    ///
    /// Returns the first [`OptionsError`]; `self` is left untouched.
    pub fn set(&mut self, args: &str) -> Result<Vec<String>, OptionsError> {
        let mut next = self.clone();
        let mut output = Vec::new();
        for directive in parse_set(args) {
            if let Some(line) = next.apply(&directive)? {
                output.push(line);
            }
        }
        next.validate()?;
        *self = next;
        Ok(output)
    }

    /// Apply one directive. Does not validate key collisions; [`set`](Self::set) does.
    ///
    /// # Errors
    ///
    /// Unknown option names and malformed values.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>, OptionsError> {
        match directive {
            SetDirective::Query(name) => {
                let name = canonical_name(name).ok_or_else(|| OptionsError::Unknown(name.clone()))?;
                Ok(Some(self.format(name)))
            }
            SetDirective::Assign(name, value) => {
                let name = canonical_name(name).ok_or_else(|| OptionsError::Unknown(name.clone()))?;
                self.assign(name, value)?;
                Ok(None)
            }
            SetDirective::ShowChanged => {
                let defaults = Self::default();
                let changed: Vec<String> = ALL_OPTIONS
                    .iter()
                    .filter(|name| self.format(name) != defaults.format(name))
                    .map(|name| self.format(name))
                    .collect();
                Ok(Some(changed.join(" ")))
            }
            SetDirective::ShowAll => {
                let all: Vec<String> = ALL_OPTIONS.iter().map(|name| self.format(name)).collect();
                Ok(Some(all.join(" ")))
            }
        }
    }

    fn assign(&mut self, name: &'static str, value: &str) -> Result<(), OptionsError> {
        match name {
            "timeoutlen" => {
                let ms: u64 = value.parse().map_err(|_| OptionsError::InvalidNumber {
                    name,
                    value: value.to_string(),
                })?;
                self.timeout = Duration::from_millis(ms);
            }
            "inside" => self.inside = single_char(name, value)?,
            "around" => self.around = single_char(name, value)?,
            "linekey" => self.line_key = single_char(name, value)?,
            "blocktags" => {
                self.block_tags = value
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_ascii_lowercase)
                    .collect();
            }
            _ => return Err(OptionsError::Unknown(name.to_string())),
        }
        Ok(())
    }

    /// Format one option as `name=value`.
    fn format(&self, name: &str) -> String {
        match name {
            "timeoutlen" => format!("timeoutlen={}", self.timeout.as_millis()),
            "inside" => format!("inside={}", self.inside),
            "around" => format!("around={}", self.around),
            "linekey" => format!("linekey={}", self.line_key),
            "blocktags" => format!("blocktags={}", self.block_tags.join(",")),
            _ => String::new(),
        }
    }

    /// The selector and line keys must all be distinct, and none of them
    /// may be a delimiter character.
    ///
    /// # Errors
    ///
    /// [`OptionsError::KeyCollision`] naming the shared key.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if let Some(&ch) = [self.inside, self.around, self.line_key]
            .iter()
            .find(|&&ch| delimiter::is_pair_char(ch))
        {
            return Err(OptionsError::KeyCollision(ch));
        }
        if self.inside == self.around || self.line_key == self.inside {
            return Err(OptionsError::KeyCollision(self.inside));
        }
        if self.line_key == self.around {
            return Err(OptionsError::KeyCollision(self.around));
        }
        Ok(())
    }

    /// True if `tag` (any case) bounds the flat text view.
    #[must_use]
    pub fn is_block_tag(&self, tag: &str) -> bool {
        self.block_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Parse a `yankrc`: one `set ...` per line, `"` comments, blank lines.
    ///
    /// # Errors
    ///
    /// The first bad line, wrapped in [`OptionsError::AtLine`].
    pub fn from_rc(contents: &str) -> Result<Self, OptionsError> {
        let mut options = Self::default();
        for (idx, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('"') {
                continue;
            }
            let at_line = |source| OptionsError::AtLine {
                line: idx + 1,
                source: Box::new(source),
            };
            let (command, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            if command != "set" && command != "se" {
                return Err(at_line(OptionsError::UnknownCommand(command.to_string())));
            }
            options.set(args).map_err(at_line)?;
        }
        Ok(options)
    }

    /// Read and parse a `yankrc` from disk.
    ///
    /// # Errors
    ///
    /// I/O failures and any [`from_rc`](Self::from_rc) error.
    pub fn load(path: &Path) -> Result<Self, OptionsError> {
        let contents = fs::read_to_string(path).map_err(|source| OptionsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_rc(&contents)
    }
}

const ALL_OPTIONS: [&str; 5] = ["timeoutlen", "inside", "around", "linekey", "blocktags"];

fn single_char(name: &'static str, value: &str) -> Result<char, OptionsError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if !ch.is_whitespace() => Ok(ch),
        _ => Err(OptionsError::InvalidChar {
            name,
            value: value.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
