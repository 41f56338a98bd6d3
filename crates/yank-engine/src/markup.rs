//! A small tag-soup loader that turns HTML-ish markup into a [`Document`].
//!
//! Enough of HTML to reproduce how a page fragments its text:
//!
//! - start and end tags, attributes skipped (quoted `>` is allowed)
//! - void elements (`<br>`, `<img>`, ...) and `<x/>` never take children
//! - `<!-- comments -->`, `<!DOCTYPE>` and `<?...?>` declarations
//! - `&amp;` `&lt;` `&gt;` `&quot;` `&apos;` `&nbsp;` and `&#NN;` / `&#xHH;`
//! - `<script>` and `<style>` bodies are kept as raw text
//!
//! The document root is always `body`; `<html>` and `<body>` tags in the
//! input are absorbed into it. An end tag closes every element up to the
//! nearest open one with the same name. An end tag with no open match is
//! dropped. A `<` that cannot start a tag is literal text.

use thiserror::Error;

use crate::document::{Document, NodeId};

const ROOT_TAG: &str = "body";

/// Tags that stand for the root itself.
const ROOT_ALIASES: [&str; 2] = ["html", "body"];

const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Longest entity name looked for after `&`.
const MAX_ENTITY_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("unterminated tag at byte {0}")]
    UnterminatedTag(usize),
    #[error("unterminated comment at byte {0}")]
    UnterminatedComment(usize),
}

/// Parse `input` into a document rooted at `body`.
///
/// # Errors
///
/// [`MarkupError`] for a tag or comment that never closes.
pub fn parse(input: &str) -> Result<Document, MarkupError> {
    let mut doc = Document::new(ROOT_TAG);
    let mut open: Vec<(NodeId, String)> = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let tail = &input[pos..];
        let parent = open.last().map_or(doc.root(), |(id, _)| *id);

        if let Some(body) = tail.strip_prefix("<!--") {
            let end = body.find("-->").ok_or(MarkupError::UnterminatedComment(pos))?;
            doc.append_comment(parent, &body[..end]);
            pos += "<!--".len() + end + "-->".len();
            continue;
        }

        if !starts_tag(tail) {
            let end = next_tag(tail);
            doc.append_text(parent, &decode_entities(&tail[..end]));
            pos += end;
            continue;
        }

        let close = tag_end(tail).ok_or(MarkupError::UnterminatedTag(pos))?;
        let inner = &tail[1..close];
        pos += close + 1;

        if inner.starts_with(['!', '?']) {
            continue;
        }
        if let Some(name) = inner.strip_prefix('/') {
            close_element(&mut open, &tag_name(name));
            continue;
        }

        let name = tag_name(inner);
        if ROOT_ALIASES.contains(&name.as_str()) {
            continue;
        }
        let element = doc.append_element(parent, &name);

        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            let rest = &input[pos..];
            let end = find_end_tag(rest, &name).unwrap_or(rest.len());
            if end > 0 {
                doc.append_text(element, &rest[..end]);
            }
            pos += end;
            if pos < input.len() {
                let close = tag_end(&input[pos..]).ok_or(MarkupError::UnterminatedTag(pos))?;
                pos += close + 1;
            }
            continue;
        }

        let self_closing = inner.trim_end().ends_with('/');
        if !self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
            open.push((element, name));
        }
    }

    Ok(doc)
}

/// True when `tail` opens a tag, comment or declaration.
fn starts_tag(tail: &str) -> bool {
    let mut chars = tail.chars();
    chars.next() == Some('<')
        && chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

/// Byte length of the text run at the start of `tail`.
fn next_tag(tail: &str) -> usize {
    tail.char_indices()
        .skip(1)
        .find(|&(i, c)| c == '<' && starts_tag(&tail[i..]))
        .map_or(tail.len(), |(i, _)| i)
}

/// Index of the `>` closing the tag at the start of `tail`, skipping
/// quoted attribute values.
fn tag_end(tail: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in tail.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(i),
            None => {}
        }
    }
    None
}

/// Lowercased tag name at the start of a tag body.
fn tag_name(inner: &str) -> String {
    inner
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | ':'))
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Byte index of `</name` in `text`, any case.
fn find_end_tag(text: &str, name: &str) -> Option<usize> {
    let needle = format!("</{name}");
    text.to_ascii_lowercase().find(&needle)
}

/// Pop open elements up to and including the nearest `name`.
fn close_element(open: &mut Vec<(NodeId, String)>, name: &str) {
    if let Some(at) = open.iter().rposition(|(_, tag)| tag == name) {
        open.truncate(at);
    }
}

/// Replace character references. Unknown references stay literal.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi <= MAX_ENTITY_LEN)
            .and_then(|semi| decode_entity(&after[..semi]).map(|ch| (semi, ch)));
        if let Some((semi, ch)) = decoded {
            out.push(ch);
            rest = &after[semi + 1..];
        } else {
            out.push('&');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
