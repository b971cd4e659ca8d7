//! Markdown-lite formatting for terminal output
//!
//! Understands fenced code blocks, inline code, `**bold**` and `*italic*`.
//! Code regions are never touched by the inline rules.

use crossterm::style::Stylize;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static FENCED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(\w+)?\n([\s\S]*?)\n```").expect("fenced code regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("inline code regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("bold regex"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("italic regex"));

const CODE_INDENT: &str = "    ";

/// Format message text for the terminal.
///
/// Without color, fenced blocks are still set off by indentation and the
/// inline markers are left as written.
pub fn format_content(text: &str, color: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in FENCED.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if let Some(prose) = text.get(last..whole.start()) {
            out.push_str(&format_inline(prose, color));
        }
        out.push_str(&format_code_block(caps.get(2).map_or("", |m| m.as_str()), color));
        last = whole.end();
    }
    if let Some(rest) = text.get(last..) {
        out.push_str(&format_inline(rest, color));
    }
    out
}

fn format_code_block(code: &str, color: bool) -> String {
    code.lines()
        .map(|line| format_code_line(line, color))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line from inside a fenced block
pub(super) fn format_code_line(line: &str, color: bool) -> String {
    let indented = format!("{CODE_INDENT}{line}");
    if color {
        indented.cyan().to_string()
    } else {
        indented
    }
}

/// Inline rules, applied outside inline code spans
pub(super) fn format_inline(text: &str, color: bool) -> String {
    if !color {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in INLINE_CODE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if let Some(prose) = text.get(last..whole.start()) {
            out.push_str(&emphasis(prose));
        }
        out.push_str(&caps[1].cyan().to_string());
        last = whole.end();
    }
    if let Some(rest) = text.get(last..) {
        out.push_str(&emphasis(rest));
    }
    out
}

fn emphasis(text: &str) -> String {
    let bolded = BOLD.replace_all(text, |caps: &Captures| caps[1].bold().to_string());
    ITALIC
        .replace_all(&bolded, |caps: &Captures| caps[1].italic().to_string())
        .into_owned()
}
