//! Terminal renderer
//!
//! Diffs each state against what has already been written, so streamed
//! assistant text appears as it arrives and nothing is printed twice.

pub mod markdown;

use crate::runtime::Renderer;
use crate::transcript::{ChatState, Message, MessageKind};
use crossterm::style::{Color, Stylize};
use serde_json::Value;
use std::collections::HashSet;
use std::io::Write;

pub use markdown::format_content;

const PREVIEW_CHARS: usize = 60;
const FENCE: &str = "```";

/// What has been written for one transcript position
#[derive(Debug, Clone, Copy)]
struct Printed {
    kind: MessageKind,
    /// Bytes of streamed text already written
    text_len: usize,
    /// Still receiving fragments when last drawn
    open: bool,
    /// Nothing of the current streamed line has been written yet
    line_start: bool,
    in_fence: bool,
}

impl Printed {
    fn sealed(kind: MessageKind, text_len: usize) -> Self {
        Self {
            kind,
            text_len,
            open: false,
            line_start: true,
            in_fence: false,
        }
    }
}

pub struct TerminalRenderer<W: Write + Send> {
    out: W,
    color: bool,
    printed: Vec<Printed>,
    expanded: HashSet<usize>,
    typing_shown: bool,
    /// The cursor sits at the end of a streamed line
    mid_line: bool,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            printed: Vec::new(),
            expanded: HashSet::new(),
            typing_shown: false,
            mid_line: false,
        }
    }

    #[cfg(test)]
    fn output(&self) -> &W {
        &self.out
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dark_grey().italic().to_string()
        } else {
            text.to_string()
        }
    }

    fn end_line(&mut self, buf: &mut String) {
        if self.mid_line {
            buf.push('\n');
            self.mid_line = false;
        }
    }

    fn header(&self, kind: MessageKind) -> String {
        let color = match kind {
            MessageKind::User => Color::Green,
            MessageKind::Assistant => Color::Blue,
            MessageKind::ToolCall | MessageKind::ToolResult => Color::Yellow,
            MessageKind::Error => Color::Red,
            MessageKind::System => Color::DarkGrey,
        };
        let label = match kind {
            MessageKind::ToolCall | MessageKind::ToolResult => "tool",
            other => other.as_str(),
        };
        self.paint(&format!("{label}:"), color)
    }

    /// A whole message as a block of lines
    fn block(&self, index: usize, message: &Message) -> String {
        let header = self.header(message.kind());
        match message {
            Message::User(text)
            | Message::Assistant(text)
            | Message::Error(text)
            | Message::System(text) => {
                format!("{header} {}\n", format_content(text, self.color))
            }
            Message::ToolCall(call) => {
                let mut block = format!(
                    "{header} {} ({}) {}\n",
                    call.name,
                    call.id,
                    self.dim(&format!("[{index}] running"))
                );
                if self.expanded.contains(&index) {
                    block.push_str(&labelled_json("args", &call.args));
                } else {
                    block.push_str(&self.dim(&format!(
                        "  args: {}  (/expand {index})\n",
                        preview(&call.args)
                    )));
                }
                block
            }
            Message::ToolResult(result) => {
                let mut block = format!(
                    "{header} {} ({}) {}\n",
                    result.name,
                    result.id,
                    self.dim(&format!("[{index}] done"))
                );
                if self.expanded.contains(&index) {
                    block.push_str(&labelled_json("args", &result.args));
                    block.push_str(&labelled_json("results", &result.results));
                } else {
                    block.push_str(&self.dim(&format!(
                        "  results: {}  (/expand {index})\n",
                        preview(&result.results)
                    )));
                }
                block
            }
        }
    }

    /// Write the unwritten tail of a streamed message.
    ///
    /// Prose goes out as it arrives. Lines that may open a code fence, and
    /// every line inside one, are held until complete so they can be
    /// formatted like a sealed message.
    fn stream(&mut self, index: usize, text: &str, sealed: bool, buf: &mut String) {
        let Some(mut printed) = self.printed.get(index).copied() else {
            return;
        };

        while let Some(rest) = text.get(printed.text_len..).filter(|rest| !rest.is_empty()) {
            let (line, terminated) = match rest.find('\n') {
                Some(end) => (rest.get(..end).unwrap_or_default(), true),
                None => (rest, false),
            };
            let held = printed.in_fence || (printed.line_start && could_open_fence(line));
            if held && !terminated && !sealed {
                break;
            }
            printed.text_len += line.len() + usize::from(terminated);

            if held && line.trim_start().starts_with(FENCE) {
                // fence markers themselves are never shown
                printed.in_fence = !printed.in_fence;
                if printed.in_fence {
                    self.end_line(buf);
                }
                printed.line_start = true;
                continue;
            }

            let shown = if printed.in_fence {
                markdown::format_code_line(line, self.color)
            } else if held {
                markdown::format_inline(line, self.color)
            } else {
                line.to_string()
            };
            buf.push_str(&shown);
            self.mid_line = !terminated;
            if terminated {
                buf.push('\n');
            }
            printed.line_start = terminated;
        }

        self.printed[index] = printed;
    }

    fn write(&mut self, buf: &str) {
        if buf.is_empty() {
            return;
        }
        let result = self
            .out
            .write_all(buf.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn render(&mut self, state: &ChatState) {
        let mut buf = String::new();
        let transcript = state.transcript();

        if transcript.len() < self.printed.len() {
            self.end_line(&mut buf);
            buf.push_str(&self.dim("── conversation cleared ──"));
            buf.push('\n');
            self.printed.clear();
            self.expanded.clear();
            self.typing_shown = false;
        }

        for (index, message) in transcript.iter().enumerate() {
            let open = state.has_open_assistant() && index + 1 == transcript.len();

            match self.printed.get(index).copied() {
                None => {
                    self.end_line(&mut buf);
                    if open {
                        buf.push_str(&self.header(MessageKind::Assistant));
                        buf.push(' ');
                        self.mid_line = true;
                        self.printed.push(Printed {
                            open: true,
                            ..Printed::sealed(MessageKind::Assistant, 0)
                        });
                        self.stream(index, message.text().unwrap_or_default(), false, &mut buf);
                    } else {
                        buf.push_str(&self.block(index, message));
                        self.printed.push(Printed::sealed(
                            message.kind(),
                            message.text().map_or(0, str::len),
                        ));
                    }
                }
                Some(printed) if printed.open => {
                    self.stream(index, message.text().unwrap_or_default(), !open, &mut buf);
                    if !open {
                        self.end_line(&mut buf);
                        self.printed[index].open = false;
                    }
                }
                Some(printed) if printed.kind != message.kind() => {
                    // a tool call converted in place
                    self.end_line(&mut buf);
                    buf.push_str(&self.block(index, message));
                    self.printed[index].kind = message.kind();
                }
                Some(_) => {}
            }
        }

        if state.is_typing() && !self.typing_shown && !state.has_open_assistant() {
            self.end_line(&mut buf);
            buf.push_str(&self.dim("Assistant is typing..."));
            buf.push('\n');
        }
        self.typing_shown = state.is_typing();

        self.write(&buf);
    }

    fn toggle_expanded(&mut self, index: usize, state: &ChatState) {
        let mut buf = String::new();
        self.end_line(&mut buf);

        match state.transcript().get(index) {
            Some(message @ (Message::ToolCall(_) | Message::ToolResult(_))) => {
                if !self.expanded.remove(&index) {
                    self.expanded.insert(index);
                }
                buf.push_str(&self.block(index, message));
            }
            _ => {
                buf.push_str(&self.dim(&format!("no tool payload at [{index}]")));
                buf.push('\n');
            }
        }

        self.write(&buf);
    }
}

/// The line so far is, or may still grow into, a code fence
fn could_open_fence(line: &str) -> bool {
    FENCE.starts_with(line) || line.starts_with(FENCE)
}

/// Compact single-line rendering of a payload
fn preview(value: &Value) -> String {
    let compact = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let mut chars = compact.chars();
    let mut short: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        short.push('…');
    }
    short
}

/// Pretty JSON under a label, indented. Strings holding JSON are unpacked.
fn labelled_json(label: &str, value: &Value) -> String {
    let parsed;
    let value = match value {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(inner) if inner.is_object() || inner.is_array() => {
                parsed = inner;
                &parsed
            }
            _ => value,
        },
        other => other,
    };
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());

    let mut out = format!("  {label}:\n");
    for line in pretty.lines() {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
    out
}
