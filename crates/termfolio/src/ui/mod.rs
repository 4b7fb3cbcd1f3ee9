//! Terminal user interface.
//!
//! [`App`] is the per-session page state machine. It never touches the
//! network: the session loop feeds it decoded keys, resizes, animation ticks
//! and feed results, and draws it into a ratatui terminal.

pub mod app;
pub mod content;
pub mod input;
pub mod logo;
pub mod pages;
pub mod rain;
pub mod theme;

pub use app::{Action, App, Page, SessionInfo};
pub use input::{parse_keys, Key};

use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// Width of `text` in terminal cells.
#[must_use]
pub fn text_width(text: &str) -> usize {
    Span::raw(text).width()
}

/// Pad `text` with spaces to `width` cells. Longer text is left as is.
#[must_use]
pub fn pad(text: &str, width: usize, alignment: Alignment) -> String {
    let fill = width.saturating_sub(text_width(text));
    match alignment {
        Alignment::Left => format!("{text}{}", " ".repeat(fill)),
        Alignment::Right => format!("{}{text}", " ".repeat(fill)),
        Alignment::Center => {
            let left = fill / 2;
            format!("{}{text}{}", " ".repeat(left), " ".repeat(fill - left))
        }
    }
}

/// Word-wrap `lines` to `width` cells, keeping styles and alignment.
///
/// Leading whitespace of a wrapped continuation is dropped; words wider than
/// `width` are split.
#[must_use]
pub fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return lines;
    }
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        if line.width() <= width {
            out.push(line);
            continue;
        }
        let alignment = line.alignment;
        let mut wrapper = Wrapper::new(width);
        for span in &line.spans {
            wrapper.push_span(&span.content, span.style);
        }
        out.extend(wrapper.finish().into_iter().map(|mut l| {
            l.alignment = alignment;
            l
        }));
    }
    out
}

struct Wrapper {
    width: usize,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    used: usize,
    continuation: bool,
}

impl Wrapper {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
            current: Vec::new(),
            used: 0,
            continuation: false,
        }
    }

    fn break_line(&mut self) {
        self.lines.push(Line::from(std::mem::take(&mut self.current)));
        self.used = 0;
        self.continuation = true;
    }

    fn push_piece(&mut self, piece: &str, style: Style) {
        self.current.push(Span::styled(piece.to_string(), style));
        self.used += text_width(piece);
    }

    fn push_span(&mut self, text: &str, style: Style) {
        for (is_space, piece) in split_words(text) {
            let w = text_width(piece);
            if is_space {
                if self.used == 0 && self.continuation {
                    continue;
                }
                if self.used + w > self.width {
                    self.break_line();
                    continue;
                }
                self.push_piece(piece, style);
                continue;
            }
            if self.used + w > self.width && self.used > 0 {
                self.break_line();
            }
            if w <= self.width {
                self.push_piece(piece, style);
                continue;
            }
            // Hard split of an over-long word.
            let mut chunk = String::new();
            for ch in piece.chars() {
                let cw = text_width(ch.encode_utf8(&mut [0; 4]));
                if self.used + text_width(&chunk) + cw > self.width {
                    if !chunk.is_empty() {
                        self.push_piece(&chunk, style);
                        chunk.clear();
                    }
                    self.break_line();
                }
                chunk.push(ch);
            }
            if !chunk.is_empty() {
                self.push_piece(&chunk, style);
            }
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if !self.current.is_empty() || self.lines.is_empty() {
            self.lines.push(Line::from(self.current));
        }
        self.lines
    }
}

/// Split `text` into alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> Vec<(bool, &str)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (i, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                pieces.push((prev, &text[start..i]));
                start = i;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if let Some(space) = in_space {
        pieces.push((space, &text[start..]));
    }
    pieces
}

/// Split text containing newlines into lines of one style.
#[must_use]
pub fn styled_lines(text: &str, style: Style) -> Vec<Line<'static>> {
    text.split('\n')
        .map(|l| Line::styled(l.to_string(), style))
        .collect()
}
