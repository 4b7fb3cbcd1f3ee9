//! About page with the scrambling typewriter effect.
//!
//! Two counters drive the page. `reveal` is how many characters have been
//! typed; `scramble` is the animation clock. A word that is still being
//! typed shows random glyphs. Once its last character is typed it settles
//! into the real text from left to right over [`settle_duration`] ticks.

use std::sync::OnceLock;

use ratatui::style::Modifier;
use ratatui::text::{Line, Span};

use super::{help, title, BACK_HELP};
use crate::ui::content::{about_text, Emphasis, ABOUT};
use crate::ui::styled_lines;
use crate::ui::theme::ThemeStyles;

/// Glyphs shown while a word scrambles.
pub const SCRAMBLE_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()-_=+[]{}|;:'\",.<>?/~";

/// Minimum ticks a word takes to settle.
const MIN_SETTLE_TICKS: usize = 8;

fn about_chars() -> &'static [char] {
    static CHARS: OnceLock<Vec<char>> = OnceLock::new();
    CHARS.get_or_init(|| about_text().chars().collect())
}

fn alphabet() -> &'static [char] {
    static CHARS: OnceLock<Vec<char>> = OnceLock::new();
    CHARS.get_or_init(|| SCRAMBLE_ALPHABET.chars().collect())
}

fn is_space(ch: char) -> bool {
    matches!(ch, ' ' | '\n' | '\r' | '\t')
}

/// Number of characters in the about text.
#[must_use]
pub fn rune_count() -> usize {
    about_chars().len()
}

/// Ticks a word of `word_len` characters takes to settle.
#[must_use]
pub fn settle_duration(word_len: usize) -> usize {
    if word_len == 0 {
        0
    } else {
        word_len.max(MIN_SETTLE_TICKS)
    }
}

/// Ticks the animation runs past the full reveal, so the last word settles.
#[must_use]
pub fn settle_ticks() -> usize {
    let chars = about_chars();
    let last_word = chars
        .iter()
        .rev()
        .skip_while(|c| is_space(**c))
        .take_while(|c| !is_space(**c))
        .count();
    settle_duration(last_word)
}

/// Characters of a `word_len` word shown unscrambled after
/// `ticks_since_complete` ticks.
#[must_use]
pub fn settled_chars(word_len: usize, ticks_since_complete: usize) -> usize {
    let duration = settle_duration(word_len);
    if duration == 0 || ticks_since_complete == 0 {
        return 0;
    }
    if ticks_since_complete >= duration {
        return word_len;
    }
    // floor(ticks / (duration / word_len)) without floating point.
    (ticks_since_complete * word_len / duration).min(word_len)
}

/// Scramble glyph for position `index` at `tick`.
#[must_use]
pub fn scramble_rune(tick: usize, index: usize) -> char {
    let alphabet = alphabet();
    let value = (tick as u64)
        .wrapping_mul(1_103_515_245)
        .wrapping_add((index as u64).wrapping_mul(12_345))
        .wrapping_add(12_345);
    #[allow(clippy::cast_possible_truncation)]
    let slot = (value % alphabet.len() as u64) as usize;
    alphabet[slot]
}

/// Whether the whole text is typed and every word has settled.
#[must_use]
pub fn is_settled(reveal: usize, scramble: usize) -> bool {
    let total = rune_count();
    reveal >= total && scramble >= total + settle_ticks()
}

/// The first `count` characters as currently displayed.
#[must_use]
pub fn visible(count: usize, scramble: usize) -> String {
    let chars = about_chars();
    let total = chars.len();
    let count = count.min(total);
    if count == 0 {
        return String::new();
    }
    if is_settled(count, scramble) {
        return chars.iter().collect();
    }

    let mut out = String::with_capacity(count * 2);
    let mut i = 0;
    while i < count {
        if is_space(chars[i]) {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let word_start = i;
        let word_end = chars[i..]
            .iter()
            .position(|c| is_space(*c))
            .map_or(total, |offset| i + offset);
        let visible_end = word_end.min(count);

        let settled = if count < word_end {
            0
        } else {
            settled_chars(word_end - word_start, scramble.saturating_sub(word_end))
        };
        for j in word_start..visible_end {
            if j - word_start < settled {
                out.push(chars[j]);
            } else {
                out.push(scramble_rune(scramble, j));
            }
        }
        i = visible_end;
    }
    out
}

/// The settled text with its emphasis.
fn styled(styles: &ThemeStyles) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();

    for (emphasis, text) in ABOUT {
        let style = match emphasis {
            Emphasis::Normal => styles.content,
            Emphasis::Bold => styles.content.add_modifier(Modifier::BOLD),
            Emphasis::Italic => styles.content.add_modifier(Modifier::ITALIC),
            Emphasis::Link => styles.link(),
        };
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            if !first.is_empty() {
                current.push(Span::styled(first.to_string(), style));
            }
        }
        for part in parts {
            lines.push(Line::from(std::mem::take(&mut current)));
            if !part.is_empty() {
                current.push(Span::styled(part.to_string(), style));
            }
        }
    }
    lines.push(Line::from(current));
    lines
}

/// Render the about page.
#[must_use]
pub fn render(
    styles: &ThemeStyles,
    reveal: usize,
    scramble: usize,
    theme_label: &str,
) -> Vec<Line<'static>> {
    let mut lines = title(styles, "About Me");
    if is_settled(reveal, scramble) {
        lines.extend(styled(styles));
    } else {
        lines.extend(styled_lines(&visible(reveal, scramble), styles.content));
    }
    lines.extend(help(styles, format!("{theme_label} • {BACK_HELP}")));
    lines
}
