//! Education page: a sliding window over the education timeline.

use ratatui::style::Modifier;
use ratatui::text::{Line, Span};

use super::{cursor_mark, title, BROWSE_HELP};
use crate::ui::content::EDUCATION;
use crate::ui::theme::ThemeStyles;

/// Entries visible at once.
pub const PAGE_SIZE: usize = 3;

const INDENT: &str = "    ";

/// Number of education entries.
#[must_use]
pub fn count() -> usize {
    EDUCATION.len()
}

/// Visible `start..end` for `cursor` over `total` entries.
///
/// The cursor sits on the last visible row once it moves past the first
/// page. A `page_size` of zero shows everything.
#[must_use]
pub fn window(cursor: usize, total: usize, page_size: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if page_size == 0 || total <= page_size {
        return (0, total);
    }
    let cursor = cursor.min(total - 1);
    let start = (cursor + 1).saturating_sub(page_size);
    let end = (start + page_size).min(total);
    (end - page_size, end)
}

/// Render the education page.
#[must_use]
pub fn render(styles: &ThemeStyles, cursor: usize, theme_label: &str) -> Vec<Line<'static>> {
    let mut lines = title(styles, "Education");
    let (start, end) = window(cursor, EDUCATION.len(), PAGE_SIZE);

    for (i, entry) in EDUCATION.iter().enumerate().take(end).skip(start) {
        let selected = i == cursor;
        lines.push(Line::from(vec![
            Span::raw(cursor_mark(selected)),
            Span::styled(entry.role, styles.role),
            Span::raw(" @ "),
            Span::styled(entry.company, styles.company),
        ]));
        lines.push(Line::from(vec![
            Span::raw(INDENT),
            Span::styled(entry.period, styles.period),
        ]));
        if selected {
            lines.push(Line::from(vec![
                Span::raw(INDENT),
                Span::styled(entry.desc, styles.content),
            ]));
            lines.push(Line::from(vec![
                Span::raw(INDENT),
                Span::styled(entry.url, styles.link()),
            ]));
        }
        lines.push(Line::default());
    }

    let help = format!("{theme_label} • {BROWSE_HELP}");
    if end < EDUCATION.len() {
        lines.push(Line::from(vec![
            Span::styled("more below!", styles.accent.add_modifier(Modifier::DIM)),
            Span::styled(format!(" • {help}"), styles.help),
        ]));
    } else {
        lines.push(Line::styled(help, styles.help));
    }
    lines
}
