//! Main menu: animated logo, visit count, and page list.

use ratatui::layout::Alignment;
use ratatui::text::{Line, Span};

use super::cursor_mark;
use crate::ui::content::MENU_ITEMS;
use crate::ui::theme::ThemeStyles;
use crate::ui::{logo, pad};

const LEFT_WIDTH: usize = 16;
const RIGHT_WIDTH: usize = 40;

/// Help line shown under the menu.
pub const HELP: &str = "↑/↓: navigate • enter: select • esc/backspace: menu • q: quit";

/// Number of menu entries.
#[must_use]
pub fn item_count() -> usize {
    MENU_ITEMS.len()
}

/// Render the menu.
///
/// `visitor_count` of zero hides the visit line.
#[must_use]
pub fn render(
    styles: &ThemeStyles,
    cursor: usize,
    sweep: usize,
    theme_label: &str,
    visitor_count: usize,
) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = logo::render(sweep, styles.logo_base, styles.logo_snake)
        .into_iter()
        .map(Line::centered)
        .collect();

    lines.push(Line::default());
    lines.push(if visitor_count > 0 {
        Line::styled(format!("Visits: {visitor_count}"), styles.subtle)
    } else {
        Line::default()
    });
    lines.push(Line::default());

    for (i, (label, desc)) in MENU_ITEMS.iter().enumerate() {
        let selected = i == cursor;
        let left = pad(&format!("{}{label}", cursor_mark(selected)), LEFT_WIDTH, Alignment::Left);
        let right = pad(desc, RIGHT_WIDTH, Alignment::Right);
        let (left_style, right_style) = if selected {
            (styles.selected, styles.selected_faint())
        } else {
            (styles.menu, styles.subtle)
        };
        lines.push(Line::from(vec![
            Span::styled(left, left_style),
            Span::styled(right, right_style),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::styled(HELP, styles.help));
    lines.push(Line::styled(theme_label.to_string(), styles.help));
    lines
}
