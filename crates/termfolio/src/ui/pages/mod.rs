//! Page renderers.
//!
//! Each page is a pure function from state to styled lines. Layout beyond
//! the page body (the centered box, wrapping, the splash rain) is done by
//! [`App::render`](super::App::render).

pub mod about;
pub mod contact;
pub mod education;
pub mod feed;
pub mod menu;
pub mod privacy;
pub mod projects;
pub mod splash;

use ratatui::text::{Line, Span};

use super::theme::{theme_at, ThemeStyles};

/// Marker in front of the selected row.
pub const CURSOR: &str = "→ ";
/// Marker in front of unselected rows.
pub const NO_CURSOR: &str = "  ";

/// Help text shared by the pages that only go back.
pub const BACK_HELP: &str = "esc: back to menu";
/// Help text for the browsable list pages.
pub const BROWSE_HELP: &str = "↑/↓: browse • esc: back to menu";

/// Cursor marker for row `index`.
#[must_use]
pub fn cursor_mark(selected: bool) -> &'static str {
    if selected {
        CURSOR
    } else {
        NO_CURSOR
    }
}

/// `t: theme (<name>)` for the current palette.
#[must_use]
pub fn theme_label(theme_index: usize) -> String {
    format!("t: theme ({})", theme_at(theme_index).name)
}

/// Page heading followed by a blank line.
#[must_use]
pub fn title(styles: &ThemeStyles, text: &str) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(format!("━━━ {text} ━━━"), styles.title)),
        Line::default(),
    ]
}

/// Blank line followed by a help line.
#[must_use]
pub fn help(styles: &ThemeStyles, text: String) -> Vec<Line<'static>> {
    vec![Line::default(), Line::styled(text, styles.help)]
}

/// Prefix `link` with `https://` unless it already has a scheme.
#[must_use]
pub fn with_scheme(link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!("https://{link}")
    }
}
