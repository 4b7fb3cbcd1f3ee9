//! Splash page: a typed-out welcome line and a blinking cursor.

use ratatui::style::Modifier;
use ratatui::text::{Line, Span};

use crate::ui::content::{SPLASH_NAME, SPLASH_PREFIX, SPLASH_SUFFIX};
use crate::ui::theme::ThemeStyles;

/// Nominal milliseconds per blink step, used to derive the blink phase.
const STEP_MILLIS: usize = 45;
/// Milliseconds the cursor stays on or off.
const BLINK_INTERVAL_MILLIS: usize = 500;

/// The welcome line as plain text.
#[must_use]
pub fn intro_text() -> String {
    format!("{SPLASH_PREFIX}{SPLASH_NAME}{SPLASH_SUFFIX}")
}

/// Number of characters in the welcome line.
#[must_use]
pub fn intro_rune_count() -> usize {
    intro_text().chars().count()
}

/// Whether the block cursor is drawn at `blink_step`.
#[must_use]
pub fn cursor_visible(blink_step: usize) -> bool {
    (blink_step * STEP_MILLIS / BLINK_INTERVAL_MILLIS) % 2 == 0
}

/// Render the splash page with `reveal` characters typed out.
#[must_use]
pub fn render(styles: &ThemeStyles, reveal: usize, blink_step: usize) -> Vec<Line<'static>> {
    let text = intro_text();
    let total = text.chars().count();
    let reveal = reveal.min(total);

    let mut intro: Vec<Span<'static>> = if reveal < total {
        vec![Span::styled(
            text.chars().take(reveal).collect::<String>(),
            styles.content,
        )]
    } else {
        vec![
            Span::styled(SPLASH_PREFIX, styles.content),
            Span::styled(SPLASH_NAME, styles.link()),
            Span::styled(SPLASH_SUFFIX, styles.content),
        ]
    };
    if reveal >= total {
        intro.push(Span::raw(" "));
        intro.push(if cursor_visible(blink_step) {
            Span::styled("█", styles.accent)
        } else {
            Span::raw(" ")
        });
    }

    let faint = styles
        .accent
        .remove_modifier(Modifier::BOLD)
        .add_modifier(Modifier::DIM);

    vec![
        Line::from(intro).centered(),
        Line::from(vec![
            Span::styled("open sourced on ", faint),
            Span::styled("github", styles.link().add_modifier(Modifier::DIM)),
        ])
        .centered(),
        Line::styled("enter: continue", styles.help).centered(),
    ]
}
