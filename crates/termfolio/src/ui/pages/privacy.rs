//! Privacy page: tracking choice and aggregate visitor statistics.

use ratatui::layout::Alignment;
use ratatui::text::{Line, Span};

use super::{cursor_mark, title, NO_CURSOR};
use crate::storage::CountryStats;
use crate::ui::content::SOURCE_LINK;
use crate::ui::pad;
use crate::ui::theme::ThemeStyles;
use crate::version;

const LABEL_WIDTH: usize = 10;
const DESC_WIDTH: usize = 30;
const COUNTRY_WIDTH: usize = 18;

/// Tracking options; index 0 tracks, index 1 opts out.
pub const OPTIONS: [(&str, &str); 2] = [("Yes", "Allow visit tracking"), ("No", "Do not track")];

/// Help line shown under the page.
pub const HELP: &str = "↑/↓: select • enter: confirm • esc/backspace: menu • q: quit";

/// What the Privacy page shows.
#[derive(Debug, Clone, Copy)]
pub struct PrivacyView<'a> {
    /// Selected option.
    pub cursor: usize,
    /// The visitor is currently tracked.
    pub tracking_enabled: bool,
    /// A store and the visitor's address are known.
    pub tracking_available: bool,
    /// Country statistics, when a GeoLite2 database is configured.
    pub stats: Option<&'a Result<CountryStats, String>>,
}

/// Render the privacy page.
#[must_use]
pub fn render(styles: &ThemeStyles, view: &PrivacyView<'_>, theme_label: &str) -> Vec<Line<'static>> {
    let mut lines = title(styles, "Privacy");
    lines.push(Line::styled(version::APP_DESC, styles.content));
    lines.push(Line::styled(
        format!("Version: v{}", version::version_string()),
        styles.subtle,
    ));
    lines.push(Line::styled(format!("Source: {SOURCE_LINK}"), styles.subtle));
    lines.push(Line::default());

    if view.tracking_available {
        lines.push(Line::styled("Choose whether your IP is tracked.", styles.content));
        lines.push(Line::default());
        for (i, (label, desc)) in OPTIONS.iter().enumerate() {
            let selected = i == view.cursor;
            let (left_style, right_style) = if selected {
                (styles.selected, styles.selected_faint())
            } else {
                (styles.menu, styles.subtle)
            };
            lines.push(Line::from(vec![
                Span::raw(NO_CURSOR),
                Span::styled(
                    pad(&format!("{}{label}", cursor_mark(selected)), LABEL_WIDTH, Alignment::Left),
                    left_style,
                ),
                Span::styled(pad(desc, DESC_WIDTH, Alignment::Left), right_style),
            ]));
        }
        let current = if view.tracking_enabled { "Yes" } else { "No" };
        lines.push(Line::styled(format!("Current: {current}"), styles.subtle));
    } else {
        lines.push(Line::styled("Tracking is disabled on this server.", styles.content));
    }

    if let Some(stats) = view.stats {
        lines.push(Line::default());
        lines.extend(title(styles, "Stats"));
        match stats {
            Err(reason) => {
                lines.push(Line::styled(format!("Unavailable: {reason}"), styles.subtle));
            }
            Ok(stats) => {
                lines.push(Line::styled(
                    format!("Total unique visitors: {}", stats.total_visitors),
                    styles.content,
                ));
                if stats.top_countries.is_empty() {
                    lines.push(Line::styled("Top 5 countries: N/A", styles.subtle));
                } else {
                    lines.push(Line::styled("Top 5 countries:", styles.content));
                    for (i, country) in stats.top_countries.iter().enumerate() {
                        lines.push(Line::styled(
                            format!(
                                "{}. {} {}",
                                i + 1,
                                pad(&country.name, COUNTRY_WIDTH, Alignment::Left),
                                country.visitors
                            ),
                            styles.content,
                        ));
                    }
                }
            }
        }
    }

    lines.push(Line::default());
    lines.push(Line::styled(format!("{HELP} • {theme_label}"), styles.help));
    lines
}
