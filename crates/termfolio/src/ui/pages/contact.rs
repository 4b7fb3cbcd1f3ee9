//! Contact page: two columns of handles.

use ratatui::layout::Alignment;
use ratatui::text::{Line, Span};

use super::{help, title, BACK_HELP};
use crate::ui::content::{Contact, CONTACTS, SOCIAL};
use crate::ui::pad;
use crate::ui::theme::ThemeStyles;

const COLUMN_WIDTH: usize = 32;
const LABEL_WIDTH: usize = 11;

fn column(
    styles: &ThemeStyles,
    heading: &'static str,
    entries: &[Contact],
) -> Vec<Vec<Span<'static>>> {
    let mut rows = vec![vec![Span::styled(
        pad(heading, COLUMN_WIDTH, Alignment::Left),
        styles.accent,
    )]];
    for entry in entries {
        let label = pad(entry.label, LABEL_WIDTH, Alignment::Left);
        let handle = pad(entry.handle, COLUMN_WIDTH.saturating_sub(LABEL_WIDTH), Alignment::Left);
        rows.push(vec![
            Span::styled(label, styles.content),
            Span::styled(handle, styles.link()),
        ]);
    }
    rows
}

/// Render the contact page.
#[must_use]
pub fn render(styles: &ThemeStyles, theme_label: &str) -> Vec<Line<'static>> {
    let mut lines = title(styles, "Contact");
    lines.push(Line::styled("Feel free to reach out!", styles.content));
    lines.push(Line::default());

    let left = column(styles, "Contacts", &CONTACTS);
    let right = column(styles, "Social", &SOCIAL);
    for i in 0..left.len().max(right.len()) {
        let mut spans = left
            .get(i)
            .cloned()
            .unwrap_or_else(|| vec![Span::raw(" ".repeat(COLUMN_WIDTH))]);
        spans.extend(right.get(i).cloned().unwrap_or_default());
        lines.push(Line::from(spans));
    }

    lines.extend(help(styles, format!("{theme_label} • {BACK_HELP}")));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::theme_at;

    #[test]
    fn test_columns_side_by_side() {
        let styles = ThemeStyles::from(theme_at(0));
        let text: Vec<String> = render(&styles, "t")
            .iter()
            .map(ToString::to_string)
            .collect();

        let header = text.iter().find(|l| l.starts_with("Contacts")).unwrap();
        assert_eq!(header.find("Social"), Some(COLUMN_WIDTH));

        let email = text.iter().find(|l| l.starts_with("Email")).unwrap();
        assert!(email.contains(CONTACTS[0].handle));
        assert!(email.contains(SOCIAL[0].handle));
    }
}
