//! Projects page: a list that expands the selected project.

use ratatui::text::{Line, Span};

use super::{cursor_mark, help, title, with_scheme, BROWSE_HELP};
use crate::ui::content::PROJECTS;
use crate::ui::theme::ThemeStyles;

const INDENT: &str = "    ";

/// Number of projects.
#[must_use]
pub fn count() -> usize {
    PROJECTS.len()
}

/// Render the projects page.
#[must_use]
pub fn render(styles: &ThemeStyles, cursor: usize, theme_label: &str) -> Vec<Line<'static>> {
    let mut lines = title(styles, "Projects");

    for (i, project) in PROJECTS.iter().enumerate() {
        let selected = i == cursor;
        let name = format!("{}{}", cursor_mark(selected), project.name);
        lines.push(Line::styled(
            name,
            if selected { styles.project_name } else { styles.menu },
        ));

        if selected {
            lines.push(Line::styled(format!("{INDENT}{}", project.desc), styles.subtle));
            lines.push(Line::from(vec![
                Span::raw(INDENT),
                Span::styled(project.tech, styles.tech),
            ]));
            lines.push(Line::from(vec![
                Span::raw(INDENT),
                Span::styled(with_scheme(project.link), styles.link()),
            ]));
        }
        lines.push(Line::default());
    }

    lines.pop();
    lines.extend(help(styles, format!("{theme_label} • {BROWSE_HELP}")));
    lines
}
