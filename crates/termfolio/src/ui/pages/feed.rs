//! Feed page: latest posts in a scrolling window.

use ratatui::layout::Alignment;
use ratatui::text::{Line, Span};

use super::{cursor_mark, help, title, BACK_HELP, BROWSE_HELP};
use crate::feed::FeedItem;
use crate::ui::pad;
use crate::ui::theme::ThemeStyles;

/// Rows visible at once.
pub const PAGE_SIZE: usize = 8;

const LEFT_WIDTH: usize = 52;
const RIGHT_WIDTH: usize = 12;

/// What the Feed page shows.
#[derive(Debug, Clone, Copy)]
pub struct FeedView<'a> {
    /// Fetched posts.
    pub items: &'a [FeedItem],
    /// Selected row.
    pub cursor: usize,
    /// First visible row.
    pub offset: usize,
    /// A fetch is in flight.
    pub loading: bool,
    /// Last fetch error, if any.
    pub error: Option<&'a str>,
}

/// Shorten `value` to at most `max` characters, ending in `...` when cut.
#[must_use]
pub fn truncate(value: &str, max: usize) -> String {
    let count = value.chars().count();
    if count <= max {
        return value.to_string();
    }
    if max <= 3 {
        return value.chars().take(max).collect();
    }
    let mut out: String = value.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// Offset that keeps `cursor` within a window of `page_size` rows.
#[must_use]
pub fn adjust_offset(cursor: usize, offset: usize, len: usize, page_size: usize) -> usize {
    if page_size == 0 || len == 0 {
        return 0;
    }
    let offset = if cursor < offset {
        cursor
    } else if cursor >= offset + page_size {
        cursor + 1 - page_size
    } else {
        offset
    };
    offset.min(len.saturating_sub(page_size))
}

/// Render the feed page.
#[must_use]
pub fn render(styles: &ThemeStyles, view: &FeedView<'_>, theme_label: &str) -> Vec<Line<'static>> {
    let mut lines = title(styles, "Feed");
    let back = format!("{theme_label} • {BACK_HELP}");

    if view.loading {
        lines.push(Line::styled("Loading feed...", styles.subtle));
        lines.extend(help(styles, back));
        return lines;
    }
    if let Some(error) = view.error {
        lines.push(Line::styled("Failed to load feed.", styles.subtle));
        lines.push(Line::styled(error.to_string(), styles.subtle));
        lines.extend(help(styles, back));
        return lines;
    }
    if view.items.is_empty() {
        lines.push(Line::styled("No posts found.", styles.subtle));
        lines.extend(help(styles, back));
        return lines;
    }

    let end = (view.offset + PAGE_SIZE).min(view.items.len());
    for (i, item) in view.items.iter().enumerate().take(end).skip(view.offset) {
        let selected = i == view.cursor;
        let left = pad(
            &format!(
                "{}{}",
                cursor_mark(selected),
                truncate(&item.title, LEFT_WIDTH - 3)
            ),
            LEFT_WIDTH,
            Alignment::Left,
        );
        let right = pad(&item.date, RIGHT_WIDTH, Alignment::Right);
        let (left_style, right_style) = if selected {
            (styles.selected, styles.selected_faint())
        } else {
            (styles.content, styles.subtle)
        };
        lines.push(Line::from(vec![
            Span::styled(left, left_style),
            Span::styled(right, right_style),
        ]));
    }

    if let Some(item) = view.items.get(view.cursor) {
        if !item.link.is_empty() {
            lines.push(Line::default());
            lines.push(Line::styled(item.link.clone(), styles.link()));
        }
    }

    lines.extend(help(styles, format!("{theme_label} • {BROWSE_HELP}")));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::theme_at;

    fn items(n: usize) -> Vec<FeedItem> {
        (0..n)
            .map(|i| FeedItem {
                title: format!("Post {i}"),
                link: format!("https://notes.example.com/{i}"),
                date: "01-02-2024".to_string(),
            })
            .collect()
    }

    fn text(view: &FeedView<'_>) -> Vec<String> {
        render(&ThemeStyles::from(theme_at(0)), view, "t")
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("this is too long", 10), "this is...");
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("日本語のタイトル", 5), "日本...");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_adjust_offset() {
        assert_eq!(adjust_offset(0, 0, 20, 8), 0);
        assert_eq!(adjust_offset(7, 0, 20, 8), 0);
        assert_eq!(adjust_offset(8, 0, 20, 8), 1);
        assert_eq!(adjust_offset(3, 5, 20, 8), 3);
        assert_eq!(adjust_offset(19, 0, 20, 8), 12);
        // Offset never exceeds len - page_size.
        assert_eq!(adjust_offset(2, 10, 5, 8), 0);
        assert_eq!(adjust_offset(0, 4, 0, 8), 0);
    }

    #[test]
    fn test_render_window() {
        let items = items(12);
        let lines = text(&FeedView {
            items: &items,
            cursor: 9,
            offset: 2,
            loading: false,
            error: None,
        });

        let rows: Vec<&String> = lines.iter().filter(|l| l.contains("Post")).collect();
        assert_eq!(rows.len(), PAGE_SIZE);
        assert!(rows[0].starts_with("  Post 2"));
        assert!(rows[7].starts_with("→ Post 9"));
        assert!(rows[7].ends_with("01-02-2024"));
        assert_eq!(rows[7].chars().count(), LEFT_WIDTH + RIGHT_WIDTH);
        assert!(lines.contains(&"https://notes.example.com/9".to_string()));
    }

    #[test]
    fn test_render_states() {
        let loading = text(&FeedView {
            items: &[],
            cursor: 0,
            offset: 0,
            loading: true,
            error: None,
        });
        assert!(loading.contains(&"Loading feed...".to_string()));

        let failed = text(&FeedView {
            items: &[],
            cursor: 0,
            offset: 0,
            loading: false,
            error: Some("feed request failed: 500 Internal Server Error"),
        });
        assert!(failed.contains(&"Failed to load feed.".to_string()));
        assert!(failed.contains(&"feed request failed: 500 Internal Server Error".to_string()));

        let empty = text(&FeedView {
            items: &[],
            cursor: 0,
            offset: 0,
            loading: false,
            error: None,
        });
        assert!(empty.contains(&"No posts found.".to_string()));
    }
}
