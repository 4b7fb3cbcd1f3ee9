//! The menu logo and the snake that travels around it.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// Glyph used for snake cells.
pub const SNAKE_GLYPH: &str = "•";

const LOGO: [&str; 7] = [
    r"                         d8b        d8, d8b         d8,",
    r"   d8P                   ?88       `8P  ?88        `8P ",
    r"d888888P                  88b            88b           ",
    r"  ?88'   d8888b  .d888b,  888888b   88b  888  d88'  88b",
    r"  88P   d8P' ?88 ?8b,     88P `?8b  88P  888bd8P'   88P",
    r"  88b   88b  d88   `?8b  d88   88P d88  d88888b    d88 ",
    r"  `?8b  `?8888P'`?888P' d88'   88bd88' d88' `?88b,d88' ",
];

const PAD_Y: usize = 1;
const PAD_X: usize = 2;
const MIN_SNAKE: usize = 6;

/// Cells of the padded grid border, clockwise from the top-left corner.
fn border_path(width: usize, height: usize) -> Vec<(usize, usize)> {
    let mut path = Vec::with_capacity(2 * (width + height));
    path.extend((0..width).map(|x| (x, 0)));
    path.extend((1..height.saturating_sub(1)).map(|y| (width - 1, y)));
    if height > 1 {
        path.extend((0..width).rev().map(|x| (x, height - 1)));
    }
    if width > 1 {
        path.extend((1..height.saturating_sub(1)).rev().map(|y| (0, y)));
    }
    path
}

/// Render the logo with the snake's head at step `sweep` of its loop.
///
/// Lines are returned unaligned; callers center them.
#[must_use]
pub fn render(sweep: usize, base: Style, snake: Style) -> Vec<Line<'static>> {
    let logo_width = LOGO.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = logo_width + PAD_X * 2;
    let height = LOGO.len() + PAD_Y * 2;

    let mut grid = vec![vec![' '; width]; height];
    for (y, line) in LOGO.iter().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            grid[PAD_Y + y][PAD_X + x] = ch;
        }
    }

    let path = border_path(width, height);
    let mut on_snake = vec![vec![false; width]; height];
    if !path.is_empty() {
        let len = (path.len() / 8).max(MIN_SNAKE).min(path.len());
        let start = sweep % path.len();
        for i in 0..len {
            let (x, y) = path[(start + i) % path.len()];
            on_snake[y][x] = true;
        }
    }

    grid.iter()
        .zip(&on_snake)
        .map(|(row, snake_row)| {
            let spans: Vec<Span<'static>> = row
                .iter()
                .zip(snake_row)
                .map(|(&ch, &is_snake)| {
                    if is_snake {
                        Span::styled(SNAKE_GLYPH, snake)
                    } else if ch == ' ' {
                        Span::raw(" ")
                    } else {
                        Span::styled(ch.to_string(), base)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}
