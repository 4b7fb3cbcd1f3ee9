//! Falling binary rain behind the splash page.
//!
//! Every column is a deterministic function of its index and the frame
//! number, so two renders of the same frame are identical.

use std::ops::Range;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Widget;

use super::theme::ThemeStyles;

/// Extra rows a head travels below the screen before wrapping.
const LEAD_PADDING: i64 = 12;

/// Xorshift mix of `n`, made non-negative.
#[must_use]
pub fn rain_hash(n: i64) -> i64 {
    let mut n = n;
    n ^= n << 13;
    n ^= n >> 17;
    n ^= n << 5;
    n.wrapping_abs()
}

fn binary_one(frame: i64, x: i64, y: i64, seed: i64) -> bool {
    rain_hash(
        frame
            .wrapping_mul(131)
            .wrapping_add(x * 17)
            .wrapping_add(y * 23)
            .wrapping_add(seed),
    ) % 2
        == 0
}

/// Per-column rain parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Phase offset and noise seed.
    pub seed: i64,
    /// Frames per row of fall; 1 to 3.
    pub speed: i64,
    /// Length of the trail behind the head; 4 to 9.
    pub trail: i64,
}

impl Column {
    /// Parameters of column `x`.
    #[must_use]
    pub fn new(x: i64) -> Self {
        let seed = rain_hash((x + 1) * 7919);
        Self {
            seed,
            speed: 1 + seed % 3,
            trail: 4 + seed % 6,
        }
    }

    /// Row of the head at `frame`; may be below the visible area.
    #[must_use]
    pub fn head(&self, frame: i64, height: i64) -> i64 {
        (frame / self.speed)
            .wrapping_add(self.seed)
            .rem_euclid(height + self.trail + LEAD_PADDING)
    }
}

/// Brightness of one rain cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shade {
    Head,
    Trail,
    Dim,
}

/// The rain background widget.
#[derive(Debug, Clone)]
pub struct Rain {
    frame: i64,
    head: Style,
    trail: Style,
    dim: Style,
    soft_rows: Range<u16>,
}

impl Rain {
    /// Rain at animation step `frame`, coloured from `styles`.
    #[must_use]
    pub fn new(frame: usize, styles: &ThemeStyles) -> Self {
        let head = styles.accent.remove_modifier(Modifier::BOLD);
        Self {
            frame: i64::try_from(frame).unwrap_or(0),
            head,
            trail: head.add_modifier(Modifier::DIM),
            dim: styles
                .subtle
                .remove_modifier(Modifier::BOLD)
                .add_modifier(Modifier::DIM),
            soft_rows: 0..0,
        }
    }

    /// Draw rows in `rows` (absolute) dimmed, for the rows behind the overlay.
    #[must_use]
    pub fn soft_rows(mut self, rows: Range<u16>) -> Self {
        self.soft_rows = rows;
        self
    }

    fn cell(&self, column: &Column, x: i64, y: i64, height: i64, soft: bool) -> Option<(bool, Shade)> {
        let frame = self.frame;
        let head = column.head(frame, height);

        if head < height && y <= head && y > head - column.trail {
            let one = binary_one(frame, x, y, column.seed);
            if soft {
                return Some((one, Shade::Dim));
            }
            let dist = head - y;
            let shade = if dist == 0 {
                Shade::Head
            } else if dist <= column.trail / 2 {
                Shade::Trail
            } else {
                Shade::Dim
            };
            return Some((one, shade));
        }

        let noise = rain_hash(
            frame
                .wrapping_mul(29)
                .wrapping_add(x * 97)
                .wrapping_add(y * 53)
                .wrapping_add(column.seed),
        );
        if noise % 41 == 0 {
            return Some((binary_one(frame / 2, x, y, column.seed.wrapping_add(17)), Shade::Dim));
        }
        None
    }
}

impl Widget for Rain {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = i64::from(area.height);
        for dx in 0..area.width {
            let x = i64::from(dx);
            let column = Column::new(x);
            for dy in 0..area.height {
                let soft = self.soft_rows.contains(&(area.y + dy));
                let Some((one, shade)) = self.cell(&column, x, i64::from(dy), height, soft) else {
                    continue;
                };
                let style = match shade {
                    Shade::Head => self.head,
                    Shade::Trail => self.trail,
                    Shade::Dim => self.dim,
                };
                buf.set_string(area.x + dx, area.y + dy, if one { "1" } else { "0" }, style);
            }
        }
    }
}
