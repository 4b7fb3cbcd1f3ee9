//! Colour themes.
//!
//! Visitors cycle through the palettes with `t`. Every page draws with the
//! named styles of [`ThemeStyles`], never with raw colours.

use ratatui::style::{Color, Modifier, Style};

/// A named set of colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    /// Display name shown in the help line.
    pub name: &'static str,
    /// Body text.
    pub primary: Color,
    /// Help lines and secondary text.
    pub muted: Color,
    /// Page titles and the logo.
    pub title: Color,
    /// Links and accents.
    pub link: Color,
    /// Selected rows.
    pub highlight: Color,
    /// Technology tags.
    pub tech: Color,
    /// Project names.
    pub project: Color,
    /// The snake travelling around the logo.
    pub logo_snake: Color,
}

#[allow(clippy::cast_possible_truncation)]
const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Available palettes, in the order `t` cycles through them.
pub const THEMES: [ThemePalette; 5] = [
    ThemePalette {
        name: "Tokyo Night",
        primary: rgb(0x00C0_CAF5),
        muted: rgb(0x0056_5F89),
        title: rgb(0x007A_A2F7),
        link: rgb(0x007D_CFFF),
        highlight: rgb(0x00BB_9AF7),
        tech: rgb(0x009E_CE6A),
        project: rgb(0x007A_A2F7),
        logo_snake: rgb(0x009E_C5FF),
    },
    ThemePalette {
        name: "Nord",
        primary: rgb(0x00D8_DEE9),
        muted: rgb(0x004C_566A),
        title: rgb(0x0081_A1C1),
        link: rgb(0x0088_C0D0),
        highlight: rgb(0x00B4_8EAD),
        tech: rgb(0x00A3_BE8C),
        project: rgb(0x00EB_CB8B),
        logo_snake: rgb(0x008F_BCBB),
    },
    ThemePalette {
        name: "Gruvbox",
        primary: rgb(0x00EB_DBB2),
        muted: rgb(0x0092_8374),
        title: rgb(0x0083_A598),
        link: rgb(0x008E_C07C),
        highlight: rgb(0x00D3_869B),
        tech: rgb(0x00B8_BB26),
        project: rgb(0x00FA_BD2F),
        logo_snake: rgb(0x00FE_8019),
    },
    ThemePalette {
        name: "Catppuccin Mocha",
        primary: rgb(0x00CD_D6F4),
        muted: rgb(0x006C_7086),
        title: rgb(0x0089_B4FA),
        link: rgb(0x0089_DCEB),
        highlight: rgb(0x00CB_A6F7),
        tech: rgb(0x00A6_E3A1),
        project: rgb(0x00F9_E2AF),
        logo_snake: rgb(0x00F5_C2E7),
    },
    ThemePalette {
        name: "Rose Pine",
        primary: rgb(0x00E0_DEF4),
        muted: rgb(0x006E_6A86),
        title: rgb(0x009C_CFD8),
        link: rgb(0x00C4_A7E7),
        highlight: rgb(0x00EB_BCBA),
        tech: rgb(0x0031_748F),
        project: rgb(0x00F6_C177),
        logo_snake: rgb(0x00EB_6F92),
    },
];

/// The palette at `index`, or the first one when out of range.
#[must_use]
pub fn theme_at(index: usize) -> &'static ThemePalette {
    THEMES.get(index).unwrap_or(&THEMES[0])
}

/// The index after `current`, wrapping to the first palette.
///
/// Negative indices reset to the first palette.
#[must_use]
pub fn next_theme_index(current: isize) -> usize {
    match usize::try_from(current) {
        Ok(i) => (i + 1) % THEMES.len(),
        Err(_) => 0,
    }
}

/// Named styles derived from a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ThemeStyles {
    pub title: Style,
    pub menu: Style,
    pub selected: Style,
    pub help: Style,
    pub content: Style,
    pub accent: Style,
    pub subtle: Style,
    pub project_name: Style,
    pub tech: Style,
    pub role: Style,
    pub company: Style,
    pub period: Style,
    pub logo_base: Style,
    pub logo_snake: Style,
}

impl ThemeStyles {
    /// The accent colour without emphasis, for links in running text.
    #[must_use]
    pub fn link(&self) -> Style {
        self.accent
            .remove_modifier(Modifier::BOLD)
            .add_modifier(Modifier::UNDERLINED)
    }

    /// Secondary text on a selected row.
    #[must_use]
    pub fn selected_faint(&self) -> Style {
        self.selected
            .remove_modifier(Modifier::BOLD)
            .add_modifier(Modifier::DIM)
    }
}

impl From<&ThemePalette> for ThemeStyles {
    fn from(p: &ThemePalette) -> Self {
        let fg = |color| Style::default().fg(color);
        let bold = |color| fg(color).add_modifier(Modifier::BOLD);

        Self {
            title: bold(p.title),
            menu: fg(p.primary),
            selected: bold(p.highlight),
            help: fg(p.muted),
            content: fg(p.primary),
            accent: bold(p.link),
            subtle: fg(p.muted),
            project_name: bold(p.project),
            tech: fg(p.tech),
            role: bold(p.highlight),
            company: fg(p.link),
            period: fg(p.muted).add_modifier(Modifier::ITALIC),
            logo_base: bold(p.title),
            logo_snake: bold(p.logo_snake),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_at_falls_back_to_first() {
        assert_eq!(theme_at(0).name, "Tokyo Night");
        assert_eq!(theme_at(4).name, "Rose Pine");
        assert_eq!(theme_at(5).name, "Tokyo Night");
        assert_eq!(theme_at(usize::MAX).name, "Tokyo Night");
    }

    #[test]
    fn test_next_theme_index_wraps() {
        assert_eq!(next_theme_index(0), 1);
        assert_eq!(next_theme_index(3), 4);
        assert_eq!(next_theme_index(4), 0);
        assert_eq!(next_theme_index(-3), 0);
    }

    #[test]
    fn test_palette_colours() {
        assert_eq!(THEMES[0].primary, Color::Rgb(0xC0, 0xCA, 0xF5));
        assert_eq!(THEMES[2].logo_snake, Color::Rgb(0xFE, 0x80, 0x19));
    }

    #[test]
    fn test_styles_from_palette() {
        let styles = ThemeStyles::from(theme_at(1));

        assert_eq!(styles.title.fg, Some(THEMES[1].title));
        assert!(styles.title.add_modifier.contains(Modifier::BOLD));
        assert!(styles.period.add_modifier.contains(Modifier::ITALIC));
        assert!(styles.link().add_modifier.contains(Modifier::UNDERLINED));
        assert!(!styles.link().add_modifier.contains(Modifier::BOLD));
    }
}
