//! Color schemes for the walkthrough

use ratatui::style::{Color, Modifier, Style};
use tlsdh_config::ThemeName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Ocean,
    Amber,
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Ocean,
            Self::Ocean => Self::Amber,
            Self::Amber => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Ocean => "ocean",
            Self::Amber => "amber",
        }
    }

    pub fn palette(&self) -> ThemePalette {
        match self {
            Self::Dark => ThemePalette::dark(),
            Self::Light => ThemePalette::light(),
            Self::Ocean => ThemePalette::ocean(),
            Self::Amber => ThemePalette::amber(),
        }
    }
}

impl From<ThemeName> for Theme {
    fn from(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => Self::Dark,
            ThemeName::Light => Self::Light,
            ThemeName::Ocean => Self::Ocean,
            ThemeName::Amber => Self::Amber,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThemePalette {
    pub bg: Color,
    pub fg: Color,
    pub bg_secondary: Color,

    pub primary: Color,
    pub accent: Color,

    pub success: Color,
    pub warning: Color,
    pub error: Color,

    pub border: Color,
    pub border_active: Color,

    pub text_muted: Color,
    pub text_highlight: Color,

    pub button_bg: Color,
    pub button_fg: Color,
    pub button_disabled: Color,
}

impl ThemePalette {
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(18, 18, 24),
            fg: Color::Rgb(220, 220, 230),
            bg_secondary: Color::Rgb(28, 28, 36),

            primary: Color::Rgb(100, 149, 237),    // Cornflower blue
            accent: Color::Rgb(255, 193, 7),       // Amber

            success: Color::Rgb(46, 204, 113),
            warning: Color::Rgb(241, 196, 15),
            error: Color::Rgb(231, 76, 60),

            border: Color::Rgb(60, 60, 80),
            border_active: Color::Rgb(100, 149, 237),

            text_muted: Color::Rgb(120, 120, 140),
            text_highlight: Color::Rgb(255, 215, 0),

            button_bg: Color::Rgb(100, 149, 237),
            button_fg: Color::Rgb(18, 18, 24),
            button_disabled: Color::Rgb(55, 55, 70),
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(250, 250, 252),
            fg: Color::Rgb(33, 37, 41),
            bg_secondary: Color::Rgb(244, 244, 244),

            primary: Color::Rgb(13, 110, 253),
            accent: Color::Rgb(214, 51, 132),

            success: Color::Rgb(25, 135, 84),
            warning: Color::Rgb(255, 153, 0),
            error: Color::Rgb(220, 53, 69),

            border: Color::Rgb(222, 226, 230),
            border_active: Color::Rgb(13, 110, 253),

            text_muted: Color::Rgb(170, 170, 170),
            text_highlight: Color::Rgb(13, 110, 253),

            button_bg: Color::Rgb(255, 255, 255),
            button_fg: Color::Rgb(33, 37, 41),
            button_disabled: Color::Rgb(233, 236, 239),
        }
    }

    pub fn ocean() -> Self {
        Self {
            bg: Color::Rgb(10, 25, 41),
            fg: Color::Rgb(200, 225, 240),
            bg_secondary: Color::Rgb(16, 38, 60),

            primary: Color::Rgb(0, 188, 212),
            accent: Color::Rgb(129, 212, 250),

            success: Color::Rgb(102, 187, 106),
            warning: Color::Rgb(255, 202, 40),
            error: Color::Rgb(239, 83, 80),

            border: Color::Rgb(30, 70, 100),
            border_active: Color::Rgb(0, 188, 212),

            text_muted: Color::Rgb(96, 125, 139),
            text_highlight: Color::Rgb(128, 222, 234),

            button_bg: Color::Rgb(0, 151, 167),
            button_fg: Color::Rgb(10, 25, 41),
            button_disabled: Color::Rgb(30, 55, 75),
        }
    }

    pub fn amber() -> Self {
        Self {
            bg: Color::Rgb(20, 14, 4),
            fg: Color::Rgb(255, 191, 0),
            bg_secondary: Color::Rgb(34, 24, 8),

            primary: Color::Rgb(255, 176, 0),
            accent: Color::Rgb(255, 220, 120),

            success: Color::Rgb(255, 204, 0),
            warning: Color::Rgb(255, 140, 0),
            error: Color::Rgb(255, 69, 0),

            border: Color::Rgb(102, 76, 0),
            border_active: Color::Rgb(255, 176, 0),

            text_muted: Color::Rgb(140, 105, 20),
            text_highlight: Color::Rgb(255, 236, 160),

            button_bg: Color::Rgb(255, 176, 0),
            button_fg: Color::Rgb(20, 14, 4),
            button_disabled: Color::Rgb(60, 44, 10),
        }
    }

    pub fn base_style(&self) -> Style {
        Style::default().bg(self.bg).fg(self.fg)
    }

    pub fn panel_style(&self) -> Style {
        Style::default().bg(self.bg_secondary).fg(self.fg)
    }

    pub fn title_style(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(self.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.fg)
        }
    }

    pub fn border_style(&self, active: bool) -> Style {
        Style::default().fg(if active { self.border_active } else { self.border })
    }

    pub fn label_style(&self) -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn value_style(&self) -> Style {
        Style::default()
            .fg(self.text_highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    pub fn success_style(&self) -> Style {
        Style::default()
            .fg(self.success)
            .add_modifier(Modifier::BOLD)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn error_style(&self) -> Style {
        Style::default()
            .fg(self.error)
            .add_modifier(Modifier::BOLD)
    }

    pub fn button_style(&self, enabled: bool) -> Style {
        if enabled {
            Style::default()
                .bg(self.button_bg)
                .fg(self.button_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .bg(self.button_disabled)
                .fg(self.text_muted)
                .add_modifier(Modifier::DIM)
        }
    }

    pub fn shortcut_key(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn shortcut_desc(&self) -> Style {
        Style::default().fg(self.text_muted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_cycle_returns_home() {
        let mut theme = Theme::Dark;
        for _ in 0..4 {
            theme = theme.next();
        }
        assert_eq!(theme, Theme::Dark);
    }

    #[test]
    fn test_from_config_name() {
        assert_eq!(Theme::from(ThemeName::Ocean), Theme::Ocean);
        assert_eq!(Theme::from(ThemeName::Amber).name(), "amber");
    }
}
