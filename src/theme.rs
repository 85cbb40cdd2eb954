use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// User-selected theme. `System` defers to the terminal's own colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
    System,
}

impl ThemePreference {
    /// Advance to the next theme: light -> dark -> system -> light.
    pub fn cycle(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::System,
            ThemePreference::System => ThemePreference::Light,
        }
    }

    /// Glyph shown in the header next to the title.
    pub fn glyph(self) -> &'static str {
        match self {
            ThemePreference::Light => "☀",
            ThemePreference::Dark => "☾",
            ThemePreference::System => "◎",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            ThemePreference::Light => Palette::LIGHT,
            ThemePreference::Dark => Palette::DARK,
            ThemePreference::System => Palette::SYSTEM,
        }
    }
}

/// Colors consumed by the draw code. One fixed set per preference.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub user_label: Color,
    pub assistant_label: Color,
    pub border: Color,
    pub border_active: Color,
}

impl Palette {
    pub const LIGHT: Palette = Palette {
        background: Color::White,
        text: Color::Black,
        muted: Color::DarkGray,
        accent: Color::Blue,
        user_label: Color::Blue,
        assistant_label: Color::Magenta,
        border: Color::Gray,
        border_active: Color::Blue,
    };

    pub const DARK: Palette = Palette {
        background: Color::Black,
        text: Color::White,
        muted: Color::DarkGray,
        accent: Color::Cyan,
        user_label: Color::Cyan,
        assistant_label: Color::Yellow,
        border: Color::DarkGray,
        border_active: Color::Cyan,
    };

    // Reset lets the terminal supply background and foreground.
    pub const SYSTEM: Palette = Palette {
        background: Color::Reset,
        text: Color::Reset,
        muted: Color::DarkGray,
        accent: Color::Cyan,
        user_label: Color::Cyan,
        assistant_label: Color::Yellow,
        border: Color::DarkGray,
        border_active: Color::Cyan,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_returns_to_start_after_three_activations() {
        let mut theme = ThemePreference::Light;
        theme = theme.cycle();
        assert_eq!(theme, ThemePreference::Dark);
        theme = theme.cycle();
        assert_eq!(theme, ThemePreference::System);
        theme = theme.cycle();
        assert_eq!(theme, ThemePreference::Light);
    }

    #[test]
    fn each_preference_has_a_distinct_glyph() {
        assert_ne!(ThemePreference::Light.glyph(), ThemePreference::Dark.glyph());
        assert_ne!(ThemePreference::Dark.glyph(), ThemePreference::System.glyph());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&ThemePreference::System).unwrap();
        assert_eq!(json, "\"system\"");
        let back: ThemePreference = serde_json::from_str("\"dark\"").unwrap();
        assert_eq!(back, ThemePreference::Dark);
    }
}
