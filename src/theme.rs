use ratatui::style::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub(crate) struct Theme {
    pub(crate) bg: Color,
    pub(crate) bg_alt: Color,
    pub(crate) fg: Color,
    pub(crate) fg_muted: Color,
    pub(crate) border: Color,
    pub(crate) accent: Color,
    pub(crate) accent_secondary: Color,
    pub(crate) selection: Color,
}

/// Colour overrides from the config file, as `#rrggbb` strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ThemeColors {
    pub(crate) background: Option<String>,
    pub(crate) background_alt: Option<String>,
    pub(crate) foreground: Option<String>,
    pub(crate) foreground_muted: Option<String>,
    pub(crate) border: Option<String>,
    pub(crate) accent: Option<String>,
    pub(crate) accent_secondary: Option<String>,
    pub(crate) selection: Option<String>,
}

pub(crate) fn color_from_hex(input: &str, fallback: Color) -> Color {
    let s = input.trim();
    if let Some(stripped) = s.strip_prefix('#')
        && stripped.len() == 6
        && stripped.is_ascii()
    {
        let r = u8::from_str_radix(&stripped[0..2], 16).ok();
        let g = u8::from_str_radix(&stripped[2..4], 16).ok();
        let b = u8::from_str_radix(&stripped[4..6], 16).ok();
        if let (Some(r), Some(g), Some(b)) = (r, g, b) {
            return Color::Rgb(r, g, b);
        }
    }
    fallback
}

fn pick(value: &Option<String>, fallback: Color) -> Color {
    value
        .as_deref()
        .map_or(fallback, |c| color_from_hex(c, fallback))
}

pub(crate) fn theme_from_colors(colors: &ThemeColors) -> Theme {
    let base = Theme::default();
    Theme {
        bg: pick(&colors.background, base.bg),
        bg_alt: pick(&colors.background_alt, base.bg_alt),
        fg: pick(&colors.foreground, base.fg),
        fg_muted: pick(&colors.foreground_muted, base.fg_muted),
        border: pick(&colors.border, base.border),
        accent: pick(&colors.accent, base.accent),
        accent_secondary: pick(&colors.accent_secondary, base.accent_secondary),
        selection: pick(&colors.selection, base.selection),
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Color::Rgb(20, 22, 31),
            bg_alt: Color::Rgb(25, 28, 39),
            fg: Color::Rgb(215, 213, 189),
            fg_muted: Color::Rgb(100, 100, 120),
            border: Color::Rgb(127, 122, 88),
            accent: Color::Rgb(206, 198, 130),
            accent_secondary: Color::Rgb(86, 156, 214),
            selection: Color::Rgb(51, 70, 124),
        }
    }
}
