//! Theme colors for the pyramid TUI
//! Court-green defaults, overridable per color from the `[theme]` config table

use ratatui::style::Color;

use crate::config::ThemeOverrides;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,      // Active borders, key hints
    pub court: Color,       // Pyramid background
    pub block: Color,       // Slot background
    pub block_text: Color,  // Slot label
    pub selected: Color,    // Selected or carried slot
    pub target: Color,      // Drop target while dragging
    pub changed: Color,     // Slots shifted by the last move
    pub cursor: Color,      // Keyboard cursor border
    pub danger: Color,      // Errors
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Hints, secondary text
    pub inactive: Color,    // Inactive borders
    pub header: Color,      // Section headers in popups
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(250, 204, 21),
            court: Color::Rgb(45, 139, 78),
            block: Color::Rgb(247, 245, 232),
            block_text: Color::Rgb(31, 31, 31),
            selected: Color::Rgb(250, 204, 21),
            target: Color::Rgb(125, 211, 252),
            changed: Color::Rgb(190, 242, 100),
            cursor: Color::Rgb(255, 255, 255),
            danger: Color::Rgb(243, 139, 168),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(166, 218, 149),
        }
    }
}

impl Theme {
    /// Defaults with any configured overrides applied
    pub fn load(overrides: &ThemeOverrides) -> Self {
        let mut theme = Self::default();

        let apply = |slot: &mut Color, value: &Option<String>| {
            if let Some(value) = value {
                match parse_hex_color(value) {
                    Some(color) => *slot = color,
                    None => tracing::warn!("Ignoring invalid theme color {:?}", value),
                }
            }
        };

        apply(&mut theme.accent, &overrides.accent);
        apply(&mut theme.court, &overrides.court);
        apply(&mut theme.block, &overrides.block);
        apply(&mut theme.selected, &overrides.selected);
        apply(&mut theme.changed, &overrides.changed);
        apply(&mut theme.text, &overrides.text);

        theme
    }
}

/// Parse a hex color string (#RRGGBB or #RGB) into RGB bytes
pub fn parse_hex_rgb(s: &str) -> Option<[u8; 3]> {
    let s = s.trim().trim_start_matches('#');

    if !s.is_ascii() {
        return None;
    }

    if s.len() == 6 {
        let r = u8::from_str_radix(&s[0..2], 16).ok()?;
        let g = u8::from_str_radix(&s[2..4], 16).ok()?;
        let b = u8::from_str_radix(&s[4..6], 16).ok()?;
        Some([r, g, b])
    } else if s.len() == 3 {
        let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
        let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
        let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
        Some([r, g, b])
    } else {
        None
    }
}

fn parse_hex_color(s: &str) -> Option<Color> {
    parse_hex_rgb(s).map(|[r, g, b]| Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex_rgb("#2d8b4e"), Some([0x2d, 0x8b, 0x4e]));
        assert_eq!(parse_hex_rgb("fff"), Some([255, 255, 255]));
        assert_eq!(parse_hex_rgb("#12345"), None);
        assert_eq!(parse_hex_rgb("#zzzzzz"), None);
        assert_eq!(parse_hex_rgb("#ééé"), None);
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = ThemeOverrides {
            court: Some("#000000".to_string()),
            accent: Some("nope".to_string()),
            ..Default::default()
        };
        let theme = Theme::load(&overrides);
        assert_eq!(theme.court, Color::Rgb(0, 0, 0));
        assert_eq!(theme.accent, Theme::default().accent);
    }
}
