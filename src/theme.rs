use serde::{Deserialize, Serialize};

use crate::util::normalize_hex_color;

/// The closed set of visual themes a generated site can use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    LightMinimal,
    LightBold,
    DarkMinimal,
    DarkBold,
}

impl Theme {
    pub const ALL: [Theme; 4] = [
        Theme::LightMinimal,
        Theme::LightBold,
        Theme::DarkMinimal,
        Theme::DarkBold,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Theme::LightMinimal => "Light Minimal",
            Theme::LightBold => "Light Bold",
            Theme::DarkMinimal => "Dark Minimal",
            Theme::DarkBold => "Dark Bold",
        }
    }

    pub fn is_light(&self) -> bool {
        matches!(self, Theme::LightMinimal | Theme::LightBold)
    }

    fn is_bold(&self) -> bool {
        matches!(self, Theme::LightBold | Theme::DarkBold)
    }

    pub fn background_color(&self) -> &'static str {
        match self {
            Theme::LightMinimal => "#FFFFFF",
            Theme::LightBold => "#F5F5F5",
            Theme::DarkMinimal => "#1A1A1A",
            Theme::DarkBold => "#0D0D0D",
        }
    }

    pub fn text_color(&self) -> &'static str {
        if self.is_light() { "#1A1A1A" } else { "#F5F5F5" }
    }

    /// Accent used when the site settings don't carry a valid one.
    pub fn default_accent(&self) -> &'static str {
        match self {
            Theme::LightMinimal => "#007AFF",
            Theme::LightBold => "#FF3B30",
            Theme::DarkMinimal => "#0A84FF",
            Theme::DarkBold => "#FF453A",
        }
    }

    pub fn font_family(&self) -> &'static str {
        if self.is_bold() {
            "'Helvetica Neue', Helvetica, Arial, sans-serif"
        } else {
            "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif"
        }
    }

    pub fn font_weight(&self) -> &'static str {
        if self.is_bold() { "600" } else { "400" }
    }

    pub fn max_width(&self) -> &'static str {
        if self.is_bold() { "1200px" } else { "800px" }
    }

    /// Resolve the CSS variables for this theme, applying an accent override.
    ///
    /// The override is only honoured when it is a well-formed hex colour,
    /// since it ends up verbatim inside the stylesheet.
    pub fn palette(&self, accent_override: &str) -> ThemePalette {
        let accent = normalize_hex_color(accent_override)
            .unwrap_or_else(|| self.default_accent().to_string());

        ThemePalette {
            background: self.background_color().to_string(),
            text: self.text_color().to_string(),
            accent,
            font_family: self.font_family().to_string(),
            font_weight: self.font_weight().to_string(),
            max_width: self.max_width().to_string(),
            muted: if self.is_light() { "#666666" } else { "#A0A0A0" }.to_string(),
            border: if self.is_light() { "#E5E5E5" } else { "#333333" }.to_string(),
        }
    }
}

/// Concrete CSS values substituted into the shared stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemePalette {
    pub background: String,
    pub text: String,
    pub accent: String,
    pub font_family: String,
    pub font_weight: String,
    pub max_width: String,
    pub muted: String,
    pub border: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_uses_valid_accent_override() {
        let palette = Theme::DarkBold.palette("#12abef");
        assert_eq!(palette.accent, "#12ABEF");
        assert_eq!(palette.background, "#0D0D0D");
        assert_eq!(palette.max_width, "1200px");
    }

    #[test]
    fn test_palette_falls_back_to_theme_accent() {
        let palette = Theme::LightBold.palette("red; } body { display: none");
        assert_eq!(palette.accent, "#FF3B30");
        assert_eq!(Theme::LightMinimal.palette("").accent, "#007AFF");
    }

    #[test]
    fn test_theme_serializes_kebab_case() {
        let json = serde_json::to_string(&Theme::DarkMinimal).unwrap();
        assert_eq!(json, "\"dark-minimal\"");
        let theme: Theme = serde_json::from_str("\"light-bold\"").unwrap();
        assert_eq!(theme, Theme::LightBold);
    }

    #[test]
    fn test_minimal_and_bold_typography() {
        for theme in Theme::ALL {
            let expected = if theme.is_bold() { "600" } else { "400" };
            assert_eq!(theme.font_weight(), expected, "{}", theme.display_name());
        }
    }
}
