//! Named color palettes

use serde::{Deserialize, Serialize};

/// Colors used by every chart routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    pub success: String,
    pub warning: String,
    pub error: String,
    pub info: String,
    /// Smoothed cumulative curve
    pub accent: String,
    /// Radar fill and border
    pub radar: String,
    /// "Your Level" guide and callout
    pub highlight: String,
    pub grid: String,
    pub muted: String,
    pub text: String,
    /// Placeholder message color
    pub placeholder: String,
    pub background: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: "#667eea".to_string(),
            secondary: "#764ba2".to_string(),
            success: "#10b981".to_string(),
            warning: "#f59e0b".to_string(),
            error: "#ef4444".to_string(),
            info: "#3b82f6".to_string(),
            accent: "#d18fbb".to_string(),
            radar: "#133E82".to_string(),
            highlight: "#838ccd".to_string(),
            grid: "#e5e7eb".to_string(),
            muted: "#888".to_string(),
            text: "#222".to_string(),
            placeholder: "#9ca3af".to_string(),
            background: "#fff".to_string(),
        }
    }
}

impl Palette {
    /// Built-in palette by name ("default", "high-contrast")
    pub fn named(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "default" => Some(Self::default()),
            "high-contrast" => Some(Self {
                primary: "#1d4ed8".to_string(),
                secondary: "#6b21a8".to_string(),
                success: "#047857".to_string(),
                warning: "#b45309".to_string(),
                error: "#b91c1c".to_string(),
                info: "#1e40af".to_string(),
                accent: "#9d174d".to_string(),
                radar: "#0f172a".to_string(),
                highlight: "#4338ca".to_string(),
                grid: "#9ca3af".to_string(),
                muted: "#374151".to_string(),
                text: "#000".to_string(),
                placeholder: "#4b5563".to_string(),
                background: "#fff".to_string(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_palettes() {
        assert_eq!(Palette::named("DEFAULT"), Some(Palette::default()));
        assert!(Palette::named("high-contrast").is_some());
        assert!(Palette::named("neon").is_none());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let palette: Palette = serde_json::from_str(r##"{"primary": "#000000"}"##).unwrap();
        assert_eq!(palette.primary, "#000000");
        assert_eq!(palette.success, "#10b981");
    }
}
