//! Theme System - tile designs and layout constants

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::layout::RenderConfig;

pub type ThemeId = String;

pub const DEFAULT_THEME_ID: &str = "default";

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("Invalid theme {0}: {1}")]
    Invalid(String, String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed theme file: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: ThemeId,
    pub name: String,
    #[serde(default = "default_engine_min_version")]
    pub engine_min_version: String,
    pub tile_designs: BTreeMap<String, String>,
    pub tile_width: f64,
    pub tile_height: f64,
    pub tile_gap: f64,
    pub space_width: f64,
}

fn default_engine_min_version() -> String { crate::MIN_THEME_ENGINE_VERSION.to_string() }

impl Theme {
    /// Built-in theme; every face the notation can name plus `base`
    pub fn default_theme() -> Self {
        let mut tile_designs = BTreeMap::new();
        for key in ["base", "x", "q"] {
            tile_designs.insert(key.to_string(), format!("tiles/{}.svg", key));
        }
        for suit in ['m', 'p', 's'] {
            for rank in 0..=9 {
                let key = format!("{}{}", rank, suit);
                tile_designs.insert(key.clone(), format!("tiles/{}.svg", key));
            }
        }
        for rank in 1..=7 {
            let key = format!("{}z", rank);
            tile_designs.insert(key.clone(), format!("tiles/{}.svg", key));
        }

        Self {
            id: DEFAULT_THEME_ID.to_string(),
            name: "Default".to_string(),
            engine_min_version: default_engine_min_version(),
            tile_designs,
            tile_width: 30.0,
            tile_height: 40.0,
            tile_gap: 2.0,
            space_width: 12.0,
        }
    }

    pub fn validate(&self) -> Result<(), ThemeError> {
        let invalid = |msg: String| ThemeError::Invalid(self.id.clone(), msg);

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty".to_string()));
        }
        for (name, value) in [
            ("tileWidth", self.tile_width),
            ("tileHeight", self.tile_height),
            ("tileGap", self.tile_gap),
            ("spaceWidth", self.space_width),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{} must be a non-negative number, got {}", name, value)));
            }
        }
        semver::Version::parse(&self.engine_min_version)
            .map_err(|e| invalid(format!("engineMinVersion: {}", e)))?;
        Ok(())
    }

    /// Merge caller overrides over this theme's designs
    pub fn render_config(&self, overrides: Option<&ThemeConfig>) -> RenderConfig {
        let mut tile_designs = self.tile_designs.clone();
        if let Some(custom) = overrides {
            tile_designs.extend(resolve_base_url(&custom.tile_designs, custom.base_url.as_deref()));
        }

        RenderConfig {
            tile_designs,
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            tile_gap: self.tile_gap,
            space_width: self.space_width,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

/// Caller-supplied overrides for a single render
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub tile_designs: BTreeMap<String, String>,
}

/// Prefix relative design paths with `base_url`; absolute URLs pass through
pub fn resolve_base_url(
    designs: &BTreeMap<String, String>,
    base_url: Option<&str>,
) -> BTreeMap<String, String> {
    let base = match base_url {
        Some(b) if !b.is_empty() => b,
        _ => return designs.clone(),
    };

    let normalized = if base.ends_with('/') { base.to_string() } else { format!("{}/", base) };
    designs
        .iter()
        .map(|(key, value)| {
            let resolved = if value.is_empty()
                || value.starts_with("http://")
                || value.starts_with("https://")
            {
                value.clone()
            } else {
                format!("{}{}", normalized, value)
            };
            (key.clone(), resolved)
        })
        .collect()
}

/// Theme registry - built-in default plus themes loaded from disk
pub struct ThemeRegistry {
    themes: BTreeMap<ThemeId, Theme>,
}

impl ThemeRegistry {
    pub fn new() -> Self {
        let mut themes = BTreeMap::new();
        let default = Theme::default_theme();
        themes.insert(default.id.clone(), default);
        Self { themes }
    }

    /// Load every `*.json` theme in `dir`. Bad files are skipped, a missing
    /// directory yields just the built-in theme.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ThemeError> {
        let mut registry = Self::new();
        if !dir.exists() {
            log::debug!("theme directory {} not found, using built-in theme", dir.display());
            return Ok(registry);
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |e| e == "json") {
                match load_theme_file(&path) {
                    Ok(theme) => {
                        log::debug!("loaded theme {} from {}", theme.id, path.display());
                        registry.register(theme);
                    }
                    Err(e) => log::warn!("skipping theme file {}: {}", path.display(), e),
                }
            }
        }
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&Theme> {
        self.themes.get(id)
    }

    pub fn list(&self) -> Vec<&Theme> {
        self.themes.values().collect()
    }

    pub fn register(&mut self, theme: Theme) {
        self.themes.insert(theme.id.clone(), theme);
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn load_theme_file(path: &Path) -> Result<Theme, ThemeError> {
    let content = fs::read_to_string(path)?;
    let theme: Theme = serde_json::from_str(&content)?;
    theme.validate()?;
    Ok(theme)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn designs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_resolve_without_base_url() {
        let input = designs(&[("1m", "a/1m.svg")]);
        assert_eq!(resolve_base_url(&input, None), input);
        assert_eq!(resolve_base_url(&input, Some("")), input);
    }

    #[test]
    fn test_resolve_normalizes_trailing_slash() {
        let input = designs(&[("1m", "1m.svg")]);
        let with = resolve_base_url(&input, Some("https://cdn.example/tiles/"));
        let without = resolve_base_url(&input, Some("https://cdn.example/tiles"));
        assert_eq!(with["1m"], "https://cdn.example/tiles/1m.svg");
        assert_eq!(with, without);
    }

    #[test]
    fn test_resolve_keeps_absolute_urls() {
        let input = designs(&[
            ("1m", "http://a.example/1m.svg"),
            ("2m", "https://b.example/2m.svg"),
            ("3m", "3m.svg"),
        ]);
        let out = resolve_base_url(&input, Some("/assets"));
        assert_eq!(out["1m"], "http://a.example/1m.svg");
        assert_eq!(out["2m"], "https://b.example/2m.svg");
        assert_eq!(out["3m"], "/assets/3m.svg");
    }

    #[test]
    fn test_default_theme_covers_notation() {
        let theme = Theme::default_theme();
        for key in ["base", "x", "q", "0m", "5p", "9s", "1z", "7z"] {
            assert!(theme.tile_designs.contains_key(key), "missing {}", key);
        }
        assert!(!theme.tile_designs.contains_key("8z"));
        assert!(theme.validate().is_ok());
    }

    #[test]
    fn test_render_config_overrides_win() {
        let theme = Theme::default_theme();
        let overrides = ThemeConfig {
            base_url: Some("https://cdn.example".to_string()),
            tile_designs: designs(&[("1m", "red/1m.svg")]),
        };
        let config = theme.render_config(Some(&overrides));
        assert_eq!(config.tile_designs["1m"], "https://cdn.example/red/1m.svg");
        assert_eq!(config.tile_designs["2m"], "tiles/2m.svg");
        assert_eq!(config.tile_width, theme.tile_width);

        let plain = theme.render_config(None);
        assert_eq!(plain.tile_designs, theme.tile_designs);
    }

    #[test]
    fn test_validate_rejects_negative_constants() {
        let mut theme = Theme::default_theme();
        theme.tile_gap = -1.0;
        let err = theme.validate().unwrap_err();
        assert!(err.to_string().contains("tileGap"));

        let mut theme = Theme::default_theme();
        theme.space_width = f64::NAN;
        assert!(theme.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_engine_version() {
        let mut theme = Theme::default_theme();
        theme.engine_min_version = "one".to_string();
        assert!(theme.validate().is_err());
    }

    #[test]
    fn test_theme_config_from_json() {
        let config: ThemeConfig =
            serde_json::from_str(r#"{"baseUrl":"/t","tileDesigns":{"base":"b.svg"}}"#).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("/t"));
        assert_eq!(config.tile_designs["base"], "b.svg");

        let empty: ThemeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ThemeConfig::default());
    }
}
