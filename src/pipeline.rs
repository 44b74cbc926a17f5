//! Render Pipeline - Single Entry Point
//!
//! Resolves the theme, parses the notation and lays it out.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hashing::{compute_markup_hash, compute_request_hash};
use crate::layout::{self, RenderConfig};
use crate::notation::{self, RenderInstruction};
use crate::theme::{Theme, ThemeConfig, ThemeRegistry, DEFAULT_THEME_ID};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Theme not found: {0}")]
    ThemeNotFound(String),

    #[error("Theme {0} requires engine >= {1}, current is {2}")]
    EngineVersionMismatch(String, String, String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub notation: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub overrides: Option<ThemeConfig>,
}

impl RenderRequest {
    pub fn new(notation: impl Into<String>) -> Self {
        Self { notation: notation.into(), theme: None, overrides: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedHand {
    pub theme_id: String,
    pub engine_version: String,
    pub instructions: Vec<RenderInstruction>,
    pub markup: String,
    pub width: f64,
    pub height: f64,
    pub request_hash: String,
    pub markup_hash: String,
}

/// The render pipeline - owns the theme registry
pub struct Renderer {
    registry: ThemeRegistry,
}

impl Renderer {
    pub fn new(registry: ThemeRegistry) -> Self {
        Self { registry }
    }

    pub fn list_themes(&self) -> Vec<&Theme> {
        self.registry.list()
    }

    pub fn get_theme(&self, id: &str) -> Option<&Theme> {
        self.registry.get(id)
    }

    /// Look up a theme and merge the caller's overrides into it
    pub fn resolve_config(
        &self,
        theme_id: &str,
        overrides: Option<&ThemeConfig>,
    ) -> Result<RenderConfig, RenderError> {
        let theme = self.registry.get(theme_id)
            .ok_or_else(|| RenderError::ThemeNotFound(theme_id.to_string()))?;

        check_engine_version(theme)?;

        Ok(theme.render_config(overrides))
    }

    pub fn render(&self, request: &RenderRequest) -> Result<RenderedHand, RenderError> {
        let theme_id = request.theme.as_deref().unwrap_or(DEFAULT_THEME_ID);
        let config = self.resolve_config(theme_id, request.overrides.as_ref())?;

        let instructions = notation::parse(&request.notation);
        let markup = layout::render(&instructions, &config);
        let extent = layout::measure(&instructions, &config);

        let request_hash = compute_request_hash(theme_id, request, ENGINE_VERSION)?;
        let markup_hash = compute_markup_hash(&markup);

        log::debug!(
            "rendered {:?} with theme {} ({} instruction(s))",
            request.notation,
            theme_id,
            instructions.len()
        );

        Ok(RenderedHand {
            theme_id: theme_id.to_string(),
            engine_version: ENGINE_VERSION.to_string(),
            instructions,
            markup,
            width: extent.width,
            height: extent.height,
            request_hash,
            markup_hash,
        })
    }

    /// Markup only, default theme
    pub fn render_notation(
        &self,
        notation: &str,
        overrides: Option<&ThemeConfig>,
    ) -> Result<String, RenderError> {
        let config = self.resolve_config(DEFAULT_THEME_ID, overrides)?;
        Ok(layout::render(&notation::parse(notation), &config))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(ThemeRegistry::default())
    }
}

fn check_engine_version(theme: &Theme) -> Result<(), RenderError> {
    let engine_ver = semver::Version::parse(ENGINE_VERSION)
        .map_err(|_| RenderError::InvalidVersion(ENGINE_VERSION.to_string()))?;
    let min_ver = semver::Version::parse(&theme.engine_min_version)
        .map_err(|_| RenderError::InvalidVersion(theme.engine_min_version.clone()))?;

    if engine_ver < min_ver {
        return Err(RenderError::EngineVersionMismatch(
            theme.id.clone(),
            theme.engine_min_version.clone(),
            ENGINE_VERSION.to_string(),
        ));
    }

    Ok(())
}
