//! Layout Engine - render instructions to a positioned SVG fragment
//!
//! Rotated tiles use a fixed `rotate(-90)` about the SVG origin, so their
//! coordinates are given in the rotated frame: x is the negated vertical
//! position and y is the horizontal cursor.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::notation::{Orientation, RenderInstruction};

pub const BASE_TILE_KEY: &str = "base";

const WRAPPER_STYLE: &str = "background-color: green; padding: 0.375rem; border-radius: 6px;";

/// Resolved designs and constants for one render call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    pub tile_designs: BTreeMap<String, String>,
    pub tile_width: f64,
    pub tile_height: f64,
    pub tile_gap: f64,
    pub space_width: f64,
}

impl RenderConfig {
    /// Tall enough for two stacked sideways tiles plus a gap
    pub fn svg_height(&self) -> f64 {
        self.tile_height.max(2.0 * self.tile_width + self.tile_gap)
    }

    fn design(&self, tile_key: &str) -> &str {
        match self.tile_designs.get(tile_key) {
            Some(url) => url.as_str(),
            None => {
                log::warn!("no design for tile key {:?}", tile_key);
                ""
            }
        }
    }
}

/// Horizontal extent consumed by a hand and the canvas height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

/// Cursor advance for one instruction
fn advance(instruction: &RenderInstruction, config: &RenderConfig) -> f64 {
    match instruction {
        RenderInstruction::Tile { orientation: Orientation::Upright, .. } => {
            config.tile_width + config.tile_gap
        }
        RenderInstruction::Tile { orientation: Orientation::Sideways, .. } => {
            config.tile_height + config.tile_gap
        }
        RenderInstruction::Tile { orientation: Orientation::SidewaysTop, .. } => 0.0,
        RenderInstruction::Space => config.space_width,
    }
}

pub fn measure(instructions: &[RenderInstruction], config: &RenderConfig) -> Extent {
    let width: f64 = instructions.iter().map(|i| advance(i, config)).sum();
    Extent { width, height: config.svg_height() }
}

/// Draw every instruction left to right and wrap the result
pub fn render(instructions: &[RenderInstruction], config: &RenderConfig) -> String {
    let svg_height = config.svg_height();
    let mut inner = String::new();
    let mut x = 0.0;

    for instruction in instructions {
        if let RenderInstruction::Tile { tile_key, orientation } = instruction {
            let (px, py, rotated) = match orientation {
                Orientation::Upright => (x, svg_height - config.tile_height, false),
                Orientation::Sideways => (-svg_height, x, true),
                Orientation::SidewaysTop => (
                    config.tile_width - svg_height + config.tile_gap,
                    x - config.tile_height - config.tile_gap,
                    true,
                ),
            };
            for key in [BASE_TILE_KEY, tile_key.as_str()] {
                push_image(&mut inner, config.design(key), px, py, config, rotated);
            }
        }
        x += advance(instruction, config);
    }

    log::debug!("rendered {} instruction(s), width {}", instructions.len(), fmt_num(x));

    format!(
        r#"<div style="{}"><svg width="100%" height="{}" style="display: block;">{}</svg></div>"#,
        WRAPPER_STYLE,
        fmt_num(svg_height),
        inner
    )
}

fn push_image(out: &mut String, href: &str, x: f64, y: f64, config: &RenderConfig, rotated: bool) {
    out.push_str(&format!(
        r#"<image href="{}" x="{}" y="{}" width="{}" height="{}""#,
        escape_attr(href),
        fmt_num(x),
        fmt_num(y),
        fmt_num(config.tile_width),
        fmt_num(config.tile_height),
    ));
    if rotated {
        out.push_str(r#" transform="rotate(-90)""#);
    }
    out.push_str(" />");
}

/// Shortest decimal form, `30` rather than `30.0`
fn fmt_num(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{}", value)
    }
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
