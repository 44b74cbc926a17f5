//! Merjong - mahjong hand notation to SVG
//!
//! `123m456p'-789s` goes in, a self-contained SVG fragment comes out.
//! Parsing is lenient and never fails; layout is a pure function of the
//! instructions and the resolved theme.

pub mod notation;
pub mod layout;
pub mod theme;
pub mod hashing;
pub mod pipeline;

pub use notation::{parse, Orientation, RenderInstruction};
pub use layout::{measure, render, Extent, RenderConfig};
pub use theme::{resolve_base_url, Theme, ThemeConfig, ThemeError, ThemeRegistry};
pub use hashing::{canonical_json, compute_markup_hash, compute_request_hash};
pub use pipeline::{RenderError, RenderRequest, RenderedHand, Renderer};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_THEME_ENGINE_VERSION: &str = "1.0.0";
