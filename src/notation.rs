//! Notation Parser - mpsz string to render instructions
//!
//! Lenient by contract: stray characters are skipped and malformed
//! quote suffixes fall back to an upright tile. Parsing never fails.

use serde::{Deserialize, Serialize};

/// How a tile is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    Upright,
    Sideways,
    /// Upper half of a stacked call, drawn above the preceding sideways tile
    SidewaysTop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderInstruction {
    Tile {
        #[serde(rename = "tileKey")]
        tile_key: String,
        #[serde(rename = "tileOrient")]
        orientation: Orientation,
    },
    Space,
}

impl RenderInstruction {
    pub fn tile(tile_key: impl Into<String>, orientation: Orientation) -> Self {
        Self::Tile { tile_key: tile_key.into(), orientation }
    }
}

/// A rank marker plus the quotes seen after it, waiting for a suit letter
#[derive(Debug, Clone)]
struct NumberQuoteToken {
    rank: char,
    quotes: String,
}

impl NumberQuoteToken {
    fn new(rank: char) -> Self {
        Self { rank, quotes: String::new() }
    }

    fn tile_key(&self, suit: char) -> String {
        match (self.rank, suit) {
            ('X' | 'Q', _) => self.rank.to_ascii_lowercase().to_string(),
            (_, 'x' | 'q') => suit.to_string(),
            _ => format!("{}{}", self.rank, suit).to_ascii_lowercase(),
        }
    }

    fn finalize(&self, suit: char, out: &mut Vec<RenderInstruction>) {
        let tile_key = self.tile_key(suit);
        match self.quotes.as_str() {
            "" => out.push(RenderInstruction::tile(tile_key, Orientation::Upright)),
            "'" => out.push(RenderInstruction::tile(tile_key, Orientation::Sideways)),
            "''" => out.push(RenderInstruction::tile(tile_key, Orientation::SidewaysTop)),
            "\"" => {
                out.push(RenderInstruction::tile(tile_key.clone(), Orientation::Sideways));
                out.push(RenderInstruction::tile(tile_key, Orientation::SidewaysTop));
            }
            other => {
                log::debug!("unrecognized quote suffix {:?} on {}, drawing upright", other, tile_key);
                out.push(RenderInstruction::tile(tile_key, Orientation::Upright));
            }
        }
    }
}

fn is_rank(c: char) -> bool {
    c.is_ascii_digit() || c == 'X' || c == 'Q'
}

fn is_suit(c: char) -> bool {
    matches!(c, 'm' | 'p' | 's' | 'z' | 'q' | 'x')
}

/// The last tile of a group, kept open so a quote written right after the
/// suit letter (`1p'`) still rotates it. Only bare tiles are kept open; a
/// tile already quoted before its suit (`1'p`) is closed.
struct Finalized {
    token: NumberQuoteToken,
    suit: char,
    start: usize,
}

/// Parse an mpsz notation string into an ordered instruction list
pub fn parse(notation: &str) -> Vec<RenderInstruction> {
    let mut result = Vec::new();
    let mut pending: Vec<NumberQuoteToken> = Vec::new();
    let mut reopen: Option<Finalized> = None;

    for c in notation.chars() {
        if c == '\'' || c == '"' {
            if pending.is_empty() {
                if let Some(last) = reopen.as_mut() {
                    result.truncate(last.start);
                    last.token.quotes.push(c);
                    last.token.finalize(last.suit, &mut result);
                    continue;
                }
                // An orphaned quote still yields a tile
                pending.push(NumberQuoteToken::new('Q'));
            }
            if let Some(last) = pending.last_mut() {
                last.quotes.push(c);
            }
            continue;
        }

        reopen = None;
        if is_rank(c) {
            pending.push(NumberQuoteToken::new(c));
        } else if is_suit(c) {
            if pending.is_empty() {
                let tile_key = if c == 'x' { "x" } else { "q" };
                result.push(RenderInstruction::tile(tile_key, Orientation::Upright));
                continue;
            }
            for token in pending.drain(..) {
                let start = result.len();
                token.finalize(c, &mut result);
                reopen = if token.quotes.is_empty() {
                    Some(Finalized { token, suit: c, start })
                } else {
                    None
                };
            }
        } else if c == '-' {
            // Gap does not flush pending ranks
            result.push(RenderInstruction::Space);
        }
    }

    if !pending.is_empty() {
        log::debug!("dropping {} rank(s) with no suit letter", pending.len());
    }

    log::debug!("parsed {:?} into {} instruction(s)", notation, result.len());
    result
}
