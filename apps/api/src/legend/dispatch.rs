//! Legend section layout entry point.
//!
//! Picks a packing strategy from the layer count and the section budget:
//! - more than `MAX_EXHAUSTIVE_LAYERS` layers → fixed layers-per-section, no search
//! - no more layers than sections → `allocator` (layers may span several sections)
//! - otherwise → `packing` (several layers per section)
//!
//! All breaks in the tree are cleared first, so a call overwrites any earlier layout.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::legend::allocator::allocate_layers_to_sections;
use crate::legend::model::{clear_splits, walk, Layer};
use crate::legend::packing::pack_layers_into_optimal_sections;

/// Above this many layers the exhaustive packer (`C(n-1, k-1)` candidates) is skipped.
pub const MAX_EXHAUSTIVE_LAYERS: usize = 15;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Which packing path produced a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackingStrategy {
    /// Too many layers to search: a break every `ceil(layers / sections)` layers.
    Uniform,
    /// Sections ≥ layers: whole sections per layer, tall layers split internally.
    Allocate,
    /// Layers > sections: consecutive layers grouped per section.
    Pack,
}

/// Summary of a `make_legend` run. The breaks themselves live on the layer tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendLayout {
    /// Sections actually consumed (never more than the budget).
    pub sections_used: usize,
    pub strategy: PackingStrategy,
}

/// Rejected legend input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LegendError {
    #[error("sections_available must be at least 1")]
    NoSections,

    #[error("layer {layer}: heights must be finite and non-negative (found {height})")]
    InvalidHeight { layer: usize, height: f64 },

    #[error("map_height must be finite and positive (found {0})")]
    InvalidMapHeight(f64),

    #[error("{requested} sections requested, at most {max} allowed")]
    TooManySections { requested: usize, max: usize },
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry point
// ────────────────────────────────────────────────────────────────────────────

/// Annotates `layers` with section breaks for a legend of at most `sections_available`
/// sections. `map_height` only matters when there are no more layers than sections.
pub fn make_legend(
    layers: &mut [Layer],
    sections_available: usize,
    map_height: Option<f64>,
) -> Result<LegendLayout, LegendError> {
    validate(layers, sections_available, map_height)?;
    clear_splits(layers);

    let count = layers.len();
    let (strategy, sections_used) = if count == 0 {
        (PackingStrategy::Allocate, 0)
    } else if count > MAX_EXHAUSTIVE_LAYERS {
        (
            PackingStrategy::Uniform,
            split_uniformly(layers, sections_available),
        )
    } else if count <= sections_available {
        (
            PackingStrategy::Allocate,
            allocate_layers_to_sections(layers, sections_available, map_height),
        )
    } else {
        (
            PackingStrategy::Pack,
            pack_layers_into_optimal_sections(layers, sections_available),
        )
    };

    debug!(
        layers = count,
        sections_available,
        sections_used,
        ?strategy,
        "Legend layout computed"
    );

    Ok(LegendLayout {
        sections_used,
        strategy,
    })
}

/// Checks the preconditions the packers rely on.
pub fn validate(
    layers: &[Layer],
    sections_available: usize,
    map_height: Option<f64>,
) -> Result<(), LegendError> {
    if sections_available < 1 {
        return Err(LegendError::NoSections);
    }

    if let Some(h) = map_height {
        if !h.is_finite() || h <= 0.0 {
            return Err(LegendError::InvalidMapHeight(h));
        }
    }

    for (i, layer) in layers.iter().enumerate() {
        let mut bad = [layer.height, layer.header_height]
            .into_iter()
            .find(|h| !is_valid_height(*h));
        walk(&layer.items, &mut |node| {
            if bad.is_none() {
                bad = [node.height(), node.own_height()]
                    .into_iter()
                    .find(|h| !is_valid_height(*h));
            }
        });
        if let Some(height) = bad {
            return Err(LegendError::InvalidHeight { layer: i, height });
        }
    }

    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn is_valid_height(h: f64) -> bool {
    h.is_finite() && h >= 0.0
}

/// Breaks before every `ceil(len / sections)`-th layer. Reports the full budget as used.
fn split_uniformly(layers: &mut [Layer], sections_available: usize) -> usize {
    let per_section = layers.len().div_ceil(sections_available);
    for (i, layer) in layers.iter_mut().enumerate() {
        layer.split_before = i > 0 && i % per_section == 0;
    }
    sections_available
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
