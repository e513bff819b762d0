//! Single-layer splitting: one tall layer spread over several sections.
//!
//! A layer's subtree is walked depth-first with a running `y` cursor. The cursor starts
//! below the layer header; a group advances it by its header before its children are
//! visited, an item by its full height. A break is placed before the first node whose
//! top sits at least `chunk_size` below the previous break.
//!
//! Quality is measured as white space: the summed absolute difference between the
//! target chunk size and every realized piece (pieces that never materialize count as 0).


use crate::legend::model::{apply_node_splits, walk, Layer};

/// Extra chunk sizes tried above the naive `height / split_count`.
const SPLIT_PROBES: u32 = 8;

/// Outcome of splitting one layer at a given chunk size.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSplit {
    /// Σ |chunk_size − piece height| over exactly `split_count` pieces. 0 is a perfect split.
    pub white_space: f64,
    /// Pre-order ordinals (within `layer.items`) of the nodes that should start a section.
    pub splits: Vec<usize>,
}

/// Computes where `layer` would break into `split_count` pieces of about `chunk_size`.
///
/// Does not touch the layer; apply the result with `model::apply_node_splits`.
pub fn split_layer(layer: &Layer, chunk_size: f64, split_count: usize) -> LayerSplit {
    if split_count <= 1 {
        return LayerSplit {
            white_space: (chunk_size - layer.height).abs(),
            splits: Vec::new(),
        };
    }

    let mut remaining = split_count;
    let mut y = layer.header_height;
    let mut last_split_y = 0.0_f64;
    let mut ordinal = 0usize;
    let mut pieces: Vec<f64> = Vec::with_capacity(split_count);
    let mut splits: Vec<usize> = Vec::new();

    walk(&layer.items, &mut |node| {
        if remaining > 1 && ordinal > 0 && y - last_split_y >= chunk_size {
            pieces.push(y - last_split_y);
            splits.push(ordinal);
            last_split_y = y;
            remaining -= 1;
        }
        y += node.own_height();
        ordinal += 1;
    });

    pieces.push((layer.height - last_split_y).max(0.0));
    pieces.resize(split_count, 0.0);

    let white_space = pieces.iter().map(|p| (chunk_size - p).abs()).sum();

    LayerSplit {
        white_space,
        splits,
    }
}

/// Splits `layer` into `split_count` pieces, choosing the chunk size with least white space.
///
/// The naive even chunk is the baseline. Undersized chunks tend to break early and strand
/// space at the bottom, so the probes only go upward, in `SPLIT_PROBES` even steps from
/// the baseline chunk to `chunk + baseline white space`. Only a strict improvement
/// replaces the current best. The winning breaks are written onto the layer.
pub fn find_optimal_split(layer: &mut Layer, split_count: usize) -> LayerSplit {
    if split_count <= 1 {
        return split_layer(layer, layer.height, 1);
    }

    let chunk_size = layer.height / split_count as f64;
    let baseline = split_layer(layer, chunk_size, split_count);
    let step = baseline.white_space / SPLIT_PROBES as f64;

    let mut best = baseline;
    for i in 1..=SPLIT_PROBES {
        let candidate = split_layer(layer, chunk_size + step * i as f64, split_count);
        if candidate.white_space < best.white_space {
            best = candidate;
        }
    }

    apply_node_splits(layer, &best.splits);
    best
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
