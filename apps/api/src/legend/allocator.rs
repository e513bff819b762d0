//! Section allocation when sections outnumber layers.
//!
//! Every layer starts in its own section. Spare sections go, one at a time, to whichever
//! layer is tallest per section it already owns, for as long as the tallest section is
//! more than twice the map height. Extra sections are then handed back while doing so
//! costs less than 10% of height. Finally each layer is split across its sections.
//!
//! A layer can come out with fewer pieces than it was planned (a flat layer has nowhere
//! to break), so the result counts the breaks that were actually placed.

use std::collections::BTreeMap;

use tracing::debug;

use crate::legend::model::{assign_layer_splits, count_sections, Layer};
use crate::legend::splitter::find_optimal_split;

/// Sections stop being added once the tallest one is within this multiple of the map height.
const MAP_HEIGHT_FACTOR: f64 = 2.0;
/// An extra section is kept only if it cut the tallest section below this fraction.
const KEEP_SECTION_RATIO: f64 = 0.9;

/// One candidate allocation: sections per layer and the tallest resulting section.
#[derive(Debug, Clone)]
struct Allocation {
    height: f64,
    segments: Vec<usize>,
}

impl Allocation {
    fn new(layers: &[Layer], segments: Vec<usize>) -> Self {
        let height = layers
            .iter()
            .zip(&segments)
            .map(|(l, &seg)| l.height / seg as f64)
            .fold(f64::MIN, f64::max);
        Self { height, segments }
    }
}

/// Distributes `sections_available` sections over `layers` (requires
/// `1 <= layers.len() <= sections_available`) and returns the number of sections the
/// placed breaks produce.
///
/// With `map_height` absent no layer is ever given more than one section.
pub fn allocate_layers_to_sections(
    layers: &mut [Layer],
    sections_available: usize,
    map_height: Option<f64>,
) -> usize {
    if layers.is_empty() {
        return 0;
    }

    let all_breaks = vec![true; layers.len() - 1];
    assign_layer_splits(layers, &all_breaks);

    // Best allocation found for each total section count.
    let mut by_sections: BTreeMap<usize, Allocation> = BTreeMap::new();
    let mut used = layers.len();
    by_sections.insert(used, Allocation::new(layers, vec![1; layers.len()]));

    let growth_limit = map_height.map(|h| h * MAP_HEIGHT_FACTOR);

    while used < sections_available {
        let current = &by_sections[&used];
        match growth_limit {
            Some(limit) if current.height > limit => {}
            _ => break,
        }

        let worst = worst_layer(layers, &current.segments);
        let mut segments = current.segments.clone();
        segments[worst] += 1;
        used += 1;
        by_sections.insert(used, Allocation::new(layers, segments));
    }

    while used > layers.len() {
        if by_sections[&used].height < KEEP_SECTION_RATIO * by_sections[&(used - 1)].height {
            break;
        }
        used -= 1;
    }

    let chosen = &by_sections[&used];
    for (layer, &segments) in layers.iter_mut().zip(&chosen.segments) {
        find_optimal_split(layer, segments);
    }

    let realized = count_sections(layers);
    debug!(
        planned = used,
        realized,
        height = chosen.height,
        segments = ?chosen.segments,
        "Allocated sections to layers"
    );

    realized
}

/// Index of the layer with the greatest height per owned section (first one on ties).
fn worst_layer(layers: &[Layer], segments: &[usize]) -> usize {
    let mut worst = 0usize;
    let mut worst_height = f64::MIN;
    for (i, (layer, &seg)) in layers.iter().zip(segments).enumerate() {
        let normalized = layer.height / seg as f64;
        if normalized > worst_height {
            worst = i;
            worst_height = normalized;
        }
    }
    worst
}
