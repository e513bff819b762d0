//! Legend image geometry: section count/width from the export width, and the
//! per-section heights of an already annotated tree.

use crate::legend::model::{Layer, Node};

/// Blank border around the whole legend graphic, each side.
pub const LEGEND_MARGIN: f64 = 20.0;
/// Horizontal gap between neighbouring sections.
pub const SECTION_SPACING: f64 = 10.0;

/// Column layout of an exported legend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionGeometry {
    pub section_count: usize,
    pub section_width: f64,
}

impl SectionGeometry {
    /// Fits as many `preferred_section_width` columns as the export width allows
    /// (at least one), then shares out what is left after margins and gaps.
    pub fn from_widths(available_width: f64, preferred_section_width: f64) -> Self {
        let fitted = if preferred_section_width > 0.0 {
            (available_width / preferred_section_width).floor()
        } else {
            1.0
        };
        let section_count = if fitted.is_finite() && fitted >= 1.0 {
            fitted as usize
        } else {
            1
        };
        Self::with_count(available_width, section_count)
    }

    /// Splits the export width into exactly `section_count` columns.
    pub fn with_count(available_width: f64, section_count: usize) -> Self {
        let columns = section_count.max(1);
        let gutters = 2.0 * LEGEND_MARGIN + (columns - 1) as f64 * SECTION_SPACING;
        let section_width = (available_width - gutters) / columns as f64;

        Self {
            section_count,
            section_width,
        }
    }
}

/// Heights of every section of an annotated legend, in order.
///
/// Uses the same accounting as the splitter: a group contributes its header, an item its
/// full height. Whatever part of a layer's declared height its subtree does not account
/// for (gutters, padding) lands in the section holding the layer's last node.
pub fn section_heights(layers: &[Layer]) -> Vec<f64> {
    let mut sections: Vec<f64> = Vec::new();

    for (i, layer) in layers.iter().enumerate() {
        if sections.is_empty() || (i > 0 && layer.split_before) {
            sections.push(0.0);
        }

        let mut placed = layer.header_height;
        add_to_last(&mut sections, layer.header_height);
        place_nodes(&layer.items, &mut sections, &mut placed);
        add_to_last(&mut sections, (layer.height - placed).max(0.0));
    }

    sections
}

/// Height of the legend graphic: its tallest section plus top and bottom margins.
pub fn legend_height(section_heights: &[f64]) -> f64 {
    let tallest = section_heights.iter().copied().fold(0.0_f64, f64::max);
    tallest + 2.0 * LEGEND_MARGIN
}

fn place_nodes(nodes: &[Node], sections: &mut Vec<f64>, placed: &mut f64) {
    for node in nodes {
        if node.split_before() {
            sections.push(0.0);
        }
        add_to_last(sections, node.own_height());
        *placed += node.own_height();
        place_nodes(node.children(), sections, placed);
    }
}

fn add_to_last(sections: &mut [f64], height: f64) {
    if let Some(last) = sections.last_mut() {
        *last += height;
    }
}
