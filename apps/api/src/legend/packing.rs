//! Multi-layer section packing: several whole layers per section.
//!
//! Used when there are more layers than sections. Every placement of section breaks
//! between consecutive layers is scored by its tallest section, so this is only run
//! for short layer lists (see `dispatch::MAX_EXHAUSTIVE_LAYERS`).
//!
//! # Section count rule
//! Fewer sections are preferred as long as the tallest section grows by no more than
//! 25% over the best layout found with more sections (`height * 0.8 > best` stops).

use tracing::debug;

use crate::legend::combinations::all_comb;
use crate::legend::model::{assign_layer_splits, Layer};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Result of packing layers into a fixed number of sections.
#[derive(Debug, Clone, PartialEq)]
pub struct ExactPacking {
    pub sections_used: usize,
    /// `best_perm[i]` is the break before `layers[i + 1]`.
    pub best_perm: Vec<bool>,
    /// Height of the tallest section under `best_perm`.
    pub best_height: f64,
}

/// Reduction in section count is abandoned once the tallest section would exceed the
/// previous best by more than this factor's inverse (1 / 0.8 = 125%).
const FEWER_SECTIONS_TOLERANCE: f64 = 0.8;

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Packs `layers` into exactly `sections` sections, minimizing the tallest section.
///
/// Requires `1 <= sections <= layers.len()`. Among equally good placements the last one
/// in `all_comb` order wins. The winning placement is written onto `layers`.
pub fn pack_layers_into_exact_sections(layers: &mut [Layer], sections: usize) -> ExactPacking {
    debug_assert!(sections >= 1 && sections <= layers.len());

    let potential_splits = layers.len().saturating_sub(1);
    let required_splits = sections - 1;

    let mut best_height = f64::MAX;
    let mut best_perm: Vec<bool> = Vec::new();
    let mut heights = vec![0.0_f64; sections];

    for perm in all_comb(potential_splits, required_splits) {
        let h = tallest_section(layers, &perm, &mut heights);
        if h <= best_height {
            best_height = h;
            best_perm = perm;
        }
    }

    assign_layer_splits(layers, &best_perm);

    ExactPacking {
        sections_used: sections,
        best_perm,
        best_height,
    }
}

/// Packs `layers` into at most `sections` sections, trading section count against height.
///
/// Tries `sections, sections - 1, …, 2` and keeps the smallest count whose tallest section
/// stays within tolerance of the best seen so far. Returns the number of sections used.
pub fn pack_layers_into_optimal_sections(layers: &mut [Layer], sections: usize) -> usize {
    let mut best: Option<ExactPacking> = None;

    for n in (2..=sections.min(layers.len())).rev() {
        let packing = pack_layers_into_exact_sections(layers, n);
        if let Some(prev) = &best {
            if packing.best_height * FEWER_SECTIONS_TOLERANCE > prev.best_height {
                debug!(
                    sections = n,
                    height = packing.best_height,
                    kept = prev.sections_used,
                    kept_height = prev.best_height,
                    "Section reduction stopped: height regressed past tolerance"
                );
                break;
            }
        }
        best = Some(packing);
    }

    match best {
        Some(packing) => {
            assign_layer_splits(layers, &packing.best_perm);
            packing.sections_used
        }
        None => {
            // A single section: no breaks anywhere on the top level.
            let no_splits = vec![false; layers.len().saturating_sub(1)];
            assign_layer_splits(layers, &no_splits);
            1.min(layers.len())
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Accumulates layer heights into per-section totals under `perm` and returns the max.
fn tallest_section(layers: &[Layer], perm: &[bool], heights: &mut [f64]) -> f64 {
    heights.fill(0.0);
    let mut section = 0usize;
    for (i, layer) in layers.iter().enumerate() {
        heights[section] += layer.height;
        if perm.get(i).copied().unwrap_or(false) {
            section += 1;
        }
    }
    heights.iter().copied().fold(f64::MIN, f64::max)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn layers(heights: &[f64]) -> Vec<Layer> {
        heights.iter().map(|&h| Layer::new(h)).collect()
    }

    fn flags(layers: &[Layer]) -> Vec<bool> {
        layers.iter().map(|l| l.split_before).collect()
    }

    /// Minimum tallest-section height over every way of cutting `heights` into `k` runs.
    fn brute_force_best(heights: &[f64], k: usize) -> f64 {
        let n = heights.len();
        let mut best = f64::MAX;
        for mask in 0u32..(1 << (n - 1)) {
            if mask.count_ones() as usize != k - 1 {
                continue;
            }
            let mut cur = 0.0;
            let mut worst: f64 = 0.0;
            for (i, h) in heights.iter().enumerate() {
                cur += h;
                if i + 1 == n || mask & (1 << i) != 0 {
                    worst = worst.max(cur);
                    cur = 0.0;
                }
            }
            best = best.min(worst);
        }
        best
    }

    // ── pack_layers_into_exact_sections ─────────────────────────────────────

    #[test]
    fn test_exact_two_sections() {
        let mut ls = layers(&[4.0, 2.0, 2.0]);
        let packing = pack_layers_into_exact_sections(&mut ls, 2);
        assert_eq!(packing.best_height, 4.0);
        assert_eq!(packing.best_perm, vec![true, false]);
        assert_eq!(packing.sections_used, 2);
        assert_eq!(flags(&ls), vec![false, true, false]);
    }

    #[test]
    fn test_exact_every_layer_own_section() {
        let mut ls = layers(&[3.0, 1.0, 2.0]);
        let packing = pack_layers_into_exact_sections(&mut ls, 3);
        assert_eq!(packing.best_perm, vec![true, true]);
        assert_eq!(packing.best_height, 3.0);
        assert_eq!(flags(&ls), vec![false, true, true]);
    }

    #[test]
    fn test_exact_single_section_is_total_height() {
        let mut ls = layers(&[3.0, 1.0, 2.0]);
        let packing = pack_layers_into_exact_sections(&mut ls, 1);
        assert_eq!(packing.best_height, 6.0);
        assert_eq!(flags(&ls), vec![false, false, false]);
    }

    #[test]
    fn test_exact_best_height_matches_partition_and_brute_force() {
        let heights = [5.0, 1.0, 7.0, 3.0, 3.0, 2.0, 8.0, 1.0];
        for k in 1..=heights.len() {
            let mut ls = layers(&heights);
            let packing = pack_layers_into_exact_sections(&mut ls, k);

            let mut sums = vec![0.0; k];
            let mut s = 0;
            for (i, h) in heights.iter().enumerate() {
                sums[s] += h;
                if packing.best_perm.get(i).copied().unwrap_or(false) {
                    s += 1;
                }
            }
            let realized = sums.iter().copied().fold(f64::MIN, f64::max);
            assert_eq!(packing.best_height, realized, "k={k}");
            assert_eq!(packing.best_height, brute_force_best(&heights, k), "k={k}");
        }
    }

    #[test]
    fn test_exact_last_tie_wins() {
        // [1,1,1] into 2: both placements give 2; all_comb(2,1) yields [F,T] then [T,F].
        let mut ls = layers(&[1.0, 1.0, 1.0]);
        let packing = pack_layers_into_exact_sections(&mut ls, 2);
        assert_eq!(packing.best_perm, vec![true, false]);
    }

    // ── pack_layers_into_optimal_sections ───────────────────────────────────

    #[test]
    fn test_optimal_four_two_two_four_into_three() {
        let mut ls = layers(&[4.0, 2.0, 2.0, 4.0]);
        let used = pack_layers_into_optimal_sections(&mut ls, 3);
        assert_eq!(used, 3);
        assert_eq!(flags(&ls), vec![false, true, false, true]);
    }

    #[test]
    fn test_optimal_uses_fewer_sections_when_cheap() {
        let mut ls = layers(&[2.0, 2.0, 4.0, 2.0, 2.0]);
        let used = pack_layers_into_optimal_sections(&mut ls, 4);
        assert_eq!(used, 3);
        assert_eq!(flags(&ls), vec![false, false, true, true, false]);
    }

    #[test]
    fn test_optimal_stops_before_height_regresses() {
        // Tallest section: 4 → 2, 3 → 2 (accepted), 2 → 3 (3 * 0.8 > 2, rejected).
        let mut ls = layers(&[1.0, 1.0, 1.0, 1.0, 1.0]);
        let used = pack_layers_into_optimal_sections(&mut ls, 4);
        assert_eq!(used, 3);
        assert_eq!(ls.iter().filter(|l| l.split_before).count(), 2);
    }

    #[test]
    fn test_optimal_single_section_clears_breaks() {
        let mut ls = layers(&[1.0, 2.0, 3.0]);
        ls[2].split_before = true;
        let used = pack_layers_into_optimal_sections(&mut ls, 1);
        assert_eq!(used, 1);
        assert_eq!(flags(&ls), vec![false, false, false]);
    }

    #[test]
    fn test_more_sections_never_raise_tallest_section() {
        let heights = [4.0, 2.0, 2.0, 4.0];
        let mut two = layers(&heights);
        let mut three = layers(&heights);
        pack_layers_into_optimal_sections(&mut two, 2);
        pack_layers_into_optimal_sections(&mut three, 3);
        let tallest = |ls: &[Layer]| {
            let mut worst: f64 = 0.0;
            let mut cur = 0.0;
            for l in ls {
                if l.split_before {
                    worst = worst.max(cur);
                    cur = 0.0;
                }
                cur += l.height;
            }
            worst.max(cur)
        };
        assert!(tallest(&three[..]) <= tallest(&two[..]));
    }
}
