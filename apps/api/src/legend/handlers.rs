//! Axum route handlers for the Legend API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::legend::geometry::{legend_height, section_heights, SectionGeometry};
use crate::legend::{make_legend, Layer, LegendError, PackingStrategy};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub layers: Vec<Layer>,
    /// Section budget. Derived from the export widths when absent.
    pub sections_available: Option<usize>,
    /// Rendered map height; lets tall layers claim spare sections on short maps.
    pub map_height: Option<f64>,
    pub available_width: Option<f64>,
    pub preferred_section_width: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub layers: Vec<Layer>,
    pub sections_used: usize,
    pub strategy: PackingStrategy,
    pub section_width: f64,
    pub section_heights: Vec<f64>,
    pub legend_height: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/legend/layout
///
/// Marks section breaks on the posted legend tree and returns it with the section
/// metrics the export compositor needs.
pub async fn handle_layout(
    State(state): State<AppState>,
    Json(request): Json<LayoutRequest>,
) -> Result<Json<LayoutResponse>, AppError> {
    let available_width = request
        .available_width
        .unwrap_or(state.config.legend_available_width);
    let geometry = match request.sections_available {
        Some(count) => SectionGeometry::with_count(available_width, count),
        None => SectionGeometry::from_widths(
            available_width,
            request
                .preferred_section_width
                .unwrap_or(state.config.legend_section_width),
        ),
    };

    let sections = geometry.section_count;
    let max = state.config.legend_max_sections;
    if sections > max {
        return Err(LegendError::TooManySections {
            requested: sections,
            max,
        }
        .into());
    }
    let map_height = request.map_height;
    let mut layers = request.layers;

    // CPU-bound search, keep it off the async executor.
    let (layers, layout) = tokio::task::spawn_blocking(move || {
        let layout = make_legend(&mut layers, sections, map_height);
        (layers, layout)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in legend layout: {e}")))?;
    let layout = layout?;

    let heights = section_heights(&layers);
    let height = legend_height(&heights);

    info!(
        layers = layers.len(),
        sections_available = sections,
        sections_used = layout.sections_used,
        strategy = ?layout.strategy,
        legend_height = height,
        "Legend layout generated"
    );

    Ok(Json(LayoutResponse {
        layers,
        sections_used: layout.sections_used,
        strategy: layout.strategy,
        section_width: geometry.section_width,
        section_heights: heights,
        legend_height: height,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
