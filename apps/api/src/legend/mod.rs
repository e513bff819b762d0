// Legend section packing.
// Splits a legend tree (layers → groups → items, heights precomputed by the renderer)
// into a bounded number of fixed-height sections by marking `splitBefore` breaks.
// Pure and synchronous; HTTP callers run it inside tokio::task::spawn_blocking.

pub mod allocator;
pub mod combinations;
pub mod dispatch;
pub mod geometry;
pub mod handlers;
pub mod model;
pub mod packing;
pub mod splitter;

// Re-export the public API consumed by handlers and the error layer.
pub use dispatch::{make_legend, LegendError, PackingStrategy};
pub use model::Layer;
