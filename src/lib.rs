//! Pageflow: visual pagination for a continuously-flowing rich-text editor
//!
//! The document is never split. Instead this crate computes how many pages
//! the content needs and builds page-break decorations (header, footer, gap)
//! that the host overlays onto its single editable surface:
//! - Geometry: content area per page from size, margins and band heights
//! - Measurement: real content height, with injected scaffolding excluded
//! - Estimation: division or overflow-correction against the last break
//! - Stabilization: attempt-bounded feedback loop with lock, cooldown and throttle
//!
//! Everything lives in a per-document [`PaginationSession`]; there is no
//! process-global pagination state.

pub mod config;
pub mod error;
pub mod layout;
pub mod render;
pub mod session;
pub mod stabilize;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmPaginator;

// Re-export primary types
pub use config::{BandText, ConfigCommand, EstimateStrategy, PageConfig, PaginationTuning};
pub use error::{PaginationError, Result};
pub use layout::{PageCountEstimator, PageGeometry, PageHeightCache, RenderedNode};
pub use render::{build_decorations, DecorationSet, PageBreakDecoration};
pub use session::{
    DocumentChange, FrameScheduler, PaginationSession, QueuedScheduler, RenderSnapshot, RenderSurface,
};
pub use stabilize::{ControllerState, StabilizationController};

use serde::{Deserialize, Serialize};

/// Rendered rectangle in host pixels, relative to the document container
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}
