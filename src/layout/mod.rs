//! Page geometry, content measurement and page count estimation

mod estimate;
mod geometry;
mod heights;
mod measure;

pub use estimate::{BreakBoundary, Estimate, EstimateInput, EstimateReason, PageCountEstimator};
pub use geometry::{content_area_height, PageGeometry};
pub use heights::{Band, PageHeightCache, DEFAULT_SLOT};
pub use measure::{measure_content_height, ContentHeight, ContentMeasurement, NodeKind, RenderedNode};
