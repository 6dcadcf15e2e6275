//! Tuning parameters for measurement, estimation and stabilization

use crate::error::{PaginationError, Result};
use crate::layout::RenderedNode;
use serde::{Deserialize, Serialize};

/// How a target page count is derived from measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EstimateStrategy {
    /// `ceil(content height / content area height)`
    Division,
    /// Adjust the rendered count by the overflow past the last rendered
    /// break. Falls back to division until a break has been rendered.
    OverflowCorrection,
}

/// Markers that identify injected pagination nodes in the render tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScaffoldSelector {
    pub id: String,
    pub class: String,
    pub attribute: String,
}

impl Default for ScaffoldSelector {
    fn default() -> Self {
        Self {
            id: "pages".to_string(),
            class: "rm-page-break".to_string(),
            attribute: "data-rm-pagination".to_string(),
        }
    }
}

impl ScaffoldSelector {
    /// Check whether a node is pagination scaffolding rather than content
    pub fn matches(&self, node: &RenderedNode) -> bool {
        if node.scaffold {
            return true;
        }
        if !self.id.is_empty() && node.id.as_deref() == Some(self.id.as_str()) {
            return true;
        }
        if !self.class.is_empty() && node.classes.iter().any(|c| c == &self.class) {
            return true;
        }
        !self.attribute.is_empty() && node.attributes.iter().any(|a| a == &self.attribute)
    }
}

/// Tuning constants for the pagination feedback loop.
///
/// These are heuristics, not layout semantics. All of them can be set from
/// JSON alongside the page configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationTuning {
    /// Content area heights at or below this collapse to one page
    pub geometry_floor: f32,
    /// Measured content below this is treated as a one-page document
    pub noise_floor: f32,
    /// Allowance added to tables and stretched wrappers measured by their
    /// inner content
    pub inner_padding: f32,
    /// Hard ceiling on the number of pages
    pub max_pages: usize,
    /// Overflow past the last break that is ignored
    pub overflow_tolerance: f32,
    /// Empty pages (page + gap spans) required before pages are removed
    pub removal_hysteresis_pages: u32,
    /// Corrective passes allowed before the controller locks
    pub max_attempts: u32,
    /// How long a lock holds the page count frozen
    pub lock_cooldown_ms: u64,
    /// Lock applied after a width/height swap while layout settles
    pub orientation_cooldown_ms: u64,
    /// Minimum time between two estimation passes
    pub min_pass_interval_ms: u64,
    pub strategy: EstimateStrategy,
    pub scaffold: ScaffoldSelector,
}

impl Default for PaginationTuning {
    fn default() -> Self {
        Self {
            geometry_floor: 50.0,
            noise_floor: 50.0,
            inner_padding: 8.0,
            max_pages: 300,
            overflow_tolerance: 10.0,
            removal_hysteresis_pages: 2,
            max_attempts: 10,
            lock_cooldown_ms: 1000,
            orientation_cooldown_ms: 300,
            min_pass_interval_ms: 25,
            strategy: EstimateStrategy::OverflowCorrection,
            scaffold: ScaffoldSelector::default(),
        }
    }
}

impl PaginationTuning {
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: PaginationTuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.geometry_floor.is_finite() || self.geometry_floor <= 0.0 {
            return Err(PaginationError::InvalidConfig(
                "geometryFloor must be positive".to_string(),
            ));
        }
        if !self.noise_floor.is_finite() || self.noise_floor < 0.0 {
            return Err(PaginationError::InvalidConfig(
                "noiseFloor must be non-negative".to_string(),
            ));
        }
        if !self.overflow_tolerance.is_finite() || self.overflow_tolerance < 0.0 {
            return Err(PaginationError::InvalidConfig(
                "overflowTolerance must be non-negative".to_string(),
            ));
        }
        if self.max_pages == 0 {
            return Err(PaginationError::InvalidConfig(
                "maxPages must be at least 1".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(PaginationError::InvalidConfig(
                "maxAttempts must be at least 1".to_string(),
            ));
        }
        if self.removal_hysteresis_pages == 0 {
            return Err(PaginationError::InvalidConfig(
                "removalHysteresisPages must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
