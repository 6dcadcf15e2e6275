//! Target page count estimation

use crate::config::{EstimateStrategy, PaginationTuning};
use crate::layout::geometry::PageGeometry;
use crate::layout::measure::ContentHeight;

/// Where real content ends relative to the last rendered page break
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakBoundary {
    /// Bottom edge of the last real content node
    pub content_bottom: f32,
    /// Bottom edge of the last rendered page-break boundary
    pub break_bottom: f32,
}

impl BreakBoundary {
    /// Positive when content runs past the last break
    pub fn overflow(&self) -> f32 {
        self.content_bottom - self.break_bottom
    }
}

/// Everything one estimation needs
#[derive(Debug, Clone, Copy)]
pub struct EstimateInput {
    pub content: ContentHeight,
    pub geometry: PageGeometry,
    pub page_gap: f32,
    /// Page count currently on screen (0 before the first render)
    pub rendered_pages: usize,
    pub boundary: Option<BreakBoundary>,
}

/// Why the estimator chose its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateReason {
    EmptyContent,
    DegenerateGeometry,
    Division,
    Overflow { pages_added: usize },
    EmptySpace { pages_removed: usize },
    WithinTolerance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Estimate {
    pub target: usize,
    pub reason: EstimateReason,
}

impl Estimate {
    /// True when applying this estimate would change what is rendered
    pub fn is_change(&self, rendered_pages: usize) -> bool {
        self.target != rendered_pages
    }
}

/// Derives a target page count with one fixed strategy.
///
/// Holds no mutable state: identical inputs always give identical targets.
#[derive(Debug, Clone)]
pub struct PageCountEstimator {
    strategy: EstimateStrategy,
    geometry_floor: f32,
    max_pages: usize,
    overflow_tolerance: f32,
    removal_hysteresis_pages: u32,
}

impl PageCountEstimator {
    pub fn new(tuning: &PaginationTuning) -> Self {
        Self {
            strategy: tuning.strategy,
            geometry_floor: tuning.geometry_floor,
            max_pages: tuning.max_pages.max(1),
            overflow_tolerance: tuning.overflow_tolerance,
            removal_hysteresis_pages: tuning.removal_hysteresis_pages.max(1),
        }
    }

    pub fn strategy(&self) -> EstimateStrategy {
        self.strategy
    }

    fn clamp(&self, pages: usize) -> usize {
        pages.clamp(1, self.max_pages)
    }

    /// Estimate the target page count
    pub fn estimate(&self, input: &EstimateInput) -> Estimate {
        if input.geometry.is_degenerate(self.geometry_floor) {
            return Estimate {
                target: 1,
                reason: EstimateReason::DegenerateGeometry,
            };
        }
        if input.content == ContentHeight::SinglePage {
            return Estimate {
                target: 1,
                reason: EstimateReason::EmptyContent,
            };
        }

        match (self.strategy, input.boundary) {
            (EstimateStrategy::OverflowCorrection, Some(boundary)) if input.rendered_pages > 0 => {
                self.correct(input, boundary)
            }
            _ => self.divide(input),
        }
    }

    fn divide(&self, input: &EstimateInput) -> Estimate {
        let pages = (input.content.value() / input.geometry.content_area_height).ceil();
        // Saturating float-to-int cast keeps absurd heights at the ceiling
        Estimate {
            target: self.clamp(pages as usize),
            reason: EstimateReason::Division,
        }
    }

    fn correct(&self, input: &EstimateInput, boundary: BreakBoundary) -> Estimate {
        let area = input.geometry.content_area_height;
        let overflow = boundary.overflow();

        if overflow > self.overflow_tolerance {
            let pages_added = (overflow / area).ceil() as usize;
            return Estimate {
                target: self.clamp(input.rendered_pages.saturating_add(pages_added)),
                reason: EstimateReason::Overflow { pages_added },
            };
        }

        let span = input.geometry.page_span(input.page_gap);
        let empty = -overflow;
        if empty > span * self.removal_hysteresis_pages as f32 {
            // Keep one span of slack per hysteresis page beyond the first
            let empty_pages = (empty / span).floor() as usize;
            let pages_removed = empty_pages + 1 - self.removal_hysteresis_pages as usize;
            return Estimate {
                target: self.clamp(input.rendered_pages.saturating_sub(pages_removed)),
                reason: EstimateReason::EmptySpace { pages_removed },
            };
        }

        Estimate {
            target: self.clamp(input.rendered_pages),
            reason: EstimateReason::WithinTolerance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;

    fn geometry_740() -> PageGeometry {
        let config = PageConfig {
            page_height: 800.0,
            margin_top: 20.0,
            margin_bottom: 20.0,
            content_margin_top: 10.0,
            content_margin_bottom: 10.0,
            ..PageConfig::default()
        };
        PageGeometry::compute(&config, 0.0, 0.0)
    }

    fn estimator(strategy: EstimateStrategy) -> PageCountEstimator {
        PageCountEstimator::new(&PaginationTuning {
            strategy,
            ..PaginationTuning::default()
        })
    }

    fn input(height: f32, rendered_pages: usize, boundary: Option<BreakBoundary>) -> EstimateInput {
        EstimateInput {
            content: ContentHeight::Measured(height),
            geometry: geometry_740(),
            page_gap: 50.0,
            rendered_pages,
            boundary,
        }
    }

    #[test]
    fn test_division_scenario() {
        let e = estimator(EstimateStrategy::Division).estimate(&input(2000.0, 1, None));
        assert_eq!(e.target, 3);
        assert_eq!(e.reason, EstimateReason::Division);
    }

    #[test]
    fn test_degenerate_geometry_is_one_page() {
        let config = PageConfig {
            page_height: 90.0,
            margin_top: 25.0,
            margin_bottom: 25.0,
            content_margin_top: 0.0,
            content_margin_bottom: 0.0,
            ..PageConfig::default()
        };
        for strategy in [EstimateStrategy::Division, EstimateStrategy::OverflowCorrection] {
            for height in [0.0, 500.0, 1.0e9] {
                let e = estimator(strategy).estimate(&EstimateInput {
                    geometry: PageGeometry::compute(&config, 0.0, 0.0),
                    ..input(height, 4, None)
                });
                assert_eq!(e.target, 1);
                assert_eq!(e.reason, EstimateReason::DegenerateGeometry);
            }
        }
    }

    #[test]
    fn test_division_is_monotonic() {
        let estimator = estimator(EstimateStrategy::Division);
        let mut previous = 0;
        for step in 0..200 {
            let target = estimator.estimate(&input(step as f32 * 97.0 + 50.0, 1, None)).target;
            assert!(target >= previous);
            assert!(target >= 1);
            previous = target;
        }
    }

    #[test]
    fn test_division_clamped_to_ceiling() {
        let e = estimator(EstimateStrategy::Division).estimate(&input(1.0e12, 1, None));
        assert_eq!(e.target, PaginationTuning::default().max_pages);
    }

    #[test]
    fn test_overflow_adds_pages() {
        let boundary = BreakBoundary {
            content_bottom: 2415.0,
            break_bottom: 2400.0,
        };
        let e = estimator(EstimateStrategy::OverflowCorrection).estimate(&input(2200.0, 3, Some(boundary)));
        assert_eq!(e.target, 4);
        assert_eq!(e.reason, EstimateReason::Overflow { pages_added: 1 });
    }

    #[test]
    fn test_overflow_within_tolerance_keeps_count() {
        let boundary = BreakBoundary {
            content_bottom: 2405.0,
            break_bottom: 2400.0,
        };
        let e = estimator(EstimateStrategy::OverflowCorrection).estimate(&input(2200.0, 3, Some(boundary)));
        assert_eq!(e.target, 3);
        assert!(!e.is_change(3));
    }

    #[test]
    fn test_large_empty_space_removes_pages() {
        let boundary = BreakBoundary {
            content_bottom: 2000.0,
            break_bottom: 4000.0,
        };
        let e = estimator(EstimateStrategy::OverflowCorrection).estimate(&input(2000.0, 5, Some(boundary)));
        assert!(e.target < 5);
        assert!(e.target >= 1);
        assert_eq!(e.target, 4);
    }

    #[test]
    fn test_one_page_of_empty_space_is_kept() {
        // Just over one page + gap of slack: below the two-page hysteresis
        let boundary = BreakBoundary {
            content_bottom: 3000.0,
            break_bottom: 3800.0,
        };
        let e = estimator(EstimateStrategy::OverflowCorrection).estimate(&input(3000.0, 5, Some(boundary)));
        assert_eq!(e.target, 5);
        assert_eq!(e.reason, EstimateReason::WithinTolerance);
    }

    #[test]
    fn test_removal_never_below_one() {
        let boundary = BreakBoundary {
            content_bottom: 100.0,
            break_bottom: 100_000.0,
        };
        let e = estimator(EstimateStrategy::OverflowCorrection).estimate(&input(100.0, 3, Some(boundary)));
        assert_eq!(e.target, 1);
    }

    #[test]
    fn test_overflow_falls_back_to_division_before_first_render() {
        let estimator = estimator(EstimateStrategy::OverflowCorrection);
        assert_eq!(estimator.strategy(), EstimateStrategy::OverflowCorrection);
        assert_eq!(estimator.estimate(&input(2000.0, 0, None)).reason, EstimateReason::Division);
        assert_eq!(estimator.estimate(&input(2000.0, 3, None)).target, 3);
    }

    #[test]
    fn test_estimate_is_idempotent() {
        let estimator = estimator(EstimateStrategy::OverflowCorrection);
        let boundary = Some(BreakBoundary {
            content_bottom: 1900.0,
            break_bottom: 1580.0,
        });
        let first = estimator.estimate(&input(1900.0, 2, boundary));
        let second = estimator.estimate(&input(1900.0, 2, boundary));
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_content_is_one_page() {
        let e = estimator(EstimateStrategy::Division).estimate(&EstimateInput {
            content: ContentHeight::SinglePage,
            ..input(0.0, 3, None)
        });
        assert_eq!(e.target, 1);
        assert_eq!(e.reason, EstimateReason::EmptyContent);
    }
}
