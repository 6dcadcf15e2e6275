//! Attempt-counted convergence loop with a lock as circuit breaker

use crate::config::{DimensionSignature, PaginationTuning};
use tracing::{debug, trace, warn};

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Rendered page count matches the last estimate
    Stable,
    /// Rebuilding towards a new target
    Correcting,
    /// Frozen until the given timestamp
    Locked { until_ms: u64 },
}

/// What the session should do with an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Rebuild decorations for this many pages
    Rebuild(usize),
    /// Nothing to do, the rendered count is right
    Settled(usize),
    /// Locked: keep showing `pages`, try again after `retry_in_ms`
    Frozen { pages: usize, retry_in_ms: u64 },
    /// Too soon after the previous pass
    Throttled { retry_in_ms: u64 },
}

/// Outcome of comparing page dimensions against the last seen ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionChange {
    Unchanged,
    Resized,
    /// Width and height swapped: orientation change
    Transposed,
}

/// Per-session convergence state.
///
/// Every estimate that disagrees with the rendered page count costs one
/// attempt. Exceeding `max_attempts` before the loop settles locks the page
/// count for `lock_cooldown_ms`; after that a fresh round of attempts starts.
#[derive(Debug, Clone)]
pub struct StabilizationController {
    state: ControllerState,
    current_page_count: usize,
    update_attempts: u32,
    dimensions: Option<DimensionSignature>,
    last_pass_ms: Option<u64>,
    /// Next pass skips the throttle (config change or unlock)
    force_next: bool,
    max_attempts: u32,
    lock_cooldown_ms: u64,
    orientation_cooldown_ms: u64,
    min_pass_interval_ms: u64,
}

impl StabilizationController {
    pub fn new(tuning: &PaginationTuning) -> Self {
        Self {
            state: ControllerState::Correcting,
            current_page_count: 1,
            update_attempts: 0,
            dimensions: None,
            last_pass_ms: None,
            force_next: true,
            max_attempts: tuning.max_attempts.max(1),
            lock_cooldown_ms: tuning.lock_cooldown_ms,
            orientation_cooldown_ms: tuning.orientation_cooldown_ms,
            min_pass_interval_ms: tuning.min_pass_interval_ms,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Last accepted page count
    pub fn current_page_count(&self) -> usize {
        self.current_page_count
    }

    pub fn update_attempts(&self) -> u32 {
        self.update_attempts
    }

    pub fn is_locked(&self, now_ms: u64) -> bool {
        matches!(self.state, ControllerState::Locked { until_ms } if now_ms < until_ms)
    }

    /// Milliseconds until the lock lifts, if locked
    pub fn lock_remaining(&self, now_ms: u64) -> Option<u64> {
        match self.state {
            ControllerState::Locked { until_ms } if now_ms < until_ms => Some(until_ms - now_ms),
            _ => None,
        }
    }

    /// Decide what to do with a new estimate
    pub fn evaluate(&mut self, target: usize, rendered: usize, now_ms: u64) -> Decision {
        self.evaluate_pass(target, rendered, false, now_ms)
    }

    /// Like [`evaluate`](Self::evaluate), but `refresh` marks the rendered
    /// decorations as outdated (measured band heights moved). A refresh at
    /// an unchanged page count is a correction too and costs an attempt.
    pub fn evaluate_pass(&mut self, target: usize, rendered: usize, refresh: bool, now_ms: u64) -> Decision {
        if let ControllerState::Locked { until_ms } = self.state {
            if now_ms < until_ms {
                trace!(
                    target: "pageflow::stabilize",
                    target_pages = target,
                    frozen_pages = self.current_page_count,
                    "locked, estimate ignored"
                );
                return Decision::Frozen {
                    pages: self.current_page_count,
                    retry_in_ms: until_ms - now_ms,
                };
            }
            debug!(target: "pageflow::stabilize", pages = self.current_page_count, "lock released");
            self.state = ControllerState::Correcting;
            self.update_attempts = 0;
            self.force_next = true;
        }

        if !self.force_next {
            if let Some(last) = self.last_pass_ms {
                let elapsed = now_ms.saturating_sub(last);
                if elapsed < self.min_pass_interval_ms {
                    return Decision::Throttled {
                        retry_in_ms: self.min_pass_interval_ms - elapsed,
                    };
                }
            }
        }
        self.force_next = false;
        self.last_pass_ms = Some(now_ms);

        if target == rendered && !refresh {
            if self.state != ControllerState::Stable {
                debug!(
                    target: "pageflow::stabilize",
                    pages = rendered,
                    attempts = self.update_attempts,
                    "pagination stable"
                );
            }
            self.state = ControllerState::Stable;
            self.update_attempts = 0;
            self.current_page_count = rendered;
            return Decision::Settled(rendered);
        }

        self.update_attempts += 1;
        if self.update_attempts > self.max_attempts {
            let until_ms = now_ms.saturating_add(self.lock_cooldown_ms);
            warn!(
                target: "pageflow::stabilize",
                target_pages = target,
                rendered_pages = rendered,
                frozen_pages = self.current_page_count,
                cooldown_ms = self.lock_cooldown_ms,
                "pagination did not converge, locking"
            );
            self.state = ControllerState::Locked { until_ms };
            self.update_attempts = 0;
            return Decision::Frozen {
                pages: self.current_page_count,
                retry_in_ms: self.lock_cooldown_ms,
            };
        }

        debug!(
            target: "pageflow::stabilize",
            from = rendered,
            to = target,
            attempt = self.update_attempts,
            refresh,
            "correcting page count"
        );
        self.state = ControllerState::Correcting;
        self.current_page_count = target;
        Decision::Rebuild(target)
    }

    /// Track page dimensions; resets attempts when they change
    pub fn observe_dimensions(&mut self, dimensions: DimensionSignature, now_ms: u64) -> DimensionChange {
        let previous = match self.dimensions.replace(dimensions) {
            None => return DimensionChange::Unchanged,
            Some(previous) if previous == dimensions => return DimensionChange::Unchanged,
            Some(previous) => previous,
        };

        self.update_attempts = 0;
        if dimensions.is_transposed_of(&previous) {
            let until_ms = now_ms.saturating_add(self.orientation_cooldown_ms);
            debug!(
                target: "pageflow::stabilize",
                width = dimensions.width,
                height = dimensions.height,
                cooldown_ms = self.orientation_cooldown_ms,
                "orientation change, holding page count"
            );
            self.state = ControllerState::Locked { until_ms };
            DimensionChange::Transposed
        } else {
            debug!(
                target: "pageflow::stabilize",
                width = dimensions.width,
                height = dimensions.height,
                "page resized"
            );
            self.state = ControllerState::Correcting;
            self.force_next = true;
            DimensionChange::Resized
        }
    }

    /// Restart convergence after a configuration change
    pub fn invalidate(&mut self) {
        self.state = ControllerState::Correcting;
        self.update_attempts = 0;
        self.force_next = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> PaginationTuning {
        PaginationTuning {
            max_attempts: 5,
            lock_cooldown_ms: 1000,
            orientation_cooldown_ms: 300,
            min_pass_interval_ms: 25,
            ..PaginationTuning::default()
        }
    }

    #[test]
    fn test_matching_target_settles() {
        let mut controller = StabilizationController::new(&tuning());
        assert_eq!(controller.evaluate(2, 2, 0), Decision::Settled(2));
        assert_eq!(controller.state(), ControllerState::Stable);
        assert_eq!(controller.update_attempts(), 0);
    }

    #[test]
    fn test_mismatch_rebuilds_then_settles() {
        let mut controller = StabilizationController::new(&tuning());
        assert_eq!(controller.evaluate(3, 1, 0), Decision::Rebuild(3));
        assert_eq!(controller.state(), ControllerState::Correcting);
        assert_eq!(controller.update_attempts(), 1);

        assert_eq!(controller.evaluate(3, 3, 100), Decision::Settled(3));
        assert_eq!(controller.update_attempts(), 0);
        assert_eq!(controller.current_page_count(), 3);
    }

    #[test]
    fn test_oscillation_locks_within_bound() {
        let tuning = tuning();
        let mut controller = StabilizationController::new(&tuning);
        let mut now = 0;
        let mut rendered = 3;
        let mut passes = 0;

        loop {
            // Noisy measurement flips the target by one page every pass
            let target = if rendered == 3 { 4 } else { 3 };
            passes += 1;
            match controller.evaluate(target, rendered, now) {
                Decision::Rebuild(pages) => rendered = pages,
                Decision::Frozen { .. } => break,
                other => panic!("unexpected decision {:?}", other),
            }
            now += 50;
            assert!(passes <= tuning.max_attempts + 1, "controller never locked");
        }

        assert_eq!(passes, tuning.max_attempts + 1);
        assert!(controller.is_locked(now));
        assert_eq!(controller.update_attempts(), 0);
    }

    #[test]
    fn test_refresh_costs_an_attempt() {
        let tuning = tuning();
        let mut controller = StabilizationController::new(&tuning);
        assert_eq!(controller.evaluate_pass(2, 2, true, 0), Decision::Rebuild(2));
        assert_eq!(controller.state(), ControllerState::Correcting);
        assert_eq!(controller.update_attempts(), 1);

        // Band heights that never stop moving end in a lock like any oscillation
        let mut now = 0;
        let mut passes = 1;
        loop {
            now += 50;
            passes += 1;
            match controller.evaluate_pass(2, 2, true, now) {
                Decision::Rebuild(2) => {}
                Decision::Frozen { pages, .. } => {
                    assert_eq!(pages, 2);
                    break;
                }
                other => panic!("unexpected decision {:?}", other),
            }
            assert!(passes <= tuning.max_attempts + 1, "controller never locked");
        }
        assert_eq!(passes, tuning.max_attempts + 1);
        assert!(controller.is_locked(now));
    }

    #[test]
    fn test_lock_ignores_targets_until_cooldown() {
        let mut controller = StabilizationController::new(&tuning());
        let mut now = 0;
        for i in 0..6 {
            controller.evaluate(10 + i, 1, now);
            now += 50;
        }
        let locked_at = now - 50;
        let frozen = controller.current_page_count();
        assert!(controller.is_locked(now));

        match controller.evaluate(42, 1, now) {
            Decision::Frozen { pages, retry_in_ms } => {
                assert_eq!(pages, frozen);
                assert_eq!(retry_in_ms, locked_at + 1000 - now);
            }
            other => panic!("expected frozen, got {:?}", other),
        }

        // Cooldown over: one fresh attempt goes through, even right away
        let after = locked_at + 1000;
        assert_eq!(controller.evaluate(42, 1, after), Decision::Rebuild(42));
        assert_eq!(controller.update_attempts(), 1);
        assert_eq!(controller.state(), ControllerState::Correcting);
    }

    #[test]
    fn test_throttle_rejects_back_to_back_passes() {
        let mut controller = StabilizationController::new(&tuning());
        assert_eq!(controller.evaluate(2, 1, 100), Decision::Rebuild(2));
        assert_eq!(
            controller.evaluate(3, 2, 110),
            Decision::Throttled { retry_in_ms: 15 }
        );
        assert_eq!(controller.update_attempts(), 1);
        assert_eq!(controller.evaluate(3, 2, 125), Decision::Rebuild(3));
    }

    #[test]
    fn test_invalidate_bypasses_throttle_and_resets() {
        let mut controller = StabilizationController::new(&tuning());
        controller.evaluate(2, 1, 100);
        controller.invalidate();
        assert_eq!(controller.update_attempts(), 0);
        assert_eq!(controller.evaluate(3, 2, 101), Decision::Rebuild(3));
    }

    #[test]
    fn test_resize_resets_attempts() {
        let mut controller = StabilizationController::new(&tuning());
        let portrait = DimensionSignature { width: 816, height: 1056 };
        assert_eq!(controller.observe_dimensions(portrait, 0), DimensionChange::Unchanged);

        controller.evaluate(2, 1, 0);
        controller.evaluate(3, 2, 50);
        assert_eq!(controller.update_attempts(), 2);

        let wider = DimensionSignature { width: 900, height: 1056 };
        assert_eq!(controller.observe_dimensions(wider, 60), DimensionChange::Resized);
        assert_eq!(controller.update_attempts(), 0);
        assert_eq!(controller.state(), ControllerState::Correcting);
        assert_eq!(controller.evaluate(4, 3, 61), Decision::Rebuild(4));
    }

    #[test]
    fn test_orientation_change_locks_briefly() {
        let mut controller = StabilizationController::new(&tuning());
        controller.observe_dimensions(DimensionSignature { width: 816, height: 1056 }, 0);
        controller.evaluate(2, 2, 0);

        let change = controller.observe_dimensions(DimensionSignature { width: 1056, height: 816 }, 100);
        assert_eq!(change, DimensionChange::Transposed);
        assert_eq!(controller.lock_remaining(100), Some(300));
        assert!(matches!(
            controller.evaluate(3, 2, 200),
            Decision::Frozen { pages: 2, .. }
        ));
        assert_eq!(controller.evaluate(3, 2, 400), Decision::Rebuild(3));
    }
}
