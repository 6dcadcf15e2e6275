//! Per-document pagination session
//!
//! Wires measurement, estimation, stabilization and decoration building to
//! the host's change notifications, post-render hook and scheduler. Each
//! editor instance owns its own session; nothing here is process-global
//! apart from the id counter used to tag transactions.

pub mod clock;
mod host;

pub use host::{
    BandMeasurement, DecorationUpdate, DeferredKind, DocumentChange, FrameScheduler, PassTicket,
    QueuedScheduler, RenderSnapshot, RenderSurface, ScheduledPass, SessionId, TransactionMeta,
};

use crate::config::{ConfigChange, ConfigCommand, PageConfig, PaginationTuning};
use crate::error::Result;
use crate::layout::{
    measure_content_height, Band, BreakBoundary, Estimate, EstimateInput, PageCountEstimator,
    PageGeometry, PageHeightCache, DEFAULT_SLOT,
};
use crate::render::{build_decorations, DecorationSet};
use crate::stabilize::{ControllerState, Decision, StabilizationController};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Pagination state for one document
pub struct PaginationSession<S: FrameScheduler> {
    id: SessionId,
    config: PageConfig,
    tuning: PaginationTuning,
    estimator: PageCountEstimator,
    heights: PageHeightCache,
    controller: StabilizationController,
    decorations: DecorationSet,
    scheduler: S,
    alive: bool,
    /// Bumped on every schedule; older tickets are stale
    generation: u64,
    pending: Option<PassTicket>,
    /// A rebuild was handed out and the host has not rendered it yet
    awaiting_render: bool,
    /// A pass was requested while awaiting render
    dirty: bool,
    /// Decorations must be rebuilt even if the page count holds
    stale_decorations: bool,
    degenerate_logged: bool,
    version: u64,
}

impl<S: FrameScheduler> PaginationSession<S> {
    /// Create a session with a single-page overlay ready to render
    pub fn new(config: PageConfig, tuning: PaginationTuning, scheduler: S) -> Result<Self> {
        config.validate()?;
        tuning.validate()?;

        let heights = PageHeightCache::new();
        let mut controller = StabilizationController::new(&tuning);
        controller.observe_dimensions(config.dimensions(), 0);
        let decorations = DecorationSet::new(1, build_decorations(&config, &heights, 1, tuning.max_pages));

        let id = SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));
        debug!(target: "pageflow::session", session = id.0, "pagination session created");

        Ok(Self {
            id,
            estimator: PageCountEstimator::new(&tuning),
            config,
            tuning,
            heights,
            controller,
            decorations,
            scheduler,
            alive: true,
            generation: 0,
            pending: None,
            awaiting_render: true,
            dirty: false,
            stale_decorations: false,
            degenerate_logged: false,
            version: 1,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn tuning(&self) -> &PaginationTuning {
        &self.tuning
    }

    /// Decorations last handed to the host
    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    pub fn page_count(&self) -> usize {
        self.decorations.total_pages
    }

    pub fn controller_state(&self) -> ControllerState {
        self.controller.state()
    }

    pub fn heights(&self) -> &PageHeightCache {
        &self.heights
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Handle a document change notification
    pub fn on_document_change(
        &mut self,
        change: &DocumentChange,
        surface: &impl RenderSurface,
        now_ms: u64,
    ) -> Option<DecorationUpdate> {
        if !self.alive {
            return None;
        }
        if change.is_from(self.id) || !change.content_changed {
            trace!(target: "pageflow::session", session = self.id.0, "decoration-only change ignored");
            return None;
        }
        self.run_pass(surface, now_ms)
    }

    /// Handle the host's post-render hook
    pub fn on_post_render(&mut self, surface: &impl RenderSurface, _now_ms: u64) {
        if !self.alive {
            return;
        }
        let snapshot = surface.snapshot();
        let heights_changed = self.record_band_heights(&snapshot);
        let rendered_rebuild = std::mem::take(&mut self.awaiting_render);

        if rendered_rebuild || self.dirty || heights_changed {
            self.schedule(DeferredKind::Remeasure, None);
        }
    }

    /// Run a deferred pass the host scheduled for us
    pub fn run_deferred(
        &mut self,
        ticket: PassTicket,
        surface: &impl RenderSurface,
        now_ms: u64,
    ) -> Option<DecorationUpdate> {
        if !self.alive {
            trace!(target: "pageflow::session", session = self.id.0, "deferred pass after teardown");
            return None;
        }
        if self.pending != Some(ticket) {
            trace!(
                target: "pageflow::session",
                session = self.id.0,
                generation = ticket.generation,
                "stale deferred pass"
            );
            return None;
        }
        self.pending = None;
        self.run_pass(surface, now_ms)
    }

    /// Apply a configuration command and restart convergence
    pub fn apply_command(&mut self, command: &ConfigCommand, now_ms: u64) -> Result<Option<DecorationUpdate>> {
        if !self.alive {
            return Ok(None);
        }
        let (next, change) = self.config.apply(command)?;

        match change {
            ConfigChange::Unchanged => return Ok(None),
            ConfigChange::Structural => self.heights.clear(),
            ConfigChange::Band { slot, band: Some(band) } => self.heights.remove(band, slot),
            ConfigChange::Band { slot, band: None } => self.heights.invalidate(slot),
            ConfigChange::Cosmetic => {}
        }
        debug!(target: "pageflow::session", session = self.id.0, ?change, "configuration updated");

        self.config = next;
        self.degenerate_logged = false;
        self.controller.invalidate();
        if change.is_structural() {
            self.controller.observe_dimensions(self.config.dimensions(), now_ms);
        }

        if self.awaiting_render {
            self.stale_decorations = true;
            self.dirty = true;
            return Ok(None);
        }
        let pages = self.decorations.total_pages;
        Ok(Some(self.rebuild(pages)))
    }

    /// Tear down; pending and future passes become no-ops
    pub fn destroy(&mut self) {
        if self.alive {
            debug!(target: "pageflow::session", session = self.id.0, "pagination session destroyed");
        }
        self.alive = false;
        self.pending = None;
    }

    fn run_pass(&mut self, surface: &impl RenderSurface, now_ms: u64) -> Option<DecorationUpdate> {
        if self.awaiting_render {
            self.dirty = true;
            return None;
        }
        self.dirty = false;

        let snapshot = surface.snapshot();
        let rendered = snapshot.rendered_pages.unwrap_or(self.decorations.total_pages);
        let estimate = self.estimate(&snapshot, rendered);

        // Outdated band heights cost an attempt like a page count mismatch
        let refresh = self.stale_decorations;
        match self.controller.evaluate_pass(estimate.target, rendered, refresh, now_ms) {
            Decision::Rebuild(pages) => Some(self.rebuild(pages)),
            Decision::Settled(_) => None,
            Decision::Frozen { retry_in_ms, .. } => {
                self.schedule(DeferredKind::Unlock, Some(retry_in_ms));
                None
            }
            Decision::Throttled { retry_in_ms } => {
                self.schedule(DeferredKind::Throttle, Some(retry_in_ms));
                None
            }
        }
    }

    fn estimate(&mut self, snapshot: &RenderSnapshot, rendered: usize) -> Estimate {
        let geometry = PageGeometry::compute(
            &self.config,
            self.heights.header(DEFAULT_SLOT),
            self.heights.footer(DEFAULT_SLOT),
        );
        if geometry.is_degenerate(self.tuning.geometry_floor) && !self.degenerate_logged {
            warn!(
                target: "pageflow::layout",
                session = self.id.0,
                content_area = geometry.content_area_height,
                floor = self.tuning.geometry_floor,
                "content area below floor, paginating as one page"
            );
            self.degenerate_logged = true;
        }

        let measurement = measure_content_height(&snapshot.nodes, &self.tuning);
        let boundary = match (measurement.content_bottom, snapshot.last_break_bottom) {
            (Some(content_bottom), Some(break_bottom)) => Some(BreakBoundary {
                content_bottom,
                break_bottom,
            }),
            _ => None,
        };

        let estimate = self.estimator.estimate(&EstimateInput {
            content: measurement.height,
            geometry,
            page_gap: self.config.page_gap,
            rendered_pages: rendered,
            boundary,
        });
        trace!(
            target: "pageflow::layout",
            session = self.id.0,
            strategy = ?self.estimator.strategy(),
            content_height = measurement.height.value(),
            content_nodes = measurement.node_count,
            content_area = geometry.content_area_height,
            rendered_pages = rendered,
            target_pages = estimate.target,
            reason = ?estimate.reason,
            "page count estimated"
        );
        estimate
    }

    fn rebuild(&mut self, pages: usize) -> DecorationUpdate {
        self.version += 1;
        let built = build_decorations(&self.config, &self.heights, pages, self.tuning.max_pages);
        self.decorations = DecorationSet::new(self.version, built);
        self.awaiting_render = true;
        self.stale_decorations = false;
        debug!(
            target: "pageflow::session",
            session = self.id.0,
            pages = self.decorations.total_pages,
            version = self.version,
            "decorations rebuilt"
        );

        DecorationUpdate {
            meta: TransactionMeta {
                session: self.id,
                version: self.version,
            },
            decorations: self.decorations.clone(),
        }
    }

    /// Store measured band heights from a render of the current decorations
    fn record_band_heights(&mut self, snapshot: &RenderSnapshot) -> bool {
        if !snapshot.shows_version(self.decorations.version) {
            trace!(
                target: "pageflow::session",
                session = self.id.0,
                rendered_version = ?snapshot.decoration_version,
                "band heights from an outdated render ignored"
            );
            return false;
        }
        let mut changed = false;
        for band in &snapshot.bands {
            if let Some(height) = band.header {
                let slot = match self.config.header_for(band.page_number) {
                    (_, true) => band.page_number,
                    (_, false) => DEFAULT_SLOT,
                };
                changed |= self.heights.set(Band::Header, slot, height);
            }
            if let Some(height) = band.footer {
                let slot = match self.config.footer_for(band.page_number) {
                    (_, true) => band.page_number,
                    (_, false) => DEFAULT_SLOT,
                };
                changed |= self.heights.set(Band::Footer, slot, height);
            }
        }
        if changed {
            self.stale_decorations = true;
        }
        changed
    }

    fn schedule(&mut self, kind: DeferredKind, delay_ms: Option<u64>) {
        if self.pending.map_or(false, |p| p.kind == kind) {
            return;
        }
        self.generation += 1;
        let ticket = PassTicket {
            session: self.id,
            generation: self.generation,
            kind,
        };
        self.pending = Some(ticket);
        match delay_ms {
            None => self.scheduler.request_frame(ticket),
            Some(delay) => self.scheduler.set_timeout(ticket, delay),
        }
    }
}
