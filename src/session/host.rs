//! Seams to the host editor: render snapshots, scheduling, transactions

use crate::layout::RenderedNode;
use crate::render::DecorationSet;
use serde::{Deserialize, Serialize};

/// Identifies a pagination session for transaction tagging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

/// Header/footer heights measured on one rendered page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandMeasurement {
    pub page_number: u32,
    #[serde(default)]
    pub header: Option<f32>,
    #[serde(default)]
    pub footer: Option<f32>,
}

/// What the host has on screen right now
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderSnapshot {
    /// Direct children of the document container, scaffolding included
    pub nodes: Vec<RenderedNode>,
    /// Page wrappers currently rendered; `None` means "whatever was last emitted"
    pub rendered_pages: Option<usize>,
    /// Bottom edge of the last rendered page break
    pub last_break_bottom: Option<f32>,
    /// Version of the decoration set on screen, if the host tracks it
    pub decoration_version: Option<u64>,
    pub bands: Vec<BandMeasurement>,
}

impl RenderSnapshot {
    /// True unless the host reports a different decoration set on screen
    pub fn shows_version(&self, version: u64) -> bool {
        self.decoration_version.map_or(true, |v| v == version)
    }
}

/// Host-side access to the rendered document
pub trait RenderSurface {
    fn snapshot(&self) -> RenderSnapshot;
}

impl RenderSurface for RenderSnapshot {
    fn snapshot(&self) -> RenderSnapshot {
        self.clone()
    }
}

/// Why a deferred pass was scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeferredKind {
    /// Re-measure on the next frame once the DOM has settled
    Remeasure,
    /// Retry after the controller's lock cooldown
    Unlock,
    /// Retry after the minimum pass interval
    Throttle,
}

/// Handle for a single-shot deferred pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassTicket {
    pub session: SessionId,
    pub generation: u64,
    pub kind: DeferredKind,
}

/// Single-shot deferred callbacks on the host's event loop.
///
/// The host calls `PaginationSession::run_deferred` with the ticket when the
/// frame or timeout fires.
pub trait FrameScheduler {
    fn request_frame(&mut self, ticket: PassTicket);
    fn set_timeout(&mut self, ticket: PassTicket, delay_ms: u64);
}

/// A pass requested from a [`QueuedScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledPass {
    pub ticket: PassTicket,
    /// `None` for "next frame"
    pub delay_ms: Option<u64>,
}

/// Scheduler that records the latest request for the host to drain
#[derive(Debug, Default)]
pub struct QueuedScheduler {
    queued: Option<ScheduledPass>,
}

impl QueuedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peek(&self) -> Option<&ScheduledPass> {
        self.queued.as_ref()
    }

    pub fn take(&mut self) -> Option<ScheduledPass> {
        self.queued.take()
    }
}

impl FrameScheduler for QueuedScheduler {
    fn request_frame(&mut self, ticket: PassTicket) {
        self.queued = Some(ScheduledPass {
            ticket,
            delay_ms: None,
        });
    }

    fn set_timeout(&mut self, ticket: PassTicket, delay_ms: u64) {
        self.queued = Some(ScheduledPass {
            ticket,
            delay_ms: Some(delay_ms),
        });
    }
}

/// Meta attached to transactions the session itself produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMeta {
    pub session: SessionId,
    pub version: u64,
}

/// Change notification from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentChange {
    /// Document content or marks changed (not just decorations)
    pub content_changed: bool,
    pub meta: Option<TransactionMeta>,
}

impl DocumentChange {
    pub fn content() -> Self {
        Self {
            content_changed: true,
            meta: None,
        }
    }

    /// True when this change is the echo of an update from `session`
    pub fn is_from(&self, session: SessionId) -> bool {
        self.meta.map_or(false, |m| m.session == session)
    }
}

/// New decorations for the host to dispatch, tagged with `meta`
#[derive(Debug, Clone, PartialEq)]
pub struct DecorationUpdate {
    pub meta: TransactionMeta,
    pub decorations: DecorationSet,
}
