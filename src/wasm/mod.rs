//! WASM bindings for the paginator
//!
//! JSON crosses the bridge for configuration, commands and render snapshots.
//! Decorations go back through the flat buffer; `decorationsJson` exists for
//! hosts that prefer plain objects.

pub mod flat_buffer;

use crate::config::{ConfigCommand, PageConfig, PaginationTuning};
use crate::session::clock::now_ms;
use crate::session::{
    DecorationUpdate, DocumentChange, PaginationSession, QueuedScheduler, RenderSnapshot, SessionId,
    TransactionMeta,
};
use flat_buffer::{state_opcode, DecorationBuffer};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WASM-exposed pagination session.
///
/// The host drains one deferred pass at a time: after any call, check
/// `pendingDelay()` and schedule `runDeferred` on the next frame (0) or after
/// the returned number of milliseconds.
#[wasm_bindgen]
pub struct WasmPaginator {
    session: PaginationSession<QueuedScheduler>,
    buffer: DecorationBuffer,
}

#[wasm_bindgen]
impl WasmPaginator {
    /// Create a paginator. Empty strings select the defaults (US Letter).
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, tuning_json: &str) -> Result<WasmPaginator, JsError> {
        let config = if config_json.trim().is_empty() {
            PageConfig::default()
        } else {
            PageConfig::from_json(config_json)?
        };
        let tuning = if tuning_json.trim().is_empty() {
            PaginationTuning::default()
        } else {
            PaginationTuning::from_json(tuning_json)?
        };

        let session = PaginationSession::new(config, tuning, QueuedScheduler::new())?;
        let mut paginator = Self {
            session,
            buffer: DecorationBuffer::new(),
        };
        paginator.refresh_buffer();
        Ok(paginator)
    }

    /// Id to tag the host transactions that carry our decorations
    #[wasm_bindgen(js_name = sessionId)]
    pub fn session_id(&self) -> f64 {
        self.session.id().0 as f64
    }

    /// Apply a JSON configuration command. Returns true if decorations changed.
    #[wasm_bindgen(js_name = applyCommand)]
    pub fn apply_command(&mut self, command_json: &str) -> Result<bool, JsError> {
        let command: ConfigCommand = serde_json::from_str(command_json)?;
        let update = self.session.apply_command(&command, now_ms())?;
        Ok(self.publish(update))
    }

    /// Document change notification. `origin` is the session id from the
    /// transaction meta, if any.
    #[wasm_bindgen(js_name = documentChanged)]
    pub fn document_changed(
        &mut self,
        snapshot_json: &str,
        content_changed: bool,
        origin: Option<f64>,
    ) -> Result<bool, JsError> {
        let snapshot: RenderSnapshot = serde_json::from_str(snapshot_json)?;
        let change = DocumentChange {
            content_changed,
            meta: origin.map(|id| TransactionMeta {
                session: SessionId(id as u64),
                version: 0,
            }),
        };
        let update = self.session.on_document_change(&change, &snapshot, now_ms());
        Ok(self.publish(update))
    }

    /// Post-render hook
    #[wasm_bindgen(js_name = postRender)]
    pub fn post_render(&mut self, snapshot_json: &str) -> Result<(), JsError> {
        let snapshot: RenderSnapshot = serde_json::from_str(snapshot_json)?;
        self.session.on_post_render(&snapshot, now_ms());
        Ok(())
    }

    /// Delay of the queued deferred pass: 0 for next frame, `undefined` if none
    #[wasm_bindgen(js_name = pendingDelay)]
    pub fn pending_delay(&self) -> Option<f64> {
        self.session
            .scheduler()
            .peek()
            .map(|pass| pass.delay_ms.unwrap_or(0) as f64)
    }

    /// Run the queued deferred pass. Returns true if decorations changed.
    #[wasm_bindgen(js_name = runDeferred)]
    pub fn run_deferred(&mut self, snapshot_json: &str) -> Result<bool, JsError> {
        let Some(pass) = self.session.scheduler_mut().take() else {
            return Ok(false);
        };
        let snapshot: RenderSnapshot = serde_json::from_str(snapshot_json)?;
        let update = self.session.run_deferred(pass.ticket, &snapshot, now_ms());
        Ok(self.publish(update))
    }

    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.session.page_count()
    }

    /// Version of the current decoration set
    pub fn version(&self) -> f64 {
        self.session.decorations().version as f64
    }

    /// Controller state opcode (see `flat_buffer::STATE_*`)
    pub fn state(&self) -> u32 {
        state_opcode(self.session.controller_state())
    }

    #[wasm_bindgen(js_name = decorationsJson)]
    pub fn decorations_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(self.session.decorations())?)
    }

    /// Tear down; further calls are no-ops
    pub fn destroy(&mut self) {
        self.session.destroy();
        self.session.scheduler_mut().take();
    }

    // Flat buffer accessors

    #[wasm_bindgen(js_name = u32Ptr)]
    pub fn u32_ptr(&self) -> u32 {
        self.buffer.u32_ptr()
    }

    #[wasm_bindgen(js_name = u32Len)]
    pub fn u32_len(&self) -> u32 {
        self.buffer.u32_len()
    }

    #[wasm_bindgen(js_name = f32Ptr)]
    pub fn f32_ptr(&self) -> u32 {
        self.buffer.f32_ptr()
    }

    #[wasm_bindgen(js_name = f32Len)]
    pub fn f32_len(&self) -> u32 {
        self.buffer.f32_len()
    }

    #[wasm_bindgen(js_name = textPtr)]
    pub fn text_ptr(&self) -> u32 {
        self.buffer.text_ptr()
    }

    #[wasm_bindgen(js_name = textLen)]
    pub fn text_len(&self) -> u32 {
        self.buffer.text_len()
    }
}

impl WasmPaginator {
    fn publish(&mut self, update: Option<DecorationUpdate>) -> bool {
        match update {
            Some(_) => {
                self.refresh_buffer();
                true
            }
            None => {
                // Settled and frozen passes still move the controller state
                self.buffer.set_state(self.session.controller_state());
                false
            }
        }
    }

    fn refresh_buffer(&mut self) {
        self.buffer
            .write(self.session.decorations(), self.session.controller_state());
    }
}
