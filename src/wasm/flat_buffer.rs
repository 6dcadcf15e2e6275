//! Flat buffer protocol for zero-copy WASM bridge
//!
//! Binary format for one decoration set:
//!
//! ## u32 Buffer Layout:
//! ```text
//! Header:
//! [0]     MAGIC (0x5047424B = "PGBK" for validation)
//! [1]     SCHEMA_VERSION (protocol version, currently 1)
//! [2]     version_lo (decoration set version)
//! [3]     version_hi
//! [4]     page_count
//! [5]     text_buffer_len
//! [6]     controller state (STATE_* opcode)
//! [7..11] gap background text ref: [offset, len, utf16_offset, utf16_len]
//! [11..]  page data...
//!
//! Per-page (U32_PER_PAGE):
//!   page_number
//!   flags: bit0=first page, bit1=last page, bit2=header override, bit3=footer override
//!   6 text refs, header left/center/right then footer left/center/right:
//!     [offset, len, utf16_offset, utf16_len]
//!     offset/len: byte offsets in text_data (UTF-8)
//!     utf16_offset/utf16_len: offsets for JS substring (after single decode)
//! ```
//!
//! ## f32 Buffer Layout:
//! ```text
//! Per-page: [offset, content_area_height, header_height, header_reserved,
//!            footer_height, footer_reserved, gap_height]
//! ```

use crate::render::{BandSlots, DecorationSet};
use crate::stabilize::ControllerState;

/// Magic number for format validation: "PGBK" (PaGe BreaK)
pub const MAGIC: u32 = 0x5047424B;

/// Schema version for protocol compatibility checking
pub const SCHEMA_VERSION: u32 = 1;

/// Header size in u32 elements
pub const HEADER_SIZE: usize = 11;

/// Controller state opcodes
pub const STATE_STABLE: u32 = 0;
pub const STATE_CORRECTING: u32 = 1;
pub const STATE_LOCKED: u32 = 2;

/// Flags bitmask
pub const FLAG_FIRST_PAGE: u32 = 0b0001;
pub const FLAG_LAST_PAGE: u32 = 0b0010;
pub const FLAG_HEADER_OVERRIDE: u32 = 0b0100;
pub const FLAG_FOOTER_OVERRIDE: u32 = 0b1000;

/// Number of u32 values per text reference
pub const U32_PER_TEXT: usize = 4;

/// Text slots per page (three header, three footer)
pub const SLOTS_PER_PAGE: usize = 6;

/// Number of u32 values per page
pub const U32_PER_PAGE: usize = 2 + SLOTS_PER_PAGE * U32_PER_TEXT;

/// Number of f32 values per page
pub const F32_PER_PAGE: usize = 7;

/// Opcode for a controller state
pub fn state_opcode(state: ControllerState) -> u32 {
    match state {
        ControllerState::Stable => STATE_STABLE,
        ControllerState::Correcting => STATE_CORRECTING,
        ControllerState::Locked { .. } => STATE_LOCKED,
    }
}

/// Decoration buffer for zero-copy WASM transfer
pub struct DecorationBuffer {
    /// Integer data (header, flags, text references)
    pub u32_data: Vec<u32>,
    /// Float data (heights and offsets)
    pub f32_data: Vec<f32>,
    /// UTF-8 text buffer
    pub text_data: Vec<u8>,

    // Track cumulative UTF-16 offset for efficient JS decoding
    utf16_text_offset: usize,
}

impl Default for DecorationBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DecorationBuffer {
    pub fn new() -> Self {
        Self {
            u32_data: Vec::with_capacity(HEADER_SIZE + 16 * U32_PER_PAGE),
            f32_data: Vec::with_capacity(16 * F32_PER_PAGE),
            text_data: Vec::with_capacity(1024),
            utf16_text_offset: 0,
        }
    }

    pub fn clear(&mut self) {
        self.u32_data.clear();
        self.f32_data.clear();
        self.text_data.clear();
        self.utf16_text_offset = 0;
    }

    /// Pre-allocate so the pages written next never reallocate.
    /// JS holds pointers into these buffers between writes.
    pub fn prepare(&mut self, page_count: usize, text_needed: usize) {
        let u32_target = HEADER_SIZE + page_count * U32_PER_PAGE;
        let f32_target = page_count * F32_PER_PAGE;
        let text_target = text_needed + 256;

        // Reuse buffers if capacity is sufficient
        if self.u32_data.capacity() < u32_target {
            self.u32_data = Vec::with_capacity(u32_target);
        } else {
            self.u32_data.clear();
        }

        if self.f32_data.capacity() < f32_target {
            self.f32_data = Vec::with_capacity(f32_target);
        } else {
            self.f32_data.clear();
        }

        if self.text_data.capacity() < text_target {
            self.text_data = Vec::with_capacity(text_target);
        } else {
            self.text_data.clear();
        }

        self.utf16_text_offset = 0;
    }

    /// Write a full decoration set
    pub fn write(&mut self, set: &DecorationSet, state: ControllerState) {
        let text_needed = set
            .pages
            .iter()
            .map(|p| slots_len(&p.header.slots) + slots_len(&p.footer.slots))
            .sum::<usize>()
            + set.pages.first().map_or(0, |p| p.gap.background.len());
        self.prepare(set.pages.len(), text_needed);

        let background = set.pages.first().map_or("", |p| p.gap.background.as_str());
        self.write_header(set.version, set.pages.len() as u32, state_opcode(state), background);

        for page in &set.pages {
            let mut flags = 0;
            if page.is_first_page {
                flags |= FLAG_FIRST_PAGE;
            }
            if page.is_last_page {
                flags |= FLAG_LAST_PAGE;
            }
            if page.header.is_override {
                flags |= FLAG_HEADER_OVERRIDE;
            }
            if page.footer.is_override {
                flags |= FLAG_FOOTER_OVERRIDE;
            }

            self.u32_data.push(page.page_number);
            self.u32_data.push(flags);
            for text in page.header.slots.iter().chain(page.footer.slots.iter()) {
                self.write_text(text);
            }

            self.f32_data.push(page.offset);
            self.f32_data.push(page.content_area_height);
            self.f32_data.push(page.header.height);
            self.f32_data.push(page.header.reserved);
            self.f32_data.push(page.footer.height);
            self.f32_data.push(page.footer.reserved);
            self.f32_data.push(page.gap.height);
        }

        self.finalize();
    }

    fn write_header(&mut self, version: u64, page_count: u32, state: u32, background: &str) {
        self.u32_data.push(MAGIC); // [0] magic number
        self.u32_data.push(SCHEMA_VERSION); // [1] schema version
        self.u32_data.push((version & 0xFFFFFFFF) as u32); // [2] version_lo
        self.u32_data.push((version >> 32) as u32); // [3] version_hi
        self.u32_data.push(page_count); // [4] page_count
        self.u32_data.push(0); // [5] text_buffer_len (placeholder)
        self.u32_data.push(state); // [6] controller state
        self.write_text(background); // [7..11] gap background
    }

    /// Append text and its [offset, len, utf16_offset, utf16_len] reference
    fn write_text(&mut self, text: &str) {
        let offset = self.text_data.len() as u32;
        self.text_data.extend_from_slice(text.as_bytes());

        let utf16_offset = self.utf16_text_offset as u32;
        let utf16_len = text.chars().map(|c| c.len_utf16()).sum::<usize>();
        self.utf16_text_offset += utf16_len;

        self.u32_data.push(offset);
        self.u32_data.push(text.len() as u32);
        self.u32_data.push(utf16_offset);
        self.u32_data.push(utf16_len as u32);
    }

    /// Rewrite the controller state word without touching the page records
    pub fn set_state(&mut self, state: ControllerState) {
        if self.u32_data.len() >= HEADER_SIZE {
            self.u32_data[6] = state_opcode(state);
        }
    }

    /// Synchronize header fields that depend on the body
    fn finalize(&mut self) {
        if self.u32_data.len() < HEADER_SIZE {
            return;
        }
        self.u32_data[5] = self.text_data.len() as u32;

        debug_assert_eq!(
            self.u32_data.len(),
            HEADER_SIZE + self.u32_data[4] as usize * U32_PER_PAGE,
            "page records out of sync with page_count"
        );
    }

    // Accessors for WASM
    // Return u32 instead of usize for explicit WASM contract (wasm32 linear memory uses u32 offsets)

    pub fn u32_ptr(&self) -> u32 {
        self.u32_data.as_ptr() as u32
    }

    pub fn u32_len(&self) -> u32 {
        self.u32_data.len() as u32
    }

    pub fn f32_ptr(&self) -> u32 {
        self.f32_data.as_ptr() as u32
    }

    pub fn f32_len(&self) -> u32 {
        self.f32_data.len() as u32
    }

    pub fn text_ptr(&self) -> u32 {
        self.text_data.as_ptr() as u32
    }

    pub fn text_len(&self) -> u32 {
        self.text_data.len() as u32
    }
}

fn slots_len(slots: &BandSlots) -> usize {
    slots.iter().map(str::len).sum()
}
