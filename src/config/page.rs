//! Page geometry and header/footer text configuration

use crate::error::{PaginationError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Left/center/right text of a header or footer band.
///
/// Slots may contain `{page}` and `{total}` tokens, expanded per page by
/// the decoration builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BandText {
    pub left: String,
    pub center: String,
    pub right: String,
}

impl BandText {
    pub fn new(left: impl Into<String>, center: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            center: center.into(),
            right: right.into(),
        }
    }

    /// True when every slot is blank
    pub fn is_empty(&self) -> bool {
        self.left.trim().is_empty() && self.center.trim().is_empty() && self.right.trim().is_empty()
    }
}

/// Header/footer text for one specific page number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageOverride {
    pub header: Option<BandText>,
    pub footer: Option<BandText>,
}

impl PageOverride {
    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.footer.is_none()
    }
}

/// Page size identity used to detect resizes and orientation flips.
///
/// Stored in whole units so sub-pixel float noise never reads as a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimensionSignature {
    pub width: i64,
    pub height: i64,
}

impl DimensionSignature {
    /// True when `other` is this size with width and height swapped
    pub fn is_transposed_of(&self, other: &DimensionSignature) -> bool {
        self.width != self.height && self.width == other.height && self.height == other.width
    }
}

/// Page configuration for one editing session.
///
/// Treated as an immutable value during a pagination pass. Updates go
/// through [`PageConfig::apply`], which swaps in a validated copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    pub page_height: f32,
    pub page_width: f32,
    pub page_gap: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub content_margin_top: f32,
    pub content_margin_bottom: f32,
    pub page_break_background: String,
    pub header: BandText,
    pub footer: BandText,
    /// Per-page header/footer overrides keyed by 1-based page number
    pub overrides: FxHashMap<u32, PageOverride>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_height: 1056.0, // 11" at 96 DPI
            page_width: 816.0,   // 8.5" at 96 DPI
            page_gap: 50.0,
            margin_top: 94.0,
            margin_bottom: 94.0,
            margin_left: 76.0,
            margin_right: 76.0,
            content_margin_top: 10.0,
            content_margin_bottom: 10.0,
            page_break_background: "#ffffff".to_string(),
            header: BandText::default(),
            footer: BandText::new("", "", "{page}"),
            overrides: FxHashMap::default(),
        }
    }
}

impl PageConfig {
    /// Parse a (possibly partial) JSON configuration and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PageConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the numeric invariants the geometry math relies on
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("pageWidth", self.page_width), ("pageHeight", self.page_height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PaginationError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("pageGap", self.page_gap),
            ("marginTop", self.margin_top),
            ("marginBottom", self.margin_bottom),
            ("marginLeft", self.margin_left),
            ("marginRight", self.margin_right),
            ("contentMarginTop", self.content_margin_top),
            ("contentMarginBottom", self.content_margin_bottom),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(PaginationError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if let Some(page) = self.overrides.keys().find(|&&page| page == 0) {
            return Err(PaginationError::InvalidPageNumber(*page));
        }

        Ok(())
    }

    /// Signature of the page size, for resize/orientation detection
    pub fn dimensions(&self) -> DimensionSignature {
        DimensionSignature {
            width: self.page_width.round() as i64,
            height: self.page_height.round() as i64,
        }
    }

    /// Header text for a page and whether it comes from an override
    pub fn header_for(&self, page_number: u32) -> (&BandText, bool) {
        match self.overrides.get(&page_number).and_then(|o| o.header.as_ref()) {
            Some(text) => (text, true),
            None => (&self.header, false),
        }
    }

    /// Footer text for a page and whether it comes from an override
    pub fn footer_for(&self, page_number: u32) -> (&BandText, bool) {
        match self.overrides.get(&page_number).and_then(|o| o.footer.as_ref()) {
            Some(text) => (text, true),
            None => (&self.footer, false),
        }
    }
}
