//! Page-break decoration descriptors built from a target page count

use crate::config::{BandText, PageConfig};
use crate::layout::{PageGeometry, PageHeightCache};
use crate::render::template::expand;
use serde::Serialize;

/// Expanded left/center/right text of one band
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BandSlots {
    pub left: String,
    pub center: String,
    pub right: String,
}

impl BandSlots {
    fn expand(text: &BandText, page_number: u32, total_pages: usize) -> Self {
        Self {
            left: expand(&text.left, page_number, total_pages),
            center: expand(&text.center, page_number, total_pages),
            right: expand(&text.right, page_number, total_pages),
        }
    }

    /// Slots in left, center, right order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [self.left.as_str(), self.center.as_str(), self.right.as_str()].into_iter()
    }
}

/// A header or footer band on one page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandDescriptor {
    /// Measured band height used for this page
    pub height: f32,
    /// Total vertical space reserved (band + page margin + content margin)
    pub reserved: f32,
    pub slots: BandSlots,
    /// Text comes from a per-page override
    pub is_override: bool,
}

/// Visual divider between two pages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapDescriptor {
    pub height: f32,
    pub background: String,
}

/// One page of the decoration overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBreakDecoration {
    /// 1-based
    pub page_number: u32,
    pub is_first_page: bool,
    pub is_last_page: bool,
    /// Spacer height before this page's break. The first page also
    /// reserves its header space.
    pub offset: f32,
    pub content_area_height: f32,
    pub header: BandDescriptor,
    pub footer: BandDescriptor,
    pub gap: GapDescriptor,
}

/// A complete, immutable decoration overlay
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecorationSet {
    pub version: u64,
    pub total_pages: usize,
    pub pages: Vec<PageBreakDecoration>,
}

impl DecorationSet {
    pub fn new(version: u64, pages: Vec<PageBreakDecoration>) -> Self {
        Self {
            version,
            total_pages: pages.len(),
            pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total height of the overlay, gaps included
    pub fn total_height(&self) -> f32 {
        self.pages
            .iter()
            .map(|p| p.offset + p.footer.reserved + if p.is_last_page { 0.0 } else { p.gap.height + p.header.reserved })
            .sum()
    }
}

/// Build one descriptor per page.
///
/// Pure function of its inputs; the page count is clamped to `1..=max_pages`.
pub fn build_decorations(
    config: &PageConfig,
    heights: &PageHeightCache,
    target_pages: usize,
    max_pages: usize,
) -> Vec<PageBreakDecoration> {
    let total = target_pages.clamp(1, max_pages.max(1));
    let mut pages = Vec::with_capacity(total);

    for index in 0..total {
        let page_number = index as u32 + 1;
        let header_height = heights.header(page_number);
        let footer_height = heights.footer(page_number);
        let geometry = PageGeometry::compute(config, header_height, footer_height);
        let content_area = geometry.content_area_height.max(0.0);

        let (header_text, header_override) = config.header_for(page_number);
        let (footer_text, footer_override) = config.footer_for(page_number);

        let is_first_page = index == 0;
        let offset = if is_first_page {
            geometry.header_reserved + content_area
        } else {
            content_area
        };

        pages.push(PageBreakDecoration {
            page_number,
            is_first_page,
            is_last_page: index + 1 == total,
            offset,
            content_area_height: content_area,
            header: BandDescriptor {
                height: header_height,
                reserved: geometry.header_reserved,
                slots: BandSlots::expand(header_text, page_number, total),
                is_override: header_override,
            },
            footer: BandDescriptor {
                height: footer_height,
                reserved: geometry.footer_reserved,
                slots: BandSlots::expand(footer_text, page_number, total),
                is_override: footer_override,
            },
            gap: GapDescriptor {
                height: config.page_gap,
                background: config.page_break_background.clone(),
            },
        });
    }

    pages
}
