//! Page geometry: how much vertical space a page leaves for content

use crate::config::PageConfig;

/// Vertical budget of one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Space above content: content margin + page margin + header band
    pub header_reserved: f32,
    /// Space below content: content margin + page margin + footer band
    pub footer_reserved: f32,
    /// What is left for document content
    pub content_area_height: f32,
}

impl PageGeometry {
    /// Compute the geometry for a page with the given band heights
    pub fn compute(config: &PageConfig, header_height: f32, footer_height: f32) -> Self {
        let header_reserved = config.content_margin_top + config.margin_top + header_height.max(0.0);
        let footer_reserved =
            config.content_margin_bottom + config.margin_bottom + footer_height.max(0.0);

        Self {
            header_reserved,
            footer_reserved,
            content_area_height: config.page_height - header_reserved - footer_reserved,
        }
    }

    /// True when the content area is too small to paginate against
    pub fn is_degenerate(&self, floor: f32) -> bool {
        !self.content_area_height.is_finite() || self.content_area_height <= floor
    }

    /// Content area plus the gap to the next page's content
    pub fn page_span(&self, page_gap: f32) -> f32 {
        self.content_area_height + page_gap
    }
}

/// Shorthand for [`PageGeometry::compute`] returning only the content area
pub fn content_area_height(config: &PageConfig, header_height: f32, footer_height: f32) -> f32 {
    PageGeometry::compute(config, header_height, footer_height).content_area_height
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_800() -> PageConfig {
        PageConfig {
            page_height: 800.0,
            margin_top: 20.0,
            margin_bottom: 20.0,
            content_margin_top: 10.0,
            content_margin_bottom: 10.0,
            ..PageConfig::default()
        }
    }

    #[test]
    fn test_content_area_without_bands() {
        let geometry = PageGeometry::compute(&config_800(), 0.0, 0.0);
        assert_eq!(geometry.header_reserved, 30.0);
        assert_eq!(geometry.footer_reserved, 30.0);
        assert_eq!(geometry.content_area_height, 740.0);
    }

    #[test]
    fn test_bands_reduce_content_area() {
        assert_eq!(content_area_height(&config_800(), 24.0, 16.0), 700.0);
    }

    #[test]
    fn test_degenerate_page() {
        let config = PageConfig {
            page_height: 90.0,
            margin_top: 25.0,
            margin_bottom: 25.0,
            content_margin_top: 0.0,
            content_margin_bottom: 0.0,
            ..PageConfig::default()
        };
        let geometry = PageGeometry::compute(&config, 0.0, 0.0);
        assert_eq!(geometry.content_area_height, 40.0);
        assert!(geometry.is_degenerate(50.0));
        assert!(!PageGeometry::compute(&config_800(), 0.0, 0.0).is_degenerate(50.0));
    }
}
