//! Content height measurement over the host's rendered children

use crate::config::PaginationTuning;
use crate::Rect;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// How a node's true content height is read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    /// Ordinary block; its outer box is its content height
    #[default]
    Block,
    /// Table whose wrapper may scroll or clip; measured by its rows
    Table {
        #[serde(default, rename = "rowHeights")]
        row_heights: SmallVec<[f32; 8]>,
    },
    /// Wrapper stretched by the page grid; measured by its inner content
    Stretched {
        #[serde(rename = "innerHeight")]
        inner_height: f32,
    },
}

/// A direct child of the rendered document container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: SmallVec<[String; 2]>,
    /// Attribute names present on the node
    #[serde(default)]
    pub attributes: SmallVec<[String; 2]>,
    /// Set by hosts that already know the node is injected scaffolding
    #[serde(default)]
    pub scaffold: bool,
    /// Outer box relative to the container top
    pub rect: Rect,
    #[serde(default)]
    pub kind: NodeKind,
}

impl RenderedNode {
    /// A plain content block at `top` with the given height
    pub fn block(top: f32, height: f32) -> Self {
        Self {
            id: None,
            classes: SmallVec::new(),
            attributes: SmallVec::new(),
            scaffold: false,
            rect: Rect::new(0.0, top, 0.0, height),
            kind: NodeKind::Block,
        }
    }

    /// A scaffolding node (page-break wrapper) at `top`
    pub fn scaffold(top: f32, height: f32) -> Self {
        Self {
            scaffold: true,
            ..Self::block(top, height)
        }
    }

    /// Height of the node's real content
    pub fn content_height(&self, inner_padding: f32) -> f32 {
        let height = match &self.kind {
            NodeKind::Block => self.rect.height,
            NodeKind::Table { row_heights } if row_heights.is_empty() => self.rect.height,
            NodeKind::Table { row_heights } => row_heights.iter().sum::<f32>() + inner_padding,
            NodeKind::Stretched { inner_height } => inner_height + inner_padding,
        };
        if height.is_finite() {
            height.max(0.0)
        } else {
            0.0
        }
    }
}

/// Aggregated height of real document content
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentHeight {
    /// Nothing measurable; paginate as a single page
    SinglePage,
    Measured(f32),
}

impl ContentHeight {
    pub fn value(&self) -> f32 {
        match self {
            ContentHeight::SinglePage => 0.0,
            ContentHeight::Measured(height) => *height,
        }
    }
}

/// Result of one measurement pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentMeasurement {
    pub height: ContentHeight,
    /// Bottom edge of the last real content node, if any
    pub content_bottom: Option<f32>,
    /// Content nodes that contributed
    pub node_count: usize,
}

/// Sum the content height of every non-scaffolding child
pub fn measure_content_height(nodes: &[RenderedNode], tuning: &PaginationTuning) -> ContentMeasurement {
    let mut total: f32 = 0.0;
    let mut node_count = 0;
    let mut content_bottom = None;

    for node in nodes.iter().filter(|n| !tuning.scaffold.matches(n)) {
        let height = node.content_height(tuning.inner_padding);
        total += height;
        node_count += 1;
        content_bottom = Some(node.rect.y + height);
    }

    let height = if node_count == 0 || total < tuning.noise_floor {
        ContentHeight::SinglePage
    } else {
        ContentHeight::Measured(total)
    };

    ContentMeasurement {
        height,
        content_bottom,
        node_count,
    }
}
