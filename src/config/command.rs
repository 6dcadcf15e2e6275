//! Configuration commands exposed to the surrounding application

use crate::config::{BandText, PageConfig};
use crate::error::{PaginationError, Result};
use crate::layout::Band;
use serde::{Deserialize, Serialize};

/// A single configuration update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConfigCommand {
    SetPageSize { width: f32, height: f32 },
    SetMargins { top: f32, bottom: f32, left: f32, right: f32 },
    SetContentMargins { top: f32, bottom: f32 },
    SetPageGap { gap: f32 },
    SetBreakBackground { color: String },
    /// Default header for pages without an override
    SetHeader { text: BandText },
    /// Default footer for pages without an override
    SetFooter { text: BandText },
    SetPageHeader { page: u32, text: BandText },
    SetPageFooter { page: u32, text: BandText },
    ClearPageOverride { page: u32 },
}

/// What a command invalidated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    /// Nothing changed
    Unchanged,
    /// Page size or margins changed; every measured band height is stale
    Structural,
    /// Header/footer text of one height-cache slot changed (0 is the default
    /// slot). `band` is `None` when both bands of the slot are affected.
    Band { slot: u32, band: Option<Band> },
    /// Visual-only change (gap, background)
    Cosmetic,
}

impl ConfigChange {
    pub fn is_structural(&self) -> bool {
        matches!(self, ConfigChange::Structural)
    }
}

fn check_page(page: u32) -> Result<u32> {
    if page == 0 {
        Err(PaginationError::InvalidPageNumber(page))
    } else {
        Ok(page)
    }
}

impl PageConfig {
    /// Apply a command to a copy of this configuration.
    ///
    /// Returns the validated new configuration and what it invalidates. On
    /// error the receiver is untouched.
    pub fn apply(&self, command: &ConfigCommand) -> Result<(PageConfig, ConfigChange)> {
        let mut next = self.clone();

        let change = match command {
            ConfigCommand::SetPageSize { width, height } => {
                next.page_width = *width;
                next.page_height = *height;
                ConfigChange::Structural
            }
            ConfigCommand::SetMargins { top, bottom, left, right } => {
                next.margin_top = *top;
                next.margin_bottom = *bottom;
                next.margin_left = *left;
                next.margin_right = *right;
                ConfigChange::Structural
            }
            ConfigCommand::SetContentMargins { top, bottom } => {
                next.content_margin_top = *top;
                next.content_margin_bottom = *bottom;
                ConfigChange::Structural
            }
            ConfigCommand::SetPageGap { gap } => {
                next.page_gap = *gap;
                ConfigChange::Cosmetic
            }
            ConfigCommand::SetBreakBackground { color } => {
                next.page_break_background = color.clone();
                ConfigChange::Cosmetic
            }
            ConfigCommand::SetHeader { text } => {
                next.header = text.clone();
                ConfigChange::Band {
                    slot: 0,
                    band: Some(Band::Header),
                }
            }
            ConfigCommand::SetFooter { text } => {
                next.footer = text.clone();
                ConfigChange::Band {
                    slot: 0,
                    band: Some(Band::Footer),
                }
            }
            ConfigCommand::SetPageHeader { page, text } => {
                let page = check_page(*page)?;
                next.overrides.entry(page).or_default().header = Some(text.clone());
                ConfigChange::Band {
                    slot: page,
                    band: Some(Band::Header),
                }
            }
            ConfigCommand::SetPageFooter { page, text } => {
                let page = check_page(*page)?;
                next.overrides.entry(page).or_default().footer = Some(text.clone());
                ConfigChange::Band {
                    slot: page,
                    band: Some(Band::Footer),
                }
            }
            ConfigCommand::ClearPageOverride { page } => {
                let page = check_page(*page)?;
                next.overrides.remove(&page);
                ConfigChange::Band { slot: page, band: None }
            }
        };

        next.validate()?;

        if next == *self {
            return Ok((next, ConfigChange::Unchanged));
        }
        Ok((next, change))
    }
}
