//! Page configuration, tuning parameters and the commands that update them

mod command;
mod page;
mod tuning;

pub use command::{ConfigChange, ConfigCommand};
pub use page::{BandText, DimensionSignature, PageConfig, PageOverride};
pub use tuning::{EstimateStrategy, PaginationTuning, ScaffoldSelector};
