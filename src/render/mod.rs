//! Render output: page-break decoration descriptors

mod decoration;
pub mod template;

pub use decoration::{
    build_decorations, BandDescriptor, BandSlots, DecorationSet, GapDescriptor, PageBreakDecoration,
};
