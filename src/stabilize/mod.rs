//! Stabilization of the measure → estimate → rebuild feedback loop

mod controller;

pub use controller::{ControllerState, Decision, DimensionChange, StabilizationController};
