//! Control loop implementations

pub mod threshold;

pub use threshold::{ControlEntry, ThresholdLoop};
