//! Actuator implementations

pub mod relay;

pub use relay::RelayOutput;
