//! Configuration module.
//!
//! This module loads the provider and domain lists from their various
//! sources and validates the measurement settings.

pub mod defaults;
pub mod loader;

pub use loader::{ConfigLoader, MeasureConfig, ProviderList};
