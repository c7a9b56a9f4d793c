//! DNS module.
//!
//! This module provides the measurement harness:
//! - Lookup backends (per-provider or system resolver)
//! - Per-provider workers
//! - The dispatcher that runs one worker per provider
//! - Core data types

pub mod dispatcher;
pub mod resolver;
pub mod types;
pub mod worker;

pub use dispatcher::{dispatch, Dispatch, NoProgress, Plan, ProgressObserver};
pub use resolver::{build_lookup, Lookup, LookupError, ResolverMode};
pub use types::*;
