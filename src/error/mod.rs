//! Error handling for the fbgraph engine.
//!
//! This module provides:
//! - The core error enum (`FbError`) covering caller-input errors, API-level
//!   classified errors, and transport/decode passthroughs
//! - Type conversions from common error types

mod conversions;
pub mod types;

pub use types::*;
