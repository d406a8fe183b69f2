//! # tekir-core
//!
//! Core types, traits, and abstractions for Tekir chat routing.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the inference crate builds on: the language model capability trait,
//! chat request and generation types, the shared error type, and defaults.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
