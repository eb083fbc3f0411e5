//! # rimuru-core
//!
//! Core crate for Rimuru. Contains configuration schemas, typed
//! identifiers, the domain records other subsystems hand to the hook
//! engine, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Rimuru crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
