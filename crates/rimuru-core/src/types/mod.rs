//! Core type definitions used across the Rimuru workspace.

pub mod id;

pub use id::*;
