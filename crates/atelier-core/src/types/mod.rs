//! Core type definitions used across the Atelier workspace.

pub mod id;

pub use id::*;
