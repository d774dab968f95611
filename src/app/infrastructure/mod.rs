//! Infrastructure layer - external integrations and utilities.
//!
//! - FLTK-backed text widget
//! - Headless text widget for tests and tooling
//! - Error types

pub mod error;
pub mod fltk_text;
pub mod memory_text;
