//! Services layer - business operations and utilities.
//!
//! - Tokenizing and colour palettes
//! - External style checker
//! - Text search and replace

pub mod lint;
pub mod syntax;
pub mod text_ops;
