//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - Document and DocumentId
//! - Per-language editing policy and completion
//! - Application settings
//! - Message types for the event system
//! - The text widget capability set

pub mod code_style;
pub mod completion;
pub mod document;
pub mod messages;
pub mod settings;
pub mod text_widget;

pub use code_style::{CodeStyle, KeyOutcome};
pub use document::{Document, DocumentContext, DocumentId, EditorKey};
pub use messages::Message;
pub use settings::{AppSettings, LintSettings};
pub use text_widget::{StyleTag, TextWidget};
