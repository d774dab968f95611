//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (Document, CodeStyle, Settings, Messages)
//! - `controllers/` - Orchestration (Coordinator, Notebook, Workbench, directory tree)
//! - `services/` - Business operations (tokenizer, style checker, text_ops)
//! - `infrastructure/` - External integrations (FLTK text, headless text, error)

pub mod controllers;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-exports for convenient external access
pub use controllers::coordinator::{Coordinator, MessageQueue, MessageSink};
pub use controllers::workbench::{Flow, Workbench};
pub use domain::{AppSettings, CodeStyle, Document, DocumentId, Message};
pub use infrastructure::error::{AppError, Result};
pub use infrastructure::fltk_text::{buffer_text_no_leak, FltkText};
