//! Controllers layer - orchestration and coordination.
//!
//! - Coordinator: the command surface every widget talks to
//! - Notebook: open documents and the active tab
//! - Workbench: routes messages to the notebook and side panels
//! - Directory tree model
//! - Panel contracts implemented by the UI

pub mod coordinator;
pub mod notebook;
pub mod panels;
pub mod tree;
pub mod workbench;
