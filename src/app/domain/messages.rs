use std::path::PathBuf;

use super::document::DocumentId;

/// All messages that can be sent through the FLTK channel.
/// Each menu callback and coordinator call sends one of these; the dispatch
/// loop in main hands them to the workbench.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // File
    FileNew,
    FileOpen,
    OpenPath(PathBuf),
    FileSave,
    FileSaveAs,
    Quit,

    // Tabs
    TabDelete,
    TabSelect(DocumentId),
    TabNext,
    TabPrevious,
    ChangeTabName,

    // Edit
    Indent,
    Dedent,
    Highlight,
    SelectAll,
    ShowSearch,
    ShowReplace,

    // Lint panel
    UpdateLint(String),
    ClearLint,

    // Directory tree
    ChangeDir,
    UpdateDir,
    ExpandDir(PathBuf),
    CollapseDir(PathBuf),

    // Editor notifications
    BufferChanged(DocumentId),
    RefreshGutter,
}
