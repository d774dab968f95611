use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::app::controllers::coordinator::Coordinator;
use crate::app::controllers::panels::Dialogs;
use crate::app::domain::code_style::{CodeStyle, KeyOutcome};
use crate::app::domain::completion::{self, CompletionIndex, CompletionRequest};
use crate::app::domain::text_widget::TextWidget;
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::services::lint::StyleChecker;
use crate::app::services::syntax::Tokenizer;
use crate::app::services::text_ops::extract_filename;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

/// Label used for a document that has never been saved.
pub const UNTITLED_NAME: &str = "new file";

/// Shared services every document talks to.
#[derive(Clone)]
pub struct DocumentContext {
    pub coordinator: Coordinator,
    pub tokenizer: Rc<Tokenizer>,
    pub checker: Rc<StyleChecker>,
}

/// Keys whose default behaviour the code style may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Tab,
    Enter,
    BackSpace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Cancelled,
}

/// One open buffer and the state that goes with it.
pub struct Document<W: TextWidget> {
    pub id: DocumentId,
    text: W,
    path: Option<PathBuf>,
    dirty: bool,
    /// Set while the change notification caused by loading file content is
    /// still pending.
    just_loaded: bool,
    code_style: CodeStyle,
    completion: CompletionIndex,
    /// Cursor remembered while another document is shown.
    pub cursor_position: usize,
    context: DocumentContext,
}

impl<W: TextWidget> Document<W> {
    pub fn new_untitled(id: DocumentId, text: W, context: DocumentContext) -> Self {
        Self::from_content(id, text, None, "", context)
    }

    /// Read `path` as UTF-8 into a new document. Nothing is constructed when
    /// the read fails.
    pub fn open(id: DocumentId, text: W, path: &Path, context: DocumentContext) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| AppError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = content.len(), "opened file");
        Ok(Self::from_content(
            id,
            text,
            Some(path.to_path_buf()),
            &content,
            context,
        ))
    }

    pub fn from_content(
        id: DocumentId,
        mut text: W,
        path: Option<PathBuf>,
        content: &str,
        context: DocumentContext,
    ) -> Self {
        let coordinator = context.coordinator.clone();
        text.set_change_listener(Box::new(move || coordinator.buffer_changed(id)));

        let code_style = CodeStyle::from_path(path.as_deref());
        let mut doc = Self {
            id,
            text,
            path,
            dirty: false,
            // An empty load produces no change notification to absorb.
            just_loaded: !content.is_empty(),
            code_style,
            completion: CompletionIndex::default(),
            cursor_position: 0,
            context,
        };
        doc.text.set_text(content);
        doc.all_highlight();
        doc
    }

    pub fn text(&self) -> &W {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut W {
        &mut self.text
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_just_loaded(&self) -> bool {
        self.just_loaded
    }

    pub fn code_style(&self) -> CodeStyle {
        self.code_style
    }

    pub fn completion(&self) -> &CompletionIndex {
        &self.completion
    }

    pub fn display_name(&self) -> String {
        match &self.path {
            Some(path) => extract_filename(path),
            None => UNTITLED_NAME.to_string(),
        }
    }

    /// Tab title: the display name, starred while there are unsaved changes.
    pub fn tab_label(&self) -> String {
        if self.dirty {
            format!("*{}", self.display_name())
        } else {
            self.display_name()
        }
    }

    /// Bind a new path and pick the matching code style.
    pub fn set_path(&mut self, path: PathBuf) {
        self.code_style = CodeStyle::from_path(Some(&path));
        tracing::debug!(path = %path.display(), style = self.code_style.name(), "document path set");
        self.path = Some(path);
    }

    /// React to one buffer edit.
    pub fn on_change(&mut self) {
        self.line_highlight();
        self.context.coordinator.refresh_gutter();
        if self.just_loaded {
            self.just_loaded = false;
            return;
        }
        self.dirty = true;
        self.context.coordinator.change_tab_name();
    }

    pub fn on_scroll(&self) {
        self.context.coordinator.refresh_gutter();
    }

    pub fn on_key(&mut self, key: EditorKey) -> KeyOutcome {
        match key {
            EditorKey::Tab => self.code_style.tab(&mut self.text, &self.completion),
            EditorKey::Enter => self.code_style.enter_indent(&mut self.text),
            EditorKey::BackSpace => self.code_style.back_space(&mut self.text),
        }
    }

    pub fn indent(&mut self) {
        self.code_style.indent(&mut self.text);
    }

    pub fn dedent(&mut self) {
        self.code_style.dedent(&mut self.text);
    }

    pub fn select_all(&mut self) {
        self.text.select_all();
    }

    pub fn line_highlight(&mut self) {
        self.code_style.line_highlight(&mut self.text, &self.context.tokenizer);
    }

    /// Re-colour the whole buffer and refresh the completion names.
    pub fn all_highlight(&mut self) {
        let tokens = self.code_style.all_highlight(&mut self.text, &self.context.tokenizer);
        if self.code_style.supports_completion() {
            self.completion.rebuild(&tokens);
        }
    }

    pub fn lint(&self) {
        self.code_style
            .lint(self.path.as_deref(), &self.context.checker, &self.context.coordinator);
    }

    pub fn apply_completion(&mut self, request: &CompletionRequest, choice: &str) {
        completion::apply(&mut self.text, request, choice);
    }

    /// Save to the bound path, asking for one when the document is untitled.
    pub fn save(&mut self, dialogs: &mut dyn Dialogs, initial_dir: Option<&Path>) -> Result<SaveOutcome> {
        let destination = match &self.path {
            Some(path) => path.clone(),
            None => match dialogs.save_file(initial_dir) {
                Some(path) => path,
                None => return Ok(SaveOutcome::Cancelled),
            },
        };
        self.write_to(destination)?;
        Ok(SaveOutcome::Saved)
    }

    /// Always ask for a destination; the chosen path becomes the document's.
    pub fn save_as(&mut self, dialogs: &mut dyn Dialogs, initial_dir: Option<&Path>) -> Result<SaveOutcome> {
        match dialogs.save_file(self.dialog_dir(initial_dir)) {
            Some(destination) => {
                self.write_to(destination)?;
                Ok(SaveOutcome::Saved)
            }
            None => Ok(SaveOutcome::Cancelled),
        }
    }

    /// Directory a file dialog should start in: the document's own folder,
    /// else `fallback`.
    pub fn dialog_dir<'a>(&'a self, fallback: Option<&'a Path>) -> Option<&'a Path> {
        self.path.as_deref().and_then(Path::parent).or(fallback)
    }

    /// Write the buffer to `destination`, then lint, re-highlight and mark
    /// clean. A failed write leaves every field untouched.
    pub fn write_to(&mut self, destination: PathBuf) -> Result<()> {
        fs::write(&destination, self.text.text()).map_err(|source| AppError::Save {
            path: destination.clone(),
            source,
        })?;
        tracing::info!(path = %destination.display(), "saved file");

        if self.path.as_deref() != Some(destination.as_path()) {
            self.set_path(destination);
        }
        self.lint();
        self.all_highlight();
        self.dirty = false;
        self.context.coordinator.change_tab_name();
        Ok(())
    }

    /// Show this document in the editor view.
    pub fn activate(&mut self) {
        self.text.activate();
        self.text.set_insert_position(self.cursor_position);
        self.text.show_insert_position();
    }

    /// Hide this document, remembering where the cursor was.
    pub fn deactivate(&mut self) {
        self.cursor_position = self.text.insert_position();
        self.text.deactivate();
    }
}
