use std::path::{Path, PathBuf};

use crate::app::controllers::panels::{Dialogs, TabLabel};
use crate::app::domain::document::{Document, DocumentContext, DocumentId, SaveOutcome};
use crate::app::domain::text_widget::TextWidget;
use crate::app::infrastructure::error::Result;

/// Builds the text widget for a new tab.
pub type TextFactory<W> = Box<dyn Fn(DocumentId) -> W>;

/// The open documents, in tab order, and which one is active.
pub struct Notebook<W: TextWidget> {
    documents: Vec<Document<W>>,
    active_id: Option<DocumentId>,
    next_id: u64,
    factory: TextFactory<W>,
    context: DocumentContext,
}

impl<W: TextWidget> Notebook<W> {
    pub fn new(factory: TextFactory<W>, context: DocumentContext) -> Self {
        Self {
            documents: Vec::new(),
            active_id: None,
            next_id: 1,
            factory,
            context,
        }
    }

    fn allocate_id(&mut self) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create a tab (untitled when `path` is `None`) and select it. A failed
    /// read adds nothing.
    pub fn add_tab(&mut self, path: Option<PathBuf>) -> Result<DocumentId> {
        let id = self.allocate_id();
        let text = (self.factory)(id);
        let doc = match path {
            Some(path) => Document::open(id, text, &path, self.context.clone())?,
            None => Document::new_untitled(id, text, self.context.clone()),
        };
        self.documents.push(doc);
        self.select(id);
        tracing::debug!(?id, count = self.documents.len(), "tab added");
        Ok(id)
    }

    /// Open `path`, or select its tab if it is already open.
    pub fn open(&mut self, path: PathBuf) -> Result<DocumentId> {
        if let Some(id) = self.find_by_path(&path) {
            tracing::debug!(path = %path.display(), "already open, selecting");
            self.select(id);
            return Ok(id);
        }
        self.add_tab(Some(path))
    }

    pub fn find_by_path(&self, path: &Path) -> Option<DocumentId> {
        self.documents
            .iter()
            .find(|d| d.path() == Some(path))
            .map(|d| d.id)
    }

    /// Make `id` the visible document. Returns false for an unknown id.
    pub fn select(&mut self, id: DocumentId) -> bool {
        if !self.documents.iter().any(|d| d.id == id) {
            return false;
        }
        if self.active_id == Some(id) {
            return true;
        }
        if let Some(current) = self.current_editor_mut() {
            current.deactivate();
        }
        self.active_id = Some(id);
        if let Some(doc) = self.current_editor_mut() {
            doc.activate();
        }
        true
    }

    pub fn select_next(&mut self) {
        if let Some(id) = self.neighbour_id(1) {
            self.select(id);
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(id) = self.neighbour_id(self.documents.len().saturating_sub(1)) {
            self.select(id);
        }
    }

    fn neighbour_id(&self, step: usize) -> Option<DocumentId> {
        let idx = self.active_index()?;
        let next = (idx + step) % self.documents.len();
        Some(self.documents[next].id)
    }

    fn active_index(&self) -> Option<usize> {
        let active = self.active_id?;
        self.documents.iter().position(|d| d.id == active)
    }

    pub fn active_id(&self) -> Option<DocumentId> {
        self.active_id
    }

    pub fn current_editor(&self) -> Option<&Document<W>> {
        let active = self.active_id?;
        self.documents.iter().find(|d| d.id == active)
    }

    pub fn current_editor_mut(&mut self) -> Option<&mut Document<W>> {
        let active = self.active_id?;
        self.documents.iter_mut().find(|d| d.id == active)
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document<W>> {
        self.documents.iter_mut().find(|d| d.id == id)
    }

    pub fn documents(&self) -> &[Document<W>] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.documents.iter().any(|d| d.is_dirty())
    }

    /// Close the active tab, confirming first when it has unsaved changes.
    /// Returns true when a tab was removed.
    pub fn delete_tab(&mut self, dialogs: &mut dyn Dialogs) -> bool {
        let Some(idx) = self.active_index() else {
            return false;
        };
        let doc = &self.documents[idx];
        if doc.is_dirty() && !dialogs.confirm_discard(&doc.display_name()) {
            return false;
        }

        let removed = self.documents.remove(idx);
        tracing::debug!(id = ?removed.id, "tab closed");
        self.active_id = None;
        if !self.documents.is_empty() {
            let new_idx = idx.min(self.documents.len() - 1);
            let id = self.documents[new_idx].id;
            self.active_id = Some(id);
            self.documents[new_idx].activate();
        }
        true
    }

    /// Save the active document; untitled documents go through [`Self::save_as`].
    pub fn save(&mut self, dialogs: &mut dyn Dialogs, initial_dir: Option<&Path>) -> Result<SaveOutcome> {
        let Some(untitled) = self.current_editor().map(|d| d.path().is_none()) else {
            return Ok(SaveOutcome::Cancelled);
        };
        if untitled {
            return self.save_as(dialogs, initial_dir);
        }
        match self.current_editor_mut() {
            Some(doc) => doc.save(dialogs, initial_dir),
            None => Ok(SaveOutcome::Cancelled),
        }
    }

    /// Ask for a destination and save the active document there. A clean tab
    /// already showing that path is closed; a dirty one blocks the save.
    pub fn save_as(&mut self, dialogs: &mut dyn Dialogs, initial_dir: Option<&Path>) -> Result<SaveOutcome> {
        let Some(active) = self.active_id else {
            return Ok(SaveOutcome::Cancelled);
        };
        let start = self
            .current_editor()
            .and_then(|d| d.dialog_dir(initial_dir))
            .map(Path::to_path_buf);
        let Some(destination) = dialogs.save_file(start.as_deref()) else {
            return Ok(SaveOutcome::Cancelled);
        };

        let other = self.find_by_path(&destination).filter(|&id| id != active);
        if let Some(other) = other {
            if self.documents.iter().any(|d| d.id == other && d.is_dirty()) {
                dialogs.alert(&format!(
                    "{} is open in another tab with unsaved changes",
                    destination.display()
                ));
                return Ok(SaveOutcome::Cancelled);
            }
        }

        let Some(doc) = self.current_editor_mut() else {
            return Ok(SaveOutcome::Cancelled);
        };
        doc.write_to(destination)?;
        // The other tab is a duplicate only once the write succeeded.
        if let Some(other) = other {
            self.documents.retain(|d| d.id != other);
            tracing::debug!(id = ?other, "closed tab replaced by save as");
        }
        Ok(SaveOutcome::Saved)
    }

    pub fn tab_labels(&self) -> Vec<TabLabel> {
        self.documents
            .iter()
            .map(|d| TabLabel {
                id: d.id,
                label: d.tab_label(),
                active: self.active_id == Some(d.id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::controllers::coordinator::Coordinator;
    use crate::app::controllers::panels::fakes::ScriptedDialogs;
    use crate::app::domain::document::test_support::context;
    use crate::app::infrastructure::error::AppError;
    use crate::app::infrastructure::memory_text::MemoryText;
    use std::fs;

    fn notebook(coordinator: &Coordinator) -> Notebook<MemoryText> {
        Notebook::new(Box::new(|_| MemoryText::new()), context(coordinator))
    }

    #[test]
    fn test_add_tab_selects_it() {
        let coordinator = Coordinator::mock();
        let mut nb = notebook(&coordinator);
        assert!(nb.current_editor().is_none());
        let first = nb.add_tab(None).unwrap();
        let second = nb.add_tab(None).unwrap();
        assert_ne!(first, second);
        assert_eq!(nb.active_id(), Some(second));
        assert_eq!(nb.len(), 2);
    }

    #[test]
    fn test_reopen_selects_existing_tab() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.py");
        fs::write(&path, "x = 1\n").unwrap();

        let coordinator = Coordinator::mock();
        let mut nb = notebook(&coordinator);
        let opened = nb.open(path.clone()).unwrap();
        nb.add_tab(None).unwrap();
        assert_eq!(nb.len(), 2);

        let again = nb.open(path).unwrap();
        assert_eq!(again, opened);
        assert_eq!(nb.len(), 2);
        assert_eq!(nb.active_id(), Some(opened));
    }

    #[test]
    fn test_failed_open_adds_nothing() {
        let coordinator = Coordinator::mock();
        let mut nb = notebook(&coordinator);
        assert!(nb.open(PathBuf::from("/definitely/not/here.py")).is_err());
        assert!(nb.is_empty());
        assert!(nb.active_id().is_none());
    }

    #[test]
    fn test_delete_dirty_tab_needs_confirmation() {
        let coordinator = Coordinator::mock();
        let mut nb = notebook(&coordinator);
        nb.add_tab(None).unwrap();
        let doc = nb.current_editor_mut().unwrap();
        doc.text_mut().insert(0, "draft");
        doc.on_change();

        let mut dialogs = ScriptedDialogs::default();
        assert!(!nb.delete_tab(&mut dialogs));
        assert_eq!(nb.len(), 1);
        assert_eq!(dialogs.confirm_prompts, vec!["new file".to_string()]);

        dialogs.discard = true;
        assert!(nb.delete_tab(&mut dialogs));
        assert!(nb.is_empty());
        assert!(nb.active_id().is_none());
    }

    #[test]
    fn test_delete_clean_tab_activates_neighbour() {
        let coordinator = Coordinator::mock();
        let mut nb = notebook(&coordinator);
        let a = nb.add_tab(None).unwrap();
        let b = nb.add_tab(None).unwrap();
        let c = nb.add_tab(None).unwrap();
        nb.select(b);

        let mut dialogs = ScriptedDialogs::default();
        assert!(nb.delete_tab(&mut dialogs));
        assert_eq!(nb.active_id(), Some(c));
        assert!(nb.delete_tab(&mut dialogs));
        assert_eq!(nb.active_id(), Some(a));
        assert!(dialogs.confirm_prompts.is_empty());
    }

    #[test]
    fn test_next_and_previous_wrap() {
        let coordinator = Coordinator::mock();
        let mut nb = notebook(&coordinator);
        let a = nb.add_tab(None).unwrap();
        let b = nb.add_tab(None).unwrap();
        nb.select_next();
        assert_eq!(nb.active_id(), Some(a));
        nb.select_previous();
        assert_eq!(nb.active_id(), Some(b));
        assert!(!nb.select(DocumentId(99)));
    }

    #[test]
    fn test_save_without_document_is_noop() {
        let coordinator = Coordinator::mock();
        let mut nb = notebook(&coordinator);
        let mut dialogs = ScriptedDialogs::default();
        assert_eq!(nb.save(&mut dialogs, None).unwrap(), SaveOutcome::Cancelled);
        assert!(!nb.delete_tab(&mut dialogs));
    }

    #[test]
    fn test_save_as_onto_open_path_keeps_paths_unique() {
        let dir = tempfile::tempdir().unwrap();
        let taken = dir.path().join("taken.txt");
        fs::write(&taken, "old").unwrap();

        let coordinator = Coordinator::mock();
        let mut nb = notebook(&coordinator);
        nb.open(taken.clone()).unwrap();
        nb.add_tab(None).unwrap();

        let mut dialogs = ScriptedDialogs::default();
        dialogs.save_paths.push_back(taken.clone());
        assert_eq!(nb.save_as(&mut dialogs, None).unwrap(), SaveOutcome::Saved);
        assert_eq!(nb.len(), 1);

        let with_path: Vec<_> = nb
            .documents()
            .iter()
            .filter(|d| d.path() == Some(taken.as_path()))
            .collect();
        assert_eq!(with_path.len(), 1);
        assert_eq!(nb.find_by_path(&taken), nb.active_id());
    }

    #[test]
    fn test_save_as_onto_dirty_tab_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let taken = dir.path().join("taken.txt");
        fs::write(&taken, "old").unwrap();

        let coordinator = Coordinator::mock();
        let mut nb = notebook(&coordinator);
        nb.open(taken.clone()).unwrap();
        let doc = nb.current_editor_mut().unwrap();
        // The first notification is the load itself.
        doc.on_change();
        doc.text_mut().insert(0, "edit ");
        doc.on_change();
        assert!(doc.is_dirty());
        nb.add_tab(None).unwrap();
        nb.current_editor_mut().unwrap().text_mut().insert(0, "draft");

        let mut dialogs = ScriptedDialogs::default();
        dialogs.save_paths.push_back(taken.clone());
        assert_eq!(nb.save_as(&mut dialogs, None).unwrap(), SaveOutcome::Cancelled);
        assert_eq!(nb.len(), 2);
        assert_eq!(dialogs.alerts.len(), 1);
        assert_eq!(fs::read_to_string(&taken).unwrap(), "old");

        let texts: Vec<String> = nb.documents().iter().map(|d| d.text().text()).collect();
        assert_eq!(texts, vec!["edit old".to_string(), "draft".to_string()]);
        assert!(nb.current_editor().unwrap().path().is_none());
    }

    #[test]
    fn test_failed_save_as_keeps_other_tab() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone");
        fs::create_dir(&gone).unwrap();
        let taken = gone.join("taken.txt");
        fs::write(&taken, "old").unwrap();

        let coordinator = Coordinator::mock();
        let mut nb = notebook(&coordinator);
        let kept = nb.open(taken.clone()).unwrap();
        nb.add_tab(None).unwrap();
        fs::remove_dir_all(&gone).unwrap();

        let mut dialogs = ScriptedDialogs::default();
        dialogs.save_paths.push_back(taken.clone());
        assert!(matches!(nb.save_as(&mut dialogs, None), Err(AppError::Save { .. })));
        assert_eq!(nb.len(), 2);
        assert_eq!(nb.find_by_path(&taken), Some(kept));
        assert!(nb.current_editor().unwrap().path().is_none());
    }

    #[test]
    fn test_save_untitled_prompts_for_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("fresh.css");
        let coordinator = Coordinator::mock();
        let mut nb = notebook(&coordinator);
        nb.add_tab(None).unwrap();

        let mut dialogs = ScriptedDialogs::default();
        dialogs.save_paths.push_back(dest.clone());
        assert_eq!(nb.save(&mut dialogs, None).unwrap(), SaveOutcome::Saved);
        assert_eq!(nb.find_by_path(&dest), nb.active_id());
        assert!(dest.exists());
    }

    #[test]
    fn test_tab_labels_mark_active_and_dirty() {
        let coordinator = Coordinator::mock();
        let mut nb = notebook(&coordinator);
        nb.add_tab(None).unwrap();
        let second = nb.add_tab(None).unwrap();
        let doc = nb.current_editor_mut().unwrap();
        doc.text_mut().insert(0, "x");
        doc.on_change();

        let labels = nb.tab_labels();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].label, "new file");
        assert!(!labels[0].active);
        assert_eq!(labels[1].label, "*new file");
        assert_eq!(labels[1].id, second);
        assert!(labels[1].active);
    }
}
