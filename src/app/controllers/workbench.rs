//! Message routing for the whole window.
//!
//! The workbench owns the notebook and the side panels and is the only
//! receiver of coordinator messages. Every document-scoped message is a
//! silent no-op while no document is open.

use std::path::{Path, PathBuf};

use crate::app::controllers::coordinator::{Coordinator, MessageQueue};
use crate::app::controllers::notebook::Notebook;
use crate::app::controllers::panels::{Dialogs, LintPanel, Surface};
use crate::app::controllers::tree::DirectoryTree;
use crate::app::domain::code_style::KeyOutcome;
use crate::app::domain::document::{EditorKey, SaveOutcome};
use crate::app::domain::messages::Message;
use crate::app::domain::text_widget::TextWidget;
use crate::app::infrastructure::error::Result;
use crate::app::services::text_ops::SearchSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Workbench<W: TextWidget> {
    notebook: Notebook<W>,
    surface: Box<dyn Surface>,
    dialogs: Box<dyn Dialogs>,
    coordinator: Coordinator,
    /// Absent in the simple layout.
    tree: Option<DirectoryTree>,
    lint_panel: Option<Box<dyn LintPanel>>,
    /// Last directory used in a file open/save dialog.
    last_open_directory: Option<PathBuf>,
}

impl<W: TextWidget> Workbench<W> {
    pub fn new(
        notebook: Notebook<W>,
        surface: Box<dyn Surface>,
        dialogs: Box<dyn Dialogs>,
        coordinator: Coordinator,
    ) -> Self {
        Self {
            notebook,
            surface,
            dialogs,
            coordinator,
            tree: None,
            lint_panel: None,
            last_open_directory: None,
        }
    }

    pub fn with_tree(mut self, tree: DirectoryTree) -> Self {
        self.surface.show_tree(&tree);
        self.tree = Some(tree);
        self
    }

    pub fn with_lint_panel(mut self, panel: Box<dyn LintPanel>) -> Self {
        self.lint_panel = Some(panel);
        self
    }

    pub fn notebook(&self) -> &Notebook<W> {
        &self.notebook
    }

    pub fn notebook_mut(&mut self) -> &mut Notebook<W> {
        &mut self.notebook
    }

    pub fn tree(&self) -> Option<&DirectoryTree> {
        self.tree.as_ref()
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Apply one message.
    pub fn handle(&mut self, message: Message) -> Flow {
        tracing::debug!(?message, "handle");
        match message {
            Message::FileNew => {
                let result = self.notebook.add_tab(None);
                self.after_tab_change(result);
            }
            Message::FileOpen => {
                let start = self.dialog_dir();
                if let Some(path) = self.dialogs.open_file(start.as_deref()) {
                    self.open_path(path);
                }
            }
            Message::OpenPath(path) => self.open_path(path),
            Message::FileSave => {
                let start = self.dialog_dir();
                let result = self.notebook.save(self.dialogs.as_mut(), start.as_deref());
                self.after_save(result);
            }
            Message::FileSaveAs => {
                let start = self.dialog_dir();
                let result = self.notebook.save_as(self.dialogs.as_mut(), start.as_deref());
                self.after_save(result);
            }
            Message::Quit => {
                if self.confirm_quit() {
                    return Flow::Quit;
                }
            }

            Message::TabDelete => {
                if self.notebook.delete_tab(self.dialogs.as_mut()) {
                    if self.notebook.is_empty() {
                        self.surface.show_no_document();
                    }
                    self.sync_tabs();
                    self.refresh_gutter();
                }
            }
            Message::TabSelect(id) => {
                if self.notebook.select(id) {
                    self.sync_tabs();
                    self.refresh_gutter();
                }
            }
            Message::TabNext => {
                self.notebook.select_next();
                self.sync_tabs();
            }
            Message::TabPrevious => {
                self.notebook.select_previous();
                self.sync_tabs();
            }
            Message::ChangeTabName => self.sync_tabs(),

            Message::Indent => {
                if let Some(doc) = self.notebook.current_editor_mut() {
                    doc.indent();
                }
            }
            Message::Dedent => {
                if let Some(doc) = self.notebook.current_editor_mut() {
                    doc.dedent();
                }
            }
            Message::Highlight => {
                if let Some(doc) = self.notebook.current_editor_mut() {
                    doc.all_highlight();
                }
            }
            Message::SelectAll => {
                if let Some(doc) = self.notebook.current_editor_mut() {
                    doc.select_all();
                }
            }
            Message::ShowSearch => {
                if let Some(doc) = self.notebook.current_editor_mut() {
                    let mut session = SearchSession::new();
                    self.dialogs.search(doc.text_mut(), &mut session);
                }
            }
            Message::ShowReplace => {
                if let Some(doc) = self.notebook.current_editor_mut() {
                    self.dialogs.replace(doc.text_mut());
                }
            }

            Message::UpdateLint(text) => {
                if let Some(panel) = self.lint_panel.as_mut() {
                    panel.update(&text);
                }
            }
            Message::ClearLint => {
                if let Some(panel) = self.lint_panel.as_mut() {
                    panel.clear();
                }
            }

            Message::ChangeDir => {
                if let Some(tree) = self.tree.as_mut() {
                    let current = tree.root().to_path_buf();
                    if let Some(dir) = self.dialogs.choose_dir(Some(&current)) {
                        tree.change_root(dir);
                        self.surface.show_tree(tree);
                    }
                }
            }
            Message::UpdateDir => {
                if let Some(tree) = self.tree.as_mut() {
                    tree.refresh();
                    self.surface.show_tree(tree);
                }
            }
            Message::ExpandDir(dir) => {
                if let Some(tree) = self.tree.as_mut() {
                    let listed = tree.expand(&dir).map(|_| ());
                    match listed {
                        Ok(()) => self.surface.show_tree(tree),
                        Err(err) => {
                            tracing::warn!(%err, dir = %dir.display(), "cannot expand directory");
                        }
                    }
                }
            }
            Message::CollapseDir(dir) => {
                if let Some(tree) = self.tree.as_mut() {
                    tree.collapse(&dir);
                }
            }

            Message::BufferChanged(id) => {
                if let Some(doc) = self.notebook.get_mut(id) {
                    doc.on_change();
                }
            }
            Message::RefreshGutter => self.refresh_gutter(),
        }
        Flow::Continue
    }

    /// Give the active code style first go at an editor key. Returns true
    /// when the key was consumed.
    pub fn handle_key(&mut self, key: EditorKey) -> bool {
        let Some(doc) = self.notebook.current_editor_mut() else {
            return false;
        };
        match doc.on_key(key) {
            KeyOutcome::Handled => true,
            KeyOutcome::Default => false,
            KeyOutcome::Complete(request) => {
                let picked = self
                    .dialogs
                    .complete(request.anchor, &request.candidates)
                    .and_then(|i| request.candidates.get(i));
                if let Some(choice) = picked {
                    doc.apply_completion(&request, choice);
                }
                true
            }
        }
    }

    pub fn on_scroll(&self) {
        if let Some(doc) = self.notebook.current_editor() {
            doc.on_scroll();
        }
    }

    /// Drain `queue`, stopping early when a message asks to quit.
    pub fn pump(&mut self, queue: &MessageQueue) -> Flow {
        while let Some(message) = queue.pop() {
            if self.handle(message) == Flow::Quit {
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    /// True when nothing is unsaved or the user agrees to discard it.
    pub fn confirm_quit(&mut self) -> bool {
        let dirty: Vec<String> = self
            .notebook
            .documents()
            .iter()
            .filter(|d| d.is_dirty())
            .map(|d| d.display_name())
            .collect();
        dirty.is_empty() || self.dialogs.confirm_discard(&dirty.join(", "))
    }

    fn open_path(&mut self, path: PathBuf) {
        if let Some(parent) = path.parent() {
            self.last_open_directory = Some(parent.to_path_buf());
        }
        let result = self.notebook.open(path);
        self.after_tab_change(result);
    }

    fn after_tab_change<T>(&mut self, result: Result<T>) {
        match result {
            Ok(_) => {
                self.sync_tabs();
                self.refresh_gutter();
            }
            Err(err) => {
                tracing::warn!(%err, "tab not opened");
                self.dialogs.alert(&err.to_string());
            }
        }
    }

    fn after_save(&mut self, result: Result<SaveOutcome>) {
        match result {
            Ok(SaveOutcome::Saved) => {
                let saved_dir = self
                    .notebook
                    .current_editor()
                    .and_then(|d| d.path())
                    .and_then(Path::parent)
                    .map(Path::to_path_buf);
                if saved_dir.is_some() {
                    self.last_open_directory = saved_dir;
                }
                self.sync_tabs();
            }
            Ok(SaveOutcome::Cancelled) => {}
            Err(err) => {
                tracing::warn!(%err, "save failed");
                self.dialogs.alert(&err.to_string());
                self.sync_tabs();
            }
        }
    }

    /// Directory a file dialog opens in: the last one used, else the tree root.
    fn dialog_dir(&self) -> Option<PathBuf> {
        self.last_open_directory
            .clone()
            .or_else(|| self.tree.as_ref().map(|t| t.root().to_path_buf()))
    }

    fn sync_tabs(&mut self) {
        let labels = self.notebook.tab_labels();
        self.surface.show_tabs(&labels);
    }

    fn refresh_gutter(&mut self) {
        if let Some(doc) = self.notebook.current_editor() {
            self.surface.refresh_gutter(doc.text().line_count());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::controllers::panels::fakes::{RecordingPanel, RecordingSurface, SharedDialogs};
    use crate::app::domain::document::test_support::{context, context_with_lint};
    use crate::app::domain::document::DocumentContext;
    use crate::app::domain::settings::LintSettings;
    use crate::app::infrastructure::memory_text::MemoryText;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::rc::Rc;

    struct Harness {
        workbench: Workbench<MemoryText>,
        queue: MessageQueue,
        surface: RecordingSurface,
        dialogs: SharedDialogs,
        panel: RecordingPanel,
    }

    impl Harness {
        fn build(build: impl FnOnce(&Coordinator) -> DocumentContext, tree: Option<DirectoryTree>) -> Self {
            let coordinator = Coordinator::mock();
            let queue = MessageQueue::new();
            coordinator.bind(Rc::new(queue.clone()));

            let notebook = Notebook::new(Box::new(|_| MemoryText::new()), build(&coordinator));
            let surface = RecordingSurface::default();
            let dialogs = SharedDialogs::default();
            let panel = RecordingPanel::default();
            let mut workbench = Workbench::new(
                notebook,
                Box::new(surface.clone()),
                Box::new(dialogs.clone()),
                coordinator,
            )
            .with_lint_panel(Box::new(panel.clone()));
            if let Some(tree) = tree {
                workbench = workbench.with_tree(tree);
            }
            Self {
                workbench,
                queue,
                surface,
                dialogs,
                panel,
            }
        }

        fn new() -> Self {
            Self::build(context, None)
        }

        fn send(&mut self, message: Message) -> Flow {
            match self.workbench.handle(message) {
                Flow::Quit => Flow::Quit,
                Flow::Continue => self.workbench.pump(&self.queue),
            }
        }

        fn labels(&self) -> Vec<String> {
            self.surface.tabs.borrow().iter().map(|t| t.label.clone()).collect()
        }

        fn type_text(&mut self, text: &str) {
            let doc = self.workbench.notebook_mut().current_editor_mut().unwrap();
            let pos = doc.text().insert_position();
            doc.text_mut().insert(pos, text);
            self.workbench.pump(&self.queue);
        }
    }

    #[test]
    fn test_edit_marks_tab_dirty_and_save_clears_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = Harness::new();
        h.send(Message::FileNew);
        assert_eq!(h.labels(), vec!["new file"]);

        h.type_text("hello\n");
        assert_eq!(h.labels(), vec!["*new file"]);

        let dest = dir.path().join("hello.txt");
        h.dialogs.0.borrow_mut().save_paths.push_back(dest.clone());
        h.send(Message::FileSave);
        assert_eq!(h.labels(), vec!["hello.txt"]);
        assert_eq!(fs::read_to_string(dest).unwrap(), "hello\n");
    }

    #[test]
    fn test_opened_file_is_clean_until_edited() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.py");
        fs::write(&path, "def f():\n    pass\n").unwrap();

        let mut h = Harness::new();
        h.send(Message::OpenPath(path.clone()));
        assert_eq!(h.labels(), vec!["a.py"]);
        assert!(!h.workbench.notebook().current_editor().unwrap().is_dirty());

        h.send(Message::OpenPath(path));
        assert_eq!(h.workbench.notebook().len(), 1);
    }

    #[test]
    fn test_document_commands_without_document_are_noops() {
        let mut h = Harness::new();
        for message in [
            Message::FileSave,
            Message::FileSaveAs,
            Message::TabDelete,
            Message::TabNext,
            Message::Indent,
            Message::Dedent,
            Message::Highlight,
            Message::SelectAll,
            Message::ShowSearch,
            Message::ShowReplace,
            Message::RefreshGutter,
        ] {
            assert_eq!(h.send(message), Flow::Continue);
        }
        assert!(!h.workbench.handle_key(EditorKey::Tab));
        let script = h.dialogs.0.borrow();
        assert!(script.alerts.is_empty());
        assert!(script.confirm_prompts.is_empty());
    }

    #[test]
    fn test_failed_open_alerts_and_adds_no_tab() {
        let mut h = Harness::new();
        h.send(Message::OpenPath(PathBuf::from("/definitely/not/here.py")));
        assert!(h.workbench.notebook().is_empty());
        let alerts = h.dialogs.0.borrow().alerts.clone();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("here.py"));
    }

    #[test]
    fn test_delete_last_tab_blanks_editor() {
        let mut h = Harness::new();
        h.send(Message::FileNew);
        h.send(Message::TabDelete);
        assert!(h.workbench.notebook().is_empty());
        assert_eq!(*h.surface.blanked.borrow(), 1);
        assert!(h.labels().is_empty());
    }

    #[test]
    fn test_indent_and_dedent_commands() {
        let mut h = Harness::new();
        h.send(Message::FileNew);
        h.type_text("x");
        h.workbench
            .notebook_mut()
            .current_editor_mut()
            .unwrap()
            .text_mut()
            .set_insert_position(0);
        h.send(Message::Indent);
        let doc = h.workbench.notebook().current_editor().unwrap();
        assert_eq!(doc.text().text(), "\tx");
        h.send(Message::Dedent);
        let doc = h.workbench.notebook().current_editor().unwrap();
        assert_eq!(doc.text().text(), "x");
    }

    #[test]
    fn test_scroll_refreshes_gutter() {
        let mut h = Harness::new();
        h.send(Message::FileNew);
        h.type_text("a\nb\nc\n");
        h.surface.gutter_lines.borrow_mut().clear();

        h.workbench.on_scroll();
        h.workbench.pump(&h.queue);
        assert_eq!(*h.surface.gutter_lines.borrow(), vec![4]);

        h.dialogs.0.borrow_mut().discard = true;
        h.send(Message::TabDelete);
        assert!(h.workbench.notebook().is_empty());
        h.surface.gutter_lines.borrow_mut().clear();
        h.workbench.on_scroll();
        h.workbench.pump(&h.queue);
        assert!(h.surface.gutter_lines.borrow().is_empty());
    }

    #[test]
    fn test_failed_save_as_keeps_tabs_in_sync() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone");
        fs::create_dir(&gone).unwrap();
        let taken = gone.join("taken.txt");
        fs::write(&taken, "old").unwrap();

        let mut h = Harness::new();
        h.send(Message::OpenPath(taken.clone()));
        h.send(Message::FileNew);
        fs::remove_dir_all(&gone).unwrap();

        h.dialogs.0.borrow_mut().save_paths.push_back(taken);
        h.send(Message::FileSaveAs);
        assert_eq!(h.dialogs.0.borrow().alerts.len(), 1);
        assert_eq!(h.labels(), vec!["taken.txt", "new file"]);
        assert_eq!(h.workbench.notebook().len(), 2);
    }

    #[test]
    fn test_enter_key_is_consumed() {
        let mut h = Harness::new();
        h.send(Message::FileNew);
        h.type_text("f(");
        assert!(h.workbench.handle_key(EditorKey::Enter));
        let doc = h.workbench.notebook().current_editor().unwrap();
        assert_eq!(doc.text().text(), "f(\n\t");

        assert!(h.workbench.handle_key(EditorKey::BackSpace));
        assert!(!h.workbench.handle_key(EditorKey::BackSpace));
        let doc = h.workbench.notebook().current_editor().unwrap();
        assert_eq!(doc.text().text(), "f(\n");
    }

    #[test]
    fn test_completion_choice_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.py");
        fs::write(&path, "def render():\n    pass\n\n").unwrap();

        let mut h = Harness::new();
        h.send(Message::OpenPath(path));
        let end = h.workbench.notebook().current_editor().unwrap().text().length();
        h.workbench
            .notebook_mut()
            .current_editor_mut()
            .unwrap()
            .text_mut()
            .set_insert_position(end);
        h.type_text("ren");

        h.dialogs.0.borrow_mut().completion_choice = Some(0);
        assert!(h.workbench.handle_key(EditorKey::Tab));
        let doc = h.workbench.notebook().current_editor().unwrap();
        assert!(doc.text().text().ends_with("\nrender"));
        assert_eq!(h.dialogs.0.borrow().offered, vec![vec!["render".to_string()]]);
    }

    #[test]
    fn test_search_and_replace_run_on_active_document() {
        let mut h = Harness::new();
        h.send(Message::FileNew);
        h.type_text("one two one");

        h.dialogs.0.borrow_mut().search_queries.push_back("one".to_string());
        h.send(Message::ShowSearch);
        let selection = h.workbench.notebook().current_editor().unwrap().text().selection();
        assert_eq!(selection, Some((0, 3)));

        h.dialogs.0.borrow_mut().replace_with = Some(("one".to_string(), "1".to_string()));
        h.send(Message::ShowReplace);
        let doc = h.workbench.notebook().current_editor().unwrap();
        assert_eq!(doc.text().text(), "1 two 1");
    }

    #[test]
    fn test_quit_with_unsaved_changes_asks_first() {
        let mut h = Harness::new();
        h.send(Message::FileNew);
        assert_eq!(h.send(Message::Quit), Flow::Quit);

        h.type_text("draft");
        assert_eq!(h.send(Message::Quit), Flow::Continue);
        h.dialogs.0.borrow_mut().discard = true;
        assert_eq!(h.send(Message::Quit), Flow::Quit);
    }

    #[test]
    fn test_simple_layout_ignores_tree_messages() {
        let mut h = Harness::new();
        h.dialogs.0.borrow_mut().dirs.push_back(PathBuf::from("/tmp"));
        h.send(Message::ChangeDir);
        h.send(Message::UpdateDir);
        assert!(h.surface.tree_roots.borrow().is_empty());
        assert_eq!(h.dialogs.0.borrow().dirs.len(), 1);
    }

    #[test]
    fn test_change_dir_rebuilds_tree() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let mut h = Harness::build(context, Some(DirectoryTree::new(first.path())));
        h.dialogs.0.borrow_mut().dirs.push_back(second.path().to_path_buf());

        h.send(Message::ChangeDir);
        let roots = h.surface.tree_roots.borrow().clone();
        assert_eq!(roots, vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        assert_eq!(h.workbench.tree().unwrap().root(), second.path());
    }

    #[test]
    fn test_expand_and_collapse_directory() {
        let root = tempfile::tempdir().unwrap();
        let src = root.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("main.py"), "").unwrap();

        let mut h = Harness::build(context, Some(DirectoryTree::new(root.path())));
        h.send(Message::ExpandDir(src.clone()));
        assert!(h.workbench.tree().unwrap().is_expanded(&src));
        assert_eq!(h.surface.tree_roots.borrow().len(), 2);

        h.send(Message::CollapseDir(src.clone()));
        assert!(!h.workbench.tree().unwrap().is_expanded(&src));
    }

    #[test]
    fn test_lint_panel_update_and_clear() {
        let mut h = Harness::new();
        h.send(Message::UpdateLint("first".to_string()));
        h.send(Message::UpdateLint("second".to_string()));
        assert_eq!(*h.panel.text.borrow(), "second");
        h.send(Message::ClearLint);
        assert!(h.panel.text.borrow().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_runs_style_check_into_panel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.py");
        fs::write(&path, "import os\n").unwrap();

        let lint = LintSettings {
            commands: [(
                "py".to_string(),
                vec![
                    "sh".to_string(),
                    "-c".to_string(),
                    "echo \"$0:1:1: F401 'os' imported but unused\"".to_string(),
                ],
            )]
            .into(),
            ..LintSettings::default()
        };
        let mut h = Harness::build(|c| context_with_lint(c, lint), None);
        h.send(Message::OpenPath(path));
        h.send(Message::FileSave);

        let report = h.panel.text.borrow().clone();
        assert!(!report.is_empty());
        assert!(report.contains("F401"));
        assert!(report.contains("a.py:1:1"));
    }
}
