//! Contracts between the workbench and the widgets around the editor.

use std::path::{Path, PathBuf};

use crate::app::controllers::tree::DirectoryTree;
use crate::app::domain::document::DocumentId;
use crate::app::domain::text_widget::TextWidget;
use crate::app::services::text_ops::SearchSession;

/// Modal interactions with the user.
pub trait Dialogs {
    fn open_file(&mut self, initial_dir: Option<&Path>) -> Option<PathBuf>;

    fn save_file(&mut self, initial_dir: Option<&Path>) -> Option<PathBuf>;

    fn choose_dir(&mut self, initial_dir: Option<&Path>) -> Option<PathBuf>;

    /// Ask before dropping unsaved changes to `name`. `true` discards.
    fn confirm_discard(&mut self, name: &str) -> bool;

    fn alert(&mut self, message: &str);

    /// Run the search box against `text` until the user closes it.
    fn search(&mut self, text: &mut dyn TextWidget, session: &mut SearchSession);

    /// Run the replace box against `text` until the user closes it.
    fn replace(&mut self, text: &mut dyn TextWidget);

    /// Offer `candidates` at `anchor`; the index of the confirmed entry, or
    /// `None` when cancelled.
    fn complete(&mut self, anchor: (i32, i32), candidates: &[String]) -> Option<usize>;
}

/// Output panel for style-check reports.
pub trait LintPanel {
    fn clear(&mut self);

    fn append(&mut self, text: &str);

    /// Replace the panel contents.
    fn update(&mut self, text: &str) {
        self.clear();
        self.append(text);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabLabel {
    pub id: DocumentId,
    pub label: String,
    pub active: bool,
}

/// The parts of the window that mirror workbench state.
pub trait Surface {
    fn show_tabs(&mut self, tabs: &[TabLabel]);

    /// Called when the last document closes.
    fn show_no_document(&mut self);

    fn show_tree(&mut self, tree: &DirectoryTree);

    /// Resize the line-number gutter for a buffer of `line_count` lines.
    fn refresh_gutter(&mut self, line_count: usize);
}

/// Gutter width in pixels for `line_count` lines.
pub fn gutter_width(line_count: usize) -> i32 {
    let digits = line_count.max(1).to_string().len() as i32;
    (digits * 8 + 16).max(40)
}

#[cfg(test)]
pub mod fakes {
    //! Scripted stand-ins for the FLTK panels.

    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    pub struct ScriptedDialogs {
        pub open_paths: VecDeque<PathBuf>,
        pub save_paths: VecDeque<PathBuf>,
        pub dirs: VecDeque<PathBuf>,
        pub discard: bool,
        pub confirm_prompts: Vec<String>,
        pub alerts: Vec<String>,
        pub completion_choice: Option<usize>,
        pub offered: Vec<Vec<String>>,
        pub search_queries: VecDeque<String>,
        pub replace_with: Option<(String, String)>,
    }

    impl Dialogs for ScriptedDialogs {
        fn open_file(&mut self, _initial_dir: Option<&Path>) -> Option<PathBuf> {
            self.open_paths.pop_front()
        }

        fn save_file(&mut self, _initial_dir: Option<&Path>) -> Option<PathBuf> {
            self.save_paths.pop_front()
        }

        fn choose_dir(&mut self, _initial_dir: Option<&Path>) -> Option<PathBuf> {
            self.dirs.pop_front()
        }

        fn confirm_discard(&mut self, name: &str) -> bool {
            self.confirm_prompts.push(name.to_string());
            self.discard
        }

        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }

        fn search(&mut self, text: &mut dyn TextWidget, session: &mut SearchSession) {
            while let Some(query) = self.search_queries.pop_front() {
                session.search(text, &query, true);
            }
        }

        fn replace(&mut self, text: &mut dyn TextWidget) {
            if let Some((from, to)) = self.replace_with.take() {
                crate::app::services::text_ops::replace_all(text, &from, &to, true);
            }
        }

        fn complete(&mut self, _anchor: (i32, i32), candidates: &[String]) -> Option<usize> {
            self.offered.push(candidates.to_vec());
            self.completion_choice
        }
    }

    /// Handle sharing one script between the test and the workbench that
    /// owns a boxed copy.
    #[derive(Clone, Default)]
    pub struct SharedDialogs(pub Rc<RefCell<ScriptedDialogs>>);

    impl Dialogs for SharedDialogs {
        fn open_file(&mut self, initial_dir: Option<&Path>) -> Option<PathBuf> {
            self.0.borrow_mut().open_file(initial_dir)
        }

        fn save_file(&mut self, initial_dir: Option<&Path>) -> Option<PathBuf> {
            self.0.borrow_mut().save_file(initial_dir)
        }

        fn choose_dir(&mut self, initial_dir: Option<&Path>) -> Option<PathBuf> {
            self.0.borrow_mut().choose_dir(initial_dir)
        }

        fn confirm_discard(&mut self, name: &str) -> bool {
            self.0.borrow_mut().confirm_discard(name)
        }

        fn alert(&mut self, message: &str) {
            self.0.borrow_mut().alert(message)
        }

        fn search(&mut self, text: &mut dyn TextWidget, session: &mut SearchSession) {
            self.0.borrow_mut().search(text, session)
        }

        fn replace(&mut self, text: &mut dyn TextWidget) {
            self.0.borrow_mut().replace(text)
        }

        fn complete(&mut self, anchor: (i32, i32), candidates: &[String]) -> Option<usize> {
            self.0.borrow_mut().complete(anchor, candidates)
        }
    }

    #[derive(Clone, Default)]
    pub struct RecordingPanel {
        pub text: Rc<RefCell<String>>,
    }

    impl LintPanel for RecordingPanel {
        fn clear(&mut self) {
            self.text.borrow_mut().clear();
        }

        fn append(&mut self, text: &str) {
            self.text.borrow_mut().push_str(text);
        }
    }

    #[derive(Clone, Default)]
    pub struct RecordingSurface {
        pub tabs: Rc<RefCell<Vec<TabLabel>>>,
        pub tree_roots: Rc<RefCell<Vec<PathBuf>>>,
        pub gutter_lines: Rc<RefCell<Vec<usize>>>,
        pub blanked: Rc<RefCell<usize>>,
    }

    impl Surface for RecordingSurface {
        fn show_tabs(&mut self, tabs: &[TabLabel]) {
            *self.tabs.borrow_mut() = tabs.to_vec();
        }

        fn show_no_document(&mut self) {
            *self.blanked.borrow_mut() += 1;
        }

        fn show_tree(&mut self, tree: &DirectoryTree) {
            self.tree_roots.borrow_mut().push(tree.root().to_path_buf());
        }

        fn refresh_gutter(&mut self, line_count: usize) {
            self.gutter_lines.borrow_mut().push(line_count);
        }
    }
}
