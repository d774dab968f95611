use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use fltk::{
    app,
    prelude::*,
    tree::{Tree, TreeItem, TreeItemReselectMode, TreeReason, TreeSelect},
};

use crate::app::controllers::coordinator::Coordinator;
use crate::app::controllers::tree::DirectoryTree;

/// Child shown under directories that were never listed, so FLTK draws an
/// opener for them.
const PLACEHOLDER: &str = "\u{2026}";

/// File tree on the left of the window. Mirrors a `DirectoryTree`; opening
/// or closing a node and double-clicking a file go back through the
/// coordinator.
pub struct TreePanel {
    pub widget: Tree,
    root: Rc<RefCell<PathBuf>>,
}

impl TreePanel {
    pub fn new(coordinator: Coordinator) -> Self {
        let mut widget = Tree::new(0, 0, 0, 0, None);
        widget.set_show_root(false);
        widget.set_select_mode(TreeSelect::Single);
        widget.set_item_reselect_mode(TreeItemReselectMode::Always);

        let root = Rc::new(RefCell::new(PathBuf::new()));
        let cb_root = root.clone();
        widget.set_callback(move |t| {
            let Some(item) = t.callback_item() else {
                return;
            };
            let path = item_path(&cb_root.borrow(), &item);
            match t.callback_reason() {
                TreeReason::Opened => coordinator.expand_dir(path),
                TreeReason::Closed => coordinator.collapse_dir(path),
                TreeReason::Selected | TreeReason::Reselected if app::event_clicks() => {
                    DirectoryTree::activate(&path, &coordinator);
                }
                _ => {}
            }
        });

        Self { widget, root }
    }

    pub fn show(&mut self, tree: &DirectoryTree) {
        let root = tree.root().to_path_buf();
        self.widget.clear();
        for (_, entry) in tree.visible_entries() {
            let Some(label_path) = tree_label_path(&root, &entry.path) else {
                continue;
            };
            let Some(mut item) = self.widget.add(&label_path) else {
                continue;
            };
            if !entry.is_dir {
                continue;
            }
            if tree.is_expanded(&entry.path) {
                item.open();
            } else {
                self.widget.add(&format!("{label_path}/{PLACEHOLDER}"));
                item.close();
            }
        }
        *self.root.borrow_mut() = root;
        self.widget.redraw();
    }
}

/// FLTK item path for `path` below `root`, with separators in names escaped.
fn tree_label_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let labels: Vec<String> = relative
        .components()
        .map(|c| {
            c.as_os_str()
                .to_string_lossy()
                .replace('\\', "\\\\")
                .replace('/', "\\/")
        })
        .collect();
    (!labels.is_empty()).then(|| labels.join("/"))
}

/// Filesystem path of a tree item, rebuilt from its labels.
fn item_path(root: &Path, item: &TreeItem) -> PathBuf {
    let mut labels = Vec::new();
    let mut current = Some(item.clone());
    while let Some(node) = current {
        if node.is_root() {
            break;
        }
        if let Some(label) = node.label() {
            labels.push(label);
        }
        current = node.parent();
    }
    labels.iter().rev().fold(root.to_path_buf(), |path, label| path.join(label))
}
