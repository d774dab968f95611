use fltk::{
    prelude::*,
    text::{TextBuffer, TextEditor},
    window::Window,
};

use crate::app::controllers::panels::{gutter_width, Surface, TabLabel};
use crate::app::controllers::tree::DirectoryTree;

use super::tab_bar::TabBar;
use super::tree_panel::TreePanel;

const APP_TITLE: &str = "busy";

/// Window parts the workbench keeps in sync with its state.
pub struct FltkSurface {
    pub window: Window,
    pub editor: TextEditor,
    pub tab_bar: TabBar,
    pub tree_panel: Option<TreePanel>,
    pub line_numbers_enabled: bool,
}

impl Surface for FltkSurface {
    fn show_tabs(&mut self, tabs: &[TabLabel]) {
        self.tab_bar.rebuild(tabs);
        let title = match tabs.iter().find(|t| t.active) {
            Some(tab) => format!("{} - {APP_TITLE}", tab.label),
            None => APP_TITLE.to_string(),
        };
        self.window.set_label(&title);
    }

    fn show_no_document(&mut self) {
        self.editor.set_buffer(TextBuffer::default());
        self.editor.set_linenumber_width(0);
        self.editor.redraw();
    }

    fn show_tree(&mut self, tree: &DirectoryTree) {
        if let Some(panel) = self.tree_panel.as_mut() {
            panel.show(tree);
        }
    }

    fn refresh_gutter(&mut self, line_count: usize) {
        let width = if self.line_numbers_enabled {
            gutter_width(line_count)
        } else {
            0
        };
        if self.editor.linenumber_width() != width {
            self.editor.set_linenumber_width(width);
            self.editor.redraw();
        }
    }
}
