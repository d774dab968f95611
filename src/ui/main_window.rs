use fltk::{
    enums::{Color, Font},
    group::{Flex, FlexType},
    menu::MenuBar,
    prelude::*,
    text::{TextBuffer, TextEditor},
    window::Window,
};

use crate::app::controllers::coordinator::Coordinator;
use crate::app::domain::settings::AppSettings;

use super::lint_panel::FltkLintPanel;
use super::tab_bar::{TabBar, TAB_BAR_HEIGHT};
use super::tree_panel::TreePanel;

const TREE_WIDTH: i32 = 220;
const LINT_HEIGHT: i32 = 120;

/// Which panels surround the notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// File tree on the left, lint output under the editor.
    Full,
    /// Notebook only.
    Simple,
}

pub struct MainWidgets {
    pub wind: Window,
    pub menu: MenuBar,
    pub tab_bar: TabBar,
    pub text_editor: TextEditor,
    pub tree_panel: Option<TreePanel>,
    pub lint_panel: Option<FltkLintPanel>,
}

/// FLTK font for a configured family name.
pub fn editor_font(family: &str) -> Font {
    match family.to_ascii_lowercase().as_str() {
        "courier" => Font::Courier,
        "helvetica" => Font::Helvetica,
        "times" => Font::Times,
        "screen" => Font::Screen,
        _ => Font::by_name(family),
    }
}

pub fn build_main_window(layout: Layout, settings: &AppSettings, coordinator: &Coordinator) -> MainWidgets {
    let font = editor_font(&settings.font_family);
    let font_size = i32::try_from(settings.font_size).unwrap_or(14);

    let mut wind = Window::new(100, 100, 1000, 700, "busy");
    wind.set_xclass("busy");

    let mut outer = Flex::new(0, 0, 1000, 700, None);
    outer.set_type(FlexType::Column);

    let menu = MenuBar::new(0, 0, 0, 30, "");
    outer.fixed(&menu, 30);

    let mut body = Flex::default();
    body.set_type(FlexType::Row);

    let tree_panel = match layout {
        Layout::Full => {
            let panel = TreePanel::new(coordinator.clone());
            body.fixed(&panel.widget, TREE_WIDTH);
            Some(panel)
        }
        Layout::Simple => None,
    };

    let mut column = Flex::default();
    column.set_type(FlexType::Column);

    let tab_bar = TabBar::new(0, 30, 640, coordinator.clone());
    column.fixed(&tab_bar.widget, TAB_BAR_HEIGHT);

    let mut text_editor = TextEditor::new(0, 0, 0, 0, "");
    text_editor.set_buffer(TextBuffer::default());
    text_editor.set_text_font(font);
    text_editor.set_text_size(font_size);
    text_editor.set_linenumber_bgcolor(Color::from_rgb(240, 240, 240));
    text_editor.set_linenumber_fgcolor(Color::from_rgb(100, 100, 100));

    let lint_panel = match layout {
        Layout::Full => {
            let panel = FltkLintPanel::new(font, font_size.saturating_sub(2).max(8));
            column.fixed(panel.widget(), LINT_HEIGHT);
            Some(panel)
        }
        Layout::Simple => None,
    };

    column.end();
    body.end();
    outer.end();
    wind.resizable(&outer);
    wind.end();

    MainWidgets {
        wind,
        menu,
        tab_bar,
        text_editor,
        tree_panel,
        lint_panel,
    }
}
