use std::cell::RefCell;
use std::rc::Rc;

use fltk::{app, enums::Event, prelude::*};
use tracing_subscriber::EnvFilter;

use busy::app::controllers::coordinator::Coordinator;
use busy::app::controllers::notebook::Notebook;
use busy::app::controllers::tree::DirectoryTree;
use busy::app::controllers::workbench::{Flow, Workbench};
use busy::app::domain::document::DocumentContext;
use busy::app::domain::messages::Message;
use busy::app::domain::settings::AppSettings;
use busy::app::infrastructure::fltk_text::{style_table, FltkText};
use busy::app::services::lint::StyleChecker;
use busy::app::services::syntax::Tokenizer;
use busy::ui::dialogs::FltkDialogs;
use busy::ui::editor_keys;
use busy::ui::main_window::{build_main_window, editor_font, Layout};
use busy::ui::menu::build_menu;
use busy::ui::surface::FltkSurface;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let layout = if std::env::args().skip(1).any(|arg| arg == "--simple") {
        Layout::Simple
    } else {
        Layout::Full
    };
    let settings = AppSettings::load();
    tracing::info!(?layout, "starting busy");

    let app = app::App::default();
    let (sender, receiver) = app::channel::<Message>();

    // Bound before any widget exists, so no callback can reach an unbound
    // coordinator.
    let coordinator = Coordinator::default();
    coordinator.bind(Rc::new(sender));

    let mut widgets = build_main_window(layout, &settings, &coordinator);
    build_menu(&mut widgets.menu, &coordinator, layout == Layout::Full);

    let font_size = i32::try_from(settings.font_size).unwrap_or(14);
    let table = style_table(editor_font(&settings.font_family), font_size);
    let context = DocumentContext {
        coordinator: coordinator.clone(),
        tokenizer: Rc::new(Tokenizer::new()),
        checker: Rc::new(StyleChecker::new(settings.lint.clone())),
    };
    let editor = widgets.text_editor.clone();
    let notebook = Notebook::new(
        Box::new(move |_| FltkText::new(editor.clone(), table.clone())),
        context,
    );

    let surface = FltkSurface {
        window: widgets.wind.clone(),
        editor: widgets.text_editor.clone(),
        tab_bar: widgets.tab_bar,
        tree_panel: widgets.tree_panel,
        line_numbers_enabled: settings.line_numbers_enabled,
    };
    let mut workbench = Workbench::new(
        notebook,
        Box::new(surface),
        Box::new(FltkDialogs),
        coordinator.clone(),
    );
    if layout == Layout::Full {
        workbench = workbench.with_tree(DirectoryTree::new(settings.initial_root()));
        if let Some(panel) = widgets.lint_panel {
            workbench = workbench.with_lint_panel(Box::new(panel));
        }
    }
    let workbench = Rc::new(RefCell::new(workbench));
    editor_keys::install(&mut widgets.text_editor, workbench.clone());

    // Closing the window asks about unsaved changes like File/Quit does.
    widgets.wind.set_callback({
        let coordinator = coordinator.clone();
        move |_| {
            if app::event() == Event::Close {
                coordinator.quit();
            }
        }
    });

    widgets.wind.show();
    coordinator.new_file();

    while app.wait() {
        if let Some(msg) = receiver.recv() {
            if workbench.borrow_mut().handle(msg) == Flow::Quit {
                break;
            }
        }
    }
    tracing::info!("busy exiting");
}
