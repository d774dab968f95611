use fltk::{
    enums::{Key, Shortcut},
    menu::{MenuBar, MenuFlag},
    prelude::*,
};

use crate::app::controllers::coordinator::Coordinator;

/// Every entry goes through the coordinator, so menu clicks and shortcuts
/// take the same path as any other command.
pub fn build_menu(menu: &mut MenuBar, coordinator: &Coordinator, tree_enabled: bool) {
    let c = coordinator;

    // File
    menu.add("File/New", Shortcut::Ctrl | 'n', MenuFlag::Normal, { let c = c.clone(); move |_| c.new_file() });
    menu.add("File/Open...", Shortcut::Ctrl | 'o', MenuFlag::Normal, { let c = c.clone(); move |_| c.open_file() });
    menu.add("File/Save", Shortcut::Ctrl | 's', MenuFlag::Normal, { let c = c.clone(); move |_| c.save_file() });
    menu.add("File/Save As...", Shortcut::Ctrl | Shortcut::Shift | 's', MenuFlag::MenuDivider, { let c = c.clone(); move |_| c.save_file_as() });
    menu.add("File/Close Tab", Shortcut::Ctrl | 'd', MenuFlag::Normal, { let c = c.clone(); move |_| c.delete_tab() });
    menu.add("File/Next Tab", Shortcut::Ctrl | Key::Tab, MenuFlag::Normal, { let c = c.clone(); move |_| c.next_tab() });
    menu.add("File/Previous Tab", Shortcut::Ctrl | Shortcut::Shift | Key::Tab, MenuFlag::MenuDivider, { let c = c.clone(); move |_| c.previous_tab() });
    menu.add("File/Quit", Shortcut::Ctrl | 'q', MenuFlag::Normal, { let c = c.clone(); move |_| c.quit() });

    // Edit
    menu.add("Edit/Select All", Shortcut::Ctrl | 'a', MenuFlag::Normal, { let c = c.clone(); move |_| c.select_all() });
    menu.add("Edit/Indent", Shortcut::Ctrl | ']', MenuFlag::Normal, { let c = c.clone(); move |_| c.indent() });
    menu.add("Edit/Dedent", Shortcut::Ctrl | '[', MenuFlag::MenuDivider, { let c = c.clone(); move |_| c.dedent() });
    menu.add("Edit/Find...", Shortcut::Ctrl | 'f', MenuFlag::Normal, { let c = c.clone(); move |_| c.search() });
    menu.add("Edit/Replace...", Shortcut::Ctrl | 'h', MenuFlag::Normal, { let c = c.clone(); move |_| c.replace() });

    // View
    menu.add("View/Highlight All", Shortcut::Ctrl | 'l', MenuFlag::Normal, { let c = c.clone(); move |_| c.highlight() });
    if tree_enabled {
        menu.add("View/Change Root...", Shortcut::None | Key::F4, MenuFlag::Normal, { let c = c.clone(); move |_| c.change_dir() });
        menu.add("View/Refresh Tree", Shortcut::None | Key::F5, MenuFlag::Normal, { let c = c.clone(); move |_| c.update_dir() });
        menu.add("View/Clear Lint Output", Shortcut::None, MenuFlag::Normal, { let c = c.clone(); move |_| c.clear_lint() });
    }
}
