pub mod completion;
pub mod find;

use std::path::{Path, PathBuf};

use fltk::{
    app,
    dialog::{self, FileDialogOptions, FileDialogType, NativeFileChooser},
    prelude::*,
    window::Window,
};

use crate::app::controllers::panels::Dialogs;
use crate::app::domain::text_widget::TextWidget;
use crate::app::services::text_ops::SearchSession;

/// Run a dialog's event loop, automatically closing the dialog if the app
/// is quitting (e.g. user clicks X on the main window while a dialog is open).
pub fn run_dialog(dialog: &Window) {
    while dialog.shown() {
        app::wait();
        if app::should_program_quit() {
            let mut d = dialog.clone();
            d.hide();
        }
    }
}

fn native_dialog(
    kind: FileDialogType,
    options: FileDialogOptions,
    initial_dir: Option<&Path>,
) -> Option<PathBuf> {
    let mut nfc = NativeFileChooser::new(kind);
    nfc.set_option(options);
    if let Some(dir) = initial_dir
        && let Err(err) = nfc.set_directory(&dir)
    {
        tracing::debug!(?err, dir = %dir.display(), "dialog start directory rejected");
    }
    nfc.show(); // blocks until close
    let filename = nfc.filename();
    if filename.as_os_str().is_empty() {
        None
    } else {
        Some(filename)
    }
}

/// Native and FLTK dialogs behind the `Dialogs` contract.
pub struct FltkDialogs;

impl Dialogs for FltkDialogs {
    fn open_file(&mut self, initial_dir: Option<&Path>) -> Option<PathBuf> {
        native_dialog(FileDialogType::BrowseFile, FileDialogOptions::NoOptions, initial_dir)
    }

    fn save_file(&mut self, initial_dir: Option<&Path>) -> Option<PathBuf> {
        native_dialog(
            FileDialogType::BrowseSaveFile,
            FileDialogOptions::SaveAsConfirm,
            initial_dir,
        )
    }

    fn choose_dir(&mut self, initial_dir: Option<&Path>) -> Option<PathBuf> {
        native_dialog(FileDialogType::BrowseDir, FileDialogOptions::NoOptions, initial_dir)
    }

    fn confirm_discard(&mut self, name: &str) -> bool {
        let message = format!("{name} has unsaved changes.\nDiscard them?");
        dialog::choice2_default(&message, "Cancel", "Discard", "") == Some(1)
    }

    fn alert(&mut self, message: &str) {
        dialog::alert_default(message);
    }

    fn search(&mut self, text: &mut dyn TextWidget, session: &mut SearchSession) {
        find::show_search_dialog(text, session);
    }

    fn replace(&mut self, text: &mut dyn TextWidget) {
        find::show_replace_dialog(text);
    }

    fn complete(&mut self, anchor: (i32, i32), candidates: &[String]) -> Option<usize> {
        completion::show_completion_popup(anchor, candidates)
    }
}
