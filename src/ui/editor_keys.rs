use std::cell::RefCell;
use std::rc::Rc;

use fltk::{
    app,
    enums::{Event, EventState, Key},
    prelude::*,
    text::TextEditor,
};

use crate::app::controllers::workbench::Workbench;
use crate::app::domain::document::EditorKey;
use crate::app::domain::text_widget::TextWidget;

fn editor_key(key: Key, state: EventState) -> Option<EditorKey> {
    if state.intersects(EventState::Ctrl | EventState::Alt | EventState::Meta) {
        return None;
    }
    match key {
        Key::Tab if !state.contains(EventState::Shift) => Some(EditorKey::Tab),
        Key::Enter | Key::KPEnter => Some(EditorKey::Enter),
        Key::BackSpace => Some(EditorKey::BackSpace),
        _ => None,
    }
}

/// Route Tab, Enter and BackSpace through the active code style before the
/// editor's default handling, and refresh the gutter on scroll.
///
/// The workbench is already borrowed while a modal dialog pumps events from
/// inside a message handler; keys then fall through to the editor.
pub fn install<W: TextWidget + 'static>(editor: &mut TextEditor, workbench: Rc<RefCell<Workbench<W>>>) {
    editor.handle(move |_, event| match event {
        Event::KeyDown => {
            let Some(key) = editor_key(app::event_key(), app::event_state()) else {
                return false;
            };
            match workbench.try_borrow_mut() {
                Ok(mut wb) => wb.handle_key(key),
                Err(_) => false,
            }
        }
        Event::MouseWheel => {
            if let Ok(wb) = workbench.try_borrow() {
                wb.on_scroll();
            }
            false
        }
        _ => false,
    });
}
