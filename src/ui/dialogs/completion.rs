use std::cell::Cell;
use std::rc::Rc;

use fltk::{
    app,
    browser::HoldBrowser,
    enums::{Event, Key},
    prelude::*,
    window::Window,
};

use super::run_dialog;

const POPUP_WIDTH: i32 = 240;
const ROW_HEIGHT: i32 = 18;
const MAX_ROWS: usize = 10;

/// Borderless list of candidates at `anchor` (screen coordinates). Enter or a
/// double click confirms; Escape, Tab or losing focus cancels.
pub fn show_completion_popup(anchor: (i32, i32), candidates: &[String]) -> Option<usize> {
    let rows = candidates.len().clamp(1, MAX_ROWS) as i32;
    let height = rows * ROW_HEIGHT + 4;

    let mut win = Window::new(anchor.0, anchor.1, POPUP_WIDTH, height, None);
    win.set_border(false);
    let mut browser = HoldBrowser::new(0, 0, POPUP_WIDTH, height, None);
    for candidate in candidates {
        browser.add(candidate);
    }
    browser.select(1);
    win.end();
    win.make_modal(true);
    win.show();
    if let Err(err) = browser.take_focus() {
        tracing::warn!(%err, "completion list could not take focus");
    }

    let chosen = Rc::new(Cell::new(None));

    browser.handle({
        let chosen = chosen.clone();
        let mut win = win.clone();
        move |b, event| match event {
            Event::KeyDown => match app::event_key() {
                Key::Enter | Key::KPEnter => {
                    chosen.set(selected_index(b));
                    win.hide();
                    true
                }
                Key::Escape | Key::Tab => {
                    win.hide();
                    true
                }
                _ => false,
            },
            Event::Unfocus => {
                win.hide();
                false
            }
            _ => false,
        }
    });
    browser.set_callback({
        let chosen = chosen.clone();
        let mut win = win.clone();
        move |b| {
            if app::event_clicks() {
                chosen.set(selected_index(b));
                win.hide();
            }
        }
    });

    run_dialog(&win);
    chosen.get()
}

/// Zero-based index of the highlighted line; FLTK browsers count from 1.
fn selected_index(browser: &HoldBrowser) -> Option<usize> {
    usize::try_from(browser.value()).ok()?.checked_sub(1)
}
