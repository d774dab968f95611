use std::cell::Cell;
use std::rc::Rc;

use fltk::{
    app,
    button::{Button, CheckButton},
    enums::{Align, CallbackTrigger},
    frame::Frame,
    input::Input,
    prelude::*,
    window::Window,
};

use crate::app::domain::text_widget::TextWidget;
use crate::app::services::text_ops::{replace_all, SearchSession};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Action {
    Idle,
    FindNext,
    ReplaceAll,
}

/// Callbacks only record the requested action; the dialog loop applies it
/// to the text.
fn on_action<W: WidgetExt>(widget: &mut W, pending: &Rc<Cell<Action>>, action: Action) {
    let pending = pending.clone();
    widget.set_callback(move |_| pending.set(action));
}

fn find_next(
    text: &mut dyn TextWidget,
    session: &mut SearchSession,
    query: &str,
    case_sensitive: bool,
    status: &mut Frame,
) {
    if query.is_empty() {
        status.set_label("Please enter text to find");
        return;
    }
    match session.search(text, query, case_sensitive) {
        Some(_) => status.set_label(&format!("{} match(es)", session.match_count())),
        None => status.set_label(&format!("Cannot find '{query}'")),
    }
}

/// Incremental search box. Repeating the same query steps to the next match.
pub fn show_search_dialog(text: &mut dyn TextWidget, session: &mut SearchSession) {
    let mut win = Window::default()
        .with_size(400, 130)
        .with_label("Search")
        .center_screen();

    Frame::default().with_pos(20, 20).with_size(80, 30).with_label("Find what:");
    let mut find_input = Input::default().with_pos(110, 20).with_size(270, 30);
    find_input.set_trigger(CallbackTrigger::EnterKeyAlways);

    let case_check = CheckButton::default()
        .with_pos(110, 55)
        .with_size(200, 25)
        .with_label("Match case");

    let mut status = Frame::default().with_pos(20, 90).with_size(180, 30);
    status.set_align(Align::Left | Align::Inside);

    let mut find_btn = Button::default().with_pos(200, 90).with_size(90, 30).with_label("Find Next");
    let mut close_btn = Button::default().with_pos(300, 90).with_size(80, 30).with_label("Close");

    win.end();
    win.make_modal(true);
    win.show();

    let pending = Rc::new(Cell::new(Action::Idle));
    on_action(&mut find_input, &pending, Action::FindNext);
    on_action(&mut find_btn, &pending, Action::FindNext);
    close_btn.set_callback({
        let mut win = win.clone();
        move |_| win.hide()
    });

    while win.shown() {
        app::wait();
        if app::should_program_quit() {
            win.hide();
        }
        if pending.replace(Action::Idle) == Action::FindNext {
            let query = find_input.value();
            find_next(text, session, &query, case_check.is_checked(), &mut status);
        }
    }
}

/// Replace box: step through matches or replace every occurrence at once.
pub fn show_replace_dialog(text: &mut dyn TextWidget) {
    let mut win = Window::default()
        .with_size(400, 180)
        .with_label("Replace")
        .center_screen();

    Frame::default().with_pos(20, 20).with_size(80, 30).with_label("Find what:");
    let find_input = Input::default().with_pos(110, 20).with_size(270, 30);

    Frame::default().with_pos(20, 60).with_size(80, 30).with_label("Replace:");
    let replace_input = Input::default().with_pos(110, 60).with_size(270, 30);

    let case_check = CheckButton::default()
        .with_pos(110, 95)
        .with_size(200, 25)
        .with_label("Match case");

    let mut find_btn = Button::default().with_pos(20, 135).with_size(90, 30).with_label("Find Next");
    let mut replace_all_btn = Button::default()
        .with_pos(120, 135)
        .with_size(100, 30)
        .with_label("Replace All");
    let mut close_btn = Button::default().with_pos(300, 135).with_size(80, 30).with_label("Close");

    let mut status = Frame::default().with_pos(20, 165).with_size(360, 15);
    status.set_align(Align::Left | Align::Inside);
    status.set_label_size(12);

    win.end();
    win.make_modal(true);
    win.show();

    let pending = Rc::new(Cell::new(Action::Idle));
    on_action(&mut find_btn, &pending, Action::FindNext);
    on_action(&mut replace_all_btn, &pending, Action::ReplaceAll);
    close_btn.set_callback({
        let mut win = win.clone();
        move |_| win.hide()
    });

    let mut session = SearchSession::new();
    while win.shown() {
        app::wait();
        if app::should_program_quit() {
            win.hide();
        }
        let action = pending.replace(Action::Idle);
        if action == Action::Idle {
            continue;
        }
        let query = find_input.value();
        let case_sensitive = case_check.is_checked();
        match action {
            Action::Idle => {}
            Action::FindNext => find_next(text, &mut session, &query, case_sensitive, &mut status),
            Action::ReplaceAll => {
                if query.is_empty() {
                    status.set_label("Please enter text to find");
                    continue;
                }
                let count = replace_all(text, &query, &replace_input.value(), case_sensitive);
                session.reset();
                status.set_label(&format!("Replaced {count} occurrence(s)"));
            }
        }
    }
}
