use std::cell::RefCell;
use std::rc::Rc;

use fltk::{
    app, draw,
    enums::{Align, Color, Event, Font},
    prelude::*,
    widget::Widget,
};

use crate::app::controllers::coordinator::Coordinator;
use crate::app::controllers::panels::TabLabel;

pub const TAB_BAR_HEIGHT: i32 = 30;

const MIN_TAB_WIDTH: i32 = 60;
const MAX_TAB_WIDTH: i32 = 200;
const CLOSE_BTN_SIZE: i32 = 14;
const CLOSE_BTN_MARGIN: i32 = 6;
const TAB_H_PADDING: i32 = 10;
const CORNER_RADIUS: i32 = 6;
const TAB_GAP: i32 = 1;

struct Colors {
    bar_bg: Color,
    active_bg: Color,
    inactive_bg: Color,
    active_text: Color,
    inactive_text: Color,
    close_hover_bg: Color,
}

fn colors() -> Colors {
    Colors {
        bar_bg: Color::from_rgb(200, 200, 200),
        active_bg: Color::from_rgb(255, 255, 255),
        inactive_bg: Color::from_rgb(220, 220, 220),
        active_text: Color::from_rgb(0, 0, 0),
        inactive_text: Color::from_rgb(80, 80, 80),
        close_hover_bg: Color::from_rgb(190, 190, 190),
    }
}

struct TabBarState {
    tabs: Vec<TabLabel>,
    hover_tab: Option<usize>,
    hover_close: bool,
    coordinator: Coordinator,
}

enum HitResult {
    Tab { index: usize, is_close: bool },
    None,
}

pub struct TabBar {
    pub widget: Widget,
    state: Rc<RefCell<TabBarState>>,
}

impl TabBar {
    pub fn new(x: i32, y: i32, w: i32, coordinator: Coordinator) -> Self {
        let state = Rc::new(RefCell::new(TabBarState {
            tabs: Vec::new(),
            hover_tab: None,
            hover_close: false,
            coordinator,
        }));

        let mut widget = Widget::new(x, y, w, TAB_BAR_HEIGHT, None);

        let draw_state = state.clone();
        widget.draw(move |wid| {
            let st = draw_state.borrow();
            draw_tab_bar(wid, &st);
        });

        let handle_state = state.clone();
        widget.handle(move |wid, event| handle_tab_bar(wid, event, &handle_state));

        Self { widget, state }
    }

    pub fn rebuild(&mut self, tabs: &[TabLabel]) {
        let mut st = self.state.borrow_mut();
        st.tabs = tabs.to_vec();
        st.hover_tab = None;
        st.hover_close = false;
        drop(st);
        self.widget.redraw();
    }
}

/// Tabs share the bar width evenly within the min/max bounds.
fn tab_width(count: usize, widget_w: i32) -> i32 {
    let count = count.max(1) as i32;
    let available = widget_w - TAB_GAP * (count - 1);
    (available / count).clamp(MIN_TAB_WIDTH, MAX_TAB_WIDTH)
}

fn tab_x(index: usize, width: i32) -> i32 {
    index as i32 * (width + TAB_GAP)
}

fn hit_test(st: &TabBarState, wid: &Widget, mx: i32, my: i32) -> HitResult {
    let wy = wid.y();
    if my < wy || my >= wy + TAB_BAR_HEIGHT {
        return HitResult::None;
    }
    let width = tab_width(st.tabs.len(), wid.w());
    for index in 0..st.tabs.len() {
        let x = tab_x(index, width);
        if mx >= x && mx < x + width {
            let close_x = x + width - CLOSE_BTN_MARGIN - CLOSE_BTN_SIZE;
            let close_y = wy + (TAB_BAR_HEIGHT - CLOSE_BTN_SIZE) / 2;
            let is_close = mx >= close_x
                && mx <= close_x + CLOSE_BTN_SIZE
                && my >= close_y
                && my <= close_y + CLOSE_BTN_SIZE;
            return HitResult::Tab { index, is_close };
        }
    }
    HitResult::None
}

fn truncate_to_fit(text: &str, max_width: i32) -> String {
    if max_width <= 0 {
        return String::new();
    }
    draw::set_font(Font::Helvetica, 12);
    let (tw, _) = draw::measure(text, true);
    if tw <= max_width {
        return text.to_string();
    }

    let ellipsis = "...";
    let chars: Vec<char> = text.chars().collect();
    for len in (1..chars.len()).rev() {
        let candidate: String = chars[..len].iter().collect();
        let full = format!("{candidate}{ellipsis}");
        let (fw, _) = draw::measure(&full, true);
        if fw <= max_width {
            return full;
        }
    }
    ellipsis.to_string()
}

fn draw_rounded_top_rect(x: i32, y: i32, w: i32, h: i32, r: i32, color: Color) {
    draw::set_draw_color(color);
    draw::draw_rectf(x, y + r, w, h - r);
    draw::draw_rectf(x + r, y, w - 2 * r, r);
    draw::draw_pie(x, y, 2 * r, 2 * r, 90.0, 180.0);
    draw::draw_pie(x + w - 2 * r, y, 2 * r, 2 * r, 0.0, 90.0);
}

fn draw_tab_bar(wid: &Widget, st: &TabBarState) {
    let wx = wid.x();
    let wy = wid.y();
    let wh = wid.h();
    let colors = colors();

    draw::set_draw_color(colors.bar_bg);
    draw::draw_rectf(wx, wy, wid.w(), wh);

    let width = tab_width(st.tabs.len(), wid.w());
    for (index, tab) in st.tabs.iter().enumerate() {
        let tx = wx + tab_x(index, width);

        if tab.active {
            draw_rounded_top_rect(tx, wy, width, wh, CORNER_RADIUS, colors.active_bg);
        } else {
            draw_rounded_top_rect(tx, wy + 2, width, wh - 2, CORNER_RADIUS, colors.inactive_bg);
        }

        let text_color = if tab.active { colors.active_text } else { colors.inactive_text };
        let text_area_width =
            width - TAB_H_PADDING - CLOSE_BTN_MARGIN - CLOSE_BTN_SIZE - TAB_H_PADDING;
        let display_text = truncate_to_fit(&tab.label, text_area_width);

        draw::set_draw_color(text_color);
        draw::set_font(Font::Helvetica, 12);
        draw::draw_text(&display_text, tx + TAB_H_PADDING, wy + (wh + 12) / 2);

        let close_x = tx + width - CLOSE_BTN_MARGIN - CLOSE_BTN_SIZE;
        let close_y = wy + (wh - CLOSE_BTN_SIZE) / 2;
        let hovered = st.hover_tab == Some(index);
        if hovered && st.hover_close {
            draw::set_draw_color(colors.close_hover_bg);
            draw::draw_rectf(close_x - 2, close_y - 2, CLOSE_BTN_SIZE + 4, CLOSE_BTN_SIZE + 4);
        }
        draw::set_draw_color(if tab.active || hovered { text_color } else { colors.inactive_text });
        draw::set_font(Font::HelveticaBold, 20);
        draw::draw_text2(
            "\u{00d7}",
            close_x,
            close_y,
            CLOSE_BTN_SIZE,
            CLOSE_BTN_SIZE,
            Align::Center,
        );
    }
}

fn handle_tab_bar(wid: &mut Widget, event: Event, state: &Rc<RefCell<TabBarState>>) -> bool {
    match event {
        Event::Push => {
            let st = state.borrow();
            let mx = app::event_x() - wid.x();
            let my = app::event_y();
            let HitResult::Tab { index, is_close } = hit_test(&st, wid, mx, my) else {
                return false;
            };
            let id = st.tabs[index].id;
            let coordinator = st.coordinator.clone();
            drop(st);

            // Closing goes through selection so the active-tab delete path
            // handles the unsaved-changes prompt.
            match app::event_button() {
                1 if !is_close => coordinator.select_tab(id),
                1 | 2 => {
                    coordinator.select_tab(id);
                    coordinator.delete_tab();
                }
                _ => return false,
            }
            true
        }
        Event::Move | Event::Enter => {
            let mut st = state.borrow_mut();
            let mx = app::event_x() - wid.x();
            let my = app::event_y();
            let (hover_tab, hover_close) = match hit_test(&st, wid, mx, my) {
                HitResult::Tab { index, is_close } => (Some(index), is_close),
                HitResult::None => (None, false),
            };
            if hover_tab != st.hover_tab || hover_close != st.hover_close {
                st.hover_tab = hover_tab;
                st.hover_close = hover_close;
                drop(st);
                wid.redraw();
            }
            true
        }
        Event::Leave => {
            let mut st = state.borrow_mut();
            st.hover_tab = None;
            st.hover_close = false;
            drop(st);
            wid.redraw();
            true
        }
        _ => false,
    }
}
