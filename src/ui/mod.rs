pub mod dialogs;
pub mod editor_keys;
pub mod lint_panel;
pub mod main_window;
pub mod menu;
pub mod surface;
pub mod tab_bar;
pub mod tree_panel;

use fltk::app::Sender;

use crate::app::controllers::coordinator::MessageSink;
use crate::app::domain::messages::Message;

impl MessageSink for Sender<Message> {
    fn send(&self, message: Message) {
        Sender::send(self, message);
    }
}
