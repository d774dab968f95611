//! Central indirection for cross-widget actions.
//!
//! Widgets never hold references to each other. They hold a `Coordinator`
//! and call one method per action; the coordinator turns the call into a
//! [`Message`] for whatever sink it is bound to. Until it is bound, calls are
//! recorded and logged so a standalone widget (or a test) can run without
//! the rest of the window.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

use crate::app::domain::document::DocumentId;
use crate::app::domain::messages::Message;

/// Destination of coordinator messages.
pub trait MessageSink {
    fn send(&self, message: Message);
}

/// In-process FIFO sink, drained with [`MessageQueue::pop`].
#[derive(Clone, Default)]
pub struct MessageQueue {
    inner: Rc<RefCell<VecDeque<Message>>>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&self) -> Option<Message> {
        self.inner.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl MessageSink for MessageQueue {
    fn send(&self, message: Message) {
        self.inner.borrow_mut().push_back(message);
    }
}

enum Binding {
    Mock(Vec<Message>),
    Bound(Rc<dyn MessageSink>),
}

/// Cheap-to-clone handle; every clone shares one binding.
#[derive(Clone)]
pub struct Coordinator {
    binding: Rc<RefCell<Binding>>,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::mock()
    }
}

impl Coordinator {
    /// Unbound coordinator that records every call.
    pub fn mock() -> Self {
        Self {
            binding: Rc::new(RefCell::new(Binding::Mock(Vec::new()))),
        }
    }

    /// Route all further calls to `sink`. Replaces the binding in one step.
    pub fn bind(&self, sink: Rc<dyn MessageSink>) {
        *self.binding.borrow_mut() = Binding::Bound(sink);
        tracing::debug!("coordinator bound");
    }

    pub fn is_bound(&self) -> bool {
        matches!(*self.binding.borrow(), Binding::Bound(_))
    }

    /// Calls recorded while unbound.
    pub fn mock_calls(&self) -> Vec<Message> {
        match &*self.binding.borrow() {
            Binding::Mock(calls) => calls.clone(),
            Binding::Bound(_) => Vec::new(),
        }
    }

    fn dispatch(&self, message: Message) {
        let sink = match &mut *self.binding.borrow_mut() {
            Binding::Mock(calls) => {
                tracing::info!(?message, "coordinator call (unbound)");
                calls.push(message);
                return;
            }
            Binding::Bound(sink) => Rc::clone(sink),
        };
        tracing::debug!(?message, "coordinator dispatch");
        sink.send(message);
    }

    pub fn new_file(&self) {
        self.dispatch(Message::FileNew);
    }

    pub fn open_file(&self) {
        self.dispatch(Message::FileOpen);
    }

    pub fn open_path(&self, path: PathBuf) {
        self.dispatch(Message::OpenPath(path));
    }

    pub fn save_file(&self) {
        self.dispatch(Message::FileSave);
    }

    pub fn save_file_as(&self) {
        self.dispatch(Message::FileSaveAs);
    }

    pub fn delete_tab(&self) {
        self.dispatch(Message::TabDelete);
    }

    pub fn select_tab(&self, id: DocumentId) {
        self.dispatch(Message::TabSelect(id));
    }

    pub fn next_tab(&self) {
        self.dispatch(Message::TabNext);
    }

    pub fn previous_tab(&self) {
        self.dispatch(Message::TabPrevious);
    }

    pub fn change_tab_name(&self) {
        self.dispatch(Message::ChangeTabName);
    }

    pub fn indent(&self) {
        self.dispatch(Message::Indent);
    }

    pub fn dedent(&self) {
        self.dispatch(Message::Dedent);
    }

    pub fn highlight(&self) {
        self.dispatch(Message::Highlight);
    }

    pub fn select_all(&self) {
        self.dispatch(Message::SelectAll);
    }

    pub fn search(&self) {
        self.dispatch(Message::ShowSearch);
    }

    pub fn replace(&self) {
        self.dispatch(Message::ShowReplace);
    }

    pub fn update_lint(&self, text: String) {
        self.dispatch(Message::UpdateLint(text));
    }

    pub fn clear_lint(&self) {
        self.dispatch(Message::ClearLint);
    }

    pub fn change_dir(&self) {
        self.dispatch(Message::ChangeDir);
    }

    pub fn update_dir(&self) {
        self.dispatch(Message::UpdateDir);
    }

    pub fn expand_dir(&self, path: PathBuf) {
        self.dispatch(Message::ExpandDir(path));
    }

    pub fn collapse_dir(&self, path: PathBuf) {
        self.dispatch(Message::CollapseDir(path));
    }

    pub fn buffer_changed(&self, id: DocumentId) {
        self.dispatch(Message::BufferChanged(id));
    }

    pub fn refresh_gutter(&self) {
        self.dispatch(Message::RefreshGutter);
    }

    pub fn quit(&self) {
        self.dispatch(Message::Quit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mock_records_calls_in_order() {
        let coordinator = Coordinator::mock();
        coordinator.save_file();
        coordinator.update_lint("a.py:1:1: F401".to_string());
        coordinator.change_tab_name();
        assert!(!coordinator.is_bound());
        assert_eq!(
            coordinator.mock_calls(),
            vec![
                Message::FileSave,
                Message::UpdateLint("a.py:1:1: F401".to_string()),
                Message::ChangeTabName,
            ]
        );
    }

    #[test]
    fn test_bind_redirects_every_clone() {
        let coordinator = Coordinator::mock();
        let held_by_widget = coordinator.clone();
        held_by_widget.indent();

        let queue = MessageQueue::new();
        coordinator.bind(Rc::new(queue.clone()));
        held_by_widget.dedent();
        held_by_widget.open_path(PathBuf::from("/tmp/a.py"));

        assert!(held_by_widget.is_bound());
        assert!(coordinator.mock_calls().is_empty());
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(Message::Dedent));
        assert_eq!(queue.pop(), Some(Message::OpenPath(PathBuf::from("/tmp/a.py"))));
        assert!(queue.is_empty());
    }
}
