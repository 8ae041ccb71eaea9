//! [Document] for applications running in the browser, using
//! `wasm-bindgen` and `web-sys`.

use super::{Document, DomError, EventHandler};
use std::{cell::RefCell, fmt, rc::Rc};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

type EventClosure = Closure<dyn Fn(web_sys::Event)>;

fn host_error(value: JsValue) -> DomError {
    DomError::Host(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

/// Values kept alive for as long as the node they belong to is
/// attached.
struct Registrations<N, C> {
    entries: RefCell<Vec<(N, C)>>,
}

impl<N, C> Registrations<N, C> {
    fn insert(&self, node: N, value: C) {
        self.entries.borrow_mut().push((node, value));
    }

    /// Drop every entry whose node is `removed`, returning how many
    /// were dropped.
    fn release<F: Fn(&N) -> bool>(&self, removed: F) -> usize {
        let released: Vec<(N, C)> = {
            let mut entries = self.entries.borrow_mut();
            let (released, kept): (Vec<_>, Vec<_>) =
                entries.drain(..).partition(|(node, _)| removed(node));
            *entries = kept;
            released
        };
        released.len()
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

impl<N, C> Default for Registrations<N, C> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }
}

/// The browser's DOM.
///
/// The closures of event handlers are owned by the document. They are
/// released when their node, or an ancestor of it, is removed through
/// [remove_child()](Document::remove_child()), as
/// [empty_node()](super::empty_node()) does before every re-render.
/// Clones share the same handlers.
#[derive(Clone)]
pub struct WebDocument {
    document: web_sys::Document,
    handlers: Rc<Registrations<web_sys::Node, EventClosure>>,
}

impl fmt::Debug for WebDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDocument")
            .field("document", &self.document)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl WebDocument {
    /// The document of the current window.
    pub fn new() -> Result<Self, DomError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or(DomError::NoDocument)?;
        Ok(Self::from_document(document))
    }

    pub fn from_document(document: web_sys::Document) -> Self {
        Self {
            document,
            handlers: Rc::default(),
        }
    }
}

impl Document for WebDocument {
    type Node = web_sys::Node;
    type Event = web_sys::Event;

    fn create_element(&self, tag: &str) -> Result<web_sys::Node, DomError> {
        self.document
            .create_element(tag)
            .map(Into::into)
            .map_err(host_error)
    }

    fn create_text_node(&self, text: &str) -> web_sys::Node {
        self.document.create_text_node(text).into()
    }

    fn set_attribute(&self, node: &web_sys::Node, name: &str, value: &str) -> Result<(), DomError> {
        node.dyn_ref::<web_sys::Element>()
            .ok_or(DomError::NotAnElement)?
            .set_attribute(name, value)
            .map_err(host_error)
    }

    fn add_event_listener(
        &self,
        node: &web_sys::Node,
        event: &str,
        handler: EventHandler<web_sys::Event>,
    ) -> Result<(), DomError> {
        let closure: EventClosure =
            Closure::wrap(Box::new(move |event: web_sys::Event| handler(&event)));
        node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(host_error)?;
        self.handlers.insert(node.clone(), closure);
        Ok(())
    }

    fn append_child(&self, parent: &web_sys::Node, child: &web_sys::Node) -> Result<(), DomError> {
        parent.append_child(child).map(|_| ()).map_err(host_error)
    }

    fn remove_child(&self, parent: &web_sys::Node, child: &web_sys::Node) -> Result<(), DomError> {
        parent.remove_child(child).map_err(host_error)?;
        let released = self.handlers.release(|node| child.contains(Some(node)));
        if released > 0 {
            log::trace!("released {} event handlers", released);
        }
        Ok(())
    }

    fn first_child(&self, node: &web_sys::Node) -> Option<web_sys::Node> {
        node.first_child()
    }

    fn get_element_by_id(&self, id: &str) -> Option<web_sys::Node> {
        self.document.get_element_by_id(id).map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::Registrations;
    use std::{cell::Cell, rc::Rc};

    struct Handler(Rc<Cell<usize>>);

    impl Drop for Handler {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn release_drops_handlers_of_removed_subtree() {
        let dropped = Rc::new(Cell::new(0));
        let handlers: Registrations<&str, Handler> = Registrations::default();
        handlers.insert("body/app", Handler(dropped.clone()));
        handlers.insert("body/app/button", Handler(dropped.clone()));
        handlers.insert("body/app/button", Handler(dropped.clone()));
        handlers.insert("body/footer", Handler(dropped.clone()));

        assert_eq!(3, handlers.release(|node| node.starts_with("body/app")));
        assert_eq!(3, dropped.get());
        assert_eq!(1, handlers.len());

        assert_eq!(0, handlers.release(|node| node.starts_with("body/app")));
        assert_eq!(1, handlers.len());
    }
}
