//! Builds DOM trees from declarative element descriptions, on top of
//! any host UI platform implementing [Document].
//!
//! Two hosts are provided: [MemoryDocument], an in-memory tree which
//! is always available, and `WebDocument` (with the `web` feature)
//! which drives the browser's DOM through `web-sys`.

mod element;
mod memory;
#[cfg(feature = "web")]
mod web;

pub use element::*;
pub use memory::{MemoryDocument, MemoryEvent, MemoryNode};
#[cfg(feature = "web")]
pub use web::WebDocument;

use std::rc::Rc;
use thiserror::Error;

/// A callback registered for an event on a node.
pub type EventHandler<E> = Rc<dyn Fn(&E)>;

/// An error raised by a [Document] while building or modifying a tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("invalid tag name `{0}`")]
    InvalidTagName(String),
    #[error("invalid attribute name `{0}`")]
    InvalidAttributeName(String),
    #[error("attribute `{0}` does not name an event")]
    InvalidEventName(String),
    #[error("event binding `{0}` requires a handler")]
    NotCallable(String),
    #[error("attribute `{0}` is not an event binding, but was given a handler")]
    UnexpectedHandler(String),
    #[error("node is not an element")]
    NotAnElement,
    #[error("node is not a child of the given parent")]
    NotAChild,
    #[error("a node cannot be inserted into its own subtree")]
    Hierarchy,
    #[error("no element with id `{0}`")]
    RootNotFound(String),
    #[error("no document is available")]
    NoDocument,
    #[error("host error: {0}")]
    Host(String),
}

/// The primitives of a host UI platform which are needed to build
/// and tear down node trees.
pub trait Document {
    /// A handle to a node in this document. Clones refer to the same node.
    type Node: Clone;
    /// The event passed to handlers registered with
    /// [add_event_listener()](Document::add_event_listener()).
    type Event;

    /// Create a new, detached element node of the given `tag` type.
    fn create_element(&self, tag: &str) -> Result<Self::Node, DomError>;

    /// Create a new, detached text node.
    fn create_text_node(&self, text: &str) -> Self::Node;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<(), DomError>;

    /// Invoke `handler` whenever `event` is fired on `node`.
    fn add_event_listener(
        &self,
        node: &Self::Node,
        event: &str,
        handler: EventHandler<Self::Event>,
    ) -> Result<(), DomError>;

    /// Append `child` as the last child of `parent`, detaching it from
    /// its current parent first.
    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;

    fn remove_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;

    fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Find the element with the given `id` attribute among the nodes
    /// attached to this document.
    fn get_element_by_id(&self, id: &str) -> Option<Self::Node>;
}
