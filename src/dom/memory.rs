use super::{Document, DomError, EventHandler};
use std::{
    cell::RefCell,
    fmt::{self, Debug},
    rc::{Rc, Weak},
};

/// The event passed to handlers of a [MemoryNode].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEvent {
    name: String,
}

impl MemoryEvent {
    pub fn name(&self) -> &str {
        &self.name
    }
}

enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        listeners: Vec<(String, EventHandler<MemoryEvent>)>,
    },
    Text(String),
}

struct NodeData {
    kind: NodeKind,
    parent: Weak<RefCell<NodeData>>,
    children: Vec<MemoryNode>,
}

/// A node of a [MemoryDocument]. Clones refer to the same node, and
/// equality is node identity.
#[derive(Clone)]
pub struct MemoryNode(Rc<RefCell<NodeData>>);

impl MemoryNode {
    fn new(kind: NodeKind) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            kind,
            parent: Weak::new(),
            children: Vec::new(),
        })))
    }

    fn element(tag: &str) -> Self {
        Self::new(NodeKind::Element {
            tag: tag.to_string(),
            attributes: Vec::new(),
            listeners: Vec::new(),
        })
    }

    /// The tag name, or `None` for a text node.
    pub fn tag(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Text(_))
    }

    /// The concatenated text of this node and all its descendants.
    pub fn text_content(&self) -> String {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element { .. } => data
                .children
                .iter()
                .map(MemoryNode::text_content)
                .collect(),
        }
    }

    pub fn children(&self) -> Vec<MemoryNode> {
        self.0.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn parent(&self) -> Option<MemoryNode> {
        self.0.borrow().parent.upgrade().map(MemoryNode)
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(attribute, _)| attribute == name)
                .map(|(_, value)| value.clone()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attribute_names(&self) -> Vec<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => {
                attributes.iter().map(|(name, _)| name.clone()).collect()
            }
            NodeKind::Text(_) => Vec::new(),
        }
    }

    /// The number of handlers registered for `event` on this node.
    pub fn listener_count(&self, event: &str) -> usize {
        match &self.0.borrow().kind {
            NodeKind::Element { listeners, .. } => {
                listeners.iter().filter(|(name, _)| name == event).count()
            }
            NodeKind::Text(_) => 0,
        }
    }

    /// Invoke every handler registered for `event` on this node, in
    /// registration order, returning how many were invoked. Events do
    /// not bubble.
    pub fn dispatch_event(&self, event: &str) -> usize {
        // Handlers may rebuild the tree this node belongs to.
        let handlers: Vec<EventHandler<MemoryEvent>> = match &self.0.borrow().kind {
            NodeKind::Element { listeners, .. } => listeners
                .iter()
                .filter(|(name, _)| name == event)
                .map(|(_, handler)| handler.clone())
                .collect(),
            NodeKind::Text(_) => Vec::new(),
        };

        let memory_event = MemoryEvent {
            name: event.to_string(),
        };
        for handler in &handlers {
            handler(&memory_event);
        }
        handlers.len()
    }

    pub fn click(&self) -> usize {
        self.dispatch_event("click")
    }

    /// Find the first element with the given `id` in this subtree, in
    /// document order.
    pub fn find_by_id(&self, id: &str) -> Option<MemoryNode> {
        if self.attribute("id").as_deref() == Some(id) {
            return Some(self.clone());
        }
        self.children()
            .iter()
            .find_map(|child| child.find_by_id(id))
    }

    /// Serialize this subtree as HTML. Event handlers are omitted.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        self.write_html(&mut html);
        html
    }

    fn write_html(&self, html: &mut String) {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Text(text) => html.push_str(&escape(text, false)),
            NodeKind::Element {
                tag, attributes, ..
            } => {
                html.push('<');
                html.push_str(tag);
                for (name, value) in attributes {
                    html.push(' ');
                    html.push_str(name);
                    html.push_str("=\"");
                    html.push_str(&escape(value, true));
                    html.push('"');
                }
                html.push('>');
                for child in &data.children {
                    child.write_html(html);
                }
                html.push_str("</");
                html.push_str(tag);
                html.push('>');
            }
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Returns `true` if `self` is `other` or one of its ancestors.
    fn is_inclusive_ancestor_of(&self, other: &MemoryNode) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node.ptr_eq(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent
                .0
                .borrow_mut()
                .children
                .retain(|child| !child.ptr_eq(self));
        }
        self.0.borrow_mut().parent = Weak::new();
    }
}

impl PartialEq for MemoryNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for MemoryNode {}

impl Debug for MemoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemoryNode({})", self.to_html())
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        _ => false,
    }
}

fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "\"'>/=".contains(c))
}

/// An in-memory [Document], rooted at a `body` element.
///
/// Handy for tests and for running views outside of a browser: events
/// can be simulated with [MemoryNode::dispatch_event()] and trees
/// inspected or serialized with [MemoryNode::to_html()].
#[derive(Clone, Debug)]
pub struct MemoryDocument {
    body: MemoryNode,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            body: MemoryNode::element("body"),
        }
    }

    /// The root of this document. Only nodes attached below it can be
    /// found with [get_element_by_id()](Document::get_element_by_id()).
    pub fn body(&self) -> &MemoryNode {
        &self.body
    }
}

impl Document for MemoryDocument {
    type Node = MemoryNode;
    type Event = MemoryEvent;

    fn create_element(&self, tag: &str) -> Result<MemoryNode, DomError> {
        if !is_valid_tag(tag) {
            return Err(DomError::InvalidTagName(tag.to_string()));
        }
        Ok(MemoryNode::element(&tag.to_ascii_lowercase()))
    }

    fn create_text_node(&self, text: &str) -> MemoryNode {
        MemoryNode::new(NodeKind::Text(text.to_string()))
    }

    fn set_attribute(&self, node: &MemoryNode, name: &str, value: &str) -> Result<(), DomError> {
        if !is_valid_attribute_name(name) {
            return Err(DomError::InvalidAttributeName(name.to_string()));
        }

        match &mut node.0.borrow_mut().kind {
            NodeKind::Element { attributes, .. } => {
                match attributes.iter_mut().find(|(attribute, _)| attribute == name) {
                    Some((_, existing)) => *existing = value.to_string(),
                    None => attributes.push((name.to_string(), value.to_string())),
                }
                Ok(())
            }
            NodeKind::Text(_) => Err(DomError::NotAnElement),
        }
    }

    fn add_event_listener(
        &self,
        node: &MemoryNode,
        event: &str,
        handler: EventHandler<MemoryEvent>,
    ) -> Result<(), DomError> {
        match &mut node.0.borrow_mut().kind {
            NodeKind::Element { listeners, .. } => {
                listeners.push((event.to_string(), handler));
                Ok(())
            }
            NodeKind::Text(_) => Err(DomError::NotAnElement),
        }
    }

    fn append_child(&self, parent: &MemoryNode, child: &MemoryNode) -> Result<(), DomError> {
        if parent.is_text() {
            return Err(DomError::NotAnElement);
        }
        if child.is_inclusive_ancestor_of(parent) {
            return Err(DomError::Hierarchy);
        }

        child.detach();
        child.0.borrow_mut().parent = Rc::downgrade(&parent.0);
        parent.0.borrow_mut().children.push(child.clone());
        Ok(())
    }

    fn remove_child(&self, parent: &MemoryNode, child: &MemoryNode) -> Result<(), DomError> {
        let mut parent_data = parent.0.borrow_mut();
        let index = parent_data
            .children
            .iter()
            .position(|node| node.ptr_eq(child))
            .ok_or(DomError::NotAChild)?;
        parent_data.children.remove(index);
        drop(parent_data);

        child.0.borrow_mut().parent = Weak::new();
        Ok(())
    }

    fn first_child(&self, node: &MemoryNode) -> Option<MemoryNode> {
        node.0.borrow().children.first().cloned()
    }

    fn get_element_by_id(&self, id: &str) -> Option<MemoryNode> {
        self.body.find_by_id(id)
    }
}
