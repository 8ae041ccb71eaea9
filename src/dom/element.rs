use super::{Document, DomError, EventHandler};
use std::rc::Rc;

/// A child of an element being built: either text, which becomes a
/// new text node, or a node which has already been constructed.
pub enum Child<N> {
    Text(String),
    Node(N),
}

impl<N> From<&str> for Child<N> {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl<N> From<String> for Child<N> {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

macro_rules! numeric_child {
    ($($number:ty),*) => {
        $(
            impl<N> From<$number> for Child<N> {
                fn from(number: $number) -> Self {
                    Child::Text(number.to_string())
                }
            }
        )*
    };
}

numeric_child!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// The value of an entry passed to [Attributes::insert()].
pub enum AttributeValue<E> {
    /// A literal attribute value.
    Value(String),
    /// A handler for the event named by the attribute key.
    Handler(EventHandler<E>),
}

impl<E> AttributeValue<E> {
    pub fn handler<F: Fn(&E) + 'static>(handler: F) -> Self {
        AttributeValue::Handler(Rc::new(handler))
    }
}

impl<E> From<&str> for AttributeValue<E> {
    fn from(value: &str) -> Self {
        AttributeValue::Value(value.to_string())
    }
}

impl<E> From<String> for AttributeValue<E> {
    fn from(value: String) -> Self {
        AttributeValue::Value(value)
    }
}

macro_rules! display_attribute {
    ($($value:ty),*) => {
        $(
            impl<E> From<$value> for AttributeValue<E> {
                fn from(value: $value) -> Self {
                    AttributeValue::Value(value.to_string())
                }
            }
        )*
    };
}

display_attribute!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// The attributes and event handlers of an element, kept in two
/// disjoint lists in insertion order.
///
/// Entries added through [insert()](Attributes::insert()) follow a
/// fixed rule: a key starting with `"on"` is an event binding, whose
/// event name is the remainder of the key in lowercase (`"onClick"`
/// binds `"click"`), and its value must be a handler. Every other key
/// is a literal attribute.
pub struct Attributes<E> {
    values: Vec<(String, String)>,
    handlers: Vec<(String, EventHandler<E>)>,
}

impl<E> Default for Attributes<E> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            handlers: Vec::new(),
        }
    }
}

impl<E> Attributes<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect `(key, value)` pairs using the `"on"` prefix rule.
    pub fn from_pairs<K, I>(pairs: I) -> Result<Self, DomError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, AttributeValue<E>)>,
    {
        let mut attributes = Self::new();
        for (key, value) in pairs {
            attributes.insert(key.as_ref(), value)?;
        }
        Ok(attributes)
    }

    /// Add an entry using the `"on"` prefix rule.
    pub fn insert(&mut self, key: &str, value: AttributeValue<E>) -> Result<(), DomError> {
        match (key.strip_prefix("on"), value) {
            (Some(""), _) => Err(DomError::InvalidEventName(key.to_string())),
            (Some(event), AttributeValue::Handler(handler)) => {
                self.handlers.push((event.to_lowercase(), handler));
                Ok(())
            }
            (Some(_), AttributeValue::Value(_)) => Err(DomError::NotCallable(key.to_string())),
            (None, AttributeValue::Value(value)) => {
                self.values.push((key.to_string(), value));
                Ok(())
            }
            (None, AttributeValue::Handler(_)) => {
                Err(DomError::UnexpectedHandler(key.to_string()))
            }
        }
    }

    /// Add a literal attribute, coercing `value` to a string.
    pub fn attr<K: Into<String>, V: ToString>(mut self, name: K, value: V) -> Self {
        self.values.push((name.into(), value.to_string()));
        self
    }

    /// Add a handler for the named `event`. Unlike
    /// [insert()](Attributes::insert()), the name is used verbatim: it is
    /// neither lowercased nor checked, so `on("Click", ..)` listens for
    /// `"Click"`, not `"click"`.
    pub fn on<K: Into<String>, F: Fn(&E) + 'static>(mut self, event: K, handler: F) -> Self {
        self.handlers.push((event.into(), Rc::new(handler)));
        self
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// The names of the events which have handlers, in insertion order.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|(event, _)| event.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.handlers.is_empty()
    }
}

/// Create a new, detached element of type `tag` in `document`.
///
/// Every literal attribute is set on the element and every handler is
/// registered for its event. Text children are converted into text
/// nodes, then all children are appended in order. No existing node is
/// reused, apart from the [Child::Node]s passed in.
pub fn create_element<D, C>(
    document: &D,
    tag: &str,
    attributes: Attributes<D::Event>,
    children: C,
) -> Result<D::Node, DomError>
where
    D: Document + ?Sized,
    C: IntoIterator<Item = Child<D::Node>>,
{
    let element = document.create_element(tag)?;

    for (name, value) in &attributes.values {
        document.set_attribute(&element, name, value)?;
    }

    for (event, handler) in attributes.handlers {
        document.add_event_listener(&element, &event, handler)?;
    }

    for child in children {
        let node = match child {
            Child::Text(text) => document.create_text_node(&text),
            Child::Node(node) => node,
        };
        document.append_child(&element, &node)?;
    }

    Ok(element)
}

/// Remove every child of `node`.
pub fn empty_node<D: Document + ?Sized>(document: &D, node: &D::Node) -> Result<(), DomError> {
    while let Some(child) = document.first_child(node) {
        document.remove_child(node, &child)?;
    }
    Ok(())
}

/// A builder for an element description, consumed by
/// [build()](Element::build()) to create the element with
/// [create_element()].
///
/// ```
/// use dom_store::dom::{Element, MemoryDocument};
///
/// let document = MemoryDocument::new();
/// let button = Element::new("button")
///     .attr("class", "primary")
///     .on("click", |_| println!("clicked"))
///     .child("Increment")
///     .build(&document)
///     .unwrap();
///
/// assert_eq!(r#"<button class="primary">Increment</button>"#, button.to_html());
/// ```
pub struct Element<N, E> {
    tag: String,
    attributes: Attributes<E>,
    children: Vec<Child<N>>,
}

impl<N, E> Element<N, E> {
    pub fn new<T: Into<String>>(tag: T) -> Self {
        Self {
            tag: tag.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    pub fn attr<K: Into<String>, V: ToString>(mut self, name: K, value: V) -> Self {
        self.attributes = self.attributes.attr(name, value);
        self
    }

    /// Add a handler for `event`, named verbatim as in [Attributes::on()].
    pub fn on<K: Into<String>, F: Fn(&E) + 'static>(mut self, event: K, handler: F) -> Self {
        self.attributes = self.attributes.on(event, handler);
        self
    }

    /// Append a text (or number) child.
    pub fn child<C: Into<Child<N>>>(mut self, child: C) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append an already constructed node.
    pub fn node(mut self, node: N) -> Self {
        self.children.push(Child::Node(node));
        self
    }

    pub fn children<I: IntoIterator<Item = Child<N>>>(mut self, children: I) -> Self {
        self.children.extend(children);
        self
    }

    pub fn build<D>(self, document: &D) -> Result<N, DomError>
    where
        D: Document<Node = N, Event = E> + ?Sized,
    {
        create_element(document, &self.tag, self.attributes, self.children)
    }
}
