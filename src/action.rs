/// An `Action` to be dispatched to a [Store](crate::Store).
///
/// Every action carries a discriminator identifying its kind, and
/// optionally some payload. For an `enum` of actions the payload is
/// simply the data carried by each variant.
pub trait StoreAction {
    /// The discriminator identifying what kind of action this is.
    fn kind(&self) -> &str;
}

impl StoreAction for &'static str {
    fn kind(&self) -> &str {
        self
    }
}

impl StoreAction for String {
    fn kind(&self) -> &str {
        self.as_str()
    }
}

/// A dynamically tagged action, consisting of a `kind` string and an
/// optional payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedAction<P = ()> {
    kind: String,
    payload: Option<P>,
}

impl<P> TaggedAction<P> {
    /// Create an action of the given `kind` without a payload.
    pub fn new<K: Into<String>>(kind: K) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
        }
    }

    /// Create an action of the given `kind` carrying `payload`.
    pub fn with_payload<K: Into<String>>(kind: K, payload: P) -> Self {
        Self {
            kind: kind.into(),
            payload: Some(payload),
        }
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }
}

impl<P> StoreAction for TaggedAction<P> {
    fn kind(&self) -> &str {
        &self.kind
    }
}
