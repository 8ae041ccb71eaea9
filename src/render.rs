//! Connects a [Store](crate::Store) to a root container node: every
//! state transition rebuilds the view from scratch and swaps it in.

use crate::{
    dom::{empty_node, Document, DomError},
    StoreAction, StoreRef, Unsubscribe,
};
use std::rc::Rc;

type ViewFn<State, Action, D> =
    dyn Fn(&Rc<State>, &StoreRef<State, Action>, &D) -> Result<<D as Document>::Node, DomError>;

/// Renders a view of the store's state into a root container.
pub struct Renderer<State, Action, D: Document> {
    document: D,
    root: D::Node,
    view: Box<ViewFn<State, Action, D>>,
}

impl<State, Action, D> Renderer<State, Action, D>
where
    Action: StoreAction,
    D: Document,
{
    /// Create a renderer which builds its tree in `document` using
    /// `view`, and places it inside `root`.
    pub fn new<V>(document: D, root: D::Node, view: V) -> Self
    where
        V: Fn(&Rc<State>, &StoreRef<State, Action>, &D) -> Result<D::Node, DomError> + 'static,
    {
        Self {
            document,
            root,
            view: Box::new(view),
        }
    }

    /// Remove everything inside the root, then build the view of the
    /// store's current state and append it.
    pub fn render(&self, store: &StoreRef<State, Action>) -> Result<(), DomError> {
        empty_node(&self.document, &self.root)?;
        let node = (self.view)(&store.state(), store, &self.document)?;
        self.document.append_child(&self.root, &node)
    }

    pub fn root(&self) -> &D::Node {
        &self.root
    }
}

/// Render `view` into the element with id `root_id`, now and after
/// every dispatch to `store`.
///
/// Returns the subscription of the render callback, so that the
/// view can be detached from the store again. Render failures after
/// the initial render are logged.
///
/// The store owns the render callback, and the rendered handlers
/// usually own clones of the store, so the two keep each other alive.
/// Call [unsubscribe()](Unsubscribe::unsubscribe()) to release the
/// store and the view.
pub fn mount<State, Action, D, V>(
    store: &StoreRef<State, Action>,
    document: D,
    root_id: &str,
    view: V,
) -> Result<Unsubscribe<State, Action>, DomError>
where
    State: 'static,
    Action: StoreAction + 'static,
    D: Document + 'static,
    V: Fn(&Rc<State>, &StoreRef<State, Action>, &D) -> Result<D::Node, DomError> + 'static,
{
    let root = document
        .get_element_by_id(root_id)
        .ok_or_else(|| DomError::RootNotFound(root_id.to_string()))?;
    let renderer = Rc::new(Renderer::new(document, root, view));

    let listener = renderer.clone();
    let unsubscribe = store.subscribe(move |store| {
        if let Err(error) = listener.render(store) {
            log::error!("failed to render view: {}", error);
        }
    });

    if let Err(error) = renderer.render(store) {
        unsubscribe.unsubscribe();
        return Err(error);
    }
    log::debug!("mounted view into #{}", root_id);

    Ok(unsubscribe)
}
