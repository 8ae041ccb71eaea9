//! The counter application, rendered into an in-memory document.
//!
//! Run with `RUST_LOG=debug` to see what the store does on every
//! click.

use dom_store::{
    create_store,
    dom::{Document, DomError, Element, MemoryDocument, MemoryNode},
    render::mount,
    LogLevel, StoreAction, StoreRef,
};
use std::rc::Rc;

#[derive(Debug)]
struct AppState {
    count: i64,
}

#[derive(Debug, Clone, Copy)]
enum AppAction {
    Increment,
    Decrement,
}

impl StoreAction for AppAction {
    fn kind(&self) -> &str {
        match self {
            AppAction::Increment => "INCREMENT",
            AppAction::Decrement => "DECREMENT",
        }
    }
}

fn update(state: &Rc<AppState>, action: &AppAction) -> Rc<AppState> {
    match action {
        AppAction::Increment => Rc::new(AppState {
            count: state.count + 1,
        }),
        AppAction::Decrement => Rc::new(AppState {
            count: state.count - 1,
        }),
    }
}

fn view(
    state: &Rc<AppState>,
    store: &StoreRef<AppState, AppAction>,
    document: &MemoryDocument,
) -> Result<MemoryNode, DomError> {
    let heading = Element::new("h1").child(state.count).build(document)?;

    let decrement_store = store.clone();
    let decrement = Element::new("button")
        .on("click", move |_| decrement_store.dispatch(AppAction::Decrement))
        .child("Decrement")
        .build(document)?;

    let increment_store = store.clone();
    let increment = Element::new("button")
        .on("click", move |_| increment_store.dispatch(AppAction::Increment))
        .child("Increment")
        .build(document)?;

    Element::new("div")
        .node(heading)
        .node(decrement)
        .node(increment)
        .build(document)
}

/// Finds the button labelled `label` in the currently rendered tree.
fn find_button(root: &MemoryNode, label: &str) -> Option<MemoryNode> {
    root.children()
        .first()?
        .children()
        .into_iter()
        .find(|node| node.tag().as_deref() == Some("button") && node.text_content() == label)
}

fn main() -> Result<(), DomError> {
    env_logger::init();

    let document = MemoryDocument::new();
    let root = document.create_element("div")?;
    document.set_attribute(&root, "id", "root")?;
    document.append_child(document.body(), &root)?;

    let store = create_store(AppState { count: 0 }, update);
    store.set_log_level(LogLevel::Info);
    mount(&store, document.clone(), "root", view)?;
    println!("{}", document.body().to_html());

    for label in ["Increment", "Increment", "Decrement"] {
        if let Some(button) = find_button(&root, label) {
            button.click();
        }
        println!("click {:<9} -> {}", label, document.body().to_html());
    }

    println!("final state: {:?}", store.state());
    Ok(())
}
