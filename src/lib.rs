//! A minimal state container (similar to redux), with a tiny helper
//! for building DOM trees.
//!
//! A [Store] holds a single state value. It can only be replaced by
//! dispatching an action, which the store's [Reducer] turns into the
//! next state; every subscribed listener is then notified. The
//! [dom] module builds detached element trees from declarative
//! descriptions, and [render] re-renders a view into a root container
//! after every dispatch.
//!
//! ```
//! use dom_store::{create_store, StoreAction};
//! use std::rc::Rc;
//!
//! enum CounterAction {
//!     Increment,
//!     Decrement,
//! }
//!
//! impl StoreAction for CounterAction {
//!     fn kind(&self) -> &str {
//!         match self {
//!             CounterAction::Increment => "INCREMENT",
//!             CounterAction::Decrement => "DECREMENT",
//!         }
//!     }
//! }
//!
//! fn update(count: &Rc<i64>, action: &CounterAction) -> Rc<i64> {
//!     match action {
//!         CounterAction::Increment => Rc::new(**count + 1),
//!         CounterAction::Decrement => Rc::new(**count - 1),
//!     }
//! }
//!
//! let store = create_store(0, update);
//! store.subscribe(|store| println!("count: {}", store.state()));
//!
//! store.dispatch(CounterAction::Increment);
//! store.dispatch(CounterAction::Increment);
//! store.dispatch(CounterAction::Decrement);
//! assert_eq!(1, *store.state());
//! ```

mod action;
pub mod dom;
mod listener;
mod logger;
mod reducer;
pub mod render;
mod store;

pub use action::*;
pub use listener::*;
pub use logger::LogLevel;
pub use reducer::*;
pub use store::{create_store, Store, StoreRef};
