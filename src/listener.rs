use crate::{Store, StoreRef};
use std::rc::{Rc, Weak};

type ListenerFn<State, Action> = dyn Fn(&StoreRef<State, Action>);

/// A wrapper for a callback which is notified after every state
/// transition of a [Store](crate::Store). The callback receives the
/// store itself, through which it can read the new state with
/// [state()](crate::Store::state()) or
/// [dispatch()](crate::StoreRef::dispatch()) further actions.
///
/// Clones of a `Callback` share the same identity; subscribing the
/// same callback twice registers it twice, and unsubscribing removes
/// both registrations.
pub struct Callback<State, Action>(Rc<ListenerFn<State, Action>>);

impl<State, Action> Callback<State, Action> {
    pub fn new<C: Fn(&StoreRef<State, Action>) + 'static>(closure: C) -> Self {
        Callback(Rc::new(closure))
    }

    pub fn emit(&self, store: &StoreRef<State, Action>) {
        (self.0)(store)
    }

    /// Returns `true` if both callbacks are the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn downgrade(&self) -> Weak<ListenerFn<State, Action>> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn is_instance(&self, weak: &Weak<ListenerFn<State, Action>>) -> bool {
        Rc::as_ptr(&self.0) as *const () == weak.as_ptr() as *const ()
    }
}

impl<State, Action> Clone for Callback<State, Action> {
    fn clone(&self) -> Self {
        Callback(self.0.clone())
    }
}

impl<C, State, Action> From<C> for Callback<State, Action>
where
    C: Fn(&StoreRef<State, Action>) + 'static,
{
    fn from(closure: C) -> Self {
        Callback(Rc::new(closure))
    }
}

/// Returned by [StoreRef::subscribe()]; removes the associated
/// listener from the store when [unsubscribe()](Unsubscribe::unsubscribe())
/// is called.
///
/// Dropping this handle does not unsubscribe the listener.
pub struct Unsubscribe<State, Action> {
    store: Weak<Store<State, Action>>,
    listener: Weak<ListenerFn<State, Action>>,
}

impl<State, Action> Unsubscribe<State, Action> {
    pub(crate) fn new(
        store: Weak<Store<State, Action>>,
        listener: &Callback<State, Action>,
    ) -> Self {
        Self {
            store,
            listener: listener.downgrade(),
        }
    }

    /// Remove the listener from the store. Calling this more than
    /// once, or after the store has been dropped, does nothing.
    pub fn unsubscribe(&self) {
        if let Some(store) = self.store.upgrade() {
            store.remove_listener(&self.listener);
        }
    }
}
