use crate::{Callback, LogLevel, Reducer, StoreAction, Unsubscribe};
use std::ops::Deref;
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::{Rc, Weak},
};

/// Discards the actions queued by a dispatch which was aborted by a
/// panic in the reducer or a listener.
struct QueueGuard<'a, Action>(&'a RefCell<VecDeque<Action>>);

impl<'a, Action> Drop for QueueGuard<'a, Action> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            if let Ok(mut queue) = self.0.try_borrow_mut() {
                queue.clear();
            }
        }
    }
}

/// A shared reference to a [Store].
///
/// Actions are dispatched and listeners subscribed through this
/// handle. It is cheap to clone, and clones compare equal to each
/// other, so it can be captured by event handlers which dispatch
/// actions later on.
pub struct StoreRef<State, Action>(Rc<Store<State, Action>>);

impl<State, Action> StoreRef<State, Action>
where
    Action: StoreAction,
{
    /// Create a new store holding `initial_state`, which uses
    /// `reducer` to handle dispatched `Action`s.
    ///
    /// The store takes ownership of `initial_state`, no other part of
    /// the application can modify it afterwards.
    pub fn new<R: Reducer<State, Action> + 'static>(initial_state: State, reducer: R) -> Self {
        Self(Rc::new(Store::new(initial_state, reducer)))
    }

    /// Dispatch an `Action` to be passed to the [Reducer] in order to
    /// produce the next `State` of this store. Once the state has
    /// been replaced, every listener is notified in the order in
    /// which it subscribed.
    ///
    /// When called while a dispatch is already in progress (usually
    /// by a listener), the action is queued and processed once the
    /// current notification pass has completed.
    pub fn dispatch<A: Into<Action>>(&self, action: A) {
        self.dispatch_impl(action.into());
    }

    /// Concrete version of [StoreRef::dispatch()], to avoid generating
    /// a copy of this function for every type that implements
    /// `Into<Action>`.
    fn dispatch_impl(&self, action: Action) {
        self.dispatch_queue.borrow_mut().push_back(action);

        // If the lock fails to acquire, then the dispatch is already in progress,
        // and the outer dispatch will process the queued action.
        let _lock = match self.dispatch_lock.try_borrow_mut() {
            Ok(lock) => lock,
            Err(_) => {
                self.log(format_args!(
                    "dispatch in progress, queued action ({} pending)",
                    self.dispatch_queue.borrow().len()
                ));
                return;
            }
        };
        let _guard = QueueGuard(&self.dispatch_queue);

        loop {
            let dispatch_action = self.dispatch_queue.borrow_mut().pop_front();

            match dispatch_action {
                Some(action) => {
                    self.reduce(&action);
                    self.notify_listeners();
                }
                None => break,
            }
        }
    }

    /// Notify every listener registered at the start of this pass.
    fn notify_listeners(&self) {
        let listeners: Vec<Callback<State, Action>> = self.listeners.borrow().clone();
        self.log(format_args!("notifying {} listeners", listeners.len()));

        for listener in &listeners {
            listener.emit(self);
        }
    }

    /// Subscribe a listener to state transitions of this store. The
    /// listener is invoked after every [dispatch()](StoreRef::dispatch()),
    /// after listeners which subscribed before it.
    ///
    /// A listener subscribed while listeners are being notified is
    /// first invoked on the next dispatch.
    pub fn subscribe<F>(&self, listener: F) -> Unsubscribe<State, Action>
    where
        F: Fn(&StoreRef<State, Action>) + 'static,
    {
        self.subscribe_callback(&Callback::new(listener))
    }

    /// Subscribe an existing [Callback]. See [subscribe()](StoreRef::subscribe()).
    pub fn subscribe_callback(
        &self,
        callback: &Callback<State, Action>,
    ) -> Unsubscribe<State, Action> {
        self.listeners.borrow_mut().push(callback.clone());
        Unsubscribe::new(Rc::downgrade(&self.0), callback)
    }
}

impl<State, Action> Clone for StoreRef<State, Action> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<State, Action> Deref for StoreRef<State, Action> {
    type Target = Store<State, Action>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<State, Action> PartialEq for StoreRef<State, Action> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Create a new store holding `initial_state`, which uses `reducer`
/// to handle dispatched actions. Equivalent to [StoreRef::new()].
pub fn create_store<State, Action, R>(initial_state: State, reducer: R) -> StoreRef<State, Action>
where
    Action: StoreAction,
    R: Reducer<State, Action> + 'static,
{
    StoreRef::new(initial_state, reducer)
}

/// This struct is designed to operate as a central source of truth
/// and global "immutable" state within your application.
///
/// The current state of this store ([Store::state()]) can only be
/// modified by dispatching an `Action` via [StoreRef::dispatch()].
/// These actions are taken by the [Reducer] which you provided to the
/// store at construction, and a new current state is produced. The
/// previous state is never mutated, it remains valid for anyone still
/// holding it.
///
/// Listeners can subscribe to changes to the `State` in this store
/// with [StoreRef::subscribe()].
pub struct Store<State, Action> {
    /// This lock is used to prevent dispatch recursion.
    dispatch_lock: RefCell<()>,
    /// Queue of actions to be dispatched by [StoreRef::dispatch()].
    dispatch_queue: RefCell<VecDeque<Action>>,
    reducer: Box<dyn Reducer<State, Action>>,
    /// The current state of this store.
    state: RefCell<Rc<State>>,
    /// Notified in registration order after every state transition.
    listeners: RefCell<Vec<Callback<State, Action>>>,
    log_level: Cell<LogLevel>,
}

impl<State, Action> Store<State, Action>
where
    Action: StoreAction,
{
    fn new<R: Reducer<State, Action> + 'static>(initial_state: State, reducer: R) -> Self {
        Self {
            dispatch_lock: RefCell::new(()),
            dispatch_queue: RefCell::new(VecDeque::new()),
            reducer: Box::new(reducer),
            state: RefCell::new(Rc::new(initial_state)),
            listeners: RefCell::new(Vec::new()),
            log_level: Cell::new(LogLevel::default()),
        }
    }

    /// Pass the `action` to the reducer and replace the current state
    /// with its result. The state is left untouched if the reducer
    /// panics.
    fn reduce(&self, action: &Action) {
        let prev_state = self.state();
        self.log(format_args!("action: {}", action.kind()));

        let next_state = self.reducer.reduce(&prev_state, action);
        if Rc::ptr_eq(&prev_state, &next_state) {
            self.log(format_args!("state unchanged by {}", action.kind()));
        }

        *self.state.borrow_mut() = next_state;
    }
}

impl<State, Action> Store<State, Action> {
    /// Get the current `State` stored in this store.
    ///
    /// Modifications to this state need to be performed by
    /// dispatching an `Action` to the store using
    /// [dispatch()](StoreRef::dispatch()).
    pub fn state(&self) -> Rc<State> {
        self.state.borrow().clone()
    }

    /// The number of currently subscribed listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.get()
    }

    /// Set the level at which this store logs dispatched actions and
    /// notifications. Use [LogLevel::Off] to silence it.
    pub fn set_log_level(&self, log_level: LogLevel) {
        self.log_level.set(log_level);
    }

    fn log(&self, message: std::fmt::Arguments<'_>) {
        self.log_level.get().log(message);
    }

    pub(crate) fn remove_listener(&self, listener: &Weak<dyn Fn(&StoreRef<State, Action>)>) {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|callback| !callback.is_instance(listener));
        let removed = before - listeners.len();
        drop(listeners);

        if removed > 0 {
            self.log(format_args!("unsubscribed {} listener(s)", removed));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{create_store, Callback, LogLevel, StoreAction, StoreRef};
    use std::{
        cell::RefCell,
        panic::{catch_unwind, AssertUnwindSafe},
        rc::Rc,
    };

    #[derive(Debug, PartialEq)]
    struct TestState {
        counter: i32,
    }

    #[derive(Debug, Copy, Clone)]
    enum TestAction {
        Increment,
        Decrement,
        Add(i32),
        Unknown,
        Explode,
    }

    impl StoreAction for TestAction {
        fn kind(&self) -> &str {
            match self {
                TestAction::Increment => "INCREMENT",
                TestAction::Decrement => "DECREMENT",
                TestAction::Add(_) => "ADD",
                TestAction::Unknown => "UNKNOWN",
                TestAction::Explode => "EXPLODE",
            }
        }
    }

    fn test_reducer(state: &Rc<TestState>, action: &TestAction) -> Rc<TestState> {
        match action {
            TestAction::Increment => Rc::new(TestState {
                counter: state.counter + 1,
            }),
            TestAction::Decrement => Rc::new(TestState {
                counter: state.counter - 1,
            }),
            TestAction::Add(amount) => Rc::new(TestState {
                counter: state.counter + amount,
            }),
            TestAction::Explode => panic!("reducer exploded"),
            _ => state.clone(),
        }
    }

    fn test_store() -> StoreRef<TestState, TestAction> {
        let store = create_store(TestState { counter: 0 }, test_reducer);
        store.set_log_level(LogLevel::Trace);
        store
    }

    #[test]
    fn test_notify() {
        let store = test_store();

        let callback_test = Rc::new(RefCell::new(0));
        let callback_test_copy = callback_test.clone();
        store.subscribe(move |store| {
            *callback_test_copy.borrow_mut() = store.state().counter;
        });

        assert_eq!(0, store.state().counter);

        store.dispatch(TestAction::Increment);
        store.dispatch(TestAction::Increment);
        assert_eq!(2, *callback_test.borrow());
        assert_eq!(2, store.state().counter);

        store.dispatch(TestAction::Decrement);
        assert_eq!(1, store.state().counter);
        assert_eq!(1, *callback_test.borrow());
    }

    #[test]
    fn state_is_fold_of_actions() {
        let store = test_store();
        let actions = [
            TestAction::Add(5),
            TestAction::Decrement,
            TestAction::Unknown,
            TestAction::Add(-12),
            TestAction::Increment,
        ];

        for action in actions.iter() {
            store.dispatch(*action);
        }

        let expected = actions
            .iter()
            .fold(Rc::new(TestState { counter: 0 }), |state, action| {
                test_reducer(&state, action)
            });
        assert_eq!(*expected, *store.state());
    }

    #[test]
    fn unknown_action_keeps_state() {
        let store = test_store();
        store.dispatch(TestAction::Increment);

        let before = store.state();
        store.dispatch(TestAction::Unknown);
        assert!(Rc::ptr_eq(&before, &store.state()));
    }

    #[test]
    fn unknown_action_still_notifies() {
        let store = test_store();
        let calls = Rc::new(RefCell::new(0));
        let calls_copy = calls.clone();
        store.subscribe(move |_| *calls_copy.borrow_mut() += 1);

        store.dispatch(TestAction::Unknown);
        assert_eq!(1, *calls.borrow());
    }

    #[test]
    fn listeners_notified_in_registration_order() {
        let store = test_store();
        let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

        for name in ["A", "B", "C"] {
            let order = order.clone();
            store.subscribe(move |_| order.borrow_mut().push(name));
        }

        store.dispatch(TestAction::Increment);
        assert_eq!(vec!["A", "B", "C"], *order.borrow());
    }

    #[test]
    fn listeners_observe_new_state() {
        let store = test_store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_copy = seen.clone();
        store.subscribe(move |store| seen_copy.borrow_mut().push(store.state().counter));

        store.dispatch(TestAction::Add(3));
        store.dispatch(TestAction::Add(4));
        assert_eq!(vec![3, 7], *seen.borrow());
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let store = test_store();
        let calls = Rc::new(RefCell::new(0));
        let calls_copy = calls.clone();
        let unsubscribe = store.subscribe(move |_| *calls_copy.borrow_mut() += 1);

        store.dispatch(TestAction::Increment);
        assert_eq!(1, *calls.borrow());

        unsubscribe.unsubscribe();
        unsubscribe.unsubscribe();
        assert_eq!(0, store.listener_count());

        store.dispatch(TestAction::Increment);
        assert_eq!(1, *calls.borrow());
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let store = test_store();
        let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

        let order_a = order.clone();
        let unsubscribe_a = store.subscribe(move |_| order_a.borrow_mut().push("A"));
        let order_b = order.clone();
        store.subscribe(move |_| order_b.borrow_mut().push("B"));

        unsubscribe_a.unsubscribe();
        store.dispatch(TestAction::Increment);
        assert_eq!(vec!["B"], *order.borrow());
    }

    #[test]
    fn unsubscribe_removes_every_registration_of_a_callback() {
        let store = test_store();
        let calls = Rc::new(RefCell::new(0));
        let calls_copy = calls.clone();
        let callback: Callback<TestState, TestAction> =
            Callback::new(move |_| *calls_copy.borrow_mut() += 1);

        store.subscribe_callback(&callback);
        let unsubscribe = store.subscribe_callback(&callback);
        store.dispatch(TestAction::Increment);
        assert_eq!(2, *calls.borrow());

        unsubscribe.unsubscribe();
        store.dispatch(TestAction::Increment);
        assert_eq!(2, *calls.borrow());
    }

    #[test]
    fn unsubscribe_after_store_dropped() {
        let store = test_store();
        let unsubscribe = store.subscribe(|_| {});
        drop(store);
        unsubscribe.unsubscribe();
    }

    #[test]
    fn subscribe_during_notification_takes_effect_next_dispatch() {
        let store = test_store();
        let late_calls = Rc::new(RefCell::new(0));

        let late_calls_copy = late_calls.clone();
        let subscribed = Rc::new(RefCell::new(false));
        store.subscribe(move |store| {
            if !*subscribed.borrow() {
                *subscribed.borrow_mut() = true;
                let late_calls = late_calls_copy.clone();
                store.subscribe(move |_| *late_calls.borrow_mut() += 1);
            }
        });

        store.dispatch(TestAction::Increment);
        assert_eq!(0, *late_calls.borrow());
        assert_eq!(2, store.listener_count());

        store.dispatch(TestAction::Increment);
        assert_eq!(1, *late_calls.borrow());
    }

    #[test]
    fn unsubscribe_during_notification_finishes_current_pass() {
        let store = test_store();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let unsubscribe_b: Rc<RefCell<Option<crate::Unsubscribe<TestState, TestAction>>>> =
            Rc::new(RefCell::new(None));

        let calls_a = calls.clone();
        let unsubscribe_b_copy = unsubscribe_b.clone();
        store.subscribe(move |_| {
            calls_a.borrow_mut().push("A");
            if let Some(unsubscribe) = unsubscribe_b_copy.borrow().as_ref() {
                unsubscribe.unsubscribe();
            }
        });
        let calls_b = calls.clone();
        *unsubscribe_b.borrow_mut() =
            Some(store.subscribe(move |_| calls_b.borrow_mut().push("B")));

        store.dispatch(TestAction::Increment);
        store.dispatch(TestAction::Increment);
        assert_eq!(vec!["A", "B", "A"], *calls.borrow());
    }

    #[test]
    fn reentrant_dispatch_is_queued() {
        let store = test_store();
        let seen: Rc<RefCell<Vec<(&'static str, i32)>>> = Rc::new(RefCell::new(Vec::new()));

        let seen_a = seen.clone();
        store.subscribe(move |store| {
            let counter = store.state().counter;
            seen_a.borrow_mut().push(("A", counter));
            if counter == 1 {
                store.dispatch(TestAction::Add(10));
                // not processed until this pass completes
                assert_eq!(1, store.state().counter);
            }
        });
        let seen_b = seen.clone();
        store.subscribe(move |store| seen_b.borrow_mut().push(("B", store.state().counter)));

        store.dispatch(TestAction::Increment);
        assert_eq!(11, store.state().counter);
        assert_eq!(
            vec![("A", 1), ("B", 1), ("A", 11), ("B", 11)],
            *seen.borrow()
        );
    }

    #[test]
    fn reducer_panic_leaves_state_unchanged() {
        let store = test_store();
        store.dispatch(TestAction::Add(4));

        let calls = Rc::new(RefCell::new(0));
        let calls_copy = calls.clone();
        store.subscribe(move |_| *calls_copy.borrow_mut() += 1);

        let result = catch_unwind(AssertUnwindSafe(|| store.dispatch(TestAction::Explode)));
        assert!(result.is_err());
        assert_eq!(4, store.state().counter);
        assert_eq!(0, *calls.borrow());

        store.dispatch(TestAction::Increment);
        assert_eq!(5, store.state().counter);
        assert_eq!(1, *calls.borrow());
    }

    #[test]
    fn listener_panic_aborts_remaining_listeners() {
        let store = test_store();
        let calls: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

        let calls_a = calls.clone();
        store.subscribe(move |store| {
            calls_a.borrow_mut().push("A");
            if store.state().counter == 1 {
                store.dispatch(TestAction::Add(100));
                panic!("listener exploded");
            }
        });
        let calls_b = calls.clone();
        store.subscribe(move |_| calls_b.borrow_mut().push("B"));

        let result = catch_unwind(AssertUnwindSafe(|| store.dispatch(TestAction::Increment)));
        assert!(result.is_err());
        assert_eq!(vec!["A"], *calls.borrow());
        assert_eq!(1, store.state().counter);

        // the action queued by the aborted pass is discarded
        store.dispatch(TestAction::Increment);
        assert_eq!(2, store.state().counter);
        assert_eq!(vec!["A", "A", "B"], *calls.borrow());
    }

    #[test]
    fn store_refs_compare_by_identity() {
        let store = test_store();
        let other = test_store();
        assert!(store == store.clone());
        assert!(store != other);
    }
}
