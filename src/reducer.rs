use std::rc::Rc;

/// Using the [reduce()](Reducer::reduce()) method, implementors of
/// this trait take an `Action` submitted to a store via
/// [StoreRef::dispatch()](crate::StoreRef::dispatch()) and produce
/// the next `State` from the previous one.
///
/// A reducer must be total: an `Action` which it does not recognise
/// must produce the previous state unchanged (return `prev_state`
/// itself, so that [Rc::ptr_eq()] holds).
///
/// Any function or closure with the signature
/// `Fn(&Rc<State>, &Action) -> Rc<State>` is a reducer.
pub trait Reducer<State, Action> {
    /// Take an `Action` submitted to a store via
    /// [StoreRef::dispatch()](crate::StoreRef::dispatch()) and
    /// produce the next `State`. The `prev_state` is never mutated.
    fn reduce(&self, prev_state: &Rc<State>, action: &Action) -> Rc<State>;
}

impl<State, Action, F> Reducer<State, Action> for F
where
    F: Fn(&Rc<State>, &Action) -> Rc<State>,
{
    fn reduce(&self, prev_state: &Rc<State>, action: &Action) -> Rc<State> {
        self(prev_state, action)
    }
}
