use super::Msg;
use crate::{
    command::Command,
    component::Transition,
    immutable::Immutable,
};

/// Page state that may have failed to initialize.
///
/// A page whose preconditions do not hold (no permission, missing record)
/// initializes to `Invalid` and redirects. An invalid page ignores every
/// message and derives fallback chrome.
#[derive(Debug, Clone, PartialEq)]
pub enum Validated<S> {
    Valid(Immutable<S>),
    Invalid,
}

impl<S> Validated<S> {
    pub fn valid(state: S) -> Self {
        Self::Valid(Immutable::new(state))
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn as_valid(&self) -> Option<&Immutable<S>> {
        match self {
            Self::Valid(state) => Some(state),
            Self::Invalid => None,
        }
    }

    /// Applies `f` to the valid state, or returns `default`.
    pub fn with_valid<T>(&self, default: T, f: impl FnOnce(&Immutable<S>) -> T) -> T {
        match self {
            Self::Valid(state) => f(state),
            Self::Invalid => default,
        }
    }
}

/// Runs `update` against valid state only. Invalid state is returned as is.
///
/// When `update` hands back its input, the outer state is returned unchanged.
pub fn update_valid<S, I, M>(
    state: Immutable<Validated<S>>,
    msg: I,
    update: impl FnOnce(Immutable<S>, I) -> Transition<S, M>,
) -> Transition<Validated<S>, M>
where
    S: Clone,
    M: Send + 'static,
{
    let Some(inner) = state.as_valid().cloned() else {
        return (state, Vec::new());
    };
    let (next, cmds) = update(inner.clone(), msg);
    if next.ptr_eq(&inner) {
        return (state, cmds);
    }
    (Immutable::new(Validated::Valid(next)), cmds)
}

/// The outcome of an `init` that failed its preconditions: invalid state and
/// a command replacing the current route with `fallback`.
pub fn invalid_init<S, I, R>(fallback: R) -> Transition<Validated<S>, Msg<I, R>>
where
    I: Send + 'static,
    R: Send + 'static,
{
    (
        Immutable::new(Validated::Invalid),
        vec![Command::dispatch(Msg::replace_route(fallback))],
    )
}
