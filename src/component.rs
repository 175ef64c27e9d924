//! The component contract and child composition.
//!
//! A component is the triple `init` / `update` / `view`. `update` is pure and
//! synchronous: it returns the next state plus the commands to run, and never
//! performs effects itself. Parents embed child state as an
//! [`Immutable`] field and route child messages with [`update_child`], so a
//! child never needs to know the message type of its ancestors.

use std::{fmt, sync::Arc};

use tokio::sync::mpsc;

use crate::{
    command::{Command, map_many},
    immutable::{Immutable, Lens},
};

/// The result of `init` or `update`: the next state and the commands to run.
pub type Transition<S, M> = (Immutable<S>, Vec<Command<M>>);

/// The entry point for messages into a running process.
///
/// `Dispatch` is cheap to clone. Views hand it to event handlers; it must not
/// be called while rendering.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use portal_runtime::component::Dispatch;
///
/// #[derive(Debug, PartialEq)]
/// enum Parent {
///     Field(u32),
/// }
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// let dispatch = Dispatch::new(move |msg: Parent| sink.lock().unwrap().push(msg));
///
/// let child = dispatch.map(Parent::Field);
/// child.send(3);
///
/// assert_eq!(*seen.lock().unwrap(), vec![Parent::Field(3)]);
/// ```
pub struct Dispatch<M>(Arc<dyn Fn(M) + Send + Sync>);

impl<M: 'static> Dispatch<M> {
    pub fn new(f: impl Fn(M) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// A dispatch that forwards into a channel.
    ///
    /// Messages sent after the receiver is gone are dropped.
    pub fn from_sender(tx: mpsc::UnboundedSender<M>) -> Self
    where
        M: Send,
    {
        Self::new(move |msg| {
            if tx.send(msg).is_err() {
                tracing::trace!("message dispatched after the process stopped");
            }
        })
    }

    pub fn send(&self, msg: M) {
        (self.0)(msg)
    }

    /// A dispatch for a child component whose messages are wrapped by `f`.
    pub fn map<N: 'static>(&self, f: impl Fn(N) -> M + Send + Sync + 'static) -> Dispatch<N> {
        let parent = self.clone();
        Dispatch::new(move |msg| parent.send(f(msg)))
    }
}

impl<M> Clone for Dispatch<M> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<M> fmt::Debug for Dispatch<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dispatch").finish()
    }
}

/// A reducer triple over an immutable state.
///
/// Implementations must return the input state unchanged (the same reference)
/// with no commands for messages they do not handle.
///
/// # Examples
///
/// ```
/// use portal_runtime::prelude::*;
///
/// #[derive(Clone)]
/// struct Count(i64);
///
/// enum Msg {
///     Add(i64),
///     Ignored,
/// }
///
/// struct Counter;
///
/// impl Component for Counter {
///     type Params = i64;
///     type State = Count;
///     type Msg = Msg;
///     type View = String;
///
///     fn init(&self, start: i64) -> Transition<Count, Msg> {
///         (Immutable::new(Count(start)), vec![])
///     }
///
///     fn update(&self, state: Immutable<Count>, msg: Msg) -> Transition<Count, Msg> {
///         match msg {
///             Msg::Add(n) => (state.modify(|c| c.0 += n), vec![]),
///             Msg::Ignored => (state, vec![]),
///         }
///     }
///
///     fn view(&self, state: &Immutable<Count>, _dispatch: &Dispatch<Msg>) -> String {
///         state.0.to_string()
///     }
/// }
///
/// let (state, _) = Counter.init(1);
/// let (state, _) = Counter.update(state, Msg::Add(2));
/// let (same, cmds) = Counter.update(state.clone(), Msg::Ignored);
/// assert!(same.ptr_eq(&state) && cmds.is_empty());
/// ```
pub trait Component {
    type Params;
    type State: Clone + Send + Sync + 'static;
    type Msg: Send + 'static;
    type View;

    fn init(&self, params: Self::Params) -> Transition<Self::State, Self::Msg>;

    fn update(&self, state: Immutable<Self::State>, msg: Self::Msg) -> Transition<Self::State, Self::Msg>;

    fn view(&self, state: &Immutable<Self::State>, dispatch: &Dispatch<Self::Msg>) -> Self::View;
}

/// Routes a child message through the child's reducer and grafts the result.
///
/// Reads the child state at `path`, runs `child_update`, stores the new child
/// state back at the same path and wraps every child command with
/// `map_child_msg`. If there is no child state at `path` (the child was torn
/// down), the parent state is returned unchanged and no commands are produced.
pub fn update_child<S, C, CM, CO, M>(
    state: Immutable<S>,
    path: &Lens<S, Immutable<C>>,
    child_update: impl FnOnce(Immutable<C>, CM) -> Transition<C, CO>,
    child_msg: CM,
    map_child_msg: impl Fn(CO) -> M + Send + Sync + 'static,
) -> Transition<S, M>
where
    S: Clone,
    CO: Send + 'static,
    M: Send + 'static,
{
    let Some(child) = state.get_in(path).cloned() else {
        tracing::warn!(
            child = std::any::type_name::<C>(),
            "message for absent child state ignored"
        );
        return (state, Vec::new());
    };
    let (next_child, cmds) = child_update(child, child_msg);
    (state.set_in(path, next_child), map_many(cmds, map_child_msg))
}

/// Runs `after` on the state of `transition` and appends its commands.
pub fn then_update<S, M: Send + 'static>(
    transition: Transition<S, M>,
    after: impl FnOnce(Immutable<S>) -> Transition<S, M>,
) -> Transition<S, M> {
    let (state, mut cmds) = transition;
    let (state, more) = after(state);
    cmds.extend(more);
    (state, cmds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{command::Context, host::MemoryHost};

    #[derive(Debug, Clone, PartialEq)]
    struct Field {
        value: String,
        touched: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum FieldMsg {
        Input(String),
        Blur,
    }

    struct FieldComponent;

    impl Component for FieldComponent {
        type Params = ();
        type State = Field;
        type Msg = FieldMsg;
        type View = String;

        fn init(&self, _: ()) -> Transition<Field, FieldMsg> {
            let field = Field {
                value: String::new(),
                touched: false,
            };
            (Immutable::new(field), vec![])
        }

        fn update(&self, state: Immutable<Field>, msg: FieldMsg) -> Transition<Field, FieldMsg> {
            match msg {
                FieldMsg::Input(value) => (
                    state.modify(|f| f.value = value),
                    vec![Command::dispatch(FieldMsg::Blur)],
                ),
                FieldMsg::Blur => (state.modify(|f| f.touched = true), vec![]),
            }
        }

        fn view(&self, state: &Immutable<Field>, _: &Dispatch<FieldMsg>) -> String {
            state.value.clone()
        }
    }

    #[derive(Debug, Clone)]
    struct Form {
        title: Option<Immutable<Field>>,
        body: Option<Immutable<Field>>,
    }

    #[derive(Debug, PartialEq)]
    enum FormMsg {
        Title(FieldMsg),
    }

    fn title() -> Lens<Form, Immutable<Field>> {
        Lens::slot(|f: &Form| &f.title, |f| &mut f.title)
    }

    fn form() -> Immutable<Form> {
        let (title, _) = FieldComponent.init(());
        let (body, _) = FieldComponent.init(());
        Immutable::new(Form {
            title: Some(title),
            body: Some(body),
        })
    }

    #[tokio::test]
    async fn test_update_child_matches_manual_update() {
        let state = form();
        let msg = FieldMsg::Input("Website redesign".to_owned());

        let (next, cmds) = update_child(
            state.clone(),
            &title(),
            |s, m| FieldComponent.update(s, m),
            msg.clone(),
            FormMsg::Title,
        );

        let child = state.title.clone().unwrap();
        let (manual, manual_cmds) = FieldComponent.update(child, msg);
        assert_eq!(next.title.as_deref(), Some(&*manual));
        assert_eq!(cmds.len(), manual_cmds.len());
        assert!(next.body.as_ref().unwrap().ptr_eq(state.body.as_ref().unwrap()));

        let cx = Context::new(Arc::new(MemoryHost::new("/")));
        let wrapped = cmds.into_iter().next().unwrap().run(cx).await;
        assert_eq!(wrapped, Some(FormMsg::Title(FieldMsg::Blur)));
    }

    #[test]
    fn test_update_child_on_absent_child_is_identity() {
        let state = form().modify(|f| f.title = None);

        let (next, cmds) = update_child(
            state.clone(),
            &title(),
            |s, m| FieldComponent.update(s, m),
            FieldMsg::Blur,
            FormMsg::Title,
        );

        assert!(next.ptr_eq(&state));
        assert!(cmds.is_empty());
    }

    #[test]
    fn test_then_update_appends_commands() {
        let (state, _) = FieldComponent.init(());
        let transition = (state, vec![Command::dispatch(FieldMsg::Blur)]);

        let (next, cmds) = then_update(transition, |s| {
            (s.modify(|f| f.touched = true), vec![Command::none()])
        });

        assert!(next.touched);
        assert_eq!(cmds.len(), 2);
    }
}
