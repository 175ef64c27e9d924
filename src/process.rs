//! The event loop that owns application state.
//!
//! A [`Process`] runs one [`App`]: it holds the current state, funnels every
//! message through the shell's reducer one at a time, publishes each step to
//! subscribers and hands resulting commands to the [`Executor`]. Messages
//! enter through a [`Dispatch`] backed by an unbounded channel, so a message
//! dispatched while another is being processed waits for its turn.

use std::{
    fmt, mem,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use dashmap::DashMap;
use futures::{StreamExt, stream::BoxStream};
use tokio::{
    runtime::Handle,
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    app::{App, Msg, Shell, State},
    command::{Command, Context},
    component::{Component, Dispatch},
    config::Config,
    executor::Executor,
    host::{Host, HostEvent, MemoryHost},
    immutable::Immutable,
    page::FrameworkMsg,
    render::Renderer,
    router::RouteManager,
};

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("a process must be started from within a tokio runtime")]
    NoRuntime,

    #[error("the process has stopped")]
    Stopped,
}

/// What subscribers observe.
pub enum Event<'a, A: App> {
    /// A message is about to be processed.
    MsgDispatched(&'a Msg<A>),
    /// A message was processed. Also published once on startup.
    StateChanged {
        state: &'a Immutable<State<A>>,
        dispatch: &'a Dispatch<Msg<A>>,
    },
}

impl<A: App> fmt::Debug for Event<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MsgDispatched(msg) => f.debug_tuple("MsgDispatched").field(msg).finish(),
            Self::StateChanged { state, .. } => f.debug_struct("StateChanged").field("state", state).finish(),
        }
    }
}

/// Identifies a subscription for [`Process::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Subscriber<A> = Arc<dyn Fn(&Event<'_, A>) + Send + Sync>;

fn subscriber<A: App>(f: impl Fn(&Event<'_, A>) + Send + Sync + 'static) -> Subscriber<A> {
    Arc::new(f)
}

struct Subscribers<A: App> {
    next: AtomicU64,
    entries: DashMap<SubscriptionId, Subscriber<A>>,
}

impl<A: App> Subscribers<A> {
    fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
            entries: DashMap::new(),
        }
    }

    fn insert(&self, subscriber: Subscriber<A>) -> SubscriptionId {
        let id = SubscriptionId(self.next.fetch_add(1, Ordering::Relaxed));
        self.entries.insert(id, subscriber);
        id
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Calls every subscriber in registration order.
    ///
    /// Subscribers are collected first, so a subscriber may subscribe or
    /// unsubscribe without deadlocking.
    fn publish(&self, event: &Event<'_, A>) {
        let mut snapshot: Vec<_> = self
            .entries
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        snapshot.sort_by_key(|(id, _)| *id);
        for (_, subscriber) in snapshot {
            subscriber(event);
        }
    }
}

/// Configures and starts a [`Process`].
pub struct Builder<A: App> {
    app: A,
    host: Option<Arc<dyn Host>>,
    config: Config,
    renderer: Option<Arc<dyn Renderer<A>>>,
}

impl<A: App> Builder<A> {
    /// The host to bind to. Defaults to a [`MemoryHost`] at `/`.
    pub fn host(mut self, host: Arc<dyn Host>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Renders the application on every state change.
    pub fn renderer(mut self, renderer: Arc<dyn Renderer<A>>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Initializes the app, paints once, routes the host's current location
    /// and runs `init`'s commands.
    pub fn start(self) -> Result<Process<A>, ProcessError> {
        let runtime = Handle::try_current().map_err(|_| ProcessError::NoRuntime)?;
        let host = self
            .host
            .unwrap_or_else(|| Arc::new(MemoryHost::default()) as Arc<dyn Host>);
        let shell = Arc::new(Shell::new(self.app, self.config));

        let (tx, rx) = mpsc::unbounded_channel();
        let dispatch = Dispatch::from_sender(tx);
        let (state, cmds) = shell.init(());
        let (state_tx, state_rx) = watch::channel(state.clone());

        let subscribers = Arc::new(Subscribers::new());
        if let Some(renderer) = self.renderer {
            let shell = Arc::clone(&shell);
            subscribers.insert(subscriber(move |event: &Event<'_, A>| {
                if let Event::StateChanged { state, dispatch } = event {
                    renderer.render(&shell, state, dispatch);
                }
            }));
        }
        if shell.config().debug {
            subscribers.insert(subscriber(|event: &Event<'_, A>| tracing::debug!(?event, "process event")));
        }
        subscribers.publish(&Event::StateChanged {
            state: &state,
            dispatch: &dispatch,
        });

        let token = CancellationToken::new();
        let routes = Arc::new(RouteManager::new(Arc::clone(&shell), Arc::clone(&host), dispatch.clone()));
        let binding = runtime.spawn(bind_host(host.events(), Arc::clone(&routes), token.clone()));
        routes.start();

        let executor = Executor::new(Context::new(Arc::clone(&host)), dispatch.clone());
        executor.execute(cmds);

        let driver = Driver {
            shell: Arc::clone(&shell),
            state,
            state_tx,
            rx,
            dispatch: dispatch.clone(),
            routes,
            executor,
            subscribers: Arc::clone(&subscribers),
        };
        let event_loop = runtime.spawn(driver.run(token.clone()));
        tracing::debug!("process started");

        Ok(Process {
            shell,
            host,
            dispatch,
            state: state_rx,
            subscribers,
            token,
            joins: vec![event_loop, binding],
        })
    }
}

async fn bind_host<A: App>(
    mut events: BoxStream<'static, HostEvent>,
    routes: Arc<RouteManager<A>>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            () = token.cancelled() => break,
            event = events.next() => match event {
                Some(event) => routes.handle_event(event),
                None => break,
            },
        }
    }
}

struct Driver<A: App> {
    shell: Arc<Shell<A>>,
    state: Immutable<State<A>>,
    state_tx: watch::Sender<Immutable<State<A>>>,
    rx: mpsc::UnboundedReceiver<Msg<A>>,
    dispatch: Dispatch<Msg<A>>,
    routes: Arc<RouteManager<A>>,
    executor: Executor<Msg<A>>,
    subscribers: Arc<Subscribers<A>>,
}

impl<A: App> Driver<A> {
    async fn run(mut self, token: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => break,
                msg = self.rx.recv() => match msg {
                    Some(msg) => self.step(msg),
                    None => break,
                },
            }
        }
        tracing::debug!("process stopped");
    }

    fn step(&mut self, msg: Msg<A>) {
        let span = tracing::trace_span!("step", ?msg);
        let _enter = span.enter();

        self.subscribers.publish(&Event::MsgDispatched(&msg));
        if let Msg::Framework(FrameworkMsg::Router(request)) = &msg {
            self.routes.handle(request);
        }

        let (next, cmds) = self.shell.update(self.state.clone(), msg);
        self.state = next;
        self.state_tx.send_replace(self.state.clone());
        self.subscribers.publish(&Event::StateChanged {
            state: &self.state,
            dispatch: &self.dispatch,
        });

        let started = self.executor.execute(cmds);
        tracing::trace!(started, "commands started");
    }
}

/// A running application.
///
/// Dropping the process stops its event loop. In-flight commands keep running
/// to completion, but their messages are discarded.
///
/// # Examples
///
/// ```no_run
/// # use portal_runtime::prelude::*;
/// # async fn run<A: App>(app: A) -> Result<(), portal_runtime::process::ProcessError> {
/// let process = Process::builder(app).config(Config::default()).start()?;
/// let state = process.wait_for(|state| state.ready).await?;
/// println!("now on {:?}", state.active_route);
/// process.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct Process<A: App> {
    shell: Arc<Shell<A>>,
    host: Arc<dyn Host>,
    dispatch: Dispatch<Msg<A>>,
    state: watch::Receiver<Immutable<State<A>>>,
    subscribers: Arc<Subscribers<A>>,
    token: CancellationToken,
    joins: Vec<JoinHandle<()>>,
}

impl<A: App> Process<A> {
    pub fn builder(app: A) -> Builder<A> {
        Builder {
            app,
            host: None,
            config: Config::default(),
            renderer: None,
        }
    }

    pub fn dispatch(&self) -> Dispatch<Msg<A>> {
        self.dispatch.clone()
    }

    pub fn send(&self, msg: Msg<A>) {
        self.dispatch.send(msg);
    }

    /// Runs `cmd` as if it had been returned by an update.
    pub fn execute(&self, cmd: Command<Msg<A>>) {
        Executor::new(Context::new(Arc::clone(&self.host)), self.dispatch.clone()).execute(vec![cmd]);
    }

    /// The most recently published state.
    pub fn state(&self) -> Immutable<State<A>> {
        self.state.borrow().clone()
    }

    /// Waits until the published state satisfies `pred`, checking the current
    /// state first.
    pub async fn wait_for(
        &self,
        pred: impl FnMut(&Immutable<State<A>>) -> bool,
    ) -> Result<Immutable<State<A>>, ProcessError> {
        let mut rx = self.state.clone();
        let state = rx.wait_for(pred).await.map_err(|_| ProcessError::Stopped)?;
        Ok(Immutable::clone(&state))
    }

    /// Adds a callback invoked on every published event, after the ones
    /// already registered.
    pub fn subscribe(&self, f: impl Fn(&Event<'_, A>) + Send + Sync + 'static) -> SubscriptionId {
        self.subscribers.insert(subscriber(f))
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn shell(&self) -> &Shell<A> {
        &self.shell
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// Stops the event loop and the host binding, and waits for both.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        for join in mem::take(&mut self.joins) {
            if let Err(err) = join.await {
                tracing::error!(error = %err, "process task failed");
            }
        }
    }
}

impl<A: App> Drop for Process<A> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app::Registry,
        component::Transition,
        router::{PathArgs, Router},
    };
    use std::{sync::Mutex, time::Duration};
    use tokio::time::timeout;

    #[derive(Debug, Clone, PartialEq)]
    enum Route {
        Home,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum CounterMsg {
        Add(u32),
    }

    struct Counter {
        router: Router<Route>,
        registry: Registry<Self>,
    }

    impl App for Counter {
        type Route = Route;
        type Shared = ();
        type Pages = ();
        type State = u32;
        type Msg = CounterMsg;
        type View = ();

        fn router(&self) -> &Router<Route> {
            &self.router
        }

        fn registry(&self) -> &Registry<Self> {
            &self.registry
        }

        fn init(&self) -> (u32, Vec<Command<Msg<Self>>>) {
            (0, vec![Command::dispatch(Msg::Inner(CounterMsg::Add(1)))])
        }

        fn update(&self, state: Immutable<State<Self>>, msg: CounterMsg) -> Transition<State<Self>, Msg<Self>> {
            let CounterMsg::Add(n) = msg;
            let path = State::<Self>::inner_lens();
            (state.update(&path, |count| Immutable::new(**count + n)), Vec::new())
        }

        fn view(&self, _: &Shell<Self>, _: &Immutable<State<Self>>, _: &Dispatch<Msg<Self>>) {}
    }

    fn counter() -> Counter {
        let router = Router::builder().fallback(|_| Route::Home, |_| Some(PathArgs::new()));
        Counter {
            router,
            registry: Registry::new(),
        }
    }

    #[test]
    fn test_start_outside_runtime_fails() {
        let result = Process::builder(counter()).start();
        assert!(matches!(result, Err(ProcessError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_init_commands_run_after_startup() {
        let process = Process::builder(counter()).start().unwrap();

        let state = timeout(Duration::from_secs(1), process.wait_for(|s| *s.inner == 1))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(*state.inner, 1);
        process.shutdown().await;
    }

    #[tokio::test]
    async fn test_subscribers_see_dispatch_then_state_change() {
        let process = Process::builder(counter()).start().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = process.subscribe(move |event| {
            let label = match event {
                Event::MsgDispatched(Msg::Inner(CounterMsg::Add(n))) => format!("add {n}"),
                Event::MsgDispatched(_) => return,
                Event::StateChanged { state, .. } => format!("count {}", *state.inner),
            };
            sink.lock().unwrap().push(label);
        });
        process.wait_for(|s| *s.inner == 1).await.unwrap();

        process.send(Msg::Inner(CounterMsg::Add(2)));
        timeout(Duration::from_secs(1), process.wait_for(|s| *s.inner == 3))
            .await
            .unwrap()
            .unwrap();

        let seen = seen.lock().unwrap().clone();
        let tail = &seen[seen.len() - 2..];
        assert_eq!(tail, ["add 2", "count 3"]);
        assert!(process.unsubscribe(id));
        assert!(!process.unsubscribe(id));
    }

    #[tokio::test]
    async fn test_wait_for_after_shutdown_is_stopped() {
        let process = Process::builder(counter()).start().unwrap();
        let state = process.state.clone();
        process.shutdown().await;

        let mut rx = state;
        let result = rx.wait_for(|s| *s.inner == 100).await;
        assert!(result.is_err());
    }
}
