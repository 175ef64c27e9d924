use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use futures::{
    FutureExt,
    future::{self, BoxFuture},
};

use crate::{host::Host, page::Metadata};

type Task<Msg> = Box<dyn FnOnce(Context) -> BoxFuture<'static, Option<Msg>> + Send>;

/// What a running command can see of the outside world.
///
/// The executor hands every command a `Context` when it starts it. Building a
/// command never touches the host.
#[derive(Clone)]
pub struct Context {
    host: Arc<dyn Host>,
}

impl Context {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self { host }
    }

    /// The host the process is bound to.
    pub fn host(&self) -> &dyn Host {
        &*self.host
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}

/// A deferred unit of work that resolves to at most one message.
///
/// Commands are plain values: constructing, mapping or joining a command does
/// not start anything. They are returned from `init` and `update` and run by the
/// [`Executor`](crate::executor::Executor), which feeds the resulting message
/// back into the process.
///
/// A command's work must encode its own failures in the message it produces;
/// a panicking command is a defect and resolves to nothing.
///
/// # Examples
///
/// ```
/// use portal_runtime::command::Command;
///
/// enum Message {
///     Loaded(Vec<String>),
/// }
///
/// async fn fetch_opportunities() -> Vec<String> {
///     vec!["Website redesign".to_owned()]
/// }
///
/// let cmd = Command::perform(fetch_opportunities(), Message::Loaded);
/// ```
pub struct Command<Msg: Send + 'static> {
    pub(crate) task: Option<Task<Msg>>,
}

impl<Msg: Send + 'static> Command<Msg> {
    /// A command that does nothing.
    ///
    /// ```
    /// use portal_runtime::command::Command;
    ///
    /// let cmd: Command<i32> = Command::none();
    /// assert!(cmd.is_none());
    /// ```
    pub fn none() -> Self {
        Self { task: None }
    }

    fn from_task(task: impl FnOnce(Context) -> BoxFuture<'static, Option<Msg>> + Send + 'static) -> Self {
        Self {
            task: Some(Box::new(task)),
        }
    }

    /// Wraps a thunk producing an asynchronous operation.
    ///
    /// The thunk is only called once the command is executed.
    pub fn of<F, Fut>(thunk: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Msg> + Send + 'static,
    {
        Self::from_task(move |_| thunk().map(Some).boxed())
    }

    /// A command from a future that produces a message.
    ///
    /// ```
    /// use portal_runtime::command::Command;
    ///
    /// let cmd = Command::future(async { 42 });
    /// ```
    pub fn future(future: impl Future<Output = Msg> + Send + 'static) -> Self {
        Self::of(move || future)
    }

    /// Runs `future` and converts its output into a message.
    pub fn perform<A>(
        future: impl Future<Output = A> + Send + 'static,
        f: impl FnOnce(A) -> Msg + Send + 'static,
    ) -> Self {
        Self::future(future.map(f))
    }

    /// A command that resolves immediately to `msg`.
    ///
    /// Used to inject synthetic signals such as "page is ready".
    pub fn dispatch(msg: Msg) -> Self {
        Self::from_task(move |_| future::ready(Some(msg)).boxed())
    }

    /// Resolves to `msg` once `delay` has elapsed.
    pub fn delayed_dispatch(delay: Duration, msg: Msg) -> Self {
        Self::from_task(move |_| {
            async move {
                tokio::time::sleep(delay).await;
                Some(msg)
            }
            .boxed()
        })
    }

    /// A command that needs the execution [`Context`].
    pub fn with_context<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Context) -> Fut + Send + 'static,
        Fut: Future<Output = Option<Msg>> + Send + 'static,
    {
        Self::from_task(move |cx| f(cx).boxed())
    }

    /// A synchronous effect against the host, run when the command executes.
    pub fn host(f: impl FnOnce(&dyn Host) -> Option<Msg> + Send + 'static) -> Self {
        Self::from_task(move |cx| future::ready(f(cx.host())).boxed())
    }

    /// Publishes page metadata (document title and description) to the host.
    pub fn set_page_metadata(metadata: Metadata) -> Self {
        Self::host(move |host| {
            host.set_metadata(&metadata);
            None
        })
    }

    /// Scrolls the host document to `(x, y)`.
    pub fn scroll_to(x: f64, y: f64) -> Self {
        Self::host(move |host| {
            host.scroll_to(x, y);
            None
        })
    }

    /// Scrolls the host element `id` to `(x, y)`.
    pub fn scroll_container_to(id: impl Into<String>, x: f64, y: f64) -> Self {
        let id = id.into();
        Self::host(move |host| {
            host.scroll_container_to(&id, x, y);
            None
        })
    }

    /// Focuses the host element `id`.
    pub fn focus(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::host(move |host| {
            host.focus(&id);
            None
        })
    }

    /// Removes focus from the host element `id`.
    pub fn blur(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::host(move |host| {
            host.blur(&id);
            None
        })
    }

    /// Pushes `url` onto the host history without routing.
    pub fn push_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self::host(move |host| {
            let scroll_y = host.scroll_y();
            host.push_state(&url, scroll_y);
            None
        })
    }

    /// Replaces the current host history entry without routing.
    pub fn replace_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self::host(move |host| {
            let scroll_y = host.scroll_y();
            host.replace_state(&url, scroll_y);
            None
        })
    }

    /// Leaves the application for `url`.
    pub fn redirect(url: impl Into<String>) -> Self {
        let url = url.into();
        Self::host(move |host| {
            host.redirect(&url);
            None
        })
    }

    /// Moves the host one history entry back.
    pub fn back() -> Self {
        Self::host(|host| {
            host.back();
            None
        })
    }

    /// Reads `key` from host storage.
    pub fn get_item(key: impl Into<String>, f: impl FnOnce(Option<String>) -> Msg + Send + 'static) -> Self {
        let key = key.into();
        Self::host(move |host| Some(f(host.storage_get(&key))))
    }

    /// Stores `value` under `key` in host storage.
    pub fn set_item(key: impl Into<String>, value: impl Into<String>) -> Self {
        let (key, value) = (key.into(), value.into());
        Self::host(move |host| {
            host.storage_set(&key, &value);
            None
        })
    }

    /// Deletes `key` from host storage.
    pub fn remove_item(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::host(move |host| {
            host.storage_remove(&key);
            None
        })
    }

    /// Empties host storage.
    pub fn clear_storage() -> Self {
        Self::host(|host| {
            host.storage_clear();
            None
        })
    }

    /// Returns `true` if this command does nothing.
    pub fn is_none(&self) -> bool {
        self.task.is_none()
    }

    /// Transforms the eventual message.
    ///
    /// ```
    /// use portal_runtime::command::Command;
    ///
    /// #[derive(Debug)]
    /// enum Parent {
    ///     Child(u32),
    /// }
    ///
    /// let cmd: Command<Parent> = Command::dispatch(7).map(Parent::Child);
    /// ```
    pub fn map<B: Send + 'static>(self, f: impl FnOnce(Msg) -> B + Send + 'static) -> Command<B> {
        match self.task {
            None => Command::none(),
            Some(task) => Command::from_task(move |cx| task(cx).map(move |msg| msg.map(f)).boxed()),
        }
    }

    /// Runs `self`, then the command built from its message.
    ///
    /// If `self` resolves to nothing, so does the chain.
    pub fn and_then<B: Send + 'static>(self, f: impl FnOnce(Msg) -> Command<B> + Send + 'static) -> Command<B> {
        match self.task {
            None => Command::none(),
            Some(task) => Command::from_task(move |cx| {
                async move {
                    let msg = task(cx.clone()).await?;
                    f(msg).run(cx).await
                }
                .boxed()
            }),
        }
    }

    /// Runs both commands concurrently and fires once, after both resolved.
    ///
    /// If either side resolves to nothing, the joined command resolves to nothing.
    pub fn join<B, C>(self, other: Command<B>, combine: impl FnOnce(Msg, B) -> C + Send + 'static) -> Command<C>
    where
        B: Send + 'static,
        C: Send + 'static,
    {
        let (Some(left), Some(right)) = (self.task, other.task) else {
            return Command::none();
        };
        Command::from_task(move |cx| {
            async move {
                let (a, b) = future::join(left(cx.clone()), right(cx)).await;
                Some(combine(a?, b?))
            }
            .boxed()
        })
    }

    /// [`join`](Self::join) over three commands.
    pub fn join3<B, C, D>(
        self,
        second: Command<B>,
        third: Command<C>,
        combine: impl FnOnce(Msg, B, C) -> D + Send + 'static,
    ) -> Command<D>
    where
        B: Send + 'static,
        C: Send + 'static,
        D: Send + 'static,
    {
        self.join(second, |a, b| (a, b))
            .join(third, move |(a, b), c| combine(a, b, c))
    }

    /// [`join`](Self::join) over four commands.
    pub fn join4<B, C, D, E>(
        self,
        second: Command<B>,
        third: Command<C>,
        fourth: Command<D>,
        combine: impl FnOnce(Msg, B, C, D) -> E + Send + 'static,
    ) -> Command<E>
    where
        B: Send + 'static,
        C: Send + 'static,
        D: Send + 'static,
        E: Send + 'static,
    {
        self.join3(second, third, |a, b, c| (a, b, c))
            .join(fourth, move |(a, b, c), d| combine(a, b, c, d))
    }

    /// Runs the command to completion in `cx`.
    pub async fn run(self, cx: Context) -> Option<Msg> {
        match self.task {
            Some(task) => task(cx).await,
            None => None,
        }
    }
}

impl<Msg: Send + 'static> Default for Command<Msg> {
    fn default() -> Self {
        Self::none()
    }
}

impl<Msg: Send + 'static> fmt::Debug for Command<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("none", &self.is_none())
            .finish()
    }
}

/// Applies [`Command::map`] to every command in `cmds`.
///
/// The result always has as many commands as the input.
pub fn map_many<A, B>(cmds: Vec<Command<A>>, f: impl Fn(A) -> B + Send + Sync + 'static) -> Vec<Command<B>>
where
    A: Send + 'static,
    B: Send + 'static,
{
    let f = Arc::new(f);
    cmds.into_iter()
        .map(|cmd| {
            let f = Arc::clone(&f);
            cmd.map(move |msg| f(msg))
        })
        .collect()
}

/// Runs every command concurrently and collects their messages in input order.
///
/// Commands resolving to nothing are skipped.
pub fn sequence<Msg: Send + 'static>(cmds: Vec<Command<Msg>>) -> Command<Vec<Msg>> {
    Command::from_task(move |cx| {
        let runs: Vec<_> = cmds.into_iter().map(|cmd| cmd.run(cx.clone())).collect();
        async move { Some(future::join_all(runs).await.into_iter().flatten().collect()) }.boxed()
    })
}

/// Collapses bursts of commands into the last one.
///
/// Each command produced by [`Debounce::command`] waits for the configured delay
/// when it runs. Only the most recently started one resolves to its message;
/// the others resolve to the supplied no-op message.
///
/// ```
/// use std::time::Duration;
/// use portal_runtime::command::Debounce;
///
/// #[derive(Debug)]
/// enum Message {
///     Noop,
///     Search(String),
/// }
///
/// let debounce = Debounce::new(Duration::from_millis(300));
/// let cmd = debounce.command(Message::Search("rust".into()), Message::Noop);
/// ```
#[derive(Debug, Clone)]
pub struct Debounce {
    latest: Arc<AtomicU64>,
    delay: Duration,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            latest: Arc::new(AtomicU64::new(0)),
            delay,
        }
    }

    pub fn command<Msg: Send + 'static>(&self, msg: Msg, noop: Msg) -> Command<Msg> {
        let latest = Arc::clone(&self.latest);
        let delay = self.delay;
        Command::of(move || {
            let ticket = latest.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                tokio::time::sleep(delay).await;
                if latest.load(Ordering::SeqCst) == ticket { msg } else { noop }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::Instant;

    fn cx() -> Context {
        Context::new(Arc::new(MemoryHost::new("/")))
    }

    #[tokio::test]
    async fn test_none_resolves_to_nothing() {
        let cmd: Command<i32> = Command::none();
        assert!(cmd.is_none());
        assert_eq!(cmd.run(cx()).await, None);
    }

    #[tokio::test]
    async fn test_dispatch_resolves_immediately() {
        assert_eq!(Command::dispatch(5).run(cx()).await, Some(5));
    }

    #[tokio::test]
    async fn test_thunk_is_not_called_during_construction() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cmd = Command::of(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { 1 }
        })
        .map(|n| n + 1);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(cmd.run(cx()).await, Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_map_many_preserves_arity() {
        let cmds = vec![Command::dispatch(1), Command::none(), Command::dispatch(3)];
        let mapped = map_many(cmds, |n: i32| n.to_string());

        assert_eq!(mapped.len(), 3);
        let mut results = Vec::new();
        for cmd in mapped {
            results.push(cmd.run(cx()).await);
        }
        assert_eq!(results, vec![Some("1".to_owned()), None, Some("3".to_owned())]);
    }

    #[tokio::test]
    async fn test_join_fires_once_after_both() {
        let start = Instant::now();
        let slow = Command::delayed_dispatch(Duration::from_millis(20), "slow");
        let fast = Command::delayed_dispatch(Duration::from_millis(1), "fast");

        let joined = fast.join(slow, |a, b| format!("{a}+{b}"));

        assert_eq!(joined.run(cx()).await, Some("fast+slow".to_owned()));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_join_with_unresolved_side_is_nothing() {
        let empty: Command<i32> = Command::host(|_| None);
        let joined = Command::dispatch(1).join(empty, |a, b| a + b);
        assert_eq!(joined.run(cx()).await, None);

        let joined = Command::dispatch(1).join(Command::<i32>::none(), |a, b| a + b);
        assert!(joined.is_none());
    }

    #[tokio::test]
    async fn test_join3_combines_in_order() {
        let cmd = Command::dispatch(1).join3(Command::dispatch("two"), Command::dispatch(3.0), |a, b, c| {
            format!("{a} {b} {c}")
        });
        assert_eq!(cmd.run(cx()).await, Some("1 two 3".to_owned()));
    }

    #[tokio::test]
    async fn test_and_then_chains_sequentially() {
        let cmd = Command::dispatch(2).and_then(|n| Command::future(async move { n * 21 }));
        assert_eq!(cmd.run(cx()).await, Some(42));
    }

    #[tokio::test]
    async fn test_sequence_keeps_input_order() {
        let cmds = vec![
            Command::delayed_dispatch(Duration::from_millis(10), 1),
            Command::host(|_| None),
            Command::delayed_dispatch(Duration::from_millis(1), 3),
        ];
        assert_eq!(sequence(cmds).run(cx()).await, Some(vec![1, 3]));
    }

    #[tokio::test]
    async fn test_host_effects_run_at_execution() {
        let host = Arc::new(MemoryHost::new("/"));
        let cx = Context::new(host.clone());

        let cmd: Command<()> = Command::set_page_metadata(Metadata::new("Dashboard"));
        assert_eq!(host.title(), "");
        assert_eq!(cmd.run(cx.clone()).await, None);
        assert_eq!(host.title(), "Dashboard");

        Command::<()>::set_item("draft", "42").run(cx.clone()).await;
        let read = Command::get_item("draft", |value| value).run(cx).await;
        assert_eq!(read, Some(Some("42".to_owned())));
    }

    #[tokio::test]
    async fn test_join4_combines_in_order() {
        let joined = Command::dispatch(1).join4(
            Command::delayed_dispatch(Duration::from_millis(3), 2),
            Command::dispatch(3),
            Command::delayed_dispatch(Duration::from_millis(1), 4),
            |a, b, c, d| vec![a, b, c, d],
        );

        assert_eq!(joined.run(cx()).await, Some(vec![1, 2, 3, 4]));
    }

    #[tokio::test]
    async fn test_focus_and_container_scroll_reach_the_host() {
        let host = Arc::new(MemoryHost::new("/"));
        let cx = Context::new(host.clone());

        Command::<()>::focus("search").run(cx.clone()).await;
        Command::<()>::scroll_container_to("results", 0.0, 240.0).run(cx.clone()).await;
        assert_eq!(host.focused().as_deref(), Some("search"));
        assert_eq!(host.container_scroll("results"), Some((0.0, 240.0)));

        Command::<()>::blur("search").run(cx).await;
        assert_eq!(host.focused(), None);
    }

    #[tokio::test]
    async fn test_debounce_only_latest_fires() {
        let debounce = Debounce::new(Duration::from_millis(10));
        let first = tokio::spawn(debounce.command("first", "noop").run(cx()));
        tokio::time::sleep(Duration::from_millis(2)).await;
        let second = tokio::spawn(debounce.command("second", "noop").run(cx()));

        assert_eq!(first.await.unwrap(), Some("noop"));
        assert_eq!(second.await.unwrap(), Some("second"));
    }
}
