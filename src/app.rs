//! App composition: pages registered by route, plus the transition protocol.
//!
//! An [`App`] declares its route table, its pages ([`Registry`]) and any
//! app-level state. [`Shell`] wraps the app and implements [`Component`] for
//! the whole application: it owns the page lifecycle, shared context, toasts
//! and the chrome of the active page.
//!
//! A navigation goes through these steps:
//!
//! 1. `incoming-route` records the pending route and reloads shared context
//!    with [`App::load_shared`].
//! 2. When shared context arrives, [`App::guard`] may redirect. Otherwise the
//!    page serving the route is initialized into its slot, and the document
//!    metadata is refreshed from the new page state.
//! 3. The page signals `page-ready`. The pending route becomes active, the
//!    previous page's slot is cleared if it belongs to another page, and the
//!    saved scroll position is restored.
//!
//! Every message routed to a page is followed by a metadata refresh from the
//! page's new state.

mod registry;

use std::fmt;

use crate::{
    command::Command,
    component::{Component, Dispatch, Transition},
    config::Config,
    immutable::{Immutable, Lens},
    page::{self, Chrome, FrameworkMsg, Metadata, Modal, SidebarView, Toast, ToastEntry},
    router::{IncomingRoute, Location, Route, Router, RouterMsg},
};

pub use registry::{Mount, Registry};

/// An application made of routed pages.
pub trait App: Sized + Send + Sync + 'static {
    type Route: Route;
    /// Context every page receives on init, such as the current session.
    type Shared: Clone + fmt::Debug + Default + Send + Sync + 'static;
    /// A record of optional page slots, one per mounted page.
    type Pages: Clone + Default + Send + Sync + 'static;
    /// App-level state outside the pages.
    type State: Clone + Send + Sync + 'static;
    type Msg: fmt::Debug + Send + 'static;
    type View;

    fn router(&self) -> &Router<Self::Route>;

    fn registry(&self) -> &Registry<Self>;

    fn init(&self) -> (Self::State, Vec<Command<Msg<Self>>>);

    /// Renders the application. `shell` gives access to the active page's
    /// view, chrome and sidebar.
    fn view(&self, shell: &Shell<Self>, state: &Immutable<State<Self>>, dispatch: &Dispatch<Msg<Self>>)
    -> Self::View;

    /// Handles app messages no page claimed.
    fn update(&self, state: Immutable<State<Self>>, _msg: Self::Msg) -> Transition<State<Self>, Msg<Self>> {
        (state, Vec::new())
    }

    /// Reloads shared context before every page initialization.
    fn load_shared(&self, current: &Self::Shared) -> Command<Self::Shared> {
        Command::dispatch(current.clone())
    }

    /// Returns the route to go to instead of `route`, if any.
    fn guard(&self, _shared: &Self::Shared, _route: &Self::Route) -> Option<Self::Route> {
        None
    }

    /// An app-level modal. A visible app modal hides the page's.
    fn modal(&self, _state: &State<Self>) -> Modal<Msg<Self>> {
        Modal::Hidden
    }

    fn close_modal(&self, state: Immutable<State<Self>>) -> Immutable<State<Self>> {
        state
    }

    /// Metadata when no page is on display.
    fn metadata(&self, _state: &State<Self>) -> Metadata {
        Metadata::default()
    }
}

/// Application state: the routing lifecycle, shared context, toasts, page
/// slots and the app's own state.
pub struct State<A: App> {
    /// Whether the active route's page has finished loading.
    pub ready: bool,
    pub incoming_route: Option<IncomingRoute<A::Route>>,
    pub active_route: A::Route,
    pub shared: A::Shared,
    pub toasts: Immutable<Vec<ToastEntry>>,
    pub pages: Immutable<A::Pages>,
    pub inner: Immutable<A::State>,
    next_toast: u64,
}

impl<A: App> State<A> {
    pub fn pages_lens() -> Lens<Self, Immutable<A::Pages>> {
        Lens::field(|s: &Self| &s.pages, |s| &mut s.pages)
    }

    pub fn inner_lens() -> Lens<Self, Immutable<A::State>> {
        Lens::field(|s: &Self| &s.inner, |s| &mut s.inner)
    }

    /// The state of a page, if its slot is filled.
    pub fn page<P>(&self, slot: &Lens<A::Pages, Immutable<P>>) -> Option<&Immutable<P>> {
        self.pages.get(slot)
    }
}

impl<A: App> Clone for State<A> {
    fn clone(&self) -> Self {
        Self {
            ready: self.ready,
            incoming_route: self.incoming_route.clone(),
            active_route: self.active_route.clone(),
            shared: self.shared.clone(),
            toasts: self.toasts.clone(),
            pages: self.pages.clone(),
            inner: self.inner.clone(),
            next_toast: self.next_toast,
        }
    }
}

impl<A: App> fmt::Debug for State<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("ready", &self.ready)
            .field("incoming_route", &self.incoming_route)
            .field("active_route", &self.active_route)
            .field("shared", &self.shared)
            .field("toasts", &self.toasts)
            .finish_non_exhaustive()
    }
}

/// Application messages.
pub enum Msg<A: App> {
    Noop,
    Inner(A::Msg),
    Framework(FrameworkMsg<A::Route>),
    SharedLoaded(A::Shared),
    DismissToast(u64),
    ScrollTo(f64),
}

impl<A: App> Msg<A> {
    /// Lifts a page message, wrapping inner messages with `wrap`.
    pub fn from_page<I>(msg: page::Msg<I, A::Route>, wrap: fn(I) -> A::Msg) -> Self {
        match msg {
            page::Msg::Inner(inner) => Self::Inner(wrap(inner)),
            page::Msg::Framework(msg) => Self::Framework(msg),
        }
    }

    pub fn incoming_route(route: A::Route) -> Self {
        Self::Framework(FrameworkMsg::IncomingRoute(IncomingRoute::new(route)))
    }

    pub fn new_route(route: A::Route) -> Self {
        Self::Framework(FrameworkMsg::Router(RouterMsg::NewRoute(route)))
    }

    pub fn replace_route(route: A::Route) -> Self {
        Self::Framework(FrameworkMsg::Router(RouterMsg::ReplaceRoute(route)))
    }

    pub fn new_url(url: impl Into<String>) -> Self {
        Self::Framework(FrameworkMsg::Router(RouterMsg::NewUrl(url.into())))
    }

    pub fn toast(toast: Toast) -> Self {
        Self::Framework(FrameworkMsg::ShowToast(toast))
    }

    pub fn ready() -> Self {
        Self::Framework(FrameworkMsg::Ready)
    }

    pub fn reload() -> Self {
        Self::Framework(FrameworkMsg::Reload)
    }
}

impl<A: App> fmt::Debug for Msg<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Noop => f.write_str("Noop"),
            Self::Inner(msg) => f.debug_tuple("Inner").field(msg).finish(),
            Self::Framework(msg) => f.debug_tuple("Framework").field(msg).finish(),
            Self::SharedLoaded(shared) => f.debug_tuple("SharedLoaded").field(shared).finish(),
            Self::DismissToast(id) => f.debug_tuple("DismissToast").field(id).finish(),
            Self::ScrollTo(y) => f.debug_tuple("ScrollTo").field(y).finish(),
        }
    }
}

impl<A: App> Clone for Msg<A>
where
    A::Msg: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Self::Noop => Self::Noop,
            Self::Inner(msg) => Self::Inner(msg.clone()),
            Self::Framework(msg) => Self::Framework(msg.clone()),
            Self::SharedLoaded(shared) => Self::SharedLoaded(shared.clone()),
            Self::DismissToast(id) => Self::DismissToast(*id),
            Self::ScrollTo(y) => Self::ScrollTo(*y),
        }
    }
}

impl<A: App> PartialEq for Msg<A>
where
    A::Msg: PartialEq,
    A::Shared: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Noop, Self::Noop) => true,
            (Self::Inner(a), Self::Inner(b)) => a == b,
            (Self::Framework(a), Self::Framework(b)) => a == b,
            (Self::SharedLoaded(a), Self::SharedLoaded(b)) => a == b,
            (Self::DismissToast(a), Self::DismissToast(b)) => a == b,
            (Self::ScrollTo(a), Self::ScrollTo(b)) => a == b,
            _ => false,
        }
    }
}

/// The application as a single component.
pub struct Shell<A: App> {
    app: A,
    config: Config,
}

impl<A: App> Shell<A> {
    pub fn new(app: A, config: Config) -> Self {
        Self { app, config }
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn router(&self) -> &Router<A::Route> {
        self.app.router()
    }

    /// Chrome of the active page. An app-level modal, when visible, takes
    /// precedence over the page's.
    pub fn chrome(&self, state: &State<A>) -> Chrome<Msg<A>> {
        let mut chrome = self
            .app
            .registry()
            .chrome(state, &state.active_route)
            .unwrap_or_else(|| Chrome {
                metadata: self.app.metadata(state),
                ..Chrome::default()
            });
        let modal = self.app.modal(state);
        if modal.is_visible() {
            chrome.modal = modal;
        }
        chrome
    }

    /// The active page's view, if its state is present.
    pub fn page_view(&self, state: &State<A>, dispatch: &Dispatch<Msg<A>>) -> Option<A::View> {
        self.app.registry().view(state, &state.active_route, dispatch)
    }

    pub fn sidebar(&self, state: &State<A>, dispatch: &Dispatch<Msg<A>>) -> Option<SidebarView<A::View>> {
        self.app.registry().sidebar(state, &state.active_route, dispatch)
    }

    fn on_incoming_route(&self, state: Immutable<State<A>>, incoming: IncomingRoute<A::Route>) -> Transition<State<A>, Msg<A>> {
        tracing::debug!(route = ?incoming.route, "incoming route");
        let load = self.app.load_shared(&state.shared).map(Msg::SharedLoaded);
        (state.modify(|s| s.incoming_route = Some(incoming)), vec![load])
    }

    fn on_shared_loaded(&self, state: Immutable<State<A>>, shared: A::Shared) -> Transition<State<A>, Msg<A>> {
        let state = state.modify(|s| s.shared = shared);
        let Some(incoming) = state.incoming_route.clone() else {
            return (state, Vec::new());
        };
        if let Some(redirect) = self.app.guard(&state.shared, &incoming.route) {
            if redirect != incoming.route {
                tracing::debug!(from = ?incoming.route, to = ?redirect, "route guarded");
                return (state, vec![Command::dispatch(Msg::replace_route(redirect))]);
            }
        }
        self.init_page(state, &incoming.route)
    }

    fn init_page(&self, state: Immutable<State<A>>, route: &A::Route) -> Transition<State<A>, Msg<A>> {
        match self.app.registry().init(self.router(), state.clone(), route) {
            Some(transition) => transition,
            None => {
                tracing::warn!(?route, "no page serves route");
                (state, vec![Command::dispatch(Msg::ready())])
            }
        }
    }

    fn on_page_ready(&self, state: Immutable<State<A>>) -> Transition<State<A>, Msg<A>> {
        let Some(incoming) = state.incoming_route.clone() else {
            return (state, Vec::new());
        };
        let registry = self.app.registry();
        let state = if registry.key(&incoming.route) != registry.key(&state.active_route) {
            registry.clear(state.clone(), &state.active_route)
        } else {
            state
        };
        let scroll_y = incoming.scroll_y;
        let next = state.modify(move |s| {
            s.incoming_route = None;
            s.active_route = incoming.route;
            s.ready = true;
        });
        (next, vec![Command::dispatch(Msg::ScrollTo(scroll_y))])
    }

    fn on_reload(&self, state: Immutable<State<A>>) -> Transition<State<A>, Msg<A>> {
        let route = state.active_route.clone();
        let cmd = Command::with_context(move |cx| {
            let scroll_y = cx.host().scroll_y();
            async move { Some(Msg::Framework(FrameworkMsg::IncomingRoute(IncomingRoute { route, scroll_y }))) }
        });
        (state, vec![cmd])
    }

    fn on_show_toast(&self, state: Immutable<State<A>>, toast: Toast) -> Transition<State<A>, Msg<A>> {
        let id = state.next_toast;
        let next = state.modify(move |s| {
            s.next_toast += 1;
            s.toasts = s.toasts.modify(|toasts| toasts.push(ToastEntry { id, toast }));
        });
        let dismiss = Command::delayed_dispatch(self.config.toast_auto_dismiss(), Msg::DismissToast(id));
        (next, vec![dismiss])
    }

    fn on_dismiss_toast(&self, state: Immutable<State<A>>, id: u64) -> Transition<State<A>, Msg<A>> {
        if !state.toasts.iter().any(|entry| entry.id == id) {
            return (state, Vec::new());
        }
        let next = state.modify(|s| s.toasts = s.toasts.modify(|toasts| toasts.retain(|entry| entry.id != id)));
        (next, Vec::new())
    }
}

impl<A: App> Component for Shell<A> {
    type Params = ();
    type State = State<A>;
    type Msg = Msg<A>;
    type View = A::View;

    fn init(&self, _: ()) -> Transition<State<A>, Msg<A>> {
        let (inner, cmds) = self.app.init();
        let state = State {
            ready: false,
            incoming_route: None,
            active_route: self.router().resolve(&Location::root()),
            shared: A::Shared::default(),
            toasts: Immutable::new(Vec::new()),
            pages: Immutable::new(A::Pages::default()),
            inner: Immutable::new(inner),
            next_toast: 0,
        };
        (Immutable::new(state), cmds)
    }

    fn update(&self, state: Immutable<State<A>>, msg: Msg<A>) -> Transition<State<A>, Msg<A>> {
        match msg {
            Msg::Noop => (state, Vec::new()),
            Msg::Inner(msg) => match self.app.registry().update(state.clone(), msg) {
                Ok(transition) => transition,
                Err(msg) => self.app.update(state, msg),
            },
            Msg::Framework(FrameworkMsg::IncomingRoute(incoming)) => self.on_incoming_route(state, incoming),
            Msg::Framework(FrameworkMsg::Ready) => self.on_page_ready(state),
            Msg::Framework(FrameworkMsg::Reload) => self.on_reload(state),
            Msg::Framework(FrameworkMsg::ShowToast(toast)) => self.on_show_toast(state, toast),
            Msg::Framework(FrameworkMsg::CloseModal) => (self.app.close_modal(state), Vec::new()),
            // Handled by the route manager before reaching the reducer.
            Msg::Framework(FrameworkMsg::Router(_)) => (state, Vec::new()),
            Msg::SharedLoaded(shared) => self.on_shared_loaded(state, shared),
            Msg::DismissToast(id) => self.on_dismiss_toast(state, id),
            Msg::ScrollTo(y) => (state, vec![Command::scroll_to(0.0, y)]),
        }
    }

    fn view(&self, state: &Immutable<State<A>>, dispatch: &Dispatch<Msg<A>>) -> A::View {
        self.app.view(self, state, dispatch)
    }
}
