//! Pages: components that own a route and derive the surrounding chrome.
//!
//! A [`Page`] is a component whose state also drives the document title,
//! alerts, breadcrumbs, modal, header actions and an optional sidebar. Every
//! chrome selector is a pure function of the page state. A page's message
//! type is [`Msg`]: its own inner messages plus the [`FrameworkMsg`]s the app
//! layer handles (readiness, routing, toasts).
//!
//! # Examples
//!
//! ```
//! use portal_runtime::prelude::*;
//! use portal_runtime::page::{self, Breadcrumb, Metadata, Params};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Route {
//!     Hello(String),
//! }
//!
//! #[derive(Clone)]
//! struct Hello {
//!     name: String,
//! }
//!
//! struct HelloPage;
//!
//! impl Page for HelloPage {
//!     type Route = Route;
//!     type Shared = ();
//!     type RouteParams = String;
//!     type State = Hello;
//!     type Inner = ();
//!     type View = String;
//!
//!     fn init(&self, params: Params<String, ()>) -> Transition<Hello, PageMsg<Self>> {
//!         let state = Hello { name: params.route_params };
//!         (Immutable::new(state), vec![Command::dispatch(page::Msg::ready())])
//!     }
//!
//!     fn update(&self, state: Immutable<Hello>, _: ()) -> Transition<Hello, PageMsg<Self>> {
//!         (state, vec![])
//!     }
//!
//!     fn view(&self, state: &Immutable<Hello>, _: &Dispatch<PageMsg<Self>>) -> String {
//!         format!("Hello, {}!", state.name)
//!     }
//!
//!     fn metadata(&self, state: &Hello) -> Metadata {
//!         Metadata::new(format!("Hello {}", state.name))
//!     }
//!
//!     fn breadcrumbs(&self, state: &Hello) -> Vec<Breadcrumb<PageMsg<Self>>> {
//!         vec![Breadcrumb::new(state.name.clone())]
//!     }
//! }
//!
//! let (state, cmds) = HelloPage.init(Params::new("/hello/Alice", "Alice".to_owned(), ()));
//! let chrome = page::chrome(&HelloPage, &state);
//! assert_eq!(chrome.metadata.title, "Hello Alice");
//! assert_eq!(chrome.breadcrumbs.len(), 1);
//! assert_eq!(cmds.len(), 1);
//! ```

mod actions;
mod alerts;
mod breadcrumbs;
mod metadata;
mod modal;
mod msg;
mod sidebar;
mod toast;
mod validated;

use serde::{Deserialize, Serialize};

use crate::{
    command::Command,
    component::{Component, Dispatch, Transition, then_update},
    immutable::Immutable,
    router::Route,
};

pub use actions::{Actions, Link, LinkTarget};
pub use alerts::{Alert, Alerts};
pub use breadcrumbs::{Breadcrumb, Breadcrumbs};
pub use metadata::Metadata;
pub use modal::{Modal, ModalButton, ModalContent};
pub use msg::{FrameworkMsg, Msg};
pub use sidebar::{Sidebar, SidebarSize, SidebarView};
pub use toast::{Toast, ToastEntry, ToastKind};
pub use validated::{Validated, invalid_init, update_valid};

/// The message type of page `P`.
pub type PageMsg<P> = Msg<<P as Page>::Inner, <P as Page>::Route>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeColor {
    Primary,
    Secondary,
    Success,
    Info,
    Warning,
    Danger,
    Light,
    Dark,
}

/// Page-level layout flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Layout {
    pub full_width: bool,
    /// Render the reduced navigation bar.
    pub simple_nav: bool,
    pub background_color: Option<ThemeColor>,
}

/// What a page receives when it is initialized for a route.
#[derive(Debug, Clone, PartialEq)]
pub struct Params<RP, Sh> {
    /// The serialized route, usable to tag responses with the page instance.
    pub route_path: String,
    pub route_params: RP,
    pub shared: Sh,
}

impl<RP, Sh> Params<RP, Sh> {
    pub fn new(route_path: impl Into<String>, route_params: RP, shared: Sh) -> Self {
        Self {
            route_path: route_path.into(),
            route_params,
            shared,
        }
    }
}

/// A routed component with derivable chrome.
///
/// `init`, `update`, `view` and `metadata` are required. Every other selector
/// defaults to "nothing to show".
pub trait Page: Send + Sync + 'static {
    type Route: Route;
    /// Context shared across pages, such as the current session.
    type Shared: Clone + Send + Sync + 'static;
    type RouteParams: 'static;
    type State: Clone + Send + Sync + 'static;
    type Inner: Send + 'static;
    type View;

    fn init(&self, params: Params<Self::RouteParams, Self::Shared>) -> Transition<Self::State, PageMsg<Self>>;

    fn update(&self, state: Immutable<Self::State>, msg: Self::Inner) -> Transition<Self::State, PageMsg<Self>>;

    fn view(&self, state: &Immutable<Self::State>, dispatch: &Dispatch<PageMsg<Self>>) -> Self::View;

    fn metadata(&self, state: &Self::State) -> Metadata;

    fn alerts(&self, _state: &Self::State) -> Alerts<PageMsg<Self>> {
        Alerts::default()
    }

    fn breadcrumbs(&self, _state: &Self::State) -> Breadcrumbs<PageMsg<Self>> {
        Vec::new()
    }

    fn modal(&self, _state: &Self::State) -> Modal<PageMsg<Self>> {
        Modal::Hidden
    }

    fn actions(&self, _state: &Self::State) -> Actions<PageMsg<Self>> {
        Actions::None
    }

    fn sidebar(&self) -> Option<Sidebar<Self>>
    where
        Self: Sized,
    {
        None
    }

    fn layout(&self) -> Layout {
        Layout::default()
    }
}

/// Every chrome selector of a page, evaluated at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Chrome<M> {
    pub metadata: Metadata,
    pub alerts: Alerts<M>,
    pub breadcrumbs: Breadcrumbs<M>,
    pub modal: Modal<M>,
    pub actions: Actions<M>,
    pub layout: Layout,
}

impl<M> Chrome<M> {
    pub fn map<N>(self, f: impl Fn(M) -> N) -> Chrome<N> {
        Chrome {
            metadata: self.metadata,
            alerts: self.alerts.map(&f),
            breadcrumbs: self.breadcrumbs.into_iter().map(|b| b.map(&f)).collect(),
            modal: self.modal.map(&f),
            actions: self.actions.map(&f),
            layout: self.layout,
        }
    }
}

impl<M> Default for Chrome<M> {
    fn default() -> Self {
        Self {
            metadata: Metadata::default(),
            alerts: Alerts::default(),
            breadcrumbs: Vec::new(),
            modal: Modal::Hidden,
            actions: Actions::None,
            layout: Layout::default(),
        }
    }
}

pub fn chrome<P: Page>(page: &P, state: &P::State) -> Chrome<PageMsg<P>> {
    Chrome {
        metadata: page.metadata(state),
        alerts: page.alerts(state),
        breadcrumbs: page.breadcrumbs(state),
        modal: page.modal(state),
        actions: page.actions(state),
        layout: page.layout(),
    }
}

/// A page seen as a plain [`Component`].
///
/// Framework messages are not page-local: they leave the state untouched.
pub struct PageComponent<P>(pub P);

impl<P: Page> Component for PageComponent<P> {
    type Params = Params<P::RouteParams, P::Shared>;
    type State = P::State;
    type Msg = PageMsg<P>;
    type View = P::View;

    fn init(&self, params: Self::Params) -> Transition<P::State, PageMsg<P>> {
        self.0.init(params)
    }

    fn update(&self, state: Immutable<P::State>, msg: PageMsg<P>) -> Transition<P::State, PageMsg<P>> {
        match msg {
            Msg::Inner(inner) => self.0.update(state, inner),
            Msg::Framework(_) => (state, Vec::new()),
        }
    }

    fn view(&self, state: &Immutable<P::State>, dispatch: &Dispatch<PageMsg<P>>) -> P::View {
        self.0.view(state, dispatch)
    }
}

/// A page that loads its data after `init` and finishes setup when it arrives.
pub trait InitResponse: Page {
    type Response;

    fn on_init_response(
        &self,
        state: Immutable<Self::State>,
        response: Self::Response,
    ) -> Transition<Self::State, PageMsg<Self>>;
}

/// Wraps the initial data load of an [`InitResponse`] page.
///
/// The response arrives as the inner message built by `into_msg`; the page's
/// `update` passes it on to [`respond`]. Pages that keep one slot across
/// several routes can capture [`Params::route_path`] in `into_msg` and drop
/// responses for a route they no longer show.
pub fn await_init<P: InitResponse>(
    load: impl Future<Output = P::Response> + Send + 'static,
    into_msg: impl FnOnce(P::Response) -> P::Inner + Send + 'static,
) -> Command<PageMsg<P>>
where
    P::Response: Send + 'static,
{
    Command::perform(load, move |response| Msg::Inner(into_msg(response)))
}

/// Feeds an init response to the page's hook, then marks the page ready.
pub fn respond<P: InitResponse>(
    page: &P,
    state: Immutable<P::State>,
    response: P::Response,
) -> Transition<P::State, PageMsg<P>> {
    then_update(page.on_init_response(state, response), |state| {
        (state, vec![Command::dispatch(Msg::ready())])
    })
}
