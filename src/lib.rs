//! # portal-runtime
//!
//! A Model-Update-View runtime for routed, multi-page applications.
//!
//! State lives in an [`Immutable`](immutable::Immutable) container and is
//! replaced, never mutated. Reducers are pure: they return the next state and
//! a list of [`Command`](command::Command)s describing effects, which the
//! [`Executor`](executor::Executor) runs concurrently and feeds back as
//! messages.
//!
//! ## Building blocks
//!
//! - [`Component`](component::Component): the `init` / `update` / `view`
//!   contract, with [`update_child`](component::update_child) for embedding
//!   child components.
//! - [`Page`](page::Page): a component that owns a route and derives its
//!   chrome (title, alerts, breadcrumbs, modal, actions, sidebar).
//! - [`App`](app::App): pages mounted by route into a
//!   [`Registry`](app::Registry), wrapped by [`Shell`](app::Shell), which runs
//!   the page lifecycle: incoming route, shared context, page init, page ready.
//! - [`Router`](router::Router): a total, bidirectional mapping between urls
//!   and routes.
//! - [`Process`](process::Process): the event loop, bound to a
//!   [`Host`](host::Host) that owns history and document metadata.
//!
//! ## Example
//!
//! ```
//! use portal_runtime::prelude::*;
//! use portal_runtime::{app, page::{self, Metadata, Params}, router::PathArgs};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Route {
//!     Home,
//! }
//!
//! #[derive(Clone, Default)]
//! struct Pages {
//!     home: Option<Immutable<String>>,
//! }
//!
//! struct HomePage;
//!
//! impl Page for HomePage {
//!     type Route = Route;
//!     type Shared = ();
//!     type RouteParams = ();
//!     type State = String;
//!     type Inner = ();
//!     type View = String;
//!
//!     fn init(&self, _: Params<(), ()>) -> Transition<String, PageMsg<Self>> {
//!         (Immutable::new("Welcome".to_owned()), vec![Command::dispatch(page::Msg::ready())])
//!     }
//!
//!     fn update(&self, state: Immutable<String>, _: ()) -> Transition<String, PageMsg<Self>> {
//!         (state, vec![])
//!     }
//!
//!     fn view(&self, state: &Immutable<String>, _: &Dispatch<PageMsg<Self>>) -> String {
//!         state.to_string()
//!     }
//!
//!     fn metadata(&self, state: &String) -> Metadata {
//!         Metadata::new(state.clone())
//!     }
//! }
//!
//! struct Portal {
//!     router: Router<Route>,
//!     registry: Registry<Self>,
//! }
//!
//! impl App for Portal {
//!     type Route = Route;
//!     type Shared = ();
//!     type Pages = Pages;
//!     type State = ();
//!     type Msg = ();
//!     type View = String;
//!
//!     fn router(&self) -> &Router<Route> {
//!         &self.router
//!     }
//!
//!     fn registry(&self) -> &Registry<Self> {
//!         &self.registry
//!     }
//!
//!     fn init(&self) -> ((), Vec<Command<app::Msg<Self>>>) {
//!         ((), vec![])
//!     }
//!
//!     fn view(
//!         &self,
//!         shell: &Shell<Self>,
//!         state: &Immutable<app::State<Self>>,
//!         dispatch: &Dispatch<app::Msg<Self>>,
//!     ) -> String {
//!         shell.page_view(state, dispatch).unwrap_or_default()
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let router = Router::builder().fallback(|_| Route::Home, |_| Some(PathArgs::new()));
//! let registry = Registry::<Portal>::new().mount(Mount {
//!     key: "home",
//!     page: HomePage,
//!     slot: Lens::slot(|p: &Pages| &p.home, |p| &mut p.home),
//!     route_params: |_| Some(()),
//!     wrap: |()| (),
//!     unwrap: |()| Ok(()),
//! });
//!
//! let host = std::sync::Arc::new(MemoryHost::new("/"));
//! let process = Process::builder(Portal { router, registry }).host(host).start()?;
//! let state = process.wait_for(|state| state.ready).await?;
//!
//! assert!(state.pages.home.is_some());
//! assert_eq!(process.shell().chrome(&state).metadata.title, "Welcome");
//! process.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod command;
pub mod component;
pub mod config;
pub mod executor;
pub mod host;
pub mod immutable;
pub mod logging;
pub mod page;
pub mod prelude;
pub mod process;
pub mod render;
pub mod router;
