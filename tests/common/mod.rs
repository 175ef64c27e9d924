#![allow(dead_code)]

//! A small portal used across integration tests: a landing page, a greeting
//! page that loads asynchronously, an admin page that requires a session
//! flag, a sign-in page and a not-found page.

use std::{
    future::Future,
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;
use portal_runtime::{
    app::{self, Msg, State},
    page::{self, InitResponse, Metadata, Params, Toast, Validated, invalid_init, respond, update_valid},
    prelude::*,
    router::PathArgs,
};
use ratatui::widgets::Paragraph;
use tokio::time::timeout;

pub const TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Landing,
    Hello(String),
    Admin,
    SignIn { redirect: Option<String> },
    NotFound { path: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<String>,
    pub admin: bool,
}

pub type View = Paragraph<'static>;

// Landing

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Landing {
    pub finished: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LandingMsg {
    Race,
    Finished(String),
    Announce(String),
}

pub struct LandingPage;

impl Page for LandingPage {
    type Route = Route;
    type Shared = Session;
    type RouteParams = ();
    type State = Landing;
    type Inner = LandingMsg;
    type View = View;

    fn init(&self, _: Params<(), Session>) -> Transition<Landing, PageMsg<Self>> {
        (Immutable::new(Landing::default()), vec![Command::dispatch(page::Msg::ready())])
    }

    fn update(&self, state: Immutable<Landing>, msg: LandingMsg) -> Transition<Landing, PageMsg<Self>> {
        match msg {
            LandingMsg::Race => {
                let slow = Command::delayed_dispatch(
                    Duration::from_millis(10),
                    page::Msg::Inner(LandingMsg::Finished("slow".into())),
                );
                let fast = Command::delayed_dispatch(
                    Duration::from_millis(1),
                    page::Msg::Inner(LandingMsg::Finished("fast".into())),
                );
                (state, vec![slow, fast])
            }
            LandingMsg::Finished(label) => (state.modify(|s| s.finished.push(label)), vec![]),
            LandingMsg::Announce(text) => (state, vec![Command::dispatch(page::Msg::toast(Toast::info(text, "")))]),
        }
    }

    fn view(&self, _: &Immutable<Landing>, _: &Dispatch<PageMsg<Self>>) -> View {
        Paragraph::new("Welcome")
    }

    fn metadata(&self, _: &Landing) -> Metadata {
        Metadata::new("Portal")
    }
}

// Hello

#[derive(Debug, Clone, PartialEq)]
pub struct Hello {
    pub route_path: String,
    pub name: String,
    pub greeting: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HelloMsg {
    Greeted { route_path: String, greeting: String },
    Rename(String),
}

pub struct HelloPage;

impl Page for HelloPage {
    type Route = Route;
    type Shared = Session;
    type RouteParams = String;
    type State = Hello;
    type Inner = HelloMsg;
    type View = View;

    fn init(&self, params: Params<String, Session>) -> Transition<Hello, PageMsg<Self>> {
        let Params {
            route_path,
            route_params: name,
            ..
        } = params;
        let greet = {
            let name = name.clone();
            let route_path = route_path.clone();
            page::await_init::<Self>(
                async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    format!("Hello, {name}!")
                },
                move |greeting| HelloMsg::Greeted { route_path, greeting },
            )
        };
        let state = Hello {
            route_path,
            name,
            greeting: None,
        };
        (Immutable::new(state), vec![greet])
    }

    fn update(&self, state: Immutable<Hello>, msg: HelloMsg) -> Transition<Hello, PageMsg<Self>> {
        match msg {
            HelloMsg::Greeted { route_path, .. } if route_path != state.route_path => (state, vec![]),
            HelloMsg::Greeted { greeting, .. } => respond(self, state, greeting),
            HelloMsg::Rename(name) => (state.modify(|s| s.name = name), vec![]),
        }
    }

    fn view(&self, state: &Immutable<Hello>, _: &Dispatch<PageMsg<Self>>) -> View {
        Paragraph::new(state.greeting.clone().unwrap_or_else(|| "Loading".to_owned()))
    }

    fn metadata(&self, state: &Hello) -> Metadata {
        Metadata::titled(&format!("Hello {}", state.name), "Portal")
    }
}

impl InitResponse for HelloPage {
    type Response = String;

    fn on_init_response(&self, state: Immutable<Hello>, greeting: String) -> Transition<Hello, PageMsg<Self>> {
        (state.modify(|s| s.greeting = Some(greeting)), vec![])
    }
}

// Admin

#[derive(Debug, Clone, PartialEq)]
pub struct Admin {
    pub user: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminMsg {
    Touch,
}

pub struct AdminPage;

impl Page for AdminPage {
    type Route = Route;
    type Shared = Session;
    type RouteParams = ();
    type State = Validated<Admin>;
    type Inner = AdminMsg;
    type View = View;

    fn init(&self, params: Params<(), Session>) -> Transition<Validated<Admin>, PageMsg<Self>> {
        match params.shared.user {
            Some(user) if params.shared.admin => (
                Immutable::new(Validated::valid(Admin { user })),
                vec![Command::dispatch(page::Msg::ready())],
            ),
            _ => invalid_init(Route::SignIn {
                redirect: Some("/admin".into()),
            }),
        }
    }

    fn update(&self, state: Immutable<Validated<Admin>>, msg: AdminMsg) -> Transition<Validated<Admin>, PageMsg<Self>> {
        update_valid(state, msg, |state, AdminMsg::Touch| (state, vec![]))
    }

    fn view(&self, state: &Immutable<Validated<Admin>>, _: &Dispatch<PageMsg<Self>>) -> View {
        Paragraph::new(state.with_valid(String::new(), |admin| format!("Admin: {}", admin.user)))
    }

    fn metadata(&self, state: &Validated<Admin>) -> Metadata {
        state.with_valid(Metadata::new("Portal"), |_| Metadata::titled("Admin", "Portal"))
    }
}

// Sign in

#[derive(Debug, Clone, PartialEq)]
pub struct SignIn {
    pub redirect: Option<String>,
}

pub struct SignInPage;

impl Page for SignInPage {
    type Route = Route;
    type Shared = Session;
    type RouteParams = Option<String>;
    type State = SignIn;
    type Inner = ();
    type View = View;

    fn init(&self, params: Params<Option<String>, Session>) -> Transition<SignIn, PageMsg<Self>> {
        let state = SignIn {
            redirect: params.route_params,
        };
        (Immutable::new(state), vec![Command::dispatch(page::Msg::ready())])
    }

    fn update(&self, state: Immutable<SignIn>, _: ()) -> Transition<SignIn, PageMsg<Self>> {
        (state, vec![])
    }

    fn view(&self, _: &Immutable<SignIn>, _: &Dispatch<PageMsg<Self>>) -> View {
        Paragraph::new("Sign in")
    }

    fn metadata(&self, _: &SignIn) -> Metadata {
        Metadata::titled("Sign in", "Portal")
    }
}

// Not found

#[derive(Debug, Clone, PartialEq)]
pub struct NotFound {
    pub path: String,
}

pub struct NotFoundPage;

impl Page for NotFoundPage {
    type Route = Route;
    type Shared = Session;
    type RouteParams = String;
    type State = NotFound;
    type Inner = ();
    type View = View;

    fn init(&self, params: Params<String, Session>) -> Transition<NotFound, PageMsg<Self>> {
        let state = NotFound {
            path: params.route_params,
        };
        (Immutable::new(state), vec![Command::dispatch(page::Msg::ready())])
    }

    fn update(&self, state: Immutable<NotFound>, _: ()) -> Transition<NotFound, PageMsg<Self>> {
        (state, vec![])
    }

    fn view(&self, state: &Immutable<NotFound>, _: &Dispatch<PageMsg<Self>>) -> View {
        Paragraph::new(format!("Nothing at {}", state.path))
    }

    fn metadata(&self, _: &NotFound) -> Metadata {
        Metadata::titled("Not found", "Portal")
    }
}

// App

#[derive(Debug, Clone, Default)]
pub struct Pages {
    pub landing: Option<Immutable<Landing>>,
    pub hello: Option<Immutable<Hello>>,
    pub admin: Option<Immutable<Validated<Admin>>>,
    pub sign_in: Option<Immutable<SignIn>>,
    pub not_found: Option<Immutable<NotFound>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PortalMsg {
    Landing(LandingMsg),
    Hello(HelloMsg),
    Admin(AdminMsg),
    SignIn,
    NotFound,
    /// Handled by the app itself.
    Ping,
}

pub struct Portal {
    router: Router<Route>,
    registry: Registry<Self>,
    session: Arc<Mutex<Session>>,
}

impl Portal {
    pub fn new(session: Arc<Mutex<Session>>) -> Self {
        Self {
            router: router(),
            registry: registry(),
            session,
        }
    }
}

impl App for Portal {
    type Route = Route;
    type Shared = Session;
    type Pages = Pages;
    /// How many `Ping`s the app handled.
    type State = u32;
    type Msg = PortalMsg;
    type View = View;

    fn router(&self) -> &Router<Route> {
        &self.router
    }

    fn registry(&self) -> &Registry<Self> {
        &self.registry
    }

    fn init(&self) -> (u32, Vec<Command<Msg<Self>>>) {
        (0, vec![])
    }

    fn view(&self, shell: &Shell<Self>, state: &Immutable<State<Self>>, dispatch: &Dispatch<Msg<Self>>) -> View {
        shell
            .page_view(state, dispatch)
            .unwrap_or_else(|| Paragraph::new("Loading"))
    }

    fn update(&self, state: Immutable<State<Self>>, msg: PortalMsg) -> Transition<State<Self>, Msg<Self>> {
        match msg {
            PortalMsg::Ping => {
                let pings = State::<Self>::inner_lens();
                (state.update(&pings, |n| Immutable::new(**n + 1)), vec![])
            }
            _ => (state, vec![]),
        }
    }

    fn load_shared(&self, _: &Session) -> Command<Session> {
        let session = Arc::clone(&self.session);
        Command::of(move || async move { session.lock().clone() })
    }

    fn guard(&self, shared: &Session, route: &Route) -> Option<Route> {
        match route {
            Route::SignIn { .. } if shared.user.is_some() => Some(Route::Landing),
            _ => None,
        }
    }
}

pub fn router() -> Router<Route> {
    Router::builder()
        .route("/", |_| Route::Landing, |r| (*r == Route::Landing).then(PathArgs::new))
        .and_then(|b| {
            b.route(
                "/hello/:name",
                |m| Route::Hello(m.param("name").unwrap_or_default().to_owned()),
                |r| match r {
                    Route::Hello(name) => Some(PathArgs::new().param("name", name)),
                    _ => None,
                },
            )
        })
        .and_then(|b| b.route("/admin", |_| Route::Admin, |r| (*r == Route::Admin).then(PathArgs::new)))
        .and_then(|b| {
            b.route(
                "/sign-in",
                |m| Route::SignIn {
                    redirect: m.query("redirect").map(str::to_owned),
                },
                |r| match r {
                    Route::SignIn { redirect: Some(to) } => Some(PathArgs::new().query("redirect", to)),
                    Route::SignIn { redirect: None } => Some(PathArgs::new()),
                    _ => None,
                },
            )
        })
        .expect("valid route table")
        .fallback(
            |m| Route::NotFound {
                path: m.location.path().to_owned(),
            },
            |r| match r {
                Route::NotFound { path } => Some(PathArgs::new().rest(path)),
                _ => None,
            },
        )
}

pub fn registry() -> Registry<Portal> {
    Registry::new()
        .mount(Mount {
            key: "landing",
            page: LandingPage,
            slot: Lens::slot(|p: &Pages| &p.landing, |p| &mut p.landing),
            route_params: |r| (*r == Route::Landing).then_some(()),
            wrap: PortalMsg::Landing,
            unwrap: |msg| match msg {
                PortalMsg::Landing(m) => Ok(m),
                other => Err(other),
            },
        })
        .mount(Mount {
            key: "hello",
            page: HelloPage,
            slot: Lens::slot(|p: &Pages| &p.hello, |p| &mut p.hello),
            route_params: |r| match r {
                Route::Hello(name) => Some(name.clone()),
                _ => None,
            },
            wrap: PortalMsg::Hello,
            unwrap: |msg| match msg {
                PortalMsg::Hello(m) => Ok(m),
                other => Err(other),
            },
        })
        .mount(Mount {
            key: "admin",
            page: AdminPage,
            slot: Lens::slot(|p: &Pages| &p.admin, |p| &mut p.admin),
            route_params: |r| (*r == Route::Admin).then_some(()),
            wrap: PortalMsg::Admin,
            unwrap: |msg| match msg {
                PortalMsg::Admin(m) => Ok(m),
                other => Err(other),
            },
        })
        .mount(Mount {
            key: "sign-in",
            page: SignInPage,
            slot: Lens::slot(|p: &Pages| &p.sign_in, |p| &mut p.sign_in),
            route_params: |r| match r {
                Route::SignIn { redirect } => Some(redirect.clone()),
                _ => None,
            },
            wrap: |()| PortalMsg::SignIn,
            unwrap: |msg| match msg {
                PortalMsg::SignIn => Ok(()),
                other => Err(other),
            },
        })
        .mount(Mount {
            key: "not-found",
            page: NotFoundPage,
            slot: Lens::slot(|p: &Pages| &p.not_found, |p| &mut p.not_found),
            route_params: |r| match r {
                Route::NotFound { path } => Some(path.clone()),
                _ => None,
            },
            wrap: |()| PortalMsg::NotFound,
            unwrap: |msg| match msg {
                PortalMsg::NotFound => Ok(()),
                other => Err(other),
            },
        })
}

pub struct Harness {
    pub process: Process<Portal>,
    pub host: Arc<MemoryHost>,
    pub session: Arc<Mutex<Session>>,
}

pub fn start(url: &str, session: Session) -> Harness {
    start_with(url, session, Config::default())
}

pub fn start_with(url: &str, session: Session, config: Config) -> Harness {
    let host = Arc::new(MemoryHost::new(url));
    let session = Arc::new(Mutex::new(session));
    let process = Process::builder(Portal::new(Arc::clone(&session)))
        .host(host.clone())
        .config(config)
        .start()
        .expect("inside a tokio runtime");
    Harness { process, host, session }
}

impl Harness {
    /// Waits for the app to settle on `route`.
    pub async fn settled_on(&self, route: Route) -> Immutable<State<Portal>> {
        self.until(move |s| s.ready && s.incoming_route.is_none() && s.active_route == route)
            .await
    }

    pub async fn until(&self, pred: impl FnMut(&Immutable<State<Portal>>) -> bool) -> Immutable<State<Portal>> {
        within(self.process.wait_for(pred))
            .await
            .expect("process stopped")
    }

    pub fn send(&self, msg: PortalMsg) {
        self.process.send(app::Msg::Inner(msg));
    }
}

pub async fn within<T>(future: impl Future<Output = T>) -> T {
    timeout(TIMEOUT, future).await.expect("timed out")
}

pub fn signed_in(admin: bool) -> Session {
    Session {
        user: Some("alice".into()),
        admin,
    }
}
