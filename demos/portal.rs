//! A headless two-page portal.
//!
//! Loads a list of opportunities, opens one, goes back, and prints each screen
//! as drawn by the terminal renderer.
//!
//! ```sh
//! RUST_LOG=portal_runtime=debug cargo run --example portal
//! ```

use std::{sync::Arc, time::Duration};

use portal_runtime::{
    app::{self, State},
    logging,
    page::{self, Breadcrumb, Breadcrumbs, InitResponse, Metadata, Params, PageMsg, respond},
    prelude::*,
    render::TerminalRenderer,
    router::PathArgs,
};
use ratatui::{backend::TestBackend, text::Text, widgets::Paragraph};

#[derive(Debug, Clone, PartialEq)]
enum Route {
    Opportunities,
    Opportunity(u32),
    NotFound(String),
}

type View = Paragraph<'static>;

#[derive(Debug, Clone)]
struct Opportunity {
    id: u32,
    title: String,
}

async fn fetch_opportunities() -> Vec<Opportunity> {
    tokio::time::sleep(Duration::from_millis(20)).await;
    ["Website redesign", "Food bank drivers", "Trail cleanup"]
        .into_iter()
        .zip(1..)
        .map(|(title, id)| Opportunity {
            id,
            title: title.to_owned(),
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
struct Listing {
    items: Option<Vec<Opportunity>>,
}

#[derive(Debug)]
enum ListingMsg {
    Loaded(Vec<Opportunity>),
}

struct ListingPage;

impl Page for ListingPage {
    type Route = Route;
    type Shared = ();
    type RouteParams = ();
    type State = Listing;
    type Inner = ListingMsg;
    type View = View;

    fn init(&self, _: Params<(), ()>) -> Transition<Listing, PageMsg<Self>> {
        let load = page::await_init::<Self>(fetch_opportunities(), ListingMsg::Loaded);
        (Immutable::new(Listing::default()), vec![load])
    }

    fn update(&self, state: Immutable<Listing>, msg: ListingMsg) -> Transition<Listing, PageMsg<Self>> {
        match msg {
            ListingMsg::Loaded(items) => respond(self, state, items),
        }
    }

    fn view(&self, state: &Immutable<Listing>, _: &Dispatch<PageMsg<Self>>) -> View {
        let lines: Vec<String> = match &state.items {
            Some(items) => items.iter().map(|o| format!("#{} {}", o.id, o.title)).collect(),
            None => vec!["Loading...".to_owned()],
        };
        Paragraph::new(Text::from(lines.join("\n")))
    }

    fn metadata(&self, state: &Listing) -> Metadata {
        let count = state.items.as_ref().map_or(0, Vec::len);
        Metadata::titled(&format!("{count} opportunities"), "Portal")
    }
}

impl InitResponse for ListingPage {
    type Response = Vec<Opportunity>;

    fn on_init_response(&self, state: Immutable<Listing>, items: Vec<Opportunity>) -> Transition<Listing, PageMsg<Self>> {
        (state.modify(|s| s.items = Some(items)), vec![])
    }
}

struct DetailPage;

impl Page for DetailPage {
    type Route = Route;
    type Shared = ();
    type RouteParams = u32;
    type State = u32;
    type Inner = ();
    type View = View;

    fn init(&self, params: Params<u32, ()>) -> Transition<u32, PageMsg<Self>> {
        (Immutable::new(params.route_params), vec![Command::dispatch(page::Msg::ready())])
    }

    fn update(&self, state: Immutable<u32>, _: ()) -> Transition<u32, PageMsg<Self>> {
        (state, vec![])
    }

    fn view(&self, state: &Immutable<u32>, _: &Dispatch<PageMsg<Self>>) -> View {
        Paragraph::new(format!("Opportunity #{}", **state))
    }

    fn metadata(&self, state: &u32) -> Metadata {
        Metadata::titled(&format!("Opportunity #{state}"), "Portal")
    }

    fn breadcrumbs(&self, _: &u32) -> Breadcrumbs<PageMsg<Self>> {
        vec![
            Breadcrumb::link("Opportunities", page::Msg::new_route(Route::Opportunities)),
            Breadcrumb::new("Details"),
        ]
    }
}

#[derive(Clone, Default)]
struct Pages {
    listing: Option<Immutable<Listing>>,
    detail: Option<Immutable<u32>>,
}

#[derive(Debug)]
enum PortalMsg {
    Listing(ListingMsg),
    Detail,
}

struct Portal {
    router: Router<Route>,
    registry: Registry<Self>,
}

impl App for Portal {
    type Route = Route;
    type Shared = ();
    type Pages = Pages;
    type State = ();
    type Msg = PortalMsg;
    type View = View;

    fn router(&self) -> &Router<Route> {
        &self.router
    }

    fn registry(&self) -> &Registry<Self> {
        &self.registry
    }

    fn init(&self) -> ((), Vec<Command<app::Msg<Self>>>) {
        ((), vec![])
    }

    fn view(&self, shell: &Shell<Self>, state: &Immutable<State<Self>>, dispatch: &Dispatch<app::Msg<Self>>) -> View {
        shell
            .page_view(state, dispatch)
            .unwrap_or_else(|| Paragraph::new("Loading..."))
    }
}

fn portal() -> color_eyre::Result<Portal> {
    let router = Router::builder()
        .route("/", |_| Route::Opportunities, |r| (*r == Route::Opportunities).then(PathArgs::new))?
        .route(
            "/opportunities/:id",
            |m| match m.param("id").and_then(|id| id.parse().ok()) {
                Some(id) => Route::Opportunity(id),
                None => Route::NotFound(m.location.path().to_owned()),
            },
            |r| match r {
                Route::Opportunity(id) => Some(PathArgs::new().param("id", id.to_string())),
                _ => None,
            },
        )?
        .fallback(
            |m| Route::NotFound(m.location.path().to_owned()),
            |r| match r {
                Route::NotFound(path) => Some(PathArgs::new().rest(path)),
                _ => None,
            },
        );

    let registry = Registry::<Portal>::new()
        .mount(Mount {
            key: "listing",
            page: ListingPage,
            slot: Lens::slot(|p: &Pages| &p.listing, |p| &mut p.listing),
            route_params: |r| (*r == Route::Opportunities).then_some(()),
            wrap: PortalMsg::Listing,
            unwrap: |msg| match msg {
                PortalMsg::Listing(m) => Ok(m),
                other => Err(other),
            },
        })
        .mount(Mount {
            key: "detail",
            page: DetailPage,
            slot: Lens::slot(|p: &Pages| &p.detail, |p| &mut p.detail),
            route_params: |r| match r {
                Route::Opportunity(id) => Some(*id),
                _ => None,
            },
            wrap: |()| PortalMsg::Detail,
            unwrap: |msg| match msg {
                PortalMsg::Detail => Ok(()),
                other => Err(other),
            },
        });

    Ok(Portal { router, registry })
}

fn print_screen(renderer: &TerminalRenderer<TestBackend>, title: &str) {
    let screen = renderer.with_terminal(|terminal| {
        let buffer = terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    });
    println!("== {title}\n{screen}\n");
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = Config::default();
    logging::init_tracing(&config);

    let host = Arc::new(MemoryHost::new("/"));
    let renderer = Arc::new(TerminalRenderer::new(TestBackend::new(40, 4))?);
    let process = Process::builder(portal()?)
        .host(host.clone())
        .config(config)
        .renderer(renderer.clone())
        .start()?;

    process.wait_for(|s| s.ready).await?;
    print_screen(&renderer, &host.title());

    process.send(app::Msg::new_route(Route::Opportunity(2)));
    process.wait_for(|s| s.ready && s.active_route == Route::Opportunity(2)).await?;
    let state = process.state();
    let crumbs: Vec<_> = process.shell().chrome(&state).breadcrumbs.into_iter().map(|b| b.text).collect();
    print_screen(&renderer, &crumbs.join(" / "));

    host.back();
    process.wait_for(|s| s.ready && s.incoming_route.is_none() && s.active_route == Route::Opportunities).await?;
    print_screen(&renderer, &host.location());

    process.shutdown().await;
    Ok(())
}
