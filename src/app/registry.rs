use super::{App, Msg, State};
use crate::{
    command::{Command, map_many},
    component::{Dispatch, Transition, update_child},
    immutable::{Immutable, Lens},
    page::{self, Chrome, Page, PageMsg, Params, SidebarView},
    router::Router,
};

/// How a page is attached to an app.
///
/// `slot` addresses the page's state inside `A::Pages`. `route_params`
/// accepts the routes this page serves and extracts its parameters. `wrap`
/// and `unwrap` move inner page messages in and out of the app's own message
/// type.
pub struct Mount<A: App, P: Page> {
    /// Identifies the page. Navigating between routes with the same key keeps
    /// the page slot in place until the new state replaces it.
    pub key: &'static str,
    pub page: P,
    pub slot: Lens<A::Pages, Immutable<P::State>>,
    pub route_params: fn(&A::Route) -> Option<P::RouteParams>,
    pub wrap: fn(P::Inner) -> A::Msg,
    pub unwrap: fn(A::Msg) -> Result<P::Inner, A::Msg>,
}

trait Mounted<A: App>: Send + Sync {
    fn key(&self) -> &'static str;

    fn serves(&self, route: &A::Route) -> bool;

    fn init(
        &self,
        router: &Router<A::Route>,
        state: Immutable<State<A>>,
        route: &A::Route,
    ) -> Option<Transition<State<A>, Msg<A>>>;

    fn update(&self, state: Immutable<State<A>>, msg: A::Msg) -> Result<Transition<State<A>, Msg<A>>, A::Msg>;

    fn clear(&self, state: Immutable<State<A>>) -> Immutable<State<A>>;

    fn chrome(&self, state: &State<A>) -> Option<Chrome<Msg<A>>>;

    fn view(&self, state: &State<A>, dispatch: &Dispatch<Msg<A>>) -> Option<A::View>;

    fn sidebar(&self, state: &State<A>, dispatch: &Dispatch<Msg<A>>) -> Option<SidebarView<A::View>>;
}

fn lift<A, P>(wrap: fn(P::Inner) -> A::Msg) -> impl Fn(PageMsg<P>) -> Msg<A> + Send + Sync + 'static
where
    A: App,
    P: Page<Route = A::Route>,
{
    move |msg| Msg::from_page(msg, wrap)
}

struct Entry<A: App, P: Page> {
    mount: Mount<A, P>,
    path: Lens<State<A>, Immutable<P::State>>,
}

impl<A, P> Entry<A, P>
where
    A: App,
    P: Page<Route = A::Route, Shared = A::Shared, View = A::View>,
{
    fn page_state<'a>(&self, state: &'a State<A>) -> Option<&'a Immutable<P::State>> {
        state.pages.get(&self.mount.slot)
    }
}

impl<A, P> Mounted<A> for Entry<A, P>
where
    A: App,
    P: Page<Route = A::Route, Shared = A::Shared, View = A::View>,
{
    fn key(&self) -> &'static str {
        self.mount.key
    }

    fn serves(&self, route: &A::Route) -> bool {
        (self.mount.route_params)(route).is_some()
    }

    fn init(
        &self,
        router: &Router<A::Route>,
        state: Immutable<State<A>>,
        route: &A::Route,
    ) -> Option<Transition<State<A>, Msg<A>>> {
        let route_params = (self.mount.route_params)(route)?;
        let params = Params::new(router.route_to_url(route), route_params, state.shared.clone());
        let (page_state, cmds) = self.mount.page.init(params);
        let metadata = self.mount.page.metadata(&page_state);

        let next = state.set_in(&self.path, page_state);
        let mut cmds = map_many(cmds, lift::<A, P>(self.mount.wrap));
        cmds.push(Command::set_page_metadata(metadata));
        Some((next, cmds))
    }

    fn update(&self, state: Immutable<State<A>>, msg: A::Msg) -> Result<Transition<State<A>, Msg<A>>, A::Msg> {
        let inner = (self.mount.unwrap)(msg)?;
        let page = &self.mount.page;
        let (next, mut cmds) = update_child(state, &self.path, |s, m| page.update(s, m), inner, lift::<A, P>(self.mount.wrap));
        if let Some(page_state) = next.get_in(&self.path) {
            cmds.push(Command::set_page_metadata(page.metadata(page_state)));
        }
        Ok((next, cmds))
    }

    fn clear(&self, state: Immutable<State<A>>) -> Immutable<State<A>> {
        state.remove(&self.path)
    }

    fn chrome(&self, state: &State<A>) -> Option<Chrome<Msg<A>>> {
        let page_state = self.page_state(state)?;
        Some(page::chrome(&self.mount.page, page_state).map(lift::<A, P>(self.mount.wrap)))
    }

    fn view(&self, state: &State<A>, dispatch: &Dispatch<Msg<A>>) -> Option<A::View> {
        let page_state = self.page_state(state)?;
        let dispatch = dispatch.map(lift::<A, P>(self.mount.wrap));
        Some(self.mount.page.view(page_state, &dispatch))
    }

    fn sidebar(&self, state: &State<A>, dispatch: &Dispatch<Msg<A>>) -> Option<SidebarView<A::View>> {
        let sidebar = self.mount.page.sidebar()?;
        let page_state = self.page_state(state)?;
        let dispatch = dispatch.map(lift::<A, P>(self.mount.wrap));
        Some(sidebar.render(&self.mount.page, page_state, &dispatch))
    }
}

/// The pages of an app, matched against routes in registration order.
pub struct Registry<A: App> {
    entries: Vec<Box<dyn Mounted<A>>>,
}

impl<A: App> Registry<A> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn mount<P>(mut self, mount: Mount<A, P>) -> Self
    where
        P: Page<Route = A::Route, Shared = A::Shared, View = A::View>,
    {
        let path = State::<A>::pages_lens().then(mount.slot.clone());
        self.entries.push(Box::new(Entry { mount, path }));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The key of the page serving `route`.
    pub fn key(&self, route: &A::Route) -> Option<&'static str> {
        self.find(route).map(|entry| entry.key())
    }

    fn find(&self, route: &A::Route) -> Option<&dyn Mounted<A>> {
        self.entries
            .iter()
            .find(|entry| entry.serves(route))
            .map(|entry| &**entry)
    }

    pub(crate) fn init(
        &self,
        router: &Router<A::Route>,
        state: Immutable<State<A>>,
        route: &A::Route,
    ) -> Option<Transition<State<A>, Msg<A>>> {
        self.find(route)?.init(router, state, route)
    }

    /// Offers `msg` to each page in turn. Returns the message if none took it.
    pub(crate) fn update(
        &self,
        state: Immutable<State<A>>,
        msg: A::Msg,
    ) -> Result<Transition<State<A>, Msg<A>>, A::Msg> {
        let mut msg = msg;
        for entry in &self.entries {
            match entry.update(state.clone(), msg) {
                Ok(transition) => return Ok(transition),
                Err(unclaimed) => msg = unclaimed,
            }
        }
        Err(msg)
    }

    pub(crate) fn clear(&self, state: Immutable<State<A>>, route: &A::Route) -> Immutable<State<A>> {
        match self.find(route) {
            Some(entry) => entry.clear(state),
            None => state,
        }
    }

    pub(crate) fn chrome(&self, state: &State<A>, route: &A::Route) -> Option<Chrome<Msg<A>>> {
        self.find(route)?.chrome(state)
    }

    pub(crate) fn view(&self, state: &State<A>, route: &A::Route, dispatch: &Dispatch<Msg<A>>) -> Option<A::View> {
        self.find(route)?.view(state, dispatch)
    }

    pub(crate) fn sidebar(
        &self,
        state: &State<A>,
        route: &A::Route,
        dispatch: &Dispatch<Msg<A>>,
    ) -> Option<SidebarView<A::View>> {
        self.find(route)?.sidebar(state, dispatch)
    }
}

impl<A: App> Default for Registry<A> {
    fn default() -> Self {
        Self::new()
    }
}
