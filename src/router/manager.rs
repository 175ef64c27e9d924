use std::sync::Arc;

use super::{IncomingRoute, RouterMsg};
use crate::{
    app::{App, Msg, Shell},
    component::Dispatch,
    host::{Host, HostEvent},
    page::FrameworkMsg,
};

/// Keeps host history and the active route in step.
///
/// Router messages never reach a reducer: the process hands them here first.
/// Every navigation ends in an `incoming-route` dispatch, which starts the
/// page lifecycle in the app.
pub struct RouteManager<A: App> {
    shell: Arc<Shell<A>>,
    host: Arc<dyn Host>,
    dispatch: Dispatch<Msg<A>>,
}

impl<A: App> RouteManager<A> {
    pub fn new(shell: Arc<Shell<A>>, host: Arc<dyn Host>, dispatch: Dispatch<Msg<A>>) -> Self {
        Self { shell, host, dispatch }
    }

    /// Routes the location the host started on, replacing its history entry
    /// with the route's canonical url.
    pub fn start(&self) {
        let url = self.host.location();
        self.dispatch_url(&url, self.host.scroll_y(), true, false);
    }

    /// Performs a navigation request.
    pub fn handle(&self, msg: &RouterMsg<A::Route>) {
        match msg {
            RouterMsg::NewRoute(route) => self.dispatch_route(route.clone(), 0.0, false, false),
            RouterMsg::ReplaceRoute(route) => self.dispatch_route(route.clone(), 0.0, true, false),
            RouterMsg::NewUrl(url) => self.dispatch_url(url, 0.0, false, false),
            RouterMsg::ReplaceUrl(url) => self.dispatch_url(url, 0.0, true, false),
        }
    }

    /// Reacts to navigation the user performed outside the runtime.
    pub fn handle_event(&self, event: HostEvent) {
        match event {
            // History already points at `url`.
            HostEvent::PopState { url, scroll_y } => self.dispatch_url(&url, scroll_y, false, true),
            HostEvent::LinkClicked { url } => self.handle(&RouterMsg::NewUrl(url)),
        }
    }

    fn dispatch_url(&self, url: &str, scroll_y: f64, replace: bool, skip_history: bool) {
        let route = self.shell.router().resolve_url(url);
        self.dispatch_route(route, scroll_y, replace, skip_history);
    }

    fn dispatch_route(&self, route: A::Route, scroll_y: f64, replace: bool, skip_history: bool) {
        if !skip_history {
            let url = self.shell.router().route_to_url(&route);
            let current_scroll = self.host.scroll_y();
            if replace {
                self.host.replace_state(&url, current_scroll);
            } else {
                self.host.push_state(&url, current_scroll);
            }
            tracing::debug!(%url, replace, "history updated");
        }
        self.dispatch
            .send(Msg::Framework(FrameworkMsg::IncomingRoute(IncomingRoute { route, scroll_y })));
    }
}
