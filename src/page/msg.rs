use super::Toast;
use crate::router::{IncomingRoute, RouterMsg};

/// Messages every page understands, handled by the app layer.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameworkMsg<R> {
    /// The page finished loading its initial data.
    Ready,
    IncomingRoute(IncomingRoute<R>),
    /// Re-initialize the active route.
    Reload,
    ShowToast(Toast),
    CloseModal,
    Router(RouterMsg<R>),
}

/// A page's message type: its own inner messages plus [`FrameworkMsg`].
#[derive(Debug, Clone, PartialEq)]
pub enum Msg<I, R> {
    Inner(I),
    Framework(FrameworkMsg<R>),
}

impl<I, R> Msg<I, R> {
    pub fn ready() -> Self {
        Self::Framework(FrameworkMsg::Ready)
    }

    pub fn reload() -> Self {
        Self::Framework(FrameworkMsg::Reload)
    }

    pub fn toast(toast: Toast) -> Self {
        Self::Framework(FrameworkMsg::ShowToast(toast))
    }

    pub fn close_modal() -> Self {
        Self::Framework(FrameworkMsg::CloseModal)
    }

    pub fn new_route(route: R) -> Self {
        Self::Framework(FrameworkMsg::Router(RouterMsg::NewRoute(route)))
    }

    pub fn replace_route(route: R) -> Self {
        Self::Framework(FrameworkMsg::Router(RouterMsg::ReplaceRoute(route)))
    }

    pub fn new_url(url: impl Into<String>) -> Self {
        Self::Framework(FrameworkMsg::Router(RouterMsg::NewUrl(url.into())))
    }

    pub fn replace_url(url: impl Into<String>) -> Self {
        Self::Framework(FrameworkMsg::Router(RouterMsg::ReplaceUrl(url.into())))
    }

    /// Maps the inner message, leaving framework messages untouched.
    pub fn map<J>(self, f: impl FnOnce(I) -> J) -> Msg<J, R> {
        match self {
            Self::Inner(inner) => Msg::Inner(f(inner)),
            Self::Framework(msg) => Msg::Framework(msg),
        }
    }
}

impl<I, R> From<FrameworkMsg<R>> for Msg<I, R> {
    fn from(msg: FrameworkMsg<R>) -> Self {
        Self::Framework(msg)
    }
}
