//! Route tables, path matching and navigation messages.
//!
//! A [`Router`] maps between locations and an application-defined route type.
//! Each entry pairs a [`Pattern`] with a constructor (matched parameters to
//! route) and a serializer (route to [`PathArgs`]), which the router fills into
//! the entry's own pattern. The table is total: a location nothing matches
//! resolves through the fallback entry, typically a "not found" route.
//!
//! # Examples
//!
//! ```
//! use portal_runtime::router::{PathArgs, Router};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Route {
//!     Hello(String),
//!     NotFound(String),
//! }
//!
//! let router = Router::builder()
//!     .route(
//!         "/hello/:name",
//!         |m| Route::Hello(m.param("name").unwrap_or_default().to_owned()),
//!         |r| match r {
//!             Route::Hello(name) => Some(PathArgs::new().param("name", name)),
//!             _ => None,
//!         },
//!     )
//!     .unwrap()
//!     .fallback(
//!         |m| Route::NotFound(m.location.path().to_owned()),
//!         |r| match r {
//!             Route::NotFound(path) => Some(PathArgs::new().rest(path)),
//!             _ => None,
//!         },
//!     );
//!
//! let route = router.resolve_url("/hello/Alice");
//! assert_eq!(route, Route::Hello("Alice".into()));
//! assert_eq!(router.route_to_url(&route), "/hello/Alice");
//! assert_eq!(router.resolve_url("/zzz"), Route::NotFound("/zzz".into()));
//! ```

mod location;
mod manager;
mod pattern;

use std::{collections::HashMap, fmt};

pub use location::{Location, decode_segment, encode_segment};
pub use manager::RouteManager;
pub use pattern::{Pattern, REST};

/// Errors raised while building a route table or parsing a location.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid url `{input}`")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },
}

/// A navigable location as a closed, application-defined value.
pub trait Route: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

impl<T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static> Route for T {}

/// A route about to become active, with the scroll position to restore.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingRoute<R> {
    pub route: R,
    pub scroll_y: f64,
}

impl<R> IncomingRoute<R> {
    pub fn new(route: R) -> Self {
        Self { route, scroll_y: 0.0 }
    }
}

/// Navigation requests handled by the route manager before reducers see them.
#[derive(Debug, Clone, PartialEq)]
pub enum RouterMsg<R> {
    NewRoute(R),
    ReplaceRoute(R),
    NewUrl(String),
    ReplaceUrl(String),
}

/// The parameters and query a location matched with.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub location: &'a Location,
    params: HashMap<String, String>,
}

impl RouteMatch<'_> {
    /// A decoded `:name` parameter, or the rest of the path for [`REST`].
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.location.query(key)
    }
}

/// Values to substitute into a pattern when serializing a route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathArgs {
    params: Vec<(String, String)>,
    query: Vec<(String, String)>,
}

impl PathArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// The remainder for a trailing `*`. Leading slashes are ignored.
    pub fn rest(self, path: impl Into<String>) -> Self {
        self.param(REST, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub(crate) fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

type Make<R> = Box<dyn Fn(&RouteMatch<'_>) -> R + Send + Sync>;
type ToPath<R> = Box<dyn Fn(&R) -> Option<PathArgs> + Send + Sync>;

struct Entry<R> {
    pattern: Pattern,
    make: Make<R>,
    serialize: ToPath<R>,
}

impl<R> Entry<R> {
    fn url(&self, args: PathArgs) -> String {
        let path = self.pattern.fill(&args);
        Location::from_parts(path, args.query).to_string()
    }
}

/// Collects route entries. Finish with [`RouterBuilder::fallback`].
pub struct RouterBuilder<R> {
    entries: Vec<Entry<R>>,
}

impl<R: Route> RouterBuilder<R> {
    /// Adds an entry. Entries are tried in declaration order.
    pub fn route(
        mut self,
        pattern: &str,
        make: impl Fn(&RouteMatch<'_>) -> R + Send + Sync + 'static,
        serialize: impl Fn(&R) -> Option<PathArgs> + Send + Sync + 'static,
    ) -> Result<Self, RouteError> {
        self.entries.push(Entry {
            pattern: Pattern::parse(pattern)?,
            make: Box::new(make),
            serialize: Box::new(serialize),
        });
        Ok(self)
    }

    /// Completes the table with the entry used when nothing else matches.
    ///
    /// The fallback pattern is `/*`: its serializer should return the rest of
    /// the path via [`PathArgs::rest`].
    pub fn fallback(
        self,
        make: impl Fn(&RouteMatch<'_>) -> R + Send + Sync + 'static,
        serialize: impl Fn(&R) -> Option<PathArgs> + Send + Sync + 'static,
    ) -> Router<R> {
        let fallback = Entry {
            pattern: Pattern::catch_all(),
            make: Box::new(make),
            serialize: Box::new(serialize),
        };
        Router {
            entries: self.entries,
            fallback,
        }
    }
}

/// A total, bidirectional route table.
pub struct Router<R> {
    entries: Vec<Entry<R>>,
    fallback: Entry<R>,
}

impl<R: Route> Router<R> {
    pub fn builder() -> RouterBuilder<R> {
        RouterBuilder { entries: Vec::new() }
    }

    /// Resolves a location. Never fails: unmatched paths use the fallback.
    pub fn resolve(&self, location: &Location) -> R {
        let segments = location.segments();
        for entry in &self.entries {
            if let Some(params) = entry.pattern.matches(&segments) {
                return (entry.make)(&RouteMatch { location, params });
            }
        }
        let params = self.fallback.pattern.matches(&segments).unwrap_or_default();
        (self.fallback.make)(&RouteMatch { location, params })
    }

    /// Parses and resolves a url. Unparseable input resolves through the fallback.
    pub fn resolve_url(&self, url: &str) -> R {
        match Location::parse(url) {
            Ok(location) => self.resolve(&location),
            Err(err) => {
                tracing::warn!(url, error = %err, "unparseable url routed to fallback");
                let location = Location::from_parts(url.to_owned(), Vec::new());
                (self.fallback.make)(&RouteMatch {
                    location: &location,
                    params: HashMap::new(),
                })
            }
        }
    }

    /// Serializes a route with the first entry that accepts it.
    ///
    /// A route no entry accepts serializes to `/`.
    pub fn route_to_url(&self, route: &R) -> String {
        self.entries
            .iter()
            .chain(std::iter::once(&self.fallback))
            .find_map(|entry| (entry.serialize)(route).map(|args| entry.url(args)))
            .unwrap_or_else(|| {
                tracing::warn!(?route, "route has no serializer");
                "/".to_owned()
            })
    }

    /// Declared patterns, in matching order, excluding the fallback.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.pattern.as_str())
    }
}

impl<R> fmt::Debug for Router<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field(
                "patterns",
                &self.entries.iter().map(|e| e.pattern.as_str()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
