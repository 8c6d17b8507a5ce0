//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Guarded routes carry
//! their middleware inside the stored handler, so lookup stays the same.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler, Layered};
use crate::method::Method;
use crate::middleware::Middleware;

/// Outcome of routing one request.
pub(crate) enum Route {
    Found(BoxedHandler, HashMap<String, String>),
    /// The path exists, but not for this method.
    MethodNotAllowed,
    NotFound,
}

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Registration methods return `self` so they chain.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics on a malformed or conflicting path. Routes are fixed at
    /// startup, so this surfaces as a programming error before serving.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, handler.into_boxed_handler())
    }

    /// Register a handler that only runs after `middleware` lets the
    /// request through.
    pub fn on_guarded(
        self,
        method: Method,
        path: &str,
        middleware: impl Middleware,
        handler: impl Handler,
    ) -> Self {
        let layered = Layered { middleware, inner: handler.into_boxed_handler() };
        self.add(method, path, Arc::new(layered))
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    fn add(mut self, method: Method, path: &str, handler: BoxedHandler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Route {
        if let Some(tree) = self.routes.get(&method) {
            if let Ok(matched) = tree.at(path) {
                let handler = Arc::clone(matched.value);
                let params = matched.params.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                return Route::Found(handler, params);
            }
        }
        if self.allows_other_method(method, path) {
            Route::MethodNotAllowed
        } else {
            Route::NotFound
        }
    }

    /// Whether `path` is routed for any method other than `method`.
    fn allows_other_method(&self, method: Method, path: &str) -> bool {
        self.routes.iter()
            .any(|(m, tree)| *m != method && tree.at(path).is_ok())
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
