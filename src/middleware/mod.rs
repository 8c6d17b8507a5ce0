//! Middleware layer.
//!
//! A middleware sees the request before the route handler does and decides
//! whether to pass it on through [`Next`] or to answer itself. Routes opt in
//! with [`Router::on_guarded`](crate::Router::on_guarded).
//!
//! Built-in middleware:
//! - [`GameTypeGuard`] restricts a route to servers of an allowed game type.

mod game_type;

pub use game_type::GameTypeGuard;

use crate::handler::{BoxFuture, BoxedHandler};
use crate::request::Request;
use crate::response::Response;

/// Intercepts a request on its way to a handler.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Next) -> BoxFuture;
}

/// The rest of the chain after the current middleware.
pub struct Next {
    handler: BoxedHandler,
}

impl Next {
    pub(crate) fn new(handler: BoxedHandler) -> Self {
        Self { handler }
    }

    pub async fn run(self, req: Request) -> Response {
        self.handler.call(req).await
    }
}
