//! Route guard for game-specific endpoints.
//!
//! The properties routes only make sense for servers whose game keeps a
//! `server.properties` file. The guard resolves `{id}` and checks the
//! server's egg against an allowlist; anything else looks like a missing
//! route to the caller.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::directory::ServerDirectory;
use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

const NOT_MINECRAFT: &str = "The requested server is not a minecraft server!";

/// Lets a request through only when `{id}` names a known server of an
/// allowed game type. On success the resolved
/// [`ServerInfo`](crate::directory::ServerInfo) is attached to the request.
#[derive(Clone)]
pub struct GameTypeGuard {
    directory: Arc<dyn ServerDirectory>,
    eggs: Arc<HashSet<u32>>,
}

impl GameTypeGuard {
    pub fn new(directory: Arc<dyn ServerDirectory>, eggs: impl IntoIterator<Item = u32>) -> Self {
        Self { directory, eggs: Arc::new(eggs.into_iter().collect()) }
    }

    pub fn allows(&self, egg: u32) -> bool {
        self.eggs.contains(&egg)
    }
}

impl Middleware for GameTypeGuard {
    fn handle(&self, mut req: Request, next: Next) -> BoxFuture {
        let resolved = req.param("id").and_then(|id| self.directory.resolve(id));

        let server = match resolved {
            Some(server) => server,
            None => {
                debug!(path = %req.path(), "guard: unknown server");
                return Box::pin(async { not_found("not_found", "The requested server does not exist.") });
            }
        };

        if !self.allows(server.egg) {
            debug!(server = %server.id, egg = server.egg, "guard: game type not allowed");
            return Box::pin(async { not_found("not_minecraft", NOT_MINECRAFT) });
        }

        req.insert_extension(server);
        Box::pin(next.run(req))
    }
}

fn not_found(error: &str, message: &str) -> Response {
    Response::builder()
        .status(Status::NotFound)
        .json_value(&json!({ "success": false, "error": error, "message": message }))
}
