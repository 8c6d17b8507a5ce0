//! Wires configuration, file store and routes into one [`Router`].

use std::sync::Arc;

use crate::api;
use crate::config::Config;
use crate::daemon::{FileStore, WingsClient};
use crate::directory::StaticDirectory;
use crate::health;
use crate::middleware::GameTypeGuard;
use crate::router::Router;
use crate::service::PropertiesService;

/// Health probes plus the guarded properties routes, reading files
/// through `store`.
pub fn router<S: FileStore>(config: &Config, store: S) -> Router {
    let directory = Arc::new(StaticDirectory::from(config.servers.as_slice()));
    let guard = GameTypeGuard::new(directory, config.guard.eggs.iter().copied());

    let service = PropertiesService::new(store)
        .with_timeout(config.daemon.timeout())
        .with_write_policy(config.properties.write_policy);

    let router = Router::new()
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness(config.nodes.len()));

    api::routes(router, Arc::new(service), guard)
}

/// [`router`] backed by the configured daemon nodes.
pub fn daemon_router(config: &Config) -> Router {
    router(config, WingsClient::new(&config.nodes))
}
