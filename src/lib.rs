//! # mcprops
//!
//! Reads and edits `server.properties` for game servers whose files live on
//! remote daemons, and serves that over a small HTTP surface for a panel.
//!
//! ## What lives where
//!
//! - [`properties`]: the `KEY=VALUE` document model (parse, patch, write).
//! - [`service`]: list and update operations against a [`FileStore`], with
//!   validation, a per-call timeout and the read-degrades-to-empty policy.
//! - [`daemon`]: the [`FileStore`] trait and its HTTP implementation.
//! - [`api`]: the `GET`/`PUT /servers/{id}/minecraft/properties` handlers,
//!   guarded by [`middleware::GameTypeGuard`].
//! - [`accessor`]: the client side, with per-key debounced edits.
//! - A minimal HTTP layer: [`Router`], [`Server`], [`Request`], [`Response`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use mcprops::{Config, Server, app};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mcprops::Error> {
//!     let config = Config::load("mcprops.toml")?;
//!     let router = app::daemon_router(&config);
//!
//!     Server::bind(config.server.bind).await?.serve(router).await
//! }
//! ```

mod client;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod accessor;
pub mod api;
pub mod app;
pub mod config;
pub mod daemon;
pub mod directory;
pub mod health;
pub mod middleware;
pub mod properties;
pub mod service;

pub use config::Config;
pub use daemon::{FileStore, RemoteError, ServerRef, WingsClient};
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use properties::{PropertiesDocument, PropertyRecord, WritePolicy};
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use router::Router;
pub use server::Server;
pub use service::{PropertiesService, UpdateError, ValidationError};
pub use status::Status;
