//! Unified error type.

use thiserror::Error as ThisError;

use crate::config::ConfigError;

/// The error type returned by mcprops' infrastructure operations.
///
/// Request-level failures (404, 422, 502, ...) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// what stops the process from serving at all: loading configuration,
/// binding a port, accepting connections.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}
