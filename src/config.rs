//! Service configuration.
//!
//! Loaded once at startup from a TOML file:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8080"
//!
//! [daemon]
//! timeout_ms = 5000
//!
//! [properties]
//! write_policy = "compact"    # or "preserve"
//!
//! [guard]
//! eggs = [1, 2, 3]            # game types allowed on the properties routes
//!
//! [[nodes]]
//! name = "node-1"
//! url = "http://10.0.0.2:8080"
//! token = "..."
//!
//! [[servers]]
//! id = "1a7ce997"
//! uuid = "1a7ce997-1f3c-4d27-9b35-8e6f0a51c2d4"
//! node = "node-1"
//! egg = 1
//! ```

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::properties::WritePolicy;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("server `{server}` references unknown node `{node}`")]
    UnknownNode { server: String, node: String },

    #[error("duplicate {what} `{name}`")]
    Duplicate { what: &'static str, name: String },

    #[error("daemon.timeout_ms must be greater than zero")]
    ZeroTimeout,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerSection,
    pub daemon: DaemonSection,
    pub properties: PropertiesSection,
    pub guard: GuardSection,
    pub nodes: Vec<NodeEntry>,
    pub servers: Vec<ServerEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// Address the HTTP surface listens on.
    pub bind: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { bind: SocketAddr::from(([127, 0, 0, 1], 8080)) }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonSection {
    /// Upper bound on a single daemon read or write.
    pub timeout_ms: u64,
}

impl Default for DaemonSection {
    fn default() -> Self {
        Self { timeout_ms: 5_000 }
    }
}

impl DaemonSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertiesSection {
    pub write_policy: WritePolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardSection {
    /// Egg ids whose servers carry a `server.properties` file.
    pub eggs: Vec<u32>,
}

/// A daemon node and the credentials to reach it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeEntry {
    pub name: String,
    pub url: String,
    pub token: String,
}

/// A managed game server.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerEntry {
    pub id: String,
    pub uuid: String,
    pub node: String,
    pub egg: u32,
}

impl Config {
    /// Reads and validates the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        text.parse()
    }

    /// Overrides the listen address.
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.server.bind = bind;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.daemon.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let mut names = HashSet::new();
        for node in &self.nodes {
            if !names.insert(node.name.as_str()) {
                return Err(ConfigError::Duplicate { what: "node", name: node.name.clone() });
            }
        }

        let mut ids = HashSet::new();
        for server in &self.servers {
            if !names.contains(server.node.as_str()) {
                return Err(ConfigError::UnknownNode {
                    server: server.id.clone(),
                    node: server.node.clone(),
                });
            }
            for key in [&server.id, &server.uuid] {
                if !ids.insert(key.as_str()) {
                    return Err(ConfigError::Duplicate { what: "server id", name: key.clone() });
                }
            }
        }

        if self.guard.eggs.is_empty() {
            warn!("guard.eggs is empty: every properties request will be rejected");
        }
        Ok(())
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
