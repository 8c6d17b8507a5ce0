//! Server lookup: which daemon holds a server's files and what game it runs.

use std::collections::HashMap;

use crate::config::ServerEntry;
use crate::daemon::ServerRef;

/// What the panel knows about one managed game server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerInfo {
    /// Short identifier used in panel URLs.
    pub id: String,
    pub uuid: String,
    /// Name of the daemon node hosting the server.
    pub node: String,
    /// Game type (egg) the server was created from.
    pub egg: u32,
}

impl ServerInfo {
    /// Handle scoping file-store calls to this server.
    pub fn server_ref(&self) -> ServerRef {
        ServerRef { uuid: self.uuid.clone(), node: self.node.clone() }
    }
}

/// Resolves the `{id}` segment of a panel route to a server.
pub trait ServerDirectory: Send + Sync + 'static {
    /// Looks `id` up by short id or by full uuid.
    fn resolve(&self, id: &str) -> Option<ServerInfo>;
}

/// Directory fixed at startup from the configuration file.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    servers: Vec<ServerInfo>,
    by_key: HashMap<String, usize>,
}

impl StaticDirectory {
    pub fn new(servers: impl IntoIterator<Item = ServerInfo>) -> Self {
        let mut dir = Self::default();
        for server in servers {
            let idx = dir.servers.len();
            dir.by_key.insert(server.id.clone(), idx);
            dir.by_key.insert(server.uuid.clone(), idx);
            dir.servers.push(server);
        }
        dir
    }
}

impl From<&[ServerEntry]> for StaticDirectory {
    fn from(entries: &[ServerEntry]) -> Self {
        Self::new(entries.iter().map(|e| ServerInfo {
            id: e.id.clone(),
            uuid: e.uuid.clone(),
            node: e.node.clone(),
            egg: e.egg,
        }))
    }
}

impl ServerDirectory for StaticDirectory {
    fn resolve(&self, id: &str) -> Option<ServerInfo> {
        self.by_key.get(id).map(|&idx| self.servers[idx].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(id: &str, egg: u32) -> ServerInfo {
        ServerInfo {
            id: id.to_owned(),
            uuid: format!("{id}-0000-4000-8000-000000000000"),
            node: "node-1".to_owned(),
            egg,
        }
    }

    #[test]
    fn resolves_by_short_id_and_uuid() {
        let dir = StaticDirectory::new([info("1a7ce997", 5), info("b2c3d4e5", 15)]);

        assert_eq!(dir.resolve("1a7ce997").map(|s| s.egg), Some(5));
        assert_eq!(
            dir.resolve("b2c3d4e5-0000-4000-8000-000000000000").map(|s| s.id),
            Some("b2c3d4e5".to_owned()),
        );
        assert!(dir.resolve("missing").is_none());
    }

    #[test]
    fn server_ref_carries_uuid_and_node() {
        let r = info("1a7ce997", 1).server_ref();
        assert_eq!(r.uuid, "1a7ce997-0000-4000-8000-000000000000");
        assert_eq!(r.node, "node-1");
    }
}
