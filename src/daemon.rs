//! Remote file store: the game daemon that owns each server's files.
//!
//! The panel never keeps a copy of `server.properties`; every read and
//! write goes to the daemon node hosting the server, addressed by a
//! [`ServerRef`] passed explicitly with each call.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use thiserror::Error;
use tracing::debug;

use crate::client::{HttpClient, join_url};
use crate::config::NodeEntry;

/// Scopes a file operation to one managed server on one daemon node.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ServerRef {
    pub uuid: String,
    pub node: String,
}

/// Why a call to the file store failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The daemon could not be reached or the transfer broke off.
    #[error("daemon unavailable: {0}")]
    Unavailable(String),

    /// The daemon answered with a non-success status (missing file,
    /// rejected token, ...).
    #[error("daemon returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The server references a node the panel has no address for.
    #[error("unknown daemon node `{0}`")]
    UnknownNode(String),

    /// The file is not valid UTF-8 text.
    #[error("file is not valid UTF-8")]
    NotText,

    #[error("daemon call timed out after {0:?}")]
    Timeout(Duration),
}

impl RemoteError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RemoteError::Timeout(_))
    }
}

/// Text file access on a daemon.
pub trait FileStore: Send + Sync + 'static {
    /// Reads `file` in full.
    fn get_content(
        &self,
        server: &ServerRef,
        file: &str,
    ) -> impl Future<Output = Result<String, RemoteError>> + Send;

    /// Replaces `file` with `content`.
    fn put_content(
        &self,
        server: &ServerRef,
        file: &str,
        content: String,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

#[derive(Clone, Debug)]
struct Node {
    url: String,
    token: String,
}

/// [`FileStore`] backed by the daemons' HTTP file API.
///
/// - read:  `GET  {node}/api/servers/{uuid}/files/contents?file={file}`
/// - write: `POST {node}/api/servers/{uuid}/files/write?file={file}`
///
/// Both carry the node's bearer token.
#[derive(Clone)]
pub struct WingsClient {
    nodes: HashMap<String, Node>,
    http: HttpClient,
}

impl WingsClient {
    pub fn new<'a>(nodes: impl IntoIterator<Item = &'a NodeEntry>) -> Self {
        let nodes = nodes.into_iter()
            .map(|n| (n.name.clone(), Node { url: n.url.clone(), token: n.token.clone() }))
            .collect();
        Self { nodes, http: HttpClient::new() }
    }

    fn node(&self, server: &ServerRef) -> Result<&Node, RemoteError> {
        self.nodes.get(&server.node)
            .ok_or_else(|| RemoteError::UnknownNode(server.node.clone()))
    }

    fn request(
        &self,
        method: http::Method,
        server: &ServerRef,
        action: &str,
        file: &str,
        body: Bytes,
    ) -> Result<http::Request<Full<Bytes>>, RemoteError> {
        let node = self.node(server)?;
        let uri = join_url(
            &node.url,
            &format!("api/servers/{}/files/{action}?file={file}", server.uuid),
        );
        http::Request::builder()
            .method(method)
            .uri(&uri)
            .header("authorization", format!("Bearer {}", node.token))
            .header("accept", "application/json")
            .body(Full::new(body))
            .map_err(|e| RemoteError::Unavailable(format!("building request for {uri}: {e}")))
    }

    async fn call(&self, req: http::Request<Full<Bytes>>) -> Result<Bytes, RemoteError> {
        debug!(method = %req.method(), uri = %req.uri(), "daemon request");
        let reply = self.http.send(req).await.map_err(RemoteError::Unavailable)?;
        if !reply.status.is_success() {
            return Err(RemoteError::Status {
                status: reply.status.as_u16(),
                message: String::from_utf8_lossy(&reply.body).into_owned(),
            });
        }
        Ok(reply.body)
    }
}

impl FileStore for WingsClient {
    async fn get_content(&self, server: &ServerRef, file: &str) -> Result<String, RemoteError> {
        let req = self.request(http::Method::GET, server, "contents", file, Bytes::new())?;
        let body = self.call(req).await?;
        String::from_utf8(body.to_vec()).map_err(|_| RemoteError::NotText)
    }

    async fn put_content(&self, server: &ServerRef, file: &str, content: String) -> Result<(), RemoteError> {
        let req = self.request(http::Method::POST, server, "write", file, Bytes::from(content))?;
        self.call(req).await.map(|_| ())
    }
}
