//! Outbound HTTP, shared by the daemon client and the panel accessor.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;

/// A pooled hyper client sending fully-buffered bodies.
#[derive(Clone)]
pub(crate) struct HttpClient {
    inner: Client<HttpConnector, Full<Bytes>>,
}

/// A response with its body collected.
pub(crate) struct Reply {
    pub status: http::StatusCode,
    pub body: Bytes,
}

impl HttpClient {
    pub(crate) fn new() -> Self {
        Self { inner: Client::builder(TokioExecutor::new()).build_http() }
    }

    /// Sends `req` and collects the reply body. Errors are flattened to
    /// strings; callers only need them for logs and error messages.
    pub(crate) async fn send(&self, req: http::Request<Full<Bytes>>) -> Result<Reply, String> {
        let res = self.inner.request(req).await.map_err(|e| e.to_string())?;
        let status = res.status();
        let body = res.into_body()
            .collect()
            .await
            .map_err(|e| format!("reading response body: {e}"))?
            .to_bytes();
        Ok(Reply { status, body })
    }
}

impl Default for HttpClient {
    fn default() -> Self { Self::new() }
}

/// Joins a base URL and a path without doubling or dropping the `/`.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_urls_with_one_slash() {
        assert_eq!(join_url("http://d:8080/", "/api/servers"), "http://d:8080/api/servers");
        assert_eq!(join_url("http://d:8080", "api/servers"), "http://d:8080/api/servers");
    }
}
