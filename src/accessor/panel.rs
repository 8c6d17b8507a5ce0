//! [`PropertiesApi`] over the panel's HTTP routes.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use serde::de::DeserializeOwned;

use crate::accessor::{AccessorError, PropertiesApi};
use crate::api::{ListReply, ServerVariable, UpdateBody, UpdateReply};
use crate::client::{HttpClient, join_url};

/// Talks to `GET`/`PUT {base}/servers/{id}/minecraft/properties`.
#[derive(Clone)]
pub struct HttpPropertiesApi {
    base: String,
    http: HttpClient,
    timeout: Duration,
}

impl HttpPropertiesApi {
    /// `base` is everything before `/servers`, e.g. `http://panel:8080`.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into(), http: HttpClient::new(), timeout: Duration::from_secs(10) }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self, server_id: &str) -> String {
        join_url(&self.base, &format!("servers/{server_id}/minecraft/properties"))
    }

    async fn exchange<T: DeserializeOwned>(
        &self,
        req: http::Request<Full<Bytes>>,
    ) -> Result<T, AccessorError> {
        let reply = tokio::time::timeout(self.timeout, self.http.send(req))
            .await
            .map_err(|_| AccessorError::Timeout(self.timeout))?
            .map_err(AccessorError::Transport)?;

        if !reply.status.is_success() {
            let message = serde_json::from_slice::<UpdateReply>(&reply.body)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or_else(|| String::from_utf8_lossy(&reply.body).into_owned());
            return Err(AccessorError::Status { status: reply.status.as_u16(), message });
        }
        serde_json::from_slice(&reply.body).map_err(|e| AccessorError::Decode(e.to_string()))
    }
}

impl PropertiesApi for HttpPropertiesApi {
    async fn fetch(&self, server_id: &str) -> Result<Vec<ServerVariable>, AccessorError> {
        let req = http::Request::get(self.url(server_id))
            .header("accept", "application/json")
            .body(Full::new(Bytes::new()))
            .map_err(|e| AccessorError::Transport(e.to_string()))?;

        let reply: ListReply = self.exchange(req).await?;
        if !reply.success {
            return Err(AccessorError::Rejected(None));
        }
        Ok(reply.data)
    }

    async fn update(&self, server_id: &str, key: &str, value: &str) -> Result<(), AccessorError> {
        let body = serde_json::to_vec(&UpdateBody::new(key, value))
            .map_err(|e| AccessorError::Decode(e.to_string()))?;
        let req = http::Request::put(self.url(server_id))
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| AccessorError::Transport(e.to_string()))?;

        let reply: UpdateReply = self.exchange(req).await?;
        if !reply.success {
            return Err(AccessorError::Rejected(reply.message));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_route_urls() {
        let api = HttpPropertiesApi::new("http://panel:8080/");
        assert_eq!(api.url("1a7ce997"), "http://panel:8080/servers/1a7ce997/minecraft/properties");
    }

    #[tokio::test]
    async fn unreachable_panel_is_a_transport_error() {
        let api = HttpPropertiesApi::new("http://127.0.0.1:9");
        let err = api.fetch("1a7ce997").await.unwrap_err();
        assert!(matches!(err, AccessorError::Transport(_)), "{err:?}");
    }
}
