//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::method::Method;

/// An incoming HTTP request with its body fully collected.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: http::HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) extensions: http::Extensions,
}

impl Request {
    pub(crate) fn new(
        parts: http::request::Parts,
        method: Method,
        body: Bytes,
        params: HashMap<String, String>,
    ) -> Self {
        Self {
            method,
            path: parts.uri.path().to_owned(),
            headers: parts.headers,
            body,
            params,
            extensions: parts.extensions,
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/servers/{id}/minecraft/properties`, `req.param("id")` on
    /// `/servers/1a7ce997/minecraft/properties` returns `Some("1a7ce997")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Typed value attached by a middleware earlier in the chain.
    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    pub fn insert_extension<T: Clone + Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(value);
    }
}

#[cfg(test)]
impl Request {
    /// Builds a request without going through the server, for handler tests.
    pub(crate) fn for_test(method: Method, path: &str, body: &[u8]) -> Self {
        let (parts, ()) = http::Request::builder()
            .method(http::Method::from(method))
            .uri(path)
            .header("content-type", "application/json")
            .body(())
            .map(http::Request::into_parts)
            .expect("valid test request");
        Self::new(parts, method, Bytes::copy_from_slice(body), HashMap::new())
    }

    pub(crate) fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_owned(), value.to_owned());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize)]
    struct Body {
        key: String,
    }

    #[test]
    fn reads_headers_params_and_json() {
        let req = Request::for_test(Method::Put, "/servers/a/minecraft/properties", br#"{"key":"motd"}"#)
            .with_param("id", "a");

        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.param("id"), Some("a"));
        assert_eq!(req.path(), "/servers/a/minecraft/properties");
        assert_eq!(req.json::<Body>().unwrap().key, "motd");
    }

    #[test]
    fn extensions_round_trip_by_type() {
        let mut req = Request::for_test(Method::Get, "/", b"");
        assert!(req.extension::<u32>().is_none());
        req.insert_extension(7u32);
        assert_eq!(req.extension::<u32>(), Some(&7));
    }
}
