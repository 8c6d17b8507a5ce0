//! Panel endpoints for `server.properties`.
//!
//! | Method | Path | Body | Reply |
//! |---|---|---|---|
//! | `GET` | `/servers/{id}/minecraft/properties` | | `{success, data: [{envVariable, serverValue}]}` |
//! | `PUT` | `/servers/{id}/minecraft/properties` | `{key, value}` | `{success}` |
//!
//! Both routes sit behind [`GameTypeGuard`]. A daemon failure on `GET` still
//! answers `200` with an empty list; on `PUT` it answers `502` (or `504` on
//! timeout) with `success: false` and the failure kind. A `PUT` body missing
//! `key` or `value` is a validation failure (`422`); one that is not a JSON
//! object is `400`.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tracing::warn;

use crate::daemon::FileStore;
use crate::directory::ServerInfo;
use crate::method::Method;
use crate::middleware::GameTypeGuard;
use crate::properties::PropertyRecord;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::service::{FailureKind, PropertiesService, UpdateError, ValidationError};
use crate::status::Status;

/// Route of both properties endpoints.
pub const PROPERTIES_PATH: &str = "/servers/{id}/minecraft/properties";

/// One property as exchanged with panel clients.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerVariable {
    pub env_variable: String,
    pub server_value: String,
}

impl From<PropertyRecord> for ServerVariable {
    fn from(r: PropertyRecord) -> Self {
        Self { env_variable: r.key, server_value: r.value }
    }
}

/// Body of `GET` replies.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListReply {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<ServerVariable>,
}

/// Body of `PUT` requests.
///
/// A field that is absent, `null` or not a string reads as `None` and is
/// rejected as a validation failure rather than a malformed body.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateBody {
    #[serde(default, deserialize_with = "string_only", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "string_only", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl UpdateBody {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: Some(key.into()), value: Some(value.into()) }
    }

    /// Both fields, or the first one missing.
    pub fn fields(&self) -> Result<(&str, &str), ValidationError> {
        let key = self.key.as_deref().ok_or(ValidationError::MissingField { field: "key" })?;
        let value = self.value.as_deref().ok_or(ValidationError::MissingField { field: "value" })?;
        Ok((key, value))
    }
}

fn string_only<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/// Body of `PUT` replies.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Adds the properties routes to `router`.
pub fn routes<S: FileStore>(
    router: Router,
    service: Arc<PropertiesService<S>>,
    guard: GameTypeGuard,
) -> Router {
    let list_svc = Arc::clone(&service);
    let update_svc = service;

    router
        .on_guarded(Method::Get, PROPERTIES_PATH, guard.clone(), move |req: Request| {
            let svc = Arc::clone(&list_svc);
            async move { list(svc, req).await }
        })
        .on_guarded(Method::Put, PROPERTIES_PATH, guard, move |req: Request| {
            let svc = Arc::clone(&update_svc);
            async move { update(svc, req).await }
        })
}

async fn list<S: FileStore>(svc: Arc<PropertiesService<S>>, req: Request) -> Response {
    let Some(server) = req.extension::<ServerInfo>() else {
        return missing_server();
    };
    let data = svc.list_properties(&server.server_ref()).await
        .into_iter()
        .map(ServerVariable::from)
        .collect();
    Response::json_value(&ListReply { success: true, data })
}

async fn update<S: FileStore>(svc: Arc<PropertiesService<S>>, req: Request) -> Response {
    let Some(server) = req.extension::<ServerInfo>() else {
        return missing_server();
    };
    let body: UpdateBody = match req.json() {
        Ok(body) => body,
        Err(e) => {
            return Response::builder()
                .status(Status::BadRequest)
                .json_value(&json!({ "success": false, "error": "bad_request", "message": e.to_string() }));
        }
    };

    let (key, value) = match body.fields() {
        Ok(fields) => fields,
        Err(e) => return failure(&UpdateError::from(e)),
    };

    match svc.update_property(&server.server_ref(), key, value).await {
        Ok(_) => Response::json_value(&UpdateReply { success: true, error: None, message: None }),
        Err(e) => failure(&e),
    }
}

fn failure(e: &UpdateError) -> Response {
    let kind = e.kind();
    let status = match kind {
        FailureKind::Validation => Status::UnprocessableContent,
        FailureKind::RemoteUnavailable => Status::BadGateway,
        FailureKind::Timeout => Status::GatewayTimeout,
    };
    Response::builder().status(status).json_value(&UpdateReply {
        success: false,
        error: Some(kind.as_str().to_owned()),
        message: Some(e.to_string()),
    })
}

/// The handlers only run behind the guard, which always attaches the server.
fn missing_server() -> Response {
    warn!("properties handler reached without a resolved server");
    Response::status(Status::InternalServerError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::StaticDirectory;
    use crate::handler::Handler;
    use crate::service::tests::MemoryStore;

    fn info() -> ServerInfo {
        ServerInfo { id: "mc".into(), uuid: "uuid-1".into(), node: "node-1".into(), egg: 1 }
    }

    fn svc(store: MemoryStore) -> Arc<PropertiesService<MemoryStore>> {
        Arc::new(PropertiesService::new(store))
    }

    fn guarded_req(method: Method, body: &[u8]) -> Request {
        let mut req = Request::for_test(method, "/servers/mc/minecraft/properties", body)
            .with_param("id", "mc");
        req.insert_extension(info());
        req
    }

    fn json(res: &Response) -> serde_json::Value {
        serde_json::from_slice(res.body()).unwrap()
    }

    #[tokio::test]
    async fn list_replies_with_env_variable_pairs() {
        let res = list(svc(MemoryStore::with("uuid-1", "motd=hi\n#x\npvp=true")), guarded_req(Method::Get, b"")).await;

        assert_eq!(res.status_code(), Status::Ok);
        assert_eq!(
            json(&res),
            json!({ "success": true, "data": [
                { "envVariable": "motd", "serverValue": "hi" },
                { "envVariable": "pvp", "serverValue": "true" },
            ]}),
        );
    }

    #[tokio::test]
    async fn list_degrades_to_empty_on_daemon_failure() {
        let store = MemoryStore { fail_reads: true, ..MemoryStore::default() };
        let res = list(svc(store), guarded_req(Method::Get, b"")).await;

        assert_eq!(res.status_code(), Status::Ok);
        assert_eq!(json(&res), json!({ "success": true, "data": [] }));
    }

    #[tokio::test]
    async fn update_maps_failures_to_statuses() {
        let service = svc(MemoryStore::with("uuid-1", "a=1"));
        let long_key = format!(r#"{{"key":"{}","value":"x"}}"#, "k".repeat(65));
        let res = update(Arc::clone(&service), guarded_req(Method::Put, long_key.as_bytes())).await;
        assert_eq!(res.status_code(), Status::UnprocessableContent);
        assert_eq!(json(&res)["error"], "validation");

        let res = update(Arc::clone(&service), guarded_req(Method::Put, b"not json")).await;
        assert_eq!(res.status_code(), Status::BadRequest);

        let broken = svc(MemoryStore { fail_writes: true, ..MemoryStore::with("uuid-1", "a=1") });
        let res = update(broken, guarded_req(Method::Put, br#"{"key":"a","value":"2"}"#)).await;
        assert_eq!(res.status_code(), Status::BadGateway);
        assert_eq!(json(&res)["error"], "remote_unavailable");
        assert_eq!(json(&res)["success"], false);
    }

    #[tokio::test]
    async fn update_rejects_missing_or_non_string_fields_as_validation() {
        let service = svc(MemoryStore::with("uuid-1", "a=1"));

        let bodies: [&[u8]; 5] = [
            br#"{"key":"a"}"#,
            br#"{"value":"1"}"#,
            br#"{"key":"a","value":null}"#,
            br#"{"key":7,"value":"1"}"#,
            br#"{}"#,
        ];
        for body in bodies {
            let res = update(Arc::clone(&service), guarded_req(Method::Put, body)).await;
            assert_eq!(res.status_code(), Status::UnprocessableContent, "{}", String::from_utf8_lossy(body));
            assert_eq!(json(&res)["error"], "validation");
            assert_eq!(json(&res)["success"], false);
        }

        let res = update(Arc::clone(&service), guarded_req(Method::Put, br#"{"key":"a"}"#)).await;
        assert_eq!(json(&res)["message"], "`value` is required and must be a string");
        assert_eq!(service.store().writes.load(std::sync::atomic::Ordering::SeqCst), 0);

        let res = update(Arc::clone(&service), guarded_req(Method::Put, br#""motd""#)).await;
        assert_eq!(res.status_code(), Status::BadRequest);
    }

    #[tokio::test]
    async fn update_writes_through_guarded_route() {
        let service = svc(MemoryStore::with("uuid-1", "a=1\n#c\nb=2"));
        let guard = GameTypeGuard::new(Arc::new(StaticDirectory::new([info()])), [1]);
        let router = routes(Router::new(), Arc::clone(&service), guard);

        let crate::router::Route::Found(handler, params) =
            router.lookup(Method::Put, "/servers/mc/minecraft/properties")
        else {
            panic!("route not registered");
        };
        let mut req = Request::for_test(Method::Put, "/servers/mc/minecraft/properties", br#"{"key":"b","value":"9"}"#);
        req.params = params;

        let res = handler.call(req).await;
        assert_eq!(res.status_code(), Status::Ok);
        assert_eq!(json(&res), json!({ "success": true }));
        assert_eq!(service.store().content("uuid-1").as_deref(), Some("a=1\nb=9"));
    }

    #[test]
    fn handlers_are_boxable() {
        fn assert_handler(_: impl Handler) {}
        let service = svc(MemoryStore::default());
        assert_handler(move |req: Request| {
            let svc = Arc::clone(&service);
            async move { list(svc, req).await }
        });
    }
}
