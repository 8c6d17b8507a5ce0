//! HTTP status codes the panel surface answers with.
//!
//! ```rust
//! use mcprops::{Response, Status};
//!
//! Response::status(Status::NoContent);
//!
//! // or straight from a handler
//! async fn gone(_req: mcprops::Request) -> Status {
//!     Status::NotFound
//! }
//! ```

/// Status codes produced by the router, the guard and the properties handlers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                   // 200
    NoContent,            // 204

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,           // 400
    NotFound,             // 404
    MethodNotAllowed,     // 405
    PayloadTooLarge,      // 413
    UnprocessableContent, // 422

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError,  // 500
    BadGateway,           // 502
    ServiceUnavailable,   // 503
    GatewayTimeout,       // 504
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                   => 200,
            Status::NoContent            => 204,
            Status::BadRequest           => 400,
            Status::NotFound             => 404,
            Status::MethodNotAllowed     => 405,
            Status::PayloadTooLarge      => 413,
            Status::UnprocessableContent => 422,
            Status::InternalServerError  => 500,
            Status::BadGateway           => 502,
            Status::ServiceUnavailable   => 503,
            Status::GatewayTimeout       => 504,
        }
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> Self {
        // Every variant above is a registered code.
        http::StatusCode::from_u16(s.into()).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}
