//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Is there any daemon to talk to? |

use crate::handler::Handler;
use crate::{Request, Response, Status};

/// Liveness probe. Always `200 OK` with body `"ok"`.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe: `200 OK` once at least one daemon node is configured,
/// `503` otherwise. A panel with no nodes can only answer with empty
/// property lists, so it should not take traffic.
pub fn readiness(nodes: usize) -> impl Handler {
    move |_req: Request| async move {
        if nodes > 0 {
            Response::text("ready")
        } else {
            Response::status(Status::ServiceUnavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;

    #[tokio::test]
    async fn readiness_requires_a_node() {
        let ready = readiness(1).into_boxed_handler();
        let res = ready.call(Request::for_test(Method::Get, "/readyz", b"")).await;
        assert_eq!(res.status_code(), Status::Ok);

        let empty = readiness(0).into_boxed_handler();
        let res = empty.call(Request::for_test(Method::Get, "/readyz", b"")).await;
        assert_eq!(res.status_code(), Status::ServiceUnavailable);
    }

    #[tokio::test]
    async fn liveness_is_unconditional() {
        let res = liveness(Request::for_test(Method::Get, "/healthz", b"")).await;
        assert_eq!(res.body(), b"ok");
    }
}
