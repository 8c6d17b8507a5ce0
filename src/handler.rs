//! Handler trait and type erasure.
//!
//! The router stores handlers of different concrete types side by side, so
//! each one is erased behind `Arc<dyn ErasedHandler>`:
//!
//! ```text
//! move |req| { let svc = svc.clone(); async move { list(svc, req).await } }
//!        ↓ router.on(Method::Get, path, handler)
//! handler.into_boxed_handler()          ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(handler))          ← stored as BoxedHandler
//!        ↓
//! handler.call(req) at request time     ← one vtable dispatch
//! ```
//!
//! Guarded routes wrap the erased handler once more in [`Layered`], which
//! hands the request to a [`Middleware`] together with a [`Next`] pointing at
//! the inner handler.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the public `Handler` trait.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any `async fn` or closure shaped
/// `Fn(Request) -> impl Future<Output = impl IntoResponse>`. Sealed: only the
/// blanket impl below can provide it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrappers ─────────────────────────────────────────────────────────

/// Bridges a concrete handler `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// A handler behind one middleware.
pub(crate) struct Layered<M> {
    pub(crate) middleware: M,
    pub(crate) inner: BoxedHandler,
}

impl<M: Middleware> ErasedHandler for Layered<M> {
    fn call(&self, req: Request) -> BoxFuture {
        self.middleware.handle(req, Next::new(Arc::clone(&self.inner)))
    }
}
