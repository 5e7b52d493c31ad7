//! Request/response handles and user-supplied callables.
//!
//! Predicates and producers receive the parameter bag plus an [`Exchange`]:
//! the head of the inbound request and a header map that ends up on the
//! outgoing response. Neither is inspected by the resolver itself.
//!
//! A [`Callable`] either answers immediately or hands back a boxed future.
//! The resolver awaits both the same way, so there is one suspension point
//! regardless of which kind a rule was configured with.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use axum::http::{request::Parts, HeaderMap, HeaderName, HeaderValue, Request};
use futures_util::future::{BoxFuture, FutureExt};

use crate::routing::params::ParamBag;

/// Error type returned by deferred predicates and producers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type ImmediateFn<T> = dyn Fn(&ParamBag, &Exchange) -> T + Send + Sync;
type DeferredFn<T> =
    dyn Fn(&ParamBag, &Exchange) -> BoxFuture<'static, Result<T, BoxError>> + Send + Sync;

/// Headers collected for the outgoing response.
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders(Arc<Mutex<HeaderMap>>);

impl ResponseHeaders {
    pub fn insert(&self, name: HeaderName, value: HeaderValue) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
    }

    /// Drain everything collected so far.
    pub fn take(&self) -> HeaderMap {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Opaque request/response handles forwarded to predicates and producers.
#[derive(Debug, Clone)]
pub struct Exchange {
    request: Arc<Parts>,
    response: ResponseHeaders,
}

impl Exchange {
    pub fn new(request: Parts) -> Self {
        Self {
            request: Arc::new(request),
            response: ResponseHeaders::default(),
        }
    }

    pub fn request(&self) -> &Parts {
        &self.request
    }

    pub fn response(&self) -> &ResponseHeaders {
        &self.response
    }
}

impl Default for Exchange {
    fn default() -> Self {
        let (parts, ()) = Request::new(()).into_parts();
        Self::new(parts)
    }
}

/// A predicate (`T = bool`) or producer (`T = String`) supplied in code.
pub enum Callable<T> {
    Immediate(Arc<ImmediateFn<T>>),
    Deferred(Arc<DeferredFn<T>>),
}

impl<T: Send + 'static> Callable<T> {
    /// Wrap a closure that answers synchronously.
    pub fn immediate<F>(f: F) -> Self
    where
        F: Fn(&ParamBag, &Exchange) -> T + Send + Sync + 'static,
    {
        Callable::Immediate(Arc::new(f))
    }

    /// Wrap a closure that answers through a future. The future must own
    /// whatever it needs from the bag or the exchange.
    pub fn deferred<F, Fut>(f: F) -> Self
    where
        F: Fn(&ParamBag, &Exchange) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        Callable::Deferred(Arc::new(move |params: &ParamBag, exchange: &Exchange| {
            f(params, exchange).boxed()
        }))
    }

    /// Invoke and wait for the answer.
    pub async fn call(&self, params: &ParamBag, exchange: &Exchange) -> Result<T, BoxError> {
        match self {
            Callable::Immediate(f) => Ok(f(params, exchange)),
            Callable::Deferred(f) => f(params, exchange).await,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Callable::Deferred(_))
    }
}

impl<T> Clone for Callable<T> {
    fn clone(&self) -> Self {
        match self {
            Callable::Immediate(f) => Callable::Immediate(Arc::clone(f)),
            Callable::Deferred(f) => Callable::Deferred(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Callable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Immediate(_) => f.write_str("Callable::Immediate(..)"),
            Callable::Deferred(_) => f.write_str("Callable::Deferred(..)"),
        }
    }
}

/// A deferred callable failed while evaluating the entry at `index`.
#[derive(Debug)]
pub struct EvalError {
    pub index: usize,
    pub source: BoxError,
}
