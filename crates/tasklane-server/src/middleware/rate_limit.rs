//! Middleware de rate limiting por cliente.

use std::net::SocketAddr;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response},
    response::IntoResponse,
};
use tower::{Layer, Service};
use tracing::debug;

use crate::error::AppError;
use crate::limiter::SlidingWindowLimiter;

/// Key usada cuando la conexion no expone la direccion del cliente.
const UNKNOWN_CLIENT: &str = "unknown";

/// Identifica al cliente por su IP de conexion.
///
/// Requiere servir el router con `into_make_service_with_connect_info`;
/// sin eso todos los requests comparten la key `unknown`.
pub fn client_key<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Layer que rechaza con 429 a los clientes que exceden su limite.
#[derive(Clone)]
pub struct RateLimitLayer {
    limiter: Arc<SlidingWindowLimiter>,
}

impl RateLimitLayer {
    pub fn new(limiter: Arc<SlidingWindowLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitMiddleware {
            inner,
            limiter: Arc::clone(&self.limiter),
        }
    }
}

/// Middleware que consulta el limiter antes de llamar al handler.
#[derive(Clone)]
pub struct RateLimitMiddleware<S> {
    inner: S,
    limiter: Arc<SlidingWindowLimiter>,
}

impl<S> Service<Request<Body>> for RateLimitMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let client = client_key(&request);

        if !self.limiter.allow(&client) {
            debug!(client = %client, "Rate limit exceeded");
            return Box::pin(async move { Ok(AppError::RateLimited.into_response()) });
        }

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(request).await })
    }
}
