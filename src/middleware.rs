//! Named middleware layers wrapped around the mock handler.

use std::fmt;

use bytes::Bytes;
use http::Response;

use crate::error::Result;
use crate::handler::Handler;

/// A layer that sees every request on the way in and every response on
/// the way out.
pub trait Middleware: Send + Sync {
    fn handle(&self, request: reqwest::Request, next: Next<'_>) -> Result<Response<Bytes>>;
}

/// The rest of the stack below the current layer.
pub struct Next<'a> {
    layers: &'a [Layer],
    handler: &'a mut dyn Handler,
}

impl<'a> Next<'a> {
    pub(crate) fn new(layers: &'a [Layer], handler: &'a mut dyn Handler) -> Self {
        Self { layers, handler }
    }

    /// Pass the request down the stack.
    pub fn run(self, request: reqwest::Request) -> Result<Response<Bytes>> {
        match self.layers.split_first() {
            Some((layer, rest)) => layer.middleware.handle(
                request,
                Next {
                    layers: rest,
                    handler: self.handler,
                },
            ),
            None => self.handler.handle(request),
        }
    }
}

pub(crate) struct Layer {
    name: String,
    middleware: Box<dyn Middleware>,
}

/// Ordered, named middleware. The first layer is the outermost.
#[derive(Default)]
pub struct HandlerStack {
    layers: Vec<Layer>,
}

impl fmt::Debug for HandlerStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerStack")
            .field("layers", &self.names())
            .finish()
    }
}

impl HandlerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer at the bottom of the stack, closest to the handler.
    pub fn push(&mut self, name: impl Into<String>, middleware: impl Middleware + 'static) {
        self.layers.push(Layer {
            name: name.into(),
            middleware: Box::new(middleware),
        });
    }

    /// Add a layer at the top of the stack.
    pub fn unshift(&mut self, name: impl Into<String>, middleware: impl Middleware + 'static) {
        self.layers.insert(
            0,
            Layer {
                name: name.into(),
                middleware: Box::new(middleware),
            },
        );
    }

    /// Remove every layer called `name`. Returns whether any was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.layers.len();
        self.layers.retain(|layer| layer.name != name);
        before != self.layers.len()
    }

    pub fn has(&self, name: &str) -> bool {
        self.layers.iter().any(|layer| layer.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Run `request` through every layer and then `handler`.
    pub fn call(&self, request: reqwest::Request, handler: &mut dyn Handler) -> Result<Response<Bytes>> {
        Next::new(&self.layers, handler).run(request)
    }
}

/// Middleware that edits each request before it is handled.
pub struct MapRequest<F>(F);

/// Build a [`MapRequest`] layer.
pub fn map_request<F>(f: F) -> MapRequest<F>
where
    F: Fn(&mut reqwest::Request) + Send + Sync,
{
    MapRequest(f)
}

impl<F> Middleware for MapRequest<F>
where
    F: Fn(&mut reqwest::Request) + Send + Sync,
{
    fn handle(&self, mut request: reqwest::Request, next: Next<'_>) -> Result<Response<Bytes>> {
        (self.0)(&mut request);
        next.run(request)
    }
}

/// Middleware that edits each response after it is produced.
pub struct MapResponse<F>(F);

/// Build a [`MapResponse`] layer.
pub fn map_response<F>(f: F) -> MapResponse<F>
where
    F: Fn(&mut Response<Bytes>) + Send + Sync,
{
    MapResponse(f)
}

impl<F> Middleware for MapResponse<F>
where
    F: Fn(&mut Response<Bytes>) + Send + Sync,
{
    fn handle(&self, request: reqwest::Request, next: Next<'_>) -> Result<Response<Bytes>> {
        let mut response = next.run(request)?;
        (self.0)(&mut response);
        Ok(response)
    }
}

/// Middleware that logs each exchange at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct Tracing;

impl Middleware for Tracing {
    fn handle(&self, request: reqwest::Request, next: Next<'_>) -> Result<Response<Bytes>> {
        let method = request.method().clone();
        let url = request.url().clone();

        let result = next.run(request);
        match &result {
            Ok(response) => tracing::debug!(
                %method,
                %url,
                status = response.status().as_u16(),
                bytes = response.body().len(),
                "mock exchange"
            ),
            Err(e) => tracing::debug!(%method, %url, error = %e, "mock exchange failed"),
        }
        result
    }
}
