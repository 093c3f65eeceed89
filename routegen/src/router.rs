use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http::{Method, StatusCode, header};

use crate::extract::PathParams;
use crate::introspection::RouteInfo;
use crate::response::IntoResponse;

pub type Request = http::Request<Bytes>;
pub type Response = http::Response<Bytes>;

type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send>>;
type HandlerFn = Box<dyn Fn(Request) -> BoxFuture + Send + Sync>;

/// A registered route, handed back by the mapping calls so it can be named
/// and configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    method: Method,
    path: String,
    name: Option<String>,
    requires_authorization: bool,
}

impl RouteEntry {
    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            name: None,
            requires_authorization: false,
        }
    }

    pub fn with_name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.to_string());
        self
    }

    /// Requests without an `authorization` header are answered with 401.
    pub fn require_authorization(&mut self) -> &mut Self {
        self.requires_authorization = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn requires_authorization(&self) -> bool {
        self.requires_authorization
    }

    fn info(&self) -> RouteInfo {
        RouteInfo {
            method: self.method.to_string(),
            path: self.path.clone(),
            name: self.name.clone(),
            requires_authorization: self.requires_authorization,
        }
    }
}

struct Route {
    entry: RouteEntry,
    handler: HandlerFn,
}

/// Ordered route table. Routes match in registration order.
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn map<F, Fut, Out>(&mut self, method: Method, path: &str, handler: F) -> &mut RouteEntry
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        let handler = Box::new(move |req: Request| {
            let output = handler(req);
            Box::pin(async move { output.await.into_response() }) as BoxFuture
        });

        tracing::debug!(%method, path, "mapped route");
        self.routes.push(Route {
            entry: RouteEntry::new(method, path),
            handler,
        });
        let index = self.routes.len() - 1;
        &mut self.routes[index].entry
    }

    pub fn map_get<F, Fut, Out>(&mut self, path: &str, handler: F) -> &mut RouteEntry
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        self.map(Method::GET, path, handler)
    }

    pub fn map_post<F, Fut, Out>(&mut self, path: &str, handler: F) -> &mut RouteEntry
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        self.map(Method::POST, path, handler)
    }

    pub fn map_put<F, Fut, Out>(&mut self, path: &str, handler: F) -> &mut RouteEntry
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        self.map(Method::PUT, path, handler)
    }

    pub fn map_delete<F, Fut, Out>(&mut self, path: &str, handler: F) -> &mut RouteEntry
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        self.map(Method::DELETE, path, handler)
    }

    pub fn routes(&self) -> Vec<RouteInfo> {
        self.routes.iter().map(|route| route.entry.info()).collect()
    }

    pub fn route_named(&self, name: &str) -> Option<&RouteEntry> {
        self.routes
            .iter()
            .map(|route| &route.entry)
            .find(|entry| entry.name() == Some(name))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub async fn handle(&self, mut req: Request) -> Response {
        let path = req.uri().path().to_string();

        for route in &self.routes {
            if route.entry.method != *req.method() {
                continue;
            }
            let Some(params) = match_path(&route.entry.path, &path) else {
                continue;
            };

            if route.entry.requires_authorization
                && !req.headers().contains_key(header::AUTHORIZATION)
            {
                tracing::debug!(path = %path, "missing authorization");
                return StatusCode::UNAUTHORIZED.into_response();
            }

            req.extensions_mut().insert(params);
            return (route.handler)(req).await;
        }

        StatusCode::NOT_FOUND.into_response()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Matches `path` against a pattern whose `{name}` segments capture one
/// segment each. Leading and trailing slashes are ignored on both sides.
fn match_path(pattern: &str, path: &str) -> Option<PathParams> {
    let pattern: Vec<&str> = segments(pattern).collect();
    let path: Vec<&str> = segments(path).collect();
    if pattern.len() != path.len() {
        return None;
    }

    let mut params = PathParams::default();
    for (expected, actual) in pattern.iter().zip(&path) {
        match expected
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        {
            Some(name) => params.insert(name, actual),
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.trim_matches('/').split('/').filter(|segment| !segment.is_empty())
}
