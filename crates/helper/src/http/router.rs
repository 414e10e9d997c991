// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! A minimal routing kernel.

use super::{HttpError, MockRequest};
use http::{Method, Request, Response, StatusCode};
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Error raised by a controller action
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

pub type HandlerResult = Result<Response<Vec<u8>>, HandlerError>;

/// Handles requests routed to one of its actions
pub trait Controller: Send + Sync {
    /// Name used in route reports
    fn name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    fn call(&self, action: &str, request: &Request<Vec<u8>>) -> HandlerResult;
}

/// Controller backed by a closure; the action name is ignored
pub struct FnController<F> {
    name: String,
    action: F,
}

impl<F> Controller for FnController<F>
where
    F: Fn(&Request<Vec<u8>>) -> HandlerResult + Send + Sync,
{
    fn name(&self) -> String {
        self.name.clone()
    }

    fn call(&self, _action: &str, request: &Request<Vec<u8>>) -> HandlerResult {
        (self.action)(request)
    }
}

/// Wrap a closure as a controller
pub fn handler<F>(name: impl Into<String>, action: F) -> Arc<dyn Controller>
where
    F: Fn(&Request<Vec<u8>>) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(FnController {
        name: name.into(),
        action,
    })
}

/// Where a matched request ends up
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub controller: String,
    pub location: String,
    pub middleware: Vec<String>,
}

/// A registered route
#[derive(Clone)]
pub struct Route {
    method: Method,
    path: String,
    name: Option<String>,
    controller: Arc<dyn Controller>,
    action: String,
    middleware: Vec<String>,
    location: &'static Location<'static>,
}

impl Route {
    /// Route `method path` to `controller`'s `action`, recording the caller
    #[track_caller]
    pub fn new(
        method: Method,
        path: impl Into<String>,
        controller: Arc<dyn Controller>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            method,
            path: normalize_path(&path.into()),
            name: None,
            controller,
            action: action.into(),
            middleware: Vec::new(),
            location: Location::caller(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.extend(names.into_iter().map(Into::into));
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

    /// `Controller@action`
    pub fn controller_name(&self) -> String {
        format!("{}@{}", self.controller.name(), self.action)
    }

    /// `file:line` of the registration
    pub fn location(&self) -> String {
        format!("{}:{}", self.location.file(), self.location.line())
    }

    /// Whether this route serves `method path`; `{param}` segments match any
    /// single segment
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        if &self.method != method {
            return false;
        }
        let path = normalize_path(path);
        let mut expected = self.path.split('/');
        let mut actual = path.split('/');
        loop {
            match (expected.next(), actual.next()) {
                (None, None) => return true,
                (Some(e), Some(a)) if e.starts_with('{') && e.ends_with('}') && !a.is_empty() => {}
                (Some(e), Some(a)) if e == a => {}
                _ => return false,
            }
        }
    }

    pub fn info(&self) -> RouteInfo {
        RouteInfo {
            controller: self.controller_name(),
            location: self.location(),
            middleware: self.middleware.clone(),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("controller", &self.controller_name())
            .field("location", &self.location())
            .finish()
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    format!("/{}", trimmed)
}

/// Turns requests into responses
pub trait HttpKernel: Send + Sync {
    fn handle(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpError>;

    /// The route that would serve `method path`, if known
    fn route_for(&self, _method: &Method, _path: &str) -> Option<RouteInfo> {
        None
    }
}

/// Route table; clones share routes
#[derive(Clone, Default)]
pub struct Router {
    routes: Arc<RwLock<Vec<Route>>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, route: Route) -> &Self {
        debug!(method = %route.method, path = %route.path, controller = %route.controller_name(), "route added");
        self.routes.write().push(route);
        self
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.read().clone()
    }

    /// First route serving `method path`
    pub fn match_route(&self, method: &Method, path: &str) -> Option<Route> {
        self.routes
            .read()
            .iter()
            .find(|route| route.matches(method, path))
            .cloned()
    }
}

impl HttpKernel for Router {
    fn handle(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpError> {
        let Some(route) = self.match_route(request.method(), request.uri().path()) else {
            debug!(method = %request.method(), uri = %request.uri(), "no route");
            return Ok(Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Vec::new())?);
        };

        route
            .controller
            .call(&route.action, &request)
            .map_err(|source| HttpError::Handler {
                route: route.controller_name(),
                source,
            })
    }

    fn route_for(&self, method: &Method, path: &str) -> Option<RouteInfo> {
        self.match_route(method, path).map(|route| route.info())
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.read().len())
            .finish()
    }
}

/// Serve `request` through `controller`'s `action` on a throwaway route.
///
/// Without a request, a `GET /dummy-route-<id>/<action>` is made up. A
/// controller error is returned as [`HttpError::Handler`].
#[track_caller]
pub fn generate_response(
    router: &Router,
    controller: Arc<dyn Controller>,
    action: &str,
    request: Option<Request<Vec<u8>>>,
) -> Result<Response<Vec<u8>>, HttpError> {
    let request = match request {
        Some(request) => request,
        None => MockRequest::new()
            .uri(format!("/dummy-route-{}/{}", Uuid::new_v4().simple(), action))
            .build()?,
    };

    let route = Route::new(
        request.method().clone(),
        request.uri().path(),
        controller,
        action,
    )
    .named(action);
    router.add(route);
    router.handle(request)
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
