// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP plumbing for tests: a mocked outbound client, snapshot conversions,
//! and a small routing kernel for driving handlers directly.

mod convert;
mod mock;
mod router;

pub use convert::{
    headers_to_snapshot, parse_form, request_to_snapshot, response_to_snapshot, MockBody,
    MockRequest, MockResponse,
};
pub use mock::{MockHttpClient, DUMMY_RESPONSE};
pub use router::{
    generate_response, handler, Controller, FnController, HandlerError, HandlerResult, HttpKernel,
    Route, RouteInfo, Router,
};

use crate::container::{Container, ContainerError, HTTP_CLIENT};
use http::{Request, Response};
use std::sync::Arc;
use thiserror::Error;

/// Errors from building, sending or handling HTTP messages
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid HTTP message: {0}")]
    Http(#[from] http::Error),

    #[error("Handler {route} failed: {source}")]
    Handler {
        route: String,
        #[source]
        source: HandlerError,
    },

    #[error("HTTP client unavailable: {0}")]
    Container(#[from] ContainerError),
}

/// Outbound HTTP
pub trait HttpClient: Send + Sync {
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpError>;
}

/// Resolve the container's `http.client` service
pub fn resolve_client(container: &Container) -> Result<Arc<dyn HttpClient>, ContainerError> {
    container.make_as::<Arc<dyn HttpClient>>(HTTP_CLIENT)
}
