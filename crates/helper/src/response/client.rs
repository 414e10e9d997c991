// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Drives an [`HttpKernel`] like a browser would, remembering the last
//! exchange for failure reports.

use super::assert::{with_message, AssertionReport, Constraint};
use super::{parse_response, ResponseError};
use crate::http::{headers_to_snapshot, HttpError, HttpKernel, MockRequest};
use crate::trace::render_error;
use http::{Method, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use test_helper_capture::HeaderValues;
use tracing::debug;

/// The request half of a transmission
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SentRequest {
    pub method: String,
    pub uri: String,
    pub parameters: Vec<(String, String)>,
    pub content: Option<String>,
}

/// The response half of a transmission
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReceivedResponse {
    pub code: u16,
    pub headers: BTreeMap<String, HeaderValues>,
    pub content: Value,
}

/// The last request sent and the response it got
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transmission {
    pub request: SentRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ReceivedResponse>,
}

/// Test client over a kernel
#[derive(Debug)]
pub struct TestClient<K: HttpKernel> {
    kernel: K,
    transmission: Option<Transmission>,
}

impl<K: HttpKernel> TestClient<K> {
    pub fn new(kernel: K) -> Self {
        Self {
            kernel,
            transmission: None,
        }
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// The last exchange, if any request was sent
    pub fn transmission(&self) -> Option<&Transmission> {
        self.transmission.as_ref()
    }

    /// Send a request through the kernel.
    ///
    /// `GET` parameters go into the query string; for other methods they
    /// form-encode the body unless `content` is given. A handler error is
    /// answered with a `500` JSON error body.
    pub fn call(
        &mut self,
        method: Method,
        uri: &str,
        parameters: &[(&str, &str)],
        content: Option<&str>,
    ) -> Result<Response<Vec<u8>>, ResponseError> {
        self.send(method, uri, parameters, content, &[])
    }

    pub fn get(&mut self, uri: &str) -> Result<Response<Vec<u8>>, ResponseError> {
        self.call(Method::GET, uri, &[], None)
    }

    pub fn post(
        &mut self,
        uri: &str,
        parameters: &[(&str, &str)],
    ) -> Result<Response<Vec<u8>>, ResponseError> {
        self.call(Method::POST, uri, parameters, None)
    }

    /// Send `data` as a JSON body, asking for JSON back
    pub fn json(
        &mut self,
        method: Method,
        uri: &str,
        data: &Value,
    ) -> Result<Response<Vec<u8>>, ResponseError> {
        let content = serde_json::to_string(data)?;
        self.send(
            method,
            uri,
            &[],
            Some(&content),
            &[("content-type", "application/json"), ("accept", "application/json")],
        )
    }

    fn send(
        &mut self,
        method: Method,
        uri: &str,
        parameters: &[(&str, &str)],
        content: Option<&str>,
        headers: &[(&str, &str)],
    ) -> Result<Response<Vec<u8>>, ResponseError> {
        self.transmission = Some(Transmission {
            request: SentRequest {
                method: method.to_string(),
                uri: uri.to_string(),
                parameters: parameters
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                content: content.map(str::to_string),
            },
            response: None,
        });

        let mut builder = MockRequest::new().method(method.clone());
        builder = if method == Method::GET && !parameters.is_empty() {
            builder.uri(with_query(uri, parameters))
        } else {
            let builder = builder.uri(uri);
            match content {
                Some(content) => builder.body(content),
                None if parameters.is_empty() => builder,
                None => builder.body(parameters.to_vec()),
            }
        };
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let response = match self.kernel.handle(builder.build()?) {
            Ok(response) => response,
            Err(error @ HttpError::Handler { .. }) => {
                debug!(%error, "handler failed, rendering error body");
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .header("content-type", "application/json")
                    .body(render_error(&error).to_string().into_bytes())
                    .map_err(HttpError::from)?
            }
            Err(error) => return Err(error.into()),
        };

        let status = response.status().as_u16();
        let received = ReceivedResponse {
            code: status,
            headers: headers_to_snapshot(response.headers()),
            content: parse_response(status, &String::from_utf8_lossy(response.body()))?,
        };
        if let Some(transmission) = self.transmission.as_mut() {
            transmission.response = Some(received);
        }
        Ok(response)
    }

    /// Like [`super::assert_that`], with the route and last exchange attached
    /// to the report
    pub fn assert_that<T: ?Sized>(
        &self,
        value: &T,
        constraint: &dyn Constraint<T>,
        message: &str,
    ) -> Result<(), AssertionReport> {
        constraint.evaluate(value).map_err(|failure| {
            let route = self.transmission.as_ref().and_then(|t| {
                let method = Method::from_bytes(t.request.method.as_bytes()).ok()?;
                let path = t.request.uri.split('?').next().unwrap_or_default();
                self.kernel.route_for(&method, path)
            });
            AssertionReport {
                error: with_message(failure, message),
                route,
                transmission: self.transmission.clone(),
            }
        })
    }
}

fn with_query(uri: &str, parameters: &[(&str, &str)]) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(parameters)
        .finish();
    let separator = if uri.contains('?') { '&' } else { '?' };
    format!("{}{}{}", uri, separator, query)
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
