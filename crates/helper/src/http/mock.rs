// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Mocked outbound HTTP client.

use super::{request_to_snapshot, response_to_snapshot, HttpClient, HttpError, MockResponse};
use crate::container::{BindingSnapshot, Container, Service, WeakContainer, HTTP_CLIENT};
use crate::trace::DebugTrace;
use http::{Request, Response};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use test_helper_capture::{CapturedTransaction, TransactionLog};
use tracing::debug;

/// Body of the response given when the queue is empty
pub const DUMMY_RESPONSE: &str = "dummy-response";

#[derive(Default)]
struct MockState {
    queue: Mutex<VecDeque<Response<Vec<u8>>>>,
    log: TransactionLog,
    trace_transaction: AtomicBool,
    installed: Mutex<Option<(WeakContainer, BindingSnapshot)>>,
}

/// Answers requests from a FIFO queue of canned responses and records every
/// exchange. Clones share the queue and the log.
#[derive(Clone, Default)]
pub struct MockHttpClient {
    state: Arc<MockState>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record transactions into an existing log
    pub fn with_log(log: TransactionLog) -> Self {
        Self {
            state: Arc::new(MockState {
                log,
                ..MockState::default()
            }),
        }
    }

    /// Queue a response
    pub fn append(&self, response: Response<Vec<u8>>) -> &Self {
        self.state.queue.lock().push_back(response);
        self
    }

    /// Queue several responses, in order
    pub fn append_all(&self, responses: impl IntoIterator<Item = Response<Vec<u8>>>) -> &Self {
        self.state.queue.lock().extend(responses);
        self
    }

    /// Responses still queued
    pub fn pending(&self) -> usize {
        self.state.queue.lock().len()
    }

    /// Attach a truncated call trace to each recorded transaction
    pub fn set_trace_transaction(&self, trace: bool) -> &Self {
        self.state.trace_transaction.store(trace, Ordering::SeqCst);
        self
    }

    pub fn log(&self) -> &TransactionLog {
        &self.state.log
    }

    pub fn transactions(&self) -> Vec<CapturedTransaction> {
        self.state.log.transactions()
    }

    /// Bind this mock as the container's `http.client`, remembering the
    /// registration it replaces.
    ///
    /// The mock holds the container weakly; dropping the container without
    /// calling [`MockHttpClient::restore`] frees both.
    pub fn install(&self, container: &Container) -> &Self {
        {
            let mut installed = self.state.installed.lock();
            if installed.is_none() {
                *installed = Some((container.downgrade(), container.snapshot(HTTP_CLIENT)));
            }
        }
        let client: Arc<dyn HttpClient> = Arc::new(self.clone());
        container.bind(
            HTTP_CLIENT,
            move |_| Arc::new(Arc::clone(&client)) as Service,
            false,
        );
        debug!("installed mock http client");
        self
    }

    /// Put back the registration replaced by [`MockHttpClient::install`]
    pub fn restore(&self) {
        let installed = self.state.installed.lock().take();
        let Some((container, snapshot)) = installed else {
            return;
        };
        match container.upgrade() {
            Some(container) => {
                container.restore(HTTP_CLIENT, snapshot);
                debug!("restored http client");
            }
            None => debug!("container dropped before restore"),
        }
    }

    fn next_response(&self) -> Result<Response<Vec<u8>>, HttpError> {
        match self.state.queue.lock().pop_front() {
            Some(response) => Ok(response),
            None => MockResponse::new().body(DUMMY_RESPONSE).build(),
        }
    }
}

impl HttpClient for MockHttpClient {
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpError> {
        let response = self.next_response()?;
        let trace = self
            .state
            .trace_transaction
            .load(Ordering::SeqCst)
            .then(|| DebugTrace::here().truncate().trace);

        let seq = self.state.log.record(
            request_to_snapshot(&request),
            response_to_snapshot(&response),
            trace,
        );
        debug!(
            seq,
            method = %request.method(),
            uri = %request.uri(),
            status = response.status().as_u16(),
            "mocked http transaction"
        );
        Ok(response)
    }
}

impl std::fmt::Debug for MockHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHttpClient")
            .field("pending", &self.pending())
            .field("recorded", &self.state.log.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "mock_tests.rs"]
mod tests;
