// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transaction log implementation.

use crate::transaction::{CapturedRequest, CapturedResponse, CapturedTransaction};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use tracing::warn;

/// Transaction log for recording mocked HTTP exchanges
pub struct TransactionLog {
    start: Instant,
    transactions: Arc<Mutex<Vec<CapturedTransaction>>>,
    file_writer: Option<Arc<Mutex<BufWriter<File>>>>,
}

impl TransactionLog {
    /// Create a new in-memory transaction log
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            transactions: Arc::new(Mutex::new(Vec::new())),
            file_writer: None,
        }
    }

    /// Create a transaction log that also appends to a file (JSONL format)
    pub fn with_file(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            start: Instant::now(),
            transactions: Arc::new(Mutex::new(Vec::new())),
            file_writer: Some(Arc::new(Mutex::new(BufWriter::new(file)))),
        })
    }

    /// Record a transaction, returning its sequence number
    pub fn record(
        &self,
        request: CapturedRequest,
        response: CapturedResponse,
        trace: Option<BTreeMap<String, String>>,
    ) -> u64 {
        let mut transactions = self.transactions.lock();
        let seq = transactions.len() as u64;
        let transaction = CapturedTransaction {
            seq,
            timestamp: SystemTime::now(),
            elapsed: self.start.elapsed(),
            request,
            response,
            trace,
        };

        transactions.push(transaction.clone());

        if let Some(ref writer) = self.file_writer {
            use std::io::Write;
            let mut w = writer.lock();
            let written = serde_json::to_string(&transaction)
                .map_err(std::io::Error::from)
                .and_then(|json| writeln!(w, "{}", json))
                .and_then(|()| w.flush());
            if let Err(e) = written {
                warn!(seq, error = %e, "failed to append transaction to capture file");
            }
        }

        seq
    }

    /// Get all captured transactions
    pub fn transactions(&self) -> Vec<CapturedTransaction> {
        self.transactions.lock().clone()
    }

    /// Get the most recent transaction
    pub fn latest(&self) -> Option<CapturedTransaction> {
        self.transactions.lock().last().cloned()
    }

    /// Get the last N transactions
    pub fn last(&self, n: usize) -> Vec<CapturedTransaction> {
        let all = self.transactions.lock();
        all.iter().rev().take(n).rev().cloned().collect()
    }

    /// Count transactions matching a predicate
    pub fn count<F: Fn(&CapturedTransaction) -> bool>(&self, pred: F) -> usize {
        self.transactions.lock().iter().filter(|t| pred(t)).count()
    }

    /// Find transactions whose request URI contains `pattern`
    pub fn find_by_uri(&self, pattern: &str) -> Vec<CapturedTransaction> {
        self.transactions
            .lock()
            .iter()
            .filter(|t| t.request.uri.contains(pattern))
            .cloned()
            .collect()
    }

    /// Find transactions by request method (case-insensitive)
    pub fn find_by_method(&self, method: &str) -> Vec<CapturedTransaction> {
        self.transactions
            .lock()
            .iter()
            .filter(|t| t.request.method.eq_ignore_ascii_case(method))
            .cloned()
            .collect()
    }

    /// Find transactions whose mocked response was not a 2xx
    pub fn find_failures(&self) -> Vec<CapturedTransaction> {
        self.transactions
            .lock()
            .iter()
            .filter(|t| !t.response.is_success())
            .cloned()
            .collect()
    }

    /// Get the total number of transactions
    pub fn len(&self) -> usize {
        self.transactions.lock().len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.transactions.lock().is_empty()
    }

    /// Clear all recorded transactions
    pub fn clear(&self) {
        self.transactions.lock().clear();
    }
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TransactionLog {
    fn clone(&self) -> Self {
        Self {
            start: self.start,
            transactions: Arc::clone(&self.transactions),
            file_writer: self.file_writer.as_ref().map(Arc::clone),
        }
    }
}

impl std::fmt::Debug for TransactionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionLog")
            .field("len", &self.len())
            .field("file", &self.file_writer.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
