// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Readable call traces for debugging failed tests.
//!
//! A [`DebugTrace`] pairs a map of debug values with the call stack at the
//! point it was generated. Each stack frame becomes one line keyed by its
//! `file:line` location (or `closure_<id>` when the frame has no location).
//! [`DebugTrace::truncate`] flattens the lines into short strings such as
//! `Client::send(request:"POST /token", retries:3)`.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::backtrace::Backtrace;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::OnceLock;
use uuid::Uuid;

/// String arguments longer than this are cut in trace lines
pub const TRUNCATE_AT: usize = 16;

/// String arguments longer than this are cut in rendered error bodies
pub const ERROR_TRUNCATE_AT: usize = 50;

/// A raw frame argument
#[derive(Clone, Debug, PartialEq)]
pub enum FrameArg {
    Value(Value),
    /// An object, known only by its type
    Object(String),
    List(Vec<FrameArg>),
}

impl FrameArg {
    /// Objects become their type name; lists are normalized element-wise
    pub fn normalize(&self) -> Value {
        match self {
            FrameArg::Value(value) => value.clone(),
            FrameArg::Object(type_name) => Value::String(type_name.clone()),
            FrameArg::List(items) => Value::Array(items.iter().map(FrameArg::normalize).collect()),
        }
    }
}

impl From<Value> for FrameArg {
    fn from(value: Value) -> Self {
        FrameArg::Value(value)
    }
}

/// One stack frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub function: String,
    pub class: Option<String>,
    pub object: Option<String>,
    pub args: Vec<FrameArg>,
    /// Declared parameter names, when known
    pub params: Vec<String>,
}

impl Frame {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<FrameArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = names.into_iter().map(Into::into).collect();
        self
    }

    /// `file:line`, or a fresh `closure_<id>` key for unlocated frames
    pub fn location_key(&self) -> String {
        match (&self.file, self.line) {
            (None, None) => format!("closure_{}", Uuid::new_v4().simple()),
            (file, line) => format!(
                "{}:{}",
                file.as_deref().unwrap_or_default(),
                line.map(|l| l.to_string()).unwrap_or_default()
            ),
        }
    }

    /// `Object::Class::function`, collapsing the object when it is the class
    pub fn qualified_name(&self) -> String {
        let class = self.class.as_deref().unwrap_or_default();
        let mut owner = self.object.clone().unwrap_or_else(|| class.to_string());
        if owner != class {
            owner = format!("{}::{}", owner, class);
        }
        format!("{}::{}", owner, self.function)
            .trim_matches(':')
            .to_string()
    }
}

/// Pair arguments with parameter names.
///
/// Missing arguments are padded with `null`; arguments beyond the declared
/// parameters are named by position.
pub fn apply_parameter_names(args: Vec<Value>, params: &[String]) -> Vec<(String, Value)> {
    let count = args.len().max(params.len());
    let mut args = args.into_iter();
    (0..count)
        .map(|index| {
            let name = params
                .get(index)
                .cloned()
                .unwrap_or_else(|| index.to_string());
            (name, args.next().unwrap_or(Value::Null))
        })
        .collect()
}

/// Short display form of a normalized argument
pub fn stringify(value: &Value, limit: usize) -> String {
    match value {
        Value::String(s) => {
            if s.chars().count() > limit {
                format!("\"{}...\"", s.chars().take(limit).collect::<String>())
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(items) => format!("array({})", items.len()),
        Value::Object(map) => format!("array({})", map.len()),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Number(n) => n.to_string(),
    }
}

/// One traced call
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TraceLine {
    pub location: String,
    pub function: String,
    pub args: Vec<(String, Value)>,
}

impl TraceLine {
    fn from_frame(frame: &Frame) -> Self {
        let args = frame.args.iter().map(FrameArg::normalize).collect();
        Self {
            location: frame.location_key(),
            function: frame.qualified_name(),
            args: apply_parameter_names(args, &frame.params),
        }
    }

    /// `function(name:value, ...)`
    pub fn flatten(&self) -> String {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|(name, value)| format!("{}:{}", name, stringify(value, TRUNCATE_AT)))
            .collect();
        format!("{}({})", self.function, args.join(", "))
    }
}

/// A trace with its lines flattened
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TruncatedTrace {
    pub debug: Map<String, Value>,
    pub trace: BTreeMap<String, String>,
}

/// Debug values plus the call stack they were recorded at
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DebugTrace {
    debug: Map<String, Value>,
    trace: Vec<TraceLine>,
}

impl DebugTrace {
    /// Trace of the current call stack
    pub fn here() -> Self {
        Self::generate(Map::new())
    }

    /// Record `debug` with the current call stack
    pub fn generate(debug: Map<String, Value>) -> Self {
        Self::with_frames(debug, &capture_frames())
    }

    /// Record `debug` with supplied frames
    pub fn with_frames(debug: Map<String, Value>, frames: &[Frame]) -> Self {
        let mut trace: Vec<TraceLine> = Vec::with_capacity(frames.len());
        for line in frames.iter().map(TraceLine::from_frame) {
            match trace.iter_mut().find(|existing| existing.location == line.location) {
                Some(existing) => *existing = line,
                None => trace.push(line),
            }
        }
        Self { debug, trace }
    }

    /// Record an error as `Type: "message"` under `key`, with its causes
    pub fn for_error<E: Error + 'static>(key: &str, error: &E) -> Self {
        let mut debug = Map::new();
        debug.insert(key.to_string(), Value::String(describe_error(error)));
        let causes = source_chain(error);
        if !causes.is_empty() {
            debug.insert(
                "caused_by".to_string(),
                Value::Array(causes.into_iter().map(Value::String).collect()),
            );
        }
        Self::generate(debug)
    }

    pub fn debug(&self) -> &Map<String, Value> {
        &self.debug
    }

    pub fn trace(&self) -> &[TraceLine] {
        &self.trace
    }

    /// Flatten every trace line into `function(args)`
    pub fn truncate(&self) -> TruncatedTrace {
        TruncatedTrace {
            debug: self.debug.clone(),
            trace: self
                .trace
                .iter()
                .map(|line| (line.location.clone(), line.flatten()))
                .collect(),
        }
    }
}

/// `Type: "message"`
pub fn describe_error<E: Error + 'static>(error: &E) -> String {
    format!("{}: \"{}\"", std::any::type_name::<E>(), error)
}

fn source_chain(error: &(dyn Error + 'static)) -> Vec<String> {
    let mut causes = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes
}

/// Frames of the current call stack, innermost first
pub fn capture_frames() -> Vec<Frame> {
    parse_backtrace(&Backtrace::force_capture().to_string())
}

/// Parse the rendering of a [`Backtrace`]
pub fn parse_backtrace(rendered: &str) -> Vec<Frame> {
    static FRAME: OnceLock<Option<Regex>> = OnceLock::new();
    static LOCATION: OnceLock<Option<Regex>> = OnceLock::new();
    let (Some(frame_re), Some(location_re)) = (
        FRAME.get_or_init(|| Regex::new(r"^\s*\d+:\s+(.+?)\s*$").ok()),
        LOCATION.get_or_init(|| Regex::new(r"^\s*at\s+(.+?):(\d+)(?::\d+)?\s*$").ok()),
    ) else {
        return Vec::new();
    };

    let mut frames: Vec<Frame> = Vec::new();
    for line in rendered.lines() {
        if let Some(caps) = location_re.captures(line) {
            if let Some(frame) = frames.last_mut() {
                frame.file = Some(caps[1].to_string());
                frame.line = caps[2].parse().ok();
            }
        } else if let Some(caps) = frame_re.captures(line) {
            frames.push(split_symbol(&caps[1]));
        }
    }
    frames
}

// `crate::module::Type::method::h1234abcd` -> class `crate::module::Type`, function `method`
fn split_symbol(symbol: &str) -> Frame {
    let symbol = strip_hash(symbol);
    match symbol.rsplit_once("::") {
        Some((class, function)) if !class.is_empty() => Frame::new(function).class(class),
        _ => Frame::new(symbol),
    }
}

fn strip_hash(symbol: &str) -> &str {
    match symbol.rsplit_once("::h") {
        Some((head, hash)) if hash.len() == 16 && hash.chars().all(|c| c.is_ascii_hexdigit()) => {
            head
        }
        _ => symbol,
    }
}

/// An error rendered the way the test exception handler does
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub type_name: String,
    pub code: i64,
    pub message: String,
    pub debug: Value,
    pub frames: Vec<Frame>,
}

impl ErrorBody {
    pub fn from_error<E: Error + 'static>(error: &E) -> Self {
        Self {
            type_name: std::any::type_name::<E>().to_string(),
            code: 0,
            message: error.to_string(),
            debug: Value::Array(Vec::new()),
            frames: capture_frames(),
        }
    }

    pub fn code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    pub fn debug(mut self, debug: Value) -> Self {
        self.debug = debug;
        self
    }

    pub fn frames(mut self, frames: Vec<Frame>) -> Self {
        self.frames = frames;
        self
    }

    /// `{type, code, message, debug, trace: [{location, function}]}`
    pub fn render(&self) -> Value {
        let trace: Vec<Value> = self
            .frames
            .iter()
            .map(|frame| {
                let args: Vec<String> = frame
                    .args
                    .iter()
                    .map(|arg| stringify(&arg.normalize(), ERROR_TRUNCATE_AT))
                    .collect();
                let owner = [frame.class.as_deref(), Some(frame.function.as_str())]
                    .into_iter()
                    .flatten()
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join("::");
                serde_json::json!({
                    "location": format!(
                        "{}:{}",
                        frame.file.as_deref().unwrap_or_default(),
                        frame.line.unwrap_or(0)
                    ),
                    "function": format!("{}({})", owner, args.join(", ")),
                })
            })
            .collect();

        serde_json::json!({
            "type": self.type_name,
            "code": self.code,
            "message": self.message,
            "debug": self.debug,
            "trace": trace,
        })
    }
}

/// JSON error body for `error`
pub fn render_error<E: Error + 'static>(error: &E) -> Value {
    ErrorBody::from_error(error).render()
}

#[cfg(test)]
#[path = "trace_tests.rs"]
mod tests;
