//! Runtime context of a failure occurrence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::StackTrace;

/// Everything known about one failure, assembled by a framework integration.
///
/// `exception` and `source` are always present; `source` may be empty.
/// The remaining contexts are only set when the integration supplies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeContext {
    pub exception: ExceptionInfo,
    #[serde(default)]
    pub stack_trace: StackTrace,
    #[serde(default)]
    pub source: SourceContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<Value>,
}

impl RuntimeContext {
    pub fn new(exception: ExceptionInfo, source: SourceContext) -> Self {
        Self {
            exception,
            stack_trace: StackTrace::default(),
            source,
            request: None,
            application: None,
            database: None,
            performance: None,
        }
    }

    pub fn with_stack_trace(mut self, trace: StackTrace) -> Self {
        self.stack_trace = trace;
        self
    }

    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_application(mut self, application: Value) -> Self {
        self.application = Some(application);
        self
    }

    pub fn with_database(mut self, database: Value) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_performance(mut self, performance: Value) -> Self {
        self.performance = Some(performance);
        self
    }

    /// `file:line` of the failure site.
    pub fn location(&self) -> String {
        self.exception.location()
    }
}

/// Identity of the thrown exception.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    /// Fully qualified class name
    pub class: String,
    pub message: String,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub line: u32,
    /// The exception this one wraps, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<PreviousException>,
}

/// A wrapped (chained) exception.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousException {
    pub class: String,
    pub message: String,
}

impl ExceptionInfo {
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// Set the failure site.
    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = file.into();
        self.line = line;
        self
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    pub fn with_previous(mut self, class: impl Into<String>, message: impl Into<String>) -> Self {
        self.previous = Some(PreviousException {
            class: class.into(),
            message: message.into(),
        });
        self
    }

    /// Class name without its namespace.
    pub fn short_class(&self) -> &str {
        self.class
            .rsplit(['\\', ':', '.'])
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.class)
    }

    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

/// Source code surrounding the failing line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceContext {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub line: u32,
    /// Window of surrounding lines keyed by line number
    #[serde(default)]
    pub lines: BTreeMap<u32, String>,
    /// Pre-rendered, annotated snippet
    #[serde(default)]
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl SourceContext {
    /// A context carrying no source information.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(file: impl Into<String>, line: u32, snippet: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            snippet: snippet.into(),
            ..Self::default()
        }
    }

    pub fn with_lines(mut self, lines: BTreeMap<u32, String>) -> Self {
        self.lines = lines;
        self
    }

    pub fn with_method(
        mut self,
        class_name: Option<String>,
        method_signature: impl Into<String>,
    ) -> Self {
        self.class_name = class_name;
        self.method_signature = Some(method_signature.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.snippet.is_empty() && self.lines.is_empty()
    }

    /// The failing line's text, if captured.
    pub fn failing_line(&self) -> Option<&str> {
        self.lines.get(&self.line).map(String::as_str)
    }
}

/// HTTP request being served when the failure occurred.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Framework-specific extras, already redacted
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, Value>,
}

impl RequestContext {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// One-line summary such as `POST /users (users.store)`.
    pub fn summary(&self) -> String {
        match &self.route {
            Some(route) => format!("{} {} ({})", self.method, self.url, route),
            None => format!("{} {}", self.method, self.url),
        }
    }
}
