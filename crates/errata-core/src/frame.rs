//! Stack frames and traces.

use serde::{Deserialize, Serialize};

/// How a frame's function was invoked on its owning type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallKind {
    /// Instance method call (`->`)
    #[serde(rename = "->")]
    Instance,
    /// Static method call (`::`)
    #[serde(rename = "::")]
    Static,
}

impl CallKind {
    /// The operator as it appears in a rendered method name.
    pub fn as_str(self) -> &'static str {
        match self {
            CallKind::Instance => "->",
            CallKind::Static => "::",
        }
    }
}

/// A single frame of a stack trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackFrame {
    /// Source file
    #[serde(default)]
    pub file: String,
    /// Line number (0 when unknown)
    #[serde(default)]
    pub line: u32,
    /// Owning type, if the function is a method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Function or method name
    #[serde(default)]
    pub function: String,
    /// Call operator, if the function is a method
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub call_kind: Option<CallKind>,
    /// Whether the frame belongs to third-party code
    #[serde(default)]
    pub is_vendor: bool,
}

impl StackFrame {
    /// Create a plain function frame.
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            class: None,
            function: function.into(),
            call_kind: None,
            is_vendor: false,
        }
    }

    /// Make this frame a method call on `class`.
    pub fn in_class(mut self, class: impl Into<String>, kind: CallKind) -> Self {
        self.class = Some(class.into());
        self.call_kind = Some(kind);
        self
    }

    /// Mark this frame as third-party code.
    pub fn vendor(mut self) -> Self {
        self.is_vendor = true;
        self
    }

    /// `Type<op>function`, or just `function` for free functions.
    pub fn full_method(&self) -> String {
        match &self.class {
            Some(class) => {
                let op = self.call_kind.map_or("::", CallKind::as_str);
                format!("{}{}{}", class, op, self.function)
            }
            None => self.function.clone(),
        }
    }

    /// `file:line`.
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

/// An ordered stack trace, innermost frame first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackTrace {
    #[serde(default)]
    pub frames: Vec<StackFrame>,
    /// Raw trace text as reported by the runtime
    #[serde(default)]
    pub raw: String,
}

impl StackTrace {
    pub fn new(frames: Vec<StackFrame>, raw: impl Into<String>) -> Self {
        Self {
            frames,
            raw: raw.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The frame that called the one that threw.
    pub fn caller(&self) -> Option<&StackFrame> {
        self.frames.get(1)
    }

    /// First frame that is not third-party code.
    pub fn first_application_frame(&self) -> Option<&StackFrame> {
        self.frames.iter().find(|f| !f.is_vendor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_method() {
        let frame = StackFrame::new("src/Service.php", 10, "handle")
            .in_class("App\\Service", CallKind::Instance);
        assert_eq!(frame.full_method(), "App\\Service->handle");

        let frame = StackFrame::new("src/Factory.php", 3, "create")
            .in_class("App\\Factory", CallKind::Static);
        assert_eq!(frame.full_method(), "App\\Factory::create");

        let frame = StackFrame::new("src/helpers.php", 7, "array_get");
        assert_eq!(frame.full_method(), "array_get");
    }

    #[test]
    fn test_location() {
        let frame = StackFrame::new("src/Service.php", 10, "handle");
        assert_eq!(frame.location(), "src/Service.php:10");
    }

    #[test]
    fn test_first_application_frame() {
        let trace = StackTrace::new(
            vec![
                StackFrame::new("vendor/lib/Client.php", 88, "send").vendor(),
                StackFrame::new("src/Api.php", 12, "fetch"),
            ],
            "",
        );
        assert_eq!(trace.first_application_frame().unwrap().file, "src/Api.php");
        assert_eq!(trace.caller().unwrap().line, 12);
    }

    #[test]
    fn test_call_kind_serialization() {
        let frame = StackFrame::new("a.php", 1, "f").in_class("A", CallKind::Static);
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "::");
        let back: StackFrame = serde_json::from_value(json).unwrap();
        assert_eq!(back, frame);
    }
}
