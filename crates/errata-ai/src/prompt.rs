//! Prompt engineering for failure analysis.

use std::fmt::Write;

use errata_core::RuntimeContext;
use serde_json::Value;

/// Stack frames included in a prompt.
pub const MAX_PROMPT_FRAMES: usize = 5;

/// System prompt for failure analysis.
pub const SYSTEM_PROMPT: &str = r#"You are an expert software engineer who explains runtime errors to the developer who hit them.

## Rules

1. Output ONLY a single JSON object, no prose before or after it
2. Explain the root cause in terms of the developer's code, not the runtime internals
3. Suggestions must be concrete, ordered actions (most likely fix first)
4. If the cause is uncertain, say so and lower the confidence

## Output Format

```json
{
  "message": "One sentence restating what failed",
  "cause": "Why it failed",
  "suggestions": ["First fix to try", "Second fix to try"],
  "confidence": 0.8
}
```
"#;

/// Build the user prompt describing one failure.
pub fn build_user_prompt(context: &RuntimeContext) -> String {
    let exception = &context.exception;
    let mut prompt = String::new();

    let _ = writeln!(prompt, "Explain this runtime error.\n");
    let _ = writeln!(prompt, "## Error\n");
    let _ = writeln!(prompt, "**Type**: {}", exception.class);
    let _ = writeln!(prompt, "**Message**: {}", exception.message);
    if exception.code != 0 {
        let _ = writeln!(prompt, "**Code**: {}", exception.code);
    }
    let _ = writeln!(prompt, "**Location**: {}", exception.location());
    if let Some(previous) = &exception.previous {
        let _ = writeln!(
            prompt,
            "**Caused by**: {}: {}",
            previous.class, previous.message
        );
    }

    let frames = &context.stack_trace.frames;
    if !frames.is_empty() {
        let _ = writeln!(prompt, "\n## Stack Trace (top {MAX_PROMPT_FRAMES})\n");
        for (i, frame) in frames.iter().take(MAX_PROMPT_FRAMES).enumerate() {
            let vendor = if frame.is_vendor { " [vendor]" } else { "" };
            let _ = writeln!(
                prompt,
                "#{i} {} at {}{vendor}",
                frame.full_method(),
                frame.location()
            );
        }
    }

    let source = &context.source;
    if !source.snippet.is_empty() {
        let _ = writeln!(prompt, "\n## Source ({})\n", source.file);
        if let Some(signature) = &source.method_signature {
            let _ = writeln!(prompt, "Enclosing method: `{signature}`\n");
        }
        let _ = writeln!(prompt, "```\n{}\n```", source.snippet.trim_end());
    }

    let mut environment = Vec::new();
    if let Some(request) = &context.request {
        environment.push(format!("Request: {}", request.summary()));
    }
    if let Some(app) = &context.application {
        environment.push(format!("Application: {}", summarize(app)));
    }
    if let Some(db) = &context.database {
        environment.push(format!("Database: {}", summarize(db)));
    }
    if let Some(perf) = &context.performance {
        environment.push(format!("Performance: {}", summarize(perf)));
    }
    if !environment.is_empty() {
        let _ = writeln!(prompt, "\n## Environment\n");
        for line in environment {
            let _ = writeln!(prompt, "- {line}");
        }
    }

    let _ = write!(prompt, "\nRespond with the JSON object now:");
    prompt
}

/// Flatten an opaque context value into a single `key=value` line.
fn summarize(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_object() && !v.is_array())
            .map(|(k, v)| match v {
                Value::String(s) => format!("{k}={s}"),
                other => format!("{k}={other}"),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
