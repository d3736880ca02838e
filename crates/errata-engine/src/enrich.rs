//! Attach call-site and source snippet to a finished explanation.

use errata_core::{Explanation, RuntimeContext};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// "... called in /app/src/Foo.php on line 12 ..."
    static ref CALLED_IN: Option<Regex> = Regex::new(r"called in (.+?) on line (\d+)").ok();
}

/// Where the faulty call came from, if it differs from the failure site.
///
/// The exception message wins over the stack trace; otherwise the caller
/// of the throwing frame is used.
pub fn call_site(context: &RuntimeContext) -> Option<String> {
    let from_message = CALLED_IN.as_ref().and_then(|re| {
        re.captures(&context.exception.message)
            .map(|caps| format!("{}:{}", &caps[1], &caps[2]))
    });

    from_message
        .or_else(|| context.stack_trace.caller().map(|frame| frame.location()))
        .filter(|location| *location != context.location())
}

/// Enrich `explanation` with code context. Passes through unchanged when
/// neither a snippet nor a distinct call site is available.
pub fn enrich(explanation: Explanation, context: &RuntimeContext) -> Explanation {
    let snippet = Some(context.source.snippet.clone()).filter(|s| !s.trim().is_empty());
    let call_site = call_site(context);

    if snippet.is_none() && call_site.is_none() {
        return explanation;
    }
    explanation.with_code_context(snippet, call_site)
}
