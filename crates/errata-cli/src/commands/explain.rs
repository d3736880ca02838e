//! Explain command - run the engine over a captured context.

use errata_core::{Explanation, RuntimeContext};
use errata_engine::{CachingExplanationEngine, EngineConfig, Explainer};
use std::fmt::Write;
use std::path::Path;

pub(crate) async fn run(file: &Path, json: bool, no_ai: bool) -> miette::Result<()> {
    let context = load_context(file)?;

    let mut config = EngineConfig::from_env();
    if no_ai {
        config.ai.enabled = false;
    }
    config
        .validate()
        .map_err(|e| miette::miette!("Invalid configuration: {}", e))?;

    let engine = CachingExplanationEngine::from_config(&config);
    let explanation = engine.explain(&context).await;

    if json {
        let output = serde_json::to_string_pretty(&explanation.to_map())
            .map_err(|e| miette::miette!("Failed to serialize explanation: {}", e))?;
        println!("{}", output);
    } else {
        print!("{}", render(&explanation));
    }

    Ok(())
}

fn load_context(path: &Path) -> miette::Result<RuntimeContext> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Failed to read context file: {}", e))?;

    let context: RuntimeContext = serde_json::from_str(&content)
        .map_err(|e| miette::miette!("Failed to parse context JSON: {}", e))?;

    Ok(context)
}

/// Plain-text summary.
fn render(e: &Explanation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", e.message);
    let _ = writeln!(
        out,
        "  [{}] confidence {:.2} ({})",
        e.error_type,
        e.confidence,
        e.confidence_level()
    );
    if !e.location.is_empty() {
        let _ = writeln!(out, "  at {}", e.location);
    }
    if let Some(call_site) = &e.call_site_location {
        let _ = writeln!(out, "  called from {}", call_site);
    }
    let _ = writeln!(out);

    if !e.cause.is_empty() {
        let _ = writeln!(out, "Cause:");
        let _ = writeln!(out, "  {}", e.cause);
        let _ = writeln!(out);
    }

    if !e.suggestions.is_empty() {
        let _ = writeln!(out, "Suggestions:");
        for (i, suggestion) in e.suggestions.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, suggestion);
        }
        let _ = writeln!(out);
    }

    if let Some(snippet) = &e.code_snippet {
        let _ = writeln!(out, "Code:");
        let _ = writeln!(out, "{}", snippet);
    }

    if let Some(provider) = e.provider() {
        let _ = writeln!(out, "(explained by {})", provider);
    }

    out
}
