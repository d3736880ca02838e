//! Info command - show strategies and the configuration read from the environment.

use errata_engine::{EngineConfig, ExplanationEngine};

pub(crate) fn run() -> miette::Result<()> {
    let config = EngineConfig::from_env();

    println!("Errata");
    println!("======");
    println!();
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("Strategies (evaluation order):");
    let engine = ExplanationEngine::with_default_strategies(None);
    for (i, name) in engine.strategy_names().iter().enumerate() {
        println!("  {}. {}", i + 1, name);
    }
    println!();

    let ai = &config.ai;
    println!("AI:");
    println!("  Enabled:  {}", ai.enabled);
    println!("  Provider: {}", ai.provider);
    println!("  Model:    {}", ai.model);
    println!("  API key:  {}", if ai.api_key.is_empty() { "not set" } else { "set" });
    if let Some(url) = &ai.base_url {
        println!("  Base URL: {}", url);
    }
    println!("  Timeout:  {}s", ai.timeout_secs);
    if !ai.fallback_providers.is_empty() {
        let names: Vec<String> = ai.fallback_providers.iter().map(|k| k.to_string()).collect();
        println!("  Fallback: {}", names.join(", "));
    }
    println!();

    println!("Cache:");
    println!("  Enabled:  {}", config.cache.enabled);
    println!("  TTL:      {}s", config.cache.ttl_secs);
    println!();

    if let Err(e) = config.validate() {
        println!("Warning: {}", e);
    }

    Ok(())
}
