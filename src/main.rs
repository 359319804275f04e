// =============================================================================
// ta-engine — Main Entry Point
// =============================================================================
//
// Usage:
//   ta-engine [BARS_JSON]            analyse every configured symbol
//   ta-engine --write-default-config write the default config and exit
//
// BARS_JSON (or $TA_BARS_PATH) maps symbols to ascending daily bars:
//   { "AAPL": [ { "timestamp": "...", "open": .., "high": .., ... }, ... ] }
//
// The report is printed to stdout as pretty JSON; logs go to stderr.
// =============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Context};
use futures_util::future::join_all;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ta_engine::engine_config::{BARS_PATH_ENV, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use ta_engine::market_data::with_change_percent;
use ta_engine::{analyze_symbol, Bar, EngineConfig, SymbolReport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let arg = std::env::args().nth(1);

    if arg.as_deref() == Some("--write-default-config") {
        EngineConfig::default().save(&config_path)?;
        return Ok(());
    }

    let mut config = EngineConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });
    config.apply_env_overrides();
    config.validate().context("invalid engine configuration")?;

    info!(symbols = ?config.symbols, windows = ?config.sr.windows, "Configured symbols");

    // ── 2. Load bars ─────────────────────────────────────────────────────
    let Some(bars_path) = arg.or_else(|| std::env::var(BARS_PATH_ENV).ok()) else {
        bail!("no bar data: pass a JSON file path or set {BARS_PATH_ENV}");
    };
    let content = tokio::fs::read_to_string(&bars_path)
        .await
        .with_context(|| format!("failed to read bars from {bars_path}"))?;
    let raw: BTreeMap<String, Vec<Bar>> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse bars from {bars_path}"))?;
    let mut bars_by_symbol: BTreeMap<String, Vec<Bar>> = raw
        .into_iter()
        .map(|(symbol, bars)| (symbol.trim().to_uppercase(), with_change_percent(bars)))
        .collect();

    // ── 3. Analyse symbols concurrently ──────────────────────────────────
    let now = chrono::Utc::now();
    let config = Arc::new(config);

    let mut tasks = Vec::new();
    for symbol in &config.symbols {
        let Some(bars) = bars_by_symbol.remove(&symbol.to_uppercase()) else {
            warn!(symbol = %symbol, "No bars supplied, skipping");
            continue;
        };
        let cfg = config.clone();
        let sym = symbol.clone();
        tasks.push(tokio::task::spawn_blocking(move || {
            let result = analyze_symbol(&sym, &bars, &cfg, now);
            (sym, result)
        }));
    }

    let mut reports: Vec<SymbolReport> = Vec::new();
    for joined in join_all(tasks).await {
        match joined {
            Ok((_, Ok(report))) => reports.push(report),
            Ok((symbol, Err(e))) => {
                error!(symbol = %symbol, error = format!("{e:#}"), "Analysis failed")
            }
            Err(e) => error!(error = %e, "Analysis task panicked"),
        }
    }

    info!(analysed = reports.len(), requested = config.symbols.len(), "Analysis complete");

    // ── 4. Emit report ───────────────────────────────────────────────────
    let output = serde_json::to_string_pretty(&reports).context("failed to serialise report")?;
    println!("{output}");

    Ok(())
}
