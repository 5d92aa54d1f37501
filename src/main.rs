//! narrative-dash: financial/narrative time-series dashboard core.
//!
//! Single-binary Tokio application that:
//! 1. Seeds the search registry from a query string
//! 2. Resolves each search text against the narrative backend
//! 3. Fetches the reference price series for a symbol
//! 4. Combines both into one time-series structure
//! 5. Reshapes it into the chart model the widget consumes
//!
//! The default mode is an interactive loop reading `add` / `edit` /
//! `del` / `show` commands from stdin — a stand-in for UI events.

mod config;

use std::path::{Path, PathBuf};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use chart::{build_chart, ChartModel};
use common::{Metric, PriceSeries, WeightSeries};
use narrative_client::NarrativeClient;
use search::{Palette, SearchRegistry};

/// Narrative time-series dashboard
#[derive(Parser)]
#[command(name = "narrative-dash", about = "Narrative time-series dashboard core")]
struct Cli {
    /// Initial query string, e.g. "t=bitcoin&t=halving".
    #[arg(long, default_value = "")]
    query: String,

    /// Reference symbol for the price series (overrides config).
    #[arg(long)]
    symbol: Option<String>,

    /// Plot sentiment instead of prevalence.
    #[arg(long)]
    sentiment: bool,

    /// Write the chart model JSON here after every change.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Resolve the initial query once, print the chart model, exit.
    #[arg(long)]
    dry_run: bool,
}

/// A fetch completion: the search text and its payload (None = error or
/// no result).
type Completion = (String, Option<WeightSeries>);

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "narrative_dash=info,search=info,chart=info,narrative_client=info".into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    // Load configuration.
    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let symbol = cli.symbol.clone().unwrap_or_else(|| cfg.symbol.clone());
    let metric = if cli.sentiment {
        Metric::Sentiment
    } else {
        Metric::Prevalence
    };

    info!("Backend: {}", cfg.backend_url);
    info!("Symbol: {} | metric: {:?}", symbol, metric);

    let client = NarrativeClient::new(&cfg.backend_url, cfg.timing.request_timeout_secs);

    // One palette shuffle per session; colors stay stable afterwards.
    let palette = Palette::shuffled(cfg.palette.clone(), &mut rand::thread_rng());
    let mut registry = SearchRegistry::from_query(&cli.query, palette);
    info!(
        "Registry seeded with {} of max {} searches",
        registry.len(),
        registry.max_entries()
    );

    // Reference series is loaded independently of the searches.
    let price = match client.price_series(&symbol).await {
        Ok(p) => {
            info!("Price series: {} points from {}", p.points.len(), p.from);
            Some(p)
        }
        Err(e) => {
            warn!("Price series unavailable for {}: {}", symbol, e);
            None
        }
    };

    let (tx, mut rx) = mpsc::channel::<Completion>(32);

    let mut current_query = cli.query.clone();
    if let Some(q) = registry.sync_query(&current_query) {
        info!("query → {}", q);
        current_query = q;
    }

    dispatch_pending(&mut registry, &client, &tx);

    // ── Dry-run mode ─────────────────────────────────────────────────
    if cli.dry_run {
        while registry.snapshot().loading > 0 {
            let Some((text, series)) = rx.recv().await else {
                break;
            };
            registry.resolve(&text, series);
        }
        let model = render(&registry, price.as_ref(), &cfg.price_color, metric);
        emit(&model, cli.out.as_deref());
        return;
    }

    // ── Interactive loop ─────────────────────────────────────────────
    println!("commands: add <text> | edit <n> <text> | del <n> | show | quit");
    print_entries(&registry);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            completion = rx.recv() => {
                let Some((text, series)) = completion else { break };
                if registry.resolve(&text, series) {
                    let snap = registry.snapshot();
                    info!(
                        "Resolved {:?}: {} loaded, {} loading",
                        text, snap.loaded.len(), snap.loading
                    );
                    let model = render(&registry, price.as_ref(), &cfg.price_color, metric);
                    if let Some(out) = cli.out.as_deref() {
                        emit(&model, Some(out));
                    }
                }
            }
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                if !handle_command(
                    line.trim(),
                    &mut registry,
                    &client,
                    &tx,
                    price.as_ref(),
                    &cfg.price_color,
                    metric,
                    cli.out.as_deref(),
                ) {
                    break;
                }
                if let Some(q) = registry.sync_query(&current_query) {
                    info!("query → {}", q);
                    current_query = q;
                }
            }
        }
    }

    info!("narrative-dash shut down.");
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Drain newly pending entries and spawn one fetch task per entry.
/// Completions come back over the channel; stale ones are dropped by the
/// registry's own re-check.
fn dispatch_pending(
    registry: &mut SearchRegistry,
    client: &NarrativeClient,
    tx: &mpsc::Sender<Completion>,
) {
    for (_id, text) in registry.take_pending() {
        let client = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let series = match client.text_series(&text).await {
                Ok(s) => Some(s),
                Err(e) => {
                    warn!("Resolution failed for {:?}: {}", text, e);
                    None
                }
            };
            if tx.send((text, series)).await.is_err() {
                debug!("event loop gone; dropping completion");
            }
        });
    }
}

/// Snapshot, combine, and rebuild the chart model.
fn render(
    registry: &SearchRegistry,
    price: Option<&PriceSeries>,
    price_color: &str,
    metric: Metric,
) -> ChartModel {
    let snap = registry.snapshot();
    let combined = chart::combine(price, price_color, &snap.loaded);
    build_chart(combined.as_ref(), metric)
}

/// Print or write the chart model JSON.
fn emit(model: &ChartModel, out: Option<&Path>) {
    let json = match serde_json::to_string_pretty(model) {
        Ok(j) => j,
        Err(e) => {
            error!("Failed to serialize chart model: {}", e);
            return;
        }
    };
    match out {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &json) {
                error!("Failed to write {}: {}", path.display(), e);
            } else {
                info!("Chart model written to {}", path.display());
            }
        }
        None => println!("{}", json),
    }
}

fn print_entries(registry: &SearchRegistry) {
    if registry.is_empty() {
        println!("(no active searches)");
        return;
    }
    for (i, entry) in registry.entries().iter().enumerate() {
        println!(
            "{:>3}. [{:?}] {} ({})",
            i + 1,
            registry.display_state(entry),
            entry.text,
            entry.color
        );
    }
}

/// Execute one interactive command. Returns false to quit.
///
/// Every command that changes the registry rebuilds the chart model, the
/// same as the completion branch — a delete never produces a completion,
/// so waiting for one would leave the emitted model stale.
#[allow(clippy::too_many_arguments)]
fn handle_command(
    line: &str,
    registry: &mut SearchRegistry,
    client: &NarrativeClient,
    tx: &mpsc::Sender<Completion>,
    price: Option<&PriceSeries>,
    price_color: &str,
    metric: Metric,
    out: Option<&Path>,
) -> bool {
    let mut parts = line.splitn(2, ' ');
    let command = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim();
    let mut changed = false;

    match command {
        "" => {}
        "quit" | "exit" => return false,
        "show" => {
            print_entries(registry);
            let model = render(registry, price, price_color, metric);
            emit(&model, out);
        }
        "add" => {
            let outcome = registry.submit(rest, None);
            if outcome.is_change() {
                dispatch_pending(registry, client, tx);
                changed = true;
            } else {
                println!("rejected (empty, duplicate, or registry full)");
            }
            print_entries(registry);
        }
        "edit" => {
            let mut args = rest.splitn(2, ' ');
            let index = args.next().unwrap_or_default().parse::<usize>().ok();
            let text = args.next().unwrap_or_default();
            match index.and_then(|n| registry.entries().get(n.wrapping_sub(1)).map(|e| e.id)) {
                Some(id) => {
                    registry.begin_edit(Some(id));
                    let outcome = registry.submit(text, Some(id));
                    if outcome.is_change() {
                        dispatch_pending(registry, client, tx);
                        changed = true;
                    } else {
                        println!("rejected (empty, duplicate, or unchanged)");
                    }
                }
                None => println!("usage: edit <n> <text>"),
            }
            print_entries(registry);
        }
        "del" => {
            match rest
                .parse::<usize>()
                .ok()
                .and_then(|n| registry.entries().get(n.wrapping_sub(1)).map(|e| e.id))
            {
                Some(id) => {
                    changed = registry.delete(id);
                }
                None => println!("usage: del <n>"),
            }
            print_entries(registry);
        }
        _ => println!("commands: add <text> | edit <n> <text> | del <n> | show | quit"),
    }

    if changed {
        let model = render(registry, price, price_color, metric);
        if out.is_some() {
            emit(&model, out);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use common::WeightSeries;
    use search::Palette;

    fn loaded_registry() -> SearchRegistry {
        let mut registry = SearchRegistry::from_query(
            "t=alpha",
            Palette::fixed(vec!["#red".into(), "#green".into()]),
        );
        registry.take_pending();
        registry.resolve(
            "alpha",
            Some(WeightSeries {
                from: Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap(),
                statistics: None,
                points: Vec::new(),
            }),
        );
        registry
    }

    fn emitted_series_count(path: &Path) -> usize {
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        json["series"].as_array().map(Vec::len).unwrap()
    }

    #[tokio::test]
    async fn deleting_an_entry_rewrites_the_emitted_model() {
        let mut registry = loaded_registry();
        let client = NarrativeClient::new("http://127.0.0.1:9", 1);
        let (tx, _rx) = mpsc::channel::<Completion>(4);
        let out = std::env::temp_dir().join("narrative-dash-del-model.json");

        // Model as emitted while alpha was loaded.
        let before = render(&registry, None, "#90caf9", Metric::Prevalence);
        emit(&before, Some(&out));
        assert_eq!(emitted_series_count(&out), 1);

        let keep_running = handle_command(
            "del 1",
            &mut registry,
            &client,
            &tx,
            None,
            "#90caf9",
            Metric::Prevalence,
            Some(&out),
        );
        assert!(keep_running);

        // A delete never produces a completion, so the out-file must
        // already reflect the empty registry.
        assert_eq!(emitted_series_count(&out), 0);
        let _ = std::fs::remove_file(&out);
    }

    #[tokio::test]
    async fn editing_drops_the_stale_series_from_the_model() {
        let mut registry = loaded_registry();
        let client = NarrativeClient::new("http://127.0.0.1:9", 1);
        let (tx, _rx) = mpsc::channel::<Completion>(4);
        let out = std::env::temp_dir().join("narrative-dash-edit-model.json");

        emit(
            &render(&registry, None, "#90caf9", Metric::Prevalence),
            Some(&out),
        );
        assert_eq!(emitted_series_count(&out), 1);

        handle_command(
            "edit 1 omega",
            &mut registry,
            &client,
            &tx,
            None,
            "#90caf9",
            Metric::Prevalence,
            Some(&out),
        );

        // The rewritten entry is pending again; its old payload is gone
        // from the model without waiting for the new resolution.
        assert_eq!(emitted_series_count(&out), 0);
        let _ = std::fs::remove_file(&out);
    }
}
