use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::{stream::FuturesUnordered, StreamExt};
use palletscraper::{
    area::{combined_square_feet, AreaColumns, PalletSummary},
    extract_pallet_table,
    fetch::validate_pallet_id,
    Config, ExtractionResult, PalletFetcher,
};
use std::{collections::HashSet, fs, path::PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Smallest auction id the site hands out for pallets.
const MIN_PALLET_ID: u64 = 1000;

/// Fetch pallet listings and report their square footage.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Pallet (auction) ids to fetch
    ids: Vec<String>,

    /// Parse a saved listing page instead of fetching
    #[arg(long, conflicts_with = "ids")]
    html: Option<PathBuf>,

    /// Print the extracted tables as JSON
    #[arg(long)]
    json: bool,

    /// Column key holding the item count
    #[arg(long, default_value = "pallet")]
    count_column: String,
}

/// Ids to fetch, in the order given, plus the ones refused and why.
/// Repeats of an id are dropped with a warning.
fn plan_ids(raw: &[String]) -> (Vec<String>, Vec<(String, String)>) {
    let mut seen = HashSet::new();
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for given in raw {
        let id = match validate_pallet_id(given) {
            Ok(id) => id,
            Err(e) => {
                rejected.push((given.clone(), e.to_string()));
                continue;
            }
        };
        // digit strings too long for u64 are well past the minimum
        if id.parse::<u64>().map_or(false, |v| v < MIN_PALLET_ID) {
            rejected.push((
                given.clone(),
                format!("pallet id must be at least {}", MIN_PALLET_ID),
            ));
            continue;
        }
        if !seen.insert(id.to_string()) {
            warn!(pallet_id = %id, "pallet id given more than once; skipping repeat");
            continue;
        }
        accepted.push(id.to_string());
    }

    (accepted, rejected)
}

fn print_summary(summary: &PalletSummary) {
    println!(
        "{:>10}  {:>4} items  {:>6} ft²",
        summary.pallet_id,
        summary.items.len(),
        summary.ft_sq
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cols = AreaColumns {
        count: args.count_column.clone(),
        ..AreaColumns::default()
    };

    // ─── local file ──────────────────────────────────────────────────
    if let Some(path) = &args.html {
        let html = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let result = extract_pallet_table(&html);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            let label = path.display().to_string();
            print_summary(&PalletSummary::from_extraction(label, &result, &cols));
        }
        return Ok(());
    }

    if args.ids.is_empty() {
        bail!("no pallet ids given (or use --html <file>)");
    }

    let (ids, rejected) = plan_ids(&args.ids);
    for (id, reason) in &rejected {
        eprintln!("{}: {}", id, reason);
    }
    let mut failures = rejected.len();

    // ─── fetch every id concurrently ─────────────────────────────────
    let cfg = Config::load()?;
    let fetcher = PalletFetcher::new(&cfg)?;

    let mut pending: FuturesUnordered<_> = ids
        .iter()
        .map(|id| {
            let fetcher = fetcher.clone();
            let id = id.clone();
            async move {
                let res = fetcher.fetch_pallet(&id).await;
                (id, res)
            }
        })
        .collect();

    let mut fetched: Vec<(String, ExtractionResult)> = Vec::new();
    while let Some((id, res)) = pending.next().await {
        match res {
            Ok(result) => {
                info!(pallet_id = %id, rows = result.rows.len(), "fetched");
                fetched.push((id, result));
            }
            Err(e) => {
                error!(pallet_id = %id, error = %e, "fetch failed");
                eprintln!("{}: {}", id, e);
                failures += 1;
            }
        }
    }

    // keep the order the ids were given in
    fetched.sort_by_key(|(id, _)| ids.iter().position(|x| x == id));

    if args.json {
        let tables: serde_json::Map<String, serde_json::Value> = fetched
            .iter()
            .map(|(id, r)| -> Result<(String, serde_json::Value)> {
                Ok((id.clone(), serde_json::to_value(r)?))
            })
            .collect::<Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&tables)?);
    } else {
        let summaries: Vec<PalletSummary> = fetched
            .iter()
            .map(|(id, r)| PalletSummary::from_extraction(id.clone(), r, &cols))
            .collect();
        for s in &summaries {
            print_summary(s);
        }
        println!("{:>10}  {:>18} ft²", "total", combined_square_feet(&summaries));
    }

    if failures > 0 {
        bail!("{} of {} pallets failed", failures, args.ids.len());
    }
    Ok(())
}
