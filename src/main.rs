use anyhow::{Context, Result};
use palletscraper::{server, Config, PalletFetcher};
use std::{env, net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let cfg = Config::load().context("loading configuration")?;
    let fetcher = Arc::new(PalletFetcher::new(&cfg).context("building upstream client")?);

    // ─── 3) serve ────────────────────────────────────────────────────
    let routes = server::routes(fetcher, cfg.static_dir.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));

    let (bound, serving) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .with_context(|| format!("binding {}", addr))?;

    info!("listening on http://{}", bound);
    info!("pallet endpoint: POST http://{}/api/pallet", bound);
    info!("serving assets from {}", cfg.static_dir.display());

    serving.await;
    info!("all done");
    Ok(())
}
