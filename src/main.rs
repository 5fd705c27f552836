use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use pagefeed::app::{context::AppContext, orchestrator::Orchestrator};
use pagefeed::domain::model::{AppMode, TriggerMessage};
use pagefeed::infra::{
    bootstrap::HttpSeedSource,
    chromium::ChromiumBrowser,
    config::ConfigLoader,
    logging::{init_logging, BootError},
    sqlite_repo::SqliteRepo,
    system_clock::SystemClock,
};
use pagefeed::ports::{repo::FeedRepo, seed::SeedSource};
use pagefeed::server::{router, ServerState};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), BootError> {
    let cfg_path = pick_config_path(std::env::args().nth(1));
    let cfg = ConfigLoader::load(&cfg_path)
        .await
        .map_err(|e| BootError::Fatal(e.to_string()))?;
    init_logging(&cfg.log_level);

    info!(
        db_path = %cfg.db_path.display(),
        batch_size = cfg.refresh.max_concurrent_sessions,
        "Loaded config"
    );

    if matches!(cfg.mode, AppMode::Dev) {
        warn!(db_path = %cfg.db_path.display(), "Dev mode enabled, deleting database");
        let _ = tokio::fs::remove_file(&cfg.db_path).await;
    }

    let repo = Arc::new(SqliteRepo::new(&cfg.db_path).await.map_err(BootError::Fatal)?);
    repo.migrate().await.map_err(BootError::Fatal)?;

    let browser = Arc::new(
        ChromiumBrowser::launch(&cfg.browser)
            .await
            .map_err(|e| BootError::Fatal(e.to_string()))?,
    );
    let clock = Arc::new(SystemClock);

    let seed: Option<Arc<dyn SeedSource>> = match &cfg.bootstrap_url {
        Some(url) => Some(Arc::new(
            HttpSeedSource::new(url.clone()).map_err(BootError::Fatal)?,
        )),
        None => None,
    };

    let (status_tx, _) = broadcast::channel(64);
    let (trigger_tx, mut trigger_rx) = mpsc::channel::<TriggerMessage>(16);

    let cfg = Arc::new(cfg);
    let ctx = AppContext {
        cfg: cfg.clone(),
        repo: repo.clone(),
        browser,
        clock,
        status: status_tx.clone(),
    };
    let orchestrator = Arc::new(Orchestrator::new(ctx, seed));

    // Triggers are handled one at a time; overlapping refreshes queue up.
    tokio::spawn(async move {
        while let Some(msg) = trigger_rx.recv().await {
            orchestrator.handle(msg).await;
        }
    });

    if let Some(seconds) = cfg.refresh_interval_seconds {
        let tx = trigger_tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(seconds));
            interval.tick().await; // immediate first tick is skipped
            loop {
                interval.tick().await;
                if tx.send(TriggerMessage::PageRefresh).await.is_err() {
                    break;
                }
            }
        });
        info!(seconds, "Periodic refresh enabled");
    }

    let state = ServerState {
        triggers: trigger_tx,
        status: status_tx,
        repo: repo.clone() as Arc<dyn FeedRepo>,
    };

    let addr: SocketAddr = format!("{}:{}", cfg.http.host, cfg.http.port)
        .parse()
        .map_err(|e| BootError::Fatal(format!("invalid http bind: {e}")))?;
    info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| BootError::Fatal(e.to_string()))?;
    if let Err(e) = axum::serve(listener, router(state)).await {
        error!(error = %e, "Fatal http server error");
        return Err(BootError::Fatal(e.to_string()));
    }

    Ok(())
}

fn pick_config_path(arg1: Option<String>) -> PathBuf {
    if let Some(p) = arg1 {
        return PathBuf::from(p);
    }
    PathBuf::from("res/config.toml")
}
