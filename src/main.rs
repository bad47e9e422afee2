// src/main.rs
use anyhow::{bail, Context, Result};
use campaign_checker::{
    check::{CheckCallbacks, CheckClient, CheckError, CheckPeriod, CheckRequest, HttpCheckApi},
    config::{self, Config},
    page::Page,
    render::{ResultsRenderer, TableView},
    token::{HttpTokenSource, TokenRefresher},
};
use std::sync::{Arc, Mutex};
use tokio::signal;
use tokio::sync::Notify;
use tracing::{info, warn};

#[derive(Default)]
struct Report {
    table: TableView,
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("campaign_checker=debug".parse()?)
                .add_directive("reqwest=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "config.yaml".to_string());
    let Some(campaign_id) = args.next() else {
        bail!("usage: campaign-checker <config> <campaign_id> [period]");
    };

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path).await?;

    let period = match args.next() {
        Some(p) => p.parse::<CheckPeriod>().map_err(anyhow::Error::msg)?,
        None => config.check.period,
    };

    let page = Arc::new(Page::new(config.server.csrf_token.clone()));
    page.add_field(config.token_refresh.field_name.clone(), config.server.csrf_token.clone());

    let refresher = start_token_refresher(&config, page.clone())?;

    let report = Arc::new(Mutex::new(Report::default()));
    let done = Arc::new(Notify::new());

    let api = HttpCheckApi::new(config.server.base_url.clone(), config.server.timeout(), page)
        .context("Failed to create HTTP client")?;
    let client = CheckClient::new(
        Arc::new(api),
        CheckRequest::new(campaign_id, period),
        callbacks(report.clone(), done.clone()),
    )
    .with_poll_interval(config.check.poll_interval());

    client.start().await;

    let interrupted = tokio::select! {
        _ = done.notified() => false,
        _ = shutdown_signal() => {
            client.stop();
            true
        }
    };

    if let Some(refresher) = refresher {
        refresher.shutdown();
    }
    if interrupted {
        bail!("Campaign check interrupted");
    }

    let report = report.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(error) = &report.error {
        bail!("Campaign check failed: {}", error);
    }
    print!("{}", report.table);

    Ok(())
}

fn callbacks(report: Arc<Mutex<Report>>, done: Arc<Notify>) -> CheckCallbacks {
    let on_success = report.clone();
    let on_error = report;

    CheckCallbacks::new()
        .on_start(|| info!("Check requested"))
        .on_success(move |results| {
            let mut report = on_success.lock().unwrap_or_else(|e| e.into_inner());
            ResultsRenderer::render(results, &mut report.table);
        })
        .on_error(move |error: &CheckError| {
            let mut report = on_error.lock().unwrap_or_else(|e| e.into_inner());
            report.error = Some(error.to_string());
        })
        .on_complete(move || done.notify_one())
}

fn start_token_refresher(config: &Config, page: Arc<Page>) -> Result<Option<Arc<TokenRefresher>>> {
    if !config.token_refresh.enabled {
        return Ok(None);
    }

    let source = HttpTokenSource::new(
        &config.server.base_url,
        &config.token_refresh.path,
        config.server.timeout(),
    )
    .context("Failed to create token source")?;

    let refresher = Arc::new(
        TokenRefresher::new(Arc::new(source), page, config.token_refresh.field_name.clone())
            .with_interval(config.token_refresh.interval()),
    );
    tokio::spawn(refresher.clone().start());

    Ok(Some(refresher))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
