use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info, warn};

use autoclaim_domain::registry::AccountRegistry;
use autoclaim_infrastructure::cache::{
    CookieCache, GithubCachePurge, LinuxDoCachePurge, ProfileDir,
};
use autoclaim_infrastructure::config::{AccountSource, RunConfig};
use autoclaim_infrastructure::http::adapters::{
    GithubAdapter, LinuxDoAdapter, PasswordAdapter, SessionAdapter,
};
use autoclaim_infrastructure::http::{HttpAccountRegistry, HttpClient};
use autoclaim_infrastructure::logging::init_logger;
use autoclaim_lib::application::services::{
    AdapterSet, BatchConfig, BatchRunner, BatchSummary, CheckinOrchestrator, PurgeSet,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let log_dir = std::env::var("AUTOCLAIM_LOG_DIR")
        .ok()
        .filter(|d| !d.trim().is_empty())
        .map(PathBuf::from);
    init_logger(log_dir)?;

    let config = RunConfig::from_env();

    let registry: Option<Arc<dyn AccountRegistry>> = match &config.registry {
        Some(registry_config) => Some(Arc::new(
            HttpAccountRegistry::new(registry_config)
                .context("Failed to initialize registry client")?,
        )),
        None => None,
    };

    let accounts = match &config.accounts {
        AccountSource::Inline(accounts) => {
            info!("Running {} locally configured account(s)", accounts.len());
            accounts.clone()
        }
        AccountSource::Invalid => {
            warn!("Account configuration is invalid, nothing to run");
            report(&BatchSummary::empty());
            return Ok(());
        }
        AccountSource::Remote => {
            let registry = registry
                .as_ref()
                .context("Remote account source requires a registry")?;
            let batch = registry
                .get_checkinable_accounts()
                .await
                .context("Failed to fetch checkinable accounts")?;
            info!(
                "Registry returned {} account(s) due for {}",
                batch.total, batch.date
            );
            batch.accounts
        }
        AccountSource::Unconfigured => {
            info!("No accounts configured, nothing to do");
            return Ok(());
        }
    };

    if accounts.is_empty() {
        info!("No accounts due for check-in today");
        report(&BatchSummary::empty());
        return Ok(());
    }

    let runner = build_runner(&config, registry)?;
    let summary = runner.run(accounts).await;
    report(&summary);

    Ok(())
}

fn build_runner(
    config: &RunConfig,
    registry: Option<Arc<dyn AccountRegistry>>,
) -> Result<BatchRunner> {
    let client = Arc::new(HttpClient::new().context("Failed to initialize HTTP client")?);

    let adapters = AdapterSet {
        session: Arc::new(SessionAdapter::new(client.clone())),
        password: Arc::new(PasswordAdapter::new(client.clone())),
        linuxdo: Arc::new(LinuxDoAdapter::new(
            client.clone(),
            CookieCache::default_location(),
        )),
        github: Arc::new(GithubAdapter::new(client, ProfileDir::default_location())),
    };
    let purges = PurgeSet {
        linuxdo: Arc::new(LinuxDoCachePurge::new(CookieCache::default_location())),
        github: Arc::new(GithubCachePurge::new(ProfileDir::default_location())),
    };

    let orchestrator = CheckinOrchestrator::new(adapters, purges, registry);
    Ok(BatchRunner::new(
        orchestrator,
        BatchConfig {
            first_delay_enabled: config.first_delay_enabled,
            min_delay_secs: config.min_delay_secs,
            max_delay_secs: config.max_delay_secs,
        },
    ))
}

fn report(summary: &BatchSummary) {
    info!(
        "Batch finished: {}/{} account(s) succeeded",
        summary.success_count, summary.total
    );
    for (recipient, stats) in &summary.groups {
        info!(
            "  {} -> {}/{} succeeded",
            recipient, stats.success_count, stats.total
        );
    }
    for result in &summary.results {
        match (&result.outcome.summary, &result.outcome.error) {
            (Some(text), _) => info!(
                "  [{}] {} via {}",
                result.username.as_deref().unwrap_or(&result.account_id),
                text.replace('\n', "; "),
                result.outcome.method
            ),
            (None, Some(err)) => info!(
                "  [{}] failed via {}: {}",
                result.username.as_deref().unwrap_or(&result.account_id),
                result.outcome.method,
                err
            ),
            (None, None) => {}
        }
    }
}
