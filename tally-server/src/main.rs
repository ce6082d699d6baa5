mod auth;
mod config;
mod error;
mod routes;

use std::collections::HashSet;
use std::time::Duration;

use tally_ledger::{Ledger, LedgerConfig};
use tracing::{info, warn};

use config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Ledger,
    pub config: ServerConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ServerConfig::from_env();
    info!(port = config.port, "starting tally server");

    let ledger_config = LedgerConfig::builder()
        .pg_con(config.database_url.clone())
        .exec_migrations(true)
        .system_overdraft(
            config
                .system_overdraft
                .iter()
                .cloned()
                .collect::<HashSet<_>>(),
        )
        .chaos_probability(config.chaos_probability)
        .build()?;
    let ledger = Ledger::init(ledger_config).await?;

    if config.cron_enabled {
        spawn_dispatcher_ticker(ledger.clone(), config.clone());
    }

    let state = AppState {
        ledger,
        config: config.clone(),
    };
    let app = routes::router(state);

    let listener =
        tokio::net::TcpListener::bind(&std::net::SocketAddr::from(([0, 0, 0, 0], config.port)))
            .await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    info!("shutting down");
}

/// Optional in-process dispatcher trigger; deployments that drain the outbox
/// via POST /outbox/process leave this disabled.
fn spawn_dispatcher_ticker(ledger: Ledger, config: ServerConfig) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(config.cron_interval_ms));
        loop {
            ticker.tick().await;
            let opts = config.process_opts(None, None, None, None);
            match ledger.outbox().process_once(opts).await {
                Ok(summary) if summary.attempted > 0 => info!(
                    attempted = summary.attempted,
                    sent = summary.sent,
                    retried = summary.retried,
                    "outbox tick"
                ),
                Ok(_) => {}
                Err(err) => warn!(error = %err, "outbox tick failed"),
            }
        }
    });
}
