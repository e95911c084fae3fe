use netconfig::{Config, RegistryStore, Session, StatusResolver, error::NetconfigError};
use netconfig_data::ChartClient;
use std::{process, sync::Arc};
use tokio::{io::BufReader, sync::Notify};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    init_logging();

    let config = Config::from_env();
    info!(file = %config.config_file.display(), "Starting network configuration utility");

    let store = match RegistryStore::open(&config.config_file) {
        Ok(store) => store,
        Err(e) => {
            error!("{}", e);
            eprintln!("[ERROR] {}", e);
            if matches!(e, NetconfigError::ConfigMissing(_)) {
                eprintln!("Please create the {} file first", config.config_file.display());
            }
            process::exit(1);
        }
    };

    let client = match ChartClient::new(config.chart_config()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to initialise data provider: {}", e);
            process::exit(1);
        }
    };

    // Every Ctrl+C is forwarded to the session: it stops the live monitor, or ends the
    // session when pressed at a prompt
    let interrupt = Arc::new(Notify::new());
    let notifier = Arc::clone(&interrupt);
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            notifier.notify_one();
        }
    });

    let mut session = Session::new(
        store,
        StatusResolver::new(client),
        config,
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
        interrupt,
    );

    // Exit explicitly: a stdin read left pending by an interrupt would otherwise hold the
    // runtime open until the next newline
    match session.run().await {
        Ok(()) => process::exit(0),
        Err(e) => {
            error!("Network utility error: {}", e);
            process::exit(1);
        }
    }
}

/// Diagnostics go to stderr so they never interleave with the redrawn status table.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
