use tracing_subscriber::EnvFilter;

use clinica::api::{start_server, ApiContext};
use clinica::config::{self, AppConfig};
use clinica::db::{seed, sqlite};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env();
    tracing::info!(
        app = config::APP_NAME,
        version = config::APP_VERSION,
        db = %config.database_path.display(),
        "Starting"
    );

    let conn = match sqlite::open_database(&config.database_path) {
        Ok(conn) => conn,
        Err(err) => {
            tracing::error!(%err, "Failed to open database");
            std::process::exit(1);
        }
    };

    match seed::seed_demo_users(&conn) {
        Ok(true) => tracing::info!("Seeded demo accounts"),
        Ok(false) => {}
        Err(err) => {
            tracing::error!(%err, "Failed to seed demo accounts");
            std::process::exit(1);
        }
    }

    let addr = config.bind_addr;
    let ctx = ApiContext::new(conn, config);

    let mut server = match start_server(ctx, addr).await {
        Ok(server) => server,
        Err(err) => {
            tracing::error!(%err, "Failed to start API server");
            std::process::exit(1);
        }
    };

    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
    server.shutdown();
}
