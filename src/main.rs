use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medicure::api::server;
use medicure::api::types::ApiContext;
use medicure::config::{Config, APP_NAME, APP_VERSION};
use medicure::mail::SmtpMailer;
use medicure::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medicure=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        version = APP_VERSION,
        data_dir = %config.data_dir.display(),
        "{APP_NAME} starting"
    );

    let state = AppState::load(&config)?;

    // Open once at startup so migrations run before the first request.
    drop(medicure::db::open_database(&config.database_path)?);

    let mailer = Arc::new(SmtpMailer::new(&config.mail)?);
    let ctx = ApiContext::new(state, config.database_path.clone(), mailer);

    server::run(ctx, config.bind_addr).await
}
