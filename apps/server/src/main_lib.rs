use std::sync::Arc;

use crate::config::Config;
use roster_core::accounts::{AccountService, AccountServiceTrait};
use roster_storage_sqlite::{
    accounts::AccountRepository, create_pool, init, run_migrations, spawn_writer,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub account_service: Arc<dyn AccountServiceTrait>,
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone())?;

    let account_repo = Arc::new(AccountRepository::new(pool.clone(), writer));
    let account_service: Arc<dyn AccountServiceTrait> =
        Arc::new(AccountService::new(account_repo));

    Ok(Arc::new(AppState { account_service }))
}
