use landingpage::{
    config::{get_or_init_config, StoreBackend},
    database::DbManager,
    serve,
    store::{InMemorySubscriptionStore, PgSubscriptionStore},
    App, Result,
};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    // We have a different logging mechanism for production
    #[cfg(not(debug_assertions))]
    {
        landingpage::init_production_tracing()
    }
    #[cfg(debug_assertions)]
    {
        landingpage::init_dbg_tracing();
    }

    let config = get_or_init_config();

    match config.store_config.backend {
        StoreBackend::Postgres => {
            let database_mgr = DbManager::init(config).await?;
            database_mgr.migrate().await?;
            let store = PgSubscriptionStore::new(database_mgr);

            serve(App::build_from_config(config, store).await?).await?;
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store, subscriptions are lost on shutdown!");
            let store = InMemorySubscriptionStore::new();

            serve(App::build_from_config(config, store).await?).await?;
        }
    }

    Ok(())
}
