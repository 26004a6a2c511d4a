use std::sync::Arc;

use anyhow::{Context, Result};

use dealership_auth::{BcryptHasher, Hs256Jwt, RoleResolver};
use dealership_core::{Clock, SystemClock};
use dealership_infra::{
    AccountDirectory, AppConfig, InMemoryMarketplace, Marketplace, MarketplaceStore,
    PostgresMarketplace,
};

/// Everything a request handler needs, built once at startup.
pub struct AppServices {
    pub marketplace: Marketplace,
    pub resolver: RoleResolver<AccountDirectory>,
}

/// Postgres when `DATABASE_URL` is configured, otherwise the in-memory store.
pub async fn build_services(config: &AppConfig) -> Result<AppServices> {
    let store: Arc<dyn MarketplaceStore> = match &config.database_url {
        Some(url) => {
            let pg = PostgresMarketplace::connect(url, config.database_max_connections)
                .await
                .context("failed to connect to Postgres")?;
            pg.migrate().await.context("failed to apply schema")?;
            tracing::info!("using Postgres store");
            Arc::new(pg)
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory store");
            Arc::new(InMemoryMarketplace::new())
        }
    };

    Ok(assemble(config, store, Arc::new(SystemClock)))
}

/// Wire the workflows and the resolver around one store and one clock.
pub fn assemble(
    config: &AppConfig,
    store: Arc<dyn MarketplaceStore>,
    clock: Arc<dyn Clock>,
) -> AppServices {
    let tokens = Arc::new(Hs256Jwt::new(&config.token));
    let marketplace = Marketplace::new(
        store.clone(),
        Arc::new(BcryptHasher::with_cost(config.bcrypt_cost)),
        tokens.clone(),
        clock.clone(),
        config.deal_policy,
    );
    let resolver = RoleResolver::new(tokens, AccountDirectory::new(store), clock);

    AppServices {
        marketplace,
        resolver,
    }
}
