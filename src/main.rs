use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use rateyourwatch_api::{
    create_router,
    db::{create_pool, create_redis_client, Cache, PostgresStore},
    services::providers::TmdbProvider,
    AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let store = PostgresStore::new(pool);
    store.migrate().await?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, _cache_writer) = Cache::new(redis_client).await;

    let catalog = TmdbProvider::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_image_url.clone(),
    );

    let state = AppState::new(Arc::new(store), Arc::new(catalog));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
