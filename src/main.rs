use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reel_match::{
    config::Config,
    db::{create_redis_client, Cache, RedisStore},
    routes::{create_router, AppState},
    services::{
        providers::TmdbProvider, CatalogIndex, CatalogSource, EnricherSettings, MetadataEnricher,
        Recommender,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reel_match=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let source = CatalogSource {
        movies_path: config.movies_path.clone().into(),
        similarity_path: config.similarity_path.clone().into(),
    };
    let catalog = CatalogIndex::load(&source.movies_path, &source.similarity_path)?
        .with_neighbor_count(config.recommendation_count);

    let provider = TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_language.clone(),
        config.request_timeout(),
    )?;

    let (cache, cache_writer) = match &config.redis_url {
        Some(redis_url) => {
            let client = create_redis_client(redis_url)?;
            let (store, handle) = RedisStore::new(client, config.cache_ttl());
            tracing::info!("Using Redis metadata cache");
            (Cache::new(Arc::new(store)), Some(handle))
        }
        None => {
            tracing::info!("Using in-memory metadata cache");
            (Cache::in_memory(), None)
        }
    };

    let enricher = MetadataEnricher::new(Arc::new(provider), cache, EnricherSettings::from(&config));
    let recommender = Recommender::new(catalog, enricher).with_source(source);

    let app = create_router(AppState::new(recommender)).layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        let stats = handle.shutdown().await;
        tracing::info!(written = stats.written, failed = stats.failed, "Cache writes flushed");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
