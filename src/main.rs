use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use garage_tracker::access::Catalog;
use garage_tracker::config::{Config, StorageKind};
use garage_tracker::db::{create_pool, run_migrations};
use garage_tracker::middleware::gateway;
use garage_tracker::proto::auth::auth_service_server::AuthServiceServer;
use garage_tracker::proto::boxes::boxes_service_server::BoxesServiceServer;
use garage_tracker::proto::health::health_server::HealthServer;
use garage_tracker::proto::images::images_service_server::ImagesServiceServer;
use garage_tracker::proto::items::items_service_server::ItemsServiceServer;
use garage_tracker::proto::search::search_service_server::SearchServiceServer;
use garage_tracker::services::{
    AuthServiceImpl, BoxesServiceImpl, HealthServiceImpl, ImagesServiceImpl, ItemsServiceImpl,
    SearchServiceImpl,
};
use garage_tracker::storage::{Buckets, GcsBackend, MemoryBackend, R2Backend, StorageBackend};
use garage_tracker::store::{InventoryStore, MemoryStore, PgStore, UserStore};

use tonic::transport::Server;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn build_buckets(config: &Config) -> anyhow::Result<Buckets> {
    let base = |bucket: &str| {
        config
            .storage_public_base_url
            .as_ref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), bucket))
    };

    match config.storage {
        StorageKind::Memory => {
            tracing::warn!("Object storage is in memory; uploads are lost on restart");
            Ok(Buckets::new(
                Arc::new(MemoryBackend::new(config.item_images_bucket.clone())),
                Arc::new(MemoryBackend::new(config.box_qrcodes_bucket.clone())),
            ))
        }
        StorageKind::Gcs => {
            tracing::info!("GCS storage enabled");
            let item_images = GcsBackend::new(
                config.item_images_bucket.clone(),
                base(&config.item_images_bucket),
            )
            .await?;
            let box_qrcodes = GcsBackend::new(
                config.box_qrcodes_bucket.clone(),
                base(&config.box_qrcodes_bucket),
            )
            .await?;
            Ok(Buckets::new(Arc::new(item_images), Arc::new(box_qrcodes)))
        }
        StorageKind::R2 => {
            tracing::info!("R2 storage enabled");
            let account = config.r2_account_id.clone().context("R2_ACCOUNT_ID must be set")?;
            let access = config.r2_access_key.clone().context("R2_ACCESS_KEY_ID must be set")?;
            let secret = config.r2_secret_key.clone().context("R2_SECRET_ACCESS_KEY must be set")?;
            let r2 = |bucket: &str| -> anyhow::Result<Arc<dyn StorageBackend>> {
                let backend: Arc<dyn StorageBackend> = Arc::new(R2Backend::new(
                    bucket.to_string(),
                    account.clone(),
                    access.clone(),
                    secret.clone(),
                    base(bucket),
                )?);
                Ok(backend)
            };
            Ok(Buckets::new(
                r2(&config.item_images_bucket)?,
                r2(&config.box_qrcodes_bucket)?,
            ))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "garage_tracker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!("Starting garage-tracker gRPC server...");

    let (inventory, users): (Arc<dyn InventoryStore>, Arc<dyn UserStore>) =
        match &config.database_url {
            Some(url) => {
                tracing::info!("Connecting to database...");
                let pool = create_pool(url).await?;
                if config.run_migrations {
                    run_migrations(&pool).await?;
                    tracing::info!("Migrations applied");
                }
                tracing::info!("Database connection established");
                let store = Arc::new(PgStore::new(pool));
                let inventory: Arc<dyn InventoryStore> = store.clone();
                let users: Arc<dyn UserStore> = store;
                (inventory, users)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, keeping data in memory");
                let store = Arc::new(MemoryStore::new());
                let inventory: Arc<dyn InventoryStore> = store.clone();
                let users: Arc<dyn UserStore> = store;
                (inventory, users)
            }
        };

    let buckets = build_buckets(&config).await?;
    let catalog = Catalog::new(inventory, buckets, config.public_origin.clone());

    // Create services
    let boxes_service = BoxesServiceImpl::new(catalog.clone());
    let items_service = ItemsServiceImpl::new(catalog.clone());
    let images_service = ImagesServiceImpl::new(catalog.clone());
    let search_service = SearchServiceImpl::new(catalog);
    let auth_service = AuthServiceImpl::new(
        users,
        config.jwt_secret.clone(),
        config.public_origin.clone(),
    );
    let health_service = HealthServiceImpl::new();

    // CORS layer for gRPC-Web
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any)
        .expose_headers(Any);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!("Listening on {}", addr);

    Server::builder()
        .accept_http1(true) // Required for gRPC-Web
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(gateway(config.jwt_secret.clone()))
        .add_service(BoxesServiceServer::new(boxes_service))
        .add_service(ItemsServiceServer::new(items_service))
        .add_service(ImagesServiceServer::new(images_service))
        .add_service(SearchServiceServer::new(search_service))
        .add_service(AuthServiceServer::new(auth_service))
        .add_service(HealthServer::new(health_service))
        .serve(addr)
        .await?;

    Ok(())
}
