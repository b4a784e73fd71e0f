use anyhow::Result;
use aws_config::BehaviorVersion;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod middleware;
mod repositories;
mod routes;
mod state;
mod thumbnails;

use common::config::AppConfig;
use common::database::{DatabaseConfig, init_pool};
use ingest::{FfmpegTools, IngestionPipeline, S3ObjectStore, VideoStore, policy_for};

use crate::middleware::JwtVerifier;
use crate::repositories::VideoRepository;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting API service");

    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize AWS S3 client
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_client = aws_sdk_s3::Client::new(&aws_config);

    let videos: Arc<dyn VideoStore> = Arc::new(VideoRepository::new(pool));

    let pipeline = Arc::new(IngestionPipeline::new(
        Arc::new(FfmpegTools),
        Arc::new(S3ObjectStore::new(
            s3_client,
            config.s3_bucket.clone(),
            config.s3_region.clone(),
        )),
        videos.clone(),
        policy_for(config.key_policy),
        config.tmp_dir.clone(),
    ));

    let thumbnails = thumbnails::store_for(&config);

    let app_state = AppState {
        videos,
        pipeline,
        thumbnails,
        jwt: JwtVerifier::new(&config.jwt_secret),
    };

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("API service listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
