use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use rawspill::app::{router, AppState};
use rawspill::auth::gate::AdminGate;
use rawspill::config::AppConfig;
use rawspill::db::health::MongoHealth;
use rawspill::db::notification_repository::MongoNotificationRepository;
use rawspill::db::post_repository::MongoPostRepository;
use rawspill::db::settings_repository::MongoSettingsRepository;

/// RawSpill blog API server.
#[derive(Parser, Debug)]
#[command(name = "rawspill", about = "Personal blog API server", long_about = None)]
struct Args {
    /// Path to a TOML configuration file (defaults to ./rawspill.toml if present).
    #[arg(long, env = "RAWSPILL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rawspill=info,tower_http=info".into()),
        )
        .init();

    tracing::info!("Starting RawSpill server...");

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    let admin_gate = AdminGate::new(config.admin_pass.clone());
    if !admin_gate.is_configured() {
        tracing::warn!("ADMIN_PASS is not set; all admin routes will reject requests");
    }

    // The driver connects lazily on the first operation
    let mongo_client = mongodb::Client::with_uri_str(&config.mongodb_uri).await?;
    let mongo_db = mongo_client.database(&config.mongodb_database);

    let post_repo = MongoPostRepository::new(&mongo_db);
    post_repo.ensure_indexes().await?;
    let notification_repo = MongoNotificationRepository::new(&mongo_db);
    notification_repo.ensure_indexes().await?;
    let settings_repo = MongoSettingsRepository::new(&mongo_db);
    settings_repo.ensure_indexes().await?;

    tracing::info!(database = %config.mongodb_database, "Connected to MongoDB");

    if config.seed_demo {
        rawspill::demo_seeder::seed_demo_posts(&post_repo, &config.default_author).await?;
    }

    let app_state = AppState {
        post_repo: Arc::new(post_repo),
        notification_repo: Arc::new(notification_repo),
        settings_repo: Arc::new(settings_repo),
        health: Arc::new(MongoHealth::new(&mongo_db)),
        admin_gate,
        default_author: config.default_author.clone(),
        notification_limit: config.notification_limit,
    };

    let app = router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    tracing::info!("Listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
