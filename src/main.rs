use std::sync::Arc;

use ruby_chat::config::AppConfig;
use ruby_chat::engine::EngineDeps;
use ruby_chat::notify;
use ruby_chat::reply::create_reply_source;
use ruby_chat::server::{AppState, router};
use ruby_chat::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    eprintln!("💬 Ruby Chat v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api/session", config.port);
    eprintln!("   Reply backend: {:?}", config.reply_backend);
    eprintln!("   Flow: min description {} chars", config.flow.min_description_chars);

    // ── Database ─────────────────────────────────────────────────────
    let db_path = std::path::Path::new(&config.db_path);
    let db: Arc<dyn Database> = Arc::new(
        LibSqlBackend::new_local(db_path).await.unwrap_or_else(|e| {
            eprintln!("Error: Failed to open database at {}: {}", config.db_path, e);
            std::process::exit(1);
        }),
    );
    eprintln!("   Database: {}", config.db_path);

    // ── Reply source ─────────────────────────────────────────────────
    let reply = create_reply_source(
        config.reply_backend,
        config.api_key.as_ref(),
        &config.model,
    )?;

    // ── Notifier ─────────────────────────────────────────────────────
    let notifier = notify::from_env();

    let deps = EngineDeps {
        store: Some(db),
        reply,
        notifier,
    };

    let app = router(AppState::new(config.flow.clone(), deps));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Widget API server started");
    axum::serve(listener, app).await?;

    Ok(())
}
