use std::sync::Arc;

use auth::Authenticator;
use credential_service::account::models::User;
use credential_service::account::ports::AuthServicePort;
use credential_service::account::service::AuthService;
use credential_service::config::Config;
use credential_service::inbound::http::router::create_router;
use credential_service::stores::MemoryDocumentStore;
use credential_service::stores::PostgresDocumentStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credential_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "credential-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        collection = %config.store.collection,
        access_token_ttl_hours = config.jwt.access_token_ttl_hours,
        refresh_token_ttl_hours = config.jwt.refresh_token_ttl_hours,
        persistent = config.database.is_some(),
        "Configuration loaded"
    );

    let authenticator = Arc::new(
        Authenticator::new(config.jwt.secret.as_bytes()).with_policy(config.jwt.token_policy()?),
    );

    let auth_service: Arc<dyn AuthServicePort> = match &config.database {
        Some(database) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database.url)
                .await?;
            tracing::info!(
                max_connections = 5,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let store = PostgresDocumentStore::new(pg_pool);
            store
                .ensure_unique_fields(
                    &config.store.collection,
                    &[User::EMAIL_FIELD, User::PHONE_FIELD],
                )
                .await?;
            tracing::info!(
                collection = %config.store.collection,
                "Unique indexes on email and phone ensured"
            );

            let store = Arc::new(store);
            Arc::new(AuthService::new(
                store,
                Arc::clone(&authenticator),
                config.store.collection.clone(),
            ))
        }
        None => {
            tracing::warn!("No database configured, accounts are kept in memory");

            let store = Arc::new(MemoryDocumentStore::new().with_unique_fields(
                config.store.collection.clone(),
                [User::EMAIL_FIELD, User::PHONE_FIELD],
            ));
            Arc::new(AuthService::new(
                store,
                Arc::clone(&authenticator),
                config.store.collection.clone(),
            ))
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, authenticator);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited successfully");

    Ok(())
}
