use library_inventory::{
    adapters::postgres::{PostgresBookRepository, PostgresLoanRepository, PostgresMemberRepository},
    api::{handlers::AppState, router::create_router},
    application::ServiceDependencies,
    config::Config,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_inventory=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from the environment
    let config = Config::from_env().expect("Failed to load configuration");

    tracing::info!("Database URL: {}", config.database_url);

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Apply migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Initialize adapters
    let book_repository = Arc::new(PostgresBookRepository::new(pool.clone()));
    let member_repository = Arc::new(PostgresMemberRepository::new(pool.clone()));
    let loan_repository = Arc::new(PostgresLoanRepository::new(pool.clone()));

    // Create service dependencies
    let service_deps = ServiceDependencies {
        book_repository,
        member_repository,
        loan_repository,
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
