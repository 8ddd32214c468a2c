use tenant_auth::core::auth::{
    AuthApiState, AuthService, JwtService, PasswordHasher, auth_api_router,
};
use tenant_auth::core::config::Config;
use tenant_auth::core::db::{PgAuthStore, create_pool_with_migrations};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    // Log config status (without revealing secrets)
    tracing::info!(
        "Config loaded: env={}, secure_cookies={}, cookie_domain={:?}, bcrypt_cost={}",
        config.app_env,
        config.is_production(),
        config.cookies.domain,
        config.bcrypt_cost
    );

    let pool = create_pool_with_migrations(&config.db).await?;
    let store = PgAuthStore::new(pool);

    let auth_service = AuthService::new(store, JwtService::new(config.jwt.clone()))
        .password_policy(config.password_policy.clone())
        .hasher(PasswordHasher::new(config.bcrypt_cost));

    let app = auth_api_router(AuthApiState {
        auth_service,
        cookies: config.cookies.clone(),
    })
    .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
