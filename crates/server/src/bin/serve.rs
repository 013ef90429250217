use server::{app, config, db, health, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config();
    telemetry::init_tracing(&config.logging);
    health::record_start_time();

    if config.auth.jwt_secret.trim().is_empty() {
        return Err("JWT_SECRET is not set; refusing to issue unsigned sessions".into());
    }

    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;
    tracing::info!(url = %config.database.url, "database ready");

    let state = db::AppState::new(pool, config.clone())?;
    let ai_service = state.ai.base_url().to_string();
    let router = app::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        %addr,
        environment = %config.server.environment,
        %ai_service,
        "jurisdict server listening"
    );
    axum::serve(listener, router).await?;
    Ok(())
}
