use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Result;

use staffops::database::{init_database, repositories::PgRecordStore};
use staffops::reports::{ReportComposer, Renderer};
use staffops::{routes, AppState, Config};

#[actix_web::main]
async fn main() -> Result<()> {
    // Load configuration (reads .env)
    let config = Config::from_env()?;

    // Initialize logger
    env_logger::init();

    log::info!(
        "Starting staffops report server (environment: {})",
        config.environment
    );

    // Initialize database
    let pool = init_database(&config.database_url, config.database_max_connections).await?;
    log::info!("Database initialized");

    let store = Arc::new(PgRecordStore::new(pool));
    let composer = ReportComposer::new(store, config.leave_policy.clone())
        .with_timeout(config.report_timeout());
    let app_state = web::Data::new(AppState::new(
        composer,
        Renderer::new(config.report_rows_per_page),
    ));
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "OPTIONS"])
                    .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
                    .expose_headers(vec!["Content-Disposition"])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::configure)
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
