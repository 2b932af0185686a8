//! Reelgraph Service - Hybrid movie recommendations over HTTP
//!
//! Default port: 5000

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use reelgraph_core::{
    init_logging, load_dataset, load_dotenv, ConfigLoader, EngineConfig, LogConfig, ServiceConfig,
};
use reelgraph_engine::server::{self, AppState};
use reelgraph_engine::RecommendationEngine;
use std::sync::Arc;
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let service_config = ServiceConfig::from_env()?;
    service_config.validate()?;

    init_logging(
        &LogConfig::new(&service_config.log_level).with_format(service_config.log_format),
    )?;

    let engine_config = EngineConfig::from_env()?;
    engine_config.validate()?;

    info!(
        data_dir = %engine_config.data_dir.display(),
        latent_factors = engine_config.latent_factors,
        "Starting Reelgraph Service"
    );

    // Everything derived here is read-only for the lifetime of the process
    let dataset = load_dataset(&engine_config.data_dir)?;
    let engine = Arc::new(RecommendationEngine::build(dataset, &engine_config)?);

    let bind_addr = format!("{}:{}", service_config.host, service_config.port);
    info!(
        bind_addr = %bind_addr,
        workers = service_config.workers,
        "Reelgraph Service listening"
    );

    let app_state = web::Data::new(AppState::new(engine));

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .configure(server::configure_routes)
            .wrap(cors)
            .wrap(actix_web::middleware::Logger::default())
    })
    .workers(service_config.workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
