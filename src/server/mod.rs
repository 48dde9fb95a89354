pub mod handlers;

use actix_web::{web, App, HttpServer};

use crate::{adapter::GenerationAdapter, config::Config};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health_check))
        .route("/api/generate", web::post().to(handlers::generate));
}

/// Serves the front end and the generation endpoint until shutdown.
pub async fn start_server(config: Config) -> std::io::Result<()> {
    let adapter = web::Data::new(GenerationAdapter::from_config(&config.replicate));

    HttpServer::new(move || App::new().app_data(adapter.clone()).configure(configure))
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
}
