use visual_gen::{config::Config, logger};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::from_env())?;

    if dotenv_loaded {
        log::info!(".env file loaded");
    } else {
        log::warn!("No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.host,
        config.port,
    );
    logger::log_config_info(&config);

    if !config.replicate.has_token() {
        log::error!("REPLICATE_API_TOKEN is not set; generation requests will fail with 500");
    }

    visual_gen::server::start_server(config).await?;
    Ok(())
}
