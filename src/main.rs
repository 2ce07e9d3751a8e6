use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    middleware::{Logger, NormalizePath},
    web, App, HttpServer,
};
use anyhow::Context;
use billsplit::{configure, gateway::MongoGateway, security_headers, AppState, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    info!("Using database {}", config.database_name);

    let gateway = MongoGateway::connect(&config)
        .await
        .context("failed to connect")?;
    let state = web::Data::new(AppState::new(Arc::new(gateway), &config));

    info!("Listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(NormalizePath::trim())
            .wrap(security_headers())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(configure)
    })
    .client_request_timeout(config.request_timeout)
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;
    Ok(())
}
