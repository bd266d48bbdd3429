use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use backend::services::LogOutcomeReporter;
use backend::{routes, telemetry, AppConfig, AppState};
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    info!(bind_addr = %config.bind_addr, "starting card game server");

    let reporter = Arc::new(LogOutcomeReporter);
    let app_state = web::Data::new(AppState::new(&config, reporter));

    let bind_addr = config.bind_addr.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
