//! HTTP surface: root, health, and the websocket upgrade.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use time::OffsetDateTime;

use crate::state::AppState;
use crate::ws::session;

async fn root() -> HttpResponse {
    HttpResponse::Ok().body("card game server")
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    app_version: String,
    rooms_open: usize,
    time: String,
}

async fn health(app_state: web::Data<AppState>) -> HttpResponse {
    let now = OffsetDateTime::now_utc();
    let time = now
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        rooms_open: app_state.directory().room_count(),
        time,
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health))
        .route("/ws", web::get().to(session::upgrade));
}
