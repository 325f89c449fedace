use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Liveness probe, outside the `/api` scope so it never passes through the
/// session gate. Identifies the service and its build version alongside the
/// current server time.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "disponível",
        "servico": env!("CARGO_PKG_NAME"),
        "versao": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now()
    }))
}
