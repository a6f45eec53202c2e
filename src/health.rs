use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::metrics;
use crate::AppState;

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SmtpHealthResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/health/smtp",
    tag = "Health",
    responses(
        (status = 200, description = "SMTP server reachable", body = SmtpHealthResponse),
        (status = 503, description = "SMTP server unreachable", body = SmtpHealthResponse)
    )
)]
pub async fn smtp_health(state: web::Data<AppState>) -> impl Responder {
    match state.pipeline.verify_mail().await {
        Ok(()) => HttpResponse::Ok().json(SmtpHealthResponse {
            success: true,
            message: Some("SMTP Server ist erreichbar".to_string()),
            error: None,
        }),
        Err(e) => {
            log::warn!("SMTP connection check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(SmtpHealthResponse {
                success: false,
                message: None,
                error: Some(e.to_string()),
            })
        }
    }
}

/// Pipeline counters in Prometheus text format.
pub async fn pipeline_metrics() -> impl Responder {
    match metrics::gather_text() {
        Ok(text) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(text),
        Err(e) => {
            log::error!("Failed to encode pipeline metrics: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health/smtp").route(web::get().to(smtp_health)));
}
