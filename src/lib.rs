use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod config;
pub mod delivery;
pub mod document;
pub mod error;
pub mod health;
pub mod hotel;
pub mod metrics;
pub mod signature;
pub mod state;
pub mod storage;
pub mod submission;

pub use crate::state::AppState;

/// Largest accepted request body; signature images travel inline.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    /// `validation` or `server` for submission errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            success: false,
            error: error_type.to_string(),
            message: message.to_string(),
            details: None,
            error_type: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_error_type(mut self, error_type: &str) -> Self {
        self.error_type = Some(error_type.to_string());
        self
    }

    /// Show the human-readable message in `error` as well, as the registration form expects.
    pub fn with_message_as_error(mut self) -> Self {
        self.error = self.message.clone();
        self
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::submission::handlers::create_submission,
        crate::submission::handlers::list_submissions,
        crate::submission::handlers::get_submission_pdf,
        crate::hotel::routes::list_hotels,
        crate::hotel::routes::get_hotel,
        crate::hotel::routes::update_hotel,
        crate::health::smtp_health
    ),
    components(
        schemas(
            submission::model::GuestRegistration,
            submission::model::Traveller,
            submission::model::Submission,
            submission::model::SubmissionStatus,
            submission::model::SubmissionReceipt,
            submission::model::SubmissionResponse,
            submission::model::SubmissionListResponse,
            hotel::model::HotelProfile,
            hotel::model::FieldSetting,
            hotel::model::UpdateHotelRequest,
            hotel::model::HotelResponse,
            hotel::model::HotelListResponse,
            delivery::DeliveryResult,
            health::SmtpHealthResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Submissions", description = "Guest registration intake and retrieval."),
        (name = "Hotels", description = "Hotel profiles and form settings."),
        (name = "Health", description = "Dependency checks.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Local server")
    )
)]
pub struct ApiDoc;

/// Routes shared by the server and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        .service(
            web::scope("/api")
                .configure(submission::handlers::config)
                .configure(hotel::routes::config)
                .configure(health::config),
        )
        .service(web::resource("/metrics/pipeline").route(web::get().to(health::pipeline_metrics)));
}

fn to_io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

pub async fn run() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        to_io_error(e)
    })?;

    let app_state = match AppState::new(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Failed to set up the submission pipeline: {}", e);
            return Err(to_io_error(e));
        }
    };

    let smtp_check = app_state.clone();
    tokio::spawn(async move {
        match smtp_check.pipeline.verify_mail().await {
            Ok(()) => log::info!("SMTP server is reachable"),
            Err(e) => log::warn!("SMTP server check failed, emails may not be delivered: {}", e),
        }
    });

    let prometheus = PrometheusMetricsBuilder::new("meldeschein_server")
        .endpoint("/metrics")
        .build()
        .map_err(to_io_error)?;

    let bind = (config.server.host.clone(), config.server.port);
    let cors_origins = config.server.cors_origins.clone();
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind)?
    .run()
    .await
}
