use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};

use super::model::{GuestRegistration, SubmissionListResponse, SubmissionReceipt, SubmissionResponse};
use crate::auth::validate_basic_auth;
use crate::AppState;

#[utoipa::path(
    context_path = "/api",
    tag = "Submissions",
    post,
    path = "/submissions",
    request_body = GuestRegistration,
    responses(
        (status = 201, description = "Submission stored and forwarded", body = SubmissionResponse),
        (status = 400, description = "Malformed body or invalid fields", body = crate::ErrorResponse),
        (status = 404, description = "Unknown hotelId", body = crate::ErrorResponse),
        (status = 500, description = "Submission could not be stored", body = crate::ErrorResponse)
    )
)]
pub async fn create_submission(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let outcome = match state.pipeline.submit(&body).await {
        Ok(outcome) => outcome,
        Err(e) => return e.error_response(),
    };

    let message = if outcome.delivery.success {
        "Meldeschein erfolgreich übermittelt und E-Mail versendet"
    } else {
        "Meldeschein erfolgreich übermittelt, E-Mail konnte nicht versendet werden"
    };

    HttpResponse::Created().json(SubmissionResponse {
        success: true,
        message: message.to_string(),
        data: SubmissionReceipt {
            pdf_preview_url: state.pdf_url(&outcome.submission.id),
            submission_id: outcome.submission.id,
            email_sent: outcome.delivery.success,
            pdf_attached: outcome.delivery.attachment_included,
            timestamp: chrono::Utc::now(),
        },
    })
}

#[utoipa::path(
    context_path = "/api",
    tag = "Submissions",
    get,
    path = "/submissions",
    responses(
        (status = 200, description = "All stored submissions", body = SubmissionListResponse),
        (status = 401, description = "Missing or wrong credentials", body = crate::ErrorResponse),
        (status = 500, description = "Submission file unreadable", body = crate::ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
pub async fn list_submissions(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    if let Err(e) = validate_basic_auth(&req, &state.auth) {
        return e.error_response();
    }

    if !state.pipeline.is_durable() {
        return HttpResponse::Ok().json(SubmissionListResponse {
            success: true,
            data: Vec::new(),
            message: Some(
                "Submissions werden nur per E-Mail versendet ohne lokale Speicherung".to_string(),
            ),
        });
    }

    match state.pipeline.list().await {
        Ok(submissions) => HttpResponse::Ok().json(SubmissionListResponse {
            success: true,
            data: submissions,
            message: None,
        }),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Submissions",
    get,
    path = "/submissions/{id}/pdf",
    params(
        ("id" = String, Path, description = "Submission id")
    ),
    responses(
        (status = 200, description = "Rendered Meldeschein", content_type = "application/pdf"),
        (status = 401, description = "Missing or wrong credentials", body = crate::ErrorResponse),
        (status = 404, description = "Unknown submission or storage disabled", body = crate::ErrorResponse),
        (status = 500, description = "PDF could not be rendered", body = crate::ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
pub async fn get_submission_pdf(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(e) = validate_basic_auth(&req, &state.auth) {
        return e.error_response();
    }

    let id = path.into_inner();
    match state.pipeline.document_for(&id).await {
        Ok(document) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", document.filename),
            ))
            .body(document.pdf),
        Err(e) => e.error_response(),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/submissions")
            .route(web::get().to(list_submissions))
            .route(web::post().to(create_submission)),
    )
    .service(web::resource("/submissions/{id}/pdf").route(web::get().to(get_submission_pdf)));
}
