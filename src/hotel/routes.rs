use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};

use super::directory::HotelError;
use super::model::{HotelListResponse, HotelResponse, UpdateHotelRequest};
use crate::auth::validate_basic_auth;
use crate::{AppState, ErrorResponse};

fn hotel_error_response(e: &HotelError) -> HttpResponse {
    match e {
        HotelError::NotFound(key) => HttpResponse::NotFound()
            .json(ErrorResponse::not_found(&format!("Hotel '{}' nicht gefunden", key))),
        HotelError::Store(err) => {
            log::error!("Hotel file access failed: {}", err);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Fehler beim Laden der Hoteldaten"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/hotels",
    tag = "Hotels",
    responses(
        (status = 200, description = "All hotel profiles", body = HotelListResponse),
        (status = 500, description = "Hotel file unreadable", body = ErrorResponse)
    )
)]
pub async fn list_hotels(state: web::Data<AppState>) -> impl Responder {
    match state.hotels.all().await {
        Ok(hotels) => HttpResponse::Ok().json(HotelListResponse {
            success: true,
            data: hotels.as_ref().clone(),
        }),
        Err(e) => hotel_error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/hotels/{slug}",
    tag = "Hotels",
    params(
        ("slug" = String, Path, description = "Hotel slug or id")
    ),
    responses(
        (status = 200, description = "Hotel profile", body = HotelResponse),
        (status = 404, description = "Hotel not found", body = ErrorResponse)
    )
)]
pub async fn get_hotel(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let slug = path.into_inner();
    match state.hotels.find(&slug).await {
        Ok(Some(hotel)) => HttpResponse::Ok().json(HotelResponse {
            success: true,
            data: hotel,
            message: None,
        }),
        Ok(None) => hotel_error_response(&HotelError::NotFound(slug)),
        Err(e) => hotel_error_response(&e),
    }
}

#[utoipa::path(
    put,
    path = "/api/hotels",
    tag = "Hotels",
    request_body = UpdateHotelRequest,
    responses(
        (status = 200, description = "Profile updated", body = HotelResponse),
        (status = 400, description = "Invalid data", body = ErrorResponse),
        (status = 401, description = "Missing or wrong credentials", body = ErrorResponse),
        (status = 404, description = "Hotel not found", body = ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
pub async fn update_hotel(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(e) = validate_basic_auth(&req, &state.auth) {
        return e.error_response();
    }

    let request: UpdateHotelRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return HttpResponse::BadRequest().json(
                ErrorResponse::bad_request("Ungültige Daten")
                    .with_error_type("validation")
                    .with_details(serde_json::json!(e.to_string())),
            )
        }
    };

    let problems = request.validate();
    if !problems.is_empty() {
        let details: Vec<serde_json::Value> = problems
            .into_iter()
            .map(|(field, message)| serde_json::json!({ "field": field, "message": message }))
            .collect();
        return HttpResponse::BadRequest().json(
            ErrorResponse::bad_request("Ungültige Daten")
                .with_error_type("validation")
                .with_details(serde_json::Value::Array(details)),
        );
    }

    match state.hotels.update(&request).await {
        Ok(updated) => HttpResponse::Ok().json(HotelResponse {
            success: true,
            data: updated,
            message: Some("Hotel-Konfiguration erfolgreich aktualisiert".to_string()),
        }),
        Err(e) => hotel_error_response(&e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/hotels")
            .route(web::get().to(list_hotels))
            .route(web::put().to(update_hotel)),
    )
    .service(web::resource("/hotels/{slug}").route(web::get().to(get_hotel)));
}
