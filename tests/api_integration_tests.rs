//! End-to-end tests of the HTTP surface with mocked renderer and transport.

mod common;

use actix_web::{http::header, http::StatusCode, test, web, App};
use common::{
    basic_auth_header, sample_hotels, test_config, test_state, valid_payload, write_hotels,
    FailingRenderer, MockTransport, StaticRenderer, FAKE_PDF,
};
use meldeschein_server::storage::{EphemeralStore, SubmissionStore};
use meldeschein_server::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(meldeschein_server::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_post_submission_returns_receipt() {
    let dir = TempDir::new().unwrap();
    let transport = Arc::new(MockTransport::new());
    let (state, store) = test_state(dir.path(), Arc::new(StaticRenderer::new()), transport.clone());
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/submissions")
        .set_json(valid_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["emailSent"], true);
    assert_eq!(body["data"]["pdfAttached"], true);
    let id = body["data"]["submissionId"].as_str().unwrap();
    assert!(id.starts_with("submission_"));
    assert_eq!(
        body["data"]["pdfPreviewUrl"],
        format!("/api/submissions/{}/pdf", id)
    );

    assert_eq!(store.list().await.unwrap().len(), 1);
    assert_eq!(transport.sent().await.len(), 1);
}

#[actix_web::test]
async fn test_render_failure_still_returns_created() {
    let dir = TempDir::new().unwrap();
    let (state, _store) = test_state(dir.path(), Arc::new(FailingRenderer), Arc::new(MockTransport::new()));
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/submissions")
        .set_json(valid_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["emailSent"], true);
    assert_eq!(body["data"]["pdfAttached"], false);
}

#[actix_web::test]
async fn test_invalid_submission_is_rejected_with_details() {
    let dir = TempDir::new().unwrap();
    let (state, store) = test_state(dir.path(), Arc::new(StaticRenderer::new()), Arc::new(MockTransport::new()));
    let app = init_app!(state);

    let mut payload = valid_payload();
    payload["dateOfBirth"] = json!("31.02.1990");
    payload["privacyAccepted"] = json!(false);
    let req = test::TestRequest::post()
        .uri("/api/submissions")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["errorType"], "validation");
    assert_eq!(body["error"], "Ungültige Formulardaten - Validation Error");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["dateOfBirth", "privacyAccepted"]);
    assert!(store.list().await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_malformed_body_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let (state, _store) = test_state(dir.path(), Arc::new(StaticRenderer::new()), Arc::new(MockTransport::new()));
    let app = init_app!(state);

    for body in ["{ not json", "[1, 2, 3]"] {
        let req = test::TestRequest::post()
            .uri("/api/submissions")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {}", body);
    }
}

#[actix_web::test]
async fn test_unknown_hotel_is_not_found() {
    let dir = TempDir::new().unwrap();
    write_hotels(dir.path(), sample_hotels());
    let (state, _store) = test_state(dir.path(), Arc::new(StaticRenderer::new()), Arc::new(MockTransport::new()));
    let app = init_app!(state);

    let mut payload = valid_payload();
    payload["hotelId"] = json!("grand-hotel");
    let req = test::TestRequest::post()
        .uri("/api/submissions")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_listing_requires_basic_auth() {
    let dir = TempDir::new().unwrap();
    let (state, _store) = test_state(dir.path(), Arc::new(StaticRenderer::new()), Arc::new(MockTransport::new()));
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/submissions").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"Secure Area\""
    );

    let req = test::TestRequest::get()
        .uri("/api/submissions")
        .insert_header((header::AUTHORIZATION, "Basic aGhob2Y6ZmFsc2No"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_listing_returns_stored_submissions() {
    let dir = TempDir::new().unwrap();
    let (state, _store) = test_state(dir.path(), Arc::new(StaticRenderer::new()), Arc::new(MockTransport::new()));
    let app = init_app!(state);

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/submissions")
            .set_json(valid_payload())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/submissions")
        .insert_header((header::AUTHORIZATION, basic_auth_header()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["firstName"], "Max");
    assert_eq!(data[0]["status"], "pending");
}

#[actix_web::test]
async fn test_pdf_endpoint() {
    let dir = TempDir::new().unwrap();
    let (state, _store) = test_state(dir.path(), Arc::new(StaticRenderer::new()), Arc::new(MockTransport::new()));
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/submissions")
        .set_json(valid_payload())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let url = body["data"]["pdfPreviewUrl"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&url)
        .insert_header((header::AUTHORIZATION, basic_auth_header()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/pdf");
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("inline; filename=\"Meldeschein_Max_Mustermann_"));
    assert_eq!(test::read_body(resp).await.as_ref(), FAKE_PDF);

    let req = test::TestRequest::get()
        .uri("/api/submissions/submission_1_missing/pdf")
        .insert_header((header::AUTHORIZATION, basic_auth_header()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri(&url).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_ephemeral_mode_lists_nothing() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &[("STORAGE_MODE", "ephemeral")]);
    let state = AppState::with_components(
        &config,
        Arc::new(EphemeralStore) as Arc<dyn SubmissionStore>,
        Arc::new(StaticRenderer::new()),
        Arc::new(MockTransport::new()),
    );
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/submissions")
        .set_json(valid_payload())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let url = body["data"]["pdfPreviewUrl"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/submissions")
        .insert_header((header::AUTHORIZATION, basic_auth_header()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], json!([]));
    assert_eq!(
        body["message"],
        "Submissions werden nur per E-Mail versendet ohne lokale Speicherung"
    );

    let req = test::TestRequest::get()
        .uri(&url)
        .insert_header((header::AUTHORIZATION, basic_auth_header()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_hotel_endpoints() {
    let dir = TempDir::new().unwrap();
    write_hotels(dir.path(), sample_hotels());
    let (state, _store) = test_state(dir.path(), Arc::new(StaticRenderer::new()), Arc::new(MockTransport::new()));
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/hotels").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    for key in ["harburger-hof", "hhhof"] {
        let req = test::TestRequest::get().uri(&format!("/api/hotels/{}", key)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["name"], "Hotel Harburger Hof");
    }

    let req = test::TestRequest::get().uri("/api/hotels/grand-hotel").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_hotel_update() {
    let dir = TempDir::new().unwrap();
    write_hotels(dir.path(), sample_hotels());
    let (state, _store) = test_state(dir.path(), Arc::new(StaticRenderer::new()), Arc::new(MockTransport::new()));
    let app = init_app!(state);

    let update = json!({
        "slug": "harburger-hof",
        "name": "Harburger Hof",
        "themeColor": "#0f766e",
        "fieldsConfig": { "purpose": { "required": false, "visible": true } }
    });

    let req = test::TestRequest::put()
        .uri("/api/hotels")
        .set_json(&update)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::put()
        .uri("/api/hotels")
        .insert_header((header::AUTHORIZATION, basic_auth_header()))
        .set_json(&update)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["name"], "Harburger Hof");
    assert_eq!(body["data"]["themeColor"], "#0f766e");

    // The relaxed profile no longer requires a purpose.
    let mut payload = valid_payload();
    payload["hotelId"] = json!("harburger-hof");
    payload.as_object_mut().unwrap().remove("purpose");
    let req = test::TestRequest::post()
        .uri("/api/submissions")
        .set_json(payload)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::put()
        .uri("/api/hotels")
        .insert_header((header::AUTHORIZATION, basic_auth_header()))
        .set_json(json!({ "slug": "harburger-hof", "name": " ", "email": "kaputt" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"][0]["field"], "name");
    assert_eq!(body["details"][1]["field"], "email");

    let req = test::TestRequest::put()
        .uri("/api/hotels")
        .insert_header((header::AUTHORIZATION, basic_auth_header()))
        .set_json(json!({ "slug": "grand-hotel", "name": "Grand" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_pipeline_metrics_are_exposed() {
    let dir = TempDir::new().unwrap();
    let (state, _store) = test_state(dir.path(), Arc::new(StaticRenderer::new()), Arc::new(MockTransport::new()));
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/submissions")
        .set_json(valid_payload())
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/metrics/pipeline").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(text.contains("meldeschein_submissions_accepted_total"));
}

#[actix_web::test]
async fn test_smtp_health() {
    let dir = TempDir::new().unwrap();
    let (state, _store) = test_state(dir.path(), Arc::new(StaticRenderer::new()), Arc::new(MockTransport::new()));
    let app = init_app!(state);
    let req = test::TestRequest::get().uri("/api/health/smtp").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let (state, _store) = test_state(
        dir.path(),
        Arc::new(StaticRenderer::new()),
        Arc::new(common::FailingTransport),
    );
    let app = init_app!(state);
    let req = test::TestRequest::get().uri("/api/health/smtp").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}
