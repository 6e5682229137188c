use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use shared::constants::{INVALID_BODY_ERROR, PRIZES_ENDPOINT, SEND_DISCOUNT_ENDPOINT};
use shared::discount_claim::{SendDiscountRequest, SendDiscountResponse};
use shared::prize_catalog::PrizesResponse;
use tracing::{debug, warn};

use crate::error::Error;
use crate::services::claim_service;
use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(PRIZES_ENDPOINT, get(get_prizes))
        .route(SEND_DISCOUNT_ENDPOINT, post(send_discount))
}

async fn get_prizes(State(state): State<AppState>) -> Json<PrizesResponse> {
    tokio::time::sleep(state.config.prizes_delay).await;
    debug!("Serving {} prizes", state.catalog.len());

    Json(PrizesResponse {
        prizes: state.catalog.prizes().to_vec(),
    })
}

async fn send_discount(
    State(state): State<AppState>,
    payload: Result<Json<SendDiscountRequest>, JsonRejection>,
) -> Result<Json<SendDiscountResponse>, Error> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected discount request body: {}", rejection.body_text());
        Error::BadRequest(INVALID_BODY_ERROR)
    })?;

    claim_service::claim_discount(&state, request).await.map(Json)
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::services::claim_service::MemoryClaimStore;
    use crate::services::mail_service::LogMailer;
    use crate::{build_app, AppState};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use shared::prize_catalog::PrizeCatalog;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> Router {
        build_app(AppState {
            catalog: Arc::new(PrizeCatalog::default()),
            claims: Arc::new(MemoryClaimStore::new()),
            mailer: Arc::new(LogMailer),
            config: Arc::new(Config {
                prizes_delay: Duration::ZERO,
                claim_delay: Duration::ZERO,
                ..Config::default()
            }),
        })
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_claim(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/send-discount")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn claim_body(email: &str) -> String {
        json!({
            "name": "Jane Doe",
            "email": email,
            "dob": "1990-04-01",
            "prizeId": "5",
            "discount": "25% OFF",
            "percentage": 25
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_prizes_endpoint_lists_catalog() {
        let app = app();
        let request = Request::get("/api/prizes").body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        let prizes = body["prizes"].as_array().unwrap();
        assert_eq!(prizes.len(), 10);
        assert_eq!(
            prizes[0],
            json!({ "id": "1", "discount": "10% OFF", "percentage": 10, "color": "#FCD34D" })
        );
    }

    #[tokio::test]
    async fn test_successful_claim_returns_code() {
        let app = app();
        let (status, body) = send(&app, post_claim(&claim_body("jane@example.com"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Discount code sent successfully");
        let code = body["discountCode"].as_str().unwrap();
        assert!(code.starts_with("NAILS25OFF"));
        assert_eq!(code.len(), "NAILS25OFF".len() + 4);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_case_insensitively() {
        let app = app();
        let (first, _) = send(&app, post_claim(&claim_body("jane@example.com"))).await;
        assert_eq!(first, StatusCode::OK);

        let (status, body) = send(&app, post_claim(&claim_body("  JANE@Example.com "))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["error"],
            "This email has already been used to claim a discount code."
        );
    }

    #[tokio::test]
    async fn test_missing_fields_are_bad_request() {
        let app = app();
        for body in [
            json!({ "email": "jane@example.com", "prizeId": "1" }),
            json!({ "name": "Jane", "prizeId": "1" }),
            json!({ "name": "Jane", "email": "jane@example.com" }),
            json!({ "name": "", "email": "jane@example.com", "prizeId": "1" }),
        ] {
            let (status, response) = send(&app, post_claim(&body.to_string())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response["error"], "Missing required fields");
        }
    }

    #[tokio::test]
    async fn test_client_percentage_shape_does_not_block_claim() {
        let app = app();
        for (i, percentage) in [json!(25.0), json!("25"), json!(-1), json!(300), json!(null)]
            .into_iter()
            .enumerate()
        {
            let body = json!({
                "name": "Jane Doe",
                "email": format!("jane{}@example.com", i),
                "prizeId": "5",
                "discount": 25,
                "percentage": percentage
            });
            let (status, response) = send(&app, post_claim(&body.to_string())).await;
            assert_eq!(status, StatusCode::OK, "percentage {}", percentage);
            assert!(response["discountCode"].as_str().unwrap().starts_with("NAILS25OFF"));
        }
    }

    #[tokio::test]
    async fn test_dob_is_optional() {
        let app = app();
        let body = json!({ "name": "Jane", "email": "jane@example.com", "prizeId": "4" });
        let (status, response) = send(&app, post_claim(&body.to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(response["discountCode"].as_str().unwrap().starts_with("NAILS0OFF"));
    }

    #[tokio::test]
    async fn test_invalid_email_and_unknown_prize() {
        let app = app();
        let (status, body) = send(&app, post_claim(&claim_body("jane.example.com"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please enter a valid email address");

        let unknown = json!({ "name": "Jane", "email": "jane@example.com", "prizeId": "99" });
        let (status, body) = send(&app, post_claim(&unknown.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unknown prize");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = app();
        let (status, body) = send(&app, post_claim("{ not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_health_check_and_cache_headers() {
        let app = app();
        let response = app
            .clone()
            .oneshot(Request::get("/api/health_check").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let app = app();
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/send-discount")
            .header(header::ORIGIN, "http://127.0.0.1:8080")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://127.0.0.1:8080"
        );
    }
}
