//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::ReservationService;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::modules::health::{self, HealthState};
use crate::interfaces::http::modules::metrics::{
    http_metrics_middleware, prometheus_metrics, MetricsState,
};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::reservations::{self, ReservationAppState};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Reservations
        reservations::list_reservations,
        reservations::create_reservation,
        reservations::get_reservation,
        reservations::update_reservation,
        reservations::cancel_reservation,
        reservations::transition_reservation,
        // Cars
        reservations::list_car_reservations,
        reservations::car_availability,
        reservations::car_quote,
        // Users
        reservations::list_user_reservations,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::HealthResponse,
            health::ComponentHealth,
            reservations::CreateReservationRequest,
            reservations::UpdateReservationRequest,
            reservations::TransitionRequest,
            reservations::TransitionEvent,
            reservations::ReservationDto,
            reservations::AvailabilityDto,
            reservations::QuoteDto,
        )
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Reservations", description = "Booking, rescheduling and lifecycle of car reservations"),
        (name = "Cars", description = "Per-car bookings, availability and price quotes"),
        (name = "Users", description = "Per-user bookings"),
    ),
    info(
        title = "Rent API",
        version = "1.0.0",
        description = "Vehicle rental reservation lifecycle and booking-conflict service",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(
    service: Arc<ReservationService>,
    db: DatabaseConnection,
    prometheus_handle: PrometheusHandle,
) -> Router {
    let reservation_state = ReservationAppState { service };

    let reservation_routes = Router::new()
        .route(
            "/api/v1/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/api/v1/reservations/{reservation_id}",
            get(reservations::get_reservation)
                .put(reservations::update_reservation)
                .delete(reservations::cancel_reservation),
        )
        .route(
            "/api/v1/reservations/{reservation_id}/transitions",
            post(reservations::transition_reservation),
        )
        .route(
            "/api/v1/cars/{car_id}/reservations",
            get(reservations::list_car_reservations),
        )
        .route(
            "/api/v1/cars/{car_id}/availability",
            get(reservations::car_availability),
        )
        .route("/api/v1/cars/{car_id}/quote", get(reservations::car_quote))
        .route(
            "/api/v1/users/{user_id}/reservations",
            get(reservations::list_user_reservations),
        )
        .with_state(reservation_state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(HealthState {
            db,
            started_at: Arc::new(Instant::now()),
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(MetricsState {
            handle: prometheus_handle,
        });

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .merge(reservation_routes)
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ReservationSettings;
    use crate::domain::ManualClock;
    use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
    use crate::infrastructure::database::tests::{memory_db, seed_car};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::{json, Value};
    use tower::Service;

    struct TestApp {
        router: Router,
        clock: Arc<ManualClock>,
        car_id: i32,
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 7, 1, 9, 0, 0).unwrap()
    }

    fn at(days: i64) -> String {
        (t0() + Duration::days(days)).to_rfc3339()
    }

    async fn app() -> TestApp {
        let db = memory_db().await;
        let car_id = seed_car(&db, 40.0).await;
        let clock = Arc::new(ManualClock::new(t0()));
        let service = Arc::new(ReservationService::new(
            Arc::new(SeaOrmRepositoryProvider::new(db.clone())),
            clock.clone(),
            ReservationSettings::default(),
        ));
        let handle = PrometheusBuilder::new().build_recorder().handle();
        TestApp {
            router: create_api_router(service, db, handle),
            clock,
            car_id,
        }
    }

    impl TestApp {
        async fn raw(&self, req: Request<Body>) -> axum::http::Response<Body> {
            let mut svc = self.router.clone().into_service();
            svc.call(req).await.unwrap()
        }

        async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let builder = Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json");
            let req = match body {
                Some(b) => builder.body(Body::from(serde_json::to_vec(&b).unwrap())),
                None => builder.body(Body::empty()),
            }
            .unwrap();

            let resp = self.raw(req).await;
            let status = resp.status();
            let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
                .await
                .unwrap();
            let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, json)
        }

        async fn book(&self, from_day: i64, to_day: i64) -> (StatusCode, Value) {
            self.call(
                "POST",
                "/api/v1/reservations",
                Some(json!({
                    "car_id": self.car_id,
                    "user_id": uuid::Uuid::new_v4(),
                    "reservation_start": at(from_day),
                    "reservation_end": at(to_day),
                })),
            )
            .await
        }
    }

    #[tokio::test]
    async fn create_then_reject_overlap() {
        let app = app().await;

        let (status, body) = app.book(1, 3).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "PendingPayment");
        assert_eq!(body["data"]["total_price"], 80.0);

        let (status, body) = app.book(2, 4).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "overlap");

        let (status, _) = app.book(3, 4).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn bad_input_is_400() {
        let app = app().await;

        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/reservations")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        assert_eq!(app.raw(req).await.status(), StatusCode::BAD_REQUEST);

        let (status, body) = app.book(-2, 1).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation");

        let (status, body) = app.book(3, 2).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation");

        let (status, _) = app
            .call("GET", "/api/v1/reservations?status=Lost", None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app.call("GET", "/api/v1/reservations/first", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_path");

        let uri = format!("/api/v1/cars/{}/quote?start=soon&end=later", app.car_id);
        let (status, body) = app.call("GET", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "invalid_query");
    }

    #[tokio::test]
    async fn unknown_ids_are_404() {
        let app = app().await;
        let (status, body) = app.call("GET", "/api/v1/reservations/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");

        let (status, _) = app.call("DELETE", "/api/v1/reservations/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .call(
                "POST",
                "/api/v1/reservations",
                Some(json!({
                    "car_id": app.car_id + 1,
                    "user_id": uuid::Uuid::new_v4(),
                    "reservation_start": at(1),
                    "reservation_end": at(2),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn lifecycle_through_transitions() {
        let app = app().await;
        let (_, created) = app.book(1, 3).await;
        let id = created["data"]["id"].as_i64().unwrap();
        let transitions = format!("/api/v1/reservations/{id}/transitions");

        let (status, body) = app
            .call("POST", &transitions, Some(json!({"event": "payment_confirmed"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation");

        let (status, body) = app
            .call(
                "POST",
                &transitions,
                Some(json!({"event": "payment_confirmed", "payment_reference": "PAY-1"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "Confirmed");
        assert_eq!(body["data"]["payment_reference"], "PAY-1");

        let (status, body) = app
            .call("POST", &transitions, Some(json!({"event": "rental_started"})))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "invalid_transition");

        app.clock.advance(Duration::days(1));
        let (status, _) = app
            .call("DELETE", &format!("/api/v1/reservations/{id}"), None)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = app
            .call("POST", &transitions, Some(json!({"event": "rental_started"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "InProgress");

        let (_, listed) = app
            .call("GET", "/api/v1/reservations?status=inprogress", None)
            .await;
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reschedule_reprices_and_finished_bookings_are_immutable() {
        let app = app().await;
        let (_, created) = app.book(1, 2).await;
        let id = created["data"]["id"].as_i64().unwrap();
        let uri = format!("/api/v1/reservations/{id}");

        let (status, body) = app
            .call(
                "PUT",
                &uri,
                Some(json!({
                    "car_id": app.car_id,
                    "reservation_start": at(5),
                    "reservation_end": at(8),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_price"], 120.0);

        let (status, body) = app.call("DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "Cancelled");

        let (status, body) = app
            .call(
                "PUT",
                &uri,
                Some(json!({
                    "car_id": app.car_id,
                    "reservation_start": at(5),
                    "reservation_end": at(6),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "immutable");
    }

    #[tokio::test]
    async fn availability_quote_and_listings() {
        let app = app().await;
        let (_, created) = app.book(1, 3).await;
        let id = created["data"]["id"].as_i64().unwrap();
        let user = created["data"]["user_id"].as_str().unwrap().to_string();
        let car = app.car_id;

        let q = |path: &str, from: i64, to: i64| {
            format!(
                "/api/v1/cars/{car}/{path}?start={}&end={}",
                urlencode(&at(from)),
                urlencode(&at(to))
            )
        };

        let (_, body) = app.call("GET", &q("availability", 2, 4), None).await;
        assert_eq!(body["data"]["available"], false);

        let uri = format!("{}&exclude={id}", q("availability", 2, 4));
        let (_, body) = app.call("GET", &uri, None).await;
        assert_eq!(body["data"]["available"], true);

        let (_, body) = app.call("GET", &q("availability", 3, 4), None).await;
        assert_eq!(body["data"]["available"], true);

        let (status, _) = app.call("GET", &q("availability", 4, 3), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app.call("GET", &q("quote", 5, 8), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["billable_days"], 3);
        assert_eq!(body["data"]["total_price"], 120.0);

        let (_, body) = app
            .call("GET", &format!("/api/v1/cars/{car}/reservations"), None)
            .await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (_, body) = app
            .call("GET", &format!("/api/v1/users/{user}/reservations"), None)
            .await;
        assert_eq!(body["data"][0]["id"], id);

        let (_, body) = app.call("GET", "/api/v1/reservations", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn health_metrics_and_request_id() {
        let app = app().await;

        let (status, body) = app.call("GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"]["status"], "ok");

        let req = Request::builder()
            .uri("/metrics")
            .header("x-request-id", "req-123")
            .body(Body::empty())
            .unwrap();
        let resp = app.raw(req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["x-request-id"], "req-123");

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = app.raw(req).await;
        assert!(resp.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn openapi_lists_reservation_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/api/v1/reservations".to_string()));
        assert!(paths.contains(&"/api/v1/reservations/{reservation_id}/transitions".to_string()));
        assert!(paths.contains(&"/api/v1/cars/{car_id}/quote".to_string()));
    }

    fn urlencode(s: &str) -> String {
        s.replace('+', "%2B").replace(':', "%3A")
    }
}
