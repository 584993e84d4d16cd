//! Request extractors
//!
//! Thin wrappers over axum's `Json`, `Path` and `Query` whose failures are
//! answered with 400 and an [`ApiResponse`] envelope instead of axum's
//! plain-text rejections. `ValidatedJson` also runs the `validator` rules.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::ApiResponse;

/// Why a request could not be turned into handler arguments.
#[derive(Debug)]
pub enum BadRequest {
    Body(JsonRejection),
    Fields(ValidationErrors),
    Path(PathRejection),
    Query(QueryRejection),
}

impl BadRequest {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Body(_) => "malformed_body",
            Self::Fields(_) => "validation",
            Self::Path(_) => "invalid_path",
            Self::Query(_) => "invalid_query",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Body(r) => format!("Invalid JSON: {}", r.body_text()),
            Self::Path(r) => r.body_text(),
            Self::Query(r) => r.body_text(),
            Self::Fields(errors) => {
                let mut fields: Vec<String> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errs)| {
                        let rules: Vec<String> = errs.iter().map(|e| e.code.to_string()).collect();
                        format!("{}: {}", field, rules.join(", "))
                    })
                    .collect();
                fields.sort();
                fields.join("; ")
            }
        }
    }
}

impl IntoResponse for BadRequest {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::error(self.code(), self.message());
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// JSON body that has passed its `#[validate]` rules.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = BadRequest;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(BadRequest::Body)?;
        value.validate().map_err(BadRequest::Fields)?;
        Ok(Self(value))
    }
}

/// Path parameters, e.g. `{reservation_id}`.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = BadRequest;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(BadRequest::Path)?;
        Ok(Self(value))
    }
}

/// Query string parameters.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BadRequest;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(BadRequest::Query)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::{get, post};
    use axum::Router;
    use serde::Deserialize;
    use serde_json::Value;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Payment {
        #[validate(length(min = 1, max = 16))]
        payment_reference: String,
    }

    #[derive(Deserialize)]
    struct Window {
        #[allow(dead_code)]
        start: chrono::DateTime<chrono::Utc>,
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/pay",
                post(|ValidatedJson(p): ValidatedJson<Payment>| async move { p.payment_reference }),
            )
            .route(
                "/cars/{car_id}",
                get(|ApiPath(id): ApiPath<i32>, ApiQuery(_w): ApiQuery<Window>| async move {
                    id.to_string()
                }),
            )
    }

    async fn send(req: axum::http::Request<Body>) -> (StatusCode, Value) {
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_json(body: &str) -> axum::http::Request<Body> {
        axum::http::Request::post("/pay")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_uri(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn body_failures_use_the_envelope() {
        let (status, body) = send(post_json("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "malformed_body");

        let (status, body) = send(post_json(r#"{"payment_reference":""}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation");
        assert!(body["error"].as_str().unwrap().contains("payment_reference"));

        let (status, _) = send(post_json(r#"{"payment_reference":"PAY-1"}"#)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn path_and_query_failures_use_the_envelope() {
        let (status, body) = send(get_uri("/cars/abc?start=2030-01-01T00:00:00Z")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "invalid_path");

        let (status, body) = send(get_uri("/cars/7?start=tomorrow")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_query");

        let resp = app()
            .oneshot(get_uri("/cars/7?start=2030-01-01T00:00:00Z"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
