mod form;
mod health;
mod register;
mod upload;

use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use http::{HeaderName, HeaderValue, StatusCode, header};
use shared::error::{AppError, ErrorCode};
use std::time::Duration;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::RegisterError;
use crate::state::AppState;

/// Room for the text fields and multipart framing on top of the photo
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Default)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Any method other than POST on a form route
async fn method_not_allowed() -> impl IntoResponse {
    ([(header::ALLOW, "POST")], RegisterError::MethodNotAllowed)
}

/// `TimeoutLayer` answers with a bare 408; give it the JSON error body.
async fn timeout_body(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() == StatusCode::REQUEST_TIMEOUT
        && !response.headers().contains_key(header::CONTENT_TYPE)
    {
        return AppError::new(ErrorCode::TimeoutError).into_response();
    }
    response
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_image_bytes + FORM_OVERHEAD_BYTES;
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .route(
            "/api/register",
            post(register::register).fallback(method_not_allowed),
        )
        .route(
            "/api/upload",
            post(upload::upload).fallback(method_not_allowed),
        )
        .route("/health", get(health::health_check))
        .route("/", get(form::register_page))
        .route("/register", get(form::register_page))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(middleware::from_fn(timeout_body))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .with_state(state)
}
