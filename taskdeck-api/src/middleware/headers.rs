/// Response header normalization
///
/// Handlers answer through `axum::Json`, which labels bodies plain
/// `application/json`. Clients of this API expect the charset spelled out,
/// so this layer rewrites any JSON content type to
/// `application/json; charset=utf-8` and adds `X-Content-Type-Options:
/// nosniff`.
///
/// Error statuses that axum produces on its own, such as the 405 for a
/// known path with the wrong method, arrive with no body. Those get an
/// `{"error": ...}` body so that clients always receive JSON. Successful
/// responses without a body type (CORS preflights) are left as they are.
///
/// # Example
///
/// ```no_run
/// use axum::Router;
/// use taskdeck_api::middleware::headers::JsonHeadersLayer;
///
/// let app: Router = Router::new().layer(JsonHeadersLayer::new());
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::error::ErrorResponse;

pub const JSON_UTF8: &str = "application/json; charset=utf-8";

/// JSON header normalization layer
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonHeadersLayer;

impl JsonHeadersLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for JsonHeadersLayer {
    type Service = JsonHeadersMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        JsonHeadersMiddleware { inner }
    }
}

/// JSON header normalization service
#[derive(Debug, Clone)]
pub struct JsonHeadersMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for JsonHeadersMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let future = self.inner.call(request);

        Box::pin(async move {
            let mut response = future.await?;
            if is_bare_error(&response) {
                response = with_error_body(response);
            }

            let headers = response.headers_mut();

            let is_json = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map_or(false, |v| v.starts_with("application/json"));

            if is_json {
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));
                headers.insert(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                );
            }

            Ok(response)
        })
    }
}

fn is_bare_error(response: &Response) -> bool {
    let status = response.status();
    (status.is_client_error() || status.is_server_error())
        && !response.headers().contains_key(header::CONTENT_TYPE)
}

fn error_message(status: StatusCode) -> String {
    match status {
        StatusCode::METHOD_NOT_ALLOWED => "Method not allowed".to_string(),
        StatusCode::NOT_FOUND => "Route not found".to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    }
}

/// Replaces an empty error body with `{"error": ...}`, keeping the status
/// and headers such as `Allow`
fn with_error_body(response: Response) -> Response {
    let (parts, _) = response.into_parts();
    let body = ErrorResponse {
        error: error_message(parts.status),
        details: None,
    };

    let mut replacement = (parts.status, Json(body)).into_response();
    for (name, value) in parts.headers.iter() {
        if *name != header::CONTENT_LENGTH {
            replacement.headers_mut().append(name.clone(), value.clone());
        }
    }

    replacement
}
