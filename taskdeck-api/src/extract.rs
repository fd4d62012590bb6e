/// Request extractors that reject with [`ApiError`]
///
/// axum's stock `Json` and `Path` reject with plain-text bodies. These
/// wrappers route the rejection through `ApiError` so that every failure
/// keeps the `{"error": ...}` shape.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// JSON body whose rejection is a 400 `ApiError`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters whose rejection is a 400 `ApiError`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// JSON body that has also passed its `validator` rules
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let ApiJson(value) = ApiJson::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, response::IntoResponse, routing::post, Router};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, Validate)]
    struct Named {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
    }

    async fn handler(ValidatedJson(body): ValidatedJson<Named>) -> impl IntoResponse {
        body.name
    }

    async fn status_for(body: &str) -> StatusCode {
        let app = Router::new().route("/", post(handler));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        assert_eq!(status_for(r#"{"name":"x"}"#).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        assert_eq!(status_for("{not json").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_for("{}").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_failed_validation_is_bad_request() {
        assert_eq!(status_for(r#"{"name":""}"#).await, StatusCode::BAD_REQUEST);
    }
}
