/// Category endpoints
///
/// # Endpoints
///
/// - `POST /api/categories`
/// - `GET /api/categories/:id`
/// - `PUT /api/categories/:id`
/// - `DELETE /api/categories/:id`
///
/// Creating a category whose name the user already has is a 409. Renaming
/// through `PUT` does not re-check.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiPath, ValidatedJson},
    routes::MessageResponse,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use taskdeck_shared::{
    models::category::{Category, CreateCategory, UpdateCategory},
    policy,
    repository::CategoryRepository,
};
use validator::Validate;

/// Category creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Category name is required"))]
    pub category_name: String,

    #[serde(default)]
    #[validate(length(max = 32, message = "Color must be at most 32 characters"))]
    pub color: String,

    #[validate(range(min = 1, message = "User ID is required"))]
    pub user_id: i64,

    #[serde(default)]
    pub description: String,
}

/// Category update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Category name is required"))]
    pub category_name: String,

    #[serde(default)]
    #[validate(length(max = 32, message = "Color must be at most 32 characters"))]
    pub color: String,

    #[serde(default)]
    pub description: String,
}

fn category_not_found() -> ApiError {
    ApiError::NotFound("Category not found".to_string())
}

pub async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = policy::create_category(
        state.store.as_ref(),
        CreateCategory {
            category_name: req.category_name,
            color: req.color,
            user_id: req.user_id,
            description: req.description,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Category>> {
    let category = state
        .store
        .find_category(id)
        .await?
        .ok_or_else(category_not_found)?;
    Ok(Json(category))
}

pub async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(req): ValidatedJson<UpdateCategoryRequest>,
) -> ApiResult<Json<Category>> {
    let category = state
        .store
        .update_category(
            id,
            UpdateCategory {
                category_name: req.category_name,
                color: req.color,
                description: req.description,
            },
        )
        .await?
        .ok_or_else(category_not_found)?;

    Ok(Json(category))
}

/// Deletes a category; its tasks become uncategorized
pub async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.store.delete_category(id).await? {
        return Err(category_not_found());
    }

    tracing::info!(category_id = id, "Category deleted");
    Ok(MessageResponse::new("Category deleted successfully"))
}
