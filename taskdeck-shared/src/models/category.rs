/// Category model
///
/// Category names are unique per user. That rule is enforced by
/// [`crate::policy`] before insert, not by a storage constraint.

use serde::{Deserialize, Serialize};

/// A user-defined task category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    #[serde(rename = "category_id")]
    #[sqlx(rename = "category_id")]
    pub id: i64,

    pub category_name: String,

    /// Display color, stored verbatim (e.g. `#FF5733`)
    pub color: String,

    pub user_id: i64,

    pub description: String,
}

/// Input for creating a new category
#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub category_name: String,
    pub color: String,
    pub user_id: i64,
    pub description: String,
}

/// Replacement values for a category's mutable fields
#[derive(Debug, Clone)]
pub struct UpdateCategory {
    pub category_name: String,
    pub color: String,
    pub description: String,
}
