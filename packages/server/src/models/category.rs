use chrono::{DateTime, Utc};
use common::Language;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{category, category_content};
use crate::error::AppError;

pub use super::shared::{AliasResponse, RecomputeFailure};
use super::shared::{validate_media_url, validate_title};
use super::subcategory::SubcategoryNode;

/// A category in the catalog read path.
///
/// `products_total` is the transitive product count over every subcategory —
/// the one place in the tree where the aggregate crosses a level.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryNode {
    pub id: i32,
    pub uuid: Uuid,
    pub icon: String,
    pub poster: String,
    /// Localized title; `null` when no content row matches the requested
    /// language.
    pub title: Option<String>,
    pub alias: Option<String>,
    pub products_total: u64,
    /// Subcategory nodes. Present on tree reads, omitted from the plain
    /// listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategories: Option<Vec<SubcategoryNode>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flattens a category and its resolved content into the public shape.
///
/// `subcategory_product_counts` holds the direct product count of each
/// subcategory, whether or not subcategory nodes are exposed; the category
/// aggregate is their sum.
pub fn category_node(
    category: category::Model,
    content: Option<category_content::Model>,
    subcategories: Option<Vec<SubcategoryNode>>,
    subcategory_product_counts: &[u64],
) -> CategoryNode {
    let (title, alias) = match content {
        Some(content) => (Some(content.title), Some(content.alias)),
        None => (None, None),
    };

    CategoryNode {
        id: category.id,
        uuid: category.uuid,
        icon: category.icon,
        poster: category.poster,
        title,
        alias,
        products_total: subcategory_product_counts.iter().sum(),
        subcategories,
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCategoryRequest {
    pub icon: String,
    pub poster: String,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateCategoryRequest {
    pub icon: Option<String>,
    pub poster: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCategoryContentRequest {
    pub title: String,
    pub language: Language,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateCategoryContentRequest {
    pub title: String,
}

/// Language-neutral view of a category, returned by the write endpoints.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub uuid: Uuid,
    pub icon: String,
    pub poster: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<category::Model> for CategoryResponse {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            uuid: m.uuid,
            icon: m.icon,
            poster: m.poster,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryContentResponse {
    pub id: i32,
    pub language: Language,
    pub title: String,
    pub alias: String,
    pub category_id: i32,
}

impl From<category_content::Model> for CategoryContentResponse {
    fn from(m: category_content::Model) -> Self {
        Self {
            id: m.id,
            language: m.language,
            title: m.title,
            alias: m.alias,
            category_id: m.category_id,
        }
    }
}

/// Per-item report of the bulk alias recomputation.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RecomputeCategoryAliasesResponse {
    pub updated: Vec<CategoryContentResponse>,
    pub failed: Vec<RecomputeFailure>,
}

pub fn validate_create_category(req: &CreateCategoryRequest) -> Result<(), AppError> {
    validate_media_url(&req.icon, "Icon URL")?;
    validate_media_url(&req.poster, "Poster URL")
}

pub fn validate_update_category(req: &UpdateCategoryRequest) -> Result<(), AppError> {
    if let Some(ref icon) = req.icon {
        validate_media_url(icon, "Icon URL")?;
    }
    if let Some(ref poster) = req.poster {
        validate_media_url(poster, "Poster URL")?;
    }
    Ok(())
}

pub fn validate_category_content_title(title: &str) -> Result<(), AppError> {
    validate_title(title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::subcategory::subcategory_node;
    use crate::entity::subcategory;

    fn category_model(id: i32) -> category::Model {
        let now = Utc::now();
        category::Model {
            id,
            uuid: Uuid::nil(),
            icon: "https://host.com/icon.webp".into(),
            poster: "https://host.com/poster.webp".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn subcategory_model(id: i32) -> subcategory::Model {
        let now = Utc::now();
        subcategory::Model {
            id,
            uuid: Uuid::nil(),
            icon: "https://host.com/sub-icon.webp".into(),
            poster: "https://host.com/sub-poster.webp".into(),
            category_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn aggregate_sums_products_across_subcategories() {
        let node = category_node(category_model(1), None, None, &[2, 0, 3]);
        assert_eq!(node.products_total, 5);
    }

    #[test]
    fn aggregate_is_zero_without_subcategories() {
        let node = category_node(category_model(1), None, None, &[]);
        assert_eq!(node.products_total, 0);
    }

    #[test]
    fn copies_resolved_content() {
        let content = category_content::Model {
            id: 4,
            language: Language::Ru,
            title: "Электроника".into(),
            alias: "elektronika-10001".into(),
            category_id: 1,
        };
        let node = category_node(category_model(1), Some(content), None, &[]);
        assert_eq!(node.title.as_deref(), Some("Электроника"));
        assert_eq!(node.alias.as_deref(), Some("elektronika-10001"));
    }

    #[test]
    fn plain_listing_omits_subcategory_array() {
        let node = category_node(category_model(1), None, None, &[1]);
        let json = serde_json::to_value(&node).unwrap();
        assert!(json.get("subcategories").is_none());
        assert_eq!(json["products_total"], 1);
        assert_eq!(json["title"], serde_json::Value::Null);
    }

    #[test]
    fn tree_nodes_carry_subcategories_without_product_arrays() {
        let sub = subcategory_node(subcategory_model(7), None, None, 2);
        let node = category_node(category_model(1), None, Some(vec![sub]), &[2]);
        let json = serde_json::to_value(&node).unwrap();
        let subs = json["subcategories"].as_array().unwrap();
        assert_eq!(subs.len(), 1);
        assert!(subs[0].get("products").is_none());
        assert_eq!(subs[0]["products_total"], 2);
    }
}
