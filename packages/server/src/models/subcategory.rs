use chrono::{DateTime, Utc};
use common::Language;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{subcategory, subcategory_content};
use crate::error::AppError;

use super::product::ProductNode;
pub use super::shared::{AliasResponse, RecomputeFailure};
use super::shared::{validate_media_url, validate_title};

/// A subcategory in the catalog read path.
///
/// `products_total` counts the subcategory's own products only — category
/// nodes sum these counts transitively, subcategory nodes never do.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubcategoryNode {
    pub id: i32,
    pub uuid: Uuid,
    pub icon: String,
    pub poster: String,
    /// Localized title; `null` when no content row matches the requested
    /// language.
    pub title: Option<String>,
    pub alias: Option<String>,
    pub products_total: u64,
    /// Product nodes. Present only on subcategory-rooted reads; category
    /// trees expose counts without product arrays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<ProductNode>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flattens a subcategory and its resolved content into the public shape.
pub fn subcategory_node(
    subcategory: subcategory::Model,
    content: Option<subcategory_content::Model>,
    products: Option<Vec<ProductNode>>,
    products_total: u64,
) -> SubcategoryNode {
    let (title, alias) = match content {
        Some(content) => (Some(content.title), Some(content.alias)),
        None => (None, None),
    };

    SubcategoryNode {
        id: subcategory.id,
        uuid: subcategory.uuid,
        icon: subcategory.icon,
        poster: subcategory.poster,
        title,
        alias,
        products_total,
        products,
        created_at: subcategory.created_at,
        updated_at: subcategory.updated_at,
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSubcategoryRequest {
    pub icon: String,
    pub poster: String,
    pub category_id: i32,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateSubcategoryRequest {
    pub icon: Option<String>,
    pub poster: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSubcategoryContentRequest {
    pub title: String,
    pub language: Language,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateSubcategoryContentRequest {
    pub title: String,
}

/// Language-neutral view of a subcategory, returned by the write endpoints.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubcategoryResponse {
    pub id: i32,
    pub uuid: Uuid,
    pub icon: String,
    pub poster: String,
    pub category_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<subcategory::Model> for SubcategoryResponse {
    fn from(m: subcategory::Model) -> Self {
        Self {
            id: m.id,
            uuid: m.uuid,
            icon: m.icon,
            poster: m.poster,
            category_id: m.category_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubcategoryContentResponse {
    pub id: i32,
    pub language: Language,
    pub title: String,
    pub alias: String,
    pub subcategory_id: i32,
}

impl From<subcategory_content::Model> for SubcategoryContentResponse {
    fn from(m: subcategory_content::Model) -> Self {
        Self {
            id: m.id,
            language: m.language,
            title: m.title,
            alias: m.alias,
            subcategory_id: m.subcategory_id,
        }
    }
}

/// Per-item report of the bulk alias recomputation.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RecomputeSubcategoryAliasesResponse {
    pub updated: Vec<SubcategoryContentResponse>,
    pub failed: Vec<RecomputeFailure>,
}

pub fn validate_create_subcategory(req: &CreateSubcategoryRequest) -> Result<(), AppError> {
    validate_media_url(&req.icon, "Icon URL")?;
    validate_media_url(&req.poster, "Poster URL")
}

pub fn validate_update_subcategory(req: &UpdateSubcategoryRequest) -> Result<(), AppError> {
    if let Some(ref icon) = req.icon {
        validate_media_url(icon, "Icon URL")?;
    }
    if let Some(ref poster) = req.poster {
        validate_media_url(poster, "Poster URL")?;
    }
    Ok(())
}

pub fn validate_subcategory_content_title(title: &str) -> Result<(), AppError> {
    validate_title(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subcategory_model(id: i32) -> subcategory::Model {
        let now = Utc::now();
        subcategory::Model {
            id,
            uuid: Uuid::nil(),
            icon: "https://host.com/icon.webp".into(),
            poster: "https://host.com/poster.webp".into(),
            category_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn counts_only_direct_products() {
        let node = subcategory_node(subcategory_model(1), None, None, 3);
        assert_eq!(node.products_total, 3);
    }

    #[test]
    fn content_less_node_survives_with_blank_fields() {
        let node = subcategory_node(subcategory_model(1), None, None, 0);
        assert!(node.title.is_none());
        assert!(node.alias.is_none());
        assert_eq!(node.icon, "https://host.com/icon.webp");
    }

    #[test]
    fn omits_product_array_when_not_loaded() {
        let node = subcategory_node(subcategory_model(1), None, None, 2);
        let json = serde_json::to_value(&node).unwrap();
        assert!(json.get("products").is_none());
        assert_eq!(json["products_total"], 2);
    }

    #[test]
    fn copies_resolved_content() {
        let content = subcategory_content::Model {
            id: 9,
            language: Language::Ru,
            title: "Чай".into(),
            alias: "chay-10001".into(),
            subcategory_id: 1,
        };
        let node = subcategory_node(subcategory_model(1), Some(content), Some(vec![]), 0);
        assert_eq!(node.title.as_deref(), Some("Чай"));
        assert_eq!(node.alias.as_deref(), Some("chay-10001"));
        assert!(node.products.as_ref().is_some_and(|p| p.is_empty()));
    }
}
