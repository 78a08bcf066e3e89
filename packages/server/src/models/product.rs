use chrono::{DateTime, Utc};
use common::Language;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{product, product_content, product_image};
use crate::error::AppError;

pub use super::shared::{AliasResponse, RecomputeFailure};
use super::shared::validate_title;

/// A product in the catalog read path: language-neutral attributes plus the
/// fields copied out of the resolved content row and the image list.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductNode {
    pub id: i32,
    pub uuid: Uuid,
    pub total_amount: i32,
    pub available_amount: i32,
    pub full_price: i64,
    pub purchase_price: i64,
    /// Localized title; `null` when the product has no content row in the
    /// requested language.
    pub title: Option<String>,
    pub alias: Option<String>,
    pub description: Option<String>,
    pub volume: Option<String>,
    pub images: Vec<ProductImageView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductImageView {
    pub id: i32,
    pub url: String,
}

impl From<product_image::Model> for ProductImageView {
    fn from(m: product_image::Model) -> Self {
        Self { id: m.id, url: m.url }
    }
}

/// Flattens a product and its resolved content into the public shape.
///
/// `content` is the single content row matching the requested language, or
/// `None` when the product was reached through an optional join and has no
/// row in that language.
pub fn product_node(
    product: product::Model,
    content: Option<product_content::Model>,
    images: Vec<product_image::Model>,
) -> ProductNode {
    let (title, alias, description, volume) = match content {
        Some(content) => (
            Some(content.title),
            Some(content.alias),
            content.description,
            content.volume,
        ),
        None => (None, None, None, None),
    };

    ProductNode {
        id: product.id,
        uuid: product.uuid,
        total_amount: product.total_amount,
        available_amount: product.available_amount,
        full_price: product.full_price,
        purchase_price: product.purchase_price,
        title,
        alias,
        description,
        volume,
        images: images.into_iter().map(ProductImageView::from).collect(),
        created_at: product.created_at,
        updated_at: product.updated_at,
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Content language. Defaults to `ru`.
    #[serde(default)]
    pub language: Language,
    /// 1-based page number.
    pub page: Option<u64>,
    /// Page size cap.
    pub limit: Option<u64>,
    /// Case-insensitive substring match against the localized title.
    pub search: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProductRequest {
    pub subcategory_id: i32,
    pub total_amount: i32,
    pub available_amount: i32,
    pub full_price: i64,
    pub purchase_price: i64,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateProductRequest {
    pub total_amount: Option<i32>,
    pub available_amount: Option<i32>,
    pub full_price: Option<i64>,
    pub purchase_price: Option<i64>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProductContentRequest {
    pub title: String,
    pub language: Language,
    pub description: Option<String>,
    pub volume: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateProductContentRequest {
    pub title: String,
    pub description: Option<String>,
    pub volume: Option<String>,
}

/// Language-neutral view of a product, returned by the write endpoints.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub uuid: Uuid,
    pub total_amount: i32,
    pub available_amount: i32,
    pub full_price: i64,
    pub purchase_price: i64,
    pub subcategory_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<product::Model> for ProductResponse {
    fn from(m: product::Model) -> Self {
        Self {
            id: m.id,
            uuid: m.uuid,
            total_amount: m.total_amount,
            available_amount: m.available_amount,
            full_price: m.full_price,
            purchase_price: m.purchase_price,
            subcategory_id: m.subcategory_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductContentResponse {
    pub id: i32,
    pub language: Language,
    pub title: String,
    pub alias: String,
    pub description: Option<String>,
    pub volume: Option<String>,
    pub product_id: i32,
}

impl From<product_content::Model> for ProductContentResponse {
    fn from(m: product_content::Model) -> Self {
        Self {
            id: m.id,
            language: m.language,
            title: m.title,
            alias: m.alias,
            description: m.description,
            volume: m.volume,
            product_id: m.product_id,
        }
    }
}

/// Per-item report of the bulk alias recomputation.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RecomputeProductAliasesResponse {
    pub updated: Vec<ProductContentResponse>,
    pub failed: Vec<RecomputeFailure>,
}

pub fn validate_create_product(req: &CreateProductRequest) -> Result<(), AppError> {
    validate_amounts(
        Some(req.total_amount),
        Some(req.available_amount),
        Some(req.full_price),
        Some(req.purchase_price),
    )
}

pub fn validate_update_product(req: &UpdateProductRequest) -> Result<(), AppError> {
    validate_amounts(
        req.total_amount,
        req.available_amount,
        req.full_price,
        req.purchase_price,
    )
}

fn validate_amounts(
    total: Option<i32>,
    available: Option<i32>,
    full_price: Option<i64>,
    purchase_price: Option<i64>,
) -> Result<(), AppError> {
    if total.is_some_and(|v| v < 0) || available.is_some_and(|v| v < 0) {
        return Err(AppError::Validation("Amounts must be >= 0".into()));
    }
    if full_price.is_some_and(|v| v < 0) || purchase_price.is_some_and(|v| v < 0) {
        return Err(AppError::Validation("Prices must be >= 0".into()));
    }
    Ok(())
}

pub fn validate_product_content_fields(
    title: &str,
    description: Option<&str>,
) -> Result<(), AppError> {
    validate_title(title)?;
    if let Some(description) = description
        && description.chars().count() > 10_000
    {
        return Err(AppError::Validation(
            "Description must be at most 10000 characters".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_model(id: i32) -> product::Model {
        let now = Utc::now();
        product::Model {
            id,
            uuid: Uuid::nil(),
            total_amount: 10,
            available_amount: 4,
            full_price: 15_000,
            purchase_price: 9_000,
            subcategory_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn content_model(product_id: i32) -> product_content::Model {
        product_content::Model {
            id: 1,
            language: Language::Ru,
            title: "Зелёный чай".into(),
            alias: "zelyonyy-chay-10001".into(),
            description: Some("Листовой".into()),
            volume: Some("0.5 л".into()),
            product_id,
        }
    }

    #[test]
    fn copies_content_fields_into_node() {
        let node = product_node(product_model(1), Some(content_model(1)), vec![]);
        assert_eq!(node.title.as_deref(), Some("Зелёный чай"));
        assert_eq!(node.alias.as_deref(), Some("zelyonyy-chay-10001"));
        assert_eq!(node.description.as_deref(), Some("Листовой"));
        assert_eq!(node.volume.as_deref(), Some("0.5 л"));
    }

    #[test]
    fn content_less_node_has_blank_localized_fields() {
        let node = product_node(product_model(1), None, vec![]);
        assert!(node.title.is_none());
        assert!(node.alias.is_none());
        assert!(node.description.is_none());
        assert!(node.volume.is_none());
        assert_eq!(node.total_amount, 10);
    }

    #[test]
    fn images_are_projected_to_id_and_url() {
        let images = vec![
            product_image::Model {
                id: 5,
                url: "https://host.com/a.webp".into(),
                product_id: 1,
            },
            product_image::Model {
                id: 6,
                url: "https://host.com/b.webp".into(),
                product_id: 1,
            },
        ];
        let node = product_node(product_model(1), None, images);
        assert_eq!(node.images.len(), 2);
        assert_eq!(node.images[0].id, 5);
        assert_eq!(node.images[1].url, "https://host.com/b.webp");
    }

    #[test]
    fn node_does_not_leak_internal_collections() {
        let node = product_node(product_model(1), Some(content_model(1)), vec![]);
        let json = serde_json::to_value(&node).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert!(!keys.contains(&"contents"));
        assert!(!keys.contains(&"subcategory_id"));
        assert!(keys.contains(&"images"));
    }

    #[test]
    fn rejects_negative_amounts_and_prices() {
        let mut req = CreateProductRequest {
            subcategory_id: 1,
            total_amount: 1,
            available_amount: 1,
            full_price: 100,
            purchase_price: 50,
        };
        assert!(validate_create_product(&req).is_ok());
        req.total_amount = -1;
        assert!(validate_create_product(&req).is_err());

        let update = UpdateProductRequest {
            full_price: Some(-5),
            ..Default::default()
        };
        assert!(validate_update_product(&update).is_err());
    }
}
