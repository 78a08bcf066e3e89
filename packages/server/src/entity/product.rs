use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub uuid: Uuid,

    /// Total stocked quantity.
    pub total_amount: i32,
    /// Quantity currently available for sale.
    pub available_amount: i32,
    /// Selling price in the smallest currency unit.
    pub full_price: i64,
    /// Purchase (cost) price in the smallest currency unit.
    pub purchase_price: i64,

    pub subcategory_id: i32,
    #[sea_orm(belongs_to, from = "subcategory_id", to = "id")]
    pub subcategory: HasOne<super::subcategory::Entity>,

    #[sea_orm(has_many)]
    pub contents: HasMany<super::product_content::Entity>,

    #[sea_orm(has_many)]
    pub images: HasMany<super::product_image::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
