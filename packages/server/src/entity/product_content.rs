use common::Language;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Localized content of a product. One row per (product, language).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_content")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub language: Language,
    pub title: String,
    pub alias: String,
    #[sea_orm(column_type = "Text")]
    pub description: Option<String>,
    /// Package volume as free text (e.g. "0.5 л").
    pub volume: Option<String>,

    pub product_id: i32,
    #[sea_orm(belongs_to, from = "product_id", to = "id")]
    pub product: HasOne<super::product::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
