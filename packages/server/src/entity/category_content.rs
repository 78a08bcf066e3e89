use common::Language;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Localized content of a category. One row per (category, language).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category_content")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub language: Language,
    pub title: String,
    /// URL-safe slug derived from the title, suffixed with `10000 + category_id`.
    pub alias: String,

    pub category_id: i32,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: HasOne<super::category::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
