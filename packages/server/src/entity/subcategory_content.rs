use common::Language;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Localized content of a subcategory. One row per (subcategory, language).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subcategory_content")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub language: Language,
    pub title: String,
    pub alias: String,

    pub subcategory_id: i32,
    #[sea_orm(belongs_to, from = "subcategory_id", to = "id")]
    pub subcategory: HasOne<super::subcategory::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
