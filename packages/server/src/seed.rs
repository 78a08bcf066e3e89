use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{category_content, product_content, subcategory_content};

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite unique indexes, so the
/// one-content-row-per-(entity, language) invariant is backed manually on
/// startup. The pre-insert existence checks in the handlers still run; the
/// index closes the check-then-insert race under concurrent load.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let statements = [
        (
            "uq_category_content_language",
            Index::create()
                .if_not_exists()
                .unique()
                .name("uq_category_content_language")
                .table(category_content::Entity)
                .col(category_content::Column::CategoryId)
                .col(category_content::Column::Language)
                .to_string(PostgresQueryBuilder),
        ),
        (
            "uq_subcategory_content_language",
            Index::create()
                .if_not_exists()
                .unique()
                .name("uq_subcategory_content_language")
                .table(subcategory_content::Entity)
                .col(subcategory_content::Column::SubcategoryId)
                .col(subcategory_content::Column::Language)
                .to_string(PostgresQueryBuilder),
        ),
        (
            "uq_product_content_language",
            Index::create()
                .if_not_exists()
                .unique()
                .name("uq_product_content_language")
                .table(product_content::Entity)
                .col(product_content::Column::ProductId)
                .col(product_content::Column::Language)
                .to_string(PostgresQueryBuilder),
        ),
    ];

    for (name, stmt) in statements {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index {name} exists"),
            Err(e) => tracing::warn!("Failed to create index {name}: {e}"),
        }
    }

    Ok(())
}
