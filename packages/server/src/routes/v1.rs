use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/categories", category_routes())
        .nest("/subcategories", subcategory_routes())
        .nest("/products", product_routes())
}

fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::category::list_categories,
            handlers::category::create_category
        ))
        .routes(routes!(
            handlers::category::list_categories_with_subcategories
        ))
        .routes(routes!(handlers::category::recompute_category_aliases))
        .routes(routes!(
            handlers::category::get_category_by_id,
            handlers::category::update_category
        ))
        .routes(routes!(handlers::category::get_category_by_uuid))
        .routes(routes!(handlers::category::get_category_by_alias))
        .routes(routes!(handlers::category::get_category_alias))
        .routes(routes!(handlers::category::translate_category_alias))
        .routes(routes!(handlers::category::create_category_content))
        .routes(routes!(handlers::category::update_category_content))
}

fn subcategory_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::subcategory::list_subcategories,
            handlers::subcategory::create_subcategory
        ))
        .routes(routes!(
            handlers::subcategory::list_subcategories_with_products
        ))
        .routes(routes!(handlers::subcategory::recompute_subcategory_aliases))
        .routes(routes!(
            handlers::subcategory::get_subcategory_by_id,
            handlers::subcategory::update_subcategory
        ))
        .routes(routes!(handlers::subcategory::get_subcategory_by_uuid))
        .routes(routes!(handlers::subcategory::get_subcategory_by_alias))
        .routes(routes!(handlers::subcategory::get_subcategory_alias))
        .routes(routes!(handlers::subcategory::translate_subcategory_alias))
        .routes(routes!(handlers::subcategory::create_subcategory_content))
        .routes(routes!(handlers::subcategory::update_subcategory_content))
}

fn product_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::product::list_products,
            handlers::product::create_product
        ))
        .routes(routes!(handlers::product::list_products_with_images))
        .routes(routes!(handlers::product::recompute_product_aliases))
        .routes(routes!(
            handlers::product::get_product_by_id,
            handlers::product::update_product
        ))
        .routes(routes!(handlers::product::get_product_by_uuid))
        .routes(routes!(handlers::product::get_product_by_alias))
        .routes(routes!(handlers::product::get_product_alias))
        .routes(routes!(handlers::product::translate_product_alias))
        .routes(routes!(handlers::product::create_product_content))
        .routes(routes!(handlers::product::update_product_content))
}
