use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use common::{Language, make_alias};

use crate::entity::{product, product_content, product_image, subcategory};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::product::*;
use crate::models::shared::{
    CatalogListQuery, DEFAULT_TREE_PAGE_SIZE, LanguageQuery, escape_like, page_offset,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Products",
    operation_id = "listProducts",
    summary = "List products",
    description = "Returns products that have a content row in the requested language, flattened with the localized content and images. `search` narrows the list by a case-insensitive substring match on the localized title. Returns everything when `limit` is unset.",
    params(ProductListQuery),
    responses(
        (status = 200, description = "List of products", body = Vec<ProductNode>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<ProductNode>>, AppError> {
    let term = query
        .search
        .as_deref()
        .map(|s| escape_like(s.trim()))
        .filter(|t| !t.is_empty());

    let mut select = match term {
        Some(ref term) => search_scope(query.language, term),
        None => localized_scope(query.language),
    }
    .order_by_asc(product::Column::Id)
    .offset(page_offset(query.page, query.limit));
    if let Some(limit) = query.limit {
        select = select.limit(limit);
    }

    let products = select.all(&state.db).await?;
    let nodes = assemble_product_nodes(&state.db, products, query.language).await?;

    Ok(Json(nodes))
}

#[utoipa::path(
    get,
    path = "/with-images",
    tag = "Products",
    operation_id = "listProductsWithImages",
    summary = "List products with their images, paged",
    description = "Same shape as the plain product listing; page size defaults to 10.",
    params(CatalogListQuery),
    responses(
        (status = 200, description = "List of products", body = Vec<ProductNode>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_products_with_images(
    State(state): State<AppState>,
    Query(query): Query<CatalogListQuery>,
) -> Result<Json<Vec<ProductNode>>, AppError> {
    let products = localized_scope(query.language)
        .order_by_asc(product::Column::Id)
        .offset(page_offset(query.page, query.limit))
        .limit(query.limit.unwrap_or(DEFAULT_TREE_PAGE_SIZE))
        .all(&state.db)
        .await?;

    let nodes = assemble_product_nodes(&state.db, products, query.language).await?;

    Ok(Json(nodes))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    operation_id = "getProductById",
    summary = "Get a product by ID",
    params(
        ("id" = i32, Path, description = "Product ID"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Product", body = ProductNode),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(id))]
pub async fn get_product_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<ProductNode>, AppError> {
    let product = localized_scope(query.language)
        .filter(product::Column::Id.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    Ok(Json(
        assemble_single_product(&state.db, product, query.language).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/by-uuid/{uuid}",
    tag = "Products",
    operation_id = "getProductByUuid",
    summary = "Get a product by UUID",
    params(
        ("uuid" = Uuid, Path, description = "Product UUID"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Product", body = ProductNode),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(uuid = %uuid))]
pub async fn get_product_by_uuid(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<ProductNode>, AppError> {
    let product = localized_scope(query.language)
        .filter(product::Column::Uuid.eq(uuid))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    Ok(Json(
        assemble_single_product(&state.db, product, query.language).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/by-alias/{alias}",
    tag = "Products",
    operation_id = "getProductByAlias",
    summary = "Get a product by alias",
    description = "Resolves the alias against the content rows of the requested language; a miss is a 404, never an empty list.",
    params(
        ("alias" = String, Path, description = "Product alias in the requested language"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Product", body = ProductNode),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(alias = %alias))]
pub async fn get_product_by_alias(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<ProductNode>, AppError> {
    let product = alias_scope(query.language, &alias)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    Ok(Json(
        assemble_single_product(&state.db, product, query.language).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/alias",
    tag = "Products",
    operation_id = "getProductAlias",
    summary = "Get a product's alias in a language",
    params(
        ("id" = i32, Path, description = "Product ID"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Alias", body = AliasResponse),
        (status = 404, description = "No content row for the language (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(id))]
pub async fn get_product_alias(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<AliasResponse>, AppError> {
    let content = find_content_by_language(&state.db, id, query.language).await?;
    Ok(Json(AliasResponse {
        alias: content.alias,
    }))
}

#[utoipa::path(
    get,
    path = "/alias/{alias}",
    tag = "Products",
    operation_id = "translateProductAlias",
    summary = "Translate a product alias into another language",
    params(
        ("alias" = String, Path, description = "Known product alias"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Alias in the requested language", body = AliasResponse),
        (status = 404, description = "Alias or target content not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(alias = %alias))]
pub async fn translate_product_alias(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<AliasResponse>, AppError> {
    let owner = product_content::Entity::find()
        .filter(product_content::Column::Alias.eq(&alias))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    let content = find_content_by_language(&state.db, owner.product_id, query.language).await?;
    Ok(Json(AliasResponse {
        alias: content.alias,
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Products",
    operation_id = "createProduct",
    summary = "Create a product under a subcategory",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Parent subcategory not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(subcategory_id = payload.subcategory_id))]
pub async fn create_product(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_product(&payload)?;

    let subcategory = subcategory::Entity::find_by_id(payload.subcategory_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Subcategory not found".into()))?;

    let now = chrono::Utc::now();
    let new_product = product::ActiveModel {
        uuid: Set(Uuid::new_v4()),
        total_amount: Set(payload.total_amount),
        available_amount: Set(payload.available_amount),
        full_price: Set(payload.full_price),
        purchase_price: Set(payload.purchase_price),
        subcategory_id: Set(subcategory.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_product.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(model))))
}

#[utoipa::path(
    post,
    path = "/{id}/contents",
    tag = "Products",
    operation_id = "createProductContent",
    summary = "Create a product's content row for a language",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = CreateProductContentRequest,
    responses(
        (status = 201, description = "Content created", body = ProductContentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Missing parent or duplicate language (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(product_id))]
pub async fn create_product_content(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
    AppJson(payload): AppJson<CreateProductContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_product_content_fields(&payload.title, payload.description.as_deref())?;

    let product = product::Entity::find_by_id(product_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Product {product_id} does not exist")))?;

    let existing = product_content::Entity::find()
        .filter(product_content::Column::ProductId.eq(product.id))
        .filter(product_content::Column::Language.eq(payload.language))
        .count(&state.db)
        .await?;
    if existing > 0 {
        return Err(AppError::Conflict(format!(
            "Product {product_id} already has '{}' content",
            payload.language
        )));
    }

    let title = payload.title.trim().to_string();
    let new_content = product_content::ActiveModel {
        language: Set(payload.language),
        alias: Set(make_alias(&title, product.id)),
        title: Set(title),
        description: Set(payload.description),
        volume: Set(payload.volume),
        product_id: Set(product.id),
        ..Default::default()
    };

    let model = new_content.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductContentResponse::from(model)),
    ))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Products",
    operation_id = "updateProduct",
    summary = "Update a product's amounts and prices",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    validate_update_product(&payload)?;

    if payload == UpdateProductRequest::default() {
        let existing = find_product(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_product(&txn, id).await?;
    let mut active: product::ActiveModel = existing.into();

    if let Some(total_amount) = payload.total_amount {
        active.total_amount = Set(total_amount);
    }
    if let Some(available_amount) = payload.available_amount {
        active.available_amount = Set(available_amount);
    }
    if let Some(full_price) = payload.full_price {
        active.full_price = Set(full_price);
    }
    if let Some(purchase_price) = payload.purchase_price {
        active.purchase_price = Set(purchase_price);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}/contents/{content_id}",
    tag = "Products",
    operation_id = "updateProductContent",
    summary = "Update a product's content row",
    description = "Replaces the localized title (recomputing the alias from it) and, when provided, the description and volume.",
    params(
        ("id" = i32, Path, description = "Product ID"),
        ("content_id" = i32, Path, description = "Content row ID"),
    ),
    request_body = UpdateProductContentRequest,
    responses(
        (status = 200, description = "Content updated", body = ProductContentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Content not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(product_id, content_id))]
pub async fn update_product_content(
    State(state): State<AppState>,
    Path((product_id, content_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdateProductContentRequest>,
) -> Result<Json<ProductContentResponse>, AppError> {
    validate_product_content_fields(&payload.title, payload.description.as_deref())?;

    let txn = state.db.begin().await?;

    let content = find_content_for_product(&txn, product_id, content_id).await?;
    let mut active: product_content::ActiveModel = content.into();

    let title = payload.title.trim().to_string();
    active.alias = Set(make_alias(&title, product_id));
    active.title = Set(title);
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(volume) = payload.volume {
        active.volume = Set(Some(volume));
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/recompute-aliases",
    tag = "Products",
    operation_id = "recomputeProductAliases",
    summary = "Recompute every product content alias",
    description = "Recomputes each content row's alias from its current title, one row at a time. Not atomic: rows updated before a failure stay updated; failures are reported per item.",
    responses(
        (status = 200, description = "Per-item recompute report", body = RecomputeProductAliasesResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn recompute_product_aliases(
    State(state): State<AppState>,
) -> Result<Json<RecomputeProductAliasesResponse>, AppError> {
    let contents = product_content::Entity::find()
        .order_by_asc(product_content::Column::Id)
        .all(&state.db)
        .await?;

    let mut updated = Vec::with_capacity(contents.len());
    let mut failed = Vec::new();

    for content in contents {
        let id = content.id;
        let alias = make_alias(&content.title, content.product_id);
        let mut active: product_content::ActiveModel = content.into();
        active.alias = Set(alias);

        match active.update(&state.db).await {
            Ok(model) => updated.push(ProductContentResponse::from(model)),
            Err(err) => failed.push(RecomputeFailure {
                id,
                error: err.to_string(),
            }),
        }
    }

    Ok(Json(RecomputeProductAliasesResponse { updated, failed }))
}

/// Products that have a content row in the given language.
fn localized_scope(language: Language) -> Select<product::Entity> {
    product::Entity::find().filter(
        product::Column::Id.in_subquery(
            SeaQuery::select()
                .column(product_content::Column::ProductId)
                .from(product_content::Entity)
                .and_where(product_content::Column::Language.eq(language))
                .to_owned(),
        ),
    )
}

/// Products whose content row in the given language carries the alias.
fn alias_scope(language: Language, alias: &str) -> Select<product::Entity> {
    product::Entity::find().filter(
        product::Column::Id.in_subquery(
            SeaQuery::select()
                .column(product_content::Column::ProductId)
                .from(product_content::Entity)
                .and_where(product_content::Column::Language.eq(language))
                .and_where(product_content::Column::Alias.eq(alias))
                .to_owned(),
        ),
    )
}

/// Products whose localized title contains the (already LIKE-escaped) term.
fn search_scope(language: Language, term: &str) -> Select<product::Entity> {
    product::Entity::find().filter(
        product::Column::Id.in_subquery(
            SeaQuery::select()
                .column(product_content::Column::ProductId)
                .from(product_content::Entity)
                .and_where(product_content::Column::Language.eq(language))
                .and_where(
                    Expr::expr(Func::lower(Expr::col(product_content::Column::Title))).like(
                        LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\'),
                    ),
                )
                .to_owned(),
        ),
    )
}

async fn find_product<C: ConnectionTrait>(db: &C, id: i32) -> Result<product::Model, AppError> {
    product::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))
}

async fn find_content_by_language(
    db: &DatabaseConnection,
    product_id: i32,
    language: Language,
) -> Result<product_content::Model, AppError> {
    product_content::Entity::find()
        .filter(product_content::Column::ProductId.eq(product_id))
        .filter(product_content::Column::Language.eq(language))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product content not found".into()))
}

async fn find_content_for_product<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    content_id: i32,
) -> Result<product_content::Model, AppError> {
    let content = product_content::Entity::find_by_id(content_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product content not found".into()))?;

    if content.product_id != product_id {
        return Err(AppError::NotFound("Product content not found".into()));
    }

    Ok(content)
}

async fn assemble_single_product(
    db: &DatabaseConnection,
    product: product::Model,
    language: Language,
) -> Result<ProductNode, AppError> {
    let mut nodes = assemble_product_nodes(db, vec![product], language).await?;
    nodes
        .pop()
        .ok_or_else(|| AppError::Internal("product assembly produced no node".into()))
}

/// Batch-loads the language-filtered content and images of a page of
/// products and flattens them into public nodes.
async fn assemble_product_nodes(
    db: &DatabaseConnection,
    products: Vec<product::Model>,
    language: Language,
) -> Result<Vec<ProductNode>, AppError> {
    let contents = products
        .load_many(
            product_content::Entity::find()
                .filter(product_content::Column::Language.eq(language)),
            db,
        )
        .await?;
    let images = products.load_many(product_image::Entity, db).await?;

    let nodes = products
        .into_iter()
        .zip(contents.into_iter())
        .zip(images.into_iter())
        .map(|((product, content_rows), images)| {
            product_node(product, content_rows.into_iter().next(), images)
        })
        .collect();

    Ok(nodes)
}
