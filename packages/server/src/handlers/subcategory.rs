use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use common::{Language, make_alias};

use crate::entity::{category, product, product_content, product_image, subcategory, subcategory_content};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::product::product_node;
use crate::models::shared::{CatalogListQuery, DEFAULT_TREE_PAGE_SIZE, LanguageQuery, page_offset};
use crate::models::subcategory::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Subcategories",
    operation_id = "listSubcategories",
    summary = "List subcategories",
    description = "Returns subcategories that have a content row in the requested language, with their direct product counts. Product nodes are not included. Returns everything when `limit` is unset.",
    params(CatalogListQuery),
    responses(
        (status = 200, description = "List of subcategories", body = Vec<SubcategoryNode>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_subcategories(
    State(state): State<AppState>,
    Query(query): Query<CatalogListQuery>,
) -> Result<Json<Vec<SubcategoryNode>>, AppError> {
    let mut select = localized_scope(query.language)
        .order_by_asc(subcategory::Column::Id)
        .offset(page_offset(query.page, query.limit));
    if let Some(limit) = query.limit {
        select = select.limit(limit);
    }

    let subcategories = select.all(&state.db).await?;
    let nodes = assemble_subcategory_nodes(&state.db, subcategories, query.language, false).await?;

    Ok(Json(nodes))
}

#[utoipa::path(
    get,
    path = "/with-products",
    tag = "Subcategories",
    operation_id = "listSubcategoriesWithProducts",
    summary = "List subcategories with their product nodes",
    description = "Returns subcategories with nested product nodes, each carrying its localized content and images. Products surface even without content in the requested language, with blank localized fields. Page size defaults to 10.",
    params(CatalogListQuery),
    responses(
        (status = 200, description = "List of subcategory trees", body = Vec<SubcategoryNode>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_subcategories_with_products(
    State(state): State<AppState>,
    Query(query): Query<CatalogListQuery>,
) -> Result<Json<Vec<SubcategoryNode>>, AppError> {
    let subcategories = localized_scope(query.language)
        .order_by_asc(subcategory::Column::Id)
        .offset(page_offset(query.page, query.limit))
        .limit(query.limit.unwrap_or(DEFAULT_TREE_PAGE_SIZE))
        .all(&state.db)
        .await?;

    let nodes = assemble_subcategory_nodes(&state.db, subcategories, query.language, true).await?;

    Ok(Json(nodes))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Subcategories",
    operation_id = "getSubcategoryById",
    summary = "Get a subcategory tree by ID",
    params(
        ("id" = i32, Path, description = "Subcategory ID"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Subcategory tree", body = SubcategoryNode),
        (status = 404, description = "Subcategory not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(id))]
pub async fn get_subcategory_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<SubcategoryNode>, AppError> {
    let subcategory = localized_scope(query.language)
        .filter(subcategory::Column::Id.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Subcategory not found".into()))?;

    Ok(Json(
        assemble_subcategory_tree(&state.db, subcategory, query.language).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/by-uuid/{uuid}",
    tag = "Subcategories",
    operation_id = "getSubcategoryByUuid",
    summary = "Get a subcategory tree by UUID",
    params(
        ("uuid" = Uuid, Path, description = "Subcategory UUID"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Subcategory tree", body = SubcategoryNode),
        (status = 404, description = "Subcategory not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(uuid = %uuid))]
pub async fn get_subcategory_by_uuid(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<SubcategoryNode>, AppError> {
    let subcategory = localized_scope(query.language)
        .filter(subcategory::Column::Uuid.eq(uuid))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Subcategory not found".into()))?;

    Ok(Json(
        assemble_subcategory_tree(&state.db, subcategory, query.language).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/by-alias/{alias}",
    tag = "Subcategories",
    operation_id = "getSubcategoryByAlias",
    summary = "Get a subcategory tree by alias",
    params(
        ("alias" = String, Path, description = "Subcategory alias in the requested language"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Subcategory tree", body = SubcategoryNode),
        (status = 404, description = "Subcategory not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(alias = %alias))]
pub async fn get_subcategory_by_alias(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<SubcategoryNode>, AppError> {
    let subcategory = alias_scope(query.language, &alias)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Subcategory not found".into()))?;

    Ok(Json(
        assemble_subcategory_tree(&state.db, subcategory, query.language).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/alias",
    tag = "Subcategories",
    operation_id = "getSubcategoryAlias",
    summary = "Get a subcategory's alias in a language",
    params(
        ("id" = i32, Path, description = "Subcategory ID"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Alias", body = AliasResponse),
        (status = 404, description = "No content row for the language (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(id))]
pub async fn get_subcategory_alias(
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
    tag = "Subcategories",
    operation_id = "translateSubcategoryAlias",
    summary = "Translate a subcategory alias into another language",
    params(
        ("alias" = String, Path, description = "Known subcategory alias"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Alias in the requested language", body = AliasResponse),
        (status = 404, description = "Alias or target content not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(alias = %alias))]
pub async fn translate_subcategory_alias(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<AliasResponse>, AppError> {
    let owner = subcategory_content::Entity::find()
        .filter(subcategory_content::Column::Alias.eq(&alias))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Subcategory not found".into()))?;

    let content = find_content_by_language(&state.db, owner.subcategory_id, query.language).await?;
    Ok(Json(AliasResponse {
        alias: content.alias,
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Subcategories",
    operation_id = "createSubcategory",
    summary = "Create a subcategory under a category",
    request_body = CreateSubcategoryRequest,
    responses(
        (status = 201, description = "Subcategory created", body = SubcategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Parent category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(category_id = payload.category_id))]
pub async fn create_subcategory(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSubcategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_subcategory(&payload)?;

    let category = category::Entity::find_by_id(payload.category_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    let now = chrono::Utc::now();
    let new_subcategory = subcategory::ActiveModel {
        uuid: Set(Uuid::new_v4()),
        icon: Set(payload.icon.trim().to_string()),
        poster: Set(payload.poster.trim().to_string()),
        category_id: Set(category.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_subcategory.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(SubcategoryResponse::from(model))))
}

#[utoipa::path(
    post,
    path = "/{id}/contents",
    tag = "Subcategories",
    operation_id = "createSubcategoryContent",
    summary = "Create a subcategory's content row for a language",
    params(("id" = i32, Path, description = "Subcategory ID")),
    request_body = CreateSubcategoryContentRequest,
    responses(
        (status = 201, description = "Content created", body = SubcategoryContentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Missing parent or duplicate language (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(subcategory_id))]
pub async fn create_subcategory_content(
    State(state): State<AppState>,
    Path(subcategory_id): Path<i32>,
    AppJson(payload): AppJson<CreateSubcategoryContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_subcategory_content_title(&payload.title)?;

    let subcategory = subcategory::Entity::find_by_id(subcategory_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!("Subcategory {subcategory_id} does not exist"))
        })?;

    let existing = subcategory_content::Entity::find()
        .filter(subcategory_content::Column::SubcategoryId.eq(subcategory.id))
        .filter(subcategory_content::Column::Language.eq(payload.language))
        .count(&state.db)
        .await?;
    if existing > 0 {
        return Err(AppError::Conflict(format!(
            "Subcategory {subcategory_id} already has '{}' content",
            payload.language
        )));
    }

    let title = payload.title.trim().to_string();
    let new_content = subcategory_content::ActiveModel {
        language: Set(payload.language),
        alias: Set(make_alias(&title, subcategory.id)),
        title: Set(title),
        subcategory_id: Set(subcategory.id),
        ..Default::default()
    };

    let model = new_content.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubcategoryContentResponse::from(model)),
    ))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Subcategories",
    operation_id = "updateSubcategory",
    summary = "Update a subcategory's media attributes",
    params(("id" = i32, Path, description = "Subcategory ID")),
    request_body = UpdateSubcategoryRequest,
    responses(
        (status = 200, description = "Subcategory updated", body = SubcategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Subcategory not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_subcategory(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateSubcategoryRequest>,
) -> Result<Json<SubcategoryResponse>, AppError> {
    validate_update_subcategory(&payload)?;

    if payload == UpdateSubcategoryRequest::default() {
        let existing = find_subcategory(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_subcategory(&txn, id).await?;
    let mut active: subcategory::ActiveModel = existing.into();

    if let Some(ref icon) = payload.icon {
        active.icon = Set(icon.trim().to_string());
    }
    if let Some(ref poster) = payload.poster {
        active.poster = Set(poster.trim().to_string());
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}/contents/{content_id}",
    tag = "Subcategories",
    operation_id = "updateSubcategoryContent",
    summary = "Update a subcategory's content row",
    params(
        ("id" = i32, Path, description = "Subcategory ID"),
        ("content_id" = i32, Path, description = "Content row ID"),
    ),
    request_body = UpdateSubcategoryContentRequest,
    responses(
        (status = 200, description = "Content updated", body = SubcategoryContentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Content not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(subcategory_id, content_id))]
pub async fn update_subcategory_content(
    State(state): State<AppState>,
    Path((subcategory_id, content_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdateSubcategoryContentRequest>,
) -> Result<Json<SubcategoryContentResponse>, AppError> {
    validate_subcategory_content_title(&payload.title)?;

    let txn = state.db.begin().await?;

    let content = find_content_for_subcategory(&txn, subcategory_id, content_id).await?;
    let mut active: subcategory_content::ActiveModel = content.into();

    let title = payload.title.trim().to_string();
    active.alias = Set(make_alias(&title, subcategory_id));
    active.title = Set(title);

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/recompute-aliases",
    tag = "Subcategories",
    operation_id = "recomputeSubcategoryAliases",
    summary = "Recompute every subcategory content alias",
    description = "Recomputes each content row's alias from its current title, one row at a time. Not atomic: rows updated before a failure stay updated; failures are reported per item.",
    responses(
        (status = 200, description = "Per-item recompute report", body = RecomputeSubcategoryAliasesResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn recompute_subcategory_aliases(
    State(state): State<AppState>,
) -> Result<Json<RecomputeSubcategoryAliasesResponse>, AppError> {
    let contents = subcategory_content::Entity::find()
        .order_by_asc(subcategory_content::Column::Id)
        .all(&state.db)
        .await?;

    let mut updated = Vec::with_capacity(contents.len());
    let mut failed = Vec::new();

    for content in contents {
        let id = content.id;
        let alias = make_alias(&content.title, content.subcategory_id);
        let mut active: subcategory_content::ActiveModel = content.into();
        active.alias = Set(alias);

        match active.update(&state.db).await {
            Ok(model) => updated.push(SubcategoryContentResponse::from(model)),
            Err(err) => failed.push(RecomputeFailure {
                id,
                error: err.to_string(),
            }),
        }
    }

    Ok(Json(RecomputeSubcategoryAliasesResponse { updated, failed }))
}

/// Subcategories that have a content row in the given language.
fn localized_scope(language: Language) -> Select<subcategory::Entity> {
    subcategory::Entity::find().filter(
        subcategory::Column::Id.in_subquery(
            SeaQuery::select()
                .column(subcategory_content::Column::SubcategoryId)
                .from(subcategory_content::Entity)
                .and_where(subcategory_content::Column::Language.eq(language))
                .to_owned(),
        ),
    )
}

/// Subcategories whose content row in the given language carries the alias.
fn alias_scope(language: Language, alias: &str) -> Select<subcategory::Entity> {
    subcategory::Entity::find().filter(
        subcategory::Column::Id.in_subquery(
            SeaQuery::select()
                .column(subcategory_content::Column::SubcategoryId)
                .from(subcategory_content::Entity)
                .and_where(subcategory_content::Column::Language.eq(language))
                .and_where(subcategory_content::Column::Alias.eq(alias))
                .to_owned(),
        ),
    )
}

async fn find_subcategory<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<subcategory::Model, AppError> {
    subcategory::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Subcategory not found".into()))
}

async fn find_content_by_language(
    db: &DatabaseConnection,
    subcategory_id: i32,
    language: Language,
) -> Result<subcategory_content::Model, AppError> {
    subcategory_content::Entity::find()
        .filter(subcategory_content::Column::SubcategoryId.eq(subcategory_id))
        .filter(subcategory_content::Column::Language.eq(language))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Subcategory content not found".into()))
}

async fn find_content_for_subcategory<C: ConnectionTrait>(
    db: &C,
    subcategory_id: i32,
    content_id: i32,
) -> Result<subcategory_content::Model, AppError> {
    let content = subcategory_content::Entity::find_by_id(content_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Subcategory content not found".into()))?;

    if content.subcategory_id != subcategory_id {
        return Err(AppError::NotFound("Subcategory content not found".into()));
    }

    Ok(content)
}

async fn assemble_subcategory_tree(
    db: &DatabaseConnection,
    subcategory: subcategory::Model,
    language: Language,
) -> Result<SubcategoryNode, AppError> {
    let mut nodes = assemble_subcategory_nodes(db, vec![subcategory], language, true).await?;
    nodes
        .pop()
        .ok_or_else(|| AppError::Internal("subcategory assembly produced no node".into()))
}

/// Batch-loads the optional relations of a page of subcategories and
/// flattens them into public nodes.
///
/// The direct product count is always loaded; product nodes (with their
/// localized content and images) only when `with_products` is set.
async fn assemble_subcategory_nodes(
    db: &DatabaseConnection,
    subcategories: Vec<subcategory::Model>,
    language: Language,
    with_products: bool,
) -> Result<Vec<SubcategoryNode>, AppError> {
    let contents = subcategories
        .load_many(
            subcategory_content::Entity::find()
                .filter(subcategory_content::Column::Language.eq(language)),
            db,
        )
        .await?;
    let products = subcategories.load_many(product::Entity, db).await?;

    let flat_products: Vec<product::Model> = products.iter().flatten().cloned().collect();
    let (product_contents, product_images) = if with_products {
        (
            flat_products
                .load_many(
                    product_content::Entity::find()
                        .filter(product_content::Column::Language.eq(language)),
                    db,
                )
                .await?,
            flat_products.load_many(product_image::Entity, db).await?,
        )
    } else {
        (Vec::new(), Vec::new())
    };

    let mut content_iter = product_contents.into_iter();
    let mut image_iter = product_images.into_iter();

    let mut nodes = Vec::with_capacity(subcategories.len());
    for ((subcategory, content_rows), prods) in subcategories
        .into_iter()
        .zip(contents.into_iter())
        .zip(products.into_iter())
    {
        let products_total = prods.len() as u64;
        let product_nodes = with_products.then(|| {
            prods
                .into_iter()
                .map(|p| {
                    let content = content_iter.next().unwrap_or_default().into_iter().next();
                    let images = image_iter.next().unwrap_or_default();
                    product_node(p, content, images)
                })
                .collect()
        });

        nodes.push(subcategory_node(
            subcategory,
            content_rows.into_iter().next(),
            product_nodes,
            products_total,
        ));
    }

    Ok(nodes)
}
