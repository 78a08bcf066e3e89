use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use common::{Language, make_alias};

use crate::entity::{category, category_content, product, subcategory, subcategory_content};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::category::*;
use crate::models::shared::{CatalogListQuery, DEFAULT_TREE_PAGE_SIZE, LanguageQuery, page_offset};
use crate::models::subcategory::subcategory_node;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List categories",
    description = "Returns categories that have a content row in the requested language, flattened with the localized title/alias and the transitive product count. Subcategory nodes are not included. Returns everything when `limit` is unset.",
    params(CatalogListQuery),
    responses(
        (status = 200, description = "List of categories", body = Vec<CategoryNode>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CatalogListQuery>,
) -> Result<Json<Vec<CategoryNode>>, AppError> {
    let mut select = localized_scope(query.language)
        .order_by_asc(category::Column::Id)
        .offset(page_offset(query.page, query.limit));
    if let Some(limit) = query.limit {
        select = select.limit(limit);
    }

    let categories = select.all(&state.db).await?;
    let nodes = assemble_category_nodes(&state.db, categories, query.language, false).await?;

    Ok(Json(nodes))
}

#[utoipa::path(
    get,
    path = "/with-subcategories",
    tag = "Categories",
    operation_id = "listCategoriesWithSubcategories",
    summary = "List categories with their subcategory nodes",
    description = "Returns categories with nested subcategory nodes. Subcategories surface even without content in the requested language, with blank localized fields; product arrays are never included at this level. Page size defaults to 10.",
    params(CatalogListQuery),
    responses(
        (status = 200, description = "List of category trees", body = Vec<CategoryNode>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_categories_with_subcategories(
    State(state): State<AppState>,
    Query(query): Query<CatalogListQuery>,
) -> Result<Json<Vec<CategoryNode>>, AppError> {
    let categories = localized_scope(query.language)
        .order_by_asc(category::Column::Id)
        .offset(page_offset(query.page, query.limit))
        .limit(query.limit.unwrap_or(DEFAULT_TREE_PAGE_SIZE))
        .all(&state.db)
        .await?;

    let nodes = assemble_category_nodes(&state.db, categories, query.language, true).await?;

    Ok(Json(nodes))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Categories",
    operation_id = "getCategoryById",
    summary = "Get a category tree by ID",
    params(
        ("id" = i32, Path, description = "Category ID"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Category tree", body = CategoryNode),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(id))]
pub async fn get_category_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<CategoryNode>, AppError> {
    let category = localized_scope(query.language)
        .filter(category::Column::Id.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    Ok(Json(
        assemble_category_tree(&state.db, category, query.language).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/by-uuid/{uuid}",
    tag = "Categories",
    operation_id = "getCategoryByUuid",
    summary = "Get a category tree by UUID",
    params(
        ("uuid" = Uuid, Path, description = "Category UUID"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Category tree", body = CategoryNode),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(uuid = %uuid))]
pub async fn get_category_by_uuid(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<CategoryNode>, AppError> {
    let category = localized_scope(query.language)
        .filter(category::Column::Uuid.eq(uuid))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    Ok(Json(
        assemble_category_tree(&state.db, category, query.language).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/by-alias/{alias}",
    tag = "Categories",
    operation_id = "getCategoryByAlias",
    summary = "Get a category tree by alias",
    description = "Resolves the alias against the content rows of the requested language; a miss is a 404, never an empty list.",
    params(
        ("alias" = String, Path, description = "Category alias in the requested language"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Category tree", body = CategoryNode),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(alias = %alias))]
pub async fn get_category_by_alias(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<CategoryNode>, AppError> {
    let category = alias_scope(query.language, &alias)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    Ok(Json(
        assemble_category_tree(&state.db, category, query.language).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/alias",
    tag = "Categories",
    operation_id = "getCategoryAlias",
    summary = "Get a category's alias in a language",
    params(
        ("id" = i32, Path, description = "Category ID"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Alias", body = AliasResponse),
        (status = 404, description = "No content row for the language (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(id))]
pub async fn get_category_alias(
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
    tag = "Categories",
    operation_id = "translateCategoryAlias",
    summary = "Translate a category alias into another language",
    description = "Looks up the category owning the alias (in any language) and returns its alias in the requested language. Used by language switchers.",
    params(
        ("alias" = String, Path, description = "Known category alias"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Alias in the requested language", body = AliasResponse),
        (status = 404, description = "Alias or target content not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(alias = %alias))]
pub async fn translate_category_alias(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<AliasResponse>, AppError> {
    let owner = category_content::Entity::find()
        .filter(category_content::Column::Alias.eq(&alias))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    let content = find_content_by_language(&state.db, owner.category_id, query.language).await?;
    Ok(Json(AliasResponse {
        alias: content.alias,
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Categories",
    operation_id = "createCategory",
    summary = "Create a category",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_category(&payload)?;

    let now = chrono::Utc::now();
    let new_category = category::ActiveModel {
        uuid: Set(Uuid::new_v4()),
        icon: Set(payload.icon.trim().to_string()),
        poster: Set(payload.poster.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_category.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(model))))
}

#[utoipa::path(
    post,
    path = "/{id}/contents",
    tag = "Categories",
    operation_id = "createCategoryContent",
    summary = "Create a category's content row for a language",
    description = "Creates the localized title for a category and derives its alias. Rejected with 409 when the category does not exist or already has content in that language.",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = CreateCategoryContentRequest,
    responses(
        (status = 201, description = "Content created", body = CategoryContentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Missing parent or duplicate language (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(category_id))]
pub async fn create_category_content(
    State(state): State<AppState>,
    Path(category_id): Path<i32>,
    AppJson(payload): AppJson<CreateCategoryContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_category_content_title(&payload.title)?;

    let category = category::Entity::find_by_id(category_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Category {category_id} does not exist")))?;

    let existing = category_content::Entity::find()
        .filter(category_content::Column::CategoryId.eq(category.id))
        .filter(category_content::Column::Language.eq(payload.language))
        .count(&state.db)
        .await?;
    if existing > 0 {
        return Err(AppError::Conflict(format!(
            "Category {category_id} already has '{}' content",
            payload.language
        )));
    }

    let title = payload.title.trim().to_string();
    let new_content = category_content::ActiveModel {
        language: Set(payload.language),
        alias: Set(make_alias(&title, category.id)),
        title: Set(title),
        category_id: Set(category.id),
        ..Default::default()
    };

    let model = new_content.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(CategoryContentResponse::from(model)),
    ))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Categories",
    operation_id = "updateCategory",
    summary = "Update a category's media attributes",
    description = "Partially updates a category using PATCH semantics — only provided fields are modified. An empty payload returns the current resource unchanged.",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    validate_update_category(&payload)?;

    if payload == UpdateCategoryRequest::default() {
        let existing = find_category(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_category(&txn, id).await?;
    let mut active: category::ActiveModel = existing.into();

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
    tag = "Categories",
    operation_id = "updateCategoryContent",
    summary = "Update a category's content row",
    description = "Replaces the localized title and recomputes the alias from it. The content row must belong to the category in the path.",
    params(
        ("id" = i32, Path, description = "Category ID"),
        ("content_id" = i32, Path, description = "Content row ID"),
    ),
    request_body = UpdateCategoryContentRequest,
    responses(
        (status = 200, description = "Content updated", body = CategoryContentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Content not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(category_id, content_id))]
pub async fn update_category_content(
    State(state): State<AppState>,
    Path((category_id, content_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdateCategoryContentRequest>,
) -> Result<Json<CategoryContentResponse>, AppError> {
    validate_category_content_title(&payload.title)?;

    let txn = state.db.begin().await?;

    let content = find_content_for_category(&txn, category_id, content_id).await?;
    let mut active: category_content::ActiveModel = content.into();

    let title = payload.title.trim().to_string();
    active.alias = Set(make_alias(&title, category_id));
    active.title = Set(title);

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/recompute-aliases",
    tag = "Categories",
    operation_id = "recomputeCategoryAliases",
    summary = "Recompute every category content alias",
    description = "Recomputes each content row's alias from its current title, one row at a time. Not atomic: rows updated before a failure stay updated; failures are reported per item.",
    responses(
        (status = 200, description = "Per-item recompute report", body = RecomputeCategoryAliasesResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn recompute_category_aliases(
    State(state): State<AppState>,
) -> Result<Json<RecomputeCategoryAliasesResponse>, AppError> {
    let contents = category_content::Entity::find()
        .order_by_asc(category_content::Column::Id)
        .all(&state.db)
        .await?;

    let mut updated = Vec::with_capacity(contents.len());
    let mut failed = Vec::new();

    for content in contents {
        let id = content.id;
        let alias = make_alias(&content.title, content.category_id);
        let mut active: category_content::ActiveModel = content.into();
        active.alias = Set(alias);

        match active.update(&state.db).await {
            Ok(model) => updated.push(CategoryContentResponse::from(model)),
            Err(err) => failed.push(RecomputeFailure {
                id,
                error: err.to_string(),
            }),
        }
    }

    Ok(Json(RecomputeCategoryAliasesResponse { updated, failed }))
}

/// Categories that have a content row in the given language. The mandatory
/// half of the join asymmetry: no content, no category.
fn localized_scope(language: Language) -> Select<category::Entity> {
    category::Entity::find().filter(
        category::Column::Id.in_subquery(
            SeaQuery::select()
                .column(category_content::Column::CategoryId)
                .from(category_content::Entity)
                .and_where(category_content::Column::Language.eq(language))
                .to_owned(),
        ),
    )
}

/// Categories whose content row in the given language carries the alias.
fn alias_scope(language: Language, alias: &str) -> Select<category::Entity> {
    category::Entity::find().filter(
        category::Column::Id.in_subquery(
            SeaQuery::select()
                .column(category_content::Column::CategoryId)
                .from(category_content::Entity)
                .and_where(category_content::Column::Language.eq(language))
                .and_where(category_content::Column::Alias.eq(alias))
                .to_owned(),
        ),
    )
}

async fn find_category<C: ConnectionTrait>(db: &C, id: i32) -> Result<category::Model, AppError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))
}

async fn find_content_by_language(
    db: &DatabaseConnection,
    category_id: i32,
    language: Language,
) -> Result<category_content::Model, AppError> {
    category_content::Entity::find()
        .filter(category_content::Column::CategoryId.eq(category_id))
        .filter(category_content::Column::Language.eq(language))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category content not found".into()))
}

async fn find_content_for_category<C: ConnectionTrait>(
    db: &C,
    category_id: i32,
    content_id: i32,
) -> Result<category_content::Model, AppError> {
    let content = category_content::Entity::find_by_id(content_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category content not found".into()))?;

    if content.category_id != category_id {
        return Err(AppError::NotFound("Category content not found".into()));
    }

    Ok(content)
}

async fn assemble_category_tree(
    db: &DatabaseConnection,
    category: category::Model,
    language: Language,
) -> Result<CategoryNode, AppError> {
    let mut nodes = assemble_category_nodes(db, vec![category], language, true).await?;
    nodes
        .pop()
        .ok_or_else(|| AppError::Internal("category assembly produced no node".into()))
}

/// Batch-loads the optional relations of a page of categories and flattens
/// them into public nodes.
///
/// Content loads are filtered to one language, so the "first loaded content
/// row" is the single resolved row. Products are loaded for every
/// subcategory regardless of language: the aggregates are structural counts.
async fn assemble_category_nodes(
    db: &DatabaseConnection,
    categories: Vec<category::Model>,
    language: Language,
    with_subcategories: bool,
) -> Result<Vec<CategoryNode>, AppError> {
    let contents = categories
        .load_many(
            category_content::Entity::find()
                .filter(category_content::Column::Language.eq(language)),
            db,
        )
        .await?;
    let subcategories = categories.load_many(subcategory::Entity, db).await?;

    let flat_subs: Vec<subcategory::Model> = subcategories.iter().flatten().cloned().collect();
    let products = flat_subs.load_many(product::Entity, db).await?;
    let sub_contents = if with_subcategories {
        flat_subs
            .load_many(
                subcategory_content::Entity::find()
                    .filter(subcategory_content::Column::Language.eq(language)),
                db,
            )
            .await?
    } else {
        Vec::new()
    };

    let mut count_iter = products.into_iter().map(|p| p.len() as u64);
    let mut sub_content_iter = sub_contents.into_iter();

    let mut nodes = Vec::with_capacity(categories.len());
    for ((category, content_rows), subs) in categories
        .into_iter()
        .zip(contents.into_iter())
        .zip(subcategories.into_iter())
    {
        let mut counts = Vec::with_capacity(subs.len());
        let mut sub_nodes = Vec::with_capacity(subs.len());

        for sub in subs {
            let count = count_iter.next().unwrap_or(0);
            counts.push(count);
            if with_subcategories {
                let content = sub_content_iter.next().unwrap_or_default().into_iter().next();
                sub_nodes.push(subcategory_node(sub, content, None, count));
            }
        }

        nodes.push(category_node(
            category,
            content_rows.into_iter().next(),
            with_subcategories.then_some(sub_nodes),
            &counts,
        ));
    }

    Ok(nodes)
}
