use common::Language;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default page size for tree listings (`with-subcategories`, `with-products`,
/// `with-images`). Plain listings have no default and return everything.
pub const DEFAULT_TREE_PAGE_SIZE: u64 = 10;

/// Query parameters shared by the catalog list and lookup endpoints.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogListQuery {
    /// Content language. Defaults to `ru`.
    #[serde(default)]
    pub language: Language,
    /// 1-based page number. Missing page is treated as the first page.
    pub page: Option<u64>,
    /// Page size cap.
    pub limit: Option<u64>,
}

/// Language selector for single-entity lookups.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LanguageQuery {
    /// Content language. Defaults to `ru`.
    #[serde(default)]
    pub language: Language,
}

/// Alias of an entity's content row in the requested language.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AliasResponse {
    #[schema(example = "elektronika-10001")]
    pub alias: String,
}

/// A content row the bulk alias recomputation failed to update.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RecomputeFailure {
    /// Content row id.
    pub id: i32,
    /// Database error description.
    pub error: String,
}

/// Offset into a listing: `(page - 1) * limit`, clamped to zero when either
/// parameter is absent or the page is below 1. A missing page and the first
/// page are identical.
pub fn page_offset(page: Option<u64>, limit: Option<u64>) -> u64 {
    match (page, limit) {
        (Some(page), Some(limit)) => page.saturating_sub(1) * limit,
        _ => 0,
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Validate a trimmed title (1-256 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(AppError::Validation(
            "Title must be 1-256 characters".into(),
        ));
    }
    Ok(())
}

/// Validate a media URL field (icon, poster, image).
pub fn validate_media_url(url: &str, field: &str) -> Result<(), AppError> {
    let url = url.trim();
    if url.is_empty() || url.chars().count() > 2048 {
        return Err(AppError::Validation(format!(
            "{field} must be 1-2048 characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offset_defaults_to_zero() {
        assert_eq!(page_offset(None, None), 0);
        assert_eq!(page_offset(Some(3), None), 0);
        assert_eq!(page_offset(None, Some(10)), 0);
    }

    #[test]
    fn page_offset_treats_first_page_like_missing_page() {
        assert_eq!(page_offset(Some(1), Some(10)), 0);
        assert_eq!(page_offset(Some(0), Some(10)), 0);
    }

    #[test]
    fn page_offset_skips_previous_pages() {
        assert_eq!(page_offset(Some(3), Some(10)), 20);
        assert_eq!(page_offset(Some(2), Some(7)), 7);
    }

    #[test]
    fn validate_title_bounds() {
        assert!(validate_title("Чай").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(257)).is_err());
    }

    #[test]
    fn validate_media_url_bounds() {
        assert!(validate_media_url("https://host.com/icon.webp", "Icon").is_ok());
        assert!(validate_media_url("", "Icon").is_err());
        assert!(validate_media_url(&"u".repeat(2049), "Icon").is_err());
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
