#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language of a localized content row.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly as a
/// SeaORM entity column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Russian. The fallback for every endpoint where the caller omits a language.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ru"))]
    Ru,
    /// English.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "en"))]
    En,
    /// Uzbek.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "uz"))]
    Uz,
}

impl Language {
    /// All supported language codes.
    pub const ALL: &'static [Language] = &[Self::Ru, Self::En, Self::Uz];

    /// Returns the lowercase language code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ru => "ru",
            Self::En => "en",
            Self::Uz => "uz",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::Ru
    }
}

/// Error when parsing an unsupported language code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language '{invalid}' (supported: ru, en, uz)")]
pub struct ParseLanguageError {
    invalid: String,
}

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ru" => Ok(Self::Ru),
            "en" => Ok(Self::En),
            "uz" => Ok(Self::Uz),
            _ => Err(ParseLanguageError {
                invalid: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        for language in Language::ALL {
            let json = serde_json::to_string(language).unwrap();
            let parsed: Language = serde_json::from_str(&json).unwrap();
            assert_eq!(*language, parsed);
        }
    }

    #[test]
    fn serializes_as_lowercase_code() {
        assert_eq!(serde_json::to_string(&Language::Ru).unwrap(), "\"ru\"");
        assert_eq!(serde_json::to_string(&Language::Uz).unwrap(), "\"uz\"");
    }

    #[test]
    fn from_str_accepts_known_codes() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert!("de".parse::<Language>().is_err());
        assert!("RU".parse::<Language>().is_err());
    }

    #[test]
    fn default_is_russian() {
        assert_eq!(Language::default(), Language::Ru);
    }
}
