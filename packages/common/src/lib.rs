pub mod alias;
pub mod language;
pub mod translit;

pub use alias::make_alias;
pub use language::Language;
pub use translit::transliterate;
