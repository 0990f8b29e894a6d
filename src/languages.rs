// Language names accepted by the provider and their numeric `languageid`
use crate::error::GoldenTourError;

pub const DEFAULT_LANGUAGE: &str = "English";

// Client-side catalog, not yet checked against the provider; compare with
// the live list from `get_languages()`
const LANGUAGES: &[(&str, u32)] = &[
    ("English", 1),
    ("Spanish", 2),
    ("French", 3),
    ("German", 4),
    ("Italian", 5),
    ("Portuguese", 6),
    ("Russian", 7),
    ("Japanese", 8),
    ("Chinese", 9),
    ("Arabic", 10),
    ("Dutch", 11),
    ("Polish", 12),
    ("Korean", 13),
    ("Hindi", 14),
];

// Resolve a language name (exact, case-sensitive) to the provider identifier.
pub fn lookup(name: &str) -> Result<u32, GoldenTourError> {
    LANGUAGES
        .iter()
        .find(|(language, _)| *language == name)
        .map(|(_, id)| *id)
        .ok_or_else(|| GoldenTourError::UnknownLanguage(name.to_string()))
}

// Optional language arguments fall back to English
pub fn resolve(name: Option<&str>) -> Result<u32, GoldenTourError> {
    lookup(name.unwrap_or(DEFAULT_LANGUAGE))
}

pub fn names() -> impl Iterator<Item = &'static str> {
    LANGUAGES.iter().map(|(name, _)| *name)
}
