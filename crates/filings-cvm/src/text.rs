//! Text normalization for statement labels.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Strips diacritics and folds compatibility characters (`"Balanço"` → `"Balanco"`).
pub(crate) fn strip_diacritics(s: &str) -> String {
    s.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Normalizes a column header: trimmed, ASCII-folded, spaces to underscores, lowercase.
pub(crate) fn column_key(s: &str) -> String {
    strip_diacritics(s.trim()).replace(' ', "_").to_lowercase()
}

/// Normalizes a line description: ASCII-folded, uppercase, trimmed, spaces to underscores.
pub(crate) fn description_key(s: &str) -> String {
    strip_diacritics(s).to_uppercase().trim().replace(' ', "_")
}
