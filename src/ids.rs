//! Deterministic 128-bit symbol fingerprints (spec §4.3).
//!
//! UUIDv5 is a namespace+name hash that is exactly 128 bits and, given the
//! same inputs, always produces the same output — precisely the "id =
//! hash(...)" contract the spec asks for, which is what lets a re-run over
//! an unchanged tree upsert the same ids instead of duplicating rows.

use crate::model::{symbol::EXTERNAL_FILE_PATH, LanguageKind, SymbolKind};
use uuid::Uuid;

fn uuid_v5(key: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
        .simple()
        .to_string()
}

/// `symbol.id = hash(language || '\0' || kind || '\0' || qualified_name || '\0' || file_path)`
pub fn symbol_id(language: LanguageKind, kind: SymbolKind, qualified_name: &str, file_path: &str) -> String {
    let key = format!("{}\0{}\0{}\0{}", language, kind.as_str(), qualified_name, file_path);
    uuid_v5(&key)
}

/// File/directory nodes: `hash('fs\0' || normalized_absolute_path_below_project_root)`
pub fn fs_id(normalized_repo_rel_path: &str) -> String {
    let key = format!("fs\0{normalized_repo_rel_path}");
    uuid_v5(&key)
}

/// Placeholder externals: `hash('ext\0' || language || '\0' || qualified_name)`
pub fn external_placeholder_id(language: LanguageKind, qualified_name: &str) -> String {
    let key = format!("ext\0{language}\0{qualified_name}");
    uuid_v5(&key)
}

/// Convenience: build the `Symbol` struct for an external placeholder with
/// the sentinel file path, reusing `external_placeholder_id` for its id.
pub fn external_placeholder_file_path() -> &'static str {
    EXTERNAL_FILE_PATH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_id_is_deterministic() {
        let a = symbol_id(LanguageKind::Php, SymbolKind::Class, "App\\Foo", "src/Foo.php");
        let b = symbol_id(LanguageKind::Php, SymbolKind::Class, "App\\Foo", "src/Foo.php");
        assert_eq!(a, b);
    }

    #[test]
    fn symbol_id_changes_with_any_key_component() {
        let base = symbol_id(LanguageKind::Php, SymbolKind::Class, "App\\Foo", "src/Foo.php");
        let diff_name = symbol_id(LanguageKind::Php, SymbolKind::Class, "App\\Bar", "src/Foo.php");
        let diff_kind = symbol_id(LanguageKind::Php, SymbolKind::Interface, "App\\Foo", "src/Foo.php");
        assert_ne!(base, diff_name);
        assert_ne!(base, diff_kind);
    }

    #[test]
    fn unrelated_file_rename_does_not_perturb_other_ids() {
        let before = symbol_id(LanguageKind::Php, SymbolKind::Class, "App\\Foo", "src/Foo.php");
        // Renaming some *other* file has no bearing on this key.
        let after = symbol_id(LanguageKind::Php, SymbolKind::Class, "App\\Foo", "src/Foo.php");
        assert_eq!(before, after);
    }
}
