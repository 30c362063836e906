//! Language taxonomy.
//!
//! Keep the set tight: the two required "minimum" families from the spec
//! (a scoped, PHP-family language and a module-graph JS/TS-family pair),
//! plus `Meta` for filesystem/config entities that are not owned by any
//! source language.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageKind {
    Php,
    JavaScript,
    TypeScript,
    /// Filesystem (`directory`/`file`) and configuration (`config_file`) entities.
    Meta,
}

impl Display for LanguageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LanguageKind::Php => "php",
            LanguageKind::JavaScript => "javascript",
            LanguageKind::TypeScript => "typescript",
            LanguageKind::Meta => "meta",
        })
    }
}

impl LanguageKind {
    /// Best-effort detection by file extension. Returns `None` for
    /// unsupported extensions; callers fall back to the metadata pass or
    /// skip the file entirely.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "php" | "phtml" => Some(Self::Php),
            "js" | "mjs" | "cjs" | "jsx" => Some(Self::JavaScript),
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_known_extensions() {
        assert_eq!(LanguageKind::from_extension("php"), Some(LanguageKind::Php));
        assert_eq!(
            LanguageKind::from_extension("TSX"),
            Some(LanguageKind::TypeScript)
        );
        assert_eq!(LanguageKind::from_extension("yaml"), None);
    }
}
