//! Data-driven `(language, kind) -> labels` mapping (spec §4.7/§6). Every
//! node gets the generic `Symbol` label plus one precise primary label —
//! `language + kind` for source declarations (`PhpClass`, `TsFunction`),
//! bare kind names for the filesystem/meta kinds (`File`, `Directory`,
//! `ConfigFile`, `ApiEndpoint`, `External`) that are not owned by any
//! language. This is the only place C7 is allowed to know about languages
//! or kinds at all.

use crate::model::{LanguageKind, SymbolKind};

fn kind_label(kind: SymbolKind) -> &'static str {
    match kind {
        SymbolKind::Namespace => "Namespace",
        SymbolKind::Module => "Module",
        SymbolKind::Class => "Class",
        SymbolKind::Interface => "Interface",
        SymbolKind::Trait => "Trait",
        SymbolKind::Enum => "Enum",
        SymbolKind::Function => "Function",
        SymbolKind::Method => "Method",
        SymbolKind::Property => "Property",
        SymbolKind::Constant => "Constant",
        SymbolKind::Field => "Field",
        SymbolKind::Parameter => "Parameter",
        SymbolKind::File => "File",
        SymbolKind::Directory => "Directory",
        SymbolKind::ConfigFile => "ConfigFile",
        SymbolKind::ExternalPlaceholder => "External",
        SymbolKind::ApiEndpoint => "ApiEndpoint",
    }
}

fn language_prefix(language: LanguageKind) -> &'static str {
    match language {
        LanguageKind::Php => "Php",
        LanguageKind::JavaScript => "Js",
        LanguageKind::TypeScript => "Ts",
        LanguageKind::Meta => "",
    }
}

/// `true` for kinds that are filesystem/meta entities rather than
/// language-owned declarations — these never get a language prefix, since
/// a `File` or `ApiEndpoint` isn't "a PHP file" or "a TS endpoint".
fn is_meta_kind(kind: SymbolKind) -> bool {
    matches!(
        kind,
        SymbolKind::File | SymbolKind::Directory | SymbolKind::ConfigFile | SymbolKind::ExternalPlaceholder | SymbolKind::ApiEndpoint
    )
}

/// Labels applied to one materialized node, in write order: the generic
/// `Symbol` label first, then the precise primary label.
pub fn labels_for(language: LanguageKind, kind: SymbolKind) -> Vec<String> {
    let primary = if is_meta_kind(kind) || language == LanguageKind::Meta {
        kind_label(kind).to_string()
    } else {
        format!("{}{}", language_prefix(language), kind_label(kind))
    };
    vec!["Symbol".to_string(), primary]
}

pub fn relationship_type(kind: crate::model::ReferenceKind) -> &'static str {
    match kind {
        crate::model::ReferenceKind::Contains => "CONTAINS",
        crate::model::ReferenceKind::Defines => "DEFINES",
        crate::model::ReferenceKind::Extends => "EXTENDS",
        crate::model::ReferenceKind::Implements => "IMPLEMENTS",
        crate::model::ReferenceKind::UsesTrait => "USES_TRAIT",
        crate::model::ReferenceKind::Imports => "IMPORTS",
        crate::model::ReferenceKind::Calls => "CALLS",
        crate::model::ReferenceKind::CallsStatic => "CALLS_STATIC",
        crate::model::ReferenceKind::Instantiates => "INSTANTIATES",
        crate::model::ReferenceKind::AccessesRead => "ACCESSES_READ",
        crate::model::ReferenceKind::AccessesWrite => "ACCESSES_WRITE",
        crate::model::ReferenceKind::ParameterType => "PARAMETER_TYPE",
        crate::model::ReferenceKind::ReturnsType => "RETURNS_TYPE",
        crate::model::ReferenceKind::Throws => "THROWS",
        crate::model::ReferenceKind::Overrides => "OVERRIDES",
        crate::model::ReferenceKind::ImplementsMethod => "IMPLEMENTS_METHOD",
        crate::model::ReferenceKind::Instanceof => "INSTANCEOF",
        crate::model::ReferenceKind::RegisteredIn => "REGISTERED_IN",
        crate::model::ReferenceKind::LoadsViaConfig => "LOADS_VIA_CONFIG",
        crate::model::ReferenceKind::ApiCalls => "API_CALLS",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combines_language_and_kind_for_source_declarations() {
        let labels = labels_for(LanguageKind::Php, SymbolKind::Class);
        assert_eq!(labels, vec!["Symbol".to_string(), "PhpClass".to_string()]);
        let labels = labels_for(LanguageKind::TypeScript, SymbolKind::Function);
        assert_eq!(labels, vec!["Symbol".to_string(), "TsFunction".to_string()]);
    }

    #[test]
    fn meta_kinds_never_get_a_language_prefix() {
        assert_eq!(labels_for(LanguageKind::Meta, SymbolKind::ConfigFile), vec!["Symbol", "ConfigFile"]);
        assert_eq!(labels_for(LanguageKind::Php, SymbolKind::File), vec!["Symbol", "File"]);
        assert_eq!(labels_for(LanguageKind::Meta, SymbolKind::ApiEndpoint), vec!["Symbol", "ApiEndpoint"]);
    }
}
