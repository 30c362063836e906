//! Symbol model — a named declaration in source, per spec §3.

use crate::model::{language::LanguageKind, span::Span};
use serde::{Deserialize, Serialize};

/// Sentinel `file_path` used for symbols that stand in for something the
/// pipeline could not locate in-repo (unresolved imports, built-in types,
/// cross-language endpoints with no matching handler).
pub const EXTERNAL_FILE_PATH: &str = "<external>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Namespace,
    Module,
    Class,
    Interface,
    Trait,
    Enum,
    Function,
    Method,
    Property,
    Constant,
    Field,
    Parameter,
    File,
    Directory,
    ConfigFile,
    ExternalPlaceholder,
    ApiEndpoint,
}

impl SymbolKind {
    /// `true` for kinds that participate in type-hierarchy resolution
    /// (extends/implements/uses_trait endpoints must both be class-like).
    pub fn is_class_like(self) -> bool {
        matches!(self, SymbolKind::Class | SymbolKind::Interface | SymbolKind::Trait)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Namespace => "namespace",
            SymbolKind::Module => "module",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Trait => "trait",
            SymbolKind::Enum => "enum",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Property => "property",
            SymbolKind::Constant => "constant",
            SymbolKind::Field => "field",
            SymbolKind::Parameter => "parameter",
            SymbolKind::File => "file",
            SymbolKind::Directory => "directory",
            SymbolKind::ConfigFile => "config_file",
            SymbolKind::ExternalPlaceholder => "external_placeholder",
            SymbolKind::ApiEndpoint => "api_endpoint",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Abstract,
    Final,
    Static,
    Readonly,
    Async,
    Generator,
    Public,
    Protected,
    Private,
}

/// One parameter in a callable's signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub declared_type: Option<String>,
    #[serde(default)]
    pub has_default: bool,
    #[serde(default)]
    pub by_reference: bool,
    #[serde(default)]
    pub variadic: bool,
}

/// Structured parameter list for callables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// Return type / field type / union members for a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredTypes {
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub union_members: Vec<String>,
}

/// One `@param`/`@return`/`@throws` entry in a parsed docblock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocEntry {
    pub tag: String,
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocBlock {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub entries: Vec<DocEntry>,
}

/// A named declaration recorded by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub id: String,
    pub kind: SymbolKind,
    pub name: String,
    pub qualified_name: String,
    pub language: LanguageKind,
    pub file_path: String,
    pub span: Span,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub signature: Option<Signature>,
    #[serde(default)]
    pub declared_types: Option<DeclaredTypes>,
    #[serde(default)]
    pub docblock: Option<DocBlock>,
}

impl Symbol {
    pub fn is_external(&self) -> bool {
        self.file_path == EXTERNAL_FILE_PATH
    }

    pub fn has_modifier(&self, m: Modifier) -> bool {
        self.modifiers.contains(&m)
    }
}
