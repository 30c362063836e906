//! The data model shared across every pipeline stage: `Symbol`, `Reference`,
//! the language taxonomy, and source spans. See spec §3.

pub mod language;
pub mod reference;
pub mod span;
pub mod symbol;

pub use language::LanguageKind;
pub use reference::{RefContext, RefTarget, Reference, ReferenceKind};
pub use span::{Position, Span};
pub use symbol::{DeclaredTypes, DocBlock, Modifier, Parameter, Signature, Symbol, SymbolKind};
