//! Language Collectors (C2, spec §4.2).
//!
//! Each language implements a declaration pass (emits `Symbol`s, pushing/
//! popping a scope frame for container-like nodes) and a reference pass
//! (emits raw `Reference`s against `target_raw` names, resolved later by
//! `resolver`). Traversal is depth-first, pre-order, ties broken by byte
//! offset — the natural order of `tree_sitter`'s `named_children` iterator,
//! so no explicit sort is required as long as collectors walk top-down.

pub mod php;
pub mod typescript;

use crate::model::{Reference, Symbol};

/// Output of both passes over one file.
#[derive(Debug, Default)]
pub struct CollectOutput {
    pub symbols: Vec<Symbol>,
    pub references: Vec<Reference>,
}

impl CollectOutput {
    pub fn merge(&mut self, other: CollectOutput) {
        self.symbols.extend(other.symbols);
        self.references.extend(other.references);
    }
}

/// Facade every language collector implements, so the orchestrator (C8)
/// and the parse dispatch stay language-agnostic beyond this one call.
///
/// `file_symbol_id`/`repo_rel_path` come from the filesystem enumeration
/// phase (file symbols are created before Pass 1, per §3 lifecycles) so the
/// collector can emit the `defines(file -> top_level_decl)` edge and set
/// `parent_id` without recomputing the file's id itself.
pub trait LanguageCollector {
    fn collect(
        &self,
        parsed: &crate::ast::ParsedFile,
        file_symbol_id: &str,
        repo_rel_path: &str,
    ) -> anyhow::Result<CollectOutput>;
}
