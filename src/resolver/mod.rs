//! Reference Resolver (C4, spec §4.4).
//!
//! Pass 2 walks every raw reference left by the collectors and tries the
//! ordered strategies in `strategies` until one hits; resolution is layered
//! (structural references first, then signature, then expression, then the
//! `overrides`/`implements_method` derived pass in `overrides`) because a
//! method's override edge can only be computed once its class's `extends`/
//! `implements` edges are already resolved.

pub mod overrides;
pub mod strategies;

use crate::model::{LanguageKind, Reference, ReferenceKind, Symbol};
use crate::store::SqliteStore;
use std::collections::HashMap;

#[derive(Debug, Default, Clone, Copy)]
pub struct ResolveStats {
    pub resolved_exact: usize,
    pub resolved_scope_imports: usize,
    pub resolved_builtin: usize,
    pub resolved_namespace_fallback: usize,
    pub resolved_unique_suffix: usize,
    pub resolved_external_placeholder: usize,
    pub overrides_added: usize,
    pub implements_method_added: usize,
}

/// Runs Pass 2 end to end: structural references, then signature
/// references, then expression references (the three are just different
/// `ReferenceKind` partitions over the same unresolved set — order only
/// matters in that structural edges must land before the derived pass
/// walks `extends`/`implements` chains), then the derived pass.
pub fn resolve_all(store: &mut SqliteStore) -> rusqlite::Result<ResolveStats> {
    let mut stats = ResolveStats::default();

    let unresolved = store.unresolved_references()?;
    let mut structural = Vec::new();
    let mut signature = Vec::new();
    let mut expression = Vec::new();
    for r in unresolved {
        if r.kind.is_structural() {
            structural.push(r);
        } else if r.kind.is_signature() {
            signature.push(r);
        } else if !r.kind.is_derived() {
            expression.push(r);
        }
    }

    let file_imports_cache: HashMap<LanguageKind, HashMap<String, HashMap<String, String>>> = HashMap::new();
    let mut file_imports_cache = file_imports_cache;

    for batch in [structural, signature, expression] {
        for r in batch {
            resolve_one(store, &r, &mut file_imports_cache, &mut stats)?;
        }
    }

    let derived = overrides::compute_derived_references(store)?;
    stats.overrides_added = derived.overrides_added;
    stats.implements_method_added = derived.implements_method_added;

    Ok(stats)
}

fn resolve_one(
    store: &mut SqliteStore,
    reference: &Reference,
    file_imports_cache: &mut HashMap<LanguageKind, HashMap<String, HashMap<String, String>>>,
    stats: &mut ResolveStats,
) -> rusqlite::Result<()> {
    let Some(raw) = reference.target_raw() else { return Ok(()) };
    let raw = raw.to_string();

    let Some(source) = store.get_symbol(&reference.source_id)? else { return Ok(()) };
    let lang = source.language;

    if let Some(sym) = strategies::exact_fqn(store, lang, &raw)? {
        apply(store, reference, &raw, &sym)?;
        stats.resolved_exact += 1;
        return Ok(());
    }

    let imports = file_imports_for(store, &source.file_path, lang, file_imports_cache)?;
    if let Some(sym) = strategies::scope_and_imports(store, lang, &raw, &imports)? {
        apply(store, reference, &raw, &sym)?;
        stats.resolved_scope_imports += 1;
        return Ok(());
    }

    if let Some(sym) = strategies::builtin_type(store, lang, &raw)? {
        apply(store, reference, &raw, &sym)?;
        stats.resolved_builtin += 1;
        return Ok(());
    }

    let ancestors = ancestor_qualifiers(store, &source)?;
    if let Some(sym) = strategies::namespace_fallback(store, lang, &raw, &ancestors)? {
        apply(store, reference, &raw, &sym)?;
        stats.resolved_namespace_fallback += 1;
        return Ok(());
    }

    if let Some(sym) = strategies::unique_partial_suffix(store, lang, &raw)? {
        apply(store, reference, &raw, &sym)?;
        stats.resolved_unique_suffix += 1;
        return Ok(());
    }

    let sym = strategies::ensure_external_placeholder(store, lang, &raw)?;
    apply(store, reference, &raw, &sym)?;
    stats.resolved_external_placeholder += 1;
    Ok(())
}

fn apply(store: &mut SqliteStore, reference: &Reference, raw: &str, target: &Symbol) -> rusqlite::Result<()> {
    store.resolve_reference(&reference.source_id, raw, reference.kind, reference.site, &target.id)
}

/// Innermost-first qualifier prefixes of `source`'s own qualified name,
/// ending with the empty (global) qualifier. E.g. for `App.Models.User`
/// this yields `["App.Models", "App", ""]`.
fn ancestor_qualifiers(store: &SqliteStore, source: &Symbol) -> rusqlite::Result<Vec<String>> {
    let mut chain = Vec::new();
    let mut current = source.parent_id.clone();
    while let Some(id) = current {
        let Some(parent) = store.get_symbol(&id)? else { break };
        chain.push(parent.qualified_name.clone());
        current = parent.parent_id.clone();
    }
    chain.push(String::new());
    Ok(chain)
}

/// Builds (and caches) a short-name -> fully-qualified-import-target map
/// for one file, from its already-resolved-or-raw `imports` references.
/// Only the final dotted segment of each import target is used as the key,
/// which is the common case for both `use Foo\Bar\Baz;` and
/// `import { Baz } from "./bar"` — aliases are not separately tracked.
fn file_imports_for(
    store: &SqliteStore,
    file_path: &str,
    lang: LanguageKind,
    cache: &mut HashMap<LanguageKind, HashMap<String, HashMap<String, String>>>,
) -> rusqlite::Result<HashMap<String, String>> {
    if let Some(per_file) = cache.get(&lang).and_then(|m| m.get(file_path)) {
        return Ok(per_file.clone());
    }

    let mut map = HashMap::new();
    for r in store.all_references()? {
        if r.kind != ReferenceKind::Imports {
            continue;
        }
        let Some(raw) = r.target_raw() else { continue };
        let Some(source) = store.get_symbol(&r.source_id)? else { continue };
        if source.file_path != file_path || source.language != lang {
            continue;
        }
        let short = raw.rsplit('.').next().unwrap_or(raw).to_string();
        map.insert(short, raw.to_string());
    }

    cache.entry(lang).or_default().insert(file_path.to_string(), map.clone());
    Ok(map)
}
