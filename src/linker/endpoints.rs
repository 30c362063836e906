//! Cross-Language Linker (C5, spec §4.5): synthesizes one `ApiEndpoint`
//! symbol per distinct `(method, path)` fingerprint declared by a
//! server-side handler, deduplicated across however many handlers declare
//! the same route, then resolves client-side `api_calls` call sites
//! against it.

use crate::ids::symbol_id;
use crate::linker::fingerprint::fingerprint;
use crate::model::symbol::EXTERNAL_FILE_PATH;
use crate::model::{LanguageKind, RefTarget, Reference, ReferenceKind, Span, Symbol, SymbolKind};
use crate::store::SqliteStore;
use std::collections::HashMap;

#[derive(Debug, Default, Clone, Copy)]
pub struct LinkStats {
    pub endpoints_synthesized: usize,
    pub api_calls_linked: usize,
    pub api_calls_unmatched: usize,
}

/// Runs the full cross-language link pass over the store: endpoint
/// synthesis from `http_route` docblock entries, then resolution of every
/// unresolved `api_calls` reference against the fingerprint table.
pub fn link_endpoints(store: &mut SqliteStore) -> rusqlite::Result<LinkStats> {
    let mut stats = LinkStats::default();
    let mut fingerprint_to_endpoint: HashMap<String, String> = HashMap::new();
    let mut new_symbols = Vec::new();
    let mut new_refs = Vec::new();

    for method_symbol in all_handler_methods(store)? {
        let Some(route) = method_symbol
            .docblock
            .as_ref()
            .and_then(|d| d.entries.iter().find(|e| e.tag == "http_route"))
        else {
            continue;
        };
        let Some((method, path)) = route.detail.split_once(' ') else { continue };
        let fp = fingerprint(method, path);

        let endpoint_id = fingerprint_to_endpoint.entry(fp.clone()).or_insert_with(|| {
            let id = symbol_id(LanguageKind::Meta, SymbolKind::ApiEndpoint, &fp, EXTERNAL_FILE_PATH);
            new_symbols.push(Symbol {
                id: id.clone(),
                kind: SymbolKind::ApiEndpoint,
                name: fp.clone(),
                qualified_name: fp.clone(),
                language: LanguageKind::Meta,
                file_path: EXTERNAL_FILE_PATH.to_string(),
                span: Span::zero(),
                parent_id: None,
                modifiers: vec![],
                signature: None,
                declared_types: None,
                docblock: None,
            });
            stats.endpoints_synthesized += 1;
            id
        });

        new_refs.push(Reference {
            source_id: method_symbol.id.clone(),
            target: RefTarget::Resolved(endpoint_id.clone()),
            kind: ReferenceKind::Defines,
            site: method_symbol.span.start,
            context: None,
        });
    }

    store.insert_symbols(&new_symbols)?;
    store.insert_references(&new_refs)?;

    for r in store.unresolved_references()? {
        if r.kind != ReferenceKind::ApiCalls {
            continue;
        }
        let Some(raw) = r.target_raw() else { continue };
        if let Some(endpoint_id) = fingerprint_to_endpoint.get(raw) {
            store.resolve_reference(&r.source_id, raw, r.kind, r.site, endpoint_id)?;
            stats.api_calls_linked += 1;
        } else {
            // Still resolves to a stable external placeholder, per §8's
            // "every reference resolves" invariant, but is counted
            // separately so unmatched cross-language calls stay visible.
            let placeholder_id = crate::ids::external_placeholder_id(LanguageKind::Meta, raw);
            ensure_unmatched_placeholder(store, raw, &placeholder_id)?;
            store.resolve_reference(&r.source_id, raw, r.kind, r.site, &placeholder_id)?;
            stats.api_calls_unmatched += 1;
        }
    }

    Ok(stats)
}

fn ensure_unmatched_placeholder(store: &mut SqliteStore, raw: &str, id: &str) -> rusqlite::Result<()> {
    if store.get_symbol(id)?.is_some() {
        return Ok(());
    }
    store.insert_symbols(&[Symbol {
        id: id.to_string(),
        kind: SymbolKind::ExternalPlaceholder,
        name: raw.to_string(),
        qualified_name: raw.to_string(),
        language: LanguageKind::Meta,
        file_path: EXTERNAL_FILE_PATH.to_string(),
        span: Span::zero(),
        parent_id: None,
        modifiers: vec![],
        signature: None,
        declared_types: None,
        docblock: None,
    }])
}

fn all_handler_methods(store: &SqliteStore) -> rusqlite::Result<Vec<Symbol>> {
    Ok(store
        .symbols_by_kind(SymbolKind::Method)?
        .into_iter()
        .filter(|s| s.docblock.as_ref().map(|d| d.entries.iter().any(|e| e.tag == "http_route")).unwrap_or(false))
        .collect())
}
