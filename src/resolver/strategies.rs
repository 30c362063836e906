//! The ordered resolution strategies from spec §4.4. Each strategy takes a
//! raw reference plus the context the resolver has already gathered for its
//! source symbol, and returns the `id` of a symbol it resolved to, or
//! `None` to fall through to the next strategy.

use crate::ids::external_placeholder_id;
use crate::model::symbol::EXTERNAL_FILE_PATH;
use crate::model::{LanguageKind, Symbol, SymbolKind};
use crate::store::SqliteStore;
use std::collections::HashMap;

/// Built-in scalar/collection type names that never resolve to a symbol in
/// the repository. Kept per-language since the same short name can mean
/// different things (`object` in PHP vs. TypeScript's `Object`/`object`).
pub fn builtin_types(lang: LanguageKind) -> &'static [&'static str] {
    match lang {
        LanguageKind::Php => &[
            "string", "int", "integer", "float", "double", "bool", "boolean", "array", "object", "callable",
            "iterable", "mixed", "void", "never", "null", "false", "true", "self", "static", "parent",
        ],
        LanguageKind::JavaScript | LanguageKind::TypeScript => &[
            "string", "number", "boolean", "any", "unknown", "never", "void", "undefined", "null", "object",
            "symbol", "bigint", "Array", "Promise", "Date", "Error", "Map", "Set", "RegExp", "Record",
            "Partial", "Readonly", "Pick", "Omit", "this",
        ],
        LanguageKind::Meta => &[],
    }
}

/// Strategy 1: the raw name already matches a symbol's fully-qualified
/// name exactly, within the same language.
pub fn exact_fqn(store: &SqliteStore, lang: LanguageKind, raw: &str) -> rusqlite::Result<Option<Symbol>> {
    Ok(store.find_exact(lang, raw)?.into_iter().next())
}

/// Strategy 2: resolve `raw`'s leading segment against the file's import
/// table (short alias/name -> fully imported qualified name), then retry
/// an exact match on the substituted qualified name.
pub fn scope_and_imports(
    store: &SqliteStore,
    lang: LanguageKind,
    raw: &str,
    file_imports: &HashMap<String, String>,
) -> rusqlite::Result<Option<Symbol>> {
    let mut parts = raw.split('.');
    let Some(head) = parts.next() else { return Ok(None) };
    let Some(full) = file_imports.get(head) else { return Ok(None) };
    let rest: Vec<&str> = parts.collect();
    let candidate = if rest.is_empty() { full.clone() } else { format!("{full}.{}", rest.join(".")) };
    exact_fqn(store, lang, &candidate)
}

/// Strategy 3: `raw` names a built-in type. Resolves to (and lazily
/// creates) a stable external placeholder symbol rather than a real one.
pub fn builtin_type(store: &mut SqliteStore, lang: LanguageKind, raw: &str) -> rusqlite::Result<Option<Symbol>> {
    let lowered = raw.to_ascii_lowercase();
    let is_builtin = builtin_types(lang).iter().any(|b| b.eq_ignore_ascii_case(&lowered) || *b == raw);
    if !is_builtin {
        return Ok(None);
    }
    Ok(Some(ensure_external_placeholder(store, lang, raw)?))
}

/// Strategy 4: try `raw` prefixed by each ancestor namespace of the
/// reference's source symbol, innermost first, exactly like PHP/TS name
/// lookup falls back to enclosing scopes before the global namespace.
pub fn namespace_fallback(
    store: &SqliteStore,
    lang: LanguageKind,
    raw: &str,
    ancestor_qualifiers: &[String],
) -> rusqlite::Result<Option<Symbol>> {
    for qualifier in ancestor_qualifiers {
        let candidate = if qualifier.is_empty() { raw.to_string() } else { format!("{qualifier}.{raw}") };
        if let Some(sym) = exact_fqn(store, lang, &candidate)? {
            return Ok(Some(sym));
        }
    }
    Ok(None)
}

/// Strategy 5: if exactly one symbol in the whole language namespace ends
/// with `.raw` (or equals `raw`), accept it. Ambiguous matches (more than
/// one) fall through, per §4.4's "unique partial-suffix match" wording.
pub fn unique_partial_suffix(store: &SqliteStore, lang: LanguageKind, raw: &str) -> rusqlite::Result<Option<Symbol>> {
    let last_segment = raw.rsplit('.').next().unwrap_or(raw);
    let hits = store.find_by_suffix(lang, last_segment)?;
    if hits.len() == 1 {
        Ok(hits.into_iter().next())
    } else {
        Ok(None)
    }
}

/// Strategy 6 (terminal): every reference must resolve to *something*, so
/// unmatched raw names become a deterministic external placeholder symbol
/// (§4.4, §8 "every reference resolves").
pub fn ensure_external_placeholder(store: &mut SqliteStore, lang: LanguageKind, raw: &str) -> rusqlite::Result<Symbol> {
    let id = external_placeholder_id(lang, raw);
    if let Some(existing) = store.get_symbol(&id)? {
        return Ok(existing);
    }
    let sym = Symbol {
        id: id.clone(),
        kind: SymbolKind::ExternalPlaceholder,
        name: raw.rsplit('.').next().unwrap_or(raw).to_string(),
        qualified_name: raw.to_string(),
        language: lang,
        file_path: EXTERNAL_FILE_PATH.to_string(),
        span: crate::model::Span::zero(),
        parent_id: None,
        modifiers: vec![],
        signature: None,
        declared_types: None,
        docblock: None,
    };
    store.insert_symbols(std::slice::from_ref(&sym))?;
    Ok(sym)
}
