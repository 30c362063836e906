//! Derived references (spec §4.4): `overrides` and `implements_method` are
//! computed only after `extends`/`implements` are resolved, by walking the
//! type hierarchy and matching method names. Cycle detection halts at any
//! class already visited in the current walk — a class is never revisited,
//! which also bounds the walk on malformed/cyclic `extends` chains.

use crate::model::{Reference, ReferenceKind, Symbol, SymbolKind};
use crate::store::SqliteStore;
use std::collections::HashSet;

#[derive(Debug, Default, Clone, Copy)]
pub struct DerivedStats {
    pub overrides_added: usize,
    pub implements_method_added: usize,
}

pub fn compute_derived_references(store: &mut SqliteStore) -> rusqlite::Result<DerivedStats> {
    let mut stats = DerivedStats::default();
    let classes: Vec<Symbol> = store
        .all_symbols()?
        .into_iter()
        .filter(|s| s.kind.is_class_like())
        .collect();

    let mut new_refs = Vec::new();

    for class in &classes {
        let methods = methods_of(store, &class.id)?;
        for method in &methods {
            if let Some(target) = find_override(store, class, &method.name, &mut HashSet::new())? {
                new_refs.push(Reference {
                    source_id: method.id.clone(),
                    target: crate::model::RefTarget::Resolved(target),
                    kind: ReferenceKind::Overrides,
                    site: method.span.start,
                    context: None,
                });
                stats.overrides_added += 1;
            }
        }

        let interfaces = collect_implemented_interfaces(store, &class.id, &mut HashSet::new())?;
        for iface_id in interfaces {
            let iface_methods = methods_of(store, &iface_id)?;
            for iface_method in &iface_methods {
                if let Some(method) = methods.iter().find(|m| m.name == iface_method.name) {
                    new_refs.push(Reference {
                        source_id: method.id.clone(),
                        target: crate::model::RefTarget::Resolved(iface_method.id.clone()),
                        kind: ReferenceKind::ImplementsMethod,
                        site: method.span.start,
                        context: None,
                    });
                    stats.implements_method_added += 1;
                }
            }
        }
    }

    store.insert_references(&new_refs)?;
    Ok(stats)
}

fn methods_of(store: &SqliteStore, parent_id: &str) -> rusqlite::Result<Vec<Symbol>> {
    Ok(store
        .children_of(parent_id)?
        .into_iter()
        .filter(|s| s.kind == SymbolKind::Method)
        .collect())
}

/// Walks the resolved `extends` chain starting at `class`, skipping `class`
/// itself, looking for the first ancestor declaring a method named
/// `method_name`. `visited` prevents revisiting a class already seen on
/// this walk.
fn find_override(store: &SqliteStore, class: &Symbol, method_name: &str, visited: &mut HashSet<String>) -> rusqlite::Result<Option<String>> {
    if !visited.insert(class.id.clone()) {
        return Ok(None);
    }
    for parent_id in store.resolved_targets(&class.id, ReferenceKind::Extends)? {
        if visited.contains(&parent_id) {
            continue;
        }
        for m in methods_of(store, &parent_id)? {
            if m.name == method_name {
                return Ok(Some(m.id));
            }
        }
        let Some(parent_symbol) = store.get_symbol(&parent_id)? else { continue };
        if let Some(found) = find_override(store, &parent_symbol, method_name, visited)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Collects every interface reachable from `class_id` via `implements`
/// directly, or via an ancestor class's own `implements`/`extends` chain.
fn collect_implemented_interfaces(store: &SqliteStore, class_id: &str, visited: &mut HashSet<String>) -> rusqlite::Result<Vec<String>> {
    if !visited.insert(class_id.to_string()) {
        return Ok(vec![]);
    }
    let mut out = store.resolved_targets(class_id, ReferenceKind::Implements)?;
    for parent_id in store.resolved_targets(class_id, ReferenceKind::Extends)? {
        out.extend(collect_implemented_interfaces(store, &parent_id, visited)?);
    }
    Ok(out)
}
