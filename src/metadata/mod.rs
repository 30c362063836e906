//! Metadata Pass (C6, spec §4.6). Scans JSON/YAML configuration files for
//! class-name registrations — dependency-injection service maps, plugin
//! manifests, route tables expressed as data rather than code — entirely
//! driven by `plugins.metadata_rules` from the project config. No framework
//! name is ever hard-coded here: the rule table says which config-path glob
//! and which object key count as a registration, and what reference kind to
//! emit for it.

use crate::config::model::MetadataRules;
use crate::fs_scan::ScannedFile;
use crate::ids::fs_id;
use crate::model::{LanguageKind, Position, RefTarget, Reference, ReferenceKind, Span, Symbol, SymbolKind};
use crate::store::SqliteStore;
use globset::{Glob, GlobMatcher};
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataStats {
    pub config_files_scanned: usize,
    pub config_files_skipped_invalid: usize,
    pub registrations_found: usize,
}

struct CompiledRule {
    matcher: GlobMatcher,
    keys: std::collections::BTreeMap<String, String>,
}

/// Runs the metadata pass over every JSON/YAML file the filesystem scan
/// found (i.e. every file whose extension didn't map to a source
/// `LanguageKind`), applying `rules`.
pub fn run_metadata_pass(store: &mut SqliteStore, files: &[ScannedFile], rules: &MetadataRules) -> anyhow::Result<MetadataStats> {
    let mut stats = MetadataStats::default();
    let compiled: Vec<CompiledRule> = rules
        .iter()
        .filter_map(|(glob_str, keys)| {
            Glob::new(glob_str).ok().map(|g| CompiledRule { matcher: g.compile_matcher(), keys: keys.clone() })
        })
        .collect();

    if compiled.is_empty() {
        return Ok(stats);
    }

    for file in files {
        if file.language.is_some() {
            continue; // owned by a source-language collector, not metadata.
        }
        let is_config_ext = matches!(
            Path::new(&file.repo_rel_path).extension().and_then(|e| e.to_str()),
            Some("json") | Some("yaml") | Some("yml")
        );
        if !is_config_ext {
            continue;
        }

        let matching_rules: Vec<&CompiledRule> = compiled.iter().filter(|r| r.matcher.is_match(&file.repo_rel_path)).collect();
        if matching_rules.is_empty() {
            continue;
        }

        let text = match std::fs::read_to_string(&file.path) {
            Ok(t) => t,
            Err(_) => {
                stats.config_files_skipped_invalid += 1;
                continue;
            }
        };

        let value = parse_config_value(&file.repo_rel_path, &text);
        let Some(value) = value else {
            stats.config_files_skipped_invalid += 1;
            continue;
        };

        let file_symbol_id = fs_id(&file.repo_rel_path);
        store.insert_symbols(&[Symbol {
            id: file_symbol_id.clone(),
            kind: SymbolKind::ConfigFile,
            name: Path::new(&file.repo_rel_path).file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default(),
            qualified_name: file.repo_rel_path.clone(),
            language: LanguageKind::Meta,
            file_path: file.repo_rel_path.clone(),
            span: Span::zero(),
            parent_id: None,
            modifiers: vec![],
            signature: None,
            declared_types: None,
            docblock: None,
        }])?;

        let mut refs = Vec::new();
        for rule in &matching_rules {
            walk_value(&value, "", rule, &file_symbol_id, &mut refs, &mut stats);
        }
        store.insert_references(&refs)?;
        stats.config_files_scanned += 1;
    }

    Ok(stats)
}

fn parse_config_value(repo_rel_path: &str, text: &str) -> Option<serde_json::Value> {
    if repo_rel_path.ends_with(".json") {
        serde_json::from_str(text).ok()
    } else {
        // Normalize YAML into the same `serde_json::Value` shape so the
        // walk below is format-agnostic.
        let yaml: serde_yml::Value = serde_yml::from_str(text).ok()?;
        serde_json::to_value(yaml).ok()
    }
}

fn walk_value(
    value: &serde_json::Value,
    key_path: &str,
    rule: &CompiledRule,
    file_symbol_id: &str,
    refs: &mut Vec<Reference>,
    stats: &mut MetadataStats,
) {
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                let child_path = if key_path.is_empty() { k.clone() } else { format!("{key_path}.{k}") };
                if let Some(kind_name) = rule.keys.get(k) {
                    if let Some(s) = v.as_str() {
                        if let Some(kind) = parse_kind(kind_name) {
                            refs.push(Reference {
                                source_id: file_symbol_id.to_string(),
                                target: RefTarget::Raw(s.to_string()),
                                kind,
                                site: Position::new(0, 0),
                                context: None,
                            });
                            stats.registrations_found += 1;
                        }
                    }
                }
                walk_value(v, &child_path, rule, file_symbol_id, refs, stats);
            }
        }
        serde_json::Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                walk_value(v, &format!("{key_path}[{i}]"), rule, file_symbol_id, refs, stats);
            }
        }
        _ => {}
    }
}

fn parse_kind(name: &str) -> Option<ReferenceKind> {
    match name {
        "registered_in" => Some(ReferenceKind::RegisteredIn),
        "loads_via_config" => Some(ReferenceKind::LoadsViaConfig),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_names() {
        assert_eq!(parse_kind("registered_in"), Some(ReferenceKind::RegisteredIn));
        assert_eq!(parse_kind("loads_via_config"), Some(ReferenceKind::LoadsViaConfig));
        assert_eq!(parse_kind("nonsense"), None);
    }
}
