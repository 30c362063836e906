//! Directory/file symbol synthesis (spec §3/§4.8: "directory/file symbols
//! are created first during filesystem enumeration, deduplicated by
//! path"). `contains` is strictly filesystem containment (directory to
//! file or subdirectory); logical containment (file to top-level
//! declaration) is `defines`, emitted later by the collectors themselves.

use crate::fs_scan::ScannedFile;
use crate::ids::fs_id;
use crate::model::{LanguageKind, Position, RefTarget, Reference, ReferenceKind, Span, Symbol, SymbolKind};
use std::collections::BTreeMap;

pub struct FsTree {
    pub symbols: Vec<Symbol>,
    pub references: Vec<Reference>,
    /// `repo_rel_path -> file symbol id`, handed to collectors as their
    /// `file_symbol_id` argument.
    pub file_ids: BTreeMap<String, String>,
}

fn ensure_dir(path: &str, symbols: &mut Vec<Symbol>, references: &mut Vec<Reference>, dir_ids: &mut BTreeMap<String, String>) -> String {
    if let Some(id) = dir_ids.get(path) {
        return id.clone();
    }
    let id = fs_id(path);
    let name = path.rsplit('/').next().unwrap_or(path).to_string();
    symbols.push(Symbol {
        id: id.clone(),
        kind: SymbolKind::Directory,
        name,
        qualified_name: path.to_string(),
        language: LanguageKind::Meta,
        file_path: path.to_string(),
        span: Span::zero(),
        parent_id: None,
        modifiers: vec![],
        signature: None,
        declared_types: None,
        docblock: None,
    });
    if let Some((parent, _)) = path.rsplit_once('/') {
        let parent_id = ensure_dir(parent, symbols, references, dir_ids);
        references.push(Reference {
            source_id: parent_id,
            target: RefTarget::Resolved(id.clone()),
            kind: ReferenceKind::Contains,
            site: Position::new(0, 0),
            context: None,
        });
    }
    dir_ids.insert(path.to_string(), id.clone());
    id
}

/// Builds one `Directory` symbol per distinct ancestor path (deduplicated)
/// and one `File` symbol per scanned file, wired together with `contains`
/// edges from each directory to its immediate children.
pub fn build(files: &[ScannedFile]) -> FsTree {
    let mut symbols = Vec::new();
    let mut references = Vec::new();
    let mut dir_ids: BTreeMap<String, String> = BTreeMap::new();
    let mut file_ids: BTreeMap<String, String> = BTreeMap::new();

    for file in files {
        let file_id = fs_id(&file.repo_rel_path);
        let name = file.repo_rel_path.rsplit('/').next().unwrap_or(&file.repo_rel_path).to_string();
        let parent_dir_id = file
            .repo_rel_path
            .rsplit_once('/')
            .map(|(parent, _)| ensure_dir(parent, &mut symbols, &mut references, &mut dir_ids));

        symbols.push(Symbol {
            id: file_id.clone(),
            kind: SymbolKind::File,
            name,
            qualified_name: file.repo_rel_path.clone(),
            language: file.language.unwrap_or(LanguageKind::Meta),
            file_path: file.repo_rel_path.clone(),
            span: Span::zero(),
            parent_id: parent_dir_id.clone(),
            modifiers: vec![],
            signature: None,
            declared_types: None,
            docblock: None,
        });
        if let Some(parent_id) = parent_dir_id {
            references.push(Reference {
                source_id: parent_id,
                target: RefTarget::Resolved(file_id.clone()),
                kind: ReferenceKind::Contains,
                site: Position::new(0, 0),
                context: None,
            });
        }
        file_ids.insert(file.repo_rel_path.clone(), file_id);
    }

    FsTree { symbols, references, file_ids }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(rel: &str) -> ScannedFile {
        ScannedFile { path: rel.into(), repo_rel_path: rel.to_string(), language: None, size: 0 }
    }

    #[test]
    fn builds_one_directory_per_distinct_ancestor() {
        let tree = build(&[file("src/a/Foo.php"), file("src/a/Bar.php"), file("src/b/Baz.php")]);
        let dirs = tree.symbols.iter().filter(|s| s.kind == SymbolKind::Directory).count();
        // src, src/a, src/b
        assert_eq!(dirs, 3);
    }

    #[test]
    fn root_level_files_have_no_parent() {
        let tree = build(&[file("Foo.php")]);
        let foo = tree.symbols.iter().find(|s| s.kind == SymbolKind::File).unwrap();
        assert!(foo.parent_id.is_none());
    }
}
