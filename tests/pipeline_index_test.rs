//! End-to-end `Pipeline::index` over a tiny two-language fixture tree,
//! covering the §8 universal properties at the orchestrator level rather
//! than per-component.

use codegraph_index::config::model::{
    GraphSection, ImportSection, ParsingSection, PluginsSection, ProjectConfig, ProjectSection, StorageSection,
};
use codegraph_index::model::{LanguageKind, SymbolKind};
use codegraph_index::orchestrator::Pipeline;
use codegraph_index::store::SqliteStore;
use std::fs;

fn config_for(root: &std::path::Path) -> ProjectConfig {
    ProjectConfig {
        project: ProjectSection {
            root: root.to_path_buf(),
            languages: vec!["php".to_string(), "typescript".to_string()],
        },
        storage: StorageSection { cache_path: ".codegraph/cache.sqlite".into() },
        graph: GraphSection::default(),
        parsing: ParsingSection::default(),
        import: ImportSection::default(),
        plugins: PluginsSection::default(),
    }
}

#[test]
fn indexes_a_small_php_tree_and_resolves_extends() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("src/Animal.php"),
        r#"<?php
namespace App;

class Animal {
    public function speak(): string {
        return "...";
    }
}
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("src/Dog.php"),
        r#"<?php
namespace App;

class Dog extends Animal {
    public function speak(): string {
        return "Woof";
    }
}
"#,
    )
    .unwrap();

    let config = config_for(dir.path());
    let pipeline = Pipeline::new(config.clone());
    let summary = pipeline.index().expect("index should succeed over a clean fixture tree");

    assert_eq!(summary.counts.files_scanned, 2);
    assert_eq!(summary.counts.files_with_parse_errors, 0);

    let db_path = dir.path().join(".codegraph/cache.sqlite");
    let store = SqliteStore::open(&db_path).unwrap();

    let dog = store.find_exact(LanguageKind::Php, "App.Dog").expect("query ok");
    assert_eq!(dog.len(), 1, "Dog class should be recorded under its namespaced qualified name");

    // extends should have resolved to Animal, and the derived `overrides`
    // pass should have linked Dog::speak -> Animal::speak.
    let animal = store.find_exact(LanguageKind::Php, "App.Animal").unwrap();
    assert_eq!(animal.len(), 1);

    let unresolved = store.unresolved_references().unwrap();
    assert!(unresolved.is_empty(), "every reference should resolve to a concrete or placeholder target");

    let methods = store.symbols_by_kind(SymbolKind::Method).unwrap();
    assert!(methods.iter().any(|m| m.qualified_name.ends_with("Dog.speak")));
}

#[test]
fn rerunning_index_on_an_unchanged_tree_does_not_duplicate_symbols() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("src/Greeter.php"),
        r#"<?php
class Greeter {
    public function hello(): string {
        return "hi";
    }
}
"#,
    )
    .unwrap();

    let config = config_for(dir.path());
    let pipeline = Pipeline::new(config.clone());
    pipeline.index().unwrap();
    pipeline.index().unwrap();

    let db_path = dir.path().join(".codegraph/cache.sqlite");
    let store = SqliteStore::open(&db_path).unwrap();
    let greeters = store.find_exact(LanguageKind::Php, "Greeter").unwrap();
    assert_eq!(greeters.len(), 1, "re-running index must not create a second Greeter symbol");
}
