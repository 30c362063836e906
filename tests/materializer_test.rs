//! Materialization write-protocol test (spec §4.7/§8): nodes get the
//! generic `Symbol` label plus a precise primary label, unresolved
//! references are never sent to the graph store, and a `wipe_before_import`
//! request reaches the driver before any writes.

use codegraph_index::config::model::ImportSection;
use codegraph_index::ids::symbol_id;
use codegraph_index::materializer::driver::{GraphStoreDriver, NodeWrite, RelationshipWrite};
use codegraph_index::materializer::{materialize, MaterializeStats};
use codegraph_index::model::{LanguageKind, Position, RefTarget, Reference, ReferenceKind, Span, Symbol, SymbolKind};
use codegraph_index::store::SqliteStore;
use codegraph_index::PipelineResult;
use std::sync::Mutex;

#[derive(Default)]
struct RecordingDriver {
    node_labels: Mutex<Vec<Vec<String>>>,
    relationship_types: Mutex<Vec<ReferenceKind>>,
    wipe_called: Mutex<bool>,
    constraint_called: Mutex<bool>,
}

impl GraphStoreDriver for RecordingDriver {
    fn ensure_constraint(&self) -> PipelineResult<()> {
        *self.constraint_called.lock().unwrap() = true;
        Ok(())
    }

    fn wipe_batch(&self) -> PipelineResult<()> {
        *self.wipe_called.lock().unwrap() = true;
        Ok(())
    }

    fn upsert_nodes(&self, nodes: &[NodeWrite<'_>]) -> PipelineResult<usize> {
        let mut labels = self.node_labels.lock().unwrap();
        for n in nodes {
            labels.push(n.labels.clone());
        }
        Ok(nodes.len())
    }

    fn create_relationships(&self, rels: &[RelationshipWrite<'_>]) -> PipelineResult<usize> {
        let mut kinds = self.relationship_types.lock().unwrap();
        for r in rels {
            kinds.push(r.kind);
        }
        Ok(rels.len())
    }
}

fn sym(id: &str, kind: SymbolKind, name: &str, language: LanguageKind) -> Symbol {
    Symbol {
        id: id.to_string(),
        kind,
        name: name.to_string(),
        qualified_name: name.to_string(),
        language,
        file_path: "a.php".to_string(),
        span: Span::zero(),
        parent_id: None,
        modifiers: vec![],
        signature: None,
        declared_types: None,
        docblock: None,
    }
}

#[test]
fn materialize_writes_precise_labels_and_skips_unresolved_edges() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let dog = symbol_id(LanguageKind::Php, SymbolKind::Class, "Dog", "a.php");
    let animal = symbol_id(LanguageKind::Php, SymbolKind::Class, "Animal", "a.php");
    store
        .insert_symbols(&[sym(&dog, SymbolKind::Class, "Dog", LanguageKind::Php), sym(&animal, SymbolKind::Class, "Animal", LanguageKind::Php)])
        .unwrap();
    store
        .insert_references(&[
            Reference { source_id: dog.clone(), target: RefTarget::Resolved(animal.clone()), kind: ReferenceKind::Extends, site: Position::new(1, 0), context: None },
            Reference { source_id: dog.clone(), target: RefTarget::Raw("Something\\Unresolved".into()), kind: ReferenceKind::Calls, site: Position::new(2, 0), context: None },
        ])
        .unwrap();

    let driver = RecordingDriver::default();
    let cfg = ImportSection::default();
    let stats: MaterializeStats = materialize(&store, &driver, &cfg, true).unwrap();

    assert!(*driver.wipe_called.lock().unwrap());
    assert!(*driver.constraint_called.lock().unwrap());
    assert_eq!(stats.nodes_written, 2);
    assert_eq!(stats.relationships_written, 1);
    assert_eq!(stats.relationships_skipped_unresolved, 1);

    let labels = driver.node_labels.lock().unwrap();
    assert!(labels.iter().any(|l| l == &vec!["Symbol".to_string(), "PhpClass".to_string()]));

    let kinds = driver.relationship_types.lock().unwrap();
    assert_eq!(*kinds, vec![ReferenceKind::Extends]);
}
