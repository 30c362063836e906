//! Graph Materializer (C7, spec §4.7). Reads every symbol and resolved
//! reference out of the symbol store and writes it to the graph store in
//! batches, through whichever `GraphStoreDriver` the caller supplies —
//! `Neo4jDriver` in production, an in-memory fake in tests.

pub mod batching;
pub mod driver;
pub mod labels;
pub mod neo4j;

use crate::config::model::ImportSection;
use crate::errors::PipelineResult;
use crate::store::SqliteStore;
use driver::{GraphStoreDriver, NodeWrite, RelationshipWrite};
use tracing::info;

pub use neo4j::Neo4jDriver;

#[derive(Debug, Default, Clone, Copy)]
pub struct MaterializeStats {
    pub nodes_written: usize,
    pub relationships_written: usize,
    pub relationships_skipped_unresolved: usize,
}

/// Materializes every symbol and resolved reference in `store` into
/// `driver`, batched per `import.node_batch` / `import.relationship_batch`.
/// Unresolved references are skipped (they should not exist after the
/// resolver + linker passes, but a skip here is cheaper than a panic if
/// one slips through).
pub fn materialize(
    store: &SqliteStore,
    driver: &dyn GraphStoreDriver,
    import_cfg: &ImportSection,
    wipe_before_import: bool,
) -> PipelineResult<MaterializeStats> {
    let mut stats = MaterializeStats::default();

    if wipe_before_import {
        driver.wipe_batch()?;
    }
    driver.ensure_constraint()?;

    let symbols = store.all_symbols()?;
    let node_writes: Vec<NodeWrite<'_>> = symbols
        .iter()
        .map(|s| NodeWrite {
            symbol: s,
            labels: labels::labels_for(s.language, s.kind),
        })
        .collect();
    for batch in batching::chunks(&node_writes, import_cfg.node_batch) {
        stats.nodes_written += driver.upsert_nodes(batch)?;
    }
    info!(nodes = stats.nodes_written, "materialized symbol nodes");

    let references = store.all_references()?;
    let mut rel_writes = Vec::with_capacity(references.len());
    for r in &references {
        match r.target_id() {
            Some(target_id) => rel_writes.push(RelationshipWrite {
                source_id: &r.source_id,
                target_id,
                kind: r.kind,
            }),
            None => stats.relationships_skipped_unresolved += 1,
        }
    }
    for batch in batching::chunks(&rel_writes, import_cfg.relationship_batch) {
        stats.relationships_written += driver.create_relationships(batch)?;
    }
    info!(relationships = stats.relationships_written, "materialized references");

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::symbol_id;
    use crate::model::{LanguageKind, Position, RefTarget, Reference, ReferenceKind, Span, Symbol, SymbolKind};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeDriver {
        nodes: Mutex<usize>,
        rels: Mutex<usize>,
        wiped: Mutex<bool>,
    }

    impl GraphStoreDriver for FakeDriver {
        fn ensure_constraint(&self) -> PipelineResult<()> {
            Ok(())
        }
        fn wipe_batch(&self) -> PipelineResult<()> {
            *self.wiped.lock().unwrap() = true;
            Ok(())
        }
        fn upsert_nodes(&self, nodes: &[NodeWrite<'_>]) -> PipelineResult<usize> {
            *self.nodes.lock().unwrap() += nodes.len();
            Ok(nodes.len())
        }
        fn create_relationships(&self, rels: &[RelationshipWrite<'_>]) -> PipelineResult<usize> {
            *self.rels.lock().unwrap() += rels.len();
            Ok(rels.len())
        }
    }

    fn sym(id: &str, name: &str) -> Symbol {
        Symbol {
            id: id.to_string(),
            kind: SymbolKind::Class,
            name: name.to_string(),
            qualified_name: name.to_string(),
            language: LanguageKind::Php,
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
    fn materializes_nodes_and_resolved_relationships_only() -> PipelineResult<()> {
        let mut store = SqliteStore::open_in_memory()?;
        let a = symbol_id(LanguageKind::Php, SymbolKind::Class, "A", "a.php");
        let b = symbol_id(LanguageKind::Php, SymbolKind::Class, "B", "a.php");
        store.insert_symbols(&[sym(&a, "A"), sym(&b, "B")])?;
        store.insert_references(&[
            Reference { source_id: a.clone(), target: RefTarget::Resolved(b.clone()), kind: ReferenceKind::Extends, site: Position::new(1, 0), context: None },
            Reference { source_id: a.clone(), target: RefTarget::Raw("Unresolved".into()), kind: ReferenceKind::Calls, site: Position::new(2, 0), context: None },
        ])?;

        let driver = FakeDriver::default();
        let cfg = ImportSection::default();
        let stats = materialize(&store, &driver, &cfg, false)?;

        assert_eq!(stats.nodes_written, 2);
        assert_eq!(stats.relationships_written, 1);
        assert_eq!(stats.relationships_skipped_unresolved, 1);
        assert!(!*driver.wiped.lock().unwrap());
        Ok(())
    }

    #[test]
    fn wipe_before_import_invokes_the_driver() -> PipelineResult<()> {
        let store = SqliteStore::open_in_memory()?;
        let driver = FakeDriver::default();
        let cfg = ImportSection::default();
        materialize(&store, &driver, &cfg, true)?;
        assert!(*driver.wiped.lock().unwrap());
        Ok(())
    }
}
