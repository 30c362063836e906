//! Graph store driver trait (C7, spec §4.7). Keeps the batching/labeling
//! logic in `mod.rs` decoupled from the concrete Bolt client, so tests can
//! swap in an in-memory recorder instead of a live graph connection.

use crate::errors::PipelineResult;
use crate::model::{ReferenceKind, Symbol};

/// One node ready to be written: its symbol plus the pre-computed label set.
pub struct NodeWrite<'a> {
    pub symbol: &'a Symbol,
    pub labels: Vec<String>,
}

/// One relationship ready to be written.
pub struct RelationshipWrite<'a> {
    pub source_id: &'a str,
    pub target_id: &'a str,
    pub kind: ReferenceKind,
}

pub trait GraphStoreDriver {
    /// Ensures a uniqueness constraint on `(:Symbol {id})` exists so
    /// repeated `upsert_nodes` calls MERGE instead of duplicating (§8
    /// idempotent re-run invariant).
    fn ensure_constraint(&self) -> PipelineResult<()>;

    /// Deletes every node/relationship written by a prior run, used when
    /// `graph.wipe_before_import` is set.
    fn wipe_batch(&self) -> PipelineResult<()>;

    fn upsert_nodes(&self, nodes: &[NodeWrite<'_>]) -> PipelineResult<usize>;

    fn create_relationships(&self, rels: &[RelationshipWrite<'_>]) -> PipelineResult<usize>;
}
