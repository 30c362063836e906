//! `neo4rs`-backed `GraphStoreDriver`.
//!
//! `neo4rs::Graph` is async-only; this facade owns a small multi-thread
//! Tokio runtime and bridges every call through `Runtime::block_on`, so
//! the rest of the pipeline never sees an `.await`.

use crate::config::model::GraphSection;
use crate::errors::{PipelineError, PipelineResult};
use crate::materializer::driver::{GraphStoreDriver, NodeWrite, RelationshipWrite};
use crate::materializer::labels::relationship_type;
use neo4rs::{query, Graph};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

pub struct Neo4jDriver {
    graph: Graph,
    rt: Runtime,
}

impl Neo4jDriver {
    pub fn connect(cfg: &GraphSection) -> PipelineResult<Self> {
        let rt = Runtime::new().map_err(PipelineError::Io)?;
        let (user, pass) = cfg
            .credentials
            .as_ref()
            .map(|c| (c.username.as_str(), c.password.as_str()))
            .unwrap_or(("", ""));
        let graph = rt
            .block_on(Graph::new(&cfg.endpoint, user, pass))
            .map_err(|e| PipelineError::StoreUnreachable(e.to_string()))?;
        info!("connected to graph store at {}", cfg.endpoint);
        Ok(Self { graph, rt })
    }
}

impl GraphStoreDriver for Neo4jDriver {
    fn ensure_constraint(&self) -> PipelineResult<()> {
        self.rt.block_on(async {
            self.graph
                .run(query(
                    "CREATE CONSTRAINT symbol_id_unique IF NOT EXISTS FOR (n:Symbol) REQUIRE n.id IS UNIQUE",
                ))
                .await
        })
        .map_err(|e| PipelineError::GraphWrite(e.to_string()))
    }

    fn wipe_batch(&self) -> PipelineResult<()> {
        warn!("wiping graph store before import");
        self.rt.block_on(async {
            self.graph.run(query("MATCH (n:Symbol) DETACH DELETE n")).await
        })
        .map_err(|e| PipelineError::GraphWrite(e.to_string()))
    }

    fn upsert_nodes(&self, nodes: &[NodeWrite<'_>]) -> PipelineResult<usize> {
        if nodes.is_empty() {
            return Ok(0);
        }
        self.rt.block_on(async {
            let mut txn = self.graph.start_txn().await.map_err(|e| e.to_string())?;
            for n in nodes {
                let label_clause = n.labels.join(":");
                let cypher = format!(
                    "MERGE (s:Symbol {{id: $id}}) SET s:{label_clause}, s.name = $name, s.qualified_name = $qualified_name, s.kind = $kind, s.language = $language, s.file_path = $file_path, s.start_line = $start_line"
                );
                let q = query(&cypher)
                    .param("id", n.symbol.id.clone())
                    .param("name", n.symbol.name.clone())
                    .param("qualified_name", n.symbol.qualified_name.clone())
                    .param("kind", n.symbol.kind.as_str())
                    .param("language", n.symbol.language.to_string())
                    .param("file_path", n.symbol.file_path.clone())
                    .param("start_line", n.symbol.span.start.line as i64);
                txn.run(q).await.map_err(|e| e.to_string())?;
            }
            txn.commit().await.map_err(|e| e.to_string())?;
            Ok::<_, String>(nodes.len())
        })
        .map_err(PipelineError::GraphWrite)
        .inspect(|n| debug!("upserted {n} nodes"))
    }

    fn create_relationships(&self, rels: &[RelationshipWrite<'_>]) -> PipelineResult<usize> {
        if rels.is_empty() {
            return Ok(0);
        }
        self.rt.block_on(async {
            let mut txn = self.graph.start_txn().await.map_err(|e| e.to_string())?;
            for r in rels {
                let rel_type = relationship_type(r.kind);
                let cypher = format!(
                    "MATCH (a:Symbol {{id: $source_id}}), (b:Symbol {{id: $target_id}}) MERGE (a)-[:{rel_type}]->(b)"
                );
                let q = query(&cypher).param("source_id", r.source_id).param("target_id", r.target_id);
                txn.run(q).await.map_err(|e| e.to_string())?;
            }
            txn.commit().await.map_err(|e| e.to_string())?;
            Ok::<_, String>(rels.len())
        })
        .map_err(PipelineError::GraphWrite)
        .inspect(|n| debug!("created {n} relationships"))
    }
}
