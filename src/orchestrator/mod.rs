//! Pipeline Orchestrator (C8, spec §4.8). Sequences filesystem enumeration,
//! Pass 1 (parallel parsing + collection via `rayon`), Pass 2 (resolver),
//! the metadata pass, cross-language linking, and materialization, folding
//! every stage's stats into one `PipelineSummary`.

pub mod fs_tree;
pub mod stats;

use crate::ast;
use crate::collectors::{php::PhpCollector, typescript::TypeScriptCollector, CollectOutput, LanguageCollector};
use crate::config::model::ProjectConfig;
use crate::errors::{PipelineError, PipelineResult};
use crate::linker;
use crate::materializer::{self, driver::GraphStoreDriver};
use crate::metadata;
use crate::resolver;
use crate::store::{SqliteStore, StoreWriter};
use rayon::prelude::*;
use stats::{PipelineSummary, SummaryStopwatch};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Cooperative cancellation flag; the CLI installs a Ctrl-C handler that
/// sets this, and each stage checks it between files/batches.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Pipeline {
    config: ProjectConfig,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(config: ProjectConfig) -> Self {
        Self { config, cancel: CancellationToken::new() }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs Pass 1 + Pass 2 + metadata + linking, writing into the
    /// cache database. Does not touch the graph store — call
    /// `materialize` separately (mirrors the `index` / `materialize` CLI
    /// subcommand split in §6).
    pub fn index(&self) -> PipelineResult<PipelineSummary> {
        let total = SummaryStopwatch::start();
        let mut summary = PipelineSummary::default();

        let scan_sw = SummaryStopwatch::start();
        let scan = crate::fs_scan::scan_repo(&self.config.project.root, &self.config.parsing)
            .map_err(PipelineError::Other)?;
        summary.absorb_scan(&scan.stats);
        summary.timings_ms.scan = scan_sw.elapsed_ms();

        let db_path = self.config.project.root.join(&self.config.storage.cache_path);
        let writer = StoreWriter::spawn(db_path.clone(), self.config.import.parallel_workers * 4)
            .map_err(PipelineError::Other)?;

        let tree = fs_tree::build(&scan.files);
        writer.submit_symbols(tree.symbols);
        writer.submit_references(tree.references);

        let collect_sw = SummaryStopwatch::start();
        let api_helpers: Vec<String> = self
            .config
            .plugins
            .api_helpers
            .values()
            .flatten()
            .cloned()
            .collect();
        let timeout = Duration::from_millis(self.config.parsing.parse_timeout_ms);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.import.parallel_workers.max(1))
            .build()
            .map_err(|e| PipelineError::Other(anyhow::anyhow!(e)))?;

        let cancel = self.cancel.clone();
        let outputs: Vec<(String, PipelineResult<CollectOutput>)> = pool.install(|| {
            scan.files
                .par_iter()
                .filter(|f| f.language.is_some())
                .map(|f| {
                    if cancel.is_cancelled() {
                        return (f.repo_rel_path.clone(), Ok(CollectOutput::default()));
                    }
                    let file_symbol_id = tree.file_ids.get(&f.repo_rel_path).cloned().unwrap_or_default();
                    (f.repo_rel_path.clone(), collect_one(f, &file_symbol_id, &api_helpers, timeout))
                })
                .collect()
        });

        for (rel_path, result) in outputs {
            match result {
                Ok(out) => {
                    writer.submit_symbols(out.symbols);
                    writer.submit_references(out.references);
                }
                Err(err) => {
                    summary.counts.files_with_parse_errors += 1;
                    warn!(file = %rel_path, error = %err, "pass 1: collection failed for file");
                }
            }
        }
        writer.shutdown();
        summary.timings_ms.collect = collect_sw.elapsed_ms();

        let mut store = SqliteStore::open(&db_path).map_err(PipelineError::from)?;
        summary.counts.symbols_emitted = store.all_symbols()?.len();
        summary.counts.references_emitted = store.all_references()?.len();

        let resolve_sw = SummaryStopwatch::start();
        let resolve_stats = resolver::resolve_all(&mut store)?;
        summary.absorb_resolve(&resolve_stats);
        summary.timings_ms.resolve = resolve_sw.elapsed_ms();

        let metadata_sw = SummaryStopwatch::start();
        let metadata_stats = metadata::run_metadata_pass(&mut store, &scan.files, &self.config.plugins.metadata_rules)
            .map_err(PipelineError::Other)?;
        summary.absorb_metadata(&metadata_stats);
        summary.timings_ms.metadata = metadata_sw.elapsed_ms();

        let link_sw = SummaryStopwatch::start();
        let link_stats = linker::link_endpoints(&mut store)?;
        summary.absorb_link(&link_stats);
        summary.timings_ms.link = link_sw.elapsed_ms();

        summary.timings_ms.total = total.elapsed_ms();
        info!(counts = ?summary.counts, "index: complete");
        Ok(summary)
    }

    /// Materializes the cache database into the configured graph store.
    /// Kept separate from `index` so re-materializing (e.g. after wiping
    /// the graph store) never re-parses source.
    pub fn materialize(&self, driver: &dyn GraphStoreDriver) -> PipelineResult<PipelineSummary> {
        let mut summary = PipelineSummary::default();
        let db_path = self.config.project.root.join(&self.config.storage.cache_path);
        let store = SqliteStore::open(&db_path).map_err(PipelineError::from)?;

        let materialize_sw = SummaryStopwatch::start();
        let result = materializer::materialize(&store, driver, &self.config.import, self.config.graph.wipe_before_import);
        summary.timings_ms.materialize = materialize_sw.elapsed_ms();
        match result {
            Ok(stats) => summary.absorb_materialize(&stats),
            Err(err) => {
                error!(error = %err, "materialize: failed");
                summary.record_failed_write("materializer");
                return Err(err);
            }
        }
        Ok(summary)
    }
}

fn collect_one(
    file: &crate::fs_scan::ScannedFile,
    file_symbol_id: &str,
    api_helpers: &[String],
    timeout: Duration,
) -> PipelineResult<CollectOutput> {
    let source = std::fs::read_to_string(&file.path).map_err(PipelineError::Io)?;
    let lang = file.language.expect("caller filters to files with a detected language");
    let is_tsx = file
        .path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tsx"))
        .unwrap_or(false);

    let parsed = ast::parse(&file.path, &source, lang, is_tsx, timeout).map_err(PipelineError::Other)?;
    if parsed.had_error_nodes {
        debug!(file = %file.repo_rel_path, "parse produced error nodes, continuing with partial tree");
    }

    match lang {
        crate::model::LanguageKind::Php => {
            PhpCollector.collect(&parsed, file_symbol_id, &file.repo_rel_path).map_err(PipelineError::Other)
        }
        crate::model::LanguageKind::JavaScript | crate::model::LanguageKind::TypeScript => {
            let collector = TypeScriptCollector { language: lang, api_helpers: api_helpers.to_vec() };
            collector.collect(&parsed, file_symbol_id, &file.repo_rel_path).map_err(PipelineError::Other)
        }
        crate::model::LanguageKind::Meta => Ok(CollectOutput::default()),
    }
}

