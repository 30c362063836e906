//! Pipeline run summary (spec §4.8/§7): one struct accumulating every
//! counter named across the other components' `*Stats` types, plus
//! wall-clock timings per stage.

use crate::fs_scan::ScanStats;
use crate::linker::LinkStats;
use crate::materializer::MaterializeStats;
use crate::metadata::MetadataStats;
use crate::resolver::ResolveStats;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Default, Clone, Serialize)]
pub struct Counts {
    pub files_scanned: usize,
    pub files_skipped_ignored: usize,
    pub files_skipped_too_big: usize,
    pub files_with_parse_errors: usize,
    pub symbols_emitted: usize,
    pub references_emitted: usize,
    pub references_resolved_exact: usize,
    pub references_resolved_scope_imports: usize,
    pub references_resolved_builtin: usize,
    pub references_resolved_namespace_fallback: usize,
    pub references_resolved_unique_suffix: usize,
    pub references_resolved_external_placeholder: usize,
    pub derived_overrides: usize,
    pub derived_implements_method: usize,
    pub config_files_scanned: usize,
    pub config_registrations_found: usize,
    pub api_endpoints_synthesized: usize,
    pub api_calls_linked: usize,
    pub api_calls_unmatched: usize,
    pub nodes_materialized: usize,
    pub relationships_materialized: usize,
    pub relationships_skipped_unresolved: usize,
    /// Writes that failed, keyed by the failing component's name (§7:
    /// non-fatal write failures are tracked, not fatal-errored).
    pub failed_writes: BTreeMap<String, usize>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct TimingsMs {
    pub scan: u128,
    pub collect: u128,
    pub resolve: u128,
    pub metadata: u128,
    pub link: u128,
    pub materialize: u128,
    pub total: u128,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct PipelineSummary {
    pub counts: Counts,
    pub timings_ms: TimingsMs,
}

impl PipelineSummary {
    pub fn absorb_scan(&mut self, s: &ScanStats) {
        self.counts.files_scanned = s.files_scanned;
        self.counts.files_skipped_ignored = s.files_skipped_ignored;
        self.counts.files_skipped_too_big = s.files_skipped_too_big;
    }

    pub fn absorb_resolve(&mut self, s: &ResolveStats) {
        self.counts.references_resolved_exact = s.resolved_exact;
        self.counts.references_resolved_scope_imports = s.resolved_scope_imports;
        self.counts.references_resolved_builtin = s.resolved_builtin;
        self.counts.references_resolved_namespace_fallback = s.resolved_namespace_fallback;
        self.counts.references_resolved_unique_suffix = s.resolved_unique_suffix;
        self.counts.references_resolved_external_placeholder = s.resolved_external_placeholder;
        self.counts.derived_overrides = s.overrides_added;
        self.counts.derived_implements_method = s.implements_method_added;
    }

    pub fn absorb_metadata(&mut self, s: &MetadataStats) {
        self.counts.config_files_scanned = s.config_files_scanned;
        self.counts.config_registrations_found = s.registrations_found;
    }

    pub fn absorb_link(&mut self, s: &LinkStats) {
        self.counts.api_endpoints_synthesized = s.endpoints_synthesized;
        self.counts.api_calls_linked = s.api_calls_linked;
        self.counts.api_calls_unmatched = s.api_calls_unmatched;
    }

    pub fn absorb_materialize(&mut self, s: &MaterializeStats) {
        self.counts.nodes_materialized = s.nodes_written;
        self.counts.relationships_materialized = s.relationships_written;
        self.counts.relationships_skipped_unresolved = s.relationships_skipped_unresolved;
    }

    pub fn record_failed_write(&mut self, component: &str) {
        *self.counts.failed_writes.entry(component.to_string()).or_insert(0) += 1;
    }
}

/// Measures one named stage and accumulates it into `timings_ms`.
pub struct SummaryStopwatch {
    started: Instant,
}

impl SummaryStopwatch {
    pub fn start() -> Self {
        Self { started: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed().as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_resolve_copies_every_counter() {
        let mut summary = PipelineSummary::default();
        let stats = ResolveStats {
            resolved_exact: 3,
            resolved_scope_imports: 1,
            resolved_builtin: 2,
            resolved_namespace_fallback: 0,
            resolved_unique_suffix: 1,
            resolved_external_placeholder: 4,
            overrides_added: 2,
            implements_method_added: 1,
        };
        summary.absorb_resolve(&stats);
        assert_eq!(summary.counts.references_resolved_exact, 3);
        assert_eq!(summary.counts.derived_overrides, 2);
    }

    #[test]
    fn failed_writes_accumulate_per_component() {
        let mut summary = PipelineSummary::default();
        summary.record_failed_write("materializer");
        summary.record_failed_write("materializer");
        summary.record_failed_write("metadata");
        assert_eq!(summary.counts.failed_writes["materializer"], 2);
        assert_eq!(summary.counts.failed_writes["metadata"], 1);
    }
}
