//! Independent analysis of several debriefing files in parallel.
//!
//! Each file is loaded, classified, and linked on its own worker with its own copies of every
//! working set, so runs never share occurrence counters or "used" bookkeeping.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use crate::ingest::load_debriefing;
use crate::linking::{link_combined, LinkConfig};
use crate::parallel::pool::WorkerPool;

/// Per-file counts from one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogSummary {
    pub events: usize,
    pub skipped_events: usize,
    pub chains: usize,
    pub hits: usize,
    pub kills: usize,
    pub splash_kills: usize,
    pub intercepted: usize,
    pub leftover_launches: usize,
    pub leftover_impacts: usize,
    pub leftover_destructions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub result: Result<LogSummary, String>,
}

/// Load and link one file.
pub fn analyze_log(path: &Path, config: &LinkConfig) -> Result<LogSummary, String> {
    let debriefing = load_debriefing(path).map_err(|err| err.to_string())?;
    let outcome = link_combined(&debriefing.events, config);
    Ok(LogSummary {
        events: debriefing.events.len(),
        skipped_events: debriefing.skipped_events,
        chains: outcome.chains.len(),
        hits: outcome.chains.iter().filter(|c| c.impact.is_some()).count(),
        kills: outcome.chains.iter().filter(|c| c.kill.is_some()).count(),
        splash_kills: outcome.chains.iter().map(|c| c.extra_kills.len()).sum(),
        intercepted: outcome.chains.iter().filter(|c| c.is_intercepted()).count(),
        leftover_launches: outcome.leftover_launches.len(),
        leftover_impacts: outcome.leftover_impacts.len(),
        leftover_destructions: outcome.leftover_destructions.len(),
    })
}

/// Analyze every file on the pool. Results keep input order; a file that fails to load is
/// reported in its entry and does not stop the others.
pub fn analyze_logs(
    paths: &[PathBuf],
    config: &LinkConfig,
    pool: &WorkerPool,
) -> Result<Vec<BatchEntry>, rayon::ThreadPoolBuildError> {
    pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                let result = analyze_log(path, config);
                if let Err(err) = &result {
                    warn!(path = %path.display(), "analysis failed: {err}");
                }
                BatchEntry {
                    path: path.clone(),
                    result,
                }
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported_per_entry() {
        let paths = vec![PathBuf::from("/nonexistent/debrief-a.json")];
        let entries = analyze_logs(&paths, &LinkConfig::default(), &WorkerPool::with_workers(1))
            .expect("pool");
        assert_eq!(entries.len(), 1);
        let err = entries[0].result.as_ref().expect_err("missing file");
        assert!(err.contains("failed to read"));
    }

    #[test]
    fn empty_batch_yields_no_entries() {
        let entries =
            analyze_logs(&[], &LinkConfig::default(), &WorkerPool::default()).expect("pool");
        assert!(entries.is_empty());
    }
}
