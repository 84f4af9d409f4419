//! Export pipelines
//!
//! Each pipeline fetches its source, converts it and saves the result. No
//! error leaves a pipeline: failures become [`PipelineOutcome::NothingProduced`]
//! so that one broken source never stops the others.

pub mod districts;
pub mod metro;
pub mod pois;

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use geokml_common::ExportConfig;

use crate::convert::ConversionStats;
use crate::error::ExportResult;
use crate::merge::MergeReport;
use crate::output::OutputManager;
use crate::sources::JsonFetcher;

/// Available pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    Districts,
    Pois,
    Metro,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 3] = [Self::Districts, Self::Pois, Self::Metro];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Districts => "districts",
            Self::Pois => "pois",
            Self::Metro => "metro",
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counters for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineSummary {
    /// Records (or features) received from the source
    pub fetched: usize,
    /// Present for pipelines that merge locales
    pub merge: Option<MergeReport>,
    /// Per written document: base name and counters
    pub documents: Vec<(String, ConversionStats)>,
}

impl PipelineSummary {
    pub fn features(&self) -> usize {
        self.documents.iter().map(|(_, stats)| stats.features).sum()
    }

    pub fn display_string(&self) -> String {
        let mut parts = vec![format!("fetched {}", self.fetched)];
        if let Some(report) = &self.merge {
            parts.push(format!(
                "merged {}, unmatched {}, discrepancies {}",
                report.matched,
                report.unmatched(),
                report.discrepancies.len()
            ));
        }
        for (name, stats) in &self.documents {
            parts.push(format!("{}: {}", name, stats.display_string()));
        }
        parts.join("; ")
    }
}

/// Result of one pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Completed {
        paths: Vec<PathBuf>,
        summary: PipelineSummary,
    },
    NothingProduced {
        reason: String,
    },
}

impl PipelineOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn paths(&self) -> &[PathBuf] {
        match self {
            Self::Completed { paths, .. } => paths,
            Self::NothingProduced { .. } => &[],
        }
    }
}

/// Shared, read-only state for all pipelines of a run
pub struct ExportContext {
    pub config: ExportConfig,
    pub fetcher: Arc<dyn JsonFetcher>,
    pub output: OutputManager,
}

impl ExportContext {
    pub fn new(config: ExportConfig, fetcher: Arc<dyn JsonFetcher>, output: OutputManager) -> Self {
        Self {
            config,
            fetcher,
            output,
        }
    }
}

/// Run one pipeline, turning any failure into `NothingProduced`
pub async fn run_pipeline(kind: PipelineKind, ctx: &ExportContext) -> PipelineOutcome {
    info!(pipeline = %kind, "Pipeline started");

    let result: ExportResult<PipelineOutcome> = match kind {
        PipelineKind::Districts => districts::run(ctx).await,
        PipelineKind::Pois => pois::run(ctx).await,
        PipelineKind::Metro => metro::run(ctx).await,
    };

    match result {
        Ok(outcome) => {
            match &outcome {
                PipelineOutcome::Completed { paths, summary } => info!(
                    pipeline = %kind,
                    files = paths.len(),
                    "Pipeline completed: {}",
                    summary.display_string()
                ),
                PipelineOutcome::NothingProduced { reason } => {
                    error!(pipeline = %kind, reason = %reason, "Pipeline produced nothing")
                }
            }
            outcome
        }
        Err(e) => {
            error!(pipeline = %kind, error = %e, "Pipeline failed");
            PipelineOutcome::NothingProduced {
                reason: e.to_string(),
            }
        }
    }
}

/// Run several pipelines concurrently; results come back in request order
pub async fn run_selected(
    kinds: &[PipelineKind],
    ctx: &ExportContext,
) -> Vec<(PipelineKind, PipelineOutcome)> {
    let runs = kinds.iter().map(|&kind| async move { (kind, run_pipeline(kind, ctx).await) });
    futures::future::join_all(runs).await
}
