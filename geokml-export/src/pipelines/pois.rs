//! Bilingual points-of-interest pipeline
//!
//! Both locales are fetched concurrently. A failed primary fetch aborts the
//! pipeline; a failed secondary fetch only degrades the merge to an empty
//! secondary set.

use tracing::warn;

use super::{ExportContext, PipelineOutcome, PipelineSummary};
use crate::convert::PoiConverter;
use crate::error::ExportResult;
use crate::merge::BilingualMerger;
use crate::models::poi::parse_poi_batch;
use crate::models::ParsedBatch;
use crate::sources::visit_saudi::PoiClient;

pub const CATEGORY: &str = "pois";

pub async fn run(ctx: &ExportContext) -> ExportResult<PipelineOutcome> {
    let config = &ctx.config.pois;
    let client = PoiClient::new(ctx.fetcher.clone(), &ctx.config.endpoints, config);

    let (primary, secondary) = client
        .fetch_pair(&config.primary_locale, &config.secondary_locale)
        .await;

    let primary = parse_poi_batch(&primary?)?;
    let secondary = match secondary {
        Ok(payload) => parse_poi_batch(&payload).unwrap_or_else(|e| {
            warn!(locale = %config.secondary_locale, error = %e, "Secondary locale unreadable, merging without it");
            ParsedBatch::empty()
        }),
        Err(e) => {
            warn!(locale = %config.secondary_locale, error = %e, "Secondary locale fetch failed, merging without it");
            ParsedBatch::empty()
        }
    };
    let fetched = primary.len() + primary.malformed;
    let malformed = primary.malformed + secondary.malformed;

    let outcome = BilingualMerger::new().merge(primary.records, secondary.records);

    let mut conversion = PoiConverter::new(config).convert(outcome.records);
    conversion.stats.malformed = malformed;

    let path = ctx
        .output
        .save(&mut conversion.document, CATEGORY, &config.base_name)?;

    Ok(PipelineOutcome::Completed {
        paths: vec![path],
        summary: PipelineSummary {
            fetched,
            merge: Some(outcome.report),
            documents: vec![(config.base_name.clone(), conversion.stats)],
        },
    })
}
