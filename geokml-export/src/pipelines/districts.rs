//! District boundaries pipeline

use super::{ExportContext, PipelineOutcome, PipelineSummary};
use crate::convert::DistrictConverter;
use crate::error::ExportResult;
use crate::models::district::parse_district_batch;

pub const CATEGORY: &str = "districts";

pub async fn run(ctx: &ExportContext) -> ExportResult<PipelineOutcome> {
    let config = &ctx.config.districts;

    let payload = ctx
        .fetcher
        .get_json(&ctx.config.endpoints.districts_url, &[])
        .await?;
    let batch = parse_district_batch(&payload)?;
    let fetched = batch.len() + batch.malformed;

    let mut conversion = DistrictConverter::new(config).convert(batch);
    let path = ctx
        .output
        .save(&mut conversion.document, CATEGORY, &config.base_name)?;

    Ok(PipelineOutcome::Completed {
        paths: vec![path],
        summary: PipelineSummary {
            fetched,
            merge: None,
            documents: vec![(config.base_name.clone(), conversion.stats)],
        },
    })
}
