//! Metro lines and stations pipeline

use super::{ExportContext, PipelineOutcome, PipelineSummary};
use crate::convert::MetroConverter;
use crate::error::ExportResult;
use crate::models::WebMap;
use crate::sources::arcgis::ArcGisResolver;

pub const CATEGORY: &str = "metro";

pub async fn run(ctx: &ExportContext) -> ExportResult<PipelineOutcome> {
    let config = &ctx.config.metro;
    if !config.is_configured() {
        return Ok(PipelineOutcome::NothingProduced {
            reason: "no viewer URL or web map id configured".to_string(),
        });
    }

    // Fails before any network traffic on a bad CRS pair
    let converter = MetroConverter::new(config, &ctx.config.coordinate_system)?;

    let resolver = ArcGisResolver::new(ctx.fetcher.clone(), &ctx.config.endpoints.arcgis_api_base);
    let payload = resolver.resolve_configured(config).await?;
    let map: WebMap = serde_json::from_value(payload)?;

    let mut lines = converter.convert_lines(&map);
    let mut stations = converter.convert_stations(&map);
    let fetched = lines.stats.input_records + stations.stats.input_records;

    let lines_path = ctx
        .output
        .save(&mut lines.document, CATEGORY, &config.lines_base_name)?;
    let stations_path = ctx
        .output
        .save(&mut stations.document, CATEGORY, &config.stations_base_name)?;

    Ok(PipelineOutcome::Completed {
        paths: vec![lines_path, stations_path],
        summary: PipelineSummary {
            fetched,
            merge: None,
            documents: vec![
                (config.lines_base_name.clone(), lines.stats),
                (config.stations_base_name.clone(), stations.stats),
            ],
        },
    })
}
