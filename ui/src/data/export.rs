//! JSON documents offered by the "Export data" and "Export model" buttons.

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::model::{CentileRow, MeasureRecord, ResolvedFilters};
use super::payload::ChartPayload;

pub const MODEL_TYPE: &str = "normative_model";
pub const MODEL_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DataExport<'a> {
    pub measure: &'a str,
    pub scale_name: &'a str,
    pub display_name: &'a str,
    pub filters: &'a ResolvedFilters,
    pub exported_at: String,
    pub centile_columns: &'a [String],
    pub centiles: &'a [CentileRow],
    pub data: &'a [MeasureRecord],
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelMetadata {
    pub created: String,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelExport<'a> {
    pub measure: &'a str,
    pub model_type: &'static str,
    pub scale_name: &'a str,
    pub centile_columns: &'a [String],
    pub filters: &'a ResolvedFilters,
    pub centiles: &'a [CentileRow],
    pub metadata: ModelMetadata,
}

pub fn data_export(payload: &ChartPayload) -> DataExport<'_> {
    DataExport {
        measure: &payload.measure_id,
        scale_name: &payload.scale_name,
        display_name: &payload.display_name,
        filters: &payload.filters,
        exported_at: now_rfc3339(),
        centile_columns: &payload.chart2.centile_columns,
        centiles: &payload.chart2.centiles,
        data: &payload.records,
    }
}

pub fn model_export(payload: &ChartPayload) -> ModelExport<'_> {
    ModelExport {
        measure: &payload.measure_id,
        model_type: MODEL_TYPE,
        scale_name: &payload.scale_name,
        centile_columns: &payload.chart2.centile_columns,
        filters: &payload.filters,
        centiles: &payload.chart2.centiles,
        metadata: ModelMetadata {
            created: now_rfc3339(),
            version: MODEL_VERSION,
        },
    }
}

pub fn data_filename(measure_id: &str) -> String {
    format!("{measure_id}_data.json")
}

pub fn model_filename(measure_id: &str) -> String {
    format!("{measure_id}_model.json")
}

pub fn image_filename(measure_id: &str, target: &str) -> String {
    format!("{measure_id}_{target}")
}

pub fn to_pretty_json<T: Serialize>(document: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".into())
}
