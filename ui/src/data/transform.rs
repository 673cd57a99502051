//! Reshape a measure dataset into the four chart payloads.

use crate::core::config::DashboardConfig;
use crate::core::error::DataFormatError;

use super::kde::{compute_kde_with, effective_range};
use super::model::{FilterState, MeasureDataset, MeasureRecord, ResolvedFilters};
use super::payload::{
    CentilePayload, ChartPayload, HistogramPayload, QqPayload, ScatterPayload, SeriesPoint,
    SiteDistribution, SiteSeries,
};
use super::qq::{compute_identity_lines, site_offsets};

/// Group rows by acquisition site, keeping the order in which sites first appear.
pub fn group_by_site(records: &[MeasureRecord]) -> Vec<(String, Vec<&MeasureRecord>)> {
    let mut groups: Vec<(String, Vec<&MeasureRecord>)> = Vec::new();
    for record in records {
        let key = record.site_key();
        match groups.iter_mut().find(|(site, _)| site == key) {
            Some((_, rows)) => rows.push(record),
            None => groups.push((key.to_string(), vec![record])),
        }
    }
    groups
}

/// Pin unset filter values to the first value the dataset offers.
pub fn resolve_filters(
    document: &str,
    dataset: &MeasureDataset,
    filters: &FilterState,
) -> Result<ResolvedFilters, DataFormatError> {
    let sex = match &filters.sex {
        Some(sex) => sex.clone(),
        None => dataset
            .available_sexes
            .first()
            .cloned()
            .ok_or_else(|| DataFormatError::Empty {
                document: document.to_string(),
                what: "sexes",
            })?,
    };
    let site = match &filters.site {
        Some(site) => site.clone(),
        None => dataset
            .available_sites
            .first()
            .cloned()
            .ok_or_else(|| DataFormatError::Empty {
                document: document.to_string(),
                what: "sites",
            })?,
    };
    Ok(ResolvedFilters { sex, site })
}

/// Rows exist but none carries a raw score, so chart 1 has nothing to plot.
pub fn lacks_raw_scores(records: &[MeasureRecord]) -> bool {
    !records.is_empty() && records.iter().all(|row| row.raw_score.is_none())
}

pub fn build_payload(
    measure_id: &str,
    dataset: &MeasureDataset,
    filters: &FilterState,
    config: &DashboardConfig,
) -> Result<ChartPayload, DataFormatError> {
    let resolved = resolve_filters(&format!("{measure_id}.json"), dataset, filters)?;

    let records: Vec<MeasureRecord> = dataset
        .harmonized
        .iter()
        .filter(|row| row.matches(&resolved.sex, &resolved.site))
        .cloned()
        .collect();

    let mut centiles: Vec<_> = dataset
        .centiles
        .iter()
        .filter(|row| row.matches(&resolved.sex, &resolved.site))
        .cloned()
        .collect();
    centiles.sort_by(|a, b| a.age.total_cmp(&b.age));

    let groups = group_by_site(&records);

    if lacks_raw_scores(&records) {
        tracing::warn!(
            measure = measure_id,
            rows = records.len(),
            "no raw `Y` scores in the filtered rows; the score-by-age chart will be empty"
        );
    }
    let chart1 = ScatterPayload {
        sites_data: series(&groups, |row| row.raw_score.map(|y| (row.age, y))),
    };

    let chart2 = CentilePayload {
        centile_columns: dataset.centile_columns(),
        centiles,
        sites_data: series(&groups, |row| Some((row.age, row.y_harmonized))),
    };

    let identity_lines = compute_identity_lines(&records);
    let offsets = site_offsets(&records);
    let qq_series = groups
        .iter()
        .zip(offsets.iter())
        .map(|((site, rows), (_, offset))| SiteSeries {
            site: site.clone(),
            points: points(rows, |row| Some((row.theoretical, row.z + offset))),
        })
        .collect();
    let chart3 = QqPayload {
        identity_lines,
        sites_data: qq_series,
    };

    let chart4 = HistogramPayload {
        bins: config.histogram_bins,
        sites: groups
            .iter()
            .map(|(site, rows)| distribution(site, rows, config))
            .collect(),
    };

    tracing::debug!(
        measure = measure_id,
        rows = records.len(),
        sites = groups.len(),
        "built chart payload"
    );

    Ok(ChartPayload {
        measure_id: measure_id.to_string(),
        scale_name: dataset.scale_name.clone(),
        display_name: dataset.display_name.clone(),
        filters: resolved,
        chart1,
        chart2,
        chart3,
        chart4,
        records,
    })
}

fn series<F>(groups: &[(String, Vec<&MeasureRecord>)], project: F) -> Vec<SiteSeries>
where
    F: Fn(&MeasureRecord) -> Option<(f64, f64)>,
{
    groups
        .iter()
        .map(|(site, rows)| SiteSeries {
            site: site.clone(),
            points: points(rows, &project),
        })
        .collect()
}

fn points<F>(rows: &[&MeasureRecord], project: F) -> Vec<SeriesPoint>
where
    F: Fn(&MeasureRecord) -> Option<(f64, f64)>,
{
    rows.iter()
        .filter_map(|row| {
            let (x, y) = project(row)?;
            (x.is_finite() && y.is_finite()).then(|| SeriesPoint {
                x,
                y,
                subject_id: row.subject_id.clone(),
            })
        })
        .collect()
}

fn distribution(site: &str, rows: &[&MeasureRecord], config: &DashboardConfig) -> SiteDistribution {
    let (z_values, subjects): (Vec<f64>, Vec<String>) = rows
        .iter()
        .filter(|row| row.z.is_finite())
        .map(|row| (row.z, row.subject_id.clone()))
        .unzip();

    let bins = config.histogram_bins.max(1);
    let (bin_start, bin_width) = effective_range(&z_values)
        .map(|(min, range)| (min, range / bins as f64))
        .unwrap_or((0.0, 1.0 / bins as f64));

    SiteDistribution {
        site: site.to_string(),
        kde: compute_kde_with(&z_values, config.kde_points),
        z_values,
        subjects,
        bin_start,
        bin_width,
    }
}
