//! Identity lines for the Q-Q chart.
//!
//! All sites share one diagonal domain so they stay comparable; each site's
//! line (and its points) is then shifted by `stored_offset - (sites - 1)` so
//! overlapping sites separate along the diagonal.

use serde::Serialize;

use crate::core::error::IdentityLineDataError;

use super::model::MeasureRecord;
use super::transform::group_by_site;

const RANGE_PADDING: f64 = 0.5;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IdentityLine {
    pub site: String,
    pub x: [f64; 2],
    pub y: [f64; 2],
    pub offset: f64,
}

/// Site → line, in first-occurrence order.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct IdentityLines(Vec<IdentityLine>);

impl IdentityLines {
    pub fn get(&self, site: &str) -> Option<&IdentityLine> {
        self.0.iter().find(|line| line.site == site)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IdentityLine> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-site display offsets, in first-occurrence order.
pub fn site_offsets(records: &[MeasureRecord]) -> Vec<(String, f64)> {
    let groups = group_by_site(records);
    let shift = groups.len().saturating_sub(1) as f64;
    groups
        .into_iter()
        .map(|(site, rows)| {
            let stored = rows
                .iter()
                .map(|row| row.offset)
                .find(|offset| offset.is_finite())
                .unwrap_or(0.0);
            (site, stored - shift)
        })
        .collect()
}

pub fn try_identity_lines(
    records: &[MeasureRecord],
) -> Result<IdentityLines, IdentityLineDataError> {
    let values = records
        .iter()
        .flat_map(|row| [row.theoretical, row.z])
        .filter(|value| value.is_finite());

    let (lo, hi) = values
        .fold(None, |acc: Option<(f64, f64)>, value| match acc {
            None => Some((value, value)),
            Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
        })
        .ok_or_else(|| IdentityLineDataError {
            reason: format!("no finite theoretical/Z values among {} rows", records.len()),
        })?;

    let lo = lo - RANGE_PADDING;
    let hi = hi + RANGE_PADDING;

    let lines = site_offsets(records)
        .into_iter()
        .map(|(site, offset)| IdentityLine {
            site,
            x: [lo, hi],
            y: [lo + offset, hi + offset],
            offset,
        })
        .collect();

    Ok(IdentityLines(lines))
}

/// Identity lines, or an empty mapping (logged) when the data cannot support them.
pub fn compute_identity_lines(records: &[MeasureRecord]) -> IdentityLines {
    match try_identity_lines(records) {
        Ok(lines) => lines,
        Err(err) => {
            tracing::warn!("{err}; Q-Q chart renders without identity lines");
            IdentityLines::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SexCode;

    fn row(site: &str, theoretical: f64, z: f64, offset: f64) -> MeasureRecord {
        MeasureRecord {
            age: 30.0,
            sex: SexCode::Numeric(1),
            site: "H".into(),
            raw_site: Some(site.into()),
            raw_score: None,
            y_harmonized: 0.0,
            z,
            theoretical,
            offset,
            subject_id: format!("{site}-{theoretical}"),
        }
    }

    #[test]
    fn sites_share_domain_and_differ_by_offset() {
        let records = vec![
            row("A", -1.0, -1.2, 0.0),
            row("A", 1.0, 0.8, 0.0),
            row("B", -0.5, 2.0, 1.0),
        ];
        let lines = compute_identity_lines(&records);
        let a = lines.get("A").unwrap();
        let b = lines.get("B").unwrap();

        assert_eq!(a.x, b.x);
        assert!((a.x[0] - -1.7).abs() < 1e-12);
        assert!((a.x[1] - 2.5).abs() < 1e-12);
        assert_eq!(a.offset, -1.0);
        assert_eq!(b.offset, 0.0);
        assert!(((a.y[0] - b.y[0]) - (a.offset - b.offset)).abs() < 1e-12);
        assert!(((a.y[1] - b.y[1]) - (a.offset - b.offset)).abs() < 1e-12);
    }

    #[test]
    fn single_site_keeps_stored_offset() {
        let lines = compute_identity_lines(&[row("A", 0.0, 0.0, 2.0)]);
        assert_eq!(lines.get("A").unwrap().offset, 2.0);
    }

    #[test]
    fn no_finite_values_degrades_to_empty() {
        assert!(compute_identity_lines(&[]).is_empty());
        let lines = compute_identity_lines(&[row("A", f64::NAN, f64::NAN, 0.0)]);
        assert!(lines.is_empty());
        assert!(try_identity_lines(&[]).is_err());
    }
}
