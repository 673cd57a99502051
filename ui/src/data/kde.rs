//! Gaussian kernel density curve used to smooth the Z-score histograms.
//!
//! Bandwidth is a fixed tenth of the sample range (no Silverman rule) and the
//! curve spans the range widened by 30% on each side. Good enough for a visual
//! overlay; it is not an authoritative density estimate.

use serde::Serialize;

pub const DEFAULT_KDE_POINTS: usize = 100;

const BANDWIDTH_FRACTION: f64 = 0.1;
const DOMAIN_PADDING: f64 = 0.3;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Kde {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Kde {
    /// Multiply densities so the curve sits on a count histogram.
    pub fn scaled(&self, factor: f64) -> Kde {
        Kde {
            x: self.x.clone(),
            y: self.y.iter().map(|value| value * factor).collect(),
        }
    }
}

/// Range used for bandwidth and domain. Identical samples fall back to 1.0.
pub fn effective_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut finite = values.iter().copied().filter(|value| value.is_finite());
    let first = finite.next()?;
    let (min, max) = finite.fold((first, first), |(lo, hi), value| (lo.min(value), hi.max(value)));
    let range = max - min;
    Some((min, if range > 0.0 { range } else { 1.0 }))
}

pub fn compute_kde(values: &[f64]) -> Option<Kde> {
    compute_kde_with(values, DEFAULT_KDE_POINTS)
}

/// `None` for fewer than two finite samples.
pub fn compute_kde_with(values: &[f64], points: usize) -> Option<Kde> {
    let sample: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sample.len() < 2 || points < 2 {
        return None;
    }

    let (min, range) = effective_range(&sample)?;
    let bandwidth = BANDWIDTH_FRACTION * range;
    let start = min - DOMAIN_PADDING * range;
    let end = min + (1.0 + DOMAIN_PADDING) * range;
    let step = (end - start) / (points - 1) as f64;

    let n = sample.len() as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let x: Vec<f64> = (0..points).map(|i| start + step * i as f64).collect();
    let y = x
        .iter()
        .map(|&at| {
            let sum: f64 = sample
                .iter()
                .map(|&xi| {
                    let u = (at - xi) / bandwidth;
                    (-0.5 * u * u).exp()
                })
                .sum();
            norm * sum
        })
        .collect();

    Some(Kde { x, y })
}
