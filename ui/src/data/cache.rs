//! Payload and dataset cache. Invalidation is always wholesale.

use std::collections::HashMap;
use std::rc::Rc;

use super::model::{FilterState, MeasureDataset, SexCode};
use super::payload::ChartPayload;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub measure: String,
    pub sex: Option<SexCode>,
    pub site: Option<String>,
}

impl CacheKey {
    pub fn new(measure: &str, filters: &FilterState) -> Self {
        Self {
            measure: measure.to_string(),
            sex: filters.sex.clone(),
            site: filters.site.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct PayloadCache {
    payloads: HashMap<CacheKey, Rc<ChartPayload>>,
    datasets: HashMap<String, Rc<MeasureDataset>>,
}

impl PayloadCache {
    pub fn payload(&self, key: &CacheKey) -> Option<Rc<ChartPayload>> {
        self.payloads.get(key).cloned()
    }

    pub fn insert_payload(&mut self, key: CacheKey, payload: Rc<ChartPayload>) {
        self.payloads.insert(key, payload);
    }

    pub fn dataset(&self, measure: &str) -> Option<Rc<MeasureDataset>> {
        self.datasets.get(measure).cloned()
    }

    pub fn insert_dataset(&mut self, measure: &str, dataset: Rc<MeasureDataset>) {
        self.datasets.insert(measure.to_string(), dataset);
    }

    pub fn clear(&mut self) {
        self.payloads.clear();
        self.datasets.clear();
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty() && self.datasets.is_empty()
    }
}
