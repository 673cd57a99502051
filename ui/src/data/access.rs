//! Session-scoped data access: filter state, cache and request generations.
//!
//! One `DataAccess` lives for the whole page session and is shared through
//! context as an `Rc`. State sits behind a `RefCell`; no borrow is held across
//! an `.await`, so overlapping loads from the event loop are safe. Each load
//! takes a generation ticket and a response whose ticket was overtaken (by a
//! newer load or a filter change) is dropped instead of cached.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::config::DashboardConfig;
use crate::core::error::{DashboardError, DataFormatError};
use crate::core::format::sex_label;

use super::cache::{CacheKey, PayloadCache};
use super::model::{FilterOptions, FilterState, MeasureDataset, MeasureInfo, SexCode, SexOption};
use super::payload::ChartPayload;
use super::source::DataSource;
use super::transform::build_payload;

pub const MEASURES_DOCUMENT: &str = "measures.json";

#[derive(Debug, Default)]
struct AccessState {
    filters: FilterState,
    cache: PayloadCache,
    generation: u64,
    measures: Option<Vec<MeasureInfo>>,
}

pub struct DataAccess<S: DataSource> {
    source: S,
    config: DashboardConfig,
    state: RefCell<AccessState>,
}

impl<S: DataSource> DataAccess<S> {
    pub fn new(source: S, config: DashboardConfig) -> Self {
        Self {
            source,
            config,
            state: RefCell::new(AccessState::default()),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn filters(&self) -> FilterState {
        self.state.borrow().filters.clone()
    }

    /// Replace the filter and drop every cached payload and dataset.
    pub fn set_filters(&self, sex: Option<SexCode>, site: Option<String>) {
        let mut state = self.state.borrow_mut();
        state.filters = FilterState { sex, site };
        state.cache.clear();
        state.generation += 1;
        tracing::info!(filters = ?state.filters, "filters changed; cache cleared");
    }

    pub fn clear_cache(&self) {
        let mut state = self.state.borrow_mut();
        state.cache.clear();
        state.generation += 1;
    }

    pub fn cached_payloads(&self) -> usize {
        self.state.borrow().cache.len()
    }

    /// Measures offered in the navigation. A missing list yields no measures.
    pub async fn list_measures(&self) -> Result<Vec<MeasureInfo>, DataFormatError> {
        if let Some(measures) = self.state.borrow().measures.clone() {
            return Ok(measures);
        }

        let measures = match self.source.fetch_text(MEASURES_DOCUMENT).await {
            Ok(raw) => {
                serde_json::from_str::<Vec<MeasureInfo>>(&raw).map_err(|source| {
                    DataFormatError::Json {
                        document: MEASURES_DOCUMENT.to_string(),
                        source,
                    }
                })?
            }
            Err(err) => {
                tracing::warn!("measure list unavailable ({err}); navigation stays empty");
                Vec::new()
            }
        };

        self.state.borrow_mut().measures = Some(measures.clone());
        Ok(measures)
    }

    pub async fn load_measure(&self, measure_id: &str) -> Result<Rc<ChartPayload>, DashboardError> {
        let (ticket, key) = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            (state.generation, CacheKey::new(measure_id, &state.filters))
        };

        if let Some(payload) = self.state.borrow().cache.payload(&key) {
            tracing::debug!(measure = measure_id, "payload cache hit");
            return Ok(payload);
        }
        tracing::debug!(measure = measure_id, "payload cache miss");

        let dataset = self.dataset(measure_id).await?;

        let mut state = self.state.borrow_mut();
        if state.generation != ticket {
            tracing::warn!(measure = measure_id, "discarding superseded response");
            return Err(DashboardError::Superseded {
                measure: measure_id.to_string(),
            });
        }

        let payload = Rc::new(build_payload(
            measure_id,
            &dataset,
            &state.filters,
            &self.config,
        )?);
        state.cache.insert_payload(key, payload.clone());
        Ok(payload)
    }

    /// Selector values for a measure, independent of the current filter.
    pub async fn filter_options(&self, measure_id: &str) -> Result<FilterOptions, DashboardError> {
        let dataset = self.dataset(measure_id).await?;
        Ok(FilterOptions {
            sexes: dataset
                .available_sexes
                .iter()
                .map(|code| SexOption {
                    value: code.clone(),
                    label: sex_label(code),
                })
                .collect(),
            sites: dataset.available_sites.clone(),
        })
    }

    async fn dataset(&self, measure_id: &str) -> Result<Rc<MeasureDataset>, DashboardError> {
        if let Some(dataset) = self.state.borrow().cache.dataset(measure_id) {
            return Ok(dataset);
        }

        let document = format!("{measure_id}.json");
        let raw = self.source.fetch_text(&document).await?;
        let dataset = Rc::new(MeasureDataset::from_json(&document, &raw)?);
        self.state
            .borrow_mut()
            .cache
            .insert_dataset(measure_id, dataset.clone());
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::LoadError;
    use futures::executor::{block_on, LocalPool};
    use futures::future::LocalBoxFuture;
    use futures::task::LocalSpawnExt;
    use futures::FutureExt;
    use serde_json::json;
    use std::cell::Cell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemorySource {
        documents: HashMap<String, String>,
        fetches: Cell<usize>,
    }

    impl MemorySource {
        fn with(mut self, name: &str, body: String) -> Self {
            self.documents.insert(name.to_string(), body);
            self
        }
    }

    impl DataSource for MemorySource {
        fn fetch_text<'a>(
            &'a self,
            document: &'a str,
        ) -> LocalBoxFuture<'a, Result<String, LoadError>> {
            self.fetches.set(self.fetches.get() + 1);
            let result = self
                .documents
                .get(document)
                .cloned()
                .ok_or_else(|| LoadError::Http {
                    url: document.to_string(),
                    status: 404,
                });
            async move { result }.boxed_local()
        }
    }

    fn measure_doc() -> String {
        let mut rows = Vec::new();
        for (i, sex) in [0, 1].into_iter().enumerate() {
            for (j, site) in ["A", "B"].into_iter().enumerate() {
                rows.push(json!({
                    "Age": 20 + 10 * (i * 2 + j), "Sex_harmonized": sex,
                    "Site_harmonized": site, "Site": site, "Y": 1.0, "Y_harmonized": 1.0,
                    "Z": 0.5, "theoretical": 0.4, "offset": 0,
                    "subject_id": format!("{site}{sex}")
                }));
            }
        }
        json!({
            "scale_name": "wm",
            "display_name": "Working Memory",
            "available_sexes": [0, 1, 2],
            "available_sites": ["A", "B"],
            "centiles": [],
            "harmonized": rows
        })
        .to_string()
    }

    fn access() -> DataAccess<Rc<MemorySource>> {
        let source = MemorySource::default().with("wm.json", measure_doc());
        DataAccess::new(Rc::new(source), DashboardConfig::default())
    }

    #[test]
    fn second_load_is_served_from_cache() {
        let access = access();
        let first = block_on(access.load_measure("wm")).unwrap();
        let second = block_on(access.load_measure("wm")).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(access.source.fetches.get(), 1);
    }

    #[test]
    fn set_filters_forces_a_fresh_fetch() {
        let access = access();
        let before = block_on(access.load_measure("wm")).unwrap();
        access.set_filters(Some(SexCode::Numeric(1)), Some("B".into()));
        assert_eq!(access.cached_payloads(), 0);

        let after = block_on(access.load_measure("wm")).unwrap();
        assert_eq!(access.source.fetches.get(), 2);
        assert!(!Rc::ptr_eq(&before, &after));
        assert!(after
            .records
            .iter()
            .all(|r| r.sex == SexCode::Numeric(1) && r.site == "B"));
    }

    #[test]
    fn filter_options_label_sex_codes() {
        let access = access();
        let options = block_on(access.filter_options("wm")).unwrap();
        let labels: Vec<_> = options.sexes.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Female", "Male", "2"]);
        assert_eq!(options.sites, vec!["A", "B"]);
    }

    #[test]
    fn missing_measure_list_is_empty_navigation() {
        let access = access();
        assert!(block_on(access.list_measures()).unwrap().is_empty());
    }

    #[test]
    fn fetch_failures_surface_as_load_errors() {
        let access = access();
        let err = block_on(access.load_measure("nope")).unwrap_err();
        assert!(matches!(err, DashboardError::Load(LoadError::Http { status: 404, .. })));
    }

    #[test]
    fn response_overtaken_by_filter_change_is_discarded() {
        struct GatedSource {
            gate: RefCell<Option<futures_channel::oneshot::Receiver<String>>>,
        }

        impl DataSource for GatedSource {
            fn fetch_text<'a>(
                &'a self,
                _document: &'a str,
            ) -> LocalBoxFuture<'a, Result<String, LoadError>> {
                let gate = self.gate.borrow_mut().take();
                async move {
                    match gate {
                        Some(rx) => rx.await.map_err(|_| LoadError::Network {
                            url: "gated".into(),
                            cause: "cancelled".into(),
                        }),
                        None => Err(LoadError::Network {
                            url: "gated".into(),
                            cause: "no gate".into(),
                        }),
                    }
                }
                .boxed_local()
            }
        }

        let (tx, rx) = futures_channel::oneshot::channel();
        let access = Rc::new(DataAccess::new(
            GatedSource {
                gate: RefCell::new(Some(rx)),
            },
            DashboardConfig::default(),
        ));

        let outcome = Rc::new(RefCell::new(None));
        let mut pool = LocalPool::new();
        {
            let access = access.clone();
            let outcome = outcome.clone();
            pool.spawner()
                .spawn_local(async move {
                    let result = access.load_measure("wm").await;
                    *outcome.borrow_mut() = Some(result);
                })
                .unwrap();
        }
        pool.run_until_stalled();
        assert!(outcome.borrow().is_none());

        access.set_filters(Some(SexCode::Numeric(0)), Some("A".into()));
        tx.send(measure_doc()).unwrap();
        pool.run_until_stalled();

        let result = outcome.borrow_mut().take().unwrap();
        assert!(result.unwrap_err().is_superseded());
        assert_eq!(access.cached_payloads(), 0);
    }
}
