//! Headless chart backend. Keeps figures in memory and applies restyles to
//! them, so native builds and tests can observe exactly what a browser would
//! draw.

use std::collections::{HashMap, HashSet};

use crate::core::error::ChartError;

use super::backend::{ChartBackend, ChartEvent, EventSink, SubscriptionId};
use super::figure::{ChartSlot, Figure, ImageRequest, LayoutUpdate, StyleUpdate};

#[derive(Debug)]
struct Subscription {
    target: String,
    slot: ChartSlot,
    sink: EventSink,
}

#[derive(Debug)]
pub struct MemoryBackend {
    library_loaded: bool,
    mounted: HashSet<String>,
    plots: HashMap<String, Figure>,
    subscriptions: HashMap<SubscriptionId, Subscription>,
    next_subscription: SubscriptionId,
    downloads: Vec<(String, ImageRequest)>,
    relayouts: Vec<(String, LayoutUpdate)>,
    restyles: usize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Backend with the four chart containers mounted.
    pub fn new() -> Self {
        let mut backend = Self::unmounted();
        for slot in ChartSlot::ALL {
            backend.mount(slot.target_id());
        }
        backend
    }

    pub fn unmounted() -> Self {
        Self {
            library_loaded: true,
            mounted: HashSet::new(),
            plots: HashMap::new(),
            subscriptions: HashMap::new(),
            next_subscription: 1,
            downloads: Vec::new(),
            relayouts: Vec::new(),
            restyles: 0,
        }
    }

    pub fn mount(&mut self, target: &str) {
        self.mounted.insert(target.to_string());
    }

    /// Stand-in for a plotting script that has not finished loading.
    pub fn set_library_loaded(&mut self, loaded: bool) {
        self.library_loaded = loaded;
    }

    pub fn figure(&self, target: &str) -> Option<&Figure> {
        self.plots.get(target)
    }

    pub fn plot_count(&self) -> usize {
        self.plots.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn downloads(&self) -> &[(String, ImageRequest)] {
        &self.downloads
    }

    pub fn relayouts(&self) -> &[(String, LayoutUpdate)] {
        &self.relayouts
    }

    pub fn restyle_count(&self) -> usize {
        self.restyles
    }

    /// Simulate the pointer entering a point; returns how many listeners were notified.
    pub fn emit_hover(&self, target: &str, trace_index: usize, point_index: usize) -> usize {
        let label = self
            .plots
            .get(target)
            .and_then(|figure| figure.data.get(trace_index))
            .and_then(|trace| trace.customdata.get(point_index))
            .cloned();
        self.emit(target, |slot| ChartEvent::Hover {
            slot,
            trace_index,
            point_index,
            label: label.clone(),
        })
    }

    pub fn emit_unhover(&self, target: &str) -> usize {
        self.emit(target, |slot| ChartEvent::Unhover { slot })
    }

    fn emit(&self, target: &str, event: impl Fn(ChartSlot) -> ChartEvent) -> usize {
        self.subscriptions
            .values()
            .filter(|sub| sub.target == target)
            .filter(|sub| sub.sink.unbounded_send(event(sub.slot)).is_ok())
            .count()
    }

    fn plot_mut(&mut self, call: &'static str, target: &str) -> Result<&mut Figure, ChartError> {
        self.plots.get_mut(target).ok_or_else(|| ChartError::Call {
            call,
            target: target.to_string(),
            message: "no plot at target".into(),
        })
    }
}

impl ChartBackend for MemoryBackend {
    fn library_ready(&self) -> bool {
        self.library_loaded
    }

    fn target_ready(&self, target: &str) -> bool {
        self.mounted.contains(target)
    }

    fn new_plot(&mut self, target: &str, figure: &Figure) -> Result<(), ChartError> {
        if !self.library_loaded {
            return Err(ChartError::BackendUnavailable("library not loaded".into()));
        }
        if !self.target_ready(target) {
            return Err(ChartError::RenderTargetUnavailable {
                target: target.to_string(),
            });
        }
        self.plots.insert(target.to_string(), figure.clone());
        Ok(())
    }

    fn restyle(
        &mut self,
        target: &str,
        update: &StyleUpdate,
        trace: usize,
    ) -> Result<(), ChartError> {
        let figure = self.plot_mut("restyle", target)?;
        let marker = figure
            .data
            .get_mut(trace)
            .and_then(|trace| trace.marker.as_mut())
            .ok_or_else(|| ChartError::Call {
                call: "restyle",
                target: target.to_string(),
                message: format!("trace {trace} has no markers"),
            })?;
        update.apply(marker);
        self.restyles += 1;
        Ok(())
    }

    fn relayout(&mut self, target: &str, update: &LayoutUpdate) -> Result<(), ChartError> {
        let figure = self.plot_mut("relayout", target)?;
        match update {
            LayoutUpdate::Autorange => {
                figure.layout.xaxis.autorange = true;
                figure.layout.yaxis.autorange = true;
            }
        }
        self.relayouts.push((target.to_string(), update.clone()));
        Ok(())
    }

    fn purge(&mut self, target: &str) -> Result<(), ChartError> {
        self.plots.remove(target);
        Ok(())
    }

    fn download_image(&mut self, target: &str, request: &ImageRequest) -> Result<(), ChartError> {
        self.plot_mut("downloadImage", target)?;
        self.downloads.push((target.to_string(), request.clone()));
        Ok(())
    }

    fn subscribe(
        &mut self,
        target: &str,
        slot: ChartSlot,
        sink: EventSink,
    ) -> Result<SubscriptionId, ChartError> {
        if !self.plots.contains_key(target) {
            return Err(ChartError::Call {
                call: "on",
                target: target.to_string(),
                message: "no plot at target".into(),
            });
        }
        let id = self.next_subscription;
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.subscriptions.insert(
            id,
            Subscription {
                target: target.to_string(),
                slot,
                sink,
            },
        );
        Ok(id)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.remove(&id);
    }
}
