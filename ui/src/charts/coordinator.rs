//! Owns the four charts of a measure view and the shared highlight.
//!
//! Each slot moves `Empty → Rendered ⇄ Highlighted → Empty`. Hover and unhover
//! only ever touch marker encodings; data changes go through `render_all`,
//! which replaces every chart wholesale. Subscriptions exist exactly while a
//! slot is not `Empty`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::config::DashboardConfig;
use crate::core::error::ChartError;
use crate::core::timing::sleep_ms;
use crate::data::export::image_filename;
use crate::data::payload::ChartPayload;

use super::backend::{ChartBackend, ChartEvent, EventSink, SubscriptionId};
use super::builders::build_figure;
use super::figure::{ChartSlot, Figure, ImageRequest, LayoutUpdate};
use super::highlight::{baseline_encoding, highlight_encoding, HighlightState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartState {
    Empty,
    Rendered,
    Highlighted,
}

#[derive(Debug, Default)]
struct SlotState {
    figure: Option<Figure>,
    subscription: Option<SubscriptionId>,
    /// Traces currently carrying a per-point highlight encoding.
    highlighted: Vec<usize>,
}

impl SlotState {
    fn state(&self) -> ChartState {
        match (&self.figure, self.highlighted.is_empty()) {
            (None, _) => ChartState::Empty,
            (Some(_), true) => ChartState::Rendered,
            (Some(_), false) => ChartState::Highlighted,
        }
    }
}

pub struct ChartCoordinator<B: ChartBackend> {
    backend: B,
    config: DashboardConfig,
    sink: EventSink,
    highlight: HighlightState,
    slots: [SlotState; 4],
    measure: Option<String>,
}

impl<B: ChartBackend> ChartCoordinator<B> {
    pub fn new(backend: B, config: DashboardConfig, sink: EventSink) -> Self {
        Self {
            backend,
            config,
            sink,
            highlight: HighlightState::default(),
            slots: Default::default(),
            measure: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[cfg(test)]
    fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlight.current()
    }

    pub fn state(&self, slot: ChartSlot) -> ChartState {
        self.slots[slot.index()].state()
    }

    pub fn measure(&self) -> Option<&str> {
        self.measure.as_deref()
    }

    /// Fails with `BackendUnavailable` before touching any slot while the
    /// plotting library is still loading; callers retry once it is ready.
    pub fn render_all(&mut self, payload: &ChartPayload) -> Result<(), ChartError> {
        if !self.backend.library_ready() {
            return Err(ChartError::BackendUnavailable(
                "charting library not loaded yet".into(),
            ));
        }
        self.highlight.clear();
        for slot in ChartSlot::ALL {
            self.render_slot(slot, payload)?;
        }
        self.measure = Some(payload.measure_id.clone());
        tracing::info!(measure = %payload.measure_id, "rendered charts");
        Ok(())
    }

    fn render_slot(&mut self, slot: ChartSlot, payload: &ChartPayload) -> Result<(), ChartError> {
        self.release(slot);

        let target = slot.target_id();
        if !self.backend.target_ready(target) {
            return Err(ChartError::RenderTargetUnavailable {
                target: target.to_string(),
            });
        }

        let figure = build_figure(slot, payload, &self.config);
        self.backend.new_plot(target, &figure)?;
        let subscription = self.backend.subscribe(target, slot, self.sink.clone())?;

        let state = &mut self.slots[slot.index()];
        state.figure = Some(figure);
        state.subscription = Some(subscription);
        Ok(())
    }

    /// Unsubscribe and purge one slot, leaving it `Empty`.
    fn release(&mut self, slot: ChartSlot) {
        let state = std::mem::take(&mut self.slots[slot.index()]);
        if let Some(id) = state.subscription {
            self.backend.unsubscribe(id);
        }
        if state.figure.is_some() {
            if let Err(err) = self.backend.purge(slot.target_id()) {
                tracing::warn!("purge of {} failed: {err}", slot.target_id());
            }
        }
    }

    /// Apply one event from the backend channel.
    pub fn handle_event(&mut self, event: ChartEvent) -> Result<(), ChartError> {
        match event {
            ChartEvent::Hover {
                slot,
                trace_index,
                point_index,
                label,
            } => {
                let subject = label.or_else(|| {
                    self.slots[slot.index()]
                        .figure
                        .as_ref()
                        .and_then(|figure| figure.label_at(trace_index, point_index))
                        .map(str::to_string)
                });
                match subject {
                    Some(subject) => self.on_hover(&subject),
                    None => {
                        tracing::debug!(?slot, trace_index, point_index, "hover without subject");
                        Ok(())
                    }
                }
            }
            ChartEvent::Unhover { .. } => self.on_unhover(),
        }
    }

    pub fn on_hover(&mut self, subject: &str) -> Result<(), ChartError> {
        self.highlight.set(subject);

        for slot in ChartSlot::ALL {
            let state = &self.slots[slot.index()];
            let Some(figure) = state.figure.as_ref() else {
                continue;
            };
            let target = slot.target_id();

            let matching: Vec<usize> = figure
                .subject_traces()
                .filter(|(_, trace)| trace.contains_subject(subject))
                .map(|(index, _)| index)
                .collect();

            for &index in state.highlighted.iter().filter(|i| !matching.contains(i)) {
                let update = baseline_encoding(&figure.data[index], &self.config);
                self.backend.restyle(target, &update, index)?;
            }
            for &index in &matching {
                let update = highlight_encoding(&figure.data[index], subject, &self.config);
                self.backend.restyle(target, &update, index)?;
            }

            self.slots[slot.index()].highlighted = matching;
        }
        Ok(())
    }

    pub fn on_unhover(&mut self) -> Result<(), ChartError> {
        if self.highlight.clear().is_none() {
            return Ok(());
        }

        for slot in ChartSlot::ALL {
            let state = &mut self.slots[slot.index()];
            state.highlighted.clear();
            let Some(figure) = state.figure.as_ref() else {
                continue;
            };
            for (index, trace) in figure.subject_traces() {
                let update = baseline_encoding(trace, &self.config);
                self.backend.restyle(slot.target_id(), &update, index)?;
            }
        }
        Ok(())
    }

    /// Image downloads for every rendered chart, in slot order.
    pub fn image_exports(&self, measure_id: &str) -> Vec<(ChartSlot, ImageRequest)> {
        ChartSlot::ALL
            .into_iter()
            .filter(|slot| self.state(*slot) != ChartState::Empty)
            .map(|slot| {
                (
                    slot,
                    ImageRequest {
                        format: "png",
                        width: self.config.image_width,
                        height: self.config.image_height,
                        filename: image_filename(measure_id, slot.target_id()),
                    },
                )
            })
            .collect()
    }

    /// Returns `false` when the slot was emptied since the request was planned.
    pub fn download_image(
        &mut self,
        slot: ChartSlot,
        request: &ImageRequest,
    ) -> Result<bool, ChartError> {
        if self.state(slot) == ChartState::Empty {
            return Ok(false);
        }
        self.backend.download_image(slot.target_id(), request)?;
        Ok(true)
    }

    pub fn reset_view(&mut self) -> Result<(), ChartError> {
        self.on_unhover()?;
        for slot in ChartSlot::ALL {
            if self.state(slot) != ChartState::Empty {
                self.backend
                    .relayout(slot.target_id(), &LayoutUpdate::Autorange)?;
            }
        }
        Ok(())
    }

    pub fn cleanup(&mut self) {
        for slot in ChartSlot::ALL {
            self.release(slot);
        }
        self.highlight.clear();
        if let Some(measure) = self.measure.take() {
            tracing::debug!(%measure, "charts released");
        }
    }
}

impl<B: ChartBackend> Drop for ChartCoordinator<B> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Download every rendered chart as PNG, `export_stagger_ms` apart.
///
/// The coordinator is only borrowed between delays, so hover handling keeps
/// running while the downloads are spread out.
pub async fn export_images<B: ChartBackend>(
    coordinator: &Rc<RefCell<ChartCoordinator<B>>>,
    measure_id: &str,
) -> Result<usize, ChartError> {
    let (requests, stagger) = {
        let coordinator = coordinator.borrow();
        (
            coordinator.image_exports(measure_id),
            coordinator.config.export_stagger_ms,
        )
    };

    let mut started = 0;
    for (i, (slot, request)) in requests.iter().enumerate() {
        if i > 0 {
            sleep_ms(stagger).await;
        }
        if coordinator.borrow_mut().download_image(*slot, request)? {
            started += 1;
        }
    }
    tracing::info!(measure = measure_id, started, "image export finished");
    Ok(started)
}
