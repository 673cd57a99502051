//! `window.Plotly` bridge for the browser build.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use futures_channel::oneshot;

use js_sys::{Array, Function, Object, Reflect, JSON};
use serde::Serialize;
use serde_json::json;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use crate::core::error::ChartError;

use super::backend::{ChartBackend, ChartEvent, EventSink, SubscriptionId};
use super::figure::{ChartSlot, Figure, ImageRequest, LayoutUpdate, StyleUpdate};

/// Pinned Plotly bundle, injected once per page.
pub const PLOTLY_SRC: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const HOVER_EVENT: &str = "plotly_hover";
const UNHOVER_EVENT: &str = "plotly_unhover";

struct Listener {
    target: String,
    hover: Closure<dyn FnMut(JsValue)>,
    unhover: Closure<dyn FnMut(JsValue)>,
}

#[derive(Default)]
pub struct PlotlyBackend {
    listeners: HashMap<SubscriptionId, Listener>,
    next_subscription: SubscriptionId,
}

impl PlotlyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn plotly(&self) -> Result<Object, ChartError> {
        let window = web_sys::window()
            .ok_or_else(|| ChartError::BackendUnavailable("window unavailable".into()))?;
        let plotly = Reflect::get(&window, &JsValue::from_str("Plotly"))
            .map_err(|_| ChartError::BackendUnavailable("Plotly lookup failed".into()))?;
        if plotly.is_undefined() || plotly.is_null() {
            return Err(ChartError::BackendUnavailable(
                "Plotly script not loaded".into(),
            ));
        }
        Ok(plotly.unchecked_into())
    }

    fn call(&self, name: &'static str, target: &str, args: &Array) -> Result<JsValue, ChartError> {
        let plotly = self.plotly()?;
        let function: Function = Reflect::get(&plotly, &JsValue::from_str(name))
            .ok()
            .and_then(|f| f.dyn_into().ok())
            .ok_or_else(|| ChartError::BackendUnavailable(format!("Plotly.{name} missing")))?;
        function
            .apply(&plotly, args)
            .map_err(|err| call_error(name, target, &err))
    }

    fn element(&self, target: &str) -> Option<web_sys::Element> {
        web_sys::window()?.document()?.get_element_by_id(target)
    }

    fn detach(&self, listener: &Listener) {
        let Some(element) = self.element(&listener.target) else {
            return;
        };
        let Some(remove) = Reflect::get(&element, &JsValue::from_str("removeListener"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
        else {
            return;
        };
        let _ = remove.call2(
            &element,
            &JsValue::from_str(HOVER_EVENT),
            listener.hover.as_ref().unchecked_ref(),
        );
        let _ = remove.call2(
            &element,
            &JsValue::from_str(UNHOVER_EVENT),
            listener.unhover.as_ref().unchecked_ref(),
        );
    }
}

type LibraryLoad = Shared<LocalBoxFuture<'static, Result<(), String>>>;

thread_local! {
    static LIBRARY: RefCell<Option<LibraryLoad>> = const { RefCell::new(None) };
}

fn plotly_present() -> bool {
    web_sys::window()
        .and_then(|window| Reflect::get(&window, &JsValue::from_str("Plotly")).ok())
        .is_some_and(|plotly| !plotly.is_undefined() && !plotly.is_null())
}

/// Resolves once `window.Plotly` exists. The script tag is added on the first
/// call; every later caller awaits the same load.
pub fn load_library() -> LibraryLoad {
    LIBRARY.with(|cell| {
        cell.borrow_mut()
            .get_or_insert_with(|| inject_script(PLOTLY_SRC).shared())
            .clone()
    })
}

fn inject_script(src: &'static str) -> LocalBoxFuture<'static, Result<(), String>> {
    if plotly_present() {
        return futures::future::ready(Ok(())).boxed_local();
    }

    let (tx, rx) = oneshot::channel::<Result<(), String>>();
    let tx = Rc::new(RefCell::new(Some(tx)));
    let settle = |outcome: Result<(), String>| {
        let tx = tx.clone();
        Closure::<dyn FnMut(JsValue)>::new(move |_: JsValue| {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(outcome.clone());
            }
        })
    };
    let on_load = settle(Ok(()));
    let on_error = settle(Err(format!("failed to load {src}")));

    let attached = (|| -> Option<()> {
        let document = web_sys::window()?.document()?;
        let script = document.create_element("script").ok()?;
        script.set_attribute("src", src).ok()?;
        script
            .add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())
            .ok()?;
        script
            .add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())
            .ok()?;
        document.body()?.append_child(&script).ok()?;
        Some(())
    })();
    if attached.is_none() {
        return futures::future::ready(Err("unable to attach the Plotly script".to_string()))
            .boxed_local();
    }
    tracing::debug!(src, "loading charting library");

    async move {
        // Listeners must outlive the load.
        let _listeners = (on_load, on_error);
        rx.await
            .map_err(|_| "Plotly loader dropped".to_string())?
    }
    .boxed_local()
}

impl Drop for PlotlyBackend {
    fn drop(&mut self) {
        for (_, listener) in self.listeners.drain() {
            self.detach(&listener);
        }
    }
}

fn call_error(call: &'static str, target: &str, err: &JsValue) -> ChartError {
    ChartError::Call {
        call,
        target: target.to_string(),
        message: err
            .as_string()
            .or_else(|| JSON::stringify(err).ok().and_then(|s| s.as_string()))
            .unwrap_or_else(|| "unknown error".into()),
    }
}

/// serde value → plain JS object.
fn to_js<T: Serialize>(value: &T, target: &str) -> Result<JsValue, ChartError> {
    let text = serde_json::to_string(value).map_err(|err| ChartError::Call {
        call: "serialize",
        target: target.to_string(),
        message: err.to_string(),
    })?;
    JSON::parse(&text).map_err(|err| call_error("JSON.parse", target, &err))
}

/// First point of a Plotly hover event: (curveNumber, pointNumber, customdata).
fn first_point(event: &JsValue) -> Option<(usize, usize, Option<String>)> {
    let points = Reflect::get(event, &JsValue::from_str("points")).ok()?;
    let point = Reflect::get(&points, &JsValue::from_f64(0.0)).ok()?;
    if point.is_undefined() {
        return None;
    }
    let field = |name: &str| Reflect::get(&point, &JsValue::from_str(name)).ok();
    let trace = field("curveNumber")?.as_f64()? as usize;
    let index = field("pointNumber")
        .and_then(|v| v.as_f64())
        .or_else(|| field("pointIndex").and_then(|v| v.as_f64()))? as usize;
    let label = field("customdata").and_then(|v| {
        v.as_string()
            .or_else(|| v.as_f64().map(|n| n.to_string()))
    });
    Some((trace, index, label))
}

impl ChartBackend for PlotlyBackend {
    fn library_ready(&self) -> bool {
        plotly_present()
    }

    fn target_ready(&self, target: &str) -> bool {
        self.element(target).is_some()
    }

    fn new_plot(&mut self, target: &str, figure: &Figure) -> Result<(), ChartError> {
        let options = json!({ "responsive": true, "displayModeBar": false });
        let args = Array::of4(
            &JsValue::from_str(target),
            &to_js(&figure.data, target)?,
            &to_js(&figure.layout, target)?,
            &to_js(&options, target)?,
        );
        self.call("newPlot", target, &args).map(|_| ())
    }

    fn restyle(
        &mut self,
        target: &str,
        update: &StyleUpdate,
        trace: usize,
    ) -> Result<(), ChartError> {
        let indices = Array::of1(&JsValue::from_f64(trace as f64));
        let args = Array::of3(
            &JsValue::from_str(target),
            &to_js(&update.to_plotly(), target)?,
            &indices,
        );
        self.call("restyle", target, &args).map(|_| ())
    }

    fn relayout(&mut self, target: &str, update: &LayoutUpdate) -> Result<(), ChartError> {
        let args = Array::of2(
            &JsValue::from_str(target),
            &to_js(&update.to_plotly(), target)?,
        );
        self.call("relayout", target, &args).map(|_| ())
    }

    fn purge(&mut self, target: &str) -> Result<(), ChartError> {
        if !self.target_ready(target) {
            return Ok(());
        }
        let args = Array::of1(&JsValue::from_str(target));
        self.call("purge", target, &args).map(|_| ())
    }

    fn download_image(&mut self, target: &str, request: &ImageRequest) -> Result<(), ChartError> {
        let args = Array::of2(&JsValue::from_str(target), &to_js(request, target)?);
        self.call("downloadImage", target, &args).map(|_| ())
    }

    fn subscribe(
        &mut self,
        target: &str,
        slot: ChartSlot,
        sink: EventSink,
    ) -> Result<SubscriptionId, ChartError> {
        let element = self
            .element(target)
            .ok_or_else(|| ChartError::RenderTargetUnavailable {
                target: target.to_string(),
            })?;
        let on: Function = Reflect::get(&element, &JsValue::from_str("on"))
            .ok()
            .and_then(|f| f.dyn_into().ok())
            .ok_or_else(|| ChartError::Call {
                call: "on",
                target: target.to_string(),
                message: "element is not a Plotly graph".into(),
            })?;

        let hover_sink = sink.clone();
        let hover = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let Some((trace_index, point_index, label)) = first_point(&event) else {
                return;
            };
            let _ = hover_sink.unbounded_send(ChartEvent::Hover {
                slot,
                trace_index,
                point_index,
                label,
            });
        });
        let unhover = Closure::<dyn FnMut(JsValue)>::new(move |_event: JsValue| {
            let _ = sink.unbounded_send(ChartEvent::Unhover { slot });
        });

        on.call2(
            &element,
            &JsValue::from_str(HOVER_EVENT),
            hover.as_ref().unchecked_ref(),
        )
        .map_err(|err| call_error("on", target, &err))?;
        on.call2(
            &element,
            &JsValue::from_str(UNHOVER_EVENT),
            unhover.as_ref().unchecked_ref(),
        )
        .map_err(|err| call_error("on", target, &err))?;

        self.next_subscription = self.next_subscription.wrapping_add(1);
        let id = self.next_subscription;
        self.listeners.insert(
            id,
            Listener {
                target: target.to_string(),
                hover,
                unhover,
            },
        );
        Ok(id)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        if let Some(listener) = self.listeners.remove(&id) {
            self.detach(&listener);
        }
    }
}
