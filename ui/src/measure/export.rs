use std::rc::Rc;

use dioxus::prelude::*;

use crate::charts::export_images;
use crate::core::platform;
use crate::data::export::{data_export, data_filename, model_export, model_filename, to_pretty_json};
use crate::data::payload::ChartPayload;
use crate::t;

use super::charts::CoordinatorHandle;
use super::download::download_bytes;

#[derive(Clone, Debug, PartialEq)]
enum ExportStatus {
    Idle,
    Working(String),
    Done(String),
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ExportKind {
    Data,
    Model,
    Images,
}

#[component]
pub fn ExportPanel(payload: Rc<ChartPayload>, coordinator: CoordinatorHandle) -> Element {
    let mut status = use_signal(|| ExportStatus::Idle);
    let busy = use_signal(|| false);

    let feedback = match &status() {
        ExportStatus::Idle => None,
        ExportStatus::Working(label) => Some(("export-panel__meta".to_string(), format!("{label}…"))),
        ExportStatus::Done(message) => Some((
            "export-panel__meta export-panel__meta--success".to_string(),
            message.clone(),
        )),
        ExportStatus::Error(err) => Some((
            "export-panel__meta export-panel__meta--error".to_string(),
            err.clone(),
        )),
    };

    let start = {
        let payload = payload.clone();
        let coordinator = coordinator.clone();
        move |kind: ExportKind| {
            let mut status_signal = status;
            let mut busy_signal = busy;
            if busy_signal() {
                return;
            }
            busy_signal.set(true);
            status_signal.set(ExportStatus::Working(match kind {
                ExportKind::Data => t!("export-working-data"),
                ExportKind::Model => t!("export-working-model"),
                ExportKind::Images => t!("export-working-images"),
            }));

            let payload = payload.clone();
            let coordinator = coordinator.clone();
            platform::spawn_future(async move {
                let outcome = match kind {
                    ExportKind::Data => perform_data_export(&payload).await,
                    ExportKind::Model => perform_model_export(&payload).await,
                    ExportKind::Images => perform_image_export(&coordinator, &payload).await,
                };
                match outcome {
                    Ok(message) => status_signal.set(ExportStatus::Done(message)),
                    Err(err) => {
                        tracing::warn!("export failed: {err}");
                        status_signal.set(ExportStatus::Error(err));
                    }
                }
                busy_signal.set(false);
            });
        }
    };

    let on_data = {
        let start = start.clone();
        move |_| start(ExportKind::Data)
    };
    let on_model = {
        let start = start.clone();
        move |_| start(ExportKind::Model)
    };
    let on_images = move |_| start(ExportKind::Images);

    let on_reset = move |_| {
        let outcome = coordinator.0.borrow_mut().reset_view();
        match outcome {
            Ok(()) => status.set(ExportStatus::Idle),
            Err(err) => status.set(ExportStatus::Error(err.to_string())),
        }
    };

    rsx! {
        section { class: "export-panel",
            div { class: "export-panel__actions",
                button {
                    r#type: "button",
                    class: "button button--primary",
                    disabled: busy(),
                    onclick: on_data,
                    {t!("export-data")}
                }
                button {
                    r#type: "button",
                    class: "button",
                    disabled: busy(),
                    onclick: on_model,
                    {t!("export-model")}
                }
                button {
                    r#type: "button",
                    class: "button",
                    disabled: busy(),
                    onclick: on_images,
                    {t!("export-images")}
                }
                button {
                    r#type: "button",
                    class: "button button--ghost",
                    onclick: on_reset,
                    {t!("reset-view")}
                }
            }

            if let Some((class_name, message)) = feedback {
                p { class: "{class_name}", "{message}" }
            }
        }
    }
}

async fn perform_data_export(payload: &ChartPayload) -> Result<String, String> {
    let json = to_pretty_json(&data_export(payload)).map_err(|err| err.to_string())?;
    deliver(data_filename(&payload.measure_id), json).await
}

async fn perform_model_export(payload: &ChartPayload) -> Result<String, String> {
    let json = to_pretty_json(&model_export(payload)).map_err(|err| err.to_string())?;
    deliver(model_filename(&payload.measure_id), json).await
}

async fn deliver(filename: String, json: String) -> Result<String, String> {
    let delivery = download_bytes(&filename, "application/json", json.into_bytes()).await?;
    Ok(match delivery {
        Some(path) => t!("export-saved", path = path),
        None => t!("export-started", file = filename),
    })
}

async fn perform_image_export(
    coordinator: &CoordinatorHandle,
    payload: &ChartPayload,
) -> Result<String, String> {
    let started = export_images(&coordinator.0, &payload.measure_id)
        .await
        .map_err(|err| err.to_string())?;
    Ok(t!("export-images-started", count = started))
}
