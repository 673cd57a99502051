//! Drives a measure through the whole native pipeline: files on disk, data
//! access with filters, the four charts, linked highlighting and exports.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use futures::executor::block_on;
use futures_channel::mpsc::{unbounded, UnboundedReceiver};
use serde_json::json;

use ui::charts::memory::MemoryBackend;
use ui::charts::{export_images, ChartCoordinator, ChartEvent, ChartSlot, ChartState};
use ui::core::config::DashboardConfig;
use ui::data::export::{data_export, model_export};
use ui::data::source::DirectorySource;
use ui::data::{DataAccess, SexCode};

fn write_fixture(dir: &std::path::Path) {
    let measures = json!([
        { "id": "wm", "name": "Working Memory" },
        { "id": "processing_speed", "name": "" }
    ]);
    fs::write(dir.join("measures.json"), measures.to_string()).unwrap();

    let mut rows = Vec::new();
    for sex in [0, 1] {
        for site in ["A", "B"] {
            for i in 0..3 {
                let z = i as f64 - 1.0;
                rows.push(json!({
                    "Age": 20 + 5 * i, "Sex_harmonized": sex,
                    "Site_harmonized": site, "Site": site,
                    "Y": 10.0 + i as f64, "Y_harmonized": 10.0 + i as f64,
                    "Z": z, "theoretical": z * 0.9, "offset": 0,
                    "subject_id": format!("{site}{sex}-{i}")
                }));
            }
        }
    }
    let mut centiles = Vec::new();
    for sex in [0, 1] {
        for age in [20, 25, 30] {
            centiles.push(json!({
                "Age": age, "Sex_harmonized": sex, "Site_harmonized": "A",
                "5": 8.0, "25": 9.5, "50": 10.5, "75": 11.5, "95": 13.0
            }));
        }
    }
    let dataset = json!({
        "scale_name": "wm_total",
        "display_name": "Working Memory",
        "available_sexes": [0, 1],
        "available_sites": ["A", "B"],
        "centiles": centiles,
        "harmonized": rows
    });
    fs::write(dir.join("wm.json"), dataset.to_string()).unwrap();
}

fn drain(
    coordinator: &Rc<RefCell<ChartCoordinator<MemoryBackend>>>,
    rx: &mut UnboundedReceiver<ChartEvent>,
) -> usize {
    let mut handled = 0;
    while let Ok(Some(event)) = rx.try_next() {
        coordinator.borrow_mut().handle_event(event).unwrap();
        handled += 1;
    }
    handled
}

#[test]
fn filtered_measure_renders_links_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let config = DashboardConfig {
        export_stagger_ms: 0,
        ..DashboardConfig::default()
    };
    let access = DataAccess::new(DirectorySource::new(dir.path()), config.clone());

    let measures = block_on(access.list_measures()).unwrap();
    assert_eq!(measures.len(), 2);
    assert_eq!(measures[0].name, "Working Memory");

    let initial = block_on(access.load_measure("wm")).unwrap();
    assert_eq!(initial.filters.sex, SexCode::Numeric(0));
    assert_eq!(initial.filters.site, "A");

    access.set_filters(Some(SexCode::Numeric(1)), Some("A".into()));
    let payload = block_on(access.load_measure("wm")).unwrap();
    assert_eq!(payload.records.len(), 3);
    assert!(payload
        .records
        .iter()
        .all(|r| r.sex == SexCode::Numeric(1) && r.site == "A"));

    let exported = serde_json::to_value(data_export(&payload)).unwrap();
    assert_eq!(exported["filters"], json!({ "sex": 1, "site": "A" }));
    assert_eq!(exported["data"].as_array().unwrap().len(), 3);
    let model = serde_json::to_value(model_export(&payload)).unwrap();
    assert_eq!(model["model_type"], "normative_model");
    assert_eq!(model["scale_name"], "wm_total");

    let (tx, mut rx) = unbounded();
    let coordinator = Rc::new(RefCell::new(ChartCoordinator::new(
        MemoryBackend::new(),
        config.clone(),
        tx,
    )));
    coordinator.borrow_mut().render_all(&payload).unwrap();
    for slot in ChartSlot::ALL {
        assert_eq!(coordinator.borrow().state(slot), ChartState::Rendered);
    }

    // Pointer enters the first subject of the Q-Q chart.
    let notified = coordinator.borrow().backend().emit_hover("chart3", 0, 0);
    assert_eq!(notified, 1);
    assert_eq!(drain(&coordinator, &mut rx), 1);
    assert_eq!(coordinator.borrow().highlighted(), Some("A1-0"));
    for slot in ChartSlot::ALL {
        assert_eq!(coordinator.borrow().state(slot), ChartState::Highlighted);
    }

    coordinator.borrow().backend().emit_unhover("chart3");
    drain(&coordinator, &mut rx);
    assert_eq!(coordinator.borrow().highlighted(), None);
    for slot in ChartSlot::ALL {
        assert_eq!(coordinator.borrow().state(slot), ChartState::Rendered);
    }

    let started = block_on(export_images(&coordinator, "wm")).unwrap();
    assert_eq!(started, 4);
    let files: Vec<_> = coordinator
        .borrow()
        .backend()
        .downloads()
        .iter()
        .map(|(_, request)| request.filename.clone())
        .collect();
    assert_eq!(files, vec!["wm_chart1", "wm_chart2", "wm_chart3", "wm_chart4"]);

    coordinator.borrow_mut().cleanup();
    assert_eq!(coordinator.borrow().backend().subscription_count(), 0);
    assert_eq!(coordinator.borrow().state(ChartSlot::Scatter), ChartState::Empty);
    assert_eq!(coordinator.borrow().backend().emit_hover("chart1", 0, 0), 0);
}

#[test]
fn missing_dataset_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let access = DataAccess::new(DirectorySource::new(dir.path()), DashboardConfig::default());

    let err = block_on(access.load_measure("absent")).unwrap_err();
    assert!(!err.is_superseded());
    assert!(err.to_string().contains("absent.json"));
}
