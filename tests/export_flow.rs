use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use transview::app::controller::RenderedView;
use transview::app::state::ModeEvent;
use transview::export::{DirectorySink, ExportError, ExportStage};
use transview::{ExportConfig, NoticeLevel, Occupation, ResultsController, ResultsProps, Transition};

fn quiet_config() -> ExportConfig {
    ExportConfig {
        load_system_fonts: false,
        ..ExportConfig::default()
    }
}

fn transitions() -> Vec<Transition> {
    vec![
        Transition::new("11-1011", "13-2011", "Accountants and Auditors", 0.31),
        Transition::new("11-1011", "11-3031", "Financial Managers", 0.22),
        Transition::new("11-1011", "11-2021", "Marketing Managers", 0.12),
        Transition::new("11-1011", "41-3031", "Securities Sales Agents", 0.08),
    ]
}

fn treemap_controller(records: Vec<Transition>) -> ResultsController {
    let mut controller = ResultsController::with_defaults(quiet_config()).unwrap();
    controller.set_props(ResultsProps {
        selected_occupation: Some(Occupation::new("11-1011", "Chief Executives")),
        transitions: records.into(),
        ..ResultsProps::default()
    });
    controller.handle_event(ModeEvent::TreemapRequested);
    controller
}

#[test]
fn treemap_export_writes_treemap_pdf() {
    let dir = TempDir::new().unwrap();
    let sink = DirectorySink::new(dir.path());
    let mut controller = treemap_controller(transitions());

    assert!(matches!(controller.render(), RenderedView::Treemap { .. }));
    let report = controller.export(&sink).unwrap();

    assert_eq!(report.path, dir.path().join("treemap.pdf"));
    let bytes = fs::read(&report.path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(bytes.len(), report.bytes);
    assert_eq!(controller.scene().attached_surfaces(), 0);

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1, "only the document is left behind");

    // The 1020x768 RGB raster is embedded Flate-compressed
    assert!(bytes.len() < 1020 * 768 * 3 / 4, "{} bytes", bytes.len());
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    let image = doc
        .objects
        .values()
        .find_map(|object| match object {
            lopdf::Object::Stream(stream)
                if stream.dict.get(b"Subtype").and_then(lopdf::Object::as_name).ok() == Some(b"Image".as_slice()) =>
            {
                Some(stream)
            }
            _ => None,
        })
        .expect("document embeds the treemap raster");
    assert_eq!(image.dict.get(b"Width").and_then(lopdf::Object::as_i64).unwrap(), 1020);
    assert_eq!(image.dict.get(b"Height").and_then(lopdf::Object::as_i64).unwrap(), 768);
}

#[test]
fn exporting_twice_overwrites_with_an_independent_document() {
    let dir = TempDir::new().unwrap();
    let sink = DirectorySink::new(dir.path());
    let mut controller = treemap_controller(transitions());
    controller.render();

    let first = controller.export(&sink).unwrap();
    let second = controller.export(&sink).unwrap();

    assert_eq!(first.path, second.path);
    assert_eq!(controller.take_notices().len(), 2);
}

#[test]
fn single_record_treemap_exports() {
    let dir = TempDir::new().unwrap();
    let sink = DirectorySink::new(dir.path());
    let mut controller =
        treemap_controller(vec![Transition::new("11-1011", "13-2011", "Accountants", 1.0)]);

    controller.render();
    assert!(controller.export(&sink).is_ok());
}

#[test]
fn export_without_rendered_treemap_fails_loudly() {
    let dir = TempDir::new().unwrap();
    let sink = DirectorySink::new(dir.path());
    let mut controller = treemap_controller(transitions());

    let err = controller.export(&sink).unwrap_err();

    assert!(matches!(err, ExportError::GraphicNotFound { .. }));
    assert_eq!(err.stage(), ExportStage::Locate);
    assert!(!dir.path().join("treemap.pdf").exists());

    let notices = controller.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[test]
fn persist_failure_does_not_disturb_the_view() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("occupied");
    fs::write(&blocker, b"not a directory").unwrap();
    let sink = DirectorySink::new(&blocker);
    let mut controller = treemap_controller(transitions());
    controller.render();

    let err = controller.export(&sink).unwrap_err();
    assert_eq!(err.stage(), ExportStage::Persist);
    assert_eq!(controller.scene().attached_surfaces(), 0);

    // The view keeps rendering normally afterwards
    assert!(matches!(controller.render(), RenderedView::Treemap { .. }));
}

#[test]
fn caller_batch_is_never_mutated_by_the_matrix_path() {
    let batch: Arc<[Transition]> = transitions().into();
    let snapshot = batch.to_vec();
    let mut controller = ResultsController::with_defaults(quiet_config()).unwrap();
    controller.set_props(ResultsProps {
        selected_occupation: Some(Occupation::new("11-1011", "Chief Executives")),
        transitions: Arc::clone(&batch),
        ..ResultsProps::default()
    });

    // The default table sorts its rows in place
    let RenderedView::Matrix(table) = controller.render() else {
        panic!("expected the matrix view");
    };
    assert!(table.contains("Accountants and Auditors"));

    assert_eq!(&batch[..], snapshot.as_slice());
    assert_eq!(controller.copies_made(), 1);
}
