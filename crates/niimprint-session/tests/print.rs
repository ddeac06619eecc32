mod common;

use std::time::Duration;

use common::{MockPrinter, Reply};
use niimprint_frame::codes;
use niimprint_raster::{GrayBitmap, MarginMode};
use niimprint_session::{
    PrintOptions, PrintStep, PrinterModel, Session, SessionConfig, SessionError,
};

fn fast_session(printer: &MockPrinter) -> Session<MockPrinter> {
    Session::with_config(
        printer.clone(),
        SessionConfig::default().with_response_interval(Duration::from_millis(1)),
    )
}

fn fast_options() -> PrintOptions {
    PrintOptions::default()
        .with_density(3)
        .with_status_polling(5, Duration::from_millis(1))
}

fn stripes(width: u32, height: u32) -> GrayBitmap {
    let mut bitmap = GrayBitmap::blank(width, height);
    for y in 0..height {
        for x in (y % 2..width).step_by(2) {
            bitmap.set(x, y, 255);
        }
    }
    bitmap
}

#[test]
fn print_runs_every_step_in_order() {
    let printer = MockPrinter::new();
    let session = fast_session(&printer);
    let bitmap = stripes(16, 4);

    let report = session
        .print(&bitmap, &fast_options())
        .expect("print should succeed");

    let mut expected = vec![
        codes::SET_LABEL_DENSITY,
        codes::SET_LABEL_TYPE,
        codes::GET_INFO,
        codes::START_PRINT,
        codes::START_PAGE_PRINT,
        codes::SET_DIMENSION,
    ];
    expected.extend([codes::IMAGE_DATA; 4]);
    expected.extend([
        codes::END_PAGE_PRINT,
        codes::GET_PRINT_STATUS,
        codes::END_PRINT,
    ]);
    assert_eq!(printer.request_codes(), expected);

    assert_eq!(report.rows_sent, 4);
    assert_eq!(report.density, 3);
    assert_eq!(report.device_type, Some(512));
    assert!(report.completed);
}

#[test]
fn image_rows_carry_headers_and_bits() {
    let printer = MockPrinter::new();
    let session = fast_session(&printer);
    let bitmap = stripes(16, 3);

    session.print(&bitmap, &fast_options()).unwrap();

    let requests = printer.requests();
    let dimensions = requests
        .iter()
        .find(|p| p.packet_type() == codes::SET_DIMENSION)
        .unwrap();
    assert_eq!(dimensions.data().as_ref(), &[0, 3, 0, 16]);

    let rows: Vec<_> = requests
        .iter()
        .filter(|p| p.packet_type() == codes::IMAGE_DATA)
        .map(|p| p.data().to_vec())
        .collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], vec![0, 0, 0, 1, 0, 1, 0xAA, 0xAA]);
    assert_eq!(rows[1], vec![0, 1, 1, 0, 0, 1, 0x55, 0x55]);
    assert_eq!(rows[2][..2], [0, 2]);
}

#[test]
fn status_polling_stops_at_completion() {
    let printer = MockPrinter::new();
    printer.script_progress(&[(10, 0), (100, 50)]);
    let session = fast_session(&printer);

    let report = session.print(&stripes(8, 2), &fast_options()).unwrap();

    let polls = printer
        .request_codes()
        .iter()
        .filter(|code| **code == codes::GET_PRINT_STATUS)
        .count();
    assert_eq!(polls, 3);
    assert!(report.completed);
}

#[test]
fn status_polling_never_fails_the_job() {
    let printer = MockPrinter::new();
    printer.script_progress(&[(10, 0); 5]);
    let session = fast_session(&printer);

    let report = session.print(&stripes(8, 2), &fast_options()).unwrap();

    assert!(!report.completed);
    assert_eq!(report.final_status.map(|s| s.progress1), Some(10));
    assert_eq!(printer.request_codes().last(), Some(&codes::END_PRINT));
}

#[test]
fn failing_step_is_reported() {
    let printer = MockPrinter::new();
    printer.reply_once(codes::START_PAGE_PRINT, Reply::Packets(vec![(219, vec![])]));
    let session = fast_session(&printer);

    let err = session.print(&stripes(8, 2), &fast_options()).unwrap_err();

    match &err {
        SessionError::PrintStep { step, source } => {
            assert_eq!(*step, PrintStep::StartPagePrint);
            assert!(matches!(**source, SessionError::DeviceRejected { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(err.root(), SessionError::DeviceRejected { .. }));
    assert!(!printer.request_codes().contains(&codes::IMAGE_DATA));
    assert!(session.is_open());
}

#[test]
fn device_type_query_is_optional() {
    let printer = MockPrinter::new();
    let session = fast_session(&printer);

    let report = session
        .print(&stripes(8, 1), &fast_options().with_query_device_type(false))
        .unwrap();

    assert_eq!(report.device_type, None);
    assert!(!printer.request_codes().contains(&codes::GET_INFO));
}

#[test]
fn model_rejects_wide_bitmap_before_sending() {
    let printer = MockPrinter::new();
    let session = fast_session(&printer);

    let err = session
        .print(
            &GrayBitmap::blank(120, 2),
            &fast_options().with_model(PrinterModel::D110),
        )
        .unwrap_err();

    assert!(matches!(err, SessionError::InvalidArgument(_)));
    assert!(printer.requests().is_empty());
}

#[test]
fn model_clamps_density() {
    let printer = MockPrinter::new();
    let session = fast_session(&printer);

    let report = session
        .print(
            &stripes(96, 2),
            &fast_options().with_density(5).with_model(PrinterModel::B18),
        )
        .unwrap();

    assert_eq!(report.density, 3);
    assert_eq!(printer.requests()[0].data().as_ref(), &[3]);
}

#[test]
fn zeroed_margins() {
    let printer = MockPrinter::new();
    let session = fast_session(&printer);

    session
        .print(
            &GrayBitmap::blank(16, 1),
            &fast_options().with_margin_mode(MarginMode::Zeroed),
        )
        .unwrap();

    let row = printer
        .requests()
        .into_iter()
        .find(|p| p.packet_type() == codes::IMAGE_DATA)
        .unwrap();
    assert_eq!(row.data()[2..4], [0, 0]);
}

#[test]
fn oversized_bitmap_is_a_raster_error() {
    let printer = MockPrinter::new();
    let session = fast_session(&printer);

    let err = session
        .print(&GrayBitmap::blank(600, 1), &fast_options())
        .unwrap_err();

    assert!(matches!(err, SessionError::Raster(_)));
    assert!(printer.requests().is_empty());
}
