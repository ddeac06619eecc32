use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use niimprint::frame::{codes, encode, FrameReassembler, Packet};
use niimprint::raster::{rasterize, GrayBitmap, RasterOptions};
use niimprint::session::{PrintOptions, Session, SessionConfig};

/// Answers every request the way a healthy B21 does and records what it saw.
#[derive(Clone, Default)]
struct Printer {
    inner: Arc<Mutex<(FrameReassembler, VecDeque<u8>, Vec<Packet>)>>,
}

impl Printer {
    fn requests(&self) -> Vec<Packet> {
        self.inner.lock().unwrap().2.clone()
    }
}

fn response(request: &Packet) -> Option<(u8, Vec<u8>)> {
    let code = request.packet_type();
    match code {
        codes::IMAGE_DATA => None,
        codes::GET_INFO => Some((code + request.data()[0], vec![0x01, 0x00])),
        codes::SET_LABEL_DENSITY | codes::SET_LABEL_TYPE => Some((code + 16, vec![1])),
        codes::GET_PRINT_STATUS => Some((code + 16, vec![0, 1, 100, 100])),
        _ => Some((code + 1, vec![1])),
    }
}

impl Read for Printer {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        let outbound = &mut inner.1;
        if outbound.is_empty() {
            return Err(ErrorKind::TimedOut.into());
        }
        let n = buf.len().min(outbound.len());
        for (slot, byte) in buf.iter_mut().zip(outbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for Printer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        let (reassembler, outbound, requests) = &mut *inner;
        for request in reassembler.feed(buf) {
            if let Some((code, data)) = response(&request) {
                outbound.extend(encode(code, &data).unwrap().iter().copied());
            }
            requests.push(request);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn label() -> GrayBitmap {
    let mut luma = vec![255u8; 20 * 6];
    for y in 0..6 {
        luma[y * 20 + 3 + y] = 0;
        luma[y * 20 + 15] = 0;
    }
    GrayBitmap::from_luma(20, 6, luma).expect("buffer should match dimensions")
}

#[test]
fn print_sends_rasterizer_rows_verbatim() {
    let printer = Printer::default();
    let session = Session::with_config(
        printer.clone(),
        SessionConfig::default().with_response_interval(Duration::from_millis(1)),
    );

    let report = session
        .print(
            &label(),
            &PrintOptions::default().with_status_polling(3, Duration::from_millis(1)),
        )
        .expect("print should succeed");

    let expected: Vec<Vec<u8>> = rasterize(&label(), RasterOptions::default())
        .expect("label should rasterize")
        .iter()
        .map(|row| row.to_payload())
        .collect();
    let sent: Vec<Vec<u8>> = printer
        .requests()
        .iter()
        .filter(|p| p.packet_type() == codes::IMAGE_DATA)
        .map(|p| p.data().to_vec())
        .collect();

    assert_eq!(sent, expected);
    // 20 px wide pads to 3 bytes per row.
    assert!(sent.iter().all(|row| row.len() == 9));
    assert_eq!(report.rows_sent, 6);
    assert_eq!(report.device_type, Some(256));
    assert!(report.completed);

    session.close();
    assert!(!session.is_open());
}

#[test]
fn report_serializes_to_json() {
    let printer = Printer::default();
    let session = Session::with_config(
        printer,
        SessionConfig::default().with_response_interval(Duration::from_millis(1)),
    );

    let report = session
        .print(
            &label(),
            &PrintOptions::default()
                .with_query_device_type(false)
                .with_status_polling(1, Duration::ZERO),
        )
        .expect("print should succeed");

    let json = serde_json::to_value(&report).expect("report should serialize");
    assert_eq!(json["width"], 20);
    assert_eq!(json["height"], 6);
    assert_eq!(json["density"], 5);
    assert_eq!(json["device_type"], serde_json::Value::Null);
    assert_eq!(json["final_status"]["progress1"], 100);
    assert_eq!(json["completed"], true);
}
