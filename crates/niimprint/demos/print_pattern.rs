//! Prints a test pattern and dumps the printer's state as JSON.
//!
//! Run with:
//!   cargo run --example print-pattern --features logging -- [PORT] [MODEL]
//!
//! Without PORT the first NIIMBOT port found is used. MODEL defaults to d110.

use std::time::Duration;

use niimprint::logging::{init_logging, LogFormat, LogLevel};
use niimprint::raster::GrayBitmap;
use niimprint::session::{HeartbeatVariant, PrintOptions, PrinterModel, Session};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogFormat::Text, LogLevel::Info);

    let mut args = std::env::args().skip(1);
    let port = args.next();
    let model: PrinterModel = args.next().as_deref().unwrap_or("d110").parse()?;

    let session = Session::open(port.as_deref())?;

    let heartbeat = session.get_heartbeat(HeartbeatVariant::default())?;
    eprintln!("heartbeat: {}", serde_json::to_string(&heartbeat)?);
    if let Some(tag) = session.get_rfid()? {
        eprintln!("label roll: {}", serde_json::to_string(&tag)?);
    }

    let label = checkerboard(model.max_width(), 80, 8);
    let options = PrintOptions::default()
        .with_model(model)
        .with_density(3)
        .with_status_polling(10, Duration::from_millis(300));
    let report = session.print(&label, &options)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    session.close();
    Ok(())
}

fn checkerboard(width: u32, height: u32, cell: u32) -> GrayBitmap {
    let mut bitmap = GrayBitmap::blank(width, height);
    for y in 0..height {
        for x in 0..width {
            if (x / cell + y / cell) % 2 == 0 {
                bitmap.set(x, y, 255);
            }
        }
    }
    bitmap
}
