use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use niimprint_frame::codes;
use niimprint_raster::{Bitmap, MarginMode, RasterOptions, Rasterizer};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::command::InfoCode;
use crate::commands::{DENSITY_RANGE, LABEL_TYPE_RANGE};
use crate::error::{Result, SessionError};
use crate::session::Session;
use crate::status::{InfoValue, PrintStatus};

/// Supported printer models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterModel {
    B1,
    B18,
    B21,
    D11,
    D110,
}

impl PrinterModel {
    pub const ALL: [PrinterModel; 5] = [Self::B1, Self::B18, Self::B21, Self::D11, Self::D110];

    /// Printhead width in pixels.
    pub fn max_width(self) -> u32 {
        match self {
            Self::B1 | Self::B18 | Self::B21 => 384,
            Self::D11 | Self::D110 => 96,
        }
    }

    pub fn max_density(self) -> u8 {
        match self {
            Self::B18 | Self::D11 | Self::D110 => 3,
            Self::B1 | Self::B21 => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::B1 => "b1",
            Self::B18 => "b18",
            Self::B21 => "b21",
            Self::D11 => "d11",
            Self::D110 => "d110",
        }
    }
}

impl fmt::Display for PrinterModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PrinterModel {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|model| model.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SessionError::InvalidArgument(format!("unknown printer model '{s}'")))
    }
}

/// The ten steps of a print job, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintStep {
    SetDensity,
    SetLabelType,
    QueryDeviceType,
    StartPrint,
    StartPagePrint,
    SetDimensions,
    SendImageData,
    EndPagePrint,
    PollStatus,
    EndPrint,
}

impl PrintStep {
    /// 1-based position in the job.
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SetDensity => "set density",
            Self::SetLabelType => "set label type",
            Self::QueryDeviceType => "query device type",
            Self::StartPrint => "start print",
            Self::StartPagePrint => "start page print",
            Self::SetDimensions => "set dimensions",
            Self::SendImageData => "send image data",
            Self::EndPagePrint => "end page print",
            Self::PollStatus => "poll status",
            Self::EndPrint => "end print",
        }
    }
}

impl fmt::Display for PrintStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.name())
    }
}

/// Print job settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintOptions {
    /// 1-5; clamped to the model's limit when `model` is set.
    pub density: u8,
    /// 1-3.
    pub label_type: u8,
    /// Ask for the device type before starting. Some firmware expects it.
    pub query_device_type: bool,
    pub status_poll_attempts: u32,
    pub status_poll_interval: Duration,
    /// When set, the bitmap width and density are checked against the model.
    pub model: Option<PrinterModel>,
    pub margin_mode: MarginMode,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            density: 5,
            label_type: 1,
            query_device_type: true,
            status_poll_attempts: 5,
            status_poll_interval: Duration::from_millis(500),
            model: None,
            margin_mode: MarginMode::Computed,
        }
    }
}

impl PrintOptions {
    pub fn with_density(mut self, density: u8) -> Self {
        self.density = density;
        self
    }

    pub fn with_label_type(mut self, label_type: u8) -> Self {
        self.label_type = label_type;
        self
    }

    pub fn with_query_device_type(mut self, query_device_type: bool) -> Self {
        self.query_device_type = query_device_type;
        self
    }

    pub fn with_status_polling(mut self, attempts: u32, interval: Duration) -> Self {
        self.status_poll_attempts = attempts;
        self.status_poll_interval = interval;
        self
    }

    pub fn with_model(mut self, model: PrinterModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_margin_mode(mut self, margin_mode: MarginMode) -> Self {
        self.margin_mode = margin_mode;
        self
    }
}

/// What a completed print job did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintReport {
    pub width: u32,
    pub height: u32,
    /// Density actually sent, after any model clamp.
    pub density: u8,
    pub device_type: Option<u16>,
    pub rows_sent: usize,
    /// Last status seen while polling, if any poll was made.
    pub final_status: Option<PrintStatus>,
    /// Whether polling saw both progress counters reach 100.
    pub completed: bool,
}

fn at(step: PrintStep) -> impl FnOnce(SessionError) -> SessionError {
    move |err| SessionError::PrintStep {
        step,
        source: Box::new(err),
    }
}

impl<T: Read + Write + Send> Session<T> {
    /// Print one page.
    ///
    /// Steps run in a fixed order and the first failure aborts the job,
    /// tagged with its [`PrintStep`]. The session stays open either way.
    /// Status polling never fails the job for lack of progress; it only
    /// stops early once the device reports completion.
    pub fn print<B: Bitmap>(&self, bitmap: B, options: &PrintOptions) -> Result<PrintReport> {
        let width = bitmap.width();
        let height = bitmap.height();
        let density = self.check_job(width, options)?;

        let rasterizer = Rasterizer::new(
            bitmap,
            RasterOptions::default().with_margin_mode(options.margin_mode),
        )?;
        let (Ok(page_width), Ok(page_height)) = (u16::try_from(width), u16::try_from(height))
        else {
            return Err(SessionError::InvalidArgument(format!(
                "page {width}x{height} does not fit 16-bit dimensions"
            )));
        };

        info!(width, height, density, "starting print job");

        self.set_label_density(density)
            .map_err(at(PrintStep::SetDensity))?;
        self.set_label_type(options.label_type)
            .map_err(at(PrintStep::SetLabelType))?;

        let device_type = if options.query_device_type {
            match self
                .get_info(InfoCode::DeviceType)
                .map_err(at(PrintStep::QueryDeviceType))?
            {
                InfoValue::DeviceType(device_type) => Some(device_type),
                _ => None,
            }
        } else {
            None
        };

        self.start_print().map_err(at(PrintStep::StartPrint))?;
        self.start_page_print()
            .map_err(at(PrintStep::StartPagePrint))?;
        self.set_dimensions(page_width, page_height)
            .map_err(at(PrintStep::SetDimensions))?;

        let rows_sent = self
            .send_raw_all(
                codes::IMAGE_DATA,
                rasterizer.rows().map(|row| row.to_payload()),
            )
            .map_err(at(PrintStep::SendImageData))?;
        debug!(rows_sent, "image data sent");

        self.end_page_print()
            .map_err(at(PrintStep::EndPagePrint))?;

        let mut final_status = None;
        let mut completed = false;
        for attempt in 0..options.status_poll_attempts {
            if attempt > 0 {
                thread::sleep(options.status_poll_interval);
            }
            let status = self
                .get_print_status()
                .map_err(at(PrintStep::PollStatus))?;
            debug!(
                page = status.page,
                progress1 = status.progress1,
                progress2 = status.progress2,
                "print progress"
            );
            final_status = Some(status);
            if status.is_complete() {
                completed = true;
                break;
            }
        }
        if !completed {
            warn!(?final_status, "print status never reached completion");
        }

        self.end_print().map_err(at(PrintStep::EndPrint))?;
        info!(rows_sent, "print job finished");

        Ok(PrintReport {
            width,
            height,
            density,
            device_type,
            rows_sent,
            final_status,
            completed,
        })
    }

    /// Validate options against the model before anything is sent.
    /// Returns the density to use.
    fn check_job(&self, width: u32, options: &PrintOptions) -> Result<u8> {
        if !DENSITY_RANGE.contains(&options.density) {
            return Err(SessionError::InvalidArgument(format!(
                "density must be 1-5, got {}",
                options.density
            )));
        }

        if !LABEL_TYPE_RANGE.contains(&options.label_type) {
            return Err(SessionError::InvalidArgument(format!(
                "label type must be 1-3, got {}",
                options.label_type
            )));
        }

        let Some(model) = options.model else {
            return Ok(options.density);
        };

        if width > model.max_width() {
            return Err(SessionError::InvalidArgument(format!(
                "image is {width} px wide, {model} prints at most {} px",
                model.max_width()
            )));
        }

        if options.density > model.max_density() {
            warn!(
                %model,
                requested = options.density,
                max = model.max_density(),
                "clamping density to model limit"
            );
            return Ok(model.max_density());
        }
        Ok(options.density)
    }
}
