use std::io::{Read, Write};

use niimprint_frame::Packet;
use tracing::debug;

use crate::command::{CalibrationLabel, Command, HeartbeatVariant, InfoCode};
use crate::error::{Result, SessionError};
use crate::session::Session;
use crate::status::{
    parse_heartbeat, parse_info, parse_print_status, parse_rfid, Heartbeat, InfoValue,
    PrintStatus, RfidTag,
};

/// Valid `SET_LABEL_DENSITY` values.
pub const DENSITY_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Valid `SET_LABEL_TYPE` values.
pub const LABEL_TYPE_RANGE: std::ops::RangeInclusive<u8> = 1..=3;

/// Most set/start/end commands answer with a single status byte; non-zero
/// means the device accepted the request.
fn accepted(packet: &Packet) -> bool {
    packet.data().first().is_some_and(|b| *b != 0)
}

impl<T: Read + Write + Send> Session<T> {
    fn simple(&self, command: Command, payload: &[u8]) -> Result<bool> {
        let packet = self.request(command, payload)?;
        let ok = accepted(&packet);
        debug!(%command, accepted = ok, "command acknowledged");
        Ok(ok)
    }

    pub fn get_info(&self, key: InfoCode) -> Result<InfoValue> {
        let packet = self.request(Command::GetInfo(key), &[key.key()])?;
        parse_info(key, packet.data())
    }

    pub fn get_label_density(&self) -> Result<u8> {
        match self.get_info(InfoCode::Density)? {
            InfoValue::Byte(density) => Ok(density),
            other => Err(SessionError::malformed(
                "GET_INFO",
                format!("density decoded as {other:?}"),
            )),
        }
    }

    pub fn set_label_density(&self, density: u8) -> Result<bool> {
        if !DENSITY_RANGE.contains(&density) {
            return Err(SessionError::InvalidArgument(format!(
                "density must be 1-5, got {density}"
            )));
        }
        self.simple(Command::SetLabelDensity, &[density])
    }

    pub fn set_label_type(&self, label_type: u8) -> Result<bool> {
        if !LABEL_TYPE_RANGE.contains(&label_type) {
            return Err(SessionError::InvalidArgument(format!(
                "label type must be 1-3, got {label_type}"
            )));
        }
        self.simple(Command::SetLabelType, &[label_type])
    }

    pub fn start_print(&self) -> Result<bool> {
        self.simple(Command::StartPrint, &[1])
    }

    pub fn end_print(&self) -> Result<bool> {
        self.simple(Command::EndPrint, &[1])
    }

    pub fn start_page_print(&self) -> Result<bool> {
        self.simple(Command::StartPagePrint, &[1])
    }

    pub fn end_page_print(&self) -> Result<bool> {
        self.simple(Command::EndPagePrint, &[1])
    }

    /// Payload is height first, then width, both big-endian.
    pub fn set_dimensions(&self, width: u16, height: u16) -> Result<bool> {
        let [h0, h1] = height.to_be_bytes();
        let [w0, w1] = width.to_be_bytes();
        self.simple(Command::SetDimension, &[h0, h1, w0, w1])
    }

    pub fn get_print_status(&self) -> Result<PrintStatus> {
        let packet = self.request(Command::GetPrintStatus, &[1])?;
        parse_print_status(packet.data())
    }

    pub fn get_heartbeat(&self, variant: HeartbeatVariant) -> Result<Heartbeat> {
        let packet = self.request(Command::GetHeartbeat(variant), &[variant.number()])?;
        let heartbeat = parse_heartbeat(packet.data());
        if heartbeat.is_unknown() {
            debug!(len = packet.data().len(), "heartbeat layout not recognised");
        }
        Ok(heartbeat)
    }

    /// `None` when no tagged roll is loaded.
    pub fn get_rfid(&self) -> Result<Option<RfidTag>> {
        let packet = self.request(Command::GetRfid, &[1])?;
        parse_rfid(packet.data())
    }

    pub fn set_power_sound(&self, enabled: bool) -> Result<bool> {
        self.simple(Command::SetAudioSetting, &[1, 2, u8::from(enabled)])
    }

    pub fn set_bluetooth_sound(&self, enabled: bool) -> Result<bool> {
        self.simple(Command::SetAudioSetting, &[1, 1, u8::from(enabled)])
    }

    pub fn calibrate_label(&self, label: CalibrationLabel) -> Result<bool> {
        self.simple(Command::CalibrateLabel, &[label as u8])
    }
}
