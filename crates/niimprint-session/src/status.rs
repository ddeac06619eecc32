//! Decoders for the data of status-style responses.

use std::fmt;

use serde::Serialize;

use crate::command::InfoCode;
use crate::error::{Result, SessionError};

/// Page counter and progress reported by `GET_PRINT_STATUS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrintStatus {
    pub page: u16,
    pub progress1: u8,
    pub progress2: u8,
}

impl PrintStatus {
    /// Both progress counters have reached 100.
    pub fn is_complete(&self) -> bool {
        self.progress1 == 100 && self.progress2 == 100
    }
}

/// Parse `page:u16be, progress1:u8, progress2:u8`.
pub fn parse_print_status(data: &[u8]) -> Result<PrintStatus> {
    if data.len() < 4 {
        return Err(SessionError::malformed(
            "GET_PRINT_STATUS",
            format!("expected at least 4 bytes, got {}", data.len()),
        ));
    }
    Ok(PrintStatus {
        page: u16::from_be_bytes([data[0], data[1]]),
        progress1: data[2],
        progress2: data[3],
    })
}

/// A decoded `GET_INFO` value. The shape depends on the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InfoValue {
    /// Device serial number.
    Text(String),
    /// Software or hardware version as `major.minor`.
    Version(String),
    /// Model identifier.
    DeviceType(u16),
    /// Every other key.
    Byte(u8),
}

impl InfoValue {
    pub fn as_byte(&self) -> Option<u8> {
        match self {
            Self::Byte(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) | Self::Version(text) => f.write_str(text),
            Self::DeviceType(value) => write!(f, "{value}"),
            Self::Byte(value) => write!(f, "{value}"),
        }
    }
}

pub fn parse_info(key: InfoCode, data: &[u8]) -> Result<InfoValue> {
    let need = |n: usize| {
        if data.len() < n {
            Err(SessionError::malformed(
                "GET_INFO",
                format!("{key:?} needs {n} bytes, got {}", data.len()),
            ))
        } else {
            Ok(())
        }
    };

    match key {
        InfoCode::DeviceSerial => {
            need(1)?;
            let text = std::str::from_utf8(data)
                .map_err(|e| SessionError::malformed("GET_INFO", format!("serial: {e}")))?;
            Ok(InfoValue::Text(text.to_owned()))
        }
        InfoCode::SoftwareVersion | InfoCode::HardwareVersion => {
            need(2)?;
            Ok(InfoValue::Version(format!("{}.{}", data[0], data[1])))
        }
        InfoCode::DeviceType => {
            need(2)?;
            Ok(InfoValue::DeviceType(u16::from_be_bytes([data[0], data[1]])))
        }
        _ => {
            need(1)?;
            Ok(InfoValue::Byte(data[0]))
        }
    }
}

/// Door, paper, power and RFID state from `GET_HEART_BEAT`.
///
/// Firmware revisions answer with different layouts and no version field, so
/// the layout is chosen by the length of the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum Heartbeat {
    /// 7 bytes.
    Compact { door_open: bool, has_paper: bool },
    /// 9 bytes.
    Minimal { door_open: bool },
    /// 10 bytes.
    Basic { door_open: bool, power_level: u8 },
    /// 13 bytes.
    Standard {
        door_open: bool,
        power_level: u8,
        rfid_read_state: u8,
        has_paper: bool,
    },
    /// 19 bytes.
    Extended {
        door_open: bool,
        power_level: u8,
        has_paper: bool,
        rfid_read_state: u8,
    },
    /// 20 bytes.
    PaperRfid { has_paper: bool, rfid_read_state: u8 },
    /// A length with no known layout; the data is kept as received.
    UnknownVariant { len: usize, raw: Vec<u8> },
}

impl Heartbeat {
    pub fn door_open(&self) -> Option<bool> {
        match self {
            Self::Compact { door_open, .. }
            | Self::Minimal { door_open }
            | Self::Basic { door_open, .. }
            | Self::Standard { door_open, .. }
            | Self::Extended { door_open, .. } => Some(*door_open),
            Self::PaperRfid { .. } | Self::UnknownVariant { .. } => None,
        }
    }

    pub fn has_paper(&self) -> Option<bool> {
        match self {
            Self::Compact { has_paper, .. }
            | Self::Standard { has_paper, .. }
            | Self::Extended { has_paper, .. }
            | Self::PaperRfid { has_paper, .. } => Some(*has_paper),
            _ => None,
        }
    }

    pub fn power_level(&self) -> Option<u8> {
        match self {
            Self::Basic { power_level, .. }
            | Self::Standard { power_level, .. }
            | Self::Extended { power_level, .. } => Some(*power_level),
            _ => None,
        }
    }

    pub fn rfid_read_state(&self) -> Option<u8> {
        match self {
            Self::Standard {
                rfid_read_state, ..
            }
            | Self::Extended {
                rfid_read_state, ..
            }
            | Self::PaperRfid {
                rfid_read_state, ..
            } => Some(*rfid_read_state),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::UnknownVariant { .. })
    }
}

/// Pick the heartbeat layout by data length. Never fails.
pub fn parse_heartbeat(data: &[u8]) -> Heartbeat {
    let flag = |i: usize| data[i] != 0;

    match data.len() {
        7 => Heartbeat::Compact {
            door_open: flag(4),
            has_paper: flag(6),
        },
        9 => Heartbeat::Minimal { door_open: flag(8) },
        10 => Heartbeat::Basic {
            door_open: flag(8),
            power_level: data[9],
        },
        13 => Heartbeat::Standard {
            door_open: flag(9),
            power_level: data[10],
            rfid_read_state: data[11],
            has_paper: flag(12),
        },
        19 => Heartbeat::Extended {
            door_open: flag(15),
            power_level: data[16],
            has_paper: flag(17),
            rfid_read_state: data[18],
        },
        20 => Heartbeat::PaperRfid {
            has_paper: flag(18),
            rfid_read_state: data[19],
        },
        len => Heartbeat::UnknownVariant {
            len,
            raw: data.to_vec(),
        },
    }
}

/// The RFID tag of the loaded label roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RfidTag {
    /// First 8 bytes as lowercase hex.
    pub uuid: String,
    pub barcode: String,
    pub serial: String,
    pub total_length: u16,
    pub used_length: u16,
    pub tag_type: u8,
}

impl RfidTag {
    pub fn remaining_length(&self) -> u16 {
        self.total_length.saturating_sub(self.used_length)
    }
}

/// Parse a `GET_RFID` response. A leading zero byte means no tag.
pub fn parse_rfid(data: &[u8]) -> Result<Option<RfidTag>> {
    match data.first().copied() {
        None => return Err(SessionError::malformed("GET_RFID", "empty response")),
        Some(0) => return Ok(None),
        Some(_) => {}
    }

    let mut cursor = Cursor { data, pos: 0 };
    let uuid = cursor
        .take(8, "uuid")?
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();
    let barcode = cursor.string("barcode")?;
    let serial = cursor.string("serial")?;
    let total_length = cursor.u16("total length")?;
    let used_length = cursor.u16("used length")?;
    let tag_type = cursor.take(1, "tag type")?[0];

    Ok(Some(RfidTag {
        uuid,
        barcode,
        serial,
        total_length,
        used_length,
        tag_type,
    }))
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize, field: &str) -> Result<&'a [u8]> {
        let end = self.pos + n;
        let bytes = self.data.get(self.pos..end).ok_or_else(|| {
            SessionError::malformed(
                "GET_RFID",
                format!(
                    "{field} needs bytes {}..{end}, response has {}",
                    self.pos,
                    self.data.len()
                ),
            )
        })?;
        self.pos = end;
        Ok(bytes)
    }

    fn u16(&mut self, field: &str) -> Result<u16> {
        let bytes = self.take(2, field)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn string(&mut self, field: &str) -> Result<String> {
        let len = self.take(1, field)?[0] as usize;
        let bytes = self.take(len, field)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| SessionError::malformed("GET_RFID", format!("{field}: {e}")))
    }
}
