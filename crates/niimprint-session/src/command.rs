//! The command table.
//!
//! Every request the session can issue is described by one [`Command`]
//! variant. The variant knows its request code, the offset that turns the
//! request code into the expected response code, and a name for logs and
//! errors. Nothing else in the crate hard-codes response codes.

use std::fmt;

use niimprint_frame::codes;
use serde::Serialize;

/// Static description of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub request_code: u8,
    /// `None` for fire-and-forget requests the device never answers.
    pub response_offset: Option<i16>,
}

impl CommandDescriptor {
    pub const fn new(name: &'static str, request_code: u8, response_offset: i16) -> Self {
        Self {
            name,
            request_code,
            response_offset: Some(response_offset),
        }
    }

    pub const fn unanswered(name: &'static str, request_code: u8) -> Self {
        Self {
            name,
            request_code,
            response_offset: None,
        }
    }

    /// Response code the device answers with, wrapping modulo 256.
    pub fn expected_response(&self) -> Option<u8> {
        self.response_offset
            .map(|offset| (i16::from(self.request_code) + offset).rem_euclid(256) as u8)
    }
}

/// Device information keys for `GET_INFO`.
///
/// The key doubles as the response offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum InfoCode {
    Density = 1,
    PrintSpeed = 2,
    LabelType = 3,
    LanguageType = 6,
    AutoShutdownTime = 7,
    DeviceType = 8,
    SoftwareVersion = 9,
    Battery = 10,
    DeviceSerial = 11,
    HardwareVersion = 12,
}

impl InfoCode {
    pub const ALL: [InfoCode; 10] = [
        InfoCode::Density,
        InfoCode::PrintSpeed,
        InfoCode::LabelType,
        InfoCode::LanguageType,
        InfoCode::AutoShutdownTime,
        InfoCode::DeviceType,
        InfoCode::SoftwareVersion,
        InfoCode::Battery,
        InfoCode::DeviceSerial,
        InfoCode::HardwareVersion,
    ];

    pub fn key(self) -> u8 {
        self as u8
    }

    pub fn from_key(key: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.key() == key)
    }
}

/// Firmware-dependent flavours of `GET_HEART_BEAT`.
///
/// The variant is sent as the request payload and selects the response code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeartbeatVariant {
    V1,
    V2,
    V3,
    #[default]
    V4,
}

impl HeartbeatVariant {
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            3 => Some(Self::V3),
            4 => Some(Self::V4),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
            Self::V4 => 4,
        }
    }

    fn response_offset(self) -> i16 {
        match self {
            Self::V1 => 1,
            Self::V2 => 3,
            Self::V3 => 2,
            Self::V4 => -3,
        }
    }
}

/// Label stock to calibrate the gap sensor against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CalibrationLabel {
    Gap = 1,
    Black = 2,
    Transparent = 5,
}

/// Every request the session knows how to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartPrint,
    StartPagePrint,
    SetDimension,
    GetRfid,
    SetLabelDensity,
    SetLabelType,
    GetInfo(InfoCode),
    SetAudioSetting,
    ImageData,
    CalibrateLabel,
    GetPrintStatus,
    GetHeartbeat(HeartbeatVariant),
    EndPagePrint,
    EndPrint,
}

impl Command {
    pub fn descriptor(self) -> CommandDescriptor {
        use CommandDescriptor as D;

        match self {
            Self::StartPrint => D::new("START_PRINT", codes::START_PRINT, 1),
            Self::StartPagePrint => D::new("START_PAGE_PRINT", codes::START_PAGE_PRINT, 1),
            Self::SetDimension => D::new("SET_DIMENSION", codes::SET_DIMENSION, 1),
            Self::GetRfid => D::new("GET_RFID", codes::GET_RFID, 1),
            Self::SetLabelDensity => D::new("SET_LABEL_DENSITY", codes::SET_LABEL_DENSITY, 16),
            Self::SetLabelType => D::new("SET_LABEL_TYPE", codes::SET_LABEL_TYPE, 16),
            Self::GetInfo(key) => D::new("GET_INFO", codes::GET_INFO, i16::from(key.key())),
            Self::SetAudioSetting => D::new("SET_AUDIO_SETTING", codes::SET_AUDIO_SETTING, 1),
            Self::ImageData => D::unanswered("IMAGE_DATA", codes::IMAGE_DATA),
            Self::CalibrateLabel => D::new("CALIBRATE_LABEL", codes::CALIBRATE_LABEL, 1),
            Self::GetPrintStatus => D::new("GET_PRINT_STATUS", codes::GET_PRINT_STATUS, 16),
            Self::GetHeartbeat(variant) => D::new(
                "GET_HEART_BEAT",
                codes::GET_HEART_BEAT,
                variant.response_offset(),
            ),
            Self::EndPagePrint => D::new("END_PAGE_PRINT", codes::END_PAGE_PRINT, 1),
            Self::EndPrint => D::new("END_PRINT", codes::END_PRINT, 1),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().name)
    }
}
