//! Packet type codes.
//!
//! Request codes are sent by the host. Each request is answered by a packet
//! whose type is the request code plus a per-command offset; the offsets live
//! in the session crate's command table, not here.

/// Begin a print job.
pub const START_PRINT: u8 = 1;

/// Begin a page within a print job.
pub const START_PAGE_PRINT: u8 = 3;

/// Set page dimensions (height, width).
pub const SET_DIMENSION: u8 = 19;

/// Read the RFID tag of the loaded label roll.
pub const GET_RFID: u8 = 26;

/// Clear the print buffer.
pub const ALLOW_PRINT_CLEAR: u8 = 32;

/// Set print density.
pub const SET_LABEL_DENSITY: u8 = 33;

/// Set label type.
pub const SET_LABEL_TYPE: u8 = 35;

/// Query a device information key.
pub const GET_INFO: u8 = 64;

/// Toggle power-on / bluetooth sounds.
pub const SET_AUDIO_SETTING: u8 = 88;

/// Raster metadata (unused by the B-series flow).
pub const IMAGE_DATA_META: u8 = 132;

/// One raster row. Never answered.
pub const IMAGE_DATA: u8 = 133;

/// Run label-gap calibration.
pub const CALIBRATE_LABEL: u8 = 142;

/// Query page counter and progress.
pub const GET_PRINT_STATUS: u8 = 163;

/// Query door/paper/power state.
pub const GET_HEART_BEAT: u8 = 220;

/// Finish a page.
pub const END_PAGE_PRINT: u8 = 227;

/// Finish a print job.
pub const END_PRINT: u8 = 243;

/// Inbound only: the device rejected a value in the last request.
pub const VALUE_ERROR: u8 = 219;

/// Inbound only: the device does not implement the last request.
pub const UNIMPLEMENTED: u8 = 0;

/// Returns a human-readable name for a request or reserved code.
pub fn code_name(code: u8) -> &'static str {
    match code {
        UNIMPLEMENTED => "UNIMPLEMENTED",
        START_PRINT => "START_PRINT",
        START_PAGE_PRINT => "START_PAGE_PRINT",
        SET_DIMENSION => "SET_DIMENSION",
        GET_RFID => "GET_RFID",
        ALLOW_PRINT_CLEAR => "ALLOW_PRINT_CLEAR",
        SET_LABEL_DENSITY => "SET_LABEL_DENSITY",
        SET_LABEL_TYPE => "SET_LABEL_TYPE",
        GET_INFO => "GET_INFO",
        SET_AUDIO_SETTING => "SET_AUDIO_SETTING",
        IMAGE_DATA_META => "IMAGE_DATA_META",
        IMAGE_DATA => "IMAGE_DATA",
        CALIBRATE_LABEL => "CALIBRATE_LABEL",
        GET_PRINT_STATUS => "GET_PRINT_STATUS",
        VALUE_ERROR => "VALUE_ERROR",
        GET_HEART_BEAT => "GET_HEART_BEAT",
        END_PAGE_PRINT => "END_PAGE_PRINT",
        END_PRINT => "END_PRINT",
        _ => "UNKNOWN",
    }
}

/// Returns true if the code is one the device uses to signal a failed request.
pub fn is_error_code(code: u8) -> bool {
    code == VALUE_ERROR || code == UNIMPLEMENTED
}
