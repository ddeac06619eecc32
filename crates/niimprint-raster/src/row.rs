use bytes::BufMut;

/// Size of the fixed row header that precedes the packed bits.
pub const ROW_HEADER_SIZE: usize = 6;

/// One bitmap row ready to be sent as an `IMAGE_DATA` payload.
///
/// Payload layout:
/// ```text
/// ┌───────────────┬──────┬───────┬──────────────┬──────────────────────┐
/// │ Row (u16 BE)  │ Left │ Right │ Repeat (u16) │ Bits (ceil(w/8) B)   │
/// └───────────────┴──────┴───────┴──────────────┴──────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterRow {
    pub row_index: u16,
    pub left_margin: u8,
    pub right_margin: u8,
    pub repeat_count: u16,
    pub bits: Vec<u8>,
}

impl RasterRow {
    /// Length of the serialized payload.
    pub fn payload_len(&self) -> usize {
        ROW_HEADER_SIZE + self.bits.len()
    }

    /// Append the header and bits to `dst`.
    pub fn encode_into(&self, dst: &mut impl BufMut) {
        dst.put_u16(self.row_index);
        dst.put_u8(self.left_margin);
        dst.put_u8(self.right_margin);
        dst.put_u16(self.repeat_count);
        dst.put_slice(&self.bits);
    }

    /// The serialized `IMAGE_DATA` payload.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.payload_len());
        self.encode_into(&mut payload);
        payload
    }
}
