#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::{ErrorKind, Read, Write};
use std::sync::{Arc, Mutex};

use niimprint_frame::{codes, encode, FrameReassembler, Packet};

/// How the mock answers one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// The response a healthy printer would send.
    Default,
    /// Exactly these `(type, data)` packets, in order.
    Packets(Vec<(u8, Vec<u8>)>),
    /// Nothing at all.
    Silent,
}

#[derive(Default)]
struct State {
    inbound: FrameReassembler,
    outbound: VecDeque<u8>,
    requests: Vec<Packet>,
    overrides: HashMap<u8, VecDeque<Reply>>,
    silent: Vec<u8>,
    flushes: usize,
    reads: usize,
    status_progress: VecDeque<(u8, u8)>,
}

/// An in-memory printer speaking the wire protocol.
///
/// Reads with nothing pending fail with `TimedOut`, the way a serial port
/// with a read timeout does.
#[derive(Clone, Default)]
pub struct MockPrinter {
    state: Arc<Mutex<State>>,
}

impl MockPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a one-shot reply for the next request with `code`.
    pub fn reply_once(&self, code: u8, reply: Reply) {
        self.lock().overrides.entry(code).or_default().push_back(reply);
    }

    /// Never answer requests with `code`.
    pub fn silence(&self, code: u8) {
        self.lock().silent.push(code);
    }

    /// Progress values reported by successive status polls; afterwards 100/100.
    pub fn script_progress(&self, progress: &[(u8, u8)]) {
        self.lock().status_progress.extend(progress.iter().copied());
    }

    /// Bytes the host will read before any reply.
    pub fn inject(&self, bytes: &[u8]) {
        self.lock().outbound.extend(bytes.iter().copied());
    }

    pub fn requests(&self) -> Vec<Packet> {
        self.lock().requests.clone()
    }

    pub fn request_codes(&self) -> Vec<u8> {
        self.requests().iter().map(|p| p.packet_type()).collect()
    }

    pub fn flushes(&self) -> usize {
        self.lock().flushes
    }

    /// Number of `read` calls the host has made, including empty ones.
    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

fn default_reply(state: &mut State, request: &Packet) -> Vec<(u8, Vec<u8>)> {
    let code = request.packet_type();
    let arg = request.data().first().copied().unwrap_or(0);
    match code {
        codes::IMAGE_DATA => vec![],
        codes::GET_INFO => {
            let data = match arg {
                8 => vec![0x02, 0x00],
                9 | 12 => vec![1, 2],
                11 => b"SN123".to_vec(),
                _ => vec![3],
            };
            vec![(codes::GET_INFO + arg, data)]
        }
        codes::GET_PRINT_STATUS => {
            let (p1, p2) = state.status_progress.pop_front().unwrap_or((100, 100));
            vec![(code + 16, vec![0, 1, p1, p2])]
        }
        codes::SET_LABEL_DENSITY | codes::SET_LABEL_TYPE => vec![(code + 16, vec![1])],
        codes::GET_RFID => vec![(code + 1, vec![0])],
        codes::GET_HEART_BEAT => {
            let response = match arg {
                1 => 221,
                2 => 223,
                3 => 222,
                _ => 217,
            };
            let mut data = vec![0u8; 13];
            data[10] = 4;
            data[12] = 1;
            vec![(response, data)]
        }
        _ => vec![(code.wrapping_add(1), vec![1])],
    }
}

impl Read for MockPrinter {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut state = self.lock();
        state.reads += 1;
        if state.outbound.is_empty() {
            return Err(ErrorKind::TimedOut.into());
        }
        let n = buf.len().min(state.outbound.len());
        for (slot, byte) in buf.iter_mut().zip(state.outbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for MockPrinter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut state = self.lock();
        let packets = state.inbound.feed(buf);
        for request in packets {
            let code = request.packet_type();
            let fallback = if state.silent.contains(&code) {
                Reply::Silent
            } else {
                Reply::Default
            };
            let reply = state
                .overrides
                .get_mut(&code)
                .and_then(VecDeque::pop_front)
                .unwrap_or(fallback);

            let packets = match reply {
                Reply::Default => default_reply(&mut state, &request),
                Reply::Packets(packets) => packets,
                Reply::Silent => vec![],
            };
            for (packet_type, data) in packets {
                let frame = encode(packet_type, &data).unwrap();
                state.outbound.extend(frame.iter().copied());
            }
            state.requests.push(request);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.lock().flushes += 1;
        Ok(())
    }
}
