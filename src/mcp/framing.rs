//! Content-Length framing for the stdio transport
//!
//! Each message is `Content-Length: N\r\n\r\n` followed by exactly N bytes
//! of JSON. Other header lines are ignored.

use bytes::{Buf, BytesMut};
use serde::Serialize;
use std::io;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Header blocks longer than this without a terminator are discarded
pub const MAX_HEADER_LEN: usize = 8 * 1024;

/// Payloads longer than this are skipped
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Default)]
pub struct FrameCodec {
    /// Payload length announced by the last header, once it has been consumed
    pending_len: Option<usize>,
    /// Bytes still to drop from an oversized payload
    skip_remaining: usize,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, io::Error> {
        loop {
            if self.skip_remaining > 0 {
                let n = self.skip_remaining.min(src.len());
                src.advance(n);
                self.skip_remaining -= n;
                if self.skip_remaining > 0 {
                    return Ok(None);
                }
            }

            if let Some(len) = self.pending_len {
                if src.len() < len {
                    src.reserve(len - src.len());
                    return Ok(None);
                }
                self.pending_len = None;
                return Ok(Some(src.split_to(len)));
            }

            let Some(end) = find_terminator(src) else {
                if src.len() > MAX_HEADER_LEN {
                    warn!("Discarding {} bytes without a frame header terminator", src.len());
                    src.clear();
                }
                return Ok(None);
            };

            let header = src.split_to(end + HEADER_TERMINATOR.len());
            match parse_content_length(&header[..end]) {
                Ok(len) if len > MAX_FRAME_LEN => {
                    warn!("Skipping oversized frame of {} bytes", len);
                    self.skip_remaining = len;
                }
                Ok(len) => self.pending_len = Some(len),
                Err(reason) => warn!("Discarding malformed frame header: {}", reason),
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, io::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if !src.is_empty() {
            warn!("Discarding {} trailing bytes of an incomplete frame", src.len());
            src.clear();
        }
        self.pending_len = None;
        self.skip_remaining = 0;
        Ok(None)
    }
}

impl<T: Serialize> Encoder<T> for FrameCodec {
    type Error = io::Error;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), io::Error> {
        let payload = serde_json::to_vec(&item)?;
        let header = format!("Content-Length: {}\r\n\r\n", payload.len());

        dst.reserve(header.len() + payload.len());
        dst.extend_from_slice(header.as_bytes());
        dst.extend_from_slice(&payload);
        Ok(())
    }
}

fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}

fn parse_content_length(header: &[u8]) -> Result<usize, String> {
    let header = std::str::from_utf8(header).map_err(|e| format!("invalid UTF-8: {}", e))?;

    for line in header.split("\r\n") {
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().eq_ignore_ascii_case("content-length") {
                return value
                    .trim()
                    .parse()
                    .map_err(|e| format!("invalid Content-Length {:?}: {}", value.trim(), e));
            }
        }
    }

    Err(format!("missing Content-Length in {:?}", header))
}
