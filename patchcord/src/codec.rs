//! Binary wire framing for messages.
//!
//! Wire format, little-endian: `[request_id:8][flags:2][len:4][payload:N]`.
//! The router itself never touches raw bytes; connector implementations use
//! this codec to frame outbound messages and to reassemble inbound ones
//! from a streaming transport.

use crate::error::CodecError;
use crate::message::{Message, MessageFlags, RequestId};

/// Encoder/decoder for the binary frame format.
#[derive(Debug, Clone, Default)]
pub struct MessageCodec;

impl MessageCodec {
    /// Header size in bytes (request id + flags + payload length).
    pub const HEADER_SIZE: usize = 8 + 2 + 4;

    /// Maximum supported payload size (1MB).
    pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

    /// Create a new MessageCodec.
    pub fn new() -> Self {
        Self
    }

    /// Encode a message into one wire frame.
    pub fn encode(&self, message: &Message) -> Vec<u8> {
        let payload_len = message.payload.len();
        let mut buffer = Vec::with_capacity(Self::HEADER_SIZE + payload_len);

        buffer.extend_from_slice(&message.request_id.as_u64().to_le_bytes());
        buffer.extend_from_slice(&message.flags.bits().to_le_bytes());
        buffer.extend_from_slice(&(payload_len as u32).to_le_bytes());
        buffer.extend_from_slice(&message.payload);

        buffer
    }

    /// Decode exactly one frame occupying the entire input.
    pub fn decode(&self, data: &[u8]) -> Result<Message, CodecError> {
        if data.len() < Self::HEADER_SIZE {
            return Err(CodecError::InsufficientData {
                needed: Self::HEADER_SIZE,
                available: data.len(),
            });
        }

        let request_id = u64::from_le_bytes([
            data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
        ]);
        let flags = u16::from_le_bytes([data[8], data[9]]);
        let payload_len = u32::from_le_bytes([data[10], data[11], data[12], data[13]]) as usize;

        if payload_len > Self::MAX_PAYLOAD_SIZE {
            return Err(CodecError::PayloadTooLarge {
                size: payload_len,
                max: Self::MAX_PAYLOAD_SIZE,
            });
        }

        let expected = Self::HEADER_SIZE + payload_len;
        if data.len() != expected {
            return Err(CodecError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Message {
            request_id: RequestId::new(request_id),
            flags: MessageFlags::from_bits_truncate(flags),
            payload: data[Self::HEADER_SIZE..].to_vec(),
        })
    }

    /// Consume one complete frame from the front of `buffer`.
    ///
    /// Returns `Ok(None)` for an empty buffer. A partial frame reports
    /// `InsufficientData` with the byte count needed, without consuming
    /// anything, so the caller can retry after the next read.
    pub fn try_decode_from_buffer(
        &self,
        buffer: &mut Vec<u8>,
    ) -> Result<Option<Message>, CodecError> {
        if buffer.is_empty() {
            return Ok(None);
        }

        if buffer.len() < Self::HEADER_SIZE {
            return Err(CodecError::InsufficientData {
                needed: Self::HEADER_SIZE,
                available: buffer.len(),
            });
        }

        let payload_len =
            u32::from_le_bytes([buffer[10], buffer[11], buffer[12], buffer[13]]) as usize;

        if payload_len > Self::MAX_PAYLOAD_SIZE {
            return Err(CodecError::PayloadTooLarge {
                size: payload_len,
                max: Self::MAX_PAYLOAD_SIZE,
            });
        }

        let total = Self::HEADER_SIZE + payload_len;
        if buffer.len() < total {
            return Err(CodecError::InsufficientData {
                needed: total,
                available: buffer.len(),
            });
        }

        let frame: Vec<u8> = buffer.drain(0..total).collect();
        self.decode(&frame).map(Some)
    }
}
