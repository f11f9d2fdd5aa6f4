//! ttrpc message framing.
//!
//! Every message on the wire is a 10-byte big-endian header followed by the
//! payload:
//!
//! ```text
//! [length:u32][stream_id:u32][type:u8][flags:u8][payload; length]
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io;
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Size of the frame header on the wire
pub const MESSAGE_HEADER_LENGTH: usize = 10;

/// Largest payload either side accepts (4 MiB)
pub const MESSAGE_LENGTH_MAX: usize = 4 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Request,
    Response,
    Data,
    Unknown(u8),
}

impl MessageType {
    pub fn to_u8(self) -> u8 {
        match self {
            MessageType::Request => 1,
            MessageType::Response => 2,
            MessageType::Data => 3,
            MessageType::Unknown(v) => v,
        }
    }
}

impl From<u8> for MessageType {
    fn from(value: u8) -> Self {
        match value {
            1 => MessageType::Request,
            2 => MessageType::Response,
            3 => MessageType::Data,
            other => MessageType::Unknown(other),
        }
    }
}

/// A single decoded ttrpc message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub stream_id: u32,
    pub message_type: MessageType,
    pub flags: u8,
    pub payload: Bytes,
}

impl Frame {
    pub fn request(stream_id: u32, payload: impl Into<Bytes>) -> Self {
        Self {
            stream_id,
            message_type: MessageType::Request,
            flags: 0,
            payload: payload.into(),
        }
    }

    pub fn response(stream_id: u32, payload: impl Into<Bytes>) -> Self {
        Self {
            stream_id,
            message_type: MessageType::Response,
            flags: 0,
            payload: payload.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("message length {len} exceeds maximum message size of {max}")]
    TooLarge { len: usize, max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// `tokio_util` codec for ttrpc frames
#[derive(Debug, Clone, Copy, Default)]
pub struct TtrpcCodec;

impl Decoder for TtrpcCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        if src.len() < MESSAGE_HEADER_LENGTH {
            return Ok(None);
        }

        let mut header = &src[..MESSAGE_HEADER_LENGTH];
        let length = header.get_u32() as usize;
        let stream_id = header.get_u32();
        let message_type = MessageType::from(header.get_u8());
        let flags = header.get_u8();

        if length > MESSAGE_LENGTH_MAX {
            return Err(FrameError::TooLarge {
                len: length,
                max: MESSAGE_LENGTH_MAX,
            });
        }

        let total = MESSAGE_HEADER_LENGTH + length;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(MESSAGE_HEADER_LENGTH);
        let payload = src.split_to(length).freeze();

        Ok(Some(Frame {
            stream_id,
            message_type,
            flags,
            payload,
        }))
    }
}

impl Encoder<Frame> for TtrpcCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), FrameError> {
        let length = frame.payload.len();
        if length > MESSAGE_LENGTH_MAX {
            return Err(FrameError::TooLarge {
                len: length,
                max: MESSAGE_LENGTH_MAX,
            });
        }

        dst.reserve(MESSAGE_HEADER_LENGTH + length);
        dst.put_u32(length as u32);
        dst.put_u32(frame.stream_id);
        dst.put_u8(frame.message_type.to_u8());
        dst.put_u8(frame.flags);
        dst.extend_from_slice(&frame.payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(frame: Frame) -> BytesMut {
        let mut buf = BytesMut::new();
        TtrpcCodec.encode(frame, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_header_layout() {
        let buf = encode(Frame::request(3, &b"abc"[..]));

        assert_eq!(buf.len(), MESSAGE_HEADER_LENGTH + 3);
        assert_eq!(&buf[0..4], &[0, 0, 0, 3]);
        assert_eq!(&buf[4..8], &[0, 0, 0, 3]);
        assert_eq!(buf[8], 1);
        assert_eq!(buf[9], 0);
        assert_eq!(&buf[10..], b"abc");
    }

    #[test]
    fn test_decode_waits_for_full_header() {
        let mut buf = BytesMut::from(&[0u8, 0, 0, 1, 0][..]);
        assert!(TtrpcCodec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn test_decode_waits_for_full_payload() {
        let full = encode(Frame::response(1, &b"hello"[..]));

        let mut partial = BytesMut::from(&full[..12]);
        assert!(TtrpcCodec.decode(&mut partial).unwrap().is_none());

        partial.extend_from_slice(&full[12..]);
        let frame = TtrpcCodec.decode(&mut partial).unwrap().unwrap();
        assert_eq!(frame.stream_id, 1);
        assert_eq!(frame.message_type, MessageType::Response);
        assert_eq!(&frame.payload[..], b"hello");
        assert!(partial.is_empty());
    }

    #[test]
    fn test_decode_back_to_back_frames() {
        let mut buf = encode(Frame::response(1, &b"one"[..]));
        buf.extend_from_slice(&encode(Frame::response(3, &b"two"[..])));

        let first = TtrpcCodec.decode(&mut buf).unwrap().unwrap();
        let second = TtrpcCodec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&first.payload[..], b"one");
        assert_eq!(second.stream_id, 3);
        assert!(TtrpcCodec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_decode_rejects_oversized_length() {
        let mut buf = BytesMut::new();
        buf.put_u32((MESSAGE_LENGTH_MAX + 1) as u32);
        buf.put_u32(1);
        buf.put_u8(2);
        buf.put_u8(0);

        match TtrpcCodec.decode(&mut buf) {
            Err(FrameError::TooLarge { len, max }) => {
                assert_eq!(len, MESSAGE_LENGTH_MAX + 1);
                assert_eq!(max, MESSAGE_LENGTH_MAX);
            }
            other => panic!("expected TooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_rejects_oversized_payload() {
        let payload = vec![0u8; MESSAGE_LENGTH_MAX + 1];
        let mut buf = BytesMut::new();
        let result = TtrpcCodec.encode(Frame::request(1, payload), &mut buf);
        assert!(matches!(result, Err(FrameError::TooLarge { .. })));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_unknown_message_type_survives_decoding() {
        let mut frame = Frame::request(5, Bytes::new());
        frame.message_type = MessageType::Unknown(9);
        frame.flags = 0x01;

        let mut buf = encode(frame.clone());
        let decoded = TtrpcCodec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, frame);
    }
}
