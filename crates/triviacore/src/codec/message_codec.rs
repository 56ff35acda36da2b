//! Message codec for encoding and decoding fixed-layout frames

use crate::error::{ProtocolError, Result};
use crate::protocol::{BODY_SIZE, FRAME_SIZE, Message, MessageType};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Codec for trivia frames
///
/// Every frame is a 2-byte big-endian type code followed by exactly
/// `BODY_SIZE` bytes of NUL-padded UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCodec;

impl MessageCodec {
    /// Create a new message codec
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        // Wait for the whole frame
        if src.len() < FRAME_SIZE {
            src.reserve(FRAME_SIZE - src.len());
            return Ok(None);
        }

        let code = src.get_u16();
        let kind = MessageType::from_u16(code);
        if kind == MessageType::None {
            tracing::warn!("Unknown message type code {}", code);
        }

        // Body is consumed even for unknown types so the stream stays aligned
        let body = src.split_to(BODY_SIZE);
        let text_len = body.iter().position(|&b| b == 0).unwrap_or(BODY_SIZE);
        let text = String::from_utf8(body[..text_len].to_vec())?;

        Ok(Some(Message { kind, body: text }))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        match self.decode(src)? {
            Some(message) => Ok(Some(message)),
            None if src.is_empty() => Ok(None),
            None => {
                tracing::debug!(
                    "Peer closed with {} of {} frame bytes",
                    src.len(),
                    FRAME_SIZE
                );
                src.clear();
                Err(ProtocolError::ConnectionClosed)
            }
        }
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<()> {
        let body = item.body_bytes();

        dst.reserve(FRAME_SIZE);
        dst.put_u16(item.kind.to_u16());
        dst.put_slice(body);
        dst.put_bytes(0, BODY_SIZE - body.len());

        Ok(())
    }
}
