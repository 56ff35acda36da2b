//! Codec implementations for encoding and decoding protocol messages

pub mod message_codec;

pub use message_codec::MessageCodec;
