//! Protobuf message codec for gRPC channels.
//!
//! Backends speak plain Protobuf. The gateway carries payloads as
//! `serde_json::Value` and transcodes them against the method's message
//! descriptors at the edge, so no per-resource generated types are needed.
//!
//! - **Encoder**: writes a `DynamicMessage` already shaped by [`to_message`].
//! - **Decoder**: reads bytes into a `DynamicMessage` of the expected type; [`to_json`] turns it back.

use prost::Message;
use prost_reflect::{
    DeserializeOptions, DynamicMessage, MessageDescriptor, ReflectMessage, SerializeOptions,
};
use serde_json::Value;
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::Status;

/// Codec sending `DynamicMessage`s and decoding replies of one message type.
#[derive(Debug, Clone)]
pub struct DynamicCodec {
    decode: MessageDescriptor,
}

impl DynamicCodec {
    /// Codec whose decoder expects messages of type `decode`.
    pub fn new(decode: MessageDescriptor) -> Self {
        Self { decode }
    }
}

impl Codec for DynamicCodec {
    type Encode = DynamicMessage;
    type Decode = DynamicMessage;
    type Encoder = DynamicEncoder;
    type Decoder = DynamicDecoder;

    fn encoder(&mut self) -> Self::Encoder {
        DynamicEncoder
    }

    fn decoder(&mut self) -> Self::Decoder {
        DynamicDecoder(self.decode.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicEncoder;

impl Encoder for DynamicEncoder {
    type Item = DynamicMessage;
    type Error = Status;

    fn encode(&mut self, item: Self::Item, dst: &mut EncodeBuf<'_>) -> Result<(), Self::Error> {
        item.encode(dst)
            .map_err(|e| Status::internal(format!("failed to encode message: {}", e)))
    }
}

#[derive(Debug, Clone)]
pub struct DynamicDecoder(MessageDescriptor);

impl Decoder for DynamicDecoder {
    type Item = DynamicMessage;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Self::Item>, Self::Error> {
        // An empty buffer is a valid message with every field at its default.
        DynamicMessage::decode(self.0.clone(), src)
            .map(Some)
            .map_err(|e| Status::internal(format!("failed to decode message: {}", e)))
    }
}

/// Shape a JSON payload as a message of type `descriptor`.
///
/// Accepts proto and JSON field names. Fields unknown to the message are dropped.
pub fn to_message(descriptor: &MessageDescriptor, payload: Value) -> Result<DynamicMessage, String> {
    let options = DeserializeOptions::new().deny_unknown_fields(false);
    DynamicMessage::deserialize_with_options(descriptor.clone(), payload, &options)
        .map_err(|e| format!("payload does not match {}: {}", descriptor.full_name(), e))
}

/// Render a message as JSON keyed by proto field names, with 64-bit integers as numbers.
pub fn to_json(message: &DynamicMessage) -> Result<Value, String> {
    let options = SerializeOptions::new()
        .use_proto_field_name(true)
        .stringify_64_bit_integers(false);
    message
        .serialize_with_options(serde_json::value::Serializer, &options)
        .map_err(|e| format!("failed to render {}: {}", message.descriptor().full_name(), e))
}
