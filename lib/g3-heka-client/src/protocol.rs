/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Heka protobuf messages and the stream framing used on native heka listeners.
//!
//! Each frame is laid out as:
//!
//! ```text
//! 0x1E | header length (1 byte) | protobuf Header | 0x1F | protobuf Message
//! ```

use prost::Message as _;
use thiserror::Error;

use crate::{FieldValue, HekaEncodeError, HekaMessage};

pub const RECORD_SEPARATOR: u8 = 0x1e;
pub const UNIT_SEPARATOR: u8 = 0x1f;
pub const MAX_HEADER_SIZE: usize = 255;
/// Separators, the header length byte and the largest possible header
pub const MAX_FRAME_OVERHEAD: usize = 3 + 6;

#[derive(Clone, PartialEq, prost::Message)]
pub struct Header {
    #[prost(uint32, required, tag = "1")]
    pub message_length: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ValueType {
    String = 0,
    Bytes = 1,
    Integer = 2,
    Double = 3,
    Bool = 4,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Field {
    #[prost(string, required, tag = "1")]
    pub name: String,
    #[prost(enumeration = "ValueType", optional, tag = "2")]
    pub value_type: Option<i32>,
    #[prost(string, optional, tag = "3")]
    pub representation: Option<String>,
    #[prost(int64, repeated, packed = "true", tag = "6")]
    pub value_integer: Vec<i64>,
    #[prost(double, repeated, packed = "true", tag = "7")]
    pub value_double: Vec<f64>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Message {
    #[prost(bytes = "vec", required, tag = "1")]
    pub uuid: Vec<u8>,
    #[prost(int64, required, tag = "2")]
    pub timestamp: i64,
    #[prost(string, optional, tag = "3")]
    pub r#type: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub logger: Option<String>,
    #[prost(int32, optional, tag = "5")]
    pub severity: Option<i32>,
    #[prost(string, optional, tag = "6")]
    pub payload: Option<String>,
    #[prost(int32, optional, tag = "8")]
    pub pid: Option<i32>,
    #[prost(string, optional, tag = "9")]
    pub hostname: Option<String>,
    #[prost(message, repeated, tag = "10")]
    pub fields: Vec<Field>,
}

impl From<&HekaMessage> for Message {
    fn from(msg: &HekaMessage) -> Self {
        let fields = msg
            .fields()
            .iter()
            .map(|f| match f.value() {
                FieldValue::Integer(v) => Field {
                    name: f.name().to_string(),
                    value_type: Some(ValueType::Integer as i32),
                    representation: None,
                    value_integer: vec![v],
                    value_double: Vec::new(),
                },
                FieldValue::Double(v) => Field {
                    name: f.name().to_string(),
                    value_type: Some(ValueType::Double as i32),
                    representation: None,
                    value_integer: Vec::new(),
                    value_double: vec![v],
                },
            })
            .collect();
        Message {
            uuid: msg.uuid().as_bytes().to_vec(),
            timestamp: msg.timestamp(),
            r#type: Some(msg.msg_type().to_string()),
            logger: Some(msg.logger().to_string()),
            severity: Some(msg.severity()),
            payload: Some(msg.payload().to_string()),
            pid: Some(msg.pid()),
            hostname: Some(msg.hostname().to_string()),
            fields,
        }
    }
}

/// Encode the message as one heka stream frame into `buf`, which is cleared first
pub fn encode_stream(
    msg: &HekaMessage,
    max_message_size: usize,
    buf: &mut Vec<u8>,
) -> Result<(), HekaEncodeError> {
    let message = Message::from(msg);
    let message_len = message.encoded_len();
    let too_large = HekaEncodeError::MessageTooLarge {
        size: message_len,
        max: max_message_size,
    };
    if message_len > max_message_size {
        return Err(too_large);
    }
    let header = Header {
        message_length: u32::try_from(message_len).map_err(|_| too_large)?,
    };
    let header_len = header.encoded_len();
    if header_len > MAX_HEADER_SIZE {
        return Err(HekaEncodeError::HeaderTooLarge {
            size: header_len,
            max: MAX_HEADER_SIZE,
        });
    }

    buf.clear();
    buf.reserve(header_len + message_len + 3);
    buf.push(RECORD_SEPARATOR);
    buf.push(header_len as u8);
    buf.extend_from_slice(&header.encode_to_vec());
    buf.push(UNIT_SEPARATOR);
    buf.extend_from_slice(&message.encode_to_vec());
    Ok(())
}

#[derive(Debug, Error)]
pub enum StreamDecodeError {
    #[error("not enough data")]
    Truncated,
    #[error("no record separator found")]
    NoRecordSeparator,
    #[error("no unit separator found")]
    NoUnitSeparator,
    #[error("invalid header: {0}")]
    InvalidHeader(prost::DecodeError),
    #[error("invalid message: {0}")]
    InvalidMessage(prost::DecodeError),
}

/// Decode one heka stream frame from the start of `buf`.
///
/// Return the message and the number of bytes consumed.
pub fn decode_stream(buf: &[u8]) -> Result<(Message, usize), StreamDecodeError> {
    if buf.len() < 2 {
        return Err(StreamDecodeError::Truncated);
    }
    if buf[0] != RECORD_SEPARATOR {
        return Err(StreamDecodeError::NoRecordSeparator);
    }
    let header_len = buf[1] as usize;
    let header_end = 2 + header_len;
    if buf.len() < header_end + 1 {
        return Err(StreamDecodeError::Truncated);
    }
    let header =
        Header::decode(&buf[2..header_end]).map_err(StreamDecodeError::InvalidHeader)?;
    if buf[header_end] != UNIT_SEPARATOR {
        return Err(StreamDecodeError::NoUnitSeparator);
    }
    let message_start = header_end + 1;
    let message_end = message_start + header.message_length as usize;
    if buf.len() < message_end {
        return Err(StreamDecodeError::Truncated);
    }
    let message = Message::decode(&buf[message_start..message_end])
        .map_err(StreamDecodeError::InvalidMessage)?;
    Ok((message, message_end))
}
