//! gRPC-Web wire framing, independent of any HTTP stack.
//!
//! A body is a sequence of frames: one flag byte (`0x00` message, `0x80`
//! trailers), a 4-byte big-endian length, then the payload. Text mode is the
//! same byte stream base64-encoded; servers may emit several independently
//! padded base64 chunks, so decoding works one 4-character group at a time.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use bytes::{BufMut, Bytes, BytesMut};
use prost::Message;
use serde::{Deserialize, Serialize};
use tonic::metadata::MetadataValue;
use tonic::{Code, Status};

use crate::status::FAULT_KIND_METADATA_KEY;

pub const FRAME_HEADER_LEN: usize = 5;
const MESSAGE_FLAG: u8 = 0x00;
const TRAILERS_FLAG: u8 = 0x80;

pub const GRPC_STATUS_HEADER: &str = "grpc-status";
pub const GRPC_MESSAGE_HEADER: &str = "grpc-message";

const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Body framing of a gRPC-Web exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrpcWebMode {
    /// Raw frames, `application/grpc-web+proto`.
    Binary,
    /// Base64 frames, `application/grpc-web-text+proto`.
    #[default]
    Text,
}

impl GrpcWebMode {
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            GrpcWebMode::Binary => "application/grpc-web+proto",
            GrpcWebMode::Text => "application/grpc-web-text+proto",
        }
    }

    /// Framing announced by a response `content-type`.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let content_type = content_type.trim().to_ascii_lowercase();
        if content_type.starts_with("application/grpc-web-text") {
            Some(GrpcWebMode::Text)
        } else if content_type.starts_with("application/grpc") {
            Some(GrpcWebMode::Binary)
        } else {
            None
        }
    }

    /// Undo the transfer encoding of a body, yielding raw frame bytes.
    ///
    /// # Errors
    /// Returns [`CodecError::Base64`] for an invalid text body.
    pub fn decode_body(self, body: &[u8]) -> Result<Bytes, CodecError> {
        match self {
            GrpcWebMode::Binary => Ok(Bytes::copy_from_slice(body)),
            GrpcWebMode::Text => {
                let compact: Vec<u8> = body
                    .iter()
                    .copied()
                    .filter(|b| !b.is_ascii_whitespace())
                    .collect();
                let mut out = Vec::with_capacity(compact.len() / 4 * 3);
                for group in compact.chunks(4) {
                    BASE64.decode_vec(group, &mut out)?;
                }
                Ok(Bytes::from(out))
            }
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("truncated frame header: {0} trailing bytes")]
    TruncatedHeader(usize),

    #[error("frame declares {declared} bytes but only {available} remain")]
    TruncatedFrame { declared: usize, available: usize },

    #[error("frame of {0} bytes exceeds the 4-byte length prefix")]
    FrameTooLarge(usize),

    #[error("unknown frame flag {0:#04x}")]
    UnknownFlag(u8),

    #[error("invalid base64 body: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid protobuf message: {0}")]
    Protobuf(#[from] prost::DecodeError),

    #[error("unexpected content-type '{0}'")]
    ContentType(String),

    #[error("invalid grpc-status '{0}'")]
    InvalidStatus(String),

    #[error("response carries no grpc-status")]
    MissingStatus,

    #[error("successful response carries no message")]
    MissingMessage,
}

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Message(Bytes),
    Trailers(Bytes),
}

/// Append one frame to `buf`.
///
/// # Errors
/// Returns [`CodecError::FrameTooLarge`] if the payload length does not fit in `u32`.
pub fn encode_frame(buf: &mut BytesMut, flag: u8, payload: &[u8]) -> Result<(), CodecError> {
    let len = u32::try_from(payload.len())
        .map_err(|_| CodecError::FrameTooLarge(payload.len()))?;
    buf.reserve(FRAME_HEADER_LEN + payload.len());
    buf.put_u8(flag);
    buf.put_u32(len);
    buf.put_slice(payload);
    Ok(())
}

/// Frame a protobuf message as a request body.
///
/// # Errors
/// Returns [`CodecError::FrameTooLarge`] for messages over 4 GiB.
pub fn encode_message<M: Message>(msg: &M, mode: GrpcWebMode) -> Result<Bytes, CodecError> {
    let payload = msg.encode_to_vec();
    let mut buf = BytesMut::new();
    encode_frame(&mut buf, MESSAGE_FLAG, &payload)?;

    Ok(match mode {
        GrpcWebMode::Binary => buf.freeze(),
        GrpcWebMode::Text => Bytes::from(BASE64.encode(&buf)),
    })
}

/// Split raw (already base64-decoded) bytes into frames.
///
/// # Errors
/// Returns an error for a truncated header or payload, or an unknown flag.
pub fn split_frames(mut raw: Bytes) -> Result<Vec<Frame>, CodecError> {
    let mut frames = Vec::new();

    while !raw.is_empty() {
        if raw.len() < FRAME_HEADER_LEN {
            return Err(CodecError::TruncatedHeader(raw.len()));
        }
        let flag = raw[0];
        let declared = usize::try_from(u32::from_be_bytes([raw[1], raw[2], raw[3], raw[4]]))
            .unwrap_or(usize::MAX);
        let available = raw.len() - FRAME_HEADER_LEN;
        if declared > available {
            return Err(CodecError::TruncatedFrame {
                declared,
                available,
            });
        }

        let mut frame = raw.split_to(FRAME_HEADER_LEN + declared);
        let payload = frame.split_off(FRAME_HEADER_LEN);
        frames.push(match flag {
            MESSAGE_FLAG => Frame::Message(payload),
            TRAILERS_FLAG => Frame::Trailers(payload),
            other => return Err(CodecError::UnknownFlag(other)),
        });
    }

    Ok(frames)
}

/// Parse a trailers frame payload (`key: value\r\n` lines) into lowercase pairs.
#[must_use]
pub fn parse_trailers(payload: &[u8]) -> Vec<(String, String)> {
    String::from_utf8_lossy(payload)
        .split("\r\n")
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            Some((key.trim().to_ascii_lowercase(), value.trim().to_owned()))
        })
        .collect()
}

/// Build a `Status` from `grpc-status` / `grpc-message` / `x-fault-kind` pairs.
///
/// Returns `Ok(None)` when no `grpc-status` entry is present.
///
/// # Errors
/// Returns [`CodecError::InvalidStatus`] if `grpc-status` is not an integer.
pub fn status_from_pairs<'a, I>(pairs: I) -> Result<Option<Status>, CodecError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut code = None;
    let mut message = String::new();
    let mut fault_kind = None;

    for (key, value) in pairs {
        if key.eq_ignore_ascii_case(GRPC_STATUS_HEADER) {
            let raw: i32 = value
                .trim()
                .parse()
                .map_err(|_| CodecError::InvalidStatus(value.to_owned()))?;
            code = Some(Code::from_i32(raw));
        } else if key.eq_ignore_ascii_case(GRPC_MESSAGE_HEADER) {
            message = urlencoding::decode(value)
                .map_or_else(|_| value.to_owned(), std::borrow::Cow::into_owned);
        } else if key.eq_ignore_ascii_case(FAULT_KIND_METADATA_KEY) {
            fault_kind = Some(value);
        }
    }

    let Some(code) = code else {
        return Ok(None);
    };

    let mut status = Status::new(code, message);
    if let Some(kind) = fault_kind.and_then(|v| MetadataValue::try_from(v).ok()) {
        status.metadata_mut().insert(FAULT_KIND_METADATA_KEY, kind);
    }
    Ok(Some(status))
}

/// Decode a complete gRPC-Web unary response.
///
/// The outer `Result` reports malformed responses; the inner one carries the
/// server's verdict: the reply message or a non-OK status. Status may arrive in
/// the response headers (trailers-only response) or in a trailers frame.
///
/// # Errors
/// Returns a [`CodecError`] if the response cannot be parsed.
pub fn decode_response<M: Message + Default>(
    headers: &http::HeaderMap,
    body: &[u8],
) -> Result<Result<M, Status>, CodecError> {
    let header_pairs = headers
        .iter()
        .filter_map(|(k, v)| Some((k.as_str(), v.to_str().ok()?)));
    let header_status = match status_from_pairs(header_pairs)? {
        Some(status) if status.code() != Code::Ok => return Ok(Err(status)),
        other => other,
    };

    if body.is_empty() {
        return match header_status {
            Some(_) => Err(CodecError::MissingMessage),
            None => Err(CodecError::MissingStatus),
        };
    }

    let content_type = headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let mode = GrpcWebMode::from_content_type(content_type)
        .ok_or_else(|| CodecError::ContentType(content_type.to_owned()))?;

    let mut message = None;
    let mut trailer_status = None;
    for frame in split_frames(mode.decode_body(body)?)? {
        match frame {
            Frame::Message(payload) => {
                if message.is_none() {
                    message = Some(payload);
                }
            }
            Frame::Trailers(payload) => {
                let pairs = parse_trailers(&payload);
                trailer_status =
                    status_from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
            }
        }
    }

    let status = trailer_status
        .or(header_status)
        .ok_or(CodecError::MissingStatus)?;
    if status.code() != Code::Ok {
        return Ok(Err(status));
    }

    let payload = message.ok_or(CodecError::MissingMessage)?;
    Ok(Ok(M::decode(payload)?))
}
