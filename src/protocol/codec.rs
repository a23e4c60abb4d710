//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Frame
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Len (4)  │ Kind (1) │            Body             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! `Len` is big-endian and counts `Kind` + `Body`. The functions named
//! `encode_*` / `decode_*` work on the packet (`Kind` + `Body`); framing is
//! added by `write_frame` and stripped by `read_frame`.
//!
//! ### Body
//! - Request:  bincode record `{ action: String, key: String, value: Option<String> }`
//! - Response: bincode record `{ status: String, value: Option<String> }`
//!
//! Bodies are plain records of strings. Decoding is bounded by the packet
//! length and rejects trailing bytes.

use std::io::{self, Read, Write};

use bincode::Options;
use bytes::{Buf, BufMut, BytesMut};

use crate::error::{DecodeError, KeyrackError, Result};
use super::request::RawRequest;
use super::response::RawResponse;
use super::{Request, Response};

/// Frame header size: 4 bytes length
pub const FRAME_HEADER_SIZE: usize = 4;

/// Maximum packet size (16 MB)
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Kind byte of a request packet
pub const REQUEST_KIND: u8 = 0x51;

/// Kind byte of a response packet
pub const RESPONSE_KIND: u8 = 0x52;

fn body_options() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_FRAME_SIZE as u64)
}

fn encode_packet<T: serde::Serialize>(kind: u8, record: &T) -> Result<Vec<u8>> {
    let body = body_options()
        .serialize(record)
        .map_err(|e| KeyrackError::Encode(e.to_string()))?;

    if body.len() + 1 > MAX_FRAME_SIZE {
        return Err(KeyrackError::FrameTooLarge {
            len: body.len() + 1,
            max: MAX_FRAME_SIZE,
        });
    }

    let mut packet = BytesMut::with_capacity(1 + body.len());
    packet.put_u8(kind);
    packet.put_slice(&body);
    Ok(packet.to_vec())
}

/// Strip and check the kind byte, returning the body
fn packet_body(packet: &[u8], expected: u8) -> std::result::Result<&[u8], DecodeError> {
    let mut buf = packet;
    if !buf.has_remaining() {
        return Err(DecodeError::Empty);
    }
    let kind = buf.get_u8();
    if kind != expected {
        return Err(DecodeError::UnexpectedKind(kind));
    }
    Ok(buf)
}

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request packet
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    encode_raw_request(&request.to_raw())
}

/// Encode an unvalidated request record
///
/// Lets callers put actions on the wire that the server does not know.
pub fn encode_raw_request(raw: &RawRequest) -> Result<Vec<u8>> {
    encode_packet(REQUEST_KIND, raw)
}

/// Decode and validate a request packet
pub fn decode_request(packet: &[u8]) -> std::result::Result<Request, DecodeError> {
    let body = packet_body(packet, REQUEST_KIND)?;
    let raw: RawRequest = body_options().deserialize(body)?;
    Request::try_from(raw)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response packet
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    encode_packet(RESPONSE_KIND, &response.to_raw())
}

/// Decode and validate a response packet
pub fn decode_response(packet: &[u8]) -> std::result::Result<Response, DecodeError> {
    let body = packet_body(packet, RESPONSE_KIND)?;
    let raw: RawResponse = body_options().deserialize(body)?;
    Response::try_from(raw)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one frame from a stream and return its packet
///
/// Returns `Ok(None)` when the peer closed the stream cleanly between
/// frames. A stream that ends inside a frame is an `UnexpectedEof` error.
pub fn read_frame<R: Read>(reader: &mut R, max_frame_size: usize) -> Result<Option<Vec<u8>>> {
    let mut header = [0u8; FRAME_HEADER_SIZE];
    let mut filled = 0;

    while filled < FRAME_HEADER_SIZE {
        match reader.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let len = u32::from_be_bytes(header) as usize;
    if len > max_frame_size {
        return Err(KeyrackError::FrameTooLarge {
            len,
            max: max_frame_size,
        });
    }

    let mut packet = vec![0u8; len];
    if len > 0 {
        reader.read_exact(&mut packet)?;
    }
    Ok(Some(packet))
}

/// Write one packet to a stream as a frame
pub fn write_frame<W: Write>(writer: &mut W, packet: &[u8]) -> Result<()> {
    if packet.len() > MAX_FRAME_SIZE {
        return Err(KeyrackError::FrameTooLarge {
            len: packet.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    let mut frame = BytesMut::with_capacity(FRAME_HEADER_SIZE + packet.len());
    frame.put_u32(packet.len() as u32);
    frame.put_slice(packet);

    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    write_frame(writer, &encode_request(request)?)
}

/// Read a complete response from a stream
///
/// A stream closed before the response arrives is an error here: every
/// request is owed exactly one response.
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    match read_frame(reader, MAX_FRAME_SIZE)? {
        Some(packet) => Ok(decode_response(&packet)?),
        None => Err(KeyrackError::Network(
            "connection closed before a response arrived".to_string(),
        )),
    }
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    write_frame(writer, &encode_response(response)?)
}
