//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (Framed Records)
//!
//! ### Frame Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Len (4)  │ Kind (1) │            Body             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Kinds
//! - 0x51: REQUEST  - Body: action, key, optional value
//! - 0x52: RESPONSE - Body: status, optional value
//!
//! ### Actions
//! - "get", "set", "delete"
//!
//! ### Status Codes
//! - "ok", "error", "not_found"

mod codec;
mod request;
mod response;

pub use codec::{
    decode_request, decode_response, encode_raw_request, encode_request, encode_response,
    read_frame, read_response, write_frame, write_request, write_response, FRAME_HEADER_SIZE,
    MAX_FRAME_SIZE, REQUEST_KIND, RESPONSE_KIND,
};
pub use request::{Action, RawRequest, Request};
pub use response::{Response, Status};
