//! Codec Tests
//!
//! Tests for request and response encoding/decoding.

use std::io::Cursor;

use keyrack::protocol::{
    decode_request, decode_response, encode_raw_request, encode_request, encode_response,
    read_frame, read_response, write_frame, write_request, write_response, Action, RawRequest,
    Request, Response, Status, MAX_FRAME_SIZE, REQUEST_KIND, RESPONSE_KIND,
};
use keyrack::{DecodeError, KeyrackError};

// =============================================================================
// Request Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_get() {
    let request = Request::get("hello");
    let encoded = encode_request(&request).unwrap();
    let decoded = decode_request(&encoded).unwrap();

    assert_eq!(decoded, request);
    assert_eq!(decoded.action(), Action::Get);
    assert_eq!(decoded.key(), "hello");
}

#[test]
fn test_encode_decode_set() {
    let request = Request::set("mykey", "myvalue");
    let encoded = encode_request(&request).unwrap();

    match decode_request(&encoded).unwrap() {
        Request::Set { key, value } => {
            assert_eq!(key, "mykey");
            assert_eq!(value, "myvalue");
        }
        other => panic!("Expected SET request, got {:?}", other),
    }
}

#[test]
fn test_encode_decode_delete() {
    let request = Request::delete("todelete");
    let encoded = encode_request(&request).unwrap();
    assert_eq!(decode_request(&encoded).unwrap(), request);
}

#[test]
fn test_encode_decode_empty_value() {
    let request = Request::set("key", "");
    let encoded = encode_request(&request).unwrap();
    assert_eq!(decode_request(&encoded).unwrap(), request);
}

#[test]
fn test_encode_decode_unicode() {
    let request = Request::set("clé 🔑", "värde\n\t\u{0}");
    let encoded = encode_request(&request).unwrap();
    assert_eq!(decode_request(&encoded).unwrap(), request);
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_response_ok() {
    let resp = Response::ok(Some("value".to_string()));
    let encoded = encode_response(&resp).unwrap();
    let decoded = decode_response(&encoded).unwrap();

    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.value, Some("value".to_string()));
}

#[test]
fn test_encode_decode_response_ok_no_value() {
    let resp = Response::ok(None);
    let encoded = encode_response(&resp).unwrap();
    assert_eq!(decode_response(&encoded).unwrap(), resp);
}

#[test]
fn test_encode_decode_response_not_found() {
    let resp = Response::not_found();
    let encoded = encode_response(&resp).unwrap();
    let decoded = decode_response(&encoded).unwrap();

    assert_eq!(decoded.status, Status::NotFound);
    assert_eq!(decoded.value, None);
}

#[test]
fn test_encode_decode_response_error() {
    let resp = Response::error();
    let encoded = encode_response(&resp).unwrap();
    let decoded = decode_response(&encoded).unwrap();

    assert_eq!(decoded.status, Status::Error);
    assert_eq!(decoded.value, None);
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_empty_packet() {
    assert_eq!(decode_request(&[]), Err(DecodeError::Empty));
    assert_eq!(decode_response(&[]), Err(DecodeError::Empty));
}

#[test]
fn test_wrong_kind() {
    let response_packet = encode_response(&Response::ok(None)).unwrap();
    assert_eq!(
        decode_request(&response_packet),
        Err(DecodeError::UnexpectedKind(RESPONSE_KIND))
    );

    let request_packet = encode_request(&Request::get("a")).unwrap();
    assert_eq!(
        decode_response(&request_packet),
        Err(DecodeError::UnexpectedKind(REQUEST_KIND))
    );
}

#[test]
fn test_garbage_bytes() {
    let result = decode_request(b"\x00\x01\x02garbage");
    assert_eq!(result, Err(DecodeError::UnexpectedKind(0x00)));
}

#[test]
fn test_truncated_body() {
    let encoded = encode_request(&Request::set("key", "value")).unwrap();
    let result = decode_request(&encoded[..encoded.len() - 3]);
    assert!(matches!(result, Err(DecodeError::Malformed(_))));
}

#[test]
fn test_invalid_utf8() {
    // kind, action len 3, three bytes that are not UTF-8
    let bytes = [REQUEST_KIND, 0x03, 0xFF, 0xFE, 0xFD, 0x01, b'a', 0x00];
    assert!(matches!(
        decode_request(&bytes),
        Err(DecodeError::Malformed(_))
    ));
}

#[test]
fn test_oversized_length_claim() {
    // action length claims ~2 GB; decoding must fail instead of allocating
    let bytes = [REQUEST_KIND, 0xFC, 0xFF, 0xFF, 0xFF, 0x7F, b'g'];
    assert!(matches!(
        decode_request(&bytes),
        Err(DecodeError::Malformed(_))
    ));
}

#[test]
fn test_unknown_action() {
    let raw = RawRequest::new("frobnicate", "a", None);
    let encoded = encode_raw_request(&raw).unwrap();
    assert_eq!(
        decode_request(&encoded),
        Err(DecodeError::UnknownAction("frobnicate".to_string()))
    );
}

#[test]
fn test_set_without_value() {
    let raw = RawRequest::new("set", "a", None);
    let encoded = encode_raw_request(&raw).unwrap();
    assert_eq!(decode_request(&encoded), Err(DecodeError::MissingValue));
}

#[test]
fn test_empty_key() {
    let raw = RawRequest::new("get", "", None);
    let encoded = encode_raw_request(&raw).unwrap();
    assert_eq!(decode_request(&encoded), Err(DecodeError::EmptyKey));
}

#[test]
fn test_delete_with_value_decodes() {
    let raw = RawRequest::new("delete", "a", Some("ignored".to_string()));
    let encoded = encode_raw_request(&raw).unwrap();
    assert_eq!(decode_request(&encoded), Ok(Request::delete("a")));
}

#[test]
fn test_unknown_response_status() {
    // kind, status "oops", value None
    let bytes = [RESPONSE_KIND, 0x04, b'o', b'o', b'p', b's', 0x00];
    assert_eq!(
        decode_response(&bytes),
        Err(DecodeError::UnknownStatus("oops".to_string()))
    );
}

#[test]
fn test_not_found_with_value_rejected() {
    // kind, status "not_found", Some("x")
    let mut bytes = vec![RESPONSE_KIND, 0x09];
    bytes.extend_from_slice(b"not_found");
    bytes.extend_from_slice(&[0x01, 0x01, b'x']);
    assert_eq!(
        decode_response(&bytes),
        Err(DecodeError::UnexpectedValue("not_found"))
    );
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_write_read_request() {
    let request = Request::set("key", "value");

    let mut buffer = Vec::new();
    write_request(&mut buffer, &request).unwrap();

    let mut cursor = Cursor::new(buffer);
    let packet = read_frame(&mut cursor, MAX_FRAME_SIZE).unwrap().unwrap();
    assert_eq!(decode_request(&packet).unwrap(), request);
}

#[test]
fn test_stream_write_read_response() {
    let resp = Response::ok(Some("result".to_string()));

    let mut buffer = Vec::new();
    write_response(&mut buffer, &resp).unwrap();

    let mut cursor = Cursor::new(buffer);
    assert_eq!(read_response(&mut cursor).unwrap(), resp);
}

#[test]
fn test_stream_multiple_requests() {
    let requests = vec![
        Request::set("k1", "v1"),
        Request::get("k1"),
        Request::delete("k1"),
    ];

    let mut buffer = Vec::new();
    for request in &requests {
        write_request(&mut buffer, request).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for expected in &requests {
        let packet = read_frame(&mut cursor, MAX_FRAME_SIZE).unwrap().unwrap();
        assert_eq!(&decode_request(&packet).unwrap(), expected);
    }
    assert!(read_frame(&mut cursor, MAX_FRAME_SIZE).unwrap().is_none());
}

#[test]
fn test_stream_multiple_responses() {
    let responses = vec![
        Response::ok(Some("data".to_string())),
        Response::not_found(),
        Response::error(),
        Response::ok(None),
    ];

    let mut buffer = Vec::new();
    for resp in &responses {
        write_response(&mut buffer, resp).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for expected in &responses {
        assert_eq!(&read_response(&mut cursor).unwrap(), expected);
    }
}

#[test]
fn test_read_frame_too_large() {
    let mut buffer = Vec::new();
    write_frame(&mut buffer, &[0u8; 64]).unwrap();

    let mut cursor = Cursor::new(buffer);
    match read_frame(&mut cursor, 32) {
        Err(KeyrackError::FrameTooLarge { len, max }) => {
            assert_eq!(len, 64);
            assert_eq!(max, 32);
        }
        other => panic!("Expected FrameTooLarge, got {:?}", other),
    }
}

#[test]
fn test_read_frame_truncated_payload() {
    let mut cursor = Cursor::new(vec![0x00, 0x00, 0x00, 0x0A, 0x51, 0x03]);
    assert!(matches!(
        read_frame(&mut cursor, MAX_FRAME_SIZE),
        Err(KeyrackError::Io(_))
    ));
}

#[test]
fn test_read_response_on_closed_stream() {
    let mut cursor = Cursor::new(Vec::<u8>::new());
    assert!(matches!(
        read_response(&mut cursor),
        Err(KeyrackError::Network(_))
    ));
}

// =============================================================================
// Wire Format Verification Tests
// =============================================================================

#[test]
fn test_wire_format_get() {
    let encoded = encode_request(&Request::get("test")).unwrap();

    // Expected: [0x51][0x03 g e t][0x04 t e s t][0x00]
    //           kind  action        key          value = None
    assert_eq!(encoded[0], REQUEST_KIND);
    assert_eq!(&encoded[1..5], &[0x03, b'g', b'e', b't']);
    assert_eq!(&encoded[5..10], &[0x04, b't', b'e', b's', b't']);
    assert_eq!(&encoded[10..], &[0x00]);
}

#[test]
fn test_wire_format_response_ok() {
    let encoded = encode_response(&Response::ok(Some("hi".to_string()))).unwrap();

    // Expected: [0x52][0x02 o k][0x01 0x02 h i]
    //           kind  status     Some(value)
    assert_eq!(
        encoded,
        vec![RESPONSE_KIND, 0x02, b'o', b'k', 0x01, 0x02, b'h', b'i']
    );
}

#[test]
fn test_wire_format_frame() {
    let mut buffer = Vec::new();
    write_frame(&mut buffer, &[0xAA, 0xBB]).unwrap();

    // Expected: [0x00 0x00 0x00 0x02][0xAA 0xBB]
    assert_eq!(buffer, vec![0x00, 0x00, 0x00, 0x02, 0xAA, 0xBB]);
}
