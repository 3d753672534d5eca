//! Encoder Tests
//!
//! Request framing and binary safety.

use bytes::Bytes;
use redwire::protocol::{
    decode_reply, encode_command, encode_command_into, encode_reply, encoded_len, write_command,
    Reply,
};

// =============================================================================
// Request Encoding Tests
// =============================================================================

#[test]
fn test_encode_no_args() {
    let encoded = encode_command::<&[u8]>(b"PING", &[]);
    assert_eq!(encoded, b"*1\r\n$4\r\nPING\r\n");
}

#[test]
fn test_encode_with_args() {
    let encoded = encode_command(b"SET", &["key", "value"]);
    assert_eq!(encoded, b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n");
}

#[test]
fn test_encode_empty_argument() {
    let encoded = encode_command(b"SET", &["k", ""]);
    assert_eq!(encoded, b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$0\r\n\r\n");
}

#[test]
fn test_encode_binary_argument_verbatim() {
    let payload: &[u8] = b"a\r\nb\0c\n";
    let encoded = encode_command(b"SET", &[&b"bin"[..], payload]);

    let mut expected = b"*3\r\n$3\r\nSET\r\n$3\r\nbin\r\n$7\r\n".to_vec();
    expected.extend_from_slice(payload);
    expected.extend_from_slice(b"\r\n");
    assert_eq!(encoded, expected);
}

#[test]
fn test_encoded_len_matches_output() {
    let args = vec![Bytes::from_static(b"x"), Bytes::from(vec![0u8; 1000]), Bytes::new()];
    let encoded = encode_command(b"RPUSH", &args);
    assert_eq!(encoded.len(), encoded_len(b"RPUSH", &args));
}

#[test]
fn test_encode_into_appends() {
    let mut buf = encode_command(b"INCR", &["a"]);
    encode_command_into(&mut buf, b"INCR", &["b"]);
    assert_eq!(buf, b"*2\r\n$4\r\nINCR\r\n$1\r\na\r\n*2\r\n$4\r\nINCR\r\n$1\r\nb\r\n");
}

#[test]
fn test_write_command_to_writer() {
    let mut out = Vec::new();
    write_command(&mut out, b"GET", &["k"]).unwrap();
    assert_eq!(out, b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n");
}

// =============================================================================
// Binary Round Trip Tests
// =============================================================================

#[test]
fn test_binary_payload_survives_bulk_echo() {
    // Every byte value, plus CRLF sequences that would break a line-based reader
    let mut payload: Vec<u8> = (0..=255u8).collect();
    payload.extend_from_slice(b"\r\n\r\n\0");

    let encoded = encode_reply(&Reply::bulk(payload.clone()));
    let decoded = decode_reply(&encoded).unwrap();

    assert_eq!(decoded, Reply::bulk(payload));
}

#[test]
fn test_request_frame_parses_as_array_of_bulks() {
    // A request is itself a valid reply frame: array of bulk strings
    let encoded = encode_command(b"HSET", &[&b"h"[..], &b"f\r\n"[..], &b"\0"[..]]);
    let decoded = decode_reply(&encoded).unwrap();

    assert_eq!(
        decoded,
        Reply::array(vec![
            Reply::bulk("HSET"),
            Reply::bulk("h"),
            Reply::bulk(&b"f\r\n"[..]),
            Reply::bulk(&b"\0"[..]),
        ])
    );
}

// =============================================================================
// Reply Encoding Tests
// =============================================================================

#[test]
fn test_encode_reply_scalars() {
    assert_eq!(encode_reply(&Reply::status("OK")), b"+OK\r\n");
    assert_eq!(encode_reply(&Reply::error("ERR bad")), b"-ERR bad\r\n");
    assert_eq!(encode_reply(&Reply::Integer(-42)), b":-42\r\n");
    assert_eq!(encode_reply(&Reply::Bulk(None)), b"$-1\r\n");
    assert_eq!(encode_reply(&Reply::Array(None)), b"*-1\r\n");
}

#[test]
fn test_encode_reply_nested() {
    let reply = Reply::array(vec![
        Reply::Integer(1),
        Reply::array(vec![Reply::bulk("a"), Reply::Bulk(None)]),
    ]);
    assert_eq!(encode_reply(&reply), b"*2\r\n:1\r\n*2\r\n$1\r\na\r\n$-1\r\n");
}
