//! Request/response tests over the mock transport

use bytes::Bytes;
use redwire::protocol::{encode_command, Reply};
use redwire::{Command, Config, Connection, Error, ReplyRule, SetOptions, Value};

use crate::mock::{connection, MockTransport};

// =============================================================================
// Execute Tests
// =============================================================================

#[test]
fn test_execute_writes_frame_and_reads_reply() {
    let (mut conn, log) = connection(&[Reply::bulk("bar")]);

    let value = conn
        .execute(&Command::new("GET").arg("foo"), ReplyRule::DEFAULT)
        .unwrap();

    assert_eq!(value, Value::Bytes(Bytes::from_static(b"bar")));
    assert_eq!(log.bytes(), encode_command(b"GET", &["foo"]));
}

#[test]
fn test_binary_value_round_trip() {
    let payload: &[u8] = b"\r\n\0\xff-*$";
    let (mut conn, log) = connection(&[Reply::status("OK"), Reply::bulk(payload)]);

    conn.set("bin", payload).unwrap();
    assert_eq!(conn.get("bin").unwrap().as_deref(), Some(payload));

    let mut expected = encode_command(b"SET", &[&b"bin"[..], payload]);
    expected.extend_from_slice(&encode_command(b"GET", &["bin"]));
    assert_eq!(log.bytes(), expected);
}

#[test]
fn test_reply_error_raised_and_connection_stays_open() {
    let (mut conn, _log) = connection(&[Reply::error("ERR unknown command"), Reply::status("PONG")]);

    let err = conn
        .execute(&Command::new("FOO"), ReplyRule::DEFAULT)
        .unwrap_err();
    assert!(matches!(err, Error::Reply(_)));
    assert!(!conn.is_closed());

    assert_eq!(conn.ping().unwrap(), "PONG");
}

#[test]
fn test_reply_error_returned_under_return_policy() {
    let (mut conn, _log) = connection(&[Reply::error("WRONGTYPE nope")]);

    let value = conn
        .execute(&Command::new("LLEN").arg("k"), ReplyRule::DEFAULT.return_errors())
        .unwrap();
    assert_eq!(value.as_error().map(|e| e.code()), Some("WRONGTYPE"));
}

#[test]
fn test_invalid_arguments_write_nothing() {
    let (mut conn, log) = connection(&[]);

    let err = conn.execute(&Command::new("GET"), ReplyRule::DEFAULT).unwrap_err();
    assert!(matches!(err, Error::Argument(_)));

    assert!(conn.mget(Vec::<&str>::new()).is_err());
    assert!(conn.hmset("h", Vec::<(&str, &str)>::new()).is_err());

    assert!(log.is_empty());
    assert!(!conn.is_closed());
}

#[test]
fn test_set_option_conflict_writes_nothing() {
    let (mut conn, log) = connection(&[]);

    let result = SetOptions::new()
        .ex(10)
        .and_then(|o| o.px(100))
        .and_then(|o| conn.set_with("k", "v", &o));

    assert!(matches!(result, Err(Error::Argument(_))));
    assert!(log.is_empty());
}

// =============================================================================
// Typed Wrapper Tests
// =============================================================================

#[test]
fn test_auth_rejected() {
    let (mut conn, _log) = connection(&[Reply::error("ERR invalid password")]);

    match conn.auth("wrong") {
        Err(Error::Auth(msg)) => assert_eq!(msg, "ERR invalid password"),
        other => panic!("Expected auth error, got {:?}", other),
    }
    assert!(!conn.is_closed());
}

#[test]
fn test_auth_accepted() {
    let (mut conn, log) = connection(&[Reply::status("OK")]);
    conn.auth("secret").unwrap();
    assert_eq!(log.bytes(), encode_command(b"AUTH", &["secret"]));
}

#[test]
fn test_set_with_options_frame() {
    let (mut conn, log) = connection(&[Reply::status("OK"), Reply::Bulk(None)]);
    let options = SetOptions::new().px(1500).unwrap().nx().unwrap();

    assert!(conn.set_with("k", "v", &options).unwrap());
    // Second attempt loses the NX race
    assert!(!conn.set_with("k", "v", &options).unwrap());

    let frame = encode_command(b"SET", &["k", "v", "PX", "1500", "NX"]);
    assert_eq!(log.bytes(), [frame.clone(), frame].concat());
}

#[test]
fn test_boolean_wrappers() {
    let (mut conn, _log) = connection(&[
        Reply::Integer(1),
        Reply::Integer(0),
        Reply::Integer(1),
        Reply::Integer(0),
    ]);

    assert!(conn.exists("a").unwrap());
    assert!(!conn.setnx("a", "1").unwrap());
    assert!(conn.hset("h", "f", "v").unwrap());
    assert!(!conn.sismember("s", "m").unwrap());
}

#[test]
fn test_hgetall_reshapes_pairs() {
    let (mut conn, _log) = connection(&[
        Reply::array(vec![
            Reply::bulk("f1"),
            Reply::bulk("v1"),
            Reply::bulk("f2"),
            Reply::bulk("v2"),
        ]),
        Reply::array(vec![]),
    ]);

    let map = conn.hgetall("h").unwrap().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&b"f1"[..]), Some(&Bytes::from_static(b"v1")));
    assert_eq!(map.get(&b"f2"[..]), Some(&Bytes::from_static(b"v2")));

    assert_eq!(conn.hgetall("missing").unwrap(), None);
}

#[test]
fn test_hgetall_odd_count() {
    let (mut conn, _log) = connection(&[Reply::array(vec![
        Reply::bulk("f1"),
        Reply::bulk("v1"),
        Reply::bulk("f2"),
    ])]);

    assert!(matches!(conn.hgetall("h"), Err(Error::UnexpectedReply(_))));
    assert!(!conn.is_closed());
}

#[test]
fn test_mget_sparse_values() {
    let (mut conn, log) = connection(&[
        Reply::array(vec![Reply::bulk("1"), Reply::Bulk(None), Reply::bulk("")]),
        Reply::array(vec![]),
    ]);

    let values = conn.mget(["a", "b", "c"]).unwrap();
    assert_eq!(values, vec![Some(Bytes::from_static(b"1")), None, None]);
    assert_eq!(
        &log.bytes()[..],
        &encode_command(b"MGET", &["a", "b", "c"])[..]
    );

    assert!(conn.hmget("h", ["x"]).unwrap().is_empty());
}

#[test]
fn test_empty_collections_as_nil() {
    let (mut conn, _log) = connection(&[
        Reply::array(vec![]),
        Reply::array(vec![]),
        Reply::array(vec![]),
        Reply::array(vec![]),
    ]);

    assert_eq!(conn.keys("nothing*").unwrap(), None);
    assert_eq!(conn.hkeys("h").unwrap(), None);
    assert_eq!(conn.hvals("h").unwrap(), None);
    // SMEMBERS keeps the empty list
    assert!(conn.smembers("s").unwrap().is_empty());
}

#[test]
fn test_sorted_set_wrappers() {
    let (mut conn, log) = connection(&[
        Reply::Integer(1),
        Reply::bulk("2.5"),
        Reply::Bulk(None),
        Reply::Integer(0),
        Reply::Bulk(None),
    ]);

    assert_eq!(conn.zadd("z", 2.5, "m").unwrap(), 1);
    assert_eq!(conn.zscore("z", "m").unwrap(), Some(2.5));
    assert_eq!(conn.zscore("z", "gone").unwrap(), None);
    assert_eq!(conn.zrank("z", "m").unwrap(), Some(0));
    assert_eq!(conn.zrevrank("z", "gone").unwrap(), None);

    let log = log.bytes();
    let zadd = encode_command(b"ZADD", &["z", "2.5", "m"]);
    assert_eq!(&log[..zadd.len()], &zadd[..]);
}

#[test]
fn test_transaction_wrappers() {
    let (mut conn, _log) = connection(&[
        Reply::status("OK"),
        Reply::status("QUEUED"),
        Reply::array(vec![Reply::Integer(1)]),
        Reply::status("OK"),
        Reply::Array(None),
    ]);

    conn.multi().unwrap();
    let queued = conn
        .execute(&Command::new("INCR").arg("n"), ReplyRule::DEFAULT.status_to_symbol())
        .unwrap();
    assert_eq!(queued.as_status(), Some("QUEUED"));
    assert_eq!(conn.exec().unwrap(), Some(vec![Value::Int(1)]));

    conn.multi().unwrap();
    assert_eq!(conn.exec().unwrap(), None);
}

#[test]
fn test_unexpected_shape_is_not_fatal() {
    let (mut conn, _log) = connection(&[Reply::status("OK"), Reply::Integer(3)]);

    assert!(matches!(conn.incr("k"), Err(Error::UnexpectedReply(_))));
    assert!(!conn.is_closed());
    assert_eq!(conn.incr("k").unwrap(), 3);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_premature_eof_closes_connection() {
    let (transport, _log) = MockTransport::raw(&b"$10\r\nshort"[..]);
    let mut conn = Connection::with_transport(transport, &Config::default()).unwrap();

    let err = conn.get("k").unwrap_err();
    assert!(matches!(err, Error::PrematureEof(_)));
    assert!(conn.is_closed());
    assert!(matches!(conn.ping(), Err(Error::Closed)));
}

#[test]
fn test_protocol_error_closes_connection() {
    let (transport, _log) = MockTransport::raw(&b"?what\r\n"[..]);
    let mut conn = Connection::with_transport(transport, &Config::default()).unwrap();

    assert!(matches!(conn.ping(), Err(Error::Protocol(_))));
    assert!(conn.is_closed());
}

#[test]
fn test_write_failure_closes_connection() {
    let (transport, _log) = MockTransport::new(&[Reply::status("PONG")]);
    let transport = transport.failing_writes();
    let mut conn = Connection::with_transport(transport, &Config::default()).unwrap();

    let err = conn.ping().unwrap_err();
    assert!(err.is_connection_error());
    assert!(conn.is_closed());
}

#[test]
fn test_closed_connection() {
    let (mut conn, log) = connection(&[Reply::status("PONG")]);

    conn.close();
    conn.close();
    assert!(conn.is_closed());

    assert!(matches!(conn.ping(), Err(Error::Closed)));
    assert!(matches!(conn.queue(&Command::new("PING")), Err(Error::Closed)));
    assert!(matches!(conn.drain_one(), Err(Error::Closed)));
    assert!(matches!(conn.host(), Err(Error::Closed)));
    assert!(matches!(conn.keepalive(), Err(Error::Closed)));
    assert!(log.is_empty());
}

#[test]
fn test_accessors() {
    let config = Config::builder().tcp("cache.internal", 7000).build();
    let (transport, _log) = MockTransport::new(&[]);
    let mut conn = Connection::with_transport(transport, &config).unwrap();

    assert_eq!(conn.host().unwrap(), Some("cache.internal"));
    assert_eq!(conn.port().unwrap(), Some(7000));
    assert_eq!(conn.unix_path().unwrap(), None);
    assert!(!conn.keepalive().unwrap());

    // The mock has no socket options
    assert!(conn.enable_keepalive().is_err());
    assert!(!conn.keepalive().unwrap());
}
