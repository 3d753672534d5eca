//! Command Builder Tests
//!
//! Argument marshaling, the command table and SET options.

use bytes::Bytes;
use redwire::command::{lookup, ArgShape, Existence, Expiry, OptionValue, COMMANDS};
use redwire::{Command, Error, SetOptions, ToArg};

// =============================================================================
// Helper Functions
// =============================================================================

fn args_of(command: &Command) -> Vec<String> {
    command
        .arguments()
        .iter()
        .map(|a| String::from_utf8_lossy(a).into_owned())
        .collect()
}

fn is_argument_error<T: std::fmt::Debug>(result: redwire::Result<T>) -> bool {
    matches!(result, Err(Error::Argument(_)))
}

// =============================================================================
// ToArg Tests
// =============================================================================

#[test]
fn test_text_and_bytes_args() {
    assert_eq!("abc".to_arg(), Bytes::from_static(b"abc"));
    assert_eq!(String::from("abc").to_arg(), Bytes::from_static(b"abc"));
    assert_eq!(b"a\0b".to_arg(), Bytes::from_static(b"a\0b"));
    assert_eq!(vec![1u8, 2, 3].to_arg(), Bytes::from_static(&[1, 2, 3]));
}

#[test]
fn test_integer_args_are_decimal() {
    assert_eq!(42i64.to_arg(), Bytes::from_static(b"42"));
    assert_eq!((-7i32).to_arg(), Bytes::from_static(b"-7"));
    assert_eq!(u64::MAX.to_arg(), Bytes::from_static(b"18446744073709551615"));
}

#[test]
fn test_float_args() {
    assert_eq!(1.5f64.to_arg(), Bytes::from_static(b"1.5"));
    assert_eq!(3.0f64.to_arg(), Bytes::from_static(b"3"));
    assert_eq!(f64::INFINITY.to_arg(), Bytes::from_static(b"inf"));
    assert_eq!(f64::NEG_INFINITY.to_arg(), Bytes::from_static(b"-inf"));
}

// =============================================================================
// Command Tests
// =============================================================================

#[test]
fn test_command_builder() {
    let command = Command::new("LRANGE").arg("list").arg(0i64).arg(-1i64);
    assert_eq!(command.name(), b"LRANGE");
    assert_eq!(args_of(&command), vec!["list", "0", "-1"]);
    assert_eq!(
        command.encode(),
        b"*4\r\n$6\r\nLRANGE\r\n$4\r\nlist\r\n$1\r\n0\r\n$2\r\n-1\r\n"
    );
}

#[test]
fn test_command_encode_into() {
    let mut buf = Vec::new();
    Command::new("PING").encode_into(&mut buf);
    Command::new("PING").encode_into(&mut buf);
    assert_eq!(buf, b"*1\r\n$4\r\nPING\r\n*1\r\n$4\r\nPING\r\n");
}

#[test]
fn test_unknown_command_passes_validation() {
    let command = Command::new("OBJECT").arg("ENCODING").arg("k");
    assert!(command.spec().is_none());
    assert!(command.validate().is_ok());
}

// =============================================================================
// Command Table Tests
// =============================================================================

#[test]
fn test_lookup_is_case_insensitive() {
    assert_eq!(lookup(b"get").map(|s| s.name), Some("GET"));
    assert_eq!(lookup(b"HgetAll").map(|s| s.name), Some("HGETALL"));
    assert!(lookup(b"NOPE").is_none());
}

#[test]
fn test_table_names_are_unique() {
    for (i, spec) in COMMANDS.iter().enumerate() {
        assert!(
            COMMANDS[i + 1..].iter().all(|other| other.name != spec.name),
            "duplicate entry for {}",
            spec.name
        );
        if let Some(max) = spec.max_args {
            assert!(spec.min_args <= max, "bad bounds for {}", spec.name);
        }
    }
}

#[test]
fn test_fixed_arity_checked() {
    assert!(Command::new("GET").arg("k").validate().is_ok());
    assert!(is_argument_error(Command::new("GET").validate()));
    assert!(is_argument_error(Command::new("GET").arg("a").arg("b").validate()));
    assert!(is_argument_error(Command::new("ping").arg("x").validate()));
}

#[test]
fn test_variadic_arity_checked() {
    assert!(is_argument_error(Command::mget(Vec::<&str>::new())));
    assert!(Command::mget(["a"]).is_ok());
    assert!(is_argument_error(Command::hmget("h", Vec::<&str>::new())));
    assert!(Command::hmget("h", ["f1", "f2"]).is_ok());
    assert!(is_argument_error(Command::key_with_members("SADD", "s", Vec::<&str>::new())));
}

#[test]
fn test_pairs_shape() {
    assert_eq!(lookup(b"MSET").map(|s| s.shape), Some(ArgShape::Pairs));

    let mset = Command::mset([("k1", "v1"), ("k2", "v2")]).unwrap();
    assert_eq!(args_of(&mset), vec!["k1", "v1", "k2", "v2"]);

    assert!(is_argument_error(Command::mset(Vec::<(&str, &str)>::new())));
    assert!(is_argument_error(Command::new("MSET").args(["k1", "v1", "k2"]).checked()));
}

#[test]
fn test_key_then_pairs_shape() {
    let hmset = Command::hmset("h", [("f", 1i64)]).unwrap();
    assert_eq!(args_of(&hmset), vec!["h", "f", "1"]);

    assert!(is_argument_error(Command::hmset("h", Vec::<(&str, &str)>::new())));
    assert!(is_argument_error(Command::new("HMSET").args(["h", "f1", "v1", "f2"]).checked()));
}

// =============================================================================
// SET Option Tests
// =============================================================================

#[test]
fn test_set_without_options() {
    let command = Command::set("k", "v", &SetOptions::new());
    assert_eq!(args_of(&command), vec!["k", "v"]);
}

#[test]
fn test_set_with_options() {
    let options = SetOptions::new().ex(10).unwrap().nx().unwrap();
    assert_eq!(options.expiry(), Some(Expiry::Seconds(10)));
    assert_eq!(options.existence(), Some(Existence::IfAbsent));

    let command = Command::set("k", "v", &options);
    assert_eq!(args_of(&command), vec!["k", "v", "EX", "10", "NX"]);
    assert!(command.validate().is_ok());

    let px = SetOptions::new().xx().unwrap().px(1500).unwrap();
    let command = Command::set("k", "v", &px);
    assert_eq!(args_of(&command), vec!["k", "v", "PX", "1500", "XX"]);
}

#[test]
fn test_set_expiry_conflict() {
    let err = SetOptions::new().ex(1).unwrap().px(1000).unwrap_err();
    match err {
        Error::Argument(msg) => assert_eq!(msg, "Only one of EX or PX can be set"),
        other => panic!("Expected argument error, got {:?}", other),
    }
}

#[test]
fn test_set_existence_conflict() {
    let err = SetOptions::new().nx().unwrap().xx().unwrap_err();
    match err {
        Error::Argument(msg) => assert_eq!(msg, "Only one of NX or XX can be set"),
        other => panic!("Expected argument error, got {:?}", other),
    }
}

#[test]
fn test_set_zero_expiry_rejected() {
    assert!(is_argument_error(SetOptions::new().ex(0)));
    assert!(is_argument_error(SetOptions::new().px(0)));
}

#[test]
fn test_set_options_from_pairs() {
    let options = SetOptions::from_pairs([
        ("EX", OptionValue::from(30)),
        ("XX", OptionValue::from(true)),
    ])
    .unwrap();
    assert_eq!(options.expiry(), Some(Expiry::Seconds(30)));
    assert_eq!(options.existence(), Some(Existence::IfPresent));

    let text = SetOptions::from_pairs([("PX", "250")]).unwrap();
    assert_eq!(text.expiry(), Some(Expiry::Millis(250)));

    let off = SetOptions::from_pairs([("NX", false)]).unwrap();
    assert_eq!(off.existence(), None);
}

#[test]
fn test_set_options_from_pairs_conflicts() {
    assert!(is_argument_error(SetOptions::from_pairs([("EX", 1), ("PX", 1)])));
    assert!(is_argument_error(SetOptions::from_pairs([("NX", true), ("XX", true)])));
}

#[test]
fn test_set_options_unknown_keys() {
    let err = SetOptions::from_pairs([("EX", 1), ("KEEPTTL", 1), ("GET", 1)]).unwrap_err();
    match err {
        Error::Argument(msg) => {
            assert!(msg.starts_with("unknown option(s) specified"));
            assert!(msg.contains("KEEPTTL"));
            assert!(msg.contains("GET"));
        }
        other => panic!("Expected argument error, got {:?}", other),
    }
}

#[test]
fn test_set_options_bad_expiry_value() {
    assert!(is_argument_error(SetOptions::from_pairs([("EX", "soon")])));
    assert!(is_argument_error(SetOptions::from_pairs([("EX", -5)])));
}
