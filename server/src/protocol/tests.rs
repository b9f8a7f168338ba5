/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

use super::*;
use rand::Rng;

fn args(strs: &[&str]) -> Vec<Bytes> {
    strs.iter().map(|s| Bytes::copy_from_slice(s.as_bytes())).collect()
}

#[test]
fn array_form_ping() {
    let buf = b"*1\r\n$4\r\nPING\r\n";
    match decode_command(buf) {
        ParseResult::Command(a, consumed) => {
            assert_eq!(a, args(&["PING"]));
            assert_eq!(consumed, buf.len());
        }
        other => panic!("expected Command, got {other:?}"),
    }
}

#[test]
fn inline_bare_lf() {
    let buf = b"PING\n";
    match decode_command(buf) {
        ParseResult::Command(a, consumed) => {
            assert_eq!(a, args(&["PING"]));
            assert_eq!(consumed, buf.len());
        }
        other => panic!("expected Command, got {other:?}"),
    }
}

#[test]
fn incremental_parse_of_a_split_array() {
    let prefix = b"*2\r\n$3\r\nGET\r\n$3\r\nke";
    assert_eq!(decode_command(prefix), ParseResult::Incomplete);

    let mut full = prefix.to_vec();
    full.extend_from_slice(b"y\r\n");
    match decode_command(&full) {
        ParseResult::Command(a, consumed) => {
            assert_eq!(a, args(&["GET", "key"]));
            assert_eq!(consumed, full.len());
        }
        other => panic!("expected Command, got {other:?}"),
    }
}

#[test]
fn empty_inline_line_is_a_protocol_error() {
    match decode_command(b"\n") {
        ParseResult::ProtocolError(_, _) => {}
        other => panic!("expected ProtocolError, got {other:?}"),
    }
}

#[test]
fn negative_multibulk_length_is_a_protocol_error() {
    match decode_command(b"*-1\r\n") {
        ParseResult::ProtocolError(_, _) => {}
        other => panic!("expected ProtocolError, got {other:?}"),
    }
}

#[test]
fn bare_lf_inside_array_frame_is_a_protocol_error() {
    match decode_command(b"*1\n$4\r\nPING\r\n") {
        ParseResult::ProtocolError(_, _) => {}
        other => panic!("expected ProtocolError, got {other:?}"),
    }
}

// P2: feeding any proper prefix of a complete command yields Incomplete and
// consumes zero bytes; feeding the whole thing yields Command consuming all
// of it.
#[test]
fn property_parser_incrementality() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let nargs = rng.gen_range(1..5);
        let words: Vec<Bytes> = (0..nargs)
            .map(|_| {
                let len = rng.gen_range(0..12);
                Bytes::from(
                    crate::util::test_utils::random_string(&mut rng, len).into_bytes(),
                )
            })
            .collect();
        let encoded = encode_array(&words);
        let n = encoded.len();
        for i in 0..n {
            let prefix = &encoded[..i];
            match decode_command(prefix) {
                ParseResult::Incomplete => {}
                ParseResult::Command(_, consumed) => assert_eq!(i, n, "consumed {consumed} at split {i}"),
                ParseResult::ProtocolError(msg, _) => panic!("unexpected protocol error at split {i}: {msg}"),
            }
        }
        match decode_command(&encoded) {
            ParseResult::Command(got, consumed) => {
                assert_eq!(got, words);
                assert_eq!(consumed, n);
            }
            other => panic!("expected full buffer to decode, got {other:?}"),
        }
    }
}

// P3: encode(vector) then decode yields the same vector and consumes
// exactly the bytes produced.
#[test]
fn property_parser_round_trip() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let nargs = rng.gen_range(1..6);
        let words: Vec<Bytes> = (0..nargs)
            .map(|_| {
                let len = rng.gen_range(0..20);
                Bytes::from(
                    crate::util::test_utils::random_string(&mut rng, len).into_bytes(),
                )
            })
            .collect();
        let encoded = encode_array(&words);
        match decode_command(&encoded) {
            ParseResult::Command(got, consumed) => {
                assert_eq!(got, words);
                assert_eq!(consumed, encoded.len());
            }
            other => panic!("expected Command, got {other:?}"),
        }
    }
}
