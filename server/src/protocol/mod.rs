/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! The wire-protocol codec: an incremental decoder for the array and inline
//! command grammars, plus the reply encoders. The decoder is stateless over
//! the buffer: the caller owns it and splices off however many leading
//! bytes were reported consumed.

use bytes::{Bytes, BytesMut};

#[cfg(test)]
mod tests;

/// The outcome of attempting to decode one command from the front of a
/// buffer.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseResult {
    /// A complete command was decoded; `consumed` leading bytes of the
    /// input were the encoding of it and should be dropped by the caller.
    Command(Vec<Bytes>, usize),
    /// The buffer doesn't yet hold a complete command. Zero bytes were
    /// consumed; the caller should wait for more input before retrying.
    Incomplete,
    /// The buffer starts with bytes that can never form a valid command.
    /// `consumed` bytes were inspected to reach this conclusion.
    ProtocolError(String, usize),
}

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// Attempts to decode one command from the front of `buf`.
pub fn decode_command(buf: &[u8]) -> ParseResult {
    if buf.is_empty() {
        return ParseResult::Incomplete;
    }
    if buf[0] == b'*' {
        decode_array(buf)
    } else {
        decode_inline(buf)
    }
}

/// Finds the offset of the next `\r\n` in `buf` starting at `from`, if any.
fn find_crlf(buf: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i + 1 < buf.len() {
        if buf[i] == CR && buf[i + 1] == LF {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn parse_decimal(s: &[u8]) -> Option<i64> {
    if s.is_empty() {
        return None;
    }
    std::str::from_utf8(s).ok()?.parse::<i64>().ok()
}

fn decode_array(buf: &[u8]) -> ParseResult {
    let Some(header_end) = find_crlf(buf, 1) else {
        return ParseResult::Incomplete;
    };
    let Some(n) = parse_decimal(&buf[1..header_end]) else {
        return ParseResult::ProtocolError("invalid multibulk length".into(), buf.len());
    };
    if n < 0 {
        return ParseResult::ProtocolError("invalid multibulk length".into(), buf.len());
    }
    let mut cursor = header_end + 2;
    let mut args = Vec::with_capacity(n as usize);
    for _ in 0..n {
        if cursor >= buf.len() {
            return ParseResult::Incomplete;
        }
        if buf[cursor] != b'$' {
            return ParseResult::ProtocolError(
                "expected '$', got something else".into(),
                buf.len(),
            );
        }
        let Some(len_end) = find_crlf(buf, cursor + 1) else {
            return ParseResult::Incomplete;
        };
        let Some(l) = parse_decimal(&buf[cursor + 1..len_end]) else {
            return ParseResult::ProtocolError("invalid bulk length".into(), buf.len());
        };
        if l < 0 {
            return ParseResult::ProtocolError("invalid bulk length".into(), buf.len());
        }
        let l = l as usize;
        let data_start = len_end + 2;
        let data_end = data_start + l;
        let term_end = data_end + 2;
        if buf.len() < term_end {
            return ParseResult::Incomplete;
        }
        if &buf[data_end..term_end] != b"\r\n" {
            return ParseResult::ProtocolError(
                "expected CRLF after bulk payload".into(),
                buf.len(),
            );
        }
        args.push(Bytes::copy_from_slice(&buf[data_start..data_end]));
        cursor = term_end;
    }
    ParseResult::Command(args, cursor)
}

fn decode_inline(buf: &[u8]) -> ParseResult {
    // Accept a bare '\n' as a line terminator for inline commands, but only
    // the first one found; a leading '\r' is kept as part of the search so
    // "foo\r\n" is not double-trimmed.
    let mut end = None;
    for (i, &b) in buf.iter().enumerate() {
        if b == LF {
            end = Some(i);
            break;
        }
    }
    let Some(lf) = end else {
        return ParseResult::Incomplete;
    };
    let line_end = if lf > 0 && buf[lf - 1] == CR { lf - 1 } else { lf };
    let consumed = lf + 1;
    let line = &buf[..line_end];
    if line.is_empty() {
        return ParseResult::ProtocolError("empty command".into(), consumed);
    }
    let args: Vec<Bytes> = line
        .split(|&b| b == b' ')
        .filter(|t| !t.is_empty())
        .map(Bytes::copy_from_slice)
        .collect();
    if args.is_empty() {
        return ParseResult::ProtocolError("empty command".into(), consumed);
    }
    ParseResult::Command(args, consumed)
}

/// Encodes a command vector in array form, for use by property tests
/// checking the round-trip between encode and [`decode_command`].
pub fn encode_array(args: &[Bytes]) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(format!("*{}\r\n", args.len()).as_bytes());
    for a in args {
        buf.extend_from_slice(format!("${}\r\n", a.len()).as_bytes());
        buf.extend_from_slice(a);
        buf.extend_from_slice(b"\r\n");
    }
    buf
}

/// Appends a `+<text>\r\n` simple string reply.
pub fn write_simple_string(buf: &mut BytesMut, text: &str) {
    buf.reserve(text.len() + 3);
    buf.extend_from_slice(b"+");
    buf.extend_from_slice(text.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

/// Appends a `-ERR <text>\r\n` error reply. `text` already carries the `ERR `
/// prefix by convention of [`crate::actions::ActionError`]'s `Display` impl.
pub fn write_error(buf: &mut BytesMut, text: &str) {
    buf.reserve(text.len() + 4);
    buf.extend_from_slice(b"-");
    buf.extend_from_slice(text.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

/// Appends a `:<n>\r\n` integer reply.
pub fn write_integer(buf: &mut BytesMut, n: i64) {
    buf.extend_from_slice(b":");
    buf.extend_from_slice(n.to_string().as_bytes());
    buf.extend_from_slice(b"\r\n");
}

/// Appends a bulk string reply, or `$-1\r\n` for `None`.
pub fn write_bulk(buf: &mut BytesMut, value: Option<&[u8]>) {
    match value {
        None => buf.extend_from_slice(b"$-1\r\n"),
        Some(v) => {
            buf.reserve(v.len() + 16);
            buf.extend_from_slice(format!("${}\r\n", v.len()).as_bytes());
            buf.extend_from_slice(v);
            buf.extend_from_slice(b"\r\n");
        }
    }
}

/// Appends a `*<n>\r\n` array header; callers then append `n` bulk replies.
pub fn write_array_header(buf: &mut BytesMut, n: usize) {
    buf.extend_from_slice(format!("*{n}\r\n").as_bytes());
}

/// Renders an `f64` score the way sorted-set replies require: the shortest
/// decimal that round-trips to the same value, with a trailing `.0` when the
/// value is integral so `2.0` never prints as bare `2`.
pub fn format_score(score: f64) -> String {
    if score.is_nan() {
        return "nan".to_string();
    }
    let s = format!("{score}");
    if s.contains('.') || s.contains('e') || s.contains("inf") {
        s
    } else {
        format!("{s}.0")
    }
}

#[cfg(test)]
mod format_tests {
    use super::format_score;

    #[test]
    fn integral_scores_get_trailing_dot_zero() {
        assert_eq!(format_score(1.0), "1.0");
        assert_eq!(format_score(2.0), "2.0");
        assert_eq!(format_score(-3.0), "-3.0");
    }

    #[test]
    fn fractional_scores_keep_shortest_form() {
        assert_eq!(format_score(1.5), "1.5");
        assert_eq!(format_score(0.1), "0.1");
    }
}
