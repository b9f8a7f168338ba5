/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! Per-connection command routing. Owns the inbound byte buffer, drains as
//! many complete commands as it can find on each inbound chunk, and returns
//! the encoded reply bytes for each plus whether the connection should close
//! after they're flushed.

use crate::actions::ActionError;
use crate::corestore::strings::{Expire, Op};
use crate::corestore::{Data, Store};
use crate::protocol::{self, ParseResult};
use bytes::{Bytes, BytesMut};

/// What the caller should do once the encoded replies produced by a call to
/// [`Dispatcher::poll`] have been written to the socket.
#[derive(Debug, PartialEq, Eq)]
pub enum PostWrite {
    Continue,
    Close,
}

pub struct Dispatcher {
    buf: BytesMut,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(libsky::BUF_CAP),
        }
    }

    /// Appends `chunk` to the internal buffer and drains every complete
    /// command currently available, encoding replies into `out`. Returns
    /// `PostWrite::Close` if any drained command (a protocol error or QUIT)
    /// means the connection should be closed once `out` is flushed.
    pub fn poll(&mut self, chunk: &[u8], store: &Store, out: &mut BytesMut) -> PostWrite {
        self.buf.extend_from_slice(chunk);
        loop {
            match protocol::decode_command(&self.buf) {
                ParseResult::Incomplete => return PostWrite::Continue,
                ParseResult::ProtocolError(msg, _consumed) => {
                    log::debug!("protocol error: {msg}");
                    protocol::write_error(out, &format!("ERR {msg}"));
                    // §4.3: reset the buffer and wait for the next inbound
                    // chunk; a malformed frame doesn't end the connection,
                    // only QUIT or an I/O error does.
                    self.buf.clear();
                    return PostWrite::Continue;
                }
                ParseResult::Command(args, consumed) => {
                    let _ = self.buf.split_to(consumed);
                    if dispatch(&args, store, out) == PostWrite::Close {
                        return PostWrite::Close;
                    }
                }
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn dispatch(args: &[Bytes], store: &Store, out: &mut BytesMut) -> PostWrite {
    let name = String::from_utf8_lossy(&args[0]).to_ascii_uppercase();
    let lower = name.to_ascii_lowercase();

    macro_rules! need {
        ($min:expr) => {
            if args.len() < $min {
                protocol::write_error(out, &ActionError::WrongArgs(lower.clone()).to_string());
                return PostWrite::Continue;
            }
        };
    }

    macro_rules! ok_result {
        ($r:expr) => {
            match $r {
                Ok(v) => v,
                Err(e) => {
                    protocol::write_error(out, &e.to_string());
                    return PostWrite::Continue;
                }
            }
        };
    }

    match name.as_str() {
        "PING" => {
            protocol::write_simple_string(out, "PONG");
            PostWrite::Continue
        }
        "QUIT" => {
            protocol::write_simple_string(out, "OK");
            PostWrite::Close
        }
        "GET" => {
            need!(2);
            let v = ok_result!(store.get(&key(&args[1])));
            protocol::write_bulk(out, v.as_deref());
            PostWrite::Continue
        }
        "SET" => {
            need!(3);
            let expire = match parse_set_options(&args[3..]) {
                Ok(e) => e,
                Err(e) => {
                    protocol::write_error(out, &e.to_string());
                    return PostWrite::Continue;
                }
            };
            ok_result!(store.set(&key(&args[1]), &key(&args[2]), expire));
            protocol::write_simple_string(out, "OK");
            PostWrite::Continue
        }
        "MSET" => {
            need!(3);
            if (args.len() - 1) % 2 != 0 {
                protocol::write_error(out, &ActionError::WrongArgs(lower).to_string());
                return PostWrite::Continue;
            }
            let pairs: Vec<(Data, Data)> = args[1..]
                .chunks(2)
                .map(|c| (key(&c[0]), key(&c[1])))
                .collect();
            ok_result!(store.mset(&pairs));
            protocol::write_simple_string(out, "OK");
            PostWrite::Continue
        }
        "MGET" => {
            need!(2);
            let keys: Vec<Data> = args[1..].iter().map(key).collect();
            let vals = ok_result!(store.mget(&keys));
            protocol::write_array_header(out, vals.len());
            for v in vals {
                protocol::write_bulk(out, v.as_deref());
            }
            PostWrite::Continue
        }
        "DEL" => {
            need!(2);
            let keys: Vec<Data> = args[1..].iter().map(key).collect();
            let n = ok_result!(store.del(&keys));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "EXISTS" => {
            need!(2);
            let keys: Vec<Data> = args[1..].iter().map(key).collect();
            let n = ok_result!(store.exists(&keys));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "INCR" => {
            need!(2);
            let n = ok_result!(store.incrby(&key(&args[1]), Op::Add, 1));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "DECR" => {
            need!(2);
            let n = ok_result!(store.incrby(&key(&args[1]), Op::Sub, 1));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "INCRBY" => {
            need!(3);
            let delta = match parse_i64(&args[2]) {
                Some(d) => d,
                None => {
                    protocol::write_error(out, &ActionError::NonInteger.to_string());
                    return PostWrite::Continue;
                }
            };
            let n = ok_result!(store.incrby(&key(&args[1]), Op::Add, delta));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "DECRBY" => {
            need!(3);
            // Pass the raw, non-negated magnitude through to `Op::Sub` so
            // overflow is judged on the real `old - n`, not on negating `n`
            // up front (which would overflow for n == i64::MIN even when
            // the actual subtraction wouldn't).
            let delta = match parse_i64(&args[2]) {
                Some(d) => d,
                None => {
                    protocol::write_error(out, &ActionError::NonInteger.to_string());
                    return PostWrite::Continue;
                }
            };
            let n = ok_result!(store.incrby(&key(&args[1]), Op::Sub, delta));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "EXPIRE" => {
            need!(3);
            let secs = match parse_i64(&args[2]) {
                Some(s) => s,
                None => {
                    protocol::write_error(out, &ActionError::NonInteger.to_string());
                    return PostWrite::Continue;
                }
            };
            let n = ok_result!(store.expire(&key(&args[1]), secs));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "TTL" => {
            need!(2);
            let n = ok_result!(store.ttl(&key(&args[1])));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "LPUSH" => {
            need!(3);
            let vals: Vec<Data> = args[2..].iter().map(key).collect();
            let n = ok_result!(store.lpush(&key(&args[1]), &vals));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "RPUSH" => {
            need!(3);
            let vals: Vec<Data> = args[2..].iter().map(key).collect();
            let n = ok_result!(store.rpush(&key(&args[1]), &vals));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "LLEN" => {
            need!(2);
            let n = ok_result!(store.llen(&key(&args[1])));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "LRANGE" => {
            need!(4);
            let (start, stop) = match (parse_i64(&args[2]), parse_i64(&args[3])) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    protocol::write_error(out, &ActionError::NonInteger.to_string());
                    return PostWrite::Continue;
                }
            };
            let vals = ok_result!(store.lrange(&key(&args[1]), start, stop));
            write_bulk_array(out, &vals);
            PostWrite::Continue
        }
        "HSET" => {
            need!(4);
            let n = ok_result!(store.hset(&key(&args[1]), &key(&args[2]), &key(&args[3])));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "HGET" => {
            need!(3);
            let v = ok_result!(store.hget(&key(&args[1]), &key(&args[2])));
            protocol::write_bulk(out, v.as_deref());
            PostWrite::Continue
        }
        "HDEL" => {
            need!(3);
            let fields: Vec<Data> = args[2..].iter().map(key).collect();
            let n = ok_result!(store.hdel(&key(&args[1]), &fields));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "HEXISTS" => {
            need!(3);
            let n = ok_result!(store.hexists(&key(&args[1]), &key(&args[2])));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "HGETALL" => {
            need!(2);
            let vals = ok_result!(store.hgetall(&key(&args[1])));
            write_bulk_array(out, &vals);
            PostWrite::Continue
        }
        "HKEYS" => {
            need!(2);
            let vals = ok_result!(store.hkeys(&key(&args[1])));
            write_bulk_array(out, &vals);
            PostWrite::Continue
        }
        "HVALS" => {
            need!(2);
            let vals = ok_result!(store.hvals(&key(&args[1])));
            write_bulk_array(out, &vals);
            PostWrite::Continue
        }
        "HLEN" => {
            need!(2);
            let n = ok_result!(store.hlen(&key(&args[1])));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "SADD" => {
            need!(3);
            let members: Vec<Data> = args[2..].iter().map(key).collect();
            let n = ok_result!(store.sadd(&key(&args[1]), &members));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "SMEMBERS" => {
            need!(2);
            let vals = ok_result!(store.smembers(&key(&args[1])));
            write_bulk_array(out, &vals);
            PostWrite::Continue
        }
        "SISMEMBER" => {
            need!(3);
            let n = ok_result!(store.sismember(&key(&args[1]), &key(&args[2])));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "SREM" => {
            need!(3);
            let members: Vec<Data> = args[2..].iter().map(key).collect();
            let n = ok_result!(store.srem(&key(&args[1]), &members));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "SCARD" => {
            need!(2);
            let n = ok_result!(store.scard(&key(&args[1])));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "SINTER" => {
            need!(2);
            let keys: Vec<Data> = args[1..].iter().map(key).collect();
            let vals = ok_result!(store.sinter(&keys));
            write_bulk_array(out, &vals);
            PostWrite::Continue
        }
        "SUNION" => {
            need!(2);
            let keys: Vec<Data> = args[1..].iter().map(key).collect();
            let vals = ok_result!(store.sunion(&keys));
            write_bulk_array(out, &vals);
            PostWrite::Continue
        }
        "ZADD" => {
            need!(4);
            if (args.len() - 2) % 2 != 0 {
                protocol::write_error(out, &ActionError::WrongArgs(lower).to_string());
                return PostWrite::Continue;
            }
            let mut pairs = Vec::with_capacity((args.len() - 2) / 2);
            for c in args[2..].chunks(2) {
                let score = match parse_f64(&c[0]) {
                    Some(s) => s,
                    None => {
                        protocol::write_error(out, &ActionError::NonFloat.to_string());
                        return PostWrite::Continue;
                    }
                };
                pairs.push((score, key(&c[1])));
            }
            let n = ok_result!(store.zadd(&key(&args[1]), &pairs));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "ZRANGE" => {
            need!(4);
            let withscores = args.get(4).is_some_and(|t| t.eq_ignore_ascii_case(b"WITHSCORES"));
            if args.len() > 4 && !withscores {
                protocol::write_error(out, &ActionError::SyntaxError.to_string());
                return PostWrite::Continue;
            }
            let (start, stop) = match (parse_i64(&args[2]), parse_i64(&args[3])) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    protocol::write_error(out, &ActionError::NonInteger.to_string());
                    return PostWrite::Continue;
                }
            };
            let vals = ok_result!(store.zrange(&key(&args[1]), start, stop));
            if withscores {
                protocol::write_array_header(out, vals.len() * 2);
                for (m, s) in vals {
                    protocol::write_bulk(out, Some(m.as_bytes()));
                    protocol::write_bulk(out, Some(protocol::format_score(s).as_bytes()));
                }
            } else {
                protocol::write_array_header(out, vals.len());
                for (m, _) in vals {
                    protocol::write_bulk(out, Some(m.as_bytes()));
                }
            }
            PostWrite::Continue
        }
        "ZRANK" => {
            need!(3);
            let r = ok_result!(store.zrank(&key(&args[1]), &key(&args[2])));
            match r {
                Some(rank) => protocol::write_integer(out, rank),
                None => protocol::write_bulk(out, None),
            }
            PostWrite::Continue
        }
        "ZREM" => {
            need!(3);
            let members: Vec<Data> = args[2..].iter().map(key).collect();
            let n = ok_result!(store.zrem(&key(&args[1]), &members));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "ZSCORE" => {
            need!(3);
            let s = ok_result!(store.zscore(&key(&args[1]), &key(&args[2])));
            protocol::write_bulk(out, s.map(|s| protocol::format_score(s).into_bytes()).as_deref());
            PostWrite::Continue
        }
        "ZCARD" => {
            need!(2);
            let n = ok_result!(store.zcard(&key(&args[1])));
            protocol::write_integer(out, n);
            PostWrite::Continue
        }
        "KEYS" => {
            need!(2);
            let vals = store.keys(&args[1]);
            write_bulk_array(out, &vals);
            PostWrite::Continue
        }
        _ => {
            protocol::write_error(
                out,
                &ActionError::UnknownCommand(String::from_utf8_lossy(&args[0]).into_owned()).to_string(),
            );
            PostWrite::Continue
        }
    }
}

fn key(b: &Bytes) -> Data {
    Data::from_bytes(b.clone())
}

fn write_bulk_array(out: &mut BytesMut, vals: &[Data]) {
    protocol::write_array_header(out, vals.len());
    for v in vals {
        protocol::write_bulk(out, Some(v.as_bytes()));
    }
}

fn parse_i64(b: &[u8]) -> Option<i64> {
    std::str::from_utf8(b).ok()?.parse().ok()
}

fn parse_f64(b: &[u8]) -> Option<f64> {
    let f: f64 = std::str::from_utf8(b).ok()?.parse().ok()?;
    if f.is_nan() {
        None
    } else {
        Some(f)
    }
}

/// Parses the `[EX s | PX ms]` tail of a SET command. Each option may
/// appear at most once; any other token is a syntax error.
fn parse_set_options(tail: &[Bytes]) -> Result<Option<Expire>, ActionError> {
    if tail.is_empty() {
        return Ok(None);
    }
    if tail.len() != 2 {
        return Err(ActionError::SyntaxError);
    }
    let opt = tail[0].to_ascii_uppercase();
    let n = parse_i64(&tail[1]).ok_or(ActionError::NonInteger)?;
    match opt.as_slice() {
        b"EX" => Ok(Some(Expire::Seconds(n))),
        b"PX" => Ok(Some(Expire::Millis(n))),
        _ => Err(ActionError::SyntaxError),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(store: &Store, cmds: &[&[&str]]) -> Vec<String> {
        let mut replies = Vec::new();
        for cmd in cmds {
            let args: Vec<Bytes> = cmd.iter().map(|s| Bytes::copy_from_slice(s.as_bytes())).collect();
            let mut out = BytesMut::new();
            dispatch(&args, store, &mut out);
            replies.push(String::from_utf8_lossy(&out).into_owned());
        }
        replies
    }

    #[test]
    fn ping() {
        let store = Store::new();
        let replies = run(&store, &[&["PING"]]);
        assert_eq!(replies[0], "+PONG\r\n");
    }

    #[test]
    fn set_get_ttl() {
        let store = Store::new();
        let replies = run(
            &store,
            &[&["SET", "foo", "bar", "EX", "10"], &["GET", "foo"], &["TTL", "foo"]],
        );
        assert_eq!(replies[0], "+OK\r\n");
        assert_eq!(replies[1], "$3\r\nbar\r\n");
        assert!(replies[2] == ":10\r\n" || replies[2] == ":9\r\n");
    }

    #[test]
    fn type_conflict() {
        let store = Store::new();
        run(&store, &[&["SET", "x", "1"]]);
        let replies = run(&store, &[&["LPUSH", "x", "a"]]);
        assert_eq!(replies[0], "-ERR wrong type\r\n");
    }

    #[test]
    fn incr_then_non_integer() {
        let store = Store::new();
        let replies = run(
            &store,
            &[&["INCR", "n"], &["SET", "n", "abc"], &["INCR", "n"]],
        );
        assert_eq!(replies[0], ":1\r\n");
        assert_eq!(replies[1], "+OK\r\n");
        assert_eq!(replies[2], "-ERR value is not an integer or out of range\r\n");
    }

    #[test]
    fn zset_rank_and_range_with_scores() {
        let store = Store::new();
        let replies = run(
            &store,
            &[
                &["ZADD", "lb", "2", "bob", "1", "alice"],
                &["ZRANGE", "lb", "0", "-1", "WITHSCORES"],
                &["ZRANK", "lb", "bob"],
                &["ZRANK", "lb", "ghost"],
            ],
        );
        assert_eq!(replies[0], ":2\r\n");
        assert_eq!(replies[1], "*4\r\n$5\r\nalice\r\n$3\r\n1.0\r\n$3\r\nbob\r\n$3\r\n2.0\r\n");
        assert_eq!(replies[2], ":1\r\n");
        assert_eq!(replies[3], "$-1\r\n");
    }

    #[test]
    fn keys_glob_through_dispatch() {
        let store = Store::new();
        run(
            &store,
            &[
                &["SET", "abc", "1"],
                &["SET", "axc", "1"],
                &["SET", "az", "1"],
                &["SET", "abb", "1"],
            ],
        );
        let replies = run(&store, &[&["KEYS", "a?c"]]);
        assert_eq!(replies[0], "*2\r\n$3\r\nabc\r\n$3\r\naxc\r\n");
        let replies = run(&store, &[&["KEYS", "ab[bc]"]]);
        assert_eq!(replies[0], "*2\r\n$3\r\nabb\r\n$3\r\nabc\r\n");
    }

    #[test]
    fn unknown_command() {
        let store = Store::new();
        let replies = run(&store, &[&["NOTACOMMAND"]]);
        assert_eq!(replies[0], "-ERR unknown command 'NOTACOMMAND'\r\n");
    }

    #[test]
    fn wrong_arity() {
        let store = Store::new();
        let replies = run(&store, &[&["GET"]]);
        assert_eq!(replies[0], "-ERR wrong number of arguments for 'get' command\r\n");
    }

    #[test]
    fn quit_closes_after_ok() {
        let store = Store::new();
        let args = vec![Bytes::from_static(b"QUIT")];
        let mut out = BytesMut::new();
        let post = dispatch(&args, &store, &mut out);
        assert_eq!(post, PostWrite::Close);
        assert_eq!(out.as_ref(), b"+OK\r\n");
    }

    #[test]
    fn protocol_error_resets_buffer_without_closing() {
        let store = Store::new();
        let mut disp = Dispatcher::new();
        let mut out = BytesMut::new();
        let post = disp.poll(b"*-1\r\n", &store, &mut out);
        assert_eq!(post, PostWrite::Continue);
        assert!(String::from_utf8_lossy(&out).starts_with("-ERR "));

        // the buffer was reset, so a well-formed command right after still
        // parses cleanly on the next chunk
        let mut out2 = BytesMut::new();
        let post2 = disp.poll(b"*1\r\n$4\r\nPING\r\n", &store, &mut out2);
        assert_eq!(post2, PostWrite::Continue);
        assert_eq!(out2.as_ref(), b"+PONG\r\n");
    }

    #[test]
    fn get_on_list_key_is_wrong_type_not_null() {
        let store = Store::new();
        run(&store, &[&["LPUSH", "x", "a"]]);
        let replies = run(&store, &[&["GET", "x"]]);
        assert_eq!(replies[0], "-ERR wrong type\r\n");
    }
}
