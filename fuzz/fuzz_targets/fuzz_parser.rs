#![no_main]

//! Runs an arbitrary script of parser operations over arbitrary input and
//! checks every result against a plain index into the same bytes.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use peekstream::{Decoded, ParserOptions, StreamError, StreamParser, utf8};

#[derive(Debug, Arbitrary)]
enum Op {
    Peek(u16),
    PeekN(u8),
    PeekChar,
    PeekStr(Vec<u8>),
    PeekAndConsume(Vec<u8>),
    Consume,
    ConsumeN(u16),
    ConsumeChar,
    ConsumeWhitespace,
}

#[derive(Debug, Arbitrary)]
struct Script {
    data: Vec<u8>,
    lookahead: u8,
    unicode_whitespace: bool,
    ops: Vec<Op>,
}

fn decode_at(data: &[u8], pos: usize) -> (Decoded, usize) {
    if pos >= data.len() {
        return (Decoded::EndOfStream, 0);
    }
    let end = (pos + utf8::MAX_SEQUENCE_LEN).min(data.len());
    utf8::decode(&data[pos..end])
}

/// Where whitespace skipping starting at `pos` stops.
fn skip_whitespace(data: &[u8], mut pos: usize, unicode: bool) -> (usize, usize) {
    let mut skipped = 0;
    loop {
        let step = if unicode {
            match decode_at(data, pos) {
                (Decoded::Char(cp), used) if utf8::is_whitespace(cp) => used,
                _ => break,
            }
        } else {
            match data.get(pos) {
                Some(b' ' | b'\t' | b'\r' | b'\n') => 1,
                _ => break,
            }
        };
        pos += step;
        skipped += 1;
    }
    (pos, skipped)
}

fn too_large<T>(result: &Result<T, StreamError>) -> bool {
    matches!(result, Err(StreamError::LookaheadTooLarge { .. }))
}

fuzz_target!(|script: Script| {
    let Script {
        data,
        lookahead,
        unicode_whitespace,
        ops,
    } = script;

    let options = ParserOptions {
        lookahead: usize::from(lookahead),
        stall_limit: u32::MAX,
        eof_stall_limit: u32::MAX,
        allow_unicode_whitespace: unicode_whitespace,
    };
    let mut parser = StreamParser::with_options(Some("fuzz"), data.as_slice(), options);
    let limit = parser.lookahead();
    let mut pos = 0usize;

    for op in ops {
        let error = match op {
            Op::Peek(offset) => {
                let offset = usize::from(offset);
                let result = parser.peek(offset);
                if offset >= limit {
                    assert!(too_large(&result));
                } else {
                    assert_eq!(result, Ok(data.get(pos + offset).copied()));
                }
                result.err()
            }
            Op::PeekN(n) => {
                let n = usize::from(n);
                let result = parser.peek_n(n);
                if n >= limit {
                    assert!(too_large(&result));
                } else {
                    let end = (pos + n).min(data.len());
                    assert_eq!(result.as_deref(), Ok(&data[pos.min(end)..end]));
                }
                result.err()
            }
            Op::PeekChar => {
                let result = parser.peek_char();
                assert_eq!(result, Ok(decode_at(&data, pos).0));
                result.err()
            }
            Op::PeekStr(needle) => {
                let result = parser.peek_str(&needle);
                if needle.len() >= limit {
                    assert!(too_large(&result));
                } else {
                    assert_eq!(result, Ok(data[pos.min(data.len())..].starts_with(&needle)));
                }
                result.err()
            }
            Op::PeekAndConsume(needle) => {
                let result = parser.peek_and_consume(&needle);
                if needle.len() >= limit {
                    assert!(too_large(&result));
                } else {
                    let matched = data[pos.min(data.len())..].starts_with(&needle);
                    assert_eq!(result, Ok(matched));
                    if matched {
                        pos += needle.len();
                    }
                }
                result.err()
            }
            Op::Consume => {
                let result = parser.consume();
                assert_eq!(result, Ok(data.get(pos).copied()));
                if pos < data.len() {
                    pos += 1;
                }
                result.err()
            }
            Op::ConsumeN(n) => {
                let result = parser.consume_n(usize::from(n));
                assert_eq!(result, Ok(()));
                pos = (pos + usize::from(n)).min(data.len());
                result.err()
            }
            Op::ConsumeChar => {
                let (expected, used) = decode_at(&data, pos);
                let result = parser.consume_char();
                assert_eq!(result, Ok(expected));
                pos += used;
                result.err()
            }
            Op::ConsumeWhitespace => {
                let (end, skipped) = skip_whitespace(&data, pos, unicode_whitespace);
                let result = parser.consume_whitespace();
                assert_eq!(result, Ok(skipped));
                pos = end;
                result.err()
            }
        };

        assert_eq!(error, parser.last_error());
        let newlines = data[..pos].iter().filter(|&&b| b == b'\n').count();
        assert_eq!(parser.line() as usize, newlines + 1);
        assert_eq!(parser.location().line, parser.line());
    }
});
