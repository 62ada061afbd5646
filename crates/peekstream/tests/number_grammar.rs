#![expect(missing_docs)]
#![allow(clippy::float_cmp)]

use std::io::Cursor;

use peekstream::{ByteSource, Diagnostic, ParserOptions, ReadSource, StreamParser};

fn digits<S: ByteSource>(p: &mut StreamParser<S>, out: &mut String) -> Result<usize, Diagnostic> {
    let mut count = 0;
    while let Some(byte @ b'0'..=b'9') = p.peek(0)? {
        out.push(char::from(byte));
        p.consume()?;
        count += 1;
    }
    Ok(count)
}

fn expect_digits<S: ByteSource>(
    p: &mut StreamParser<S>,
    out: &mut String,
) -> Result<(), Diagnostic> {
    if digits(p, out)? == 0 {
        let found = p.peek_char()?;
        return Err(Diagnostic::at(p, format!("expected a digit, found {found}")));
    }
    Ok(())
}

/// `-? digits ( . digits )? ( [eE] [+-]? digits )?`, with no leading-zero
/// check.
fn number<S: ByteSource>(p: &mut StreamParser<S>) -> Result<f64, Diagnostic> {
    let start = p.location();
    let mut literal = String::new();

    if p.peek_and_consume(b"-")? {
        literal.push('-');
    }
    expect_digits(p, &mut literal)?;

    if p.peek_and_consume(b".")? {
        literal.push('.');
        expect_digits(p, &mut literal)?;
    }

    if let Some(b'e' | b'E') = p.peek(0)? {
        p.consume()?;
        literal.push('e');
        if let Some(sign @ (b'+' | b'-')) = p.peek(0)? {
            p.consume()?;
            literal.push(char::from(sign));
        }
        expect_digits(p, &mut literal)?;
    }

    literal
        .parse()
        .map_err(|err| Diagnostic::new(Some(start), format!("{err}")))
}

/// `[ number ( , number )* ]` with whitespace anywhere between tokens.
fn array<S: ByteSource>(p: &mut StreamParser<S>) -> Result<Vec<f64>, Diagnostic> {
    let mut values = Vec::new();
    p.consume_whitespace()?;
    if !p.peek_and_consume(b"[")? {
        return Err(Diagnostic::at(p, "expected '['"));
    }
    p.consume_whitespace()?;
    if p.peek_and_consume(b"]")? {
        return Ok(values);
    }
    loop {
        p.consume_whitespace()?;
        values.push(number(p)?);
        p.consume_whitespace()?;
        if p.peek_and_consume(b"]")? {
            return Ok(values);
        }
        if !p.peek_and_consume(b",")? {
            let found = p.peek_char()?;
            return Err(Diagnostic::at(p, format!("expected ',' or ']', found {found}")));
        }
    }
}

fn parse_number(input: &str) -> Result<f64, Diagnostic> {
    let mut p = StreamParser::new(Some("num"), input.as_bytes());
    number(&mut p)
}

#[test]
fn parses_signed_fraction_with_exponent() {
    assert_eq!(parse_number("-3.50e+2"), Ok(-350.0));
}

#[test]
fn leading_zeros_are_accepted() {
    assert_eq!(parse_number("007"), Ok(7.0));
}

#[test]
fn stops_at_the_first_non_number_byte() {
    let mut p = StreamParser::new(Some("num"), &b"12.5E-1,"[..]);
    assert_eq!(number(&mut p), Ok(1.25));
    assert_eq!(p.peek(0), Ok(Some(b',')));
    assert_eq!(p.column(), 8);
}

#[test]
fn reports_missing_digits_with_a_location() {
    let err = parse_number("-").unwrap_err();
    assert_eq!(err.to_string(), "ERROR num:1:2: expected a digit, found end of stream");

    let err = parse_number("1.x").unwrap_err();
    assert_eq!(err.to_string(), "ERROR num:1:3: expected a digit, found U+0078 (x)");

    let err = parse_number("2e+").unwrap_err();
    assert_eq!(err.to_string(), "ERROR num:1:4: expected a digit, found end of stream");
}

#[test]
fn parses_an_array_across_block_boundaries() {
    let input = "[ 1, -2.5e1 ,\n  3.125 ,0.5e-1 ]";
    let source = ReadSource::new(Cursor::new(input.as_bytes().to_vec()));
    let mut p = StreamParser::with_options(
        Some("array"),
        source,
        ParserOptions {
            lookahead: 4,
            ..Default::default()
        },
    );
    assert_eq!(array(&mut p), Ok(vec![1.0, -25.0, 3.125, 0.05]));
    assert_eq!(p.location().to_string(), "array:2:18");
}

#[test]
fn reports_unexpected_characters_in_an_array() {
    let mut p = StreamParser::new(Some("array"), &b"[1;2]"[..]);
    let err = array(&mut p).unwrap_err();
    assert_eq!(
        err.to_string(),
        "ERROR array:1:3: expected ',' or ']', found U+003B (;)"
    );
}

#[test]
fn empty_array() {
    let mut p = StreamParser::new(None, &b"  [ ]"[..]);
    assert_eq!(array(&mut p), Ok(vec![]));
    assert_eq!(p.consume(), Ok(None));
    assert!(p.at_eof());
}
