//! Phase 2: Token Decoding
//!
//! Turns the token under a cursor into an identifier, a name or a typed
//! literal. Every decoder skips leading whitespace first and reports a
//! malformed token by returning `None`; none of them logs.
//!
//! Integer narrowing never rejects: digits are decoded with arbitrary
//! precision and the low bits that fit the target width are kept, so
//! `int8 { 300 }` holds 44.

use crate::scanner::{is_numeric, is_separator, Cursor};
use crate::value::{f32_to_half_bits, Identifier, Name, NameScope, Value, ValueType};
use num_bigint::{BigInt, Sign};
use num_traits::AsPrimitive;

// ============================================================================
// Identifiers and Names
// ============================================================================

/// Bytes that end an identifier besides separators.
fn ends_identifier(c: u8) -> bool {
    is_separator(c) || c == b'='
}

/// Parse a bare identifier. Identifiers may not start with a digit.
pub fn parse_identifier(cur: &mut Cursor<'_>) -> Option<Identifier> {
    cur.skip_space();
    match cur.peek() {
        Some(c) if !is_numeric(c) && !ends_identifier(c) => {}
        _ => return None,
    }

    let rest = cur.rest();
    let len = rest
        .iter()
        .position(|&c| ends_identifier(c))
        .unwrap_or(rest.len());
    let text = String::from_utf8_lossy(&rest[..len]).into_owned();
    cur.advance(len);
    Some(Identifier::new(text))
}

/// Parse a `$global` or `%local` name. Consumes nothing when absent.
pub fn parse_name(cur: &mut Cursor<'_>) -> Option<Name> {
    cur.skip_space();
    let scope = match cur.peek()? {
        b'$' => NameScope::Global,
        b'%' => NameScope::Local,
        _ => return None,
    };

    let start = cur.pos();
    cur.advance(1);
    match parse_identifier(cur) {
        Some(id) => Some(Name::new(scope, id)),
        None => {
            cur.set_pos(start);
            None
        }
    }
}

// ============================================================================
// Literals
// ============================================================================

/// Skip whitespace and return the token up to the next separator.
fn take_token<'b>(cur: &mut Cursor<'b>) -> &'b [u8] {
    cur.skip_space();
    let start = cur.pos();
    cur.skip_to_separator();
    &cur.buf()[start..cur.pos()]
}

/// `true` or `false`, exactly.
pub fn parse_boolean_literal(cur: &mut Cursor<'_>) -> Option<Value> {
    match take_token(cur) {
        b"true" => Some(Value::Bool(true)),
        b"false" => Some(Value::Bool(false)),
        _ => None,
    }
}

/// Decode the leading `-?[0-9]+` of `token` into its low 64 bits.
fn decode_integer(token: &[u8]) -> Option<i64> {
    let (negative, body) = match token.strip_prefix(b"-") {
        Some(body) => (true, body),
        None => (false, token),
    };
    let digits = body.iter().take_while(|&&c| is_numeric(c)).count();
    if digits == 0 {
        return None;
    }

    let magnitude = BigInt::parse_bytes(&body[..digits], 10)?;
    let low = match magnitude.to_u64_digits() {
        (Sign::NoSign, _) => 0,
        (_, words) => words.first().copied().unwrap_or(0),
    };
    let low = low as i64;
    Some(if negative { low.wrapping_neg() } else { low })
}

/// Keep the low bits of `n` that fit `T`.
fn narrow<T>(n: i64) -> T
where
    T: Copy + 'static,
    i64: AsPrimitive<T>,
{
    n.as_()
}

/// A decimal integer of one of the signed widths.
///
/// Any other target type yields no value without consuming the token.
pub fn parse_integer_literal(cur: &mut Cursor<'_>, value_type: ValueType) -> Option<Value> {
    if !value_type.is_signed_integer() {
        return None;
    }
    let n = decode_integer(take_token(cur))?;
    Some(match value_type {
        ValueType::Int8 => Value::Int8(narrow(n)),
        ValueType::Int16 => Value::Int16(narrow(n)),
        ValueType::Int64 => Value::Int64(n),
        _ => Value::Int32(narrow(n)),
    })
}

/// A decimal integer of one of the unsigned widths.
pub fn parse_unsigned_literal(cur: &mut Cursor<'_>, value_type: ValueType) -> Option<Value> {
    if !value_type.is_unsigned_integer() {
        return None;
    }
    let n = decode_integer(take_token(cur))?;
    Some(match value_type {
        ValueType::UInt8 => Value::UInt8(narrow(n)),
        ValueType::UInt16 => Value::UInt16(narrow(n)),
        ValueType::UInt32 => Value::UInt32(narrow(n)),
        _ => Value::UInt64(narrow(n)),
    })
}

/// Length of the longest decimal-float prefix of `token`.
fn float_prefix_len(token: &[u8]) -> usize {
    let digits_from = |i: usize| i + token[i..].iter().take_while(|&&c| is_numeric(c)).count();

    let mut i = usize::from(token.first() == Some(&b'-'));
    i = digits_from(i);
    if token.get(i) == Some(&b'.') {
        i = digits_from(i + 1);
    }
    if matches!(token.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(token.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let k = digits_from(j);
        if k > j {
            i = k;
        }
    }
    i
}

/// A decimal floating-point number, stored as `float`.
///
/// `double` and `half` targets keep their own precision; any other target
/// is treated as `float`.
pub fn parse_floating_literal(cur: &mut Cursor<'_>, value_type: ValueType) -> Option<Value> {
    let token = take_token(cur);
    let starts_ok = match token {
        [c, ..] if is_numeric(*c) => true,
        [b'-', c, ..] => is_numeric(*c),
        _ => false,
    };
    if !starts_ok {
        return None;
    }

    let text = std::str::from_utf8(&token[..float_prefix_len(token)]).ok()?;
    Some(match value_type {
        ValueType::Double => Value::Double(text.parse().ok()?),
        ValueType::Half => Value::Half(f32_to_half_bits(text.parse().ok()?)),
        _ => Value::Float(text.parse().ok()?),
    })
}

/// A double-quoted string, copied verbatim.
///
/// The literal may span whitespace and separators; there are no escapes.
/// An unterminated literal runs to the end of the buffer.
pub fn parse_string_literal(cur: &mut Cursor<'_>) -> Option<Value> {
    cur.skip_space();
    if !cur.is_string_literal() {
        return None;
    }
    cur.advance(1);

    let rest = cur.rest();
    let len = rest.iter().position(|&c| c == b'"').unwrap_or(rest.len());
    let bytes = rest[..len].to_vec();
    cur.advance(len + 1);
    Some(Value::String(bytes))
}

/// A `0x`-prefixed hexadecimal number, stored as `int32`.
///
/// Every byte up to the next separator must be a hex digit. Digits beyond
/// the eighth shift the high ones out.
pub fn parse_hexa_literal(cur: &mut Cursor<'_>) -> Option<Value> {
    cur.skip_space();
    if !cur.is_hex_literal() {
        return None;
    }
    let token = take_token(cur);
    let digits = &token[2..];
    if digits.is_empty() {
        return None;
    }

    let mut value: u32 = 0;
    for &c in digits {
        let digit = char::from(c).to_digit(16)?;
        value = value.wrapping_mul(16).wrapping_add(digit);
    }
    Some(Value::Int32(value as i32))
}
