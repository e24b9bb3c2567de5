//! Literal text codecs: string escapes, integers and hexadecimal floats.
//!
//! String literals encode every character that cannot appear verbatim
//! (whitespace, `#`, `\`) as a backslash followed by exactly three decimal
//! digits. Float literals are written in hexadecimal floating-point notation
//! (`0x1.8p+1`) and are rendered back in the canonical form
//! `[-]0x1.hhhhhhhhhhhhhp±d`.

use crate::error::DecodeError;

/// Decode the text of a `string@` literal.
///
/// `\ddd` becomes the character with decimal codepoint `ddd`. Whitespace,
/// `#` and a backslash not followed by three digits are rejected.
pub fn decode_string(text: &str) -> Result<String, DecodeError> {
    let invalid = || DecodeError::InvalidString(text.to_string());
    let mut decoded = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let mut code = 0u32;
                for _ in 0..3 {
                    let digit = chars.next().and_then(|d| d.to_digit(10)).ok_or_else(invalid)?;
                    code = code * 10 + digit;
                }
                decoded.push(char::from_u32(code).ok_or_else(invalid)?);
            }
            '#' => return Err(invalid()),
            c if c.is_whitespace() => return Err(invalid()),
            c => decoded.push(c),
        }
    }

    Ok(decoded)
}

/// Encode a string as `string@` literal text. Inverse of [`decode_string`].
pub fn encode_string(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for c in value.chars() {
        let code = c as u32;
        let reserved = c == '#' || c == '\\' || c.is_whitespace() || c.is_control();
        if reserved && code < 1000 {
            encoded.push_str(&format!("\\{code:03}"));
        } else {
            encoded.push(c);
        }
    }
    encoded
}

/// Parse a signed decimal integer (`[+-]?digits`).
pub fn parse_int(text: &str) -> Option<i64> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Parse hexadecimal floating-point text.
///
/// Accepts `[+-]? (0x)? hex* (. hex*)? (p [+-]? decimal)?` with at least one
/// hex digit, case-insensitively, plus `inf`, `infinity` and `nan`.
/// Surrounding whitespace is ignored. The result is correctly rounded
/// (round half to even), including subnormals.
pub fn parse_hex_float(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let lower = unsigned.to_ascii_lowercase();
    let magnitude = match lower.as_str() {
        "inf" | "infinity" => f64::INFINITY,
        "nan" => f64::NAN,
        _ => parse_hex_magnitude(&lower)?,
    };

    Some(if negative { -magnitude } else { magnitude })
}

fn parse_hex_magnitude(text: &str) -> Option<f64> {
    let body = text.strip_prefix("0x").unwrap_or(text);
    let (mantissa, exponent) = match body.split_once('p') {
        Some((m, e)) => (m, parse_exponent(e)?),
        None => (body, 0),
    };
    let (int_digits, frac_digits) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    // Accumulate up to 60 significant bits; anything below is folded into
    // a sticky bit for rounding.
    let mut bits: u64 = 0;
    let mut scale = exponent;
    let mut sticky = false;

    for c in int_digits.chars() {
        let digit = c.to_digit(16)? as u64;
        if bits >> 60 == 0 {
            bits = (bits << 4) | digit;
        } else {
            sticky |= digit != 0;
            scale = scale.saturating_add(4);
        }
    }
    for c in frac_digits.chars() {
        let digit = c.to_digit(16)? as u64;
        if bits >> 60 == 0 {
            bits = (bits << 4) | digit;
            scale = scale.saturating_sub(4);
        } else {
            sticky |= digit != 0;
        }
    }

    Some(compose(bits, sticky, scale))
}

fn parse_exponent(text: &str) -> Option<i64> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Exponents beyond this range saturate to zero or infinity anyway.
    let magnitude: i64 = digits.parse().unwrap_or(i64::from(u32::MAX));
    Some(if text.starts_with('-') { -magnitude } else { magnitude })
}

/// Build the f64 nearest to `(bits + sticky) * 2^exp2`.
fn compose(bits: u64, sticky: bool, exp2: i64) -> f64 {
    if bits == 0 {
        return 0.0;
    }

    let leading = bits.leading_zeros();
    let bits = bits << leading;
    // Unbiased exponent of the leading one bit.
    let exponent = exp2.saturating_sub(leading as i64).saturating_add(63);

    if exponent > 1023 {
        return f64::INFINITY;
    }

    let shift: i64 = if exponent >= -1022 {
        11
    } else {
        -1011 - exponent
    };
    if shift > 64 {
        return 0.0;
    }
    let shift = shift as u32;

    let (mut kept, rest) = if shift == 64 {
        (0, bits)
    } else {
        (bits >> shift, bits & ((1u64 << shift) - 1))
    };
    let half = 1u64 << (shift - 1);
    if rest > half || (rest == half && (sticky || kept & 1 == 1)) {
        kept += 1;
    }

    if exponent >= -1022 {
        let mut biased = exponent + 1023;
        if kept == 1u64 << 53 {
            kept >>= 1;
            biased += 1;
        }
        if biased >= 2047 {
            return f64::INFINITY;
        }
        f64::from_bits(((biased as u64) << 52) | (kept & ((1u64 << 52) - 1)))
    } else {
        // Subnormal; a carry into bit 52 yields the smallest normal.
        f64::from_bits(kept)
    }
}

/// Render a float in canonical hexadecimal notation.
///
/// Normal numbers print as `0x1.<13 hex digits>p<sign><exp>`, subnormals as
/// `0x0.<13 hex digits>p-1022`, zero as `0x0.0p+0`.
pub fn format_hex_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }

    let sign = if value.is_sign_negative() { "-" } else { "" };
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1u64 << 52) - 1);

    if biased == 0 && fraction == 0 {
        return format!("{sign}0x0.0p+0");
    }

    let (lead, exponent) = if biased == 0 {
        (0, -1022)
    } else {
        (1, biased - 1023)
    };
    let exp_sign = if exponent < 0 { '-' } else { '+' };
    format!(
        "{sign}0x{lead}.{fraction:013x}p{exp_sign}{}",
        exponent.unsigned_abs()
    )
}
