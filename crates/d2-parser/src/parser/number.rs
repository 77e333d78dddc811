//! Exact number literals.
//!
//! Accepts decimals with an optional sign, fraction and exponent (`-1.5e3`),
//! fractions of two decimals (`1/3`), and `0x`, `0o` and `0b` integers.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Num, Zero, pow};

/// Exponents beyond this are not treated as numbers.
const MAX_EXPONENT: u32 = 10_000;

/// Parse `s` as an exact rational, or `None` if it is not a number literal.
pub(crate) fn parse_rational(s: &str) -> Option<BigRational> {
    if let Some((numer, denom)) = s.split_once('/') {
        let numer = parse_decimal(numer)?;
        let denom = parse_decimal(denom)?;
        if denom.is_zero() {
            return None;
        }
        return Some(numer / denom);
    }
    parse_decimal(s).or_else(|| parse_radix_integer(s))
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    }
}

fn parse_radix_integer(s: &str) -> Option<BigRational> {
    let (negative, rest) = split_sign(s);
    let prefix = rest.get(..2)?.to_ascii_lowercase();
    let radix = match prefix.as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };
    let digits = &rest[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let value = BigInt::from_str_radix(digits, radix).ok()?;
    let value = if negative { -value } else { value };
    Some(BigRational::from_integer(value))
}

fn parse_decimal(s: &str) -> Option<BigRational> {
    let (negative, rest) = split_sign(s);

    let (mantissa, exponent) = match rest.find(['e', 'E']) {
        Some(i) => (&rest[..i], Some(&rest[i + 1..])),
        None => (rest, None),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (mantissa, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(int_part) || !is_digits(frac_part) {
        return None;
    }

    let digits = format!("{int_part}{frac_part}");
    let mut value = BigRational::from_integer(digits.parse::<BigInt>().ok()?);
    let mut scale = -i64::try_from(frac_part.len()).ok()?;

    if let Some(exponent) = exponent {
        let (exp_negative, exp_digits) = split_sign(exponent);
        if exp_digits.is_empty() || !exp_digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let exp = exp_digits.parse::<u32>().ok().filter(|e| *e <= MAX_EXPONENT)?;
        scale += if exp_negative {
            -i64::from(exp)
        } else {
            i64::from(exp)
        };
    }

    let power = usize::try_from(scale.unsigned_abs()).ok()?;
    let factor: BigInt = pow(BigInt::from(10), power);
    if scale >= 0 {
        value *= BigRational::from_integer(factor);
    } else {
        value /= BigRational::from_integer(factor);
    }

    if negative {
        value = -value;
    }
    Some(value)
}
